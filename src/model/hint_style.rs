use serde::{Deserialize, Serialize};

/// Selects how feedback for a non-winning guess is phrased and penalized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HintStyle {
    /// Direction only.
    #[default]
    Plain,
    /// Temperature words by distance to the target.
    Proximity,
    /// "Within N" brackets.
    Bracket,
    /// Parity clue near the end of the budget, at a time cost.
    Cryptic,
}

impl HintStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            HintStyle::Plain => "plain",
            HintStyle::Proximity => "proximity",
            HintStyle::Bracket => "bracket",
            HintStyle::Cryptic => "cryptic",
        }
    }
}
