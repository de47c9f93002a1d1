use serde::{Deserialize, Serialize};

use super::HintStyle;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Classic,
    Depth,
    Strategic,
    Tactical,
    Deus,
}

impl GameMode {
    pub fn all() -> Vec<GameMode> {
        vec![
            GameMode::Classic,
            GameMode::Depth,
            GameMode::Strategic,
            GameMode::Tactical,
            GameMode::Deus,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            GameMode::Classic => 0,
            GameMode::Depth => 1,
            GameMode::Strategic => 2,
            GameMode::Tactical => 3,
            GameMode::Deus => 4,
        }
    }

    pub fn from_index(index: usize) -> GameMode {
        match index {
            0 => GameMode::Classic,
            1 => GameMode::Depth,
            2 => GameMode::Strategic,
            3 => GameMode::Tactical,
            4 => GameMode::Deus,
            _ => GameMode::Classic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Depth => "depth",
            GameMode::Strategic => "strategic",
            GameMode::Tactical => "tactical",
            GameMode::Deus => "deus",
        }
    }

    /// First level on which the generator may pick this mode.
    pub fn unlock_level(&self) -> u32 {
        match self {
            GameMode::Classic => 1,
            GameMode::Depth => 5,
            GameMode::Strategic => 10,
            GameMode::Tactical => 15,
            GameMode::Deus => 25,
        }
    }

    pub fn unlocked_at(level_number: u32) -> Vec<GameMode> {
        Self::all()
            .into_iter()
            .filter(|mode| mode.unlock_level() <= level_number)
            .collect()
    }

    pub fn hint_style(&self) -> HintStyle {
        match self {
            GameMode::Classic => HintStyle::Proximity,
            GameMode::Depth => HintStyle::Bracket,
            GameMode::Strategic => HintStyle::Plain,
            GameMode::Tactical => HintStyle::Proximity,
            GameMode::Deus => HintStyle::Cryptic,
        }
    }

    /// Multiplier applied to the numeric span of a level.
    pub fn range_factor(&self) -> f64 {
        match self {
            GameMode::Classic => 1.0,
            GameMode::Depth => 2.0,
            GameMode::Strategic => 1.5,
            GameMode::Tactical => 1.0,
            GameMode::Deus => 4.0,
        }
    }

    /// Added to the attempt budget; may be negative.
    pub fn attempt_adjustment(&self) -> i32 {
        match self {
            GameMode::Classic => 1,
            GameMode::Depth => 0,
            GameMode::Strategic => -1,
            GameMode::Tactical => 0,
            GameMode::Deus => -1,
        }
    }

    pub fn always_timed(&self) -> bool {
        matches!(self, GameMode::Tactical | GameMode::Deus)
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
