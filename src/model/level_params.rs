use serde::{Deserialize, Serialize};

use super::{GameMode, HintStyle};

/// Guesses a binary search needs to pin down any number in a range of this size.
pub fn optimal_attempts(range_size: u64) -> u32 {
    if range_size <= 1 {
        return 1;
    }
    (range_size as f64).log2().ceil() as u32
}

/// A generated challenge. Lives for exactly one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelParams {
    pub game_mode: GameMode,
    pub target_number: i64,
    pub range_min: i64,
    pub range_max: i64,
    pub max_attempts: u32,
    pub time_limit: Option<u32>,
    pub hint_style: HintStyle,
    pub seed: u64,
}

impl LevelParams {
    /// Count of integers in `[range_min, range_max]`.
    pub fn range_size(&self) -> u64 {
        self.range_max.abs_diff(self.range_min).saturating_add(1)
    }

    pub fn contains(&self, number: i64) -> bool {
        (self.range_min..=self.range_max).contains(&number)
    }

    pub fn optimal_attempts(&self) -> u32 {
        optimal_attempts(self.range_size())
    }

    /// Checks the structural guarantees every generated level must hold.
    /// Restored snapshots failing this are discarded.
    pub fn is_valid(&self) -> bool {
        self.range_min < self.range_max
            && self.contains(self.target_number)
            && self.max_attempts >= 1
            && self.time_limit.map_or(true, |limit| limit > 0)
    }
}
