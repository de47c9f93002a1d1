use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GameMode, GameState, GuessResult, LevelParams};

/// Archival record of one finished attempt.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelResult {
    pub level_number: u32,
    pub won: bool,
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub time_used: u64,
    pub time_limit: Option<u32>,
    pub accuracy: f64,
    pub game_mode: GameMode,
    pub target_number: i64,
    pub guesses: Vec<GuessResult>,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub attempt_id: Uuid,
}

impl LevelResult {
    pub fn from_attempt(
        level_number: u32,
        level: &LevelParams,
        state: &GameState,
        won: bool,
        time_used: u64,
        accuracy: f64,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            level_number,
            won,
            attempts_used: state.attempts_used(),
            max_attempts: level.max_attempts,
            time_used,
            time_limit: level.time_limit,
            accuracy: accuracy.clamp(0.0, 1.0),
            game_mode: level.game_mode,
            target_number: level.target_number,
            guesses: state.current_guesses.clone(),
            completed_at,
            attempt_id: state.attempt_id,
        }
    }

    /// Seconds per guess, or the full time when no guess was made.
    pub fn seconds_per_attempt(&self) -> f64 {
        self.time_used as f64 / f64::from(self.attempts_used.max(1))
    }
}
