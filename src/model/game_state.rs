use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use super::{GuessResult, LevelParams, SessionPhase, TimerState};

/// How a recorded attempt ended while its level is still loaded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Lost,
}

/// The in-session state of the current attempt.
///
/// Owned by the session; everything outside it sees `&GameState` or a
/// cloned snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub current_level: Option<LevelParams>,
    #[serde(default)]
    pub current_guesses: Vec<GuessResult>,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub timer: TimerState,
    #[serde(default)]
    pub attempt_id: Uuid,
    #[serde(default)]
    pub resolution: Option<Resolution>,
}

impl GameState {
    /// A fresh attempt at `level`, already running.
    pub fn started(level: LevelParams, now: SystemTime) -> Self {
        Self {
            current_level: Some(level),
            current_guesses: Vec::new(),
            is_playing: true,
            is_paused: false,
            timer: TimerState::started(now),
            attempt_id: Uuid::new_v4(),
            resolution: None,
        }
    }

    /// A fresh attempt at `level`, loaded but not started.
    pub fn ready(level: LevelParams) -> Self {
        Self {
            current_level: Some(level),
            attempt_id: Uuid::new_v4(),
            ..Self::default()
        }
    }

    /// Normalizes a snapshot read back from storage. A restored session
    /// never runs until it is explicitly continued; a snapshot with an
    /// unusable level degrades to the idle state.
    pub fn restored(self) -> Self {
        let level_is_usable = self.current_level.as_ref().is_some_and(|level| {
            level.is_valid() && self.current_guesses.len() <= level.max_attempts as usize
        });
        if !level_is_usable {
            return Self::default();
        }
        Self {
            is_playing: false,
            is_paused: false,
            timer: TimerState {
                start_time: None,
                elapsed_time: self.timer.elapsed_time,
            },
            ..self
        }
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::of(self)
    }

    pub fn elapsed_time(&self) -> u64 {
        self.timer.elapsed_time
    }

    pub fn start_time(&self) -> Option<SystemTime> {
        self.timer.start_time
    }

    pub fn attempts_used(&self) -> u32 {
        self.current_guesses.len() as u32
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.current_level
            .as_ref()
            .map_or(0, |level| level.max_attempts.saturating_sub(self.attempts_used()))
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_level.is_some() && self.attempts_remaining() == 0
    }

    pub fn has_correct_guess(&self) -> bool {
        self.current_guesses.iter().any(GuessResult::is_correct)
    }
}
