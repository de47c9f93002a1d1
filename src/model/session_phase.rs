use super::{GameState, Resolution};

/// Lifecycle position of the session, derived from `GameState` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No level loaded.
    Idle,
    /// A level is loaded but not running.
    Ready,
    Active,
    Paused,
    /// A recorded loss; the failed level stays loaded for a retry.
    Resolved,
}

impl SessionPhase {
    pub fn of(state: &GameState) -> SessionPhase {
        if state.current_level.is_none() {
            return SessionPhase::Idle;
        }
        match (state.is_playing, state.is_paused, state.resolution) {
            (true, false, _) => SessionPhase::Active,
            (true, true, _) => SessionPhase::Paused,
            (false, _, Some(Resolution::Lost)) => SessionPhase::Resolved,
            (false, _, None) => SessionPhase::Ready,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Ready => "ready",
            SessionPhase::Active => "active",
            SessionPhase::Paused => "paused",
            SessionPhase::Resolved => "resolved",
        }
    }

    /// Guesses are only evaluated in this phase.
    pub fn accepts_guesses(&self) -> bool {
        matches!(self, SessionPhase::Active)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
