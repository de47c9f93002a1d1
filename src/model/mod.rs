mod game_mode;
pub mod game_state;
mod guess_result;
mod hint_style;
mod level_params;
mod level_result;
mod player_profile;
mod player_stats;
mod session_command;
mod session_event;
mod session_phase;
mod timer_state;

pub use game_mode::GameMode;
pub use game_state::{GameState, Resolution};
pub use guess_result::{Feedback, GuessResult};
pub use hint_style::HintStyle;
pub use level_params::{optimal_attempts, LevelParams};
pub use level_result::LevelResult;
pub use player_profile::{PlayerProfile, ProfileUpdate};
pub use player_stats::{PlayerStats, SkillMetrics};
pub use session_command::SessionCommand;
pub use session_event::SessionEvent;
pub use session_phase::SessionPhase;
pub use timer_state::TimerState;
