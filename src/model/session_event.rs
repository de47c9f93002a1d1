use super::{GameState, GuessResult, LevelResult, PlayerProfile, PlayerStats, SkillMetrics};

#[derive(Debug, Clone)]
pub enum SessionEvent {
    GameStateChanged(GameState),
    GuessEvaluated(GuessResult),
    ElapsedTimeChanged(u64),
    LevelCompleted(LevelResult),
    LevelNumberChanged(u32),
    StatsChanged {
        stats: PlayerStats,
        metrics: SkillMetrics,
    },
    ProfileChanged(PlayerProfile),
    ProgressReset,
}
