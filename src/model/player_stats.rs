use serde::{Deserialize, Serialize};

/// Aggregate statistics over every recorded attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayerStats {
    pub levels_played: u32,
    pub levels_won: u32,
    pub total_attempts: u32,
    pub total_time: u64,
    pub current_streak: u32,
    pub best_streak: u32,
    pub highest_level: u32,
    pub average_accuracy: f64,
}

impl PlayerStats {
    pub fn win_rate(&self) -> f64 {
        if self.levels_played == 0 {
            return 0.0;
        }
        f64::from(self.levels_won) / f64::from(self.levels_played)
    }
}

/// Derived proficiency signals that scale future levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMetrics {
    pub skill_rating: f64,
    pub efficiency: f64,
    pub speed: f64,
    pub consistency: f64,
    pub difficulty_multiplier: f64,
}

impl Default for SkillMetrics {
    fn default() -> Self {
        Self {
            skill_rating: 0.5,
            efficiency: 0.5,
            speed: 0.5,
            consistency: 0.5,
            difficulty_multiplier: 1.0,
        }
    }
}
