use itertools::Itertools;

use crate::model::{
    optimal_attempts, Feedback, HintStyle, LevelResult, PlayerStats, SkillMetrics,
};

/// Only the most recent results shape the metrics.
pub const RECENT_WINDOW: usize = 10;

/// Time cost of a cryptic clue, in seconds.
pub const CRYPTIC_PENALTY_SECONDS: f64 = 5.0;

/// Streak length at which the rating bonus stops growing.
const STREAK_BONUS_CAP: u32 = 5;
const STREAK_BONUS: f64 = 0.05;

/// Feedback for a non-winning guess.
#[derive(Debug, Clone, PartialEq)]
pub struct Hint {
    pub feedback: Feedback,
    pub hint: Option<String>,
    pub penalty: Option<f64>,
}

pub trait SkillModel {
    fn create_initial_stats(&self) -> PlayerStats;

    fn update_stats_with_result(&self, stats: &PlayerStats, result: &LevelResult) -> PlayerStats;

    fn calculate_skill_metrics(&self, stats: &PlayerStats, history: &[LevelResult])
        -> SkillMetrics;

    /// Score in `0.0..=1.0` for a won attempt.
    fn calculate_level_accuracy(&self, attempts_used: u32, max_attempts: u32, range_size: u64)
        -> f64;

    fn get_hint(
        &self,
        guess: i64,
        target: i64,
        hint_style: HintStyle,
        attempts_remaining: u32,
    ) -> Hint;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptiveSkillModel;

fn proximity_word(distance: u64) -> &'static str {
    match distance {
        0..=2 => "Scorching",
        3..=5 => "Hot",
        6..=15 => "Warm",
        16..=40 => "Cold",
        _ => "Freezing",
    }
}

/// Smallest of 5, 10, 25, 50, 100, 250, ... bounding `distance`.
fn bracket_for(distance: u64) -> u64 {
    let mut scale: u64 = 1;
    loop {
        for step in [5u64, 10, 25] {
            let bound = step.saturating_mul(scale);
            if distance <= bound {
                return bound;
            }
        }
        if scale > u64::MAX / 10 {
            return u64::MAX;
        }
        scale *= 10;
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn result_speed(result: &LevelResult) -> f64 {
    match result.time_limit {
        Some(limit) if limit > 0 => 1.0 - result.time_used as f64 / f64::from(limit),
        _ => 1.0 / (1.0 + result.seconds_per_attempt() / 10.0),
    }
    .clamp(0.0, 1.0)
}

impl SkillModel for AdaptiveSkillModel {
    fn create_initial_stats(&self) -> PlayerStats {
        PlayerStats::default()
    }

    fn update_stats_with_result(&self, stats: &PlayerStats, result: &LevelResult) -> PlayerStats {
        let levels_played = stats.levels_played + 1;
        let current_streak = if result.won {
            stats.current_streak + 1
        } else {
            0
        };
        let average_accuracy = (stats.average_accuracy * f64::from(stats.levels_played)
            + result.accuracy)
            / f64::from(levels_played);

        PlayerStats {
            levels_played,
            levels_won: stats.levels_won + u32::from(result.won),
            total_attempts: stats.total_attempts + result.attempts_used,
            total_time: stats.total_time + result.time_used,
            current_streak,
            best_streak: stats.best_streak.max(current_streak),
            highest_level: if result.won {
                stats.highest_level.max(result.level_number)
            } else {
                stats.highest_level
            },
            average_accuracy,
        }
    }

    fn calculate_skill_metrics(
        &self,
        stats: &PlayerStats,
        history: &[LevelResult],
    ) -> SkillMetrics {
        let recent: Vec<&LevelResult> = history.iter().rev().take(RECENT_WINDOW).collect();
        if recent.is_empty() {
            return SkillMetrics::default();
        }

        let win_rate = recent.iter().filter(|result| result.won).count() as f64 / recent.len() as f64;
        let efficiency = mean(recent.iter().map(|result| result.accuracy)).unwrap_or(0.5);
        let speed = mean(recent.iter().map(|result| result_speed(result))).unwrap_or(0.5);
        let consistency = mean(
            recent
                .iter()
                .tuple_windows()
                .map(|(newer, older)| (newer.accuracy - older.accuracy).abs()),
        )
        .map_or(1.0, |swing| 1.0 - swing);

        let streak_bonus = STREAK_BONUS
            * f64::from(stats.current_streak.min(STREAK_BONUS_CAP))
            / f64::from(STREAK_BONUS_CAP);
        let skill_rating = (0.4 * win_rate + 0.3 * efficiency + 0.15 * speed + 0.15 * consistency
            + streak_bonus)
            .clamp(0.0, 1.0);

        SkillMetrics {
            skill_rating,
            efficiency,
            speed,
            consistency: consistency.clamp(0.0, 1.0),
            difficulty_multiplier: 0.5 + skill_rating,
        }
    }

    fn calculate_level_accuracy(
        &self,
        attempts_used: u32,
        max_attempts: u32,
        range_size: u64,
    ) -> f64 {
        if max_attempts == 0 || attempts_used == 0 {
            return 0.0;
        }
        let optimal = optimal_attempts(range_size).min(max_attempts);
        if attempts_used <= optimal {
            return 1.0;
        }
        let overshoot = attempts_used - optimal;
        let budget = max_attempts - optimal + 1;
        (1.0 - f64::from(overshoot) / f64::from(budget)).clamp(0.0, 1.0)
    }

    fn get_hint(
        &self,
        guess: i64,
        target: i64,
        hint_style: HintStyle,
        attempts_remaining: u32,
    ) -> Hint {
        let feedback = Feedback::compare(guess, target);
        if feedback == Feedback::Correct {
            return Hint {
                feedback,
                hint: None,
                penalty: None,
            };
        }
        let distance = guess.abs_diff(target);

        let (hint, penalty) = match hint_style {
            HintStyle::Plain => (None, None),
            HintStyle::Proximity => {
                let word = proximity_word(distance);
                if attempts_remaining == 1 {
                    (Some(format!("{}. Last chance!", word)), None)
                } else {
                    (Some(word.to_string()), None)
                }
            }
            HintStyle::Bracket => (Some(format!("Within {}", bracket_for(distance))), None),
            HintStyle::Cryptic if (1..=2).contains(&attempts_remaining) => {
                let parity = if target.rem_euclid(2) == 0 { "even" } else { "odd" };
                (
                    Some(format!("The number is {}", parity)),
                    Some(CRYPTIC_PENALTY_SECONDS),
                )
            }
            HintStyle::Cryptic => (None, None),
        };

        Hint {
            feedback,
            hint,
            penalty,
        }
    }
}
