use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{optimal_attempts, GameMode, LevelParams, SkillMetrics};

/// Base numeric span of level 1.
const BASE_SPAN: f64 = 20.0;
const SPAN_PER_LEVEL: f64 = 15.0;
const MIN_SPAN: i64 = 10;
const MAX_SPAN: i64 = 1_000_000;

/// Every level from here on carries a time limit, whatever the mode.
const TIMED_FROM_LEVEL: u32 = 10;
const SECONDS_PER_ATTEMPT: f64 = 8.0;
const MIN_TIME_LIMIT: u32 = 15;

/// Modes other than classic only appear from this level.
const MIXED_MODES_FROM_LEVEL: u32 = 5;

pub trait LevelGenerator {
    /// Must be deterministic: identical arguments give identical levels.
    fn generate_level(
        &self,
        level_number: u32,
        metrics: &SkillMetrics,
        seed: Option<u64>,
    ) -> LevelParams;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SeededLevelGenerator;

/// Seed used when the caller supplies none.
pub fn level_seed(level_number: u32) -> u64 {
    splitmix64(u64::from(level_number))
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn unit(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

fn pick_mode(level_number: u32, rng: &mut StdRng) -> GameMode {
    if level_number < MIXED_MODES_FROM_LEVEL {
        return GameMode::Classic;
    }
    let modes = GameMode::unlocked_at(level_number);
    modes[rng.random_range(0..modes.len())]
}

impl LevelGenerator for SeededLevelGenerator {
    fn generate_level(
        &self,
        level_number: u32,
        metrics: &SkillMetrics,
        seed: Option<u64>,
    ) -> LevelParams {
        let level_number = level_number.max(1);
        let seed = seed.unwrap_or_else(|| level_seed(level_number));
        let mut rng = StdRng::seed_from_u64(seed);

        let game_mode = pick_mode(level_number, &mut rng);

        let multiplier = if metrics.difficulty_multiplier.is_finite() {
            metrics.difficulty_multiplier.clamp(0.5, 1.5)
        } else {
            1.0
        };
        let span = ((BASE_SPAN + SPAN_PER_LEVEL * f64::from(level_number - 1))
            * multiplier
            * game_mode.range_factor())
        .round() as i64;
        let span = span.clamp(MIN_SPAN, MAX_SPAN);

        let range_min = match game_mode {
            GameMode::Classic | GameMode::Strategic => 1,
            GameMode::Depth => -rng.random_range(0..=span),
            GameMode::Tactical => rng.random_range(0..=span),
            GameMode::Deus => -(span / 2),
        };
        let range_max = range_min + span - 1;
        let target_number = rng.random_range(range_min..=range_max);

        // Stronger players get less slack above the binary-search optimum.
        let skill = unit(metrics.skill_rating, 0.5);
        let slack = (3.0 - 3.0 * skill).round() as i32;
        let max_attempts = (optimal_attempts(span as u64) as i32
            + slack
            + game_mode.attempt_adjustment())
        .max(1) as u32;

        let time_limit = if game_mode.always_timed() || level_number >= TIMED_FROM_LEVEL {
            let speed = unit(metrics.speed, 0.5);
            let seconds = SECONDS_PER_ATTEMPT * f64::from(max_attempts) * (1.5 - 0.5 * speed);
            Some((seconds.round() as u32).max(MIN_TIME_LIMIT))
        } else {
            None
        };

        let level = LevelParams {
            game_mode,
            target_number,
            range_min,
            range_max,
            max_attempts,
            time_limit,
            hint_style: game_mode.hint_style(),
            seed,
        };
        debug!(
            target: "level_generator",
            "Generated level {}: mode {}, range [{}, {}], {} attempts, limit {:?}, seed {}",
            level_number,
            level.game_mode,
            level.range_min,
            level.range_max,
            level.max_attempts,
            level.time_limit,
            level.seed
        );
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics_grid() -> Vec<SkillMetrics> {
        let mut grid = vec![SkillMetrics::default()];
        for rating in [0.0, 0.3, 0.7, 1.0] {
            for speed in [0.0, 1.0] {
                grid.push(SkillMetrics {
                    skill_rating: rating,
                    speed,
                    difficulty_multiplier: 0.5 + rating,
                    ..SkillMetrics::default()
                });
            }
        }
        grid.push(SkillMetrics {
            skill_rating: f64::NAN,
            speed: f64::INFINITY,
            difficulty_multiplier: f64::NAN,
            ..SkillMetrics::default()
        });
        grid
    }

    #[test]
    fn test_generated_levels_are_always_valid() {
        let generator = SeededLevelGenerator;
        for level_number in 1..=60 {
            for metrics in metrics_grid() {
                for seed in [None, Some(0), Some(1), Some(u64::MAX)] {
                    let level = generator.generate_level(level_number, &metrics, seed);
                    assert!(level.range_min < level.range_max, "{:?}", level);
                    assert!(level.contains(level.target_number), "{:?}", level);
                    assert!(level.max_attempts >= 1, "{:?}", level);
                    assert!(level.is_valid(), "{:?}", level);
                }
            }
        }
    }

    #[test]
    fn test_same_inputs_give_same_level() {
        let generator = SeededLevelGenerator;
        let metrics = SkillMetrics::default();
        for level_number in [1, 7, 23, 40] {
            assert_eq!(
                generator.generate_level(level_number, &metrics, Some(99)),
                generator.generate_level(level_number, &metrics, Some(99))
            );
            assert_eq!(
                generator.generate_level(level_number, &metrics, None),
                generator.generate_level(level_number, &metrics, None)
            );
        }
    }

    #[test]
    fn test_seed_changes_the_target() {
        let generator = SeededLevelGenerator;
        let metrics = SkillMetrics::default();
        let targets: Vec<i64> = (0..20)
            .map(|seed| {
                generator
                    .generate_level(3, &metrics, Some(seed))
                    .target_number
            })
            .collect();
        assert!(targets.iter().any(|target| *target != targets[0]));
    }

    #[test]
    fn test_seed_is_carried_on_the_level() {
        let generator = SeededLevelGenerator;
        let metrics = SkillMetrics::default();
        assert_eq!(generator.generate_level(2, &metrics, Some(41)).seed, 41);
        assert_eq!(
            generator.generate_level(2, &metrics, None).seed,
            level_seed(2)
        );
    }

    #[test]
    fn test_early_levels_are_classic_and_untimed() {
        let generator = SeededLevelGenerator;
        for level_number in 1..MIXED_MODES_FROM_LEVEL {
            let level = generator.generate_level(level_number, &SkillMetrics::default(), None);
            assert_eq!(level.game_mode, GameMode::Classic);
            assert_eq!(level.range_min, 1);
            assert_eq!(level.time_limit, None);
        }
    }

    #[test]
    fn test_late_levels_are_timed() {
        let generator = SeededLevelGenerator;
        for level_number in TIMED_FROM_LEVEL..TIMED_FROM_LEVEL + 10 {
            let level = generator.generate_level(level_number, &SkillMetrics::default(), None);
            let limit = level.time_limit.unwrap();
            assert!(limit >= MIN_TIME_LIMIT);
        }
    }

    #[test]
    fn test_skill_shrinks_the_attempt_budget() {
        let generator = SeededLevelGenerator;
        let novice = SkillMetrics {
            skill_rating: 0.0,
            ..SkillMetrics::default()
        };
        let expert = SkillMetrics {
            skill_rating: 1.0,
            ..SkillMetrics::default()
        };
        let novice_level = generator.generate_level(1, &novice, Some(5));
        let expert_level = generator.generate_level(1, &expert, Some(5));
        assert_eq!(novice_level.max_attempts, expert_level.max_attempts + 3);
    }
}
