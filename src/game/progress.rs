use std::rc::Rc;

use log::{error, trace, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::Store;
use crate::model::{GameState, LevelResult, PlayerProfile, PlayerStats, SkillMetrics};

pub const PLAYER_STATS_KEY: &str = "player_stats";
pub const SKILL_METRICS_KEY: &str = "skill_metrics";
pub const LEVEL_HISTORY_KEY: &str = "level_history";
pub const PLAYER_PROFILE_KEY: &str = "player_profile";
pub const CURRENT_LEVEL_KEY: &str = "current_level";
pub const GAME_STATE_KEY: &str = "game_state";

pub const ALL_KEYS: [&str; 6] = [
    PLAYER_STATS_KEY,
    SKILL_METRICS_KEY,
    LEVEL_HISTORY_KEY,
    PLAYER_PROFILE_KEY,
    CURRENT_LEVEL_KEY,
    GAME_STATE_KEY,
];

/// Everything read back at boot. Each field falls back to its own default.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedProgress {
    pub stats: PlayerStats,
    pub metrics: SkillMetrics,
    pub history: Vec<LevelResult>,
    pub profile: PlayerProfile,
    pub level_number: u32,
    pub game_state: GameState,
}

impl Default for SavedProgress {
    fn default() -> Self {
        Self {
            stats: PlayerStats::default(),
            metrics: SkillMetrics::default(),
            history: Vec::new(),
            profile: PlayerProfile::default(),
            level_number: 1,
            game_state: GameState::default(),
        }
    }
}

/// Typed access to the persisted keys. Writes are fire-and-forget: a
/// failure is logged and the caller carries on with its in-memory state.
#[derive(Clone)]
pub struct ProgressStore {
    store: Rc<dyn Store>,
}

impl ProgressStore {
    pub fn new(store: Rc<dyn Store>) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(target: "persistence", "Could not read {}: {}", key, err);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "persistence", "Discarding corrupt {}: {}", key, err);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(target: "persistence", "Could not encode {}: {}", key, err);
                return;
            }
        };
        match self.store.set(key, &encoded) {
            Ok(()) => trace!(target: "persistence", "Saved {}", key),
            Err(err) => error!(target: "persistence", "Could not save {}: {}", key, err),
        }
    }

    fn remove(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            error!(target: "persistence", "Could not remove {}: {}", key, err);
        }
    }

    pub fn load(&self) -> SavedProgress {
        let defaults = SavedProgress::default();
        SavedProgress {
            stats: self.read(PLAYER_STATS_KEY).unwrap_or(defaults.stats),
            metrics: self.read(SKILL_METRICS_KEY).unwrap_or(defaults.metrics),
            history: self.read(LEVEL_HISTORY_KEY).unwrap_or(defaults.history),
            profile: self.read(PLAYER_PROFILE_KEY).unwrap_or(defaults.profile),
            level_number: self
                .read::<u32>(CURRENT_LEVEL_KEY)
                .filter(|level_number| *level_number >= 1)
                .unwrap_or(defaults.level_number),
            game_state: self
                .read::<GameState>(GAME_STATE_KEY)
                .map(GameState::restored)
                .unwrap_or(defaults.game_state),
        }
    }

    pub fn save_stats(&self, stats: &PlayerStats) {
        self.write(PLAYER_STATS_KEY, stats);
    }

    pub fn save_metrics(&self, metrics: &SkillMetrics) {
        self.write(SKILL_METRICS_KEY, metrics);
    }

    pub fn save_history(&self, history: &[LevelResult]) {
        self.write(LEVEL_HISTORY_KEY, &history);
    }

    pub fn save_profile(&self, profile: &PlayerProfile) {
        self.write(PLAYER_PROFILE_KEY, profile);
    }

    pub fn save_level_number(&self, level_number: u32) {
        self.write(CURRENT_LEVEL_KEY, &level_number);
    }

    /// Only a loaded level is worth restoring; otherwise the key is dropped.
    pub fn save_game_state(&self, state: &GameState) {
        if state.current_level.is_some() {
            self.write(GAME_STATE_KEY, state);
        } else {
            self.remove(GAME_STATE_KEY);
        }
    }

    pub fn clear_all(&self) {
        for key in ALL_KEYS {
            self.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::store::MemoryStore;
    use crate::model::{GameMode, HintStyle, LevelParams};
    use std::time::{Duration, UNIX_EPOCH};

    fn make_level() -> LevelParams {
        LevelParams {
            game_mode: GameMode::Depth,
            target_number: -7,
            range_min: -20,
            range_max: 19,
            max_attempts: 6,
            time_limit: Some(45),
            hint_style: HintStyle::Bracket,
            seed: 12,
        }
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let progress = ProgressStore::new(Rc::new(MemoryStore::new()));
        assert_eq!(progress.load(), SavedProgress::default());
    }

    #[test]
    fn test_saved_values_load_back() {
        let store = Rc::new(MemoryStore::new());
        let progress = ProgressStore::new(store.clone());

        let stats = PlayerStats {
            levels_played: 4,
            levels_won: 3,
            ..PlayerStats::default()
        };
        progress.save_stats(&stats);
        progress.save_level_number(7);
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let state = GameState::started(make_level(), now);
        progress.save_game_state(&state);

        let loaded = progress.load();
        assert_eq!(loaded.stats, stats);
        assert_eq!(loaded.level_number, 7);
        assert_eq!(loaded.game_state.current_level, Some(make_level()));
        assert!(!loaded.game_state.is_playing);
        assert_eq!(loaded.game_state.start_time(), None);
    }

    #[test]
    fn test_corrupt_key_falls_back_alone() {
        let store = Rc::new(MemoryStore::new());
        let progress = ProgressStore::new(store.clone());
        progress.save_level_number(5);
        progress.save_profile(&PlayerProfile {
            display_name: "Ada".to_string(),
            ..PlayerProfile::default()
        });
        store.set(PLAYER_STATS_KEY, "{not json").unwrap();
        store.set(LEVEL_HISTORY_KEY, "42").unwrap();

        let loaded = progress.load();
        assert_eq!(loaded.stats, PlayerStats::default());
        assert!(loaded.history.is_empty());
        assert_eq!(loaded.level_number, 5);
        assert_eq!(loaded.profile.display_name, "Ada");
    }

    #[test]
    fn test_level_number_zero_is_rejected() {
        let store = Rc::new(MemoryStore::new());
        store.set(CURRENT_LEVEL_KEY, "0").unwrap();
        assert_eq!(ProgressStore::new(store).load().level_number, 1);
    }

    #[test]
    fn test_game_state_key_follows_the_level() {
        let store = Rc::new(MemoryStore::new());
        let progress = ProgressStore::new(store.clone());
        progress.save_game_state(&GameState::ready(make_level()));
        assert!(store.contains(GAME_STATE_KEY));

        progress.save_game_state(&GameState::default());
        assert!(!store.contains(GAME_STATE_KEY));
    }

    #[test]
    fn test_clear_all_removes_every_key() {
        let store = Rc::new(MemoryStore::new());
        let progress = ProgressStore::new(store.clone());
        progress.save_stats(&PlayerStats::default());
        progress.save_metrics(&SkillMetrics::default());
        progress.save_history(&[]);
        progress.save_profile(&PlayerProfile::default());
        progress.save_level_number(3);
        progress.save_game_state(&GameState::ready(make_level()));
        assert_eq!(store.len(), ALL_KEYS.len());

        progress.clear_all();
        assert!(store.is_empty());
    }
}
