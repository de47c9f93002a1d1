use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DATA_DIR_ENV: &str = "NUMQUEST_DATA_DIR";
const SETTINGS_FILE: &str = "settings.json";
const CURRENT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    /// Pause between the terminal guess and recording the result.
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Fixed seed for reproducible runs; level `n` uses `seed + n`.
    #[serde(default)]
    pub seed: Option<u64>,
}

// Helper functions for default values
fn default_version() -> u32 {
    CURRENT_VERSION
}
fn default_completion_delay_ms() -> u64 {
    500
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            completion_delay_ms: default_completion_delay_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
        }
    }
}

impl Settings {
    /// Reads `settings.json` under `dir`, writing the defaults when it is
    /// missing or unreadable.
    pub fn load(dir: &Path) -> Self {
        let path = Self::settings_path(dir);
        if let Ok(contents) = fs::read_to_string(&path) {
            match serde_json::from_str::<Settings>(&contents) {
                Ok(mut settings) => {
                    settings.migrate();
                    return settings;
                }
                Err(err) => {
                    warn!(target: "settings", "Ignoring unreadable {:?}: {}", path, err);
                }
            }
        }
        let default = Settings::default();
        if let Err(err) = default.save(dir) {
            warn!(target: "settings", "Could not write default settings: {}", err);
        }
        default
    }

    pub fn save(&self, dir: &Path) -> Result<(), std::io::Error> {
        let path = Self::settings_path(dir);
        // Ensure the directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
    }

    pub fn settings_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE)
    }

    /// `NUMQUEST_DATA_DIR`, else the platform data directory.
    pub fn data_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("numquest")
    }

    fn migrate(&mut self) {
        match self.version {
            0 | 1 => {
                // v1 stored the tick in seconds
                if self.tick_interval_ms < 100 {
                    self.tick_interval_ms = default_tick_interval_ms();
                }
                self.version = CURRENT_VERSION;
            }
            _ => (),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        let raw = std::env::var("SEED").ok()?;
        match raw.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(err) => {
                warn!(target: "settings", "Ignoring SEED={:?}: {}", raw, err);
                None
            }
        }
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(seed) = Self::seed_from_env() {
            info!(target: "settings", "Using seed {} from environment", seed);
            self.seed = Some(seed);
        }
        self
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    /// Never zero, so a running timer cannot spin.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings, Settings::default());
        assert!(Settings::settings_path(dir.path()).exists());
        assert_eq!(settings.completion_delay(), Duration::from_millis(500));
        assert_eq!(settings.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            Settings::settings_path(dir.path()),
            r#"{"version": 2, "seed": 17}"#,
        )
        .unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.seed, Some(17));
        assert_eq!(settings.completion_delay_ms, 500);
    }

    #[test]
    fn test_migrates_tick_interval_in_seconds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            Settings::settings_path(dir.path()),
            r#"{"version": 1, "tick_interval_ms": 1}"#,
        )
        .unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.version(), CURRENT_VERSION);
        assert_eq!(settings.tick_interval_ms, 1000);
    }

    #[test]
    fn test_corrupt_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(Settings::settings_path(dir.path()), "{{{").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());

        let rewritten = fs::read_to_string(Settings::settings_path(dir.path())).unwrap();
        assert!(serde_json::from_str::<Settings>(&rewritten).is_ok());
    }

    #[test]
    #[serial]
    fn test_seed_from_env() {
        std::env::set_var("SEED", "1234");
        assert_eq!(Settings::seed_from_env(), Some(1234));
        assert_eq!(Settings::default().with_env_overrides().seed, Some(1234));

        std::env::set_var("SEED", "not-a-number");
        assert_eq!(Settings::seed_from_env(), None);

        std::env::remove_var("SEED");
        assert_eq!(Settings::seed_from_env(), None);
    }

    #[test]
    #[serial]
    fn test_debug_mode_from_env() {
        std::env::set_var("DEBUG", "1");
        assert!(Settings::is_debug_mode());
        std::env::set_var("DEBUG", "0");
        assert!(!Settings::is_debug_mode());
        std::env::remove_var("DEBUG");
    }

    #[test]
    #[serial]
    fn test_data_dir_override() {
        std::env::set_var(DATA_DIR_ENV, "/tmp/numquest-test");
        assert_eq!(Settings::data_dir(), PathBuf::from("/tmp/numquest-test"));
        std::env::remove_var(DATA_DIR_ENV);
        assert!(Settings::data_dir().ends_with("numquest"));
    }
}
