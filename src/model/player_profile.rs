use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    #[serde(default = "default_display_name")]
    pub display_name: String,

    #[serde(default)]
    pub avatar_id: u32,

    #[serde(default = "default_true")]
    pub sound_enabled: bool,

    #[serde(default = "default_true")]
    pub haptics_enabled: bool,
}

fn default_display_name() -> String {
    "Player".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for PlayerProfile {
    fn default() -> Self {
        PlayerProfile {
            display_name: default_display_name(),
            avatar_id: 0,
            sound_enabled: true,
            haptics_enabled: true,
        }
    }
}

/// Partial profile edit; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_id: Option<u32>,
    pub sound_enabled: Option<bool>,
    pub haptics_enabled: Option<bool>,
}

impl PlayerProfile {
    pub fn updated(&self, update: ProfileUpdate) -> PlayerProfile {
        PlayerProfile {
            display_name: update
                .display_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| self.display_name.clone()),
            avatar_id: update.avatar_id.unwrap_or(self.avatar_id),
            sound_enabled: update.sound_enabled.unwrap_or(self.sound_enabled),
            haptics_enabled: update.haptics_enabled.unwrap_or(self.haptics_enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_only_touches_given_fields() {
        let profile = PlayerProfile::default();
        let updated = profile.updated(ProfileUpdate {
            display_name: Some("  Ada ".to_string()),
            sound_enabled: Some(false),
            ..Default::default()
        });
        assert_eq!(updated.display_name, "Ada");
        assert!(!updated.sound_enabled);
        assert!(updated.haptics_enabled);
        assert_eq!(updated.avatar_id, 0);
    }

    #[test]
    fn test_blank_name_is_ignored() {
        let updated = PlayerProfile::default().updated(ProfileUpdate {
            display_name: Some("   ".to_string()),
            ..Default::default()
        });
        assert_eq!(updated.display_name, "Player");
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let profile: PlayerProfile = serde_json::from_str(r#"{"avatar_id": 3}"#).unwrap();
        assert_eq!(profile.avatar_id, 3);
        assert_eq!(profile.display_name, "Player");
        assert!(profile.sound_enabled);
    }
}
