use crate::modules::time_tracking::core::ticket::TicketStatus;
use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THEME_PRESET_ID: &str = "midnight";

/// Tuning for block creation and snapping; supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub snap_threshold_minutes: i64,
    pub default_block_minutes: i64,
    pub now_snap_minutes: i64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            snap_threshold_minutes: 15,
            default_block_minutes: 30,
            now_snap_minutes: 15,
        }
    }
}

impl TrackerSettings {
    /// Saturates instead of failing for thresholds beyond the representable range.
    pub fn snap_threshold(&self) -> Duration {
        Duration::try_minutes(self.snap_threshold_minutes).unwrap_or(Duration::MAX)
    }
}

/// User preferences persisted under the settings key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub status_filters: Vec<String>,
    pub client_filter: String,
    pub theme_preset_id: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            status_filters: vec![
                TicketStatus::Open.as_str().to_string(),
                TicketStatus::InProgress.as_str().to_string(),
            ],
            client_filter: String::new(),
            theme_preset_id: DEFAULT_THEME_PRESET_ID.to_string(),
        }
    }
}

#[cfg(test)]
mod settings_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_default_to_open_and_in_progress() {
        let settings = UserSettings::default();
        assert_eq!(settings.status_filters, vec!["open", "in-progress"]);
        assert_eq!(settings.theme_preset_id, "midnight");
    }

    #[rstest]
    fn it_should_fill_missing_fields_when_reading_partial_settings() {
        let settings: UserSettings = serde_json::from_str(r#"{"clientFilter":"Acme"}"#).unwrap();
        assert_eq!(settings.client_filter, "Acme");
        assert_eq!(settings.status_filters, vec!["open", "in-progress"]);
    }

    #[rstest]
    fn it_should_expose_the_threshold_as_a_duration() {
        assert_eq!(TrackerSettings::default().snap_threshold(), Duration::minutes(15));
    }

    #[rstest]
    fn it_should_saturate_an_oversized_threshold() {
        let settings = TrackerSettings {
            snap_threshold_minutes: i64::MAX,
            ..TrackerSettings::default()
        };
        assert_eq!(settings.snap_threshold(), Duration::MAX);
    }
}
