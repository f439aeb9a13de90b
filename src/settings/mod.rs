//! Persisted user settings
//!
//! This module contains the key/value store abstraction and the typed view of
//! the values the countdown reads at startup.

pub mod store;

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{services::DEFAULT_FORMAT, state::TimeSpan};

pub use store::{JsonFileSettings, MemorySettings, SettingsStore};

pub const DESTINATION_KEY: &str = "DestinationFilename";
pub const HOURS_KEY: &str = "Hours";
pub const MINUTES_KEY: &str = "Minutes";
pub const SECONDS_KEY: &str = "Seconds";
pub const FINISH_MESSAGE_ENABLED_KEY: &str = "UseFinishMessage";
pub const FINISH_MESSAGE_KEY: &str = "FinishMessage";
pub const FORMAT_KEY: &str = "FormatString";

/// Every user-editable input of the countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSettings {
    pub destination: String,
    pub duration: TimeSpan,
    pub finish_message: String,
    pub finish_message_enabled: bool,
    pub format: String,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            destination: String::new(),
            duration: TimeSpan::zero(),
            finish_message: String::new(),
            finish_message_enabled: false,
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl CountdownSettings {
    /// Read settings from `store`, keeping defaults for keys that were never saved
    pub fn load(store: &dyn SettingsStore) -> Self {
        let mut settings = Self::default();

        if let Some(destination) = store.get_string(DESTINATION_KEY) {
            settings.destination = destination;
        }
        let duration = TimeSpan::new(
            store.get_i64(HOURS_KEY).unwrap_or(0),
            store.get_i64(MINUTES_KEY).unwrap_or(0),
            store.get_i64(SECONDS_KEY).unwrap_or(0),
        );
        if duration.is_valid_duration() {
            settings.duration = duration;
        } else {
            warn!("Ignoring invalid stored duration {}", duration);
        }
        if let Some(message) = store.get_string(FINISH_MESSAGE_KEY) {
            settings.finish_message = message;
        }
        if let Some(enabled) = store.get_bool(FINISH_MESSAGE_ENABLED_KEY) {
            settings.finish_message_enabled = enabled;
        }
        if let Some(format) = store.get_string(FORMAT_KEY) {
            settings.format = format;
        }

        settings
    }

    pub fn destination_path(&self) -> Option<PathBuf> {
        if self.destination.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.destination))
        }
    }

    pub fn save_duration(&self, store: &mut dyn SettingsStore) {
        store.set_i64(HOURS_KEY, self.duration.hours);
        store.set_i64(MINUTES_KEY, self.duration.minutes);
        store.set_i64(SECONDS_KEY, self.duration.seconds);
    }

    pub fn save_finish_message(&self, store: &mut dyn SettingsStore) {
        store.set_bool(FINISH_MESSAGE_ENABLED_KEY, self.finish_message_enabled);
        store.set_string(FINISH_MESSAGE_KEY, &self.finish_message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_empty_store_uses_defaults() {
        let store = MemorySettings::new();
        assert_eq!(CountdownSettings::load(&store), CountdownSettings::default());
        assert_eq!(CountdownSettings::default().format, "{hh}:{mm}:{ss}");
    }

    #[test]
    fn test_load_reads_every_key() {
        let mut store = MemorySettings::new();
        store.set_string(DESTINATION_KEY, "/tmp/countdown.txt");
        store.set_i64(HOURS_KEY, 1);
        store.set_i64(MINUTES_KEY, 30);
        store.set_i64(SECONDS_KEY, 15);
        store.set_string(FINISH_MESSAGE_KEY, "Live!");
        store.set_bool(FINISH_MESSAGE_ENABLED_KEY, true);
        store.set_string(FORMAT_KEY, "{mm}m");

        let settings = CountdownSettings::load(&store);

        assert_eq!(settings.destination_path(), Some(PathBuf::from("/tmp/countdown.txt")));
        assert_eq!(settings.duration, TimeSpan::new(1, 30, 15));
        assert_eq!(settings.finish_message, "Live!");
        assert!(settings.finish_message_enabled);
        assert_eq!(settings.format, "{mm}m");
    }

    #[test]
    fn test_load_ignores_invalid_duration() {
        let mut store = MemorySettings::new();
        store.set_i64(HOURS_KEY, 1);
        store.set_i64(MINUTES_KEY, -10);
        store.set_string(FORMAT_KEY, "{ss}");
        assert_eq!(CountdownSettings::load(&store).duration, TimeSpan::zero());
        assert_eq!(CountdownSettings::load(&store).format, "{ss}");

        let mut store = MemorySettings::new();
        store.set_i64(HOURS_KEY, i64::MAX);
        assert_eq!(CountdownSettings::load(&store).duration, TimeSpan::zero());
    }

    #[test]
    fn test_save_writes_keys() {
        let mut store = MemorySettings::new();
        let settings = CountdownSettings {
            duration: TimeSpan::new(0, 5, 0),
            finish_message: "Done".to_string(),
            finish_message_enabled: true,
            ..CountdownSettings::default()
        };

        settings.save_duration(&mut store);
        settings.save_finish_message(&mut store);

        assert_eq!(store.get_i64(MINUTES_KEY), Some(5));
        assert_eq!(store.get_bool(FINISH_MESSAGE_ENABLED_KEY), Some(true));
        assert_eq!(store.get_string(FINISH_MESSAGE_KEY).as_deref(), Some("Done"));
    }
}
