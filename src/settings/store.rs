//! Key/value settings persistence

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Flat key/value store for user settings.
///
/// Implementations swallow their own I/O failures; settings are a convenience
/// and never block the countdown.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value);

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            _ => None,
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.set(key, Value::String(value.to_string()));
    }

    fn set_i64(&mut self, key: &str, value: i64) {
        self.set(key, Value::from(value));
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, Value::Bool(value));
    }
}

/// In-memory store, mostly useful for tests
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }
}

/// Settings kept as a single JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct JsonFileSettings {
    values: Map<String, Value>,
    path: PathBuf,
}

impl JsonFileSettings {
    /// Load settings from `path`. A missing file starts empty; an unreadable
    /// one is backed up and replaced.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(values) => {
                    info!("Loaded {} settings from {}", values.len(), path.display());
                    values
                }
                Err(e) => {
                    warn!("Failed to parse settings file {}: {}", path.display(), e);
                    backup_corrupted_file(&path);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file at {}, starting with defaults", path.display());
                Map::new()
            }
            Err(e) => {
                warn!("Failed to read settings file {}: {}", path.display(), e);
                Map::new()
            }
        };

        Self { values, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        if self.values.get(key) == Some(&value) {
            return;
        }
        self.values.insert(key.to_string(), value);
        if let Err(e) = self.save() {
            warn!("Failed to save settings to {}: {}", self.path.display(), e);
        }
    }
}

/// Move a corrupted settings file aside so it is not overwritten
fn backup_corrupted_file(path: &Path) {
    let backup_path = path.with_extension("json.backup");
    match fs::rename(path, &backup_path) {
        Ok(()) => info!("Corrupted settings file backed up to {}", backup_path.display()),
        Err(e) => warn!(
            "Failed to back up corrupted settings file {} to {}: {}",
            path.display(),
            backup_path.display(),
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_typed_accessors() {
        let mut store = MemorySettings::new();
        store.set_string("Name", "value");
        store.set_i64("Count", 42);
        store.set_bool("Flag", true);

        assert_eq!(store.get_string("Name").as_deref(), Some("value"));
        assert_eq!(store.get_i64("Count"), Some(42));
        assert_eq!(store.get_bool("Flag"), Some(true));
        assert_eq!(store.get_i64("Missing"), None);
    }

    #[test]
    fn test_lenient_conversions() {
        let mut store = MemorySettings::new();
        store.set_string("Count", " 7 ");
        store.set_string("Flag", "false");
        store.set_i64("Number", 1);

        assert_eq!(store.get_i64("Count"), Some(7));
        assert_eq!(store.get_bool("Flag"), Some(false));
        assert_eq!(store.get_bool("Number"), Some(true));
        assert_eq!(store.get_i64("Flag"), None);
    }

    #[test]
    fn test_json_settings_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = JsonFileSettings::load(&path);
        assert_eq!(store.get("Hours"), None);
        store.set_i64("Hours", 2);
        store.set_string("FormatString", "{mm}:{ss}");

        let reloaded = JsonFileSettings::load(&path);
        assert_eq!(reloaded.get_i64("Hours"), Some(2));
        assert_eq!(reloaded.get_string("FormatString").as_deref(), Some("{mm}:{ss}"));
    }

    #[test]
    fn test_corrupted_settings_file_is_backed_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileSettings::load(&path);

        assert_eq!(store.get("Hours"), None);
        assert!(!path.exists());
        assert!(dir.path().join("settings.json.backup").exists());
    }
}
