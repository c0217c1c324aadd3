//! JSON-file implementation of the settings store.

use std::fs;
use std::path::PathBuf;

use odvoz_core::{
    model::Settings,
    ports::{SettingsError, SettingsStore},
};

/// Settings persisted as pretty-printed JSON in a single file.
pub(crate) struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Resolve the settings path: `ODVOZ_SETTINGS` wins, otherwise
    /// `$HOME/.config/odvoz/settings.json`.
    pub(crate) fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os("ODVOZ_SETTINGS") {
            return PathBuf::from(path);
        }
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(".config")
            .join("odvoz")
            .join("settings.json")
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let text = fs::read_to_string(&self.path)?;
        serde_json::from_str(&text).map_err(|err| SettingsError::Decode(err.to_string()))
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|err| SettingsError::Decode(err.to_string()))?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use odvoz_core::{
        model::{MunicipalityId, NotifyBefore, Settings},
        ports::SettingsStore,
    };

    use super::JsonSettingsStore;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("nested").join("settings.json"));

        let settings = Settings {
            selected_municipality_id: Some(MunicipalityId("zagreb".to_owned())),
            notifications_enabled: true,
            notify_before: NotifyBefore::DayBefore,
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonSettingsStore::new(path);
        assert!(store.load().is_err());
    }
}
