use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::alerts::factories::FactoryRegistry;
use super::catalog::{CatalogError, EventCatalog};

/// 100 Hz control loop
pub const DEFAULT_TICK_LENGTH_SECS: f64 = 0.01;

/// Engine settings, persisted as settings.json
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineSettings {
    /// Fixed control period, seconds
    #[serde(default = "default_tick_length")]
    pub tick_length_secs: f64,
    /// Units flag passed to alert factories
    #[serde(default = "default_is_metric")]
    pub is_metric: bool,
    /// Alert catalog to load at startup
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// Replace a zero, negative or non-finite tick length with the default
pub fn sanitize_tick_length(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        return secs;
    }
    log::warn!("Invalid tick length {secs}, using {DEFAULT_TICK_LENGTH_SECS}");
    DEFAULT_TICK_LENGTH_SECS
}

fn default_tick_length() -> f64 {
    DEFAULT_TICK_LENGTH_SECS
}

fn default_is_metric() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_length_secs: DEFAULT_TICK_LENGTH_SECS,
            is_metric: true,
            catalog_path: None,
        }
    }
}

impl EngineSettings {
    /// Load the configured catalog; no path means an empty catalog
    pub fn load_catalog(&self, registry: &FactoryRegistry) -> Result<EventCatalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => EventCatalog::from_path(path, registry),
            None => Ok(EventCatalog::default()),
        }
    }

    fn sanitized(mut self) -> Self {
        self.tick_length_secs = sanitize_tick_length(self.tick_length_secs);
        self
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_path: config_dir.join("settings.json"),
        }
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load(&self) -> EngineSettings {
        if !self.config_path.exists() {
            return EngineSettings::default();
        }
        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Cannot read {}: {}", self.config_path.display(), e);
                return EngineSettings::default();
            }
        };
        match serde_json::from_str::<EngineSettings>(&content) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("Invalid settings in {}: {}", self.config_path.display(), e);
                EngineSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &EngineSettings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("nested"));

        let default = manager.load();
        assert_eq!(default.tick_length_secs, DEFAULT_TICK_LENGTH_SECS);
        assert!(default.is_metric);

        let new_settings = EngineSettings {
            tick_length_secs: 0.05,
            is_metric: false,
            catalog_path: Some(PathBuf::from("/etc/alerts/catalog.json")),
        };

        manager.save(&new_settings).unwrap();
        assert_eq!(manager.load(), new_settings);
    }

    #[test]
    fn test_load_catalog_from_settings() {
        let dir = tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        fs::write(
            &catalog_path,
            r#"{ "rules": [ { "event": "noGps", "channel": "permanent", "factory": "noGps" } ] }"#,
        )
        .unwrap();

        let registry = FactoryRegistry::builtin();
        let settings = EngineSettings {
            catalog_path: Some(catalog_path),
            ..EngineSettings::default()
        };
        assert_eq!(settings.load_catalog(&registry).unwrap().rule_count(), 1);
        assert_eq!(EngineSettings::default().load_catalog(&registry).unwrap().event_count(), 0);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), r#"{ "is_metric": false }"#).unwrap();

        let loaded = ConfigManager::new(dir.path().to_path_buf()).load();
        assert_eq!(loaded.tick_length_secs, DEFAULT_TICK_LENGTH_SECS);
        assert!(!loaded.is_metric);
        assert!(loaded.catalog_path.is_none());
    }

    #[test]
    fn test_invalid_tick_length_replaced() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), r#"{ "tick_length_secs": -1.0 }"#).unwrap();

        let loaded = ConfigManager::new(dir.path().to_path_buf()).load();
        assert_eq!(loaded.tick_length_secs, DEFAULT_TICK_LENGTH_SECS);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "not json").unwrap();

        let loaded = ConfigManager::new(dir.path().to_path_buf()).load();
        assert_eq!(loaded, EngineSettings::default());
    }
}
