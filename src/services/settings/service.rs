use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

/// Overrides the settings file location.
pub const CONFIG_ENV_VAR: &str = "CALENDAR_ENGINE_CONFIG";

const SETTINGS_FILE: &str = "settings.toml";

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service for the default location: `CALENDAR_ENGINE_CONFIG` when set,
    /// otherwise `settings.toml` in the platform config directory.
    pub fn from_environment() -> Self {
        Self::new(Self::resolve_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resolve_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(proj_dirs) = ProjectDirs::from("com", "KenBoyle", "CalendarEngine") {
            proj_dirs.config_dir().join(SETTINGS_FILE)
        } else {
            PathBuf::from(SETTINGS_FILE)
        }
    }

    /// Get the current settings
    pub fn get(&self) -> Result<Settings> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;

        let settings = Settings::from_toml(&content)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;

        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or bad.
    pub fn load_or_default(&self) -> Settings {
        if !self.path.exists() {
            log::info!(
                "No settings file at {}, using defaults",
                self.path.display()
            );
            return Settings::default();
        }

        match self.get() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}, using defaults", e);
                Settings::default()
            }
        }
    }

    /// Update settings
    pub fn update(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = settings.to_toml().context("Failed to serialize settings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;

        log::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::view::ViewKind;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let service = SettingsService::new(dir.path().join("absent.toml"));

        assert!(service.get().is_err());
        assert_eq!(service.load_or_default(), Settings::default());
    }

    #[test]
    fn test_update_then_get() {
        let dir = TempDir::new().unwrap();
        let service = SettingsService::new(dir.path().join("nested").join(SETTINGS_FILE));

        let mut settings = Settings::default();
        settings.first_day_of_week = 1;
        settings.default_view = ViewKind::Week;
        settings.store.base_url = "https://events.example.com/api".to_string();
        service.update(&settings).unwrap();

        assert_eq!(service.get().unwrap(), settings);
    }

    #[test]
    fn test_update_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let service = SettingsService::new(dir.path().join(SETTINGS_FILE));

        let mut settings = Settings::default();
        settings.first_day_of_week = 9;

        assert!(service.update(&settings).is_err());
        assert!(!service.path().exists());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "first_day_of_week = 12\n").unwrap();
        let service = SettingsService::new(&path);

        let err = service.get().unwrap_err();
        assert!(err.to_string().contains("Invalid settings"));
        assert_eq!(service.load_or_default(), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "default_view = \"day\"\n\n[store]\ntimeout_secs = 5\n").unwrap();

        let settings = SettingsService::new(&path).get().unwrap();

        assert_eq!(settings.default_view, ViewKind::Day);
        assert_eq!(settings.store.timeout_secs, 5);
        assert_eq!(settings.store.max_retries, 2);
        assert_eq!(settings.first_day_of_week, 0);
    }

    #[test]
    #[serial]
    fn test_env_var_overrides_location() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::env::set_var(CONFIG_ENV_VAR, &path);

        let service = SettingsService::from_environment();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(service.path(), path.as_path());
    }

    #[test]
    #[serial]
    fn test_default_location_is_settings_toml() {
        std::env::remove_var(CONFIG_ENV_VAR);
        let service = SettingsService::from_environment();
        assert_eq!(
            service.path().file_name().and_then(|n| n.to_str()),
            Some(SETTINGS_FILE)
        );
    }
}
