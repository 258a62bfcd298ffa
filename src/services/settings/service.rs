use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "SCHEDULE_BOARD_CONFIG";

const CONFIG_FILE: &str = "board.toml";

pub struct SettingsService {
    path: Option<PathBuf>,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Resolve the config file from `SCHEDULE_BOARD_CONFIG`, then the
    /// platform config directory.
    pub fn from_environment() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);
        Self { path }
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "ClinicDesk", "ScheduleBoard")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load settings, falling back to defaults when no file exists.
    pub fn load(&self) -> Result<Settings> {
        let Some(path) = self.path.as_deref() else {
            log::info!("No config location available, using default settings");
            return Ok(Settings::default());
        };

        if !path.exists() {
            log::info!("No config at {}, using default settings", path.display());
            return Ok(Settings::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Settings = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings in {}: {}", path.display(), e))?;

        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        let path = self
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("No config location available"))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }

        let raw = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }
}
