use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `NODEOPT_CONFIG_DIR`.
pub const ENV_PREFIX: &str = "NODEOPT";

/// Tool settings (as opposed to the user's class list).
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. Optional settings file (`.yaml`, `.toml` or `.json`)
/// 3. `NODEOPT_*` environment variables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `config.json`. Defaults to `~/.nuke/nuke_optimizer_data`.
    pub config_dir: Option<Utf8PathBuf>,

    /// Directory for log files. Defaults to `~/.nuke`.
    pub log_dir: Option<Utf8PathBuf>,

    pub debug: bool,

    /// Coalescing window for per-class count refreshes.
    pub refresh_delay_ms: u64,

    /// Coalescing window for config writes after checkbox edits.
    pub save_delay_ms: u64,

    pub status_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: None,
            log_dir: None,
            debug: false,
            refresh_delay_ms: 150,
            save_delay_ms: 400,
            status_timeout_ms: 2500,
        }
    }
}

impl Settings {
    /// Build settings from defaults, an optional file, and the environment.
    pub fn load(settings_file: Option<&Utf8Path>) -> Result<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("debug", defaults.debug)?
            .set_default("refresh_delay_ms", defaults.refresh_delay_ms as i64)?
            .set_default("save_delay_ms", defaults.save_delay_ms as i64)?
            .set_default("status_timeout_ms", defaults.status_timeout_ms as i64)?;

        if let Some(path) = settings_file {
            builder = builder.add_source(File::from(path.as_std_path()).required(false));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to assemble settings")?
            .try_deserialize()
            .context("Failed to parse settings")?;

        tracing::debug!("Settings: {:?}", settings);
        Ok(settings)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }

    /// Config directory, falling back to [`super::default_config_dir`].
    pub fn resolved_config_dir(&self) -> Utf8PathBuf {
        self.config_dir
            .clone()
            .unwrap_or_else(super::default_config_dir)
    }

    /// Log directory, falling back to `~/.nuke`.
    pub fn resolved_log_dir(&self) -> Utf8PathBuf {
        self.log_dir.clone().unwrap_or_else(crate::logging::default_log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.refresh_delay(), Duration::from_millis(150));
        assert_eq!(settings.save_delay(), Duration::from_millis(400));
        assert!(settings.config_dir.is_none());
    }

    #[test]
    fn test_load_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("settings.yaml")).unwrap();
        fs::write(&path, "save_delay_ms: 50\nconfig_dir: /tmp/optimizer\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.save_delay_ms, 50);
        assert_eq!(settings.refresh_delay_ms, 150);
        assert_eq!(
            settings.resolved_config_dir(),
            Utf8PathBuf::from("/tmp/optimizer")
        );
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("absent.yaml")).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.status_timeout_ms, 2500);
    }
}
