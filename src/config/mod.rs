pub mod settings;

pub use settings::Settings;

use crate::models::{CONFIG_VERSION, OptimizerConfig};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use std::fs;
use thiserror::Error;

/// Directory under the user's `.nuke` folder that holds optimizer data.
pub const APP_DIR_NAME: &str = "nuke_optimizer_data";

/// File name of the JSON config inside [`APP_DIR_NAME`].
pub const FILE_NAME: &str = "config.json";

/// Errors raised while reading or writing the config file.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Config not found: {0}")]
    NotFound(Utf8PathBuf),

    #[error("Config is not valid JSON: {path}: {source}")]
    InvalidJson {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config schema: {path} ({detail})")]
    InvalidSchema { path: Utf8PathBuf, detail: String },

    #[error("Config version {found} is older than {current}: {path}")]
    Outdated {
        path: Utf8PathBuf,
        found: i64,
        current: i64,
    },

    #[error("Config I/O failed: {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `<home>/.nuke/nuke_optimizer_data`, or a relative fallback when the home
/// directory cannot be determined.
pub fn default_config_dir() -> Utf8PathBuf {
    dirs_next::home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .map(|home| home.join(".nuke").join(APP_DIR_NAME))
        .unwrap_or_else(|| Utf8PathBuf::from(APP_DIR_NAME))
}

/// Persistence adapter for the optimizer config.
///
/// Loads, validates, and saves `config.json`. The directory is created
/// lazily on the first save so that read-only callers never touch disk.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a manager rooted at `config_dir`.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Self {
        let config_dir = config_dir.as_ref().to_path_buf();
        Self {
            config_path: config_dir.join(FILE_NAME),
            config_dir,
        }
    }

    /// Manager rooted at [`default_config_dir`].
    pub fn with_default_dir() -> Self {
        Self::new(default_config_dir())
    }

    /// Load and validate the config file.
    ///
    /// # Errors
    /// - [`StorageError::NotFound`] if the file does not exist
    /// - [`StorageError::InvalidJson`] if it does not parse
    /// - [`StorageError::InvalidSchema`] / [`StorageError::Outdated`] if
    ///   [`validate`] rejects it
    pub fn load(&self) -> Result<OptimizerConfig, StorageError> {
        if !self.config_path.exists() {
            return Err(StorageError::NotFound(self.config_path.clone()));
        }

        let contents = fs::read_to_string(&self.config_path).map_err(|source| StorageError::Io {
            path: self.config_path.clone(),
            source,
        })?;

        let value: Value =
            serde_json::from_str(&contents).map_err(|source| StorageError::InvalidJson {
                path: self.config_path.clone(),
                source,
            })?;

        let config = validate(&value).map_err(|err| match err {
            SchemaError::Outdated(found) => StorageError::Outdated {
                path: self.config_path.clone(),
                found,
                current: CONFIG_VERSION,
            },
            SchemaError::Invalid(detail) => StorageError::InvalidSchema {
                path: self.config_path.clone(),
                detail,
            },
        })?;

        tracing::debug!(
            "Loaded config from {} ({} classes, {} toggled)",
            self.config_path,
            config.classes.len(),
            config.toggled.len()
        );
        Ok(config)
    }

    /// Normalize and write the config, creating the directory if needed.
    pub fn save(&self, config: &OptimizerConfig) -> Result<(), StorageError> {
        let config = config.clone().normalized();

        fs::create_dir_all(&self.config_dir).map_err(|source| StorageError::Io {
            path: self.config_dir.clone(),
            source,
        })?;

        let json = serde_json::to_string_pretty(&config)?;
        fs::write(&self.config_path, json).map_err(|source| StorageError::Io {
            path: self.config_path.clone(),
            source,
        })?;

        tracing::debug!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Load the config, falling back to factory defaults on any error.
    ///
    /// The defaults are written back to disk; if that write fails too the
    /// in-memory defaults are still returned.
    pub fn safe_load_or_default(&self) -> OptimizerConfig {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Config load failed, resetting to defaults (reason: {})", e);

                let config = OptimizerConfig::factory_defaults();
                if let Err(save_err) = self.save(&config) {
                    tracing::warn!("Could not write default config to disk: {}", save_err);
                }
                config
            }
        }
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum SchemaError {
    Outdated(i64),
    Invalid(String),
}

/// Check an untyped config document and turn it into a normalized record.
///
/// Requirements: an object with an integer `version` no older than
/// [`CONFIG_VERSION`], `classes` as an array of strings, and `toggled`
/// (when present) as an array of strings. Newer versions are accepted.
pub(crate) fn validate(value: &Value) -> Result<OptimizerConfig, SchemaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SchemaError::Invalid("not an object".to_string()))?;

    let version = obj
        .get("version")
        .ok_or_else(|| SchemaError::Invalid("missing 'version'".to_string()))?
        .as_i64()
        .ok_or_else(|| SchemaError::Invalid("'version' is not an integer".to_string()))?;

    let classes = obj
        .get("classes")
        .ok_or_else(|| SchemaError::Invalid("missing 'classes'".to_string()))?;

    if version < CONFIG_VERSION {
        tracing::info!(
            "Config version {} is older than current CONFIG_VERSION={}",
            version,
            CONFIG_VERSION
        );
        return Err(SchemaError::Outdated(version));
    }

    let classes = string_array(classes, "classes")?;
    let toggled = match obj.get("toggled") {
        Some(toggled) => string_array(toggled, "toggled")?,
        None => Vec::new(),
    };

    Ok(OptimizerConfig {
        version,
        classes,
        toggled,
    }
    .normalized())
}

fn string_array(value: &Value, key: &str) -> Result<Vec<String>, SchemaError> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaError::Invalid(format!("'{}' is not a list", key)))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| SchemaError::Invalid(format!("'{}' contains a non-string", key)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(config_path.join("optimizer"));
        (manager, temp_dir)
    }

    #[test]
    fn test_load_missing_file() {
        let (manager, _temp_dir) = create_test_config_manager();

        assert!(matches!(manager.load(), Err(StorageError::NotFound(_))));
        // Loading must not create the directory
        assert!(!manager.config_dir().exists());
    }

    #[test]
    fn test_save_then_load() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = OptimizerConfig::new(["Kronos", "Defocus"], ["Defocus"]);
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_enforces_toggled_subset() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = OptimizerConfig {
            version: CONFIG_VERSION,
            classes: vec!["Kronos".to_string()],
            toggled: vec!["Kronos".to_string(), "Blur".to_string()],
        };
        manager.save(&config).unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(manager.config_path()).unwrap()).unwrap();
        assert_eq!(raw["toggled"], json!(["Kronos"]));
    }

    #[test]
    fn test_safe_load_writes_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = manager.safe_load_or_default();
        assert_eq!(config, OptimizerConfig::factory_defaults());
        assert!(manager.config_path().exists());
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        assert!(matches!(validate(&json!([])), Err(SchemaError::Invalid(_))));
        assert!(matches!(
            validate(&json!({"classes": []})),
            Err(SchemaError::Invalid(_))
        ));
        assert!(matches!(
            validate(&json!({"version": "1", "classes": []})),
            Err(SchemaError::Invalid(_))
        ));
        assert!(matches!(
            validate(&json!({"version": 1, "classes": ["A", 2]})),
            Err(SchemaError::Invalid(_))
        ));
        assert!(matches!(
            validate(&json!({"version": 1, "classes": ["A"], "toggled": "A"})),
            Err(SchemaError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_version_rules() {
        assert_eq!(
            validate(&json!({"version": 0, "classes": ["A"]})),
            Err(SchemaError::Outdated(0))
        );

        let newer = validate(&json!({"version": 7, "classes": ["A"], "toggled": ["A"]})).unwrap();
        assert_eq!(newer.version, 7);
        assert_eq!(newer.toggled, vec!["A"]);
    }
}
