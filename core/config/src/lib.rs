#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Method Bridge Configuration
//!
//! This crate provides configuration management for the bridge.
//! It handles loading, saving, and defaulting the configuration file that specifies:
//! - Registry behaviour (default namespace, background schema derivation)
//! - Result validation
//! - Logging configuration
//!
//! Configuration is stored in TOML format. Every section and key is optional;
//! missing values take the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Method registry settings
    pub registry: RegistryConfig,
    /// Payload and result validation settings
    pub validation: ValidationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Method registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Namespace used for calls and registrations that do not name one
    pub default_namespace: String,
    /// Derive schemas on the blocking pool when a tokio runtime is available
    pub background_derivation: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self { Self { default_namespace: "DEFAULT".to_string(), background_derivation: true } }
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Check method results against their result schema before returning them
    pub validate_results: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self { Self { validate_results: true } }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (e.g. `info`, `registry=debug,warn`)
    pub level: String,
    /// Log file path (optional); stderr when absent
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load the configuration at `path` if given, else the default path if
    /// that file exists, else the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Ok(default) if default.exists() => Self::from_file(default),
            _ => Ok(Self::default()),
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/idlbridge/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("idlbridge");
        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [registry]
            default_namespace = "host"
            background_derivation = false

            [validation]
            validate_results = false

            [logging]
            level = "debug"
            file = "bridge.log"
        "#;
        fs::write(&temp_file, toml_content)
            .expect("Failed to write TOML content to temporary file");

        let loaded = Config::from_file(&temp_file).expect("Failed to load config from temporary file");
        assert_eq!(loaded.registry.default_namespace, "host");
        assert!(!loaded.registry.background_derivation);
        assert!(!loaded.validation.validate_results);
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.logging.file, Some(PathBuf::from("bridge.log")));

        // Test file not found error
        match Config::from_file("nonexistent_file.toml").expect_err("Expected error for nonexistent file") {
            ConfigError::FileRead(_) => {}
            other => panic!("Expected FileRead error, got {:?}", other),
        }

        // Test parse error
        let temp_file =
            NamedTempFile::new().expect("Failed to create temporary file for parse error test");
        fs::write(&temp_file, "invalid toml content").expect("Failed to write invalid TOML content");
        match Config::from_file(&temp_file).expect_err("Expected parse error for invalid TOML") {
            ConfigError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&temp_file, "[logging]\nlevel = \"warn\"\n").expect("Failed to write TOML content");

        let loaded = Config::from_file(&temp_file).expect("Failed to load partial config");
        assert_eq!(loaded.logging.level, "warn");
        assert_eq!(loaded.registry, RegistryConfig::default());
        assert!(loaded.validation.validate_results);
    }

    #[test]
    fn test_save() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file for save test");

        config.save(&temp_file).expect("Failed to save config");
        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config file");
        assert!(contents.contains("default_namespace = \"DEFAULT\""));
        assert!(contents.contains("validate_results = true"));
        assert_eq!(Config::from_file(&temp_file).expect("Failed to reload saved config"), config);

        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let non_existent_subdir = temp_dir.path().join("nonexistent").join("config.toml");
        match config.save(&non_existent_subdir).expect_err("Expected write error") {
            ConfigError::FileRead(_) => (),
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("idlbridge"));
    }

    #[test]
    fn test_load_or_default_with_explicit_path() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&temp_file, "[registry]\ndefault_namespace = \"x\"\n").expect("Failed to write TOML");
        let loaded = Config::load_or_default(Some(temp_file.path())).expect("Failed to load config");
        assert_eq!(loaded.registry.default_namespace, "x");
    }
}
