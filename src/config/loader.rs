//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ServerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// A loaded configuration and, when defaults were substituted for a file
/// that does not exist, the path that was asked for.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ServerConfig,
    pub missing_path: Option<PathBuf>,
}

/// Load from `path` when given and present, otherwise defaults.
///
/// Runs before logging is initialised, so a missing file is reported back to
/// the caller instead of logged here.
pub fn load_or_default(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    match path {
        Some(p) if p.exists() => Ok(LoadedConfig {
            config: load_config(p)?,
            missing_path: None,
        }),
        Some(p) => Ok(LoadedConfig {
            config: ServerConfig::default(),
            missing_path: Some(p.to_path_buf()),
        }),
        None => Ok(LoadedConfig {
            config: ServerConfig::default(),
            missing_path: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("labbooker_{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = write_temp("[timeouts]\nrequest_secs = 5\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.timeouts.request_secs, 5);
        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_validation_errors_reported() {
        let path = write_temp("[timeouts]\nrequest_secs = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("timeouts.request_secs"));
        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_parse_error() {
        let path = write_temp("[timeouts\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("labbooker_does_not_exist.toml");
        let loaded = load_or_default(Some(&path)).unwrap();
        assert_eq!(loaded.config.listener.bind_address, "0.0.0.0:5000");
        assert_eq!(loaded.missing_path, Some(path));
    }

    #[test]
    fn test_existing_file_is_not_reported_missing() {
        let path = write_temp("[timeouts]\nrequest_secs = 7\n");
        let loaded = load_or_default(Some(&path)).unwrap();
        assert_eq!(loaded.config.timeouts.request_secs, 7);
        assert!(loaded.missing_path.is_none());

        assert!(load_or_default(None).unwrap().missing_path.is_none());
        fs::remove_file(&path).unwrap_or_default();
    }
}
