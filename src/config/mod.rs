//! Configuration file management
//!
//! Loads TOML configuration files and provides input settings.
//! Default config path: ~/.config/conkey/config.toml

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Input capture settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Console input settings
    pub console: ConsoleConfig,
    /// Input pump settings
    pub pump: PumpConfig,
}

/// Console input settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Console input device ("/dev/tty" on Unix, "CONIN$" on Windows)
    pub path: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            path: default_console_path().to_string(),
        }
    }
}

/// Input pump settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    /// Stop the pump after this many consecutive wait/read failures
    /// (0 = never stop, every failure is delivered and the pump keeps going)
    pub max_consecutive_errors: u32,
}

impl PumpConfig {
    /// Failure limit, None if unlimited
    pub fn error_limit(&self) -> Option<u32> {
        (self.max_consecutive_errors > 0).then_some(self.max_consecutive_errors)
    }
}

#[cfg(unix)]
fn default_console_path() -> &'static str {
    "/dev/tty"
}

#[cfg(windows)]
fn default_console_path() -> &'static str {
    "CONIN$"
}

impl Config {
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/conkey/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. CONKEY_CONFIG environment variable
        if let Ok(path) = std::env::var("CONKEY_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // 2. User config: ~/.config/conkey/config.toml
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. System config: /etc/conkey/config.toml
        let system_config = Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. CONKEY_CONFIG environment variable
    /// 2. ~/.config/conkey/config.toml (user config)
    /// 3. /etc/conkey/config.toml (system config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("conkey").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pump.max_consecutive_errors, 0);
        assert_eq!(config.pump.error_limit(), None);
        assert!(!config.console.path.is_empty());
    }

    #[test]
    fn test_parse_partial() {
        let config = Config::parse("[pump]\nmax_consecutive_errors = 5\n").unwrap();
        assert_eq!(config.pump.error_limit(), Some(5));
        assert_eq!(config.console, ConsoleConfig::default());
    }

    #[test]
    fn test_parse_console_path() {
        let config = Config::parse("[console]\npath = \"/dev/tty3\"\n").unwrap();
        assert_eq!(config.console.path, "/dev/tty3");
        assert_eq!(config.pump, PumpConfig::default());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Config::parse("[pump]\nmax_consecutive_errors = \"many\"\n").is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from_file(Path::new("/nonexistent/conkey.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut config = Config::default();
        config.pump.max_consecutive_errors = 3;
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
