//! Configuration for the credential helper.
//!
//! The helper is normally configured entirely through its environment,
//! since the calling client spawns it with a single command argument:
//!
//! | Variable                 | Description                                   |
//! |--------------------------|-----------------------------------------------|
//! | `CREDSDIR`               | Directory holding the credential fixtures     |
//! | `LFS_TEST_CREDS_WWWAUTH` | `required` / `forbidden` `wwwauth[]` checking |
//! | `LFS_TEST_CREDS_CONFIG`  | Path to an optional TOML configuration file   |
//!
//! A TOML file can pin the same settings. Values set in the file take
//! precedence; the environment only fills what the file leaves unset.
//!
//! # Error Handling
//!
//! - If no config file exists, the environment alone is used.
//! - If a config file exists but is invalid, an error is returned (fail fast).
//!
//! # Example Configuration
//!
//! ```toml
//! creds_dir = "/tmp/lfs-test/creds/"
//! wwwauth = "required"
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::assembly::WwwAuthMode;

/// Environment variable naming the fixtures directory.
pub const CREDS_DIR_ENV_VAR: &str = "CREDSDIR";

/// Environment variable selecting `wwwauth[]` validation.
pub const WWWAUTH_ENV_VAR: &str = "LFS_TEST_CREDS_WWWAUTH";

/// Environment variable pointing at a configuration file.
pub const CONFIG_ENV_VAR: &str = "LFS_TEST_CREDS_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file")]
    Parse(#[from] toml::de::Error),
}

/// Helper configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the credential fixtures.
    pub creds_dir: Option<PathBuf>,
    /// `wwwauth[]` validation mode.
    pub wwwauth: Option<WwwAuthMode>,
}

impl Config {
    /// Returns the default configuration file path.
    ///
    /// Returns `~/.config/git-credential-lfstest/config.toml` using
    /// `dirs::config_dir()`, or `None` if the config directory cannot be
    /// determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("git-credential-lfstest").join("config.toml"))
    }

    /// Load configuration from a specific path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var_os(name))
    }

    /// Build the configuration using `lookup` to read environment variables.
    ///
    /// Resolution order for each setting:
    /// 1. The file named by `LFS_TEST_CREDS_CONFIG`, or the default path if
    ///    that file exists
    /// 2. `CREDSDIR` / `LFS_TEST_CREDS_WWWAUTH`
    /// 3. Built-in defaults (current directory, no `wwwauth[]` checking)
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = match non_empty(lookup(CONFIG_ENV_VAR)) {
            Some(path) => Self::load_from(Path::new(&path))?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };

        if config.creds_dir.is_none() {
            config.creds_dir = non_empty(lookup(CREDS_DIR_ENV_VAR)).map(PathBuf::from);
        }

        if config.wwwauth.is_none() {
            config.wwwauth = lookup(WWWAUTH_ENV_VAR)
                .map(|value| WwwAuthMode::from_toggle(&value.to_string_lossy()));
        }

        Ok(config)
    }

    /// The effective fixtures directory.
    ///
    /// An unset directory resolves fixtures relative to the working
    /// directory.
    pub fn creds_dir(&self) -> &Path {
        self.creds_dir.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// The effective `wwwauth[]` validation mode.
    pub fn wwwauth_mode(&self) -> WwwAuthMode {
        self.wwwauth.unwrap_or_default()
    }
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|v| !v.is_empty())
}
