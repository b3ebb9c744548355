use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::Policy;

pub use dhall::{parse_config, serialize_config};
mod dhall;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("The config file '{0}' does not exist or is not readable")]
    #[diagnostic(
        code(config::notfound),
        help("Make sure the config file and the directory it's in are readable by the user running saslplaind")
    )]
    NotFound(String),
    #[error("The path '{0}' does not point to a file")]
    #[diagnostic(
        code(config::notafile),
        help("The config must be a file in the dhall format")
    )]
    NotAFile(String),
    #[error("failed to parse config: {0}")]
    #[diagnostic(code(config::parse))]
    Parse(
        #[from]
        #[source]
        serde_dhall::Error,
    ),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the TOML users file
    pub userdb: PathBuf,

    /// Which mechanisms may be offered to clients
    pub policy: Policy,

    #[serde(default, skip)]
    pub verbosity: isize,

    #[serde(default, skip)]
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            userdb: PathBuf::from("/etc/saslplaind/users.toml"),
            policy: Policy::default(),
            verbosity: 0,
            log_format: "Full".to_string(),
        }
    }
}

pub fn read(file: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = file.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_string_lossy().to_string()));
    }
    if !path.is_file() {
        return Err(ConfigError::NotAFile(path.to_string_lossy().to_string()));
    }
    let config = dhall::read_config_file(file)?;
    tracing::debug!(?config, "read config");
    Ok(config)
}
