//! Error types for the gateway xDS control plane

use thiserror::Error;

/// Main error type for gateway-xds operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or unreadable controller configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to parse a TOML configuration file
    #[error("Failed to parse configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// YAML manifest could not be parsed
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
