//! Controller configuration
//!
//! Values come from an optional TOML file; the binary layers CLI flags and
//! environment variables on top.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Controller name written into every `RouteParentStatus` we own
pub const DEFAULT_CONTROLLER_NAME: &str = "gateway-xds.io/gateway-controller";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// Name of this controller as it appears in route parent statuses
    pub controller_name: String,

    /// When false, snapshots for node keys that no longer match a Gateway are
    /// replaced with an empty snapshot at the end of each pass
    pub xds_garbage_collection: bool,

    /// Emit logs as JSON instead of human-readable text
    pub log_json: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            controller_name: DEFAULT_CONTROLLER_NAME.to_string(),
            xds_garbage_collection: false,
            log_json: false,
        }
    }
}

impl ControllerConfig {
    /// Parse a configuration document. Missing keys fall back to defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: ControllerConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file on disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.controller_name.trim().is_empty() {
            return Err(Error::ConfigError(
                "controllerName must not be empty".to_string(),
            ));
        }
        // Gateway API requires a domain-prefixed path, e.g. example.net/gateway-controller
        if !self.controller_name.contains('/') {
            return Err(Error::ConfigError(format!(
                "controllerName {:?} must be a domain-prefixed path",
                self.controller_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ControllerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_partial_document_overrides_fields() {
        let config = ControllerConfig::from_toml_str(
            r#"
            controllerName = "example.net/gateway"
            xdsGarbageCollection = true
            "#,
        )
        .unwrap();

        assert_eq!(config.controller_name, "example.net/gateway");
        assert!(config.xds_garbage_collection);
        assert!(!config.log_json);
    }

    #[test]
    fn test_rejects_controller_name_without_domain() {
        let err = ControllerConfig::from_toml_str(r#"controllerName = "gateway""#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = ControllerConfig::from_toml_str("controllerName = ").unwrap_err();
        assert!(matches!(err, Error::TomlError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"logJson = true"#).unwrap();

        let config = ControllerConfig::from_file(file.path()).unwrap();
        assert!(config.log_json);
        assert_eq!(config.controller_name, DEFAULT_CONTROLLER_NAME);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ControllerConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
        assert!(err.to_string().starts_with("IO error: "));
    }
}
