//! Session configuration

use crate::error::ConfigError;
use envview_engine::LoadOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a [`DocumentSession`](crate::DocumentSession)
///
/// ```toml
/// verify_before_override = true
/// minimal_patches = false
///
/// [load]
/// legacy_overwritten = false
/// cache_capacity = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Options applied to every load
    pub load: LoadOptions,
    /// Re-read the host before each override and re-parse if the content changed
    pub verify_before_override: bool,
    /// Drop instructions whose text already matches the line
    pub minimal_patches: bool,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With load options
    #[inline]
    #[must_use]
    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// With pre-override verification
    #[inline]
    #[must_use]
    pub fn with_verify_before_override(mut self, enabled: bool) -> Self {
        self.verify_before_override = enabled;
        self
    }

    /// With minimal patches
    #[inline]
    #[must_use]
    pub fn with_minimal_patches(mut self, enabled: bool) -> Self {
        self.minimal_patches = enabled;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this schema
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` if its content is invalid
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded session config");
        Ok(config)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            verify_before_override: true,
            minimal_patches: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_toml() {
        let config = SessionConfig::from_toml_str(
            "minimal_patches = true\n\n[load]\nlegacy_overwritten = true\n",
        )
        .unwrap();
        assert!(config.minimal_patches);
        assert!(config.verify_before_override);
        assert!(config.load.legacy_overwritten);
        assert_eq!(config.load.cache_capacity, 64);
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let err = SessionConfig::from_toml_str("minimal_patches = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn builders() {
        let config = SessionConfig::new()
            .with_minimal_patches(true)
            .with_verify_before_override(false)
            .with_load_options(LoadOptions::new().with_cache_capacity(4));
        assert!(config.minimal_patches);
        assert!(!config.verify_before_override);
        assert_eq!(config.load.cache_capacity, 4);
    }

    #[tokio::test]
    async fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("envview.toml");
        tokio::fs::write(&path, "verify_before_override = false\n").await.unwrap();
        let config = SessionConfig::load(&path).await.unwrap();
        assert!(!config.verify_before_override);
    }

    #[tokio::test]
    async fn load_missing_file() {
        let err = SessionConfig::load("/nonexistent/envview.toml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
