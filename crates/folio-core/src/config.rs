//! Client configuration
//!
//! Loaded from a TOML file and then overridden by the environment
//! (`FOLIO_BASE_URL`, `FOLIO_PREFERS_DARK`).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the backend origin
pub const BASE_URL_ENV: &str = "FOLIO_BASE_URL";

/// Environment variable carrying the system dark-mode signal
pub const PREFERS_DARK_ENV: &str = "FOLIO_PREFERS_DARK";

/// Multipart field name the upload endpoint expects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadField {
    #[default]
    File,
    Image,
}

impl UploadField {
    /// Form field name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Image => "image",
        }
    }
}

/// Folio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Backend origin, e.g. `https://api.example.com`
    pub base_url: String,
    /// Path prefix every resource lives under
    pub api_prefix: String,
    /// Directory for the durable storage file
    pub storage_dir: Option<PathBuf>,
    /// Storage namespace; the file is `<storage_dir>/<namespace>.json`
    pub storage_namespace: String,
    /// Multipart field used by the upload endpoint
    pub upload_field: UploadField,
    /// Endpoint for password changes, relative to the API base
    pub change_password_path: String,
    /// System appearance signal used when no theme is stored
    pub prefers_dark: bool,
    /// Per-request timeout; none when absent
    pub request_timeout_secs: Option<u64>,
}

impl FolioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With backend origin
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With storage directory
    #[inline]
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// With upload field name
    #[inline]
    #[must_use]
    pub fn with_upload_field(mut self, field: UploadField) -> Self {
        self.upload_field = field;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(PREFERS_DARK_ENV) {
            self.prefers_dark = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "dark" => true,
                "0" | "false" | "no" | "light" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: PREFERS_DARK_ENV,
                        value: raw,
                    })
                }
            };
        }
        Ok(self)
    }

    /// Base URL all resources hang off: `{origin}{api_prefix}`
    #[must_use]
    pub fn api_base(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Location of the durable storage file
    #[must_use]
    pub fn storage_file(&self) -> PathBuf {
        let dir = self.storage_dir.clone().unwrap_or_else(default_storage_dir);
        dir.join(format!("{}.json", self.storage_namespace))
    }
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            api_prefix: "/api/v1".to_string(),
            storage_dir: None,
            storage_namespace: "folio".to_string(),
            upload_field: UploadField::File,
            change_password_path: "auth/change-password".to_string(),
            prefers_dark: false,
            request_timeout_secs: None,
        }
    }
}

fn default_storage_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "folio")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".folio"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_joins_cleanly() {
        let config = FolioConfig::new().with_base_url("https://api.example.com/");
        assert_eq!(config.api_base(), "https://api.example.com/api/v1");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = FolioConfig::from_toml_str(
            r#"
            base_url = "https://cms.example.org"
            upload_field = "image"
            change_password_path = "user/change-password"
            request_timeout_secs = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://cms.example.org");
        assert_eq!(config.upload_field, UploadField::Image);
        assert_eq!(config.change_password_path, "user/change-password");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.api_prefix, "/api/v1");
    }

    #[test]
    fn env_overrides() {
        let config = FolioConfig::new()
            .with_overrides(|key| match key {
                BASE_URL_ENV => Some("https://env.example.com".into()),
                PREFERS_DARK_ENV => Some("true".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.base_url, "https://env.example.com");
        assert!(config.prefers_dark);

        let err = FolioConfig::new()
            .with_overrides(|key| (key == PREFERS_DARK_ENV).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn storage_file_uses_namespace() {
        let config = FolioConfig::new().with_storage_dir("/tmp/folio-test");
        assert_eq!(
            config.storage_file(),
            PathBuf::from("/tmp/folio-test/folio.json")
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = FolioConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
