//! Error types for Folio Core
//!
//! Provides error handling for:
//! - Transport failures and non-2xx backend responses
//! - Client-side form validation
//! - Durable storage access
//! - Configuration loading

use std::collections::BTreeMap;

/// Main Folio error type
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// Backend or transport failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Draft failed local validation
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Durable storage failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Operation does not apply to this resource
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl FolioError {
    /// Check if the error was raised before any network call
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status, when the backend answered with one
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status(),
            _ => None,
        }
    }
}

/// Resource client errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Request never produced an HTTP response
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the body's `error`/`message` field, or a generic one
        message: String,
    },

    /// Body was not the JSON shape the caller expected
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Create a status error
    #[inline]
    pub fn status_error(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, if any
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the backend rejected the credentials or token
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Field-level validation failures, keyed by field path (`title`, `skills.0`, `images.1.url`)
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summary(.fields))]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

fn summary(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Create empty error set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message recorded for a field wins
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Error for a field path
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Check if there are no errors
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failing fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(field, message)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Durable storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying file I/O failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not a JSON string map
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that failed
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_backend_message() {
        let err = ApiError::status_error(400, "Title is required");
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_statuses() {
        assert!(ApiError::status_error(401, "expired").is_unauthorized());
        assert!(ApiError::status_error(403, "forbidden").is_unauthorized());
        assert!(!ApiError::Network("refused".into()).is_unauthorized());
    }

    #[test]
    fn validation_errors_keep_first_message() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "Title is required");
        errors.add("title", "something else");
        errors.add("skills.0", "Skill cannot be empty");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert!(errors.to_string().contains("skills.0: Skill cannot be empty"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn folio_error_classification() {
        let err = FolioError::from(ValidationErrors::new());
        assert!(err.is_validation());
        assert_eq!(err.status(), None);

        let err = FolioError::from(ApiError::status_error(500, "boom"));
        assert!(!err.is_validation());
        assert_eq!(err.status(), Some(500));
    }
}
