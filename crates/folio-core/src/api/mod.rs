//! Generic resource client
//!
//! Uniform create/read/update/remove over the backend's named
//! collections, plus file upload and the authentication calls:
//! - `ApiClient`: the trait every store talks to
//! - `HttpApiClient`: reqwest implementation against `{origin}/api/v1`
//! - `NotifyingClient`: decorator that turns outcomes into user notifications
//!
//! Data operations return plain results; notification dispatch lives in
//! the decorator so stores can be tested without a toast consumer.

mod envelope;
mod http;
mod notifying;

pub use envelope::{error_message, parse_body, strip_identifier, unwrap_envelope, upload_url};
pub use http::HttpApiClient;
pub use notifying::NotifyingClient;

use crate::error::ApiError;
use crate::types::{AuthResponse, Credentials, User};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Named backend collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Education,
    Experience,
    Skill,
    Certificate,
    Publication,
    Project,
    HomeSection,
}

impl Resource {
    /// Every resource
    pub const ALL: [Resource; 7] = [
        Resource::Education,
        Resource::Experience,
        Resource::Skill,
        Resource::Certificate,
        Resource::Publication,
        Resource::Project,
        Resource::HomeSection,
    ];

    /// Path segment under the API base
    #[inline]
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Experience => "experience",
            Self::Skill => "skill",
            Self::Certificate => "certificate",
            Self::Publication => "publication",
            Self::Project => "project",
            Self::HomeSection => "home-section",
        }
    }

    /// Name used in user notifications
    #[inline]
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Education => "Education",
            Self::Experience => "Experience",
            Self::Skill => "Skill",
            Self::Certificate => "Certificate",
            Self::Publication => "Publication",
            Self::Project => "Project",
            Self::HomeSection => "Hero Section",
        }
    }

    /// Singleton resources are addressed without an identifier
    #[inline]
    #[must_use]
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::HomeSection)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let singular = match normalized.as_str() {
            "skills" => "skill",
            "certificates" => "certificate",
            "publications" => "publication",
            "projects" => "project",
            "hero" | "hero-section" => "home-section",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|r| r.path() == singular)
            .ok_or_else(|| format!("unknown resource: {s}"))
    }
}

/// File to send to the upload endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Create upload from raw bytes
    #[inline]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// With explicit MIME type
    #[inline]
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Registration request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Password change request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Backend operations
///
/// Every method is one request/response round-trip. Implementations attach
/// the stored bearer token to everything except `login` and `register`.
/// `read` is safe to retry; nothing here retries on its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// POST `{base}/{resource}`; identifier fields are stripped from the payload
    async fn create(&self, resource: Resource, payload: Value) -> Result<Value, ApiError>;

    /// GET `{base}/{resource}` or `{base}/{resource}/{id}`
    async fn read(&self, resource: Resource, id: Option<String>) -> Result<Value, ApiError>;

    /// PUT `{base}/{resource}/{id}`, or the bare collection when `id` is `None`
    async fn update(
        &self,
        resource: Resource,
        id: Option<String>,
        payload: Value,
    ) -> Result<Value, ApiError>;

    /// DELETE `{base}/{resource}/{id}`
    async fn remove(&self, resource: Resource, id: String) -> Result<(), ApiError>;

    /// Multipart POST to `{base}/upload`; returns the server-assigned URL
    async fn upload_file(&self, file: UploadFile) -> Result<String, ApiError>;

    /// Anonymous POST `{base}/auth/login`
    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError>;

    /// Anonymous POST `{base}/auth/register`
    async fn register(&self, registration: Registration) -> Result<AuthResponse, ApiError>;

    /// POST `{base}/auth/logout`
    async fn logout(&self) -> Result<(), ApiError>;

    /// GET `{base}/user/me`
    async fn current_user(&self) -> Result<User, ApiError>;

    /// POST to the configured password-change endpoint
    async fn change_password(&self, change: PasswordChange) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_paths_and_names() {
        assert_eq!(Resource::HomeSection.path(), "home-section");
        assert_eq!(Resource::HomeSection.display_name(), "Hero Section");
        assert!(Resource::HomeSection.is_singleton());
        assert!(!Resource::Project.is_singleton());
        assert_eq!(Resource::Certificate.to_string(), "certificate");
    }

    #[test]
    fn resource_parsing_accepts_plurals() {
        for resource in Resource::ALL {
            assert_eq!(resource.path().parse::<Resource>(), Ok(resource));
        }
        assert_eq!("Projects".parse::<Resource>(), Ok(Resource::Project));
        assert_eq!("hero".parse::<Resource>(), Ok(Resource::HomeSection));
        assert!("services".parse::<Resource>().is_err());
    }

    #[test]
    fn password_change_wire_names() {
        let change = PasswordChange {
            current_password: "old".into(),
            new_password: "new".into(),
        };
        assert_eq!(
            serde_json::to_value(change).unwrap(),
            serde_json::json!({"currentPassword": "old", "newPassword": "new"})
        );
    }
}
