//! reqwest-backed resource client

use super::envelope::{error_message, parse_body, strip_identifier, unwrap_envelope, upload_url};
use super::{ApiClient, PasswordChange, Registration, Resource, UploadFile};
use crate::config::{FolioConfig, UploadField};
use crate::error::ApiError;
use crate::storage::{read_lenient, KeyValueStore, AUTH_TOKEN_KEY};
use crate::types::{AuthResponse, Credentials, User};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// HTTP client for the `{origin}/api/v1` backend
///
/// The bearer token is read from storage on every request, so a login or
/// logout through the session store takes effect for the next call. A
/// request already in flight keeps whatever header it was sent with.
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base: String,
    storage: Arc<dyn KeyValueStore>,
    upload_field: UploadField,
    change_password_path: String,
}

impl fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base", &self.base)
            .field("upload_field", &self.upload_field)
            .finish_non_exhaustive()
    }
}

impl HttpApiClient {
    /// Create client from configuration
    pub fn new(config: &FolioConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base: config.api_base(),
            storage,
            upload_field: config.upload_field,
            change_password_path: config.change_password_path.trim_matches('/').to_string(),
        })
    }

    /// API base URL
    #[inline]
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    fn resource_url(&self, resource: Resource, id: Option<&str>) -> String {
        match id {
            Some(id) => self.url(&format!("{}/{id}", resource.path())),
            None => self.url(resource.path()),
        }
    }

    fn request(&self, method: Method, url: String, with_auth: bool) -> RequestBuilder {
        tracing::debug!(%method, %url, with_auth, "api request");
        let builder = self.http.request(method, url);
        if !with_auth {
            return builder;
        }
        match read_lenient(self.storage.as_ref(), AUTH_TOKEN_KEY) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            tracing::debug!(status = status.as_u16(), %message, "api error response");
            return Err(ApiError::status_error(status.as_u16(), message));
        }

        parse_body(&text)
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let value = unwrap_envelope(Self::send(builder).await?);
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn create(&self, resource: Resource, payload: Value) -> Result<Value, ApiError> {
        let request = self
            .request(Method::POST, self.resource_url(resource, None), true)
            .json(&strip_identifier(payload));
        Ok(unwrap_envelope(Self::send(request).await?))
    }

    async fn read(&self, resource: Resource, id: Option<String>) -> Result<Value, ApiError> {
        let request = self.request(
            Method::GET,
            self.resource_url(resource, id.as_deref()),
            true,
        );
        Ok(unwrap_envelope(Self::send(request).await?))
    }

    async fn update(
        &self,
        resource: Resource,
        id: Option<String>,
        payload: Value,
    ) -> Result<Value, ApiError> {
        let request = self
            .request(Method::PUT, self.resource_url(resource, id.as_deref()), true)
            .json(&payload);
        Ok(unwrap_envelope(Self::send(request).await?))
    }

    async fn remove(&self, resource: Resource, id: String) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, self.resource_url(resource, Some(&id)), true);
        Self::send(request).await.map(|_| ())
    }

    async fn upload_file(&self, file: UploadFile) -> Result<String, ApiError> {
        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = file.content_type {
            part = part.mime_str(&content_type)?;
        }
        let form = reqwest::multipart::Form::new().part(self.upload_field.as_str(), part);
        let request = self
            .request(Method::POST, self.url("upload"), true)
            .multipart(form);

        let value = Self::send(request).await.map_err(|e| match e {
            ApiError::Status { status, message } if message.starts_with("HTTP error!") => {
                ApiError::status_error(status, "Upload failed")
            }
            other => other,
        })?;
        upload_url(&value)
    }

    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError> {
        let request = self
            .request(Method::POST, self.url("auth/login"), false)
            .json(&credentials);
        Self::send_json(request).await
    }

    async fn register(&self, registration: Registration) -> Result<AuthResponse, ApiError> {
        let request = self
            .request(Method::POST, self.url("auth/register"), false)
            .json(&registration);
        Self::send_json(request).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let request = self.request(Method::POST, self.url("auth/logout"), true);
        Self::send(request).await.map(|_| ())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let request = self.request(Method::GET, self.url("user/me"), true);
        let value = unwrap_envelope(Self::send(request).await?);
        // `user/me` answers either with the user or with `{user: {...}}`
        let value = match value {
            Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }

    async fn change_password(&self, change: PasswordChange) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, self.url(&self.change_password_path), true)
            .json(&change);
        Self::send(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn client(origin: &str) -> HttpApiClient {
        let config = FolioConfig::new().with_base_url(origin);
        HttpApiClient::new(&config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn resource_urls() {
        let client = client("https://api.example.com");
        assert_eq!(client.base(), "https://api.example.com/api/v1");
        assert_eq!(
            client.resource_url(Resource::Project, None),
            "https://api.example.com/api/v1/project"
        );
        assert_eq!(
            client.resource_url(Resource::Skill, Some("s1")),
            "https://api.example.com/api/v1/skill/s1"
        );
        assert_eq!(
            client.resource_url(Resource::HomeSection, None),
            "https://api.example.com/api/v1/home-section"
        );
    }
}
