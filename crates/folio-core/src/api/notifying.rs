//! Notification decorator for any `ApiClient`

use super::{ApiClient, PasswordChange, Registration, Resource, UploadFile};
use crate::error::ApiError;
use crate::notify::{Notification, Notifier};
use crate::types::{AuthResponse, Credentials, User};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Wraps a client and reports every outcome to a `Notifier`
///
/// Writes and uploads report success and failure; reads report failure
/// only. Authentication calls pass through silently because the session
/// store surfaces their errors in its own banner.
#[derive(Clone)]
pub struct NotifyingClient {
    inner: Arc<dyn ApiClient>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for NotifyingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyingClient").finish_non_exhaustive()
    }
}

impl NotifyingClient {
    /// Wrap `inner`
    #[inline]
    pub fn new(inner: Arc<dyn ApiClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self { inner, notifier }
    }

    fn report<T>(
        &self,
        result: Result<T, ApiError>,
        success: Option<String>,
        failure: impl FnOnce(&ApiError) -> String,
    ) -> Result<T, ApiError> {
        match &result {
            Ok(_) => {
                if let Some(message) = success {
                    self.notifier.notify(Notification::success(message));
                }
            }
            Err(e) => self.notifier.notify(Notification::error(failure(e))),
        }
        result
    }
}

#[async_trait]
impl ApiClient for NotifyingClient {
    async fn create(&self, resource: Resource, payload: Value) -> Result<Value, ApiError> {
        let name = resource.display_name();
        let result = self.inner.create(resource, payload).await;
        self.report(result, Some(format!("{name} created successfully")), |e| {
            format!("Failed to create {name}: {e}")
        })
    }

    async fn read(&self, resource: Resource, id: Option<String>) -> Result<Value, ApiError> {
        let name = resource.display_name();
        let result = self.inner.read(resource, id).await;
        self.report(result, None, |e| format!("Failed to load {name}: {e}"))
    }

    async fn update(
        &self,
        resource: Resource,
        id: Option<String>,
        payload: Value,
    ) -> Result<Value, ApiError> {
        let name = resource.display_name();
        let result = self.inner.update(resource, id, payload).await;
        self.report(result, Some(format!("{name} updated successfully")), |e| {
            format!("Failed to update {name}: {e}")
        })
    }

    async fn remove(&self, resource: Resource, id: String) -> Result<(), ApiError> {
        let name = resource.display_name();
        let result = self.inner.remove(resource, id).await;
        self.report(result, Some(format!("{name} deleted successfully")), |e| {
            format!("Failed to delete {name}: {e}")
        })
    }

    async fn upload_file(&self, file: UploadFile) -> Result<String, ApiError> {
        self.notifier
            .notify(Notification::info(format!("Uploading {}...", file.file_name)));
        let result = self.inner.upload_file(file).await;
        self.report(result, Some("File uploaded successfully".to_string()), |e| {
            format!("Upload failed: {e}")
        })
    }

    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError> {
        self.inner.login(credentials).await
    }

    async fn register(&self, registration: Registration) -> Result<AuthResponse, ApiError> {
        self.inner.register(registration).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.inner.logout().await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.inner.current_user().await
    }

    async fn change_password(&self, change: PasswordChange) -> Result<(), ApiError> {
        self.inner.change_password(change).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApiClient;
    use crate::notify::NotificationLevel;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Collect(Mutex<Vec<Notification>>);

    impl Notifier for Collect {
        fn notify(&self, notification: Notification) {
            self.0.lock().push(notification);
        }
    }

    impl Collect {
        fn levels_and_messages(&self) -> Vec<(NotificationLevel, String)> {
            self.0
                .lock()
                .iter()
                .map(|n| (n.level, n.message.clone()))
                .collect()
        }
    }

    fn wrap(mock: MockApiClient) -> (NotifyingClient, Arc<Collect>) {
        let collect = Arc::new(Collect::default());
        (NotifyingClient::new(Arc::new(mock), collect.clone()), collect)
    }

    #[tokio::test]
    async fn create_success_is_announced_with_display_name() {
        let mut mock = MockApiClient::new();
        mock.expect_create()
            .times(1)
            .returning(|_, _| Ok(json!({"_id": "c1"})));
        let (client, notes) = wrap(mock);

        client
            .create(Resource::Certificate, json!({"title": "AWS"}))
            .await
            .unwrap();

        assert_eq!(
            notes.levels_and_messages(),
            vec![(
                NotificationLevel::Success,
                "Certificate created successfully".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn failures_are_announced_and_propagated() {
        let mut mock = MockApiClient::new();
        mock.expect_remove()
            .returning(|_, _| Err(ApiError::status_error(404, "Not found")));
        let (client, notes) = wrap(mock);

        let err = client
            .remove(Resource::HomeSection, "h".into())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(
            notes.levels_and_messages(),
            vec![(
                NotificationLevel::Error,
                "Failed to delete Hero Section: Not found".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn successful_reads_are_silent_but_failures_are_not() {
        let mut mock = MockApiClient::new();
        let mut calls = 0;
        mock.expect_read().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok(json!([]))
            } else {
                Err(ApiError::Network("connection refused".into()))
            }
        });
        let (client, notes) = wrap(mock);

        client.read(Resource::Skill, None).await.unwrap();
        assert!(notes.levels_and_messages().is_empty());

        client.read(Resource::Skill, None).await.unwrap_err();
        assert_eq!(notes.levels_and_messages()[0].0, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn upload_reports_progress_then_result() {
        let mut mock = MockApiClient::new();
        mock.expect_upload_file()
            .returning(|_| Ok("https://cdn.example.com/a.png".to_string()));
        let (client, notes) = wrap(mock);

        let url = client
            .upload_file(UploadFile::new("a.png", vec![1, 2, 3]))
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/a.png");
        let seen = notes.levels_and_messages();
        assert_eq!(seen[0], (NotificationLevel::Info, "Uploading a.png...".to_string()));
        assert_eq!(seen[1].0, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn auth_calls_are_silent() {
        let mut mock = MockApiClient::new();
        mock.expect_login()
            .returning(|_| Err(ApiError::status_error(401, "Invalid credentials")));
        let (client, notes) = wrap(mock);

        client
            .login(Credentials::new("a@b.c", "nope"))
            .await
            .unwrap_err();
        assert!(notes.levels_and_messages().is_empty());
    }
}
