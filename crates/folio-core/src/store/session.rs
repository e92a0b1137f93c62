//! Authenticated session and token lifecycle
//!
//! States move as follows:
//! - `Anonymous` -> `Authenticated` on login, or -> `Error` when it fails;
//!   a failed login or register also drops any earlier user and token
//! - `Checking` -> `Authenticated` when the stored token resolves to a user,
//!   otherwise -> `Anonymous` with the stored token discarded
//! - any state -> `Anonymous` on logout, even when the remote call fails
//!
//! The last error message stays in the session until `clear_error`.

use super::collection::LoadingGuard;
use crate::api::{ApiClient, PasswordChange, Registration};
use crate::error::{ApiError, FolioError};
use crate::storage::{read_lenient, KeyValueStore, AUTH_TOKEN_KEY};
use crate::types::{AuthResponse, Credentials, User};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where the session stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Anonymous,
    Checking,
    Authenticated,
    Error,
}

/// Snapshot of the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub status: SessionStatus,
}

/// Result of a password change; the message lands in `Session::error`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordChangeOutcome {
    pub success: bool,
}

/// Session store
pub struct SessionStore {
    client: Arc<dyn ApiClient>,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<Session>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionStore")
            .field("status", &state.status)
            .field("user", &state.user.as_ref().map(|u| u.id.as_str()))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create store, picking up a token left in storage
    ///
    /// With a stored token the session starts in `Checking`; call
    /// `check_auth` to confirm it.
    pub fn new(client: Arc<dyn ApiClient>, storage: Arc<dyn KeyValueStore>) -> Self {
        let token = read_lenient(storage.as_ref(), AUTH_TOKEN_KEY);
        let status = if token.is_some() {
            SessionStatus::Checking
        } else {
            SessionStatus::Anonymous
        };
        Self {
            client,
            storage,
            state: RwLock::new(Session {
                token,
                status,
                ..Session::default()
            }),
        }
    }

    /// Current session
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    /// Signed-in user
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.read().status
    }

    /// Last error message
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Whether a user is signed in
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().user.is_some()
    }

    /// Whether a session call is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Drop the last error message
    pub fn clear_error(&self) {
        self.state.write().error = None;
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<User, FolioError> {
        let set_loading = |loading: bool| self.state.write().loading = loading;
        let _loading = LoadingGuard::start(&set_loading);

        let result = self.client.login(Credentials::new(email, password)).await;
        self.complete_auth(result, "login")
    }

    /// Create an account and sign in with it
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, FolioError> {
        let set_loading = |loading: bool| self.state.write().loading = loading;
        let _loading = LoadingGuard::start(&set_loading);

        let registration = Registration {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let result = self.client.register(registration).await;
        self.complete_auth(result, "registration")
    }

    /// Apply a login/register answer
    ///
    /// The session only becomes authenticated once the token is in storage,
    /// since every later request reads it from there. Any failure leaves
    /// the session signed out, including a previously signed-in one.
    fn complete_auth(
        &self,
        result: Result<AuthResponse, ApiError>,
        action: &'static str,
    ) -> Result<User, FolioError> {
        let outcome = result.map_err(FolioError::from).and_then(|auth| {
            self.storage.set(AUTH_TOKEN_KEY, &auth.token)?;
            Ok(auth)
        });

        match outcome {
            Ok(AuthResponse { token, user }) => {
                let mut state = self.state.write();
                state.token = Some(token);
                state.user = Some(user.clone());
                state.status = SessionStatus::Authenticated;
                tracing::info!(user = %user.id, "{action} succeeded");
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "{action} failed");
                if let Err(e) = self.storage.remove(AUTH_TOKEN_KEY) {
                    tracing::warn!(error = %e, "failed to remove auth token");
                }
                let mut state = self.state.write();
                state.token = None;
                state.user = None;
                state.error = Some(e.to_string());
                state.status = SessionStatus::Error;
                Err(e)
            }
        }
    }

    /// Confirm the stored token with the backend
    ///
    /// Returns whether a user is signed in afterwards. Without a stored
    /// token no request is made. A token the backend rejects is removed
    /// from storage.
    pub async fn check_auth(&self) -> bool {
        let token = read_lenient(self.storage.as_ref(), AUTH_TOKEN_KEY);
        if token.is_none() {
            let mut state = self.state.write();
            state.token = None;
            state.user = None;
            state.status = SessionStatus::Anonymous;
            return false;
        }

        self.state.write().status = SessionStatus::Checking;
        let set_loading = |loading: bool| self.state.write().loading = loading;
        let _loading = LoadingGuard::start(&set_loading);

        match self.client.current_user().await {
            Ok(user) => {
                let mut state = self.state.write();
                state.token = token;
                state.user = Some(user);
                state.status = SessionStatus::Authenticated;
                true
            }
            Err(e) => {
                tracing::info!(error = %e, "stored token rejected; discarding");
                self.forget_token();
                false
            }
        }
    }

    /// Sign out; local state is cleared whatever the backend answers
    pub async fn logout(&self) {
        if let Err(e) = self.client.logout().await {
            tracing::warn!(error = %e, "remote logout failed; clearing local session anyway");
        }
        self.forget_token();
        tracing::info!("logged out");
    }

    /// Change the signed-in user's password
    ///
    /// Comparing the new password with its confirmation is the caller's job.
    pub async fn change_password(&self, current: &str, new: &str) -> PasswordChangeOutcome {
        let set_loading = |loading: bool| self.state.write().loading = loading;
        let _loading = LoadingGuard::start(&set_loading);

        let change = PasswordChange {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        match self.client.change_password(change).await {
            Ok(()) => {
                tracing::info!("password changed");
                PasswordChangeOutcome { success: true }
            }
            Err(e) => {
                tracing::warn!(error = %e, "password change rejected");
                self.state.write().error = Some(e.to_string());
                PasswordChangeOutcome { success: false }
            }
        }
    }

    fn forget_token(&self) {
        if let Err(e) = self.storage.remove(AUTH_TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to remove auth token");
        }
        let mut state = self.state.write();
        state.token = None;
        state.user = None;
        state.status = SessionStatus::Anonymous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApiClient;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    /// Storage that refuses every write
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn admin() -> User {
        User {
            id: "1".into(),
            name: "Admin".into(),
            ..User::default()
        }
    }

    fn store_with(mock: MockApiClient, storage: Arc<MemoryStore>) -> SessionStore {
        SessionStore::new(Arc::new(mock), storage)
    }

    #[tokio::test]
    async fn login_stores_token_and_user() {
        let mut mock = MockApiClient::new();
        mock.expect_login()
            .withf(|c| c.email == "admin@example.com" && c.password == "admin123")
            .times(1)
            .returning(|_| {
                Ok(AuthResponse {
                    token: "t1".into(),
                    user: admin(),
                })
            });
        let storage = Arc::new(MemoryStore::new());
        let session = store_with(mock, storage.clone());

        let user = session.login("admin@example.com", "admin123").await.unwrap();

        assert_eq!(user.id, "1");
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("t1"));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn login_failure_records_error_and_stays_signed_out() {
        let mut mock = MockApiClient::new();
        mock.expect_login()
            .returning(|_| Err(ApiError::status_error(401, "Invalid credentials")));
        let storage = Arc::new(MemoryStore::new());
        let session = store_with(mock, storage.clone());

        let err = session.login("a@b.c", "wrong").await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some("Invalid credentials"));
        assert!(snapshot.user.is_none());
        assert!(snapshot.token.is_none());
        assert!(storage.get(AUTH_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn login_fails_when_token_cannot_be_stored() {
        let mut mock = MockApiClient::new();
        mock.expect_login().returning(|_| {
            Ok(AuthResponse {
                token: "t1".into(),
                user: admin(),
            })
        });
        let session = SessionStore::new(Arc::new(mock), Arc::new(ReadOnlyStore));

        let err = session.login("admin@example.com", "admin123").await.unwrap_err();

        assert!(matches!(err, FolioError::Storage(_)));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert!(snapshot.user.is_none());
        assert!(snapshot.token.is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn failed_login_signs_out_previous_user() {
        let mut mock = MockApiClient::new();
        mock.expect_login()
            .withf(|c| c.password == "admin123")
            .returning(|_| {
                Ok(AuthResponse {
                    token: "t1".into(),
                    user: admin(),
                })
            });
        mock.expect_login()
            .withf(|c| c.password == "wrong")
            .returning(|_| Err(ApiError::status_error(401, "Invalid credentials")));
        let storage = Arc::new(MemoryStore::new());
        let session = store_with(mock, storage.clone());

        session.login("admin@example.com", "admin123").await.unwrap();
        session.login("admin@example.com", "wrong").await.unwrap_err();

        assert_eq!(session.status(), SessionStatus::Error);
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(storage.get(AUTH_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn error_survives_later_success_until_cleared() {
        let mut mock = MockApiClient::new();
        let mut attempts = 0;
        mock.expect_login().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Err(ApiError::status_error(401, "Invalid credentials"))
            } else {
                Ok(AuthResponse {
                    token: "t1".into(),
                    user: admin(),
                })
            }
        });
        let session = store_with(mock, Arc::new(MemoryStore::new()));

        session.login("a@b.c", "wrong").await.unwrap_err();
        session.login("a@b.c", "right").await.unwrap();
        assert_eq!(session.error().as_deref(), Some("Invalid credentials"));

        session.clear_error();
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn check_auth_without_token_makes_no_request() {
        let session = store_with(MockApiClient::new(), Arc::new(MemoryStore::new()));
        assert_eq!(session.status(), SessionStatus::Anonymous);

        assert!(!session.check_auth().await);
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn check_auth_with_valid_token() {
        let mut mock = MockApiClient::new();
        mock.expect_current_user().times(1).returning(|| Ok(admin()));
        let storage = Arc::new(MemoryStore::with_entries([(AUTH_TOKEN_KEY, "t1")]));
        let session = store_with(mock, storage);
        assert_eq!(session.status(), SessionStatus::Checking);

        assert!(session.check_auth().await);
        assert_eq!(session.user().map(|u| u.id), Some("1".to_string()));
        assert_eq!(session.snapshot().token.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn check_auth_discards_rejected_token() {
        let mut mock = MockApiClient::new();
        mock.expect_current_user()
            .returning(|| Err(ApiError::status_error(401, "Token expired")));
        let storage = Arc::new(MemoryStore::with_entries([(AUTH_TOKEN_KEY, "stale")]));
        let session = store_with(mock, storage.clone());

        assert!(!session.check_auth().await);
        assert!(session.user().is_none());
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert!(storage.get(AUTH_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_state_even_when_remote_fails() {
        let mut mock = MockApiClient::new();
        mock.expect_login().returning(|_| {
            Ok(AuthResponse {
                token: "t1".into(),
                user: admin(),
            })
        });
        mock.expect_logout()
            .times(1)
            .returning(|| Err(ApiError::status_error(500, "Internal Server Error")));
        let storage = Arc::new(MemoryStore::new());
        let session = store_with(mock, storage.clone());

        session.login("admin@example.com", "admin123").await.unwrap();
        session.logout().await;

        assert!(session.user().is_none());
        assert!(!session.is_authenticated());
        assert!(storage.get(AUTH_TOKEN_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn change_password_outcomes() {
        let mut mock = MockApiClient::new();
        mock.expect_change_password()
            .withf(|c| c.current_password == "old")
            .returning(|_| Ok(()));
        mock.expect_change_password()
            .withf(|c| c.current_password == "bad")
            .returning(|_| Err(ApiError::status_error(400, "Current password is incorrect")));
        let session = store_with(mock, Arc::new(MemoryStore::new()));

        assert!(session.change_password("old", "new").await.success);
        assert!(session.error().is_none());

        let outcome = session.change_password("bad", "new").await;
        assert!(!outcome.success);
        assert_eq!(
            session.error().as_deref(),
            Some("Current password is incorrect")
        );
    }
}
