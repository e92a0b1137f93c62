//! Password change form

use super::validation::required;
use crate::error::ValidationErrors;
use crate::store::{PasswordChangeOutcome, SessionStore};

/// Shown when the new password and its confirmation differ
pub const PASSWORD_MISMATCH: &str = "New passwords do not match.";

/// Current, new and confirmation fields
///
/// The confirmation check is local; the session store is never called
/// with mismatching passwords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Required fields, then the confirmation match
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        required(
            &mut errors,
            "currentPassword",
            &self.current_password,
            "Current password is required",
        );
        required(&mut errors, "newPassword", &self.new_password, "New password is required");
        required(
            &mut errors,
            "confirmPassword",
            &self.confirm_password,
            "Please confirm the new password",
        );
        if errors.is_empty() && self.new_password != self.confirm_password {
            errors.add("confirmPassword", PASSWORD_MISMATCH);
        }
        errors
    }

    /// Validate locally, then ask the session store
    ///
    /// The fields are cleared after the backend accepts the change; on
    /// rejection they stay and the message is in the session's error.
    pub async fn submit(
        &mut self,
        session: &SessionStore,
    ) -> Result<PasswordChangeOutcome, ValidationErrors> {
        self.validate().into_result()?;

        let outcome = session
            .change_password(&self.current_password, &self.new_password)
            .await;
        if outcome.success {
            *self = Self::default();
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApiClient;
    use crate::error::ApiError;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn form(current: &str, new: &str, confirm: &str) -> ChangePasswordForm {
        ChangePasswordForm {
            current_password: current.into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        }
    }

    #[tokio::test]
    async fn mismatch_is_caught_before_the_store() {
        let session = SessionStore::new(Arc::new(MockApiClient::new()), Arc::new(MemoryStore::new()));
        let mut form = form("old", "new-secret", "new-secre");

        let errors = form.submit(&session).await.unwrap_err();

        assert_eq!(errors.get("confirmPassword"), Some(PASSWORD_MISMATCH));
        assert_eq!(form.current_password, "old");
    }

    #[tokio::test]
    async fn accepted_change_clears_fields() {
        let mut mock = MockApiClient::new();
        mock.expect_change_password()
            .withf(|c| c.current_password == "old" && c.new_password == "new-secret")
            .times(1)
            .returning(|_| Ok(()));
        let session = SessionStore::new(Arc::new(mock), Arc::new(MemoryStore::new()));
        let mut form = form("old", "new-secret", "new-secret");

        let outcome = form.submit(&session).await.unwrap();

        assert!(outcome.success);
        assert_eq!(form, ChangePasswordForm::default());
    }

    #[tokio::test]
    async fn rejected_change_keeps_fields_and_sets_session_error() {
        let mut mock = MockApiClient::new();
        mock.expect_change_password()
            .returning(|_| Err(ApiError::status_error(400, "Current password is incorrect")));
        let session = SessionStore::new(Arc::new(mock), Arc::new(MemoryStore::new()));
        let mut form = form("wrong", "new-secret", "new-secret");

        let outcome = form.submit(&session).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(form.current_password, "wrong");
        assert_eq!(
            session.error().as_deref(),
            Some("Current password is incorrect")
        );
    }
}
