//! Add/edit lifecycle shared by every collection form

use super::entities::EntityForm;
use crate::error::{FolioError, ValidationErrors};
use crate::store::CollectionStore;
use crate::types::Entity;
use std::collections::BTreeSet;

/// What the form is doing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Closed,
    Adding,
    /// Editing the record with this identifier
    Editing(String),
}

/// Drives one entity form: open, edit, validate, submit
///
/// Validation blocks submission: an invalid draft never reaches the
/// network. A failed submission keeps the form open with the draft intact;
/// a successful one closes and resets it.
#[derive(Debug, Clone, Default)]
pub struct FormManager<F> {
    mode: FormMode,
    draft: F,
    touched: BTreeSet<String>,
    submitted: bool,
}

impl<F: EntityForm> FormManager<F> {
    /// Closed form with a blank draft
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    /// Start a new record from a blank draft
    pub fn open_new(&mut self) {
        self.reset();
        self.mode = FormMode::Adding;
    }

    /// Start editing an existing record
    pub fn open_edit(&mut self, entity: &F::Entity) {
        self.reset();
        self.draft = F::from_entity(entity);
        self.mode = FormMode::Editing(entity.id().to_string());
    }

    /// Close and discard the draft
    pub fn cancel(&mut self) {
        self.reset();
    }

    #[inline]
    #[must_use]
    pub fn draft(&self) -> &F {
        &self.draft
    }

    #[inline]
    pub fn draft_mut(&mut self) -> &mut F {
        &mut self.draft
    }

    /// Mark a field as visited (`title`, `skills`, `images.0.url`)
    pub fn touch(&mut self, field: impl Into<String>) {
        self.touched.insert(field.into());
    }

    /// Mark every field as visited, as a submit attempt does
    pub fn touch_all(&mut self) {
        self.submitted = true;
    }

    /// Current rule violations
    #[must_use]
    pub fn errors(&self) -> ValidationErrors {
        self.draft.validate()
    }

    /// Error to show next to `field`, once the field has been touched
    ///
    /// Touching a list field (`skills`) reveals its element errors too.
    #[must_use]
    pub fn visible_error(&self, field: &str) -> Option<String> {
        let root = field.split('.').next().unwrap_or(field);
        let touched = self.submitted || self.touched.contains(field) || self.touched.contains(root);
        if !touched {
            return None;
        }
        self.draft.validate().get(field).map(str::to_string)
    }

    /// Validate, then create or update through `store`
    pub async fn submit(&mut self, store: &CollectionStore<F::Entity>) -> Result<(), FolioError> {
        let mode = self.mode.clone();
        if mode == FormMode::Closed {
            return Err(FolioError::Unsupported("no form is open".to_string()));
        }

        let errors = self.draft.validate();
        if !errors.is_empty() {
            self.touch_all();
            tracing::debug!(fields = errors.len(), "draft rejected by validation");
            return Err(errors.into());
        }

        let payload = self.draft.to_payload();
        match mode {
            FormMode::Adding => {
                store.add(&payload).await?;
            }
            FormMode::Editing(id) => store.update(&id, &payload).await?,
            FormMode::Closed => {}
        }
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.mode = FormMode::Closed;
        self.draft = F::blank();
        self.touched.clear();
        self.submitted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockApiClient, Resource};
    use crate::error::ApiError;
    use crate::forms::{CertificateForm, SkillForm};
    use crate::types::{Certificate, Skill};
    use mockall::predicate::{always, eq};
    use serde_json::json;
    use std::sync::Arc;

    fn fill_skill(manager: &mut FormManager<SkillForm>) {
        let draft = manager.draft_mut();
        draft.title = "Languages".into();
        draft.icon = "Code".into();
        draft.skills.set(0, "Go");
        draft.skills.push_blank();
        draft.skills.set(1, "Rust");
    }

    #[tokio::test]
    async fn valid_skill_is_created_once_with_exact_payload() {
        let mut mock = MockApiClient::new();
        mock.expect_create()
            .with(
                eq(Resource::Skill),
                eq(json!({"title": "Languages", "icon": "Code", "skills": ["Go", "Rust"]})),
            )
            .times(1)
            .returning(|_, payload| {
                let mut record = payload;
                record["_id"] = json!("s1");
                Ok(record)
            });
        let store = CollectionStore::<Skill>::new(Arc::new(mock));
        let mut manager = FormManager::<SkillForm>::new();

        manager.open_new();
        fill_skill(&mut manager);
        manager.submit(&store).await.unwrap();

        assert!(!manager.is_open());
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].skills, vec!["Go", "Rust"]);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_network() {
        let store = CollectionStore::<Certificate>::new(Arc::new(MockApiClient::new()));
        let mut manager = FormManager::<CertificateForm>::new();
        manager.open_new();
        manager.draft_mut().issuer = "Amazon".into();

        assert_eq!(manager.visible_error("title"), None);
        let err = manager.submit(&store).await.unwrap_err();

        assert!(err.is_validation());
        assert!(manager.is_open());
        assert_eq!(manager.draft().issuer, "Amazon");
        assert_eq!(
            manager.visible_error("title").as_deref(),
            Some("Certificate title is required")
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn backend_rejection_keeps_form_open() {
        let mut mock = MockApiClient::new();
        mock.expect_create()
            .returning(|_, _| Err(ApiError::status_error(400, "Duplicate title")));
        let store = CollectionStore::<Skill>::new(Arc::new(mock));
        let mut manager = FormManager::<SkillForm>::new();

        manager.open_new();
        fill_skill(&mut manager);
        let err = manager.submit(&store).await.unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(manager.mode(), &FormMode::Adding);
        assert_eq!(manager.draft().title, "Languages");
    }

    #[tokio::test]
    async fn editing_updates_by_id() {
        let mut mock = MockApiClient::new();
        mock.expect_update()
            .with(eq(Resource::Skill), eq(Some("s1".to_string())), always())
            .times(1)
            .returning(|_, _, payload| Ok(payload));
        let store = CollectionStore::<Skill>::new(Arc::new(mock));
        let existing = Skill {
            id: "s1".into(),
            title: "Langs".into(),
            icon: "Code".into(),
            skills: vec!["Go".into()],
        };
        let mut manager = FormManager::<SkillForm>::new();

        manager.open_edit(&existing);
        assert_eq!(manager.mode(), &FormMode::Editing("s1".into()));
        manager.draft_mut().title = "Languages".into();
        manager.submit(&store).await.unwrap();

        assert_eq!(manager.mode(), &FormMode::Closed);
    }

    #[test]
    fn touching_a_list_reveals_item_errors() {
        let mut manager = FormManager::<SkillForm>::new();
        manager.open_new();
        assert_eq!(manager.visible_error("skills.0"), None);

        manager.touch("skills");
        assert_eq!(
            manager.visible_error("skills.0").as_deref(),
            Some("Skill cannot be empty")
        );
    }

    #[test]
    fn cancel_discards_draft() {
        let mut manager = FormManager::<SkillForm>::new();
        manager.open_new();
        manager.draft_mut().title = "Tools".into();
        manager.cancel();
        assert!(!manager.is_open());
        assert_eq!(manager.draft(), &SkillForm::default());
    }
}
