//! Hero section editor

use super::dynamic_list::DynamicList;
use super::validation::required;
use crate::error::{FolioError, ValidationErrors};
use crate::store::HeroStore;
use crate::types::HeroSection;

/// Hero section draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeroForm {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub primary_button_text: String,
    pub primary_button_link: String,
    pub secondary_button_text: String,
    pub secondary_button_link: String,
    pub typing_phrases: DynamicList<String>,
}

impl HeroForm {
    /// Draft pre-filled from the current hero
    #[must_use]
    pub fn from_hero(hero: &HeroSection) -> Self {
        Self {
            name: hero.name.clone(),
            title: hero.title.clone(),
            subtitle: hero.subtitle.clone(),
            description: hero.description.clone(),
            primary_button_text: hero.primary_button_text.clone(),
            primary_button_link: hero.primary_button_link.clone(),
            secondary_button_text: hero.secondary_button_text.clone(),
            secondary_button_link: hero.secondary_button_link.clone(),
            typing_phrases: DynamicList::from_items(hero.typing_phrases.clone()),
        }
    }

    /// Every text field is required; blank phrases are dropped, not rejected
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let fields = [
            ("name", &self.name, "Name is required"),
            ("title", &self.title, "Title is required"),
            ("subtitle", &self.subtitle, "Subtitle is required"),
            ("description", &self.description, "Description is required"),
            ("primaryButtonText", &self.primary_button_text, "Button text is required"),
            ("primaryButtonLink", &self.primary_button_link, "Button link is required"),
            ("secondaryButtonText", &self.secondary_button_text, "Button text is required"),
            ("secondaryButtonLink", &self.secondary_button_link, "Button link is required"),
        ];
        for (field, value, message) in fields {
            required(&mut errors, field, value, message);
        }
        errors
    }

    /// Hero to submit, without identifier
    #[must_use]
    pub fn to_payload(&self) -> HeroSection {
        HeroSection {
            id: String::new(),
            name: self.name.clone(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            description: self.description.clone(),
            primary_button_text: self.primary_button_text.clone(),
            primary_button_link: self.primary_button_link.clone(),
            secondary_button_text: self.secondary_button_text.clone(),
            secondary_button_link: self.secondary_button_link.clone(),
            typing_phrases: self.typing_phrases.cleaned(),
        }
    }
}

/// Edit-in-place flow for the hero section
#[derive(Debug, Clone, Default)]
pub struct HeroEditor {
    draft: Option<HeroForm>,
}

impl HeroEditor {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Start editing from the store's current hero
    pub fn open(&mut self, store: &HeroStore) {
        self.draft = Some(HeroForm::from_hero(&store.current()));
    }

    /// Stop editing and discard changes
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    #[inline]
    #[must_use]
    pub fn draft(&self) -> Option<&HeroForm> {
        self.draft.as_ref()
    }

    #[inline]
    pub fn draft_mut(&mut self) -> Option<&mut HeroForm> {
        self.draft.as_mut()
    }

    /// Validate and PUT the draft; closes the editor on success
    pub async fn submit(&mut self, store: &HeroStore) -> Result<(), FolioError> {
        let Some(draft) = &self.draft else {
            return Err(FolioError::Unsupported("hero editor is not open".to_string()));
        };
        draft.validate().into_result()?;

        let payload = draft.to_payload();
        store.update(&payload).await?;
        self.draft = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockApiClient, Resource};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn phrase_can_be_added_only_when_none_is_blank() {
        let mut form = HeroForm::from_hero(&HeroSection::default());
        assert!(form.typing_phrases.push_blank());
        assert!(!form.typing_phrases.push_blank());
    }

    #[test]
    fn placeholder_hero_is_valid() {
        assert!(HeroForm::from_hero(&HeroSection::default()).validate().is_empty());
        let mut form = HeroForm::from_hero(&HeroSection::default());
        form.name.clear();
        assert_eq!(form.validate().get("name"), Some("Name is required"));
    }

    #[tokio::test]
    async fn submit_drops_blank_phrases_and_closes() {
        let mut mock = MockApiClient::new();
        mock.expect_update()
            .withf(|resource, id, payload| {
                *resource == Resource::HomeSection
                    && id.is_none()
                    && payload["typingPhrases"] == json!(["Engineer"])
            })
            .times(1)
            .returning(|_, _, payload| Ok(payload));
        let store = HeroStore::new(Arc::new(mock));
        let mut editor = HeroEditor::new();

        editor.open(&store);
        let draft = editor.draft_mut().unwrap();
        draft.typing_phrases = DynamicList::from_items(vec![
            "Engineer".to_string(),
            "   ".to_string(),
        ]);
        editor.submit(&store).await.unwrap();

        assert!(!editor.is_editing());
        assert_eq!(store.current().typing_phrases, vec!["Engineer".to_string()]);
    }

    #[tokio::test]
    async fn submit_when_closed_is_refused() {
        let store = HeroStore::new(Arc::new(MockApiClient::new()));
        assert!(HeroEditor::new().submit(&store).await.is_err());
    }
}
