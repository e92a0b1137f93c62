//! Singleton hero section

use super::collection::{merge_fields, LoadingGuard};
use crate::api::{ApiClient, Resource};
use crate::error::{ApiError, FolioError};
use crate::types::{Entity, HeroSection};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Default)]
struct HeroState {
    hero: HeroSection,
    loading: bool,
}

/// Hero section store; no add or remove, the record always exists
pub struct HeroStore {
    client: Arc<dyn ApiClient>,
    state: RwLock<HeroState>,
}

impl fmt::Debug for HeroStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeroStore")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl HeroStore {
    /// Create store holding the placeholder hero
    #[inline]
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self {
            client,
            state: RwLock::new(HeroState::default()),
        }
    }

    /// Current hero section
    #[must_use]
    pub fn current(&self) -> HeroSection {
        self.state.read().hero.clone()
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Load the hero section; failures and empty answers keep the current one
    pub async fn fetch(&self) {
        let set_loading = |loading: bool| self.state.write().loading = loading;
        let _loading = LoadingGuard::start(&set_loading);

        let fetched = self
            .client
            .read(Resource::HomeSection, None)
            .await
            .and_then(|value| match value {
                Value::Object(ref map) if map.is_empty() => Ok(None),
                Value::Null => Ok(None),
                other => HeroSection::from_wire(other)
                    .map(Some)
                    .map_err(ApiError::from),
            });

        match fetched {
            Ok(Some(hero)) => self.state.write().hero = hero,
            Ok(None) => tracing::debug!("hero section empty; keeping current"),
            Err(e) => tracing::error!(error = %e, "failed to fetch hero section"),
        }
    }

    /// Update the hero section (PUT to the bare collection endpoint)
    pub async fn update<P>(&self, patch: &P) -> Result<(), FolioError>
    where
        P: Serialize + ?Sized + Sync,
    {
        let payload = serde_json::to_value(patch).map_err(ApiError::from)?;
        let returned = self
            .client
            .update(Resource::HomeSection, None, payload)
            .await?;

        let mut state = self.state.write();
        let merged = merge_fields(&state.hero, &returned).map_err(ApiError::from)?;
        state.hero = merged;
        tracing::info!("hero section updated");
        Ok(())
    }
}
