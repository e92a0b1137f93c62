//! All portfolio content, one store per entity type

use super::collection::CollectionStore;
use super::hero::HeroStore;
use crate::api::{ApiClient, Resource};
use crate::error::FolioError;
use crate::types::{Certificate, Education, Entity, Experience, Project, Publication, Skill};
use serde::Serialize;
use std::sync::Arc;

/// Entity types with a collection in `DataStore`
pub trait Stored: Entity {
    /// The store holding this entity type
    fn collection(data: &DataStore) -> &CollectionStore<Self>;
}

macro_rules! impl_stored {
    ($ty:ty, $field:ident) => {
        impl Stored for $ty {
            #[inline]
            fn collection(data: &DataStore) -> &CollectionStore<Self> {
                &data.$field
            }
        }
    };
}

/// Content store for the whole site
#[derive(Debug)]
pub struct DataStore {
    pub education: CollectionStore<Education>,
    pub experience: CollectionStore<Experience>,
    pub skills: CollectionStore<Skill>,
    pub certificates: CollectionStore<Certificate>,
    pub publications: CollectionStore<Publication>,
    pub projects: CollectionStore<Project>,
    pub hero: HeroStore,
}

impl_stored!(Education, education);
impl_stored!(Experience, experience);
impl_stored!(Skill, skills);
impl_stored!(Certificate, certificates);
impl_stored!(Publication, publications);
impl_stored!(Project, projects);

impl DataStore {
    /// Create empty stores sharing one client
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self {
            education: CollectionStore::new(client.clone()),
            experience: CollectionStore::new(client.clone()),
            skills: CollectionStore::new(client.clone()),
            certificates: CollectionStore::new(client.clone()),
            publications: CollectionStore::new(client.clone()),
            projects: CollectionStore::new(client.clone()),
            hero: HeroStore::new(client),
        }
    }

    /// Typed access to one collection
    #[inline]
    #[must_use]
    pub fn collection<T: Stored>(&self) -> &CollectionStore<T> {
        T::collection(self)
    }

    /// Fetch every collection concurrently; individual failures are swallowed
    pub async fn fetch_all_data(&self) {
        tokio::join!(
            self.education.fetch_all(),
            self.experience.fetch_all(),
            self.skills.fetch_all(),
            self.certificates.fetch_all(),
            self.publications.fetch_all(),
            self.projects.fetch_all(),
            self.hero.fetch(),
        );
        tracing::info!("content refreshed");
    }

    /// Whether `resource` has a fetch in flight
    #[must_use]
    pub fn is_loading(&self, resource: Resource) -> bool {
        match resource {
            Resource::Education => self.education.is_loading(),
            Resource::Experience => self.experience.is_loading(),
            Resource::Skill => self.skills.is_loading(),
            Resource::Certificate => self.certificates.is_loading(),
            Resource::Publication => self.publications.is_loading(),
            Resource::Project => self.projects.is_loading(),
            Resource::HomeSection => self.hero.is_loading(),
        }
    }

    /// Record count per resource (the hero always counts as one)
    #[must_use]
    pub fn count(&self, resource: Resource) -> usize {
        match resource {
            Resource::Education => self.education.len(),
            Resource::Experience => self.experience.len(),
            Resource::Skill => self.skills.len(),
            Resource::Certificate => self.certificates.len(),
            Resource::Publication => self.publications.len(),
            Resource::Project => self.projects.len(),
            Resource::HomeSection => 1,
        }
    }

    /// Create a record in its collection
    pub async fn add<T: Stored>(&self, draft: &T) -> Result<T, FolioError> {
        self.collection::<T>().add(draft).await
    }

    /// Update a record in its collection
    pub async fn update<T: Stored, P>(&self, id: &str, patch: &P) -> Result<(), FolioError>
    where
        P: Serialize + ?Sized + Sync,
    {
        self.collection::<T>().update(id, patch).await
    }

    /// Delete a record by resource name, for callers that only hold a `Resource`
    pub async fn remove(&self, resource: Resource, id: &str) -> Result<(), FolioError> {
        match resource {
            Resource::Education => self.education.remove(id).await,
            Resource::Experience => self.experience.remove(id).await,
            Resource::Skill => self.skills.remove(id).await,
            Resource::Certificate => self.certificates.remove(id).await,
            Resource::Publication => self.publications.remove(id).await,
            Resource::Project => self.projects.remove(id).await,
            Resource::HomeSection => Err(FolioError::Unsupported(
                "the hero section cannot be deleted".to_string(),
            )),
        }
    }
}
