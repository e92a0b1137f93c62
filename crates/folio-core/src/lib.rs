//! Folio Core - portfolio content client
//!
//! The engine behind the portfolio site and its admin dashboard:
//! - Persists the visual preference (light/dark mode, accent scheme)
//! - Talks to the namespaced REST backend through one generic resource client
//! - Keeps per-entity collections in sync after every remote write
//! - Tracks the authenticated session and the token lifecycle
//! - Validates entity drafts before anything reaches the network
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FolioConfig::new().with_base_url("https://api.example.com");
//! let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
//! let http = HttpApiClient::new(&config, storage.clone())?;
//! let client = Arc::new(NotifyingClient::new(Arc::new(http), Arc::new(TracingNotifier)));
//!
//! let data = DataStore::new(client.clone());
//! data.fetch_all_data().await;
//! println!("{} projects", data.projects.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod notify;
pub mod preference;
pub mod routes;
pub mod storage;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use api::{
    ApiClient, HttpApiClient, NotifyingClient, PasswordChange, Registration, Resource, UploadFile,
};
pub use config::{FolioConfig, UploadField};
pub use error::{ApiError, ConfigError, FolioError, StorageError, ValidationErrors};
pub use forms::{
    CertificateForm, ChangePasswordForm, DynamicList, EducationForm, EntityForm, ExperienceForm,
    FormManager, FormMode, HeroEditor, HeroForm, ProjectForm, PublicationForm, SkillForm,
};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use preference::{tokens_for, Accent, AccentTokens, Preference, PreferenceStore, ThemeMode};
pub use routes::Route;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{
    Collection, CollectionStore, DataStore, HeroStore, PasswordChangeOutcome, Session,
    SessionStatus, SessionStore, Stored,
};
pub use types::{
    AuthResponse, Certificate, Credentials, Education, Entity, Experience, HeroSection, Project,
    ProjectCategory, ProjectImage, Publication, PublicationStatus, PublicationType, Skill, User,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Folio Core
    pub use crate::{
        Accent, ApiClient, DataStore, FolioConfig, FolioError, HttpApiClient, KeyValueStore,
        MemoryStore, NotifyingClient, PreferenceStore, Resource, SessionStore, ThemeMode,
        TracingNotifier,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
