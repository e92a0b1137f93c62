//! Application state stores
//!
//! Service objects constructed once at startup and shared by reference:
//! - `CollectionStore`: one entity collection kept in sync with the backend
//! - `HeroStore`: the singleton hero section
//! - `DataStore`: every collection plus the hero
//! - `SessionStore`: authenticated user and token lifecycle

mod collection;
mod data;
mod hero;
mod session;

pub use collection::{merge_fields, Collection, CollectionStore};
pub use data::{DataStore, Stored};
pub use hero::HeroStore;
pub use session::{PasswordChangeOutcome, Session, SessionStatus, SessionStore};
