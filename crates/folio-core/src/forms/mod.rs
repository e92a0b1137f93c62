//! Form managers for the admin dashboard
//!
//! Drafts are transient and never persisted. Every form validates locally
//! before anything is sent; list fields use `DynamicList` so the
//! "fill the last entry before adding another" rule lives in one place.

mod dynamic_list;
mod entities;
mod hero;
mod manager;
mod password;
pub mod validation;

pub use dynamic_list::{DynamicList, ListItem};
pub use entities::{
    CertificateForm, EducationForm, EntityForm, ExperienceForm, ProjectForm, PublicationForm,
    SkillForm, SKILL_ICONS,
};
pub use hero::{HeroEditor, HeroForm};
pub use manager::{FormManager, FormMode};
pub use password::{ChangePasswordForm, PASSWORD_MISMATCH};
