//! Core types for Folio
//!
//! Defines the records the backend stores and the client edits:
//! - Timeline entries (education, experience)
//! - Skill categories, certificates, publications, projects
//! - The singleton hero section
//! - Users and authentication payloads
//!
//! Field names follow the backend's JSON (camelCase, `_id`). Every record
//! type is `#[serde(default)]` so partially populated server documents
//! still load; backend documents go through [`Entity::from_wire`], which
//! also tolerates nulls and an `id` key.

use crate::api::Resource;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::str::FromStr;

/// A record type stored in one backend collection
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection this record lives in
    const RESOURCE: Resource;

    /// Server-assigned identifier (empty for unsaved drafts)
    fn id(&self) -> &str;

    /// Decode a document as the backend sends it
    ///
    /// `_id` wins over `id` when both are present, and `id` alone is
    /// accepted. Null fields fall back to their defaults.
    fn from_wire(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Value::Object(map) = &mut value {
            if let Some(id) = map.remove("id") {
                map.entry("_id").or_insert(id);
            }
        }
        strip_nulls(&mut value);
        serde_json::from_value(value)
    }
}

/// Drop null object fields and null array items, recursively
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

/// Accept a year written as `"2023"` or `2023`
fn year_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Year::deserialize(deserializer)? {
        Year::Text(text) => text,
        Year::Number(number) => number.to_string(),
    })
}

macro_rules! impl_entity {
    ($ty:ty, $resource:expr) => {
        impl Entity for $ty {
            const RESOURCE: Resource = $resource;

            #[inline]
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

/// Education timeline entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub period: String,
    pub degree: String,
    pub institution: String,
    pub points: Vec<String>,
}

impl_entity!(Education, Resource::Education);

/// Work experience timeline entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub period: String,
    pub role: String,
    pub company: String,
    pub points: Vec<String>,
}

impl_entity!(Experience, Resource::Experience);

/// Skill category (e.g. "Languages" with its list of skills)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub icon: String,
    pub skills: Vec<String>,
}

impl_entity!(Skill, Resource::Skill);

/// Certificate or credential
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Certificate {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub issuer: String,
    pub date: String,
    pub credential_id: String,
    pub image: String,
    pub link: String,
    pub skills: Vec<String>,
}

impl_entity!(Certificate, Resource::Certificate);

/// Publication venue kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationType {
    #[default]
    Journal,
    Conference,
    Preprint,
}

/// Publication review status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublicationStatus {
    #[default]
    Published,
    Accepted,
    UnderReview,
}

/// Research publication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Publication {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    #[serde(deserialize_with = "year_text")]
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    pub keywords: Vec<String>,
    #[serde(rename = "type")]
    pub kind: PublicationType,
    pub status: PublicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl_entity!(Publication, Resource::Publication);

/// Project filter category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    All,
    #[default]
    Web,
    Aiml,
    Blockchain,
    Devops,
}

impl ProjectCategory {
    /// Every category, in display order
    pub const ALL: [ProjectCategory; 5] = [
        ProjectCategory::All,
        ProjectCategory::Web,
        ProjectCategory::Aiml,
        ProjectCategory::Blockchain,
        ProjectCategory::Devops,
    ];

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Projects",
            Self::Web => "Web Development",
            Self::Aiml => "AI / ML",
            Self::Blockchain => "Blockchain",
            Self::Devops => "Cloud & DevOps",
        }
    }
}

impl FromStr for ProjectCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "web" => Ok(Self::Web),
            "aiml" => Ok(Self::Aiml),
            "blockchain" => Ok(Self::Blockchain),
            "devops" => Ok(Self::Devops),
            other => Err(format!("unknown project category: {other}")),
        }
    }
}

/// Gallery image with caption
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectImage {
    pub url: String,
    pub subtitle: String,
}

/// Portfolio project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub images: Vec<ProjectImage>,
    pub categories: Vec<ProjectCategory>,
    pub technologies: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
}

impl_entity!(Project, Resource::Project);

/// Landing section of the public site; a singleton on the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroSection {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub primary_button_text: String,
    pub primary_button_link: String,
    pub secondary_button_text: String,
    pub secondary_button_link: String,
    pub typing_phrases: Vec<String>,
}

impl_entity!(HeroSection, Resource::HomeSection);

impl Default for HeroSection {
    /// Placeholder shown until the first fetch completes
    fn default() -> Self {
        let loading = || "Loading...".to_string();
        Self {
            id: String::new(),
            name: loading(),
            title: loading(),
            subtitle: loading(),
            description: loading(),
            primary_button_text: "View My Work".to_string(),
            primary_button_link: "#projects".to_string(),
            secondary_button_text: "Contact Me".to_string(),
            secondary_button_link: "#contact".to_string(),
            typing_phrases: vec!["Full Stack Developer".to_string()],
        }
    }
}

/// Authenticated dashboard user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Login request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[inline]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Login/register response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
