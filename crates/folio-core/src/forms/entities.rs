//! Draft forms, one per collection entity
//!
//! A form holds the editable draft (list fields as `DynamicList`s), checks
//! it with the rules in `validation`, and produces the payload sent to
//! the backend. Field paths in errors use the wire names (`credentialId`,
//! `images.0.url`).

use super::dynamic_list::DynamicList;
use super::validation::{
    each_required, non_blank, optional_url, required, required_url, year,
};
use crate::error::ValidationErrors;
use crate::store::Stored;
use crate::types::{
    Certificate, Education, Experience, Project, ProjectCategory, ProjectImage, Publication,
    PublicationStatus, PublicationType, Skill,
};
use std::fmt::Debug;

/// Icons offered for skill categories
pub const SKILL_ICONS: [&str; 7] = [
    "Code",
    "Layout",
    "Server",
    "Database",
    "Cloud",
    "Smartphone",
    "Palette",
];

/// Editable draft of one entity type
pub trait EntityForm: Clone + Debug + Default + Send + Sync {
    /// Entity this form edits
    type Entity: Stored;

    /// Blank draft for a new record
    #[must_use]
    fn blank() -> Self {
        Self::default()
    }

    /// Draft pre-filled from an existing record
    fn from_entity(entity: &Self::Entity) -> Self;

    /// Every rule violation in the current draft
    fn validate(&self) -> ValidationErrors;

    /// Record to submit; blank list items are dropped and no identifier is set
    fn to_payload(&self) -> Self::Entity;
}

/// Education draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EducationForm {
    pub period: String,
    pub degree: String,
    pub institution: String,
    pub points: DynamicList<String>,
}

impl EntityForm for EducationForm {
    type Entity = Education;

    fn from_entity(entity: &Education) -> Self {
        Self {
            period: entity.period.clone(),
            degree: entity.degree.clone(),
            institution: entity.institution.clone(),
            points: DynamicList::from_items(entity.points.clone()),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "period", &self.period, "Period is required");
        required(&mut errors, "degree", &self.degree, "Degree is required");
        required(&mut errors, "institution", &self.institution, "Institution is required");
        each_required(
            &mut errors,
            "points",
            self.points.items(),
            "Point is required",
            "At least one point is required",
        );
        errors
    }

    fn to_payload(&self) -> Education {
        Education {
            id: String::new(),
            period: self.period.clone(),
            degree: self.degree.clone(),
            institution: self.institution.clone(),
            points: self.points.cleaned(),
        }
    }
}

/// Work experience draft; text fields are trimmed before checking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperienceForm {
    pub period: String,
    pub role: String,
    pub company: String,
    pub points: DynamicList<String>,
}

impl EntityForm for ExperienceForm {
    type Entity = Experience;

    fn from_entity(entity: &Experience) -> Self {
        Self {
            period: entity.period.clone(),
            role: entity.role.clone(),
            company: entity.company.clone(),
            points: DynamicList::from_items(entity.points.clone()),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "period", &self.period, "Period is required");
        required(&mut errors, "role", &self.role, "Role is required");
        required(&mut errors, "company", &self.company, "Company is required");
        each_required(
            &mut errors,
            "points",
            self.points.items(),
            "Point cannot be empty",
            "At least one point is required",
        );
        errors
    }

    fn to_payload(&self) -> Experience {
        Experience {
            id: String::new(),
            period: self.period.trim().to_string(),
            role: self.role.trim().to_string(),
            company: self.company.trim().to_string(),
            points: self
                .points
                .cleaned()
                .into_iter()
                .map(|p| p.trim().to_string())
                .collect(),
        }
    }
}

/// Skill category draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillForm {
    pub title: String,
    pub icon: String,
    pub skills: DynamicList<String>,
}

impl Default for SkillForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            icon: SKILL_ICONS[0].to_string(),
            skills: DynamicList::new(),
        }
    }
}

impl EntityForm for SkillForm {
    type Entity = Skill;

    fn from_entity(entity: &Skill) -> Self {
        Self {
            title: entity.title.clone(),
            icon: entity.icon.clone(),
            skills: DynamicList::from_items(entity.skills.clone()),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "title", &self.title, "Title is required");
        required(&mut errors, "icon", &self.icon, "Icon is required");
        each_required(
            &mut errors,
            "skills",
            self.skills.items(),
            "Skill cannot be empty",
            "At least one skill is required",
        );
        errors
    }

    fn to_payload(&self) -> Skill {
        Skill {
            id: String::new(),
            title: self.title.clone(),
            icon: self.icon.clone(),
            skills: self.skills.cleaned(),
        }
    }
}

/// Certificate draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateForm {
    pub title: String,
    pub issuer: String,
    pub date: String,
    pub credential_id: String,
    pub image: String,
    pub link: String,
    pub skills: DynamicList<String>,
}

impl EntityForm for CertificateForm {
    type Entity = Certificate;

    fn from_entity(entity: &Certificate) -> Self {
        Self {
            title: entity.title.clone(),
            issuer: entity.issuer.clone(),
            date: entity.date.clone(),
            credential_id: entity.credential_id.clone(),
            image: entity.image.clone(),
            link: entity.link.clone(),
            skills: DynamicList::from_items(entity.skills.clone()),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "title", &self.title, "Certificate title is required");
        required(&mut errors, "issuer", &self.issuer, "Issuer is required");
        required(&mut errors, "date", &self.date, "Date is required");
        required(
            &mut errors,
            "credentialId",
            &self.credential_id,
            "Credential ID is required",
        );
        required_url(&mut errors, "image", &self.image, "Image URL is required", "Invalid URL");
        required_url(
            &mut errors,
            "link",
            &self.link,
            "Certificate link is required",
            "Invalid URL",
        );
        each_required(
            &mut errors,
            "skills",
            self.skills.items(),
            "Skill cannot be empty",
            "At least one skill is required",
        );
        errors
    }

    fn to_payload(&self) -> Certificate {
        Certificate {
            id: String::new(),
            title: self.title.clone(),
            issuer: self.issuer.clone(),
            date: self.date.clone(),
            credential_id: self.credential_id.clone(),
            image: self.image.trim().to_string(),
            link: self.link.trim().to_string(),
            skills: self.skills.cleaned(),
        }
    }
}

/// Publication draft; `doi` and `link` are optional and blank means absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationForm {
    pub title: String,
    pub authors: DynamicList<String>,
    pub journal: String,
    pub year: String,
    pub doi: String,
    pub keywords: DynamicList<String>,
    pub kind: PublicationType,
    pub status: PublicationStatus,
    pub link: String,
}

impl EntityForm for PublicationForm {
    type Entity = Publication;

    fn from_entity(entity: &Publication) -> Self {
        Self {
            title: entity.title.clone(),
            authors: DynamicList::from_items(entity.authors.clone()),
            journal: entity.journal.clone(),
            year: entity.year.clone(),
            doi: entity.doi.clone().unwrap_or_default(),
            keywords: DynamicList::from_items(entity.keywords.clone()),
            kind: entity.kind,
            status: entity.status,
            link: entity.link.clone().unwrap_or_default(),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "title", &self.title, "Required");
        each_required(
            &mut errors,
            "authors",
            self.authors.items(),
            "Author name is required",
            "At least one author is required",
        );
        required(&mut errors, "journal", &self.journal, "Required");
        year(&mut errors, "year", &self.year, "Required", "Enter a valid 4-digit year");
        each_required(
            &mut errors,
            "keywords",
            self.keywords.items(),
            "Keyword is required",
            "At least one keyword is required",
        );
        optional_url(&mut errors, "link", &self.link, "Invalid URL");
        errors
    }

    fn to_payload(&self) -> Publication {
        Publication {
            id: String::new(),
            title: self.title.clone(),
            authors: self.authors.cleaned(),
            journal: self.journal.clone(),
            year: self.year.trim().to_string(),
            doi: non_blank(&self.doi),
            keywords: self.keywords.cleaned(),
            kind: self.kind,
            status: self.status,
            link: non_blank(&self.link),
        }
    }
}

/// Project draft
///
/// Gallery images are optional: an entirely blank entry is ignored, a
/// half-filled one must be completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub images: DynamicList<ProjectImage>,
    pub categories: Vec<ProjectCategory>,
    pub technologies: DynamicList<String>,
    pub live_url: String,
    pub github_url: String,
    pub featured: bool,
}

impl EntityForm for ProjectForm {
    type Entity = Project;

    fn from_entity(entity: &Project) -> Self {
        Self {
            title: entity.title.clone(),
            description: entity.description.clone(),
            overview: entity.overview.clone(),
            image: entity.image.clone(),
            images: DynamicList::from_items(entity.images.clone()),
            categories: entity.categories.clone(),
            technologies: DynamicList::from_items(entity.technologies.clone()),
            live_url: entity.live_url.clone().unwrap_or_default(),
            github_url: entity.github_url.clone().unwrap_or_default(),
            featured: entity.featured,
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "title", &self.title, "Title is required");
        required(&mut errors, "description", &self.description, "Description is required");
        required(&mut errors, "overview", &self.overview, "Overview is required");
        required_url(
            &mut errors,
            "image",
            &self.image,
            "Main image is required",
            "Must be a valid URL",
        );
        if self.categories.is_empty() {
            errors.add("categories", "Category is required");
        }
        each_required(
            &mut errors,
            "technologies",
            self.technologies.items(),
            "Technology is required",
            "At least one technology is required",
        );
        for (index, image) in self.images.items().iter().enumerate() {
            if image.url.trim().is_empty() && image.subtitle.trim().is_empty() {
                continue;
            }
            required_url(
                &mut errors,
                &format!("images.{index}.url"),
                &image.url,
                "Image URL is required",
                "Must be a valid URL",
            );
            required(
                &mut errors,
                &format!("images.{index}.subtitle"),
                &image.subtitle,
                "Subtitle is required",
            );
        }
        optional_url(&mut errors, "liveUrl", &self.live_url, "Must be a valid URL");
        optional_url(&mut errors, "githubUrl", &self.github_url, "Must be a valid URL");
        errors
    }

    fn to_payload(&self) -> Project {
        Project {
            id: String::new(),
            title: self.title.clone(),
            description: self.description.clone(),
            overview: self.overview.clone(),
            image: self.image.trim().to_string(),
            images: self.images.cleaned(),
            categories: self.categories.clone(),
            technologies: self.technologies.cleaned(),
            live_url: non_blank(&self.live_url),
            github_url: non_blank(&self.github_url),
            featured: self.featured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn blank_skill_form_reports_every_missing_field() {
        let mut form = SkillForm::blank();
        form.icon.clear();
        let errors = form.validate();
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("icon"), Some("Icon is required"));
        assert_eq!(errors.get("skills.0"), Some("Skill cannot be empty"));
    }

    #[test]
    fn skill_payload_matches_wire_shape() {
        let form = SkillForm {
            title: "Languages".into(),
            icon: "Code".into(),
            skills: DynamicList::from_items(vec!["Go".to_string(), "Rust".to_string()]),
        };
        assert!(form.validate().is_empty());
        assert_eq!(
            serde_json::to_value(form.to_payload()).unwrap(),
            json!({"title": "Languages", "icon": "Code", "skills": ["Go", "Rust"]})
        );
    }

    #[test]
    fn certificate_urls_are_checked() {
        let form = CertificateForm {
            title: "AWS SA".into(),
            issuer: "Amazon".into(),
            date: "2024".into(),
            credential_id: "ABC".into(),
            image: "not a url".into(),
            link: String::new(),
            skills: DynamicList::from_items(vec!["Cloud".to_string()]),
        };
        let errors = form.validate();
        assert_eq!(errors.get("image"), Some("Invalid URL"));
        assert_eq!(errors.get("link"), Some("Certificate link is required"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn publication_year_and_optionals() {
        let mut form = PublicationForm {
            title: "Paper".into(),
            authors: DynamicList::from_items(vec!["A. Author".to_string()]),
            journal: "J".into(),
            year: "24".into(),
            keywords: DynamicList::from_items(vec!["ml".to_string()]),
            ..PublicationForm::default()
        };
        assert_eq!(form.validate().get("year"), Some("Enter a valid 4-digit year"));

        form.year = "2024".into();
        assert!(form.validate().is_empty());
        let payload = form.to_payload();
        assert_eq!(payload.doi, None);
        assert_eq!(payload.link, None);
    }

    #[test]
    fn project_blank_gallery_entry_is_ignored_but_partial_is_not() {
        let mut form = ProjectForm {
            title: "Folio".into(),
            description: "d".into(),
            overview: "o".into(),
            image: "https://cdn.example.com/main.png".into(),
            categories: vec![ProjectCategory::Web],
            technologies: DynamicList::from_items(vec!["Rust".to_string()]),
            ..ProjectForm::default()
        };
        assert!(form.validate().is_empty());
        assert!(form.to_payload().images.is_empty());

        form.images.replace(
            0,
            ProjectImage {
                url: String::new(),
                subtitle: "Dashboard".into(),
            },
        );
        assert_eq!(
            form.validate().get("images.0.url"),
            Some("Image URL is required")
        );
    }

    #[test]
    fn project_needs_a_category() {
        let form = ProjectForm::default();
        assert_eq!(form.validate().get("categories"), Some("Category is required"));
    }

    #[test]
    fn experience_trims_text() {
        let form = ExperienceForm {
            period: " 2020 - 2023 ".into(),
            role: "Engineer ".into(),
            company: " Acme".into(),
            points: DynamicList::from_items(vec![" Shipped ".to_string()]),
        };
        let payload = form.to_payload();
        assert_eq!(payload.period, "2020 - 2023");
        assert_eq!(payload.points, vec!["Shipped".to_string()]);
    }

    #[test]
    fn from_entity_round_trips_editable_fields() {
        let education = Education {
            id: "e1".into(),
            period: "2016 - 2020".into(),
            degree: "BSc".into(),
            institution: "MIT".into(),
            points: vec![],
        };
        let form = EducationForm::from_entity(&education);
        assert_eq!(form.points.len(), 1);
        assert_eq!(
            form.validate().get("points.0"),
            Some("Point is required")
        );
        assert_eq!(form.to_payload().id, "");
    }
}
