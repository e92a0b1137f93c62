//! Field rules shared by every form
//!
//! Each rule records at most one message per field path into a
//! `ValidationErrors`; the first failing rule for a field wins.

use crate::error::ValidationErrors;
use once_cell::sync::Lazy;
use regex::Regex;

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9.-]+(:\d+)?(/[^\s]*)?$").expect("URL pattern is valid")
});

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("year pattern is valid"));

/// Whether `value` is an absolute http(s) URL
#[inline]
#[must_use]
pub fn is_url(value: &str) -> bool {
    URL.is_match(value.trim())
}

/// Non-blank text
pub fn required(errors: &mut ValidationErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Non-blank text that parses as a URL
pub fn required_url(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    missing: &str,
    invalid: &str,
) {
    if value.trim().is_empty() {
        errors.add(field, missing);
    } else if !is_url(value) {
        errors.add(field, invalid);
    }
}

/// Blank, or a URL
pub fn optional_url(errors: &mut ValidationErrors, field: &str, value: &str, invalid: &str) {
    if !value.trim().is_empty() && !is_url(value) {
        errors.add(field, invalid);
    }
}

/// Four-digit year
pub fn year(errors: &mut ValidationErrors, field: &str, value: &str, missing: &str, invalid: &str) {
    if value.trim().is_empty() {
        errors.add(field, missing);
    } else if !YEAR.is_match(value.trim()) {
        errors.add(field, invalid);
    }
}

/// At least one element, and every element non-blank (`field.N`)
pub fn each_required(
    errors: &mut ValidationErrors,
    field: &str,
    items: &[String],
    item_message: &str,
    empty_message: &str,
) {
    if items.is_empty() {
        errors.add(field, empty_message);
        return;
    }
    for (index, item) in items.iter().enumerate() {
        if item.trim().is_empty() {
            errors.add(format!("{field}.{index}"), item_message);
        }
    }
}

/// Optional text as the wire's optional value
#[inline]
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_rule() {
        assert!(is_url("https://example.com/cert/1"));
        assert!(is_url("http://localhost:5000/uploads/a.png"));
        assert!(!is_url("example.com"));
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url("https://"));
    }

    #[test]
    fn required_url_distinguishes_missing_from_invalid() {
        let mut errors = ValidationErrors::new();
        required_url(&mut errors, "image", "", "Image URL is required", "Invalid URL");
        required_url(&mut errors, "link", "nope", "Link is required", "Invalid URL");
        assert_eq!(errors.get("image"), Some("Image URL is required"));
        assert_eq!(errors.get("link"), Some("Invalid URL"));
    }

    #[test]
    fn year_rule() {
        let mut errors = ValidationErrors::new();
        year(&mut errors, "a", "2024", "Required", "bad");
        year(&mut errors, "b", "24", "Required", "bad");
        year(&mut errors, "c", "", "Required", "bad");
        assert_eq!(errors.get("a"), None);
        assert_eq!(errors.get("b"), Some("bad"));
        assert_eq!(errors.get("c"), Some("Required"));
    }

    #[test]
    fn list_items_are_reported_by_index() {
        let mut errors = ValidationErrors::new();
        let items = vec!["Go".to_string(), " ".to_string()];
        each_required(&mut errors, "skills", &items, "Skill cannot be empty", "min");
        assert_eq!(errors.get("skills.1"), Some("Skill cannot be empty"));
        assert_eq!(errors.len(), 1);

        let mut errors = ValidationErrors::new();
        each_required(&mut errors, "skills", &[], "x", "At least one skill is required");
        assert_eq!(errors.get("skills"), Some("At least one skill is required"));
    }

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank(" 10.1/x "), Some("10.1/x".to_string()));
    }
}
