//! HTTP handlers, one module per resource. Each handler carries its `utoipa::path`
//! annotation; the paths are aggregated into `ApiDoc` in `lib.rs`.

use std::sync::LazyLock;

use axum::Json;
use regex::Regex;
use serde_json::{Value, json};

use crate::error::AppError;

pub mod admin;
pub mod auth;
pub mod certifications;
pub mod courses;
pub mod evaluation;
pub mod exams;
pub mod feedback;
pub mod fields;
pub mod majors;
pub mod news;
pub mod roadmaps;
pub mod users;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern is valid")
});

// Local mobile numbers: "05" followed by eight digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^05\d{8}$").expect("phone pattern is valid"));

pub const MIN_PASSWORD_LEN: usize = 6;

/// Rejects blank values, returning the trimmed text otherwise.
pub(crate) fn require_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_name(value: &str, field: &str) -> Result<String, AppError> {
    let name = require_text(value, field)?;
    let len = name.chars().count();
    if !(2..=50).contains(&len) {
        return Err(AppError::validation(format!(
            "{field} must be between 2 and 50 characters"
        )));
    }
    Ok(name)
}

pub(crate) fn validate_email(value: &str) -> Result<String, AppError> {
    let email = value.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::validation("Email should be valid"));
    }
    Ok(email.to_string())
}

pub(crate) fn validate_phone(value: &str) -> Result<String, AppError> {
    let phone = value.trim();
    if !PHONE_RE.is_match(phone) {
        return Err(AppError::validation(
            "Phone number must start with 05 and contain 10 digits",
        ));
    }
    Ok(phone.to_string())
}

pub(crate) fn validate_new_password(password: &str, confirmation: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirmation {
        return Err(AppError::validation("Passwords do not match"));
    }
    Ok(())
}

/// Keeps `current` when the incoming value is blank.
pub(crate) fn non_blank_or(incoming: &str, current: &str) -> String {
    let trimmed = incoming.trim();
    if trimmed.is_empty() {
        current.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Confirmation body returned by the catalog delete endpoints.
pub(crate) fn deleted(what: &str) -> Json<Value> {
    Json(json!({ "message": format!("{what} deleted successfully.") }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers_follow_the_local_format() {
        assert!(validate_phone("0591234567").is_ok());
        assert!(validate_phone("0691234567").is_err());
        assert!(validate_phone("059123456").is_err());
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(validate_name("  Sara ", "First name").unwrap(), "Sara");
        assert!(validate_name("S", "First name").is_err());
        assert!(validate_name(&"x".repeat(51), "First name").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_new_password("secret1", "secret1").is_ok());
        assert!(validate_new_password("short", "short").is_err());
        assert!(validate_new_password("secret1", "secret2").is_err());
    }

    #[test]
    fn blank_values_keep_the_stored_one() {
        assert_eq!(non_blank_or("  ", "kept"), "kept");
        assert_eq!(non_blank_or("new", "kept"), "new");
    }
}
