use regex::Regex;
use std::sync::OnceLock;

use super::{ApiError, PageQuery};
use crate::domain::Page;

pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("valid email regex")
    })
}

fn color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"))
}

/// Returns the email trimmed and lower-cased.
pub fn validate_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    if email.len() > 254 || !email_regex().is_match(&email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    if password.len() > 128 {
        return Err(ApiError::validation(
            "Password cannot exceed 128 characters",
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(ApiError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(ApiError::validation(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(
            "Password must contain at least one digit",
        ));
    }
    Ok(())
}

/// Trims and bounds a required name field.
pub fn validate_name(field: &str, value: &str, max: usize) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{field} cannot exceed {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank becomes `None`.
pub fn validate_optional_text(
    field: &str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ApiError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{field} cannot exceed {max} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

pub fn validate_color(color: &str) -> Result<String, ApiError> {
    if !color_regex().is_match(color) {
        return Err(ApiError::validation(
            "Color must be a valid hex color code (e.g., #3B82F6)",
        ));
    }
    Ok(color.to_string())
}

pub fn validate_page(query: PageQuery) -> Result<Page, ApiError> {
    if !(1..=Page::MAX_LIMIT).contains(&query.limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between 1 and {}",
            query.limit,
            Page::MAX_LIMIT
        )));
    }
    if query.skip > Page::MAX_SKIP {
        return Err(ApiError::validation(format!(
            "Invalid skip: {}. Skip must not exceed {}",
            query.skip,
            Page::MAX_SKIP
        )));
    }
    Ok(Page {
        skip: query.skip,
        limit: query.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Secret123").is_ok());
        assert!(validate_password("Sh0rt").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Name", "  Groceries ", 100).unwrap(), "Groceries");
        assert!(validate_name("Name", "   ", 100).is_err());
        assert!(validate_name("Name", &"a".repeat(101), 100).is_err());
    }

    #[test]
    fn test_validate_optional_text() {
        assert_eq!(validate_optional_text("Note", None, 500).unwrap(), None);
        assert_eq!(
            validate_optional_text("Note", Some("  ".to_string()), 500).unwrap(),
            None
        );
        assert!(validate_optional_text("Icon", Some("x".repeat(51)), 50).is_err());
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#3B82F6").is_ok());
        assert!(validate_color("#abcdef").is_ok());
        assert!(validate_color("3B82F6").is_err());
        assert!(validate_color("#3B82F").is_err());
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(PageQuery { skip: 0, limit: 1 }).is_ok());
        assert!(validate_page(PageQuery { skip: 5, limit: 1000 }).is_ok());
        assert!(validate_page(PageQuery { skip: 0, limit: 0 }).is_err());
        assert!(validate_page(PageQuery { skip: 0, limit: 1001 }).is_err());
    }

    #[test]
    fn test_validate_page_bounds_skip() {
        let max = PageQuery {
            skip: Page::MAX_SKIP,
            limit: 10,
        };
        assert!(validate_page(max).is_ok());

        let err = validate_page(PageQuery {
            skip: u64::MAX,
            limit: 10,
        })
        .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }
}
