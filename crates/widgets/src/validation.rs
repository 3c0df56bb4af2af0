//! Client-side form validation
//!
//! Runs before any network call; a failed validation never reaches the
//! store. Errors are per-field so hosts can render them inline.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern compiles")
});

/// Check an email address, ignoring surrounding whitespace
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// Form field that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Newsletter,
    Interview,
    Email,
}

impl Field {
    /// Field name for rendering
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Newsletter => "newsletter",
            Field::Interview => "interview",
            Field::Email => "email",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Required input is missing
    Required,
    /// Email does not parse
    InvalidEmail,
}

impl FieldError {
    /// Error name for rendering
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldError::Required => "required",
            FieldError::InvalidEmail => "invalid_email",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-field validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, FieldError>,
}

impl ValidationErrors {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field
    pub fn add(&mut self, field: Field, error: FieldError) {
        self.errors.insert(field, error);
    }

    /// Whether every field passed
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed fields
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The failure for one field, if any
    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    /// Iterate failures in field order
    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.errors.iter().map(|(field, error)| (*field, *error))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.errors {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        assert!(is_valid_email("someone@example.com"));
        assert!(is_valid_email("first.last@sub.example.co.uk"));
        assert!(is_valid_email("  padded@example.com  "));
        assert!(is_valid_email("user@[192.168.0.1]"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_errors_collect_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Email, FieldError::InvalidEmail);
        errors.add(Field::Newsletter, FieldError::Required);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::Email), Some(FieldError::InvalidEmail));
        assert_eq!(errors.get(Field::Interview), None);
    }

    #[test]
    fn test_display_lists_fields_in_order() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Email, FieldError::InvalidEmail);
        errors.add(Field::Newsletter, FieldError::Required);

        assert_eq!(
            errors.to_string(),
            "newsletter: required, email: invalid_email"
        );
    }
}
