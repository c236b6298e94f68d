use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Input validation utilities for tts-service

// Hardcoded pattern, always valid
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

/// Validate email format (RFC 5322 simplified)
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// validator crate compatible custom validator for email shape
pub fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    if validate_email(email.trim()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_email");
        err.message = Some("Email address is not valid".into());
        Err(err)
    }
}

/// Canonical form used for storage and lookup: trimmed, lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.user+tag@sub.example.co.uk"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!validate_email(""));
        assert!(!validate_email("no-at-sign.example.com"));
        assert!(!validate_email("user@localhost"));
        assert!(!validate_email("user @example.com"));
    }

    #[test]
    fn test_shape_validator_tolerates_padding() {
        assert!(validate_email_shape("  user@example.com ").is_ok());
        assert!(validate_email_shape("nope").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
