//! Submission validation rules for posts.

use crate::error::CoreError;

/// Maximum title length, matching the column width.
pub const MAX_TITLE_LEN: usize = 50;

/// Price bounds, currency-denominated integer.
pub const MAX_PRICE: i32 = 99_999_999;

/// Accepted post kinds.
pub const VALID_KINDS: &[&str] = &["job", "service"];

/// Validate the user-supplied fields of a submission.
pub fn validate_submission(
    kind: &str,
    title: &str,
    description: &str,
    price: i32,
) -> Result<(), CoreError> {
    if !VALID_KINDS.contains(&kind) {
        return Err(CoreError::Validation(format!(
            "Invalid kind '{kind}'. Must be one of: {}",
            VALID_KINDS.join(", ")
        )));
    }
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must not exceed {MAX_TITLE_LEN} characters"
        )));
    }
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "Description must not be empty".to_string(),
        ));
    }
    if !(0..=MAX_PRICE).contains(&price) {
        return Err(CoreError::Validation(format!(
            "Price must be between 0 and {MAX_PRICE}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submissions_accepted() {
        assert!(validate_submission("job", "Driver wanted", "Night shifts", 15000).is_ok());
        assert!(validate_submission("service", "Cleaning", "Apartments and offices", 0).is_ok());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = validate_submission("banner", "t", "d", 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_and_oversized_fields_rejected() {
        assert!(validate_submission("job", "", "d", 0).is_err());
        assert!(validate_submission("job", "   ", "d", 0).is_err());
        assert!(validate_submission("job", &"x".repeat(51), "d", 0).is_err());
        assert!(validate_submission("job", "t", "", 0).is_err());
    }

    #[test]
    fn test_price_bounds() {
        assert!(validate_submission("job", "t", "d", -1).is_err());
        assert!(validate_submission("job", "t", "d", MAX_PRICE).is_ok());
        assert!(validate_submission("job", "t", "d", MAX_PRICE + 1).is_err());
    }
}
