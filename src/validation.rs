// validation.rs
//! Argument checks run before a request is built

use crate::error::SwimlaneError;

type Result<T> = std::result::Result<T, SwimlaneError>;

/// Reject empty or whitespace-only strings
pub fn validate_str(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SwimlaneError::Validation(format!("{} must be a non-empty string", name)));
    }
    Ok(())
}

/// Reject values that cannot be spliced into a URL path as a single segment
pub fn validate_id(value: &str, name: &str) -> Result<()> {
    validate_str(value, name)?;
    // Dot segments get resolved away when the path is joined
    let dot_segment = value == "." || value == "..";
    if dot_segment || value.chars().any(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace()) {
        return Err(SwimlaneError::Validation(format!("{} is not a valid id: {:?}", name, value)));
    }
    Ok(())
}

/// Reject an empty list or any element that is not a valid id
pub fn validate_str_list<S: AsRef<str>>(values: &[S], name: &str) -> Result<()> {
    if values.is_empty() {
        return Err(SwimlaneError::Validation(format!("{} must contain at least one value", name)));
    }
    for (i, value) in values.iter().enumerate() {
        validate_id(value.as_ref(), &format!("{}[{}]", name, i))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_str() {
        assert!(validate_str("hello", "message").is_ok());
        assert!(validate_str("", "message").is_err());
        assert!(validate_str("  \t", "message").is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("aBcD1234", "app_id").is_ok());
        assert!(validate_id("a/b", "app_id").is_err());
        assert!(validate_id("a?x=1", "app_id").is_err());
        assert!(validate_id("a b", "app_id").is_err());
        assert!(validate_id("..", "app_id").is_err());
        assert!(validate_id(".", "app_id").is_err());
        assert!(validate_id("a%2Fb", "app_id").is_err());
        assert!(validate_id("a\\b", "app_id").is_err());
        assert!(validate_id("a.b", "app_id").is_ok());

        let err = validate_id("", "record_id").unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: record_id must be a non-empty string");
    }

    #[test]
    fn test_validate_str_list() {
        assert!(validate_str_list(&["a1", "b2"], "target_record_ids").is_ok());
        assert!(validate_str_list::<&str>(&[], "target_record_ids").is_err());

        let err = validate_str_list(&["a1", ""], "target_record_ids").unwrap_err();
        assert!(err.to_string().contains("target_record_ids[1]"));
    }
}
