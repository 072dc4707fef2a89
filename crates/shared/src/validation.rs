use crate::error::ValidationError;

pub const MIN_BODY_CHARS: usize = 10;
pub const MAX_BODY_CHARS: usize = 1000;

/// Checks a raw comment body and returns the trimmed text to submit.
///
/// Length is counted in `char`s after trimming surrounding whitespace.
pub fn validate_body(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let len = trimmed.chars().count();
    if len < MIN_BODY_CHARS {
        return Err(ValidationError::TooShort);
    }
    if len > MAX_BODY_CHARS {
        return Err(ValidationError::TooLong);
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_before_measuring() {
        assert_eq!(validate_body("   1234567890  \n").expect("valid"), "1234567890");
        assert_eq!(validate_body("  123456789  "), Err(ValidationError::TooShort));
    }

    #[test]
    fn rejects_whitespace_only_as_empty() {
        assert_eq!(validate_body(""), Err(ValidationError::Empty));
        assert_eq!(validate_body(" \t\n "), Err(ValidationError::Empty));
    }

    #[test]
    fn enforces_length_boundaries() {
        assert!(validate_body(&"a".repeat(10)).is_ok());
        assert_eq!(
            validate_body(&"a".repeat(9)),
            Err(ValidationError::TooShort)
        );
        assert!(validate_body(&"a".repeat(1000)).is_ok());
        assert_eq!(
            validate_body(&"a".repeat(1001)),
            Err(ValidationError::TooLong)
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        // ten two-byte characters
        assert!(validate_body(&"é".repeat(10)).is_ok());
        assert_eq!(
            validate_body(&"é".repeat(9)),
            Err(ValidationError::TooShort)
        );
    }
}
