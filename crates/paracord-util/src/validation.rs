use thiserror::Error;

pub const MAX_MESSAGE_LENGTH: usize = 2000;
pub const MIN_BULK_DELETE: usize = 2;
pub const MAX_BULK_DELETE: usize = 100;
pub const MAX_FETCH_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message content is too long (max {max}, got {got})")]
    ContentTooLong { max: usize, got: usize },
    #[error("bulk delete needs at least {min} messages (got {got})")]
    TooFewMessages { min: usize, got: usize },
    #[error("bulk delete accepts at most {max} messages (got {count})")]
    TooManyMessages { max: usize, count: usize },
    #[error("fetch limit is too high (max {max}, got {got})")]
    LimitTooHigh { max: u32, got: u32 },
}

/// Content length is counted in characters, not bytes.
pub fn validate_message_content(content: &str) -> Result<(), ValidationError> {
    let len = content.chars().count();
    if len > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::ContentTooLong {
            max: MAX_MESSAGE_LENGTH,
            got: len,
        });
    }
    Ok(())
}

/// Only the lower bound. The upper bound is policy-dependent, see
/// [`validate_bulk_delete_max`].
pub fn validate_bulk_delete_min(count: usize) -> Result<(), ValidationError> {
    if count < MIN_BULK_DELETE {
        return Err(ValidationError::TooFewMessages {
            min: MIN_BULK_DELETE,
            got: count,
        });
    }
    Ok(())
}

pub fn validate_bulk_delete_max(count: usize) -> Result<(), ValidationError> {
    if count > MAX_BULK_DELETE {
        return Err(ValidationError::TooManyMessages {
            max: MAX_BULK_DELETE,
            count,
        });
    }
    Ok(())
}

pub fn validate_fetch_limit(limit: Option<u32>) -> Result<(), ValidationError> {
    match limit {
        Some(got) if got > MAX_FETCH_LIMIT => Err(ValidationError::LimitTooHigh {
            max: MAX_FETCH_LIMIT,
            got,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_at_limit_is_accepted() {
        assert!(validate_message_content(&"a".repeat(2000)).is_ok());
        assert!(validate_message_content("").is_ok());
    }

    #[test]
    fn content_over_limit_is_rejected() {
        assert_eq!(
            validate_message_content(&"a".repeat(2001)),
            Err(ValidationError::ContentTooLong { max: 2000, got: 2001 })
        );
    }

    #[test]
    fn content_counts_chars_not_bytes() {
        assert!(validate_message_content(&"é".repeat(2000)).is_ok());
    }

    #[test]
    fn bulk_delete_bounds() {
        assert!(validate_bulk_delete_min(1).is_err());
        assert!(validate_bulk_delete_min(2).is_ok());
        assert!(validate_bulk_delete_max(100).is_ok());
        assert_eq!(
            validate_bulk_delete_max(150),
            Err(ValidationError::TooManyMessages { max: 100, count: 150 })
        );
    }

    #[test]
    fn fetch_limit() {
        assert!(validate_fetch_limit(None).is_ok());
        assert!(validate_fetch_limit(Some(100)).is_ok());
        assert!(validate_fetch_limit(Some(101)).is_err());
    }
}
