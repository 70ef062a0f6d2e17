//! Request size limits.
//!
//! Both limits are enforced at the request boundary before any embedding
//! or oracle work is issued. Violations map to HTTP 413.

use thiserror::Error;

/// Maximum number of records accepted in one request.
pub const MAX_RECORDS_PER_REQUEST: usize = 100;

/// Maximum request body size in bytes (100 KiB).
pub const MAX_REQUEST_BODY_BYTES: usize = 100 * 1024;

/// Request-level size violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// The batch holds more records than [`MAX_RECORDS_PER_REQUEST`]
    #[error("too many records: {count} exceeds maximum of {max}")]
    TooManyRecords {
        /// Records in the rejected batch
        count: usize,
        /// The enforced maximum
        max: usize,
    },

    /// The request body exceeds [`MAX_REQUEST_BODY_BYTES`]
    #[error("request body of {size} bytes exceeds maximum of {max} bytes")]
    BodyTooLarge {
        /// Bytes in the rejected body
        size: usize,
        /// The enforced maximum
        max: usize,
    },
}

/// Reject batches over the record-count limit.
pub fn check_record_count(count: usize) -> Result<(), LimitError> {
    if count > MAX_RECORDS_PER_REQUEST {
        return Err(LimitError::TooManyRecords {
            count,
            max: MAX_RECORDS_PER_REQUEST,
        });
    }
    Ok(())
}

/// Reject bodies over the byte limit.
pub fn check_body_size(size: usize) -> Result<(), LimitError> {
    if size > MAX_REQUEST_BODY_BYTES {
        return Err(LimitError::BodyTooLarge {
            size,
            max: MAX_REQUEST_BODY_BYTES,
        });
    }
    Ok(())
}
