//! Error types for persistence operations.

use thiserror::Error;

use crate::constants::GENERIC_SAVE_ERROR;

/// Errors a persistence function can fail with.
#[derive(Error, Debug)]
pub enum PersistError {
    /// I/O error while writing the document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing store refused the write
    #[error("{0}")]
    Rejected(String),
}

impl PersistError {
    /// Create a rejection error with a message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Message recorded in the save session for this failure.
    ///
    /// Falls back to a generic message when the error renders as blank.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_SAVE_ERROR.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = PersistError::rejected("network down");
        assert_eq!(err.user_message(), "network down");
    }

    #[test]
    fn test_blank_message_falls_back() {
        let err = PersistError::rejected("   ");
        assert_eq!(err.user_message(), GENERIC_SAVE_ERROR);
    }

    #[test]
    fn test_io_error_is_prefixed() {
        let err = PersistError::from(std::io::Error::other("disk full"));
        assert_eq!(err.user_message(), "IO error: disk full");
    }
}
