//! Error types for the chat relay.

use crate::types::MessageId;
use thiserror::Error;

/// Main error type for relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// An appended message reused an id already present in the log.
    /// Ids come from a time-ordered generator, so a collision is a
    /// caller bug, never a normal runtime condition.
    #[error("Duplicate message id: {0}")]
    DuplicateMessageId(MessageId),
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
