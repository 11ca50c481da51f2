//! Core types for the chat relay.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Milliseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        Timestamp(duration.as_millis() as i64)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique, time-ordered identifier for a message.
///
/// Backed by a UUIDv7, whose leading 48 bits are the creation time in
/// Unix milliseconds. Byte-wise ordering of ids therefore agrees with
/// creation order; two ids minted within the same millisecond may sort
/// either way, but carry equal timestamps at that granularity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Mint a new id whose embedded time matches `created_at`.
    pub fn generate(created_at: Timestamp) -> Self {
        let secs = (created_at.0 / 1000) as u64;
        let nanos = ((created_at.0 % 1000) as u32) * 1_000_000;
        let ts = uuid::Timestamp::from_unix(uuid::NoContext, secs, nanos);
        MessageId(Uuid::new_v7(ts))
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single posted message.
///
/// Immutable once constructed. The room log takes ownership on append
/// and hands out clones on reads, so no holder can mutate shared state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique, time-ordered identifier (assigned at construction).
    pub id: MessageId,

    /// When the message was posted.
    pub created_at: Timestamp,

    /// Display name of the poster. `None` renders as "Anonymous".
    pub author: Option<String>,

    /// Message body, stored verbatim.
    pub text: String,
}

impl ChatMessage {
    /// Create a new message.
    ///
    /// The id and timestamp come from a single clock reading, so id
    /// order and timestamp order agree.
    pub fn new(author: Option<String>, text: impl Into<String>) -> Self {
        let created_at = Timestamp::now();
        Self {
            id: MessageId::generate(created_at),
            created_at,
            author,
            text: text.into(),
        }
    }

    /// Reconstruct a message from already-assigned parts (test fixtures,
    /// external storage). The caller guarantees the id is ordered
    /// consistently with `created_at`.
    pub fn from_parts(
        id: MessageId,
        created_at: Timestamp,
        author: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            created_at,
            author,
            text: text.into(),
        }
    }

    /// Author display name, with the anonymous fallback.
    pub fn author_name(&self) -> &str {
        self.author.as_deref().unwrap_or("Anonymous")
    }
}

/// The line delivered to subscribers: `[<timestamp>] <author>: <text>`.
impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.created_at, self.author_name(), self.text)
    }
}
