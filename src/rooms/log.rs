//! Time-ordered message log for a single room.

use crate::error::{RelayError, Result};
use crate::types::{ChatMessage, MessageId, Timestamp};
use parking_lot::RwLock;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Thread-safe, time-ordered store of messages for one room.
///
/// Messages are keyed by id, and ids are time-ordered, so iteration
/// always yields creation order. Readers take the lock shared and
/// receive snapshot copies: a returned batch is a consistent,
/// fully-formed sequence that later appends and trims never touch.
pub struct ChatRoomLog {
    /// Messages sorted by id, i.e. ascending creation order.
    messages: RwLock<BTreeMap<MessageId, ChatMessage>>,
}

impl ChatRoomLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(BTreeMap::new()),
        }
    }

    /// Append a message to the log.
    ///
    /// Fails on an id collision; ids are unique by construction, so
    /// this signals a programming error rather than a runtime state.
    pub fn append(&self, message: ChatMessage) -> Result<()> {
        let mut messages = self.messages.write();
        match messages.entry(message.id) {
            Entry::Occupied(_) => Err(RelayError::DuplicateMessageId(message.id)),
            Entry::Vacant(slot) => {
                slot.insert(message);
                Ok(())
            }
        }
    }

    /// Messages with `created_at >= since`, oldest first, as snapshot
    /// copies.
    ///
    /// This filters the full ordered sequence rather than seeking: ids
    /// minted within the same millisecond share a timestamp, so there
    /// is no safe binary-search cut. An empty result is the normal
    /// steady state for a quiet room.
    pub fn read_since(&self, since: Timestamp) -> Vec<ChatMessage> {
        let messages = self.messages.read();
        messages
            .values()
            .filter(|m| m.created_at >= since)
            .cloned()
            .collect()
    }

    /// Every message in the log, oldest first, as snapshot copies.
    pub fn read_all(&self) -> Vec<ChatMessage> {
        self.messages.read().values().cloned().collect()
    }

    /// Number of messages currently held.
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    /// Whether the log holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Remove old messages by age and/or count. Returns how many were
    /// removed.
    ///
    /// `cutoff` removes every message with `created_at < cutoff`;
    /// `max_to_keep` keeps only the newest N, with `0` keeping nothing.
    /// Both criteria only ever remove an oldest-first prefix, so
    /// applying them together is order-independent. Passing neither is
    /// a no-op. Snapshots already returned by reads are unaffected.
    pub fn trim(&self, cutoff: Option<Timestamp>, max_to_keep: Option<usize>) -> usize {
        let mut messages = self.messages.write();
        let before = messages.len();

        if let Some(cutoff) = cutoff {
            // Creation order means the expired set is a prefix: stop at
            // the first message that survives the cutoff.
            let expired: Vec<MessageId> = messages
                .values()
                .take_while(|m| m.created_at < cutoff)
                .map(|m| m.id)
                .collect();
            for id in expired {
                messages.remove(&id);
            }
        }

        if let Some(max) = max_to_keep {
            if messages.len() > max {
                let excess = messages.len() - max;
                let oldest: Vec<MessageId> = messages.keys().take(excess).copied().collect();
                for id in oldest {
                    messages.remove(&id);
                }
            }
        }

        let removed = before - messages.len();
        if removed > 0 {
            debug!(removed, remaining = messages.len(), "trimmed room log");
        }
        removed
    }
}

impl Default for ChatRoomLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_at(millis: i64, text: &str) -> ChatMessage {
        let ts = Timestamp(millis);
        ChatMessage::from_parts(MessageId::generate(ts), ts, None, text)
    }

    fn texts(messages: &[ChatMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn test_append_keeps_creation_order() {
        let log = ChatRoomLog::new();
        for (ts, text) in [(300, "third"), (100, "first"), (200, "second")] {
            log.append(message_at(ts, text)).unwrap();
        }

        assert_eq!(texts(&log.read_all()), vec!["first", "second", "third"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_append_rejects_duplicate_id() {
        let log = ChatRoomLog::new();
        let msg = message_at(100, "hello");
        log.append(msg.clone()).unwrap();

        let err = log.append(msg).unwrap_err();
        assert!(matches!(err, RelayError::DuplicateMessageId(_)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_read_since_is_inclusive() {
        let log = ChatRoomLog::new();
        log.append(message_at(100, "old")).unwrap();
        log.append(message_at(200, "boundary")).unwrap();
        log.append(message_at(300, "new")).unwrap();

        assert_eq!(
            texts(&log.read_since(Timestamp(200))),
            vec!["boundary", "new"]
        );
        assert_eq!(log.read_since(Timestamp(301)).len(), 0);
        assert_eq!(log.read_since(Timestamp(0)).len(), 3);
    }

    #[test]
    fn test_read_on_empty_log() {
        let log = ChatRoomLog::new();
        assert!(log.is_empty());
        assert!(log.read_all().is_empty());
        assert!(log.read_since(Timestamp(0)).is_empty());
    }

    #[test]
    fn test_snapshots_are_stable() {
        let log = ChatRoomLog::new();
        log.append(message_at(100, "one")).unwrap();

        let snapshot = log.read_all();
        log.append(message_at(200, "two")).unwrap();
        log.trim(Some(Timestamp(500)), None);

        // The snapshot predates the append and survives the trim.
        assert_eq!(texts(&snapshot), vec!["one"]);
    }

    #[test]
    fn test_trim_by_age() {
        let log = ChatRoomLog::new();
        log.append(message_at(100, "t1")).unwrap();
        log.append(message_at(200, "t2")).unwrap();
        log.append(message_at(300, "t3")).unwrap();

        let removed = log.trim(Some(Timestamp(200)), None);
        assert_eq!(removed, 1);
        assert_eq!(texts(&log.read_all()), vec!["t2", "t3"]);
    }

    #[test]
    fn test_trim_by_count() {
        let log = ChatRoomLog::new();
        for i in 1..=5 {
            log.append(message_at(i * 100, &format!("m{}", i))).unwrap();
        }

        let removed = log.trim(None, Some(2));
        assert_eq!(removed, 3);
        assert_eq!(texts(&log.read_all()), vec!["m4", "m5"]);
    }

    #[test]
    fn test_trim_with_both_criteria() {
        let log = ChatRoomLog::new();
        for i in 1..=5 {
            log.append(message_at(i * 100, &format!("m{}", i))).unwrap();
        }

        // Age cut removes m1; count cap then keeps the newest two.
        let removed = log.trim(Some(Timestamp(150)), Some(2));
        assert_eq!(removed, 3);
        assert_eq!(texts(&log.read_all()), vec!["m4", "m5"]);
    }

    #[test]
    fn test_trim_without_criteria_is_noop() {
        let log = ChatRoomLog::new();
        log.append(message_at(100, "keep")).unwrap();

        assert_eq!(log.trim(None, None), 0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_trim_keep_zero_removes_everything() {
        let log = ChatRoomLog::new();
        log.append(message_at(100, "a")).unwrap();
        log.append(message_at(200, "b")).unwrap();

        assert_eq!(log.trim(None, Some(0)), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_trim_on_empty_log_never_fails() {
        let log = ChatRoomLog::new();
        assert_eq!(log.trim(Some(Timestamp(i64::MAX)), Some(0)), 0);
    }
}
