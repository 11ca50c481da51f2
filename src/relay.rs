//! Top-level relay tying rooms and subscriptions together.

use crate::error::Result;
use crate::rooms::{ChatRoomLog, RoomRegistry};
use crate::subscriptions::{
    SubscriberId, SubscriptionConfig, SubscriptionHandle, SubscriptionManager,
};
use crate::types::{ChatMessage, Timestamp};
use std::sync::Arc;
use tracing::debug;

/// The chat relay core.
///
/// Owns the room registry and the subscription manager. The surrounding
/// transport resolves rooms, posts messages, and subscribes through this
/// single entry point:
///
/// - a POST handler calls [`Relay::post`],
/// - a streaming handler calls [`Relay::subscribe`] and forwards events
///   until the client disconnects, then [`Relay::unsubscribe`],
/// - a retention job calls [`Relay::trim_room`].
pub struct Relay {
    registry: Arc<RoomRegistry>,
    subscriptions: SubscriptionManager,
}

impl Relay {
    /// Create a relay with no rooms.
    pub fn new() -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let subscriptions = SubscriptionManager::new(Arc::clone(&registry));
        Self {
            registry,
            subscriptions,
        }
    }

    /// The log for `room`, created on first use.
    pub fn room(&self, room: &str) -> Arc<ChatRoomLog> {
        self.registry.get_or_create(room)
    }

    /// Post a message to a room. Returns the stored message.
    pub fn post(
        &self,
        room: &str,
        author: Option<String>,
        text: impl Into<String>,
    ) -> Result<ChatMessage> {
        let message = ChatMessage::new(author, text);
        self.registry.get_or_create(room).append(message.clone())?;
        debug!(room, id = %message.id, "posted message");
        Ok(message)
    }

    /// Subscribe to a room's live messages.
    pub fn subscribe(&self, room: &str, config: SubscriptionConfig) -> SubscriptionHandle {
        self.subscriptions.subscribe(room, config)
    }

    /// Stop a subscription. Idempotent.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscriptions.unsubscribe(id);
    }

    /// Apply retention to a room. Returns the number of messages
    /// removed; a room that was never created removes nothing.
    pub fn trim_room(
        &self,
        room: &str,
        cutoff: Option<Timestamp>,
        max_to_keep: Option<usize>,
    ) -> usize {
        match self.registry.get(room) {
            Some(log) => log.trim(cutoff, max_to_keep),
            None => 0,
        }
    }

    /// The underlying room registry.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
