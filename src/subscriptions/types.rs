//! Subscriber-facing types for live room updates.

use crate::types::{ChatMessage, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration for a room subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Deliver messages created at or after this time.
    /// `None` starts at subscription time (live only).
    pub since: Option<Timestamp>,

    /// How long the loop sleeps between polls of the room log.
    /// Default: 1 second
    pub poll_interval: Duration,

    /// Max buffered events before dropping the subscriber.
    /// Default: 1000
    pub buffer_size: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            since: None,
            poll_interval: Duration::from_secs(1),
            buffer_size: 1000,
        }
    }
}

/// Events delivered to a subscriber, in order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// Subscription established. Always the first event.
    Joined { room: String },

    /// A message that became visible since the subscriber's watermark.
    Message { message: ChatMessage },

    /// Subscription ended. Delivered best effort as the last event.
    Dropped { reason: DropReason },
}

/// The lines a transport pushes to its client.
impl fmt::Display for RoomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomEvent::Joined { room } => write!(f, "you joined the room '{}'", room),
            RoomEvent::Message { message } => write!(f, "{}", message),
            RoomEvent::Dropped { reason } => write!(f, "subscription dropped: {}", reason),
        }
    }
}

/// Why a subscription ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// The subscriber's receiving end went away.
    Disconnected,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DropReason::BufferOverflow => "buffer overflow",
            DropReason::Disconnected => "disconnected",
            DropReason::Unsubscribed => "unsubscribed",
        };
        write!(f, "{}", reason)
    }
}

/// Unique identifier for a subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Handle for receiving a subscription's events.
///
/// Dropping the handle disconnects the channel; the poll loop notices
/// on its next emission and shuts itself down.
pub struct SubscriptionHandle {
    pub id: SubscriberId,
    /// Channel the poll loop delivers events on.
    pub receiver: crossbeam_channel::Receiver<RoomEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<RoomEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<RoomEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<RoomEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
