//! # Palaver
//!
//! An in-memory multi-room chat relay core: per-room, time-ordered
//! message logs with concurrent appends, point-in-time range reads,
//! retention trimming, and polling subscription loops.
//!
//! ## Core Concepts
//!
//! - **Messages**: immutable values with UUIDv7 ids, so id order and
//!   creation order agree
//! - **Rooms**: named, independent logs created lazily on first access
//! - **Retention**: trim the oldest messages by age or by count without
//!   disturbing concurrent readers
//! - **Subscriptions**: per-subscriber polling loops that deliver each
//!   message exactly once over a bounded channel
//!
//! ## Example
//!
//! ```ignore
//! use palaver::{Relay, RoomEvent, SubscriptionConfig};
//!
//! let relay = Relay::new();
//!
//! // Post a message
//! relay.post("lobby", Some("alice".into()), "hello")?;
//!
//! // Stream the room
//! let sub = relay.subscribe("lobby", SubscriptionConfig::default());
//! while let Ok(event) = sub.recv() {
//!     println!("{}", event);
//!     if matches!(event, RoomEvent::Dropped { .. }) {
//!         break;
//!     }
//! }
//! ```

pub mod error;
pub mod relay;
pub mod rooms;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{RelayError, Result};
pub use relay::Relay;
pub use rooms::{ChatRoomLog, RoomRegistry};
pub use subscriptions::{
    DropReason, RoomEvent, SubscriberId, SubscriptionConfig, SubscriptionHandle,
    SubscriptionManager,
};
pub use types::{ChatMessage, MessageId, Timestamp};
