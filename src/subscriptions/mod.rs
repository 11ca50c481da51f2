//! Subscription system for live room updates.
//!
//! Each subscriber gets its own polling loop: the loop wakes on a fixed
//! interval, reads everything the room log gained since the subscriber's
//! watermark, and forwards it over a bounded channel. Watermarks advance
//! once per poll cycle, so a batch is never delivered twice and a
//! message posted mid-poll lands in the next batch.
//!
//! Slow subscribers are dropped rather than awaited, and cancellation
//! preempts the poll sleep.
//!
//! # Example
//!
//! ```ignore
//! let manager = SubscriptionManager::new(registry);
//!
//! let handle = manager.subscribe("lobby", SubscriptionConfig::default());
//!
//! loop {
//!     match handle.recv() {
//!         Ok(RoomEvent::Joined { room }) => println!("joined {}", room),
//!         Ok(RoomEvent::Message { message }) => println!("{}", message),
//!         Ok(RoomEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, RoomEvent, SubscriberId, SubscriptionConfig, SubscriptionHandle,
};
