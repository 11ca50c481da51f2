//! Per-room message logs and the registry that owns them.
//!
//! A room is a named, independent channel. Each room's messages live in
//! a [`ChatRoomLog`], created lazily by the [`RoomRegistry`] on first
//! access and kept for the life of the process.

mod log;
mod registry;

pub use log::ChatRoomLog;
pub use registry::RoomRegistry;
