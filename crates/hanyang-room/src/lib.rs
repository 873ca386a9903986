//! Game hosting for Hanyang.
//!
//! Each game runs as an isolated Tokio task (actor model) that owns its
//! state, its action log and its event broadcast.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates and destroys games, routes requests
//! - [`RoomHandle`]: send commands to a running game actor
//! - [`RoomEvent`]: what subscribers receive after each change
//! - [`RoomConfig`]: queue sizes and AI auto-play settings

mod config;
mod error;
mod event;
mod manager;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use event::{GameEvent, RoomEvent};
pub use manager::RoomManager;
pub use room::{RoomHandle, Submitted};
