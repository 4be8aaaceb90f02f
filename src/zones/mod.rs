//! Zone system for object locations.
//!
//! Every participant owns the same fixed set of zones (`core::config::Zone`).
//!
//! ## Key Types
//!
//! - `ZoneKey`: a participant's zone
//! - `ZoneManager`: object location tracking and movement
//! - `ZonePosition`: position specifier for inserts

pub mod manager;

pub use manager::{ZoneKey, ZoneManager, ZonePosition};

pub use crate::core::config::{Zone, ZoneVisibility};
