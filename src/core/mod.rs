//! Core engine types: ids, participants, configuration, RNG, operations, session.
//!
//! Everything the transition function reads or writes is defined here or in
//! the component modules it references.

pub mod config;
pub mod entity;
pub mod operation;
pub mod player;
pub mod rng;
pub mod state;

pub use config::{Format, LegendRuleMode, SessionConfig, Zone, ZoneVisibility};
pub use entity::{ObjectId, SessionId};
pub use operation::{DeckCard, Operation};
pub use player::{LossReason, Participant, PlayerId};
pub use rng::GameRng;
pub use state::Session;
