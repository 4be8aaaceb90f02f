//! Resolution queue: choices that block further resolution.
//!
//! ## Key Types
//!
//! - `PendingDecisionStep`: one queued choice, discriminated by `DecisionKind`
//! - `DecisionResponse` / `Selections`: an answer
//! - `ResolutionQueue`: validation and exactly-once consumption

pub mod queue;
pub mod step;

pub use queue::ResolutionQueue;
pub use step::{
    DecisionId, DecisionKind, DecisionOrigin, DecisionResponse, PendingDecisionStep, Selections,
};
