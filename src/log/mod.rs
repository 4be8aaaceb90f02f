//! Event log and deterministic replay.
//!
//! ## Key Types
//!
//! - `EventRecord`: `{ seq, operation }`, append-only, totally ordered
//! - `EventLog`: a session plus its history; the live append path
//! - `EventStore` / `MemoryEventStore`: the storage medium
//! - `replay` / `ReplayReport`: rebuild a session, with diagnostics
//! - `Checkpoint`: bincode snapshot to shorten replay
//!
//! Records written by older builds are upgraded on replay by `legacy`.

pub mod checkpoint;
pub mod event;
pub mod legacy;
pub mod replay;
pub mod store;

pub use checkpoint::Checkpoint;
pub use event::{EventLog, EventRecord};
pub use replay::{replay, replay_records, DiagnosticKind, ReplayDiagnostic, ReplayReport};
pub use store::{EventStore, MemoryEventStore};
