//! # ccg-engine
//!
//! An authoritative, replayable state engine for multiplayer turn-based card
//! game sessions.
//!
//! ## Design Principles
//!
//! 1. **One Transition Function**: `Engine::apply` is the only mutator. Live
//!    play and replay share it, so a replayed log reproduces the live state.
//!
//! 2. **Log Parameters, Not Results**: Events carry operation parameters.
//!    Randomness is a pure function of `(seed, call index)`.
//!
//! 3. **N-Player First**: Priority and turn order rotate over every seat
//!    still in the game, in either direction.
//!
//! ## Architecture
//!
//! - **Atomic Apply**: Operations run on a scratch copy that is committed
//!   only once it is accepted (and persisted, for `EventLog::append`).
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs` makes the
//!   scratch copy cheap.
//!
//! - **Settling**: After every accepted operation state-based actions run to
//!   a fixed point and stale decisions are purged.
//!
//! ## Modules
//!
//! - `core`: ids, participants, RNG, configuration, operations, `Session`
//! - `zones`: ordered per-participant zone contents
//! - `cards`: objects, characteristics, counters
//! - `turn`: phase/step cycle and turn-based actions
//! - `stack`: LIFO stack, priority, resolution with suspension
//! - `effects`: primitive resolution steps and targeting
//! - `decisions`: pending decision steps and their queue
//! - `rules`: the transition function and state-based actions
//! - `log`: event log, replay, legacy upgrades, checkpoints
//! - `session`: hosting many sessions
//! - `view`: per-viewer projections

pub mod cards;
pub mod core;
pub mod decisions;
pub mod effects;
pub mod error;
pub mod log;
pub mod rules;
pub mod session;
pub mod stack;
pub mod turn;
pub mod view;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    DeckCard, Format, GameRng, LegendRuleMode, LossReason, ObjectId, Operation, Participant,
    PlayerId, Session, SessionConfig, SessionId, Zone, ZoneVisibility,
};

pub use crate::zones::{ZoneKey, ZoneManager, ZonePosition};

pub use crate::cards::{CardType, Characteristics, CounterKind, Keyword, Object, Supertype};

pub use crate::turn::{Phase, Step, TurnDirection, TurnState};

pub use crate::stack::{
    PassResult, PriorityStack, StackItem, StackItemId, StackItemKind, SuspendedResolution,
    Target, TargetRef,
};

pub use crate::effects::{DamageRecipient, ObjectRef, PlayerRef, ResolutionStep};

pub use crate::decisions::{
    DecisionId, DecisionKind, DecisionOrigin, DecisionResponse, PendingDecisionStep,
    ResolutionQueue, Selections,
};

pub use crate::rules::{Engine, GameResult, Outcome, StateBasedAction};

pub use crate::log::{
    replay, Checkpoint, EventLog, EventRecord, EventStore, MemoryEventStore, ReplayReport,
};

pub use crate::session::SessionStore;

pub use crate::view::{project, SessionView, Viewer};

pub use crate::error::{EngineError, RejectReason, StoreError};
