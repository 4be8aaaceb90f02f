//! Engine errors.
//!
//! ## Rejections
//!
//! `RejectReason` covers every precondition an operation can violate. A
//! rejected operation is neither applied nor logged, so resubmitting a
//! corrected operation is always safe. Each reason has a stable `code()` for
//! the transport layer.
//!
//! ## Faults
//!
//! `EngineError` wraps rejections together with storage and codec faults.

use thiserror::Error;

use crate::core::config::Zone;
use crate::core::entity::{ObjectId, SessionId};
use crate::core::player::PlayerId;
use crate::decisions::DecisionId;
use crate::stack::{StackItemId, Target};

/// Why an operation was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RejectReason {
    #[error("the session has not been seeded")]
    NotSeeded,

    #[error("the session is already seeded")]
    AlreadySeeded,

    #[error("the session has ended")]
    SessionTerminal,

    #[error("all {max} seats are taken")]
    SeatsFull { max: usize },

    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("{0} is not in the game")]
    NotInGame(PlayerId),

    #[error("unknown object: {0}")]
    UnknownObject(ObjectId),

    #[error("{object} is not in the {expected} zone")]
    WrongZone { object: ObjectId, expected: Zone },

    #[error("reorder must be a permutation of the zone contents")]
    InvalidOrder,

    #[error("unknown stack target: {0}")]
    UnknownStackItem(StackItemId),

    #[error("{0:?} cannot be dealt damage")]
    NotDamageable(Target),

    #[error("the stack is empty")]
    StackEmpty,

    #[error("the stack is not empty")]
    StackNotEmpty,

    #[error("{player} does not hold priority (holder: {holder:?})")]
    NotPriorityHolder {
        player: PlayerId,
        holder: Option<PlayerId>,
    },

    #[error("a resolution is suspended awaiting a decision")]
    ResolutionSuspended,

    #[error("a decision is pending")]
    DecisionPending,

    #[error("decision not found: {0}")]
    DecisionNotFound(DecisionId),

    #[error("{player} is not the target of {step}")]
    NotDecisionTarget { step: DecisionId, player: PlayerId },

    #[error("response does not match {step}")]
    DecisionMismatch { step: DecisionId },

    #[error("invalid selection for {step}: {reason}")]
    InvalidSelection { step: DecisionId, reason: String },
}

impl RejectReason {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::NotSeeded => "not_seeded",
            RejectReason::AlreadySeeded => "already_seeded",
            RejectReason::SessionTerminal => "session_terminal",
            RejectReason::SeatsFull { .. } => "seats_full",
            RejectReason::UnknownPlayer(_) => "unknown_player",
            RejectReason::NotInGame(_) => "not_in_game",
            RejectReason::UnknownObject(_) => "unknown_object",
            RejectReason::WrongZone { .. } => "wrong_zone",
            RejectReason::InvalidOrder => "invalid_order",
            RejectReason::UnknownStackItem(_) => "unknown_stack_item",
            RejectReason::NotDamageable(_) => "not_damageable",
            RejectReason::StackEmpty => "stack_empty",
            RejectReason::StackNotEmpty => "stack_not_empty",
            RejectReason::NotPriorityHolder { .. } => "not_priority_holder",
            RejectReason::ResolutionSuspended => "resolution_suspended",
            RejectReason::DecisionPending => "decision_pending",
            RejectReason::DecisionNotFound(_) => "decision_not_found",
            RejectReason::NotDecisionTarget { .. } => "not_decision_target",
            RejectReason::DecisionMismatch { .. } => "decision_mismatch",
            RejectReason::InvalidSelection { .. } => "invalid_selection",
        }
    }
}

/// Failures of the append-only event medium.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("event stream for {0} is unavailable")]
    Unavailable(SessionId),

    #[error("append out of order for {session}: expected seq {expected}, got {actual}")]
    OutOfOrder {
        session: SessionId,
        expected: u64,
        actual: u64,
    },

    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Any error surfaced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("event encoding: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("checkpoint encoding: {0}")]
    Checkpoint(#[from] bincode::Error),

    #[error("checkpoint is for {found}, expected {expected}")]
    CheckpointMismatch {
        expected: SessionId,
        found: SessionId,
    },
}

impl EngineError {
    /// The rejection reason, if this is a validation rejection.
    #[must_use]
    pub fn rejection(&self) -> Option<&RejectReason> {
        match self {
            EngineError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result alias for engine operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
