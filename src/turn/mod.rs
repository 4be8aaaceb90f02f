//! Turn state machine.
//!
//! `structure` holds the step cycle and seat rotation; `actions` moves a
//! session through it and fires turn-based actions.

pub mod actions;
mod structure;

pub use structure::{
    next_phase, next_seat, next_step, Advance, Phase, Step, TurnDirection, TurnState, LANDS_PLAYED,
    SPELLS_CAST,
};
