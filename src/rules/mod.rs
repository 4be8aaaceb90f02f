//! Rules: the transition function and state-based actions.
//!
//! `Engine::apply` validates and applies one `Operation`; every accepted
//! operation is followed by the state-based action loop in `state_based`.

pub mod engine;
pub mod state_based;

pub use engine::{Engine, GameResult, Outcome};
pub use state_based::{check_state_based_actions, run_to_fixed_point, StateBasedAction};
