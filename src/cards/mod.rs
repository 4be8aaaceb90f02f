//! Objects: cards, tokens, and permanents.
//!
//! ## Key Types
//!
//! - `Characteristics`: name, types, power/toughness, loyalty, keywords
//! - `Object`: runtime state (zone, owner, controller, counters, damage)
//! - `CounterKind`: counter kinds, including named ones
//!
//! Card text arrives already translated; there is no card registry here.

pub mod characteristics;
pub mod object;

pub use characteristics::{CardType, Characteristics, Keyword, Supertype};
pub use object::{CounterKind, Object};
