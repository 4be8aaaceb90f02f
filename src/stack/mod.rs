//! Stack and priority.
//!
//! - `PriorityStack`: LIFO items plus the priority token and pass count
//! - `StackItem`: a spell or ability with chosen targets and a payload
//! - `resolution`: running a payload, suspending on decisions
//!
//! Priority passes rotate in turn order among participants still in the
//! game. A full rotation without a push resolves the top item, or ends the
//! step when the stack is empty.

mod item;
mod priority;
pub mod resolution;

pub use item::{StackItem, StackItemId, StackItemKind, Target, TargetRef};
pub use priority::{PassResult, PriorityStack};
pub use resolution::{ResolutionOutcome, SuspendedResolution};
