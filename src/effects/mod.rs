//! Resolution steps and their execution.
//!
//! - `ResolutionStep`: the primitive steps a stack item's payload is built from
//! - `targeting`: target legality and reference resolution
//! - `StepResolver`: executes steps against a session, reporting choices it
//!   cannot make on its own

pub mod resolver;
pub mod step;
pub mod targeting;

pub use resolver::{StepResolver, StepResult};
pub use step::{DamageRecipient, ObjectRef, PlayerRef, ResolutionStep};
pub use targeting::Recipient;
