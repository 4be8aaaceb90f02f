//! Hosting sessions.

pub mod store;

pub use store::SessionStore;
