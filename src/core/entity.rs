//! Object identification.
//!
//! Every spell, ability instance, permanent, or card in a hidden zone has a
//! unique `ObjectId`. Ids are allocated monotonically by the session and are
//! never reused, so a stale reference can always be detected by looking the
//! id up again.
//!
//! ## Usage
//!
//! ```
//! use ccg_engine::core::ObjectId;
//!
//! let first = ObjectId::FIRST;
//! assert_eq!(first.next(), ObjectId(2));
//! assert_eq!(format!("{}", first), "Object(1)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any object in a session.
///
/// Ids start at 1; `ObjectId(0)` is never allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The first id a fresh session allocates.
    pub const FIRST: ObjectId = ObjectId(1);

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id allocated directly after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u32> for ObjectId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// Identifier for a session hosted by the engine.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a new session id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next() {
        assert_eq!(ObjectId::FIRST.raw(), 1);
        assert_eq!(ObjectId(41).next(), ObjectId(42));
    }

    #[test]
    fn test_ordering() {
        assert!(ObjectId(3) < ObjectId(10));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ObjectId(42)), "Object(42)");
        assert_eq!(format!("{}", SessionId::new("table-7")), "table-7");
    }

    #[test]
    fn test_serialization() {
        let id = ObjectId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
