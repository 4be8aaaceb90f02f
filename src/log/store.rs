//! Append-only event storage.
//!
//! Records are stored as encoded JSON strings so that shapes written by
//! older builds stay loadable and can be upgraded on replay.

use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::core::entity::SessionId;
use crate::error::StoreError;

/// The append-only medium behind an event log.
///
/// Implementations must reject an append whose `seq` is not the next one
/// for the session.
pub trait EventStore: Send + Sync {
    /// Persist one encoded record.
    fn append(&self, session: &SessionId, seq: u64, record: String) -> Result<(), StoreError>;

    /// Every record of a session, in sequence order.
    fn load(&self, session: &SessionId) -> Result<Vec<String>, StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    streams: Mutex<FxHashMap<SessionId, Vec<String>>>,
}

impl MemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stream with raw records, e.g. ones written by an older build.
    pub fn import(&self, session: &SessionId, records: Vec<String>) -> Result<(), StoreError> {
        let mut streams = self.lock()?;
        streams.insert(session.clone(), records);
        Ok(())
    }

    /// Number of records stored for a session.
    pub fn len(&self, session: &SessionId) -> Result<usize, StoreError> {
        Ok(self.lock()?.get(session).map_or(0, Vec::len))
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, FxHashMap<SessionId, Vec<String>>>, StoreError> {
        self.streams
            .lock()
            .map_err(|_| StoreError::Persistence("event store lock poisoned".to_string()))
    }
}

impl EventStore for MemoryEventStore {
    fn append(&self, session: &SessionId, seq: u64, record: String) -> Result<(), StoreError> {
        let mut streams = self.lock()?;
        let stream = streams.entry(session.clone()).or_default();
        let expected = stream.len() as u64;
        if seq != expected {
            return Err(StoreError::OutOfOrder {
                session: session.clone(),
                expected,
                actual: seq,
            });
        }
        stream.push(record);
        Ok(())
    }

    fn load(&self, session: &SessionId) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.get(session).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_load() {
        let store = MemoryEventStore::new();
        let id = SessionId::new("s");
        store.append(&id, 0, "a".into()).unwrap();
        store.append(&id, 1, "b".into()).unwrap();

        assert_eq!(store.load(&id).unwrap(), vec!["a", "b"]);
        assert_eq!(store.len(&id).unwrap(), 2);
        assert!(store.load(&SessionId::new("other")).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let store = MemoryEventStore::new();
        let id = SessionId::new("s");
        let err = store.append(&id, 3, "a".into()).unwrap_err();
        assert_eq!(
            err,
            StoreError::OutOfOrder {
                session: id.clone(),
                expected: 0,
                actual: 3,
            }
        );
        assert_eq!(store.len(&id).unwrap(), 0);
    }
}
