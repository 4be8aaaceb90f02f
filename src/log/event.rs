//! Event records and the per-session event log.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::checkpoint::Checkpoint;
use super::replay::{replay_records, ReplayReport};
use super::store::EventStore;
use crate::core::config::SessionConfig;
use crate::core::entity::SessionId;
use crate::core::operation::Operation;
use crate::core::state::Session;
use crate::error::Result;
use crate::rules::{Engine, Outcome};

/// One accepted operation, in log order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the session's log, from 0.
    pub seq: u64,
    pub operation: Operation,
}

impl EventRecord {
    /// Encode for the store.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A session together with its append-only history.
///
/// `append` is the live path: the operation is applied to a scratch copy,
/// persisted, and only then committed. A rejected operation or a failed
/// write leaves both the session and the log unchanged.
pub struct EventLog {
    session: Session,
    store: Arc<dyn EventStore>,
    next_seq: u64,
}

impl EventLog {
    /// Start a new, empty log.
    #[must_use]
    pub fn create(id: SessionId, config: SessionConfig, store: Arc<dyn EventStore>) -> Self {
        Self {
            session: Session::new(id, config),
            store,
            next_seq: 0,
        }
    }

    /// Rebuild a log from whatever its store holds for `id`.
    pub fn open(
        id: SessionId,
        config: SessionConfig,
        store: Arc<dyn EventStore>,
    ) -> Result<(Self, ReplayReport)> {
        let records = store.load(&id)?;
        let report = replay_records(id, config, &records);
        let log = Self {
            session: report.session.clone(),
            store,
            next_seq: records.len() as u64,
        };
        Ok((log, report))
    }

    /// Resume from a checkpoint, replaying only the records after it.
    pub fn open_from(checkpoint: Checkpoint, store: Arc<dyn EventStore>) -> Result<(Self, ReplayReport)> {
        let records = store.load(&checkpoint.session.id)?;
        let report = checkpoint.restore(&records);
        let log = Self {
            session: report.session.clone(),
            store,
            next_seq: records.len() as u64,
        };
        Ok((log, report))
    }

    /// Current session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sequence number the next event will get.
    #[must_use]
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Validate, apply, persist, commit.
    pub fn append(&mut self, operation: Operation) -> Result<Outcome> {
        let mut scratch = self.session.clone();
        let outcome = match Engine::apply_in_place(&mut scratch, &operation) {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!(
                    session = %self.session.id,
                    op = operation.name(),
                    code = reason.code(),
                    "operation rejected"
                );
                return Err(reason.into());
            }
        };

        let record = EventRecord {
            seq: self.next_seq,
            operation,
        };
        self.store
            .append(&self.session.id, record.seq, record.encode()?)?;

        debug!(session = %self.session.id, seq = record.seq, op = record.operation.name(), "event appended");
        self.session = scratch;
        self.next_seq += 1;
        Ok(outcome)
    }

    /// Snapshot the current state.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.next_seq, self.session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::PlayerId;
    use crate::error::{EngineError, RejectReason, StoreError};
    use crate::log::store::MemoryEventStore;

    struct BrokenStore;

    impl EventStore for BrokenStore {
        fn append(&self, session: &SessionId, _: u64, _: String) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable(session.clone()))
        }

        fn load(&self, _: &SessionId) -> std::result::Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_append_persists_and_commits() {
        let store = Arc::new(MemoryEventStore::new());
        let id = SessionId::new("log");
        let mut log = EventLog::create(id.clone(), SessionConfig::default(), store.clone());

        log.append(Operation::SeedRng { seed: 5 }).unwrap();
        log.append(Operation::Join {
            name: "a".into(),
            spectator: false,
        })
        .unwrap();

        assert_eq!(log.next_seq(), 2);
        assert_eq!(log.session().seat_count(), 1);
        let records = store.load(&id).unwrap();
        let first: EventRecord = serde_json::from_str(&records[0]).unwrap();
        assert_eq!(first.seq, 0);
        assert_eq!(first.operation, Operation::SeedRng { seed: 5 });
    }

    #[test]
    fn test_rejected_operation_not_logged() {
        let store = Arc::new(MemoryEventStore::new());
        let id = SessionId::new("log");
        let mut log = EventLog::create(id.clone(), SessionConfig::default(), store.clone());

        let err = log
            .append(Operation::Draw {
                player: PlayerId(0),
                count: 1,
            })
            .unwrap_err();
        assert_eq!(err.rejection(), Some(&RejectReason::NotSeeded));
        assert_eq!(store.len(&id).unwrap(), 0);
        assert_eq!(log.next_seq(), 0);
    }

    #[test]
    fn test_store_failure_does_not_commit() {
        let mut log = EventLog::create(
            SessionId::new("broken"),
            SessionConfig::default(),
            Arc::new(BrokenStore),
        );
        let err = log.append(Operation::SeedRng { seed: 1 }).unwrap_err();
        assert!(matches!(err, EngineError::Store(StoreError::Unavailable(_))));
        assert!(!log.session().seeded);
    }

    #[test]
    fn test_open_replays_store() {
        let store = Arc::new(MemoryEventStore::new());
        let id = SessionId::new("reopen");
        let mut log = EventLog::create(id.clone(), SessionConfig::default(), store.clone());
        log.append(Operation::SeedRng { seed: 9 }).unwrap();
        log.append(Operation::Join {
            name: "a".into(),
            spectator: false,
        })
        .unwrap();

        let (reopened, report) =
            EventLog::open(id, SessionConfig::default(), store).unwrap();
        assert!(report.diagnostics.is_empty());
        assert_eq!(reopened.session(), log.session());
        assert_eq!(reopened.next_seq(), 2);
    }
}
