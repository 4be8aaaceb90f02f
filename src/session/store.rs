//! Session host: many sessions, one operation at a time per session.
//!
//! Each session's `EventLog` sits behind its own lock. Submissions for one
//! session are serialised and logged in admission order while different
//! sessions proceed in parallel. The map lock is held only to look up or
//! insert a log, never while an operation is applied.

use std::sync::{Arc, Mutex, MutexGuard};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core::config::SessionConfig;
use crate::core::entity::SessionId;
use crate::core::operation::Operation;
use crate::core::state::Session;
use crate::error::{Result, StoreError};
use crate::log::{Checkpoint, EventLog, EventStore, ReplayReport};
use crate::rules::Outcome;
use crate::view::{project, SessionView, Viewer};

/// Live sessions keyed by id.
pub struct SessionStore {
    store: Arc<dyn EventStore>,
    config: SessionConfig,
    sessions: Mutex<FxHashMap<SessionId, Arc<Mutex<EventLog>>>>,
}

impl SessionStore {
    /// Host sessions on `store`, creating new ones with `config`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            sessions: Mutex::new(FxHashMap::default()),
        }
    }

    /// Apply an operation to a session, creating the session on first use.
    pub fn submit(&self, id: &SessionId, operation: Operation) -> Result<Outcome> {
        let log = self.log(id)?;
        let mut log = lock(&log)?;
        log.append(operation)
    }

    /// Run `f` against the current state of a session.
    pub fn with_session<T>(&self, id: &SessionId, f: impl FnOnce(&Session) -> T) -> Result<T> {
        let log = self.log(id)?;
        let log = lock(&log)?;
        Ok(f(log.session()))
    }

    /// A participant's or spectator's view of a session.
    pub fn view(&self, id: &SessionId, viewer: Viewer) -> Result<SessionView> {
        self.with_session(id, |session| project(session, viewer))
    }

    /// Snapshot a session.
    pub fn checkpoint(&self, id: &SessionId) -> Result<Checkpoint> {
        let log = self.log(id)?;
        let log = lock(&log)?;
        Ok(log.checkpoint())
    }

    /// Load a session from the event store, replacing any in-memory copy.
    pub fn reload(&self, id: &SessionId) -> Result<ReplayReport> {
        let (log, report) = EventLog::open(id.clone(), self.config.clone(), self.store.clone())?;
        let mut sessions = self.sessions()?;
        sessions.insert(id.clone(), Arc::new(Mutex::new(log)));
        debug!(session = %id, diagnostics = report.diagnostics.len(), "session reloaded");
        Ok(report)
    }

    /// Ids of the sessions held in memory.
    pub fn session_ids(&self) -> Result<Vec<SessionId>> {
        let mut ids: Vec<_> = self.sessions()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn log(&self, id: &SessionId) -> Result<Arc<Mutex<EventLog>>> {
        let mut sessions = self.sessions()?;
        let log = sessions.entry(id.clone()).or_insert_with(|| {
            debug!(session = %id, "session created");
            Arc::new(Mutex::new(EventLog::create(
                id.clone(),
                self.config.clone(),
                self.store.clone(),
            )))
        });
        Ok(Arc::clone(log))
    }

    fn sessions(&self) -> Result<MutexGuard<'_, FxHashMap<SessionId, Arc<Mutex<EventLog>>>>> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Persistence("session map lock poisoned".to_string()).into())
    }
}

fn lock(log: &Mutex<EventLog>) -> Result<MutexGuard<'_, EventLog>> {
    log.lock()
        .map_err(|_| StoreError::Persistence("session lock poisoned".to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::PlayerId;
    use crate::log::MemoryEventStore;
    use std::thread;

    fn host() -> SessionStore {
        SessionStore::new(Arc::new(MemoryEventStore::new()), SessionConfig::default())
    }

    #[test]
    fn test_submit_creates_session() {
        let host = host();
        let id = SessionId::new("table-1");
        host.submit(&id, Operation::SeedRng { seed: 1 }).unwrap();
        host.submit(
            &id,
            Operation::Join {
                name: "a".into(),
                spectator: false,
            },
        )
        .unwrap();

        assert_eq!(host.session_ids().unwrap(), vec![id.clone()]);
        assert_eq!(host.with_session(&id, |s| s.seat_count()).unwrap(), 1);
    }

    #[test]
    fn test_reload_matches_live() {
        let host = host();
        let id = SessionId::new("table-2");
        host.submit(&id, Operation::SeedRng { seed: 2 }).unwrap();
        host.submit(
            &id,
            Operation::Join {
                name: "a".into(),
                spectator: false,
            },
        )
        .unwrap();
        let live = host.with_session(&id, Clone::clone).unwrap();

        let report = host.reload(&id).unwrap();
        assert_eq!(report.session, live);
        assert_eq!(host.with_session(&id, Clone::clone).unwrap(), live);
    }

    #[test]
    fn test_concurrent_sessions() {
        let host = Arc::new(host());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let host = Arc::clone(&host);
                thread::spawn(move || {
                    let id = SessionId::new(format!("table-{n}"));
                    host.submit(&id, Operation::SeedRng { seed: n }).unwrap();
                    for i in 0..3 {
                        host.submit(
                            &id,
                            Operation::Join {
                                name: format!("p{i}"),
                                spectator: false,
                            },
                        )
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(host.session_ids().unwrap().len(), 4);
        for id in host.session_ids().unwrap() {
            let holder = host.with_session(&id, |s| s.priority_holder()).unwrap();
            assert_eq!(holder, Some(PlayerId(0)));
        }
    }
}
