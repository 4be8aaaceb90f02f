//! Session snapshots.
//!
//! A checkpoint is the session after the first `seq` records, encoded with
//! bincode. Restoring one and replaying the remaining records yields the same
//! session as replaying everything; checkpoints only save time.

use serde::{Deserialize, Serialize};

use super::replay::{replay_onto, ReplayReport};
use crate::core::entity::SessionId;
use crate::core::state::Session;
use crate::error::{EngineError, Result};

/// A session snapshot at a log position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Number of records already folded into `session`.
    pub seq: u64,
    pub session: Session,
}

impl Checkpoint {
    #[must_use]
    pub fn new(seq: u64, session: Session) -> Self {
        Self { seq, session }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Decode a checkpoint and check it belongs to `session`.
    pub fn decode_for(session: &SessionId, bytes: &[u8]) -> Result<Self> {
        let checkpoint = Self::decode(bytes)?;
        if &checkpoint.session.id != session {
            return Err(EngineError::CheckpointMismatch {
                expected: session.clone(),
                found: checkpoint.session.id,
            });
        }
        Ok(checkpoint)
    }

    /// Replay the records after this checkpoint. `records` is the full log.
    #[must_use]
    pub fn restore(self, records: &[String]) -> ReplayReport {
        let start = usize::try_from(self.seq).unwrap_or(usize::MAX);
        let tail = records.get(start..).unwrap_or(&[]);
        let report = ReplayReport {
            session: self.session,
            diagnostics: Vec::new(),
        };
        replay_onto(report, self.seq, tail)
    }
}
