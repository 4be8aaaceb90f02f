//! Rebuilding a session from its event log.
//!
//! Replay starts from an empty session and pushes every record through
//! `Engine::apply`, the same transition function live play uses. Problems
//! never abort a replay: a record that cannot be decoded, or that the engine
//! rejects, is skipped and reported in the `ReplayReport`.

use serde_json::Value;
use tracing::warn;

use super::legacy::{decode_operation, Decoded};
use crate::core::config::SessionConfig;
use crate::core::entity::SessionId;
use crate::core::operation::Operation;
use crate::core::state::Session;
use crate::error::RejectReason;
use crate::rules::Engine;

/// Why a record needed attention during replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Not valid JSON, or not a recognised operation. Skipped.
    Undecodable(String),
    /// A legacy shape, rewritten into current operations.
    LegacyUpgraded(&'static str),
    /// The log does not start by seeding the generator.
    MissingSeed,
    /// Decoded, but the engine refused it. Skipped.
    Rejected(RejectReason),
}

/// A note about one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayDiagnostic {
    pub seq: u64,
    pub kind: DiagnosticKind,
}

/// The rebuilt session and what happened along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayReport {
    pub session: Session,
    pub diagnostics: Vec<ReplayDiagnostic>,
}

impl ReplayReport {
    /// Whether every record applied as written.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics that mean a record was dropped.
    pub fn skipped(&self) -> impl Iterator<Item = &ReplayDiagnostic> {
        self.diagnostics.iter().filter(|d| {
            matches!(
                d.kind,
                DiagnosticKind::Undecodable(_) | DiagnosticKind::Rejected(_)
            )
        })
    }
}

/// Rebuild a session from already-decoded operations.
#[must_use]
pub fn replay(id: SessionId, config: SessionConfig, operations: &[Operation]) -> ReplayReport {
    let mut report = ReplayReport {
        session: Session::new(id, config),
        diagnostics: Vec::new(),
    };
    if operations
        .first()
        .is_some_and(|op| !matches!(op, Operation::SeedRng { .. }))
    {
        report.note(0, DiagnosticKind::MissingSeed);
    }
    for (seq, op) in operations.iter().enumerate() {
        report.apply(seq as u64, op);
    }
    report
}

/// Rebuild a session from encoded store records.
#[must_use]
pub fn replay_records(id: SessionId, config: SessionConfig, records: &[String]) -> ReplayReport {
    let report = ReplayReport {
        session: Session::new(id, config),
        diagnostics: Vec::new(),
    };
    replay_onto(report, 0, records)
}

/// Continue `report` with `records`, the first of which has sequence `start`.
pub(crate) fn replay_onto(mut report: ReplayReport, start: u64, records: &[String]) -> ReplayReport {
    let opening_hand = report.session.config.opening_hand_size as u32;
    for (offset, raw) in records.iter().enumerate() {
        let fallback_seq = start + offset as u64;
        let (seq, operations) = match decode_record(raw, fallback_seq) {
            Ok((seq, Decoded::Current(op))) => (seq, vec![op]),
            Ok((seq, Decoded::Legacy(legacy))) => {
                report.note(seq, DiagnosticKind::LegacyUpgraded(legacy.name()));
                (seq, legacy.upgrade(opening_hand))
            }
            Ok((seq, Decoded::Unknown(reason))) | Err((seq, reason)) => {
                report.note(seq, DiagnosticKind::Undecodable(reason));
                continue;
            }
        };

        if seq == 0 && !matches!(operations.first(), Some(Operation::SeedRng { .. })) {
            report.note(seq, DiagnosticKind::MissingSeed);
        }
        for op in &operations {
            report.apply(seq, op);
        }
    }
    report
}

impl ReplayReport {
    fn apply(&mut self, seq: u64, op: &Operation) {
        if let Err(reason) = Engine::apply(&mut self.session, op) {
            self.note(seq, DiagnosticKind::Rejected(reason));
        }
    }

    fn note(&mut self, seq: u64, kind: DiagnosticKind) {
        warn!(session = %self.session.id, seq, ?kind, "replay diagnostic");
        self.diagnostics.push(ReplayDiagnostic { seq, kind });
    }
}

/// Split a record into its sequence number and decoded operation.
fn decode_record(raw: &str, fallback_seq: u64) -> Result<(u64, Decoded), (u64, String)> {
    let value: Value = serde_json::from_str(raw).map_err(|e| (fallback_seq, e.to_string()))?;
    let seq = value
        .get("seq")
        .and_then(Value::as_u64)
        .unwrap_or(fallback_seq);
    let Some(operation) = value.get("operation") else {
        return Err((seq, "record has no operation".to_string()));
    };
    Ok((seq, decode_operation(operation.clone())))
}
