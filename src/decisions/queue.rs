//! Addressable queue of pending decisions.
//!
//! Steps are kept in creation order and addressed by `DecisionId`. A
//! response is checked against the exact step it names before anything is
//! consumed; a failed check leaves the queue untouched so a corrected
//! resubmission can still succeed.

use serde::{Deserialize, Serialize};

use super::step::{
    DecisionId, DecisionKind, DecisionOrigin, DecisionResponse, PendingDecisionStep,
};
use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;
use crate::error::RejectReason;

/// Queue of outstanding decisions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionQueue {
    steps: Vec<PendingDecisionStep>,
    next_id: u32,
}

impl ResolutionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a new step and return its id.
    pub fn add_step(
        &mut self,
        player: PlayerId,
        kind: DecisionKind,
        permanent: Option<ObjectId>,
        mandatory: bool,
        origin: DecisionOrigin,
    ) -> DecisionId {
        let id = DecisionId(self.next_id);
        self.next_id += 1;
        self.steps.push(PendingDecisionStep {
            id,
            player,
            kind,
            permanent,
            mandatory,
            origin,
        });
        id
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Pending steps, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PendingDecisionStep> {
        self.steps.iter()
    }

    #[must_use]
    pub fn get(&self, id: DecisionId) -> Option<&PendingDecisionStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Steps a participant must answer.
    pub fn for_player(&self, player: PlayerId) -> impl Iterator<Item = &PendingDecisionStep> {
        self.steps.iter().filter(move |s| s.player == player)
    }

    /// Check a response against the step it names without consuming anything.
    pub fn validate(&self, response: &DecisionResponse) -> Result<&PendingDecisionStep, RejectReason> {
        let step = self
            .get(response.step_id)
            .ok_or(RejectReason::DecisionNotFound(response.step_id))?;

        if step.player != response.respondent {
            return Err(RejectReason::NotDecisionTarget {
                step: step.id,
                player: response.respondent,
            });
        }
        if step.permanent != response.permanent {
            return Err(RejectReason::DecisionMismatch { step: step.id });
        }
        if step.is_decline(&response.selections) {
            return Ok(step);
        }
        step.kind.validate(step.id, &response.selections)?;
        Ok(step)
    }

    /// Remove and return a step. Each step can be taken at most once.
    pub fn take(&mut self, id: DecisionId) -> Option<PendingDecisionStep> {
        let idx = self.steps.iter().position(|s| s.id == id)?;
        Some(self.steps.remove(idx))
    }

    /// Drop every step for which `is_stale` holds, returning them.
    pub fn purge(
        &mut self,
        mut is_stale: impl FnMut(&PendingDecisionStep) -> bool,
    ) -> Vec<PendingDecisionStep> {
        let (stale, fresh): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.steps).into_iter().partition(|s| is_stale(s));
        self.steps = fresh;
        stale
    }
}
