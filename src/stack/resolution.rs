//! Resolving the top of the stack.
//!
//! The popped item's payload runs step by step. A step that needs a choice
//! enqueues a decision and parks the item as a `SuspendedResolution`; the
//! answering `SubmitDecision` resumes at the following step. While a
//! resolution is suspended nothing else may resolve or be pushed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::item::{StackItem, StackItemId};
use crate::cards::Object;
use crate::core::state::Session;
use crate::decisions::{DecisionId, DecisionOrigin, PendingDecisionStep, Selections};
use crate::effects::resolver::{finish_spell_card, StepResolver, StepResult};
use crate::effects::targeting;
use crate::effects::ResolutionStep;
use crate::error::RejectReason;
use crate::turn::next_seat;

/// A resolution waiting on a decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendedResolution {
    /// The item being resolved. Accepted "may" steps are spliced into its payload.
    pub item: StackItem,
    /// Index of the first step not yet run.
    pub next_index: usize,
    /// The decision blocking it.
    pub decision: DecisionId,
}

/// How a resolution attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Every step ran.
    Resolved(StackItemId),
    /// Every target was illegal; nothing ran.
    Discarded(StackItemId),
    /// Waiting on a decision.
    Suspended {
        item: StackItemId,
        decision: DecisionId,
    },
}

/// Pop and resolve the top item.
pub fn resolve_top(session: &mut Session) -> Result<ResolutionOutcome, RejectReason> {
    if session.suspended.is_some() {
        return Err(RejectReason::ResolutionSuspended);
    }
    let item = session.stack.pop().ok_or(RejectReason::StackEmpty)?;

    if targeting::all_targets_illegal(session, &item) {
        debug!(item = %item.id, "all targets illegal, discarding");
        finish_spell_card(session, &item, false);
        return_priority(session);
        return Ok(ResolutionOutcome::Discarded(item.id));
    }

    debug!(item = %item.id, steps = item.payload.len(), "resolving");
    Ok(run(session, item, 0))
}

/// Resume the suspended resolution with the answer to its decision.
///
/// `step` has already been validated and taken from the queue.
pub fn resume(
    session: &mut Session,
    step: &PendingDecisionStep,
    selections: &Selections,
) -> Result<ResolutionOutcome, RejectReason> {
    let Some(mut suspended) = session
        .suspended
        .clone()
        .filter(|s| s.decision == step.id)
    else {
        return Err(RejectReason::DecisionNotFound(step.id));
    };

    let nested = match suspended.next_index.checked_sub(1) {
        Some(i) => match suspended.item.payload.get(i) {
            Some(ResolutionStep::May { steps, .. }) => steps.clone(),
            _ => Vec::new(),
        },
        None => Vec::new(),
    };
    let extra = StepResolver::apply_selection(
        session,
        step.id,
        step.player,
        &step.kind,
        selections,
        &nested,
    )?;

    session.suspended = None;
    let at = suspended.next_index;
    suspended.item.payload.splice(at..at, extra);
    Ok(run(session, suspended.item, at))
}

/// Drop the suspended resolution blocked on `decision` without running the
/// rest of it. Returns whether one was dropped.
pub fn abandon(session: &mut Session, decision: DecisionId) -> bool {
    if session.suspended.as_ref().map(|s| s.decision) != Some(decision) {
        return false;
    }
    let Some(suspended) = session.suspended.take() else {
        return false;
    };
    debug!(item = %suspended.item.id, %decision, "resolution abandoned");
    finish_spell_card(session, &suspended.item, false);
    return_priority(session);
    true
}

fn run(session: &mut Session, item: StackItem, start: usize) -> ResolutionOutcome {
    let mut index = start;
    while let Some(step) = item.payload.get(index).cloned() {
        match StepResolver::execute(session, &item, &step) {
            StepResult::Done => index += 1,
            StepResult::Choice {
                player,
                kind,
                mandatory,
            } => {
                let permanent = item
                    .source
                    .filter(|s| session.object(*s).is_some_and(Object::is_permanent));
                let decision = session.decisions.add_step(
                    player,
                    kind,
                    permanent,
                    mandatory,
                    DecisionOrigin::Resolution(item.id),
                );
                debug!(item = %item.id, %decision, step = step.name(), "resolution suspended");
                let id = item.id;
                session.suspended = Some(SuspendedResolution {
                    item,
                    next_index: index + 1,
                    decision,
                });
                return ResolutionOutcome::Suspended { item: id, decision };
            }
        }
    }

    finish_spell_card(session, &item, true);
    return_priority(session);
    ResolutionOutcome::Resolved(item.id)
}

/// Priority goes back to the active participant, or the next one still in
/// the game.
pub(crate) fn return_priority(session: &mut Session) {
    let active = session.active_player();
    let holder = if session.is_in_game(active) {
        Some(active)
    } else {
        next_seat(
            &session.participants,
            active,
            session.turn.direction,
            crate::core::player::Participant::in_game,
        )
    };
    match holder {
        Some(player) => session.stack.grant(player),
        None => session.stack.clear_holder(),
    }
}
