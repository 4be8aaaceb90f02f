//! Moving through the turn and the turn-based actions fired on entering a step.
//!
//! Entering a step runs its actions once, in a fixed order:
//! - Untap: the active participant untaps every permanent they control
//! - Draw: the active participant draws a card, except on the first turn
//!   when `skip_first_draw` is set
//! - Cleanup: discard down to the maximum hand size (a decision when there
//!   is a choice), then marked damage wears off

use tracing::debug;

use super::structure::{next_seat, Advance, Step};
use crate::core::player::{Participant, PlayerId};
use crate::core::state::Session;
use crate::decisions::DecisionOrigin;
use crate::effects::resolver::{discard_or_choose, StepResult};
use crate::stack::resolution::return_priority;

/// Seat that takes the next turn.
fn next_active(session: &Session) -> PlayerId {
    let active = session.active_player();
    next_seat(
        &session.participants,
        active,
        session.turn.direction,
        Participant::in_game,
    )
    .unwrap_or(active)
}

/// Advance to the next step, running its turn-based actions.
pub fn advance_step(session: &mut Session) -> Advance {
    let next = next_active(session);
    let advance = session.turn.advance(next);
    debug!(
        turn = session.turn.number,
        active = %session.turn.active,
        phase = ?session.turn.phase,
        step = ?session.turn.step,
        "step advanced"
    );
    enter_step(session);
    advance
}

/// Skip the rest of the current turn and start the next one at Untap.
///
/// Steps skipped this way fire none of their actions.
pub fn advance_turn(session: &mut Session) {
    let next = next_active(session);
    session.turn.begin_turn(next);
    debug!(turn = session.turn.number, active = %next, "turn started");
    enter_step(session);
}

fn enter_step(session: &mut Session) {
    let active = session.active_player();
    match session.turn.step {
        Some(Step::Untap) => untap_all(session, active),
        Some(Step::Draw) => {
            if !(session.turn.number == 1 && session.config.skip_first_draw) {
                session.draw(active, 1);
            }
        }
        Some(Step::Cleanup) => cleanup(session, active),
        _ => {}
    }
    return_priority(session);
}

fn untap_all(session: &mut Session, player: PlayerId) {
    let tapped: Vec<_> = session
        .battlefield()
        .filter(|o| o.controller == player && o.tapped)
        .map(|o| o.id)
        .collect();
    for id in tapped {
        if let Some(obj) = session.object_mut(id) {
            obj.tapped = false;
        }
    }
}

fn cleanup(session: &mut Session, player: PlayerId) {
    let excess = session
        .hand(player)
        .len()
        .saturating_sub(session.config.max_hand_size);
    if excess > 0 {
        if let StepResult::Choice {
            player,
            kind,
            mandatory,
        } = discard_or_choose(session, player, excess)
        {
            session
                .decisions
                .add_step(player, kind, None, mandatory, DecisionOrigin::TurnBasedAction);
        }
    }

    let damaged: Vec<_> = session
        .battlefield()
        .filter(|o| o.damage > 0 || o.deathtouch_damage)
        .map(|o| o.id)
        .collect();
    for id in damaged {
        if let Some(obj) = session.object_mut(id) {
            obj.damage = 0;
            obj.deathtouch_damage = false;
        }
    }
}
