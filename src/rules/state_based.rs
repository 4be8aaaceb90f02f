//! State-based actions.
//!
//! Checked after every accepted operation, before anyone receives priority.
//! They don't use the stack: every action found in a pass is applied as one
//! batch, and checking repeats until a pass finds nothing.
//!
//! Within a pass actions are listed in catalogue order (players, permanents,
//! tokens, counters, legend rule); players go in seat order and objects by
//! ascending id.

use std::collections::BTreeMap;

use tracing::{debug, error};

use super::engine::GameResult;
use crate::cards::{CounterKind, Keyword, Object};
use crate::core::config::{Format, LegendRuleMode, Zone};
use crate::core::entity::ObjectId;
use crate::core::player::{LossReason, Participant, PlayerId};
use crate::core::state::Session;
use crate::decisions::{DecisionId, DecisionKind, DecisionOrigin, PendingDecisionStep};
use crate::stack::resolution::{abandon, return_priority};
use crate::turn::next_seat;
use crate::zones::ZonePosition;

/// Passes after which the checker gives up. Reaching it is a bug.
pub const MAX_PASSES: usize = 64;

/// A state-based action that needs to be performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateBasedAction {
    /// A player loses the game.
    PlayerLoses { player: PlayerId, reason: LossReason },

    /// A creature with zero toughness or lethal damage goes to the graveyard.
    ObjectDies(ObjectId),

    /// A planeswalker with no loyalty goes to the graveyard.
    PlaneswalkerDies(ObjectId),

    /// A token not on the battlefield ceases to exist.
    TokenCeasesToExist(ObjectId),

    /// +1/+1 and -1/-1 counters on a permanent annihilate in pairs.
    CountersAnnihilate { permanent: ObjectId, count: u32 },

    /// A player controls two or more legendary permanents with the same name.
    LegendRuleViolation {
        player: PlayerId,
        name: String,
        permanents: Vec<ObjectId>,
    },
}

/// Check state-based actions and return the ones that need to be performed.
#[must_use]
pub fn check_state_based_actions(session: &Session) -> Vec<StateBasedAction> {
    let mut actions = Vec::new();
    check_player_sbas(session, &mut actions);
    check_permanent_sbas(session, &mut actions);
    check_token_cleanup(session, &mut actions);
    check_counter_annihilation(session, &mut actions);
    check_legend_rule(session, &mut actions);
    actions
}

fn check_player_sbas(session: &Session, actions: &mut Vec<StateBasedAction>) {
    let config = &session.config;
    for p in session.participants.iter().filter(|p| p.in_game()) {
        let reason = if p.life <= 0 {
            Some(LossReason::ZeroLife)
        } else if p.drew_from_empty {
            Some(LossReason::DrewFromEmptyLibrary)
        } else if p.poison >= config.poison_threshold {
            Some(LossReason::Poison)
        } else if config.format == Format::Commander
            && p
                .commander_damage
                .values()
                .any(|d| *d >= config.commander_damage_threshold)
        {
            Some(LossReason::CommanderDamage)
        } else {
            None
        };
        if let Some(reason) = reason {
            actions.push(StateBasedAction::PlayerLoses {
                player: p.id,
                reason,
            });
        }
    }
}

fn check_permanent_sbas(session: &Session, actions: &mut Vec<StateBasedAction>) {
    for obj in session.battlefield() {
        if obj.is_creature() {
            let toughness = obj.toughness().unwrap_or(0);
            let indestructible = obj.has_keyword(Keyword::Indestructible);
            let lethal = obj.damage > 0
                && (i64::from(obj.damage) >= toughness || obj.deathtouch_damage);
            if toughness <= 0 || (lethal && !indestructible) {
                actions.push(StateBasedAction::ObjectDies(obj.id));
                continue;
            }
        }
        if obj.is_planeswalker() && obj.loyalty() == 0 {
            actions.push(StateBasedAction::PlaneswalkerDies(obj.id));
        }
    }
}

fn check_token_cleanup(session: &Session, actions: &mut Vec<StateBasedAction>) {
    for obj in session.objects.values() {
        if obj.token && obj.zone != Zone::Battlefield {
            actions.push(StateBasedAction::TokenCeasesToExist(obj.id));
        }
    }
}

fn check_counter_annihilation(session: &Session, actions: &mut Vec<StateBasedAction>) {
    for obj in session.battlefield() {
        let count = obj
            .counter(&CounterKind::PlusOnePlusOne)
            .min(obj.counter(&CounterKind::MinusOneMinusOne));
        if count > 0 {
            actions.push(StateBasedAction::CountersAnnihilate {
                permanent: obj.id,
                count,
            });
        }
    }
}

fn check_legend_rule(session: &Session, actions: &mut Vec<StateBasedAction>) {
    let mut groups: BTreeMap<(PlayerId, &str), Vec<&Object>> = BTreeMap::new();
    for obj in session.battlefield().filter(|o| o.is_legendary()) {
        groups
            .entry((obj.controller, obj.name()))
            .or_default()
            .push(obj);
    }

    for ((player, name), permanents) in groups {
        if permanents.len() < 2 || legend_decision_pending(session, player, name) {
            continue;
        }
        actions.push(StateBasedAction::LegendRuleViolation {
            player,
            name: name.to_string(),
            permanents: permanents.iter().map(|o| o.id).collect(),
        });
    }
}

fn legend_decision_pending(session: &Session, player: PlayerId, name: &str) -> bool {
    session.decisions.for_player(player).any(|s| {
        matches!(&s.kind, DecisionKind::LegendRule { name: pending, .. } if pending == name)
    })
}

/// Apply a batch of state-based actions. Returns whether anything happened.
pub fn apply_state_based_actions(session: &mut Session, actions: Vec<StateBasedAction>) -> bool {
    let mut any = false;
    for action in actions {
        debug!(?action, "state-based action");
        match action {
            StateBasedAction::PlayerLoses { player, reason } => {
                if let Some(p) = session.participant_mut(player).filter(|p| p.in_game()) {
                    p.lost = Some(reason);
                    p.drew_from_empty = false;
                    any = true;
                }
            }
            StateBasedAction::ObjectDies(id) | StateBasedAction::PlaneswalkerDies(id) => {
                if session.object(id).is_some_and(Object::is_permanent) {
                    session.move_object(id, Zone::Graveyard, ZonePosition::Top);
                    any = true;
                }
            }
            StateBasedAction::TokenCeasesToExist(id) => {
                any |= session.remove_object(id).is_some();
            }
            StateBasedAction::CountersAnnihilate { permanent, count } => {
                if let Some(obj) = session.object_mut(permanent) {
                    obj.remove_counters(&CounterKind::PlusOnePlusOne, count);
                    obj.remove_counters(&CounterKind::MinusOneMinusOne, count);
                    any = true;
                }
            }
            StateBasedAction::LegendRuleViolation {
                player,
                name,
                permanents,
            } => {
                any |= apply_legend_rule(session, player, name, permanents);
            }
        }
    }
    any
}

fn apply_legend_rule(
    session: &mut Session,
    player: PlayerId,
    name: String,
    permanents: Vec<ObjectId>,
) -> bool {
    match session.config.legend_rule {
        LegendRuleMode::KeepNewest => {
            let newest = permanents
                .iter()
                .filter_map(|id| session.object(*id))
                .max_by_key(|o| (o.timestamp, o.id))
                .map(|o| o.id);
            let mut moved = false;
            for id in permanents.into_iter().filter(|id| Some(*id) != newest) {
                moved |= session
                    .move_object(id, Zone::Graveyard, ZonePosition::Top)
                    .is_some();
            }
            moved
        }
        LegendRuleMode::Prompt => {
            session.decisions.add_step(
                player,
                DecisionKind::LegendRule { name, permanents },
                None,
                true,
                DecisionOrigin::StateBasedAction,
            );
            true
        }
    }
}

/// Check and apply until a pass finds nothing. Returns the number of passes
/// that applied something.
pub fn run_to_fixed_point(session: &mut Session) -> usize {
    let mut passes = 0;
    loop {
        let actions = check_state_based_actions(session);
        if actions.is_empty() || !apply_state_based_actions(session, actions) {
            return passes;
        }
        passes += 1;
        if passes >= MAX_PASSES {
            error!(passes, session = %session.id, "state-based actions did not converge");
            debug_assert!(false, "state-based actions did not converge");
            return passes;
        }
    }
}

/// Whether a pending decision no longer makes sense.
///
/// A step is stale when its generating permanent left the battlefield, its
/// participant is out of the game, or (legend rule) fewer than two of the
/// contested permanents remain.
#[must_use]
pub fn is_stale(session: &Session, step: &PendingDecisionStep) -> bool {
    if !session.is_in_game(step.player) {
        return true;
    }
    if let Some(permanent) = step.permanent {
        if !session.object(permanent).is_some_and(Object::is_permanent) {
            return true;
        }
    }
    if let DecisionKind::LegendRule { permanents, .. } = &step.kind {
        let remaining = permanents
            .iter()
            .filter(|id| {
                session
                    .object(**id)
                    .is_some_and(|o| o.is_permanent() && o.controller == step.player)
            })
            .count();
        return remaining < 2;
    }
    false
}

/// Remove stale decisions, abandoning any resolution blocked on one.
/// Returns the ids removed.
pub fn purge_stale_decisions(session: &mut Session) -> Vec<DecisionId> {
    let stale: Vec<DecisionId> = session
        .decisions
        .iter()
        .filter(|s| is_stale(session, s))
        .map(|s| s.id)
        .collect();
    if stale.is_empty() {
        return stale;
    }
    for step in session.decisions.purge(|s| stale.contains(&s.id)) {
        debug!(decision = %step.id, kind = step.kind.name(), "stale decision removed");
        if matches!(step.origin, DecisionOrigin::Resolution(_)) {
            abandon(session, step.id);
        }
    }
    stale
}

/// Decide the game once at most one seated participant remains.
pub fn evaluate_result(session: &mut Session) {
    if session.is_terminal() {
        return;
    }
    let seated = session.seat_count();
    let remaining: Vec<PlayerId> = session.players_in_game().collect();
    let result = match remaining.as_slice() {
        [] if seated > 0 => GameResult::Draw,
        [winner] if seated >= 2 => GameResult::Winner(*winner),
        _ => return,
    };
    debug!(?result, session = %session.id, "game over");
    session.result = Some(result);
    session.stack.clear_holder();
}

/// Bring the session to rest after a mutation: state-based actions to a
/// fixed point, stale decisions purged, the game decided if it is over, and
/// priority moved off anyone who left the game.
pub fn settle(session: &mut Session) {
    loop {
        run_to_fixed_point(session);
        if purge_stale_decisions(session).is_empty() {
            break;
        }
    }
    evaluate_result(session);
    if session.is_terminal() {
        return;
    }

    if let Some(holder) = session.priority_holder() {
        if !session.is_in_game(holder) {
            match next_seat(
                &session.participants,
                holder,
                session.turn.direction,
                Participant::in_game,
            ) {
                Some(next) => session.stack.grant(next),
                None => return_priority(session),
            }
        }
    }
}
