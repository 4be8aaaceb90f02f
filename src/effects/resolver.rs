//! Step resolution - executing primitive steps on session state.
//!
//! `StepResolver::execute` runs one `ResolutionStep` for a stack item. Steps
//! whose choice is forced (discarding a whole hand, scrying zero cards) run
//! straight through; otherwise the resolver reports the choice it needs and
//! the caller suspends the resolution. `StepResolver::apply_selection`
//! finishes a choice once a validated response arrives.
//!
//! The damage, discard and zone primitives here are also used directly by
//! host operations and turn-based actions.

use tracing::debug;

use super::step::ResolutionStep;
use super::targeting::{self, Recipient};
use crate::cards::{Characteristics, CounterKind, Keyword, Object};
use crate::core::config::Zone;
use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;
use crate::core::state::Session;
use crate::decisions::{DecisionId, DecisionKind, Selections};
use crate::error::RejectReason;
use crate::stack::{StackItem, StackItemKind, Target};
use crate::zones::{ZoneKey, ZonePosition};

/// Result of executing a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The step finished.
    Done,
    /// The step needs a choice before it can finish.
    Choice {
        player: PlayerId,
        kind: DecisionKind,
        mandatory: bool,
    },
}

/// Executes resolution steps on a session.
pub struct StepResolver;

impl StepResolver {
    /// Execute one step of `item`'s payload.
    pub fn execute(session: &mut Session, item: &StackItem, step: &ResolutionStep) -> StepResult {
        match step {
            ResolutionStep::DealDamage { to, amount } => {
                if let Some(recipient) = targeting::resolve_recipient(session, item, *to) {
                    let source = item.source.filter(|s| session.object(*s).is_some());
                    deal_damage(session, source, recipient, *amount);
                }
                StepResult::Done
            }

            ResolutionStep::GainLife { player, amount } => {
                if let Some(p) = resolve_participant(session, item, *player) {
                    p.life += i64::from(*amount);
                }
                StepResult::Done
            }

            ResolutionStep::LoseLife { player, amount } => {
                if let Some(p) = resolve_participant(session, item, *player) {
                    p.life -= i64::from(*amount);
                }
                StepResult::Done
            }

            ResolutionStep::AddPoison { player, amount } => {
                if let Some(p) = resolve_participant(session, item, *player) {
                    p.poison = p.poison.saturating_add(*amount);
                }
                StepResult::Done
            }

            ResolutionStep::Draw { player, count } => {
                if let Some(player) = targeting::resolve_player(session, item, *player) {
                    session.draw(player, *count);
                }
                StepResult::Done
            }

            ResolutionStep::Mill { player, count } => {
                if let Some(player) = targeting::resolve_player(session, item, *player) {
                    mill(session, player, *count as usize);
                }
                StepResult::Done
            }

            ResolutionStep::Discard { player, count } => {
                let Some(player) = targeting::resolve_player(session, item, *player) else {
                    return StepResult::Done;
                };
                discard_or_choose(session, player, *count as usize)
            }

            ResolutionStep::Sacrifice {
                player,
                count,
                card_type,
            } => {
                let Some(player) = targeting::resolve_player(session, item, *player) else {
                    return StepResult::Done;
                };
                let candidates: Vec<ObjectId> = session
                    .battlefield()
                    .filter(|o| o.controller == player)
                    .filter(|o| card_type.map_or(true, |t| o.characteristics.has_type(t)))
                    .map(|o| o.id)
                    .collect();
                let count = *count as usize;
                if candidates.len() <= count {
                    for id in candidates {
                        session.move_object(id, Zone::Graveyard, ZonePosition::Top);
                    }
                    StepResult::Done
                } else {
                    StepResult::Choice {
                        player,
                        kind: DecisionKind::Sacrifice { count, candidates },
                        mandatory: true,
                    }
                }
            }

            ResolutionStep::PutCounters {
                object,
                kind,
                amount,
            } => {
                if let Some(obj) = resolve_permanent(session, item, *object) {
                    obj.add_counters(kind.clone(), *amount);
                }
                StepResult::Done
            }

            ResolutionStep::RemoveCounters {
                object,
                kind,
                amount,
            } => {
                if let Some(obj) = resolve_permanent(session, item, *object) {
                    obj.remove_counters(kind, *amount);
                }
                StepResult::Done
            }

            ResolutionStep::CreateToken {
                player,
                token,
                count,
            } => {
                if let Some(player) = targeting::resolve_player(session, item, *player) {
                    for _ in 0..*count {
                        create_token(session, player, token.clone());
                    }
                }
                StepResult::Done
            }

            ResolutionStep::Destroy { object } => {
                if let Some(id) = targeting::resolve_object(session, item, *object) {
                    destroy(session, id);
                }
                StepResult::Done
            }

            ResolutionStep::Exile { object } => {
                if let Some(id) = targeting::resolve_object(session, item, *object) {
                    session.move_object(id, Zone::Exile, ZonePosition::Top);
                }
                StepResult::Done
            }

            ResolutionStep::ReturnToHand { object } => {
                if let Some(id) = targeting::resolve_object(session, item, *object) {
                    session.move_object(id, Zone::Hand, ZonePosition::Top);
                }
                StepResult::Done
            }

            ResolutionStep::Tap { object } => {
                if let Some(obj) = resolve_permanent(session, item, *object) {
                    obj.tapped = true;
                }
                StepResult::Done
            }

            ResolutionStep::Untap { object } => {
                if let Some(obj) = resolve_permanent(session, item, *object) {
                    obj.tapped = false;
                }
                StepResult::Done
            }

            ResolutionStep::CounterItem { target } => {
                let countered = item
                    .target(*target)
                    .filter(|t| targeting::is_legal(session, t))
                    .and_then(|t| match t.target {
                        Target::StackItem(id) => Some(id),
                        _ => None,
                    });
                if let Some(id) = countered {
                    if let Some(removed) = session.stack.remove(id) {
                        debug!(item = %removed.id, "countered");
                        finish_spell_card(session, &removed, false);
                    }
                }
                StepResult::Done
            }

            ResolutionStep::Scry { player, count } => {
                look_at_top(session, item, *player, *count, |cards| DecisionKind::Scry {
                    cards,
                })
            }

            ResolutionStep::Surveil { player, count } => {
                look_at_top(session, item, *player, *count, |cards| {
                    DecisionKind::Surveil { cards }
                })
            }

            ResolutionStep::May { player, .. } => {
                match targeting::resolve_player(session, item, *player) {
                    Some(player) => StepResult::Choice {
                        player,
                        kind: DecisionKind::YesNo,
                        mandatory: false,
                    },
                    None => StepResult::Done,
                }
            }
        }
    }

    /// Apply a validated selection for a decision of `kind` answered by `player`.
    ///
    /// Checks the selection against current state (chosen cards still where
    /// they were) before changing anything. Returns steps to run next, which
    /// is only ever non-empty for an accepted "may".
    pub fn apply_selection(
        session: &mut Session,
        step: DecisionId,
        player: PlayerId,
        kind: &DecisionKind,
        selections: &Selections,
        nested: &[ResolutionStep],
    ) -> Result<Vec<ResolutionStep>, RejectReason> {
        let stale = |reason: &str| RejectReason::InvalidSelection {
            step,
            reason: reason.to_string(),
        };
        if matches!(selections, Selections::Decline) {
            return Ok(Vec::new());
        }

        match (kind, selections) {
            (DecisionKind::Scry { .. }, Selections::Order { top, bottom }) => {
                let library = ZoneKey::new(player, Zone::Library);
                if !top.iter().chain(bottom).all(|id| session.zones.is_in(*id, library)) {
                    return Err(stale("a card is no longer in the library"));
                }
                for id in bottom {
                    session.move_object(*id, Zone::Library, ZonePosition::Bottom);
                }
                for id in top.iter().rev() {
                    session.move_object(*id, Zone::Library, ZonePosition::Top);
                }
                Ok(Vec::new())
            }

            (DecisionKind::Surveil { .. }, Selections::Surveil { top, graveyard }) => {
                let library = ZoneKey::new(player, Zone::Library);
                if !top
                    .iter()
                    .chain(graveyard)
                    .all(|id| session.zones.is_in(*id, library))
                {
                    return Err(stale("a card is no longer in the library"));
                }
                for id in graveyard {
                    session.move_object(*id, Zone::Graveyard, ZonePosition::Top);
                }
                for id in top.iter().rev() {
                    session.move_object(*id, Zone::Library, ZonePosition::Top);
                }
                Ok(Vec::new())
            }

            (DecisionKind::Discard { .. }, Selections::Objects(chosen)) => {
                let hand = ZoneKey::new(player, Zone::Hand);
                if !chosen.iter().all(|id| session.zones.is_in(*id, hand)) {
                    return Err(stale("a card is no longer in hand"));
                }
                for id in chosen {
                    session.move_object(*id, Zone::Graveyard, ZonePosition::Top);
                }
                Ok(Vec::new())
            }

            (DecisionKind::Sacrifice { .. }, Selections::Objects(chosen)) => {
                let controlled = |id: &ObjectId| {
                    session
                        .object(*id)
                        .is_some_and(|o| o.is_permanent() && o.controller == player)
                };
                if !chosen.iter().all(controlled) {
                    return Err(stale("a permanent is no longer under your control"));
                }
                for id in chosen {
                    session.move_object(*id, Zone::Graveyard, ZonePosition::Top);
                }
                Ok(Vec::new())
            }

            (DecisionKind::LegendRule { permanents, .. }, Selections::Keep(keep)) => {
                if !session.object(*keep).is_some_and(Object::is_permanent) {
                    return Err(stale("the kept permanent left the battlefield"));
                }
                for id in permanents.iter().filter(|id| *id != keep) {
                    if session.object(*id).is_some_and(Object::is_permanent) {
                        session.move_object(*id, Zone::Graveyard, ZonePosition::Top);
                    }
                }
                Ok(Vec::new())
            }

            (DecisionKind::YesNo, Selections::Choice(yes)) => {
                Ok(if *yes { nested.to_vec() } else { Vec::new() })
            }

            _ => Err(stale("selection shape does not match decision kind")),
        }
    }
}

fn resolve_participant<'a>(
    session: &'a mut Session,
    item: &StackItem,
    player: super::step::PlayerRef,
) -> Option<&'a mut crate::core::player::Participant> {
    let id = targeting::resolve_player(session, item, player)?;
    session.participant_mut(id)
}

fn resolve_permanent<'a>(
    session: &'a mut Session,
    item: &StackItem,
    object: super::step::ObjectRef,
) -> Option<&'a mut Object> {
    let id = targeting::resolve_object(session, item, object)?;
    session.object_mut(id).filter(|o| o.is_permanent())
}

fn look_at_top(
    session: &Session,
    item: &StackItem,
    player: super::step::PlayerRef,
    count: u32,
    kind: impl FnOnce(Vec<ObjectId>) -> DecisionKind,
) -> StepResult {
    let Some(player) = targeting::resolve_player(session, item, player) else {
        return StepResult::Done;
    };
    let cards = session
        .zones
        .top_n(ZoneKey::new(player, Zone::Library), count as usize);
    if cards.is_empty() {
        return StepResult::Done;
    }
    StepResult::Choice {
        player,
        kind: kind(cards),
        mandatory: true,
    }
}

// === Primitives shared with host operations ===

/// Deal damage from an optional source object.
///
/// Damage to a player reduces life and, from a commander, accumulates
/// commander damage. Damage to a creature is marked; damage to a
/// planeswalker removes loyalty.
pub fn deal_damage(session: &mut Session, source: Option<ObjectId>, to: Recipient, amount: u32) {
    if amount == 0 {
        return;
    }
    let (deathtouch, commander) = source
        .and_then(|s| session.object(s))
        .map_or((false, None), |o| {
            (o.has_keyword(Keyword::Deathtouch), o.commander.then_some(o.id))
        });

    match to {
        Recipient::Player(player) => {
            if let Some(p) = session.participant_mut(player) {
                p.life -= i64::from(amount);
                if let Some(commander) = commander {
                    p.add_commander_damage(commander, i64::from(amount));
                }
            }
        }
        Recipient::Object(id) => {
            let Some(obj) = session.object_mut(id).filter(|o| o.is_permanent()) else {
                return;
            };
            if obj.is_planeswalker() {
                obj.remove_counters(&CounterKind::Loyalty, amount);
            }
            if obj.is_creature() {
                obj.damage = obj.damage.saturating_add(amount);
                obj.deathtouch_damage |= deathtouch;
            }
        }
    }
}

/// Put the top `count` cards of a library into the graveyard.
pub fn mill(session: &mut Session, player: PlayerId, count: usize) {
    for id in session.zones.top_n(ZoneKey::new(player, Zone::Library), count) {
        session.move_object(id, Zone::Graveyard, ZonePosition::Top);
    }
}

/// Discard `count` cards: all of them when the hand is no bigger, otherwise
/// ask the player.
pub fn discard_or_choose(session: &mut Session, player: PlayerId, count: usize) -> StepResult {
    let hand = session.hand(player);
    if count == 0 {
        return StepResult::Done;
    }
    if hand.len() <= count {
        for id in hand {
            session.move_object(id, Zone::Graveyard, ZonePosition::Top);
        }
        return StepResult::Done;
    }
    StepResult::Choice {
        player,
        kind: DecisionKind::Discard {
            count,
            candidates: hand,
        },
        mandatory: true,
    }
}

/// Destroy a permanent unless it is indestructible.
pub fn destroy(session: &mut Session, id: ObjectId) {
    let destroyable = session
        .object(id)
        .is_some_and(|o| o.is_permanent() && !o.has_keyword(Keyword::Indestructible));
    if destroyable {
        session.move_object(id, Zone::Graveyard, ZonePosition::Top);
    }
}

/// Create a token on the battlefield under `controller`.
pub fn create_token(
    session: &mut Session,
    controller: PlayerId,
    characteristics: Characteristics,
) -> ObjectId {
    let id = session.create_object(
        controller,
        Zone::Battlefield,
        characteristics,
        ZonePosition::Top,
    );
    if let Some(obj) = session.object_mut(id) {
        obj.token = true;
    }
    id
}

/// Move a finished spell's card out of the stack zone: permanent cards that
/// resolved enter the battlefield under the item's controller, everything
/// else goes to the graveyard. Abilities have no card to move.
pub fn finish_spell_card(session: &mut Session, item: &StackItem, resolved: bool) {
    if item.kind != StackItemKind::Spell {
        return;
    }
    let Some(card) = item.source else {
        return;
    };
    let Some(obj) = session.object(card).filter(|o| o.zone == Zone::Stack) else {
        return;
    };
    if resolved && obj.characteristics.is_permanent_card() {
        session.move_object(card, Zone::Battlefield, ZonePosition::Top);
        if let Some(obj) = session.object_mut(card) {
            obj.controller = item.controller;
        }
    } else {
        session.move_object(card, Zone::Graveyard, ZonePosition::Top);
    }
}
