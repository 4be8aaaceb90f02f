//! Target legality and reference resolution.
//!
//! A target chosen for a stack item stays legal while:
//! - a player target is still in the game
//! - an object target still exists in the zone it occupied when chosen
//! - a stack item target is still on the stack
//!
//! An item whose targets are all illegal on resolution is discarded. An item
//! with some legal targets resolves, and steps naming an illegal target do
//! nothing.

use super::step::{DamageRecipient, ObjectRef, PlayerRef};
use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;
use crate::core::state::Session;
use crate::stack::{StackItem, Target, TargetRef};

/// Either kind of damage recipient, resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipient {
    Player(PlayerId),
    Object(ObjectId),
}

/// Whether a chosen target is still legal.
#[must_use]
pub fn is_legal(session: &Session, target: &TargetRef) -> bool {
    match target.target {
        Target::Player(player) => session.is_in_game(player),
        Target::Object(object) => session
            .object(object)
            .is_some_and(|o| {
                Some(o.zone) == target.zone && Some(o.timestamp) == target.timestamp
            }),
        Target::StackItem(id) => session.stack.contains(id),
    }
}

/// A targeted item whose every target has become illegal.
#[must_use]
pub fn all_targets_illegal(session: &Session, item: &StackItem) -> bool {
    item.is_targeted() && item.targets.iter().all(|t| !is_legal(session, t))
}

/// Record a target with the zone and timestamp its object currently has.
#[must_use]
pub fn target_ref(session: &Session, target: Target) -> TargetRef {
    let (zone, timestamp) = match target {
        Target::Object(object) => session
            .object(object)
            .map_or((None, None), |o| (Some(o.zone), Some(o.timestamp))),
        _ => (None, None),
    };
    TargetRef {
        target,
        zone,
        timestamp,
    }
}

/// The n-th target, if it is still legal.
fn legal_target(session: &Session, item: &StackItem, index: usize) -> Option<Target> {
    item.target(index)
        .filter(|t| is_legal(session, t))
        .map(|t| t.target)
}

/// Resolve a player reference.
#[must_use]
pub fn resolve_player(session: &Session, item: &StackItem, player: PlayerRef) -> Option<PlayerId> {
    let resolved = match player {
        PlayerRef::Controller => Some(item.controller),
        PlayerRef::Player(id) => Some(id),
        PlayerRef::Target(index) => match legal_target(session, item, index)? {
            Target::Player(id) => Some(id),
            _ => None,
        },
        PlayerRef::ControllerOfTarget(index) => match legal_target(session, item, index)? {
            Target::Object(object) => session.object(object).map(|o| o.controller),
            _ => None,
        },
    }?;
    session.participant(resolved).map(|p| p.id)
}

/// Resolve an object reference.
#[must_use]
pub fn resolve_object(session: &Session, item: &StackItem, object: ObjectRef) -> Option<ObjectId> {
    let resolved = match object {
        ObjectRef::Source => item.source,
        ObjectRef::Object(id) => Some(id),
        ObjectRef::Target(index) => match legal_target(session, item, index)? {
            Target::Object(id) => Some(id),
            _ => None,
        },
    }?;
    session.object(resolved).map(|o| o.id)
}

/// Resolve a damage recipient.
#[must_use]
pub fn resolve_recipient(
    session: &Session,
    item: &StackItem,
    to: DamageRecipient,
) -> Option<Recipient> {
    match to {
        DamageRecipient::Player(player) => {
            resolve_player(session, item, player).map(Recipient::Player)
        }
        DamageRecipient::Object(object) => {
            resolve_object(session, item, object).map(Recipient::Object)
        }
        DamageRecipient::Target(index) => match legal_target(session, item, index)? {
            Target::Player(id) => Some(Recipient::Player(id)),
            Target::Object(id) => Some(Recipient::Object(id)),
            Target::StackItem(_) => None,
        },
    }
}
