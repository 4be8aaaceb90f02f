//! Stack/priority integration tests.
//!
//! These tests drive the stack through `Engine::apply` only: pushes, priority
//! passes, resolution order, countering, and discarding items whose targets
//! became illegal.

use ccg_engine::core::{DeckCard, Operation, PlayerId, Session, SessionConfig, SessionId, Zone};
use ccg_engine::effects::{DamageRecipient, ObjectRef, PlayerRef, ResolutionStep};
use ccg_engine::rules::{Engine, Outcome};
use ccg_engine::stack::{StackItemId, StackItemKind, Target};
use ccg_engine::turn::TurnDirection;
use ccg_engine::zones::ZonePosition;
use ccg_engine::{Characteristics, ObjectId, RejectReason};

fn game(players: usize) -> Session {
    let mut session = Session::new(SessionId::new("stack"), SessionConfig::default());
    apply(&mut session, Operation::SeedRng { seed: 42 });
    for i in 0..players {
        apply(
            &mut session,
            Operation::Join {
                name: format!("p{i}"),
                spectator: false,
            },
        );
    }
    session
}

fn apply(session: &mut Session, op: Operation) -> Outcome {
    Engine::apply(session, &op).unwrap()
}

fn push(
    session: &mut Session,
    controller: PlayerId,
    targets: Vec<Target>,
    payload: Vec<ResolutionStep>,
) -> StackItemId {
    match apply(
        session,
        Operation::PushStack {
            controller,
            source: None,
            kind: StackItemKind::ActivatedAbility,
            targets,
            payload,
        },
    ) {
        Outcome::Pushed(id) => id,
        other => panic!("expected push, got {other:?}"),
    }
}

fn gain(amount: u32) -> Vec<ResolutionStep> {
    vec![ResolutionStep::GainLife {
        player: PlayerRef::Controller,
        amount,
    }]
}

/// Everyone passes once, in order, starting from the current holder.
fn pass_round(session: &mut Session) -> Outcome {
    let mut last = Outcome::Applied;
    for _ in 0..session.players_in_game().count() {
        let holder = session.priority_holder().unwrap();
        last = apply(session, Operation::PassPriority { player: holder });
    }
    last
}

fn creature(session: &mut Session, owner: PlayerId, name: &str) -> ObjectId {
    apply(
        session,
        Operation::ImportDeck {
            player: owner,
            cards: vec![DeckCard::new(Characteristics::creature(name, 2, 2))],
        },
    );
    let card = session.library(owner).last().copied().unwrap();
    apply(
        session,
        Operation::MoveObject {
            object: card,
            to: Zone::Battlefield,
            position: ZonePosition::Top,
        },
    );
    card
}

// =============================================================================
// Ordering
// =============================================================================

/// Test that items resolve last in, first out.
#[test]
fn test_stack_lifo() {
    let mut s = game(2);
    let a = push(&mut s, PlayerId(0), vec![], gain(1));
    let b = push(&mut s, PlayerId(1), vec![], gain(2));
    let c = push(&mut s, PlayerId(0), vec![], gain(4));

    assert_eq!(pass_round(&mut s), Outcome::Resolved(c));
    assert_eq!(pass_round(&mut s), Outcome::Resolved(b));
    assert_eq!(pass_round(&mut s), Outcome::Resolved(a));
    assert!(s.stack.is_empty());
    assert_eq!(s.participants[0].life, 25);
    assert_eq!(s.participants[1].life, 22);
}

/// Test that ResolveTop resolves without waiting for passes.
#[test]
fn test_resolve_top_operation() {
    let mut s = game(2);
    let a = push(&mut s, PlayerId(0), vec![], gain(1));
    assert_eq!(apply(&mut s, Operation::ResolveTop), Outcome::Resolved(a));
    assert_eq!(
        Engine::apply(&mut s, &Operation::ResolveTop),
        Err(RejectReason::StackEmpty)
    );
}

// =============================================================================
// Priority
// =============================================================================

/// Test that priority makes a full round and returns to the active player.
#[test]
fn test_priority_round_trip() {
    let mut s = game(3);
    let id = push(&mut s, PlayerId(2), vec![], gain(3));
    assert_eq!(s.priority_holder(), Some(PlayerId(0)));

    assert_eq!(
        apply(&mut s, Operation::PassPriority { player: PlayerId(0) }),
        Outcome::PriorityPassed(PlayerId(1))
    );
    assert_eq!(
        apply(&mut s, Operation::PassPriority { player: PlayerId(1) }),
        Outcome::PriorityPassed(PlayerId(2))
    );
    assert_eq!(
        apply(&mut s, Operation::PassPriority { player: PlayerId(2) }),
        Outcome::Resolved(id)
    );
    assert_eq!(s.priority_holder(), Some(PlayerId(0)));
    assert_eq!(s.stack.consecutive_passes(), 0);
}

/// Test that a push mid-round restarts the round at the active player.
#[test]
fn test_push_interrupts_round() {
    let mut s = game(2);
    push(&mut s, PlayerId(0), vec![], gain(1));
    apply(&mut s, Operation::PassPriority { player: PlayerId(0) });
    let response = push(&mut s, PlayerId(1), vec![], gain(5));

    assert_eq!(s.priority_holder(), Some(PlayerId(0)));
    assert_eq!(pass_round(&mut s), Outcome::Resolved(response));
    assert_eq!(s.stack.len(), 1);
}

/// Test that reversing direction mid-round still gives every seat priority once.
#[test]
fn test_direction_change_mid_round() {
    let mut s = game(3);
    let id = push(&mut s, PlayerId(1), vec![], gain(2));

    assert_eq!(
        apply(&mut s, Operation::PassPriority { player: PlayerId(0) }),
        Outcome::PriorityPassed(PlayerId(1))
    );
    apply(
        &mut s,
        Operation::SetTurnDirection {
            direction: TurnDirection::Counterclockwise,
        },
    );
    assert_eq!(
        apply(&mut s, Operation::PassPriority { player: PlayerId(1) }),
        Outcome::PriorityPassed(PlayerId(2))
    );
    assert_eq!(
        Engine::apply(&mut s, &Operation::PassPriority { player: PlayerId(0) }),
        Err(RejectReason::NotPriorityHolder {
            player: PlayerId(0),
            holder: Some(PlayerId(2)),
        })
    );
    assert_eq!(
        apply(&mut s, Operation::PassPriority { player: PlayerId(2) }),
        Outcome::Resolved(id)
    );
}

/// Test that passing out of turn is rejected and changes nothing.
#[test]
fn test_pass_out_of_turn_rejected() {
    let mut s = game(2);
    push(&mut s, PlayerId(0), vec![], gain(1));
    let before = s.clone();

    assert_eq!(
        Engine::apply(&mut s, &Operation::PassPriority { player: PlayerId(1) }),
        Err(RejectReason::NotPriorityHolder {
            player: PlayerId(1),
            holder: Some(PlayerId(0)),
        })
    );
    assert_eq!(s, before);
}

// =============================================================================
// Targets
// =============================================================================

/// Test that an item whose only target left is discarded, not resolved.
#[test]
fn test_illegal_target_discarded() {
    let mut s = game(2);
    let bear = creature(&mut s, PlayerId(1), "Bear");
    let bolt = push(
        &mut s,
        PlayerId(0),
        vec![Target::Object(bear)],
        vec![ResolutionStep::DealDamage {
            to: DamageRecipient::Target(0),
            amount: 3,
        }],
    );

    // In response the bear's owner returns it to hand.
    apply(
        &mut s,
        Operation::MoveObject {
            object: bear,
            to: Zone::Hand,
            position: ZonePosition::Top,
        },
    );
    assert_eq!(pass_round(&mut s), Outcome::Discarded(bolt));
    assert_eq!(s.object(bear).map(|o| o.zone), Some(Zone::Hand));
    assert_eq!(s.priority_holder(), Some(PlayerId(0)));
}

/// Test that an item with one legal target left still resolves for it.
#[test]
fn test_partially_illegal_targets_resolve() {
    let mut s = game(2);
    let bear = creature(&mut s, PlayerId(1), "Bear");
    let id = push(
        &mut s,
        PlayerId(0),
        vec![Target::Object(bear), Target::Player(PlayerId(1))],
        vec![
            ResolutionStep::DealDamage {
                to: DamageRecipient::Target(0),
                amount: 2,
            },
            ResolutionStep::DealDamage {
                to: DamageRecipient::Target(1),
                amount: 2,
            },
        ],
    );
    apply(
        &mut s,
        Operation::MoveObject {
            object: bear,
            to: Zone::Exile,
            position: ZonePosition::Top,
        },
    );

    assert_eq!(pass_round(&mut s), Outcome::Resolved(id));
    assert_eq!(s.participants[1].life, 18);
}

/// Test that countering removes the target item and sends its card to the graveyard.
#[test]
fn test_counter_item() {
    let mut s = game(2);
    apply(
        &mut s,
        Operation::ImportDeck {
            player: PlayerId(0),
            cards: vec![DeckCard::new(Characteristics::creature("Ogre", 3, 3))],
        },
    );
    let ogre = s.library(PlayerId(0))[0];
    let spell = match apply(
        &mut s,
        Operation::PushStack {
            controller: PlayerId(0),
            source: Some(ogre),
            kind: StackItemKind::Spell,
            targets: vec![],
            payload: vec![],
        },
    ) {
        Outcome::Pushed(id) => id,
        other => panic!("expected push, got {other:?}"),
    };
    let counter = push(
        &mut s,
        PlayerId(1),
        vec![Target::StackItem(spell)],
        vec![ResolutionStep::CounterItem { target: 0 }],
    );

    assert_eq!(pass_round(&mut s), Outcome::Resolved(counter));
    assert!(s.stack.is_empty());
    assert_eq!(s.object(ogre).map(|o| o.zone), Some(Zone::Graveyard));
}

/// Test that an ability destroying its own source still finishes.
#[test]
fn test_self_destroy_ability() {
    let mut s = game(2);
    let bomb = creature(&mut s, PlayerId(0), "Bomb");
    apply(
        &mut s,
        Operation::PushStack {
            controller: PlayerId(0),
            source: Some(bomb),
            kind: StackItemKind::ActivatedAbility,
            targets: vec![Target::Player(PlayerId(1))],
            payload: vec![
                ResolutionStep::Destroy {
                    object: ObjectRef::Source,
                },
                ResolutionStep::DealDamage {
                    to: DamageRecipient::Target(0),
                    amount: 2,
                },
            ],
        },
    );

    pass_round(&mut s);
    assert_eq!(s.object(bomb).map(|o| o.zone), Some(Zone::Graveyard));
    assert_eq!(s.participants[1].life, 18);
}
