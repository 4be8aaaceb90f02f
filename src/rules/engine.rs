//! The transition function.
//!
//! `Engine::apply` is the only way a session changes. Live play, replay and
//! checkpoint restore all go through it, so a log replayed from the same
//! seed reaches the same state.
//!
//! Every accepted operation ends with `settle`: state-based actions to a
//! fixed point, stale decisions purged, and the game decided if at most one
//! seated participant remains.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::state_based::settle;
use crate::cards::{CardType, Object};
use crate::core::config::Zone;
use crate::core::entity::ObjectId;
use crate::core::operation::{DeckCard, Operation};
use crate::core::player::{LossReason, Participant, PlayerId};
use crate::core::rng::GameRng;
use crate::core::state::Session;
use crate::decisions::{DecisionId, DecisionOrigin, DecisionResponse};
use crate::effects::resolver::{create_token, deal_damage, StepResolver};
use crate::effects::targeting::{target_ref, Recipient};
use crate::error::RejectReason;
use crate::stack::resolution::{abandon, resolve_top, resume, ResolutionOutcome};
use crate::stack::{PassResult, StackItem, StackItemId, StackItemKind, Target};
use crate::turn::actions::{advance_step, advance_turn};
use crate::turn::{LANDS_PLAYED, SPELLS_CAST};
use crate::zones::{ZoneKey, ZonePosition};

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
    /// Multiple winners (team games, shared victory).
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }
}

/// What an accepted operation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Applied with nothing further to report.
    Applied,
    /// A participant took a seat or started watching.
    Joined(PlayerId),
    /// An object was created.
    Created(ObjectId),
    /// An item went on the stack.
    Pushed(StackItemId),
    /// Priority moved to the next participant.
    PriorityPassed(PlayerId),
    /// A stack item resolved.
    Resolved(StackItemId),
    /// A stack item was discarded because all its targets were illegal.
    Discarded(StackItemId),
    /// A resolution is waiting on a decision.
    Suspended {
        item: StackItemId,
        decision: DecisionId,
    },
    /// The turn moved to the next step.
    StepAdvanced,
}

impl From<ResolutionOutcome> for Outcome {
    fn from(outcome: ResolutionOutcome) -> Self {
        match outcome {
            ResolutionOutcome::Resolved(id) => Outcome::Resolved(id),
            ResolutionOutcome::Discarded(id) => Outcome::Discarded(id),
            ResolutionOutcome::Suspended { item, decision } => {
                Outcome::Suspended { item, decision }
            }
        }
    }
}

/// Applies operations to sessions.
pub struct Engine;

impl Engine {
    /// Apply `op` atomically: on rejection `session` is left untouched.
    pub fn apply(session: &mut Session, op: &Operation) -> Result<Outcome, RejectReason> {
        let mut scratch = session.clone();
        match Self::apply_in_place(&mut scratch, op) {
            Ok(outcome) => {
                *session = scratch;
                Ok(outcome)
            }
            Err(reason) => {
                warn!(
                    session = %session.id,
                    op = op.name(),
                    code = reason.code(),
                    "operation rejected"
                );
                Err(reason)
            }
        }
    }

    /// Apply `op` directly to `session`.
    ///
    /// A rejection may leave `session` partly modified; callers apply to a
    /// scratch copy and discard it on error.
    pub(crate) fn apply_in_place(
        session: &mut Session,
        op: &Operation,
    ) -> Result<Outcome, RejectReason> {
        if session.is_terminal() {
            return Err(RejectReason::SessionTerminal);
        }
        if !session.seeded && !matches!(op, Operation::SeedRng { .. }) {
            return Err(RejectReason::NotSeeded);
        }

        let outcome = Self::dispatch(session, op)?;
        settle(session);
        session.applied += 1;
        debug!(
            session = %session.id,
            op = op.name(),
            applied = session.applied,
            ?outcome,
            "operation applied"
        );
        Ok(outcome)
    }

    fn dispatch(session: &mut Session, op: &Operation) -> Result<Outcome, RejectReason> {
        match op {
            Operation::SeedRng { seed } => {
                if session.seeded {
                    return Err(RejectReason::AlreadySeeded);
                }
                session.rng = GameRng::new(*seed);
                session.seeded = true;
                Ok(Outcome::Applied)
            }

            Operation::Join { name, spectator } => join(session, name, *spectator),

            Operation::Leave { player } => {
                let p = session
                    .participant_mut(*player)
                    .ok_or(RejectReason::UnknownPlayer(*player))?;
                p.left = true;
                Ok(Outcome::Applied)
            }

            Operation::Concede { player } => {
                let p = in_game_mut(session, *player)?;
                p.lost = Some(LossReason::Conceded);
                Ok(Outcome::Applied)
            }

            Operation::ImportDeck { player, cards } => import_deck(session, *player, cards),

            Operation::Shuffle { player } => {
                seated(session, *player)?;
                session
                    .zones
                    .shuffle(ZoneKey::new(*player, Zone::Library), &mut session.rng);
                Ok(Outcome::Applied)
            }

            Operation::Draw { player, count } => {
                in_game_mut(session, *player)?;
                session.draw(*player, *count);
                Ok(Outcome::Applied)
            }

            Operation::MoveObject {
                object,
                to,
                position,
            } => {
                let is_land = existing(session, *object)?
                    .characteristics
                    .has_type(CardType::Land);
                let from = session.move_object(*object, *to, *position);
                if is_land && from == Some(Zone::Hand) && *to == Zone::Battlefield {
                    session.turn.bump_counter(LANDS_PLAYED, 1);
                }
                Ok(Outcome::Applied)
            }

            Operation::Reorder {
                player,
                zone,
                order,
            } => {
                seated(session, *player)?;
                if session.zones.reorder(ZoneKey::new(*player, *zone), order) {
                    Ok(Outcome::Applied)
                } else {
                    Err(RejectReason::InvalidOrder)
                }
            }

            Operation::PushStack {
                controller,
                source,
                kind,
                targets,
                payload,
            } => push_stack(session, *controller, *source, *kind, targets, payload),

            Operation::PassPriority { player } => {
                if session.suspended.is_some() {
                    return Err(RejectReason::ResolutionSuspended);
                }
                if !session.decisions.is_empty() {
                    return Err(RejectReason::DecisionPending);
                }
                let direction = session.turn.direction;
                match session
                    .stack
                    .pass(*player, &session.participants, direction)?
                {
                    PassResult::Continue(next) => Ok(Outcome::PriorityPassed(next)),
                    PassResult::StackResolves => Ok(resolve_top(session)?.into()),
                    PassResult::StepEnds => {
                        advance_step(session);
                        Ok(Outcome::StepAdvanced)
                    }
                }
            }

            Operation::ResolveTop => Ok(resolve_top(session)?.into()),

            Operation::NextStep => {
                ready_to_advance(session)?;
                advance_step(session);
                Ok(Outcome::StepAdvanced)
            }

            Operation::NextTurn => {
                ready_to_advance(session)?;
                advance_turn(session);
                Ok(Outcome::StepAdvanced)
            }

            Operation::SetTurnDirection { direction } => {
                session.turn.direction = *direction;
                Ok(Outcome::Applied)
            }

            Operation::UpdateCounters {
                object,
                kind,
                delta,
            } => {
                let obj = session
                    .object_mut(*object)
                    .ok_or(RejectReason::UnknownObject(*object))?;
                obj.apply_counter_delta(kind.clone(), *delta);
                Ok(Outcome::Applied)
            }

            Operation::CreateToken {
                controller,
                characteristics,
            } => {
                in_game_mut(session, *controller)?;
                let id = create_token(session, *controller, characteristics.clone());
                Ok(Outcome::Created(id))
            }

            Operation::RemoveObject { object } => {
                session
                    .remove_object(*object)
                    .ok_or(RejectReason::UnknownObject(*object))?;
                Ok(Outcome::Applied)
            }

            Operation::DealDamage {
                source,
                target,
                amount,
            } => {
                if let Some(source) = source {
                    existing(session, *source)?;
                }
                let recipient = match *target {
                    Target::Player(player) => {
                        in_game_mut(session, player)?;
                        Recipient::Player(player)
                    }
                    Target::Object(object) => {
                        if !existing(session, object)?.is_permanent() {
                            return Err(RejectReason::WrongZone {
                                object,
                                expected: Zone::Battlefield,
                            });
                        }
                        Recipient::Object(object)
                    }
                    Target::StackItem(_) => return Err(RejectReason::NotDamageable(*target)),
                };
                deal_damage(session, *source, recipient, *amount);
                Ok(Outcome::Applied)
            }

            Operation::AdjustLife { player, delta } => {
                let p = session
                    .participant_mut(*player)
                    .ok_or(RejectReason::UnknownPlayer(*player))?;
                p.life += delta;
                Ok(Outcome::Applied)
            }

            Operation::AdjustResource { player, key, delta } => {
                let p = session
                    .participant_mut(*player)
                    .ok_or(RejectReason::UnknownPlayer(*player))?;
                let value = p.modify_resource(key, *delta);
                debug!(player = %player, key = %key, value, "resource adjusted");
                Ok(Outcome::Applied)
            }

            Operation::SubmitDecision(response) => submit_decision(session, response),

            Operation::RemoveDecision { step_id } => {
                let step = session
                    .decisions
                    .take(*step_id)
                    .ok_or(RejectReason::DecisionNotFound(*step_id))?;
                if matches!(step.origin, DecisionOrigin::Resolution(_)) {
                    abandon(session, step.id);
                }
                Ok(Outcome::Applied)
            }
        }
    }
}

// === Operation handlers ===

fn join(session: &mut Session, name: &str, spectator: bool) -> Result<Outcome, RejectReason> {
    let id = PlayerId(
        u8::try_from(session.participants.len()).map_err(|_| RejectReason::SeatsFull {
            max: session.config.max_seats,
        })?,
    );
    if spectator {
        session.participants.push(Participant::spectator(id, name));
        return Ok(Outcome::Joined(id));
    }

    let seats = session.seat_count();
    if seats >= session.config.max_seats {
        return Err(RejectReason::SeatsFull {
            max: session.config.max_seats,
        });
    }
    session.participants.push(Participant::seated(
        id,
        name,
        session.config.starting_life,
    ));
    if seats == 0 {
        session.turn.active = id;
        session.stack.grant(id);
    }
    Ok(Outcome::Joined(id))
}

fn import_deck(
    session: &mut Session,
    player: PlayerId,
    cards: &[DeckCard],
) -> Result<Outcome, RejectReason> {
    seated(session, player)?;
    for card in cards {
        let zone = if card.commander {
            Zone::Command
        } else {
            Zone::Library
        };
        let id = session.create_object(
            player,
            zone,
            card.characteristics.clone(),
            ZonePosition::Top,
        );
        if let Some(obj) = session.object_mut(id) {
            obj.commander = card.commander;
        }
    }
    Ok(Outcome::Applied)
}

fn push_stack(
    session: &mut Session,
    controller: PlayerId,
    source: Option<ObjectId>,
    kind: StackItemKind,
    targets: &[Target],
    payload: &[crate::effects::ResolutionStep],
) -> Result<Outcome, RejectReason> {
    if session.suspended.is_some() {
        return Err(RejectReason::ResolutionSuspended);
    }
    in_game_mut(session, controller)?;
    if let Some(source) = source {
        existing(session, source)?;
    }
    for target in targets {
        match *target {
            Target::Player(player) => {
                session
                    .participant(player)
                    .ok_or(RejectReason::UnknownPlayer(player))?;
            }
            Target::Object(object) => {
                existing(session, object)?;
            }
            Target::StackItem(id) => {
                if !session.stack.contains(id) {
                    return Err(RejectReason::UnknownStackItem(id));
                }
            }
        }
    }

    // A cast spell's card moves to the stack zone.
    if kind == StackItemKind::Spell {
        if let Some(card) = source.filter(|c| session.object(*c).is_some_and(|o| o.zone != Zone::Stack)) {
            session.move_object(card, Zone::Stack, ZonePosition::Top);
        }
        session.turn.bump_counter(SPELLS_CAST, 1);
    }

    let targets = targets.iter().map(|t| target_ref(session, *t)).collect();
    let id = session.stack.next_id();
    let active = session.active_player();
    session.stack.push(
        StackItem {
            id,
            controller,
            source,
            kind,
            targets,
            payload: payload.to_vec(),
        },
        active,
    );
    Ok(Outcome::Pushed(id))
}

fn submit_decision(
    session: &mut Session,
    response: &DecisionResponse,
) -> Result<Outcome, RejectReason> {
    let step = session.decisions.validate(response)?.clone();
    session.decisions.take(step.id);

    match step.origin {
        DecisionOrigin::Resolution(_) => Ok(resume(session, &step, &response.selections)?.into()),
        DecisionOrigin::TurnBasedAction | DecisionOrigin::StateBasedAction => {
            StepResolver::apply_selection(
                session,
                step.id,
                step.player,
                &step.kind,
                &response.selections,
                &[],
            )?;
            Ok(Outcome::Applied)
        }
    }
}

// === Precondition helpers ===

fn existing(session: &Session, object: ObjectId) -> Result<&Object, RejectReason> {
    session
        .object(object)
        .ok_or(RejectReason::UnknownObject(object))
}

fn seated(session: &Session, player: PlayerId) -> Result<&Participant, RejectReason> {
    let p = session
        .participant(player)
        .ok_or(RejectReason::UnknownPlayer(player))?;
    if p.is_seated() {
        Ok(p)
    } else {
        Err(RejectReason::NotInGame(player))
    }
}

fn in_game_mut(session: &mut Session, player: PlayerId) -> Result<&mut Participant, RejectReason> {
    let p = session
        .participant_mut(player)
        .ok_or(RejectReason::UnknownPlayer(player))?;
    if p.in_game() {
        Ok(p)
    } else {
        Err(RejectReason::NotInGame(player))
    }
}

fn ready_to_advance(session: &Session) -> Result<(), RejectReason> {
    if session.suspended.is_some() {
        return Err(RejectReason::ResolutionSuspended);
    }
    if !session.decisions.is_empty() {
        return Err(RejectReason::DecisionPending);
    }
    if !session.stack.is_empty() {
        return Err(RejectReason::StackNotEmpty);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Characteristics;
    use crate::core::config::SessionConfig;
    use crate::core::entity::SessionId;
    use crate::decisions::{DecisionKind, Selections};
    use crate::effects::{DamageRecipient, PlayerRef, ResolutionStep};
    use crate::turn::{Phase, Step};

    fn started(players: usize) -> Session {
        let mut s = Session::new(SessionId::new("engine"), SessionConfig::default());
        Engine::apply(&mut s, &Operation::SeedRng { seed: 7 }).unwrap();
        for i in 0..players {
            Engine::apply(
                &mut s,
                &Operation::Join {
                    name: format!("p{i}"),
                    spectator: false,
                },
            )
            .unwrap();
        }
        s
    }

    fn bolt(controller: PlayerId, target: Target) -> Operation {
        Operation::PushStack {
            controller,
            source: None,
            kind: StackItemKind::ActivatedAbility,
            targets: vec![target],
            payload: vec![ResolutionStep::DealDamage {
                to: DamageRecipient::Target(0),
                amount: 3,
            }],
        }
    }

    #[test]
    fn test_unseeded_rejected() {
        let mut s = Session::new(SessionId::new("x"), SessionConfig::default());
        let op = Operation::Join {
            name: "a".into(),
            spectator: false,
        };
        assert_eq!(Engine::apply(&mut s, &op), Err(RejectReason::NotSeeded));
        assert_eq!(
            Engine::apply(&mut s, &Operation::SeedRng { seed: 1 }),
            Ok(Outcome::Applied)
        );
        assert_eq!(
            Engine::apply(&mut s, &Operation::SeedRng { seed: 1 }),
            Err(RejectReason::AlreadySeeded)
        );
    }

    #[test]
    fn test_join_assigns_seats_and_priority() {
        let s = started(2);
        assert_eq!(s.seat_count(), 2);
        assert_eq!(s.active_player(), PlayerId(0));
        assert_eq!(s.priority_holder(), Some(PlayerId(0)));
    }

    #[test]
    fn test_seats_full() {
        let mut s = Session::new(
            SessionId::new("full"),
            SessionConfig::default().with_max_seats(1),
        );
        Engine::apply(&mut s, &Operation::SeedRng { seed: 1 }).unwrap();
        let join = Operation::Join {
            name: "a".into(),
            spectator: false,
        };
        Engine::apply(&mut s, &join).unwrap();
        assert_eq!(
            Engine::apply(&mut s, &join),
            Err(RejectReason::SeatsFull { max: 1 })
        );
        let watch = Operation::Join {
            name: "w".into(),
            spectator: true,
        };
        assert_eq!(Engine::apply(&mut s, &watch), Ok(Outcome::Joined(PlayerId(1))));
    }

    #[test]
    fn test_rejection_leaves_session_untouched() {
        let mut s = started(2);
        let before = s.clone();
        let op = Operation::PassPriority {
            player: PlayerId(1),
        };
        assert!(matches!(
            Engine::apply(&mut s, &op),
            Err(RejectReason::NotPriorityHolder { .. })
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn test_pass_round_resolves_top() {
        let mut s = started(2);
        let pushed = Engine::apply(&mut s, &bolt(PlayerId(0), Target::Player(PlayerId(1)))).unwrap();
        let Outcome::Pushed(id) = pushed else {
            panic!("expected push, got {pushed:?}");
        };

        assert_eq!(
            Engine::apply(&mut s, &Operation::PassPriority { player: PlayerId(0) }),
            Ok(Outcome::PriorityPassed(PlayerId(1)))
        );
        assert_eq!(
            Engine::apply(&mut s, &Operation::PassPriority { player: PlayerId(1) }),
            Ok(Outcome::Resolved(id))
        );
        assert_eq!(s.participants[1].life, 17);
        assert_eq!(s.priority_holder(), Some(PlayerId(0)));
    }

    #[test]
    fn test_pass_round_on_empty_stack_advances() {
        let mut s = started(2);
        Engine::apply(&mut s, &Operation::PassPriority { player: PlayerId(0) }).unwrap();
        let outcome =
            Engine::apply(&mut s, &Operation::PassPriority { player: PlayerId(1) }).unwrap();
        assert_eq!(outcome, Outcome::StepAdvanced);
        assert_eq!(s.turn.position(), (Phase::Beginning, Some(Step::Upkeep)));
    }

    #[test]
    fn test_next_step_requires_empty_stack() {
        let mut s = started(2);
        Engine::apply(&mut s, &bolt(PlayerId(0), Target::Player(PlayerId(1)))).unwrap();
        assert_eq!(
            Engine::apply(&mut s, &Operation::NextStep),
            Err(RejectReason::StackNotEmpty)
        );
    }

    #[test]
    fn test_lethal_damage_ends_game() {
        let mut s = started(2);
        Engine::apply(
            &mut s,
            &Operation::AdjustLife {
                player: PlayerId(1),
                delta: -20,
            },
        )
        .unwrap();
        assert_eq!(s.result, Some(GameResult::Winner(PlayerId(0))));
        assert_eq!(
            Engine::apply(&mut s, &Operation::NextStep),
            Err(RejectReason::SessionTerminal)
        );
    }

    #[test]
    fn test_adjust_resource() {
        let mut s = started(2);
        let adjust = |player, delta| Operation::AdjustResource {
            player,
            key: "mana".into(),
            delta,
        };
        Engine::apply(&mut s, &adjust(PlayerId(0), 4)).unwrap();
        Engine::apply(&mut s, &adjust(PlayerId(0), -1)).unwrap();
        assert_eq!(s.participants[0].resource("mana"), 3);
        assert_eq!(s.participants[1].resource("mana"), 0);
        assert_eq!(
            Engine::apply(&mut s, &adjust(PlayerId(9), 1)),
            Err(RejectReason::UnknownPlayer(PlayerId(9)))
        );
    }

    #[test]
    fn test_concede_in_three_player_game() {
        let mut s = started(3);
        Engine::apply(&mut s, &Operation::Concede { player: PlayerId(1) }).unwrap();
        assert!(!s.is_terminal());
        assert_eq!(s.participants[1].lost, Some(LossReason::Conceded));
    }

    #[test]
    fn test_spell_card_moves_through_stack() {
        let mut s = started(2);
        Engine::apply(
            &mut s,
            &Operation::ImportDeck {
                player: PlayerId(0),
                cards: vec![DeckCard::new(Characteristics::creature("Bear", 2, 2))],
            },
        )
        .unwrap();
        let card = s.library(PlayerId(0))[0];
        Engine::apply(
            &mut s,
            &Operation::PushStack {
                controller: PlayerId(0),
                source: Some(card),
                kind: StackItemKind::Spell,
                targets: vec![],
                payload: vec![],
            },
        )
        .unwrap();
        assert_eq!(s.object(card).map(|o| o.zone), Some(Zone::Stack));

        Engine::apply(&mut s, &Operation::ResolveTop).unwrap();
        assert_eq!(s.object(card).map(|o| o.zone), Some(Zone::Battlefield));
    }

    #[test]
    fn test_submit_decision_resumes() {
        let mut s = started(2);
        Engine::apply(
            &mut s,
            &Operation::ImportDeck {
                player: PlayerId(0),
                cards: (0..5)
                    .map(|i| DeckCard::new(Characteristics::new(format!("c{i}"))))
                    .collect(),
            },
        )
        .unwrap();
        Engine::apply(
            &mut s,
            &Operation::PushStack {
                controller: PlayerId(0),
                source: None,
                kind: StackItemKind::TriggeredAbility,
                targets: vec![],
                payload: vec![ResolutionStep::Surveil {
                    player: PlayerRef::Controller,
                    count: 2,
                }],
            },
        )
        .unwrap();
        let Outcome::Suspended { decision, .. } =
            Engine::apply(&mut s, &Operation::ResolveTop).unwrap()
        else {
            panic!("expected suspension");
        };
        assert_eq!(
            Engine::apply(&mut s, &Operation::PassPriority { player: PlayerId(0) }),
            Err(RejectReason::ResolutionSuspended)
        );

        let step = s.decisions.get(decision).cloned().unwrap();
        let DecisionKind::Surveil { cards } = step.kind else {
            panic!("expected surveil");
        };
        let response = DecisionResponse {
            step_id: decision,
            respondent: PlayerId(0),
            permanent: None,
            selections: Selections::Surveil {
                top: vec![cards[0]],
                graveyard: vec![cards[1]],
            },
        };
        let op = Operation::SubmitDecision(response);
        assert!(matches!(
            Engine::apply(&mut s, &op),
            Ok(Outcome::Resolved(_))
        ));
        assert_eq!(s.zone_size(PlayerId(0), Zone::Graveyard), 1);
        assert_eq!(
            Engine::apply(&mut s, &op),
            Err(RejectReason::DecisionNotFound(decision))
        );
    }

    #[test]
    fn test_damage_to_stack_item_rejected() {
        let mut s = started(2);
        let op = Operation::DealDamage {
            source: None,
            target: Target::StackItem(StackItemId(0)),
            amount: 1,
        };
        assert_eq!(
            Engine::apply(&mut s, &op),
            Err(RejectReason::NotDamageable(Target::StackItem(StackItemId(0))))
        );
    }
}
