//! Read-only projections of a session for one viewer.
//!
//! What a viewer sees depends on zone visibility:
//! - public zones (battlefield, graveyard, exile, stack, command): everyone
//! - hands: the owner only; others see the count
//! - libraries: nobody sees the contents or order, only the count
//!
//! Spectators see public zones only. A pending decision shows its full
//! context only to the participant who must answer it.

use serde::{Deserialize, Serialize};

use crate::cards::{Characteristics, CounterKind, Object};
use crate::core::config::{Zone, ZoneVisibility};
use crate::core::entity::ObjectId;
use crate::core::player::{LossReason, Participant, PlayerId};
use crate::core::state::Session;
use crate::decisions::{DecisionId, DecisionKind, PendingDecisionStep};
use crate::rules::GameResult;
use crate::stack::StackItem;
use crate::turn::{Phase, Step, TurnDirection};

/// Who is looking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Viewer {
    Participant(PlayerId),
    Spectator,
}

impl Viewer {
    fn can_see(self, owner: PlayerId, zone: Zone) -> bool {
        match zone.visibility() {
            ZoneVisibility::Public => true,
            ZoneVisibility::OwnerOnly => self == Viewer::Participant(owner),
            ZoneVisibility::Hidden => false,
        }
    }
}

/// A visible object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectView {
    pub id: ObjectId,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub characteristics: Characteristics,
    pub token: bool,
    pub tapped: bool,
    pub damage: u32,
    pub counters: Vec<(CounterKind, u32)>,
}

impl From<&Object> for ObjectView {
    fn from(obj: &Object) -> Self {
        let mut counters: Vec<_> = obj
            .counters
            .iter()
            .map(|(kind, n)| (kind.clone(), *n))
            .collect();
        counters.sort();
        Self {
            id: obj.id,
            owner: obj.owner,
            controller: obj.controller,
            characteristics: obj.characteristics.clone(),
            token: obj.token,
            tapped: obj.tapped,
            damage: obj.damage,
            counters,
        }
    }
}

/// One zone of one participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneView {
    pub zone: Zone,
    pub size: usize,
    /// Contents bottom to top, when the viewer may see them.
    pub objects: Option<Vec<ObjectView>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: PlayerId,
    pub name: String,
    pub spectator: bool,
    pub life: i64,
    pub poison: u32,
    pub lost: Option<LossReason>,
    pub left: bool,
    /// Named resources, sorted by key. Public to every viewer.
    pub resources: Vec<(String, i64)>,
    pub zones: Vec<ZoneView>,
}

/// A pending decision. `kind` is only filled in for the participant who
/// must answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionView {
    pub id: DecisionId,
    pub player: PlayerId,
    pub name: String,
    pub mandatory: bool,
    pub kind: Option<DecisionKind>,
}

/// Everything a viewer may see.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub viewer: Viewer,
    pub turn: u32,
    pub active: PlayerId,
    pub phase: Phase,
    pub step: Option<Step>,
    pub direction: TurnDirection,
    pub priority: Option<PlayerId>,
    pub participants: Vec<ParticipantView>,
    /// Top first.
    pub stack: Vec<StackItem>,
    pub decisions: Vec<DecisionView>,
    pub result: Option<GameResult>,
}

/// Project `session` for `viewer`.
#[must_use]
pub fn project(session: &Session, viewer: Viewer) -> SessionView {
    SessionView {
        viewer,
        turn: session.turn.number,
        active: session.turn.active,
        phase: session.turn.phase,
        step: session.turn.step,
        direction: session.turn.direction,
        priority: session.priority_holder(),
        participants: session
            .participants
            .iter()
            .map(|p| participant_view(session, p, viewer))
            .collect(),
        stack: session.stack.iter_top_down().cloned().collect(),
        decisions: session
            .decisions
            .iter()
            .map(|s| decision_view(s, viewer))
            .collect(),
        result: session.result.clone(),
    }
}

fn participant_view(session: &Session, p: &Participant, viewer: Viewer) -> ParticipantView {
    let zones = if p.spectator {
        Vec::new()
    } else {
        Zone::ALL
            .iter()
            .map(|&zone| {
                let contents = session.zone_contents(p.id, zone);
                let objects = viewer.can_see(p.id, zone).then(|| {
                    contents
                        .iter()
                        .filter_map(|id| session.object(*id))
                        .map(ObjectView::from)
                        .collect()
                });
                ZoneView {
                    zone,
                    size: contents.len(),
                    objects,
                }
            })
            .collect()
    };
    let mut resources: Vec<(String, i64)> =
        p.resources.iter().map(|(k, v)| (k.clone(), *v)).collect();
    resources.sort();
    ParticipantView {
        id: p.id,
        name: p.name.clone(),
        spectator: p.spectator,
        life: p.life,
        poison: p.poison,
        lost: p.lost,
        left: p.left,
        resources,
        zones,
    }
}

fn decision_view(step: &PendingDecisionStep, viewer: Viewer) -> DecisionView {
    DecisionView {
        id: step.id,
        player: step.player,
        name: step.kind.name().to_string(),
        mandatory: step.mandatory,
        kind: (viewer == Viewer::Participant(step.player)).then(|| step.kind.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SessionConfig;
    use crate::core::entity::SessionId;
    use crate::decisions::DecisionOrigin;
    use crate::zones::ZonePosition;

    fn session() -> Session {
        let mut s = Session::new(SessionId::new("view"), SessionConfig::default());
        s.participants.push(Participant::seated(PlayerId(0), "a", 20));
        s.participants.push(Participant::seated(PlayerId(1), "b", 20));
        s.participants.push(Participant::spectator(PlayerId(2), "w"));
        for player in [PlayerId(0), PlayerId(1)] {
            for n in 0..3 {
                s.create_object(
                    player,
                    Zone::Library,
                    Characteristics::new(format!("{player} {n}")),
                    ZonePosition::Top,
                );
            }
            s.draw(player, 1);
            s.create_object(
                player,
                Zone::Battlefield,
                Characteristics::basic_land("Plains"),
                ZonePosition::Top,
            );
        }
        s
    }

    fn zone(view: &SessionView, player: PlayerId, zone: Zone) -> &ZoneView {
        view.participants[player.index()]
            .zones
            .iter()
            .find(|z| z.zone == zone)
            .unwrap()
    }

    #[test]
    fn test_own_hand_visible_only_to_owner() {
        let s = session();
        let mine = project(&s, Viewer::Participant(PlayerId(0)));
        assert_eq!(zone(&mine, PlayerId(0), Zone::Hand).objects.as_ref().map(Vec::len), Some(1));
        assert_eq!(zone(&mine, PlayerId(1), Zone::Hand).objects, None);
        assert_eq!(zone(&mine, PlayerId(1), Zone::Hand).size, 1);
    }

    #[test]
    fn test_library_hidden_from_everyone() {
        let s = session();
        for viewer in [Viewer::Participant(PlayerId(0)), Viewer::Spectator] {
            let view = project(&s, viewer);
            let library = zone(&view, PlayerId(0), Zone::Library);
            assert_eq!(library.objects, None);
            assert_eq!(library.size, 2);
        }
    }

    #[test]
    fn test_spectator_sees_public_zones() {
        let s = session();
        let view = project(&s, Viewer::Spectator);
        assert_eq!(zone(&view, PlayerId(0), Zone::Hand).objects, None);
        assert_eq!(
            zone(&view, PlayerId(1), Zone::Battlefield)
                .objects
                .as_ref()
                .map(Vec::len),
            Some(1)
        );
        assert!(view.participants[2].zones.is_empty());
    }

    #[test]
    fn test_resources_public_and_sorted() {
        let mut s = session();
        s.participants[1].modify_resource("mana", 2);
        s.participants[1].modify_resource("energy", 5);

        let view = project(&s, Viewer::Participant(PlayerId(0)));
        assert_eq!(
            view.participants[1].resources,
            vec![("energy".to_string(), 5), ("mana".to_string(), 2)]
        );
        assert!(view.participants[0].resources.is_empty());
    }

    #[test]
    fn test_decision_context_only_for_target() {
        let mut s = session();
        let hand = s.hand(PlayerId(0));
        s.decisions.add_step(
            PlayerId(0),
            DecisionKind::Discard {
                count: 1,
                candidates: hand,
            },
            None,
            true,
            DecisionOrigin::TurnBasedAction,
        );

        let target = project(&s, Viewer::Participant(PlayerId(0)));
        let other = project(&s, Viewer::Participant(PlayerId(1)));
        assert!(target.decisions[0].kind.is_some());
        assert_eq!(other.decisions[0].kind, None);
        assert_eq!(other.decisions[0].name, "discard");
    }

    #[test]
    fn test_view_serializes() {
        let s = session();
        let view = project(&s, Viewer::Participant(PlayerId(1)));
        let json = serde_json::to_string(&view).unwrap();
        let decoded: SessionView = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, view);
    }
}
