//! Session state.
//!
//! ## Session
//!
//! One running game and everything needed to continue it:
//! - Participants in seat order
//! - Turn position, active seat, turn direction, per-turn counters
//! - Stack and priority token
//! - Resolution queue and any suspended resolution
//! - Object table and zone contents
//! - RNG state and flags (seeded, terminal)
//!
//! Objects and zones use `im` persistent structures, so cloning a session
//! for a scratch apply is cheap. A session is never destroyed, only marked
//! terminal by setting `result`.
//!
//! Sessions compare with `PartialEq`: replaying a log must produce a session
//! equal to the live one.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::config::{SessionConfig, Zone};
use super::entity::{ObjectId, SessionId};
use super::player::{Participant, PlayerId};
use super::rng::GameRng;
use crate::cards::{Characteristics, Object};
use crate::decisions::ResolutionQueue;
use crate::rules::GameResult;
use crate::stack::{PriorityStack, SuspendedResolution};
use crate::turn::TurnState;
use crate::zones::{ZoneKey, ZoneManager, ZonePosition};

/// Full session state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,

    /// Configuration fixed at creation.
    pub config: SessionConfig,

    /// Participants in seat order. Index equals `PlayerId`.
    pub participants: Vec<Participant>,

    /// Turn counter, active seat, phase and step.
    pub turn: TurnState,

    /// Stack and priority token.
    pub stack: PriorityStack,

    /// Outstanding decisions.
    pub decisions: ResolutionQueue,

    /// Resolution waiting on a decision.
    pub suspended: Option<SuspendedResolution>,

    /// Every object by id.
    pub objects: OrdMap<ObjectId, Object>,

    /// Zone contents.
    pub zones: ZoneManager,

    /// Deterministic RNG.
    pub rng: GameRng,

    /// Set by `SeedRng`.
    pub seeded: bool,

    /// Set once the game is decided.
    pub result: Option<GameResult>,

    /// Accepted operations so far.
    pub applied: u64,

    /// Next object id to allocate.
    next_object: ObjectId,

    /// Next creation timestamp.
    next_timestamp: u64,
}

impl Session {
    /// Create an empty, unseeded session.
    #[must_use]
    pub fn new(id: SessionId, config: SessionConfig) -> Self {
        Self {
            id,
            config,
            participants: Vec::new(),
            turn: TurnState::default(),
            stack: PriorityStack::new(),
            decisions: ResolutionQueue::new(),
            suspended: None,
            objects: OrdMap::new(),
            zones: ZoneManager::new(),
            rng: GameRng::new(0),
            seeded: false,
            result: None,
            applied: 0,
            next_object: ObjectId::FIRST,
            next_timestamp: 1,
        }
    }

    /// The game has been decided.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.result.is_some()
    }

    // === Participants ===

    #[must_use]
    pub fn participant(&self, player: PlayerId) -> Option<&Participant> {
        self.participants.get(player.index())
    }

    pub fn participant_mut(&mut self, player: PlayerId) -> Option<&mut Participant> {
        self.participants.get_mut(player.index())
    }

    /// Whether `player` is seated, present and has not lost.
    #[must_use]
    pub fn is_in_game(&self, player: PlayerId) -> bool {
        self.participant(player).is_some_and(Participant::in_game)
    }

    /// Participants still in the game, in seat order.
    pub fn players_in_game(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.participants
            .iter()
            .filter(|p| p.in_game())
            .map(|p| p.id)
    }

    /// Participants that ever took a seat.
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.participants.iter().filter(|p| !p.spectator).count()
    }

    /// Active seat.
    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn.active
    }

    /// Participant holding priority.
    #[must_use]
    pub fn priority_holder(&self) -> Option<PlayerId> {
        self.stack.holder()
    }

    // === Objects ===

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    /// Objects on the battlefield, by ascending id.
    pub fn battlefield(&self) -> impl Iterator<Item = &Object> + '_ {
        self.objects.values().filter(|o| o.zone == Zone::Battlefield)
    }

    /// Objects in a participant's zone, bottom to top.
    #[must_use]
    pub fn zone_contents(&self, owner: PlayerId, zone: Zone) -> Vec<ObjectId> {
        self.zones.contents(ZoneKey::new(owner, zone))
    }

    /// Number of objects in a participant's zone.
    #[must_use]
    pub fn zone_size(&self, owner: PlayerId, zone: Zone) -> usize {
        self.zones.size(ZoneKey::new(owner, zone))
    }

    /// A participant's hand.
    #[must_use]
    pub fn hand(&self, player: PlayerId) -> Vec<ObjectId> {
        self.zone_contents(player, Zone::Hand)
    }

    /// A participant's library, bottom to top.
    #[must_use]
    pub fn library(&self, player: PlayerId) -> Vec<ObjectId> {
        self.zone_contents(player, Zone::Library)
    }

    /// Allocate the next creation timestamp.
    pub fn next_timestamp(&mut self) -> u64 {
        let ts = self.next_timestamp;
        self.next_timestamp += 1;
        ts
    }

    /// Create an object in its owner's zone. Returns the new id.
    pub fn create_object(
        &mut self,
        owner: PlayerId,
        zone: Zone,
        characteristics: Characteristics,
        position: ZonePosition,
    ) -> ObjectId {
        let id = self.next_object;
        self.next_object = id.next();
        let timestamp = self.next_timestamp();
        let mut object = Object::new(id, owner, zone, characteristics, timestamp);
        // Entering the battlefield picks up starting loyalty.
        object.reset_for_zone_change(zone, timestamp);
        self.objects.insert(id, object);
        self.zones.add(id, ZoneKey::new(owner, zone), position);
        id
    }

    /// Move an object to a zone of its owner. Returns the zone it left.
    ///
    /// A zone change makes it a new object: counters, damage and tap state are
    /// cleared and the timestamp refreshed. Moving within the same zone only
    /// repositions it.
    pub fn move_object(&mut self, id: ObjectId, to: Zone, position: ZonePosition) -> Option<Zone> {
        let owner = self.objects.get(&id)?.owner;
        let from = self.zones.move_to(id, ZoneKey::new(owner, to), position)?;
        if from.zone != to {
            let timestamp = self.next_timestamp();
            if let Some(object) = self.objects.get_mut(&id) {
                object.reset_for_zone_change(to, timestamp);
            }
        }
        Some(from.zone)
    }

    /// Remove an object from the session entirely.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Object> {
        self.zones.remove(id);
        self.objects.remove(&id)
    }

    /// Draw up to `count` cards. Drawing from an empty library flags the
    /// participant for the state-based check. Returns the cards drawn.
    pub fn draw(&mut self, player: PlayerId, count: u32) -> Vec<ObjectId> {
        let mut drawn = Vec::new();
        for _ in 0..count {
            match self.zones.top(ZoneKey::new(player, Zone::Library)) {
                Some(card) => {
                    self.move_object(card, Zone::Hand, ZonePosition::Top);
                    drawn.push(card);
                }
                None => {
                    if let Some(p) = self.participant_mut(player) {
                        p.drew_from_empty = true;
                    }
                    break;
                }
            }
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_library(cards: u32) -> Session {
        let mut session = Session::new(SessionId::new("s"), SessionConfig::default());
        session
            .participants
            .push(Participant::seated(PlayerId(0), "alice", 20));
        for i in 0..cards {
            session.create_object(
                PlayerId(0),
                Zone::Library,
                Characteristics::new(format!("Card {i}")),
                ZonePosition::Top,
            );
        }
        session
    }

    #[test]
    fn test_create_object_ids_and_timestamps() {
        let session = session_with_library(3);
        let ids: Vec<_> = session.objects.keys().copied().collect();
        assert_eq!(ids, vec![ObjectId(1), ObjectId(2), ObjectId(3)]);
        assert_eq!(session.object(ObjectId(3)).map(|o| o.timestamp), Some(3));
        assert_eq!(session.zone_size(PlayerId(0), Zone::Library), 3);
    }

    #[test]
    fn test_draw_takes_from_top() {
        let mut session = session_with_library(3);
        let drawn = session.draw(PlayerId(0), 2);

        assert_eq!(drawn, vec![ObjectId(3), ObjectId(2)]);
        assert_eq!(session.hand(PlayerId(0)).len(), 2);
        assert_eq!(session.object(ObjectId(3)).map(|o| o.zone), Some(Zone::Hand));
        assert!(!session.participants[0].drew_from_empty);
    }

    #[test]
    fn test_draw_from_empty_library_flags() {
        let mut session = session_with_library(1);
        let drawn = session.draw(PlayerId(0), 2);

        assert_eq!(drawn.len(), 1);
        assert!(session.participants[0].drew_from_empty);
    }

    #[test]
    fn test_move_refreshes_timestamp() {
        let mut session = session_with_library(1);
        let before = session.object(ObjectId(1)).map(|o| o.timestamp);
        assert_eq!(
            session.move_object(ObjectId(1), Zone::Battlefield, ZonePosition::Top),
            Some(Zone::Library)
        );
        let after = session.object(ObjectId(1)).map(|o| o.timestamp);
        assert!(after > before);
    }

    #[test]
    fn test_remove_object() {
        let mut session = session_with_library(1);
        assert!(session.remove_object(ObjectId(1)).is_some());
        assert!(session.object(ObjectId(1)).is_none());
        assert_eq!(session.zone_size(PlayerId(0), Zone::Library), 0);
    }

    #[test]
    fn test_clone_is_equal() {
        let session = session_with_library(5);
        let copy = session.clone();
        assert_eq!(session, copy);
    }
}
