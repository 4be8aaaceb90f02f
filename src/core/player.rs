//! Participant identification and per-participant state.
//!
//! ## PlayerId
//!
//! Seat index of a participant. Seats are assigned in join order and never
//! reused, so a `PlayerId` stays valid for the lifetime of the session even
//! after its participant leaves.
//!
//! ## Participant
//!
//! Life, poison, named resource totals, commander damage and loss state.
//! Zone contents are tracked by the session's `ZoneManager`, keyed by owner.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::entity::ObjectId;

/// Seat identifier supporting up to 255 participants.
///
/// Seat indices are 0-based: the first participant to join is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seat ids for `count` seats.
    ///
    /// ```
    /// use ccg_engine::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(players, vec![PlayerId(0), PlayerId(1), PlayerId(2)]);
    /// ```
    pub fn all(count: usize) -> impl Iterator<Item = PlayerId> {
        (0..count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Why a participant lost the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossReason {
    /// Life total is 0 or less.
    ZeroLife,
    /// Poison counters reached the configured threshold.
    Poison,
    /// Attempted to draw from an empty library.
    DrewFromEmptyLibrary,
    /// Cumulative damage from a single commander reached the threshold.
    CommanderDamage,
    /// Conceded.
    Conceded,
}

/// One seated player or spectator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Seat index.
    pub id: PlayerId,

    /// Display name supplied on join.
    pub name: String,

    /// Spectators never hold priority, never take turns, and own nothing.
    pub spectator: bool,

    /// Life total.
    pub life: i64,

    /// Poison counters.
    pub poison: u32,

    /// Named resource totals (mana, energy, experience, ...).
    pub resources: FxHashMap<String, i64>,

    /// Cumulative damage dealt by each commander source.
    pub commander_damage: FxHashMap<ObjectId, i64>,

    /// Set once the participant has lost.
    pub lost: Option<LossReason>,

    /// Set when the participant left the session.
    pub left: bool,

    /// Set by a draw from an empty library, cleared by the checker.
    pub drew_from_empty: bool,
}

impl Participant {
    /// Create a seated participant.
    #[must_use]
    pub fn seated(id: PlayerId, name: impl Into<String>, life: i64) -> Self {
        Self {
            id,
            name: name.into(),
            spectator: false,
            life,
            poison: 0,
            resources: FxHashMap::default(),
            commander_damage: FxHashMap::default(),
            lost: None,
            left: false,
            drew_from_empty: false,
        }
    }

    /// Create a spectator.
    #[must_use]
    pub fn spectator(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            spectator: true,
            ..Self::seated(id, name, 0)
        }
    }

    /// Seated and not departed.
    #[must_use]
    pub fn is_seated(&self) -> bool {
        !self.spectator && !self.left
    }

    /// Seated, present, and not yet lost. Only these take turns and hold priority.
    #[must_use]
    pub fn in_game(&self) -> bool {
        self.is_seated() && self.lost.is_none()
    }

    /// Get a resource value with default.
    #[must_use]
    pub fn resource(&self, key: &str) -> i64 {
        self.resources.get(key).copied().unwrap_or(0)
    }

    /// Modify a resource value by delta and return the new value.
    pub fn modify_resource(&mut self, key: &str, delta: i64) -> i64 {
        let value = self.resources.entry(key.to_string()).or_insert(0);
        *value += delta;
        *value
    }

    /// Record commander damage from `source` and return the new cumulative total.
    pub fn add_commander_damage(&mut self, source: ObjectId, amount: i64) -> i64 {
        let total = self.commander_damage.entry(source).or_insert(0);
        *total += amount;
        *total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let p0 = PlayerId::new(0);
        assert_eq!(p0.index(), 0);
        assert_eq!(format!("{}", p0), "Player 0");
    }

    #[test]
    fn test_seated_and_spectator() {
        let seat = Participant::seated(PlayerId(0), "alice", 20);
        assert!(seat.in_game());

        let watcher = Participant::spectator(PlayerId(1), "bob");
        assert!(!watcher.is_seated());
        assert!(!watcher.in_game());
    }

    #[test]
    fn test_lost_participant_not_in_game() {
        let mut seat = Participant::seated(PlayerId(0), "alice", 20);
        seat.lost = Some(LossReason::ZeroLife);
        assert!(seat.is_seated());
        assert!(!seat.in_game());
    }

    #[test]
    fn test_resources() {
        let mut seat = Participant::seated(PlayerId(0), "alice", 20);
        assert_eq!(seat.resource("mana"), 0);

        assert_eq!(seat.modify_resource("mana", 3), 3);
        assert_eq!(seat.modify_resource("mana", -1), 2);
        assert_eq!(seat.resource("mana"), 2);
    }

    #[test]
    fn test_commander_damage_accumulates_per_source() {
        let mut seat = Participant::seated(PlayerId(0), "alice", 40);
        assert_eq!(seat.add_commander_damage(ObjectId(5), 7), 7);
        assert_eq!(seat.add_commander_damage(ObjectId(5), 7), 14);
        assert_eq!(seat.add_commander_damage(ObjectId(6), 3), 3);
    }

    #[test]
    fn test_participant_serialization() {
        let mut seat = Participant::seated(PlayerId(2), "carol", 20);
        seat.modify_resource("energy", 4);
        let json = serde_json::to_string(&seat).unwrap();
        let deserialized: Participant = serde_json::from_str(&json).unwrap();
        assert_eq!(seat, deserialized);
    }
}
