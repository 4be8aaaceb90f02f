//! Zone manager for object locations and movement.
//!
//! The `ZoneManager` tracks where objects are located and keeps every zone of
//! every participant as an ordered sequence. It supports:
//! - Position control when inserting (top, bottom, index)
//! - Seeded shuffles through `GameRng`
//! - Caller-supplied reordering (scry, surveil, host reorder)
//! - Object lookup by id
//!
//! Sequences are persistent `im::Vector`s so cloning a session for a scratch
//! apply stays cheap. Index 0 is the bottom, the last index is the top.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::core::config::Zone;
use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;

/// Position for inserting an object into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (e.g., top of library).
    #[default]
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// A participant's zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    pub owner: PlayerId,
    pub zone: Zone,
}

impl ZoneKey {
    #[must_use]
    pub const fn new(owner: PlayerId, zone: Zone) -> Self {
        Self { owner, zone }
    }
}

/// The seven zones of one participant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ZoneSet {
    library: Vector<ObjectId>,
    hand: Vector<ObjectId>,
    battlefield: Vector<ObjectId>,
    graveyard: Vector<ObjectId>,
    exile: Vector<ObjectId>,
    stack: Vector<ObjectId>,
    command: Vector<ObjectId>,
}

impl ZoneSet {
    fn get(&self, zone: Zone) -> &Vector<ObjectId> {
        match zone {
            Zone::Library => &self.library,
            Zone::Hand => &self.hand,
            Zone::Battlefield => &self.battlefield,
            Zone::Graveyard => &self.graveyard,
            Zone::Exile => &self.exile,
            Zone::Stack => &self.stack,
            Zone::Command => &self.command,
        }
    }

    fn get_mut(&mut self, zone: Zone) -> &mut Vector<ObjectId> {
        match zone {
            Zone::Library => &mut self.library,
            Zone::Hand => &mut self.hand,
            Zone::Battlefield => &mut self.battlefield,
            Zone::Graveyard => &mut self.graveyard,
            Zone::Exile => &mut self.exile,
            Zone::Stack => &mut self.stack,
            Zone::Command => &mut self.command,
        }
    }
}

/// Manages object locations across every participant's zones.
///
/// ## Usage
///
/// ```
/// use ccg_engine::zones::{ZoneKey, ZoneManager, ZonePosition};
/// use ccg_engine::core::{ObjectId, PlayerId, Zone};
///
/// let mut manager = ZoneManager::new();
/// let library = ZoneKey::new(PlayerId(0), Zone::Library);
///
/// manager.add(ObjectId(10), library, ZonePosition::Top);
/// manager.add(ObjectId(11), library, ZonePosition::Bottom);
///
/// assert_eq!(manager.top(library), Some(ObjectId(10)));
/// assert_eq!(manager.size(library), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneManager {
    /// Object locations: object id -> (owner, zone)
    locations: OrdMap<ObjectId, ZoneKey>,

    /// Zone contents per owner.
    owners: OrdMap<PlayerId, ZoneSet>,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to a zone.
    ///
    /// Returns `false` if the object is already tracked.
    pub fn add(&mut self, object: ObjectId, key: ZoneKey, position: ZonePosition) -> bool {
        if self.locations.contains_key(&object) {
            return false;
        }
        self.locations.insert(object, key);
        let order = self
            .owners
            .entry(key.owner)
            .or_insert_with(ZoneSet::default)
            .get_mut(key.zone);
        insert_at(order, object, position);
        true
    }

    /// Move an object to another zone.
    ///
    /// Returns the old location, or `None` if the object wasn't found.
    /// Moving within the same zone repositions the object.
    pub fn move_to(
        &mut self,
        object: ObjectId,
        to: ZoneKey,
        position: ZonePosition,
    ) -> Option<ZoneKey> {
        let from = self.detach(object)?;
        self.add(object, to, position);
        Some(from)
    }

    /// Remove an object from the manager entirely.
    ///
    /// Returns the location it was in, or `None` if not found.
    pub fn remove(&mut self, object: ObjectId) -> Option<ZoneKey> {
        self.detach(object)
    }

    fn detach(&mut self, object: ObjectId) -> Option<ZoneKey> {
        let key = self.locations.remove(&object)?;
        if let Some(set) = self.owners.get_mut(&key.owner) {
            let order = set.get_mut(key.zone);
            if let Some(idx) = order.index_of(&object) {
                order.remove(idx);
            }
        }
        Some(key)
    }

    /// Location of an object.
    #[must_use]
    pub fn location(&self, object: ObjectId) -> Option<ZoneKey> {
        self.locations.get(&object).copied()
    }

    /// Check if an object is in a specific zone.
    #[must_use]
    pub fn is_in(&self, object: ObjectId, key: ZoneKey) -> bool {
        self.locations.get(&object) == Some(&key)
    }

    /// Objects in a zone, bottom to top.
    pub fn objects(&self, key: ZoneKey) -> impl Iterator<Item = ObjectId> + '_ {
        self.owners
            .get(&key.owner)
            .into_iter()
            .flat_map(move |set| set.get(key.zone).iter().copied())
    }

    /// Objects in a zone, bottom to top, collected.
    #[must_use]
    pub fn contents(&self, key: ZoneKey) -> Vec<ObjectId> {
        self.objects(key).collect()
    }

    /// Up to `count` objects from the top of a zone, topmost first.
    #[must_use]
    pub fn top_n(&self, key: ZoneKey, count: usize) -> Vec<ObjectId> {
        let contents = self.contents(key);
        contents.into_iter().rev().take(count).collect()
    }

    /// Number of objects in a zone.
    #[must_use]
    pub fn size(&self, key: ZoneKey) -> usize {
        self.owners
            .get(&key.owner)
            .map_or(0, |set| set.get(key.zone).len())
    }

    /// Top object of a zone (last in the sequence).
    #[must_use]
    pub fn top(&self, key: ZoneKey) -> Option<ObjectId> {
        self.owners
            .get(&key.owner)
            .and_then(|set| set.get(key.zone).last().copied())
    }

    /// Objects in a zone across all owners, in owner order.
    pub fn objects_in_zone(&self, zone: Zone) -> impl Iterator<Item = ObjectId> + '_ {
        self.owners
            .values()
            .flat_map(move |set| set.get(zone).iter().copied())
    }

    /// Shuffle a zone with the session RNG. Consumes one RNG call even for an
    /// empty zone so the call sequence only depends on the operations applied.
    pub fn shuffle(&mut self, key: ZoneKey, rng: &mut GameRng) {
        let mut contents = self.contents(key);
        rng.shuffle(&mut contents);
        let order = self
            .owners
            .entry(key.owner)
            .or_insert_with(ZoneSet::default)
            .get_mut(key.zone);
        *order = contents.into_iter().collect();
    }

    /// Replace the order of a zone with a permutation of its contents.
    ///
    /// Returns `false` (and changes nothing) unless `order` contains exactly
    /// the zone's current objects.
    pub fn reorder(&mut self, key: ZoneKey, order: &[ObjectId]) -> bool {
        let mut current = self.contents(key);
        let mut proposed = order.to_vec();
        current.sort();
        proposed.sort();
        if current != proposed {
            return false;
        }
        let zone = self.owners.entry(key.owner).or_insert_with(ZoneSet::default).get_mut(key.zone);
        *zone = order.iter().copied().collect();
        true
    }
}

fn insert_at(order: &mut Vector<ObjectId>, object: ObjectId, position: ZonePosition) {
    match position {
        ZonePosition::Top => order.push_back(object),
        ZonePosition::Bottom => order.push_front(object),
        ZonePosition::Index(i) => {
            let idx = i.min(order.len());
            order.insert(idx, object);
        }
    }
}
