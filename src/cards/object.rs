//! Objects - runtime state of cards, tokens, and permanents.
//!
//! `Object` represents a specific card or token in a session at a specific
//! moment. It tracks mutable state like tap status, marked damage, counters,
//! and current zone.
//!
//! ## Counters
//!
//! Counter amounts are `u32` and removal saturates, so a counter can never go
//! negative. Opposing `+1/+1` and `-1/-1` counters are cancelled by the
//! state-based action checker, not here.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::characteristics::{CardType, Characteristics, Keyword, Supertype};
use crate::core::config::Zone;
use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;

/// Kind of counter that can be placed on an object.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    PlusOnePlusOne,
    MinusOneMinusOne,
    Loyalty,
    Charge,
    Time,
    /// Any other named counter.
    Named(String),
}

impl CounterKind {
    /// The kind this one cancels against, if any.
    #[must_use]
    pub fn opposing(&self) -> Option<CounterKind> {
        match self {
            CounterKind::PlusOnePlusOne => Some(CounterKind::MinusOneMinusOne),
            CounterKind::MinusOneMinusOne => Some(CounterKind::PlusOnePlusOne),
            _ => None,
        }
    }
}

/// An object in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// Unique id for this object.
    pub id: ObjectId,

    /// Owner (whose deck it started in, or who created the token).
    pub owner: PlayerId,

    /// Controller. May differ from owner.
    pub controller: PlayerId,

    /// Current zone.
    pub zone: Zone,

    /// Printed characteristics.
    pub characteristics: Characteristics,

    /// Creation timestamp; refreshed on every zone change. Used for "oldest
    /// first" and "newest first" tie-breaks.
    pub timestamp: u64,

    /// Tokens cease to exist outside the battlefield.
    pub token: bool,

    /// Designated commander; its combat damage to players is tracked per source.
    pub commander: bool,

    /// Tapped.
    pub tapped: bool,

    /// Damage marked this turn.
    pub damage: u32,

    /// Marked damage includes damage from a deathtouch source.
    pub deathtouch_damage: bool,

    /// Counters on this object.
    #[serde(with = "counter_list")]
    pub counters: FxHashMap<CounterKind, u32>,
}

/// Counters serialize as a sorted list of pairs: `Named` kinds cannot be JSON
/// map keys, and a sorted list keeps encodings stable across runs.
mod counter_list {
    use rustc_hash::FxHashMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::CounterKind;

    pub fn serialize<S: Serializer>(
        counters: &FxHashMap<CounterKind, u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut pairs: Vec<(&CounterKind, &u32)> = counters.iter().collect();
        pairs.sort();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<FxHashMap<CounterKind, u32>, D::Error> {
        let pairs: Vec<(CounterKind, u32)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

impl Object {
    /// Create an object owned and controlled by `owner`.
    #[must_use]
    pub fn new(
        id: ObjectId,
        owner: PlayerId,
        zone: Zone,
        characteristics: Characteristics,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            owner,
            controller: owner,
            zone,
            characteristics,
            timestamp,
            token: false,
            commander: false,
            tapped: false,
            damage: 0,
            deathtouch_damage: false,
            counters: FxHashMap::default(),
        }
    }

    /// Name shortcut.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.characteristics.name
    }

    /// On the battlefield.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.zone == Zone::Battlefield
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.characteristics.has_type(CardType::Creature)
    }

    #[must_use]
    pub fn is_planeswalker(&self) -> bool {
        self.characteristics.has_type(CardType::Planeswalker)
    }

    #[must_use]
    pub fn is_legendary(&self) -> bool {
        self.characteristics.has_supertype(Supertype::Legendary)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.characteristics.has_keyword(keyword)
    }

    // === Counters ===

    /// Number of counters of a kind.
    #[must_use]
    pub fn counter(&self, kind: &CounterKind) -> u32 {
        self.counters.get(kind).copied().unwrap_or(0)
    }

    /// Add counters.
    pub fn add_counters(&mut self, kind: CounterKind, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.counters.entry(kind).or_insert(0) += amount;
    }

    /// Remove up to `amount` counters. Returns how many were removed.
    pub fn remove_counters(&mut self, kind: &CounterKind, amount: u32) -> u32 {
        let Some(current) = self.counters.get_mut(kind) else {
            return 0;
        };
        let removed = amount.min(*current);
        *current -= removed;
        if *current == 0 {
            self.counters.remove(kind);
        }
        removed
    }

    /// Apply a signed delta, saturating at zero.
    pub fn apply_counter_delta(&mut self, kind: CounterKind, delta: i64) {
        if delta >= 0 {
            self.add_counters(kind, delta.min(u32::MAX as i64) as u32);
        } else {
            let amount = delta.unsigned_abs().min(u32::MAX as u64) as u32;
            self.remove_counters(&kind, amount);
        }
    }

    // === Derived values ===

    /// Power including `+1/+1` and `-1/-1` counters.
    #[must_use]
    pub fn power(&self) -> Option<i64> {
        self.characteristics.power.map(|p| p as i64 + self.counter_modifier())
    }

    /// Toughness including `+1/+1` and `-1/-1` counters.
    #[must_use]
    pub fn toughness(&self) -> Option<i64> {
        self.characteristics
            .toughness
            .map(|t| t as i64 + self.counter_modifier())
    }

    fn counter_modifier(&self) -> i64 {
        self.counter(&CounterKind::PlusOnePlusOne) as i64
            - self.counter(&CounterKind::MinusOneMinusOne) as i64
    }

    /// Current loyalty (loyalty counters).
    #[must_use]
    pub fn loyalty(&self) -> u32 {
        self.counter(&CounterKind::Loyalty)
    }

    /// Reset per-zone state after a zone change. Objects become new objects
    /// when they move, so tap state, damage and counters do not follow.
    pub fn reset_for_zone_change(&mut self, zone: Zone, timestamp: u64) {
        self.zone = zone;
        self.timestamp = timestamp;
        self.controller = self.owner;
        self.tapped = false;
        self.damage = 0;
        self.deathtouch_damage = false;
        self.counters.clear();
        if zone == Zone::Battlefield {
            if let Some(loyalty) = self.characteristics.loyalty {
                self.add_counters(CounterKind::Loyalty, loyalty.max(0) as u32);
            }
        }
    }
}
