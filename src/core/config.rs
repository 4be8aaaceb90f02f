//! Session configuration types.
//!
//! Hosts configure a session when it is created:
//! - `Zone`: the fixed set of zones every participant owns
//! - `ZoneVisibility`: who may see a zone's contents
//! - `SessionConfig`: format, thresholds, and rule options
//!
//! Configuration is fixed for the lifetime of a session. It is not part of the
//! event log, so a replay must be started with the same `SessionConfig`.

use serde::{Deserialize, Serialize};

/// A zone an object can occupy.
///
/// Every zone is owned by a participant. Battlefield and stack contents are
/// public regardless of owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Exile,
    Stack,
    Command,
}

impl Zone {
    /// All zones, in a fixed order.
    pub const ALL: [Zone; 7] = [
        Zone::Library,
        Zone::Hand,
        Zone::Battlefield,
        Zone::Graveyard,
        Zone::Exile,
        Zone::Stack,
        Zone::Command,
    ];

    /// Visibility rules for this zone.
    #[must_use]
    pub const fn visibility(self) -> ZoneVisibility {
        match self {
            Zone::Library => ZoneVisibility::Hidden,
            Zone::Hand => ZoneVisibility::OwnerOnly,
            _ => ZoneVisibility::Public,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Exile => "exile",
            Zone::Stack => "stack",
            Zone::Command => "command",
        };
        f.write_str(name)
    }
}

/// Zone visibility rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneVisibility {
    /// All objects visible to everyone (battlefield, graveyard).
    Public,
    /// Objects visible only to the zone owner (hand).
    OwnerOnly,
    /// Objects visible to nobody; only the count is public (library).
    Hidden,
}

/// Game format. Selects defaults and format-specific state-based actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Format {
    #[default]
    Standard,
    /// Enables the cumulative single-commander damage check.
    Commander,
}

/// How the legend rule picks the survivor.
///
/// `KeepNewest` is the default because it lets the state-based check reduce
/// duplicates to one in a single pass without waiting on anyone. Use `Prompt`
/// when the controller should choose which copy stays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegendRuleMode {
    /// Keep the permanent with the newest timestamp, in the same checker pass.
    #[default]
    KeepNewest,
    /// Ask the controller through a `LegendRule` decision.
    Prompt,
}

/// Configuration for a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Game format.
    pub format: Format,

    /// Life total of a newly seated participant.
    pub starting_life: i64,

    /// Poison counters at which a participant loses.
    pub poison_threshold: u32,

    /// Damage from a single commander at which a participant loses.
    pub commander_damage_threshold: i64,

    /// Cards kept at cleanup before a discard is required.
    pub max_hand_size: usize,

    /// Size of the opening hand synthesised for legacy deck loads.
    pub opening_hand_size: usize,

    /// Maximum seated participants. Spectators are not counted.
    pub max_seats: usize,

    /// Skip the draw of the very first turn.
    pub skip_first_draw: bool,

    /// Legend rule behaviour.
    pub legend_rule: LegendRuleMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: Format::Standard,
            starting_life: 20,
            poison_threshold: 10,
            commander_damage_threshold: 21,
            max_hand_size: 7,
            opening_hand_size: 7,
            max_seats: 8,
            skip_first_draw: true,
            legend_rule: LegendRuleMode::KeepNewest,
        }
    }
}

impl SessionConfig {
    /// Create a standard-format configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commander defaults: 40 life, commander damage checks enabled.
    #[must_use]
    pub fn commander() -> Self {
        Self {
            format: Format::Commander,
            starting_life: 40,
            ..Self::default()
        }
    }

    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    /// Set the maximum hand size.
    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    /// Set the maximum number of seats.
    #[must_use]
    pub fn with_max_seats(mut self, seats: usize) -> Self {
        self.max_seats = seats;
        self
    }

    /// Draw on the first turn as well.
    #[must_use]
    pub fn draw_on_first_turn(mut self) -> Self {
        self.skip_first_draw = false;
        self
    }

    /// Set the legend rule mode.
    #[must_use]
    pub fn with_legend_rule(mut self, mode: LegendRuleMode) -> Self {
        self.legend_rule = mode;
        self
    }
}
