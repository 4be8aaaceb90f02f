//! Primitive resolution steps.
//!
//! A stack item's payload is an ordered list of `ResolutionStep`s produced
//! upstream by the card-text translator. Steps name players and objects
//! indirectly through `PlayerRef`/`ObjectRef` so one payload shape serves
//! every card: "target creature", "its controller", "this permanent".
//!
//! Steps marked *choice* suspend resolution with a pending decision when the
//! choice is not forced.

use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Characteristics, CounterKind};
use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;

/// A player named by a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRef {
    /// The stack item's controller.
    Controller,
    /// The player chosen as the item's n-th target.
    Target(usize),
    /// The controller of the object chosen as the item's n-th target.
    ControllerOfTarget(usize),
    /// A fixed player.
    Player(PlayerId),
}

/// An object named by a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectRef {
    /// The item's source object.
    Source,
    /// The object chosen as the item's n-th target.
    Target(usize),
    /// A fixed object.
    Object(ObjectId),
}

/// Who receives damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageRecipient {
    /// Whatever the n-th target is (player or permanent).
    Target(usize),
    Player(PlayerRef),
    Object(ObjectRef),
}

/// One primitive step of a resolution payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStep {
    /// Source deals damage.
    DealDamage { to: DamageRecipient, amount: u32 },
    GainLife { player: PlayerRef, amount: u32 },
    LoseLife { player: PlayerRef, amount: u32 },
    AddPoison { player: PlayerRef, amount: u32 },
    Draw { player: PlayerRef, count: u32 },
    /// Top cards of the library into the graveyard.
    Mill { player: PlayerRef, count: u32 },
    /// *Choice*: the player discards `count` cards of their choosing.
    Discard { player: PlayerRef, count: u32 },
    /// *Choice*: the player sacrifices `count` permanents, optionally of one type.
    Sacrifice {
        player: PlayerRef,
        count: u32,
        card_type: Option<CardType>,
    },
    PutCounters {
        object: ObjectRef,
        kind: CounterKind,
        amount: u32,
    },
    RemoveCounters {
        object: ObjectRef,
        kind: CounterKind,
        amount: u32,
    },
    CreateToken {
        player: PlayerRef,
        token: Characteristics,
        count: u32,
    },
    /// Destroy a permanent unless it is indestructible.
    Destroy { object: ObjectRef },
    Exile { object: ObjectRef },
    ReturnToHand { object: ObjectRef },
    Tap { object: ObjectRef },
    Untap { object: ObjectRef },
    /// Counter the stack item chosen as the n-th target.
    CounterItem { target: usize },
    /// *Choice*: look at the top `count` cards, order them on top or bottom.
    Scry { player: PlayerRef, count: u32 },
    /// *Choice*: look at the top `count` cards, keep on top or mill.
    Surveil { player: PlayerRef, count: u32 },
    /// *Choice*: the player may perform `steps`; declining skips them.
    May {
        player: PlayerRef,
        steps: Vec<ResolutionStep>,
    },
}

impl ResolutionStep {
    /// Short name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionStep::DealDamage { .. } => "deal_damage",
            ResolutionStep::GainLife { .. } => "gain_life",
            ResolutionStep::LoseLife { .. } => "lose_life",
            ResolutionStep::AddPoison { .. } => "add_poison",
            ResolutionStep::Draw { .. } => "draw",
            ResolutionStep::Mill { .. } => "mill",
            ResolutionStep::Discard { .. } => "discard",
            ResolutionStep::Sacrifice { .. } => "sacrifice",
            ResolutionStep::PutCounters { .. } => "put_counters",
            ResolutionStep::RemoveCounters { .. } => "remove_counters",
            ResolutionStep::CreateToken { .. } => "create_token",
            ResolutionStep::Destroy { .. } => "destroy",
            ResolutionStep::Exile { .. } => "exile",
            ResolutionStep::ReturnToHand { .. } => "return_to_hand",
            ResolutionStep::Tap { .. } => "tap",
            ResolutionStep::Untap { .. } => "untap",
            ResolutionStep::CounterItem { .. } => "counter_item",
            ResolutionStep::Scry { .. } => "scry",
            ResolutionStep::Surveil { .. } => "surveil",
            ResolutionStep::May { .. } => "may",
        }
    }
}
