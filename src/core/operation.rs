//! Operations: the closed set of inputs the engine accepts.
//!
//! Every accepted operation is applied by `Engine::apply` and appended verbatim
//! to the event log. Operations carry parameters, never results: a `Shuffle`
//! has no resulting order, which is reproduced by re-invoking the seeded
//! generator at the same call index on replay.

use serde::{Deserialize, Serialize};

use super::config::Zone;
use super::entity::ObjectId;
use super::player::PlayerId;
use crate::cards::{Characteristics, CounterKind};
use crate::decisions::{DecisionId, DecisionResponse};
use crate::effects::ResolutionStep;
use crate::stack::{StackItemKind, Target};
use crate::turn::TurnDirection;
use crate::zones::ZonePosition;

/// A card in an imported deck list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCard {
    pub characteristics: Characteristics,
    /// Starts in the command zone as the participant's commander.
    pub commander: bool,
}

impl DeckCard {
    #[must_use]
    pub fn new(characteristics: Characteristics) -> Self {
        Self {
            characteristics,
            commander: false,
        }
    }

    #[must_use]
    pub fn commander(characteristics: Characteristics) -> Self {
        Self {
            characteristics,
            commander: true,
        }
    }
}

/// A structured command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    // === Participants ===
    /// Take the next seat, or watch as a spectator.
    Join { name: String, spectator: bool },
    /// Leave the session. A seated participant who leaves is out of the game.
    Leave { player: PlayerId },
    /// Concede.
    Concede { player: PlayerId },

    // === Randomness ===
    /// Seed the session generator. Must be the first event of a log.
    SeedRng { seed: u64 },

    // === Zones ===
    /// Put a deck list into the participant's library (commanders into the
    /// command zone), in list order, bottom first.
    ImportDeck {
        player: PlayerId,
        cards: Vec<DeckCard>,
    },
    Shuffle { player: PlayerId },
    Draw { player: PlayerId, count: u32 },
    MoveObject {
        object: ObjectId,
        to: Zone,
        position: ZonePosition,
    },
    /// Replace the order of a zone with a permutation of its contents, bottom first.
    Reorder {
        player: PlayerId,
        zone: Zone,
        order: Vec<ObjectId>,
    },

    // === Stack ===
    PushStack {
        controller: PlayerId,
        source: Option<ObjectId>,
        kind: StackItemKind,
        targets: Vec<Target>,
        payload: Vec<ResolutionStep>,
    },
    PassPriority { player: PlayerId },
    /// Resolve the top item without waiting for passes.
    ResolveTop,

    // === Turn ===
    NextStep,
    NextTurn,
    SetTurnDirection { direction: TurnDirection },

    // === Permanents ===
    UpdateCounters {
        object: ObjectId,
        kind: CounterKind,
        delta: i64,
    },
    CreateToken {
        controller: PlayerId,
        characteristics: Characteristics,
    },
    RemoveObject { object: ObjectId },
    DealDamage {
        source: Option<ObjectId>,
        target: Target,
        amount: u32,
    },
    AdjustLife { player: PlayerId, delta: i64 },
    /// Adjust a named participant resource (mana, energy, ...); missing keys start at zero.
    AdjustResource {
        player: PlayerId,
        key: String,
        delta: i64,
    },

    // === Decisions ===
    SubmitDecision(DecisionResponse),
    /// Administrative removal of a pending step without applying its effect.
    RemoveDecision { step_id: DecisionId },
}

impl Operation {
    /// Short name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Join { .. } => "join",
            Operation::Leave { .. } => "leave",
            Operation::Concede { .. } => "concede",
            Operation::SeedRng { .. } => "seed_rng",
            Operation::ImportDeck { .. } => "import_deck",
            Operation::Shuffle { .. } => "shuffle",
            Operation::Draw { .. } => "draw",
            Operation::MoveObject { .. } => "move_object",
            Operation::Reorder { .. } => "reorder",
            Operation::PushStack { .. } => "push_stack",
            Operation::PassPriority { .. } => "pass_priority",
            Operation::ResolveTop => "resolve_top",
            Operation::NextStep => "next_step",
            Operation::NextTurn => "next_turn",
            Operation::SetTurnDirection { .. } => "set_turn_direction",
            Operation::UpdateCounters { .. } => "update_counters",
            Operation::CreateToken { .. } => "create_token",
            Operation::RemoveObject { .. } => "remove_object",
            Operation::DealDamage { .. } => "deal_damage",
            Operation::AdjustLife { .. } => "adjust_life",
            Operation::AdjustResource { .. } => "adjust_resource",
            Operation::SubmitDecision(_) => "submit_decision",
            Operation::RemoveDecision { .. } => "remove_decision",
        }
    }
}
