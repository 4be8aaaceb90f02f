//! Pending decision steps and the responses that answer them.
//!
//! ## Contract
//!
//! Every decision, whatever its kind, is a `PendingDecisionStep`:
//! an id, the participant who must answer, a `DecisionKind` carrying the
//! minimal context needed to validate an answer, and an optional generating
//! permanent. A `DecisionResponse` names the step, the respondent, the
//! permanent it believes generated the step, and `Selections`.
//!
//! Shape checks live on `DecisionKind::validate`, so a new kind needs one new
//! variant and one match arm, never new call-site logic.

use serde::{Deserialize, Serialize};

use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;
use crate::error::RejectReason;
use crate::stack::StackItemId;

/// Unique identifier for a decision step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub u32);

impl DecisionId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Decision({})", self.0)
    }
}

/// What created the decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionOrigin {
    /// A suspended stack resolution.
    Resolution(StackItemId),
    /// A turn-based action (cleanup discard).
    TurnBasedAction,
    /// A state-based action (legend rule in prompt mode).
    StateBasedAction,
}

/// The kind of choice, with the context needed to validate an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    /// Order `cards` (top of library, topmost first) onto top and bottom.
    Scry { cards: Vec<ObjectId> },
    /// Keep `cards` on top or put them into the graveyard.
    Surveil { cards: Vec<ObjectId> },
    /// Discard `count` cards chosen from `candidates`.
    Discard {
        count: usize,
        candidates: Vec<ObjectId>,
    },
    /// Sacrifice `count` permanents chosen from `candidates`.
    Sacrifice {
        count: usize,
        candidates: Vec<ObjectId>,
    },
    /// Keep one of several same-name legendary permanents.
    LegendRule {
        name: String,
        permanents: Vec<ObjectId>,
    },
    /// Yes or no, for an optional ("may") effect.
    YesNo,
}

impl DecisionKind {
    /// Short name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DecisionKind::Scry { .. } => "scry",
            DecisionKind::Surveil { .. } => "surveil",
            DecisionKind::Discard { .. } => "discard",
            DecisionKind::Sacrifice { .. } => "sacrifice",
            DecisionKind::LegendRule { .. } => "legend_rule",
            DecisionKind::YesNo => "yes_no",
        }
    }

    /// Check that `selections` has the shape this kind requires.
    pub fn validate(&self, step: DecisionId, selections: &Selections) -> Result<(), RejectReason> {
        let invalid = |reason: &str| RejectReason::InvalidSelection {
            step,
            reason: reason.to_string(),
        };
        match (self, selections) {
            (DecisionKind::Scry { cards }, Selections::Order { top, bottom }) => {
                if !is_partition(cards, &[top, bottom]) {
                    return Err(invalid("top and bottom must partition the looked-at cards"));
                }
                Ok(())
            }
            (DecisionKind::Surveil { cards }, Selections::Surveil { top, graveyard }) => {
                if !is_partition(cards, &[top, graveyard]) {
                    return Err(invalid("top and graveyard must partition the looked-at cards"));
                }
                Ok(())
            }
            (
                DecisionKind::Discard { count, candidates }
                | DecisionKind::Sacrifice { count, candidates },
                Selections::Objects(chosen),
            ) => {
                let required = (*count).min(candidates.len());
                if chosen.len() != required {
                    return Err(invalid("wrong number of objects chosen"));
                }
                if has_duplicates(chosen) {
                    return Err(invalid("an object was chosen twice"));
                }
                if chosen.iter().any(|id| !candidates.contains(id)) {
                    return Err(invalid("chosen object is not a candidate"));
                }
                Ok(())
            }
            (DecisionKind::LegendRule { permanents, .. }, Selections::Keep(keep)) => {
                if !permanents.contains(keep) {
                    return Err(invalid("kept permanent is not one of the duplicates"));
                }
                Ok(())
            }
            (DecisionKind::YesNo, Selections::Choice(_)) => Ok(()),
            _ => Err(invalid("selection shape does not match decision kind")),
        }
    }
}

/// A queued, must-be-answered choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecisionStep {
    pub id: DecisionId,

    /// Participant who must answer.
    pub player: PlayerId,

    pub kind: DecisionKind,

    /// Permanent that generated the step. A response must name the same one,
    /// and the step goes stale when it leaves the battlefield.
    pub permanent: Option<ObjectId>,

    /// Optional steps also accept `Selections::Decline`.
    pub mandatory: bool,

    pub origin: DecisionOrigin,
}

impl PendingDecisionStep {
    /// Whether `selections` declines an optional step.
    #[must_use]
    pub fn is_decline(&self, selections: &Selections) -> bool {
        !self.mandatory && matches!(selections, Selections::Decline)
    }
}

/// What a respondent chose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selections {
    /// Scry: cards to keep on top (topmost first) and to put on the bottom
    /// (last one ends up lowest).
    Order {
        top: Vec<ObjectId>,
        bottom: Vec<ObjectId>,
    },
    /// Surveil: cards to keep on top (topmost first) and to mill.
    Surveil {
        top: Vec<ObjectId>,
        graveyard: Vec<ObjectId>,
    },
    /// Discard or sacrifice choices.
    Objects(Vec<ObjectId>),
    /// Legend rule survivor.
    Keep(ObjectId),
    /// Yes/no.
    Choice(bool),
    /// Decline an optional step.
    Decline,
}

/// A response to a pending decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub step_id: DecisionId,
    pub respondent: PlayerId,
    /// Generating permanent, as the respondent saw it.
    pub permanent: Option<ObjectId>,
    pub selections: Selections,
}

fn has_duplicates(ids: &[ObjectId]) -> bool {
    let mut sorted = ids.to_vec();
    sorted.sort();
    sorted.windows(2).any(|w| w[0] == w[1])
}

fn is_partition(cards: &[ObjectId], parts: &[&Vec<ObjectId>]) -> bool {
    let mut chosen: Vec<ObjectId> = parts.iter().flat_map(|p| p.iter().copied()).collect();
    let mut expected = cards.to_vec();
    chosen.sort();
    expected.sort();
    chosen == expected
}
