//! Upgrading event shapes written by older builds.
//!
//! Old logs recorded a few operations differently:
//! - `LoadDeck { player, cards }` imported, shuffled and drew an opening
//!   hand in one event
//! - `Seed(u64)` seeded the generator
//! - `Pass { seat }` passed priority
//!
//! Each is rewritten into the current operations with the same effect. Shapes
//! that match neither the current nor a legacy operation are reported as
//! unknown and skipped by replay.

use serde::Deserialize;
use serde_json::Value;

use crate::cards::Characteristics;
use crate::core::operation::{DeckCard, Operation};
use crate::core::player::PlayerId;

/// A legacy operation shape.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub enum LegacyOperation {
    LoadDeck {
        player: PlayerId,
        cards: Vec<Characteristics>,
    },
    Seed(u64),
    Pass {
        seat: PlayerId,
    },
}

impl LegacyOperation {
    /// Short name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LegacyOperation::LoadDeck { .. } => "load_deck",
            LegacyOperation::Seed(_) => "seed",
            LegacyOperation::Pass { .. } => "pass",
        }
    }

    /// The current operations equivalent to this one.
    #[must_use]
    pub fn upgrade(self, opening_hand: u32) -> Vec<Operation> {
        match self {
            LegacyOperation::LoadDeck { player, cards } => vec![
                Operation::ImportDeck {
                    player,
                    cards: cards.into_iter().map(DeckCard::new).collect(),
                },
                Operation::Shuffle { player },
                Operation::Draw {
                    player,
                    count: opening_hand,
                },
            ],
            LegacyOperation::Seed(seed) => vec![Operation::SeedRng { seed }],
            LegacyOperation::Pass { seat } => vec![Operation::PassPriority { player: seat }],
        }
    }
}

/// A decoded operation payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    Current(Operation),
    Legacy(LegacyOperation),
    Unknown(String),
}

/// Decode an operation payload, trying the current shape first.
#[must_use]
pub fn decode_operation(value: Value) -> Decoded {
    match serde_json::from_value::<Operation>(value.clone()) {
        Ok(op) => Decoded::Current(op),
        Err(current) => match serde_json::from_value::<LegacyOperation>(value) {
            Ok(legacy) => Decoded::Legacy(legacy),
            Err(_) => Decoded::Unknown(current.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_shape_wins() {
        let decoded = decode_operation(json!({"Shuffle": {"player": 0}}));
        assert_eq!(
            decoded,
            Decoded::Current(Operation::Shuffle {
                player: PlayerId(0)
            })
        );
    }

    #[test]
    fn test_load_deck_upgrade() {
        let cards = vec![Characteristics::basic_land("Forest")];
        let value = json!({"LoadDeck": {"player": 1, "cards": cards}});
        let Decoded::Legacy(legacy) = decode_operation(value) else {
            panic!("expected legacy shape");
        };
        assert_eq!(legacy.name(), "load_deck");
        assert_eq!(
            legacy.upgrade(7),
            vec![
                Operation::ImportDeck {
                    player: PlayerId(1),
                    cards: vec![DeckCard::new(Characteristics::basic_land("Forest"))],
                },
                Operation::Shuffle {
                    player: PlayerId(1)
                },
                Operation::Draw {
                    player: PlayerId(1),
                    count: 7
                },
            ]
        );
    }

    #[test]
    fn test_seed_and_pass_upgrade() {
        let Decoded::Legacy(seed) = decode_operation(json!({"Seed": 99})) else {
            panic!("expected legacy seed");
        };
        assert_eq!(seed.upgrade(7), vec![Operation::SeedRng { seed: 99 }]);

        let Decoded::Legacy(pass) = decode_operation(json!({"Pass": {"seat": 2}})) else {
            panic!("expected legacy pass");
        };
        assert_eq!(
            pass.upgrade(7),
            vec![Operation::PassPriority {
                player: PlayerId(2)
            }]
        );
    }

    #[test]
    fn test_unknown_shape() {
        assert!(matches!(
            decode_operation(json!({"CastFireball": {"x": 3}})),
            Decoded::Unknown(_)
        ));
    }
}
