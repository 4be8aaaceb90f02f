//! Printed characteristics of an object.
//!
//! Characteristics arrive already structured: the text-to-effect translator
//! and deck importer run upstream and hand the engine typed values. The engine
//! only interprets what the rules checks need (types, supertypes, power,
//! toughness, loyalty, a few keywords).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Card type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Battle,
    Creature,
    Enchantment,
    Instant,
    Land,
    Planeswalker,
    Sorcery,
}

/// Supertype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Basic,
    Legendary,
    Snow,
    World,
}

/// Keywords the engine itself consults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    /// Any damage from this source is lethal.
    Deathtouch,
    /// Not destroyed by lethal damage or destroy effects.
    Indestructible,
}

/// Characteristics of a card or token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub card_types: SmallVec<[CardType; 2]>,
    pub supertypes: SmallVec<[Supertype; 1]>,
    pub subtypes: SmallVec<[String; 2]>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    /// Loyalty a planeswalker enters with.
    pub loyalty: Option<i32>,
    pub keywords: SmallVec<[Keyword; 2]>,
}

impl Characteristics {
    /// Characteristics with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            card_types: SmallVec::new(),
            supertypes: SmallVec::new(),
            subtypes: SmallVec::new(),
            power: None,
            toughness: None,
            loyalty: None,
            keywords: SmallVec::new(),
        }
    }

    /// A creature with the given power and toughness.
    pub fn creature(name: impl Into<String>, power: i32, toughness: i32) -> Self {
        let mut c = Self::new(name).with_type(CardType::Creature);
        c.power = Some(power);
        c.toughness = Some(toughness);
        c
    }

    /// A planeswalker with the given starting loyalty.
    pub fn planeswalker(name: impl Into<String>, loyalty: i32) -> Self {
        let mut c = Self::new(name)
            .with_type(CardType::Planeswalker)
            .with_supertype(Supertype::Legendary);
        c.loyalty = Some(loyalty);
        c
    }

    /// A basic land.
    pub fn basic_land(name: impl Into<String>) -> Self {
        Self::new(name)
            .with_type(CardType::Land)
            .with_supertype(Supertype::Basic)
    }

    /// Add a card type.
    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        if !self.card_types.contains(&card_type) {
            self.card_types.push(card_type);
        }
        self
    }

    /// Add a supertype.
    #[must_use]
    pub fn with_supertype(mut self, supertype: Supertype) -> Self {
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        self
    }

    /// Add a subtype.
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    /// Add a keyword.
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    /// Mark legendary.
    #[must_use]
    pub fn legendary(self) -> Self {
        self.with_supertype(Supertype::Legendary)
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    #[must_use]
    pub fn has_supertype(&self, supertype: Supertype) -> bool {
        self.supertypes.contains(&supertype)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Permanent cards stay on the battlefield when they resolve.
    #[must_use]
    pub fn is_permanent_card(&self) -> bool {
        !self.has_type(CardType::Instant) && !self.has_type(CardType::Sorcery)
    }
}
