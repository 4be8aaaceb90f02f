//! Stack items: spells and abilities awaiting resolution.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::config::Zone;
use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;
use crate::effects::ResolutionStep;

/// Unique identifier for a stack item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StackItemId(pub u32);

impl StackItemId {
    /// Create a new stack item ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StackItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackItem({})", self.0)
    }
}

/// What put the item on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackItemKind {
    /// A cast spell. Its source card sits in the stack zone until it resolves.
    Spell,
    /// An activated ability.
    ActivatedAbility,
    /// A triggered ability.
    TriggeredAbility,
}

/// Something an item can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Object(ObjectId),
    StackItem(StackItemId),
}

/// A chosen target, with the zone and timestamp an object target had when
/// chosen.
///
/// An object target becomes illegal once it changes zones, even if it comes
/// back to the same zone later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub target: Target,
    pub zone: Option<Zone>,
    pub timestamp: Option<u64>,
}

/// A spell or ability on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItem {
    pub id: StackItemId,

    /// Makes choices and receives "you" effects.
    pub controller: PlayerId,

    /// Card or permanent the item came from.
    pub source: Option<ObjectId>,

    pub kind: StackItemKind,

    pub targets: SmallVec<[TargetRef; 2]>,

    /// Steps executed in order on resolution.
    pub payload: Vec<ResolutionStep>,
}

impl StackItem {
    /// Whether the item chose any targets.
    #[must_use]
    pub fn is_targeted(&self) -> bool {
        !self.targets.is_empty()
    }

    /// The n-th chosen target.
    #[must_use]
    pub fn target(&self, index: usize) -> Option<&TargetRef> {
        self.targets.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_item_id() {
        let id = StackItemId::new(3);
        assert_eq!(id.raw(), 3);
        assert_eq!(format!("{}", id), "StackItem(3)");
    }

    #[test]
    fn test_targets() {
        let mut item = StackItem {
            id: StackItemId(0),
            controller: PlayerId(0),
            source: None,
            kind: StackItemKind::Spell,
            targets: SmallVec::new(),
            payload: Vec::new(),
        };
        assert!(!item.is_targeted());

        item.targets.push(TargetRef {
            target: Target::Player(PlayerId(1)),
            zone: None,
            timestamp: None,
        });
        assert!(item.is_targeted());
        assert_eq!(item.target(0).map(|t| t.target), Some(Target::Player(PlayerId(1))));
        assert!(item.target(1).is_none());
    }
}
