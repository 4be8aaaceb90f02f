//! Priority-based stack (MTG-style).
//!
//! Items are pushed onto a stack and resolve in LIFO order. Participants pass
//! priority in turn order; when every participant still in the game has passed
//! in succession, the top of the stack resolves, or, with an empty stack, the
//! turn moves on to the next step.
//!
//! The round remembers who has passed, not just how many passes there were:
//! priority only moves to seats that have not passed yet, so a change of turn
//! direction mid-round cannot hand priority back to someone twice.
//!
//! `PriorityStack` only tracks the token and the sequence. What "resolve" and
//! "advance" do is up to the caller, which acts on the returned `PassResult`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::item::{StackItem, StackItemId};
use crate::core::player::{Participant, PlayerId};
use crate::error::RejectReason;
use crate::turn::{next_seat, TurnDirection};

/// Result of passing priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassResult {
    /// Priority moved to the next participant.
    Continue(PlayerId),
    /// All participants passed in succession; resolve the top of the stack.
    StackResolves,
    /// All participants passed with an empty stack; the step ends.
    StepEnds,
}

/// The stack and the priority token.
///
/// ## Usage
///
/// ```
/// use ccg_engine::stack::{PriorityStack, StackItem, StackItemId, StackItemKind};
/// use ccg_engine::core::PlayerId;
///
/// let mut stack = PriorityStack::new();
/// let item = |id| StackItem {
///     id,
///     controller: PlayerId(0),
///     source: None,
///     kind: StackItemKind::Spell,
///     targets: Default::default(),
///     payload: vec![],
/// };
///
/// let a = stack.next_id();
/// stack.push(item(a), PlayerId(0));
/// let b = stack.next_id();
/// stack.push(item(b), PlayerId(0));
///
/// assert_eq!(stack.peek().map(|i| i.id), Some(b));
/// assert_eq!(stack.pop().map(|i| i.id), Some(b));
/// assert_eq!(stack.pop().map(|i| i.id), Some(a));
/// assert!(stack.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityStack {
    /// The stack (index 0 = bottom, last = top).
    items: Vec<StackItem>,

    /// Participant who currently has priority.
    holder: Option<PlayerId>,

    /// Participants who have passed since the last push, resolution or grant.
    passed: BTreeSet<PlayerId>,

    /// Next stack item ID.
    next_id: u32,
}

impl PriorityStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the id for the next pushed item.
    pub fn next_id(&mut self) -> StackItemId {
        let id = StackItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of items on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Peek at the top of the stack without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&StackItem> {
        self.items.last()
    }

    /// Items from top to bottom.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &StackItem> {
        self.items.iter().rev()
    }

    #[must_use]
    pub fn contains(&self, id: StackItemId) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Push an item. Interrupts any pass sequence and gives `active` priority.
    pub fn push(&mut self, item: StackItem, active: PlayerId) {
        self.items.push(item);
        self.grant(active);
    }

    /// Pop the top item.
    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop()
    }

    /// Remove an item wherever it is (it was countered).
    pub fn remove(&mut self, id: StackItemId) -> Option<StackItem> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Participant holding priority.
    #[must_use]
    pub fn holder(&self) -> Option<PlayerId> {
        self.holder
    }

    /// Passes since the last push, resolution, or step change.
    #[must_use]
    pub fn consecutive_passes(&self) -> usize {
        self.passed.len()
    }

    /// Whether `player` has passed in the current round.
    #[must_use]
    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.passed.contains(&player)
    }

    /// Give priority to `player` and reset the pass count.
    pub fn grant(&mut self, player: PlayerId) {
        self.holder = Some(player);
        self.passed.clear();
    }

    /// Nobody holds priority (the session ended or nobody is left).
    pub fn clear_holder(&mut self) {
        self.holder = None;
        self.passed.clear();
    }

    /// Record a pass by `player`.
    ///
    /// Rejected unless `player` holds priority. Participants not in the game
    /// are skipped when rotating and do not count towards unanimity.
    pub fn pass(
        &mut self,
        player: PlayerId,
        participants: &[Participant],
        direction: TurnDirection,
    ) -> Result<PassResult, RejectReason> {
        if self.holder != Some(player) {
            return Err(RejectReason::NotPriorityHolder {
                player,
                holder: self.holder,
            });
        }

        self.passed.insert(player);
        let unanimous = participants
            .iter()
            .filter(|p| p.in_game())
            .all(|p| self.passed.contains(&p.id));
        let waiting = |p: &Participant| p.in_game() && !self.passed.contains(&p.id);
        let next = if unanimous {
            None
        } else {
            next_seat(participants, player, direction, waiting)
        };

        match next {
            Some(next) => {
                self.holder = Some(next);
                Ok(PassResult::Continue(next))
            }
            None => Ok(if self.items.is_empty() {
                PassResult::StepEnds
            } else {
                PassResult::StackResolves
            }),
        }
    }
}
