//! Turn structure: phases, steps, and the per-turn cycle.
//!
//! A turn runs through a fixed ordered list of (phase, step) pairs:
//!
//! ```text
//! Beginning:   Untap -> Upkeep -> Draw
//! PrecombatMain
//! Combat:      BeginCombat -> DeclareAttackers -> DeclareBlockers -> CombatDamage -> EndCombat
//! PostcombatMain
//! Ending:      End -> Cleanup
//! ```
//!
//! Main phases have no steps. Wrapping past Cleanup starts a new turn: the
//! turn counter increments, the active seat rotates in the current direction
//! and per-turn counters reset.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::player::{Participant, PlayerId};

/// A phase of the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Beginning,
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

/// A step within a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,
    End,
    Cleanup,
}

/// Direction the active seat rotates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnDirection {
    /// Ascending seat order.
    #[default]
    Clockwise,
    /// Descending seat order.
    Counterclockwise,
}

impl TurnDirection {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            TurnDirection::Clockwise => TurnDirection::Counterclockwise,
            TurnDirection::Counterclockwise => TurnDirection::Clockwise,
        }
    }
}

/// Returns the next step within a phase, or None if the phase is over.
#[must_use]
pub fn next_step(phase: Phase, current: Option<Step>) -> Option<Step> {
    match (phase, current) {
        (Phase::Beginning, None) => Some(Step::Untap),
        (Phase::Beginning, Some(Step::Untap)) => Some(Step::Upkeep),
        (Phase::Beginning, Some(Step::Upkeep)) => Some(Step::Draw),

        (Phase::Combat, None) => Some(Step::BeginCombat),
        (Phase::Combat, Some(Step::BeginCombat)) => Some(Step::DeclareAttackers),
        (Phase::Combat, Some(Step::DeclareAttackers)) => Some(Step::DeclareBlockers),
        (Phase::Combat, Some(Step::DeclareBlockers)) => Some(Step::CombatDamage),
        (Phase::Combat, Some(Step::CombatDamage)) => Some(Step::EndCombat),

        (Phase::Ending, None) => Some(Step::End),
        (Phase::Ending, Some(Step::End)) => Some(Step::Cleanup),

        _ => None,
    }
}

/// Returns the next phase, or None at the end of the turn.
#[must_use]
pub fn next_phase(phase: Phase) -> Option<Phase> {
    match phase {
        Phase::Beginning => Some(Phase::PrecombatMain),
        Phase::PrecombatMain => Some(Phase::Combat),
        Phase::Combat => Some(Phase::PostcombatMain),
        Phase::PostcombatMain => Some(Phase::Ending),
        Phase::Ending => None,
    }
}

/// Where `advance` landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// A later step of the same turn.
    SameTurn,
    /// Wrapped to the first step of a new turn.
    NewTurn,
}

/// Per-turn counter bumped when a land moves from hand onto the battlefield.
pub const LANDS_PLAYED: &str = "lands_played";

/// Per-turn counter bumped when a spell is pushed onto the stack.
pub const SPELLS_CAST: &str = "spells_cast";

/// Turn counter, active seat, current position in the cycle, and per-turn counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn number, starting at 1.
    pub number: u32,
    /// Seat taking the turn.
    pub active: PlayerId,
    pub phase: Phase,
    pub step: Option<Step>,
    pub direction: TurnDirection,
    /// Per-turn counters (lands played, spells cast, ...), cleared at each new turn.
    pub counters: FxHashMap<String, i64>,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            number: 1,
            active: PlayerId(0),
            phase: Phase::Beginning,
            step: Some(Step::Untap),
            direction: TurnDirection::Clockwise,
            counters: FxHashMap::default(),
        }
    }
}

impl TurnState {
    /// Current (phase, step) pair.
    #[must_use]
    pub fn position(&self) -> (Phase, Option<Step>) {
        (self.phase, self.step)
    }

    /// Whether the current position is the given step.
    #[must_use]
    pub fn is_step(&self, step: Step) -> bool {
        self.step == Some(step)
    }

    /// Move to the next (phase, step) pair.
    ///
    /// On wrap the turn counter increments, the active seat becomes `next_active`
    /// and per-turn counters reset.
    pub fn advance(&mut self, next_active: PlayerId) -> Advance {
        if let Some(step) = next_step(self.phase, self.step) {
            self.step = Some(step);
            return Advance::SameTurn;
        }
        if let Some(phase) = next_phase(self.phase) {
            self.phase = phase;
            self.step = next_step(phase, None);
            return Advance::SameTurn;
        }
        self.begin_turn(next_active);
        Advance::NewTurn
    }

    /// Jump to the first step of the next turn.
    pub fn begin_turn(&mut self, active: PlayerId) {
        self.number += 1;
        self.active = active;
        self.phase = Phase::Beginning;
        self.step = Some(Step::Untap);
        self.counters.clear();
    }

    /// Read a per-turn counter.
    #[must_use]
    pub fn counter(&self, key: &str) -> i64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    /// Modify a per-turn counter.
    pub fn bump_counter(&mut self, key: &str, delta: i64) {
        *self.counters.entry(key.to_string()).or_insert(0) += delta;
    }
}

/// Next participant after `from` in `direction` that satisfies `eligible`.
///
/// Wraps around the seat list; returns `from` itself only if it is the sole
/// eligible seat, and `None` if nobody is eligible.
pub fn next_seat(
    participants: &[Participant],
    from: PlayerId,
    direction: TurnDirection,
    eligible: impl Fn(&Participant) -> bool,
) -> Option<PlayerId> {
    let count = participants.len();
    if count == 0 {
        return None;
    }
    let start = from.index().min(count - 1);
    (1..=count)
        .map(|offset| match direction {
            TurnDirection::Clockwise => (start + offset) % count,
            TurnDirection::Counterclockwise => (start + count * 2 - offset) % count,
        })
        .map(|idx| &participants[idx])
        .find(|p| eligible(p))
        .map(|p| p.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(n: u8) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant::seated(PlayerId(i), format!("p{i}"), 20))
            .collect()
    }

    #[test]
    fn test_full_cycle_returns_to_untap() {
        let mut turn = TurnState::default();
        let mut steps = 0;
        loop {
            steps += 1;
            if turn.advance(PlayerId(1)) == Advance::NewTurn {
                break;
            }
        }
        // Upkeep, Draw, Main1, BeginCombat..EndCombat (5), Main2, End, Cleanup, wrap
        assert_eq!(steps, 12);
        assert_eq!(turn.position(), (Phase::Beginning, Some(Step::Untap)));
        assert_eq!(turn.number, 2);
        assert_eq!(turn.active, PlayerId(1));
    }

    #[test]
    fn test_main_phases_have_no_step() {
        let mut turn = TurnState::default();
        turn.advance(PlayerId(0));
        turn.advance(PlayerId(0));
        turn.advance(PlayerId(0));
        assert_eq!(turn.position(), (Phase::PrecombatMain, None));
        turn.advance(PlayerId(0));
        assert_eq!(turn.position(), (Phase::Combat, Some(Step::BeginCombat)));
    }

    #[test]
    fn test_counters_reset_at_new_turn() {
        let mut turn = TurnState::default();
        turn.bump_counter(LANDS_PLAYED, 1);
        turn.advance(PlayerId(0));
        assert_eq!(turn.counter(LANDS_PLAYED), 1);

        turn.begin_turn(PlayerId(1));
        assert_eq!(turn.counter(LANDS_PLAYED), 0);
    }

    #[test]
    fn test_next_seat_both_directions() {
        let players = seats(4);
        let any = |_: &Participant| true;
        assert_eq!(
            next_seat(&players, PlayerId(3), TurnDirection::Clockwise, any),
            Some(PlayerId(0))
        );
        assert_eq!(
            next_seat(&players, PlayerId(0), TurnDirection::Counterclockwise, any),
            Some(PlayerId(3))
        );
    }

    #[test]
    fn test_next_seat_skips_ineligible() {
        let mut players = seats(3);
        players[1].left = true;
        assert_eq!(
            next_seat(&players, PlayerId(0), TurnDirection::Clockwise, Participant::in_game),
            Some(PlayerId(2))
        );

        players[2].left = true;
        assert_eq!(
            next_seat(&players, PlayerId(0), TurnDirection::Clockwise, Participant::in_game),
            Some(PlayerId(0))
        );

        players[0].left = true;
        assert_eq!(
            next_seat(&players, PlayerId(0), TurnDirection::Clockwise, Participant::in_game),
            None
        );
    }

    #[test]
    fn test_direction_reversed() {
        assert_eq!(
            TurnDirection::Clockwise.reversed(),
            TurnDirection::Counterclockwise
        );
    }
}
