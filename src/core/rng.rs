//! Deterministic random number generation for replayable sessions.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Call-indexed**: Every randomness-consuming operation draws from its own
//!   ChaCha8 stream selected by `(seed, call index)`, so a shuffle never depends on
//!   how many words an earlier shuffle consumed
//! - **Serializable**: the whole state is two integers
//!
//! ## Replay Usage
//!
//! ```
//! use ccg_engine::core::GameRng;
//!
//! let mut live = GameRng::new(42);
//! let mut replayed = GameRng::new(42);
//!
//! let mut a = vec![1, 2, 3, 4, 5];
//! let mut b = a.clone();
//! live.shuffle(&mut a);
//! replayed.shuffle(&mut b);
//! assert_eq!(a, b);
//! assert_eq!(live.calls(), 1);
//! ```

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG whose output is a pure function of `(seed, call index)`.
///
/// Uses ChaCha8 for speed while maintaining cryptographic quality randomness.
/// Each shuffle consumes exactly one call index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRng {
    seed: u64,
    calls: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed, calls: 0 }
    }

    /// The session seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of randomness-consuming calls made so far.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// The stream for a given call index.
    fn stream_at(seed: u64, call_index: u64) -> ChaCha8Rng {
        let mut stream = ChaCha8Rng::seed_from_u64(seed);
        stream.set_stream(call_index);
        stream
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let mut stream = Self::stream_at(self.seed, self.calls);
        self.calls += 1;
        slice.shuffle(&mut stream);
    }
}
