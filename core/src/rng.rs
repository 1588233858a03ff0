//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SimRng instances derived
//! from the single master seed handed to the engine.
//!
//! Each consumer gets its own RNG stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new consumer never changes existing streams.
//!   - Each stream is fully reproducible in isolation.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct SimRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SimRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Uniform index in [0, n).
    pub fn index_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Pick `amount` distinct items uniformly, without replacement.
    /// The result is in draw order.
    pub fn sample<T: Copy>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        rand::seq::index::sample(&mut self.inner, items.len(), amount)
            .into_iter()
            .map(|i| items[i])
            .collect()
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        use rand::seq::SliceRandom;
        items.shuffle(&mut self.inner);
    }
}

/// Hands out the per-slot streams for a single run.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_slot(&self, slot: RngSlot) -> SimRng {
        SimRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Placement = 0,
    Movement = 1,
    MapGen = 2,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Placement => "placement",
            Self::Movement => "movement",
            Self::MapGen => "map_gen",
        }
    }
}
