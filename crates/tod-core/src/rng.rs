//! Injectable randomness for the stochastic sub-allocators.
//!
//! # Determinism strategy
//!
//! Every region gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (region_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive region indices uniformly across the seed space.
//! This means:
//!
//! - Regions never share RNG state, so the order in which a caller processes
//!   them does not change any region's draws.
//! - Adding regions at the end of a table does not disturb the seeds of the
//!   existing ones.
//!
//! Algorithms take a generic `R: rand::Rng + ?Sized` so tests can script
//! the draws; the engine hands them [`SeededRng::inner`].

use rand::SeedableRng;
use rand::rngs::SmallRng;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic generator scoped to one allocation call.
pub struct SeededRng(SmallRng);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        SeededRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed deterministically from the run's global seed and a region's
    /// position in the input table.
    pub fn for_region(global_seed: u64, region_index: usize) -> Self {
        let seed = global_seed ^ (region_index as u64).wrapping_mul(MIXING_CONSTANT);
        SeededRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types
    /// (`WeightedIndex`, `gen_range`, ...).
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}
