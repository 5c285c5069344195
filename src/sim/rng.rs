//! Seeded Mulberry32 generator
//!
//! Every random decision in a race flows through one of these. Outcome draws
//! (winner, trajectory shape) and cosmetic draws (variant skins) each get their
//! own instance so that changing one never perturbs the other.
//!
//! `SeededRandom` also implements the `rand` core traits, so it can drive
//! `rand` helpers such as `SliceRandom::shuffle` (see `Roster::shuffled`).

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Mulberry32 increment
const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;

/// 2^32, maps a u32 onto [0, 1)
const U32_RANGE: f64 = 4_294_967_296.0;

/// Deterministic 32-bit pseudo-random source.
///
/// Output is bit-identical for a given seed and call order on every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    /// Create a generator. `None` falls back to a time-derived seed, which
    /// gives up reproducibility.
    pub fn new(seed: Option<u32>) -> Self {
        Self {
            state: seed.unwrap_or_else(crate::time_seed),
        }
    }

    /// Create a generator from a fixed seed
    pub fn with_seed(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Raw internal state (for snapshots)
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next float in [0, 1). All other draws derive from this one.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / U32_RANGE
    }

    /// Integer in `[min, max]`, inclusive at both ends
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        (self.next_f64() * (max - min + 1) as f64).floor() as i64 + min
    }

    /// Float in `[min, max)`
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        self.next_f64() * (max - min) + min
    }

    /// Uniform index into a sequence of length `len`
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.next_int(0, len as i64 - 1) as usize)
    }

    /// Pick a random element
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.pick_index(items.len()).map(|i| &items[i])
    }

    /// Fisher-Yates shuffle into a new vector
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut result = items.to_vec();
        for i in (1..result.len()).rev() {
            let j = self.next_int(0, i as i64) as usize;
            result.swap(i, j);
        }
        result
    }
}

impl RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for SeededRandom {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::with_seed(u32::from_le_bytes(seed))
    }
}
