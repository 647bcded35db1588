//! Seeded randomness for tree generation.
//!
//! A master `ChaCha8Rng` hands out one derived stream per named concern, so
//! adding draws to one concern never shifts the sequence seen by another.

use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    seed: u64,
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    /// Seeds from OS entropy. The chosen seed is kept so the run can be replayed.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stream(&mut self, name: &str) -> StreamRng<'_> {
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 8];
            self.master.fill_bytes(&mut seed_bytes);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
        });
        StreamRng { inner: entry }
    }
}

pub struct StreamRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for StreamRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Draws an index with probability proportional to its weight.
///
/// Returns `None` for an empty slice, an all-zero slice, or any negative or
/// non-finite weight.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    if weights.iter().any(|w| !w.is_finite()) {
        return None;
    }
    let dist = WeightedIndex::new(weights).ok()?;
    Some(dist.sample(rng))
}

/// Weighted pick over parallel candidate and weight slices.
pub fn weighted_choice<'c, T, R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &'c [T],
    weights: &[f64],
) -> Option<&'c T> {
    if candidates.len() != weights.len() {
        return None;
    }
    weighted_index(rng, weights).map(|index| &candidates[index])
}

pub trait RngExt {
    /// Uniform integer in the closed range `[low, high]`.
    fn uniform_i32(&mut self, low: i32, high: i32) -> i32;
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn uniform_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.gen::<f64>() < probability
    }
}
