//! Deterministic per-trial RNG and seed derivation.
//!
//! # Determinism strategy
//!
//! Each trial gets its own independent `SmallRng` seeded by:
//!
//!   seed = run_seed XOR (trial_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive trial indices uniformly across the seed space.
//! This means:
//!
//! - Trials never share RNG state (no contention, no ordering dependency).
//! - Trial `k` draws the same stream whichever strategy it evaluates, so two
//!   strategies compared under one run seed face the same track conditions.
//! - Nothing is seeded from the wall clock; a run is fully reproducible from
//!   its top-level seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Derive an independent child seed from `base` and a stream index.
///
/// Used for per-job seeds in the scheduler.  The extra multiply-xorshift
/// round keeps `derive_seed(s, 0)` distinct from `s` itself.
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    let mut z = base ^ stream.wrapping_add(1).wrapping_mul(MIXING_CONSTANT);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

// ── TrialRng ──────────────────────────────────────────────────────────────────

/// Per-trial deterministic RNG.
///
/// Created once at the start of a trial and owned exclusively by that trial's
/// race state machine.  Every stochastic draw (weather, cautions, pit-stop
/// service time, lap variation) goes through this generator in a fixed order.
pub struct TrialRng {
    seed:  u64,
    inner: SmallRng,
}

impl TrialRng {
    /// Seed deterministically from the run seed and a trial index.
    pub fn new(run_seed: u64, trial: u32) -> Self {
        let seed = run_seed ^ (trial as u64).wrapping_mul(MIXING_CONSTANT);
        Self::from_seed(seed)
    }

    /// Seed directly, bypassing the trial mixing.
    pub fn from_seed(seed: u64) -> Self {
        TrialRng { seed, inner: SmallRng::seed_from_u64(seed) }
    }

    /// The seed this generator was created from (recorded in results).
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.inner
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.inner.r#gen()
    }

    /// Uniform `f64` in `[low, high]`.  Returns `low` for an empty,
    /// degenerate or unbounded interval instead of panicking.
    #[inline]
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low && (high - low).is_finite() { self.inner.gen_range(low..=high) } else { low }
    }

    /// Uniform `u32` in `[low, high]`; `low` if the interval is degenerate.
    #[inline]
    pub fn uniform_u32(&mut self, low: u32, high: u32) -> u32 {
        if high > low { self.inner.gen_range(low..=high) } else { low }
    }

    /// `true` with probability `p` (clamped to [0, 1]; NaN counts as 0).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.inner.gen_bool(p)
    }
}
