#![forbid(unsafe_code)]

//! Seeded Park–Miller generator and the Fisher–Yates shuffle built on it.
//!
//! The generator is the minimal-standard multiplicative LCG
//! (`state = state * 16807 mod (2^31 - 1)`), returning `(state - 1) / (2^31 - 2)`
//! so every draw lands in `[0, 1)`. It is deliberately tiny: trial plans are
//! exported with their seeds, and anyone re-deriving a plan from those seeds
//! must be able to reproduce the exact draw sequence.
//!
//! # Draw-order contract
//!
//! Reproducibility depends on *how many* draws each consumer takes, not just
//! on the seed. [`shuffle`] takes exactly `len - 1` draws (none for slices
//! of length 0 or 1). [`SeededRandom::draws`] exposes the running count so
//! tests can pin this down.

/// Mersenne prime modulus `2^31 - 1`.
pub const MODULUS: i64 = 2_147_483_647;

/// Park–Miller minimal-standard multiplier.
pub const MULTIPLIER: i64 = 16_807;

/// Source of uniform floats in `[0, 1)`.
///
/// Implemented by [`SeededRandom`] and by any `FnMut() -> f64` closure, so
/// tests can drive the shuffle and balancing code with scripted draws.
pub trait RandomSource {
    /// Next float in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Independent, seeded generator state.
///
/// Each instance owns its state; there is no global generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: i64,
    draws: u64,
}

impl SeededRandom {
    /// Create a generator from an arbitrary integer seed.
    ///
    /// The seed is reduced modulo `2^31 - 1`; zero or negative residues are
    /// lifted by `2^31 - 2`. The one residue the lift leaves at zero
    /// (`-(2^31 - 2)`) maps to `2^31 - 2`, so the starting state is always in
    /// `[1, 2^31 - 2]`. A zero state would otherwise be a fixed point.
    #[must_use]
    pub fn new(seed: i64) -> Self {
        let mut state = seed % MODULUS;
        if state <= 0 {
            state += MODULUS - 1;
        }
        if state == 0 {
            state = MODULUS - 1;
        }
        Self { state, draws: 0 }
    }

    /// Current internal state (always in `[1, 2^31 - 2]`).
    #[must_use]
    pub fn state(&self) -> i64 {
        self.state
    }

    /// Number of values drawn so far.
    #[must_use]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Advance the generator and return the next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        // state < 2^31 and MULTIPLIER < 2^15, so the product fits in i64.
        self.state = self.state * MULTIPLIER % MODULUS;
        self.draws += 1;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.next_f64()
    }
}

impl Iterator for SeededRandom {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// Draw an index in `0..bound` from a unit float.
///
/// Clamped so a misbehaving source returning `1.0` cannot index out of range.
pub(crate) fn draw_index<R: RandomSource + ?Sized>(rand: &mut R, bound: usize) -> usize {
    let j = (rand.next_unit() * bound as f64).floor() as usize;
    j.min(bound.saturating_sub(1))
}

/// Return a shuffled copy of `items` (Fisher–Yates, last index down to 1).
///
/// At step `i` draws `j = floor(rand() * (i + 1))` and swaps `i` and `j`.
/// The input is left untouched.
pub fn shuffle<T: Clone, R: RandomSource + ?Sized>(items: &[T], rand: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = draw_index(rand, i + 1);
        out.swap(i, j);
    }
    out
}
