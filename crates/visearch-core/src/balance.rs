#![forbid(unsafe_code)]

//! Near-even category allocation.
//!
//! Given `n` samples over `k` categories, every category gets
//! `floor(n / k)` slots and `n mod k` randomly chosen categories get one
//! more. The result is then shuffled so the extras are not clustered.
//!
//! Draws taken from `rand`, in order:
//! 1. `k - 1` to shuffle the category range; the first `n mod k` entries
//!    get the extra slot. The shuffle runs even when nothing divides
//!    unevenly, so the draw count does not depend on the remainder.
//! 2. `n - 1` to shuffle the final multiset.

use tracing::trace;

use crate::rng::{RandomSource, shuffle};

/// Build a shuffled sequence of `sample_count` indices in `0..category_count`
/// whose per-index counts differ by at most one.
///
/// Returns an empty vector when either count is zero.
pub fn build_balanced_indices<R: RandomSource + ?Sized>(
    category_count: usize,
    sample_count: usize,
    rand: &mut R,
) -> Vec<usize> {
    if category_count == 0 || sample_count == 0 {
        return Vec::new();
    }

    let base = sample_count / category_count;
    let remainder = sample_count % category_count;

    let mut indices = Vec::with_capacity(sample_count);
    for category in 0..category_count {
        indices.extend(std::iter::repeat_n(category, base));
    }

    let categories: Vec<usize> = (0..category_count).collect();
    let extras = shuffle(&categories, rand);
    trace!(?extras, remainder, "balance.extras");
    indices.extend_from_slice(&extras[..remainder]);

    shuffle(&indices, rand)
}

/// Count occurrences of each index in `0..category_count`.
#[must_use]
pub fn index_counts(indices: &[usize], category_count: usize) -> Vec<usize> {
    let mut counts = vec![0; category_count];
    for &idx in indices {
        if let Some(slot) = counts.get_mut(idx) {
            *slot += 1;
        }
    }
    counts
}
