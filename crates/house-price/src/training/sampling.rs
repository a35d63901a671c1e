//! Row and feature sampling for random forests.
//!
//! Each tree owns an RNG derived from `(seed, tree_index)`, so a forest is
//! identical whether its trees are grown sequentially or in parallel.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// RNG used for one tree.
pub type TreeRng = Xoshiro256PlusPlus;

/// Create the RNG for tree `tree_idx` of a forest trained with `seed`.
pub fn tree_rng(seed: u64, tree_idx: usize) -> TreeRng {
    let stream = (tree_idx as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    Xoshiro256PlusPlus::seed_from_u64(seed ^ stream)
}

/// Draw `n_rows` row indices uniformly with replacement.
pub fn bootstrap_indices<R: Rng + ?Sized>(n_rows: usize, rng: &mut R) -> Vec<u32> {
    let upper = n_rows as u32;
    (0..n_rows).map(|_| rng.gen_range(0..upper)).collect()
}

/// Fill `out` with `k` distinct feature indices out of `n_features`.
///
/// When `k >= n_features` every feature is used, in order, and the RNG is not
/// advanced.
pub fn sample_features<R: Rng + ?Sized>(
    n_features: usize,
    k: usize,
    rng: &mut R,
    out: &mut Vec<usize>,
) {
    out.clear();
    if k >= n_features {
        out.extend(0..n_features);
    } else {
        out.extend(index::sample(rng, n_features, k).iter());
        out.sort_unstable();
    }
}
