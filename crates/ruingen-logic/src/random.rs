//! Range sampling that tolerates degenerate ranges.
//!
//! `Rng::gen_range` panics on empty ranges and `gen_bool` on probabilities
//! outside `0..=1`. Catalog data is allowed to contain both, so every stage
//! samples through these helpers instead.

use rand::Rng;

/// Uniform `f32` in `[min, max)`, or `min` if the range is empty.
pub fn range_f32(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Uniform `i32` in `[min, max]`, or `min` if `max < min`.
pub fn range_i32(rng: &mut impl Rng, min: i32, max: i32) -> i32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Uniform `u32` in `[min, max]`, or `min` if `max < min`.
pub fn range_u32(rng: &mut impl Rng, min: u32, max: u32) -> u32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Uniform index below `len`. `len` must be non-zero.
pub fn index(rng: &mut impl Rng, len: usize) -> usize {
    rng.gen_range(0..len)
}

/// True with probability `p`, clamped to `0..=1`.
pub fn chance(rng: &mut impl Rng, p: f32) -> bool {
    rng.gen::<f32>() < p.clamp(0.0, 1.0)
}

/// -1.0 or 1.0 with equal probability.
pub fn sign(rng: &mut impl Rng) -> f32 {
    if rng.gen::<bool>() {
        1.0
    } else {
        -1.0
    }
}
