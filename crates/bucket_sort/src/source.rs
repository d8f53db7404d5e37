//! Input generators for the unit interval.

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};

use crate::key::UnitKey;

/// `len` values drawn uniformly from `[0, 1)`; the expected case for bucket sort.
pub fn uniform<T, R>(rng: &mut R, len: usize) -> Vec<T>
where
    T: UnitKey,
    StandardUniform: Distribution<T>,
    R: Rng,
{
    (0..len).map(|_| rng.random::<T>()).collect()
}

/// `len` values `u^exponent` with `u` uniform in `[0, 1)`.
///
/// Exponents above one pile values up near zero, which overloads the low buckets.
///
/// # Panics
///
/// Panics if `exponent` is not a positive number (zero, negative or NaN).
pub fn skewed<T, R>(rng: &mut R, len: usize, exponent: f64) -> Vec<T>
where
    T: UnitKey,
    R: Rng,
{
    assert!(exponent > 0.0, "exponent must be positive, got {exponent}");
    (0..len)
        .map(|_| T::from_unit_f64(rng.random::<f64>().powf(exponent)))
        .collect()
}
