use std::time::Duration;

use bucket_sort::source;
use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, SamplingMode};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SAMPLE_SIZE: usize = 10;
const WARM_UP_MS: u64 = 80;
const MEASURE_MS_SMALL: u64 = 120;
const MEASURE_MS_LARGE: u64 = 300;
const MEASURE_MS_XL: u64 = 500;
const RNG_SEED: u64 = 0x5EED_2026;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputShape {
    Uniform,
    /// `u^6`: most values land in the lowest few buckets.
    Skewed,
    AllEqual,
}

pub const INPUT_SHAPES: [InputShape; 3] =
    [InputShape::Uniform, InputShape::Skewed, InputShape::AllEqual];

impl InputShape {
    pub fn label(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Skewed => "skewed",
            Self::AllEqual => "all_equal",
        }
    }
}

pub fn generate(shape: InputShape, size: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    match shape {
        InputShape::Uniform => source::uniform(&mut rng, size),
        InputShape::Skewed => source::skewed(&mut rng, size, 6.0),
        InputShape::AllEqual => vec![0.5; size],
    }
}

pub fn apply_runtime<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, size: usize) {
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(WARM_UP_MS));
    if size <= 16384 {
        group.sampling_mode(SamplingMode::Auto);
        group.measurement_time(Duration::from_millis(MEASURE_MS_SMALL));
    } else if size <= 65536 {
        group.sampling_mode(SamplingMode::Flat);
        group.measurement_time(Duration::from_millis(MEASURE_MS_LARGE));
    } else {
        group.sampling_mode(SamplingMode::Flat);
        group.measurement_time(Duration::from_millis(MEASURE_MS_XL));
    }
}

#[inline]
pub fn seed_for(shape: InputShape, size: usize, salt: u64) -> u64 {
    let s = match shape {
        InputShape::Uniform => 11_u64,
        InputShape::Skewed => 12_u64,
        InputShape::AllEqual => 13_u64,
    };
    mix_seed(RNG_SEED ^ (s << 48) ^ (size as u64) ^ salt)
}

#[inline]
fn mix_seed(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
