mod bucket;
mod config;
mod coordinator;
mod error;
mod key;
pub mod partition;
pub mod source;
mod stats;
mod worker;

pub use bucket::{Bucket, GrowError};
pub use config::{BucketCount, CancelToken, SortConfig, TunedParams, WorkerPolicy};
pub use coordinator::BucketSorter;
pub use error::{ErrorKind, Result, SortError};
pub use key::UnitKey;
pub use stats::SortStats;
pub use worker::{BucketWorker, SortWorker};

pub const DEFAULT_PARAMS: TunedParams = TunedParams {
    initial_capacity: 4,
    insertion_threshold: 24,
};

/// Sorts `data` ascending with the default configuration.
///
/// Every element must lie in `[0, 1)`. On error `data` is left untouched.
pub fn bucket_sort<T: UnitKey>(data: &mut [T]) -> Result<()> {
    BucketSorter::default().sort(data)
}

/// One-shot sort with `config`.
///
/// This builds a [`BucketSorter`] per call, and with `WorkerPolicy::Pool { threads: Some(k) }`
/// that means a fresh rayon pool of `k` threads every time. Callers sorting repeatedly should
/// build one `BucketSorter` and reuse it.
pub fn bucket_sort_with<T: UnitKey>(data: &mut [T], config: &SortConfig) -> Result<SortStats> {
    BucketSorter::new(config.clone())?.sort_with_stats(data)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    const POLICIES: [WorkerPolicy; 4] = [
        WorkerPolicy::ThreadPerBucket,
        WorkerPolicy::Pool { threads: None },
        WorkerPolicy::Pool { threads: Some(3) },
        WorkerPolicy::Inline,
    ];

    fn assert_sorts_like_std(data: &[f64]) {
        for &workers in &POLICIES {
            for bucket_count in [BucketCount::InputLength, BucketCount::Fixed(7)] {
                let config = SortConfig::default()
                    .with_workers(workers)
                    .with_bucket_count(bucket_count);
                let mut actual = data.to_vec();
                bucket_sort_with(&mut actual, &config).unwrap();

                let mut expected = data.to_vec();
                expected.sort_unstable_by(f64::total_cmp);

                assert_eq!(
                    actual,
                    expected,
                    "workers={workers:?} buckets={bucket_count:?} input_len={}",
                    data.len(),
                );
            }
        }
    }

    #[test]
    fn edge_cases() {
        let below_one = f64::from_bits(1.0_f64.to_bits() - 1);
        let cases = [
            vec![],
            vec![0.42],
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
            vec![0.6, 0.5, 0.4, 0.3, 0.2, 0.1],
            vec![0.5; 10],
            vec![0.0; 128],
            vec![below_one, 0.0, 0.5, below_one, 0.0],
            vec![0.05, 0.05, 0.03, 0.03, 0.01, 0.01, 0.04, 0.04, 0.02, 0.02, 0.0, 0.0],
        ];

        for case in &cases {
            assert_sorts_like_std(case);
        }
    }

    #[test]
    fn fixed_seed_random_cases() {
        let mut rng = StdRng::seed_from_u64(0x5EED_2026);
        for &size in &[2_usize, 3, 8, 31, 32, 63, 64, 127, 128, 511, 2048] {
            let data: Vec<f64> = source::uniform(&mut rng, size);
            assert_sorts_like_std(&data);
        }
    }

    #[test]
    fn fixed_seed_many_duplicates() {
        let mut rng = StdRng::seed_from_u64(0xD0D1_2026);
        for &size in &[64_usize, 1024, 4096] {
            let data = (0..size)
                .map(|_| rng.random_range(0..16_u32) as f64 / 16.0)
                .collect::<Vec<_>>();
            assert_sorts_like_std(&data);
        }
    }

    #[test]
    fn fixed_seed_skewed() {
        let mut rng = StdRng::seed_from_u64(0x5CE3_2026);
        for &size in &[100_usize, 1000, 5000] {
            let data: Vec<f64> = source::skewed(&mut rng, size, 6.0);
            assert_sorts_like_std(&data);
        }
    }

    #[test]
    fn sorts_f32() {
        let mut rng = StdRng::seed_from_u64(0xF32_2026);
        let mut data: Vec<f32> = source::uniform(&mut rng, 1000);
        let mut expected = data.clone();
        expected.sort_unstable_by(f32::total_cmp);
        bucket_sort(&mut data).unwrap();
        assert_eq!(data, expected);
    }

    #[test]
    fn idempotent() {
        let mut rng = StdRng::seed_from_u64(0x1DE0_2026);
        let data: Vec<f64> = source::uniform(&mut rng, 777);
        let sorter = BucketSorter::default();
        let once = sorter.sorted(&data).unwrap();
        let twice = sorter.sorted(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn domain_error_leaves_input() {
        let mut data = vec![0.9, 0.1, 1.0, 0.5];
        let err = bucket_sort(&mut data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
        assert_eq!(data, vec![0.9, 0.1, 1.0, 0.5]);
    }

    #[test]
    fn default_params() {
        assert_eq!(DEFAULT_PARAMS.initial_capacity, 4);
        assert!(DEFAULT_PARAMS.insertion_threshold > 1);
    }
}
