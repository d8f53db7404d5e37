use crate::bucket::Bucket;
use crate::error::{Result, SortError};
use crate::key::UnitKey;

/// Splits `input` into `bucket_count` buckets, bucket `i` covering `[i/n, (i+1)/n)`.
///
/// The whole input is validated before any bucket is touched. Within a bucket, elements
/// keep their input order.
pub fn distribute<T: UnitKey>(
    input: &[T],
    bucket_count: usize,
    initial_capacity: usize,
) -> Result<Vec<Bucket<T>>> {
    if let Some(position) = input.iter().position(|x| !x.in_unit_interval()) {
        return Err(SortError::Domain {
            position,
            value: input[position].to_f64(),
        });
    }
    if bucket_count == 0 {
        return if input.is_empty() {
            Ok(Vec::new())
        } else {
            Err(SortError::InvalidConfig("bucket count must be non-zero"))
        };
    }

    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(bucket_count)
        .map_err(|source| SortError::Allocation {
            bucket: 0,
            requested: bucket_count,
            source,
        })?;
    buckets.extend((0..bucket_count).map(|_| Bucket::with_capacity(initial_capacity)));

    for &x in input {
        let idx = x.bucket_index(bucket_count);
        buckets[idx]
            .push(x)
            .map_err(|err| SortError::Allocation {
                bucket: idx,
                requested: err.requested,
                source: err.source,
            })?;
    }

    Ok(buckets)
}
