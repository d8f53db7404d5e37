use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::DEFAULT_PARAMS;
use crate::bucket::Bucket;
use crate::error::{Result, SortError};
use crate::key::UnitKey;

/// Work applied to a single bucket during the parallel phase.
///
/// A worker owns its bucket while it runs. It may reorder the bucket's elements but must
/// not add or remove any.
pub trait BucketWorker<T: UnitKey>: Sync {
    fn run(&self, index: usize, bucket: &mut Bucket<T>) -> Result<()>;
}

/// Ascending in-place sort of the bucket.
#[derive(Clone, Copy, Debug)]
pub struct SortWorker {
    pub insertion_threshold: usize,
}

impl Default for SortWorker {
    fn default() -> Self {
        Self {
            insertion_threshold: DEFAULT_PARAMS.insertion_threshold,
        }
    }
}

impl<T: UnitKey> BucketWorker<T> for SortWorker {
    fn run(&self, _index: usize, bucket: &mut Bucket<T>) -> Result<()> {
        bucket.sort_with_threshold(self.insertion_threshold);
        Ok(())
    }
}

/// Runs `worker` on one bucket, turning a panic into [`SortError::WorkerPanicked`].
pub(crate) fn run_guarded<T, W>(worker: &W, index: usize, bucket: &mut Bucket<T>) -> Result<()>
where
    T: UnitKey,
    W: BucketWorker<T> + ?Sized,
{
    let len = bucket.len();
    let result = panic::catch_unwind(AssertUnwindSafe(|| worker.run(index, bucket)))
        .unwrap_or_else(|payload| {
            Err(SortError::WorkerPanicked {
                bucket: index,
                message: panic_message(payload.as_ref()),
            })
        });
    if result.is_ok() && bucket.len() != len {
        return Err(SortError::worker(index, "worker changed the bucket length"));
    }
    tracing::trace!(bucket = index, len, ok = result.is_ok(), "bucket worker finished");
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
