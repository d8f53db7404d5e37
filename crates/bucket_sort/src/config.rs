use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::DEFAULT_PARAMS;
use crate::error::{Result, SortError};

/// How many buckets the input is split into.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BucketCount {
    /// One bucket per input element.
    #[default]
    InputLength,
    Fixed(usize),
}

impl BucketCount {
    pub fn resolve(self, len: usize) -> usize {
        match self {
            Self::InputLength => len,
            Self::Fixed(n) => n,
        }
    }
}

/// How per-bucket sorts are mapped onto threads.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorkerPolicy {
    /// One scoped thread per bucket holding at least two elements.
    ThreadPerBucket,
    /// Every bucket is a task on a bounded rayon pool. `None` runs on the global pool.
    Pool { threads: Option<usize> },
    /// Buckets are sorted on the calling thread.
    Inline,
}

impl Default for WorkerPolicy {
    fn default() -> Self {
        Self::Pool { threads: None }
    }
}

/// Cooperative cancellation flag shared between a caller and a running sort.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TunedParams {
    pub initial_capacity: usize,
    pub insertion_threshold: usize,
}

#[derive(Clone, Debug)]
pub struct SortConfig {
    pub bucket_count: BucketCount,
    pub workers: WorkerPolicy,
    pub initial_capacity: usize,
    pub insertion_threshold: usize,
    pub deadline: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            bucket_count: BucketCount::default(),
            workers: WorkerPolicy::default(),
            initial_capacity: DEFAULT_PARAMS.initial_capacity,
            insertion_threshold: DEFAULT_PARAMS.insertion_threshold,
            deadline: None,
            cancel: None,
        }
    }
}

impl SortConfig {
    pub fn with_bucket_count(mut self, bucket_count: BucketCount) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    pub fn with_workers(mut self, workers: WorkerPolicy) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_insertion_threshold(mut self, insertion_threshold: usize) -> Self {
        self.insertion_threshold = insertion_threshold;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket_count == BucketCount::Fixed(0) {
            return Err(SortError::InvalidConfig("fixed bucket count must be non-zero"));
        }
        if self.workers == (WorkerPolicy::Pool { threads: Some(0) }) {
            return Err(SortError::InvalidConfig("pool thread count must be non-zero"));
        }
        if self.initial_capacity == 0 {
            return Err(SortError::InvalidConfig("initial bucket capacity must be non-zero"));
        }
        Ok(())
    }
}
