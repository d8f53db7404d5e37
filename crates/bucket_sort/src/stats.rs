use std::time::Duration;

/// What a single sort call did, for reporting by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SortStats {
    pub len: usize,
    pub buckets: usize,
    pub occupied_buckets: usize,
    pub largest_bucket: usize,
    /// Buckets with at least two elements, each handed to a worker.
    pub tasks: usize,
    /// Distinct threads that ran at least one task; zero when tasks ran on the caller.
    pub threads: usize,
    pub partition: Duration,
    pub sort: Duration,
    pub concat: Duration,
}

impl SortStats {
    pub fn total(&self) -> Duration {
        self.partition + self.sort + self.concat
    }

    /// Largest bucket relative to a perfectly even split; 1.0 means no imbalance.
    pub fn imbalance(&self) -> f64 {
        if self.len == 0 || self.buckets == 0 {
            return 1.0;
        }
        let ideal = (self.len as f64 / self.buckets as f64).max(1.0);
        self.largest_bucket as f64 / ideal
    }
}
