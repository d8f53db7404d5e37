use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::bucket::Bucket;
use crate::config::{CancelToken, SortConfig, WorkerPolicy};
use crate::error::{Result, SortError};
use crate::key::UnitKey;
use crate::partition;
use crate::stats::SortStats;
use crate::worker::{self, BucketWorker, SortWorker};

// How often a waiting coordinator looks at the cancel token when no deadline is closer.
const CANCEL_POLL: Duration = Duration::from_millis(5);

/// Partitions, sorts buckets in parallel, joins, then writes the buckets back in index order.
///
/// Each worker owns its bucket while it runs and sends it back when done. The input slice
/// is only written after every bucket came back sorted, so a failed, cancelled or timed out
/// sort leaves it exactly as it was. On failure the coordinator returns without waiting for
/// workers that are still running; they finish on their own copy and are discarded.
pub struct BucketSorter<W = SortWorker> {
    config: SortConfig,
    worker: Arc<W>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for BucketSorter<SortWorker> {
    fn default() -> Self {
        Self {
            config: SortConfig::default(),
            worker: Arc::new(SortWorker::default()),
            pool: None,
        }
    }
}

impl BucketSorter<SortWorker> {
    pub fn new(config: SortConfig) -> Result<Self> {
        let worker = SortWorker {
            insertion_threshold: config.insertion_threshold,
        };
        Self::with_worker(config, worker)
    }
}

impl<W> BucketSorter<W> {
    /// Validates `config` and, for `Pool { threads: Some(k) }`, builds the pool once.
    pub fn with_worker(config: SortConfig, worker: W) -> Result<Self> {
        config.validate()?;
        let pool = match config.workers {
            WorkerPolicy::Pool {
                threads: Some(threads),
            } => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("bucket-sort-{i}"))
                    .build()?,
            )),
            _ => None,
        };
        Ok(Self {
            config,
            worker: Arc::new(worker),
            pool,
        })
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    pub fn worker(&self) -> &W {
        &self.worker
    }

    pub fn sort<T>(&self, data: &mut [T]) -> Result<()>
    where
        T: UnitKey,
        W: BucketWorker<T> + Send + 'static,
    {
        self.sort_with_stats(data).map(|_| ())
    }

    pub fn sorted<T>(&self, input: &[T]) -> Result<Vec<T>>
    where
        T: UnitKey,
        W: BucketWorker<T> + Send + 'static,
    {
        let mut output = input.to_vec();
        self.sort(&mut output)?;
        Ok(output)
    }

    pub fn sort_with_stats<T>(&self, data: &mut [T]) -> Result<SortStats>
    where
        T: UnitKey,
        W: BucketWorker<T> + Send + 'static,
    {
        let start = Instant::now();
        let len = data.len();
        let bucket_count = if len == 0 {
            0
        } else {
            self.config.bucket_count.resolve(len)
        };
        let span = tracing::info_span!("bucket_sort", len, buckets = bucket_count);
        let _guard = span.enter();

        let control = Arc::new(Control::new(&self.config, start));
        let result = self.run(data, bucket_count, &control);
        if let Err(err) = &result {
            control.abort();
            tracing::warn!(error = %err, "bucket sort aborted");
        }
        result
    }

    fn run<T>(
        &self,
        data: &mut [T],
        bucket_count: usize,
        control: &Arc<Control>,
    ) -> Result<SortStats>
    where
        T: UnitKey,
        W: BucketWorker<T> + Send + 'static,
    {
        let mut stats = SortStats {
            len: data.len(),
            buckets: bucket_count,
            ..SortStats::default()
        };
        control.check()?;

        let phase = Instant::now();
        let mut buckets = partition::distribute(data, bucket_count, self.config.initial_capacity)?;
        stats.partition = phase.elapsed();
        for bucket in &buckets {
            if !bucket.is_empty() {
                stats.occupied_buckets += 1;
            }
            stats.largest_bucket = stats.largest_bucket.max(bucket.len());
        }
        tracing::debug!(
            elapsed = ?stats.partition,
            occupied = stats.occupied_buckets,
            largest = stats.largest_bucket,
            "partition complete"
        );
        control.check()?;

        let phase = Instant::now();
        let (tasks, threads) = self.sort_buckets(&mut buckets, control)?;
        stats.tasks = tasks;
        stats.threads = threads;
        stats.sort = phase.elapsed();
        tracing::debug!(elapsed = ?stats.sort, tasks, threads, "workers joined");
        control.check()?;

        let phase = Instant::now();
        let mut pos = 0;
        for bucket in buckets {
            let len = bucket.len();
            data[pos..pos + len].copy_from_slice(bucket.as_slice());
            pos += len;
        }
        debug_assert_eq!(pos, data.len());
        stats.concat = phase.elapsed();
        tracing::debug!(elapsed = ?stats.concat, "concatenation complete");

        Ok(stats)
    }

    /// Sorts every bucket holding two or more elements and puts it back in its slot.
    ///
    /// Returns `(tasks, threads)`, where `threads` counts the distinct threads that ran at
    /// least one task.
    fn sort_buckets<T>(
        &self,
        buckets: &mut [Bucket<T>],
        control: &Arc<Control>,
    ) -> Result<(usize, usize)>
    where
        T: UnitKey,
        W: BucketWorker<T> + Send + 'static,
    {
        let tasks: Vec<(usize, Bucket<T>)> = buckets
            .iter_mut()
            .enumerate()
            .filter(|(_, bucket)| bucket.len() > 1)
            .map(|(index, bucket)| (index, std::mem::take(bucket)))
            .collect();
        let task_count = tasks.len();
        if task_count == 0 {
            return Ok((0, 0));
        }

        if self.config.workers == WorkerPolicy::Inline {
            for (index, mut bucket) in tasks {
                control.check()?;
                worker::run_guarded(self.worker.as_ref(), index, &mut bucket)?;
                buckets[index] = bucket;
            }
            return Ok((task_count, 0));
        }

        let (tx, rx) = mpsc::channel();
        let mut pending: HashSet<usize> = tasks.iter().map(|&(index, _)| index).collect();
        for (index, bucket) in tasks {
            let job = Job {
                index,
                bucket,
                worker: Arc::clone(&self.worker),
                control: Arc::clone(control),
                tx: tx.clone(),
            };
            match (self.config.workers, &self.pool) {
                (WorkerPolicy::ThreadPerBucket, _) => {
                    thread::Builder::new()
                        .name(format!("bucket-{index}"))
                        .spawn(move || job.run(None))
                        .map_err(|source| SortError::Spawn {
                            bucket: index,
                            source,
                        })?;
                }
                (_, Some(pool)) => pool.spawn(move || job.run(rayon::current_thread_index())),
                (_, None) => rayon::spawn(move || job.run(rayon::current_thread_index())),
            }
        }
        drop(tx);

        let mut pool_threads = HashSet::new();
        while !pending.is_empty() {
            let done = match control.wait_slice() {
                Some(slice) => match rx.recv_timeout(slice) {
                    Ok(done) => done,
                    Err(RecvTimeoutError::Timeout) => {
                        control.check()?;
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return Err(lost_worker(&pending)),
                },
                None => rx.recv().map_err(|_| lost_worker(&pending))?,
            };
            pending.remove(&done.index);
            match done.outcome {
                Some(outcome) => outcome?,
                // Skipped after another task failed; that failure is on its way.
                None => continue,
            }
            if let Some(thread) = done.thread {
                pool_threads.insert(thread);
            }
            buckets[done.index] = done.bucket;
        }

        let threads = match self.config.workers {
            WorkerPolicy::ThreadPerBucket => task_count,
            _ => pool_threads.len(),
        };
        Ok((task_count, threads))
    }
}

fn lost_worker(pending: &HashSet<usize>) -> SortError {
    SortError::WorkerPanicked {
        bucket: pending.iter().copied().min().unwrap_or_default(),
        message: "worker exited without reporting a result".to_owned(),
    }
}

/// One bucket travelling to a worker thread.
struct Job<T, W> {
    index: usize,
    bucket: Bucket<T>,
    worker: Arc<W>,
    control: Arc<Control>,
    tx: mpsc::Sender<Done<T>>,
}

struct Done<T> {
    index: usize,
    bucket: Bucket<T>,
    /// `None` when the task was skipped because the sort had already failed.
    outcome: Option<Result<()>>,
    thread: Option<usize>,
}

impl<T: UnitKey, W: BucketWorker<T>> Job<T, W> {
    fn run(self, thread: Option<usize>) {
        let Self {
            index,
            mut bucket,
            worker,
            control,
            tx,
        } = self;
        let outcome = if control.aborted() {
            None
        } else {
            let result = control
                .check()
                .and_then(|()| worker::run_guarded(worker.as_ref(), index, &mut bucket));
            if result.is_err() {
                control.abort();
            }
            Some(result)
        };
        // The coordinator may have given up already.
        let _ = tx.send(Done {
            index,
            bucket,
            outcome,
            thread,
        });
    }
}

/// Abort flag plus the caller's cancellation and deadline, shared by all workers of one sort.
struct Control {
    abort: AtomicBool,
    cancel: Option<CancelToken>,
    start: Instant,
    deadline: Option<Duration>,
}

impl Control {
    fn new(config: &SortConfig, start: Instant) -> Self {
        Self {
            abort: AtomicBool::new(false),
            cancel: config.cancel.clone(),
            start,
            deadline: config.deadline,
        }
    }

    fn abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(SortError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            let elapsed = self.start.elapsed();
            if elapsed >= deadline {
                return Err(SortError::DeadlineExceeded { elapsed });
            }
        }
        Ok(())
    }

    /// How long the coordinator may block for the next result; `None` means no limit.
    fn wait_slice(&self) -> Option<Duration> {
        let remaining = self
            .deadline
            .map(|deadline| deadline.saturating_sub(self.start.elapsed()));
        match (remaining, self.cancel.is_some()) {
            (Some(remaining), true) => Some(remaining.min(CANCEL_POLL)),
            (Some(remaining), false) => Some(remaining),
            (None, true) => Some(CANCEL_POLL),
            (None, false) => None,
        }
    }
}
