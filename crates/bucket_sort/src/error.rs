use std::collections::TryReserveError;
use std::time::Duration;

/// Coarse classification of a [`SortError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    ResourceExhaustion,
    DomainViolation,
    WorkerFailure,
    Cancelled,
    InvalidConfig,
}

/// Every failure aborts the whole sort; the input is left untouched.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SortError {
    #[error("element {value} at position {position} is outside [0, 1)")]
    Domain { position: usize, value: f64 },

    #[error("bucket {bucket} could not grow to a capacity of {requested} elements")]
    Allocation {
        bucket: usize,
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("failed to spawn worker for bucket {bucket}")]
    Spawn {
        bucket: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("worker for bucket {bucket} panicked: {message}")]
    WorkerPanicked { bucket: usize, message: String },

    #[error("worker for bucket {bucket} failed: {message}")]
    WorkerFailed { bucket: usize, message: String },

    #[error("sort was cancelled")]
    Cancelled,

    #[error("sort exceeded its deadline after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, SortError>;

impl SortError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain { .. } => ErrorKind::DomainViolation,
            Self::Allocation { .. } | Self::Spawn { .. } | Self::Pool(_) => {
                ErrorKind::ResourceExhaustion
            }
            Self::WorkerPanicked { .. } | Self::WorkerFailed { .. } => ErrorKind::WorkerFailure,
            Self::Cancelled | Self::DeadlineExceeded { .. } => ErrorKind::Cancelled,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Failure reported by a custom [`crate::BucketWorker`].
    pub fn worker(bucket: usize, message: impl Into<String>) -> Self {
        Self::WorkerFailed {
            bucket,
            message: message.into(),
        }
    }

    /// Bucket the error originated from, if any.
    pub fn bucket(&self) -> Option<usize> {
        match self {
            Self::Allocation { bucket, .. }
            | Self::Spawn { bucket, .. }
            | Self::WorkerPanicked { bucket, .. }
            | Self::WorkerFailed { bucket, .. } => Some(*bucket),
            _ => None,
        }
    }
}
