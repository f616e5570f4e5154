/// Error types for kmpbench.
///
/// The matcher never fails: malformed input simply produces no matches. Every
/// other failure in this crate is fatal for the run that hit it. Callers are
/// expected to propagate with `?` and abort, there is no retry or partial
/// result path.
///
/// ```rust,ignore
/// match run_local(&config) {
///     Ok(reports) => // write the records,
///     Err(BenchError::CoverageViolation { .. }) => // partitioning bug,
///     Err(e) => // anything else is equally fatal
/// }
/// ```
use thiserror::Error;

/// Result type for benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while running a benchmark
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid world size {size}: at least {required} processes are required")]
    InvalidWorldSize { size: usize, required: usize },
    #[error("Invalid rank {rank} for world of size {size}")]
    InvalidRank { rank: usize, size: usize },
    #[error("Process world is already initialized")]
    AlreadyInitialized,
    #[error("Coverage violation: {covered} of {expected} cases processed, {duplicates} repeated")]
    CoverageViolation {
        expected: usize,
        covered: usize,
        duplicates: usize,
    },
    #[error("Strategy mismatch: {label} found {found} matches, expected {expected}")]
    StrategyMismatch {
        label: String,
        expected: usize,
        found: usize,
    },
    #[error("Notification for index {index} outside batch of {len} test cases")]
    UnexpectedIndex { index: usize, len: usize },
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Worker rank {rank} failed: {status}")]
    WorkerFailed { rank: usize, status: String },
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed message: {0}")]
    MessageError(#[from] serde_json::Error),
}

impl BenchError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_world_size(size: usize, required: usize) -> Self {
        Self::InvalidWorldSize { size, required }
    }

    pub fn invalid_rank(rank: usize, size: usize) -> Self {
        Self::InvalidRank { rank, size }
    }

    pub fn transport_error(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    pub fn worker_failed(rank: usize, status: impl ToString) -> Self {
        Self::WorkerFailed {
            rank,
            status: status.to_string(),
        }
    }

    pub fn thread_pool_error(msg: impl Into<String>) -> Self {
        Self::ThreadPoolError(msg.into())
    }

    pub fn strategy_mismatch(label: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::StrategyMismatch {
            label: label.into(),
            expected,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BenchError::config_error("bad field");
        assert!(matches!(err, BenchError::ConfigError(_)));

        let err = BenchError::invalid_world_size(1, 2);
        assert!(matches!(
            err,
            BenchError::InvalidWorldSize {
                size: 1,
                required: 2
            }
        ));

        let err = BenchError::invalid_rank(4, 4);
        assert!(matches!(err, BenchError::InvalidRank { rank: 4, size: 4 }));

        let err = BenchError::worker_failed(3, "exit status: 101");
        assert!(matches!(err, BenchError::WorkerFailed { rank: 3, .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = BenchError::invalid_world_size(1, 2);
        assert_eq!(
            err.to_string(),
            "Invalid world size 1: at least 2 processes are required"
        );

        let err = BenchError::CoverageViolation {
            expected: 10,
            covered: 9,
            duplicates: 1,
        };
        assert_eq!(
            err.to_string(),
            "Coverage violation: 9 of 10 cases processed, 1 repeated"
        );

        let err = BenchError::strategy_mismatch("Shared memory", 12, 11);
        assert_eq!(
            err.to_string(),
            "Strategy mismatch: Shared memory found 11 matches, expected 12"
        );

        let err = BenchError::config_error("Missing required field");
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field"
        );
    }
}
