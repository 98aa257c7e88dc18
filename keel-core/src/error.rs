//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum KeelError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A batch was requested from a pool without transitions.
    #[error("Cannot take a batch from an empty trajectory")]
    EmptyTraj,

    /// The sampler was configured without workers.
    #[error("The number of sampler workers must be positive, got {0}")]
    NoWorkers(usize),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A sampler worker thread panicked.
    #[error("Sampler worker {0} panicked")]
    WorkerPanicked(usize),
}
