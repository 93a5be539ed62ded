//! Error types for the persistence pipeline.
//!
//! Every stage validates its input on entry and fails fast; nothing
//! partial is ever returned alongside an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all pipeline stages.
#[derive(Error, Debug)]
pub enum TdaError {
    /// Malformed or empty point cloud, distance matrix or series
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Point clouds in one batch disagree on coordinate dimensionality
    #[error("Dimension mismatch: expected {expected} coordinates, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Homology dimension not reachable with the filtration's simplex cap
    #[error(
        "Unsupported homology dimension {requested}: filtration supports at most {max_supported}"
    )]
    UnsupportedDimension { requested: usize, max_supported: usize },

    /// Unrecognized distance or amplitude metric name
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Entropy of an empty diagram requested without a fill value
    #[error("Empty persistence diagram in dimension {dimension} and no fill value configured")]
    EmptyDiagram { dimension: usize },

    /// Configuration or stage composition errors
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Worker pool construction failures
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// I/O errors (config and batch files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serializable tag identifying the kind of a [`TdaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    DimensionMismatch,
    UnsupportedDimension,
    UnknownMetric,
    EmptyDiagram,
    InvalidConfig,
    WorkerPool,
    Io,
    Serialization,
}

impl TdaError {
    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        TdaError::InvalidInput(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        TdaError::InvalidConfig(message.into())
    }

    /// Creates an unknown-metric error.
    pub fn unknown_metric(name: impl Into<String>) -> Self {
        TdaError::UnknownMetric(name.into())
    }

    /// Kind tag, used to report per-item failures in a batch.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TdaError::InvalidInput(_) => ErrorKind::InvalidInput,
            TdaError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            TdaError::UnsupportedDimension { .. } => ErrorKind::UnsupportedDimension,
            TdaError::UnknownMetric(_) => ErrorKind::UnknownMetric,
            TdaError::EmptyDiagram { .. } => ErrorKind::EmptyDiagram,
            TdaError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            TdaError::WorkerPool(_) => ErrorKind::WorkerPool,
            TdaError::Io(_) => ErrorKind::Io,
            TdaError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, TdaError>;
