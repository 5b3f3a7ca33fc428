//! Error types and handling for polygon-graph
//!
//! This module defines all error types used throughout the transform,
//! from reading a layer through grouping, pair testing and persistence.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for polygon-graph
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input layer, field or feature
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geometry or predicate failures
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Internal system errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Geometry errors raised while grouping or testing polygons
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Feature carries no polygon or only empty rings
    #[error("feature {feature_id} has an empty geometry")]
    Empty {
        /// Id of the offending feature
        feature_id: u64,
    },

    /// A coordinate is NaN or infinite
    #[error("feature {feature_id} has a non-finite coordinate")]
    NonFinite {
        /// Id of the offending feature
        feature_id: u64,
    },

    /// The intersection predicate could not be evaluated
    #[error("predicate failed for features {left} and {right}: {reason}")]
    Predicate {
        /// Id of the first feature in the comparison
        left: u64,
        /// Id of the second feature in the comparison
        right: u64,
        /// Why the predicate failed
        reason: String,
    },
}

/// Serialization/deserialization errors
#[derive(Error, Debug)]
pub enum SerializationError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack serialization error
    #[error("MessagePack error: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),

    /// MessagePack deserialization error
    #[error("MessagePack decode error: {0}")]
    MessagePackDecode(#[from] rmp_serde::decode::Error),

    /// Bincode serialization error
    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Unsupported format
    #[error("Unsupported serialization format: {0}")]
    UnsupportedFormat(String),

    /// Graph file written by an incompatible version
    #[error("Unsupported graph format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Version this build reads
        expected: u32,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error was caused by the input layer or its features
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_)
                | Error::Geometry(GeometryError::Empty { .. })
                | Error::Geometry(GeometryError::NonFinite { .. })
        )
    }
}
