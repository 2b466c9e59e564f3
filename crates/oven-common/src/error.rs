//! Error types for oven heatmap rendering.

use thiserror::Error;

/// Result type alias using OvenError.
pub type OvenResult<T> = Result<T, OvenError>;

/// Primary error type for oven rendering operations.
#[derive(Debug, Error)]
pub enum OvenError {
    // === Data Errors ===
    #[error("Timestamp not found: {0}")]
    TimestampNotFound(i64),

    #[error("No readings available for source '{0}'")]
    NoReadings(String),

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    // === Geometry Errors ===
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Rack {axis} index {index} out of range (1..={len})")]
    RackIndexOutOfRange {
        axis: &'static str,
        index: i64,
        len: usize,
    },

    // === Storage Errors ===
    #[error("Cache error: {0}")]
    CacheError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse classification used by callers to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    MissingData,
    InvalidGeometry,
    IoFailure,
    Internal,
}

impl OvenError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            OvenError::TimestampNotFound(_)
            | OvenError::NoReadings(_)
            | OvenError::DataReadError(_) => ErrorCategory::MissingData,

            OvenError::InvalidGeometry(_) | OvenError::RackIndexOutOfRange { .. } => {
                ErrorCategory::InvalidGeometry
            }

            OvenError::CacheError(_) => ErrorCategory::IoFailure,

            OvenError::RenderError(_) | OvenError::ConfigError(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the error only invalidates a single reading rather than the whole request.
    pub fn is_per_reading(&self) -> bool {
        matches!(self, OvenError::RackIndexOutOfRange { .. })
    }
}

impl From<std::io::Error> for OvenError {
    fn from(err: std::io::Error) -> Self {
        OvenError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for OvenError {
    fn from(err: serde_json::Error) -> Self {
        OvenError::DataReadError(err.to_string())
    }
}
