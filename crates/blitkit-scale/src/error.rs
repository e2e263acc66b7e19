//! Error types for blitkit-scale

use crate::algorithm::ScalingAlgorithm;
use thiserror::Error;

/// Errors raised by the scaling engine
///
/// All of these are precondition violations, raised before any pixel is
/// written. Zero-area draws are not errors.
#[derive(Debug, Error)]
pub enum ScaleError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] blitkit_core::Error),

    /// Split threshold below the minimum of 2
    #[error("split threshold for {algorithm:?} must be at least 2, got {value}")]
    InvalidThreshold {
        algorithm: ScalingAlgorithm,
        value: u64,
    },

    /// Draw job submitted without an interpolation selector
    #[error("no scaling algorithm selected")]
    MissingAlgorithm,

    /// Invalid engine parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Worker pool could not be built
    #[error("thread pool: {0}")]
    ThreadPool(String),
}

/// Result type for scaling operations
pub type ScaleResult<T> = Result<T, ScaleError>;
