//! Error types for the test harness

use thiserror::Error;

/// Errors that can occur while building fixtures or checking results
#[derive(Debug, Error)]
pub enum TestError {
    /// Value comparison failed
    #[error(
        "value comparison failed at index {index}: expected {expected}, got {actual}, delta {delta}"
    )]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Pixel comparison failed
    #[error(
        "pixel comparison failed at index {index}: ({x}, {y}) {expected:#010x} vs {actual:#010x}"
    )]
    PixelMismatch {
        index: usize,
        x: u32,
        y: u32,
        expected: u32,
        actual: u32,
    },

    /// Fixture construction failed
    #[error("fixture error: {0}")]
    Core(#[from] blitkit_core::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
