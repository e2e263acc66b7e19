//! Error types for blitkit-core
//!
//! Provides a unified error type for raster access. Errors fall into two
//! families: precondition violations (bad geometry, aliasing, structural
//! raster problems), which are raised before any pixel is written, and
//! bounds violations on single-pixel access.
//!
//! Unrecognized raster layouts are not errors; they downgrade to the
//! generic accessor.

use thiserror::Error;

/// Which invariant family an [`Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller broke a contract; not retryable.
    Precondition,
    /// A single-pixel coordinate fell outside the raster.
    Bounds,
}

/// blitkit-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Storage kind, bank count or pixel stride do not fit the layout
    #[error("bad sample model")]
    BadSampleModel,

    /// The raster is a translated child view of its parent storage
    #[error("raster translation")]
    RasterTranslation,

    /// The raster does not expose its scanline stride
    #[error("scanline stride not retrievable")]
    StrideNotRetrievable,

    /// Backing storage is smaller than the addressed pixel area
    #[error("storage too small: need {required} elements, have {len}")]
    StorageTooSmall { required: usize, len: usize },

    /// Invalid raster dimensions
    #[error("invalid raster dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Pixel coordinate outside `[0, width) x [0, height)`
    #[error("pixel ({x}, {y}) out of range for {width}x{height} raster")]
    IndexOutOfRange {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    /// Rectangle does not fit the raster or buffer it addresses
    #[error("rectangle {x},{y} {w}x{h} does not fit {what} of {width}x{height}")]
    RectOutOfBounds {
        what: &'static str,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        width: u32,
        height: u32,
    },

    /// Caller-supplied buffer cannot hold the addressed rectangle
    #[error("buffer too small: need {required} elements, have {len}")]
    BufferTooSmall { required: usize, len: usize },

    /// Source and destination share backing storage
    #[error("source and destination alias the same storage")]
    Aliased,

    /// Source and destination rectangles differ in size
    #[error("size mismatch: {src_w}x{src_h} vs {dst_w}x{dst_h}")]
    SizeMismatch {
        src_w: i32,
        src_h: i32,
        dst_w: i32,
        dst_h: i32,
    },

    /// Pixel format / premultiplication combination not supported here
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Affine transform has no inverse
    #[error("singular transform")]
    SingularTransform,

    /// The host compositing primitive reported a failure
    #[error("host compositor failed: {0}")]
    Compositor(String),
}

impl Error {
    /// Classify the error into one of the two failure families.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::IndexOutOfRange { .. } => ErrorClass::Bounds,
            _ => ErrorClass::Precondition,
        }
    }
}

/// Result type alias for blitkit-core operations
pub type Result<T> = std::result::Result<T, Error>;
