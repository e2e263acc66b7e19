//! blitkit core - pixel formats and format-agnostic raster access
//!
//! This crate provides the pieces the scaling engine reads and writes
//! pixels through:
//!
//! - [`PixelFormat`] - catalog of packed 32-bit component layouts
//! - [`NativeRaster`] / [`PixelBuffer`] - the host raster handle and its
//!   shared backing storage
//! - [`RasterView`] - uniform pixel access with a frozen [`AccessStrategy`]
//! - [`HostCompositor`] - contract of the host's native compositing call
//! - [`accuracy`] - measured accuracy table deciding when that call may be
//!   trusted
//! - [`Rect`] / [`AffineTransform`] - geometry
//!
//! All pixel values crossing the public API are canonical `0xAARRGGBB`
//! words, either straight or premultiplied as each call states.

pub mod access;
pub mod accuracy;
pub mod alpha;
pub mod compositor;
pub mod error;
pub mod format;
pub mod raster;
pub mod rect;
pub mod transform;

pub use access::{
    AccessPermissions, AccessStrategy, CopyPath, NarrowLayout, RasterReadLock, RasterView,
    RasterWriteLock, RowBand, copy_image,
};
pub use accuracy::{LayoutClass, NativeAccuracy};
pub use alpha::{blend_src_over, premultiply, unpremultiply};
pub use compositor::{CompositeMode, CompositeRequest, HostCompositor, InterpolationHint};
pub use error::{Error, ErrorClass, Result};
pub use format::{ChannelMasks, ComponentIndices, PixelFormat, compute_format};
pub use raster::{
    ByteOrder, NativeRaster, PixelBuffer, RasterParts, SampleLayout, ShortLayout, Storage,
    StorageKind,
};
pub use rect::Rect;
pub use transform::AffineTransform;
