//! Host native compositing primitive
//!
//! The windowing host offers one opaque call: draw a region of one raster
//! scaled into a region of another, with an interpolation hint and a
//! composite mode. Its rounding is not specified; how far it can be
//! trusted is tabulated in [`crate::accuracy`].

use crate::error::Result;
use crate::raster::NativeRaster;
use crate::rect::Rect;
use crate::transform::AffineTransform;
use std::fmt;

/// How source pixels combine with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositeMode {
    /// Replace destination pixels
    #[default]
    Src,
    /// Premultiplied source-over blending
    SrcOver,
}

/// Interpolation hint token understood by the host primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpolationHint {
    NearestNeighbor,
    Bilinear,
    Bicubic,
}

/// One call of the host primitive.
#[derive(Debug, Clone)]
pub struct CompositeRequest<'a> {
    pub src: &'a NativeRaster,
    pub src_rect: Rect,
    pub dst: &'a NativeRaster,
    /// Destination rectangle before `transform`
    pub dst_rect: Rect,
    /// Device-space clip, after `transform`
    pub clip: Rect,
    pub transform: Option<AffineTransform>,
    pub hint: InterpolationHint,
    pub mode: CompositeMode,
}

/// The host's "draw scaled region" primitive.
pub trait HostCompositor: Send + Sync + fmt::Debug {
    /// Draw `request.src_rect` of the source into the destination.
    ///
    /// # Errors
    ///
    /// Implementations report any failure; callers fall back to their own
    /// per-pixel path.
    fn composite(&self, request: &CompositeRequest<'_>) -> Result<()>;
}
