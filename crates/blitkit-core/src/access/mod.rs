//! Raster accessor
//!
//! [`RasterView`] wraps a [`NativeRaster`] behind a uniform pixel
//! interface. At construction it validates the raster's structure and
//! freezes an [`AccessStrategy`]:
//!
//! - [`AccessStrategy::DirectPackedArray`]: one 32-bit element per pixel in
//!   a catalog layout. Pixels are converted by the catalog's byte shuffles.
//! - [`AccessStrategy::NarrowArray`]: one 8- or 16-bit element per pixel
//!   (RGB555, RGB565, 8/16-bit gray), unpacked per pixel. Gray values
//!   round-trip unchanged.
//! - [`AccessStrategy::GenericAccessor`]: the host's universal color
//!   model. Always correct, slowest, and gamma-adjusts gray layouts.
//!
//! An unrecognized layout is not an error; it selects the generic
//! accessor.
//!
//! # Thread safety
//!
//! A view keeps a per-instance conversion buffer, so mutating operations
//! take `&mut self`. Each worker clones its own view; clones share the
//! raster storage but not the scratch state.

mod band;
mod bulk;
mod codec;

pub use band::{RasterReadLock, RasterWriteLock, RowBand};
pub use bulk::{CopyPath, copy_image};

use crate::alpha::{alpha_of, blend_src_over};
use crate::compositor::HostCompositor;
use crate::error::{Error, Result};
use crate::format::{PixelFormat, compute_format};
use crate::raster::{NativeRaster, SampleLayout, ShortLayout};
use crate::rect::Rect;
use codec::PixelCodec;
use log::debug;
use std::sync::Arc;

/// Reduced-depth layouts served by the narrow path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NarrowLayout {
    Rgb555,
    Rgb565,
    Gray8,
    Gray16,
}

impl NarrowLayout {
    fn of_layout(layout: &SampleLayout) -> Option<Self> {
        match layout {
            SampleLayout::PackedShort(ShortLayout::Rgb555) => Some(Self::Rgb555),
            SampleLayout::PackedShort(ShortLayout::Rgb565) => Some(Self::Rgb565),
            SampleLayout::Gray8 => Some(Self::Gray8),
            SampleLayout::Gray16 => Some(Self::Gray16),
            _ => None,
        }
    }
}

/// How a view reaches its pixels; fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessStrategy {
    DirectPackedArray(PixelFormat),
    NarrowArray(NarrowLayout),
    GenericAccessor,
}

/// Capabilities a caller grants a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessPermissions {
    /// May skip the host color model
    pub bypass_color_model: bool,
    /// May index the backing array directly
    pub direct_array: bool,
}

impl AccessPermissions {
    /// Both permissions granted.
    pub const fn all() -> Self {
        Self {
            bypass_color_model: true,
            direct_array: true,
        }
    }

    /// Forces the generic accessor.
    pub const fn none() -> Self {
        Self {
            bypass_color_model: false,
            direct_array: false,
        }
    }

    /// Color-model bypass without direct array access.
    pub const fn bypass_only() -> Self {
        Self {
            bypass_color_model: true,
            direct_array: false,
        }
    }
}

/// Validate raster structure and return `(stride)`.
fn validate(raster: &NativeRaster) -> Result<usize> {
    let layout = raster.layout();
    if raster.banks() != 1
        || raster.storage().kind() != layout.storage_kind()
        || raster.pixel_stride() < layout.pixel_stride()
    {
        return Err(Error::BadSampleModel);
    }
    if raster.translation() != (0, 0) {
        return Err(Error::RasterTranslation);
    }
    let stride = raster
        .scanline_stride()
        .ok_or(Error::StrideNotRetrievable)?;
    let width = raster.width() as usize;
    let height = raster.height() as usize;
    if stride < width * raster.pixel_stride() {
        return Err(Error::BadSampleModel);
    }
    let required = raster.offset()
        + (height - 1) * stride
        + (width - 1) * raster.pixel_stride()
        + layout.pixel_stride();
    let len = raster.storage().len();
    if required > len {
        return Err(Error::StorageTooSmall { required, len });
    }
    Ok(stride)
}

fn select_strategy(
    raster: &NativeRaster,
    format: Option<PixelFormat>,
    permissions: AccessPermissions,
) -> AccessStrategy {
    if !permissions.bypass_color_model {
        return AccessStrategy::GenericAccessor;
    }
    match format {
        Some(f) if permissions.direct_array && raster.pixel_stride() == 1 => {
            AccessStrategy::DirectPackedArray(f)
        }
        _ => match NarrowLayout::of_layout(raster.layout()) {
            Some(n) if raster.pixel_stride() == 1 => AccessStrategy::NarrowArray(n),
            _ => AccessStrategy::GenericAccessor,
        },
    }
}

/// Uniform pixel access to one raster
#[derive(Debug)]
pub struct RasterView {
    raster: NativeRaster,
    format: Option<PixelFormat>,
    codec: PixelCodec,
    permissions: AccessPermissions,
    compositor: Option<Arc<dyn HostCompositor>>,
    scratch: Vec<u32>,
}

impl Clone for RasterView {
    /// A new accessor instance over the same raster, with its own scratch.
    fn clone(&self) -> Self {
        Self {
            raster: self.raster.clone(),
            format: self.format,
            codec: self.codec.clone(),
            permissions: self.permissions,
            compositor: self.compositor.clone(),
            scratch: Vec::new(),
        }
    }
}

impl RasterView {
    /// Wrap a raster and select its access strategy.
    ///
    /// # Errors
    ///
    /// - [`Error::BadSampleModel`] for a multi-bank raster, a storage type
    ///   that does not match the layout, or a stride narrower than a row
    /// - [`Error::RasterTranslation`] for a translated child raster
    /// - [`Error::StrideNotRetrievable`] when the stride is not exposed
    /// - [`Error::StorageTooSmall`] when the addressed area overruns storage
    pub fn new(raster: NativeRaster, permissions: AccessPermissions) -> Result<Self> {
        let stride = validate(&raster)?;
        let format = compute_format(&raster);
        let strategy = select_strategy(&raster, format, permissions);
        debug!(
            "raster {}x{} {:?}: strategy {:?} (permissions {:?})",
            raster.width(),
            raster.height(),
            raster.layout(),
            strategy,
            permissions
        );
        let codec = PixelCodec {
            strategy,
            layout: raster.layout().clone(),
            offset: raster.offset(),
            stride,
            pixel_stride: raster.pixel_stride(),
            premultiplied: raster.is_premultiplied(),
        };
        Ok(Self {
            raster,
            format,
            codec,
            permissions,
            compositor: None,
            scratch: Vec::new(),
        })
    }

    /// Attach the host compositing primitive used by bulk copies.
    pub fn with_compositor(mut self, compositor: Arc<dyn HostCompositor>) -> Self {
        self.compositor = Some(compositor);
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.raster.bounds()
    }

    /// Elements per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.codec.stride
    }

    /// Catalog format, `None` if the layout matches no entry.
    #[inline]
    pub fn format(&self) -> Option<PixelFormat> {
        self.format
    }

    #[inline]
    pub fn strategy(&self) -> AccessStrategy {
        self.codec.strategy
    }

    #[inline]
    pub fn is_premultiplied(&self) -> bool {
        self.codec.premultiplied
    }

    #[inline]
    pub fn permissions(&self) -> AccessPermissions {
        self.permissions
    }

    #[inline]
    pub fn raster(&self) -> &NativeRaster {
        &self.raster
    }

    pub fn compositor(&self) -> Option<&Arc<dyn HostCompositor>> {
        self.compositor.as_ref()
    }

    /// Check whether two views share backing storage.
    pub fn shares_storage(&self, other: &RasterView) -> bool {
        self.raster.shares_storage(&other.raster)
    }

    fn check_point(&self, x: i32, y: i32) -> Result<(u32, u32)> {
        check_point(x, y, self.width(), self.height())
    }

    /// Get a pixel as ARGB, premultiplied if `premul`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] outside the raster.
    pub fn get_pixel(&self, x: i32, y: i32, premul: bool) -> Result<u32> {
        let (x, y) = self.check_point(x, y)?;
        let guard = self.raster.storage().lock_read();
        Ok(self
            .codec
            .read(&guard.pixels(), self.codec.index(x, y), premul))
    }

    /// Set a pixel from ARGB, premultiplied if `premul`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] outside the raster.
    pub fn set_pixel(&mut self, x: i32, y: i32, argb: u32, premul: bool) -> Result<()> {
        let (x, y) = self.check_point(x, y)?;
        let mut guard = self.raster.storage().lock_write();
        self.codec
            .write(&mut guard.pixels_mut(), self.codec.index(x, y), argb, premul);
        Ok(())
    }

    /// Source-over blend a premultiplied pixel onto the raster.
    ///
    /// An opaque source overwrites without reading; a zero source leaves
    /// the pixel untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] outside the raster.
    pub fn blend_pixel_src_over(&mut self, x: i32, y: i32, premul_argb: u32) -> Result<()> {
        let (x, y) = self.check_point(x, y)?;
        let mut guard = self.raster.storage().lock_write();
        let mut px = guard.pixels_mut();
        blend_at(&self.codec, &mut px, self.codec.index(x, y), premul_argb);
        Ok(())
    }

    /// Lock the storage for a batch of reads.
    pub fn lock_read(&self) -> RasterReadLock<'_> {
        RasterReadLock::new(
            self.raster.storage().lock_read(),
            &self.codec,
            self.width(),
            self.height(),
        )
    }

    /// Lock the storage for writing and hand out row bands.
    pub fn lock_write(&self) -> RasterWriteLock<'_> {
        RasterWriteLock::new(
            self.raster.storage().lock_write(),
            &self.codec,
            self.width(),
            self.height(),
        )
    }
}

#[inline]
pub(crate) fn check_point(x: i32, y: i32, width: u32, height: u32) -> Result<(u32, u32)> {
    if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
        return Err(Error::IndexOutOfRange {
            x: x as i64,
            y: y as i64,
            width,
            height,
        });
    }
    Ok((x as u32, y as u32))
}

/// Source-over at one element index.
#[inline]
pub(crate) fn blend_at(
    codec: &PixelCodec,
    px: &mut crate::raster::PixelsMut<'_>,
    idx: usize,
    premul_argb: u32,
) {
    match alpha_of(premul_argb) {
        0xFF => codec.write(px, idx, premul_argb, true),
        0 if premul_argb == 0 => {}
        _ => {
            let dst = codec.read(&px.as_pixels(), idx, true);
            codec.write(px, idx, blend_src_over(premul_argb, dst), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ChannelMasks;
    use crate::raster::{ByteOrder, PixelBuffer, RasterParts, Storage};

    fn argb_raster(w: u32, h: u32) -> NativeRaster {
        NativeRaster::with_format(w, h, PixelFormat::Argb, false).unwrap()
    }

    #[test]
    fn test_strategy_selection() {
        let r = argb_raster(4, 4);
        let v = RasterView::new(r.clone(), AccessPermissions::all()).unwrap();
        assert_eq!(v.strategy(), AccessStrategy::DirectPackedArray(PixelFormat::Argb));
        let v = RasterView::new(r.clone(), AccessPermissions::bypass_only()).unwrap();
        assert_eq!(v.strategy(), AccessStrategy::GenericAccessor);
        let v = RasterView::new(r, AccessPermissions::none()).unwrap();
        assert_eq!(v.strategy(), AccessStrategy::GenericAccessor);

        let g = NativeRaster::new(4, 4, SampleLayout::Gray8, false).unwrap();
        let v = RasterView::new(g.clone(), AccessPermissions::bypass_only()).unwrap();
        assert_eq!(v.strategy(), AccessStrategy::NarrowArray(NarrowLayout::Gray8));
        let v = RasterView::new(g, AccessPermissions::none()).unwrap();
        assert_eq!(v.strategy(), AccessStrategy::GenericAccessor);
    }

    #[test]
    fn test_unknown_layout_downgrades() {
        let masks = ChannelMasks::new(0x3FF0_0000, 0x000F_FC00, 0x0000_03FF, 0);
        let r = NativeRaster::new(3, 3, SampleLayout::PackedInt(masks), false).unwrap();
        let v = RasterView::new(r, AccessPermissions::all()).unwrap();
        assert_eq!(v.format(), None);
        assert_eq!(v.strategy(), AccessStrategy::GenericAccessor);

        let r = NativeRaster::new(3, 3, SampleLayout::InterleavedBytes(ByteOrder::BGR), false)
            .unwrap();
        let v = RasterView::new(r, AccessPermissions::all()).unwrap();
        assert_eq!(v.strategy(), AccessStrategy::GenericAccessor);
    }

    #[test]
    fn test_construction_errors() {
        let r = argb_raster(8, 8);
        let child = r.child(Rect::new_unchecked(1, 1, 4, 4)).unwrap();
        let err = RasterView::new(child, AccessPermissions::all()).unwrap_err();
        assert_eq!(err.to_string(), "raster translation");

        let mut parts = RasterParts::new(
            4,
            4,
            SampleLayout::packed(PixelFormat::Argb),
            Storage::Int(PixelBuffer::new(16)),
        );
        parts.scanline_stride = None;
        let r = NativeRaster::from_parts(parts.clone()).unwrap();
        let err = RasterView::new(r, AccessPermissions::all()).unwrap_err();
        assert_eq!(err.to_string(), "scanline stride not retrievable");

        parts.scanline_stride = Some(4);
        parts.banks = 3;
        let r = NativeRaster::from_parts(parts.clone()).unwrap();
        let err = RasterView::new(r, AccessPermissions::all()).unwrap_err();
        assert_eq!(err.to_string(), "bad sample model");

        parts.banks = 1;
        parts.storage = Storage::Byte(PixelBuffer::new(16));
        let r = NativeRaster::from_parts(parts.clone()).unwrap();
        let err = RasterView::new(r, AccessPermissions::all()).unwrap_err();
        assert_eq!(err.to_string(), "bad sample model");

        parts.storage = Storage::Int(PixelBuffer::new(15));
        let r = NativeRaster::from_parts(parts).unwrap();
        assert!(matches!(
            RasterView::new(r, AccessPermissions::all()),
            Err(Error::StorageTooSmall { required: 16, len: 15 })
        ));
    }

    #[test]
    fn test_padded_stride() {
        let buf = PixelBuffer::<u32>::new(3 * 6 + 4);
        let r = NativeRaster::wrap_int_buffer(buf.clone(), 4, 4, 0, 6, PixelFormat::Argb, false)
            .unwrap();
        let mut v = RasterView::new(r, AccessPermissions::all()).unwrap();
        v.set_pixel(3, 2, 0xFF12_3456, false).unwrap();
        assert_eq!(buf.read()[2 * 6 + 3], 0xFF12_3456);
        assert_eq!(v.get_pixel(3, 2, false).unwrap(), 0xFF12_3456);
    }

    #[test]
    fn test_bounds_errors() {
        let mut v = RasterView::new(argb_raster(2, 2), AccessPermissions::all()).unwrap();
        assert!(matches!(
            v.get_pixel(2, 0, false),
            Err(Error::IndexOutOfRange { x: 2, y: 0, .. })
        ));
        assert!(v.set_pixel(-1, 0, 0, false).is_err());
        assert!(v.blend_pixel_src_over(0, 5, 0x8080_8080).is_err());
        assert_eq!(
            v.get_pixel(0, 9, false).unwrap_err().class(),
            crate::error::ErrorClass::Bounds
        );
    }

    #[test]
    fn test_premul_conversion_on_access() {
        let r = NativeRaster::with_format(1, 1, PixelFormat::Argb, true).unwrap();
        let mut v = RasterView::new(r, AccessPermissions::all()).unwrap();
        v.set_pixel(0, 0, 0x80FF_0000, false).unwrap();
        assert_eq!(v.get_pixel(0, 0, true).unwrap(), 0x8080_0000);
        assert_eq!(v.get_pixel(0, 0, false).unwrap(), 0x80FF_0000);
    }

    #[test]
    fn test_blend_opaque_and_transparent() {
        let mut v = RasterView::new(argb_raster(1, 1), AccessPermissions::all()).unwrap();
        v.set_pixel(0, 0, 0xFF00_FF00, false).unwrap();
        v.blend_pixel_src_over(0, 0, 0).unwrap();
        assert_eq!(v.get_pixel(0, 0, false).unwrap(), 0xFF00_FF00);
        v.blend_pixel_src_over(0, 0, 0xFF11_2233).unwrap();
        assert_eq!(v.get_pixel(0, 0, false).unwrap(), 0xFF11_2233);
        // half-transparent red over opaque green
        v.set_pixel(0, 0, 0xFF00_FF00, false).unwrap();
        v.blend_pixel_src_over(0, 0, 0x8080_0000).unwrap();
        assert_eq!(v.get_pixel(0, 0, true).unwrap(), 0xFF80_7F00);
    }

    #[test]
    fn test_clone_shares_pixels() {
        let mut a = RasterView::new(argb_raster(2, 2), AccessPermissions::all()).unwrap();
        let b = a.clone();
        a.set_pixel(1, 1, 0xFFAB_CDEF, false).unwrap();
        assert!(a.shares_storage(&b));
        assert_eq!(b.get_pixel(1, 1, false).unwrap(), 0xFFAB_CDEF);
    }
}
