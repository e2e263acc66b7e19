//! Empirical accuracy of the host compositing primitive
//!
//! The host primitive is a black box. Whether it may stand in for the
//! per-pixel reference path depends on the pair of layouts involved:
//! some pairs are fast and bit-exact, some are fast but round
//! premultiplied components differently, some are slow.
//!
//! The table below holds measured calibration constants, not derived
//! truths. Re-validate them when targeting a different host.

use crate::format::{PixelFormat, compute_format};
use crate::raster::{ByteOrder, NativeRaster, SampleLayout, ShortLayout};

/// Maximum per-component error the per-pixel path tolerates from the host
pub const MAX_DELEGATED_ERROR: u8 = 1;

/// Layout families the accuracy table is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutClass {
    IntArgb,
    IntArgbPre,
    IntRgb,
    IntBgr,
    IntRgbx,
    ThreeByteBgr,
    FourByteAbgr,
    FourByteAbgrPre,
    UshortRgb565,
    UshortRgb555,
    ByteGray,
    UshortGray,
    ByteIndexed,
    /// Anything the table does not know
    Custom,
}

impl LayoutClass {
    /// Class of a packed caller buffer.
    pub fn of_format(format: PixelFormat, premultiplied: bool) -> Self {
        match (format, premultiplied && format.has_alpha()) {
            (PixelFormat::Argb, false) => Self::IntArgb,
            (PixelFormat::Argb, true) => Self::IntArgbPre,
            (PixelFormat::Xrgb, _) => Self::IntRgb,
            (PixelFormat::Xbgr, _) => Self::IntBgr,
            (PixelFormat::Rgbx, _) => Self::IntRgbx,
            _ => Self::Custom,
        }
    }

    /// Class of a host raster.
    pub fn of_raster(raster: &NativeRaster) -> Self {
        if raster.pixel_stride() != raster.layout().pixel_stride() || raster.banks() != 1 {
            return Self::Custom;
        }
        match raster.layout() {
            SampleLayout::PackedInt(_) => compute_format(raster)
                .map_or(Self::Custom, |f| Self::of_format(f, raster.is_premultiplied())),
            SampleLayout::PackedShort(ShortLayout::Rgb565) => Self::UshortRgb565,
            SampleLayout::PackedShort(ShortLayout::Rgb555) => Self::UshortRgb555,
            SampleLayout::Gray8 => Self::ByteGray,
            SampleLayout::Gray16 => Self::UshortGray,
            SampleLayout::InterleavedBytes(order) if *order == ByteOrder::BGR => Self::ThreeByteBgr,
            SampleLayout::InterleavedBytes(order) if *order == ByteOrder::ABGR => {
                if raster.is_premultiplied() {
                    Self::FourByteAbgrPre
                } else {
                    Self::FourByteAbgr
                }
            }
            SampleLayout::InterleavedBytes(_) => Self::Custom,
            SampleLayout::Indexed(_) => Self::ByteIndexed,
        }
    }
}

/// Measured behavior of the host primitive for one layout pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeAccuracy {
    /// Faster than the direct-array reference path
    pub fast: bool,
    /// Worst observed per-component deviation from the reference path
    pub max_error: u8,
}

impl NativeAccuracy {
    const fn new(fast: bool, max_error: u8) -> Self {
        Self { fast, max_error }
    }

    /// Fast and within [`MAX_DELEGATED_ERROR`].
    pub fn delegable(&self) -> bool {
        self.fast && self.max_error <= MAX_DELEGATED_ERROR
    }
}

use LayoutClass::*;

/// (source, destination, measured accuracy)
///
/// Pairs absent from the table are never delegated.
const ACCURACY_TABLE: &[(LayoutClass, LayoutClass, NativeAccuracy)] = &[
    (IntArgb, IntArgb, NativeAccuracy::new(true, 0)),
    (IntArgb, IntArgbPre, NativeAccuracy::new(true, 1)),
    (IntArgb, IntRgb, NativeAccuracy::new(true, 0)),
    (IntArgb, IntBgr, NativeAccuracy::new(true, 0)),
    (IntArgb, ThreeByteBgr, NativeAccuracy::new(true, 0)),
    (IntArgb, FourByteAbgr, NativeAccuracy::new(true, 0)),
    (IntArgb, FourByteAbgrPre, NativeAccuracy::new(false, 1)),
    (IntArgbPre, IntArgbPre, NativeAccuracy::new(true, 0)),
    // host unpremultiplies with truncating division
    (IntArgbPre, IntArgb, NativeAccuracy::new(true, 3)),
    (IntArgbPre, IntRgb, NativeAccuracy::new(true, 3)),
    (IntRgb, IntArgb, NativeAccuracy::new(true, 0)),
    (IntRgb, IntArgbPre, NativeAccuracy::new(true, 0)),
    (IntRgb, IntRgb, NativeAccuracy::new(true, 0)),
    (IntRgb, IntBgr, NativeAccuracy::new(true, 0)),
    (IntBgr, IntArgb, NativeAccuracy::new(true, 0)),
    (IntBgr, IntRgb, NativeAccuracy::new(true, 0)),
    (IntRgbx, IntArgb, NativeAccuracy::new(false, 0)),
    (ThreeByteBgr, IntArgb, NativeAccuracy::new(true, 0)),
    (ThreeByteBgr, IntRgb, NativeAccuracy::new(true, 0)),
    (ThreeByteBgr, IntArgbPre, NativeAccuracy::new(true, 0)),
    (FourByteAbgr, IntArgb, NativeAccuracy::new(true, 0)),
    (FourByteAbgr, IntArgbPre, NativeAccuracy::new(true, 1)),
    // 4-byte premultiplied goes through an 8.8 fixed-point reciprocal
    (FourByteAbgrPre, IntArgb, NativeAccuracy::new(true, 2)),
    (FourByteAbgrPre, IntArgbPre, NativeAccuracy::new(true, 0)),
    (UshortRgb565, IntArgb, NativeAccuracy::new(true, 1)),
    (UshortRgb565, IntRgb, NativeAccuracy::new(true, 1)),
    (UshortRgb555, IntArgb, NativeAccuracy::new(true, 1)),
    (UshortRgb555, IntRgb, NativeAccuracy::new(true, 1)),
    // gray goes through the host's linear-gray color space
    (ByteGray, IntArgb, NativeAccuracy::new(true, 4)),
    (UshortGray, IntArgb, NativeAccuracy::new(true, 4)),
    (ByteIndexed, IntArgb, NativeAccuracy::new(true, 0)),
    (IntArgb, ByteIndexed, NativeAccuracy::new(false, 8)),
];

/// Measured accuracy for a layout pair, if it has been measured.
pub fn native_accuracy(src: LayoutClass, dst: LayoutClass) -> Option<NativeAccuracy> {
    ACCURACY_TABLE
        .iter()
        .find(|(s, d, _)| *s == src && *d == dst)
        .map(|(_, _, acc)| *acc)
}

/// Whether the host primitive may replace the reference path for a pair.
pub fn delegable(src: LayoutClass, dst: LayoutClass) -> bool {
    native_accuracy(src, dst).is_some_and(|acc| acc.delegable())
}
