//! PixelFormat catalog
//!
//! Describes the packed 32-bit component layouts a raster can use and
//! converts between a layout's native packed value and canonical,
//! non-premultiplied `0xAARRGGBB`.
//!
//! # Byte indices
//!
//! Component positions are byte indices within the 32-bit word, index 0
//! being the most significant byte. Alpha-less layouts report alpha index
//! `-1`; they are always-opaque views of their alpha-bearing counterpart.
//!
//! | format | bytes (MSB..LSB) |
//! |---|---|
//! | `Argb` | A R G B |
//! | `Abgr` | A B G R |
//! | `Rgba` | R G B A |
//! | `Bgra` | B G R A |
//! | `Xrgb` | - R G B |
//! | `Xbgr` | - B G R |
//! | `Rgbx` | R G B - |
//! | `Bgrx` | B G R - |

use crate::raster::{NativeRaster, SampleLayout, StorageKind};

/// Bit masks selecting each component of a packed pixel word.
///
/// A zero alpha mask means the layout has no alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelMasks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: u32,
}

impl ChannelMasks {
    /// Create masks from individual components.
    pub const fn new(red: u32, green: u32, blue: u32, alpha: u32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Masks as `[red, green, blue, alpha]`.
    pub fn as_array(&self) -> [u32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

/// Byte index assignment of each component, 0 = most significant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentIndices {
    /// -1 when the format carries no alpha
    pub alpha: i8,
    pub red: i8,
    pub green: i8,
    pub blue: i8,
}

/// Packed 32-bit pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// `0xAARRGGBB`
    Argb,
    /// `0xAABBGGRR`
    Abgr,
    /// `0xRRGGBBAA`
    Rgba,
    /// `0xBBGGRRAA`
    Bgra,
    /// `0x__RRGGBB`, always opaque
    Xrgb,
    /// `0x__BBGGRR`, always opaque
    Xbgr,
    /// `0xRRGGBB__`, always opaque
    Rgbx,
    /// `0xBBGGRR__`, always opaque
    Bgrx,
}

/// Swap the bytes holding red and blue in an ARGB/ABGR word
#[inline(always)]
fn swap_rb(v: u32) -> u32 {
    (v & 0xFF00_FF00) | (v.rotate_left(16) & 0x00FF_00FF)
}

impl PixelFormat {
    /// Every catalog entry.
    pub const ALL: [PixelFormat; 8] = [
        PixelFormat::Argb,
        PixelFormat::Abgr,
        PixelFormat::Rgba,
        PixelFormat::Bgra,
        PixelFormat::Xrgb,
        PixelFormat::Xbgr,
        PixelFormat::Rgbx,
        PixelFormat::Bgrx,
    ];

    /// Whether the format stores an alpha component.
    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Argb | Self::Abgr | Self::Rgba | Self::Bgra)
    }

    /// Byte index of each component.
    pub fn indices(self) -> ComponentIndices {
        let (alpha, red, green, blue) = match self {
            Self::Argb => (0, 1, 2, 3),
            Self::Abgr => (0, 3, 2, 1),
            Self::Rgba => (3, 0, 1, 2),
            Self::Bgra => (3, 2, 1, 0),
            Self::Xrgb => (-1, 1, 2, 3),
            Self::Xbgr => (-1, 3, 2, 1),
            Self::Rgbx => (-1, 0, 1, 2),
            Self::Bgrx => (-1, 2, 1, 0),
        };
        ComponentIndices {
            alpha,
            red,
            green,
            blue,
        }
    }

    /// The always-opaque view of this format.
    pub fn opaque(self) -> Self {
        match self {
            Self::Argb | Self::Xrgb => Self::Xrgb,
            Self::Abgr | Self::Xbgr => Self::Xbgr,
            Self::Rgba | Self::Rgbx => Self::Rgbx,
            Self::Bgra | Self::Bgrx => Self::Bgrx,
        }
    }

    /// The alpha-bearing counterpart of this format.
    pub fn with_alpha(self) -> Self {
        match self {
            Self::Argb | Self::Xrgb => Self::Argb,
            Self::Abgr | Self::Xbgr => Self::Abgr,
            Self::Rgba | Self::Rgbx => Self::Rgba,
            Self::Bgra | Self::Bgrx => Self::Bgra,
        }
    }

    /// Channel masks equivalent to this format.
    pub fn masks(self) -> ChannelMasks {
        let idx = self.indices();
        let mask = |i: i8| if i < 0 { 0 } else { 0xFFu32 << (24 - 8 * i as u32) };
        ChannelMasks::new(
            mask(idx.red),
            mask(idx.green),
            mask(idx.blue),
            mask(idx.alpha),
        )
    }

    /// Find the catalog entry whose masks match exactly.
    ///
    /// Returns `None` for masks that are not byte-aligned 8-bit components
    /// in one of the catalog orders.
    pub fn from_masks(masks: ChannelMasks) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.masks() == masks)
    }

    /// Convert a native packed value to canonical non-premultiplied ARGB.
    ///
    /// Alpha-less formats always report alpha `0xFF`.
    #[inline]
    pub fn to_canonical_argb(self, pixel: u32) -> u32 {
        match self {
            Self::Argb => pixel,
            Self::Abgr => swap_rb(pixel),
            Self::Rgba => pixel.rotate_right(8),
            Self::Bgra => pixel.swap_bytes(),
            Self::Xrgb => pixel | 0xFF00_0000,
            Self::Xbgr => swap_rb(pixel) | 0xFF00_0000,
            Self::Rgbx => (pixel >> 8) | 0xFF00_0000,
            Self::Bgrx => pixel.swap_bytes() | 0xFF00_0000,
        }
    }

    /// Convert canonical ARGB to this format's native packed value.
    ///
    /// Alpha-less formats store zero in the unused byte.
    #[inline]
    pub fn from_canonical_argb(self, argb: u32) -> u32 {
        match self {
            Self::Argb => argb,
            Self::Abgr => swap_rb(argb),
            Self::Rgba => argb.rotate_left(8),
            Self::Bgra => argb.swap_bytes(),
            Self::Xrgb => argb & 0x00FF_FFFF,
            Self::Xbgr => swap_rb(argb) & 0x00FF_FFFF,
            Self::Rgbx => argb << 8,
            Self::Bgrx => argb.swap_bytes() & 0xFFFF_FF00,
        }
    }
}

/// Catalog format of a raster's native layout, if it has one.
///
/// Only packed 32-bit layouts over 32-bit storage can match.
pub fn compute_format(raster: &NativeRaster) -> Option<PixelFormat> {
    match (raster.layout(), raster.storage().kind()) {
        (SampleLayout::PackedInt(masks), StorageKind::Int) => PixelFormat::from_masks(*masks),
        _ => None,
    }
}
