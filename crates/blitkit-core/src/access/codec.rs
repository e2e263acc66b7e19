//! Per-strategy pixel encoding and decoding

use super::{AccessStrategy, NarrowLayout};
use crate::alpha::{convert_premul, premultiply, unpremultiply};
use crate::format::PixelFormat;
use crate::raster::color_model;
use crate::raster::{Pixels, PixelsMut, SampleLayout};

/// Replicate the top bits of a `bits`-wide channel into 8 bits.
#[inline(always)]
fn expand(v: u32, bits: u32) -> u32 {
    (v << (8 - bits)) | (v >> (2 * bits - 8))
}

/// Round an 8-bit channel to `max` (31 or 63).
#[inline(always)]
fn reduce(c: u32, max: u32) -> u32 {
    (c * max + 127) / 255
}

impl NarrowLayout {
    /// Decode a native word to opaque straight ARGB.
    #[inline]
    pub(crate) fn decode(self, w: u32) -> u32 {
        let (r, g, b) = match self {
            Self::Rgb565 => (
                expand((w >> 11) & 0x1F, 5),
                expand((w >> 5) & 0x3F, 6),
                expand(w & 0x1F, 5),
            ),
            Self::Rgb555 => (
                expand((w >> 10) & 0x1F, 5),
                expand((w >> 5) & 0x1F, 5),
                expand(w & 0x1F, 5),
            ),
            Self::Gray8 => {
                let v = w & 0xFF;
                (v, v, v)
            }
            Self::Gray16 => {
                let v = ((w & 0xFFFF) * 255 + 32767) / 65535;
                (v, v, v)
            }
        };
        0xFF00_0000 | (r << 16) | (g << 8) | b
    }

    /// Encode straight ARGB to a native word. Alpha is dropped.
    #[inline]
    pub(crate) fn encode(self, argb: u32) -> u32 {
        let r = (argb >> 16) & 0xFF;
        let g = (argb >> 8) & 0xFF;
        let b = argb & 0xFF;
        match self {
            Self::Rgb565 => (reduce(r, 31) << 11) | (reduce(g, 63) << 5) | reduce(b, 31),
            Self::Rgb555 => (reduce(r, 31) << 10) | (reduce(g, 31) << 5) | reduce(b, 31),
            Self::Gray8 => luma(r, g, b),
            Self::Gray16 => luma(r, g, b) * 257,
        }
    }
}

/// Integer luma in the encoded domain; exact for r == g == b.
#[inline(always)]
fn luma(r: u32, g: u32, b: u32) -> u32 {
    (77 * r + 150 * g + 29 * b + 128) >> 8
}

/// Addressing and conversion for one validated raster.
#[derive(Debug, Clone)]
pub(crate) struct PixelCodec {
    pub(crate) strategy: AccessStrategy,
    pub(crate) layout: SampleLayout,
    pub(crate) offset: usize,
    pub(crate) stride: usize,
    pub(crate) pixel_stride: usize,
    /// Native components are premultiplied
    pub(crate) premultiplied: bool,
}

impl PixelCodec {
    /// Element index of pixel `(x, y)`.
    #[inline(always)]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        self.offset + y as usize * self.stride + x as usize * self.pixel_stride
    }

    /// Element index of the first pixel of row `y`.
    #[inline(always)]
    pub(crate) fn row_start(&self, y: u32) -> usize {
        self.offset + y as usize * self.stride
    }

    /// Read the pixel at element `idx` as ARGB, premultiplied if `premul`.
    #[inline]
    pub(crate) fn read(&self, px: &Pixels<'_>, idx: usize, premul: bool) -> u32 {
        match self.strategy {
            AccessStrategy::DirectPackedArray(format) => {
                let argb = format.to_canonical_argb(px.word(idx));
                convert_premul(argb, self.premultiplied, premul)
            }
            // narrow layouts are opaque, so the premultiplied form is the same
            AccessStrategy::NarrowArray(narrow) => narrow.decode(px.word(idx)),
            AccessStrategy::GenericAccessor => {
                let argb = color_model::read_argb(&self.layout, px, idx, self.premultiplied);
                if premul { premultiply(argb) } else { argb }
            }
        }
    }

    /// Write ARGB, premultiplied if `premul`, to the pixel at element `idx`.
    #[inline]
    pub(crate) fn write(&self, px: &mut PixelsMut<'_>, idx: usize, argb: u32, premul: bool) {
        match self.strategy {
            AccessStrategy::DirectPackedArray(format) => {
                px.set_word(idx, self.encode_direct(format, argb, premul));
            }
            AccessStrategy::NarrowArray(narrow) => {
                let straight = if premul { unpremultiply(argb) } else { argb };
                px.set_word(idx, narrow.encode(straight));
            }
            AccessStrategy::GenericAccessor => {
                let straight = if premul { unpremultiply(argb) } else { argb };
                color_model::write_argb(&self.layout, px, idx, straight, self.premultiplied);
            }
        }
    }

    /// Native word for a direct-array raster in `format`.
    #[inline(always)]
    pub(crate) fn encode_direct(&self, format: PixelFormat, argb: u32, premul: bool) -> u32 {
        format.from_canonical_argb(convert_premul(argb, premul, self.premultiplied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_extremes() {
        for n in [
            NarrowLayout::Rgb565,
            NarrowLayout::Rgb555,
            NarrowLayout::Gray8,
            NarrowLayout::Gray16,
        ] {
            assert_eq!(n.decode(n.encode(0xFFFF_FFFF)), 0xFFFF_FFFF, "{n:?}");
            assert_eq!(n.decode(n.encode(0xFF00_0000)), 0xFF00_0000, "{n:?}");
        }
    }

    #[test]
    fn test_565_channel_replication() {
        // 5-bit 0b10000 expands to 0b10000100
        assert_eq!(expand(0x10, 5), 0x84);
        assert_eq!(expand(0x3F, 6), 0xFF);
        assert_eq!(NarrowLayout::Rgb565.encode(0xFFFF_0000), 0xF800);
    }

    #[test]
    fn test_gray_exact_roundtrip() {
        for v in 0..=255u32 {
            let argb = 0xFF00_0000 | (v << 16) | (v << 8) | v;
            assert_eq!(NarrowLayout::Gray8.encode(argb), v);
            assert_eq!(NarrowLayout::Gray8.decode(v), argb);
            assert_eq!(NarrowLayout::Gray16.decode(NarrowLayout::Gray16.encode(argb)), argb);
        }
    }

    #[test]
    fn test_565_quantization_error() {
        for v in (0..=255u32).step_by(7) {
            let argb = 0xFF00_0000 | (v << 16) | (v << 8) | v;
            let back = NarrowLayout::Rgb565.decode(NarrowLayout::Rgb565.encode(argb));
            // 5-bit quantization step is about 8.2
            assert!(((back & 0xFF) as i32 - v as i32).abs() <= 4, "{v}");
        }
    }
}
