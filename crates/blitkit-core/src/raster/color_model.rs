//! Generic per-pixel color model
//!
//! The host's universal conversion between any sample layout and straight
//! sRGB ARGB. Correct for every layout, but it derives each channel from
//! masks at run time, and it treats the gray layouts as *linear* gray, so
//! a gray byte written through it does not read back unchanged once it
//! has crossed the sRGB curve. The narrow accessor path exists to bypass
//! that.

use super::{Pixels, PixelsMut, SampleLayout};
use crate::alpha::{premultiply, unpremultiply};
use crate::format::ChannelMasks;

/// Scale a `bits`-wide channel value to 8 bits, rounding.
#[inline]
fn widen(v: u32, max: u32) -> u32 {
    ((v as u64 * 255 + max as u64 / 2) / max as u64) as u32
}

/// Scale an 8-bit value to a `max`-valued channel, rounding.
#[inline]
fn narrow(c: u32, max: u32) -> u32 {
    ((c as u64 * max as u64 + 127) / 255) as u32
}

#[inline]
fn channel_max(mask: u32) -> u32 {
    let bits = (mask >> mask.trailing_zeros()).count_ones();
    if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 }
}

fn unpack_masked(word: u32, masks: &ChannelMasks) -> u32 {
    let get = |mask: u32, absent: u32| {
        if mask == 0 {
            absent
        } else {
            widen((word & mask) >> mask.trailing_zeros(), channel_max(mask))
        }
    };
    let a = get(masks.alpha, 0xFF);
    let r = get(masks.red, 0);
    let g = get(masks.green, 0);
    let b = get(masks.blue, 0);
    (a << 24) | (r << 16) | (g << 8) | b
}

fn pack_masked(argb: u32, masks: &ChannelMasks) -> u32 {
    let put = |mask: u32, c: u32| {
        if mask == 0 {
            0
        } else {
            (narrow(c, channel_max(mask)) << mask.trailing_zeros()) & mask
        }
    };
    put(masks.alpha, argb >> 24)
        | put(masks.red, (argb >> 16) & 0xFF)
        | put(masks.green, (argb >> 8) & 0xFF)
        | put(masks.blue, argb & 0xFF)
}

/// sRGB transfer function, encoded -> linear
fn srgb_to_linear(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer function, linear -> encoded
fn linear_to_srgb(v: f64) -> f64 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn gray_to_argb(gray: u32, max: u32) -> u32 {
    let s = linear_to_srgb(gray as f64 / max as f64);
    let v = (s * 255.0).round().clamp(0.0, 255.0) as u32;
    0xFF00_0000 | (v << 16) | (v << 8) | v
}

fn argb_to_gray(argb: u32, max: u32) -> u32 {
    let lin = |c: u32| srgb_to_linear(c as f64 / 255.0);
    let lum = 0.2126 * lin((argb >> 16) & 0xFF)
        + 0.7152 * lin((argb >> 8) & 0xFF)
        + 0.0722 * lin(argb & 0xFF);
    (lum * max as f64).round().clamp(0.0, max as f64) as u32
}

fn nearest_palette_index(palette: &[u32], argb: u32) -> u32 {
    let dist = |c: u32| {
        (0..4)
            .map(|i| {
                let d = ((c >> (i * 8)) & 0xFF) as i32 - ((argb >> (i * 8)) & 0xFF) as i32;
                (d * d) as u32
            })
            .sum::<u32>()
    };
    palette
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| dist(**c))
        .map(|(i, _)| i as u32)
        .unwrap_or(0)
}

/// Read pixel at element index `idx` as straight ARGB.
pub(crate) fn read_argb(
    layout: &SampleLayout,
    px: &Pixels<'_>,
    idx: usize,
    premultiplied: bool,
) -> u32 {
    let argb = match layout {
        SampleLayout::PackedInt(masks) => unpack_masked(px.word(idx), masks),
        SampleLayout::PackedShort(short) => unpack_masked(px.word(idx), &short.masks()),
        SampleLayout::Gray8 => gray_to_argb(px.word(idx), 0xFF),
        SampleLayout::Gray16 => gray_to_argb(px.word(idx), 0xFFFF),
        SampleLayout::InterleavedBytes(order) => {
            let byte = |off: u8| px.word(idx + off as usize) & 0xFF;
            let a = order.alpha.map_or(0xFF, byte);
            (a << 24) | (byte(order.red) << 16) | (byte(order.green) << 8) | byte(order.blue)
        }
        SampleLayout::Indexed(palette) => palette
            .get(px.word(idx) as usize)
            .copied()
            .unwrap_or(0),
    };
    if premultiplied { unpremultiply(argb) } else { argb }
}

/// Write straight ARGB to the pixel at element index `idx`.
pub(crate) fn write_argb(
    layout: &SampleLayout,
    px: &mut PixelsMut<'_>,
    idx: usize,
    argb: u32,
    premultiplied: bool,
) {
    let argb = if premultiplied { premultiply(argb) } else { argb };
    match layout {
        SampleLayout::PackedInt(masks) => px.set_word(idx, pack_masked(argb, masks)),
        SampleLayout::PackedShort(short) => px.set_word(idx, pack_masked(argb, &short.masks())),
        SampleLayout::Gray8 => px.set_word(idx, argb_to_gray(argb, 0xFF)),
        SampleLayout::Gray16 => px.set_word(idx, argb_to_gray(argb, 0xFFFF)),
        SampleLayout::InterleavedBytes(order) => {
            px.set_word(idx + order.red as usize, (argb >> 16) & 0xFF);
            px.set_word(idx + order.green as usize, (argb >> 8) & 0xFF);
            px.set_word(idx + order.blue as usize, argb & 0xFF);
            if let Some(a) = order.alpha {
                px.set_word(idx + a as usize, argb >> 24);
            }
        }
        SampleLayout::Indexed(palette) => {
            px.set_word(idx, nearest_palette_index(palette, argb));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;

    #[test]
    fn test_masked_matches_catalog() {
        for f in PixelFormat::ALL {
            let masks = f.masks();
            let native = f.from_canonical_argb(0xC012_3456);
            assert_eq!(unpack_masked(native, &masks), f.to_canonical_argb(native));
            assert_eq!(pack_masked(0xC012_3456, &masks), native);
        }
    }

    #[test]
    fn test_565_extremes() {
        let m = super::super::ShortLayout::Rgb565.masks();
        assert_eq!(unpack_masked(0xFFFF, &m), 0xFFFF_FFFF);
        assert_eq!(unpack_masked(0x0000, &m), 0xFF00_0000);
        assert_eq!(pack_masked(0xFFFF_0000, &m), 0xF800);
    }

    #[test]
    fn test_gray_is_gamma_adjusted() {
        // Linear mid gray reads back much brighter in sRGB
        let argb = gray_to_argb(128, 0xFF);
        assert!((argb & 0xFF) > 160);
        assert_eq!(argb_to_gray(0xFFFF_FFFF, 0xFF), 0xFF);
        assert_eq!(argb_to_gray(0xFF00_0000, 0xFF), 0);
    }

    #[test]
    fn test_nearest_palette() {
        let pal = [0xFF00_0000, 0xFFFF_FFFF, 0xFFFF_0000];
        assert_eq!(nearest_palette_index(&pal, 0xFFF0_1010), 2);
        assert_eq!(nearest_palette_index(&pal, 0xFF10_1010), 0);
    }
}
