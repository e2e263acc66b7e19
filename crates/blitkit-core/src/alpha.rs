//! Associated-alpha arithmetic on canonical ARGB words
//!
//! Premultiplication uses `c' = round(c * a / 255)`, the inverse
//! `c' = round(c * 255 / a)`, with the inverse of a zero-alpha pixel
//! defined as transparent black.

/// `round(v / 255)` for `v <= 255 * 255`.
///
/// 255 is odd, so `v / 255` never lands exactly on a half and the
/// `+127` bias rounds correctly.
#[inline(always)]
pub fn div255_round(v: u32) -> u32 {
    (v + 127) / 255
}

/// Alpha byte of a canonical ARGB word.
#[inline(always)]
pub fn alpha_of(argb: u32) -> u32 {
    argb >> 24
}

#[inline(always)]
fn map_components(argb: u32, f: impl Fn(u32) -> u32) -> u32 {
    let r = f((argb >> 16) & 0xFF);
    let g = f((argb >> 8) & 0xFF);
    let b = f(argb & 0xFF);
    (argb & 0xFF00_0000) | (r << 16) | (g << 8) | b
}

/// Convert non-premultiplied ARGB to premultiplied ARGB.
#[inline]
pub fn premultiply(argb: u32) -> u32 {
    match alpha_of(argb) {
        255 => argb,
        0 => 0,
        a => map_components(argb, |c| div255_round(c * a)),
    }
}

/// Convert premultiplied ARGB to non-premultiplied ARGB.
///
/// Components larger than alpha (not valid premultiplied data) saturate
/// at 255.
#[inline]
pub fn unpremultiply(argb: u32) -> u32 {
    match alpha_of(argb) {
        255 => argb,
        0 => 0,
        a => map_components(argb, |c| ((c * 255 + a / 2) / a).min(255)),
    }
}

/// Convert between premultiplied and straight representations.
#[inline]
pub fn convert_premul(argb: u32, from_premul: bool, to_premul: bool) -> u32 {
    match (from_premul, to_premul) {
        (false, true) => premultiply(argb),
        (true, false) => unpremultiply(argb),
        _ => argb,
    }
}

/// Premultiplied source-over: `dst' = src + dst * (1 - src_alpha)`.
#[inline]
pub fn blend_src_over(src: u32, dst: u32) -> u32 {
    let sa = alpha_of(src);
    if sa == 255 {
        return src;
    }
    if sa == 0 && src == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mut out = 0u32;
    for shift in [0u32, 8, 16, 24] {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        let c = (s + div255_round(d * inv)).min(255);
        out |= c << shift;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premultiply_known() {
        assert_eq!(premultiply(0x80FF_8000), 0x8080_4000);
        assert_eq!(premultiply(0x00FF_FFFF), 0);
        assert_eq!(premultiply(0xFF12_3456), 0xFF12_3456);
    }

    #[test]
    fn test_unpremultiply_zero_alpha() {
        assert_eq!(unpremultiply(0x0012_3456), 0);
    }

    #[test]
    fn test_unpremultiply_saturates() {
        // red > alpha is not valid premultiplied data
        assert_eq!(unpremultiply(0x10FF_0000) & 0x00FF_0000, 0x00FF_0000);
    }

    #[test]
    fn test_blend_opaque_and_transparent() {
        assert_eq!(blend_src_over(0xFF11_2233, 0x8000_0080), 0xFF11_2233);
        assert_eq!(blend_src_over(0, 0x8000_0080), 0x8000_0080);
    }

    #[test]
    fn test_blend_half() {
        // 50% white over opaque black
        let src = premultiply(0x80FF_FFFF);
        let out = blend_src_over(src, 0xFF00_0000);
        assert_eq!(out >> 24, 0xFF);
        assert_eq!((out >> 16) & 0xFF, 0x80);
    }
}
