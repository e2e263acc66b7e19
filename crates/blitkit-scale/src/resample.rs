//! Software resampling kernels
//!
//! Kernels work on packed ARGB words held in plain row-major slices.
//! Coordinates are continuous: input pixel `i` covers `[i, i + 1)`, so an
//! output pixel is sampled at its centre mapped into input space.
//!
//! Filtering kernels expect premultiplied input. Only nearest-neighbor
//! sampling is run on straight alpha, since it never mixes pixels.

use crate::algorithm::ScalingAlgorithm;
use std::ops::Range;

/// Borrowed row-major image without padding
#[derive(Debug, Clone, Copy)]
pub(crate) struct Image<'a> {
    pub data: &'a [u32],
    pub width: u32,
    pub height: u32,
}

impl<'a> Image<'a> {
    pub fn new(data: &'a [u32], width: u32, height: u32) -> Self {
        debug_assert!(data.len() >= width as usize * height as usize);
        Self {
            data,
            width,
            height,
        }
    }

    /// Pixel at `(x, y)`, clamped to the nearest edge pixel.
    #[inline]
    fn at(&self, x: i64, y: i64) -> u32 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[y * self.width as usize + x]
    }
}

#[inline]
fn unpack(p: u32) -> [f64; 4] {
    [
        (p >> 24) as f64,
        ((p >> 16) & 0xFF) as f64,
        ((p >> 8) & 0xFF) as f64,
        (p & 0xFF) as f64,
    ]
}

#[inline]
fn pack(c: [u32; 4]) -> u32 {
    (c[0] << 24) | (c[1] << 16) | (c[2] << 8) | c[3]
}

/// Interpolate one channel between four neighbors.
#[inline]
fn interpolate_channel(p00: u32, p10: u32, p01: u32, p11: u32, fx: f64, fy: f64) -> u32 {
    let top = p00 as f64 * (1.0 - fx) + p10 as f64 * fx;
    let bottom = p01 as f64 * (1.0 - fx) + p11 as f64 * fx;
    let result = top * (1.0 - fy) + bottom * fy;
    result.round() as u32
}

/// Catmull-Rom weights for offsets -1, 0, 1, 2 at fraction `t`.
#[inline]
fn cubic_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        (-t3 + 2.0 * t2 - t) * 0.5,
        (3.0 * t3 - 5.0 * t2 + 2.0) * 0.5,
        (-3.0 * t3 + 4.0 * t2 + t) * 0.5,
        (t3 - t2) * 0.5,
    ]
}

/// Overlap of pixel `[i, i + 1)` with `[lo, hi)`.
#[inline]
fn coverage(i: i64, lo: f64, hi: f64) -> f64 {
    ((i + 1) as f64).min(hi) - (i as f64).max(lo)
}

/// Per-pixel sampler for one round
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sampler {
    algorithm: ScalingAlgorithm,
    /// Input pixels per output pixel, used for the box footprint
    kx: f64,
    ky: f64,
}

impl Sampler {
    pub fn new(algorithm: ScalingAlgorithm, kx: f64, ky: f64) -> Self {
        Self { algorithm, kx, ky }
    }

    /// Sample `img` at continuous point `(u, v)`.
    pub fn sample(&self, img: &Image<'_>, u: f64, v: f64) -> u32 {
        match self.algorithm {
            ScalingAlgorithm::Nearest => img.at(u.floor() as i64, v.floor() as i64),
            ScalingAlgorithm::Bilinear => bilinear(img, u, v),
            ScalingAlgorithm::Bicubic => bicubic(img, u, v),
            ScalingAlgorithm::BoxSampled => self.box_average(img, u, v),
        }
    }

    fn box_average(&self, img: &Image<'_>, u: f64, v: f64) -> u32 {
        let x0 = (u - self.kx * 0.5).max(0.0);
        let x1 = (u + self.kx * 0.5).min(img.width as f64);
        let y0 = (v - self.ky * 0.5).max(0.0);
        let y1 = (v + self.ky * 0.5).min(img.height as f64);
        if x1 <= x0 || y1 <= y0 {
            return img.at(u.floor() as i64, v.floor() as i64);
        }

        let mut sum = [0.0f64; 4];
        let mut total = 0.0;
        for y in (y0.floor() as i64)..(y1.ceil() as i64) {
            let wy = coverage(y, y0, y1);
            for x in (x0.floor() as i64)..(x1.ceil() as i64) {
                let w = wy * coverage(x, x0, x1);
                let c = unpack(img.at(x, y));
                for (s, c) in sum.iter_mut().zip(c) {
                    *s += c * w;
                }
                total += w;
            }
        }
        if total <= 0.0 {
            return img.at(u.floor() as i64, v.floor() as i64);
        }
        pack(sum.map(|s| (s / total).round().clamp(0.0, 255.0) as u32))
    }
}

fn bilinear(img: &Image<'_>, u: f64, v: f64) -> u32 {
    let sx = u - 0.5;
    let sy = v - 0.5;
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = img.at(x0, y0);
    let p10 = img.at(x0 + 1, y0);
    let p01 = img.at(x0, y0 + 1);
    let p11 = img.at(x0 + 1, y0 + 1);

    let mut out = 0u32;
    for shift in [24, 16, 8, 0] {
        let c = interpolate_channel(
            (p00 >> shift) & 0xFF,
            (p10 >> shift) & 0xFF,
            (p01 >> shift) & 0xFF,
            (p11 >> shift) & 0xFF,
            fx,
            fy,
        );
        out |= c.min(255) << shift;
    }
    out
}

fn bicubic(img: &Image<'_>, u: f64, v: f64) -> u32 {
    let sx = u - 0.5;
    let sy = v - 0.5;
    let x0 = sx.floor();
    let y0 = sy.floor();
    let wx = cubic_weights(sx - x0);
    let wy = cubic_weights(sy - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut sum = [0.0f64; 4];
    for (j, wyj) in wy.iter().enumerate() {
        let y = y0 - 1 + j as i64;
        for (i, wxi) in wx.iter().enumerate() {
            let c = unpack(img.at(x0 - 1 + i as i64, y));
            let w = wxi * wyj;
            for (s, c) in sum.iter_mut().zip(c) {
                *s += c * w;
            }
        }
    }

    // overshoot is clamped to a valid premultiplied value
    let a = sum[0].round().clamp(0.0, 255.0) as u32;
    let color = |s: f64| (s.round().clamp(0.0, 255.0) as u32).min(a);
    pack([a, color(sum[1]), color(sum[2]), color(sum[3])])
}

/// Resample rows `rows` of an `out_w` x `out_h` output into `out`.
///
/// `out` holds exactly those rows.
pub(crate) fn resample_rows(
    src: &Image<'_>,
    out: &mut [u32],
    out_w: u32,
    out_h: u32,
    rows: Range<u32>,
    algorithm: ScalingAlgorithm,
) {
    let kx = src.width as f64 / out_w as f64;
    let ky = src.height as f64 / out_h as f64;
    let sampler = Sampler::new(algorithm, kx, ky);
    for (row, y) in out.chunks_exact_mut(out_w as usize).zip(rows) {
        let v = (y as f64 + 0.5) * ky;
        for (x, px) in row.iter_mut().enumerate() {
            *px = sampler.sample(src, (x as f64 + 0.5) * kx, v);
        }
    }
}
