//! PixelFormat and alpha regression test
//!
//! Tests catalog round-trips over sampled 32-bit values, alpha forcing
//! for opaque formats, and premultiply/unpremultiply behavior.

use blitkit_core::alpha::{convert_premul, div255_round};
use blitkit_core::{PixelFormat, blend_src_over, premultiply, unpremultiply};
use blitkit_test::RegParams;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

const SAMPLES: usize = 20_000;

#[test]
fn format_reg() {
    let mut rp = RegParams::new("format");
    let mut rng = StdRng::seed_from_u64(0x5EED_F00D);

    // --- Test 1: native -> canonical -> native is stable ---
    let mut unstable = 0;
    let mut inexact = 0;
    for _ in 0..SAMPLES {
        let x = rng.next_u32();
        for f in PixelFormat::ALL {
            let native = f.from_canonical_argb(x);
            if f.from_canonical_argb(f.to_canonical_argb(native)) != native {
                unstable += 1;
            }
            if f.has_alpha() && f.to_canonical_argb(native) != x {
                inexact += 1;
            }
        }
    }
    rp.compare_values(0.0, unstable as f64, 0.0);
    rp.compare_values(0.0, inexact as f64, 0.0);

    // --- Test 2: alpha-less formats read opaque ---
    for f in PixelFormat::ALL.into_iter().filter(|f| !f.has_alpha()) {
        let argb = f.to_canonical_argb(rng.next_u32() & 0x00FF_FFFF);
        rp.compare_values(255.0, (argb >> 24) as f64, 0.0);
        rp.compare_values(1.0, (f.with_alpha().opaque() == f) as u8 as f64, 0.0);
    }

    // --- Test 3: canonical format is the identity ---
    let x = rng.next_u32();
    rp.compare_values(x as f64, PixelFormat::Argb.to_canonical_argb(x) as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn premultiply_reg() {
    let mut rp = RegParams::new("premultiply");
    let mut rng = StdRng::seed_from_u64(7);

    // --- Test 1: exact at the alpha extremes ---
    for _ in 0..1000 {
        let rgb = rng.next_u32() & 0x00FF_FFFF;
        let opaque = 0xFF00_0000 | rgb;
        rp.compare_values(opaque as f64, unpremultiply(premultiply(opaque)) as f64, 0.0);
        rp.compare_values(0.0, unpremultiply(premultiply(rgb)) as f64, 0.0);
    }

    // --- Test 2: round trip lands on the same premultiplied value ---
    let mut drift = 0;
    let mut worst = 0u32;
    for _ in 0..SAMPLES {
        let x = rng.next_u32();
        let p = premultiply(x);
        if premultiply(unpremultiply(p)) != p {
            drift += 1;
        }
        // straight components stay within the quantization step of alpha
        let a = x >> 24;
        if a > 0 {
            let back = unpremultiply(p);
            for shift in [0, 8, 16] {
                let d = ((x >> shift) & 0xFF).abs_diff((back >> shift) & 0xFF);
                let step = 255u32.div_ceil(a);
                if d > step {
                    worst = worst.max(d);
                }
            }
        }
    }
    rp.compare_values(0.0, drift as f64, 0.0);
    rp.compare_values(0.0, worst as f64, 0.0);

    // --- Test 3: convert_premul is a no-op when the flags agree ---
    let x = rng.next_u32();
    rp.compare_values(x as f64, convert_premul(x, true, true) as f64, 0.0);
    rp.compare_values(x as f64, convert_premul(x, false, false) as f64, 0.0);
    rp.compare_values(128.0, div255_round(255 * 128) as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn blend_reg() {
    let mut rp = RegParams::new("blend");
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..SAMPLES {
        let dst = premultiply(rng.next_u32());
        let src = premultiply(rng.next_u32() | 0xFF00_0000);
        // opaque source replaces
        rp.compare_values(src as f64, blend_src_over(src, dst) as f64, 0.0);
        // transparent source keeps
        rp.compare_values(dst as f64, blend_src_over(0, dst) as f64, 0.0);
    }

    // result alpha never decreases
    let mut lowered = 0;
    for _ in 0..SAMPLES {
        let dst = premultiply(rng.next_u32());
        let src = premultiply(rng.next_u32());
        if blend_src_over(src, dst) >> 24 < dst >> 24 {
            lowered += 1;
        }
    }
    rp.compare_values(0.0, lowered as f64, 0.0);

    assert!(rp.cleanup());
}
