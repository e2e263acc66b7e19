//! Raster accessor regression test
//!
//! Tests that every access strategy reads and writes the same pixels,
//! that construction errors name the violated precondition, and that
//! bulk transfers reject aliasing and bad geometry before writing.

use blitkit_core::{
    AccessPermissions, AccessStrategy, ByteOrder, CopyPath, NarrowLayout, NativeRaster,
    PixelBuffer, PixelFormat, RasterParts, RasterView, Rect, SampleLayout, ShortLayout, Storage,
    copy_image, premultiply,
};
use blitkit_test::{RegParams, max_component_diff, pattern_color, pattern_view};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

fn view(raster: NativeRaster, perms: AccessPermissions) -> RasterView {
    RasterView::new(raster, perms).expect("view")
}

/// Write `argb` through `writer`, read it back through `reader`.
fn cross(writer: &mut RasterView, reader: &RasterView, argb: u32, premul: bool) -> u32 {
    writer.set_pixel(1, 1, argb, premul).expect("set");
    reader.get_pixel(1, 1, premul).expect("get")
}

#[test_log::test]
fn access_strategy_reg() {
    let mut rp = RegParams::new("access_strategy");
    let mut rng = StdRng::seed_from_u64(0xACCE55);

    // --- Test 1: packed formats agree across direct and generic ---
    for format in PixelFormat::ALL {
        for premultiplied in [false, true] {
            let raster = NativeRaster::with_format(3, 3, format, premultiplied).expect("raster");
            let mut direct = view(raster.clone(), AccessPermissions::all());
            let mut generic = view(raster, AccessPermissions::none());
            rp.compare_values(
                1.0,
                (direct.strategy() == AccessStrategy::DirectPackedArray(format)) as u8 as f64,
                0.0,
            );
            rp.compare_values(
                1.0,
                (generic.strategy() == AccessStrategy::GenericAccessor) as u8 as f64,
                0.0,
            );
            let mut mismatches = 0;
            for _ in 0..500 {
                let raw = rng.next_u32();
                for premul in [false, true] {
                    // premultiplied input must be valid associated alpha
                    let argb = if premul { premultiply(raw) } else { raw };
                    let a = cross(&mut direct, &generic, argb, premul);
                    let b = cross(&mut generic, &direct, argb, premul);
                    let c = direct.get_pixel(1, 1, premul).expect("get");
                    if a != b || b != c {
                        mismatches += 1;
                    }
                }
            }
            rp.compare_values(0.0, mismatches as f64, 0.0);
        }
    }

    // --- Test 2: 16-bit RGB narrow path within one unit of generic ---
    for short in [ShortLayout::Rgb555, ShortLayout::Rgb565] {
        let raster =
            NativeRaster::new(3, 3, SampleLayout::PackedShort(short), false).expect("raster");
        let mut narrow = view(raster.clone(), AccessPermissions::bypass_only());
        let generic = view(raster, AccessPermissions::none());
        rp.compare_values(
            1.0,
            matches!(narrow.strategy(), AccessStrategy::NarrowArray(_)) as u8 as f64,
            0.0,
        );
        let mut worst = 0u8;
        for _ in 0..2000 {
            let argb = rng.next_u32() | 0xFF00_0000;
            narrow.set_pixel(1, 1, argb, false).expect("set");
            let a = narrow.get_pixel(1, 1, false).expect("get");
            let b = generic.get_pixel(1, 1, false).expect("get");
            worst = worst.max(max_component_diff(a, b));
        }
        rp.compare_values(0.0, worst as f64, 1.0);
    }

    // --- Test 3: gray written by the narrow path reads back unchanged ---
    for (layout, expected) in [
        (SampleLayout::Gray8, NarrowLayout::Gray8),
        (SampleLayout::Gray16, NarrowLayout::Gray16),
    ] {
        let raster = NativeRaster::new(2, 2, layout, false).expect("raster");
        let mut narrow = view(raster.clone(), AccessPermissions::all());
        let mut generic = view(raster, AccessPermissions::none());
        rp.compare_values(
            1.0,
            (narrow.strategy() == AccessStrategy::NarrowArray(expected)) as u8 as f64,
            0.0,
        );
        let reader = narrow.clone();
        let mut changed = 0;
        for v in 0..=255u32 {
            let gray = 0xFF00_0000 | (v << 16) | (v << 8) | v;
            if cross(&mut narrow, &reader, gray, false) != gray {
                changed += 1;
            }
        }
        rp.compare_values(0.0, changed as f64, 0.0);

        // the generic color model treats gray as linear and shifts mid tones
        let mid = 0xFF80_8080;
        let through_generic = cross(&mut generic, &narrow, mid, false);
        rp.compare_values(1.0, (through_generic != mid) as u8 as f64, 0.0);
    }

    // --- Test 4: interleaved layouts stay on the generic path and round-trip ---
    for order in [ByteOrder::BGR, ByteOrder::ABGR, ByteOrder::RGB] {
        let raster = NativeRaster::new(3, 2, SampleLayout::InterleavedBytes(order), false)
            .expect("raster");
        let mut v = view(raster, AccessPermissions::all());
        rp.compare_values(
            1.0,
            (v.strategy() == AccessStrategy::GenericAccessor) as u8 as f64,
            0.0,
        );
        let argb = if order.alpha.is_some() { 0x7F12_3456 } else { 0xFF12_3456 };
        v.set_pixel(2, 1, argb, false).expect("set");
        rp.compare_values(argb as f64, v.get_pixel(2, 1, false).expect("get") as f64, 0.0);
    }

    // --- Test 5: indexed layout snaps to the palette ---
    let palette: std::sync::Arc<[u32]> = vec![0xFF00_0000, 0xFFFF_FFFF, 0xFF00_00FF].into();
    let raster = NativeRaster::new(2, 2, SampleLayout::Indexed(palette), false).expect("raster");
    let mut v = view(raster, AccessPermissions::all());
    v.set_pixel(0, 0, 0xFF10_10F0, false).expect("set");
    rp.compare_values(0xFF00_00FF_u32 as f64, v.get_pixel(0, 0, false).expect("get") as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn access_errors_reg() {
    let mut rp = RegParams::new("access_errors");

    // --- Test 1: construction failures carry stable messages ---
    let base = NativeRaster::with_format(6, 6, PixelFormat::Argb, false).expect("raster");
    let child = base.child(Rect::new_unchecked(2, 2, 3, 3)).expect("child");
    let msg = RasterView::new(child, AccessPermissions::all())
        .expect_err("translated")
        .to_string();
    rp.compare_values(1.0, (msg == "raster translation") as u8 as f64, 0.0);

    let mut parts = RasterParts::new(
        4,
        4,
        SampleLayout::PackedShort(ShortLayout::Rgb565),
        Storage::Short(PixelBuffer::new(16)),
    );
    parts.scanline_stride = None;
    let raster = NativeRaster::from_parts(parts.clone()).expect("parts");
    let msg = RasterView::new(raster, AccessPermissions::all())
        .expect_err("no stride")
        .to_string();
    rp.compare_values(1.0, (msg == "scanline stride not retrievable") as u8 as f64, 0.0);

    parts.scanline_stride = Some(3);
    let raster = NativeRaster::from_parts(parts).expect("parts");
    let msg = RasterView::new(raster, AccessPermissions::all())
        .expect_err("narrow stride")
        .to_string();
    rp.compare_values(1.0, (msg == "bad sample model") as u8 as f64, 0.0);

    // --- Test 2: bulk operations reject aliasing, accept distinct buffers ---
    let shared = PixelBuffer::<u32>::new(32);
    let raster =
        NativeRaster::wrap_int_buffer(shared.clone(), 4, 4, 0, 4, PixelFormat::Argb, false)
            .expect("wrap");
    let mut v = view(raster, AccessPermissions::all());
    let rect = Rect::new_unchecked(0, 0, 4, 4);
    let aliased = v.copy_pixels_into(rect, &shared, 16, 4, PixelFormat::Argb, false);
    rp.compare_values(1.0, aliased.is_err() as u8 as f64, 0.0);

    let neighbor = PixelBuffer::<u32>::new(16);
    let ok = v.copy_pixels_into(rect, &neighbor, 0, 4, PixelFormat::Argb, false);
    rp.compare_values(1.0, matches!(ok, Ok(CopyPath::DirectArray)) as u8 as f64, 0.0);

    let other = view(
        NativeRaster::with_format(4, 4, PixelFormat::Argb, false).expect("raster"),
        AccessPermissions::all(),
    );
    let alias = v.clone();
    rp.compare_values(
        1.0,
        copy_image(&alias, rect, &mut v, rect).is_err() as u8 as f64,
        0.0,
    );
    rp.compare_values(1.0, copy_image(&other, rect, &mut v, rect).is_ok() as u8 as f64, 0.0);

    // --- Test 3: rejected calls write nothing ---
    let mut target = view(
        NativeRaster::with_format(4, 4, PixelFormat::Argb, false).expect("raster"),
        AccessPermissions::all(),
    );
    let src = PixelBuffer::from_vec(vec![0xFFFF_FFFF; 16]);
    let outside = Rect::new_unchecked(2, 2, 3, 3);
    let bad = target.copy_pixels_from(outside, &src, 0, 3, PixelFormat::Argb, false);
    rp.compare_values(1.0, bad.is_err() as u8 as f64, 0.0);
    let untouched = target.to_argb_vec(target.bounds(), false).expect("snapshot");
    rp.compare_values(0.0, untouched.iter().filter(|&&p| p != 0).count() as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn access_bulk_reg() {
    let mut rp = RegParams::new("access_bulk");

    // --- Test 1: buffer transfer agrees for every strategy ---
    let layouts = [
        SampleLayout::packed(PixelFormat::Bgra),
        SampleLayout::packed(PixelFormat::Xbgr),
        SampleLayout::InterleavedBytes(ByteOrder::ABGR),
    ];
    for layout in layouts {
        let raster = NativeRaster::new(6, 5, layout, false).expect("raster");
        let mut fast = pattern_view(raster.clone(), AccessPermissions::all()).expect("pattern");
        let mut slow = view(raster, AccessPermissions::none());
        let rect = Rect::new_unchecked(1, 2, 4, 3);
        let a = PixelBuffer::<u32>::new(20);
        let b = PixelBuffer::<u32>::new(20);
        fast.copy_pixels_into(rect, &a, 1, 5, PixelFormat::Rgba, false)
            .expect("fast copy");
        slow.copy_pixels_into(rect, &b, 1, 5, PixelFormat::Rgba, false)
            .expect("slow copy");
        rp.compare_pixels(&a.to_vec(), &b.to_vec(), 5, 0);
        let first = PixelFormat::Rgba.to_canonical_argb(a.read()[1]);
        rp.compare_values(pattern_color(1, 2) as f64, first as f64, 0.0);
    }

    // --- Test 2: copy_from then copy_into is the identity ---
    let mut v = view(
        NativeRaster::with_format(4, 3, PixelFormat::Abgr, true).expect("raster"),
        AccessPermissions::all(),
    );
    let input: Vec<u32> = (0..12).map(|i| pattern_color(i, i)).collect();
    let src = PixelBuffer::from_vec(input.clone());
    v.copy_pixels_from(v.bounds(), &src, 0, 4, PixelFormat::Argb, false)
        .expect("copy from");
    let out = PixelBuffer::<u32>::new(12);
    v.copy_pixels_into(v.bounds(), &out, 0, 4, PixelFormat::Argb, false)
        .expect("copy into");
    rp.compare_pixels(&input, &out.to_vec(), 4, 0);

    // --- Test 3: fill and clear ---
    let mut v = view(
        NativeRaster::with_format(5, 5, PixelFormat::Argb, false).expect("raster"),
        AccessPermissions::all(),
    );
    let mut reference = view(
        NativeRaster::with_format(5, 5, PixelFormat::Argb, false).expect("raster"),
        AccessPermissions::none(),
    );
    for target in [&mut v, &mut reference] {
        target
            .clear_rect(Rect::new_unchecked(0, 0, 5, 5), 0xFF20_4060, false)
            .expect("clear");
        target
            .fill_rect_blend(Rect::new_unchecked(1, 1, 3, 2), 0x4010_0000)
            .expect("blend");
    }
    rp.compare_views(&reference, &v, 0);
    rp.compare_values(
        0xFF20_4060_u32 as f64,
        v.get_pixel(0, 0, false).expect("get") as f64,
        0.0,
    );

    assert!(rp.cleanup());
}
