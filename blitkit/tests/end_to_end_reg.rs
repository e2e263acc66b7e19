//! End-to-end regression test
//!
//! A uniform opaque red 4x4 raster is enlarged with nearest-neighbor
//! sampling and reduced with box sampling; both results must stay
//! exactly red.

use blitkit::scale::{EngineConfig, ScaleEngine, ScaledDrawJob, ScalingAlgorithm};
use blitkit::{AccessPermissions, NativeRaster, PixelFormat, RasterView, Rect, copy_image};
use blitkit_test::{RegParams, solid_raster};

const RED: u32 = 0xFFFF_0000;

fn view(raster: NativeRaster) -> RasterView {
    RasterView::new(raster, AccessPermissions::all()).expect("view")
}

fn blank(w: u32, h: u32) -> RasterView {
    view(NativeRaster::with_format(w, h, PixelFormat::Argb, false).expect("raster"))
}

#[test]
fn end_to_end_reg() {
    let mut rp = RegParams::new("end_to_end");
    let engine = ScaleEngine::new(EngineConfig::default()).expect("engine");
    let src = view(solid_raster(4, 4, PixelFormat::Argb, RED).expect("red"));

    // --- Test 1: 4x4 -> 8x8 nearest ---
    let big = blank(8, 8);
    engine
        .scale_to(&src, &big, ScalingAlgorithm::Nearest)
        .expect("enlarge");
    let all = big.to_argb_vec(big.bounds(), false).expect("pixels");
    rp.compare_pixels(&[RED; 64], &all, 8, 0);

    // --- Test 2: 4x4 -> 2x2 box sampled ---
    let small = blank(2, 2);
    engine
        .scale_to(&src, &small, ScalingAlgorithm::BoxSampled)
        .expect("reduce");
    let all = small.to_argb_vec(small.bounds(), false).expect("pixels");
    rp.compare_pixels(&[RED; 4], &all, 2, 0);

    // --- Test 3: the same through explicit jobs into other layouts ---
    for format in [PixelFormat::Xrgb, PixelFormat::Bgra] {
        for premul in [false, true] {
            let raster = NativeRaster::with_format(8, 8, format, premul).expect("raster");
            let dst = view(raster);
            let job = ScaledDrawJob::new(&src, src.bounds(), &dst, dst.bounds())
                .with_algorithm(ScalingAlgorithm::BoxSampled);
            engine.draw(&job).expect("draw");
            let all = dst.to_argb_vec(dst.bounds(), false).expect("pixels");
            rp.compare_pixels(&[RED; 64], &all, 8, 0);
        }
    }

    // --- Test 4: an unscaled copy matches the engine's identity draw ---
    let mut copied = blank(4, 4);
    copy_image(&src, src.bounds(), &mut copied, Rect::from_size(4, 4)).expect("copy");
    let drawn = blank(4, 4);
    engine
        .scale_to(&src, &drawn, ScalingAlgorithm::Bicubic)
        .expect("identity");
    rp.compare_views(&copied, &drawn, 0);

    assert!(rp.cleanup());
}
