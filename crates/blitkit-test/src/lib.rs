//! blitkit-test - Regression test harness for blitkit
//!
//! Every `tests/<topic>_reg.rs` file drives its checks through a
//! [`RegParams`], which records each failure instead of stopping at the
//! first one, and reports them all from [`RegParams::cleanup`].
//!
//! # Usage
//!
//! ```ignore
//! use blitkit_test::RegParams;
//!
//! let mut rp = RegParams::new("format");
//! rp.compare_values(255.0, alpha as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! The fixture helpers build rasters with known contents.

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, max_component_diff};

use blitkit_core::{AccessPermissions, NativeRaster, PixelFormat, RasterView, Rect};

/// Packed raster of one format filled with a single straight ARGB color.
pub fn solid_raster(
    width: u32,
    height: u32,
    format: PixelFormat,
    argb: u32,
) -> TestResult<NativeRaster> {
    let raster = NativeRaster::with_format(width, height, format, false)?;
    let mut view = RasterView::new(raster.clone(), AccessPermissions::all())?;
    view.clear_rect(Rect::from_size(width, height), argb, false)?;
    Ok(raster)
}

/// Deterministic opaque test color for pixel `(x, y)`.
pub fn pattern_color(x: u32, y: u32) -> u32 {
    let r = (x * 37 + y * 11) & 0xFF;
    let g = (x * 5 + y * 53) & 0xFF;
    let b = (x * y * 7 + 19) & 0xFF;
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

/// View filled with [`pattern_color`].
pub fn pattern_view(
    raster: NativeRaster,
    permissions: AccessPermissions,
) -> TestResult<RasterView> {
    let mut view = RasterView::new(raster, permissions)?;
    for y in 0..view.height() {
        for x in 0..view.width() {
            view.set_pixel(x as i32, y as i32, pattern_color(x, y), false)?;
        }
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_raster() {
        let r = solid_raster(3, 2, PixelFormat::Abgr, 0xFF12_3456).unwrap();
        let v = RasterView::new(r, AccessPermissions::none()).unwrap();
        assert_eq!(v.get_pixel(2, 1, false).unwrap(), 0xFF12_3456);
    }

    #[test]
    fn test_pattern_view() {
        let r = NativeRaster::with_format(4, 4, PixelFormat::Argb, false).unwrap();
        let v = pattern_view(r, AccessPermissions::all()).unwrap();
        assert_eq!(v.get_pixel(3, 2, false).unwrap(), pattern_color(3, 2));
    }
}
