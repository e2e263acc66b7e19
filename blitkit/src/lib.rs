//! blitkit - Format-agnostic raster access and parallel scaled compositing
//!
//! # Overview
//!
//! blitkit sits under a 2D rendering layer and provides:
//!
//! - Pixel format catalog and canonical ARGB conversion
//! - Uniform pixel access over packed, narrow and generic raster layouts
//! - Bulk copies with aliasing checks and host-compositor delegation
//! - Scaled, clipped, transformed drawing split across worker threads
//!
//! # Example
//!
//! ```
//! use blitkit::{AccessPermissions, NativeRaster, PixelFormat, RasterView};
//! use blitkit::scale::{EngineConfig, ScaleEngine, ScalingAlgorithm};
//!
//! let src = NativeRaster::with_format(4, 4, PixelFormat::Argb, false).unwrap();
//! let mut src = RasterView::new(src, AccessPermissions::all()).unwrap();
//! src.clear_rect(src.bounds(), 0xFFFF_0000, false).unwrap();
//!
//! let dst = NativeRaster::with_format(2, 2, PixelFormat::Argb, false).unwrap();
//! let dst = RasterView::new(dst, AccessPermissions::all()).unwrap();
//! let engine = ScaleEngine::new(EngineConfig::default()).unwrap();
//! engine.scale_to(&src, &dst, ScalingAlgorithm::BoxSampled).unwrap();
//! assert_eq!(dst.get_pixel(1, 1, false).unwrap(), 0xFFFF_0000);
//! ```

// Re-export core types (used by every caller)
pub use blitkit_core::*;

// Re-export the engine as a module to keep its error type apart
pub use blitkit_scale as scale;
