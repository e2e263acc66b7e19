//! blitkit scale - parallel scaled-rect compositing
//!
//! Resizes and composites one raster region onto another:
//!
//! - [`select_plan`] - pure policy choosing algorithm, rounds and host use
//! - [`ScaleEngine`] - runs a [`ScaledDrawJob`] on the host primitive or on
//!   its own scanline drawer, splitting destination rows across workers
//! - [`Parallelizer`] / [`Splittable`] - the worker contract, with a rayon
//!   implementation
//! - [`ReferenceCompositor`] - software host primitive
//!
//! # Example
//!
//! ```
//! use blitkit_core::{AccessPermissions, NativeRaster, PixelFormat, RasterView};
//! use blitkit_scale::{EngineConfig, ScaleEngine, ScalingAlgorithm};
//!
//! let src = NativeRaster::with_format(4, 4, PixelFormat::Argb, false).unwrap();
//! let mut src = RasterView::new(src, AccessPermissions::all()).unwrap();
//! src.clear_rect(src.bounds(), 0xFFFF_0000, false).unwrap();
//! let dst = NativeRaster::with_format(8, 8, PixelFormat::Argb, false).unwrap();
//! let dst = RasterView::new(dst, AccessPermissions::all()).unwrap();
//!
//! let engine = ScaleEngine::new(EngineConfig::default()).unwrap();
//! engine.scale_to(&src, &dst, ScalingAlgorithm::Nearest).unwrap();
//! assert_eq!(dst.get_pixel(7, 7, false).unwrap(), 0xFFFF_0000);
//! ```

pub mod algorithm;
pub mod config;
pub mod engine;
mod env_config;
pub mod error;
pub mod parallel;
pub mod policy;
pub mod reference;
mod resample;
pub mod scratch;

pub use algorithm::{ScalingAlgorithm, ScalingRequest};
pub use config::{EngineConfig, SplitThresholds};
pub use engine::{DrawReport, ScaleEngine, ScaledDrawJob};
pub use error::{ScaleError, ScaleResult};
pub use parallel::{Parallelizer, RayonParallelizer, SequentialParallelizer, Splittable};
pub use policy::{Round, ScalePlan, downscale_spans, select_plan};
pub use reference::ReferenceCompositor;
pub use scratch::ScratchPool;
