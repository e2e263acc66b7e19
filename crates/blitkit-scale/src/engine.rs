//! Parallel scaled-rect engine
//!
//! [`ScaleEngine::draw`] produces `dst[dst_rect ∩ clip]` as a resampling of
//! `src[src_rect]`, optionally through an affine transform and optionally
//! blended source-over.
//!
//! # Execution
//!
//! 1. Geometry pre-flight. Empty rectangles, an empty device clip and a
//!    singular transform are no-ops.
//! 2. [`select_plan`] picks the rounds.
//! 3. If every round can go to the host primitive and its accuracy for
//!    the layouts involved is good enough, the rounds are handed to the
//!    destination's [`HostCompositor`]. A failing host call falls back to
//!    step 4.
//! 4. Otherwise the source region is loaded into a scratch buffer, every
//!    intermediate round resamples into another scratch buffer, and the
//!    final round draws into the destination through disjoint
//!    [`RowBand`]s run by the [`Parallelizer`].
//!
//! Intermediate rounds always replace (never blend), so scratch buffers
//! need no clearing between uses.

use crate::algorithm::{ScalingAlgorithm, ScalingRequest};
use crate::config::EngineConfig;
use crate::error::{ScaleError, ScaleResult};
use crate::parallel::{Parallelizer, RayonParallelizer, Splittable};
use crate::policy::{ScalePlan, downscale_spans, select_plan};
use crate::resample::{Image, Sampler, resample_rows};
use crate::scratch::ScratchPool;
use blitkit_core::accuracy::delegable;
use blitkit_core::{
    AffineTransform, CompositeMode, CompositeRequest, HostCompositor, LayoutClass, NativeRaster,
    PixelBuffer, PixelFormat, RasterView, Rect, RowBand,
};
use log::{debug, trace, warn};
use std::ops::Range;

/// One scaled draw request
#[derive(Debug, Clone, Copy)]
pub struct ScaledDrawJob<'a> {
    pub src: &'a RasterView,
    pub src_rect: Rect,
    pub dst: &'a RasterView,
    /// Destination rectangle in user space, before `transform`
    pub dst_rect: Rect,
    /// Device-space clip, after `transform`
    pub clip: Option<Rect>,
    /// Required; a job without one is rejected
    pub algorithm: Option<ScalingRequest>,
    pub mode: CompositeMode,
    pub transform: Option<AffineTransform>,
}

impl<'a> ScaledDrawJob<'a> {
    /// Job copying `src_rect` onto `dst_rect` with no algorithm chosen yet.
    pub fn new(src: &'a RasterView, src_rect: Rect, dst: &'a RasterView, dst_rect: Rect) -> Self {
        Self {
            src,
            src_rect,
            dst,
            dst_rect,
            clip: None,
            algorithm: None,
            mode: CompositeMode::Src,
            transform: None,
        }
    }

    pub fn with_algorithm(mut self, request: impl Into<ScalingRequest>) -> Self {
        self.algorithm = Some(request.into());
        self
    }

    pub fn with_clip(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn with_mode(mut self, mode: CompositeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_transform(mut self, transform: AffineTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// What a draw did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawReport {
    /// `None` when the draw was a no-op
    pub plan: Option<ScalePlan>,
    /// Rounds executed, the final one included
    pub rounds: usize,
    /// Units run by the parallelizer across all rounds
    pub units: usize,
    /// Whether the host primitive drew the result
    pub host: bool,
}

impl DrawReport {
    pub fn is_noop(&self) -> bool {
        self.plan.is_none()
    }
}

/// The scaled-rect engine
#[derive(Debug)]
pub struct ScaleEngine<P: Parallelizer = RayonParallelizer> {
    config: EngineConfig,
    parallelizer: P,
    scratch: ScratchPool,
}

impl ScaleEngine<RayonParallelizer> {
    /// Engine on rayon, with a dedicated pool if `config.threads` is set.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration or a pool that cannot
    /// be built.
    pub fn new(config: EngineConfig) -> ScaleResult<Self> {
        config.validate()?;
        let parallelizer = match config.threads {
            Some(threads) => RayonParallelizer::with_threads(threads)?,
            None => RayonParallelizer::new(),
        };
        Self::with_parallelizer(config, parallelizer)
    }

    /// Engine configured from the `BLITKIT_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`ScaleEngine::new`].
    pub fn from_env() -> ScaleResult<Self> {
        Self::new(EngineConfig::from_env())
    }
}

impl<P: Parallelizer> ScaleEngine<P> {
    /// Engine on a caller-supplied parallelizer.
    ///
    /// `config.threads` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration.
    pub fn with_parallelizer(config: EngineConfig, parallelizer: P) -> ScaleResult<Self> {
        config.validate()?;
        let scratch = ScratchPool::new(config.scratch_retain);
        Ok(Self {
            config,
            parallelizer,
            scratch,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn parallelizer(&self) -> &P {
        &self.parallelizer
    }

    /// Plan a draw between spans, with the configured thresholds.
    pub fn plan(&self, request: ScalingRequest, src: (u32, u32), dst: (u32, u32)) -> ScalePlan {
        select_plan(
            request,
            src,
            dst,
            self.config.host_native_usable,
            &self.config.thresholds,
        )
    }

    /// Rounds needed to reduce `src_span` to `dst_span` by halving.
    pub fn downscale_rounds(src_span: u32, dst_span: u32) -> usize {
        downscale_spans(src_span, dst_span).len()
    }

    /// Scale all of `src` onto all of `dst`.
    ///
    /// # Errors
    ///
    /// See [`ScaleEngine::draw`].
    pub fn scale_to(
        &self,
        src: &RasterView,
        dst: &RasterView,
        request: impl Into<ScalingRequest>,
    ) -> ScaleResult<DrawReport> {
        let job = ScaledDrawJob::new(src, src.bounds(), dst, dst.bounds()).with_algorithm(request);
        self.draw(&job)
    }

    /// Run one draw job.
    ///
    /// # Errors
    ///
    /// - [`ScaleError::MissingAlgorithm`] if the job has no algorithm
    /// - [`ScaleError::Core`] if `src_rect` leaves the source raster
    ///
    /// Nothing is written when an error is returned.
    pub fn draw(&self, job: &ScaledDrawJob<'_>) -> ScaleResult<DrawReport> {
        let request = job.algorithm.ok_or(ScaleError::MissingAlgorithm)?;
        if job.src_rect.is_empty() || job.dst_rect.is_empty() {
            trace!("empty source or destination rectangle, nothing to draw");
            return Ok(DrawReport::default());
        }
        job.src_rect
            .check_within(job.src.width(), job.src.height(), "source raster")?;

        let transform = job.transform.unwrap_or_default();
        let Ok(inverse) = transform.inverse() else {
            debug!("singular transform, nothing to draw");
            return Ok(DrawReport::default());
        };
        let Some(device) = device_clip(job, &transform) else {
            trace!("destination fully clipped, nothing to draw");
            return Ok(DrawReport::default());
        };

        let src_spans = (job.src_rect.w as u32, job.src_rect.h as u32);
        let (ax, ay) = transform.axis_scales();
        let dst_spans = (
            (job.dst_rect.w as f64 * ax).round().max(1.0) as u32,
            (job.dst_rect.h as f64 * ay).round().max(1.0) as u32,
        );
        let compositor = job.dst.compositor();
        let host_usable = self.config.host_native_usable
            && compositor.is_some()
            && !job.src.shares_storage(job.dst);
        let plan = select_plan(
            request,
            src_spans,
            dst_spans,
            host_usable,
            &self.config.thresholds,
        );
        debug!(
            "scale {}x{} -> {}x{} ({:?}): {} round(s), final {}, host {}",
            src_spans.0,
            src_spans.1,
            dst_spans.0,
            dst_spans.1,
            request,
            plan.rounds.len(),
            plan.algorithm,
            plan.delegate_to_host
        );

        if plan.delegate_to_host
            && host_accurate(&plan, job)
            && let Some(compositor) = compositor
        {
            match self.draw_on_host(job, compositor.as_ref(), &plan, device) {
                Ok(()) => {
                    return Ok(DrawReport {
                        rounds: plan.rounds.len(),
                        units: plan.rounds.len(),
                        host: true,
                        plan: Some(plan),
                    });
                }
                Err(e) => warn!("host compositor failed, drawing in software: {e}"),
            }
        }

        let units = self.draw_in_software(job, &plan, device, inverse, dst_spans)?;
        Ok(DrawReport {
            rounds: plan.rounds.len(),
            units,
            host: false,
            plan: Some(plan),
        })
    }

    // ========================================================================
    // Host path
    // ========================================================================

    fn draw_on_host(
        &self,
        job: &ScaledDrawJob<'_>,
        compositor: &dyn HostCompositor,
        plan: &ScalePlan,
        device: Rect,
    ) -> blitkit_core::Result<()> {
        let mut held = Vec::new();
        let result = self.host_rounds(job, compositor, plan, device, &mut held);
        for buf in held {
            if let Some(v) = buf.into_vec() {
                self.scratch.give(v);
            }
        }
        result
    }

    fn host_rounds(
        &self,
        job: &ScaledDrawJob<'_>,
        compositor: &dyn HostCompositor,
        plan: &ScalePlan,
        device: Rect,
        held: &mut Vec<PixelBuffer<u32>>,
    ) -> blitkit_core::Result<()> {
        let Some((last, leading)) = plan.rounds.split_last() else {
            return Ok(());
        };
        let mut input = job.src.raster().clone();
        let mut input_rect = job.src_rect;

        for round in leading {
            let hint = host_hint(round.algorithm)?;
            let buf = PixelBuffer::from_vec(
                self.scratch
                    .take(round.width as usize * round.height as usize),
            );
            held.push(buf.clone());
            let out = NativeRaster::wrap_int_buffer(
                buf,
                round.width,
                round.height,
                0,
                round.width as usize,
                PixelFormat::Argb,
                true,
            )?;
            let rect = Rect::from_size(round.width, round.height);
            compositor.composite(&CompositeRequest {
                src: &input,
                src_rect: input_rect,
                dst: &out,
                dst_rect: rect,
                clip: rect,
                transform: None,
                hint,
                mode: CompositeMode::Src,
            })?;
            trace!("host round {}x{} done", round.width, round.height);
            input = out;
            input_rect = rect;
        }

        compositor.composite(&CompositeRequest {
            src: &input,
            src_rect: input_rect,
            dst: job.dst.raster(),
            dst_rect: job.dst_rect,
            clip: device,
            transform: job.transform,
            hint: host_hint(last.algorithm)?,
            mode: job.mode,
        })
    }

    // ========================================================================
    // Software path
    // ========================================================================

    fn draw_in_software(
        &self,
        job: &ScaledDrawJob<'_>,
        plan: &ScalePlan,
        device: Rect,
        inverse: AffineTransform,
        dst_spans: (u32, u32),
    ) -> ScaleResult<usize> {
        let Some((last, leading)) = plan.rounds.split_last() else {
            return Ok(0);
        };
        let premul = working_premultiplied(plan, job.mode, job.dst.is_premultiplied());
        let (mut w, mut h) = (job.src_rect.w as u32, job.src_rect.h as u32);

        let mut front = self.scratch.take(w as usize * h as usize);
        {
            let lock = job.src.lock_read();
            for (row, y) in front.chunks_exact_mut(w as usize).zip(0u32..) {
                lock.read_row(
                    job.src_rect.x as u32,
                    job.src_rect.y as u32 + y,
                    row,
                    premul,
                )?;
            }
        }

        let mut units = 0;
        for round in leading {
            let mut out = self
                .scratch
                .take(round.width as usize * round.height as usize);
            units += self.parallelizer.execute(RoundUnit {
                input: Image::new(&front, w, h),
                out: &mut out,
                out_w: round.width,
                out_h: round.height,
                rows: 0..round.height,
                algorithm: round.algorithm,
                threshold: self.config.thresholds.get(round.algorithm),
            })?;
            trace!("software round {}x{} -> {}x{}", w, h, round.width, round.height);
            self.scratch.give(std::mem::replace(&mut front, out));
            (w, h) = (round.width, round.height);
        }

        {
            let pass = FinalPass {
                input: Image::new(&front, w, h),
                sampler: Sampler::new(
                    last.algorithm,
                    w as f64 / dst_spans.0 as f64,
                    h as f64 / dst_spans.1 as f64,
                ),
                inverse,
                dst_rect: job.dst_rect,
                cols: device.x..device.right(),
                scale_x: w as f64 / job.dst_rect.w as f64,
                scale_y: h as f64 / job.dst_rect.h as f64,
                mode: job.mode,
                premul,
                threshold: self.config.thresholds.get(last.algorithm),
            };
            let mut lock = job.dst.lock_write();
            let (_, below) = lock.band().split_at_row(device.y as u32);
            let (band, _) = below.split_at_row(device.bottom() as u32);
            units += self.parallelizer.execute(DrawUnit { band, pass: &pass })?;
        }
        self.scratch.give(front);
        trace!("software draw ran {units} units");
        Ok(units)
    }
}

/// Device clip: user clip ∩ transformed destination ∩ raster bounds.
fn device_clip(job: &ScaledDrawJob<'_>, transform: &AffineTransform) -> Option<Rect> {
    let mut device = transform.transform_bounds(&job.dst_rect);
    if let Some(clip) = job.clip {
        device = device.intersect(&clip)?;
    }
    device = device.intersect(&job.dst.bounds())?;
    (!device.is_empty()).then_some(device)
}

/// Whether the host's measured accuracy allows it to carry this plan.
///
/// Intermediate rounds go through premultiplied `IntArgbPre` scratch.
fn host_accurate(plan: &ScalePlan, job: &ScaledDrawJob<'_>) -> bool {
    let src = LayoutClass::of_raster(job.src.raster());
    let dst = LayoutClass::of_raster(job.dst.raster());
    if plan.rounds.len() > 1 {
        delegable(src, LayoutClass::IntArgbPre) && delegable(LayoutClass::IntArgbPre, dst)
    } else {
        delegable(src, dst)
    }
}

fn host_hint(algorithm: ScalingAlgorithm) -> blitkit_core::Result<blitkit_core::InterpolationHint> {
    algorithm.hint().ok_or_else(|| {
        blitkit_core::Error::Compositor(format!("no host hint for {algorithm}"))
    })
}

/// Working pixels are straight only when nothing mixes or blends them
/// and the destination stores straight values, so copies stay exact.
fn working_premultiplied(plan: &ScalePlan, mode: CompositeMode, dst_premul: bool) -> bool {
    let copies_only = plan
        .rounds
        .iter()
        .all(|r| r.algorithm == ScalingAlgorithm::Nearest);
    !(copies_only && mode == CompositeMode::Src && !dst_premul)
}

// ============================================================================
// Splittable units
// ============================================================================

/// Rows of one intermediate round
struct RoundUnit<'a> {
    input: Image<'a>,
    /// Exactly the rows in `rows`
    out: &'a mut [u32],
    out_w: u32,
    out_h: u32,
    rows: Range<u32>,
    algorithm: ScalingAlgorithm,
    threshold: u64,
}

impl Splittable for RoundUnit<'_> {
    type Error = ScaleError;

    fn worth_to_split(&self) -> bool {
        let rows = self.rows.len() as u64;
        rows >= 2 && rows * self.out_w as u64 > self.threshold
    }

    fn split(self) -> (Self, Self) {
        let mid = self.rows.start + (self.rows.end - self.rows.start) / 2;
        let at = (mid - self.rows.start) as usize * self.out_w as usize;
        let out = self.out;
        let (top, bottom) = out.split_at_mut(at);
        (
            RoundUnit {
                out: top,
                rows: self.rows.start..mid,
                ..self
            },
            RoundUnit {
                out: bottom,
                rows: mid..self.rows.end,
                ..self
            },
        )
    }

    fn run(self) -> ScaleResult<()> {
        resample_rows(
            &self.input,
            self.out,
            self.out_w,
            self.out_h,
            self.rows,
            self.algorithm,
        );
        Ok(())
    }
}

/// Shared, read-only state of the final round
pub(crate) struct FinalPass<'a> {
    pub input: Image<'a>,
    pub sampler: Sampler,
    /// Device to user space
    pub inverse: AffineTransform,
    pub dst_rect: Rect,
    /// Device columns inside the clip
    pub cols: Range<i32>,
    /// Input pixels per user-space destination pixel
    pub scale_x: f64,
    pub scale_y: f64,
    pub mode: CompositeMode,
    /// Whether `input` holds premultiplied values
    pub premul: bool,
    pub threshold: u64,
}

impl FinalPass<'_> {
    /// Draw every clipped pixel of `band`.
    pub fn draw_band(&self, band: &mut RowBand<'_>) -> blitkit_core::Result<()> {
        let dst = &self.dst_rect;
        let (left, top) = (dst.x as f64, dst.y as f64);
        let (right, bottom) = (dst.right() as f64, dst.bottom() as f64);
        for y in band.rows() {
            let dy = y as f64 + 0.5;
            for x in self.cols.clone() {
                let (ux, uy) = self.inverse.transform_point(x as f64 + 0.5, dy);
                if ux < left || ux >= right || uy < top || uy >= bottom {
                    continue;
                }
                let argb = self.sampler.sample(
                    &self.input,
                    (ux - left) * self.scale_x,
                    (uy - top) * self.scale_y,
                );
                match self.mode {
                    CompositeMode::Src => band.set_pixel(x, y as i32, argb, self.premul)?,
                    CompositeMode::SrcOver => band.blend_pixel_src_over(x, y as i32, argb)?,
                }
            }
        }
        Ok(())
    }
}

/// Rows of the destination drawn by the final round
struct DrawUnit<'a> {
    band: RowBand<'a>,
    pass: &'a FinalPass<'a>,
}

impl Splittable for DrawUnit<'_> {
    type Error = ScaleError;

    fn worth_to_split(&self) -> bool {
        let rows = self.band.len() as u64;
        rows >= 2 && rows * self.pass.cols.len() as u64 > self.pass.threshold
    }

    fn split(self) -> (Self, Self) {
        let rows = self.band.rows();
        let mid = rows.start + (rows.end - rows.start) / 2;
        let (top, bottom) = self.band.split_at_row(mid);
        (
            DrawUnit {
                band: top,
                pass: self.pass,
            },
            DrawUnit {
                band: bottom,
                pass: self.pass,
            },
        )
    }

    fn run(mut self) -> ScaleResult<()> {
        self.pass.draw_band(&mut self.band)?;
        Ok(())
    }
}
