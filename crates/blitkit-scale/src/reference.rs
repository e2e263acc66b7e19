//! Software implementation of the host compositing contract
//!
//! [`ReferenceCompositor`] answers [`HostCompositor::composite`] with the
//! same kernels the engine's scanline drawer uses, on the calling thread.
//! It lets the delegation path run where no windowing host exists, and
//! gives tests a host whose output is known.

use crate::algorithm::ScalingAlgorithm;
use crate::engine::FinalPass;
use crate::resample::{Image, Sampler};
use blitkit_core::{
    AccessPermissions, CompositeMode, CompositeRequest, HostCompositor, RasterView, Result,
};
use log::trace;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Sequential software host compositor
#[derive(Debug, Default)]
pub struct ReferenceCompositor {
    calls: AtomicUsize,
}

impl ReferenceCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `composite` calls answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl HostCompositor for ReferenceCompositor {
    fn composite(&self, request: &CompositeRequest<'_>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let src = RasterView::new(request.src.clone(), AccessPermissions::all())?;
        let dst = RasterView::new(request.dst.clone(), AccessPermissions::all())?;
        let src_rect = request.src_rect;
        src_rect.check_within(src.width(), src.height(), "source raster")?;
        if src_rect.is_empty() || request.dst_rect.is_empty() {
            return Ok(());
        }

        let transform = request.transform.unwrap_or_default();
        let inverse = transform.inverse()?;
        let Some(device) = transform
            .transform_bounds(&request.dst_rect)
            .intersect(&request.clip)
            .and_then(|r| r.intersect(&dst.bounds()))
        else {
            return Ok(());
        };

        let algorithm = ScalingAlgorithm::from_hint(request.hint);
        let premul = algorithm != ScalingAlgorithm::Nearest
            || request.mode != CompositeMode::Src
            || dst.is_premultiplied();
        let (w, h) = (src_rect.w as u32, src_rect.h as u32);
        let mut pixels = vec![0u32; w as usize * h as usize];
        {
            let lock = src.lock_read();
            for (row, y) in pixels.chunks_exact_mut(w as usize).zip(0u32..) {
                lock.read_row(src_rect.x as u32, src_rect.y as u32 + y, row, premul)?;
            }
        }

        let (ax, ay) = transform.axis_scales();
        let eff_w = (request.dst_rect.w as f64 * ax).max(1.0);
        let eff_h = (request.dst_rect.h as f64 * ay).max(1.0);
        let pass = FinalPass {
            input: Image::new(&pixels, w, h),
            sampler: Sampler::new(algorithm, w as f64 / eff_w, h as f64 / eff_h),
            inverse,
            dst_rect: request.dst_rect,
            cols: device.x..device.right(),
            scale_x: w as f64 / request.dst_rect.w as f64,
            scale_y: h as f64 / request.dst_rect.h as f64,
            mode: request.mode,
            premul,
            threshold: u64::MAX,
        };
        let mut lock = dst.lock_write();
        let (_, below) = lock.band().split_at_row(device.y as u32);
        let (mut band, _) = below.split_at_row(device.bottom() as u32);
        pass.draw_band(&mut band)?;
        trace!("reference composite {w}x{h} -> {:?} ({algorithm})", request.dst_rect);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blitkit_core::{InterpolationHint, NativeRaster, PixelFormat, Rect};

    #[test]
    fn test_nearest_doubling() {
        let src = NativeRaster::with_format(2, 1, PixelFormat::Argb, false).unwrap();
        let mut sv = RasterView::new(src.clone(), AccessPermissions::all()).unwrap();
        sv.set_pixel(0, 0, 0xFF11_2233, false).unwrap();
        sv.set_pixel(1, 0, 0x8044_5566, false).unwrap();
        let dst = NativeRaster::with_format(4, 2, PixelFormat::Argb, false).unwrap();

        let host = ReferenceCompositor::new();
        let full = Rect::from_size(4, 2);
        host.composite(&CompositeRequest {
            src: &src,
            src_rect: Rect::from_size(2, 1),
            dst: &dst,
            dst_rect: full,
            clip: full,
            transform: None,
            hint: InterpolationHint::NearestNeighbor,
            mode: CompositeMode::Src,
        })
        .unwrap();
        assert_eq!(host.calls(), 1);

        let dv = RasterView::new(dst, AccessPermissions::all()).unwrap();
        for y in 0..2 {
            assert_eq!(dv.get_pixel(1, y, false).unwrap(), 0xFF11_2233);
            assert_eq!(dv.get_pixel(2, y, false).unwrap(), 0x8044_5566);
        }
    }

    #[test]
    fn test_clip_limits_writes() {
        let src = NativeRaster::with_format(1, 1, PixelFormat::Argb, false).unwrap();
        RasterView::new(src.clone(), AccessPermissions::all())
            .unwrap()
            .set_pixel(0, 0, 0xFFFF_FFFF, false)
            .unwrap();
        let dst = NativeRaster::with_format(3, 3, PixelFormat::Argb, false).unwrap();
        ReferenceCompositor::new()
            .composite(&CompositeRequest {
                src: &src,
                src_rect: Rect::from_size(1, 1),
                dst: &dst,
                dst_rect: Rect::from_size(3, 3),
                clip: Rect::new_unchecked(1, 1, 1, 1),
                transform: None,
                hint: InterpolationHint::Bilinear,
                mode: CompositeMode::Src,
            })
            .unwrap();
        let dv = RasterView::new(dst, AccessPermissions::all()).unwrap();
        assert_eq!(dv.get_pixel(1, 1, false).unwrap(), 0xFFFF_FFFF);
        assert_eq!(dv.get_pixel(0, 0, false).unwrap(), 0);
        assert_eq!(dv.get_pixel(2, 1, false).unwrap(), 0);
    }
}
