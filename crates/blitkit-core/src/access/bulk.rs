//! Rectangular bulk operations
//!
//! Every operation validates all of its geometry before touching a pixel,
//! so a rejected call leaves both sides unchanged.
//!
//! Transfers to and from caller buffers pick the first usable path:
//!
//! 1. direct-array row copy, with a per-pixel rework pass only when the
//!    two sides disagree on format or premultiplication
//! 2. the host compositing primitive, when the accuracy table rates the
//!    layout pair fast and within one unit of error
//! 3. a per-pixel loop through the view's strategy

use super::{AccessStrategy, RasterView, blend_at};
use crate::accuracy::{LayoutClass, delegable};
use crate::alpha::{alpha_of, convert_premul};
use crate::compositor::{CompositeMode, CompositeRequest, InterpolationHint};
use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::raster::{NativeRaster, PixelBuffer, Storage};
use crate::rect::Rect;
use log::{debug, warn};

/// Execution path taken by a buffer transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    /// Zero-area rectangle, nothing moved
    Empty,
    DirectArray,
    NativeComposite,
    PerPixel,
}

/// Check that a `w x h` block at `offset` with `stride` fits a buffer.
fn check_buffer(w: i32, h: i32, offset: usize, stride: usize, len: usize) -> Result<()> {
    if w <= 0 || h <= 0 {
        return Ok(());
    }
    let (w, h) = (w as usize, h as usize);
    if stride < w {
        return Err(Error::InvalidParameter(format!(
            "buffer stride {stride} narrower than rectangle width {w}"
        )));
    }
    let required = offset + (h - 1) * stride + w;
    if required > len {
        return Err(Error::BufferTooSmall { required, len });
    }
    Ok(())
}

impl RasterView {
    fn aliases_buffer(&self, buffer: &PixelBuffer<u32>) -> bool {
        matches!(self.raster.storage(), Storage::Int(own) if own.same_buffer(buffer))
    }

    /// Whether the host primitive may replace the per-pixel path.
    fn host_delegable(&self, format: PixelFormat, premul: bool, outbound: bool) -> bool {
        if self.compositor.is_none() {
            return false;
        }
        let own = LayoutClass::of_raster(&self.raster);
        let other = LayoutClass::of_format(format, premul);
        let ok = if outbound {
            delegable(own, other)
        } else {
            delegable(other, own)
        };
        debug!("host delegation {own:?} <-> {other:?} (outbound {outbound}): {ok}");
        ok
    }

    /// Fill `rect` with one color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RectOutOfBounds`] if `rect` leaves the raster.
    pub fn clear_rect(&mut self, rect: Rect, argb: u32, premul: bool) -> Result<()> {
        rect.check_within(self.width(), self.height(), "raster")?;
        if rect.is_empty() {
            return Ok(());
        }
        let codec = &self.codec;
        let mut guard = self.raster.storage().lock_write();
        let mut px = guard.pixels_mut();
        let (x0, y0, w, h) = (rect.x as u32, rect.y as u32, rect.w as usize, rect.h as usize);
        match codec.strategy {
            AccessStrategy::DirectPackedArray(format) => {
                let word = codec.encode_direct(format, argb, premul);
                if x0 == 0 && w == self.raster.width() as usize && codec.stride == w {
                    // solid run over whole rows
                    let start = codec.row_start(y0);
                    px.fill(start..start + w * h, word);
                } else {
                    for y in y0..y0 + h as u32 {
                        let start = codec.index(x0, y);
                        px.fill(start..start + w, word);
                    }
                }
            }
            _ => {
                for y in y0..y0 + h as u32 {
                    for x in x0..x0 + w as u32 {
                        codec.write(&mut px, codec.index(x, y), argb, premul);
                    }
                }
            }
        }
        Ok(())
    }

    /// Source-over blend one premultiplied color across `rect`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RectOutOfBounds`] if `rect` leaves the raster.
    pub fn fill_rect_blend(&mut self, rect: Rect, premul_argb: u32) -> Result<()> {
        rect.check_within(self.width(), self.height(), "raster")?;
        if rect.is_empty() || premul_argb == 0 {
            return Ok(());
        }
        if alpha_of(premul_argb) == 0xFF {
            return self.clear_rect(rect, premul_argb, true);
        }
        let codec = &self.codec;
        let mut guard = self.raster.storage().lock_write();
        let mut px = guard.pixels_mut();
        for y in rect.y as u32..rect.bottom() as u32 {
            for x in rect.x as u32..rect.right() as u32 {
                blend_at(codec, &mut px, codec.index(x, y), premul_argb);
            }
        }
        Ok(())
    }

    /// Copy `src_rect` of the raster into a caller buffer.
    ///
    /// Pixel `(x, y)` of the rectangle lands at
    /// `dst_offset + y * dst_stride + x` in `dst`, encoded in `dst_format`.
    ///
    /// # Errors
    ///
    /// - [`Error::RectOutOfBounds`] if `src_rect` leaves the raster
    /// - [`Error::BufferTooSmall`] if the rectangle overruns `dst`
    /// - [`Error::Aliased`] if `dst` is the raster's own storage
    pub fn copy_pixels_into(
        &mut self,
        src_rect: Rect,
        dst: &PixelBuffer<u32>,
        dst_offset: usize,
        dst_stride: usize,
        dst_format: PixelFormat,
        dst_premul: bool,
    ) -> Result<CopyPath> {
        src_rect.check_within(self.width(), self.height(), "raster")?;
        check_buffer(src_rect.w, src_rect.h, dst_offset, dst_stride, dst.len())?;
        if self.aliases_buffer(dst) {
            return Err(Error::Aliased);
        }
        if src_rect.is_empty() {
            return Ok(CopyPath::Empty);
        }
        let dst_premul = dst_premul && dst_format.has_alpha();
        let (w, h) = (src_rect.w as usize, src_rect.h as usize);

        if let (AccessStrategy::DirectPackedArray(src_format), Storage::Int(own)) =
            (self.codec.strategy, self.raster.storage())
        {
            let src = own.read();
            let mut out = dst.write();
            let rework = src_format != dst_format || self.codec.premultiplied != dst_premul;
            for row in 0..h {
                let s = self.codec.index(src_rect.x as u32, src_rect.y as u32 + row as u32);
                let d = dst_offset + row * dst_stride;
                let dst_row = &mut out[d..d + w];
                dst_row.copy_from_slice(&src[s..s + w]);
                if rework {
                    for v in dst_row.iter_mut() {
                        let argb = src_format.to_canonical_argb(*v);
                        let argb = convert_premul(argb, self.codec.premultiplied, dst_premul);
                        *v = dst_format.from_canonical_argb(argb);
                    }
                }
            }
            return Ok(CopyPath::DirectArray);
        }

        if self.host_delegable(dst_format, dst_premul, true)
            && let Some(compositor) = &self.compositor
        {
            let target = NativeRaster::wrap_int_buffer(
                dst.clone(),
                w as u32,
                h as u32,
                dst_offset,
                dst_stride,
                dst_format,
                dst_premul,
            )?;
            let dst_rect = Rect::from_size(w as u32, h as u32);
            let request = CompositeRequest {
                src: &self.raster,
                src_rect,
                dst: &target,
                dst_rect,
                clip: dst_rect,
                transform: None,
                hint: InterpolationHint::NearestNeighbor,
                mode: CompositeMode::Src,
            };
            match compositor.composite(&request) {
                Ok(()) => return Ok(CopyPath::NativeComposite),
                Err(e) => warn!("host compositor failed, copying per pixel: {e}"),
            }
        }

        let mut row_buf = std::mem::take(&mut self.scratch);
        row_buf.resize(w, 0);
        {
            let lock = self.lock_read();
            let mut out = dst.write();
            for row in 0..h {
                lock.read_row(
                    src_rect.x as u32,
                    src_rect.y as u32 + row as u32,
                    &mut row_buf,
                    dst_premul,
                )?;
                let d = dst_offset + row * dst_stride;
                for (o, v) in out[d..d + w].iter_mut().zip(&row_buf) {
                    *o = dst_format.from_canonical_argb(*v);
                }
            }
        }
        self.scratch = row_buf;
        Ok(CopyPath::PerPixel)
    }

    /// Copy a caller buffer into `dst_rect` of the raster.
    ///
    /// Inverse of [`RasterView::copy_pixels_into`].
    ///
    /// # Errors
    ///
    /// - [`Error::RectOutOfBounds`] if `dst_rect` leaves the raster
    /// - [`Error::BufferTooSmall`] if the rectangle overruns `src`
    /// - [`Error::Aliased`] if `src` is the raster's own storage
    pub fn copy_pixels_from(
        &mut self,
        dst_rect: Rect,
        src: &PixelBuffer<u32>,
        src_offset: usize,
        src_stride: usize,
        src_format: PixelFormat,
        src_premul: bool,
    ) -> Result<CopyPath> {
        dst_rect.check_within(self.width(), self.height(), "raster")?;
        check_buffer(dst_rect.w, dst_rect.h, src_offset, src_stride, src.len())?;
        if self.aliases_buffer(src) {
            return Err(Error::Aliased);
        }
        if dst_rect.is_empty() {
            return Ok(CopyPath::Empty);
        }
        let src_premul = src_premul && src_format.has_alpha();
        let (w, h) = (dst_rect.w as usize, dst_rect.h as usize);

        if let (AccessStrategy::DirectPackedArray(dst_format), Storage::Int(own)) =
            (self.codec.strategy, self.raster.storage())
        {
            let input = src.read();
            let mut out = own.write();
            let rework = src_format != dst_format || self.codec.premultiplied != src_premul;
            for row in 0..h {
                let s = src_offset + row * src_stride;
                let d = self.codec.index(dst_rect.x as u32, dst_rect.y as u32 + row as u32);
                let dst_row = &mut out[d..d + w];
                dst_row.copy_from_slice(&input[s..s + w]);
                if rework {
                    for v in dst_row.iter_mut() {
                        *v = self.codec.encode_direct(
                            dst_format,
                            src_format.to_canonical_argb(*v),
                            src_premul,
                        );
                    }
                }
            }
            return Ok(CopyPath::DirectArray);
        }

        if self.host_delegable(src_format, src_premul, false)
            && let Some(compositor) = &self.compositor
        {
            let source = NativeRaster::wrap_int_buffer(
                src.clone(),
                w as u32,
                h as u32,
                src_offset,
                src_stride,
                src_format,
                src_premul,
            )?;
            let request = CompositeRequest {
                src: &source,
                src_rect: Rect::from_size(w as u32, h as u32),
                dst: &self.raster,
                dst_rect,
                clip: dst_rect,
                transform: None,
                hint: InterpolationHint::NearestNeighbor,
                mode: CompositeMode::Src,
            };
            match compositor.composite(&request) {
                Ok(()) => return Ok(CopyPath::NativeComposite),
                Err(e) => warn!("host compositor failed, copying per pixel: {e}"),
            }
        }

        let codec = &self.codec;
        let input = src.read();
        let mut guard = self.raster.storage().lock_write();
        let mut px = guard.pixels_mut();
        for row in 0..h {
            let s = src_offset + row * src_stride;
            let y = dst_rect.y as u32 + row as u32;
            for (col, v) in input[s..s + w].iter().enumerate() {
                let argb = src_format.to_canonical_argb(*v);
                let idx = codec.index(dst_rect.x as u32 + col as u32, y);
                codec.write(&mut px, idx, argb, src_premul);
            }
        }
        Ok(CopyPath::PerPixel)
    }

    /// Snapshot `rect` as canonical ARGB, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RectOutOfBounds`] if `rect` leaves the raster.
    pub fn to_argb_vec(&self, rect: Rect, premul: bool) -> Result<Vec<u32>> {
        rect.check_within(self.width(), self.height(), "raster")?;
        if rect.is_empty() {
            return Ok(Vec::new());
        }
        let w = rect.w as usize;
        let mut out = vec![0u32; w * rect.h as usize];
        let lock = self.lock_read();
        for (row, chunk) in out.chunks_exact_mut(w).enumerate() {
            lock.read_row(rect.x as u32, rect.y as u32 + row as u32, chunk, premul)?;
        }
        Ok(out)
    }

    /// Copy `src_rect` of `src` into `dst_rect` of this view.
    ///
    /// See [`copy_image`].
    pub fn copy_image_from(
        &mut self,
        src: &RasterView,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Result<()> {
        copy_image(src, src_rect, self, dst_rect)
    }
}

/// Copy `src_rect` of one view into an equally sized `dst_rect` of another.
///
/// # Errors
///
/// - [`Error::RectOutOfBounds`] if either rectangle leaves its raster
/// - [`Error::SizeMismatch`] if the rectangles differ in size
/// - [`Error::Aliased`] if both views share backing storage
pub fn copy_image(
    src: &RasterView,
    src_rect: Rect,
    dst: &mut RasterView,
    dst_rect: Rect,
) -> Result<()> {
    src_rect.check_within(src.width(), src.height(), "source raster")?;
    dst_rect.check_within(dst.width(), dst.height(), "destination raster")?;
    if src_rect.w != dst_rect.w || src_rect.h != dst_rect.h {
        return Err(Error::SizeMismatch {
            src_w: src_rect.w,
            src_h: src_rect.h,
            dst_w: dst_rect.w,
            dst_h: dst_rect.h,
        });
    }
    if src.shares_storage(dst) {
        return Err(Error::Aliased);
    }
    if src_rect.is_empty() {
        return Ok(());
    }
    let (w, h) = (src_rect.w as usize, src_rect.h as usize);

    // identical direct layouts move whole rows
    if let (
        AccessStrategy::DirectPackedArray(sf),
        AccessStrategy::DirectPackedArray(df),
        Storage::Int(sbuf),
        Storage::Int(dbuf),
    ) = (
        src.strategy(),
        dst.strategy(),
        src.raster.storage(),
        dst.raster.storage(),
    ) && sf == df
        && src.is_premultiplied() == dst.is_premultiplied()
    {
        let input = sbuf.read();
        let mut out = dbuf.write();
        for row in 0..h as u32 {
            let s = src.codec.index(src_rect.x as u32, src_rect.y as u32 + row);
            let d = dst.codec.index(dst_rect.x as u32, dst_rect.y as u32 + row);
            out[d..d + w].copy_from_slice(&input[s..s + w]);
        }
        return Ok(());
    }

    let premul = src.is_premultiplied() || dst.is_premultiplied();
    let mut row_buf = std::mem::take(&mut dst.scratch);
    row_buf.resize(w, 0);
    {
        let input = src.lock_read();
        let mut guard = dst.raster.storage().lock_write();
        let mut px = guard.pixels_mut();
        for row in 0..h as u32 {
            input.read_row(src_rect.x as u32, src_rect.y as u32 + row, &mut row_buf, premul)?;
            let y = dst_rect.y as u32 + row;
            for (col, v) in row_buf.iter().enumerate() {
                let idx = dst.codec.index(dst_rect.x as u32 + col as u32, y);
                dst.codec.write(&mut px, idx, *v, premul);
            }
        }
    }
    dst.scratch = row_buf;
    Ok(())
}
