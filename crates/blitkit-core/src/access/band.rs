//! Locked access for batch work
//!
//! A [`RasterWriteLock`] holds the raster's storage lock once and hands
//! out [`RowBand`]s: disjoint, mutably borrowed row ranges that can be
//! split further and sent to separate workers. Row bands never overlap,
//! so workers write without further synchronization.

use super::codec::PixelCodec;
use super::{blend_at, check_point};
use crate::error::{Error, Result};
use crate::raster::{PixelsMut, StorageReadGuard, StorageWriteGuard};
use std::ops::Range;

/// Read lock over a view's storage
pub struct RasterReadLock<'a> {
    guard: StorageReadGuard<'a>,
    codec: &'a PixelCodec,
    width: u32,
    height: u32,
}

impl<'a> RasterReadLock<'a> {
    pub(crate) fn new(
        guard: StorageReadGuard<'a>,
        codec: &'a PixelCodec,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            guard,
            codec,
            width,
            height,
        }
    }

    /// Get a pixel as ARGB, premultiplied if `premul`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] outside the raster.
    pub fn get_pixel(&self, x: i32, y: i32, premul: bool) -> Result<u32> {
        let (x, y) = check_point(x, y, self.width, self.height)?;
        Ok(self
            .codec
            .read(&self.guard.pixels(), self.codec.index(x, y), premul))
    }

    /// Read `out.len()` pixels of row `y` starting at column `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if the run leaves the raster.
    pub fn read_row(&self, x: u32, y: u32, out: &mut [u32], premul: bool) -> Result<()> {
        let end = x as u64 + out.len() as u64;
        if y >= self.height || end > self.width as u64 {
            return Err(Error::IndexOutOfRange {
                x: end as i64 - 1,
                y: y as i64,
                width: self.width,
                height: self.height,
            });
        }
        let px = self.guard.pixels();
        let mut idx = self.codec.index(x, y);
        for v in out.iter_mut() {
            *v = self.codec.read(&px, idx, premul);
            idx += self.codec.pixel_stride;
        }
        Ok(())
    }
}

/// Write lock over a view's storage
pub struct RasterWriteLock<'a> {
    guard: StorageWriteGuard<'a>,
    codec: &'a PixelCodec,
    width: u32,
    height: u32,
}

impl<'a> RasterWriteLock<'a> {
    pub(crate) fn new(
        guard: StorageWriteGuard<'a>,
        codec: &'a PixelCodec,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            guard,
            codec,
            width,
            height,
        }
    }

    /// Band covering every row of the raster.
    pub fn band(&mut self) -> RowBand<'_> {
        let px = self.guard.pixels_mut();
        RowBand {
            px,
            codec: self.codec,
            origin: 0,
            rows: 0..self.height,
            width: self.width,
        }
    }
}

/// Disjoint range of rows, writable independently of other bands
pub struct RowBand<'a> {
    px: PixelsMut<'a>,
    codec: &'a PixelCodec,
    /// Element index of `px[0]` within the whole storage
    origin: usize,
    rows: Range<u32>,
    width: u32,
}

impl<'a> RowBand<'a> {
    /// Rows covered by this band.
    #[inline]
    pub fn rows(&self) -> Range<u32> {
        self.rows.clone()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> u32 {
        self.rows.end - self.rows.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split into `[start, y)` and `[y, end)`.
    ///
    /// `y` is clamped into the band, so one half may be empty.
    pub fn split_at_row(self, y: u32) -> (RowBand<'a>, RowBand<'a>) {
        let y = y.clamp(self.rows.start, self.rows.end);
        let mid = (self.codec.row_start(y).saturating_sub(self.origin)).min(self.px.len());
        let (lo, hi) = self.px.split_at(mid);
        (
            RowBand {
                px: lo,
                codec: self.codec,
                origin: self.origin,
                rows: self.rows.start..y,
                width: self.width,
            },
            RowBand {
                px: hi,
                codec: self.codec,
                origin: self.origin + mid,
                rows: y..self.rows.end,
                width: self.width,
            },
        )
    }

    #[inline]
    fn local_index(&self, x: i32, y: i32) -> Result<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || !self.rows.contains(&(y as u32)) {
            return Err(Error::IndexOutOfRange {
                x: x as i64,
                y: y as i64,
                width: self.width,
                height: self.rows.end,
            });
        }
        Ok(self.codec.index(x as u32, y as u32) - self.origin)
    }

    /// Get a pixel of this band.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] outside the band.
    pub fn get_pixel(&self, x: i32, y: i32, premul: bool) -> Result<u32> {
        let idx = self.local_index(x, y)?;
        Ok(self.codec.read(&self.px.as_pixels(), idx, premul))
    }

    /// Set a pixel of this band.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] outside the band.
    pub fn set_pixel(&mut self, x: i32, y: i32, argb: u32, premul: bool) -> Result<()> {
        let idx = self.local_index(x, y)?;
        self.codec.write(&mut self.px, idx, argb, premul);
        Ok(())
    }

    /// Source-over blend a premultiplied pixel into this band.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] outside the band.
    pub fn blend_pixel_src_over(&mut self, x: i32, y: i32, premul_argb: u32) -> Result<()> {
        let idx = self.local_index(x, y)?;
        blend_at(self.codec, &mut self.px, idx, premul_argb);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::access::{AccessPermissions, RasterView};
    use crate::format::PixelFormat;
    use crate::raster::NativeRaster;

    fn view(w: u32, h: u32) -> RasterView {
        let r = NativeRaster::with_format(w, h, PixelFormat::Argb, false).unwrap();
        RasterView::new(r, AccessPermissions::all()).unwrap()
    }

    #[test]
    fn test_split_bands_write_disjoint_rows() {
        let v = view(3, 6);
        {
            let mut lock = v.lock_write();
            let band = lock.band();
            let (mut top, bottom) = band.split_at_row(2);
            let (mut mid, mut low) = bottom.split_at_row(5);
            assert_eq!((top.rows(), mid.rows(), low.rows()), (0..2, 2..5, 5..6));
            top.set_pixel(0, 1, 0xFF00_0001, false).unwrap();
            mid.set_pixel(2, 4, 0xFF00_0002, false).unwrap();
            low.set_pixel(1, 5, 0xFF00_0003, false).unwrap();
            assert!(top.set_pixel(0, 2, 0, false).is_err());
            assert!(low.get_pixel(0, 4, false).is_err());
        }
        assert_eq!(v.get_pixel(0, 1, false).unwrap(), 0xFF00_0001);
        assert_eq!(v.get_pixel(2, 4, false).unwrap(), 0xFF00_0002);
        assert_eq!(v.get_pixel(1, 5, false).unwrap(), 0xFF00_0003);
    }

    #[test]
    fn test_split_clamps() {
        let v = view(2, 4);
        let mut lock = v.lock_write();
        let (a, b) = lock.band().split_at_row(10);
        assert_eq!(a.rows(), 0..4);
        assert!(b.is_empty());
    }

    #[test]
    fn test_read_row() {
        let mut v = view(4, 2);
        for x in 0..4 {
            v.set_pixel(x, 1, 0xFF00_0000 | x as u32, false).unwrap();
        }
        let lock = v.lock_read();
        let mut row = [0u32; 3];
        lock.read_row(1, 1, &mut row, false).unwrap();
        assert_eq!(row, [0xFF00_0001, 0xFF00_0002, 0xFF00_0003]);
        assert!(lock.read_row(2, 1, &mut row, false).is_err());
    }
}
