//! Rect - Rectangle regions
//!
//! Source, destination and clip regions of every raster operation.

use crate::error::{Error, Result};

/// A rectangle region
///
/// Small and frequently copied, so this is a plain `Copy` type.
/// Negative width or height marks an invalid rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Create a new rect
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is negative.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        if w < 0 || h < 0 {
            return Err(Error::InvalidParameter(format!(
                "rect dimensions must be non-negative: w={}, h={}",
                w, h
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Create a rect without validation
    pub const fn new_unchecked(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect at the origin with the given size
    pub const fn from_size(w: u32, h: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            w: w as i32,
            h: h as i32,
        }
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Get the area
    #[inline]
    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Check if the rect is valid (non-negative dimensions)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.w >= 0 && self.h >= 0
    }

    /// Check if the rect is empty (zero or negative area)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Check if a point is inside the rect
    #[inline]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rect contains another rect
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Compute the intersection of two rects
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect {
                x,
                y,
                w: right - x,
                h: bottom - y,
            })
        } else {
            None
        }
    }

    /// Translate the rect by (dx, dy)
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            w: self.w,
            h: self.h,
        }
    }

    /// Clip the rect to `[0, width) x [0, height)`
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        self.intersect(&Rect::from_size(width, height))
    }

    /// Verify that this rect lies inside a `width x height` area.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RectOutOfBounds`] naming `what` when any part of
    /// the rect is negative or outside the area.
    pub fn check_within(&self, width: u32, height: u32, what: &'static str) -> Result<()> {
        if !self.is_valid() || !Rect::from_size(width, height).contains_rect(self) {
            return Err(Error::RectOutOfBounds {
                what,
                x: self.x,
                y: self.y,
                w: self.w,
                h: self.h,
                width,
                height,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert!(Rect::new(0, 0, -1, 4).is_err());
        assert!(Rect::new(0, 0, 4, 4).is_ok());
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new_unchecked(0, 0, 10, 10);
        let b = Rect::new_unchecked(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new_unchecked(5, 5, 5, 5)));

        let c = Rect::new_unchecked(10, 0, 5, 5);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_check_within() {
        let r = Rect::new_unchecked(2, 2, 4, 4);
        assert!(r.check_within(6, 6, "raster").is_ok());
        assert!(r.check_within(5, 6, "raster").is_err());
        assert!(Rect::new_unchecked(-1, 0, 1, 1).check_within(6, 6, "raster").is_err());
    }

    #[test]
    fn test_clip_to() {
        let r = Rect::new_unchecked(-2, -2, 5, 5);
        assert_eq!(r.clip_to(10, 10), Some(Rect::new_unchecked(0, 0, 3, 3)));
    }
}
