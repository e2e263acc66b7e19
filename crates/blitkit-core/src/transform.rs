//! Affine transforms applied to destination coordinates
//!
//! A draw job maps its destination rectangle through an optional affine
//! transform into device space. Clip rectangles are expressed in device
//! space, after the transform.
//!
//! The matrix maps `(x, y)` to:
//!
//! ```text
//! x' = a * x + b * y + tx
//! y' = c * x + d * y + ty
//! ```

use crate::error::{Error, Result};
use crate::rect::Rect;

/// Determinants smaller than this are treated as singular
const SINGULAR_EPSILON: f64 = 1e-12;

/// 2D affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    /// Coefficients [a, b, tx, c, d, ty]
    coeffs: [f64; 6],
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// Create the identity transformation
    pub const fn identity() -> Self {
        Self {
            coeffs: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    /// Create from raw coefficients
    pub const fn from_coeffs(coeffs: [f64; 6]) -> Self {
        Self { coeffs }
    }

    /// Get the raw coefficients
    pub fn coeffs(&self) -> &[f64; 6] {
        &self.coeffs
    }

    /// Create a translation matrix
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self {
            coeffs: [1.0, 0.0, tx, 0.0, 1.0, ty],
        }
    }

    /// Create a scaling matrix
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self {
            coeffs: [sx, 0.0, 0.0, 0.0, sy, 0.0],
        }
    }

    /// Create a rotation about `(center_x, center_y)`, angle in radians
    pub fn rotation(center_x: f64, center_y: f64, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            coeffs: [
                cos,
                -sin,
                center_x - cos * center_x + sin * center_y,
                sin,
                cos,
                center_y - sin * center_x - cos * center_y,
            ],
        }
    }

    /// Check whether this is exactly the identity
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Check whether the linear part is the identity
    pub fn is_translation_only(&self) -> bool {
        let [a, b, _, c, d, _] = self.coeffs;
        a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
    }

    /// Check whether axes stay axis-aligned (no rotation or shear)
    pub fn is_axis_aligned(&self) -> bool {
        let [_, b, _, c, _, _] = self.coeffs;
        b == 0.0 && c == 0.0
    }

    /// Compute the inverse transform
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingularTransform`] when the determinant is zero.
    pub fn inverse(&self) -> Result<Self> {
        let [a, b, tx, c, d, ty] = self.coeffs;
        let det = a * d - b * c;
        if det.abs() < SINGULAR_EPSILON {
            return Err(Error::SingularTransform);
        }
        let ia = d / det;
        let ib = -b / det;
        let ic = -c / det;
        let id = a / det;
        Ok(Self {
            coeffs: [ia, ib, -(ia * tx + ib * ty), ic, id, -(ic * tx + id * ty)],
        })
    }

    /// Compose two transforms: `other` is applied after `self`
    pub fn then(&self, other: &Self) -> Self {
        let [a1, b1, tx1, c1, d1, ty1] = self.coeffs;
        let [a2, b2, tx2, c2, d2, ty2] = other.coeffs;
        Self {
            coeffs: [
                a2 * a1 + b2 * c1,
                a2 * b1 + b2 * d1,
                a2 * tx1 + b2 * ty1 + tx2,
                c2 * a1 + d2 * c1,
                c2 * b1 + d2 * d1,
                c2 * tx1 + d2 * ty1 + ty2,
            ],
        }
    }

    /// Transform a point
    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, tx, c, d, ty] = self.coeffs;
        (a * x + b * y + tx, c * x + d * y + ty)
    }

    /// Integer bounding box of a rectangle after transformation
    pub fn transform_bounds(&self, rect: &Rect) -> Rect {
        let x0 = rect.x as f64;
        let y0 = rect.y as f64;
        let x1 = rect.right() as f64;
        let y1 = rect.bottom() as f64;
        let corners = [
            self.transform_point(x0, y0),
            self.transform_point(x1, y0),
            self.transform_point(x0, y1),
            self.transform_point(x1, y1),
        ];
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        // Snap near-integral edges so pure translations keep exact bounds
        let lo = |v: f64| (v + 1e-9).floor() as i32;
        let hi = |v: f64| (v - 1e-9).ceil() as i32;
        let x = lo(min_x);
        let y = lo(min_y);
        Rect::new_unchecked(x, y, hi(max_x) - x, hi(max_y) - y)
    }

    /// Length of the unit x and y vectors after the linear part
    pub fn axis_scales(&self) -> (f64, f64) {
        let [a, b, _, c, d, _] = self.coeffs;
        ((a * a + c * c).sqrt(), (b * b + d * d).sqrt())
    }
}
