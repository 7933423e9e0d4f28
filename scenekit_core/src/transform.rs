// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 transforms with a cached category.
//!
//! A [`Transform`] is an immutable value. Composition, inversion and the
//! coordinate-mapping helpers all return new values; nothing is mutated in
//! place.
//!
//! Every transform carries a [`TransformCategory`] derived from its matrix.
//! The category drives fast paths for point and bounds mapping and the
//! compact per-category encoding used by the [codec](crate::codec).
//!
//! Equality is approximate: two transforms compare equal when every matrix
//! entry agrees within [`EPSILON`] (relative for large magnitudes), because
//! composed transforms accumulate rounding error.

use core::ops::Mul;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point, Rect};

/// Tolerance used for approximate float comparisons.
pub const EPSILON: f64 = 1e-6;

/// Coarse classification of a transform, from least to most general.
///
/// The ordering is meaningful: `a <= b` means every transform of category
/// `a` can also be expressed in category `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransformCategory {
    /// No-op.
    Identity,
    /// 2D translation only.
    Translate,
    /// Axis-aligned 2D scale plus translation.
    Scale,
    /// Any 2D affine transform (rotation, skew, flips).
    Rotate,
    /// A 3D affine transform without perspective.
    Matrix,
    /// A projective transform; points need a divide by `w`.
    Perspective,
}

impl TransformCategory {
    /// Returns a short lowercase name, used by debug output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Translate => "translate",
            Self::Scale => "scale",
            Self::Rotate => "rotate",
            Self::Matrix => "matrix",
            Self::Perspective => "perspective",
        }
    }
}

/// An immutable column-major 4×4 transform.
///
/// Each inner array of [`cols`](Self::cols) is one *column* `[x, y, z, w]`,
/// matching the memory layout used by GPU APIs. Points are treated as column
/// vectors, so `a * b` applies `b` first and `a` second; [`compose`] spells
/// the same thing in application order.
///
/// [`compose`]: Self::compose
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    cols: [[f64; 4]; 4],
    category: TransformCategory,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
        category: TransformCategory::Identity,
    };

    /// Creates a transform from four column arrays.
    ///
    /// The category is derived from the matrix contents.
    #[must_use]
    pub fn from_cols(cols: [[f64; 4]; 4]) -> Self {
        Self {
            cols,
            category: classify(&cols),
        }
    }

    /// Creates a 2D translation.
    #[must_use]
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self::translate_3d(dx, dy, 0.0)
    }

    /// Creates a 3D translation.
    #[must_use]
    pub fn translate_3d(dx: f64, dy: f64, dz: f64) -> Self {
        Self::from_cols([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [dx, dy, dz, 1.0],
        ])
    }

    /// Creates a non-uniform 2D scale around the origin.
    #[must_use]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::scale_3d(sx, sy, 1.0)
    }

    /// Creates a non-uniform 3D scale around the origin.
    #[must_use]
    pub fn scale_3d(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_cols([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation around the Z axis (radians, clockwise in a y-down
    /// coordinate system).
    #[must_use]
    pub fn rotate(radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        Self::from_cols([
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a 2D skew by the given angles (radians) along x and y.
    #[must_use]
    pub fn skew(x_radians: f64, y_radians: f64) -> Self {
        let tan = |a: f64| a.sin() / a.cos();
        Self::from_cols([
            [1.0, tan(y_radians), 0.0, 0.0],
            [tan(x_radians), 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a 2D affine transform from `[a, b, c, d, e, f]` coefficients,
    /// mapping `(x, y)` to `(a x + c y + e, b x + d y + f)`.
    #[must_use]
    pub fn affine(coeffs: [f64; 6]) -> Self {
        let [a, b, c, d, e, f] = coeffs;
        Self::from_cols([
            [a, b, 0.0, 0.0],
            [c, d, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [e, f, 0.0, 1.0],
        ])
    }

    /// Creates a perspective projection with the given viewer distance.
    ///
    /// A non-positive or non-finite `depth` yields a non-finite transform,
    /// which node construction rejects.
    #[must_use]
    pub fn perspective(depth: f64) -> Self {
        Self::from_cols([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, -1.0 / depth],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Returns the columns as a 2-D array.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> [[f64; 4]; 4] {
        self.cols
    }

    /// Returns the category derived at construction.
    #[inline]
    #[must_use]
    pub const fn category(&self) -> TransformCategory {
        self.category
    }

    /// Returns `true` for the identity category.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.category == TransformCategory::Identity
    }

    /// Is every matrix entry [finite]?
    ///
    /// [finite]: f64::is_finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Returns `(dx, dy)` if this transform is at most a translation.
    #[must_use]
    pub fn to_translate(&self) -> Option<(f64, f64)> {
        (self.category <= TransformCategory::Translate).then(|| (self.cols[3][0], self.cols[3][1]))
    }

    /// Returns the equivalent [`Affine`] if this transform is 2D.
    #[must_use]
    pub fn to_affine(&self) -> Option<Affine> {
        let c = &self.cols;
        (self.category <= TransformCategory::Rotate)
            .then(|| Affine::new([c[0][0], c[0][1], c[1][0], c[1][1], c[3][0], c[3][1]]))
    }

    /// Returns the transform that applies `first` and then `second`.
    ///
    /// Composition is associative but not commutative.
    #[must_use]
    pub fn compose(first: &Self, second: &Self) -> Self {
        *second * *first
    }

    /// Returns the inverse transform, or `None` if the matrix is singular.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        match self.category {
            TransformCategory::Identity => Some(*self),
            TransformCategory::Translate => {
                Some(Self::translate(-self.cols[3][0], -self.cols[3][1]))
            }
            TransformCategory::Scale => {
                let (sx, sy) = (self.cols[0][0], self.cols[1][1]);
                if sx == 0.0 || sy == 0.0 {
                    return None;
                }
                let (dx, dy) = (self.cols[3][0], self.cols[3][1]);
                Some(Self::affine([1.0 / sx, 0.0, 0.0, 1.0 / sy, -dx / sx, -dy / sy]))
            }
            _ => invert_general(&self.cols).map(Self::from_cols),
        }
    }

    /// Maps a point through this transform (`z = 0`).
    ///
    /// Perspective transforms divide by the resulting `w`; points on or
    /// behind the viewer plane (`w <= 0`) map to NaN.
    #[must_use]
    pub fn apply_to_point(&self, p: Point) -> Point {
        let c = &self.cols;
        match self.category {
            TransformCategory::Identity => p,
            TransformCategory::Translate => Point::new(p.x + c[3][0], p.y + c[3][1]),
            TransformCategory::Scale => {
                Point::new(p.x * c[0][0] + c[3][0], p.y * c[1][1] + c[3][1])
            }
            TransformCategory::Rotate | TransformCategory::Matrix => Point::new(
                c[0][0] * p.x + c[1][0] * p.y + c[3][0],
                c[0][1] * p.x + c[1][1] * p.y + c[3][1],
            ),
            TransformCategory::Perspective => {
                let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
                let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
                let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
                if w > 0.0 {
                    Point::new(x / w, y / w)
                } else {
                    Point::new(f64::NAN, f64::NAN)
                }
            }
        }
    }

    /// Maps a rectangle through this transform.
    ///
    /// The result is the smallest axis-aligned rectangle containing the four
    /// transformed corners. For rotations and skews this over-approximates
    /// the transformed shape. A perspective that puts any corner behind the
    /// viewer has no finite bounds; the result is then infinite.
    #[must_use]
    pub fn apply_to_bounds(&self, rect: Rect) -> Rect {
        match self.category {
            TransformCategory::Identity => rect,
            TransformCategory::Translate => {
                let (dx, dy) = (self.cols[3][0], self.cols[3][1]);
                Rect::new(rect.x0 + dx, rect.y0 + dy, rect.x1 + dx, rect.y1 + dy)
            }
            _ => {
                let corners = [
                    self.apply_to_point(Point::new(rect.x0, rect.y0)),
                    self.apply_to_point(Point::new(rect.x1, rect.y0)),
                    self.apply_to_point(Point::new(rect.x0, rect.y1)),
                    self.apply_to_point(Point::new(rect.x1, rect.y1)),
                ];
                // kurbo's min/max would drop NaN corners silently.
                if corners.iter().any(|p| !p.is_finite()) {
                    return Rect::new(
                        f64::NEG_INFINITY,
                        f64::NEG_INFINITY,
                        f64::INFINITY,
                        f64::INFINITY,
                    );
                }
                let mut out = Rect::from_points(corners[0], corners[1]);
                out = out.union_pt(corners[2]);
                out.union_pt(corners[3])
            }
        }
    }

    /// Compares two transforms entry by entry within [`EPSILON`].
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(&a, &b)| approx_eq_f64(a, b))
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PartialEq for Transform {
    /// Approximate equality; see [`Transform::approx_eq`].
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

impl From<Affine> for Transform {
    fn from(affine: Affine) -> Self {
        Self::affine(affine.as_coeffs())
    }
}

impl Mul for Transform {
    type Output = Self;

    /// Matrix product: the result applies `rhs` first, then `self`.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        if rhs.category == TransformCategory::Identity {
            return self;
        }
        if self.category == TransformCategory::Identity {
            return rhs;
        }
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self::from_cols(out)
    }
}

/// Relative-or-absolute float comparison within [`EPSILON`].
#[must_use]
pub fn approx_eq_f64(a: f64, b: f64) -> bool {
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= EPSILON * scale
}

fn classify(c: &[[f64; 4]; 4]) -> TransformCategory {
    if c[0][3] != 0.0 || c[1][3] != 0.0 || c[2][3] != 0.0 || c[3][3] != 1.0 {
        return TransformCategory::Perspective;
    }
    if c[2] != [0.0, 0.0, 1.0, 0.0] || c[0][2] != 0.0 || c[1][2] != 0.0 || c[3][2] != 0.0 {
        return TransformCategory::Matrix;
    }
    if c[0][1] != 0.0 || c[1][0] != 0.0 {
        return TransformCategory::Rotate;
    }
    if c[0][0] != 1.0 || c[1][1] != 1.0 {
        return TransformCategory::Scale;
    }
    if c[3][0] != 0.0 || c[3][1] != 0.0 {
        return TransformCategory::Translate;
    }
    TransformCategory::Identity
}

/// Cofactor expansion of a 4×4 inverse.
fn invert_general(cols: &[[f64; 4]; 4]) -> Option<[[f64; 4]; 4]> {
    // Flatten to row-major m[row * 4 + col].
    let mut m = [0.0_f64; 16];
    for (j, col) in cols.iter().enumerate() {
        for (i, v) in col.iter().enumerate() {
            m[i * 4 + j] = *v;
        }
    }

    let mut inv = [0.0_f64; 16];
    inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
        + m[9] * m[7] * m[14]
        + m[13] * m[6] * m[11]
        - m[13] * m[7] * m[10];
    inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
        - m[8] * m[7] * m[14]
        - m[12] * m[6] * m[11]
        + m[12] * m[7] * m[10];
    inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
        + m[8] * m[7] * m[13]
        + m[12] * m[5] * m[11]
        - m[12] * m[7] * m[9];
    inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
        - m[8] * m[6] * m[13]
        - m[12] * m[5] * m[10]
        + m[12] * m[6] * m[9];
    inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
        - m[9] * m[3] * m[14]
        - m[13] * m[2] * m[11]
        + m[13] * m[3] * m[10];
    inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
        + m[8] * m[3] * m[14]
        + m[12] * m[2] * m[11]
        - m[12] * m[3] * m[10];
    inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
        - m[8] * m[3] * m[13]
        - m[12] * m[1] * m[11]
        + m[12] * m[3] * m[9];
    inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
        + m[8] * m[2] * m[13]
        + m[12] * m[1] * m[10]
        - m[12] * m[2] * m[9];
    inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
        + m[5] * m[3] * m[14]
        + m[13] * m[2] * m[7]
        - m[13] * m[3] * m[6];
    inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
        - m[4] * m[3] * m[14]
        - m[12] * m[2] * m[7]
        + m[12] * m[3] * m[6];
    inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
        + m[4] * m[3] * m[13]
        + m[12] * m[1] * m[7]
        - m[12] * m[3] * m[5];
    inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
        - m[4] * m[2] * m[13]
        - m[12] * m[1] * m[6]
        + m[12] * m[2] * m[5];
    inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
        - m[5] * m[3] * m[10]
        - m[9] * m[2] * m[7]
        + m[9] * m[3] * m[6];
    inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
        + m[4] * m[3] * m[10]
        + m[8] * m[2] * m[7]
        - m[8] * m[3] * m[6];
    inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
        - m[4] * m[3] * m[9]
        - m[8] * m[1] * m[7]
        + m[8] * m[3] * m[5];
    inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
        + m[4] * m[2] * m[9]
        + m[8] * m[1] * m[6]
        - m[8] * m[2] * m[5];

    let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
    if !det.is_finite() || det.abs() <= 1e-12 {
        return None;
    }
    let inv_det = 1.0 / det;

    let mut out = [[0.0_f64; 4]; 4];
    for (j, col) in out.iter_mut().enumerate() {
        for (i, v) in col.iter_mut().enumerate() {
            *v = inv[i * 4 + j] * inv_det;
        }
    }
    out.iter().flatten().all(|v| v.is_finite()).then_some(out)
}
