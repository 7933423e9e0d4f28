// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial re-rendering.

use alloc::vec::Vec;

use kurbo::Rect;
use scenekit_core::geometry;
use scenekit_core::transform::Transform;

/// Rectangle count above which a region collapses into its bounding box.
pub const MAX_DAMAGE_RECTS: usize = 30;

/// A region of the output that needs re-rendering.
///
/// Renderers can use this to minimize work by only redrawing areas that
/// changed since the last frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire output needs redrawing.
    #[default]
    Full,
    /// Axis-aligned rectangles that need redrawing, never empty and never
    /// more than [`MAX_DAMAGE_RECTS`].
    Rects(Vec<Rect>),
    /// Nothing changed; the previous frame can be reused.
    None,
}

impl DamageRegion {
    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the damaged rectangles; empty for [`Full`](Self::Full) and
    /// [`None`](Self::None).
    #[must_use]
    pub fn rects(&self) -> &[Rect] {
        match self {
            Self::Rects(rects) => rects,
            Self::Full | Self::None => &[],
        }
    }

    /// Returns the smallest rectangle covering the damage, if bounded.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => Some(geometry::union_all(rects.iter().copied())),
            Self::Full | Self::None => None,
        }
    }

    /// Adds one rectangle. Empty rectangles and rectangles already covered
    /// by a single existing rectangle are ignored.
    pub fn add_rect(&mut self, rect: Rect) {
        if geometry::is_empty(rect) {
            return;
        }
        match self {
            Self::Full => {}
            Self::None => *self = Self::Rects(alloc::vec![rect]),
            Self::Rects(rects) => {
                if rects.iter().any(|r| geometry::contains_rect(*r, rect)) {
                    return;
                }
                rects.push(rect);
                if rects.len() > MAX_DAMAGE_RECTS {
                    let all = geometry::union_all(rects.drain(..));
                    rects.push(all);
                }
            }
        }
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (_, Self::None) => {}
            (_, Self::Rects(b)) => {
                for rect in b {
                    self.add_rect(*rect);
                }
            }
        }
    }

    /// Maps every rectangle through `transform`.
    #[must_use]
    pub fn transformed(self, transform: &Transform) -> Self {
        self.map_rects(|r| transform.apply_to_bounds(r))
    }

    /// Restricts every rectangle to `clip`.
    #[must_use]
    pub fn clipped(self, clip: Rect) -> Self {
        self.map_rects(|r| geometry::intersect(r, clip))
    }

    /// Grows every rectangle by `amount` on each side.
    #[must_use]
    pub fn inflated(self, amount: f64) -> Self {
        self.map_rects(|r| r.inflate(amount, amount))
    }

    fn map_rects(self, f: impl Fn(Rect) -> Rect) -> Self {
        match self {
            Self::Rects(rects) => {
                let mut out = Self::None;
                for r in rects {
                    out.add_rect(f(r));
                }
                out
            }
            other => other,
        }
    }
}
