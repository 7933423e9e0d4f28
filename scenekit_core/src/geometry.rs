// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle helpers on top of [`kurbo::Rect`].
//!
//! Node bounds are always normalized (`x0 <= x1`, `y0 <= y1`). The helpers
//! here take that as given and treat disjoint intersections as the zero
//! rectangle so that an empty result has a single canonical form.

use kurbo::{Rect, RoundedRect, RoundedRectRadii};

use crate::transform::{EPSILON, approx_eq_f64};

/// Returns `true` if every coordinate of `r` is finite.
#[must_use]
pub fn is_finite(r: Rect) -> bool {
    r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
}

/// Returns `true` if all four corner radii are finite.
#[must_use]
pub fn radii_are_finite(radii: RoundedRectRadii) -> bool {
    [
        radii.top_left,
        radii.top_right,
        radii.bottom_right,
        radii.bottom_left,
    ]
    .iter()
    .all(|r| r.is_finite())
}

/// Returns `true` if the rectangle and radii of `rr` are finite.
#[must_use]
pub fn is_finite_rounded(rr: &RoundedRect) -> bool {
    is_finite(rr.rect()) && radii_are_finite(rr.radii())
}

/// Returns `true` if `r` covers no area.
#[must_use]
pub fn is_empty(r: Rect) -> bool {
    r.x1 <= r.x0 || r.y1 <= r.y0
}

/// Returns the overlap of `a` and `b`, or [`Rect::ZERO`] if they do not
/// overlap.
#[must_use]
pub fn intersect(a: Rect, b: Rect) -> Rect {
    let x0 = a.x0.max(b.x0);
    let y0 = a.y0.max(b.y0);
    let x1 = a.x1.min(b.x1);
    let y1 = a.y1.min(b.y1);
    if x1 <= x0 || y1 <= y0 {
        Rect::ZERO
    } else {
        Rect::new(x0, y0, x1, y1)
    }
}

/// Returns `true` if `a` and `b` share some area.
#[must_use]
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Returns the union of every rectangle in `rects`, or [`Rect::ZERO`] when
/// the iterator is empty.
#[must_use]
pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Rect {
    let mut iter = rects.into_iter();
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(first, |acc, r| acc.union(r))
}

/// Does `outer` contain `inner`, allowing [`EPSILON`] slack on every edge?
#[must_use]
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    let slack = |v: f64| EPSILON * 1.0_f64.max(v.abs());
    inner.x0 >= outer.x0 - slack(outer.x0)
        && inner.y0 >= outer.y0 - slack(outer.y0)
        && inner.x1 <= outer.x1 + slack(outer.x1)
        && inner.y1 <= outer.y1 + slack(outer.y1)
}

/// Compares two rectangles coordinate by coordinate within [`EPSILON`].
#[must_use]
pub fn approx_eq(a: Rect, b: Rect) -> bool {
    approx_eq_f64(a.x0, b.x0)
        && approx_eq_f64(a.y0, b.y0)
        && approx_eq_f64(a.x1, b.x1)
        && approx_eq_f64(a.y1, b.y1)
}
