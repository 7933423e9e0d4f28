// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip shape types for clip nodes.

use kurbo::{Rect, RoundedRect, RoundedRectRadii};

use crate::geometry;
use crate::node::{NodeError, NodeKind};

/// Builds a rounded rectangle after checking the raw inputs.
///
/// kurbo normalizes rectangles with `min`/`max`, which silently drops NaN
/// coordinates, so finiteness has to be checked before the shape exists.
/// Returns `None` if any coordinate or radius is not finite.
#[must_use]
pub fn rounded_rect(rect: Rect, radii: impl Into<RoundedRectRadii>) -> Option<RoundedRect> {
    let radii = radii.into();
    (geometry::is_finite(rect) && geometry::radii_are_finite(radii))
        .then(|| RoundedRect::from_rect(rect, radii))
}

/// A shape used to clip a node's content.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipShape {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A rectangle with rounded corners.
    RoundedRect(RoundedRect),
}

impl ClipShape {
    /// Creates a rounded clip, rejecting non-finite coordinates or radii.
    ///
    /// Prefer this over `From<RoundedRect>` for untrusted input: a
    /// [`RoundedRect`] built from NaN is already a finite degenerate shape.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidPayload`] for a clip node if any input is
    /// not finite.
    pub fn rounded(rect: Rect, radii: impl Into<RoundedRectRadii>) -> Result<Self, NodeError> {
        rounded_rect(rect, radii)
            .map(Self::RoundedRect)
            .ok_or(NodeError::InvalidPayload {
                kind: NodeKind::Clip,
                reason: "non-finite clip shape",
            })
    }

    /// Returns the axis-aligned rectangle enclosing the shape.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        match self {
            Self::Rect(r) => r.abs(),
            Self::RoundedRect(rr) => rr.rect(),
        }
    }

    /// Returns `true` if every coordinate and radius is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Rect(r) => geometry::is_finite(*r),
            Self::RoundedRect(rr) => geometry::is_finite_rounded(rr),
        }
    }
}

impl From<Rect> for ClipShape {
    fn from(rect: Rect) -> Self {
        Self::Rect(rect)
    }
}

impl From<RoundedRect> for ClipShape {
    fn from(rect: RoundedRect) -> Self {
        Self::RoundedRect(rect)
    }
}
