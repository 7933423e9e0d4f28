// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Straight-alpha RGBA colors and gradient stops.

/// A straight (non-premultiplied) RGBA color with `f32` components.
///
/// Valid colors have every component finite and within `[0, 1]`; node
/// construction rejects anything else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Creates a color from its components.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the components as `[r, g, b, a]`.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns `true` if every component is finite and within `[0, 1]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|c| (0.0..=1.0).contains(c))
    }

    /// Returns `true` if the color draws nothing.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.a == 0.0
    }
}

/// One stop of a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient line, in `[0, 1]`.
    pub offset: f32,
    /// Color at this stop.
    pub color: Color,
}

impl ColorStop {
    /// Creates a stop.
    #[inline]
    #[must_use]
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}
