// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Variant payloads and their validation.

use alloc::boxed::Box;
use alloc::string::String;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Insets, Point, Rect, RoundedRect};

use super::{NodeKind, blur_pixels};
use crate::clip::ClipShape;
use crate::color::{Color, ColorStop};
use crate::geometry;
use crate::transform::Transform;

/// Longest string a payload may carry, in bytes.
pub const MAX_STRING_LEN: usize = 1 << 24;

/// Most elements (gradient stops, glyphs, container children) one node may
/// carry.
///
/// Together with [`MAX_STRING_LEN`] this keeps every encoded payload far
/// below the 4 GiB its `u32` length prefix can describe.
pub const MAX_ELEMENTS: usize = 1 << 24;

/// How a blend node combines its top child with its bottom child.
///
/// Discriminants are the stream encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlendMode {
    /// Porter-Duff source-over.
    #[default]
    Normal = 0,
    /// Multiply.
    Multiply = 1,
    /// Screen.
    Screen = 2,
    /// Overlay.
    Overlay = 3,
    /// Darken.
    Darken = 4,
    /// Lighten.
    Lighten = 5,
    /// Color dodge.
    ColorDodge = 6,
    /// Color burn.
    ColorBurn = 7,
    /// Hard light.
    HardLight = 8,
    /// Soft light.
    SoftLight = 9,
    /// Difference.
    Difference = 10,
    /// Exclusion.
    Exclusion = 11,
    /// Color (hue and saturation of top, luminosity of bottom).
    Color = 12,
    /// Hue.
    Hue = 13,
    /// Saturation.
    Saturation = 14,
    /// Luminosity.
    Luminosity = 15,
}

impl BlendMode {
    /// Decodes a discriminant.
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Normal,
            1 => Self::Multiply,
            2 => Self::Screen,
            3 => Self::Overlay,
            4 => Self::Darken,
            5 => Self::Lighten,
            6 => Self::ColorDodge,
            7 => Self::ColorBurn,
            8 => Self::HardLight,
            9 => Self::SoftLight,
            10 => Self::Difference,
            11 => Self::Exclusion,
            12 => Self::Color,
            13 => Self::Hue,
            14 => Self::Saturation,
            15 => Self::Luminosity,
            _ => return None,
        })
    }
}

/// How a mask node derives coverage from its mask child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MaskMode {
    /// Coverage is the mask's alpha.
    #[default]
    Alpha = 0,
    /// Coverage is one minus the mask's alpha.
    InvertedAlpha = 1,
    /// Coverage is the mask's luminance.
    Luminance = 2,
    /// Coverage is one minus the mask's luminance.
    InvertedLuminance = 3,
}

impl MaskMode {
    /// Decodes a discriminant.
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Alpha,
            1 => Self::InvertedAlpha,
            2 => Self::Luminance,
            3 => Self::InvertedLuminance,
            _ => return None,
        })
    }
}

/// Opaque handle to a texture owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    /// Renderer-assigned identifier.
    pub id: u64,
    /// Width in pixels; must be non-zero.
    pub width: u32,
    /// Height in pixels; must be non-zero.
    pub height: u32,
}

/// One positioned glyph of a text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    /// Glyph index in the font.
    pub id: u32,
    /// Horizontal pen advance after this glyph.
    pub advance: f64,
    /// Horizontal offset from the pen position.
    pub x_offset: f64,
    /// Vertical offset from the baseline.
    pub y_offset: f64,
}

/// A run of glyphs in a single font and color.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Font family name.
    pub family: String,
    /// Font size in user units.
    pub size: f64,
    /// Distance from the baseline to the top of the ink box.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the ink box.
    pub descent: f64,
    /// Glyphs, in pen order. Never empty.
    pub glyphs: Box<[Glyph]>,
    /// Fill color.
    pub color: Color,
    /// Baseline origin of the first glyph.
    pub offset: Point,
}

impl TextRun {
    /// Returns the ink box of the run.
    ///
    /// Horizontally the box spans every glyph's `[pen + x_offset,
    /// pen + x_offset + advance]`; vertically it spans the font extents
    /// shifted by the glyph offsets.
    #[must_use]
    pub fn ink_rect(&self) -> Rect {
        if self.glyphs.is_empty() {
            return Rect::from_origin_size(self.offset, (0.0, 0.0));
        }
        let mut pen = 0.0_f64;
        let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut dy0, mut dy1) = (f64::INFINITY, f64::NEG_INFINITY);
        for g in &*self.glyphs {
            let left = pen + g.x_offset;
            let right = left + g.advance;
            x0 = x0.min(left.min(right));
            x1 = x1.max(left.max(right));
            dy0 = dy0.min(g.y_offset);
            dy1 = dy1.max(g.y_offset);
            pen += g.advance;
        }
        Rect::new(
            self.offset.x + x0,
            self.offset.y - self.ascent + dy0,
            self.offset.x + x1,
            self.offset.y + self.descent + dy1,
        )
    }
}

/// A box shadow cast by a rounded outline.
///
/// Shared by inset and outset shadow nodes; the variant decides which side
/// of the outline is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxShadow {
    /// Outline casting the shadow.
    pub outline: RoundedRect,
    /// Shadow color.
    pub color: Color,
    /// Horizontal offset.
    pub dx: f64,
    /// Vertical offset.
    pub dy: f64,
    /// How far the shadow grows beyond the offset outline.
    pub spread: f64,
    /// Blur radius, `>= 0`.
    pub blur_radius: f32,
}

impl BoxShadow {
    /// Returns how far an outset shadow reaches past each side of the
    /// outline, as insets to add to the outline rectangle.
    #[must_use]
    pub fn outset_extents(&self) -> Insets {
        let clip = blur_pixels((f64::from(self.blur_radius) / 2.0).ceil());
        let side = |shift: f64| (clip + self.spread + shift).ceil().max(0.0);
        Insets::new(side(-self.dx), side(-self.dy), side(self.dx), side(self.dy))
    }

    fn validate(&self) -> Result<(), &'static str> {
        check(
            geometry::is_finite_rounded(&self.outline),
            "non-finite outline",
        )?;
        check(self.color.is_valid(), "color component outside [0, 1]")?;
        check(
            self.dx.is_finite() && self.dy.is_finite() && self.spread.is_finite(),
            "non-finite shadow offset",
        )?;
        check(
            self.blur_radius.is_finite() && self.blur_radius >= 0.0,
            "blur radius is negative",
        )
    }
}

/// Variant-specific data of a [`Node`](super::Node).
///
/// Payloads never hold child nodes; children live alongside the payload in
/// the node so that every variant shares one traversal path.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Groups any number of children.
    Container,
    /// Fills a rectangle with a solid color.
    Color {
        /// Fill color.
        color: Color,
        /// Area to fill.
        rect: Rect,
    },
    /// Fills a rectangle with a linear gradient.
    LinearGradient {
        /// Area to fill.
        rect: Rect,
        /// Gradient line start.
        start: Point,
        /// Gradient line end.
        end: Point,
        /// At least two stops with non-decreasing offsets.
        stops: Box<[ColorStop]>,
    },
    /// Draws a texture scaled into a rectangle.
    Texture {
        /// Texture to draw.
        texture: TextureHandle,
        /// Destination rectangle.
        rect: Rect,
    },
    /// Draws a run of glyphs.
    Text(TextRun),
    /// Transforms its child.
    Transform(Transform),
    /// Draws its child with uniform opacity in `[0, 1]`.
    Opacity(f32),
    /// Clips its child to a shape.
    Clip(ClipShape),
    /// Masks the source child with the mask child.
    Mask(MaskMode),
    /// Blends the top child onto the bottom child.
    Blend(BlendMode),
    /// Interpolates from the start child to the end child; progress in
    /// `[0, 1]`.
    CrossFade(f32),
    /// Tiles its child over an area.
    Repeat {
        /// Area to fill with tiles.
        area: Rect,
        /// Tile rectangle; the child's bounds when `None`.
        child_bounds: Option<Rect>,
    },
    /// Gaussian blur of its child with a radius `>= 0`.
    Blur(f32),
    /// Annotates its child with a message; draws the child unchanged.
    Debug(String),
    /// Strokes the inside of a rounded outline, one color per side.
    Border {
        /// Outer edge of the border.
        outline: RoundedRect,
        /// Top, right, bottom and left widths; each `>= 0`.
        widths: [f64; 4],
        /// Top, right, bottom and left colors.
        colors: [Color; 4],
    },
    /// Shadow painted inside its outline.
    InsetShadow(BoxShadow),
    /// Shadow painted outside its outline.
    OutsetShadow(BoxShadow),
    /// Fills a rectangle with an elliptical gradient.
    RadialGradient {
        /// Area to fill.
        rect: Rect,
        /// Center of the ellipse.
        center: Point,
        /// Horizontal radius, `> 0`.
        hradius: f64,
        /// Vertical radius, `> 0`.
        vradius: f64,
        /// Where the gradient starts, as a fraction of the radii; `>= 0`.
        start: f64,
        /// Where the gradient ends; greater than `start`.
        end: f64,
        /// At least two stops with non-decreasing offsets.
        stops: Box<[ColorStop]>,
    },
    /// Maps every child pixel through `matrix * rgba + offset`.
    ColorMatrix {
        /// Row-major 4×4 matrix applied to straight RGBA.
        matrix: [f32; 16],
        /// Added after the matrix.
        offset: [f32; 4],
    },
}

impl Payload {
    /// Returns the variant tag of this payload.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Container => NodeKind::Container,
            Self::Color { .. } => NodeKind::Color,
            Self::LinearGradient { .. } => NodeKind::LinearGradient,
            Self::Texture { .. } => NodeKind::Texture,
            Self::Text(_) => NodeKind::Text,
            Self::Transform(_) => NodeKind::Transform,
            Self::Opacity(_) => NodeKind::Opacity,
            Self::Clip(_) => NodeKind::Clip,
            Self::Mask(_) => NodeKind::Mask,
            Self::Blend(_) => NodeKind::Blend,
            Self::CrossFade(_) => NodeKind::CrossFade,
            Self::Repeat { .. } => NodeKind::Repeat,
            Self::Blur(_) => NodeKind::Blur,
            Self::Debug(_) => NodeKind::Debug,
            Self::Border { .. } => NodeKind::Border,
            Self::InsetShadow(_) => NodeKind::InsetShadow,
            Self::OutsetShadow(_) => NodeKind::OutsetShadow,
            Self::RadialGradient { .. } => NodeKind::RadialGradient,
            Self::ColorMatrix { .. } => NodeKind::ColorMatrix,
        }
    }

    /// Checks ranges and finiteness, returning a reason on failure.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        let unit = |v: f32| (0.0..=1.0).contains(&v);
        match self {
            Self::Container | Self::Mask(_) | Self::Blend(_) => Ok(()),
            Self::Debug(message) => check(
                message.len() <= MAX_STRING_LEN,
                "debug message too long",
            ),
            Self::Color { color, rect } => {
                check(color.is_valid(), "color component outside [0, 1]")?;
                check(geometry::is_finite(*rect), "non-finite rectangle")
            }
            Self::LinearGradient {
                rect,
                start,
                end,
                stops,
            } => {
                check(geometry::is_finite(*rect), "non-finite rectangle")?;
                check(
                    start.is_finite() && end.is_finite(),
                    "non-finite gradient line",
                )?;
                validate_stops(stops)
            }
            Self::Texture { texture, rect } => {
                check(
                    texture.width > 0 && texture.height > 0,
                    "texture has zero size",
                )?;
                check(geometry::is_finite(*rect), "non-finite rectangle")
            }
            Self::Text(run) => {
                check(!run.glyphs.is_empty(), "text run has no glyphs")?;
                check(run.glyphs.len() <= MAX_ELEMENTS, "too many glyphs")?;
                check(run.family.len() <= MAX_STRING_LEN, "font family too long")?;
                check(
                    run.size.is_finite() && run.size >= 0.0,
                    "font size is negative or non-finite",
                )?;
                check(
                    run.ascent.is_finite() && run.descent.is_finite(),
                    "non-finite font extents",
                )?;
                check(run.color.is_valid(), "color component outside [0, 1]")?;
                check(run.offset.is_finite(), "non-finite text offset")?;
                check(
                    run.glyphs.iter().all(|g| {
                        g.advance.is_finite() && g.x_offset.is_finite() && g.y_offset.is_finite()
                    }),
                    "non-finite glyph metrics",
                )
            }
            Self::Transform(t) => check(t.is_finite(), "non-finite transform"),
            Self::Opacity(o) => check(unit(*o), "opacity outside [0, 1]"),
            Self::Clip(shape) => check(shape.is_finite(), "non-finite clip shape"),
            Self::CrossFade(p) => check(unit(*p), "progress outside [0, 1]"),
            Self::Repeat { area, child_bounds } => {
                check(geometry::is_finite(*area), "non-finite repeat area")?;
                check(
                    child_bounds.is_none_or(geometry::is_finite),
                    "non-finite repeat tile",
                )
            }
            Self::Blur(r) => check(r.is_finite() && *r >= 0.0, "blur radius is negative"),
            Self::Border {
                outline,
                widths,
                colors,
            } => {
                check(geometry::is_finite_rounded(outline), "non-finite outline")?;
                check(
                    widths.iter().all(|w| w.is_finite() && *w >= 0.0),
                    "border width is negative",
                )?;
                check(
                    colors.iter().all(Color::is_valid),
                    "color component outside [0, 1]",
                )
            }
            Self::InsetShadow(shadow) | Self::OutsetShadow(shadow) => shadow.validate(),
            Self::RadialGradient {
                rect,
                center,
                hradius,
                vradius,
                start,
                end,
                stops,
            } => {
                check(geometry::is_finite(*rect), "non-finite rectangle")?;
                check(center.is_finite(), "non-finite gradient center")?;
                check(
                    hradius.is_finite() && vradius.is_finite() && *hradius > 0.0 && *vradius > 0.0,
                    "gradient radius is not positive",
                )?;
                check(
                    start.is_finite() && end.is_finite() && *start >= 0.0 && end > start,
                    "gradient range is empty or negative",
                )?;
                validate_stops(stops)
            }
            Self::ColorMatrix { matrix, offset } => check(
                matrix.iter().chain(offset).all(|v| v.is_finite()),
                "non-finite color matrix",
            ),
        }
    }
}

fn validate_stops(stops: &[ColorStop]) -> Result<(), &'static str> {
    check(stops.len() >= 2, "gradient needs at least two stops")?;
    check(stops.len() <= MAX_ELEMENTS, "too many gradient stops")?;
    check(
        stops
            .iter()
            .all(|s| (0.0..=1.0).contains(&s.offset) && s.color.is_valid()),
        "gradient stop outside [0, 1]",
    )?;
    check(
        stops.windows(2).all(|w| w[0].offset <= w[1].offset),
        "gradient stop offsets decrease",
    )
}

fn check(ok: bool, reason: &'static str) -> Result<(), &'static str> {
    if ok { Ok(()) } else { Err(reason) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(advance: f64) -> Glyph {
        Glyph {
            id: 1,
            advance,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }

    fn run(glyphs: &[Glyph]) -> TextRun {
        TextRun {
            family: "Sans".into(),
            size: 12.0,
            ascent: 9.0,
            descent: 3.0,
            glyphs: glyphs.into(),
            color: Color::BLACK,
            offset: Point::new(10.0, 20.0),
        }
    }

    #[test]
    fn ink_rect_spans_advances_and_extents() {
        let r = run(&[glyph(5.0), glyph(6.0)]);
        assert_eq!(r.ink_rect(), Rect::new(10.0, 11.0, 21.0, 23.0));
    }

    #[test]
    fn ink_rect_includes_glyph_offsets() {
        let mut g = glyph(4.0);
        g.x_offset = -2.0;
        g.y_offset = 1.0;
        let r = run(&[g]);
        assert_eq!(r.ink_rect(), Rect::new(8.0, 12.0, 12.0, 24.0));
    }

    #[test]
    fn gradient_stop_rules() {
        let stops = |offsets: &[f32]| -> Box<[ColorStop]> {
            offsets
                .iter()
                .map(|&o| ColorStop::new(o, Color::WHITE))
                .collect()
        };
        let gradient = |s| Payload::LinearGradient {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            start: Point::ZERO,
            end: Point::new(1.0, 0.0),
            stops: s,
        };
        assert!(gradient(stops(&[0.0, 0.5, 0.5, 1.0])).validate().is_ok());
        assert!(gradient(stops(&[0.0])).validate().is_err());
        assert!(gradient(stops(&[0.6, 0.4])).validate().is_err());
        assert!(gradient(stops(&[0.0, 1.5])).validate().is_err());
    }

    #[test]
    fn ranges_are_rejected_not_clamped() {
        assert!(Payload::Opacity(1.01).validate().is_err());
        assert!(Payload::Opacity(f32::NAN).validate().is_err());
        assert!(Payload::CrossFade(-0.5).validate().is_err());
        assert!(Payload::Blur(-1.0).validate().is_err());
        assert!(Payload::Blur(0.0).validate().is_ok());
    }

    #[test]
    fn empty_text_rejected() {
        let mut r = run(&[glyph(1.0)]);
        r.glyphs = Box::new([]);
        assert_eq!(
            Payload::Text(r).validate(),
            Err("text run has no glyphs")
        );
    }

    #[test]
    fn mode_discriminants_round_trip() {
        for v in 0..=15 {
            let mode = BlendMode::from_u8(v).unwrap();
            assert_eq!(mode as u8, v);
        }
        assert!(BlendMode::from_u8(16).is_none());
        assert_eq!(MaskMode::from_u8(1), Some(MaskMode::InvertedAlpha));
        assert!(MaskMode::from_u8(4).is_none());
    }
}
