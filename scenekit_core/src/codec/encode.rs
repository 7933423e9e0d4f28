// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stream encoder.

use alloc::vec::Vec;

use kurbo::{Point, Rect, RoundedRect};

use super::{MAGIC, VERSION};
use crate::clip::ClipShape;
use crate::color::{Color, ColorStop};
use crate::node::{BoxShadow, Node, Payload};
use crate::transform::{Transform, TransformCategory};

// ---------------------------------------------------------------------------
// Tag bytes shared with the decoder
// ---------------------------------------------------------------------------

pub(super) const CLIP_RECT: u8 = 0;
pub(super) const CLIP_ROUNDED: u8 = 1;

pub(super) const fn category_tag(category: TransformCategory) -> u8 {
    match category {
        TransformCategory::Identity => 0,
        TransformCategory::Translate => 1,
        TransformCategory::Scale => 2,
        TransformCategory::Rotate => 3,
        TransformCategory::Matrix => 4,
        TransformCategory::Perspective => 5,
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(super) struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub(super) fn header(&mut self) {
        self.buf.extend_from_slice(&MAGIC);
        self.buf.extend_from_slice(&VERSION.to_le_bytes());
    }

    pub(super) fn node(&mut self, node: &Node) {
        self.write_u8(node.kind() as u8);
        let len_at = self.buf.len();
        self.write_u32(0);
        self.payload(node);
        let payload_len = self.buf.len() - len_at - 4;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "MAX_STRING_LEN and MAX_ELEMENTS keep payloads far below 4 GiB"
        )]
        let payload_len = payload_len as u32;
        self.buf[len_at..len_at + 4].copy_from_slice(&payload_len.to_le_bytes());
        for child in node.children() {
            self.node(child);
        }
    }

    fn payload(&mut self, node: &Node) {
        match node.payload() {
            Payload::Container => self.write_len(node.children().len()),
            Payload::Color { color, rect } => {
                self.write_color(*color);
                self.write_rect(*rect);
            }
            Payload::LinearGradient {
                rect,
                start,
                end,
                stops,
            } => {
                self.write_rect(*rect);
                self.write_point(*start);
                self.write_point(*end);
                self.write_stops(stops);
            }
            Payload::Texture { texture, rect } => {
                self.write_u64(texture.id);
                self.write_u32(texture.width);
                self.write_u32(texture.height);
                self.write_rect(*rect);
            }
            Payload::Text(run) => {
                self.write_str(&run.family);
                self.write_f64(run.size);
                self.write_f64(run.ascent);
                self.write_f64(run.descent);
                self.write_color(run.color);
                self.write_point(run.offset);
                self.write_len(run.glyphs.len());
                for glyph in &run.glyphs {
                    self.write_u32(glyph.id);
                    self.write_f64(glyph.advance);
                    self.write_f64(glyph.x_offset);
                    self.write_f64(glyph.y_offset);
                }
            }
            Payload::Transform(t) => self.write_transform(t),
            Payload::Opacity(v) | Payload::CrossFade(v) | Payload::Blur(v) => self.write_f32(*v),
            Payload::Clip(ClipShape::Rect(rect)) => {
                self.write_u8(CLIP_RECT);
                self.write_rect(*rect);
            }
            Payload::Clip(ClipShape::RoundedRect(rr)) => {
                self.write_u8(CLIP_ROUNDED);
                self.write_rounded_rect(rr);
            }
            Payload::Mask(mode) => self.write_u8(*mode as u8),
            Payload::Blend(mode) => self.write_u8(*mode as u8),
            Payload::Repeat { area, child_bounds } => {
                self.write_rect(*area);
                match child_bounds {
                    Some(tile) => {
                        self.write_u8(1);
                        self.write_rect(*tile);
                    }
                    None => self.write_u8(0),
                }
            }
            Payload::Debug(message) => self.write_str(message),
            Payload::Border {
                outline,
                widths,
                colors,
            } => {
                self.write_rounded_rect(outline);
                for w in widths {
                    self.write_f64(*w);
                }
                for c in colors {
                    self.write_color(*c);
                }
            }
            Payload::InsetShadow(shadow) | Payload::OutsetShadow(shadow) => {
                self.write_shadow(shadow);
            }
            Payload::RadialGradient {
                rect,
                center,
                hradius,
                vradius,
                start,
                end,
                stops,
            } => {
                self.write_rect(*rect);
                self.write_point(*center);
                for v in [hradius, vradius, start, end] {
                    self.write_f64(*v);
                }
                self.write_stops(stops);
            }
            Payload::ColorMatrix { matrix, offset } => {
                for v in matrix.iter().chain(offset) {
                    self.write_f32(*v);
                }
            }
        }
    }

    fn write_shadow(&mut self, shadow: &BoxShadow) {
        self.write_rounded_rect(&shadow.outline);
        self.write_color(shadow.color);
        self.write_f64(shadow.dx);
        self.write_f64(shadow.dy);
        self.write_f64(shadow.spread);
        self.write_f32(shadow.blur_radius);
    }

    fn write_transform(&mut self, t: &Transform) {
        let category = t.category();
        self.write_u8(category_tag(category));
        let c = t.cols();
        match category {
            TransformCategory::Identity => {}
            TransformCategory::Translate => {
                self.write_f64(c[3][0]);
                self.write_f64(c[3][1]);
            }
            TransformCategory::Scale => {
                self.write_f64(c[0][0]);
                self.write_f64(c[1][1]);
                self.write_f64(c[3][0]);
                self.write_f64(c[3][1]);
            }
            TransformCategory::Rotate => {
                for v in [c[0][0], c[0][1], c[1][0], c[1][1], c[3][0], c[3][1]] {
                    self.write_f64(v);
                }
            }
            TransformCategory::Matrix | TransformCategory::Perspective => {
                for v in c.iter().flatten() {
                    self.write_f64(*v);
                }
            }
        }
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_len(&mut self, len: usize) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "lengths are capped by MAX_STRING_LEN and MAX_ELEMENTS at construction"
        )]
        self.write_u32(len as u32);
    }

    fn write_str(&mut self, s: &str) {
        self.write_len(s.len());
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn write_point(&mut self, p: Point) {
        self.write_f64(p.x);
        self.write_f64(p.y);
    }

    fn write_rect(&mut self, r: Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }

    fn write_rounded_rect(&mut self, rr: &RoundedRect) {
        self.write_rect(rr.rect());
        let radii = rr.radii();
        self.write_f64(radii.top_left);
        self.write_f64(radii.top_right);
        self.write_f64(radii.bottom_right);
        self.write_f64(radii.bottom_left);
    }

    fn write_stops(&mut self, stops: &[ColorStop]) {
        self.write_len(stops.len());
        for stop in stops {
            self.write_f32(stop.offset);
            self.write_color(stop.color);
        }
    }

    fn write_color(&mut self, c: Color) {
        for v in c.to_array() {
            self.write_f32(v);
        }
    }
}
