// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stream decoder.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, RoundedRect, RoundedRectRadii};

use super::encode::{CLIP_RECT, CLIP_ROUNDED, category_tag};
use super::{
    DecodeError, DecodeErrorKind, DecodeLimits, HEADER_LEN, MAGIC, MIN_NODE_LEN, VERSION,
};
use crate::clip::{self, ClipShape};
use crate::color::{Color, ColorStop};
use crate::node::{
    BlendMode, BoxShadow, Glyph, MaskMode, Node, NodeKind, Payload, TextRun, TextureHandle,
};
use crate::transform::Transform;

const SHORT_PAYLOAD: &str = "payload shorter than its contents";

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Little-endian reader over a byte slice that remembers its absolute
/// offset in the stream.
#[derive(Debug)]
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Some(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N)?.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[v]| v)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_array().map(f64::from_le_bytes)
    }
}

// ---------------------------------------------------------------------------
// Payload reader
// ---------------------------------------------------------------------------

/// Reads one payload from its exact sub-slice. Running out of bytes here
/// means the declared payload length was wrong, not that the stream was cut.
#[derive(Debug)]
struct PayloadReader<'a>(Cursor<'a>);

impl PayloadReader<'_> {
    fn u8(&mut self) -> Result<u8, &'static str> {
        self.0.read_u8().ok_or(SHORT_PAYLOAD)
    }

    fn u32(&mut self) -> Result<u32, &'static str> {
        self.0.read_u32().ok_or(SHORT_PAYLOAD)
    }

    fn u64(&mut self) -> Result<u64, &'static str> {
        self.0.read_u64().ok_or(SHORT_PAYLOAD)
    }

    fn f32(&mut self) -> Result<f32, &'static str> {
        self.0.read_f32().ok_or(SHORT_PAYLOAD)
    }

    fn f64(&mut self) -> Result<f64, &'static str> {
        self.0.read_f64().ok_or(SHORT_PAYLOAD)
    }

    /// Reads an element count and checks that `count * elem_len` bytes remain.
    fn count(&mut self, elem_len: usize) -> Result<usize, &'static str> {
        let count = self.u32()? as usize;
        if count.saturating_mul(elem_len) > self.0.remaining() {
            return Err("element count exceeds payload");
        }
        Ok(count)
    }

    fn string(&mut self) -> Result<String, &'static str> {
        let len = self.count(1)?;
        let bytes = self.0.take(len).ok_or(SHORT_PAYLOAD)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| "string is not UTF-8")
    }

    fn point(&mut self) -> Result<Point, &'static str> {
        Ok(Point::new(self.f64()?, self.f64()?))
    }

    fn rect(&mut self) -> Result<Rect, &'static str> {
        Ok(Rect::new(self.f64()?, self.f64()?, self.f64()?, self.f64()?))
    }

    fn color(&mut self) -> Result<Color, &'static str> {
        Ok(Color::new(self.f32()?, self.f32()?, self.f32()?, self.f32()?))
    }

    /// Reads a rectangle and four radii, checking them before kurbo
    /// normalizes NaN away.
    fn rounded_rect(&mut self, reason: &'static str) -> Result<RoundedRect, &'static str> {
        let rect = self.rect()?;
        let radii = RoundedRectRadii::new(self.f64()?, self.f64()?, self.f64()?, self.f64()?);
        clip::rounded_rect(rect, radii).ok_or(reason)
    }

    fn stops(&mut self) -> Result<Box<[ColorStop]>, &'static str> {
        let count = self.count(4 + 16)?;
        (0..count)
            .map(|_| -> Result<_, &'static str> { Ok(ColorStop::new(self.f32()?, self.color()?)) })
            .collect()
    }

    fn shadow(&mut self) -> Result<BoxShadow, &'static str> {
        Ok(BoxShadow {
            outline: self.rounded_rect("non-finite outline")?,
            color: self.color()?,
            dx: self.f64()?,
            dy: self.f64()?,
            spread: self.f64()?,
            blur_radius: self.f32()?,
        })
    }

    fn transform(&mut self) -> Result<Transform, &'static str> {
        let tag = self.u8()?;
        let t = match tag {
            0 => Transform::IDENTITY,
            1 => Transform::translate(self.f64()?, self.f64()?),
            2 => {
                let [sx, sy, dx, dy] = [self.f64()?, self.f64()?, self.f64()?, self.f64()?];
                Transform::affine([sx, 0.0, 0.0, sy, dx, dy])
            }
            3 => {
                let mut coeffs = [0.0; 6];
                for v in &mut coeffs {
                    *v = self.f64()?;
                }
                Transform::affine(coeffs)
            }
            4 | 5 => {
                let mut cols = [[0.0; 4]; 4];
                for v in cols.iter_mut().flatten() {
                    *v = self.f64()?;
                }
                Transform::from_cols(cols)
            }
            _ => return Err("unknown transform category"),
        };
        if category_tag(t.category()) != tag {
            return Err("transform category does not match its matrix");
        }
        Ok(t)
    }

    /// Decodes the payload of `kind`, returning it with the number of
    /// children that follow.
    fn payload(&mut self, kind: NodeKind) -> Result<(Payload, usize), &'static str> {
        let payload = match kind {
            NodeKind::Container => {
                let count = self.u32()? as usize;
                return Ok((Payload::Container, count));
            }
            NodeKind::Color => Payload::Color {
                color: self.color()?,
                rect: self.rect()?,
            },
            NodeKind::LinearGradient => {
                let rect = self.rect()?;
                let start = self.point()?;
                let end = self.point()?;
                let stops = self.stops()?;
                Payload::LinearGradient {
                    rect,
                    start,
                    end,
                    stops,
                }
            }
            NodeKind::Texture => Payload::Texture {
                texture: TextureHandle {
                    id: self.u64()?,
                    width: self.u32()?,
                    height: self.u32()?,
                },
                rect: self.rect()?,
            },
            NodeKind::Text => {
                let family = self.string()?;
                let size = self.f64()?;
                let ascent = self.f64()?;
                let descent = self.f64()?;
                let color = self.color()?;
                let offset = self.point()?;
                let count = self.count(4 + 3 * 8)?;
                let glyphs = (0..count)
                    .map(|_| -> Result<_, &'static str> {
                        Ok(Glyph {
                            id: self.u32()?,
                            advance: self.f64()?,
                            x_offset: self.f64()?,
                            y_offset: self.f64()?,
                        })
                    })
                    .collect::<Result<Box<[_]>, &'static str>>()?;
                Payload::Text(TextRun {
                    family,
                    size,
                    ascent,
                    descent,
                    glyphs,
                    color,
                    offset,
                })
            }
            NodeKind::Transform => Payload::Transform(self.transform()?),
            NodeKind::Opacity => Payload::Opacity(self.f32()?),
            NodeKind::Clip => match self.u8()? {
                CLIP_RECT => Payload::Clip(ClipShape::Rect(self.rect()?)),
                CLIP_ROUNDED => Payload::Clip(ClipShape::RoundedRect(
                    self.rounded_rect("non-finite clip shape")?,
                )),
                _ => return Err("unknown clip shape"),
            },
            NodeKind::Mask => {
                Payload::Mask(MaskMode::from_u8(self.u8()?).ok_or("unknown mask mode")?)
            }
            NodeKind::Blend => {
                Payload::Blend(BlendMode::from_u8(self.u8()?).ok_or("unknown blend mode")?)
            }
            NodeKind::CrossFade => Payload::CrossFade(self.f32()?),
            NodeKind::Repeat => {
                let area = self.rect()?;
                let child_bounds = match self.u8()? {
                    0 => None,
                    1 => Some(self.rect()?),
                    _ => return Err("bad repeat tile flag"),
                };
                Payload::Repeat { area, child_bounds }
            }
            NodeKind::Blur => Payload::Blur(self.f32()?),
            NodeKind::Debug => Payload::Debug(self.string()?),
            NodeKind::Border => {
                let outline = self.rounded_rect("non-finite outline")?;
                let widths = [self.f64()?, self.f64()?, self.f64()?, self.f64()?];
                let colors = [self.color()?, self.color()?, self.color()?, self.color()?];
                Payload::Border {
                    outline,
                    widths,
                    colors,
                }
            }
            NodeKind::InsetShadow => Payload::InsetShadow(self.shadow()?),
            NodeKind::OutsetShadow => Payload::OutsetShadow(self.shadow()?),
            NodeKind::RadialGradient => Payload::RadialGradient {
                rect: self.rect()?,
                center: self.point()?,
                hradius: self.f64()?,
                vradius: self.f64()?,
                start: self.f64()?,
                end: self.f64()?,
                stops: self.stops()?,
            },
            NodeKind::ColorMatrix => {
                let mut matrix = [0.0; 16];
                for v in &mut matrix {
                    *v = self.f32()?;
                }
                let offset = [self.f32()?, self.f32()?, self.f32()?, self.f32()?];
                Payload::ColorMatrix { matrix, offset }
            }
        };
        // Fixed-arity kinds always report their arity here.
        Ok((payload, kind.child_count().unwrap_or(0)))
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(super) struct Decoder<'a> {
    cur: Cursor<'a>,
    limits: DecodeLimits,
}

impl<'a> Decoder<'a> {
    pub(super) fn new(data: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            cur: Cursor::new(data, 0),
            limits,
        }
    }

    pub(super) fn stream(mut self) -> Result<Node, DecodeError> {
        self.header()?;
        let root = self.node(1)?;
        if self.cur.remaining() > 0 {
            return Err(DecodeError::new(
                self.cur.offset(),
                DecodeErrorKind::TrailingData,
            ));
        }
        Ok(root)
    }

    fn truncated(&self) -> DecodeError {
        DecodeError::new(self.cur.offset(), DecodeErrorKind::TruncatedStream)
    }

    fn header(&mut self) -> Result<(), DecodeError> {
        let data = self.cur.data;
        // A prefix of the magic is a cut stream, anything else is not ours.
        let prefix = data.len().min(MAGIC.len());
        if data[..prefix] != MAGIC[..prefix] {
            return Err(DecodeError::new(0, DecodeErrorKind::BadMagic));
        }
        if data.len() < HEADER_LEN {
            return Err(DecodeError::new(data.len(), DecodeErrorKind::TruncatedStream));
        }
        self.cur.pos = MAGIC.len();
        let version_at = self.cur.offset();
        let version = self.cur.read_u16().ok_or_else(|| self.truncated())?;
        if version != VERSION {
            return Err(DecodeError::new(
                version_at,
                DecodeErrorKind::UnsupportedVersion(version),
            ));
        }
        Ok(())
    }

    fn node(&mut self, depth: usize) -> Result<Node, DecodeError> {
        let start = self.cur.offset();
        if depth > self.limits.max_depth {
            return Err(DecodeError::new(start, DecodeErrorKind::NestingTooDeep));
        }
        let tag = self.cur.read_u8().ok_or_else(|| self.truncated())?;
        let kind = NodeKind::from_u8(tag)
            .ok_or(DecodeError::new(start, DecodeErrorKind::UnknownVariant(tag)))?;
        let len = self.cur.read_u32().ok_or_else(|| self.truncated())? as usize;
        let payload_at = self.cur.offset();
        let bytes = self.cur.take(len).ok_or_else(|| self.truncated())?;

        let mut reader = PayloadReader(Cursor::new(bytes, payload_at));
        let invalid = |at: usize, reason| DecodeError::new(at, DecodeErrorKind::InvalidPayload(reason));
        let (payload, count) = reader
            .payload(kind)
            .map_err(|reason| invalid(reader.0.offset(), reason))?;
        if reader.0.remaining() > 0 {
            return Err(invalid(reader.0.offset(), "bytes left over after payload"));
        }

        if count.saturating_mul(MIN_NODE_LEN) > self.cur.remaining() {
            return Err(self.truncated());
        }
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            children.push(self.node(depth + 1)?);
        }
        Node::new(payload, children).map_err(|err| invalid(start, err.reason()))
    }
}
