// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable render nodes.
//!
//! A [`Node`] is a cheap-to-clone handle to a sealed drawing primitive. Each
//! node carries a [`Payload`], an ordered list of children whose length is
//! fixed by its [`NodeKind`], and bounds computed once at construction.
//!
//! Nodes are created either directly through the validating constructors
//! ([`Node::new`], [`Node::color`], [`Node::transform`], …) or incrementally
//! through a [`NodeBuilder`].
//!
//! # Bounds
//!
//! | kind | bounds |
//! |------|--------|
//! | container | union of child bounds, zero when empty |
//! | color, gradients, texture | the payload rectangle, normalized |
//! | text | ink box of the glyph run |
//! | transform | child bounds mapped through the transform |
//! | opacity, debug, color matrix | child bounds |
//! | clip | clip rectangle ∩ child bounds |
//! | mask | source bounds for inverted alpha, otherwise source ∩ mask |
//! | blend, cross-fade | union of both children |
//! | repeat | the repeat area |
//! | blur | child bounds grown by [`blur_extent`] |
//! | border, inset shadow | the outline rectangle |
//! | outset shadow | outline grown by [`BoxShadow::outset_extents`] |
//!
//! # Depth
//!
//! Trees are at most [`MAX_DEPTH`] nodes deep, counting the root. The limit
//! matches [`DecodeLimits::standard`](crate::codec::DecodeLimits::standard),
//! so every tree that can be built can also be decoded again.

mod builder;
mod payload;
mod traverse;

pub use builder::{BuilderError, BuilderState, NodeBuilder};
pub use payload::{
    BlendMode, BoxShadow, Glyph, MAX_ELEMENTS, MAX_STRING_LEN, MaskMode, Payload, TextRun,
    TextureHandle,
};
pub use traverse::Descendants;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, RoundedRect};

use crate::clip::ClipShape;
use crate::color::{Color, ColorStop};
use crate::geometry;
use crate::transform::Transform;

/// Gaussian kernel extent per unit of blur radius: `3 * sqrt(2 * pi) / 4`.
const GAUSSIAN_SCALE: f64 = 1.879_971_205_973_250_3;

/// Deepest tree that can be constructed; the root is at depth 1.
pub const MAX_DEPTH: usize = 512;

/// Pixels covered by a Gaussian kernel of standard deviation `sigma`.
pub(crate) fn blur_pixels(sigma: f64) -> f64 {
    (sigma * GAUSSIAN_SCALE + 0.5).floor()
}

/// How far a blur of `radius` spreads beyond its child's bounds.
#[must_use]
pub fn blur_extent(radius: f32) -> f64 {
    blur_pixels(f64::from(radius) / 2.0)
}

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// The closed set of node variants.
///
/// Discriminants are the stream tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    /// Ordered group of any number of children.
    Container = 0,
    /// Solid color rectangle.
    Color = 1,
    /// Linear gradient rectangle.
    LinearGradient = 2,
    /// Texture drawn into a rectangle.
    Texture = 3,
    /// Glyph run.
    Text = 4,
    /// Transformed child.
    Transform = 5,
    /// Child with uniform opacity.
    Opacity = 6,
    /// Clipped child.
    Clip = 7,
    /// Source child masked by a mask child.
    Mask = 8,
    /// Top child blended onto a bottom child.
    Blend = 9,
    /// Interpolation between two children.
    CrossFade = 10,
    /// Child tiled over an area.
    Repeat = 11,
    /// Blurred child.
    Blur = 12,
    /// Annotated child.
    Debug = 13,
    /// Per-side border of a rounded outline.
    Border = 14,
    /// Shadow inside a rounded outline.
    InsetShadow = 15,
    /// Shadow outside a rounded outline.
    OutsetShadow = 16,
    /// Radial gradient rectangle.
    RadialGradient = 17,
    /// Child with its colors remapped by a matrix.
    ColorMatrix = 18,
}

impl NodeKind {
    /// All kinds, in tag order.
    pub const ALL: [Self; 19] = [
        Self::Container,
        Self::Color,
        Self::LinearGradient,
        Self::Texture,
        Self::Text,
        Self::Transform,
        Self::Opacity,
        Self::Clip,
        Self::Mask,
        Self::Blend,
        Self::CrossFade,
        Self::Repeat,
        Self::Blur,
        Self::Debug,
        Self::Border,
        Self::InsetShadow,
        Self::OutsetShadow,
        Self::RadialGradient,
        Self::ColorMatrix,
    ];

    /// Decodes a stream tag.
    #[must_use]
    pub const fn from_u8(tag: u8) -> Option<Self> {
        if (tag as usize) < Self::ALL.len() {
            Some(Self::ALL[tag as usize])
        } else {
            None
        }
    }

    /// Returns the required number of children, or `None` for containers.
    #[must_use]
    pub const fn child_count(self) -> Option<usize> {
        match self {
            Self::Container => None,
            Self::Color
            | Self::LinearGradient
            | Self::Texture
            | Self::Text
            | Self::Border
            | Self::InsetShadow
            | Self::OutsetShadow
            | Self::RadialGradient => Some(0),
            Self::Transform
            | Self::Opacity
            | Self::Clip
            | Self::Repeat
            | Self::Blur
            | Self::Debug
            | Self::ColorMatrix => Some(1),
            Self::Mask | Self::Blend | Self::CrossFade => Some(2),
        }
    }

    /// Returns `true` for kinds that never have children.
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        matches!(self.child_count(), Some(0))
    }

    /// Returns a short lowercase name, used by errors and debug output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Color => "color",
            Self::LinearGradient => "linear-gradient",
            Self::Texture => "texture",
            Self::Text => "text",
            Self::Transform => "transform",
            Self::Opacity => "opacity",
            Self::Clip => "clip",
            Self::Mask => "mask",
            Self::Blend => "blend",
            Self::CrossFade => "cross-fade",
            Self::Repeat => "repeat",
            Self::Blur => "blur",
            Self::Debug => "debug",
            Self::Border => "border",
            Self::InsetShadow => "inset-shadow",
            Self::OutsetShadow => "outset-shadow",
            Self::RadialGradient => "radial-gradient",
            Self::ColorMatrix => "color-matrix",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// NodeError
// ---------------------------------------------------------------------------

/// Error returned when a node cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeError {
    /// The payload is out of range or non-finite, the computed bounds are
    /// non-finite, the number of children does not match the kind, or the
    /// tree would be deeper than [`MAX_DEPTH`].
    InvalidPayload {
        /// Kind of the rejected node.
        kind: NodeKind,
        /// Human-readable reason.
        reason: &'static str,
    },
}

impl NodeError {
    /// Returns the human-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidPayload { reason, .. } => reason,
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPayload { kind, reason } => write!(f, "invalid {kind} node: {reason}"),
        }
    }
}

impl core::error::Error for NodeError {}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A sealed, reference-counted render node.
///
/// Cloning clones the handle, not the tree. Nodes are `Send + Sync` and
/// never change after construction.
///
/// Equality is structural: two nodes are equal when their payloads and
/// children are equal and their bounds agree within
/// [`EPSILON`](crate::transform::EPSILON). Handles to the same allocation
/// short-circuit.
#[derive(Clone, Debug)]
pub struct Node(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    bounds: Rect,
    depth: usize,
    payload: Payload,
    children: Box<[Node]>,
}

impl Node {
    /// Creates a node from a payload and its children.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidPayload`] if the payload fails
    /// validation, the number of children does not match the payload's
    /// kind, the computed bounds are not finite, or the node would be
    /// nested deeper than [`MAX_DEPTH`].
    pub fn new(payload: Payload, children: Vec<Self>) -> Result<Self, NodeError> {
        let kind = payload.kind();
        let invalid = |reason| NodeError::InvalidPayload { kind, reason };
        payload.validate().map_err(invalid)?;
        match kind.child_count() {
            Some(n) if n != children.len() => return Err(invalid("wrong number of children")),
            None if children.len() > MAX_ELEMENTS => return Err(invalid("too many children")),
            _ => {}
        }
        let depth = 1 + children.iter().map(Self::depth).max().unwrap_or(0);
        if depth > MAX_DEPTH {
            return Err(invalid("tree nested too deeply"));
        }
        let bounds = compute_bounds(&payload, &children);
        if !geometry::is_finite(bounds) {
            return Err(invalid("non-finite bounds"));
        }
        Ok(Self(Arc::new(Inner {
            bounds,
            depth,
            payload,
            children: children.into_boxed_slice(),
        })))
    }

    /// Creates a container of `children`, drawn in order.
    ///
    /// # Errors
    ///
    /// Fails if the container would be nested deeper than [`MAX_DEPTH`] or
    /// holds more than [`MAX_ELEMENTS`] children.
    pub fn container(children: impl IntoIterator<Item = Self>) -> Result<Self, NodeError> {
        Self::new(Payload::Container, children.into_iter().collect())
    }

    /// Creates a solid color rectangle.
    ///
    /// # Errors
    ///
    /// Fails if a color component is outside `[0, 1]` or the rectangle is not
    /// finite.
    pub fn color(color: Color, rect: Rect) -> Result<Self, NodeError> {
        Self::new(Payload::Color { color, rect }, Vec::new())
    }

    /// Creates a linear gradient rectangle.
    ///
    /// # Errors
    ///
    /// Fails with fewer than two stops, decreasing or out-of-range offsets,
    /// or non-finite geometry.
    pub fn linear_gradient(
        rect: Rect,
        start: Point,
        end: Point,
        stops: impl Into<Box<[ColorStop]>>,
    ) -> Result<Self, NodeError> {
        Self::new(
            Payload::LinearGradient {
                rect,
                start,
                end,
                stops: stops.into(),
            },
            Vec::new(),
        )
    }

    /// Creates a texture drawn into `rect`.
    ///
    /// # Errors
    ///
    /// Fails if the texture has a zero dimension or the rectangle is not
    /// finite.
    pub fn texture(texture: TextureHandle, rect: Rect) -> Result<Self, NodeError> {
        Self::new(Payload::Texture { texture, rect }, Vec::new())
    }

    /// Creates a glyph run.
    ///
    /// # Errors
    ///
    /// Fails if the run has no glyphs or carries non-finite metrics.
    pub fn text(run: TextRun) -> Result<Self, NodeError> {
        Self::new(Payload::Text(run), Vec::new())
    }

    /// Wraps `child` in a transform.
    ///
    /// # Errors
    ///
    /// Fails if the transform or the transformed bounds are not finite.
    pub fn transform(transform: Transform, child: Self) -> Result<Self, NodeError> {
        Self::new(Payload::Transform(transform), alloc::vec![child])
    }

    /// Draws `child` with uniform opacity.
    ///
    /// # Errors
    ///
    /// Fails if `opacity` is outside `[0, 1]`.
    pub fn opacity(opacity: f32, child: Self) -> Result<Self, NodeError> {
        Self::new(Payload::Opacity(opacity), alloc::vec![child])
    }

    /// Clips `child` to `shape`.
    ///
    /// # Errors
    ///
    /// Fails if the shape is not finite.
    pub fn clip(shape: impl Into<ClipShape>, child: Self) -> Result<Self, NodeError> {
        Self::new(Payload::Clip(shape.into()), alloc::vec![child])
    }

    /// Masks `source` with `mask`.
    ///
    /// # Errors
    ///
    /// Infallible for finite children; the `Result` keeps the constructor
    /// family uniform.
    pub fn mask(mode: MaskMode, source: Self, mask: Self) -> Result<Self, NodeError> {
        Self::new(Payload::Mask(mode), alloc::vec![source, mask])
    }

    /// Blends `top` onto `bottom`.
    ///
    /// # Errors
    ///
    /// Infallible for finite children; the `Result` keeps the constructor
    /// family uniform.
    pub fn blend(mode: BlendMode, bottom: Self, top: Self) -> Result<Self, NodeError> {
        Self::new(Payload::Blend(mode), alloc::vec![bottom, top])
    }

    /// Interpolates from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Fails if `progress` is outside `[0, 1]`.
    pub fn cross_fade(progress: f32, start: Self, end: Self) -> Result<Self, NodeError> {
        Self::new(Payload::CrossFade(progress), alloc::vec![start, end])
    }

    /// Tiles `child` over `area`.
    ///
    /// # Errors
    ///
    /// Fails if `area` or `child_bounds` is not finite.
    pub fn repeat(area: Rect, child_bounds: Option<Rect>, child: Self) -> Result<Self, NodeError> {
        Self::new(Payload::Repeat { area, child_bounds }, alloc::vec![child])
    }

    /// Blurs `child`.
    ///
    /// # Errors
    ///
    /// Fails if `radius` is negative or not finite.
    pub fn blur(radius: f32, child: Self) -> Result<Self, NodeError> {
        Self::new(Payload::Blur(radius), alloc::vec![child])
    }

    /// Annotates `child` with a message.
    ///
    /// # Errors
    ///
    /// Fails if the message is longer than [`MAX_STRING_LEN`] bytes.
    pub fn debug(message: impl Into<String>, child: Self) -> Result<Self, NodeError> {
        Self::new(Payload::Debug(message.into()), alloc::vec![child])
    }

    /// Creates a border drawn inside `outline`.
    ///
    /// `widths` and `colors` are in top, right, bottom, left order. Use
    /// [`clip::rounded_rect`](crate::clip::rounded_rect) to build the
    /// outline from untrusted coordinates.
    ///
    /// # Errors
    ///
    /// Fails if a width is negative, a color is out of range or the outline
    /// is not finite.
    pub fn border(
        outline: RoundedRect,
        widths: [f64; 4],
        colors: [Color; 4],
    ) -> Result<Self, NodeError> {
        Self::new(
            Payload::Border {
                outline,
                widths,
                colors,
            },
            Vec::new(),
        )
    }

    /// Creates a shadow painted inside its outline.
    ///
    /// # Errors
    ///
    /// Fails if the blur radius is negative or any value is not finite.
    pub fn inset_shadow(shadow: BoxShadow) -> Result<Self, NodeError> {
        Self::new(Payload::InsetShadow(shadow), Vec::new())
    }

    /// Creates a shadow painted outside its outline.
    ///
    /// # Errors
    ///
    /// Fails if the blur radius is negative or any value is not finite.
    pub fn outset_shadow(shadow: BoxShadow) -> Result<Self, NodeError> {
        Self::new(Payload::OutsetShadow(shadow), Vec::new())
    }

    /// Creates a radial gradient rectangle.
    ///
    /// # Errors
    ///
    /// Fails unless both radii are positive, `0 <= start < end`, and the
    /// stops follow the same rules as [`linear_gradient`](Self::linear_gradient).
    pub fn radial_gradient(
        rect: Rect,
        center: Point,
        hradius: f64,
        vradius: f64,
        start: f64,
        end: f64,
        stops: impl Into<Box<[ColorStop]>>,
    ) -> Result<Self, NodeError> {
        Self::new(
            Payload::RadialGradient {
                rect,
                center,
                hradius,
                vradius,
                start,
                end,
                stops: stops.into(),
            },
            Vec::new(),
        )
    }

    /// Remaps the colors of `child` through `matrix * rgba + offset`.
    ///
    /// # Errors
    ///
    /// Fails if any coefficient is not finite.
    pub fn color_matrix(
        matrix: [f32; 16],
        offset: [f32; 4],
        child: Self,
    ) -> Result<Self, NodeError> {
        Self::new(Payload::ColorMatrix { matrix, offset }, alloc::vec![child])
    }

    /// Returns the cached bounds.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.0.bounds
    }

    /// Returns the height of the tree rooted here; a leaf has depth 1.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    /// Returns the variant tag.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.0.payload.kind()
    }

    /// Returns the variant payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.0.payload
    }

    /// Returns the children in draw order; empty for leaves.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.0.children
    }

    /// Returns the child of a single-child wrapper.
    #[must_use]
    pub fn child(&self) -> Option<&Self> {
        if self.kind().child_count() == Some(1) {
            self.0.children.first()
        } else {
            None
        }
    }

    /// Returns an iterator over this node and all its descendants in
    /// depth-first pre-order.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self)
    }

    /// Returns the number of nodes in the tree rooted here.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.descendants().count()
    }

    /// Returns `true` if both handles point at the same allocation.
    #[inline]
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Recursive variant-by-variant comparison.
    ///
    /// Payloads are compared exactly (transforms approximately), bounds
    /// within [`EPSILON`](crate::transform::EPSILON).
    #[must_use]
    pub fn structural_eq(&self, other: &Self) -> bool {
        if Self::ptr_eq(self, other) {
            return true;
        }
        self.payload() == other.payload()
            && geometry::approx_eq(self.bounds(), other.bounds())
            && self.children().len() == other.children().len()
            && self
                .children()
                .iter()
                .zip(other.children())
                .all(|(a, b)| a.structural_eq(b))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other)
    }
}

fn compute_bounds(payload: &Payload, children: &[Node]) -> Rect {
    let child = |i: usize| children.get(i).map_or(Rect::ZERO, Node::bounds);
    match payload {
        Payload::Container => geometry::union_all(children.iter().map(Node::bounds)),
        Payload::Color { rect, .. }
        | Payload::LinearGradient { rect, .. }
        | Payload::RadialGradient { rect, .. }
        | Payload::Texture { rect, .. } => rect.abs(),
        Payload::Text(run) => run.ink_rect(),
        Payload::Transform(t) => t.apply_to_bounds(child(0)),
        Payload::Opacity(_) | Payload::Debug(_) | Payload::ColorMatrix { .. } => child(0),
        Payload::Clip(shape) => geometry::intersect(shape.bounding_rect(), child(0)),
        Payload::Mask(MaskMode::InvertedAlpha) => child(0),
        Payload::Mask(_) => geometry::intersect(child(0), child(1)),
        Payload::Blend(_) | Payload::CrossFade(_) => child(0).union(child(1)),
        Payload::Repeat { area, .. } => area.abs(),
        Payload::Blur(radius) => {
            let extent = blur_extent(*radius);
            child(0).inflate(extent, extent)
        }
        Payload::Border { outline, .. } => outline.rect(),
        Payload::InsetShadow(shadow) => shadow.outline.rect(),
        Payload::OutsetShadow(shadow) => shadow.outline.rect() + shadow.outset_extents(),
    }
}
