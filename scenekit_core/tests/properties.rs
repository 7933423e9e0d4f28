// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-crate properties: codec round-trips, bounds containment,
//! transform algebra and builder discipline.

use assert_matches::assert_matches;
use scenekit_core::codec::{
    DecodeError, DecodeErrorKind, MAGIC, VERSION, deserialize, serialize,
};
use scenekit_core::color::{Color, ColorStop};
use scenekit_core::geometry;
use scenekit_core::node::{
    BlendMode, BoxShadow, BuilderError, Glyph, MaskMode, Node, NodeBuilder, NodeKind, Payload,
    TextRun, TextureHandle,
};
use scenekit_core::transform::Transform;
use scenekit_core::{Point, Rect, RoundedRect};

// ---------------------------------------------------------------------------
// Deterministic generator
// ---------------------------------------------------------------------------

/// 64-bit LCG so failures reproduce from the seed alone.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        self.0
    }

    /// High bits only; the low bits of an LCG cycle quickly.
    fn high(&mut self) -> u64 {
        self.next_u64() >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        usize::try_from(self.high() % n as u64).unwrap()
    }

    fn unit(&mut self) -> f32 {
        (self.high() % 1001) as f32 / 1000.0
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let t = (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64;
        lo + (hi - lo) * t
    }

    fn color(&mut self) -> Color {
        Color::new(self.unit(), self.unit(), self.unit(), self.unit())
    }

    fn point(&mut self) -> Point {
        Point::new(self.range(-100.0, 100.0), self.range(-100.0, 100.0))
    }

    fn rect(&mut self) -> Rect {
        let origin = self.point();
        Rect::new(
            origin.x,
            origin.y,
            origin.x + self.range(0.0, 80.0),
            origin.y + self.range(0.0, 80.0),
        )
    }

    fn transform(&mut self) -> Transform {
        match self.below(6) {
            0 => Transform::translate(self.range(-50.0, 50.0), self.range(-50.0, 50.0)),
            1 => Transform::scale(self.range(0.1, 4.0), self.range(-4.0, -0.1)),
            2 => Transform::rotate(self.range(-3.2, 3.2)),
            3 => Transform::skew(self.range(-0.5, 0.5), self.range(-0.5, 0.5)),
            4 => Transform::affine([
                self.range(-2.0, 2.0),
                self.range(-2.0, 2.0),
                self.range(-2.0, 2.0),
                self.range(-2.0, 2.0),
                self.range(-20.0, 20.0),
                self.range(-20.0, 20.0),
            ]),
            _ => Transform::IDENTITY,
        }
    }
}

fn stops(rng: &mut Rng) -> Vec<ColorStop> {
    let mut offsets: Vec<f32> = (0..2 + rng.below(3)).map(|_| rng.unit()).collect();
    offsets.sort_by(f32::total_cmp);
    offsets
        .into_iter()
        .map(|o| ColorStop::new(o, rng.color()))
        .collect()
}

fn shadow(rng: &mut Rng) -> BoxShadow {
    BoxShadow {
        outline: RoundedRect::from_rect(rng.rect(), rng.range(0.0, 8.0)),
        color: rng.color(),
        dx: rng.range(-10.0, 10.0),
        dy: rng.range(-10.0, 10.0),
        spread: rng.range(-2.0, 6.0),
        blur_radius: rng.unit() * 16.0,
    }
}

fn leaf(rng: &mut Rng) -> Node {
    match rng.below(8) {
        0 => Node::color(rng.color(), rng.rect()).unwrap(),
        1 => {
            let stops = stops(rng);
            Node::linear_gradient(rng.rect(), rng.point(), rng.point(), stops).unwrap()
        }
        3 => {
            let outline = RoundedRect::from_rect(rng.rect(), rng.range(0.0, 8.0));
            let widths = [(); 4].map(|()| rng.range(0.0, 4.0));
            let colors = [(); 4].map(|()| rng.color());
            Node::border(outline, widths, colors).unwrap()
        }
        4 => Node::inset_shadow(shadow(rng)).unwrap(),
        5 => Node::outset_shadow(shadow(rng)).unwrap(),
        6 => {
            let start = rng.range(0.0, 0.5);
            let end = start + rng.range(0.1, 1.0);
            let stops = stops(rng);
            Node::radial_gradient(
                rng.rect(),
                rng.point(),
                rng.range(1.0, 50.0),
                rng.range(1.0, 50.0),
                start,
                end,
                stops,
            )
            .unwrap()
        }
        2 => Node::texture(
            TextureHandle {
                id: rng.next_u64(),
                width: 1 + u32::try_from(rng.below(512)).unwrap(),
                height: 1 + u32::try_from(rng.below(512)).unwrap(),
            },
            rng.rect(),
        )
        .unwrap(),
        _ => {
            let glyphs: Vec<Glyph> = (0..1 + rng.below(6))
                .map(|i| Glyph {
                    id: u32::try_from(i).unwrap(),
                    advance: rng.range(1.0, 9.0),
                    x_offset: rng.range(-1.0, 1.0),
                    y_offset: rng.range(-1.0, 1.0),
                })
                .collect();
            Node::text(TextRun {
                family: "Noto Sans".into(),
                size: 12.0,
                ascent: 9.0,
                descent: 3.0,
                glyphs: glyphs.into(),
                color: rng.color(),
                offset: rng.point(),
            })
            .unwrap()
        }
    }
}

fn tree(rng: &mut Rng, depth: usize) -> Node {
    if depth >= 4 {
        return leaf(rng);
    }
    let sub = |rng: &mut Rng| tree(rng, depth + 1);
    match rng.below(15) {
        0..=3 => leaf(rng),
        4 => {
            let n = rng.below(4);
            Node::container((0..n).map(|_| sub(rng)).collect::<Vec<_>>()).unwrap()
        }
        5 => {
            let t = rng.transform();
            Node::transform(t, sub(rng)).unwrap()
        }
        6 => {
            let o = rng.unit();
            Node::opacity(o, sub(rng)).unwrap()
        }
        7 => {
            let rect = rng.rect();
            let shape: scenekit_core::clip::ClipShape = if rng.below(2) == 0 {
                rect.into()
            } else {
                RoundedRect::from_rect(rect, rng.range(0.0, 10.0)).into()
            };
            Node::clip(shape, sub(rng)).unwrap()
        }
        8 => {
            let mode = MaskMode::from_u8(u8::try_from(rng.below(4)).unwrap()).unwrap();
            Node::mask(mode, sub(rng), sub(rng)).unwrap()
        }
        9 => {
            let mode = BlendMode::from_u8(u8::try_from(rng.below(16)).unwrap()).unwrap();
            Node::blend(mode, sub(rng), sub(rng)).unwrap()
        }
        10 => {
            let p = rng.unit();
            Node::cross_fade(p, sub(rng), sub(rng)).unwrap()
        }
        11 => {
            let area = rng.rect();
            let tile = (rng.below(2) == 0).then(|| rng.rect());
            Node::repeat(area, tile, sub(rng)).unwrap()
        }
        12 => {
            let r = rng.unit() * 20.0;
            Node::blur(r, sub(rng)).unwrap()
        }
        13 => {
            let matrix = [(); 16].map(|()| rng.unit() * 2.0 - 1.0);
            let offset = [(); 4].map(|()| rng.unit());
            Node::color_matrix(matrix, offset, sub(rng)).unwrap()
        }
        _ => Node::debug("generated", sub(rng)).unwrap(),
    }
}

fn trees() -> impl Iterator<Item = Node> {
    (1..=60_u64).map(|seed| tree(&mut Rng::new(seed * 7919), 0))
}

// ---------------------------------------------------------------------------
// Codec properties
// ---------------------------------------------------------------------------

#[test]
fn round_trip_preserves_structure() {
    for root in trees() {
        let bytes = serialize(&root);
        let decoded = deserialize(&bytes).unwrap();
        assert!(decoded.structural_eq(&root), "round-trip changed {root:?}");
        assert!(
            geometry::approx_eq(decoded.bounds(), root.bounds()),
            "bounds drifted: {:?} vs {:?}",
            decoded.bounds(),
            root.bounds()
        );
        assert_eq!(serialize(&decoded), bytes, "re-serialization differs");
    }
}

#[test]
fn serialization_is_deterministic() {
    for seed in 1..=20_u64 {
        let a = tree(&mut Rng::new(seed), 0);
        let b = tree(&mut Rng::new(seed), 0);
        assert!(!Node::ptr_eq(&a, &b), "separately built trees share storage");
        assert_eq!(serialize(&a), serialize(&b), "seed {seed}");
        assert_eq!(serialize(&a), serialize(&a), "seed {seed}");
    }
}

#[test]
fn every_truncation_is_reported() {
    for root in trees().take(15) {
        let bytes = serialize(&root);
        for cut in 0..bytes.len() {
            assert_matches!(
                deserialize(&bytes[..cut]),
                Err(DecodeError {
                    kind: DecodeErrorKind::TruncatedStream,
                    ..
                }),
                "cut at {cut} of {}",
                bytes.len()
            );
        }
    }
}

#[test]
fn golden_color_node() {
    let node = Node::color(Color::RED, Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
    let mut expected = MAGIC.to_vec();
    expected.extend_from_slice(&VERSION.to_le_bytes());
    expected.push(NodeKind::Color as u8);
    expected.extend_from_slice(&48_u32.to_le_bytes());
    for c in [1.0_f32, 0.0, 0.0, 1.0] {
        expected.extend_from_slice(&c.to_le_bytes());
    }
    for v in [1.0_f64, 2.0, 3.0, 4.0] {
        expected.extend_from_slice(&v.to_le_bytes());
    }
    assert_eq!(serialize(&node), expected);
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

#[test]
fn wrapper_bounds_contain_children() {
    for root in trees() {
        for node in root.descendants() {
            let bounds = node.bounds();
            let contains = |inner: Rect| geometry::contains_rect(bounds, inner);
            let ok = match node.payload() {
                Payload::Container
                | Payload::Opacity(_)
                | Payload::Debug(_)
                | Payload::ColorMatrix { .. }
                | Payload::Blur(_)
                | Payload::Blend(_)
                | Payload::CrossFade(_) => node.children().iter().all(|c| contains(c.bounds())),
                Payload::Transform(t) => {
                    contains(t.apply_to_bounds(node.children()[0].bounds()))
                }
                // These bound their visible output, which lies inside the
                // first child (or is empty).
                Payload::Clip(_) | Payload::Mask(_) => {
                    geometry::is_empty(bounds)
                        || geometry::contains_rect(node.children()[0].bounds(), bounds)
                }
                Payload::OutsetShadow(shadow) => contains(shadow.outline.rect()),
                _ => true,
            };
            assert!(ok, "{:?} bounds {bounds:?} violate containment", node.kind());
        }
    }
}

#[test]
fn scaled_color_scenario() {
    let red = Node::color(Color::RED, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
    let root =
        Node::container([Node::transform(Transform::scale(2.0, 2.0), red).unwrap()]).unwrap();
    assert_eq!(root.bounds(), Rect::new(0.0, 0.0, 20.0, 20.0));
    let decoded = deserialize(&serialize(&root)).unwrap();
    assert_eq!(decoded, root);
    assert_eq!(decoded.kind(), NodeKind::Container);
    assert_eq!(decoded.children()[0].kind(), NodeKind::Transform);
}

// ---------------------------------------------------------------------------
// Transform algebra
// ---------------------------------------------------------------------------

#[test]
fn composition_is_associative() {
    let mut rng = Rng::new(0x5eed);
    for _ in 0..200 {
        let (a, b, c) = (rng.transform(), rng.transform(), rng.transform());
        let left = Transform::compose(&Transform::compose(&a, &b), &c);
        let right = Transform::compose(&a, &Transform::compose(&b, &c));
        assert!(left.approx_eq(&right), "{a:?} {b:?} {c:?}");
    }
}

#[test]
fn inverse_undoes_points() {
    let mut rng = Rng::new(42);
    for _ in 0..100 {
        let t = rng.transform();
        let Some(inv) = t.invert() else { continue };
        let p = rng.point();
        let back = inv.apply_to_point(t.apply_to_point(p));
        assert!(
            (back - p).hypot() < 1e-6 * 100.0,
            "{t:?} moved {p:?} to {back:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Builder discipline
// ---------------------------------------------------------------------------

#[test]
fn builder_discipline() {
    let mut b = NodeBuilder::new();
    assert_matches!(b.pop(), Err(BuilderError::UnbalancedContainer { .. }));
    b.push_container().unwrap();
    assert_matches!(b.finish(), Err(BuilderError::UnbalancedContainer { .. }));
    b.pop().unwrap();
    let root = b.finish().unwrap();
    assert_eq!(root.kind(), NodeKind::Container);
    assert_matches!(b.push_opacity(0.5), Err(BuilderError::BuilderAlreadyFinished));
}

#[test]
fn builder_matches_direct_construction() {
    let mut b = NodeBuilder::new();
    b.push_container().unwrap();
    b.push_transform(Transform::scale(2.0, 2.0)).unwrap();
    b.append_leaf(Payload::Color {
        color: Color::RED,
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
    })
    .unwrap();
    b.pop().unwrap();
    b.push_opacity(0.5).unwrap();
    b.append_leaf(Payload::Color {
        color: Color::BLUE,
        rect: Rect::new(30.0, 0.0, 40.0, 10.0),
    })
    .unwrap();
    b.pop().unwrap();
    b.pop().unwrap();
    let built = b.finish().unwrap();

    let direct = Node::container([
        Node::transform(
            Transform::scale(2.0, 2.0),
            Node::color(Color::RED, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap(),
        )
        .unwrap(),
        Node::opacity(
            0.5,
            Node::color(Color::BLUE, Rect::new(30.0, 0.0, 40.0, 10.0)).unwrap(),
        )
        .unwrap(),
    ])
    .unwrap();
    assert_eq!(built, direct);
    assert_eq!(serialize(&built), serialize(&direct));
}
