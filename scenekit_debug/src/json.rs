// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export.
//!
//! Every node becomes an object with `kind`, `bounds` (`[x0, y0, x1, y1]`),
//! the payload fields under their own names, and `children` when the node
//! has any.

use std::io::{self, Write};

use serde_json::{Map, Value, json};

use scenekit_core::clip::ClipShape;
use scenekit_core::color::{Color, ColorStop};
use scenekit_core::node::{Node, Payload};
use scenekit_core::{Point, Rect, RoundedRect};

/// Converts `root` and all its descendants into a JSON value.
#[must_use]
pub fn to_json(root: &Node) -> Value {
    let mut obj = Map::new();
    obj.insert("kind".into(), json!(root.kind().name()));
    obj.insert("bounds".into(), rect(root.bounds()));
    payload(root.payload(), &mut obj);
    if !root.children().is_empty() {
        obj.insert(
            "children".into(),
            Value::Array(root.children().iter().map(to_json).collect()),
        );
    }
    Value::Object(obj)
}

/// Writes `root` as pretty-printed JSON to `writer`.
pub fn export(root: &Node, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &to_json(root))?;
    writeln!(writer)
}

fn payload(payload: &Payload, obj: &mut Map<String, Value>) {
    let mut put = |key: &str, value: Value| {
        obj.insert(key.into(), value);
    };
    match payload {
        Payload::Container => {}
        Payload::Color { color: c, rect: r } => {
            put("color", color(*c));
            put("rect", rect(*r));
        }
        Payload::LinearGradient {
            rect: r,
            start,
            end,
            stops,
        } => {
            put("rect", rect(*r));
            put("start", point(*start));
            put("end", point(*end));
            put("stops", color_stops(stops));
        }
        Payload::Texture { texture, rect: r } => {
            put(
                "texture",
                json!({ "id": texture.id, "width": texture.width, "height": texture.height }),
            );
            put("rect", rect(*r));
        }
        Payload::Text(run) => {
            put("family", json!(run.family));
            put("size", json!(run.size));
            put("ascent", json!(run.ascent));
            put("descent", json!(run.descent));
            put("color", color(run.color));
            put("offset", point(run.offset));
            put(
                "glyphs",
                run.glyphs
                    .iter()
                    .map(|g| {
                        json!({
                            "id": g.id,
                            "advance": g.advance,
                            "x_offset": g.x_offset,
                            "y_offset": g.y_offset,
                        })
                    })
                    .collect(),
            );
        }
        Payload::Transform(t) => {
            put("category", json!(t.category().as_str()));
            put("matrix", json!(t.cols()));
        }
        Payload::Opacity(o) => put("opacity", json!(o)),
        Payload::Clip(ClipShape::Rect(r)) => put("clip", rect(*r)),
        Payload::Clip(ClipShape::RoundedRect(rr)) => {
            put("clip", rect(rr.rect()));
            put("radii", radii(rr));
        }
        Payload::Mask(mode) => put("mode", json!(format!("{mode:?}"))),
        Payload::Blend(mode) => put("mode", json!(format!("{mode:?}"))),
        Payload::CrossFade(progress) => put("progress", json!(progress)),
        Payload::Repeat { area, child_bounds } => {
            put("area", rect(*area));
            if let Some(tile) = child_bounds {
                put("tile", rect(*tile));
            }
        }
        Payload::Blur(radius) => put("radius", json!(radius)),
        Payload::Debug(message) => put("message", json!(message)),
        Payload::Border {
            outline,
            widths,
            colors,
        } => {
            put("outline", rect(outline.rect()));
            put("radii", radii(outline));
            put("widths", json!(widths));
            put("colors", colors.iter().copied().map(color).collect());
        }
        Payload::InsetShadow(shadow) | Payload::OutsetShadow(shadow) => {
            put("outline", rect(shadow.outline.rect()));
            put("radii", radii(&shadow.outline));
            put("color", color(shadow.color));
            put("dx", json!(shadow.dx));
            put("dy", json!(shadow.dy));
            put("spread", json!(shadow.spread));
            put("blur_radius", json!(shadow.blur_radius));
        }
        Payload::RadialGradient {
            rect: r,
            center,
            hradius,
            vradius,
            start,
            end,
            stops,
        } => {
            put("rect", rect(*r));
            put("center", point(*center));
            put("hradius", json!(hradius));
            put("vradius", json!(vradius));
            put("start", json!(start));
            put("end", json!(end));
            put("stops", color_stops(stops));
        }
        Payload::ColorMatrix { matrix, offset } => {
            put("matrix", json!(matrix));
            put("offset", json!(offset));
        }
    }
}

fn color_stops(stops: &[ColorStop]) -> Value {
    stops
        .iter()
        .map(|s| json!({ "offset": s.offset, "color": color(s.color) }))
        .collect()
}

fn radii(rr: &RoundedRect) -> Value {
    let r = rr.radii();
    json!([r.top_left, r.top_right, r.bottom_right, r.bottom_left])
}

fn color(c: Color) -> Value {
    json!(c.to_array())
}

fn rect(r: Rect) -> Value {
    json!([r.x0, r.y0, r.x1, r.y1])
}

fn point(p: Point) -> Value {
    json!([p.x, p.y])
}

#[cfg(test)]
mod tests {
    use scenekit_core::node::{BoxShadow, MaskMode};
    use scenekit_core::transform::Transform;

    use super::*;

    fn red_square() -> Node {
        Node::color(Color::RED, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap()
    }

    #[test]
    fn nested_objects() {
        let root = Node::container([
            Node::transform(Transform::scale(2.0, 2.0), red_square()).unwrap(),
        ])
        .unwrap();
        let v = to_json(&root);
        assert_eq!(v["kind"], "container");
        assert_eq!(v["bounds"], json!([0.0, 0.0, 20.0, 20.0]));
        let t = &v["children"][0];
        assert_eq!(t["kind"], "transform");
        assert_eq!(t["category"], "scale");
        assert_eq!(t["matrix"][0][0], 2.0);
        let leaf = &t["children"][0];
        assert_eq!(leaf["color"], json!([1.0, 0.0, 0.0, 1.0]));
        assert!(leaf.get("children").is_none());
    }

    #[test]
    fn gradient_and_mask_fields() {
        let gradient = Node::linear_gradient(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            vec![
                ColorStop::new(0.0, Color::BLACK),
                ColorStop::new(1.0, Color::WHITE),
            ],
        )
        .unwrap();
        let root = Node::mask(MaskMode::Luminance, red_square(), gradient).unwrap();
        let v = to_json(&root);
        assert_eq!(v["mode"], "Luminance");
        let stops = v["children"][1]["stops"].as_array().unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[1]["offset"], 1.0);
    }

    #[test]
    fn shadow_and_radial_fields() {
        let shadow = BoxShadow {
            outline: RoundedRect::new(0.0, 0.0, 10.0, 10.0, 1.0),
            color: Color::BLACK,
            dx: 0.0,
            dy: 3.0,
            spread: 1.0,
            blur_radius: 4.0,
        };
        let radial = Node::radial_gradient(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Point::new(5.0, 5.0),
            5.0,
            5.0,
            0.0,
            1.0,
            vec![
                ColorStop::new(0.0, Color::WHITE),
                ColorStop::new(1.0, Color::BLACK),
            ],
        )
        .unwrap();
        let root = Node::container([Node::inset_shadow(shadow).unwrap(), radial]).unwrap();
        let v = to_json(&root);
        let inset = &v["children"][0];
        assert_eq!(inset["kind"], "inset-shadow");
        assert_eq!(inset["radii"], json!([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(inset["dy"], 3.0);
        assert_eq!(inset["blur_radius"], 4.0);
        let radial = &v["children"][1];
        assert_eq!(radial["kind"], "radial-gradient");
        assert_eq!(radial["center"], json!([5.0, 5.0]));
        assert_eq!(radial["stops"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn export_is_valid_json() {
        let root = Node::debug("label", red_square()).unwrap();
        let mut out = Vec::new();
        export(&root, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["message"], "label");
        assert_eq!(parsed, to_json(&root));
    }
}
