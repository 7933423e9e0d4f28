// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable tree output.
//!
//! [`TreePrinter`] writes one line per node to a [`Write`](std::io::Write)
//! destination (default: stderr), indented two spaces per level. Each line
//! holds the node kind, its bounds as `[x0, y0, x1, y1]` and a short summary
//! of the payload:
//!
//! ```text
//! container [0, 0, 20, 20] children=1
//!   transform [0, 0, 20, 20] scale(2, 2)
//!     color [0, 0, 10, 10] rgba(1, 0, 0, 1)
//! ```

use std::fmt::Write as _;
use std::io::{self, Write};

use scenekit_core::clip::ClipShape;
use scenekit_core::color::Color;
use scenekit_core::node::{BoxShadow, Node, Payload};
use scenekit_core::transform::{Transform, TransformCategory};
use scenekit_core::{Point, Rect, RoundedRect};

/// Writes an indented text dump of node trees.
pub struct TreePrinter<W: Write = Box<dyn Write>> {
    writer: W,
    indent: usize,
}

impl<W: Write> std::fmt::Debug for TreePrinter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreePrinter")
            .field("indent", &self.indent)
            .finish_non_exhaustive()
    }
}

impl TreePrinter {
    /// Creates a printer that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Creates a printer that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, indent: 2 }
    }
}

impl<W: Write> TreePrinter<W> {
    /// Creates a printer that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, indent: 2 }
    }

    /// Sets the number of spaces added per nesting level.
    #[must_use]
    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = spaces;
        self
    }

    /// Writes `root` and all its descendants.
    pub fn print(&mut self, root: &Node) -> io::Result<()> {
        self.print_at(root, 0)
    }

    /// Consumes the printer and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn print_at(&mut self, node: &Node, depth: usize) -> io::Result<()> {
        writeln!(
            self.writer,
            "{:width$}{} {} {}",
            "",
            node.kind(),
            rect(node.bounds()),
            summary(node),
            width = depth * self.indent,
        )?;
        for child in node.children() {
            self.print_at(child, depth + 1)?;
        }
        Ok(())
    }
}

/// Returns the text dump of `root` as a string.
#[must_use]
pub fn to_string(root: &Node) -> String {
    let mut printer = TreePrinter::with_writer(Vec::new());
    // Writing into a Vec cannot fail.
    let _ = printer.print(root);
    String::from_utf8_lossy(&printer.into_inner()).into_owned()
}

fn summary(node: &Node) -> String {
    match node.payload() {
        Payload::Container => format!("children={}", node.children().len()),
        Payload::Color { color, .. } => rgba(*color),
        Payload::LinearGradient {
            start, end, stops, ..
        } => format!(
            "from={} to={} stops={}",
            point(*start),
            point(*end),
            stops.len()
        ),
        Payload::Texture { texture, .. } => format!(
            "texture=#{} {}x{}",
            texture.id, texture.width, texture.height
        ),
        Payload::Text(run) => format!(
            "{:?} size={} glyphs={} {}",
            run.family,
            run.size,
            run.glyphs.len(),
            rgba(run.color)
        ),
        Payload::Transform(t) => transform(t),
        Payload::Opacity(o) => format!("opacity={o}"),
        Payload::Clip(ClipShape::Rect(r)) => format!("rect={}", rect(*r)),
        Payload::Clip(ClipShape::RoundedRect(rr)) => format!("rounded={}", rounded(rr)),
        Payload::Mask(mode) => format!("mode={mode:?}"),
        Payload::Blend(mode) => format!("mode={mode:?}"),
        Payload::CrossFade(progress) => format!("progress={progress}"),
        Payload::Repeat { area, child_bounds } => match child_bounds {
            Some(tile) => format!("area={} tile={}", rect(*area), rect(*tile)),
            None => format!("area={}", rect(*area)),
        },
        Payload::Blur(radius) => format!("radius={radius}"),
        Payload::Debug(message) => format!("{message:?}"),
        Payload::Border {
            outline,
            widths: [t, r, b, l],
            colors,
        } => {
            let colors: Vec<String> = colors.iter().copied().map(rgba).collect();
            format!(
                "outline={} widths=({t}, {r}, {b}, {l}) {}",
                rounded(outline),
                colors.join(" ")
            )
        }
        Payload::InsetShadow(shadow) | Payload::OutsetShadow(shadow) => box_shadow(shadow),
        Payload::RadialGradient {
            center,
            hradius,
            vradius,
            start,
            end,
            stops,
            ..
        } => format!(
            "center={} radii=({hradius}, {vradius}) range=({start}, {end}) stops={}",
            point(*center),
            stops.len()
        ),
        Payload::ColorMatrix { matrix, offset } => {
            let values: Vec<String> = matrix.iter().map(f32::to_string).collect();
            let [r, g, b, a] = offset;
            format!("matrix({}) offset=({r}, {g}, {b}, {a})", values.join(", "))
        }
    }
}

fn box_shadow(shadow: &BoxShadow) -> String {
    format!(
        "outline={} offset=({}, {}) spread={} blur={} {}",
        rounded(&shadow.outline),
        shadow.dx,
        shadow.dy,
        shadow.spread,
        shadow.blur_radius,
        rgba(shadow.color)
    )
}

fn rounded(rr: &RoundedRect) -> String {
    let r = rr.radii();
    format!(
        "{} radii=({}, {}, {}, {})",
        rect(rr.rect()),
        r.top_left,
        r.top_right,
        r.bottom_right,
        r.bottom_left
    )
}

fn transform(t: &Transform) -> String {
    let c = t.cols();
    match t.category() {
        TransformCategory::Identity => "identity".into(),
        TransformCategory::Translate => format!("translate({}, {})", c[3][0], c[3][1]),
        TransformCategory::Scale => {
            let mut s = format!("scale({}, {})", c[0][0], c[1][1]);
            if c[3][0] != 0.0 || c[3][1] != 0.0 {
                let _ = write!(s, " translate({}, {})", c[3][0], c[3][1]);
            }
            s
        }
        TransformCategory::Rotate => match t.to_affine() {
            Some(a) => {
                let [a, b, c, d, e, f] = a.as_coeffs();
                format!("affine({a}, {b}, {c}, {d}, {e}, {f})")
            }
            None => "rotate".into(),
        },
        category @ (TransformCategory::Matrix | TransformCategory::Perspective) => {
            let values: Vec<String> = c.iter().flatten().map(f64::to_string).collect();
            format!("{}({})", category.as_str(), values.join(", "))
        }
    }
}

fn rgba(c: Color) -> String {
    format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a)
}

fn rect(r: Rect) -> String {
    format!("[{}, {}, {}, {}]", r.x0, r.y0, r.x1, r.y1)
}

fn point(p: Point) -> String {
    format!("({}, {})", p.x, p.y)
}

#[cfg(test)]
mod tests {
    use scenekit_core::node::{BlendMode, TextureHandle};

    use super::*;

    fn red_square() -> Node {
        Node::color(Color::RED, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap()
    }

    #[test]
    fn scaled_color_dump() {
        let root = Node::container([
            Node::transform(Transform::scale(2.0, 2.0), red_square()).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            to_string(&root),
            "container [0, 0, 20, 20] children=1\n\
             \x20 transform [0, 0, 20, 20] scale(2, 2)\n\
             \x20   color [0, 0, 10, 10] rgba(1, 0, 0, 1)\n"
        );
    }

    #[test]
    fn custom_indent() {
        let root = Node::opacity(0.5, red_square()).unwrap();
        let mut printer = TreePrinter::with_writer(Vec::new()).indent(4);
        printer.print(&root).unwrap();
        let text = String::from_utf8(printer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "opacity [0, 0, 10, 10] opacity=0.5");
        assert!(lines[1].starts_with("    color "));
    }

    #[test]
    fn payload_summaries() {
        let blend = Node::blend(
            BlendMode::Screen,
            red_square(),
            Node::texture(
                TextureHandle {
                    id: 7,
                    width: 64,
                    height: 32,
                },
                Rect::new(0.0, 0.0, 64.0, 32.0),
            )
            .unwrap(),
        )
        .unwrap();
        let root = Node::debug("toolbar", blend).unwrap();
        let text = to_string(&root);
        assert!(text.starts_with("debug [0, 0, 64, 32] \"toolbar\"\n"));
        assert!(text.contains("blend [0, 0, 64, 32] mode=Screen\n"));
        assert!(text.contains("texture [0, 0, 64, 32] texture=#7 64x32\n"));
    }

    #[test]
    fn border_and_shadow_summaries() {
        let outline = RoundedRect::new(0.0, 0.0, 20.0, 10.0, 2.0);
        let border = Node::border(outline, [1.0, 2.0, 1.0, 2.0], [Color::BLACK; 4]).unwrap();
        assert_eq!(
            to_string(&border),
            "border [0, 0, 20, 10] outline=[0, 0, 20, 10] radii=(2, 2, 2, 2) \
             widths=(1, 2, 1, 2) rgba(0, 0, 0, 1) rgba(0, 0, 0, 1) rgba(0, 0, 0, 1) \
             rgba(0, 0, 0, 1)\n"
        );
        let shadow = BoxShadow {
            outline,
            color: Color::BLACK,
            dx: 1.0,
            dy: 2.0,
            spread: 0.0,
            blur_radius: 0.0,
        };
        let text = to_string(&Node::outset_shadow(shadow).unwrap());
        assert!(
            text.starts_with("outset-shadow [0, 0, 21, 12] outline=[0, 0, 20, 10]"),
            "{text}"
        );
        assert!(text.contains("offset=(1, 2) spread=0 blur=0"), "{text}");
    }

    #[test]
    fn color_matrix_summary() {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        let text = to_string(&Node::color_matrix(m, [0.0, 0.0, 0.0, 0.5], red_square()).unwrap());
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("color-matrix [0, 0, 10, 10] matrix(1, 0, 0,"), "{first}");
        assert!(first.ends_with("offset=(0, 0, 0, 0.5)"), "{first}");
    }

    #[test]
    fn translated_scale() {
        let t = Transform::compose(
            &Transform::scale(3.0, 3.0),
            &Transform::translate(5.0, 0.0),
        );
        assert_eq!(transform(&t), "scale(3, 3) translate(5, 0)");
        assert_eq!(transform(&Transform::IDENTITY), "identity");
        assert_eq!(
            transform(&Transform::translate(1.5, -2.0)),
            "translate(1.5, -2)"
        );
    }

    #[test]
    fn debug_impl_omits_writer() {
        let printer = TreePrinter::with_writer(Vec::new());
        let s = format!("{printer:?}");
        assert!(s.contains("TreePrinter"));
        assert!(s.contains("indent: 2"));
    }
}
