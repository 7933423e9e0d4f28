// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: an ordered sequence of draw items for one frame.

use alloc::vec::Vec;

use kurbo::Rect;
use scenekit_core::clip::ClipShape;
use scenekit_core::geometry;
use scenekit_core::node::{BlendMode, Node, Payload};
use scenekit_core::transform::Transform;

/// A single draw command in the render plan.
///
/// Items are produced in back-to-front order, matching the tree's
/// depth-first traversal order.
#[derive(Clone, Debug)]
pub struct RenderItem {
    /// The node to draw.
    ///
    /// Either a leaf (color, gradients, texture, text, border, shadows) or
    /// an effect node (mask, blend, cross-fade, repeat, blur, rounded clip,
    /// color matrix, group opacity) whose subtree the renderer composes
    /// off-screen.
    pub node: Node,
    /// Local-to-world transform accumulated from ancestors.
    pub world_transform: Transform,
    /// Opacity in `[0, 1]` accumulated from ancestors.
    ///
    /// Only opacity over a subtree that draws a single item is folded in
    /// here. Opacity over several items is a group: the item is then the
    /// opacity node itself, and its own opacity applies after the subtree
    /// has been composed, so overlapping children do not show through each
    /// other.
    pub effective_opacity: f32,
    /// Clip rectangle in world coordinates, if any ancestor clips.
    pub clip: Option<Rect>,
    /// How the item composites onto what was drawn before it.
    pub blend_mode: BlendMode,
}

impl RenderItem {
    /// Returns the item's bounds in world coordinates, before clipping.
    #[must_use]
    pub fn world_bounds(&self) -> Rect {
        self.world_transform.apply_to_bounds(self.node.bounds())
    }
}

/// An ordered list of draw commands for a single frame.
///
/// Renderers that do not want to walk the tree themselves translate this
/// into GPU draw calls or rasterizer operations.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Visible area in world coordinates; items outside it are culled.
    pub viewport: Rect,
    /// Draw items in back-to-front order.
    pub items: Vec<RenderItem>,
}

#[derive(Clone, Copy)]
struct Context {
    transform: Transform,
    opacity: f32,
    clip: Option<Rect>,
}

impl RenderPlan {
    /// Creates an empty render plan for the given viewport.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            items: Vec::new(),
        }
    }

    /// Flattens `root` into a new plan.
    #[must_use]
    pub fn build(root: &Node, viewport: Rect) -> Self {
        let mut plan = Self::new(viewport);
        plan.extend(root);
        plan
    }

    /// Appends the visible items of `root` to the plan.
    pub fn extend(&mut self, root: &Node) {
        let before = self.items.len();
        self.walk(
            root,
            Context {
                transform: Transform::IDENTITY,
                opacity: 1.0,
                clip: None,
            },
        );
        tracing::trace!(
            items = self.items.len() - before,
            nodes = root.node_count(),
            "built render plan"
        );
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn walk(&mut self, node: &Node, mut cx: Context) {
        match node.payload() {
            Payload::Container => {
                for child in node.children() {
                    self.walk(child, cx);
                }
                return;
            }
            Payload::Transform(t) => {
                cx.transform = Transform::compose(t, &cx.transform);
            }
            Payload::Opacity(o) => {
                if *o <= 0.0 {
                    return;
                }
                if !node.child().is_some_and(draws_once) {
                    self.emit(node, cx);
                    return;
                }
                cx.opacity *= *o;
                if cx.opacity <= 0.0 {
                    return;
                }
            }
            Payload::Clip(ClipShape::Rect(rect)) => {
                let world = cx.transform.apply_to_bounds(rect.abs());
                let clip = cx.clip.map_or(world, |c| geometry::intersect(c, world));
                if geometry::is_empty(clip) {
                    return;
                }
                cx.clip = Some(clip);
            }
            Payload::Debug(_) => {}
            _ => {
                self.emit(node, cx);
                return;
            }
        }
        if let Some(child) = node.child() {
            self.walk(child, cx);
        }
    }

    fn emit(&mut self, node: &Node, cx: Context) {
        if cx.opacity <= 0.0 {
            return;
        }
        if let Payload::Color { color, .. } = node.payload()
            && color.is_clear()
        {
            return;
        }
        let bounds = cx.transform.apply_to_bounds(node.bounds());
        if !geometry::overlaps(bounds, self.viewport) {
            return;
        }
        if cx.clip.is_some_and(|c| !geometry::overlaps(bounds, c)) {
            return;
        }
        let blend_mode = match node.payload() {
            Payload::Blend(mode) => *mode,
            _ => BlendMode::Normal,
        };
        self.items.push(RenderItem {
            node: node.clone(),
            world_transform: cx.transform,
            effective_opacity: cx.opacity,
            clip: cx.clip,
            blend_mode,
        });
    }
}

/// Does `node` turn into at most one render item?
fn draws_once(node: &Node) -> bool {
    match node.payload() {
        Payload::Container => match node.children() {
            [] => true,
            [only] => draws_once(only),
            _ => false,
        },
        Payload::Transform(_) | Payload::Clip(ClipShape::Rect(_)) | Payload::Debug(_) => {
            node.child().is_some_and(draws_once)
        }
        // Leaves, effects and opacity groups all end up as one item.
        _ => true,
    }
}
