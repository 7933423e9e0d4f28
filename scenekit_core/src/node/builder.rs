// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack-disciplined snapshot builder.
//!
//! Widgets describe a frame by pushing wrappers, appending leaves and
//! popping wrappers again. The builder seals everything into an immutable
//! tree on [`finish`](NodeBuilder::finish):
//!
//! ```rust
//! use scenekit_core::Rect;
//! use scenekit_core::color::Color;
//! use scenekit_core::node::{NodeBuilder, NodeKind, Payload};
//! use scenekit_core::transform::Transform;
//!
//! let mut builder = NodeBuilder::new();
//! builder.push_transform(Transform::scale(2.0, 2.0))?;
//! builder.append_leaf(Payload::Color {
//!     color: Color::RED,
//!     rect: Rect::new(0.0, 0.0, 10.0, 10.0),
//! })?;
//! builder.pop()?;
//! let root = builder.finish()?;
//! assert_eq!(root.kind(), NodeKind::Transform);
//! assert_eq!(root.bounds(), Rect::new(0.0, 0.0, 20.0, 20.0));
//! # Ok::<(), scenekit_core::node::BuilderError>(())
//! ```
//!
//! Popping collapses trivial structure: a wrapper that received no children
//! emits nothing, a container with one child emits that child, and a
//! single-child wrapper that received several children wraps them in a
//! container first.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use super::{BlendMode, MaskMode, Node, NodeError, Payload};
use crate::clip::ClipShape;
use crate::transform::Transform;

/// Lifecycle of a [`NodeBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuilderState {
    /// Nothing has been pushed or appended yet.
    #[default]
    Empty,
    /// At least one operation succeeded and the builder is still open.
    Building,
    /// [`finish`](NodeBuilder::finish) succeeded; every call now fails.
    Sealed,
}

/// Error returned by [`NodeBuilder`] operations.
///
/// A failed operation leaves the builder exactly as it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// `pop` without a matching push, or `finish` with pushes still open.
    UnbalancedContainer {
        /// Number of open pushes at the time of the call.
        depth: usize,
    },
    /// The builder was already sealed by `finish`.
    BuilderAlreadyFinished,
    /// A payload or collapsed node failed validation.
    InvalidPayload(NodeError),
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedContainer { depth: 0 } => f.write_str("pop without a matching push"),
            Self::UnbalancedContainer { depth } => {
                write!(f, "finish with {depth} unpopped push(es)")
            }
            Self::BuilderAlreadyFinished => f.write_str("builder already finished"),
            Self::InvalidPayload(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for BuilderError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::InvalidPayload(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NodeError> for BuilderError {
    fn from(err: NodeError) -> Self {
        Self::InvalidPayload(err)
    }
}

#[derive(Debug)]
struct Frame {
    payload: Payload,
    children: Vec<Node>,
}

/// Builds a node tree with push/append/pop calls.
///
/// Builders are single-threaded and single-use.
#[derive(Debug, Default)]
pub struct NodeBuilder {
    stack: Vec<Frame>,
    roots: Vec<Node>,
    state: BuilderState,
}

impl NodeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Returns the number of open pushes.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Opens a wrapper node whose children are collected until the matching
    /// [`pop`](Self::pop).
    ///
    /// # Errors
    ///
    /// [`BuilderError::InvalidPayload`] for leaf payloads or payloads that
    /// fail validation; [`BuilderError::BuilderAlreadyFinished`] once
    /// sealed.
    pub fn push(&mut self, payload: Payload) -> Result<(), BuilderError> {
        self.ensure_open()?;
        let kind = payload.kind();
        if kind.is_leaf() {
            return Err(self.reject(NodeError::InvalidPayload {
                kind,
                reason: "leaf payload pushed as a wrapper",
            }));
        }
        payload
            .validate()
            .map_err(|reason| self.reject(NodeError::InvalidPayload { kind, reason }))?;
        self.stack.push(Frame {
            payload,
            children: Vec::new(),
        });
        self.state = BuilderState::Building;
        Ok(())
    }

    /// Opens a container.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_container(&mut self) -> Result<(), BuilderError> {
        self.push(Payload::Container)
    }

    /// Opens a transform.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_transform(&mut self, transform: Transform) -> Result<(), BuilderError> {
        self.push(Payload::Transform(transform))
    }

    /// Opens an opacity group.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_opacity(&mut self, opacity: f32) -> Result<(), BuilderError> {
        self.push(Payload::Opacity(opacity))
    }

    /// Opens a clip.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_clip(&mut self, shape: impl Into<ClipShape>) -> Result<(), BuilderError> {
        self.push(Payload::Clip(shape.into()))
    }

    /// Opens a mask; append the source first, then the mask.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_mask(&mut self, mode: MaskMode) -> Result<(), BuilderError> {
        self.push(Payload::Mask(mode))
    }

    /// Opens a blend; append the bottom first, then the top.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_blend(&mut self, mode: BlendMode) -> Result<(), BuilderError> {
        self.push(Payload::Blend(mode))
    }

    /// Opens a cross-fade; append the start first, then the end.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_cross_fade(&mut self, progress: f32) -> Result<(), BuilderError> {
        self.push(Payload::CrossFade(progress))
    }

    /// Opens a repeat.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_repeat(
        &mut self,
        area: Rect,
        child_bounds: Option<Rect>,
    ) -> Result<(), BuilderError> {
        self.push(Payload::Repeat { area, child_bounds })
    }

    /// Opens a blur.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_blur(&mut self, radius: f32) -> Result<(), BuilderError> {
        self.push(Payload::Blur(radius))
    }

    /// Opens a debug annotation.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_debug(&mut self, message: impl Into<String>) -> Result<(), BuilderError> {
        self.push(Payload::Debug(message.into()))
    }

    /// Opens a color matrix.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn push_color_matrix(
        &mut self,
        matrix: [f32; 16],
        offset: [f32; 4],
    ) -> Result<(), BuilderError> {
        self.push(Payload::ColorMatrix { matrix, offset })
    }

    /// Closes the innermost open push and emits the collapsed node into its
    /// parent.
    ///
    /// # Errors
    ///
    /// [`BuilderError::UnbalancedContainer`] with no open push;
    /// [`BuilderError::InvalidPayload`] if a binary node did not receive
    /// exactly two children or the resulting bounds are not finite.
    pub fn pop(&mut self) -> Result<(), BuilderError> {
        self.ensure_open()?;
        let Some(frame) = self.stack.last() else {
            tracing::debug!("pop without a matching push");
            return Err(BuilderError::UnbalancedContainer { depth: 0 });
        };
        let emitted = collapse(frame).map_err(|err| self.reject(err))?;
        self.stack.pop();
        if let Some(node) = emitted {
            self.current().push(node);
        }
        Ok(())
    }

    /// Appends a leaf node built from `payload`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::InvalidPayload`] for wrapper payloads or payloads that
    /// fail validation.
    pub fn append_leaf(&mut self, payload: Payload) -> Result<(), BuilderError> {
        self.ensure_open()?;
        let kind = payload.kind();
        if !kind.is_leaf() {
            return Err(self.reject(NodeError::InvalidPayload {
                kind,
                reason: "wrapper payload appended as a leaf",
            }));
        }
        let node = Node::new(payload, Vec::new()).map_err(|err| self.reject(err))?;
        self.append_node(node)
    }

    /// Appends a prebuilt subtree.
    ///
    /// # Errors
    ///
    /// [`BuilderError::BuilderAlreadyFinished`] once sealed.
    pub fn append_node(&mut self, node: Node) -> Result<(), BuilderError> {
        self.ensure_open()?;
        self.current().push(node);
        self.state = BuilderState::Building;
        Ok(())
    }

    /// Seals the builder and returns the root.
    ///
    /// A single emitted node is returned as is; several are wrapped in a
    /// container; nothing at all yields an empty container.
    ///
    /// # Errors
    ///
    /// [`BuilderError::UnbalancedContainer`] with open pushes (the builder is
    /// left unchanged); [`BuilderError::BuilderAlreadyFinished`] once sealed;
    /// [`BuilderError::InvalidPayload`] if wrapping several roots would
    /// exceed [`MAX_DEPTH`](super::MAX_DEPTH).
    pub fn finish(&mut self) -> Result<Node, BuilderError> {
        self.ensure_open()?;
        if !self.stack.is_empty() {
            tracing::debug!(depth = self.stack.len(), "finish with open pushes");
            return Err(BuilderError::UnbalancedContainer {
                depth: self.stack.len(),
            });
        }
        let root = match self.roots.as_slice() {
            [only] => only.clone(),
            roots => Node::container(roots.iter().cloned()).map_err(|err| self.reject(err))?,
        };
        self.roots.clear();
        self.state = BuilderState::Sealed;
        tracing::trace!(kind = %root.kind(), "sealed node tree");
        Ok(root)
    }

    fn ensure_open(&self) -> Result<(), BuilderError> {
        if self.state == BuilderState::Sealed {
            tracing::debug!("builder used after finish");
            return Err(BuilderError::BuilderAlreadyFinished);
        }
        Ok(())
    }

    fn reject(&self, err: NodeError) -> BuilderError {
        tracing::debug!(depth = self.stack.len(), %err, "rejected builder operation");
        BuilderError::InvalidPayload(err)
    }

    fn current(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.roots,
        }
    }
}

/// Turns a closed frame into the node it emits, if any.
fn collapse(frame: &Frame) -> Result<Option<Node>, NodeError> {
    let children = &frame.children;
    match frame.payload.kind().child_count() {
        None => Ok(match children.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            _ => Some(Node::container(children.iter().cloned())?),
        }),
        Some(1) => {
            let child = match children.as_slice() {
                [] => return Ok(None),
                [only] => only.clone(),
                _ => Node::container(children.iter().cloned())?,
            };
            Node::new(frame.payload.clone(), vec![child]).map(Some)
        }
        Some(_) => Node::new(frame.payload.clone(), children.clone()).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::color::Color;
    use crate::node::NodeKind;

    fn red(rect: Rect) -> Payload {
        Payload::Color {
            color: Color::RED,
            rect,
        }
    }

    fn unit() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn empty_builder_finishes_to_empty_container() {
        let mut b = NodeBuilder::new();
        assert_eq!(b.state(), BuilderState::Empty);
        let root = b.finish().unwrap();
        assert_eq!(root.kind(), NodeKind::Container);
        assert!(root.children().is_empty());
        assert_eq!(b.state(), BuilderState::Sealed);
    }

    #[test]
    fn single_root_returned_directly() {
        let mut b = NodeBuilder::new();
        b.append_leaf(red(unit())).unwrap();
        assert_eq!(b.state(), BuilderState::Building);
        assert_eq!(b.finish().unwrap().kind(), NodeKind::Color);
    }

    #[test]
    fn several_roots_wrapped_in_container() {
        let mut b = NodeBuilder::new();
        b.append_leaf(red(unit())).unwrap();
        b.append_leaf(red(Rect::new(20.0, 0.0, 30.0, 10.0))).unwrap();
        let root = b.finish().unwrap();
        assert_eq!(root.kind(), NodeKind::Container);
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.bounds(), Rect::new(0.0, 0.0, 30.0, 10.0));
    }

    #[test]
    fn empty_wrapper_emits_nothing() {
        let mut b = NodeBuilder::new();
        b.push_opacity(0.5).unwrap();
        b.pop().unwrap();
        b.append_leaf(red(unit())).unwrap();
        assert_eq!(b.finish().unwrap().kind(), NodeKind::Color);
    }

    #[test]
    fn multi_child_wrapper_gets_container() {
        let mut b = NodeBuilder::new();
        b.push_opacity(0.5).unwrap();
        b.append_leaf(red(unit())).unwrap();
        b.append_leaf(red(unit())).unwrap();
        b.pop().unwrap();
        let root = b.finish().unwrap();
        assert_eq!(root.kind(), NodeKind::Opacity);
        let child = root.child().unwrap();
        assert_eq!(child.kind(), NodeKind::Container);
        assert_eq!(child.children().len(), 2);
    }

    #[test]
    fn single_child_container_collapses() {
        let mut b = NodeBuilder::new();
        b.push_container().unwrap();
        b.append_leaf(red(unit())).unwrap();
        b.pop().unwrap();
        assert_eq!(b.finish().unwrap().kind(), NodeKind::Color);
    }

    #[test]
    fn binary_needs_two_children() {
        let mut b = NodeBuilder::new();
        b.push_blend(BlendMode::Screen).unwrap();
        b.append_leaf(red(unit())).unwrap();
        assert_matches!(b.pop(), Err(BuilderError::InvalidPayload(_)));
        // Failed pop leaves the frame open.
        assert_eq!(b.depth(), 1);
        b.append_leaf(red(unit())).unwrap();
        b.pop().unwrap();
        assert_eq!(b.finish().unwrap().kind(), NodeKind::Blend);
    }

    #[test]
    fn pop_without_push() {
        let mut b = NodeBuilder::new();
        assert_matches!(
            b.pop(),
            Err(BuilderError::UnbalancedContainer { depth: 0 })
        );
        assert_eq!(b.state(), BuilderState::Empty);
    }

    #[test]
    fn finish_with_open_push_leaves_builder_unchanged() {
        let mut b = NodeBuilder::new();
        b.push_container().unwrap();
        b.append_leaf(red(unit())).unwrap();
        assert_matches!(
            b.finish(),
            Err(BuilderError::UnbalancedContainer { depth: 1 })
        );
        assert_eq!(b.depth(), 1);
        assert_eq!(b.state(), BuilderState::Building);
        b.pop().unwrap();
        assert_eq!(b.finish().unwrap().kind(), NodeKind::Color);
    }

    #[test]
    fn sealed_builder_rejects_everything() {
        let mut b = NodeBuilder::new();
        b.finish().unwrap();
        assert_matches!(b.push_container(), Err(BuilderError::BuilderAlreadyFinished));
        assert_matches!(b.pop(), Err(BuilderError::BuilderAlreadyFinished));
        assert_matches!(
            b.append_leaf(red(unit())),
            Err(BuilderError::BuilderAlreadyFinished)
        );
        assert_matches!(b.finish(), Err(BuilderError::BuilderAlreadyFinished));
    }

    #[test]
    fn invalid_leaf_rejected_without_state_change() {
        let mut b = NodeBuilder::new();
        let bad = Payload::Color {
            color: Color::new(0.0, 0.0, 0.0, 7.0),
            rect: unit(),
        };
        assert_matches!(b.append_leaf(bad), Err(BuilderError::InvalidPayload(_)));
        assert_eq!(b.state(), BuilderState::Empty);
        assert_matches!(
            b.append_leaf(Payload::Opacity(0.5)),
            Err(BuilderError::InvalidPayload(_))
        );
        assert_matches!(b.push(red(unit())), Err(BuilderError::InvalidPayload(_)));
        assert_matches!(b.push_opacity(3.0), Err(BuilderError::InvalidPayload(_)));
        assert_eq!(b.depth(), 0);
    }

    #[test]
    fn nested_transforms_compose_bounds() {
        let mut b = NodeBuilder::new();
        b.push_transform(Transform::translate(5.0, 5.0)).unwrap();
        b.push_transform(Transform::scale(2.0, 2.0)).unwrap();
        b.append_leaf(red(unit())).unwrap();
        b.pop().unwrap();
        b.pop().unwrap();
        let root = b.finish().unwrap();
        assert_eq!(root.bounds(), Rect::new(5.0, 5.0, 25.0, 25.0));
        assert_eq!(root.node_count(), 3);
    }

    #[test]
    fn too_deep_pop_leaves_frame_open() {
        let mut deep = Node::color(Color::RED, unit()).unwrap();
        for _ in 1..crate::node::MAX_DEPTH {
            deep = Node::opacity(1.0, deep).unwrap();
        }
        let mut b = NodeBuilder::new();
        b.push_blur(1.0).unwrap();
        b.append_node(deep.clone()).unwrap();
        assert_matches!(b.pop(), Err(BuilderError::InvalidPayload(_)));
        assert_eq!(b.depth(), 1);

        let mut b = NodeBuilder::new();
        b.append_node(deep.clone()).unwrap();
        b.append_node(deep).unwrap();
        assert_matches!(b.finish(), Err(BuilderError::InvalidPayload(_)));
        assert_eq!(b.state(), BuilderState::Building);
    }

    #[test]
    fn prebuilt_subtree_appended() {
        let leaf = Node::color(Color::BLUE, unit()).unwrap();
        let mut b = NodeBuilder::new();
        b.push_clip(Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        b.append_node(leaf.clone()).unwrap();
        b.pop().unwrap();
        let root = b.finish().unwrap();
        assert!(Node::ptr_eq(root.child().unwrap(), &leaf));
        assert_eq!(root.bounds(), Rect::new(0.0, 0.0, 5.0, 5.0));
    }
}
