// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer contract for drawing backends.
//!
//! The core crate draws nothing. A backend receives a sealed root
//! [`Node`] and is free to walk it directly or to flatten it first (the
//! `scenekit_render` crate provides a render plan and a damage diff for
//! that purpose).
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_frame(widgets: &Widgets, previous: Option<&Node>) -> Result<Node, R::Error> {
//!     let mut builder = NodeBuilder::new();
//!     widgets.snapshot(&mut builder);
//!     let root = builder.finish()?;
//!     renderer.render(&root)?;
//!     Ok(root)
//! }
//! ```

use crate::node::Node;

/// Draws a sealed node tree to some output.
///
/// Software rasterizers, GPU renderers and test doubles implement this
/// trait, enabling generic frame loops.
pub trait Renderer {
    /// Error reported when a frame cannot be drawn.
    type Error;

    /// Draws the tree rooted at `root`.
    ///
    /// The tree is immutable; renderers may keep clones of any node (for
    /// example to diff against the next frame) without copying it.
    fn render(&mut self, root: &Node) -> Result<(), Self::Error>;
}
