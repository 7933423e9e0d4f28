// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable render-node scene graph with a versioned binary codec.
//!
//! `scenekit_core` provides the tree of drawing operations that widgets
//! produce each frame and that renderers consume. It is `no_std` compatible
//! (with `alloc`); sealed trees are reference-counted and `Send + Sync`.
//!
//! # Architecture
//!
//! ```text
//!   widgets ──► NodeBuilder ──► Node (sealed, Arc) ──► Renderer::render()
//!                                   │        ▲
//!                          serialize│        │deserialize
//!                                   ▼        │
//!                              "SKND" byte stream
//! ```
//!
//! **[`transform`]**: Column-major 4×4 transforms with a cached
//! [`TransformCategory`](transform::TransformCategory).
//!
//! **[`geometry`]**: Rectangle helpers on top of [`kurbo::Rect`].
//!
//! **[`node`]**: The [`Node`](node::Node) handle, its nineteen variants and
//! the stack-disciplined [`NodeBuilder`](node::NodeBuilder).
//!
//! **[`codec`]**: [`serialize`](codec::serialize) and
//! [`deserialize`](codec::deserialize) for the binary stream format.
//!
//! **[`backend`]**: The [`Renderer`](backend::Renderer) trait implemented
//! by drawing backends.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod clip;
pub mod codec;
pub mod color;
pub mod geometry;
pub mod node;
pub mod transform;

pub use kurbo::{Point, Rect, RoundedRect, RoundedRectRadii};
