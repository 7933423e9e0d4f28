// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans and damage diffing for scenekit node trees.
//!
//! This crate sits between a sealed [`Node`](scenekit_core::node::Node)
//! tree and a renderer. It provides:
//!
//! - [`RenderPlan`]: the tree flattened into back-to-front [`RenderItem`]s
//!   with accumulated transform, opacity and clip
//! - [`diff`]: compares two frames' trees and reports what changed
//! - [`DamageRegion`]: the area that must be redrawn

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod damage;
mod diff;
mod plan;

pub use damage::{DamageRegion, MAX_DAMAGE_RECTS};
pub use diff::diff;
pub use plan::{RenderItem, RenderPlan};
