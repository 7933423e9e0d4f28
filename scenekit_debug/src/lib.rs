// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON export for scenekit node trees.
//!
//! - [`pretty::TreePrinter`]: indented, one-line-per-node text dump.
//! - [`json::to_json`] / [`json::export`]: the tree as a nested JSON
//!   document, suitable for diffing snapshots in external tools.

pub mod json;
pub mod pretty;
