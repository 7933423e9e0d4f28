// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Versioned binary stream format for node trees.
//!
//! ```text
//! stream  := magic "SKND" · version u16 · node
//! node    := tag u8 · payload_len u32 · payload[payload_len] · child*
//! ```
//!
//! All numbers are little-endian. Geometry is `f64`; colors, opacity,
//! progress and blur radius are `f32`. Strings are a `u32` byte length
//! followed by UTF-8. A container payload starts with its `u32` child count;
//! every other kind has a fixed number of children.
//!
//! Transforms are stored as a category byte followed by only the
//! coefficients that category needs (none, 2, 4, 6 or 16).
//!
//! Decoding never trusts the stream: bounds are recomputed, transform
//! categories are re-derived and checked, and child counts are checked
//! against the remaining input before anything is allocated.

mod decode;
mod encode;

use alloc::vec::Vec;
use core::fmt;

use crate::node::{MAX_DEPTH, Node};

/// Stream magic.
pub const MAGIC: [u8; 4] = *b"SKND";

/// Current (and only supported) stream version.
pub const VERSION: u16 = 1;

/// Bytes of the stream header.
pub(crate) const HEADER_LEN: usize = MAGIC.len() + 2;

/// Smallest possible encoded node: a tag and a zero payload length.
pub(crate) const MIN_NODE_LEN: usize = 1 + 4;

/// Resource limits applied while decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum nesting depth; the root is at depth 1.
    pub max_depth: usize,
}

impl DecodeLimits {
    /// Limits suitable for streams produced by a toolkit.
    ///
    /// Accepts every tree that node construction accepts.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }

    /// Tighter limits for streams from untrusted sources.
    #[must_use]
    pub const fn untrusted() -> Self {
        Self { max_depth: 64 }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::standard()
    }
}

/// What went wrong while decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The stream does not start with [`MAGIC`].
    BadMagic,
    /// The header names a version other than [`VERSION`].
    UnsupportedVersion(u16),
    /// A node tag is not a known [`NodeKind`](crate::node::NodeKind).
    UnknownVariant(u8),
    /// The stream ended before the data it announced.
    TruncatedStream,
    /// A payload is malformed or out of range.
    InvalidPayload(&'static str),
    /// Bytes remain after the root node.
    TrailingData,
    /// Nodes are nested deeper than [`DecodeLimits::max_depth`].
    NestingTooDeep,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => f.write_str("bad magic"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported version {v}"),
            Self::UnknownVariant(tag) => write!(f, "unknown node tag {tag}"),
            Self::TruncatedStream => f.write_str("truncated stream"),
            Self::InvalidPayload(reason) => write!(f, "invalid payload: {reason}"),
            Self::TrailingData => f.write_str("trailing data after root node"),
            Self::NestingTooDeep => f.write_str("nesting too deep"),
        }
    }
}

/// Error returned by [`deserialize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeError {
    /// Byte offset at which the problem was detected.
    pub offset: usize,
    /// What went wrong.
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) const fn new(offset: usize, kind: DecodeErrorKind) -> Self {
        Self { offset, kind }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.kind, self.offset)
    }
}

impl core::error::Error for DecodeError {}

/// Encodes a tree into a new byte vector.
///
/// Encoding is deterministic: equal trees produce identical bytes.
#[must_use]
pub fn serialize(root: &Node) -> Vec<u8> {
    let mut encoder = encode::Encoder::new();
    encoder.header();
    encoder.node(root);
    let bytes = encoder.into_bytes();
    tracing::trace!(len = bytes.len(), "serialized node tree");
    bytes
}

/// Decodes a tree with [`DecodeLimits::standard`].
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first problem found.
pub fn deserialize(bytes: &[u8]) -> Result<Node, DecodeError> {
    deserialize_with_limits(bytes, DecodeLimits::standard())
}

/// Decodes a tree with explicit limits.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first problem found.
pub fn deserialize_with_limits(bytes: &[u8], limits: DecodeLimits) -> Result<Node, DecodeError> {
    decode::Decoder::new(bytes, limits)
        .stream()
        .inspect_err(|err| tracing::debug!(offset = err.offset, kind = %err.kind, "decode failed"))
}
