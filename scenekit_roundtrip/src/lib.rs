// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Round-trip check for scenekit node streams.
//!
//! [`round_trip`] decodes a stream, encodes the resulting tree again and
//! decodes that output once more. A stream passes when the re-encoded bytes
//! are identical to the input and both decoded trees are structurally
//! equal. The `node-roundtrip` binary wraps this in a command-line tool.

use scenekit_core::codec::{self, DecodeError, DecodeLimits};
use scenekit_core::node::Node;

/// Result of a successful decode/encode/decode cycle.
#[derive(Clone, Debug)]
pub struct RoundTrip {
    /// The tree decoded from the input.
    pub root: Node,
    /// The tree encoded again.
    pub reencoded: Vec<u8>,
    /// First byte offset at which input and re-encoded output differ.
    pub first_difference: Option<usize>,
    /// Whether decoding `reencoded` gives a tree equal to `root`.
    pub structurally_equal: bool,
}

impl RoundTrip {
    /// Returns `true` if the re-encoded bytes match the input exactly.
    #[must_use]
    pub fn bytes_identical(&self) -> bool {
        self.first_difference.is_none()
    }

    /// Returns `true` if the stream survived the round-trip unchanged.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.bytes_identical() && self.structurally_equal
    }
}

/// Decodes `input`, re-encodes it and checks the two for identity.
///
/// # Errors
///
/// Returns the [`DecodeError`] of the first decode that fails.
pub fn round_trip(input: &[u8], limits: DecodeLimits) -> Result<RoundTrip, DecodeError> {
    let root = codec::deserialize_with_limits(input, limits)?;
    let reencoded = codec::serialize(&root);
    let again = codec::deserialize_with_limits(&reencoded, limits)?;
    let first_difference = first_difference(input, &reencoded);
    let structurally_equal = root.structural_eq(&again);
    tracing::debug!(
        nodes = root.node_count(),
        bytes = input.len(),
        ?first_difference,
        structurally_equal,
        "round-trip finished"
    );
    Ok(RoundTrip {
        root,
        reencoded,
        first_difference,
        structurally_equal,
    })
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(i) => Some(i),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}
