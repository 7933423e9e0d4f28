// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-to-frame tree comparison.
//!
//! [`diff`] walks two trees in lockstep. Wherever both sides are the same
//! handle nothing is damaged; wherever the kinds or non-child payloads
//! differ the union of both nodes' bounds is damaged. Wrappers whose own
//! payload is unchanged recurse into their children and adjust the child
//! damage (through the transform, to the clip, grown by the blur).

use scenekit_core::node::{Node, Payload, blur_extent};

use crate::damage::DamageRegion;

/// Returns the area that differs between `old` and `new`.
///
/// The result is [`DamageRegion::None`] when nothing visible changed and
/// [`DamageRegion::Rects`] otherwise.
#[must_use]
pub fn diff(old: &Node, new: &Node) -> DamageRegion {
    let damage = diff_node(old, new);
    tracing::trace!(rects = damage.rects().len(), "diffed node trees");
    damage
}

fn diff_node(old: &Node, new: &Node) -> DamageRegion {
    if Node::ptr_eq(old, new) {
        return DamageRegion::None;
    }
    match (old.payload(), new.payload()) {
        (Payload::Container, Payload::Container) => diff_children(old.children(), new.children()),
        (Payload::Transform(a), Payload::Transform(b)) if a.approx_eq(b) => {
            diff_single_child(old, new).transformed(a)
        }
        (Payload::Opacity(a), Payload::Opacity(b)) if a == b => diff_single_child(old, new),
        (Payload::Clip(a), Payload::Clip(b)) if a == b => {
            diff_single_child(old, new).clipped(a.bounding_rect())
        }
        (Payload::Blur(a), Payload::Blur(b)) if a == b => {
            diff_single_child(old, new).inflated(blur_extent(*a))
        }
        (Payload::Debug(_), Payload::Debug(_)) => diff_single_child(old, new),
        (Payload::ColorMatrix { .. }, Payload::ColorMatrix { .. })
            if old.payload() == new.payload() =>
        {
            diff_single_child(old, new)
        }
        (Payload::Mask(a), Payload::Mask(b)) if a == b => diff_pairwise(old, new),
        (Payload::Blend(a), Payload::Blend(b)) if a == b => diff_pairwise(old, new),
        (Payload::CrossFade(a), Payload::CrossFade(b)) if a == b => diff_pairwise(old, new),
        (a, b) if a.kind().is_leaf() && a == b => DamageRegion::None,
        (Payload::Repeat { .. }, Payload::Repeat { .. }) if old.structural_eq(new) => {
            DamageRegion::None
        }
        _ => impossible(old, new),
    }
}

/// Damages both nodes entirely.
fn impossible(old: &Node, new: &Node) -> DamageRegion {
    let mut damage = DamageRegion::None;
    damage.add_rect(old.bounds());
    damage.add_rect(new.bounds());
    damage
}

fn diff_single_child(old: &Node, new: &Node) -> DamageRegion {
    match (old.child(), new.child()) {
        (Some(a), Some(b)) => diff_node(a, b),
        _ => impossible(old, new),
    }
}

fn diff_pairwise(old: &Node, new: &Node) -> DamageRegion {
    let mut damage = DamageRegion::None;
    for (a, b) in old.children().iter().zip(new.children()) {
        damage.merge(&diff_node(a, b));
    }
    damage
}

/// Matches the common prefix and suffix of two child lists by identity or
/// structural equality, diffs the remaining middle pairwise and damages
/// whatever is left unpaired.
fn diff_children(old: &[Node], new: &[Node]) -> DamageRegion {
    let same = |a: &Node, b: &Node| Node::ptr_eq(a, b) || a.structural_eq(b);
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| same(a, b))
        .count();
    let (old, new) = (&old[prefix..], &new[prefix..]);
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take_while(|(a, b)| same(a, b))
        .count();
    let (old, new) = (&old[..old.len() - suffix], &new[..new.len() - suffix]);

    let mut damage = DamageRegion::None;
    for (a, b) in old.iter().zip(new) {
        damage.merge(&diff_node(a, b));
    }
    let paired = old.len().min(new.len());
    for extra in old[paired..].iter().chain(&new[paired..]) {
        damage.add_rect(extra.bounds());
    }
    damage
}
