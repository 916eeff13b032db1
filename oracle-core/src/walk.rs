//! The Walker (spec.md §4.C): a DFS over the DAG that visits each distinct
//! node exactly once, regardless of how many parents share it.
//!
//! Node identity is [`Node::ptr_id`], not structural equality — two leaves
//! declaring the same `OriginPair` but built separately are distinct nodes
//! to the Walker.

use std::collections::HashSet;

use crate::node::{Node, OriginLeaf};
use std::sync::Arc;

/// Visit every distinct node reachable from `roots`, once each, in
/// post-order (children before parents) so callers can fold bottom-up.
pub fn post_order(roots: &[Node]) -> Vec<Node> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for root in roots {
        visit(root, &mut seen, &mut out);
    }
    out
}

fn visit(node: &Node, seen: &mut HashSet<usize>, out: &mut Vec<Node>) {
    if !seen.insert(node.ptr_id()) {
        return;
    }
    for child in node.children() {
        visit(&child, seen, out);
    }
    out.push(node.clone());
}

/// Collect every distinct `OriginLeaf` reachable from `roots`, in the order
/// first encountered. Used by the Feeder to plan a fetch batch.
#[must_use]
pub fn leaves(roots: &[Node]) -> Vec<Arc<OriginLeaf>> {
    post_order(roots)
        .into_iter()
        .filter_map(|n| n.as_origin_leaf().cloned())
        .collect()
}
