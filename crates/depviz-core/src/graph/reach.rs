//! Reachability through version-control history under node exclusion.
//!
//! Used by the chain collapser to decide whether a root commit carries any
//! path information its children do not already share.
//!
//! # Traversal rules
//!
//! - Edges are followed in both directions.
//! - Only non-conflict version-control refs (branches, commits) are valid
//!   hops. Conflict markers, issues and review requests are never stepped
//!   onto, so a target of one of those kinds is unreachable.
//! - Nodes in the exclusion set are never entered. The two endpoints of a
//!   query are never treated as excluded.
//!
//! The search is an explicit-stack DFS with a visited set, so deep histories
//! cannot exhaust the call stack and cycles terminate.

use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;

use crate::graph::store::DepGraph;

/// True iff a path joins `a` and `b` without passing through `excluded`.
///
/// Unknown ids are never connected.
#[must_use]
pub fn connected(graph: &DepGraph, a: &str, b: &str, excluded: &HashSet<&str>) -> bool {
    let (Some(start), Some(goal)) = (graph.index_of(a), graph.index_of(b)) else {
        return false;
    };

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(current) = stack.pop() {
        for next in graph.adjacent(current) {
            let Some(node) = graph.node_at(next) else {
                continue;
            };
            if !node.is_history_hop() {
                continue;
            }
            if next == goal {
                return true;
            }
            if excluded.contains(node.id.as_str()) {
                continue;
            }
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }

    false
}

/// True iff every pair in `ids` is [`connected`] under the same exclusion set.
///
/// Vacuously true for zero or one id.
#[must_use]
pub fn mutually_connected(graph: &DepGraph, ids: &[&str], excluded: &HashSet<&str>) -> bool {
    ids.iter().enumerate().all(|(i, a)| {
        ids[i + 1..]
            .iter()
            .all(|b| connected(graph, a, b, excluded))
    })
}
