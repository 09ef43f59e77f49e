//! Orphan pruning: drop nodes with no incident edges.
//!
//! A single pass is enough. Removing an isolated node removes no edges, so it
//! cannot isolate anything else.

use tracing::{debug, instrument};

use crate::graph::DepGraph;

/// Ids of nodes with zero incident edges, in store order.
#[must_use]
pub fn find_orphans(graph: &DepGraph) -> Vec<String> {
    graph
        .nodes()
        .filter(|node| graph.degree(&node.id) == 0)
        .map(|node| node.id.clone())
        .collect()
}

/// Remove every orphan and return the removed ids.
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn prune_orphans(graph: &mut DepGraph) -> Vec<String> {
    let orphans = find_orphans(graph);
    for id in &orphans {
        graph.remove_node(id);
    }
    debug!(removed = orphans.len(), "orphans pruned");
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeRecord};
    use serde_json::json;

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> DepGraph {
        let mut g = DepGraph::new();
        for id in ids {
            g.add_node(Node::from_record(NodeRecord::new(*id, "git", json!({}))))
                .expect("add node");
        }
        for (a, b) in edges {
            g.add_edge(a, b, "1").expect("add edge");
        }
        g
    }

    #[test]
    fn removes_only_isolated_nodes() {
        let mut g = graph(&["a", "b", "lonely", "c"], &[("a", "b")]);
        assert_eq!(prune_orphans(&mut g), vec!["lonely", "c"]);
        assert_eq!(g.node_ids(), vec!["a", "b"]);
    }

    #[test]
    fn self_loop_is_not_an_orphan() {
        let mut g = graph(&["a"], &[("a", "a")]);
        assert!(prune_orphans(&mut g).is_empty());
    }

    #[test]
    fn second_pass_removes_nothing() {
        let mut g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("c", "c")]);
        prune_orphans(&mut g);
        assert!(prune_orphans(&mut g).is_empty());
    }

    #[test]
    fn empty_graph() {
        let mut g = DepGraph::new();
        assert!(prune_orphans(&mut g).is_empty());
    }
}
