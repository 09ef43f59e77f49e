//! Summary statistics over a [`DepGraph`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::store::DepGraph;
use crate::model::NodeKind;

/// Node/edge counts for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Node count per kind, keyed by [`NodeKind::as_str`].
    pub nodes_by_kind: BTreeMap<&'static str, usize>,
    /// Commit-subtype refs still present.
    pub commit_count: usize,
    /// Nodes with no incident edges.
    pub isolated_count: usize,
}

impl GraphStats {
    #[must_use]
    pub fn from_graph(graph: &DepGraph) -> Self {
        let mut nodes_by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut commit_count = 0;
        let mut isolated_count = 0;

        for node in graph.nodes() {
            *nodes_by_kind.entry(node.kind.as_str()).or_default() += 1;
            if node.is_commit() {
                commit_count += 1;
            }
            if graph.degree(&node.id) == 0 {
                isolated_count += 1;
            }
        }

        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            nodes_by_kind,
            commit_count,
            isolated_count,
        }
    }

    #[must_use]
    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.nodes_by_kind.get(kind.as_str()).copied().unwrap_or(0)
    }
}
