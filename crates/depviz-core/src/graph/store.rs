//! Mutable directed multigraph keyed by node id.
//!
//! # Overview
//!
//! [`DepGraph`] is the working store every reduction stage mutates. It wraps a
//! [`petgraph`] `StableDiGraph` so node indices stay valid across removals, and
//! keeps an id → index map for string lookups.
//!
//! ## Invariants
//!
//! - Every edge's endpoints are present. [`DepGraph::add_edge`] rejects unknown
//!   endpoints and [`DepGraph::remove_node`] drops incident edges with the node.
//! - Parallel edges are allowed. A self-loop is reported once by
//!   [`DepGraph::edges_of`] and [`DepGraph::neighbors_of`], and is classified
//!   as inbound by [`DepGraph::inbound_edges`].
//! - Iteration follows index order. Removals never reorder the survivors, so
//!   every stage that scans the store is deterministic for a given snapshot.
//!   Slots freed by removals are reused by later insertions.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::error::GraphError;
use crate::model::{EdgeRecord, Node};

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// A stored edge. `label` is the relation name or an accumulated commit count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

impl Edge {
    /// Numeric value of the label, see [`label_weight`].
    #[must_use]
    pub fn weight(&self) -> u64 {
        label_weight(&self.label)
    }

    /// The endpoint opposite `id`.
    #[must_use]
    pub fn other_end(&self, id: &str) -> &str {
        if self.source == id {
            &self.target
        } else {
            &self.source
        }
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    #[must_use]
    pub fn to_record(&self) -> EdgeRecord {
        EdgeRecord::new(&self.source, &self.target, &self.label)
    }
}

/// Parse an edge label as a commit count. Missing or non-numeric labels are 0.
#[must_use]
pub fn label_weight(label: &str) -> u64 {
    label.trim().parse().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// DepGraph
// ---------------------------------------------------------------------------

/// The mutable graph store.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    graph: StableDiGraph<Node, Edge>,
    index: HashMap<String, NodeIndex>,
    next_edge_seq: u64,
}

impl DepGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if the id is already present.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, GraphError> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Insert an edge and return its generated id.
    ///
    /// The id is derived from the endpoints and a per-graph sequence number,
    /// so parallel edges between the same pair stay distinguishable.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] if either endpoint is absent.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        label: impl Into<String>,
    ) -> Result<String, GraphError> {
        let src = self
            .index_of(source)
            .ok_or_else(|| GraphError::UnknownNode(source.to_string()))?;
        let dst = self
            .index_of(target)
            .ok_or_else(|| GraphError::UnknownNode(target.to_string()))?;

        let id = format!("{source}->{target}#{}", self.next_edge_seq);
        self.next_edge_seq += 1;

        self.graph.add_edge(
            src,
            dst,
            Edge {
                id: id.clone(),
                source: source.to_string(),
                target: target.to_string(),
                label: label.into(),
            },
        );
        Ok(id)
    }

    /// Remove a node and every edge touching it. Unknown ids are a no-op.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.index.remove(id)?;
        self.graph.remove_node(idx)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).and_then(|idx| self.graph.node_weight(idx))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx))
    }

    /// All edges in index order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.graph
            .edge_indices()
            .filter_map(move |idx| self.graph.edge_weight(idx))
    }

    /// Snapshot of the current node ids, for loops that mutate the store.
    #[must_use]
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes().map(|n| n.id.clone()).collect()
    }

    /// Every edge touching `id`, in either direction. Self-loops appear once.
    #[must_use]
    pub fn edges_of(&self, id: &str) -> Vec<&Edge> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        self.incident(idx).collect()
    }

    /// Every `(neighbor, edge)` pair touching `id`, in either direction.
    #[must_use]
    pub fn neighbors_of(&self, id: &str) -> Vec<(&Node, &Edge)> {
        self.edges_of(id)
            .into_iter()
            .filter_map(|edge| self.node(edge.other_end(id)).map(|node| (node, edge)))
            .collect()
    }

    /// Edges ending at `id`, including self-loops.
    #[must_use]
    pub fn inbound_edges(&self, id: &str) -> Vec<&Edge> {
        self.edges_of(id)
            .into_iter()
            .filter(|edge| edge.target == id)
            .collect()
    }

    /// Edges starting at `id`, excluding self-loops.
    #[must_use]
    pub fn outbound_edges(&self, id: &str) -> Vec<&Edge> {
        self.edges_of(id)
            .into_iter()
            .filter(|edge| edge.target != id)
            .collect()
    }

    /// Number of incident edges (self-loops count once).
    #[must_use]
    pub fn degree(&self, id: &str) -> usize {
        self.index_of(id).map_or(0, |idx| self.incident(idx).count())
    }

    // -- crate-internal index access -----------------------------------------

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(idx)
    }

    /// Adjacent node indices ignoring direction. May repeat for parallel edges.
    pub(crate) fn adjacent(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_undirected(idx)
    }

    fn incident(&self, idx: NodeIndex) -> impl Iterator<Item = &Edge> + '_ {
        let outgoing = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.weight());
        let incoming = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.weight())
            .filter(|edge| !edge.is_self_loop());
        outgoing.chain(incoming)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
