//! Visibility filtering and working-graph construction.
//!
//! # Overview
//!
//! Builds the initial [`DepGraph`] from a [`Snapshot`]: each node is checked
//! against the [`ViewOptions`] independently, and an edge is added only when
//! both of its endpoints were kept.
//!
//! ## Exclusion priority
//!
//! The first matching rule wins and is recorded as the node's [`Exclusion`]:
//!
//! 1. Issue, unless `show_issues`.
//! 2. Version-control ref, unless `show_refs`.
//! 3. Merged ref that is not a merge base, unless `show_merged_refs`.
//! 4. Conflict ref, unless `show_conflicts`.
//! 5. Review request, unless `show_review_requests`.
//!
//! Nodes of unknown kind are always kept.
//!
//! ## Incidence index
//!
//! [`IncidenceIndex`] is built from the full, unfiltered node and edge lists.
//! It lets the interactive reveal step bring a hidden neighbor back without
//! rebuilding the graph.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::diagnostic::Diagnostic;
use crate::graph::DepGraph;
use crate::model::{EdgeRecord, Node, NodePayload};
use crate::options::ViewOptions;
use crate::snapshot::Snapshot;

// ---------------------------------------------------------------------------
// Exclusion
// ---------------------------------------------------------------------------

/// Why a node was left out of the working graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    IssuesHidden,
    RefsHidden,
    MergedRefHidden,
    ConflictHidden,
    ReviewsHidden,
}

/// Decide whether `node` is hidden under `options`.
#[must_use]
pub fn exclusion_for(node: &Node, options: &ViewOptions) -> Option<Exclusion> {
    match &node.payload {
        NodePayload::Issue(_) if !options.show_issues => Some(Exclusion::IssuesHidden),
        NodePayload::Ref(_) if !options.show_refs => Some(Exclusion::RefsHidden),
        NodePayload::Ref(r) if r.is_merged() && !options.show_merged_refs => {
            Some(Exclusion::MergedRefHidden)
        }
        NodePayload::Ref(r) if r.is_conflict() && !options.show_conflicts => {
            Some(Exclusion::ConflictHidden)
        }
        NodePayload::Review(_) if !options.show_review_requests => Some(Exclusion::ReviewsHidden),
        NodePayload::Issue(_) | NodePayload::Ref(_) | NodePayload::Review(_) | NodePayload::Other => {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// IncidenceIndex
// ---------------------------------------------------------------------------

/// Every node and every edge record of the snapshot, keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct IncidenceIndex {
    nodes: HashMap<String, Node>,
    edges: HashMap<String, Vec<EdgeRecord>>,
}

impl IncidenceIndex {
    /// The full node as decoded from the snapshot.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Every snapshot edge touching `id`. Self-loops appear once.
    #[must_use]
    pub fn edges_of(&self, id: &str) -> &[EdgeRecord] {
        self.edges.get(id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert_edge(&mut self, record: &EdgeRecord) {
        self.edges
            .entry(record.source.clone())
            .or_default()
            .push(record.clone());
        if record.target != record.source {
            self.edges
                .entry(record.target.clone())
                .or_default()
                .push(record.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Output of [`build_working_graph`].
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub graph: DepGraph,
    pub incidence: IncidenceIndex,
    /// Hidden node ids and the rule that hid them.
    pub excluded: BTreeMap<String, Exclusion>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode the snapshot, apply the visibility rules and build the working graph.
///
/// Duplicate node ids keep their first record. Edges naming an unknown node
/// are dropped and reported; they never reach the graph or the index.
#[instrument(skip_all, fields(nodes = snapshot.nodes.len(), edges = snapshot.edges.len()))]
pub fn build_working_graph(snapshot: &Snapshot, options: &ViewOptions) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for record in &snapshot.nodes {
        if outcome.incidence.nodes.contains_key(&record.id) {
            warn!(id = %record.id, "duplicate node id ignored");
            outcome.diagnostics.push(Diagnostic::DuplicateNode {
                id: record.id.clone(),
            });
            continue;
        }

        let node = match NodePayload::decode(record) {
            Ok(payload) => Node::with_payload(record.clone(), payload),
            Err(err) => {
                warn!(id = %record.id, error = %err, "malformed node data, using defaults");
                outcome.diagnostics.push(Diagnostic::MalformedAttributes {
                    id: record.id.clone(),
                    reason: err.to_string(),
                });
                Node::from_record(record.clone())
            }
        };

        if let Some(reason) = exclusion_for(&node, options) {
            outcome.excluded.insert(node.id.clone(), reason);
        } else if let Err(err) = outcome.graph.add_node(node.clone()) {
            // Unreachable while the duplicate check above holds.
            warn!(error = %err, "node insert failed");
        }
        outcome.incidence.nodes.insert(node.id.clone(), node);
    }

    for record in &snapshot.edges {
        let missing = [&record.source, &record.target]
            .into_iter()
            .find(|id| !outcome.incidence.nodes.contains_key(id.as_str()));
        if let Some(missing) = missing {
            warn!(source = %record.source, target = %record.target, "edge references unknown node");
            outcome.diagnostics.push(Diagnostic::DanglingEdge {
                source: record.source.clone(),
                target: record.target.clone(),
                missing: missing.clone(),
            });
            continue;
        }

        outcome.incidence.insert_edge(record);

        if outcome.graph.contains(&record.source) && outcome.graph.contains(&record.target) {
            // Both endpoints are present, so this cannot fail.
            let _ = outcome
                .graph
                .add_edge(&record.source, &record.target, record.edge_type.as_str());
        }
    }

    debug!(
        kept = outcome.graph.node_count(),
        hidden = outcome.excluded.len(),
        edges = outcome.graph.edge_count(),
        "working graph built"
    );
    outcome
}
