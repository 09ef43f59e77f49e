//! Commit-chain collapsing.
//!
//! Intermediate commits carry little information in the diagram. This stage
//! folds them into summarizing edges while keeping every remaining pair of
//! nodes as connected as before.
//!
//! # Algorithm
//!
//! Commits are scanned in store order. Each commit's incident edges are split
//! into inbound (target is the commit, self-loops included) and outbound.
//!
//! - **Root commit** (no inbound edges): removed if its distinct outbound
//!   neighbors are still mutually connected through history with the commit
//!   excluded. A commit with no edges at all qualifies. A root with exactly
//!   one child is kept so that a chain still has a commit to end on.
//! - **Pass-through commit** (exactly one inbound and one outbound edge): the
//!   two edges are replaced by one edge from the inbound source to the
//!   outbound target, labelled with the sum of both commit counts.
//! - Anything else is left alone.
//!
//! After each collapse the scan restarts from the first node. The loop ends
//! when a full scan collapses nothing. Every collapse removes a node, so the
//! number of passes is bounded by the node count.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::graph::{DepGraph, Edge, mutually_connected};

/// How a commit was collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collapse {
    /// A root commit whose children, if any, stay connected without it.
    Root { id: String },
    /// A pass-through commit replaced by a summarizing edge.
    PassThrough {
        id: String,
        source: String,
        target: String,
        label: String,
    },
}

impl Collapse {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Root { id } | Self::PassThrough { id, .. } => id,
        }
    }
}

/// Result of [`collapse_chains`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseOutcome {
    /// Collapses in the order they were applied.
    pub collapsed: Vec<Collapse>,
    /// Number of scans, including the final scan that changed nothing.
    pub passes: usize,
}

impl CollapseOutcome {
    /// Ids of the removed commits.
    #[must_use]
    pub fn removed(&self) -> Vec<String> {
        self.collapsed.iter().map(|c| c.id().to_string()).collect()
    }
}

/// Collapse commit chains until nothing changes.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn collapse_chains(graph: &mut DepGraph) -> CollapseOutcome {
    let mut outcome = CollapseOutcome::default();

    let mut changed = true;
    while changed {
        outcome.passes += 1;
        changed = match find_collapse(graph) {
            Some(collapse) => {
                apply(graph, &collapse);
                trace!(?collapse, "collapsed");
                outcome.collapsed.push(collapse);
                true
            }
            None => false,
        };
    }

    debug!(
        removed = outcome.collapsed.len(),
        passes = outcome.passes,
        "commit chains collapsed"
    );
    outcome
}

/// First collapsible commit in store order.
fn find_collapse(graph: &DepGraph) -> Option<Collapse> {
    graph
        .nodes()
        .filter(|node| node.is_commit())
        .find_map(|node| classify(graph, &node.id))
}

fn classify(graph: &DepGraph, id: &str) -> Option<Collapse> {
    let (inbound, outbound): (Vec<&Edge>, Vec<&Edge>) =
        graph.edges_of(id).into_iter().partition(|e| e.target == id);

    match (inbound.as_slice(), outbound.as_slice()) {
        ([], outs) => {
            let mut children: Vec<&str> = Vec::with_capacity(outs.len());
            for edge in outs {
                if !children.contains(&edge.target.as_str()) {
                    children.push(&edge.target);
                }
            }
            let excluded: HashSet<&str> = HashSet::from([id]);
            (children.len() != 1 && mutually_connected(graph, &children, &excluded))
                .then(|| Collapse::Root { id: id.to_string() })
        }
        ([into], [out_of]) if into.source != id => Some(Collapse::PassThrough {
            id: id.to_string(),
            source: into.source.clone(),
            target: out_of.target.clone(),
            label: into.weight().saturating_add(out_of.weight()).to_string(),
        }),
        _ => None,
    }
}

fn apply(graph: &mut DepGraph, collapse: &Collapse) {
    if let Collapse::PassThrough {
        source,
        target,
        label,
        ..
    } = collapse
    {
        // Both endpoints are neighbors of the collapsing node, so they exist.
        let _ = graph.add_edge(source, target, label.as_str());
    }
    graph.remove_node(collapse.id());
}
