//! Interactive reveal and hide of linked issues.
//!
//! When issues are hidden, a viewer can select a displayed node to bring back
//! the issues linked to it in the snapshot, and select it again to hide every
//! issue linked to it. [`Expansion`] remembers which nodes are selected.
//!
//! Only the store contract is used: nodes and edges come from the
//! [`IncidenceIndex`] built when the working graph was filtered.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::graph::DepGraph;
use crate::reduce::filter::IncidenceIndex;

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// The node was selected; these issue ids were added.
    Revealed(Vec<String>),
    /// The node was deselected; these issue ids (sorted) were removed.
    Hidden(Vec<String>),
    /// The node is not displayed; nothing changed.
    Ignored,
}

impl Toggle {
    /// Ids added or removed by the toggle.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        match self {
            Self::Revealed(ids) | Self::Hidden(ids) => ids,
            Self::Ignored => &[],
        }
    }
}

/// Selection state for reveal toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    selected: BTreeSet<String>,
}

impl Expansion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected node ids in sorted order.
    pub fn expanded(&self) -> impl Iterator<Item = &str> + '_ {
        self.selected.iter().map(String::as_str)
    }

    /// Flip the selection of `id`, revealing or hiding its linked issues.
    #[instrument(skip(self, graph, incidence))]
    pub fn toggle(&mut self, graph: &mut DepGraph, incidence: &IncidenceIndex, id: &str) -> Toggle {
        if !graph.contains(id) {
            return Toggle::Ignored;
        }

        if self.selected.remove(id) {
            let hidden = hide_linked_issues(graph, id);
            debug!(count = hidden.len(), "linked issues hidden");
            Toggle::Hidden(hidden)
        } else {
            self.selected.insert(id.to_string());
            let revealed = reveal_linked_issues(graph, incidence, id);
            debug!(count = revealed.len(), "linked issues revealed");
            Toggle::Revealed(revealed)
        }
    }
}

fn reveal_linked_issues(graph: &mut DepGraph, incidence: &IncidenceIndex, id: &str) -> Vec<String> {
    let mut revealed = Vec::new();
    for edge in incidence.edges_of(id) {
        let Some(other_id) = edge.other_end(id) else {
            continue;
        };
        if graph.contains(other_id) {
            continue;
        }
        let Some(node) = incidence.node(other_id).filter(|n| n.is_issue()) else {
            continue;
        };
        if graph.add_node(node.clone()).is_ok() {
            // Both endpoints are now displayed.
            let _ = graph.add_edge(&edge.source, &edge.target, edge.edge_type.as_str());
            revealed.push(other_id.to_string());
        }
    }
    revealed
}

fn hide_linked_issues(graph: &mut DepGraph, id: &str) -> Vec<String> {
    let linked: BTreeSet<String> = graph
        .neighbors_of(id)
        .into_iter()
        .filter(|(node, _)| node.is_issue() && node.id != id)
        .map(|(node, _)| node.id.clone())
        .collect();
    for issue in &linked {
        graph.remove_node(issue);
    }
    linked.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeRecord, NodeRecord};
    use crate::options::ViewOptions;
    use crate::reduce::filter::build_working_graph;
    use crate::snapshot::Snapshot;
    use serde_json::json;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                NodeRecord::new("b", "git", json!({"subtype": "branch"})),
                NodeRecord::new("c", "git", json!({"subtype": "branch"})),
                NodeRecord::new("i1", "Issue", json!({"status": "Open"})),
                NodeRecord::new("i2", "JIRA", json!({"status": "Done"})),
                NodeRecord::new("p", "ReviewRequest", json!({})),
            ],
            vec![
                EdgeRecord::new("i1", "b", "branch"),
                EdgeRecord::new("b", "i2", "branch"),
                EdgeRecord::new("i2", "b", "branch"),
                EdgeRecord::new("p", "b", "review"),
                EdgeRecord::new("b", "c", "1"),
            ],
        )
    }

    #[test]
    fn toggle_reveals_then_hides_issues() {
        let outcome = build_working_graph(&snapshot(), &ViewOptions::from_flags(["refs"]));
        let (mut graph, incidence) = (outcome.graph, outcome.incidence);
        let mut expansion = Expansion::new();

        let revealed = expansion.toggle(&mut graph, &incidence, "b");
        assert_eq!(revealed, Toggle::Revealed(vec!["i1".into(), "i2".into()]));
        assert!(expansion.is_expanded("b"));
        assert!(graph.contains("i1") && graph.contains("i2"));
        // Review requests stay hidden; the parallel edge to i2 is not duplicated.
        assert!(!graph.contains("p"));
        assert_eq!(graph.edge_count(), 3);

        let hidden = expansion.toggle(&mut graph, &incidence, "b");
        assert_eq!(hidden, Toggle::Hidden(vec!["i1".into(), "i2".into()]));
        assert!(!expansion.is_expanded("b"));
        assert_eq!(graph.node_ids(), vec!["b", "c"]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn toggle_on_hidden_node_is_ignored() {
        let outcome = build_working_graph(&snapshot(), &ViewOptions::from_flags(["refs"]));
        let (mut graph, incidence) = (outcome.graph, outcome.incidence);
        let mut expansion = Expansion::new();

        assert_eq!(expansion.toggle(&mut graph, &incidence, "p"), Toggle::Ignored);
        assert_eq!(expansion.toggle(&mut graph, &incidence, "nope"), Toggle::Ignored);
        assert_eq!(expansion.expanded().count(), 0);
        assert!(Toggle::Ignored.ids().is_empty());
    }

    #[test]
    fn node_without_issue_links_reveals_nothing() {
        let outcome = build_working_graph(&snapshot(), &ViewOptions::from_flags(["refs"]));
        let (mut graph, incidence) = (outcome.graph, outcome.incidence);
        let mut expansion = Expansion::new();

        assert_eq!(
            expansion.toggle(&mut graph, &incidence, "c"),
            Toggle::Revealed(vec![])
        );
        assert_eq!(graph.node_count(), 2);
    }
}
