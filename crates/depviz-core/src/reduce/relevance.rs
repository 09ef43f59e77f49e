//! Inactive-issue classification.
//!
//! An issue is *inactive* when it and everything it structurally depends on is
//! already resolved. Inactive issues are dropped from the working graph unless
//! the caller asked to see every issue.
//!
//! # Rules
//!
//! An issue is inactive iff all of:
//!
//! 1. It is done (`done` flag or status `Done`) or its status is exactly `Open`.
//! 2. None of its review requests has status `OPEN`.
//! 3. If it has `branches` or `subtasks`, every linked node (either direction)
//!    is safe: an issue is safe iff it is itself inactive, a ref is safe iff it
//!    is on the mainline (`inMaster || master`), anything else is safe.
//!
//! # Evaluation
//!
//! Rule 3 is solved as a greatest fixed point. Every issue passing rules 1
//! and 2 starts out inactive; a worklist then marks issues active while one
//! of their links is unsafe. Each issue turns active at most once, so a pass
//! is linear in the edges touched, cycles included.
//!
//! The depth cap bounds how far the dependency walk may reach. Starting from
//! an issue with dependents, linked issues are visited breadth first, and only
//! issues with dependents are expanded further. An issue that would be
//! inactive but reaches another issue more than `depth_cap` links away is
//! classified active and reported with [`Diagnostic::DepthCapReached`].
//!
//! Classification is recomputed on every call. All issues are classified
//! against the same graph before any of them is removed.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, instrument, trace};

use crate::diagnostic::Diagnostic;
use crate::graph::DepGraph;
use crate::model::{IssueData, Node, NodePayload};

/// Default recursion limit for rule 3.
pub const DEFAULT_DEPTH_CAP: usize = 20;

/// Result of a classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceOutcome {
    /// Inactive issue ids in store order.
    pub inactive: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Classify every issue in `graph` without modifying it.
#[must_use]
pub fn find_inactive_issues(graph: &DepGraph, depth_cap: usize) -> RelevanceOutcome {
    let issues: Vec<&Node> = graph.nodes().filter(|node| node.is_issue()).collect();

    let mut inactive: HashSet<&str> = issues
        .iter()
        .filter(|node| node.as_issue().is_some_and(passes_status_rules))
        .map(|node| node.id.as_str())
        .collect();
    settle(graph, &mut inactive);

    let capped: Vec<&str> = issues
        .iter()
        .filter(|node| inactive.contains(node.id.as_str()))
        .filter(|node| exceeds_depth_cap(graph, node, depth_cap))
        .map(|node| node.id.as_str())
        .collect();
    if !capped.is_empty() {
        for id in &capped {
            inactive.remove(id);
        }
        settle(graph, &mut inactive);
    }

    RelevanceOutcome {
        inactive: issues
            .iter()
            .filter(|node| inactive.contains(node.id.as_str()))
            .map(|node| node.id.clone())
            .collect(),
        diagnostics: capped
            .into_iter()
            .map(|id| Diagnostic::DepthCapReached { id: id.to_string() })
            .collect(),
    }
}

/// Classify, then remove every inactive issue.
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub fn prune_inactive_issues(graph: &mut DepGraph, depth_cap: usize) -> RelevanceOutcome {
    let outcome = find_inactive_issues(graph, depth_cap);
    for id in &outcome.inactive {
        graph.remove_node(id);
    }
    debug!(removed = outcome.inactive.len(), "inactive issues pruned");
    outcome
}

/// Rules 1 and 2.
fn passes_status_rules(issue: &IssueData) -> bool {
    (issue.is_done() || issue.is_open()) && !issue.has_open_review()
}

fn has_dependents(node: &Node) -> bool {
    node.as_issue().is_some_and(IssueData::has_dependents)
}

fn is_safe(linked: &Node, inactive: &HashSet<&str>) -> bool {
    match &linked.payload {
        NodePayload::Issue(_) => inactive.contains(linked.id.as_str()),
        NodePayload::Ref(r) => r.is_settled(),
        NodePayload::Review(_) | NodePayload::Other => true,
    }
}

/// Shrink `inactive` until every member with dependents has only safe links.
fn settle<'g>(graph: &'g DepGraph, inactive: &mut HashSet<&'g str>) {
    let mut queue: VecDeque<&'g str> = inactive.iter().copied().collect();

    while let Some(id) = queue.pop_front() {
        if !inactive.contains(id) {
            continue;
        }
        if !graph.node(id).is_some_and(has_dependents) {
            continue;
        }
        let linked = graph.neighbors_of(id);
        if linked.iter().all(|(other, _)| is_safe(other, inactive)) {
            continue;
        }

        trace!(id = %id, "issue has an unsafe link");
        inactive.remove(id);
        for (other, _) in linked {
            if inactive.contains(other.id.as_str()) {
                queue.push_back(&other.id);
            }
        }
    }
}

/// True if the dependency walk from `root` reaches an issue beyond `depth_cap` links.
fn exceeds_depth_cap<'g>(graph: &'g DepGraph, root: &'g Node, depth_cap: usize) -> bool {
    if !has_dependents(root) {
        return false;
    }

    let mut seen: HashSet<&'g str> = HashSet::from([root.id.as_str()]);
    let mut frontier: Vec<&'g Node> = vec![root];
    let mut depth = 0;

    while !frontier.is_empty() {
        depth += 1;
        let mut next = Vec::new();
        for node in frontier {
            for (other, _) in graph.neighbors_of(&node.id) {
                if !other.is_issue() || !seen.insert(other.id.as_str()) {
                    continue;
                }
                if depth > depth_cap {
                    return true;
                }
                if has_dependents(other) {
                    next.push(other);
                }
            }
        }
        frontier = next;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeRecord;
    use serde_json::{Value, json};

    fn graph(nodes: &[(&str, &str, Value)], edges: &[(&str, &str)]) -> DepGraph {
        let mut g = DepGraph::new();
        for (id, node_type, data) in nodes {
            g.add_node(Node::from_record(NodeRecord::new(*id, *node_type, data.clone())))
                .expect("add node");
        }
        for (a, b) in edges {
            g.add_edge(a, b, "link").expect("add edge");
        }
        g
    }

    fn inactive(g: &DepGraph) -> Vec<String> {
        find_inactive_issues(g, DEFAULT_DEPTH_CAP).inactive
    }

    #[test]
    fn status_rule() {
        let g = graph(
            &[
                ("done", "Issue", json!({"status": "Done"})),
                ("flag", "Issue", json!({"status": "Resolved", "done": true})),
                ("open", "Issue", json!({"status": "Open"})),
                ("wip", "Issue", json!({"status": "In Progress"})),
                ("lower", "Issue", json!({"status": "open"})),
            ],
            &[],
        );
        assert_eq!(inactive(&g), vec!["done", "flag", "open"]);
    }

    #[test]
    fn open_review_keeps_issue() {
        let g = graph(
            &[
                (
                    "a",
                    "Issue",
                    json!({"status": "Done", "pullRequests": [{"status": "MERGED"}, {"status": "OPEN"}]}),
                ),
                (
                    "b",
                    "Issue",
                    json!({"status": "Done", "pullRequests": [{"status": "DECLINED"}]}),
                ),
            ],
            &[],
        );
        assert_eq!(inactive(&g), vec!["b"]);
    }

    #[test]
    fn open_issue_with_unmerged_branch_is_active() {
        let g = graph(
            &[
                ("i", "Issue", json!({"status": "Open", "branches": []})),
                ("b", "git", json!({"subtype": "branch"})),
            ],
            &[("i", "b")],
        );
        assert!(inactive(&g).is_empty());
    }

    #[test]
    fn merged_or_mainline_refs_are_safe() {
        let g = graph(
            &[
                ("i", "Issue", json!({"status": "Done", "branches": []})),
                ("b", "git", json!({"subtype": "branch", "inMaster": true})),
                ("m", "git", json!({"subtype": "branch", "master": true})),
                ("p", "ReviewRequest", json!({"status": "OPEN"})),
            ],
            &[("i", "b"), ("m", "i"), ("i", "p")],
        );
        assert_eq!(inactive(&g), vec!["i"]);
    }

    #[test]
    fn links_ignored_without_dependents() {
        let g = graph(
            &[
                ("i", "Issue", json!({"status": "Done"})),
                ("b", "git", json!({"subtype": "branch"})),
            ],
            &[("i", "b")],
        );
        assert_eq!(inactive(&g), vec!["i"]);
    }

    #[test]
    fn linked_issue_must_be_inactive() {
        let g = graph(
            &[
                ("parent", "Issue", json!({"status": "Done", "subtasks": []})),
                ("child", "Issue", json!({"status": "In Progress"})),
            ],
            &[("parent", "child")],
        );
        assert!(inactive(&g).is_empty());
    }

    #[test]
    fn parent_link_is_not_a_dependency() {
        // child links back to parent; an inactive parent is a safe link.
        let g = graph(
            &[
                ("parent", "Issue", json!({"status": "Done", "subtasks": []})),
                ("child", "Issue", json!({"status": "Done", "branches": []})),
                ("b", "git", json!({"subtype": "branch", "inMaster": true})),
            ],
            &[("parent", "child"), ("child", "b")],
        );
        assert_eq!(inactive(&g), vec!["parent", "child"]);
    }

    #[test]
    fn cycles_terminate() {
        let g = graph(
            &[
                ("a", "Issue", json!({"status": "Done", "subtasks": []})),
                ("b", "Issue", json!({"status": "Done", "subtasks": []})),
                ("c", "Issue", json!({"status": "Done", "subtasks": []})),
            ],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("a", "a")],
        );
        assert_eq!(inactive(&g), vec!["a", "b", "c"]);
    }

    #[test]
    fn depth_cap_treats_issue_as_active() {
        // A chain of 5 issues; with cap 2 the walk from the head is cut off.
        let ids = ["i0", "i1", "i2", "i3", "i4"];
        let nodes: Vec<(&str, &str, Value)> = ids
            .iter()
            .map(|id| (*id, "Issue", json!({"status": "Done", "subtasks": []})))
            .collect();
        let edges: Vec<(&str, &str)> = ids.windows(2).map(|w| (w[0], w[1])).collect();
        let g = graph(&nodes, &edges);

        let outcome = find_inactive_issues(&g, 2);
        assert!(!outcome.inactive.contains(&"i0".to_string()));
        assert!(!outcome.diagnostics.is_empty());
        assert!(
            outcome
                .diagnostics
                .iter()
                .all(|d| matches!(d, Diagnostic::DepthCapReached { .. }))
        );

        let uncapped = find_inactive_issues(&g, DEFAULT_DEPTH_CAP);
        assert_eq!(uncapped.inactive.len(), 5);
        assert!(uncapped.diagnostics.is_empty());
    }

    fn clique(statuses: &[&str]) -> DepGraph {
        let ids: Vec<String> = (0..statuses.len()).map(|i| format!("i{i}")).collect();
        let nodes: Vec<(&str, &str, Value)> = ids
            .iter()
            .zip(statuses)
            .map(|(id, status)| (id.as_str(), "Issue", json!({"status": status, "subtasks": []})))
            .collect();
        let mut edges = Vec::new();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                edges.push((a.as_str(), b.as_str()));
            }
        }
        graph(&nodes, &edges)
    }

    #[test]
    fn resolved_clique_is_inactive() {
        let g = clique(&["Done"; 24]);
        let outcome = find_inactive_issues(&g, DEFAULT_DEPTH_CAP);
        assert_eq!(outcome.inactive.len(), 24);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn one_active_member_activates_whole_clique() {
        let mut statuses = vec!["Done"; 16];
        statuses[7] = "In Progress";
        let g = clique(&statuses);
        assert!(inactive(&g).is_empty());
    }

    #[test]
    fn activity_spreads_along_dependency_chain() {
        // a -> b -> c -> r, with r an unmerged branch.
        let g = graph(
            &[
                ("a", "Issue", json!({"status": "Done", "subtasks": []})),
                ("b", "Issue", json!({"status": "Done", "subtasks": []})),
                ("c", "Issue", json!({"status": "Done", "branches": []})),
                ("r", "git", json!({"subtype": "branch"})),
                ("d", "Issue", json!({"status": "Done"})),
            ],
            &[("a", "b"), ("b", "c"), ("c", "r"), ("d", "a")],
        );
        assert_eq!(inactive(&g), vec!["d"]);
    }

    #[test]
    fn issue_at_cap_distance_is_still_evaluated() {
        // head -> mid -> leaf; leaf is two links from head.
        let g = graph(
            &[
                ("head", "Issue", json!({"status": "Done", "subtasks": []})),
                ("mid", "Issue", json!({"status": "Done", "subtasks": []})),
                ("leaf", "Issue", json!({"status": "Done"})),
            ],
            &[("head", "mid"), ("mid", "leaf")],
        );
        let at_cap = find_inactive_issues(&g, 2);
        assert_eq!(at_cap.inactive, vec!["head", "mid", "leaf"]);
        assert!(at_cap.diagnostics.is_empty());

        // With cap 1 the leaf counts too, even though it has no dependents.
        let past_cap = find_inactive_issues(&g, 1);
        assert_eq!(
            past_cap.diagnostics,
            vec![Diagnostic::DepthCapReached { id: "head".into() }]
        );
        assert_eq!(past_cap.inactive, vec!["leaf"]);
    }

    #[test]
    fn prune_removes_after_classification() {
        let mut g = graph(
            &[
                ("a", "Issue", json!({"status": "Done", "subtasks": []})),
                ("b", "Issue", json!({"status": "Done"})),
                ("c", "git", json!({"subtype": "commit"})),
            ],
            &[("a", "b"), ("b", "c")],
        );
        let outcome = prune_inactive_issues(&mut g, DEFAULT_DEPTH_CAP);
        assert_eq!(outcome.inactive, vec!["a", "b"]);
        assert_eq!(g.node_ids(), vec!["c"]);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn idempotent() {
        let mut g = graph(
            &[
                ("a", "Issue", json!({"status": "Done"})),
                ("b", "Issue", json!({"status": "In Progress", "branches": []})),
                ("r", "git", json!({"subtype": "branch"})),
            ],
            &[("a", "b"), ("b", "r")],
        );
        prune_inactive_issues(&mut g, DEFAULT_DEPTH_CAP);
        let second = prune_inactive_issues(&mut g, DEFAULT_DEPTH_CAP);
        assert!(second.inactive.is_empty());
    }
}
