//! The reduction pipeline: filter, relevance, orphans, collapse.
//!
//! [`reduce`] never fails. Everything it skipped or guessed about is listed in
//! [`ReductionReport::diagnostics`], and the caller always gets a graph back.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::diagnostic::Diagnostic;
use crate::graph::DepGraph;
use crate::options::ViewOptions;
use crate::reduce::collapse::collapse_chains;
use crate::reduce::filter::{Exclusion, IncidenceIndex, build_working_graph};
use crate::reduce::orphans::prune_orphans;
use crate::reduce::relevance::{DEFAULT_DEPTH_CAP, prune_inactive_issues};
use crate::snapshot::Snapshot;
use crate::timing::timed;

/// Tunables that are not visibility switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceSettings {
    pub depth_cap: usize,
}

impl Default for ReduceSettings {
    fn default() -> Self {
        Self {
            depth_cap: DEFAULT_DEPTH_CAP,
        }
    }
}

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Filter,
    Relevance,
    Orphans,
    Collapse,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Relevance => "relevance",
            Self::Orphans => "orphans",
            Self::Collapse => "collapse",
        }
    }
}

/// Node and edge counts around one stage. Skipped stages are not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub stage: Stage,
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub edges_after: usize,
}

/// Everything a reduction decided, for display and debugging.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReductionReport {
    pub options: ViewOptions,
    pub diagnostics: Vec<Diagnostic>,
    /// Hidden by the visibility filter.
    pub excluded: BTreeMap<String, Exclusion>,
    /// Removed as inactive issues.
    pub inactive: Vec<String>,
    /// Removed as orphans.
    pub orphans: Vec<String>,
    /// Commits folded away, in order.
    pub collapsed: Vec<String>,
    pub collapse_passes: usize,
    pub stages: Vec<StageSummary>,
    pub content_hash: String,
}

/// The reduced graph, the full incidence index and the report.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub graph: DepGraph,
    pub incidence: IncidenceIndex,
    pub report: ReductionReport,
}

/// Run every enabled stage over `snapshot`.
#[instrument(skip_all, fields(nodes = snapshot.nodes.len(), edges = snapshot.edges.len()))]
pub fn reduce(snapshot: &Snapshot, options: &ViewOptions, settings: &ReduceSettings) -> Reduction {
    let mut report = ReductionReport {
        options: *options,
        content_hash: snapshot.content_hash(),
        ..ReductionReport::default()
    };

    let filtered = timed(Stage::Filter.as_str(), || {
        build_working_graph(snapshot, options)
    });
    let mut graph = filtered.graph;
    report.stages.push(StageSummary {
        stage: Stage::Filter,
        nodes_before: snapshot.nodes.len(),
        nodes_after: graph.node_count(),
        edges_after: graph.edge_count(),
    });
    report.diagnostics.extend(filtered.diagnostics);
    report.excluded = filtered.excluded;

    if !options.show_all_issues {
        let before = graph.node_count();
        let outcome = timed(Stage::Relevance.as_str(), || {
            prune_inactive_issues(&mut graph, settings.depth_cap)
        });
        report.stages.push(summary(Stage::Relevance, before, &graph));
        report.inactive = outcome.inactive;
        report.diagnostics.extend(outcome.diagnostics);
    }

    if options.hide_orphans {
        let before = graph.node_count();
        report.orphans = timed(Stage::Orphans.as_str(), || prune_orphans(&mut graph));
        report.stages.push(summary(Stage::Orphans, before, &graph));
    }

    let before = graph.node_count();
    let collapsed = timed(Stage::Collapse.as_str(), || collapse_chains(&mut graph));
    report.stages.push(summary(Stage::Collapse, before, &graph));
    report.collapsed = collapsed.collapsed.iter().map(|c| c.id().to_string()).collect();
    report.collapse_passes = collapsed.passes;

    for diagnostic in &report.diagnostics {
        warn!(%diagnostic, "reduction diagnostic");
    }
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        diagnostics = report.diagnostics.len(),
        "reduction complete"
    );

    Reduction {
        graph,
        incidence: filtered.incidence,
        report,
    }
}

/// [`reduce`] with options given as string flags.
///
/// Unrecognized flags become [`Diagnostic::UnknownOption`] entries.
pub fn reduce_with_flags<I, S>(snapshot: &Snapshot, flags: I, settings: &ReduceSettings) -> Reduction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parsed = ViewOptions::parse(flags);
    let mut reduction = reduce(snapshot, &parsed.options, settings);
    let mut diagnostics: Vec<Diagnostic> = parsed
        .unknown
        .into_iter()
        .map(|flag| Diagnostic::UnknownOption { flag })
        .collect();
    for diagnostic in &diagnostics {
        warn!(%diagnostic, "reduction diagnostic");
    }
    diagnostics.append(&mut reduction.report.diagnostics);
    reduction.report.diagnostics = diagnostics;
    reduction
}

fn summary(stage: Stage, nodes_before: usize, graph: &DepGraph) -> StageSummary {
    StageSummary {
        stage,
        nodes_before,
        nodes_after: graph.node_count(),
        edges_after: graph.edge_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeRecord, NodeRecord};
    use serde_json::json;

    fn chain_snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                NodeRecord::new("i1", "Issue", json!({"status": "Done"})),
                NodeRecord::new("c1", "VersionControlRef", json!({"subtype": "commit"})),
                NodeRecord::new("c2", "VersionControlRef", json!({"subtype": "commit"})),
                NodeRecord::new("c3", "VersionControlRef", json!({"subtype": "commit"})),
            ],
            vec![
                EdgeRecord::new("c1", "c2", "1"),
                EdgeRecord::new("c2", "c3", "1"),
            ],
        )
    }

    #[test]
    fn commit_chain_scenario() {
        let r = reduce_with_flags(&chain_snapshot(), ["refs"], &ReduceSettings::default());
        assert_eq!(r.graph.node_ids(), vec!["c1", "c3"]);
        let edges: Vec<_> = r
            .graph
            .edges()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.label.as_str()))
            .collect();
        assert_eq!(edges, vec![("c1", "c3", "2")]);
        assert!(!r.graph.contains("i1"));
        assert_eq!(r.report.collapsed, vec!["c2"]);
        assert_eq!(r.report.excluded["i1"], Exclusion::IssuesHidden);
        assert!(r.report.diagnostics.is_empty());
    }

    #[test]
    fn stage_summaries_follow_enabled_stages() {
        let r = reduce_with_flags(&chain_snapshot(), ["refs"], &ReduceSettings::default());
        let stages: Vec<Stage> = r.report.stages.iter().map(|s| s.stage).collect();
        assert_eq!(stages, vec![Stage::Filter, Stage::Relevance, Stage::Collapse]);
        assert_eq!(r.report.stages[0].nodes_before, 4);
        assert_eq!(r.report.stages[0].nodes_after, 3);

        let all = reduce(&chain_snapshot(), &ViewOptions::all(), &ReduceSettings::default());
        let stages: Vec<Stage> = all.report.stages.iter().map(|s| s.stage).collect();
        assert_eq!(stages, vec![Stage::Filter, Stage::Orphans, Stage::Collapse]);
        assert_eq!(all.report.orphans, vec!["i1"]);
    }

    #[test]
    fn unknown_flags_reported_first() {
        let r = reduce_with_flags(&chain_snapshot(), ["refs", "glitter"], &ReduceSettings::default());
        assert_eq!(
            r.report.diagnostics.first(),
            Some(&Diagnostic::UnknownOption {
                flag: "glitter".into()
            })
        );
    }

    #[test]
    fn dangling_input_still_reduces() {
        let mut snap = chain_snapshot();
        snap.edges.push(EdgeRecord::new("c3", "ghost", "1"));
        let r = reduce_with_flags(&snap, ["refs"], &ReduceSettings::default());
        assert_eq!(r.graph.node_count(), 2);
        assert!(crate::diagnostic::has_errors(&r.report.diagnostics));
    }

    #[test]
    fn report_carries_content_hash() {
        let snap = chain_snapshot();
        let r = reduce(&snap, &ViewOptions::default(), &ReduceSettings::default());
        assert_eq!(r.report.content_hash, snap.content_hash());
    }
}
