//! `depviz stats`: per-stage counts for a reduction.

use std::io::{self, Write};

use clap::Args;
use depviz_core::GraphStats;
use depviz_core::config::DepvizConfig;
use depviz_core::reduce::StageSummary;
use serde::Serialize;

use super::{InputArgs, load_and_reduce};
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `depviz stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Report payload for `depviz stats`.
#[derive(Debug, Serialize)]
pub struct ReductionStats {
    pub input_nodes: usize,
    pub input_edges: usize,
    pub content_hash: String,
    pub stages: Vec<StageSummary>,
    pub collapse_passes: usize,
    pub diagnostics: usize,
    pub result: GraphStats,
}

/// Execute `depviz stats`.
pub fn run_stats(args: &StatsArgs, output: OutputMode, config: &DepvizConfig) -> anyhow::Result<()> {
    let (snapshot, reduction) = load_and_reduce(&args.input, config, output)?;
    let payload = ReductionStats {
        input_nodes: snapshot.nodes.len(),
        input_edges: snapshot.edges.len(),
        content_hash: reduction.report.content_hash.clone(),
        stages: reduction.report.stages.clone(),
        collapse_passes: reduction.report.collapse_passes,
        diagnostics: reduction.report.diagnostics.len(),
        result: GraphStats::from_graph(&reduction.graph),
    };

    render_mode(output, &payload, render_stats_text, render_stats_pretty)
}

fn render_stats_text(stats: &ReductionStats, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "input\t{}\t{}", stats.input_nodes, stats.input_edges)?;
    for s in &stats.stages {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            s.stage.as_str(),
            s.nodes_before,
            s.nodes_after,
            s.edges_after
        )?;
    }
    writeln!(
        w,
        "result\t{}\t{}",
        stats.result.node_count, stats.result.edge_count
    )
}

fn render_stats_pretty(stats: &ReductionStats, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Reduction stats")?;
    pretty_kv(
        w,
        "Input",
        format!("{} nodes, {} edges", stats.input_nodes, stats.input_edges),
    )?;
    pretty_kv(w, "Content hash", &stats.content_hash)?;
    pretty_kv(w, "Diagnostics", stats.diagnostics.to_string())?;
    writeln!(w)?;

    writeln!(w, "{:<12} {:>8} {:>8} {:>8}", "stage", "before", "after", "edges")?;
    pretty_rule(w)?;
    for s in &stats.stages {
        writeln!(
            w,
            "{:<12} {:>8} {:>8} {:>8}",
            s.stage.as_str(),
            s.nodes_before,
            s.nodes_after,
            s.edges_after
        )?;
    }
    writeln!(w)?;

    let result = &stats.result;
    pretty_section(w, "Result")?;
    pretty_kv(w, "Nodes", result.node_count.to_string())?;
    pretty_kv(w, "Edges", result.edge_count.to_string())?;
    for (kind, count) in &result.nodes_by_kind {
        pretty_kv(w, &format!("  {kind}"), count.to_string())?;
    }
    pretty_kv(w, "Commits", result.commit_count.to_string())?;
    pretty_kv(w, "Isolated", result.isolated_count.to_string())?;
    pretty_kv(w, "Passes", stats.collapse_passes.to_string())
}
