//! `depviz reduce`: run the pipeline and emit the renderer document.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use depviz_core::ReductionReport;
use depviz_core::config::DepvizConfig;
use depviz_core::error::ErrorCode;
use depviz_core::export::GraphExport;
use serde::Serialize;
use tracing::info;

use super::{InputArgs, load_and_reduce};
use crate::output::{
    CliError, OutputMode, pretty_kv, pretty_section, render_error, render_json, render_mode,
};

/// Arguments for `depviz reduce`.
#[derive(Args, Debug)]
pub struct ReduceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the export document to FILE; stdout then gets a summary.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ReduceView<'a> {
    nodes: usize,
    edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<&'a Path>,
    report: &'a ReductionReport,
    #[serde(skip)]
    export: &'a GraphExport,
}

/// Execute `depviz reduce`.
pub fn run_reduce(
    args: &ReduceArgs,
    output: OutputMode,
    config: &DepvizConfig,
) -> anyhow::Result<()> {
    let (snapshot, reduction) = load_and_reduce(&args.input, config, output)?;
    let export = GraphExport::from_graph(
        &reduction.graph,
        &reduction.report.content_hash,
        &snapshot.extra,
    );

    if let Some(path) = &args.out {
        if let Err(err) = export.write_to(path) {
            render_error(
                output,
                &CliError::from_code(ErrorCode::ExportWriteFailed, format!("{err:#}")),
            )?;
            return Err(err);
        }
        info!(path = %path.display(), nodes = export.nodes.len(), "export written");
    } else if output.is_json() {
        return render_json(&export);
    }

    let view = ReduceView {
        nodes: export.nodes.len(),
        edges: export.edges.len(),
        written_to: args.out.as_deref(),
        report: &reduction.report,
        export: &export,
    };
    render_mode(output, &view, render_reduce_text, render_reduce_pretty)
}

fn render_reduce_text(view: &ReduceView<'_>, w: &mut dyn Write) -> io::Result<()> {
    if let Some(path) = view.written_to {
        writeln!(w, "written\t{}", path.display())?;
        writeln!(w, "nodes\t{}", view.nodes)?;
        return writeln!(w, "edges\t{}", view.edges);
    }
    for node in &view.export.nodes {
        writeln!(w, "node\t{}\t{}", node.id, node.node_type)?;
    }
    for edge in &view.export.edges {
        writeln!(w, "edge\t{}\t{}\t{}", edge.source, edge.target, edge.edge_type)?;
    }
    Ok(())
}

fn render_reduce_pretty(view: &ReduceView<'_>, w: &mut dyn Write) -> io::Result<()> {
    let report = view.report;
    pretty_section(w, "Reduced graph")?;
    pretty_kv(w, "Options", report.options.to_flags().join(", "))?;
    pretty_kv(w, "Nodes", view.nodes.to_string())?;
    pretty_kv(w, "Edges", view.edges.to_string())?;
    pretty_kv(w, "Hidden", report.excluded.len().to_string())?;
    pretty_kv(w, "Inactive", list_or_dash(&report.inactive))?;
    pretty_kv(w, "Orphans", list_or_dash(&report.orphans))?;
    pretty_kv(
        w,
        "Collapsed",
        format!(
            "{} commit(s) in {} pass(es)",
            report.collapsed.len(),
            report.collapse_passes
        ),
    )?;
    if let Some(path) = view.written_to {
        pretty_kv(w, "Written to", path.display().to_string())?;
    } else {
        writeln!(w)?;
        pretty_section(w, "Nodes")?;
        for node in &view.export.nodes {
            writeln!(w, "  {:<24} {}", node.id, node.node_type)?;
        }
        writeln!(w)?;
        pretty_section(w, "Edges")?;
        for edge in &view.export.edges {
            writeln!(w, "  {} -> {}  [{}]", edge.source, edge.target, edge.edge_type)?;
        }
    }

    if !report.diagnostics.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Diagnostics")?;
        for diagnostic in &report.diagnostics {
            writeln!(w, "  {:<8} {diagnostic}", diagnostic.severity().to_string())?;
        }
    }
    Ok(())
}

fn list_or_dash(ids: &[String]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}
