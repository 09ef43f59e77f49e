//! `depviz reveal`: toggle hidden issues around selected nodes.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use depviz_core::config::DepvizConfig;
use depviz_core::error::ErrorCode;
use depviz_core::export::GraphExport;
use depviz_core::reduce::{Expansion, Toggle};
use serde::Serialize;
use tracing::info;

use super::{InputArgs, load_and_reduce};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

/// Arguments for `depviz reveal`.
#[derive(Args, Debug)]
pub struct RevealArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Node to toggle. Repeat to apply several toggles in order; naming a
    /// node twice collapses it again.
    #[arg(long = "node", value_name = "ID", required = true)]
    pub nodes: Vec<String>,

    /// Write the resulting export document to FILE.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ToggleRow {
    node: String,
    action: &'static str,
    ids: Vec<String>,
}

impl ToggleRow {
    fn new(node: &str, toggle: Toggle) -> Self {
        let (action, ids) = match toggle {
            Toggle::Revealed(ids) => ("revealed", ids),
            Toggle::Hidden(ids) => ("hidden", ids),
            Toggle::Ignored => ("ignored", Vec::new()),
        };
        Self {
            node: node.to_string(),
            action,
            ids,
        }
    }
}

#[derive(Debug, Serialize)]
struct RevealView {
    toggles: Vec<ToggleRow>,
    expanded: Vec<String>,
    graph: GraphExport,
}

/// Execute `depviz reveal`.
pub fn run_reveal(
    args: &RevealArgs,
    output: OutputMode,
    config: &DepvizConfig,
) -> anyhow::Result<()> {
    let (snapshot, mut reduction) = load_and_reduce(&args.input, config, output)?;

    if let Some(missing) = args
        .nodes
        .iter()
        .find(|id| reduction.incidence.node(id).is_none())
    {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::NodeNotFound,
                format!("node '{missing}' is not in the snapshot"),
            ),
        )?;
        anyhow::bail!("node '{missing}' not found");
    }

    let mut expansion = Expansion::new();
    let toggles: Vec<ToggleRow> = args
        .nodes
        .iter()
        .map(|id| {
            let toggle = expansion.toggle(&mut reduction.graph, &reduction.incidence, id);
            ToggleRow::new(id, toggle)
        })
        .collect();

    let graph = GraphExport::from_graph(
        &reduction.graph,
        &reduction.report.content_hash,
        &snapshot.extra,
    );
    if let Some(path) = &args.out {
        if let Err(err) = graph.write_to(path) {
            render_error(
                output,
                &CliError::from_code(ErrorCode::ExportWriteFailed, format!("{err:#}")),
            )?;
            return Err(err);
        }
        info!(path = %path.display(), "export written");
    }

    let view = RevealView {
        toggles,
        expanded: expansion.expanded().map(str::to_string).collect(),
        graph,
    };
    render_mode(output, &view, render_reveal_text, render_reveal_pretty)
}

fn render_reveal_text(view: &RevealView, w: &mut dyn Write) -> io::Result<()> {
    for row in &view.toggles {
        if row.ids.is_empty() {
            writeln!(w, "{}\t{}", row.action, row.node)?;
        }
        for id in &row.ids {
            writeln!(w, "{}\t{}\t{id}", row.action, row.node)?;
        }
    }
    Ok(())
}

fn render_reveal_pretty(view: &RevealView, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Reveal")?;
    for row in &view.toggles {
        let detail = match (row.action, row.ids.is_empty()) {
            ("ignored", _) => "not displayed, ignored".to_string(),
            (action, true) => format!("{action}: no linked issues"),
            (action, false) => format!("{action}: {}", row.ids.join(", ")),
        };
        pretty_kv(w, &row.node, detail)?;
    }
    writeln!(w)?;
    pretty_kv(w, "Expanded", view.expanded.join(", "))?;
    pretty_kv(w, "Nodes", view.graph.nodes.len().to_string())?;
    pretty_kv(w, "Edges", view.graph.edges.len().to_string())
}
