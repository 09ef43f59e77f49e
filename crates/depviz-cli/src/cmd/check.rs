//! `depviz check`: lint a snapshot without reducing it.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use depviz_core::snapshot::lint;
use depviz_core::{Diagnostic, Severity};
use serde::Serialize;
use tracing::info;

use super::load_snapshot;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `depviz check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Snapshot JSON file.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Fail on warnings as well as errors.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct Finding<'a> {
    severity: Severity,
    message: String,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    ok: bool,
    nodes: usize,
    edges: usize,
    errors: usize,
    warnings: usize,
    findings: Vec<Finding<'a>>,
}

impl<'a> CheckReport<'a> {
    fn new(nodes: usize, edges: usize, diagnostics: &'a [Diagnostic], strict: bool) -> Self {
        let count = |severity: Severity| {
            diagnostics
                .iter()
                .filter(|d| d.severity() == severity)
                .count()
        };
        let errors = count(Severity::Error);
        let warnings = count(Severity::Warning);
        let findings = diagnostics
            .iter()
            .map(|diagnostic| Finding {
                severity: diagnostic.severity(),
                message: diagnostic.to_string(),
                diagnostic,
            })
            .collect();
        Self {
            ok: errors == 0 && (!strict || warnings == 0),
            nodes,
            edges,
            errors,
            warnings,
            findings,
        }
    }
}

/// Execute `depviz check`. Fails when the snapshot has errors, or warnings
/// under `--strict`.
pub fn run_check(args: &CheckArgs, output: OutputMode) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&args.snapshot, output)?;
    let diagnostics = lint(&snapshot);
    let report = CheckReport::new(
        snapshot.nodes.len(),
        snapshot.edges.len(),
        &diagnostics,
        args.strict,
    );
    info!(
        errors = report.errors,
        warnings = report.warnings,
        "snapshot checked"
    );

    render_mode(output, &report, render_check_text, render_check_pretty)?;
    if !report.ok {
        anyhow::bail!(
            "snapshot check failed: {} error(s), {} warning(s)",
            report.errors,
            report.warnings
        );
    }
    Ok(())
}

fn render_check_text(report: &CheckReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    for finding in &report.findings {
        writeln!(w, "{}\t{}", finding.severity, finding.message)?;
    }
    Ok(())
}

fn render_check_pretty(report: &CheckReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Snapshot check")?;
    pretty_kv(w, "Nodes", report.nodes.to_string())?;
    pretty_kv(w, "Edges", report.edges.to_string())?;
    pretty_kv(w, "Errors", report.errors.to_string())?;
    pretty_kv(w, "Warnings", report.warnings.to_string())?;
    if report.findings.is_empty() {
        return writeln!(w, "\n✓ no problems found");
    }
    writeln!(w)?;
    for finding in &report.findings {
        writeln!(w, "  {:<8} {}", finding.severity.to_string(), finding.message)?;
    }
    Ok(())
}
