pub mod check;
pub mod reduce;
pub mod reveal;
pub mod stats;

use std::path::{Path, PathBuf};

use clap::Args;
use depviz_core::config::DepvizConfig;
use depviz_core::{ReduceSettings, Reduction, Snapshot, reduce_with_flags};

use crate::output::{CliError, OutputMode, render_error};

/// Snapshot input and reduction knobs shared by `reduce`, `reveal` and `stats`.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Snapshot JSON file (`{"nodes": [...], "edges": [...]}`).
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Visibility flag, repeatable (`issues`, `refs`, `reviews`, `merged`,
    /// `conflicts`, `all-issues`, `hide-orphans`). Defaults to `[view] options`.
    #[arg(short = 'o', long = "option", value_name = "FLAG")]
    pub options: Vec<String>,

    /// Relevance recursion cap. Defaults to `[relevance] depth_cap`.
    #[arg(long, value_name = "N")]
    pub depth_cap: Option<usize>,
}

impl InputArgs {
    /// Command-line flags, or the configured ones when none were given.
    pub fn flags<'a>(&'a self, config: &'a DepvizConfig) -> &'a [String] {
        if self.options.is_empty() {
            config.view_flags()
        } else {
            &self.options
        }
    }

    pub fn settings(&self, config: &DepvizConfig) -> ReduceSettings {
        ReduceSettings {
            depth_cap: self.depth_cap.unwrap_or_else(|| config.depth_cap()),
        }
    }
}

/// Load a snapshot, reporting failures with their error code.
pub fn load_snapshot(path: &Path, output: OutputMode) -> anyhow::Result<Snapshot> {
    match Snapshot::load(path) {
        Ok(snapshot) => Ok(snapshot),
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            Err(err.into())
        }
    }
}

/// Load `input.snapshot` and run the pipeline with the resolved flags.
pub fn load_and_reduce(
    input: &InputArgs,
    config: &DepvizConfig,
    output: OutputMode,
) -> anyhow::Result<(Snapshot, Reduction)> {
    let snapshot = load_snapshot(&input.snapshot, output)?;
    let reduction = reduce_with_flags(&snapshot, input.flags(config), &input.settings(config));
    Ok((snapshot, reduction))
}
