#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use depviz_core::config::{self, EffectiveConfig};
use depviz_core::error::ErrorCode;
use depviz_core::timing;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "depviz: reduce issue / branch / review graphs for display",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit per-stage timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Project config file (default: nearest `.depviz/config.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self, config_format: Option<&str>) -> OutputMode {
        resolve_output_mode(self.format, self.json, config_format)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Reduce a snapshot for display",
        long_about = "Filter, prune and collapse a snapshot, then emit the renderer document.",
        after_help = "EXAMPLES:\n    # Issues and refs, orphans hidden\n    depviz reduce graph.json -o issues -o refs -o hide-orphans\n\n    # Write the document to a file\n    depviz reduce graph.json -o refs --out reduced.json"
    )]
    Reduce(cmd::reduce::ReduceArgs),

    #[command(
        about = "Reveal issues linked to a node",
        long_about = "Toggle the hidden issues linked to displayed nodes, in order.",
        after_help = "EXAMPLES:\n    # Show the issues attached to a branch\n    depviz reveal graph.json -o refs --node feature/login"
    )]
    Reveal(cmd::reveal::RevealArgs),

    #[command(
        about = "Lint a snapshot",
        long_about = "Report dangling edges, duplicate ids and malformed node data.",
        after_help = "EXAMPLES:\n    # Fail on errors only\n    depviz check graph.json\n\n    # Fail on warnings too\n    depviz check graph.json --strict"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        about = "Per-stage reduction counts",
        long_about = "Show how many nodes and edges each reduction stage kept.",
        after_help = "EXAMPLES:\n    depviz stats graph.json -o issues -o refs --json"
    )]
    Stats(cmd::stats::StatsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DEPVIZ_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "depviz=debug,info"
        } else {
            "depviz=info,warn"
        })
    });

    let format = env::var("DEPVIZ_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EffectiveConfig> {
    let cwd = env::current_dir()?;
    match config::resolve_config(&cwd, cli.config.as_deref()) {
        Ok(effective) => Ok(effective),
        Err(err) => {
            render_error(
                cli.output_mode(None),
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            Err(err)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let timing_enabled = cli.timing || timing::enabled_from_env();
    timing::set_enabled(timing_enabled);

    let effective = load_config(&cli)?;
    debug!(sources = ?effective.sources, "config loaded");
    let config = &effective.config;
    let output = cli.output_mode(config.output_format());

    if cli.verbose {
        info!(?output, "verbose mode enabled");
    }

    let command_result = match &cli.command {
        Commands::Reduce(args) => timing::timed("cmd.reduce", || {
            cmd::reduce::run_reduce(args, output, config)
        }),
        Commands::Reveal(args) => timing::timed("cmd.reveal", || {
            cmd::reveal::run_reveal(args, output, config)
        }),
        Commands::Check(args) => {
            timing::timed("cmd.check", || cmd::check::run_check(args, output))
        }
        Commands::Stats(args) => {
            timing::timed("cmd.stats", || cmd::stats::run_stats(args, output, config))
        }
    };

    if timing_enabled {
        let report = timing::collect_report();
        if report.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else {
            eprintln!("timing report:");
            eprint!("{}", report.render_table());
            eprintln!("timing report (json):");
            eprintln!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    command_result
}
