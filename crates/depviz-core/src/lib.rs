//! depviz-core library.
//!
//! Builds a dependency graph from a tracker/VCS snapshot and reduces it for
//! display: hidden kinds are filtered out, inactive issues and orphans are
//! pruned, and linear commit chains are folded into summarizing edges.
//!
//! ```text
//! Snapshot ──▶ reduce::filter ──▶ reduce::relevance ──▶ reduce::orphans ──▶ reduce::collapse
//!                    │                                                          │
//!                    └──────────── IncidenceIndex ──▶ reduce::reveal ◀──────── DepGraph
//! ```
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for library failures, `anyhow::Result` where
//!   several sources are aggregated (config, export). The pipeline itself
//!   never fails; it reports [`diagnostic::Diagnostic`]s.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

#![forbid(unsafe_code)]

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod export;
pub mod graph;
pub mod model;
pub mod options;
pub mod reduce;
pub mod snapshot;
pub mod timing;

pub use diagnostic::{Diagnostic, Severity};
pub use graph::{DepGraph, GraphStats};
pub use options::ViewOptions;
pub use reduce::{ReduceSettings, Reduction, ReductionReport, reduce, reduce_with_flags};
pub use snapshot::Snapshot;
