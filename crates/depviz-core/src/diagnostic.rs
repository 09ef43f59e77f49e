//! Non-fatal findings reported alongside a reduction or a snapshot lint.
//!
//! The reduction pipeline never aborts on malformed input. Anything it had to
//! skip or guess about is recorded as a [`Diagnostic`] so callers can surface
//! it without losing the graph.

use std::fmt;

use serde::Serialize;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An edge names a node id that is not in the snapshot. The edge was dropped.
    DanglingEdge {
        source: String,
        target: String,
        missing: String,
    },
    /// A node id appears more than once. Only the first record was kept.
    DuplicateNode { id: String },
    /// A node's attribute bag could not be decoded; defaults were used.
    MalformedAttributes { id: String, reason: String },
    /// A node lacks a field the renderer expects.
    MissingField { id: String, field: String },
    /// An option flag was not recognized and was ignored.
    UnknownOption { flag: String },
    /// Relevance classification of this issue hit the recursion depth cap.
    DepthCapReached { id: String },
}

impl Diagnostic {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::DanglingEdge { .. } | Self::DuplicateNode { .. } => Severity::Error,
            Self::MalformedAttributes { .. } | Self::MissingField { .. } => Severity::Warning,
            Self::UnknownOption { .. } | Self::DepthCapReached { .. } => Severity::Info,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingEdge {
                source,
                target,
                missing,
            } => write!(f, "edge {source} -> {target} dropped: unknown node '{missing}'"),
            Self::DuplicateNode { id } => write!(f, "duplicate node '{id}' ignored"),
            Self::MalformedAttributes { id, reason } => {
                write!(f, "node '{id}' has malformed data: {reason}")
            }
            Self::MissingField { id, field } => write!(f, "node '{id}' is missing '{field}'"),
            Self::UnknownOption { flag } => write!(f, "unknown option '{flag}' ignored"),
            Self::DepthCapReached { id } => {
                write!(f, "issue '{id}' kept: dependency chain exceeds depth cap")
            }
        }
    }
}

/// True if any finding is at [`Severity::Error`].
#[must_use]
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity() == Severity::Error)
}
