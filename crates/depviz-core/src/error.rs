use std::fmt;
use std::io;
use std::path::PathBuf;

/// Machine-readable error codes for the CLI and scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SnapshotReadFailed,
    SnapshotParseError,
    NodeNotFound,
    DuplicateNode,
    ExportWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::SnapshotReadFailed => "E2001",
            Self::SnapshotParseError => "E2002",
            Self::NodeNotFound => "E3001",
            Self::DuplicateNode => "E3002",
            Self::ExportWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SnapshotReadFailed => "Snapshot file could not be read",
            Self::SnapshotParseError => "Snapshot is not valid JSON",
            Self::NodeNotFound => "Node not found",
            Self::DuplicateNode => "Duplicate node id",
            Self::ExportWriteFailed => "Export file write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .depviz/config.toml and retry."),
            Self::SnapshotReadFailed => Some("Check the snapshot path and read permissions."),
            Self::SnapshotParseError => {
                Some("Snapshots must be a JSON object with `nodes` and `edges` arrays.")
            }
            Self::NodeNotFound => Some("Run `depviz reduce` to list the displayed node ids."),
            Self::DuplicateNode => Some("Node ids must be unique within a snapshot."),
            Self::ExportWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the [`DepGraph`](crate::graph::DepGraph) store contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A node with this id is already present.
    #[error("node already present in graph: {0}")]
    DuplicateNode(String),

    /// An edge endpoint does not reference a node in the graph.
    #[error("edge endpoint not present in graph: {0}")]
    UnknownNode(String),
}

impl GraphError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateNode(_) => ErrorCode::DuplicateNode,
            Self::UnknownNode(_) => ErrorCode::NodeNotFound,
        }
    }
}

/// Errors raised while reading or writing snapshot / export files.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The file could not be read or written.
    #[error("snapshot I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The content is not a well-formed snapshot document.
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SnapshotError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::SnapshotReadFailed,
            Self::Json(_) => ErrorCode::SnapshotParseError,
        }
    }
}
