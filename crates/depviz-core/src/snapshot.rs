//! Immutable input snapshots: loading, linting and content hashing.
//!
//! # Format
//!
//! ```json
//! {
//!   "nodes": [{"id": "ZPL-1", "type": "Issue", "data": {"status": "Open"}}],
//!   "edges": [{"source": "ZPL-1", "target": "c9f1", "type": "branch"}],
//!   "caption": "Sprint 14"
//! }
//! ```
//!
//! Keys other than `nodes` and `edges` are kept verbatim in
//! [`Snapshot::extra`] and written back out by the exporter.
//!
//! ## Cache Invalidation
//!
//! [`Snapshot::content_hash`] is a BLAKE3 hash of the sorted node and edge
//! records. A renderer can compare it against the hash of the last drawn
//! snapshot and skip a redraw when nothing changed.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::diagnostic::Diagnostic;
use crate::error::SnapshotError;
use crate::model::{EdgeRecord, NodeKind, NodePayload, NodeRecord};

/// Fields the issue card renderer reads.
const ISSUE_FIELDS: &[&str] = &[
    "type",
    "URL",
    "code",
    "summary",
    "assignee",
    "status",
    "statusColor",
    "completed",
    "estimated",
];

/// Fields the ref label renderer reads. `type` may be spelled `subtype`.
const REF_FIELDS: &[&str] = &["type", "URL", "name"];

/// Raw node/edge lists as fetched by the data collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Snapshot {
    #[must_use]
    pub fn new(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Self {
        Self {
            nodes,
            edges,
            extra: Map::new(),
        }
    }

    /// Parse a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if the text is not a snapshot object.
    pub fn from_json_str(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be read and
    /// [`SnapshotError::Json`] if it cannot be parsed.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_json_str(&text)?;
        tracing::debug!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// BLAKE3 hash of the sorted node and edge records, as `blake3:<hex>`.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut nodes: Vec<(&str, &str, String)> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.node_type.as_str(), n.data.to_string()))
            .collect();
        nodes.sort_unstable();

        let mut edges: Vec<(&str, &str, &str)> = self
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.edge_type.as_str()))
            .collect();
        edges.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        for (id, node_type, data) in nodes {
            for part in [id, node_type, data.as_str()] {
                hasher.update(part.as_bytes());
                hasher.update(b"\x00");
            }
        }
        hasher.update(b"\x01");
        for (source, target, edge_type) in edges {
            for part in [source, target, edge_type] {
                hasher.update(part.as_bytes());
                hasher.update(b"\x00");
            }
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}

/// Check a snapshot for problems without building a graph.
///
/// Reports duplicate node ids, edges with unknown endpoints, attribute bags
/// that do not decode, and fields the renderer expects but cannot find.
#[must_use]
pub fn lint(snapshot: &Snapshot) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut seen: HashSet<&str> = HashSet::with_capacity(snapshot.nodes.len());

    for record in &snapshot.nodes {
        if !seen.insert(record.id.as_str()) {
            diagnostics.push(Diagnostic::DuplicateNode {
                id: record.id.clone(),
            });
            continue;
        }

        if let Err(err) = NodePayload::decode(record) {
            diagnostics.push(Diagnostic::MalformedAttributes {
                id: record.id.clone(),
                reason: err.to_string(),
            });
        }

        let required = match NodeKind::from_type_name(&record.node_type) {
            NodeKind::Issue => ISSUE_FIELDS,
            NodeKind::VersionControlRef => REF_FIELDS,
            NodeKind::ReviewRequest | NodeKind::Unknown => &[],
        };
        for field in required {
            if !has_field(&record.data, field) {
                diagnostics.push(Diagnostic::MissingField {
                    id: record.id.clone(),
                    field: (*field).to_string(),
                });
            }
        }
    }

    for edge in &snapshot.edges {
        if let Some(missing) = [&edge.source, &edge.target]
            .into_iter()
            .find(|id| !seen.contains(id.as_str()))
        {
            diagnostics.push(Diagnostic::DanglingEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                missing: missing.clone(),
            });
        }
    }

    diagnostics
}

fn has_field(data: &Value, field: &str) -> bool {
    let present = |key: &str| data.get(key).is_some_and(|v| !v.is_null());
    present(field) || (field == "type" && present("subtype"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_issue(id: &str) -> NodeRecord {
        NodeRecord::new(
            id,
            "JIRA",
            json!({
                "type": "TestingSubtask",
                "URL": "https://tracker.example/browse/ZPL-322",
                "code": "ZPL-322",
                "summary": "Component automation",
                "assignee": "Reviewer",
                "status": "In Progress",
                "statusColor": "tan",
                "completed": 3,
                "estimated": 5
            }),
        )
    }

    #[test]
    fn parses_and_keeps_extra_keys() {
        let snap = Snapshot::from_json_str(
            r#"{"nodes": [{"id": "a", "type": "git", "data": {}}], "edges": [], "caption": "Test"}"#,
        )
        .expect("parse");
        assert_eq!(snap.nodes.len(), 1);
        assert_eq!(snap.extra["caption"], "Test");
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let snap = Snapshot::from_json_str("{}").expect("parse");
        assert!(snap.nodes.is_empty());
        assert!(snap.edges.is_empty());
    }

    #[test]
    fn rejects_non_object() {
        assert!(matches!(
            Snapshot::from_json_str("[1, 2]"),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Snapshot::load(Path::new("/definitely/not/here.json")).expect_err("missing");
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn lint_flags_dangling_edge() {
        let snap = Snapshot::new(
            vec![full_issue("id1")],
            vec![EdgeRecord::new("id1", "id3", "invalid")],
        );
        let diags = lint(&snap);
        assert_eq!(
            diags,
            vec![Diagnostic::DanglingEdge {
                source: "id1".into(),
                target: "id3".into(),
                missing: "id3".into(),
            }]
        );
    }

    #[test]
    fn lint_flags_missing_fields_and_duplicates() {
        let snap = Snapshot::new(
            vec![
                NodeRecord::new("b", "git", json!({"subtype": "branch", "name": "devel"})),
                NodeRecord::new("b", "git", json!({})),
            ],
            vec![],
        );
        let diags = lint(&snap);
        assert!(diags.contains(&Diagnostic::MissingField {
            id: "b".into(),
            field: "URL".into(),
        }));
        assert!(diags.contains(&Diagnostic::DuplicateNode { id: "b".into() }));
        // `subtype` satisfies the `type` requirement.
        assert!(!diags.contains(&Diagnostic::MissingField {
            id: "b".into(),
            field: "type".into(),
        }));
    }

    #[test]
    fn lint_flags_malformed_data() {
        let snap = Snapshot::new(vec![NodeRecord::new("x", "Issue", json!({"done": "yes"}))], vec![]);
        assert!(
            lint(&snap)
                .iter()
                .any(|d| matches!(d, Diagnostic::MalformedAttributes { id, .. } if id == "x"))
        );
    }

    #[test]
    fn content_hash_ignores_order_but_not_content() {
        let a = Snapshot::new(
            vec![full_issue("1"), full_issue("2")],
            vec![EdgeRecord::new("1", "2", "blocks")],
        );
        let mut b = a.clone();
        b.nodes.reverse();
        assert_eq!(a.content_hash(), b.content_hash());

        let mut c = a.clone();
        c.edges[0].edge_type = "depends".into();
        assert_ne!(a.content_hash(), c.content_hash());
        assert!(a.content_hash().starts_with("blake3:"));
    }
}
