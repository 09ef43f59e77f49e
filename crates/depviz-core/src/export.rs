//! Renderer-facing JSON export of a reduced graph.
//!
//! ```json
//! {
//!   "nodes": [{"id": "c1", "type": "git", "data": {"subtype": "commit"}}],
//!   "edges": [{"id": "c1->c3#2", "source": "c1", "target": "c3", "type": "2"}],
//!   "timestamp": "2026-10-16T09:30:00+00:00",
//!   "contentHash": "blake3:…",
//!   "caption": "Sprint 14"
//! }
//! ```
//!
//! Keys carried over from the snapshot (`caption` above) are written after
//! the generated ones and never overwrite them.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::graph::{DepGraph, Edge};
use crate::model::NodeRecord;

/// An exported edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

impl From<&Edge> for ExportEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            edge_type: edge.label.clone(),
        }
    }
}

/// The document handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExport {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<ExportEdge>,
    pub timestamp: String,
    pub content_hash: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const RESERVED: &[&str] = &["nodes", "edges", "timestamp", "contentHash"];

impl GraphExport {
    /// Export `graph` stamped with the current time.
    #[must_use]
    pub fn from_graph(graph: &DepGraph, content_hash: &str, extra: &Map<String, Value>) -> Self {
        Self::at(graph, content_hash, extra, Utc::now())
    }

    /// Export `graph` stamped with `now`.
    #[must_use]
    pub fn at(
        graph: &DepGraph,
        content_hash: &str,
        extra: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        let nodes = graph.nodes().map(|n| n.record.clone()).collect();
        let edges = graph
            .edges()
            .filter(|e| graph.contains(&e.source) && graph.contains(&e.target))
            .map(ExportEdge::from)
            .collect();
        let extra = extra
            .iter()
            .filter(|(k, _)| !RESERVED.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            nodes,
            edges,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, false),
            content_hash: content_hash.to_string(),
            extra,
        }
    }

    /// Write pretty JSON to `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or written.
    #[instrument(skip(self), fields(nodes = self.nodes.len(), edges = self.edges.len()))]
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writeln!(writer)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use chrono::TimeZone;
    use serde_json::json;

    fn graph() -> DepGraph {
        let mut g = DepGraph::new();
        for id in ["c1", "c3"] {
            g.add_node(Node::from_record(NodeRecord::new(
                id,
                "git",
                json!({"subtype": "commit"}),
            )))
            .expect("add node");
        }
        g.add_edge("c1", "c3", "2").expect("edge");
        g
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).single().expect("valid time")
    }

    #[test]
    fn export_shape() {
        let mut extra = Map::new();
        extra.insert("caption".into(), json!("Test"));
        extra.insert("nodes".into(), json!("ignored"));

        let doc = GraphExport::at(&graph(), "blake3:abc", &extra, fixed_now());
        let value = serde_json::to_value(&doc).expect("serialize");

        assert_eq!(value["timestamp"], "2026-10-16T09:30:00+00:00");
        assert_eq!(value["contentHash"], "blake3:abc");
        assert_eq!(value["caption"], "Test");
        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["edges"][0]["type"], "2");
        assert_eq!(value["edges"][0]["source"], "c1");
        assert!(
            value["edges"][0]["id"]
                .as_str()
                .is_some_and(|id| id.starts_with("c1->c3#"))
        );
    }

    #[test]
    fn write_and_read_back() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("graph.json");
        let doc = GraphExport::at(&graph(), "blake3:abc", &Map::new(), fixed_now());
        doc.write_to(&path).expect("write");

        let text = std::fs::read_to_string(&path).expect("read");
        let back: GraphExport = serde_json::from_str(&text).expect("parse");
        assert_eq!(back, doc);
    }

    #[test]
    fn write_to_missing_dir_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("no/such/dir/graph.json");
        let doc = GraphExport::at(&graph(), "", &Map::new(), fixed_now());
        assert!(doc.write_to(&path).is_err());
    }
}
