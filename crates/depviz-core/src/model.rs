//! Node and edge records, and the typed payloads decoded from them.
//!
//! # Overview
//!
//! Snapshots arrive as loosely-typed records: every node carries a `type`
//! discriminator and a `data` attribute bag whose shape depends on that type.
//! This module decodes each record once into a [`NodePayload`] variant so the
//! reduction stages can match exhaustively instead of probing for optional
//! keys. The original `data` bag is kept alongside the payload so the renderer
//! still sees every field it knows how to draw.
//!
//! ## Record type names
//!
//! | kind                | accepted `type` values       |
//! |---------------------|------------------------------|
//! | Issue               | `Issue`, `JIRA`              |
//! | `VersionControlRef` | `VersionControlRef`, `git`   |
//! | `ReviewRequest`     | `ReviewRequest`, `stash`     |
//!
//! Anything else decodes to [`NodeKind::Unknown`] and is passed through by
//! every rule.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A node as supplied by the data-fetch collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub data: Value,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            data,
        }
    }
}

/// An edge as supplied by the data-fetch collaborator.
///
/// `edge_type` doubles as the display label: a relation name (`blocks`,
/// `subtask`, …) or, between commits, the number of commits it spans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub edge_type: String,
}

impl EdgeRecord {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type: edge_type.into(),
        }
    }

    /// The endpoint opposite `id`, or `None` if `id` is not an endpoint.
    #[must_use]
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Coarse node classification, discriminated by the record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Issue,
    VersionControlRef,
    ReviewRequest,
    Unknown,
}

impl NodeKind {
    /// Map a record `type` string to a kind.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Issue" | "JIRA" => Self::Issue,
            "VersionControlRef" | "git" => Self::VersionControlRef,
            "ReviewRequest" | "stash" => Self::ReviewRequest,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::VersionControlRef => "ref",
            Self::ReviewRequest => "review",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subtype of a version-control ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefSubtype {
    Branch,
    Commit,
    Conflict,
    #[default]
    Other,
}

impl RefSubtype {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "branch" => Self::Branch,
            "commit" => Self::Commit,
            "conflict" => Self::Conflict,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Status of one review request attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewStatus {
    #[serde(default)]
    pub status: String,
}

/// Issue attributes that drive relevance classification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IssueData {
    pub status: String,
    pub done: bool,
    pub pull_requests: Vec<ReviewStatus>,
    /// `branches` key present in the record.
    pub has_branches: bool,
    /// `subtasks` key present in the record.
    pub has_subtasks: bool,
}

impl IssueData {
    /// `done` flag set, or status spelled `Done`.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done || self.status == "Done"
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == "Open"
    }

    /// At least one attached review request is still `OPEN`.
    #[must_use]
    pub fn has_open_review(&self) -> bool {
        self.pull_requests.iter().any(|pr| pr.status == "OPEN")
    }

    /// The issue has branches or subtasks hanging off it.
    #[must_use]
    pub const fn has_dependents(&self) -> bool {
        self.has_branches || self.has_subtasks
    }
}

/// Version-control ref attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefData {
    pub subtype: RefSubtype,
    pub in_master: bool,
    pub merge_base: bool,
    pub master: bool,
}

impl RefData {
    /// Merged into the mainline and not serving as a merge base.
    #[must_use]
    pub const fn is_merged(&self) -> bool {
        self.in_master && !self.merge_base
    }

    /// Already part of the mainline, or the mainline itself.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.in_master || self.master
    }

    #[must_use]
    pub fn is_commit(&self) -> bool {
        self.subtype == RefSubtype::Commit
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.subtype == RefSubtype::Conflict
    }
}

/// Review-request attributes. Carried for display only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewData {
    pub status: Option<String>,
}

/// Typed view of a node's attribute bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePayload {
    Issue(IssueData),
    Ref(RefData),
    Review(ReviewData),
    Other,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIssue {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    pull_requests: Option<Vec<ReviewStatus>>,
    #[serde(default, deserialize_with = "key_present")]
    branches: bool,
    #[serde(default, deserialize_with = "key_present")]
    subtasks: bool,
}

/// True whenever the key is present, whatever its value (`null` included).
fn key_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRef {
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default, rename = "type")]
    legacy_type: Option<String>,
    #[serde(default)]
    in_master: Option<bool>,
    #[serde(default)]
    merge_base: Option<bool>,
    #[serde(default)]
    master: Option<bool>,
}

#[derive(Deserialize)]
struct RawReview {
    #[serde(default)]
    status: Option<String>,
}

impl NodePayload {
    /// The default payload for a kind, used when the attribute bag is malformed.
    #[must_use]
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Issue => Self::Issue(IssueData::default()),
            NodeKind::VersionControlRef => Self::Ref(RefData::default()),
            NodeKind::ReviewRequest => Self::Review(ReviewData::default()),
            NodeKind::Unknown => Self::Other,
        }
    }

    /// Decode the attribute bag of `record` according to its kind.
    ///
    /// A missing (`null`) bag decodes as an empty object.
    ///
    /// # Errors
    ///
    /// Returns the serde error if a known field has the wrong JSON type.
    pub fn decode(record: &NodeRecord) -> Result<Self, serde_json::Error> {
        let data = if record.data.is_null() {
            Value::Object(Map::new())
        } else {
            record.data.clone()
        };

        let payload = match NodeKind::from_type_name(&record.node_type) {
            NodeKind::Issue => {
                let raw: RawIssue = serde_json::from_value(data)?;
                Self::Issue(IssueData {
                    status: raw.status.unwrap_or_default(),
                    done: raw.done.unwrap_or(false),
                    pull_requests: raw.pull_requests.unwrap_or_default(),
                    has_branches: raw.branches,
                    has_subtasks: raw.subtasks,
                })
            }
            NodeKind::VersionControlRef => {
                let raw: RawRef = serde_json::from_value(data)?;
                let subtype = raw
                    .subtype
                    .or(raw.legacy_type)
                    .map(|s| RefSubtype::parse(&s))
                    .unwrap_or_default();
                Self::Ref(RefData {
                    subtype,
                    in_master: raw.in_master.unwrap_or(false),
                    merge_base: raw.merge_base.unwrap_or(false),
                    master: raw.master.unwrap_or(false),
                })
            }
            NodeKind::ReviewRequest => {
                let raw: RawReview = serde_json::from_value(data)?;
                Self::Review(ReviewData { status: raw.status })
            }
            NodeKind::Unknown => Self::Other,
        };
        Ok(payload)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A graph node: the decoded payload plus the record it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub payload: NodePayload,
    pub record: NodeRecord,
}

impl Node {
    /// Build a node from an already-decoded payload.
    #[must_use]
    pub fn with_payload(record: NodeRecord, payload: NodePayload) -> Self {
        Self {
            id: record.id.clone(),
            kind: NodeKind::from_type_name(&record.node_type),
            payload,
            record,
        }
    }

    /// Decode `record`, falling back to the kind's empty payload on malformed data.
    #[must_use]
    pub fn from_record(record: NodeRecord) -> Self {
        let kind = NodeKind::from_type_name(&record.node_type);
        let payload = NodePayload::decode(&record).unwrap_or_else(|_| NodePayload::empty(kind));
        Self::with_payload(record, payload)
    }

    /// Opaque attribute bag for the renderer.
    #[must_use]
    pub const fn attributes(&self) -> &Value {
        &self.record.data
    }

    #[must_use]
    pub const fn as_issue(&self) -> Option<&IssueData> {
        match &self.payload {
            NodePayload::Issue(issue) => Some(issue),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_ref_data(&self) -> Option<&RefData> {
        match &self.payload {
            NodePayload::Ref(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_issue(&self) -> bool {
        self.kind == NodeKind::Issue
    }

    /// Commit-subtype version-control ref.
    #[must_use]
    pub fn is_commit(&self) -> bool {
        self.as_ref_data().is_some_and(RefData::is_commit)
    }

    /// A ref that may serve as an intermediate hop in history traversal.
    #[must_use]
    pub fn is_history_hop(&self) -> bool {
        self.as_ref_data().is_some_and(|r| !r.is_conflict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(node_type: &str, data: Value) -> NodePayload {
        NodePayload::decode(&NodeRecord::new("n", node_type, data)).expect("decodes")
    }

    #[test]
    fn kinds_accept_tracker_aliases() {
        assert_eq!(NodeKind::from_type_name("JIRA"), NodeKind::Issue);
        assert_eq!(NodeKind::from_type_name("git"), NodeKind::VersionControlRef);
        assert_eq!(NodeKind::from_type_name("stash"), NodeKind::ReviewRequest);
        assert_eq!(NodeKind::from_type_name("jira"), NodeKind::Unknown);
    }

    #[test]
    fn issue_presence_flags() {
        let NodePayload::Issue(issue) = decode(
            "Issue",
            json!({"status": "Open", "subtasks": ["ZPL-1"], "pullRequests": [{"status": "OPEN"}]}),
        ) else {
            panic!("expected issue payload");
        };
        assert!(issue.is_open());
        assert!(issue.has_subtasks);
        assert!(!issue.has_branches);
        assert!(issue.has_open_review());
    }


    #[test]
    fn null_dependents_still_count_as_present() {
        let NodePayload::Issue(issue) =
            decode("Issue", json!({"status": "Done", "branches": null}))
        else {
            panic!("expected issue payload");
        };
        assert!(issue.has_branches);
        assert!(!issue.has_subtasks);
        assert!(issue.has_dependents());
    }
    #[test]
    fn done_flag_or_status() {
        let NodePayload::Issue(a) = decode("Issue", json!({"status": "Closed", "done": true})) else {
            panic!("expected issue payload");
        };
        let NodePayload::Issue(b) = decode("Issue", json!({"status": "Done"})) else {
            panic!("expected issue payload");
        };
        assert!(a.is_done());
        assert!(b.is_done());
    }

    #[test]
    fn ref_subtype_falls_back_to_type_key() {
        let NodePayload::Ref(r) = decode("git", json!({"type": "conflict"})) else {
            panic!("expected ref payload");
        };
        assert!(r.is_conflict());

        let NodePayload::Ref(r) = decode(
            "VersionControlRef",
            json!({"subtype": "commit", "type": "branch", "inMaster": true}),
        ) else {
            panic!("expected ref payload");
        };
        assert!(r.is_commit());
        assert!(r.is_merged());
        assert!(r.is_settled());
    }

    #[test]
    fn merge_base_is_not_merged() {
        let r = RefData {
            subtype: RefSubtype::Branch,
            in_master: true,
            merge_base: true,
            master: false,
        };
        assert!(!r.is_merged());
    }

    #[test]
    fn null_data_decodes_as_empty() {
        assert_eq!(
            decode("Issue", Value::Null),
            NodePayload::Issue(IssueData::default())
        );
    }

    #[test]
    fn malformed_data_falls_back_to_kind_default() {
        let record = NodeRecord::new("x", "Issue", json!({"status": 7}));
        assert!(NodePayload::decode(&record).is_err());
        let node = Node::from_record(record);
        assert_eq!(node.kind, NodeKind::Issue);
        assert_eq!(node.payload, NodePayload::Issue(IssueData::default()));
    }

    #[test]
    fn unknown_type_passes_through() {
        let node = Node::from_record(NodeRecord::new("x", "Wiki", json!({"a": 1})));
        assert_eq!(node.kind, NodeKind::Unknown);
        assert_eq!(node.payload, NodePayload::Other);
        assert_eq!(node.attributes()["a"], 1);
    }

    #[test]
    fn other_end_of_edge() {
        let e = EdgeRecord::new("a", "b", "blocks");
        assert_eq!(e.other_end("a"), Some("b"));
        assert_eq!(e.other_end("b"), Some("a"));
        assert_eq!(e.other_end("c"), None);
    }
}
