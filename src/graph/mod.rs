//! Discourse graph: node types, the graph store, and the snapshot bridge.
//!
//! This is the core of the orchestrator. Nodes form per-thread trees of
//! claims and stance-classified replies; the store enforces the
//! bidirectional parent/child consistency rules under concurrent event
//! arrival.

mod snapshot;
mod store;

pub use snapshot::SnapshotBridge;
pub use store::GraphStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rhetorical relationship of an utterance to its parent.
///
/// `Claim` is reserved for root nodes created by the content adapter; the
/// stance classifier assigns the other values to reply nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    /// Root proposition of a thread.
    Claim,
    /// Agrees with or reinforces the parent.
    Support,
    /// Disputes or counters the parent.
    Challenge,
    /// Asks about the parent.
    #[default]
    Question,
    /// Neutral remark with no classified stance.
    Comment,
}

impl Stance {
    /// Parse a classifier answer. Only the reply vocabulary is accepted;
    /// anything else returns None so callers can apply their fallback.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "support" => Some(Stance::Support),
            "challenge" => Some(Stance::Challenge),
            "question" => Some(Stance::Question),
            "comment" => Some(Stance::Comment),
            _ => None,
        }
    }

    /// Emoji used to annotate an organic reply with its stance.
    pub fn emoji(&self) -> &'static str {
        match self {
            Stance::Claim => "💬",
            Stance::Support => "✅",
            Stance::Challenge => "❌",
            Stance::Question => "❓",
            Stance::Comment => "💭",
        }
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stance::Claim => write!(f, "claim"),
            Stance::Support => write!(f, "support"),
            Stance::Challenge => write!(f, "challenge"),
            Stance::Question => write!(f, "question"),
            Stance::Comment => write!(f, "comment"),
        }
    }
}

impl std::str::FromStr for Stance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claim" => Ok(Stance::Claim),
            "support" => Ok(Stance::Support),
            "challenge" => Ok(Stance::Challenge),
            "question" => Ok(Stance::Question),
            "comment" => Ok(Stance::Comment),
            _ => Err(format!("Unknown stance: {}", s)),
        }
    }
}

/// Shape of a root node's generated content. Rendering only; carries no
/// graph semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A single flat claim sentence.
    #[default]
    Flat,
    /// A structured stanza (claim, supports, counter, question).
    Stanza,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Flat => write!(f, "flat"),
            NodeKind::Stanza => write!(f, "stanza"),
        }
    }
}

/// A single utterance in the discourse graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscourseNode {
    /// Unique identifier; never reassigned or reused.
    pub id: String,
    /// Parent node id; None for root claims.
    pub parent_id: Option<String>,
    /// Conversation thread this node belongs to; immutable.
    pub thread_id: String,
    /// Display identity of the author; `"ai"` for generated content.
    pub author_tag: String,
    /// The utterance text.
    pub content: String,
    /// Classified rhetorical relationship to the parent.
    pub stance: Stance,
    /// Ids of nodes whose `parent_id` points here, in arrival order.
    pub child_ids: Vec<String>,
    /// Flat claim or structured stanza.
    pub kind: NodeKind,
    /// Process-wide creation ordinal; defines creation order and seeds
    /// the fallback id generator after a restart.
    pub seq: u64,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
}

impl DiscourseNode {
    /// Create a root claim node
    pub fn root(
        id: impl Into<String>,
        thread_id: impl Into<String>,
        content: impl Into<String>,
        kind: NodeKind,
        seq: u64,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            thread_id: thread_id.into(),
            author_tag: "ai".to_string(),
            content: content.into(),
            stance: Stance::Claim,
            child_ids: Vec::new(),
            kind,
            seq,
            created_at: Utc::now(),
        }
    }

    /// Create a reply node
    pub fn reply(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        thread_id: impl Into<String>,
        author_tag: impl Into<String>,
        content: impl Into<String>,
        stance: Stance,
        seq: u64,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            thread_id: thread_id.into(),
            author_tag: author_tag.into(),
            content: content.into(),
            stance,
            child_ids: Vec::new(),
            kind: NodeKind::Flat,
            seq,
            created_at: Utc::now(),
        }
    }

    /// Whether this node is a thread root
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
