use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::finalize::FinalizedNode;

/// Global identity of a dialogue entry: `(conversation id, local id)`.
///
/// Either half may be missing when the dump is malformed. Such keys are still
/// hashable so dangling links can be indexed, but they never resolve to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeKey {
    pub conversation_id: Option<i64>,
    pub local_id: Option<i64>,
}

impl NodeKey {
    pub fn new(conversation_id: Option<i64>, local_id: Option<i64>) -> Self {
        Self {
            conversation_id,
            local_id,
        }
    }

    /// Both components are present.
    pub fn is_addressable(&self) -> bool {
        self.conversation_id.is_some() && self.local_id.is_some()
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(v: Option<i64>) -> String {
            v.map_or_else(|| "null".to_string(), |n| n.to_string())
        }
        write!(f, "{}:{}", part(self.conversation_id), part(self.local_id))
    }
}

/// A dialogue entry exactly as read from the dump, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub conversation_id: Option<i64>,
    pub local_id: Option<i64>,
    pub raw_title: Option<String>,
    pub menu_text: Option<String>,
    pub spoken_text: Option<String>,
    pub english_text: Option<String>,
    /// Actor id from the entry's `Actor` field, resolved against the actor table.
    pub actor_ref: Option<i64>,
    pub conditions: Vec<String>,
    pub effects: Vec<String>,
}

impl RawNode {
    pub fn new(conversation_id: Option<i64>) -> Self {
        Self {
            conversation_id,
            ..Self::default()
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.conversation_id, self.local_id)
    }
}

/// Directed edge between two entries, possibly across conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueLink {
    pub origin_conversation_id: Option<i64>,
    pub origin_local_id: Option<i64>,
    pub destination_conversation_id: Option<i64>,
    pub destination_local_id: Option<i64>,
}

impl DialogueLink {
    pub fn origin(&self) -> NodeKey {
        NodeKey::new(self.origin_conversation_id, self.origin_local_id)
    }

    pub fn destination(&self) -> NodeKey {
        NodeKey::new(self.destination_conversation_id, self.destination_local_id)
    }
}

/// Actor id to display name. Only lives for the duration of a parse.
pub type ActorTable = HashMap<i64, String>;

/// Output of the line parser: finalized nodes in record order, links in
/// record order, and the actor table used to finalize them.
#[derive(Debug, Clone, Default)]
pub struct RawGraph {
    pub nodes: Vec<FinalizedNode>,
    pub links: Vec<DialogueLink>,
    pub actors: ActorTable,
}
