pub mod aggregate;
pub mod index;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::{BTreeMap, HashMap};

pub use aggregate::{aggregate, group_key, AggregatedNode, GroupKey};
pub use index::GraphIndex;

use crate::finalize::{NARRATOR, PLAYER};
use crate::parser::{DialogueLink, NodeKey, RawGraph};

/// Immutable snapshot of one parse: annotated nodes, links, and the index
/// over them. Rebuilt from scratch on every parse.
#[derive(Debug, Clone, Default)]
pub struct ParsedGraph {
    nodes: Vec<AggregatedNode>,
    links: Vec<DialogueLink>,
    index: GraphIndex,
}

/// Sibling entries presented together as alternative options.
#[derive(Debug, Clone)]
pub struct ChoiceGroup<'a> {
    pub key: GroupKey,
    pub nodes: Vec<&'a AggregatedNode>,
}

impl ChoiceGroup<'_> {
    fn sort_id(&self) -> i64 {
        self.nodes
            .iter()
            .map(|n| n.local_id().unwrap_or(0))
            .min()
            .unwrap_or(0)
    }
}

/// All non-sentinel entries sharing a conversation id.
#[derive(Debug, Clone)]
pub struct Conversation<'a> {
    pub id: i64,
    pub nodes: Vec<&'a AggregatedNode>,
}

impl<'a> Conversation<'a> {
    /// Split into sibling groups ordered by their smallest member id, members
    /// ordered by id.
    pub fn groups(&self, graph: &ParsedGraph) -> Vec<ChoiceGroup<'a>> {
        group_nodes(&self.nodes, graph.index())
    }
}

/// Group any subset of one conversation's nodes for display.
pub fn group_nodes<'a>(nodes: &[&'a AggregatedNode], index: &GraphIndex) -> Vec<ChoiceGroup<'a>> {
    let mut order: Vec<GroupKey> = Vec::new();
    let mut members: HashMap<GroupKey, Vec<&'a AggregatedNode>> = HashMap::new();
    for &node in nodes {
        let key = group_key(&node.key(), index);
        members
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(node);
    }

    let mut groups: Vec<ChoiceGroup<'a>> = order
        .into_iter()
        .map(|key| {
            let mut nodes = members.remove(&key).unwrap_or_default();
            nodes.sort_by_key(|n| n.local_id().unwrap_or(0));
            ChoiceGroup { key, nodes }
        })
        .collect();
    groups.sort_by_key(|g| g.sort_id());
    groups
}

impl ParsedGraph {
    /// Index and annotate a parser result.
    pub fn build(raw: RawGraph) -> Self {
        let index = GraphIndex::build(&raw.nodes, &raw.links);
        let nodes = aggregate(raw.nodes, &index);
        Self {
            nodes,
            links: raw.links,
            index,
        }
    }

    pub fn nodes(&self) -> &[AggregatedNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[DialogueLink] {
        &self.links
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn node(&self, key: &NodeKey) -> Option<&AggregatedNode> {
        self.index.position(key).and_then(|p| self.nodes.get(p))
    }

    pub fn children(&self, key: &NodeKey) -> impl Iterator<Item = &AggregatedNode> + '_ {
        self.index.resolve_all(self.index.children(key), &self.nodes)
    }

    pub fn parents(&self, key: &NodeKey) -> impl Iterator<Item = &AggregatedNode> + '_ {
        self.index.resolve_all(self.index.parents(key), &self.nodes)
    }

    /// Entries with presentable choice text.
    pub fn choices(&self) -> impl Iterator<Item = &AggregatedNode> {
        self.nodes.iter().filter(|n| n.node.display_text.is_some())
    }

    /// Entries carrying mechanics without choice text.
    pub fn triggers(&self) -> impl Iterator<Item = &AggregatedNode> {
        self.nodes
            .iter()
            .filter(|n| n.node.display_text.is_none() && n.node.has_own_mechanics)
    }

    /// Conversations ordered by id.
    pub fn conversations(&self) -> Vec<Conversation<'_>> {
        let mut by_id: BTreeMap<i64, Vec<&AggregatedNode>> = BTreeMap::new();
        for node in &self.nodes {
            if node.node.is_sentinel() {
                continue;
            }
            if let Some(id) = node.conversation_id() {
                by_id.entry(id).or_default().push(node);
            }
        }
        by_id
            .into_iter()
            .map(|(id, nodes)| Conversation { id, nodes })
            .collect()
    }

    pub fn conversation(&self, id: i64) -> Option<Conversation<'_>> {
        let nodes: Vec<&AggregatedNode> = self
            .nodes
            .iter()
            .filter(|n| n.conversation_id() == Some(id) && !n.node.is_sentinel())
            .collect();
        (!nodes.is_empty()).then_some(Conversation { id, nodes })
    }

    /// Number of entries that can appear in a conversation listing.
    pub fn total_listed(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.conversation_id().is_some() && !n.node.is_sentinel())
            .count()
    }

    /// `(canonical key, label)` for every speaker other than the player and
    /// narrator, sorted case-insensitively by label.
    pub fn speakers(&self) -> Vec<(String, String)> {
        let mut speakers: BTreeMap<String, String> = BTreeMap::new();
        for node in &self.nodes {
            let Some(canonical) = node.node.speaker_canonical_key.as_deref() else {
                continue;
            };
            if canonical == PLAYER || canonical == NARRATOR {
                continue;
            }
            let label = node
                .node
                .speaker_raw
                .clone()
                .unwrap_or_else(|| canonical.to_string());
            speakers.entry(canonical.to_string()).or_insert(label);
        }

        let mut sorted: Vec<(String, String)> = speakers.into_iter().collect();
        sorted.sort_by_key(|(_, label)| label.to_lowercase());
        sorted
    }
}

impl Serialize for ParsedGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let choices: Vec<&AggregatedNode> = self.choices().collect();
        let triggers: Vec<&AggregatedNode> = self.triggers().collect();

        let mut state = serializer.serialize_struct("ParsedGraph", 4)?;
        state.serialize_field("nodes", &self.nodes)?;
        state.serialize_field("links", &self.links)?;
        state.serialize_field("choices", &choices)?;
        state.serialize_field("triggers", &triggers)?;
        state.end()
    }
}
