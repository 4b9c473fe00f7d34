use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::index::GraphIndex;
use crate::finalize::FinalizedNode;
use crate::parser::NodeKey;

/// A finalized entry annotated with what its immediate neighbourhood implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedNode {
    #[serde(flatten)]
    pub node: FinalizedNode,
    /// Own conditions, then each direct parent's, first occurrence kept.
    pub effective_conditions: Vec<String>,
    /// Own effects, then each direct child's, first occurrence kept.
    pub effective_effects: Vec<String>,
    pub is_consequential: bool,
    pub mutually_exclusive_with: Vec<i64>,
}

impl AggregatedNode {
    pub fn key(&self) -> NodeKey {
        self.node.key()
    }

    pub fn local_id(&self) -> Option<i64> {
        self.node.raw.local_id
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.node.raw.conversation_id
    }
}

/// Which sibling set a node belongs to inside its conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Parent(NodeKey),
    Solo(NodeKey),
}

/// The same-conversation parent if there is one, else the first parent of
/// any conversation, else the node alone.
pub fn group_key(key: &NodeKey, index: &GraphIndex) -> GroupKey {
    let parents = index.parents(key);
    parents
        .iter()
        .find(|parent| parent.conversation_id == key.conversation_id)
        .or_else(|| parents.first())
        .map_or(GroupKey::Solo(*key), |parent| GroupKey::Parent(*parent))
}

pub fn unique_strings<'a>(values: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for value in values {
        if seen.insert(value.as_str()) {
            unique.push(value.clone());
        }
    }
    unique
}

/// Annotate every node. Looks one hop only: parents for conditions, children
/// for effects and consequentiality. Output order matches input order.
pub fn aggregate(nodes: Vec<FinalizedNode>, index: &GraphIndex) -> Vec<AggregatedNode> {
    let derived: Vec<(Vec<String>, Vec<String>, bool)> = nodes
        .par_iter()
        .map(|node| {
            let key = node.key();
            let parents: Vec<&FinalizedNode> =
                index.resolve_all(index.parents(&key), &nodes).collect();
            let children: Vec<&FinalizedNode> =
                index.resolve_all(index.children(&key), &nodes).collect();

            let conditions = unique_strings(
                node.raw
                    .conditions
                    .iter()
                    .chain(parents.iter().flat_map(|p| p.raw.conditions.iter())),
            );
            let effects = unique_strings(
                node.raw
                    .effects
                    .iter()
                    .chain(children.iter().flat_map(|c| c.raw.effects.iter())),
            );
            let consequential = changes_state(node) || children.iter().any(|c| changes_state(c));

            (conditions, effects, consequential)
        })
        .collect();

    let mut exclusions = mutual_exclusions(&nodes, index);

    nodes
        .into_iter()
        .zip(derived)
        .enumerate()
        .map(
            |(position, (node, (effective_conditions, effective_effects, is_consequential)))| {
                AggregatedNode {
                    node,
                    effective_conditions,
                    effective_effects,
                    is_consequential,
                    mutually_exclusive_with: exclusions.remove(&position).unwrap_or_default(),
                }
            },
        )
        .collect()
}

// Conditions only gate a choice; the state change is carried by effects.
fn changes_state(node: &FinalizedNode) -> bool {
    !node.raw.effects.is_empty()
}

/// Sibling ids per node position, grouped within each conversation over its
/// non-sentinel, addressable nodes.
fn mutual_exclusions(nodes: &[FinalizedNode], index: &GraphIndex) -> HashMap<usize, Vec<i64>> {
    let mut groups: HashMap<(i64, GroupKey), Vec<(usize, i64)>> = HashMap::new();
    for (position, node) in nodes.iter().enumerate() {
        if node.is_sentinel() {
            continue;
        }
        let (Some(conversation), Some(id)) = (node.raw.conversation_id, node.raw.local_id) else {
            continue;
        };
        let group = group_key(&node.key(), index);
        groups
            .entry((conversation, group))
            .or_default()
            .push((position, id));
    }

    let mut exclusions = HashMap::new();
    for members in groups.into_values() {
        if members.len() <= 1 {
            continue;
        }
        for &(position, id) in &members {
            let others = members
                .iter()
                .map(|&(_, other)| other)
                .filter(|&other| other != id)
                .collect();
            exclusions.insert(position, others);
        }
    }
    exclusions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalize::finalize;
    use crate::parser::{ActorTable, DialogueLink, RawNode};

    fn node(id: i64, conditions: &[&str], effects: &[&str]) -> FinalizedNode {
        let raw = RawNode {
            conversation_id: Some(1),
            local_id: Some(id),
            raw_title: Some(format!("Node {}", id)),
            conditions: conditions.iter().map(|s| s.to_string()).collect(),
            effects: effects.iter().map(|s| s.to_string()).collect(),
            ..RawNode::default()
        };
        finalize(raw, &ActorTable::new())
    }

    fn link(from: i64, to: i64) -> DialogueLink {
        DialogueLink {
            origin_conversation_id: Some(1),
            origin_local_id: Some(from),
            destination_conversation_id: Some(1),
            destination_local_id: Some(to),
        }
    }

    fn run(nodes: Vec<FinalizedNode>, links: &[DialogueLink]) -> Vec<AggregatedNode> {
        let index = GraphIndex::build(&nodes, links);
        aggregate(nodes, &index)
    }

    #[test]
    fn test_one_hop_only() {
        let nodes = vec![node(0, &["A"], &[]), node(1, &[], &[]), node(2, &[], &["C = 1"])];
        let out = run(nodes, &[link(0, 1), link(1, 2)]);

        assert_eq!(out[1].effective_conditions, vec!["A".to_string()]);
        assert_eq!(out[1].effective_effects, vec!["C = 1".to_string()]);
        assert!(out[0].effective_effects.is_empty());
        assert!(out[2].effective_conditions.is_empty());
    }

    #[test]
    fn test_dedup_keeps_own_first() {
        let nodes = vec![node(0, &["X", "Y"], &[]), node(1, &["Y", "Z"], &[]), node(2, &["X"], &[])];
        let out = run(nodes, &[link(0, 2), link(1, 2)]);

        assert_eq!(out[2].effective_conditions, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_consequential() {
        let nodes = vec![node(0, &[], &[]), node(1, &[], &["Gold += 1"]), node(2, &[], &[])];
        let out = run(nodes, &[link(0, 1)]);

        assert!(out[0].is_consequential);
        assert!(out[1].is_consequential);
        assert!(!out[2].is_consequential);
    }

    #[test]
    fn test_condition_only_child_is_not_consequential() {
        let nodes = vec![node(0, &[], &[]), node(1, &["Flag == true"], &[])];
        let out = run(nodes, &[link(0, 1)]);

        assert!(!out[0].is_consequential);
        assert!(out[1].node.has_own_mechanics);
    }

    #[test]
    fn test_siblings_exclude_each_other() {
        let nodes = vec![node(0, &[], &[]), node(1, &[], &[]), node(2, &[], &[]), node(3, &[], &[])];
        let out = run(nodes, &[link(0, 1), link(0, 2), link(0, 3)]);

        assert!(out[0].mutually_exclusive_with.is_empty());
        assert_eq!(out[1].mutually_exclusive_with, vec![2, 3]);
        assert_eq!(out[2].mutually_exclusive_with, vec![1, 3]);
        assert_eq!(out[3].mutually_exclusive_with, vec![1, 2]);
    }

    #[test]
    fn test_same_conversation_parent_preferred() {
        let nodes = vec![node(0, &[], &[]), node(1, &[], &[]), node(2, &[], &[])];
        let foreign = DialogueLink {
            origin_conversation_id: Some(8),
            origin_local_id: Some(4),
            destination_conversation_id: Some(1),
            destination_local_id: Some(1),
        };
        let index = GraphIndex::build(&nodes, &[foreign, link(0, 1), link(0, 2)]);

        let key = NodeKey::new(Some(1), Some(1));
        assert_eq!(
            group_key(&key, &index),
            GroupKey::Parent(NodeKey::new(Some(1), Some(0)))
        );

        let out = aggregate(nodes, &index);
        assert_eq!(out[1].mutually_exclusive_with, vec![2]);
    }

    #[test]
    fn test_unique_strings() {
        let values = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(unique_strings(&values), vec!["a", "b"]);
    }
}
