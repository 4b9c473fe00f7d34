use std::collections::HashMap;

use crate::finalize::FinalizedNode;
use crate::parser::{DialogueLink, NodeKey};

/// Lookup tables over a node list and its links.
///
/// Node entries point at positions in the slice the index was built from, so
/// the same index serves any list that preserves that order.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    node_by_key: HashMap<NodeKey, usize>,
    children_by_key: HashMap<NodeKey, Vec<NodeKey>>,
    parents_by_key: HashMap<NodeKey, Vec<NodeKey>>,
}

impl GraphIndex {
    pub fn build(nodes: &[FinalizedNode], links: &[DialogueLink]) -> Self {
        let mut node_by_key = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            let key = node.key();
            if key.is_addressable() {
                // Later records win on duplicate keys.
                node_by_key.insert(key, position);
            }
        }

        let mut children_by_key: HashMap<NodeKey, Vec<NodeKey>> = HashMap::new();
        let mut parents_by_key: HashMap<NodeKey, Vec<NodeKey>> = HashMap::new();
        for link in links {
            let origin = link.origin();
            let destination = link.destination();
            children_by_key.entry(origin).or_default().push(destination);
            parents_by_key.entry(destination).or_default().push(origin);
        }

        Self {
            node_by_key,
            children_by_key,
            parents_by_key,
        }
    }

    /// Position of the node with this key, if it resolves.
    pub fn position(&self, key: &NodeKey) -> Option<usize> {
        self.node_by_key.get(key).copied()
    }

    pub fn children(&self, key: &NodeKey) -> &[NodeKey] {
        self.children_by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parents(&self, key: &NodeKey) -> &[NodeKey] {
        self.parents_by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve each key into `items`, silently skipping dangling references.
    pub fn resolve_all<'a, T>(
        &'a self,
        keys: &'a [NodeKey],
        items: &'a [T],
    ) -> impl Iterator<Item = &'a T> + 'a {
        keys.iter()
            .filter_map(move |key| self.position(key))
            .filter_map(move |position| items.get(position))
    }

    pub fn len(&self) -> usize {
        self.node_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_by_key.is_empty()
    }
}
