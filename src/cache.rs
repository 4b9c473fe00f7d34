use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::graph::ParsedGraph;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub graph: Arc<ParsedGraph>,
    pub parsed_at: DateTime<Utc>,
    pub bytes: usize,
}

/// In-memory parse results keyed by the SHA-256 of the dump text. Clones
/// share the same entries.
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn digest(text: &str) -> String {
        format!("{:x}", Sha256::digest(text.as_bytes()))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached graph for `text`, or run `parse` and remember it.
    /// The lock is not held while parsing.
    pub fn get_or_parse<F>(&self, text: &str, parse: F) -> Arc<ParsedGraph>
    where
        F: FnOnce(&str) -> ParsedGraph,
    {
        let key = Self::digest(text);
        if let Some(entry) = self.lock().get(&key) {
            debug!(digest = %key, "graph cache hit");
            return Arc::clone(&entry.graph);
        }

        debug!(digest = %key, bytes = text.len(), "graph cache miss");
        let graph = Arc::new(parse(text));
        let entry = CacheEntry {
            graph: Arc::clone(&graph),
            parsed_at: Utc::now(),
            bytes: text.len(),
        };
        self.lock().entry(key).or_insert(entry).graph.clone()
    }

    pub fn entry(&self, text: &str) -> Option<CacheEntry> {
        self.lock().get(&Self::digest(text)).cloned()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lock().contains_key(&Self::digest(text))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
