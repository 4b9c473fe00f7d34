pub mod line;
pub mod state;
pub mod types;

use tracing::debug;

pub use state::ParseState;
pub use types::{ActorTable, DialogueLink, NodeKey, RawGraph, RawNode};

pub const DEFAULT_PROGRESS_INTERVAL: usize = 5000;

/// Line-oriented parser for dialogue database dumps.
///
/// Every call to [`Parser::parse`] owns a fresh [`ParseState`], so one
/// `Parser` can serve any number of independent parses.
#[derive(Debug, Clone)]
pub struct Parser {
    progress_interval: usize,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(progress_interval: usize) -> Self {
        Self {
            progress_interval: progress_interval.max(1),
        }
    }

    /// Parse the whole dump. Never fails: malformed fields degrade to
    /// `None`/empty and unrecognized lines are ignored.
    ///
    /// `on_progress(processed, total)` fires every `progress_interval` lines
    /// and once more after the pass.
    pub fn parse(
        &self,
        content: &str,
        mut on_progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> RawGraph {
        let lines: Vec<&str> = content.lines().collect();
        let total = lines.len().max(1);
        let mut state = ParseState::new();
        let mut processed = 0;

        for raw in &lines {
            processed += 1;
            if processed % self.progress_interval == 0 {
                if let Some(notify) = on_progress.as_mut() {
                    notify(processed, total);
                }
            }

            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(recognized) = line::classify(line) {
                state.feed(recognized);
            }
        }

        let (nodes, links, actors) = state.finish();
        if let Some(notify) = on_progress.as_mut() {
            notify(processed, total);
        }

        debug!(
            nodes = nodes.len(),
            links = links.len(),
            actors = actors.len(),
            "parsed dialogue dump"
        );

        RawGraph {
            nodes,
            links,
            actors,
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
