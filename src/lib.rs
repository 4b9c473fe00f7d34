pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod finalize;
pub mod graph;
pub mod parser;
pub mod worker;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub use cache::GraphCache;
pub use error::{ConvographError, ConvographResult, LoadError};
pub use filter::{Filter, FilterResult, Game, SpeakerFilter};
pub use graph::{AggregatedNode, ParsedGraph};
pub use worker::{ParseWorker, WorkerMessage, WorkerOptions, WorkerRequest};

/// Parse a dump and build its graph in one call.
pub fn parse(text: &str, on_progress: Option<&mut dyn FnMut(usize, usize)>) -> ParsedGraph {
    ParsedGraph::build(parser::Parser::new().parse(text, on_progress))
}

/// Project-level entry point: configuration plus a graph cache shared with
/// every worker it spawns.
#[derive(Debug, Clone)]
pub struct Convograph {
    config: config::Config,
    cache: GraphCache,
}

impl Convograph {
    pub fn new(project_root: impl AsRef<Path>) -> Result<Self> {
        let config = config::Config::load_or_default(project_root)?;

        Ok(Self {
            config,
            cache: GraphCache::new(),
        })
    }

    pub fn init(project_root: impl AsRef<Path>) -> Result<Self> {
        let project_root = project_root.as_ref();
        config::Config::init(project_root)?;

        Self::new(project_root)
    }

    pub fn config(&self) -> &config::Config {
        &self.config
    }

    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }

    pub fn filter(&self) -> Filter {
        Filter {
            dlc_first_conversation_id: self.config.data.games.dlc_first_conversation_id,
            ..Filter::default()
        }
    }

    pub fn spawn_worker(&self) -> ConvographResult<ParseWorker> {
        ParseWorker::spawn(WorkerOptions {
            progress_interval: self.config.data.parser.progress_interval,
            cache: Some(self.cache.clone()),
        })
    }

    pub fn parse(&self, text: &str) -> Arc<ParsedGraph> {
        let parser = parser::Parser::with_progress_interval(self.config.data.parser.progress_interval);
        self.cache
            .get_or_parse(text, |text| ParsedGraph::build(parser.parse(text, None)))
    }

    /// Load `path`, or the configured candidates when `None`, through a
    /// worker. `on_message` sees every progress message.
    pub fn load<F>(&self, path: Option<&Path>, on_message: F) -> ConvographResult<Arc<ParsedGraph>>
    where
        F: FnMut(&WorkerMessage),
    {
        let paths = match path {
            Some(path) => vec![path.to_path_buf()],
            None => self.config.source_paths(),
        };

        let worker = self.spawn_worker()?;
        worker
            .run_to_completion(WorkerRequest::Load { paths }, on_message)?
            .into_graph()
    }
}
