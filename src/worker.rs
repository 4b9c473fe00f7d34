//! Background parse worker.
//!
//! One thread per [`ParseWorker`], fed through an `mpsc` channel. Each request
//! produces zero or more progress messages followed by exactly one terminal
//! [`WorkerMessage::Data`] or [`WorkerMessage::Error`].

use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

use crate::cache::GraphCache;
use crate::error::{ConvographError, ConvographResult, LoadError};
use crate::graph::ParsedGraph;
use crate::parser::{Parser, DEFAULT_PROGRESS_INTERVAL};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub enum WorkerRequest {
    /// Parse text the caller already holds.
    ParseText { text: String },
    /// Read the first loadable candidate, then parse it.
    Load { paths: Vec<PathBuf> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerMessage {
    /// Bytes read so far; `total` is 0 when the size is unknown.
    Progress { received: u64, total: u64 },
    ParseProgress { processed: usize, total: usize },
    Data {
        #[serde(flatten)]
        graph: Arc<ParsedGraph>,
    },
    Error {
        error: String,
        /// Typed load failure, kept for in-process callers.
        #[serde(skip)]
        cause: Option<Arc<LoadError>>,
    },
}

impl WorkerMessage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerMessage::Data { .. } | WorkerMessage::Error { .. })
    }

    /// Turn a terminal message into the graph or the error that ended the
    /// request. A load failure stays a [`ConvographError::Load`] unless the
    /// message was cloned along the way.
    pub fn into_graph(self) -> ConvographResult<Arc<ParsedGraph>> {
        match self {
            WorkerMessage::Data { graph } => Ok(graph),
            WorkerMessage::Error { error, cause } => Err(match cause.map(Arc::try_unwrap) {
                Some(Ok(cause)) => ConvographError::Load(cause),
                _ => ConvographError::Worker(error),
            }),
            other => Err(ConvographError::Worker(format!(
                "unexpected terminal message: {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub progress_interval: usize,
    pub cache: Option<GraphCache>,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            cache: None,
        }
    }
}

pub struct ParseWorker {
    requests: Option<Sender<WorkerRequest>>,
    messages: Receiver<WorkerMessage>,
    handle: Option<JoinHandle<()>>,
}

impl ParseWorker {
    pub fn spawn(options: WorkerOptions) -> ConvographResult<Self> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let (message_tx, message_rx) = mpsc::channel::<WorkerMessage>();

        let handle = thread::Builder::new()
            .name("convograph-parse".to_string())
            .spawn(move || {
                let parser = Parser::with_progress_interval(options.progress_interval);
                for request in request_rx {
                    process(request, &parser, options.cache.as_ref(), &message_tx);
                }
                debug!("parse worker channel closed");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            messages: message_rx,
            handle: Some(handle),
        })
    }

    pub fn send(&self, request: WorkerRequest) -> ConvographResult<()> {
        self.requests
            .as_ref()
            .ok_or_else(|| ConvographError::Worker("worker already shut down".to_string()))?
            .send(request)
            .map_err(|_| ConvographError::Worker("worker thread has exited".to_string()))
    }

    /// Block for the next message.
    pub fn recv(&self) -> ConvographResult<WorkerMessage> {
        self.messages
            .recv()
            .map_err(|_| ConvographError::Worker("worker thread has exited".to_string()))
    }

    /// Send one request and forward every message until the terminal one,
    /// which is returned.
    pub fn run_to_completion<F>(
        &self,
        request: WorkerRequest,
        mut on_message: F,
    ) -> ConvographResult<WorkerMessage>
    where
        F: FnMut(&WorkerMessage),
    {
        self.send(request)?;
        loop {
            let message = self.recv()?;
            on_message(&message);
            if message.is_terminal() {
                return Ok(message);
            }
        }
    }
}

impl Drop for ParseWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn process(
    request: WorkerRequest,
    parser: &Parser,
    cache: Option<&GraphCache>,
    tx: &Sender<WorkerMessage>,
) {
    let text = match request {
        WorkerRequest::ParseText { text } => text,
        WorkerRequest::Load { paths } => match load_first(&paths, tx) {
            Ok(text) => text,
            Err(err) => {
                let _ = tx.send(WorkerMessage::Error {
                    error: err.to_string(),
                    cause: Some(Arc::new(err)),
                });
                return;
            }
        },
    };

    let build = |text: &str| {
        let mut notify = |processed: usize, total: usize| {
            let _ = tx.send(WorkerMessage::ParseProgress { processed, total });
        };
        ParsedGraph::build(parser.parse(text, Some(&mut notify)))
    };
    let graph = match cache {
        Some(cache) => cache.get_or_parse(&text, build),
        None => Arc::new(build(text.as_str())),
    };

    info!(
        nodes = graph.nodes().len(),
        links = graph.links().len(),
        "parse request finished"
    );
    let _ = tx.send(WorkerMessage::Data { graph });
}

/// The first candidate that opens and reads wins, even if it turns out to be
/// empty. When every candidate fails the last failure is reported.
fn load_first(paths: &[PathBuf], tx: &Sender<WorkerMessage>) -> Result<String, LoadError> {
    let mut last_error = LoadError::NoSource;
    for path in paths {
        match read_chunked(path, tx) {
            Ok(bytes) => return decode(path, bytes),
            Err(err) => {
                debug!(path = ?path, error = %err, "source candidate failed");
                last_error = err;
            }
        }
    }
    Err(last_error)
}

fn read_chunked(path: &Path, tx: &Sender<WorkerMessage>) -> Result<Vec<u8>, LoadError> {
    let read_error = |source: io::Error| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_error)?;
    let total = file.metadata().map(|m| m.len()).unwrap_or(0);
    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(read_error(err)),
        };
        bytes.extend_from_slice(&chunk[..n]);
        let _ = tx.send(WorkerMessage::Progress {
            received: bytes.len() as u64,
            total,
        });
    }

    Ok(bytes)
}

fn decode(path: &Path, bytes: Vec<u8>) -> Result<String, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
            bytes: 0,
        });
    }
    String::from_utf8(bytes).map_err(|_| LoadError::Encoding {
        path: path.to_path_buf(),
    })
}
