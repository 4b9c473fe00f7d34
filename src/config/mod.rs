pub mod project;

pub use project::Config;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::export::ExportOptions;
use crate::parser::DEFAULT_PROGRESS_INTERVAL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    pub version: String,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub games: GamesConfig,
    #[serde(default)]
    pub export: ExportOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Candidate dump locations, tried in order.
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub progress_interval: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamesConfig {
    /// Conversations with this id or above belong to the DLC.
    pub dlc_first_conversation_id: i64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            paths: [
                "data/Suzerain.txt",
                "data/suzerain.txt",
                "../data/Suzerain.txt",
                "../data/suzerain.txt",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            dlc_first_conversation_id: 287,
        }
    }
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            source: SourceConfig::default(),
            parser: ParserConfig::default(),
            games: GamesConfig::default(),
            export: ExportOptions::default(),
        }
    }
}
