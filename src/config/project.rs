use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::ConfigData;
use crate::error::ConfigError;

pub const CONFIG_DIR: &str = ".convograph";
pub const CONFIG_FILE: &str = "config.toml";

/// Every key accepted by [`Config::get`] and [`Config::set`].
pub const KEYS: &[&str] = &[
    "source.paths",
    "parser.progress_interval",
    "games.dlc_first_conversation_id",
    "export.speaker_text",
    "export.conditions",
    "export.effects",
    "export.position",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub data: ConfigData,
    pub path: PathBuf,
}

impl Config {
    pub fn load_or_default(project_root: impl AsRef<Path>) -> Result<Self> {
        let config_path = project_root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);

        let data = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            ConfigData::default()
        };

        Ok(Self {
            data,
            path: config_path,
        })
    }

    pub fn init(project_root: impl AsRef<Path>) -> Result<()> {
        let config_dir = project_root.as_ref().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).context("Failed to create .convograph directory")?;

        let config_path = config_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            let initial_config = ConfigData::default();
            let content = toml::to_string_pretty(&initial_config)
                .context("Failed to serialize initial config")?;
            fs::write(&config_path, content).context("Failed to write initial config")?;
        }

        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(&self.data)
            .context("Failed to serialize config")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(&self.path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "source.paths" => {
                self.data.source.paths = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect();
            }
            "parser.progress_interval" => {
                let interval: usize = value.parse().map_err(|_| invalid())?;
                if interval == 0 {
                    return Err(invalid().into());
                }
                self.data.parser.progress_interval = interval;
            }
            "games.dlc_first_conversation_id" => {
                self.data.games.dlc_first_conversation_id =
                    value.parse().map_err(|_| invalid())?;
            }
            "export.speaker_text" => {
                self.data.export.speaker_text = value.parse().map_err(|_| invalid())?;
            }
            "export.conditions" => {
                self.data.export.conditions = value.parse().map_err(|_| invalid())?;
            }
            "export.effects" => {
                self.data.export.effects = value.parse().map_err(|_| invalid())?;
            }
            "export.position" => {
                self.data.export.position = value.parse().map_err(|_| invalid())?;
            }
            _ => return Err(ConfigError::UnknownKey { key: key.to_string() }.into()),
        }

        self.save()?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "source.paths" => self
                .data
                .source
                .paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(","),
            "parser.progress_interval" => self.data.parser.progress_interval.to_string(),
            "games.dlc_first_conversation_id" => {
                self.data.games.dlc_first_conversation_id.to_string()
            }
            "export.speaker_text" => self.data.export.speaker_text.to_string(),
            "export.conditions" => self.data.export.conditions.to_string(),
            "export.effects" => self.data.export.effects.to_string(),
            "export.position" => self.data.export.position.to_string(),
            _ => return Err(ConfigError::UnknownKey { key: key.to_string() }.into()),
        };

        Ok(value)
    }

    /// Candidate source paths resolved against the project root.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        let root = self
            .path
            .parent()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        self.data
            .source
            .paths
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { root.join(p) })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: ConfigData::default(),
            path: PathBuf::from(CONFIG_DIR).join(CONFIG_FILE),
        }
    }
}
