use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Convograph operations
#[derive(Error, Debug)]
pub enum ConvographError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker failed: {0}")]
    Worker(String),
}

/// Failures while fetching the dump text. Parsing itself never fails.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Loaded {path:?} but got {bytes} bytes")]
    Empty { path: PathBuf, bytes: u64 },

    #[error("Loaded {path:?} but it is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("No source path to load from")]
    NoSource,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown config key: {key}")]
    UnknownKey { key: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Result type alias for Convograph operations
pub type ConvographResult<T> = Result<T, ConvographError>;

/// Error display helper for CLI
pub fn display_error(error: &anyhow::Error) {
    use colored::Colorize;

    eprintln!("\n{} {}", "✗".bright_red().bold(), "Operation failed".bright_red().bold());
    eprintln!("  {} {}", "├".bright_black(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} Caused by: {}", "├".bright_black(), cause);
    }

    match hint(error) {
        Some((first, rest)) => {
            eprintln!("  {} {}", "└".bright_cyan(), first);
            for line in rest {
                eprintln!("    {}", line);
            }
        }
        None => {
            eprintln!(
                "  {} Run with {} for more details",
                "└".bright_black(),
                "RUST_LOG=debug".bright_cyan()
            );
        }
    }
}

/// Suggested next step for known failures.
pub fn hint(error: &anyhow::Error) -> Option<(String, Vec<String>)> {
    match error.downcast_ref::<ConvographError>()? {
        ConvographError::Load(LoadError::Empty { path, .. }) => Some((
            format!("{:?} exists but is empty", path),
            vec!["Re-export the dialogue database and try again".to_string()],
        )),
        ConvographError::Load(LoadError::NoSource) | ConvographError::Load(LoadError::Read { .. }) => Some((
            "Pass a dump file or set source.paths".to_string(),
            vec!["Try: convograph config set source.paths data/Suzerain.txt".to_string()],
        )),
        ConvographError::Config(ConfigError::UnknownKey { .. }) => Some((
            "Run convograph config list to see available keys".to_string(),
            Vec::new(),
        )),
        _ => None,
    }
}
