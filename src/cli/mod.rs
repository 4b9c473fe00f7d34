pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convograph")]
#[command(about = "Browse the conversation graph of a dialogue database dump", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Search filters shared by `search` and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(short, long, default_value = "", help = "Text to search for")]
    pub query: String,
    #[arg(short, long, default_value = "all", help = "all, player, player-side (player and narrator), or a speaker key")]
    pub speaker: String,
    #[arg(short, long, help = "Restrict to base or dlc")]
    pub game: Option<String>,
    #[arg(long, help = "Hide narrator lines")]
    pub hide_narrator: bool,
    #[arg(long, help = "Only entries that change state")]
    pub consequential: bool,
    #[arg(long, help = "Keep entries that are pure scripting")]
    pub include_mechanics: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Initialize convograph in the current project")]
    Init {
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },

    #[command(about = "Parse a dump and report what it contains")]
    Parse {
        #[arg(help = "Dump file (defaults to source.paths)")]
        file: Option<PathBuf>,
        #[arg(long, help = "Print worker messages as JSON lines")]
        json: bool,
    },

    #[command(about = "List conversations matching the filters")]
    Search {
        #[arg(help = "Dump file (defaults to source.paths)")]
        file: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },

    #[command(about = "Show one conversation grouped into choices")]
    Show {
        #[arg(long, help = "Dump file (defaults to source.paths)")]
        file: Option<PathBuf>,
        #[arg(help = "Conversation id")]
        conversation: i64,
    },

    #[command(about = "List speakers that can be filtered on")]
    Speakers {
        #[arg(help = "Dump file (defaults to source.paths)")]
        file: Option<PathBuf>,
    },

    #[command(about = "Export filtered conversations as plain text")]
    Export {
        #[arg(help = "Dump file (defaults to source.paths)")]
        file: Option<PathBuf>,
        #[arg(short, long, help = "Output file")]
        output: PathBuf,
        #[arg(long, help = "Omit speaker and text")]
        no_speaker_text: bool,
        #[arg(long, help = "Omit conditions")]
        no_conditions: bool,
        #[arg(long, help = "Omit effects")]
        no_effects: bool,
        #[arg(long, help = "Omit node and conversation ids")]
        no_position: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },

    #[command(about = "Configure convograph settings")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Set a configuration value")]
    Set {
        key: String,
        value: String,
    },
    #[command(about = "Get a configuration value")]
    Get {
        key: String,
    },
    #[command(about = "List all configuration values")]
    List,
}
