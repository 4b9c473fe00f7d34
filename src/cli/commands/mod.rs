pub mod config;
pub mod export;
pub mod init;
pub mod parse;
pub mod search;
pub mod show;
pub mod speakers;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use convograph::{Convograph, Filter, Game, ParsedGraph, SpeakerFilter, WorkerMessage};
use std::path::Path;
use std::sync::Arc;

use crate::cli::FilterArgs;

fn percent(done: u64, total: u64) -> Option<u64> {
    (total > 0).then(|| (done.min(total) * 100) / total)
}

/// Load and build the graph, reporting progress on stderr.
pub fn load_graph(app: &Convograph, file: Option<&Path>) -> Result<Arc<ParsedGraph>> {
    let mut last: Option<(bool, u64)> = None;
    let graph = app
        .load(file, |message| {
            let step = match message {
                WorkerMessage::Progress { received, total } => {
                    percent(*received, *total).map(|p| (false, p))
                }
                WorkerMessage::ParseProgress { processed, total } => {
                    percent(*processed as u64, *total as u64).map(|p| (true, p))
                }
                _ => None,
            };
            if let Some(step) = step {
                if last != Some(step) {
                    let label = if step.0 {
                        "Building conversations..."
                    } else {
                        "Loading conversations..."
                    };
                    eprint!("\r{} {}%", label.bright_black(), step.1);
                    last = Some(step);
                }
            }
        })
        .context("Failed to load the dialogue dump")?;

    if last.is_some() {
        eprintln!();
    }
    Ok(graph)
}

pub fn build_filter(app: &Convograph, args: &FilterArgs) -> Result<Filter> {
    let game = args
        .game
        .as_deref()
        .map(str::parse::<Game>)
        .transpose()
        .map_err(|e: String| anyhow!(e))?;
    let speaker = args.speaker.parse::<SpeakerFilter>().map_err(|e: String| anyhow!(e))?;

    Ok(Filter {
        query: args.query.clone(),
        speaker,
        game,
        hide_narrator: args.hide_narrator,
        only_consequential: args.consequential,
        hide_mechanics: !args.include_mechanics,
        ..app.filter()
    })
}
