use anyhow::{Context, Result};
use colored::Colorize;
use convograph::{Convograph, WorkerRequest};
use std::path::{Path, PathBuf};

use super::load_graph;

pub fn handle(file: Option<&Path>, json: bool) -> Result<()> {
    let app = Convograph::new(".").context("Failed to load convograph configuration")?;

    if json {
        return stream_json(&app, file);
    }

    let graph = load_graph(&app, file)?;
    let conversations = graph.conversations();

    println!("{}", "Dialogue Dump".bright_blue().bold());
    println!("{}", "=============".bright_blue());
    println!("  {} {}", "Entries:".bright_cyan(), graph.nodes().len());
    println!("  {} {}", "Links:".bright_cyan(), graph.links().len());
    println!("  {} {}", "Conversations:".bright_cyan(), conversations.len());
    println!("  {} {}", "Choices:".bright_cyan(), graph.choices().count());
    println!("  {} {}", "Triggers:".bright_cyan(), graph.triggers().count());
    println!("  {} {}", "Speakers:".bright_cyan(), graph.speakers().len());

    let consequential = graph.nodes().iter().filter(|n| n.is_consequential).count();
    println!("  {} {}", "Consequential:".bright_cyan(), consequential);

    Ok(())
}

/// One JSON object per worker message on stdout.
fn stream_json(app: &Convograph, file: Option<&Path>) -> Result<()> {
    let paths: Vec<PathBuf> = match file {
        Some(path) => vec![path.to_path_buf()],
        None => app.config().source_paths(),
    };

    let worker = app.spawn_worker()?;
    let mut failure = None;
    let last = worker.run_to_completion(WorkerRequest::Load { paths }, |message| {
        match serde_json::to_string(message) {
            Ok(line) => println!("{}", line),
            Err(err) => failure = Some(err),
        }
    })?;

    if let Some(err) = failure {
        return Err(err).context("Failed to serialize worker message");
    }
    last.into_graph()?;
    Ok(())
}
