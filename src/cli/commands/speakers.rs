use anyhow::{Context, Result};
use colored::Colorize;
use convograph::Convograph;
use std::path::Path;

use super::load_graph;

pub fn handle(file: Option<&Path>) -> Result<()> {
    let app = Convograph::new(".").context("Failed to load convograph configuration")?;
    let graph = load_graph(&app, file)?;
    let speakers = graph.speakers();

    println!("{}", "Speakers".bright_blue().bold());
    println!("{}", "========".bright_blue());
    println!("  {} all", "·".bright_black());
    println!("  {} player", "·".bright_black());
    println!("  {} player-side {}", "·".bright_black(), "(player and narrator)".bright_black());

    for (key, label) in &speakers {
        println!("  {} {} {}", "·".bright_black(), key.bright_cyan(), format!("({})", label).bright_black());
    }

    println!("\n{} speakers", speakers.len().to_string().bright_green());
    Ok(())
}
