use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use convograph::Convograph;

pub fn handle(path: &Path) -> Result<()> {
    println!("{}", "Initializing convograph in your project...".bright_blue().bold());
    println!();

    let app = Convograph::init(path)
        .context("Failed to initialize convograph in the specified directory")?;
    println!("  {} Created .convograph/config.toml", "✓".bright_green());

    println!("\n{}", "Dump locations tried in order:".bright_blue());
    for candidate in app.config().source_paths() {
        let marker = if candidate.exists() {
            "✓".bright_green()
        } else {
            "·".bright_black()
        };
        println!("  {} {}", marker, candidate.display());
    }

    println!("\n{}", "Quick start:".bright_blue().bold());
    println!("  1. Point convograph at your dump:");
    println!("     {}", "convograph config set source.paths data/Suzerain.txt".bright_yellow());
    println!("  2. Search it:");
    println!("     {}", "convograph search -q taxes --consequential".bright_yellow());

    Ok(())
}
