use anyhow::{Context, Result};
use colored::Colorize;
use convograph::export::{render, ExportOptions};
use convograph::Convograph;
use std::path::Path;

use super::{build_filter, load_graph};
use crate::cli::FilterArgs;

pub struct ExportArgs<'a> {
    pub file: Option<&'a Path>,
    pub output: &'a Path,
    pub no_speaker_text: bool,
    pub no_conditions: bool,
    pub no_effects: bool,
    pub no_position: bool,
    pub filters: &'a FilterArgs,
}

pub fn handle(args: ExportArgs<'_>) -> Result<()> {
    let app = Convograph::new(".").context("Failed to load convograph configuration")?;
    let filter = build_filter(&app, args.filters)?;
    let defaults = app.config().data.export;
    let options = ExportOptions {
        speaker_text: defaults.speaker_text && !args.no_speaker_text,
        conditions: defaults.conditions && !args.no_conditions,
        effects: defaults.effects && !args.no_effects,
        position: defaults.position && !args.no_position,
    };

    let graph = load_graph(&app, args.file)?;
    let result = filter.apply(&graph);
    let text = render(&result, &options);

    std::fs::write(args.output, text)
        .with_context(|| format!("Failed to write export: {}", args.output.display()))?;

    println!("{} Exported {} entries from {} conversations to {}",
        "✓".bright_green(),
        result.visible,
        result.conversations.len(),
        args.output.display().to_string().bright_cyan());
    Ok(())
}
