use anyhow::{Context, Result};
use colored::Colorize;
use convograph::export::node_text;
use convograph::{AggregatedNode, Convograph, Game};
use std::path::Path;

use super::{build_filter, load_graph};
use crate::cli::FilterArgs;

pub fn handle(file: Option<&Path>, args: &FilterArgs) -> Result<()> {
    let app = Convograph::new(".").context("Failed to load convograph configuration")?;
    let filter = build_filter(&app, args)?;
    let graph = load_graph(&app, file)?;
    let result = filter.apply(&graph);

    println!("{}", "Conversations".bright_blue().bold());
    println!("{}", "=============".bright_blue());
    println!("Showing {} of {} entries\n",
        result.visible.to_string().bright_green(),
        result.total);

    if result.conversations.is_empty() {
        println!("{} No entries match these filters", "ℹ".bright_blue());
        return Ok(());
    }

    for conversation in &result.conversations {
        let game = Game::of(conversation.id, filter.dlc_first_conversation_id);
        println!("{} {} {}",
            "Conversation".bright_blue().bold(),
            conversation.id.to_string().bright_blue().bold(),
            format!("({})", game).bright_black());

        for node in &conversation.nodes {
            println!("  {}", summary(node));
        }
        println!();
    }

    Ok(())
}

pub fn summary(node: &AggregatedNode) -> String {
    let id = node
        .local_id()
        .map_or_else(|| "#?".to_string(), |id| format!("#{}", id));
    let mut line = format!("{} {}: {}",
        id.bright_black(),
        node.node.speaker_display().bright_cyan(),
        node_text(node));
    if node.is_consequential {
        line.push_str(&format!(" {}", "[consequential]".bright_yellow()));
    }
    line
}
