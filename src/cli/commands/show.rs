use anyhow::{bail, Context, Result};
use colored::Colorize;
use convograph::{AggregatedNode, Convograph, Game, ParsedGraph};
use std::path::Path;

use super::load_graph;
use super::search::summary;

pub fn handle(file: Option<&Path>, conversation_id: i64) -> Result<()> {
    let app = Convograph::new(".").context("Failed to load convograph configuration")?;
    let graph = load_graph(&app, file)?;

    let Some(conversation) = graph.conversation(conversation_id) else {
        bail!("Conversation {} not found", conversation_id);
    };

    let game = Game::of(conversation.id, app.config().data.games.dlc_first_conversation_id);
    println!("{} {} {}",
        "Conversation".bright_blue().bold(),
        conversation.id.to_string().bright_blue().bold(),
        format!("({})", game).bright_black());
    println!("{}", "==============".bright_blue());

    for group in conversation.groups(&graph) {
        if group.nodes.len() > 1 {
            println!("\n{}", format!("Choose one of {}:", group.nodes.len()).bright_blue());
        } else {
            println!();
        }
        for node in &group.nodes {
            print_node(&graph, node);
        }
    }

    Ok(())
}

fn print_node(graph: &ParsedGraph, node: &AggregatedNode) {
    println!("  {}", summary(node));

    if !node.effective_conditions.is_empty() {
        println!("    {} {}", "Conditions:".bright_black(), node.effective_conditions.join(" | "));
    }
    if !node.effective_effects.is_empty() {
        println!("    {} {}", "Effects:".bright_black(), node.effective_effects.join(" | "));
    }
    if !node.mutually_exclusive_with.is_empty() {
        let ids: Vec<String> = node
            .mutually_exclusive_with
            .iter()
            .map(|id| format!("#{}", id))
            .collect();
        println!("    {} {}", "Excludes:".bright_black(), ids.join(", "));
    }

    let key = node.key();
    for child in graph.children(&key) {
        if child.conversation_id() != node.conversation_id() {
            println!("    {} {}", "→".bright_cyan(), child.key());
        }
    }
    for parent in graph.parents(&key) {
        if parent.conversation_id() != node.conversation_id() {
            println!("    {} {}", "←".bright_cyan(), parent.key());
        }
    }
}
