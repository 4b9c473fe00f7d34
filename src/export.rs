use serde::{Deserialize, Serialize};

use crate::filter::FilterResult;
use crate::finalize::strip_speaker_prefix;
use crate::graph::AggregatedNode;

/// Columns included in a text export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub speaker_text: bool,
    pub conditions: bool,
    pub effects: bool,
    pub position: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            speaker_text: true,
            conditions: true,
            effects: true,
            position: true,
        }
    }
}

fn optional_id(id: Option<i64>) -> String {
    id.map_or_else(|| "?".to_string(), |n| n.to_string())
}

/// Best available text: choice text, then English, spoken, and the raw
/// title without its speaker label.
pub fn node_text(node: &AggregatedNode) -> &str {
    let raw = &node.node.raw;
    [
        node.node.display_text.as_deref(),
        raw.english_text.as_deref(),
        raw.spoken_text.as_deref(),
        raw.raw_title.as_deref().map(strip_speaker_prefix),
    ]
    .into_iter()
    .flatten()
    .find(|text| !text.is_empty())
    .unwrap_or("")
}

/// Render filtered conversations as plain text, one block per conversation.
pub fn render(result: &FilterResult<'_>, options: &ExportOptions) -> String {
    let mut lines = Vec::new();

    for conversation in &result.conversations {
        lines.push(format!("Conversation {}", conversation.id));

        for node in &conversation.nodes {
            let mut row = Vec::new();
            if options.speaker_text {
                row.push(
                    format!("- {}: {}", node.node.speaker_display(), node_text(node))
                        .trim()
                        .to_string(),
                );
            }
            if options.position {
                row.push(format!(
                    "(Node {} in conversation {})",
                    optional_id(node.local_id()),
                    optional_id(node.conversation_id())
                ));
            }
            if !row.is_empty() {
                lines.push(row.join(" "));
            }

            if options.conditions && !node.effective_conditions.is_empty() {
                lines.push(format!("  Conditions: {}", node.effective_conditions.join(" | ")));
            }
            if options.effects && !node.effective_effects.is_empty() {
                lines.push(format!("  Effects: {}", node.effective_effects.join(" | ")));
            }
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::graph::ParsedGraph;
    use crate::parser::Parser;

    const DUMP: &str = r#"
Conversation data
int id = 4
DialogueEntry data
int id = 1
string title = "Title"
string value = "Player: Sign the decree"
string conditionsString = "Decree_Ready == true"
int destinationDialogueID = 2
DialogueEntry data
int id = 2
string title = "Dialogue Text"
string value = "It is done."
string userScript = "Variable[\"Decree_Signed\"] = true;"
"#;

    #[test]
    fn test_render_all_columns() {
        let graph = ParsedGraph::build(Parser::new().parse(DUMP, None));
        let result = Filter::default().apply(&graph);
        let text = render(&result, &ExportOptions::default());

        let expected = "Conversation 4\n\
- Player: Sign the decree (Node 1 in conversation 4)\n  Conditions: Decree_Ready == true\n  Effects: Decree_Signed = true\n\
- Unknown: It is done. (Node 2 in conversation 4)\n  Conditions: Decree_Ready == true\n  Effects: Decree_Signed = true\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_without_mechanics() {
        let graph = ParsedGraph::build(Parser::new().parse(DUMP, None));
        let result = Filter::default().apply(&graph);
        let options = ExportOptions {
            conditions: false,
            effects: false,
            position: false,
            ..ExportOptions::default()
        };

        assert_eq!(
            render(&result, &options),
            "Conversation 4\n- Player: Sign the decree\n- Unknown: It is done.\n"
        );
    }
}
