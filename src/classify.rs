//! Heuristic detection of entries whose visible text only restates mechanics.
//!
//! This is a text-similarity filter, not a structural rule: false positives
//! and negatives are expected, and the tests below pin current behaviour
//! rather than a single correct answer.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, Anchored, Input, MatchKind, StartKind};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::AggregatedNode;

/// Command-like openings, matched case-insensitively at the start of the text.
pub const COMMAND_PREFIXES: &[&str] = &[
    "end()",
    "end",
    "jump to:",
    "//",
    "continue()",
    "setvariable(",
    "setquestentrystate(",
    "setqueststate(",
    "setstatus(",
    "showalert(",
    "sequencer",
    "playsequence(",
    "waitformessage(",
    "randomelement(",
];

/// Namespaces that only appear in variable references.
pub const NAMESPACE_PREFIXES: &[&str] = &[
    "BaseGame.",
    "RiziaDLC.",
    "Variable[",
    "Actor[",
    "Item[",
    "Quest[",
    "Dialog[",
];

static COMMANDS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostLongest)
        .start_kind(StartKind::Anchored)
        .build(COMMAND_PREFIXES)
        .expect("Failed to compile command prefixes")
});

static EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[A-Za-z_][\w.\[\]"\\]*\s*(==|!=|>=|<=|\+=|-=|=|>|<)\s*\S+"#)
        .expect("Failed to compile expression pattern")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace pattern"));

/// True when the text opens with a command prefix. Word-like prefixes must
/// end at a word boundary so `end` does not match `Endless`.
pub fn starts_with_command(text: &str) -> bool {
    let input = Input::new(text).anchored(Anchored::Yes);
    let Some(found) = COMMANDS.find(input) else {
        return false;
    };
    let pattern = COMMAND_PREFIXES[found.pattern().as_usize()];
    let word_like = pattern
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    !word_like
        || !text[found.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric())
}

pub fn looks_like_expression(text: &str) -> bool {
    EXPRESSION.is_match(text) || NAMESPACE_PREFIXES.iter().any(|p| text.starts_with(p))
}

fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_lowercase()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Whether an entry's visible text is noise next to its own mechanics.
pub fn is_mechanics_only(node: &AggregatedNode) -> bool {
    let finalized = &node.node;
    let raw = &finalized.raw;

    let primary = non_empty(finalized.display_text.as_deref())
        .or_else(|| non_empty(raw.spoken_text.as_deref()))
        .or_else(|| non_empty(raw.english_text.as_deref()))
        .or_else(|| non_empty(raw.raw_title.as_deref()));

    if primary.is_some_and(starts_with_command) {
        return true;
    }

    let has_dialogue =
        non_empty(raw.spoken_text.as_deref()).is_some() || non_empty(raw.menu_text.as_deref()).is_some();
    if !has_dialogue {
        if finalized.has_own_mechanics {
            return true;
        }
        let remaining = non_empty(finalized.display_text.as_deref())
            .or_else(|| non_empty(raw.raw_title.as_deref()));
        if remaining.is_some_and(looks_like_expression) {
            return true;
        }
    }

    let Some(primary) = primary else {
        return !raw.effects.is_empty() || !raw.conditions.is_empty();
    };

    let text = normalize(primary);
    [&node.effective_effects, &node.effective_conditions]
        .into_iter()
        .filter(|items| !items.is_empty())
        .map(|items| normalize(&items.join(" ")))
        .any(|blob| text == blob || blob.contains(&text) || text.contains(&blob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalize::finalize;
    use crate::parser::{ActorTable, RawNode};

    fn classify(raw: RawNode) -> bool {
        let finalized = finalize(raw, &ActorTable::new());
        let node = AggregatedNode {
            effective_conditions: finalized.raw.conditions.clone(),
            effective_effects: finalized.raw.effects.clone(),
            node: finalized,
            is_consequential: false,
            mutually_exclusive_with: Vec::new(),
        };
        is_mechanics_only(&node)
    }

    fn titled(title: &str) -> RawNode {
        RawNode {
            conversation_id: Some(1),
            local_id: Some(1),
            raw_title: Some(title.to_string()),
            ..RawNode::default()
        }
    }

    #[test]
    fn test_command_prefixes() {
        assert!(classify(titled("END()")));
        assert!(classify(titled("end")));
        assert!(classify(titled("Jump to: 45")));
        assert!(classify(titled("// designer note")));
        assert!(classify(titled("SetQuestState(\"Act2\", \"active\")")));
    }

    #[test]
    fn test_end_requires_word_boundary() {
        assert!(!starts_with_command("Endless corridors"));
        assert!(starts_with_command("end."));
    }

    #[test]
    fn test_mechanics_without_dialogue() {
        let mut raw = titled("Check loyalty");
        raw.conditions.push("Loyalty > 3".to_string());
        assert!(classify(raw));
    }

    #[test]
    fn test_bare_expression_title() {
        assert!(classify(titled("BaseGame.Met_Petr == true")));
        assert!(classify(titled("Gold >= 10")));
        assert!(classify(titled("RiziaDLC.Flag")));
    }

    #[test]
    fn test_empty_node_is_not_mechanics() {
        assert!(!classify(RawNode::default()));
    }

    #[test]
    fn test_empty_text_with_mechanics() {
        let mut raw = RawNode::default();
        raw.effects.push("Gold += 1".to_string());
        assert!(classify(raw));
    }

    #[test]
    fn test_text_restating_effects() {
        let mut raw = titled("Generic");
        raw.menu_text = Some("Trust  +=   1".to_string());
        raw.effects.push("Trust += 1".to_string());
        assert!(classify(raw));
    }

    #[test]
    fn test_real_dialogue() {
        let mut raw = titled("Player: We march at dawn.");
        raw.menu_text = Some("We march at dawn.".to_string());
        raw.effects.push("Army_Morale += 1".to_string());
        assert!(!classify(raw));

        let mut spoken = titled("Petr: Hello");
        spoken.spoken_text = Some("Good evening, President.".to_string());
        assert!(!classify(spoken));
    }
}
