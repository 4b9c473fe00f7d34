use convograph::classify::is_mechanics_only;
use convograph::parser::{NodeKey, Parser};
use convograph::{Filter, ParsedGraph};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;

fn build(text: &str) -> ParsedGraph {
    ParsedGraph::build(Parser::new().parse(text, None))
}

#[test]
fn test_windows_line_endings() {
    let dump = "Conversation data\r\nint id = 1\r\nDialogueEntry data\r\nint id = 2\r\nstring title = \"Title\"\r\nstring value = \"Player: Yes\"\r\n";
    let graph = build(dump);
    let node = graph.node(&NodeKey::new(Some(1), Some(2))).unwrap();

    assert_eq!(node.node.display_text.as_deref(), Some("Yes"));
}

#[test]
fn test_escaped_quotes_in_choice_text() {
    let dump = r#"
Conversation data
int id = 1
DialogueEntry data
int id = 1
string title = "Title"
string value = "Player: \"We march at dawn.\""
"#;
    let graph = build(dump);
    let node = graph.node(&NodeKey::new(Some(1), Some(1))).unwrap();

    assert_eq!(node.node.display_text.as_deref(), Some("We march at dawn."));
}

#[test]
fn test_every_effect_on_a_line_is_captured() {
    let dump = r#"
Conversation data
int id = 1
DialogueEntry data
int id = 1
string userScript = "Variable[\"Budget\"] -= 2; Variable[\"Unrest\"] += 1; Variable[\"Loyalty\"] = 0;"
"#;
    let graph = build(dump);
    let node = graph.node(&NodeKey::new(Some(1), Some(1))).unwrap();

    assert_eq!(
        node.node.raw.effects,
        vec![
            "Budget -= 2".to_string(),
            "Unrest += 1".to_string(),
            "Loyalty = 0".to_string(),
        ]
    );
    assert!(node.node.has_own_mechanics);
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_mismatched_conversation_id_keeps_enclosing_id() {
    let dump = r#"
Conversation data
int id = 9
DialogueEntry data
int id = 1
int conversationID = 4
string title = "Title"
string value = "Player: Which one?"
"#;
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let graph = tracing::subscriber::with_default(subscriber, || build(dump));

    assert!(graph.node(&NodeKey::new(Some(9), Some(1))).is_some());
    assert!(graph.node(&NodeKey::new(Some(4), Some(1))).is_none());

    let output = log.contents();
    assert!(output.contains("conversationID mismatch for entry"));
    assert!(output.contains("declared=Some(4)"));
    assert!(output.contains("block=Some(9)"));
}

#[test]
fn test_item_and_variable_blocks_do_not_rename_actors() {
    let dump = r#"
Actor data
int id = 7
string title = "Name"
string value = "Petr Vyshny"
Item data
int id = 2
string title = "Name"
string value = "Decree Folder"
Variable data
int id = 900
string title = "Name"
string value = "BaseGame.Budget"
Conversation data
int id = 11
DialogueEntry data
int id = 1
string title = "Actor"
string value = "7"
string title = "Dialogue Text"
string value = "Sign it."
"#;
    let graph = build(dump);
    let node = graph.node(&NodeKey::new(Some(11), Some(1))).unwrap();

    assert_eq!(node.node.speaker_raw.as_deref(), Some("Petr Vyshny"));
    assert_eq!(node.node.speaker_canonical_key.as_deref(), Some("petr vyshny"));
}

#[test]
fn test_entry_without_id_is_kept_but_unaddressable() {
    let dump = r#"
Conversation data
int id = 2
DialogueEntry data
string title = "Title"
string value = "Aide: Nameless"
"#;
    let graph = build(dump);

    assert_eq!(graph.nodes().len(), 1);
    assert_eq!(graph.nodes()[0].local_id(), None);
    assert!(graph.index().is_empty());
    assert!(graph.nodes()[0].mutually_exclusive_with.is_empty());
}

#[test]
fn test_unrecognized_lines_are_ignored() {
    let dump = r#"
Conversation data
int id = 2
float weight = 0.5
DialogueEntry data
int id = 1
bool isGroup = false
string title = "Title"
string value = "Aide: Still here"
"#;
    let graph = build(dump);

    assert_eq!(graph.nodes().len(), 1);
    assert_eq!(
        graph.nodes()[0].node.speaker_canonical_key.as_deref(),
        Some("aide")
    );
}

#[test]
fn test_script_only_entries_hidden_by_default_filter() {
    let dump = r#"
Conversation data
int id = 1
DialogueEntry data
int id = 1
string userScript = "Variable[\"Coup\"] = true;"
DialogueEntry data
int id = 2
string title = "Dialogue Text"
string value = "The generals are restless."
"#;
    let graph = build(dump);
    let script = graph.node(&NodeKey::new(Some(1), Some(1))).unwrap();
    let line = graph.node(&NodeKey::new(Some(1), Some(2))).unwrap();

    assert!(is_mechanics_only(script));
    assert!(!is_mechanics_only(line));

    let filter = Filter {
        hide_mechanics: true,
        ..Filter::default()
    };
    assert_eq!(filter.apply(&graph).visible, 1);
    assert_eq!(Filter::default().apply(&graph).visible, 2);
}

#[test]
fn test_independent_parses_on_many_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let dump = format!(
                    "Conversation data\nint id = {i}\nDialogueEntry data\nint id = 1\nstring title = \"Title\"\nstring value = \"Player: Thread {i}\"\n"
                );
                let graph = build(&dump);
                graph
                    .node(&NodeKey::new(Some(i), Some(1)))
                    .and_then(|n| n.node.display_text.clone())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(format!("Thread {}", i)));
    }
}

#[test]
fn test_progress_fires_on_interval_and_at_end() {
    let dump = "x\n".repeat(12);
    let mut calls = Vec::new();
    let mut record = |processed: usize, total: usize| calls.push((processed, total));

    Parser::with_progress_interval(5).parse(&dump, Some(&mut record));

    assert_eq!(calls, vec![(5, 12), (10, 12), (12, 12)]);
}
