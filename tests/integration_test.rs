use convograph::parser::{NodeKey, Parser};
use convograph::{Convograph, ConvographError, Filter, LoadError, ParsedGraph, WorkerMessage};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

const SCENARIO: &str = r#"
Actor data
int id = 1
string title = "Name"
string value = "Player"
Conversation data
int id = 5
DialogueEntry data
int id = 0
int conversationID = 5
string title = "Title"
string value = "START"
int destinationDialogueID = 1
DialogueEntry data
int id = 1
int conversationID = 5
string title = "Title"
string value = "Player: Hello"
string title = "Menu Text"
string value = "Hello"
int originConversationID = 5
int originDialogueID = 1
int destinationConversationID = 5
int destinationDialogueID = 2
DialogueEntry data
int id = 2
int conversationID = 5
string title = "Title"
string value = "NPC: Hi"
string conditionsString = "Flag==true"
"#;

fn build(text: &str) -> ParsedGraph {
    ParsedGraph::build(Parser::new().parse(text, None))
}

fn key(conversation: i64, local: i64) -> NodeKey {
    NodeKey::new(Some(conversation), Some(local))
}

#[test]
fn test_greeting_scenario() {
    let graph = build(SCENARIO);

    let hello = graph.node(&key(5, 1)).unwrap();
    assert!(hello.node.is_player_choice);
    assert_eq!(hello.node.display_text.as_deref(), Some("Hello"));
    assert_eq!(hello.node.speaker_canonical_key.as_deref(), Some("player"));
    assert!(!hello.is_consequential);

    let reply = graph.node(&key(5, 2)).unwrap();
    assert_eq!(reply.effective_conditions, vec!["Flag==true".to_string()]);
    assert_eq!(reply.node.speaker_canonical_key.as_deref(), Some("npc"));

    let conversation = graph.conversation(5).unwrap();
    let listed: Vec<Option<i64>> = conversation
        .groups(&graph)
        .iter()
        .flat_map(|g| g.nodes.iter().map(|n| n.local_id()))
        .collect();
    assert_eq!(listed, vec![Some(1), Some(2)]);
}

#[test]
fn test_parsing_is_deterministic() {
    let first = serde_json::to_string(&build(SCENARIO)).unwrap();
    let second = serde_json::to_string(&convograph::parse(SCENARIO, None)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_duplicate_key_last_write_wins() {
    let dump = r#"
Conversation data
int id = 8
DialogueEntry data
int id = 4
string title = "Title"
string value = "Aide: First copy"
DialogueEntry data
int id = 4
string title = "Title"
string value = "Aide: Second copy"
"#;
    let graph = build(dump);

    assert_eq!(graph.nodes().len(), 2);
    assert_eq!(graph.index().len(), 1);
    let node = graph.node(&key(8, 4)).unwrap();
    assert_eq!(node.node.raw.raw_title.as_deref(), Some("Aide: Second copy"));
}

#[test]
fn test_aggregation_stops_after_one_hop() {
    let dump = r#"
Conversation data
int id = 1
DialogueEntry data
int id = 1
string conditionsString = "Army > 3"
int destinationDialogueID = 2
DialogueEntry data
int id = 2
int destinationDialogueID = 3
DialogueEntry data
int id = 3
string userScript = "Variable[\"War\"] = true;"
"#;
    let graph = build(dump);
    let a = graph.node(&key(1, 1)).unwrap();
    let b = graph.node(&key(1, 2)).unwrap();
    let c = graph.node(&key(1, 3)).unwrap();

    assert_eq!(b.effective_conditions, vec!["Army > 3".to_string()]);
    assert_eq!(b.effective_effects, vec!["War = true".to_string()]);
    assert!(a.effective_effects.is_empty());
    assert!(c.effective_conditions.is_empty());

    assert!(b.is_consequential);
    assert!(!a.is_consequential);
}

#[test]
fn test_leaf_without_mechanics_is_not_consequential() {
    let graph = build(SCENARIO);
    let reply = graph.node(&key(5, 2)).unwrap();

    assert!(graph.children(&reply.key()).next().is_none());
    assert!(!reply.is_consequential);
}

#[test]
fn test_mutual_exclusion_is_symmetric() {
    let dump = r#"
Conversation data
int id = 3
DialogueEntry data
int id = 10
string title = "Title"
string value = "Petr: What now?"
int destinationDialogueID = 11
int destinationDialogueID = 12
int destinationDialogueID = 13
DialogueEntry data
int id = 11
string title = "Title"
string value = "Player: Agree"
DialogueEntry data
int id = 12
string title = "Title"
string value = "Player: Refuse"
DialogueEntry data
int id = 13
string title = "Title"
string value = "Player: Stall"
"#;
    let graph = build(dump);
    let siblings: Vec<_> = [11, 12, 13]
        .iter()
        .map(|&id| graph.node(&key(3, id)).unwrap())
        .collect();

    for x in &siblings {
        for y in &siblings {
            let (xid, yid) = (x.local_id().unwrap(), y.local_id().unwrap());
            if xid == yid {
                assert!(!x.mutually_exclusive_with.contains(&xid));
                continue;
            }
            assert_eq!(
                x.mutually_exclusive_with.contains(&yid),
                y.mutually_exclusive_with.contains(&xid)
            );
            assert!(x.mutually_exclusive_with.contains(&yid));
        }
    }
    assert!(graph.node(&key(3, 10)).unwrap().mutually_exclusive_with.is_empty());
}

#[test]
fn test_sentinels_never_listed() {
    let dump = r#"
Conversation data
int id = 2
DialogueEntry data
int id = 0
string title = "Title"
string value = "start"
DialogueEntry data
int id = 1
string title = "Title"
string value = "INPUT"
DialogueEntry data
int id = 2
string title = "Title"
string value = "Output"
DialogueEntry data
int id = 3
string title = "Title"
string value = "Player: Real line"
"#;
    let graph = build(dump);
    let ids: Vec<_> = graph
        .conversations()
        .iter()
        .flat_map(|c| c.groups(&graph))
        .flat_map(|g| g.nodes.into_iter().map(|n| n.local_id()))
        .collect();

    assert_eq!(ids, vec![Some(3)]);
    assert_eq!(Filter::default().apply(&graph).visible, 1);
}

#[test]
fn test_malformed_destination_is_unresolvable() {
    let dump = r#"
Conversation data
int id = 6
DialogueEntry data
int id = 1
string title = "Title"
string value = "Player: Onward"
int destinationDialogueID = soon
"#;
    let graph = build(dump);

    assert_eq!(graph.links().len(), 1);
    assert_eq!(graph.links()[0].destination_local_id, None);
    assert!(graph.children(&key(6, 1)).next().is_none());
}

#[test]
fn test_empty_input_gives_empty_graph() {
    let graph = build("");

    assert!(graph.nodes().is_empty());
    assert!(graph.links().is_empty());
    assert!(graph.conversations().is_empty());
}

#[test]
fn test_project_load_through_worker() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let app = Convograph::init(temp_dir.path())?;
    let dump_path = temp_dir.path().join("data").join("Suzerain.txt");
    fs::create_dir_all(dump_path.parent().unwrap())?;
    fs::write(&dump_path, SCENARIO)?;

    let mut kinds = Vec::new();
    let graph = app.load(None, |message| {
        kinds.push(match message {
            WorkerMessage::Progress { .. } => "progress",
            WorkerMessage::ParseProgress { .. } => "parse-progress",
            WorkerMessage::Data { .. } => "data",
            WorkerMessage::Error { .. } => "error",
        })
    })?;

    assert_eq!(kinds.first(), Some(&"progress"));
    assert_eq!(kinds.last(), Some(&"data"));
    assert_eq!(graph.nodes().len(), 3);
    assert_eq!(app.cache().len(), 1);

    Ok(())
}

#[test]
fn test_project_load_reports_missing_dump() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let app = Convograph::init(temp_dir.path())?;

    let result = app.load(Some(&temp_dir.path().join("nowhere.txt")), |_| {});
    let error = result.unwrap_err().to_string();
    assert!(error.contains("nowhere.txt"));

    Ok(())
}

#[test]
fn test_project_load_keeps_typed_load_errors() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let app = Convograph::init(temp_dir.path())?;
    let empty = temp_dir.path().join("empty.txt");
    fs::write(&empty, "")?;

    match app.load(Some(&empty), |_| {}) {
        Err(ConvographError::Load(LoadError::Empty { path, bytes })) => {
            assert_eq!(path, empty);
            assert_eq!(bytes, 0);
        }
        other => panic!("expected an empty-dump error, got {:?}", other.map(|_| ())),
    }

    let missing = app
        .load(Some(&temp_dir.path().join("nowhere.txt")), |_| {})
        .map(|_| ())
        .map_err(anyhow::Error::from)
        .unwrap_err();
    let (first, _) = convograph::error::hint(&missing).unwrap();
    assert!(first.contains("source.paths"));

    Ok(())
}

#[test]
fn test_project_config_drives_filter() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    Convograph::init(temp_dir.path())?;
    let mut config = convograph::config::Config::load_or_default(temp_dir.path())?;
    config.set("games.dlc_first_conversation_id", "5")?;

    let app = Convograph::new(temp_dir.path())?;
    assert_eq!(app.filter().dlc_first_conversation_id, 5);

    let graph = app.parse(SCENARIO);
    let filter = Filter {
        game: Some(convograph::Game::Base),
        ..app.filter()
    };
    assert_eq!(filter.apply(&graph).visible, 0);

    Ok(())
}
