use tracing::warn;

use super::line::{parse_int, Line};
use super::types::{ActorTable, DialogueLink, RawNode};
use crate::finalize::{finalize, FinalizedNode};

#[derive(Debug, Default)]
struct ActorDraft {
    id: Option<i64>,
    name: Option<String>,
    pending_title: Option<String>,
}

#[derive(Debug, Default)]
struct LinkScratch {
    origin_conversation: Option<i64>,
    origin_dialogue: Option<i64>,
    destination_conversation: Option<i64>,
}

#[derive(Debug)]
struct EntryDraft {
    node: RawNode,
    pending_title: Option<String>,
    link: LinkScratch,
}

#[derive(Debug)]
enum Mode {
    Outside,
    Actor(ActorDraft),
    /// Inside a conversation block, outside any dialogue entry.
    ConversationHeader,
    Dialogue(EntryDraft),
}

/// All mutable state of one parse pass.
///
/// Raw nodes are kept until the pass ends so the actor table is complete
/// (actor blocks may follow conversations in some dumps) before finalizing.
#[derive(Debug)]
pub struct ParseState {
    mode: Mode,
    conversation_id: Option<i64>,
    raw_nodes: Vec<RawNode>,
    links: Vec<DialogueLink>,
    actors: ActorTable,
}

impl ParseState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Outside,
            conversation_id: None,
            raw_nodes: Vec::new(),
            links: Vec::new(),
            actors: ActorTable::new(),
        }
    }

    pub fn feed(&mut self, line: Line<'_>) {
        match line {
            Line::ActorStart => {
                self.flush();
                self.mode = Mode::Actor(ActorDraft::default());
            }
            Line::ConversationStart => {
                self.flush();
                self.conversation_id = None;
                self.mode = Mode::ConversationHeader;
            }
            Line::OtherRecordStart => {
                self.flush();
                self.mode = Mode::Outside;
            }
            Line::EntryStart => {
                self.flush();
                match self.conversation_id {
                    Some(id) => {
                        self.mode = Mode::Dialogue(EntryDraft {
                            node: RawNode::new(Some(id)),
                            pending_title: None,
                            link: LinkScratch::default(),
                        });
                    }
                    None => {
                        warn!("dialogue entry outside of any identified conversation; skipping");
                        self.mode = Mode::Outside;
                    }
                }
            }
            other => self.feed_field(other),
        }
    }

    fn feed_field(&mut self, line: Line<'_>) {
        match &mut self.mode {
            Mode::Outside => {}
            Mode::ConversationHeader => {
                if let (Line::Id(id), None) = (&line, self.conversation_id) {
                    self.conversation_id = *id;
                }
            }
            Mode::Actor(actor) => match line {
                Line::Id(id) => actor.id = id,
                Line::FieldTitle(title) => actor.pending_title = Some(title.to_string()),
                Line::FieldValue(value) => {
                    if actor.pending_title.as_deref() == Some("Name") {
                        actor.name = Some(value.to_string());
                    }
                }
                _ => {}
            },
            Mode::Dialogue(entry) => Self::feed_entry(entry, line, &mut self.links),
        }
    }

    fn feed_entry(entry: &mut EntryDraft, line: Line<'_>, links: &mut Vec<DialogueLink>) {
        let node = &mut entry.node;
        match line {
            Line::Id(id) => node.local_id = id,
            Line::ConversationId(inner) => {
                if node.conversation_id.is_some() && inner != node.conversation_id {
                    warn!(
                        entry = ?node.local_id,
                        block = ?node.conversation_id,
                        declared = ?inner,
                        "conversationID mismatch for entry"
                    );
                }
            }
            Line::FieldTitle(title) => entry.pending_title = Some(title.to_string()),
            Line::FieldValue(value) => {
                let value = Some(value.to_string());
                match entry.pending_title.as_deref() {
                    Some("Title") => node.raw_title = value,
                    Some("Menu Text") | Some("Menu Text en") => node.menu_text = value,
                    Some("Dialogue Text") => node.spoken_text = value,
                    Some("en") => node.english_text = value,
                    Some("Actor") => node.actor_ref = value.as_deref().and_then(parse_int),
                    _ => {}
                }
            }
            Line::Conditions(cond) => {
                if !cond.trim().is_empty() {
                    node.conditions.push(cond.to_string());
                }
            }
            Line::Effects(effects) => node.effects.extend(effects),
            Line::OriginConversation(id) => entry.link.origin_conversation = id,
            Line::OriginDialogue(id) => entry.link.origin_dialogue = id,
            Line::DestinationConversation(id) => entry.link.destination_conversation = id,
            Line::DestinationDialogue(id) => {
                let scratch = std::mem::take(&mut entry.link);
                links.push(DialogueLink {
                    origin_conversation_id: scratch
                        .origin_conversation
                        .or(node.conversation_id),
                    origin_local_id: scratch.origin_dialogue.or(node.local_id),
                    destination_conversation_id: scratch
                        .destination_conversation
                        .or(node.conversation_id),
                    destination_local_id: id,
                });
            }
            Line::ActorStart
            | Line::ConversationStart
            | Line::EntryStart
            | Line::OtherRecordStart => {}
        }
    }

    /// Close whatever record is in progress. A flushed conversation header
    /// keeps its id so following entries still belong to it.
    fn flush(&mut self) {
        match std::mem::replace(&mut self.mode, Mode::Outside) {
            Mode::Actor(actor) => {
                if let (Some(id), Some(name)) = (actor.id, actor.name) {
                    self.actors.insert(id, name);
                }
            }
            Mode::Dialogue(entry) => self.raw_nodes.push(entry.node),
            Mode::ConversationHeader => self.mode = Mode::ConversationHeader,
            Mode::Outside => {}
        }
    }

    pub fn finish(mut self) -> (Vec<FinalizedNode>, Vec<DialogueLink>, ActorTable) {
        self.flush();
        let actors = self.actors;
        let nodes = self
            .raw_nodes
            .into_iter()
            .map(|raw| finalize(raw, &actors))
            .collect();
        (nodes, self.links, actors)
    }
}

impl Default for ParseState {
    fn default() -> Self {
        Self::new()
    }
}
