use std::fmt;
use std::str::FromStr;

use crate::classify::is_mechanics_only;
use crate::finalize::{NARRATOR, PLAYER};
use crate::graph::{AggregatedNode, Conversation, ParsedGraph};

/// Which release a conversation ships in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game {
    Base,
    Dlc,
}

impl Game {
    pub fn of(conversation_id: i64, dlc_first_conversation_id: i64) -> Self {
        if conversation_id >= dlc_first_conversation_id {
            Game::Dlc
        } else {
            Game::Base
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Game::Base => write!(f, "Base game"),
            Game::Dlc => write!(f, "Rizia DLC"),
        }
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(Game::Base),
            "dlc" | "rizia" | "riziadlc" => Ok(Game::Dlc),
            other => Err(format!("unknown game '{}', expected base or dlc", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpeakerFilter {
    #[default]
    All,
    /// The canonical player only.
    Player,
    /// Player lines together with narration.
    PlayerSide,
    /// One canonical speaker key.
    Speaker(String),
}

impl FromStr for SpeakerFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(SpeakerFilter::All),
            "player" => Ok(SpeakerFilter::Player),
            "player-side" | "__player" => Ok(SpeakerFilter::PlayerSide),
            other => Ok(SpeakerFilter::Speaker(other.to_lowercase())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub query: String,
    pub speaker: SpeakerFilter,
    pub game: Option<Game>,
    pub hide_narrator: bool,
    pub only_consequential: bool,
    pub hide_mechanics: bool,
    pub dlc_first_conversation_id: i64,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            query: String::new(),
            speaker: SpeakerFilter::All,
            game: None,
            hide_narrator: false,
            only_consequential: false,
            hide_mechanics: false,
            dlc_first_conversation_id: 287,
        }
    }
}

/// Conversations that survived filtering, in id order.
#[derive(Debug, Clone)]
pub struct FilterResult<'a> {
    pub conversations: Vec<Conversation<'a>>,
    pub visible: usize,
    pub total: usize,
}

impl Filter {
    pub fn apply<'a>(&self, graph: &'a ParsedGraph) -> FilterResult<'a> {
        let mut visible = 0;
        let conversations: Vec<Conversation<'a>> = graph
            .conversations()
            .into_iter()
            .filter(|c| {
                self.game
                    .map_or(true, |g| Game::of(c.id, self.dlc_first_conversation_id) == g)
            })
            .filter_map(|c| {
                let nodes: Vec<&AggregatedNode> =
                    c.nodes.into_iter().filter(|n| self.matches(n)).collect();
                visible += nodes.len();
                (!nodes.is_empty()).then_some(Conversation { id: c.id, nodes })
            })
            .collect();

        FilterResult {
            conversations,
            visible,
            total: graph.total_listed(),
        }
    }

    /// Node-level predicate; the game filter is applied per conversation.
    pub fn matches(&self, node: &AggregatedNode) -> bool {
        if node.node.is_sentinel() {
            return false;
        }
        let speaker = node.node.speaker_canonical_key.as_deref().unwrap_or("");

        if self.hide_narrator && speaker == NARRATOR {
            return false;
        }
        if self.only_consequential && !node.is_consequential {
            return false;
        }
        match &self.speaker {
            SpeakerFilter::All => {}
            SpeakerFilter::Player => {
                if speaker != PLAYER {
                    return false;
                }
            }
            SpeakerFilter::PlayerSide => {
                if speaker != PLAYER && speaker != NARRATOR {
                    return false;
                }
            }
            SpeakerFilter::Speaker(key) => {
                if speaker != key.as_str() {
                    return false;
                }
            }
        }
        if self.hide_mechanics && is_mechanics_only(node) {
            return false;
        }
        text_match(node, &self.query)
    }
}

/// Case-insensitive substring search over the node's text and its own
/// conditions and effects. An empty query matches everything.
pub fn text_match(node: &AggregatedNode, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let contains = |value: &str| value.to_lowercase().contains(&query);

    [
        node.node.display_text.as_deref(),
        node.node.raw.spoken_text.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(contains)
        || node.node.raw.conditions.iter().any(|c| contains(c.as_str()))
        || node.node.raw.effects.iter().any(|e| contains(e.as_str()))
}
