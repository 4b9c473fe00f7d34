//! Speaker resolution and choice-text synthesis for parsed entries.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parser::{ActorTable, NodeKey, RawNode};

/// Title prefixes that mark an entry as spoken by the player.
pub const PLAYER_PREFIXES: [&str; 2] = ["Player_Romus:", "Player:"];

pub const PLAYER: &str = "player";
pub const NARRATOR: &str = "narrator";

/// Canonical keys starting with any of these collapse to [`PLAYER`].
const PLAYER_ALIASES: [&str; 3] = ["player", "anton", "romus"];

static SPEAKER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][\w .'()\-]*?)\s*:\s").expect("Failed to compile speaker prefix pattern")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace pattern"));

/// An entry with its speaker and presentable text resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedNode {
    #[serde(flatten)]
    pub raw: RawNode,
    pub speaker_raw: Option<String>,
    pub speaker_canonical_key: Option<String>,
    /// The entry is a presentable choice; equivalent to `display_text.is_some()`.
    pub is_player_choice: bool,
    pub display_text: Option<String>,
    pub has_own_mechanics: bool,
}

impl FinalizedNode {
    pub fn key(&self) -> NodeKey {
        self.raw.key()
    }

    pub fn is_player(&self) -> bool {
        self.speaker_canonical_key.as_deref() == Some(PLAYER)
    }

    pub fn is_narrator(&self) -> bool {
        self.speaker_canonical_key.as_deref() == Some(NARRATOR)
    }

    /// Structural `START`/`INPUT`/`OUTPUT` entries.
    pub fn is_sentinel(&self) -> bool {
        [self.raw.raw_title.as_deref(), self.display_text.as_deref()]
            .into_iter()
            .flatten()
            .any(|text| {
                let text = text.trim();
                ["START", "INPUT", "OUTPUT"]
                    .iter()
                    .any(|sentinel| text.eq_ignore_ascii_case(sentinel))
            })
    }

    /// Label used when rendering the speaker.
    pub fn speaker_display(&self) -> String {
        match self.speaker_canonical_key.as_deref() {
            Some(PLAYER) => "Player".to_string(),
            Some(NARRATOR) => "Narrator".to_string(),
            canonical => self
                .speaker_raw
                .clone()
                .or_else(|| canonical.map(str::to_string))
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    /// Re-run finalization from the raw fields.
    pub fn refinalize(&self, actors: &ActorTable) -> FinalizedNode {
        finalize(self.raw.clone(), actors)
    }
}

/// Resolve speaker and choice text. A pure function of its inputs: it only
/// reads raw fields, so finalizing an already-finalized entry's raw part again
/// yields the same result.
pub fn finalize(raw: RawNode, actors: &ActorTable) -> FinalizedNode {
    let speaker_raw = raw
        .actor_ref
        .and_then(|id| actors.get(&id).cloned())
        .or_else(|| raw.raw_title.as_deref().and_then(title_speaker));
    let speaker_canonical_key = speaker_raw.as_deref().and_then(canonical_speaker_key);

    let display_text = choice_text(&raw);
    let has_own_mechanics = !raw.conditions.is_empty() || !raw.effects.is_empty();

    FinalizedNode {
        raw,
        speaker_raw,
        speaker_canonical_key,
        is_player_choice: display_text.is_some(),
        display_text,
        has_own_mechanics,
    }
}

fn title_speaker(title: &str) -> Option<String> {
    SPEAKER_PREFIX
        .captures(title.trim())
        .map(|c| c[1].trim().to_string())
}

/// Drop a leading `Name: ` speaker label from a title.
pub fn strip_speaker_prefix(title: &str) -> &str {
    let title = title.trim();
    match SPEAKER_PREFIX.find(title) {
        Some(prefix) => title[prefix.end()..].trim_start(),
        None => title,
    }
}

/// Lowercase, underscores to spaces, collapsed whitespace, no parentheses;
/// player and narrator aliases collapse to a single key.
pub fn canonical_speaker_key(value: &str) -> Option<String> {
    let lowered = value.to_lowercase().replace('_', " ");
    let collapsed = WHITESPACE.replace_all(&lowered, " ");
    let norm: String = collapsed.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    let norm = norm.trim();

    if norm.is_empty() {
        return None;
    }
    if PLAYER_ALIASES.iter().any(|alias| norm.starts_with(alias)) {
        return Some(PLAYER.to_string());
    }
    if norm.starts_with(NARRATOR) {
        return Some(NARRATOR.to_string());
    }
    Some(norm.to_string())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn choice_text(raw: &RawNode) -> Option<String> {
    let title = raw.raw_title.as_deref().unwrap_or("");
    let title_looks_player = PLAYER_PREFIXES.iter().any(|p| title.starts_with(p));
    let has_menu = raw
        .menu_text
        .as_deref()
        .is_some_and(|menu| !menu.trim().is_empty());

    if !title_looks_player && !has_menu {
        return None;
    }

    let source = non_empty(&raw.english_text)
        .or_else(|| non_empty(&raw.menu_text))
        .unwrap_or(title);
    Some(clean_choice_text(source))
}

/// Strip a player prefix, unescape `\"`, and peel surrounding quotes.
pub fn clean_choice_text(raw: &str) -> String {
    let mut text = raw.trim();
    for prefix in PLAYER_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
        }
    }

    let unescaped = text.replace("\\\"", "\"");
    let mut text = unescaped.as_str();
    while text.len() > 1 && text.starts_with('"') && text.ends_with('"') {
        text = text[1..text.len() - 1].trim();
    }
    text.to_string()
}
