use once_cell::sync::Lazy;
use regex::Regex;

pub const ACTOR_MARKER: &str = "Actor data";
pub const CONVERSATION_MARKER: &str = "Conversation data";
pub const ENTRY_MARKER: &str = "DialogueEntry data";

// Sub-records nested inside actors and entries; they never close the record.
const NESTED_RECORDS: &[&str] = &["Field", "Link"];

/// One recognized line of the dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    ActorStart,
    ConversationStart,
    EntryStart,
    /// Any other top-level record (`Item data`, `Variable data`, ...).
    OtherRecordStart,
    Id(Option<i64>),
    ConversationId(Option<i64>),
    FieldTitle(&'a str),
    FieldValue(&'a str),
    Conditions(&'a str),
    Effects(Vec<String>),
    OriginConversation(Option<i64>),
    OriginDialogue(Option<i64>),
    DestinationConversation(Option<i64>),
    DestinationDialogue(Option<i64>),
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Id,
    ConversationId,
    FieldTitle,
    FieldValue,
    Conditions,
    Effects,
    OriginConversation,
    OriginDialogue,
    DestinationConversation,
    DestinationDialogue,
}

// Evaluated top to bottom; the first matching pattern wins.
static FIELD_PATTERNS: Lazy<Vec<(Regex, FieldKind)>> = Lazy::new(|| {
    [
        (r"^int id = (.*)$", FieldKind::Id),
        (r"^int conversationID = (.*)$", FieldKind::ConversationId),
        (r#"^string title = "(.*)""#, FieldKind::FieldTitle),
        (r#"^string value = "(.*)""#, FieldKind::FieldValue),
        (r#"(?i)^string\s+conditionsString\s*=\s*"(.*)""#, FieldKind::Conditions),
        (r#"Variable\[\\?""#, FieldKind::Effects),
        (r"^int originConversationID = (.*)$", FieldKind::OriginConversation),
        (r"^int originDialogueID = (.*)$", FieldKind::OriginDialogue),
        (r"^int destinationConversationID = (.*)$", FieldKind::DestinationConversation),
        (r"^int destinationDialogueID = (.*)$", FieldKind::DestinationDialogue),
    ]
    .into_iter()
    .map(|(pattern, kind)| {
        (
            Regex::new(pattern).expect("Failed to compile field pattern"),
            kind,
        )
    })
    .collect()
});

static RECORD_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+) data$").expect("Failed to compile record marker"));

// `Variable["NAME"] op VALUE;`, tolerating the escaped quotes of string dumps.
static EFFECT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Variable\[\\?"([^"\\]+)\\?"\]\s*(\+=|-=|=)\s*([^;]+)"#)
        .expect("Failed to compile effect pattern")
});

/// Classify one trimmed, non-empty line. Unrecognized lines yield `None`.
pub fn classify(line: &str) -> Option<Line<'_>> {
    if line.starts_with(ACTOR_MARKER) {
        return Some(Line::ActorStart);
    }
    if line.starts_with(CONVERSATION_MARKER) {
        return Some(Line::ConversationStart);
    }
    if line.starts_with(ENTRY_MARKER) {
        return Some(Line::EntryStart);
    }
    if let Some(captures) = RECORD_MARKER.captures(line) {
        if NESTED_RECORDS.contains(&&captures[1]) {
            return None;
        }
        return Some(Line::OtherRecordStart);
    }

    let (captures, kind) = FIELD_PATTERNS
        .iter()
        .find_map(|(pattern, kind)| pattern.captures(line).map(|c| (c, *kind)))?;
    let text = captures.get(1).map_or("", |m| m.as_str());

    let line = match kind {
        FieldKind::Id => Line::Id(parse_int(text)),
        FieldKind::ConversationId => Line::ConversationId(parse_int(text)),
        FieldKind::FieldTitle => Line::FieldTitle(text),
        FieldKind::FieldValue => Line::FieldValue(text),
        FieldKind::Conditions => Line::Conditions(text),
        FieldKind::Effects => {
            let effects = parse_effects(line);
            if effects.is_empty() {
                return None;
            }
            Line::Effects(effects)
        }
        FieldKind::OriginConversation => Line::OriginConversation(parse_int(text)),
        FieldKind::OriginDialogue => Line::OriginDialogue(parse_int(text)),
        FieldKind::DestinationConversation => Line::DestinationConversation(parse_int(text)),
        FieldKind::DestinationDialogue => Line::DestinationDialogue(parse_int(text)),
    };
    Some(line)
}

/// Every `Variable[..] op value` on the line, normalized to `"NAME op VALUE"`.
pub fn parse_effects(line: &str) -> Vec<String> {
    EFFECT_PATTERN
        .captures_iter(line)
        .map(|c| {
            let value = c[3].trim().trim_end_matches(['"', '\\']).trim_end();
            format!("{} {} {}", &c[1], &c[2], value)
        })
        .collect()
}

/// Malformed numbers degrade to `None`.
pub fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}
