use common::chat::{ChatChannel, ChatMessage, DetectedChat, TeamSide};
use regex::Regex;
use std::sync::LazyLock;

// [L ][MM/DD/YYYY ]HH:MM:SS.fff - "NAME<SLOT><STEAMID><TEAM>" say|say_team "MESSAGE"
// Only the console form with fractional seconds is chat. Lines in the
// "L MM/DD/YYYY - HH:MM:SS: " file log form are not, though block and
// identity-tag scanning still accept them.
static CHAT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^\s*(?:L\s+)?"#,
        r#"(?:(?P<date>\d{1,2}/\d{1,2}/\d{2,4})\s+(?:-\s+)?)?"#,
        r#"(?P<time>\d{1,2}:\d{2}:\d{2}\.\d+)\s+-\s+"#,
        r#""(?P<name>[^"<>]*)<(?P<slot>-?\d*)><(?P<steam>[^"<>]*)><(?P<team>[^"<>]*)>""#,
        r#"\s+(?P<command>(?i:say_team|say))\s+"#,
        r#""(?P<message>.*)"\s*$"#,
    ))
    .unwrap()
});

pub static TEAM_TAGS: phf::Map<&'static str, TeamSide> = phf::phf_map! {
    "CT" => TeamSide::CT,
    "TERRORIST" => TeamSide::T,
    "T" => TeamSide::T,
};

/// A chat line as written by the server, nothing escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub date: Option<String>,
    pub time: String,
    pub name: String,
    pub slot: String,
    pub steam_id: String,
    pub team_tag: String,
    pub channel: ChatChannel,
    pub message: String,
}

impl ChatLine {
    pub fn timestamp(&self) -> String {
        match &self.date {
            Some(date) => format!("{} {}", date, self.time),
            None => self.time.clone(),
        }
    }

    pub fn team(&self) -> TeamSide {
        normalize_team(&self.team_tag)
    }

    pub fn to_detected(&self) -> DetectedChat {
        DetectedChat {
            timestamp: self.timestamp(),
            speaker_name: self.name.clone(),
            slot: self.slot.clone(),
            steam_id: self.steam_id.clone(),
            message: self.message.clone(),
            channel: self.channel,
            raw_team_tag: self.team_tag.clone(),
        }
    }

    pub fn to_display(&self) -> ChatMessage {
        ChatMessage {
            timestamp: self.timestamp(),
            sender: escape_html(&self.name),
            msg: escape_html(&self.message),
            team: self.team(),
        }
    }
}

/// Matches a single log line against the chat grammar.
///
/// Returns `None` for anything that is not a chat line, including chat lines
/// whose message is empty after trimming.
pub fn classify(line: &str) -> Option<ChatLine> {
    let captures = CHAT_LINE.captures(line)?;

    let message = captures["message"].trim();
    if message.is_empty() {
        return None;
    }

    let channel = if captures["command"].eq_ignore_ascii_case("say_team") {
        ChatChannel::Team
    } else {
        ChatChannel::Public
    };

    Some(ChatLine {
        date: captures.name("date").map(|d| d.as_str().to_owned()),
        time: captures["time"].to_owned(),
        name: captures["name"].trim().to_owned(),
        slot: captures["slot"].to_owned(),
        steam_id: captures["steam"].to_owned(),
        team_tag: captures["team"].to_owned(),
        channel,
        message: message.to_owned(),
    })
}

pub fn normalize_team(tag: &str) -> TeamSide {
    TEAM_TAGS
        .get(tag.trim().to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(TeamSide::Other)
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
