#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatChannel {
    Public,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TeamSide {
    CT,
    T,
    Other,
}

/// A public chat message, ready to be shown on a page. `sender` and `msg` are
/// HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub timestamp: String,
    pub sender: String,
    pub msg: String,
    pub team: TeamSide,
}

/// Every chat line that was recognized, with the raw fields of the log line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedChat {
    pub timestamp: String,
    pub speaker_name: String,
    pub slot: String,
    pub steam_id: String,
    pub message: String,
    pub channel: ChatChannel,
    pub raw_team_tag: String,
}
