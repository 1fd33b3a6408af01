pub mod chat;
pub mod scoreboard;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSummary {
    pub lines_processed: usize,
    pub chat_messages_added: usize,
}
