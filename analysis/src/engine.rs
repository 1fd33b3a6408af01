use crate::block::{BlockAccumulator, BlockStep, DEFAULT_MAX_BLOCK_LINES};
use crate::chat::{self, ChatLine};
use crate::history::History;
use crate::nicknames::NicknameTable;
use crate::scoreboard::Reconciler;
use common::chat::{ChatChannel, ChatMessage, DetectedChat, TeamSide};
use common::scoreboard::{RawScoreboardInput, ScoreboardSnapshot};
use common::SubmitSummary;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const SYSTEM_SENDER: &str = "SYSTEM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub chat_history: usize,
    pub detected_history: usize,
    pub raw_line_history: usize,
    pub raw_scoreboard_history: usize,
    pub max_block_lines: usize,
    /// Chat messages starting with this clear the displayed chat.
    pub reset_command: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chat_history: 100,
            detected_history: 200,
            raw_line_history: 500,
            raw_scoreboard_history: 10,
            max_block_lines: DEFAULT_MAX_BLOCK_LINES,
            reset_command: "!resetchat".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("batch did not contain any log lines")]
    EmptyBatch,
}

/// All state built up from the submitted log lines.
///
/// Block capturing carries over from one [`Engine::submit`] call to the next,
/// so batches have to be submitted one at a time and in order.
#[derive(Debug)]
pub struct Engine {
    reset_command: String,
    raw_lines: History<String>,
    display_chat: History<ChatMessage>,
    detected_chat: History<DetectedChat>,
    nicknames: NicknameTable,
    blocks: BlockAccumulator,
    scoreboard: Reconciler,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            reset_command: config.reset_command,
            raw_lines: History::new(config.raw_line_history),
            display_chat: History::new(config.chat_history),
            detected_chat: History::new(config.detected_history),
            nicknames: NicknameTable::new(),
            blocks: BlockAccumulator::with_max_lines(config.max_block_lines),
            scoreboard: Reconciler::new(config.raw_scoreboard_history),
        }
    }

    #[tracing::instrument(name = "Submit", skip_all, fields(lines = lines.len()))]
    pub fn submit<S>(&mut self, lines: &[S]) -> Result<SubmitSummary, IngestError>
    where
        S: AsRef<str>,
    {
        let mut summary = SubmitSummary::default();

        for line in lines.iter().map(|l| l.as_ref()) {
            if line.trim().is_empty() {
                continue;
            }

            summary.lines_processed += 1;
            summary.chat_messages_added += self.process_line(line);
        }

        if summary.lines_processed == 0 {
            return Err(IngestError::EmptyBatch);
        }

        tracing::debug!(
            processed = summary.lines_processed,
            chat = summary.chat_messages_added,
            capturing = self.blocks.is_capturing(),
            "Processed batch"
        );

        Ok(summary)
    }

    // Returns the number of messages added to the displayed chat.
    fn process_line(&mut self, line: &str) -> usize {
        self.raw_lines.push(line.to_owned());
        self.nicknames.observe_line(line);

        match self.blocks.step(line) {
            BlockStep::Ignored => {}
            BlockStep::Capturing => return 0,
            BlockStep::Completed(payloads) => {
                for payload in payloads {
                    match self.scoreboard.reconcile(&payload, &self.nicknames) {
                        Ok(reconciled) => {
                            tracing::info!(
                                players = reconciled.snapshot.players.len(),
                                skipped = reconciled.skipped.len(),
                                "Updated scoreboard"
                            );
                        }
                        Err(e) => {
                            tracing::warn!("Dropping scoreboard block: {}", e);
                        }
                    };
                }
                return 0;
            }
        };

        let chat = match chat::classify(line) {
            Some(c) => c,
            None => return 0,
        };
        self.detected_chat.push(chat.to_detected());

        if let Some(params) = self.reset_params(&chat.message) {
            let notice = reset_notice(&chat, params);
            tracing::info!(requested_by = %chat.name, "Clearing chat");

            self.display_chat.clear();
            self.display_chat.push(notice);
            return 1;
        }

        if chat.channel != ChatChannel::Public {
            return 0;
        }

        self.display_chat.push(chat.to_display());
        1
    }

    fn reset_params<'m>(&self, message: &'m str) -> Option<&'m str> {
        let command = self.reset_command.as_str();
        if command.is_empty() {
            return None;
        }

        let head = message.get(..command.len())?;
        if !head.eq_ignore_ascii_case(command) {
            return None;
        }

        Some(message[command.len()..].trim())
    }

    pub fn display_chat(&self) -> Vec<ChatMessage> {
        self.display_chat.to_vec()
    }

    pub fn detected_chat(&self) -> Vec<DetectedChat> {
        self.detected_chat.to_vec()
    }

    pub fn raw_lines(&self) -> Vec<String> {
        self.raw_lines.to_vec()
    }

    pub fn scoreboard(&self) -> Arc<ScoreboardSnapshot> {
        self.scoreboard.snapshot()
    }

    pub fn raw_scoreboard_inputs(&self) -> Vec<RawScoreboardInput> {
        self.scoreboard.inputs()
    }

    pub fn nicknames(&self) -> BTreeMap<String, String> {
        self.nicknames.to_map()
    }

    pub fn nickname_table(&self) -> &NicknameTable {
        &self.nicknames
    }

    pub fn is_capturing_block(&self) -> bool {
        self.blocks.is_capturing()
    }
}

fn reset_notice(chat: &ChatLine, params: &str) -> ChatMessage {
    let text = if params.is_empty() {
        format!("Chat cleared by {}", chat.name)
    } else {
        format!("Chat cleared by {}: {}", chat.name, params)
    };

    ChatMessage {
        timestamp: chat.timestamp(),
        sender: SYSTEM_SENDER.to_owned(),
        msg: chat::escape_html(&text),
        team: TeamSide::Other,
    }
}
