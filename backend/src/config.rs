use std::path::PathBuf;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "Collects chat and scoreboards from CS2 server logs")]
pub struct Config {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Required as `Authorization: Bearer <token>` on submissions, if set.
    #[arg(long, env = "SUBMIT_TOKEN")]
    pub submit_token: Option<String>,

    /// Directory with a prebuilt status page to serve at `/`.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    #[arg(long, env = "CHAT_HISTORY", default_value_t = 100)]
    pub chat_history: usize,

    #[arg(long, env = "DETECTED_HISTORY", default_value_t = 200)]
    pub detected_history: usize,

    #[arg(long, env = "RAW_LINE_HISTORY", default_value_t = 500)]
    pub raw_line_history: usize,

    #[arg(long, env = "RAW_SCOREBOARD_HISTORY", default_value_t = 10)]
    pub raw_scoreboard_history: usize,

    /// An unterminated scoreboard block is dropped after this many lines.
    #[arg(long, env = "MAX_BLOCK_LINES", default_value_t = 1024)]
    pub max_block_lines: usize,

    #[arg(long, env = "RESET_COMMAND", default_value = "!resetchat")]
    pub reset_command: String,
}

impl Config {
    pub fn engine_config(&self) -> analysis::EngineConfig {
        analysis::EngineConfig {
            chat_history: self.chat_history,
            detected_history: self.detected_history,
            raw_line_history: self.raw_line_history,
            raw_scoreboard_history: self.raw_scoreboard_history,
            max_block_lines: self.max_block_lines,
            reset_command: self.reset_command.clone(),
        }
    }

    /// An empty token counts as no token.
    pub fn submit_token(&self) -> Option<String> {
        self.submit_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
    }
}
