//! Reassembles the `JSON_BEGIN{ ... }}JSON_END` blocks the server spreads over
//! many log lines.

use crate::chat;
use regex::Regex;
use std::sync::LazyLock;

pub const START_TOKEN: &str = "JSON_BEGIN";

/// Lines buffered for a single block before it is given up on.
pub const DEFAULT_MAX_BLOCK_LINES: usize = 1024;

const START_SENTINEL: &str = "JSON_BEGIN{";
const END_SENTINEL: &str = "}}JSON_END";

// "L 10/16/2024 - 12:00:00: " or "10/16/2024 12:00:00.123 - "
static LOG_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:L\s+)?(?:\d{1,2}/\d{1,2}/\d{2,4}\s*(?:-\s*)?)?\d{1,2}:\d{2}:\d{2}(?:\.\d+)?\s*[-:]\s*")
        .unwrap()
});

/// Removes the engine date/time prefix of a log line, if there is one.
pub fn strip_log_prefix(line: &str) -> &str {
    match LOG_PREFIX.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStep {
    /// The line has nothing to do with a block.
    Ignored,
    /// The line was buffered, the block is still open.
    Capturing,
    /// The line closed one or more blocks, these are the assembled payloads in
    /// log order. A block may have been reopened on the same line.
    Completed(Vec<String>),
}

impl BlockStep {
    /// Whether the line belongs to a block and must not be looked at as chat.
    pub fn consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Capturing(Vec<String>),
}

#[derive(Debug)]
pub struct BlockAccumulator {
    state: State,
    max_lines: usize,
    discarded: usize,
}

impl Default for BlockAccumulator {
    fn default() -> Self {
        Self::with_max_lines(DEFAULT_MAX_BLOCK_LINES)
    }
}

impl BlockAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An open block holding more than `max_lines` lines is dropped.
    pub fn with_max_lines(max_lines: usize) -> Self {
        Self {
            state: State::Idle,
            max_lines: max_lines.max(1),
            discarded: 0,
        }
    }

    pub fn step(&mut self, line: &str) -> BlockStep {
        let mut rest = strip_log_prefix(line);

        // Players can type the sentinel, a chat line never opens a block
        let may_start = !rest.contains(START_SENTINEL) || chat::classify(line).is_none();
        let find_start = |text: &str| {
            if may_start {
                text.find(START_SENTINEL)
            } else {
                None
            }
        };

        let mut completed = Vec::new();
        loop {
            if !self.is_capturing() {
                match find_start(rest) {
                    Some(start) => {
                        rest = &rest[start + START_TOKEN.len()..];
                        self.state = State::Capturing(Vec::new());
                    }
                    None => break,
                }
            }
            let State::Capturing(buffer) = &mut self.state else {
                break;
            };

            match (rest.find(END_SENTINEL), find_start(rest)) {
                (Some(end), start) if start.map_or(true, |start| end < start) => {
                    buffer.push(rest[..end + 2].to_owned());
                    completed.push(buffer.join("\n"));
                    self.state = State::Idle;
                    rest = &rest[end + END_SENTINEL.len()..];
                }
                (_, Some(start)) => {
                    tracing::warn!(
                        buffered = buffer.len(),
                        "New block started before the previous one ended, discarding it"
                    );
                    self.discarded += 1;
                    self.state = State::Idle;
                    rest = &rest[start..];
                }
                (None, None) => {
                    buffer.push(rest.to_owned());
                    if buffer.len() > self.max_lines {
                        tracing::warn!(
                            buffered = buffer.len(),
                            max = self.max_lines,
                            "Block did not end in time, discarding it"
                        );
                        self.discarded += 1;
                        self.state = State::Idle;
                    }
                    break;
                }
                // Covered by the first arm's guard when there is no start
                (Some(_), None) => unreachable!(),
            }
        }

        if !completed.is_empty() {
            BlockStep::Completed(completed)
        } else if self.is_capturing() {
            BlockStep::Capturing
        } else {
            BlockStep::Ignored
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, State::Capturing(_))
    }

    pub fn buffered_lines(&self) -> usize {
        match &self.state {
            State::Idle => 0,
            State::Capturing(buffer) => buffer.len(),
        }
    }

    /// Number of blocks dropped, either because a new one started before they
    /// ended or because they grew past the line limit.
    pub fn discarded_blocks(&self) -> usize {
        self.discarded
    }
}
