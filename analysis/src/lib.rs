//! Extracts chat messages and scoreboards from batches of CS2 server log lines.

pub mod block;
pub mod chat;
pub mod history;
pub mod nicknames;
pub mod scoreboard;

mod engine;
pub use engine::{Engine, EngineConfig, IngestError, SYSTEM_SENDER};
