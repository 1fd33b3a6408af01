//! Turns an assembled `JSON_BEGIN` block into the live scoreboard.
//!
//! The block looks roughly like this, with one entry per player and all stats
//! of a player packed into one comma separated string:
//!
//! ```text
//! {
//!     "name": "round_stats",
//!     "fields" : "accountid, team, money, kills, deaths, assists, dmg, hsp, kdr, adr, mvp",
//!     "players" : {
//!         "player_0" : "  111, 3, 800, 2, 0, 1, 212, 50.0, 2.0, 212, 1",
//!     }}
//! ```

use crate::history::History;
use crate::nicknames::NicknameTable;
use common::scoreboard::{RawPayload, RawScoreboardInput, ScoreboardRow, ScoreboardSnapshot};
use regex::Regex;
use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

/// Stats shown on the scoreboard, in display order.
pub const STAT_COLUMNS: [&str; 11] = [
    "team", "score", "kills", "deaths", "assists", "money", "dmg", "adr", "kdr", "hsp", "mvp",
];

pub const NICKNAME_FIELD: &str = "nickname";
pub const ACCOUNT_ID_FIELD: &str = "accountid";
pub const SPECTATOR_PLACEHOLDER: &str = "Spectator/Bot";

const NAME_FIELDS: [&str; 2] = ["name", NICKNAME_FIELD];

static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:,\s*)+([}\]])").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("decoding scoreboard block: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("scoreboard block is missing {0}")]
    Shape(&'static str),
}

/// Drops commas that directly precede a closing `}` or `]`.
pub fn repair(raw: &str) -> Cow<'_, str> {
    TRAILING_COMMA.replace_all(raw, "$1")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub snapshot: ScoreboardSnapshot,
    /// Players left out because their values did not line up with the header.
    pub skipped: Vec<String>,
}

struct Header<'a> {
    columns: Vec<&'a str>,
}

impl<'a> Header<'a> {
    fn parse(fields: &'a str) -> Self {
        Self {
            columns: fields.split(',').map(str::trim).collect(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    fn stat_columns(&self) -> Vec<(usize, &'a str)> {
        STAT_COLUMNS
            .iter()
            .filter_map(|stat| self.position(stat).map(|idx| (idx, self.columns[idx])))
            .collect()
    }
}

/// Builds a snapshot out of a decoded block.
///
/// Fails only if the block does not have the expected shape, a single broken
/// player entry is skipped instead.
pub fn build_snapshot(
    document: &serde_json::Value,
    nicknames: &NicknameTable,
) -> Result<Reconciled, ReconcileError> {
    let fields = document
        .get("fields")
        .and_then(serde_json::Value::as_str)
        .ok_or(ReconcileError::Shape("a string `fields`"))?;
    let players = document
        .get("players")
        .and_then(serde_json::Value::as_object)
        .ok_or(ReconcileError::Shape("an object `players`"))?;

    let header = Header::parse(fields);
    let stats = header.stat_columns();

    let mut display_fields = Vec::with_capacity(stats.len() + 1);
    display_fields.push(NICKNAME_FIELD.to_owned());
    display_fields.extend(stats.iter().map(|(_, name)| (*name).to_owned()));

    let mut rows = Vec::with_capacity(players.len());
    let mut skipped = Vec::new();
    for (key, value) in players {
        let raw = match value.as_str() {
            Some(r) => r,
            None => {
                tracing::warn!(player = %key, "Player entry is not a string");
                skipped.push(key.clone());
                continue;
            }
        };

        let values: Vec<&str> = raw.split(',').map(str::trim).collect();
        if values.len() != header.columns.len() {
            tracing::warn!(
                player = %key,
                expected = header.columns.len(),
                got = values.len(),
                "Player values do not match the header"
            );
            skipped.push(key.clone());
            continue;
        }

        let mut row = Vec::with_capacity(display_fields.len());
        row.push((
            NICKNAME_FIELD.to_owned(),
            resolve_nickname(&header, &values, nicknames),
        ));
        row.extend(
            stats
                .iter()
                .map(|(idx, name)| ((*name).to_owned(), values[*idx].to_owned())),
        );
        rows.push(ScoreboardRow(row));
    }

    Ok(Reconciled {
        snapshot: ScoreboardSnapshot {
            fields: display_fields,
            players: rows,
        },
        skipped,
    })
}

fn resolve_nickname(header: &Header<'_>, values: &[&str], nicknames: &NicknameTable) -> String {
    let account = header
        .position(ACCOUNT_ID_FIELD)
        .map(|idx| values[idx])
        .filter(|id| !id.is_empty() && *id != "0");
    if let Some(account) = account {
        return match nicknames.get(account) {
            Some(name) => name.to_owned(),
            None => format!("ID:{}", account),
        };
    }

    NAME_FIELDS
        .iter()
        .filter_map(|field| header.position(field))
        .map(|idx| values[idx])
        .find(|name| !name.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| SPECTATOR_PLACEHOLDER.to_owned())
}

/// Holds the live scoreboard and the last few raw blocks it was built from.
#[derive(Debug)]
pub struct Reconciler {
    live: Arc<ScoreboardSnapshot>,
    inputs: History<RawScoreboardInput>,
}

impl Reconciler {
    pub fn new(input_history: usize) -> Self {
        Self {
            live: Arc::new(ScoreboardSnapshot::default()),
            inputs: History::new(input_history),
        }
    }

    /// Decodes a block and, if it is usable, replaces the live snapshot.
    ///
    /// On error the live snapshot is left as it was.
    pub fn reconcile(
        &mut self,
        payload: &str,
        nicknames: &NicknameTable,
    ) -> Result<Reconciled, ReconcileError> {
        let document: serde_json::Value = match serde_json::from_str(&repair(payload)) {
            Ok(d) => d,
            Err(e) => {
                self.record(RawPayload::Undecodable(payload.to_owned()));
                return Err(e.into());
            }
        };
        self.record(RawPayload::Decoded(document.clone()));

        let reconciled = build_snapshot(&document, nicknames)?;
        self.live = Arc::new(reconciled.snapshot.clone());

        Ok(reconciled)
    }

    fn record(&mut self, payload: RawPayload) {
        self.inputs.push(RawScoreboardInput {
            received_at: chrono::Utc::now(),
            payload,
        });
    }

    pub fn snapshot(&self) -> Arc<ScoreboardSnapshot> {
        self.live.clone()
    }

    pub fn inputs(&self) -> Vec<RawScoreboardInput> {
        self.inputs.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_handles_runs_and_whitespace() {
        assert_eq!(r#"{"a":[1,2]}"#, repair(r#"{"a":[1,2,],}"#));
        assert_eq!("{\"a\":1}", repair("{\"a\":1,\n}"));
        assert_eq!("{\"a\":1}", repair("{\"a\":1, ,}"));
        assert_eq!(r#"{"a":"1,2"}"#, repair(r#"{"a":"1,2"}"#));
    }

    #[test]
    fn header_lookup_is_case_insensitive_and_keeps_first() {
        let header = Header::parse(" AccountID, Kills ,kills, TEAM");
        assert_eq!(Some(0), header.position("accountid"));
        assert_eq!(Some(1), header.position("kills"));
        assert_eq!(vec![(3, "TEAM"), (1, "Kills")], header.stat_columns());
    }
}
