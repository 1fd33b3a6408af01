use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

// "NAME<SLOT><[U:1:ACCOUNTID]><TEAM>"
static IDENTITY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?P<name>[^"<>]*)<(?P<slot>-?\d*)><\[U:1:(?P<account>\d+)\]><(?P<team>[^"<>]*)>""#)
        .unwrap()
});

/// Maps account ids to the display name they were last seen with.
#[derive(Debug, Clone, Default)]
pub struct NicknameTable {
    names: HashMap<String, String>,
}

impl NicknameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up every identity tag in the line. Returns the number of
    /// entries that were added or renamed.
    pub fn observe_line(&mut self, line: &str) -> usize {
        let mut updated = 0;

        for captures in IDENTITY_TAG.captures_iter(line) {
            let name = captures["name"].trim();
            if name.is_empty() {
                continue;
            }

            if self.insert(&captures["account"], name) {
                updated += 1;
            }
        }

        updated
    }

    /// Returns true if the stored name changed.
    pub fn insert(&mut self, account_id: &str, name: &str) -> bool {
        match self.names.get_mut(account_id) {
            Some(current) if current == name => false,
            Some(current) => {
                tracing::debug!(account_id, old = %current, new = name, "Player renamed");
                *current = name.to_owned();
                true
            }
            None => {
                tracing::debug!(account_id, name, "New player");
                self.names.insert(account_id.to_owned(), name.to_owned());
                true
            }
        }
    }

    pub fn get(&self, account_id: &str) -> Option<&str> {
        self.names.get(account_id).map(|n| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Sorted copy for dumps.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.names
            .iter()
            .map(|(id, name)| (id.clone(), name.clone()))
            .collect()
    }
}
