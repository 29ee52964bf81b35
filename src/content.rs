//! Display content: the UI string table and dialog packs.
//!
//! Content is used purely to turn keys into display strings. Nothing in here
//! influences movement or protocol decisions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::protocol::ErrorCode;
use crate::types::Direction;

/// Keys into the UI string table.
pub mod keys {
    pub const TITLE: &str = "title";
    pub const ERROR_PREFIX: &str = "errorPrefix";
    pub const TOWN_LOADED: &str = "townLoaded";

    pub const STATUS_NO_TARGET: &str = "statusNoTarget";
    pub const STATUS_INTERACTING: &str = "statusInteracting";

    pub const EVENT_STALE: &str = "eventStale";
    pub const EVENT_BAD_POSITION: &str = "eventBadPosition";
    pub const EVENT_DENIED: &str = "eventDenied";
    pub const EVENT_UNKNOWN: &str = "eventUnknown";
    pub const EVENT_NO_SESSION: &str = "eventNoSession";

    pub const FACING_NORTH: &str = "facingNorth";
    pub const FACING_SOUTH: &str = "facingSouth";
    pub const FACING_WEST: &str = "facingWest";
    pub const FACING_EAST: &str = "facingEast";

    pub const CODEX_FOOTNOTE: &str = "codexFootnote";
    pub const CODEX_FOOTNOTE_THRESHOLD: &str = "codexFootnoteThresholdVersion";
}

// ---------------------------------------------------------------------------
// UI strings
// ---------------------------------------------------------------------------

/// Flat key → value table. Values are strings except for the numeric footnote
/// threshold, so the table is kept as raw JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiStrings(HashMap<String, serde_json::Value>);

impl UiStrings {
    /// String for `key`, or `""` when missing or not a string.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).and_then(|v| v.as_str()).unwrap_or("")
    }

    /// Non-empty string for `key`.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        Some(self.get(key)).filter(|s| !s.is_empty())
    }

    /// Footnote threshold version. Zero counts as unset.
    pub fn footnote_threshold(&self) -> Option<u64> {
        self.0
            .get(keys::CODEX_FOOTNOTE_THRESHOLD)
            .and_then(|v| v.as_u64())
            .filter(|&threshold| threshold > 0)
    }

    /// The easter-egg footnote is shown once the town reaches the threshold.
    pub fn footnote_visible(&self, version: u64) -> bool {
        self.footnote_threshold()
            .is_some_and(|threshold| version >= threshold)
    }

    pub fn facing_label(&self, facing: Direction) -> &str {
        self.get(match facing {
            Direction::North => keys::FACING_NORTH,
            Direction::South => keys::FACING_SOUTH,
            Direction::West => keys::FACING_WEST,
            Direction::East => keys::FACING_EAST,
        })
    }

    /// Status line for a rejected interaction.
    pub fn rejection_status(&self, code: &ErrorCode) -> String {
        let mapped = match code {
            ErrorCode::InvalidPosition => self.lookup(keys::EVENT_BAD_POSITION),
            ErrorCode::EventNotAllowed => self.lookup(keys::EVENT_DENIED),
            ErrorCode::UnknownEvent => self.lookup(keys::EVENT_UNKNOWN),
            ErrorCode::NoSession => self.lookup(keys::EVENT_NO_SESSION),
            ErrorCode::StaleClient | ErrorCode::Other(_) => None,
        };
        match mapped {
            Some(text) => text.to_string(),
            None => self.prefixed_error(code.as_str()),
        }
    }

    /// `"<errorPrefix> <detail>"`.
    pub fn prefixed_error(&self, detail: &str) -> String {
        format!("{} {}", self.get(keys::ERROR_PREFIX), detail)
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for UiStrings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Dialog packs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogPack {
    #[serde(default)]
    pub messages: HashMap<String, String>,
    #[serde(default)]
    pub npc_names: HashMap<String, String>,
    #[serde(default)]
    pub item_names: HashMap<String, String>,
    #[serde(default)]
    pub item_descriptions: HashMap<String, String>,
    #[serde(default)]
    pub flag_labels: HashMap<String, String>,
}

impl DialogPack {
    pub fn message(&self, key: Option<&str>) -> String {
        match key {
            Some(key) => resolve(&self.messages, key),
            None => String::new(),
        }
    }

    pub fn npc_name(&self, key: &str) -> String {
        resolve(&self.npc_names, key)
    }

    pub fn item_name(&self, key: &str) -> String {
        resolve(&self.item_names, key)
    }

    pub fn item_description(&self, key: &str) -> String {
        resolve(&self.item_descriptions, key)
    }

    pub fn flag_label(&self, key: &str) -> String {
        resolve(&self.flag_labels, key)
    }
}

/// Translate `key`, falling back to the key itself when the table has no
/// (or an empty) entry.
pub fn resolve(table: &HashMap<String, String>, key: &str) -> String {
    match table.get(key) {
        Some(text) if !text.is_empty() => text.clone(),
        _ => key.to_string(),
    }
}

/// Everything fetched from the content endpoints.
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub ui: UiStrings,
    pub dialog: DialogPack,
}
