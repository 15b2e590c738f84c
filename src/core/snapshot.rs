//! # Snapshots and Event Feeds
//!
//! The dashboard does not talk to a store. It reads what one would hand it:
//!
//! - a **snapshot** (`.json`): the context list plus raw conversation items
//!   per context id;
//! - an optional **event feed** (`.jsonl`): store events replayed with delays
//!   to exercise the live indicators.
//!
//! ```json
//! {
//!   "contexts": [{ "context_id": "12", "is_live": true }],
//!   "items": { "12": [{ "item_type": "user_input", "user_input": { "text": "hi" } }] }
//! }
//! ```
//!
//! Feed line:
//!
//! ```json
//! {"after_ms": 500, "event": {"type": "turn_appended", "data": {"context_id": "12"}}}
//! ```
//!
//! Items stay untyped (`serde_json::Value`); whether each one renders as a
//! canonical item is decided at render time.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::context::{ContextSummary, StoreEvent};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub contexts: Vec<ContextSummary>,
    #[serde(default)]
    pub items: HashMap<String, Vec<Value>>,
}

/// Wire shape before each context and item list is checked on its own.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    contexts: Vec<Value>,
    #[serde(default)]
    items: HashMap<String, Value>,
}

/// One replayable store event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Delay after the previous entry.
    #[serde(default)]
    pub after_ms: u64,
    pub event: StoreEvent,
    /// Summary to insert for `context_created`.
    #[serde(default)]
    pub context: Option<ContextSummary>,
    /// Raw item to append for `turn_appended`.
    #[serde(default)]
    pub item: Option<Value>,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "snapshot I/O error: {e}"),
            SnapshotError::Parse(e) => write!(f, "snapshot parse error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Parse(e)
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let contents = fs::read_to_string(path)?;
    let snapshot = parse_snapshot(&contents)?;
    info!(
        "Loaded snapshot from {}: {} contexts, {} item lists",
        path.display(),
        snapshot.contexts.len(),
        snapshot.items.len()
    );
    Ok(snapshot)
}

/// Parse a snapshot. Only a malformed document is an error: contexts that
/// fail to deserialize and item lists that are not arrays are skipped with a
/// warning, and the first summary wins for any duplicated context id.
pub fn parse_snapshot(contents: &str) -> Result<Snapshot, SnapshotError> {
    let raw: RawSnapshot = serde_json::from_str(contents)?;
    let mut seen = HashSet::new();
    let contexts = raw
        .contexts
        .into_iter()
        .enumerate()
        .filter_map(|(n, value)| match serde_json::from_value::<ContextSummary>(value) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                warn!("Skipping snapshot context {n}: {e}");
                None
            }
        })
        .filter(|ctx| {
            let first = seen.insert(ctx.context_id.clone());
            if !first {
                warn!("Dropping duplicate context id {}", ctx.context_id);
            }
            first
        })
        .collect();
    let items = raw
        .items
        .into_iter()
        .filter_map(|(id, list)| match list {
            Value::Array(items) => Some((id, items)),
            other => {
                warn!("Skipping items for context {id}: expected an array, got {other}");
                None
            }
        })
        .collect();
    Ok(Snapshot { contexts, items })
}

pub fn load_feed(path: &Path) -> Result<Vec<FeedEntry>, SnapshotError> {
    let contents = fs::read_to_string(path)?;
    let entries = parse_feed(&contents);
    info!("Loaded {} feed entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse a JSONL feed. Blank lines are ignored; malformed lines are skipped
/// with a warning so one bad event doesn't stop the replay.
pub fn parse_feed(contents: &str) -> Vec<FeedEntry> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match serde_json::from_str::<FeedEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping feed line {}: {}", n + 1, e);
                None
            }
        })
        .collect()
}
