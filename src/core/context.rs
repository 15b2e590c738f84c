//! # Contexts
//!
//! A context is one agent session. The dashboard receives an ordered list of
//! `ContextSummary` values plus a stream of `StoreEvent` notifications about
//! them. Nothing here is authoritative: summaries are snapshots handed down
//! by whoever owns the store.
//!
//! ```text
//! ContextSummary
//! ├── context_id          // unique within the list
//! ├── title, client_tag   // display only
//! ├── labels              // 3 chips + "+N"
//! ├── is_live, session_id // ─┐
//! ├── last_activity_at    // ─┴─ presence is derived from these three
//! ├── provenance          // parent / on-behalf-of
//! └── head_turn_id, head_depth, has_fs_snapshot
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Window (ms) in which a live context still counts as actively producing turns.
pub const ACTIVE_WINDOW_MS: i64 = 5_000;

/// Maximum number of label chips shown before collapsing into `+N`.
pub const MAX_VISIBLE_LABELS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub context_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub client_tag: Option<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Unix milliseconds.
    #[serde(default)]
    pub last_activity_at: Option<i64>,
    #[serde(default)]
    pub created_at_unix_ms: Option<i64>,
    #[serde(default)]
    pub provenance: Option<Provenance>,
    #[serde(default)]
    pub head_turn_id: Option<String>,
    #[serde(default)]
    pub head_depth: Option<u64>,
    #[serde(default)]
    pub has_fs_snapshot: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default, deserialize_with = "opt_id_from_string_or_number")]
    pub parent_context_id: Option<String>,
    #[serde(default)]
    pub on_behalf_of: Option<String>,
    #[serde(default)]
    pub on_behalf_of_email: Option<String>,
    #[serde(default)]
    pub on_behalf_of_source: Option<String>,
}

impl ContextSummary {
    pub fn new(context_id: impl Into<String>) -> Self {
        Self {
            context_id: context_id.into(),
            ..Default::default()
        }
    }

    pub fn presence(&self, now_ms: i64) -> PresenceState {
        PresenceState::derive(
            self.is_live,
            self.last_activity_at,
            self.session_id.as_deref(),
            now_ms,
        )
    }

    pub fn parent_context_id(&self) -> Option<&str> {
        self.provenance
            .as_ref()
            .and_then(|p| p.parent_context_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Actor the context runs for: display name first, then email.
    pub fn on_behalf_of(&self) -> Option<&str> {
        let provenance = self.provenance.as_ref()?;
        provenance
            .on_behalf_of
            .as_deref()
            .or(provenance.on_behalf_of_email.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn on_behalf_of_source(&self) -> Option<&str> {
        self.provenance
            .as_ref()
            .and_then(|p| p.on_behalf_of_source.as_deref())
    }

    /// Labels split into the visible chips and the number hidden behind `+N`.
    pub fn visible_labels(&self) -> (&[String], usize) {
        match &self.labels {
            Some(labels) if labels.len() > MAX_VISIBLE_LABELS => {
                (&labels[..MAX_VISIBLE_LABELS], labels.len() - MAX_VISIBLE_LABELS)
            }
            Some(labels) => (labels.as_slice(), 0),
            None => (&[][..], 0),
        }
    }

    /// Timestamp shown on the row: last activity, else creation time.
    pub fn display_timestamp(&self) -> Option<i64> {
        self.last_activity_at.or(self.created_at_unix_ms)
    }
}

// ============================================================================
// Presence
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    /// Live and produced activity within the last `ACTIVE_WINDOW_MS`.
    Active,
    Live,
    /// Not live, but a session is attached.
    Idle,
    Disconnected,
}

impl PresenceState {
    pub fn derive(
        is_live: bool,
        last_activity_at: Option<i64>,
        session_id: Option<&str>,
        now_ms: i64,
    ) -> Self {
        if is_live {
            let recent = last_activity_at.is_some_and(|at| now_ms - at < ACTIVE_WINDOW_MS);
            return if recent {
                PresenceState::Active
            } else {
                PresenceState::Live
            };
        }
        if session_id.is_some_and(|s| !s.is_empty()) {
            PresenceState::Idle
        } else {
            PresenceState::Disconnected
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PresenceState::Active => "active",
            PresenceState::Live => "live",
            PresenceState::Idle => "idle",
            PresenceState::Disconnected => "disconnected",
        }
    }
}

// ============================================================================
// Store Events
// ============================================================================

/// Notification from the upstream store. Only drives transient row animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StoreEvent {
    ContextCreated {
        #[serde(deserialize_with = "id_from_string_or_number")]
        context_id: String,
    },
    TurnAppended {
        #[serde(deserialize_with = "id_from_string_or_number")]
        context_id: String,
    },
}

impl StoreEvent {
    pub fn context_id(&self) -> &str {
        match self {
            StoreEvent::ContextCreated { context_id } | StoreEvent::TurnAppended { context_id } => {
                context_id
            }
        }
    }
}

/// A store event stamped with the order it was received in.
///
/// Components compare `seq` to tell a new event from the same event seen on
/// a later frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedEvent {
    pub seq: u64,
    pub event: StoreEvent,
}

// ============================================================================
// Id helpers
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Context ids arrive as strings from some producers and numbers from others.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn opt_id_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
