//! # Application State
//!
//! Core dashboard state. This module contains domain data only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── contexts: Vec<ContextSummary>       // list order = display order
//! ├── items: HashMap<id, Vec<Value>>      // raw conversation items per context
//! ├── selected_id: Option<String>         // context shown in the pane
//! ├── focused_index: usize                // keyboard focus in the list
//! ├── recent_events: Vec<SequencedEvent> // latest store events, drive row animation
//! ├── status_message: String              // status bar text
//! ├── context_links: bool                 // navigation handler registered?
//! └── max_section_lines: usize            // cap for expanded sections
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashMap;

use serde_json::Value;

use crate::core::config::{DEFAULT_MAX_SECTION_LINES, ResolvedConfig};
use crate::core::context::{ContextSummary, SequencedEvent, StoreEvent};
use crate::core::snapshot::Snapshot;

/// Store events kept for views that have not drawn them yet.
pub const RECENT_EVENTS_CAP: usize = 256;

pub struct App {
    pub contexts: Vec<ContextSummary>,
    pub items: HashMap<String, Vec<Value>>,
    pub selected_id: Option<String>,
    pub focused_index: usize,
    /// Newest last, at most `RECENT_EVENTS_CAP`. Views observe every entry
    /// whose `seq` they have not seen, so several events between two frames
    /// each get their animation.
    pub recent_events: Vec<SequencedEvent>,
    /// Sequence number handed to the next store event.
    pub next_event_seq: u64,
    pub status_message: String,
    pub context_links: bool,
    pub max_section_lines: usize,
}

impl App {
    pub fn new(snapshot: Snapshot) -> Self {
        let status_message = format!("{} contexts", snapshot.contexts.len());
        Self {
            contexts: snapshot.contexts,
            items: snapshot.items,
            selected_id: None,
            focused_index: 0,
            recent_events: Vec::new(),
            next_event_seq: 1,
            status_message,
            context_links: true,
            max_section_lines: DEFAULT_MAX_SECTION_LINES,
        }
    }

    pub fn from_config(snapshot: Snapshot, config: &ResolvedConfig) -> Self {
        Self {
            context_links: config.context_links,
            max_section_lines: config.max_section_lines,
            ..Self::new(snapshot)
        }
    }

    pub fn last_event(&self) -> Option<&SequencedEvent> {
        self.recent_events.last()
    }

    /// Record a store event under the next sequence number.
    pub fn push_event(&mut self, event: StoreEvent) {
        self.recent_events.push(SequencedEvent {
            seq: self.next_event_seq,
            event,
        });
        self.next_event_seq += 1;
        if self.recent_events.len() > RECENT_EVENTS_CAP {
            let excess = self.recent_events.len() - RECENT_EVENTS_CAP;
            self.recent_events.drain(..excess);
        }
    }

    pub fn position_of(&self, context_id: &str) -> Option<usize> {
        self.contexts.iter().position(|c| c.context_id == context_id)
    }

    pub fn selected_context(&self) -> Option<&ContextSummary> {
        let id = self.selected_id.as_deref()?;
        self.contexts.iter().find(|c| c.context_id == id)
    }

    /// Raw items of the selected context (empty when nothing is selected).
    pub fn selected_items(&self) -> &[Value] {
        self.selected_id
            .as_deref()
            .and_then(|id| self.items.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn live_count(&self) -> usize {
        self.contexts.iter().filter(|c| c.is_live).count()
    }
}
