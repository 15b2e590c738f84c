//! # Actions
//!
//! Everything that can happen in the dashboard becomes an `Action`.
//! User presses Enter on a row? That's `Action::Select(id)`.
//! The store reports a new turn? That's `Action::Store { .. }`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state, and returns an `Effect` for the shell to carry out.
//! No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State (+ Effect)
//! ```

use log::{debug, warn};

use crate::core::context::{ContextSummary, StoreEvent};
use crate::core::snapshot::FeedEntry;
use crate::core::state::App;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Show a context in the conversation pane.
    Select(String),
    /// Move keyboard focus to a list index.
    Focus(usize),
    /// A store event arrived at `received_at_ms` (unix ms).
    Store {
        entry: FeedEntry,
        received_at_ms: i64,
    },
    /// A context link was activated.
    NavigateToContext(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Select(id) => {
            select(app, &id);
            Effect::None
        }
        Action::Focus(index) => {
            if !app.contexts.is_empty() {
                app.focused_index = index.min(app.contexts.len() - 1);
            }
            Effect::None
        }
        Action::Store {
            entry,
            received_at_ms,
        } => {
            apply_store_event(app, entry, received_at_ms);
            Effect::None
        }
        Action::NavigateToContext(id) => {
            if app.position_of(&id).is_some() {
                select(app, &id);
            } else {
                warn!("Navigation target #{id} is not loaded");
                app.status_message = format!("Context #{id} is not loaded");
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn select(app: &mut App, id: &str) {
    let Some(index) = app.position_of(id) else {
        warn!("Ignoring selection of unknown context {id}");
        return;
    };
    debug!("Selected context {id} at row {index}");
    app.selected_id = Some(id.to_string());
    app.focused_index = index;
    app.status_message = format!("Context #{id}");
}

fn apply_store_event(app: &mut App, entry: FeedEntry, received_at_ms: i64) {
    let FeedEntry {
        event, context, item, ..
    } = entry;
    debug!("Store event: {:?}", event);

    match &event {
        StoreEvent::ContextCreated { context_id } => {
            if app.position_of(context_id).is_none() {
                let summary = match context {
                    Some(summary) if summary.context_id == *context_id => summary,
                    _ => ContextSummary {
                        is_live: true,
                        created_at_unix_ms: Some(received_at_ms),
                        ..ContextSummary::new(context_id.clone())
                    },
                };
                // Newest first; keep focus on the row it was on.
                let had_rows = !app.contexts.is_empty();
                app.contexts.insert(0, summary);
                if had_rows {
                    app.focused_index += 1;
                }
            }
        }
        StoreEvent::TurnAppended { context_id } => {
            if let Some(ctx) = app.contexts.iter_mut().find(|c| c.context_id == *context_id) {
                ctx.last_activity_at = Some(received_at_ms);
            }
            if let Some(item) = item {
                app.items.entry(context_id.clone()).or_default().push(item);
            }
        }
    }

    app.push_event(event);
}
