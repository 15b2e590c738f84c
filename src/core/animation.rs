//! # Row Animations
//!
//! Transient "new" / "updated" emphasis for context rows, driven by store
//! events. Each context id maps to the instants its flags expire at; the
//! owning view calls [`AnimationTracker::sweep`] once per frame to drop
//! expired entries. There are no timers: dropping the tracker drops every
//! pending flag with it.
//!
//! ```text
//! context_created(C)           → C.new_until     = now + 300ms
//! turn_appended(C), C ≠ sel    → C.updated_until = now + 1000ms
//! turn_appended(C), C = sel    → nothing
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;

use crate::core::context::StoreEvent;

pub const NEW_WINDOW: Duration = Duration::from_millis(300);
pub const UPDATED_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RowAnimation {
    new_until: Option<Instant>,
    updated_until: Option<Instant>,
}

impl RowAnimation {
    fn is_expired(&self, now: Instant) -> bool {
        self.new_until.is_none_or(|t| t <= now) && self.updated_until.is_none_or(|t| t <= now)
    }
}

/// Flags for one row at a given instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFlags {
    pub is_new: bool,
    pub is_updated: bool,
}

#[derive(Debug, Default)]
pub struct AnimationTracker {
    rows: HashMap<String, RowAnimation>,
}

impl AnimationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one store event. Only the row the event names is touched.
    pub fn observe(&mut self, event: &StoreEvent, selected_id: Option<&str>, now: Instant) {
        match event {
            StoreEvent::ContextCreated { context_id } => {
                debug!("Row {context_id} marked new");
                let row = self.rows.entry(context_id.clone()).or_default();
                row.new_until = Some(now + NEW_WINDOW);
            }
            StoreEvent::TurnAppended { context_id } => {
                if selected_id == Some(context_id.as_str()) {
                    return;
                }
                debug!("Row {context_id} marked updated");
                let row = self.rows.entry(context_id.clone()).or_default();
                row.updated_until = Some(now + UPDATED_WINDOW);
            }
        }
    }

    pub fn flags(&self, context_id: &str, now: Instant) -> RowFlags {
        self.rows
            .get(context_id)
            .map(|row| RowFlags {
                is_new: row.new_until.is_some_and(|t| now < t),
                is_updated: row.updated_until.is_some_and(|t| now < t),
            })
            .unwrap_or_default()
    }

    /// Drop every entry whose flags have all expired.
    pub fn sweep(&mut self, now: Instant) {
        self.rows.retain(|_, row| !row.is_expired(now));
    }

    /// True while any row still has an unexpired flag (the view keeps animating).
    pub fn is_animating(&self, now: Instant) -> bool {
        self.rows.values().any(|row| !row.is_expired(now))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(id: &str) -> StoreEvent {
        StoreEvent::ContextCreated {
            context_id: id.into(),
        }
    }

    fn appended(id: &str) -> StoreEvent {
        StoreEvent::TurnAppended {
            context_id: id.into(),
        }
    }

    #[test]
    fn created_marks_new_for_300ms() {
        let t0 = Instant::now();
        let mut tracker = AnimationTracker::new();
        tracker.observe(&created("7"), None, t0);

        assert!(tracker.flags("7", t0).is_new);
        assert!(tracker.flags("7", t0 + Duration::from_millis(299)).is_new);
        assert!(!tracker.flags("7", t0 + NEW_WINDOW).is_new);
        assert!(!tracker.flags("7", t0).is_updated);
    }

    #[test]
    fn other_rows_are_untouched() {
        let t0 = Instant::now();
        let mut tracker = AnimationTracker::new();
        tracker.observe(&created("7"), None, t0);
        assert_eq!(tracker.flags("8", t0), RowFlags::default());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn appended_marks_updated_for_one_second() {
        let t0 = Instant::now();
        let mut tracker = AnimationTracker::new();
        tracker.observe(&appended("3"), Some("1"), t0);

        assert!(tracker.flags("3", t0 + Duration::from_millis(999)).is_updated);
        assert!(!tracker.flags("3", t0 + UPDATED_WINDOW).is_updated);
    }

    #[test]
    fn appended_to_selected_row_does_nothing() {
        let t0 = Instant::now();
        let mut tracker = AnimationTracker::new();
        tracker.observe(&appended("3"), Some("3"), t0);
        assert_eq!(tracker.flags("3", t0), RowFlags::default());
        assert!(tracker.is_empty());
    }

    #[test]
    fn retrigger_restarts_the_window() {
        let t0 = Instant::now();
        let mut tracker = AnimationTracker::new();
        tracker.observe(&appended("3"), None, t0);
        let t1 = t0 + Duration::from_millis(800);
        tracker.observe(&appended("3"), None, t1);

        assert!(tracker.flags("3", t0 + Duration::from_millis(1500)).is_updated);
        assert!(!tracker.flags("3", t1 + UPDATED_WINDOW).is_updated);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn new_and_updated_coexist_on_one_row() {
        let t0 = Instant::now();
        let mut tracker = AnimationTracker::new();
        tracker.observe(&created("5"), None, t0);
        tracker.observe(&appended("5"), None, t0);
        let flags = tracker.flags("5", t0 + Duration::from_millis(100));
        assert!(flags.is_new && flags.is_updated);

        let later = tracker.flags("5", t0 + Duration::from_millis(500));
        assert!(!later.is_new && later.is_updated);
    }

    #[test]
    fn sweep_drops_only_expired_rows() {
        let t0 = Instant::now();
        let mut tracker = AnimationTracker::new();
        tracker.observe(&created("1"), None, t0);
        tracker.observe(&appended("2"), None, t0);

        let mid = t0 + Duration::from_millis(500);
        tracker.sweep(mid);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.is_animating(mid));

        let end = t0 + Duration::from_millis(1000);
        tracker.sweep(end);
        assert!(tracker.is_empty());
        assert!(!tracker.is_animating(end));
    }
}
