//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::snapshot::{Snapshot, parse_snapshot};
use crate::core::state::App;

/// Three contexts: a live one with two items, an idle one, a disconnected one.
pub fn test_snapshot() -> Snapshot {
    parse_snapshot(
        r#"{
            "contexts": [
                {"context_id": "1", "title": "Refactor parser", "is_live": true, "session_id": "s1",
                 "client_tag": "claude-code", "labels": ["a", "b", "c", "d", "e"]},
                {"context_id": "2", "session_id": "s2"},
                {"context_id": "3", "provenance": {"parent_context_id": "1"}}
            ],
            "items": {
                "1": [
                    {"item_type": "user_input", "user_input": {"text": "fix the parser"}},
                    {"item_type": "system", "system": {"kind": "info", "content": "ok"}}
                ]
            }
        }"#,
    )
    .expect("test snapshot parses")
}

/// Creates a test App over `test_snapshot()`.
pub fn test_app() -> App {
    App::new(test_snapshot())
}
