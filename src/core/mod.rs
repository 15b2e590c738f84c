//! # Core Dashboard Logic
//!
//! This module contains cxview's domain logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Data model           │
//!                    │  • Presence, animation  │
//!                    │  • Action + update()    │
//!                    │                         │
//!                    │  No terminal. No UI.    │
//!                    └───────────┬─────────────┘
//!                                │
//!                                ▼
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (ratatui)  │
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`context`]: `ContextSummary`, presence derivation, `StoreEvent`
//! - [`conversation`]: `ConversationItem`, the canonical guard, `ItemBody`
//! - [`links`]: `child_context_id=N` parsing
//! - [`animation`]: per-row "new" / "updated" flags with expiry
//! - [`state`]: the `App` struct, all dashboard state in one place
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`snapshot`]: snapshot and event-feed loading
//! - [`config`]: layered configuration

pub mod action;
pub mod animation;
pub mod config;
pub mod context;
pub mod conversation;
pub mod links;
pub mod snapshot;
pub mod state;
