//! # TUI Components
//!
//! All UI components for the terminal viewer.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: Top status bar with context counts and status
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it each
//! frame together with the props:
//! - `ContextList` / `ContextListState`: context rows, focus, row animations
//! - `ConversationPane` / `ConversationPaneState`: scrollable item view with
//!   collapsible sections and context links
//!
//! The item renderer in `conversation/` is a set of pure functions producing
//! pre-wrapped lines; the pane only stacks and scrolls them.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs                (this file)
//! ├── title_bar.rs          (Top status bar)
//! ├── context_list.rs       (Left column)
//! ├── conversation_pane.rs  (Right column, scroll + controls)
//! └── conversation/         (Per-item renderers)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod context_list;
pub mod conversation;
pub mod conversation_pane;
pub use context_list::{ContextList, ContextListEvent, ContextListState};
pub use conversation_pane::{ConversationPane, ConversationPaneState, PaneEvent};
