//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop adapts its poll timeout to what is on screen:
//!
//! - **Animating** (row flashes, spinners, pulsing badges) or replaying the
//!   feed: wakes every ~80ms.
//! - **Idle**: sleeps up to 500ms unless input arrives. Idle wake-ups still
//!   redraw so presence and relative timestamps age.
//!
//! ## Event Feed
//!
//! `spawn_feed_replay` runs on a tokio task and forwards each feed entry as
//! an `Action::Store` over a std mpsc channel. The loop drains the channel
//! between frames; the task is aborted on exit.

pub mod component;
pub mod components;
pub mod event;
pub mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::snapshot::{FeedEntry, Snapshot};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{ContextListEvent, ContextListState, ConversationPaneState, PaneEvent};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::ui::FrameClock;

const ANIMATION_FRAME: Duration = Duration::from_millis(80);
const IDLE_FRAME: Duration = Duration::from_millis(500);

/// Which column receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    List,
    Conversation,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub context_list: ContextListState,
    pub pane: ConversationPaneState,
    pub focus: PaneFocus,
    pub list_width: u16,
}

impl TuiState {
    pub fn new(list_width: u16) -> Self {
        Self {
            context_list: ContextListState::new(),
            pane: ConversationPaneState::new(),
            focus: PaneFocus::List,
            list_width,
        }
    }

    /// Anything on screen that changes without input.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.context_list.animations.is_animating(now) || self.pane.animating
    }

    /// Route one input event, returning the action it produces, if any.
    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<Action> {
        match event {
            TuiEvent::Quit => return Some(Action::Quit),
            TuiEvent::Resize => return None,
            TuiEvent::FocusLeft => {
                self.focus = PaneFocus::List;
                return None;
            }
            TuiEvent::FocusRight => {
                self.focus = PaneFocus::Conversation;
                return None;
            }
            TuiEvent::NextTarget | TuiEvent::PrevTarget => {
                self.focus = PaneFocus::Conversation;
            }
            TuiEvent::MouseClick(column, row) => {
                if self.context_list.contains(*column, *row) {
                    self.focus = PaneFocus::List;
                } else if self.pane.contains(*column, *row) {
                    self.focus = PaneFocus::Conversation;
                } else {
                    return None;
                }
            }
            // The wheel always scrolls the conversation.
            TuiEvent::ScrollUp | TuiEvent::ScrollDown => {
                self.pane.handle_event(event);
                return None;
            }
            _ => {}
        }

        match self.focus {
            PaneFocus::List => match self.context_list.handle_event(event)? {
                ContextListEvent::Select(id) => Some(Action::Select(id)),
                ContextListEvent::Focus(index) => Some(Action::Focus(index)),
            },
            PaneFocus::Conversation => match self.pane.handle_event(event)? {
                PaneEvent::Navigate(id) => Some(Action::NavigateToContext(id)),
            },
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, Hide)?;
        info!("Terminal modes enabled (mouse capture, hidden cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, Show);
    }
}

/// Replay `feed` on a tokio task, sending one `Action::Store` per entry
/// after its delay. Stops early when the receiver is dropped.
pub fn spawn_feed_replay(
    feed: Vec<FeedEntry>,
    tx: mpsc::Sender<Action>,
) -> tokio::task::JoinHandle<()> {
    info!("Spawning feed replay ({} entries)", feed.len());
    tokio::spawn(async move {
        let total = feed.len();
        for entry in feed {
            if entry.after_ms > 0 {
                tokio::time::sleep(Duration::from_millis(entry.after_ms)).await;
            }
            let received_at_ms = chrono::Utc::now().timestamp_millis();
            debug!("Replaying {:?}", entry.event);
            if tx
                .send(Action::Store {
                    entry,
                    received_at_ms,
                })
                .is_err()
            {
                warn!("Feed replay stopped: receiver dropped");
                return;
            }
        }
        info!("Feed replay finished ({total} entries)");
    })
}

pub fn run(config: ResolvedConfig, snapshot: Snapshot, feed: Vec<FeedEntry>) -> std::io::Result<()> {
    let mut app = App::from_config(snapshot, &config);
    let mut tui = TuiState::new(config.list_width);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let replay = (!feed.is_empty()).then(|| spawn_feed_replay(feed, tx.clone()));

    let start_time = Instant::now();

    'main: loop {
        // Every wake-up redraws; only the wake-up rate depends on animation.
        let tick = (start_time.elapsed().as_millis() / ANIMATION_FRAME.as_millis()) as usize;
        let clock = FrameClock::now(tick);
        terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, clock))?;

        // Dynamic poll timeout: short when animating (~12fps) or while the
        // feed is still replaying, long when idle
        let replaying = replay.as_ref().is_some_and(|handle| !handle.is_finished());
        let timeout = if replaying || tui.is_animating(clock.now) {
            ANIMATION_FRAME
        } else {
            IDLE_FRAME
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = tui.handle_event(&event) {
                debug!("Input produced {:?}", action);
                if update(&mut app, action) == Effect::Quit {
                    break 'main;
                }
            }
        }

        // Handle background task actions (store events)
        while let Ok(action) = rx.try_recv() {
            if update(&mut app, action) == Effect::Quit {
                break 'main;
            }
        }
    }

    if let Some(handle) = replay {
        handle.abort();
    }
    info!("Shutting down");
    ratatui::restore();
    Ok(())
}
