//! Frame layout: title bar, context list | conversation pane, help line.
//!
//! ```text
//! ┌ title ─────────────────────────────────────────────┐
//! ├ Contexts (list_width) ┬ conversation (rest) ───────┤
//! │                       │                            │
//! ├───────────────────────┴────────────────────────────┤
//! └ help ──────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{ContextList, ConversationPane, TitleBar};
use crate::tui::{PaneFocus, TuiState};

/// Clock readings shared by everything drawn in one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    /// Wall clock in unix ms (presence, relative timestamps).
    pub now_ms: i64,
    /// Monotonic clock (row animation windows).
    pub now: Instant,
    /// Animation frame counter (spinners, pulses).
    pub tick: usize,
}

impl FrameClock {
    pub fn now(tick: usize) -> Self {
        Self {
            now_ms: chrono::Utc::now().timestamp_millis(),
            now: Instant::now(),
            tick,
        }
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, clock: FrameClock) {
    use Constraint::{Length, Min};
    let [title_area, main_area, help_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());
    let [list_area, pane_area] =
        Layout::horizontal([Length(tui.list_width), Min(0)]).areas(main_area);

    TitleBar::new(app.contexts.len(), app.live_count(), app.status_message.clone())
        .render(frame, title_area);

    ContextList {
        state: &mut tui.context_list,
        contexts: &app.contexts,
        selected_id: app.selected_id.as_deref(),
        focused_index: app.focused_index,
        events: &app.recent_events,
        now_ms: clock.now_ms,
        now: clock.now,
        is_focused: tui.focus == PaneFocus::List,
    }
    .render(frame, list_area);

    ConversationPane {
        state: &mut tui.pane,
        context: app.selected_context(),
        items: app.selected_items(),
        navigable: app.context_links,
        max_section_lines: app.max_section_lines,
        tick: clock.tick,
        is_focused: tui.focus == PaneFocus::Conversation,
    }
    .render(frame, pane_area);

    draw_help(frame, help_area, tui.focus);
}

fn draw_help(frame: &mut Frame, area: Rect, focus: PaneFocus) {
    let hints: &[(&str, &str)] = match focus {
        PaneFocus::List => &[
            ("↑↓", "move"),
            ("Enter", "open"),
            ("→", "conversation"),
            ("q", "quit"),
        ],
        PaneFocus::Conversation => &[
            ("↑↓", "scroll"),
            ("Tab", "next control"),
            ("Enter/Space", "activate"),
            ("←", "contexts"),
            ("q", "quit"),
        ],
    };
    let key_style = Style::new().fg(Color::Cyan);
    let text_style = Style::new().fg(Color::DarkGray);
    let spans: Vec<Span<'static>> = hints
        .iter()
        .enumerate()
        .flat_map(|(i, (key, action))| {
            let sep = if i == 0 { " " } else { "  " };
            [
                Span::styled(format!("{sep}{key}"), key_style),
                Span::styled(format!(" {action}"), text_style),
            ]
        })
        .collect();
    frame.render_widget(Line::from(spans), area);
}
