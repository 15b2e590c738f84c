//! # Context List Component
//!
//! Left-hand column: one row per context, in store order.
//!
//! ```text
//! ▌Refactor the parser
//! ▌● ⑂ 42 claude-code ▣          ✦12s
//! ▌  ❯ @ alice
//! ▌   bug   parser   p1  +2
//! ▌  ⎇ depth 7  head: t-91
//! ```
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ContextListState` lives in `TuiState` and owns the row animations
//! - `ContextList` is created each frame with borrowed props
//!
//! Selection and focus are not decided here. The list emits
//! [`ContextListEvent`]s and the reducer owns the resulting state.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::animation::{AnimationTracker, RowFlags};
use crate::core::context::{ContextSummary, PresenceState, SequencedEvent};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Activity newer than this gets a sparkle next to the timestamp.
const SPARKLE_THRESHOLD_MS: i64 = 60_000;

const NEW_ROW_BG: Color = Color::Indexed(22);
const UPDATED_ROW_BG: Color = Color::Indexed(58);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextListEvent {
    Select(String),
    Focus(usize),
}

/// Persistent state for the context list.
pub struct ContextListState {
    pub list_state: ListState,
    pub animations: AnimationTracker,
    /// Sequence number of the last store event fed to `animations`.
    last_seen_seq: Option<u64>,
    /// Row ids and heights from the last render, for events and hit-testing.
    row_ids: Vec<String>,
    row_heights: Vec<u16>,
    focused: usize,
    area: Rect,
}

impl Default for ContextListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextListState {
    pub fn new() -> Self {
        Self {
            list_state: ListState::default(),
            animations: AnimationTracker::new(),
            last_seen_seq: None,
            row_ids: Vec::new(),
            row_heights: Vec::new(),
            focused: 0,
            area: Rect::default(),
        }
    }

    /// Feed every store event not seen yet to the animations, in order,
    /// then drop expired flags.
    fn observe(&mut self, events: &[SequencedEvent], selected_id: Option<&str>, now: Instant) {
        for event in events {
            if self.last_seen_seq.is_some_and(|seen| event.seq <= seen) {
                continue;
            }
            self.animations.observe(&event.event, selected_id, now);
            self.last_seen_seq = Some(event.seq);
        }
        self.animations.sweep(now);
    }

    /// Row under a screen position, if any.
    fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        if !self.area.contains(Position { x: column, y: row }) {
            return None;
        }
        let mut y = row - self.area.y;
        for (index, &height) in self.row_heights.iter().enumerate().skip(self.list_state.offset()) {
            if y < height {
                return Some(index);
            }
            y -= height;
        }
        None
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area.contains(Position { x: column, y: row })
    }
}

impl EventHandler for ContextListState {
    type Event = ContextListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.row_ids.is_empty() {
            return None;
        }
        let last = self.row_ids.len() - 1;
        match event {
            TuiEvent::CursorUp if self.focused > 0 => Some(ContextListEvent::Focus(self.focused - 1)),
            TuiEvent::CursorDown if self.focused < last => {
                Some(ContextListEvent::Focus(self.focused + 1))
            }
            TuiEvent::Submit => self
                .row_ids
                .get(self.focused)
                .map(|id| ContextListEvent::Select(id.clone())),
            TuiEvent::MouseClick(column, row) => {
                let index = self.hit_test(*column, *row)?;
                Some(ContextListEvent::Select(self.row_ids[index].clone()))
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the context list.
pub struct ContextList<'a> {
    pub state: &'a mut ContextListState,
    pub contexts: &'a [ContextSummary],
    pub selected_id: Option<&'a str>,
    pub focused_index: usize,
    /// Recent store events, oldest first.
    pub events: &'a [SequencedEvent],
    /// Wall clock, for presence and relative timestamps.
    pub now_ms: i64,
    /// Monotonic clock, for animation windows.
    pub now: Instant,
    /// Keyboard focus is in the list.
    pub is_focused: bool,
}

impl Component for ContextList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.observe(self.events, self.selected_id, self.now);

        let border_style = if self.is_focused {
            Style::new().fg(Color::Cyan)
        } else {
            Style::new().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(format!(" Contexts ({}) ", self.contexts.len()))
            .title_style(border_style.add_modifier(Modifier::BOLD));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.state.area = inner;

        self.state.row_ids = self.contexts.iter().map(|c| c.context_id.clone()).collect();
        if self.contexts.is_empty() {
            self.state.row_heights.clear();
            self.state.focused = 0;
            self.state.list_state.select(None);
            let empty = Paragraph::new("No contexts available.")
                .style(Style::new().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(empty, inner);
            return;
        }

        self.state.focused = self.focused_index.min(self.contexts.len() - 1);
        let items: Vec<ListItem<'static>> = self
            .contexts
            .iter()
            .enumerate()
            .map(|(index, context)| {
                let emphasis = if self.selected_id == Some(context.context_id.as_str()) {
                    Emphasis::Selected
                } else if index == self.state.focused {
                    Emphasis::Focused
                } else {
                    Emphasis::None
                };
                let flags = self.state.animations.flags(&context.context_id, self.now);
                context_row(context, emphasis, flags, self.now_ms, inner.width)
            })
            .collect();
        self.state.row_heights = items.iter().map(|i| i.height() as u16).collect();

        // Selecting the focused row makes List scroll it into view.
        self.state.list_state.select(Some(self.state.focused));
        frame.render_stateful_widget(List::new(items), inner, &mut self.state.list_state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Selected,
    Focused,
    None,
}

impl Emphasis {
    fn bar(self) -> Span<'static> {
        match self {
            Emphasis::Selected => Span::styled(
                "▌",
                Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Emphasis::Focused => Span::styled("│", Style::new().fg(Color::Gray)),
            Emphasis::None => Span::raw(" "),
        }
    }

    fn text_style(self) -> Style {
        match self {
            Emphasis::Selected => Style::new().fg(Color::White).add_modifier(Modifier::BOLD),
            _ => Style::new().fg(Color::Gray),
        }
    }
}

fn context_row(
    context: &ContextSummary,
    emphasis: Emphasis,
    flags: RowFlags,
    now_ms: i64,
    width: u16,
) -> ListItem<'static> {
    let bar = emphasis.bar();
    let mut lines = Vec::new();

    if let Some(title) = context.title.as_deref().filter(|t| !t.is_empty()) {
        lines.push(Line::from(vec![
            bar.clone(),
            Span::styled(title.to_string(), emphasis.text_style()),
        ]));
    }

    lines.push(main_line(context, emphasis, now_ms, width));

    if let Some(actor) = context.on_behalf_of() {
        lines.push(Line::from(vec![
            bar.clone(),
            Span::raw("  "),
            source_glyph(context.on_behalf_of_source()),
            Span::styled(format!(" @ {actor}"), Style::new().fg(Color::Gray)),
        ]));
    }

    let (labels, hidden) = context.visible_labels();
    if !labels.is_empty() {
        let mut spans = vec![bar.clone(), Span::raw(" ")];
        for label in labels {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!(" {label} "),
                Style::new().fg(Color::White).bg(Color::DarkGray),
            ));
        }
        if hidden > 0 {
            spans.push(Span::styled(format!(" +{hidden}"), Style::new().fg(Color::DarkGray)));
        }
        lines.push(Line::from(spans));
    }

    if context.head_depth.is_some() || context.head_turn_id.is_some() {
        let mut text = String::from("⎇");
        if let Some(depth) = context.head_depth {
            text.push_str(&format!(" depth {depth}"));
        }
        if let Some(head) = &context.head_turn_id {
            text.push_str(&format!("  head: {head}"));
        }
        lines.push(Line::from(vec![
            bar,
            Span::raw("  "),
            Span::styled(text, Style::new().fg(Color::DarkGray)),
        ]));
    }

    let mut item = ListItem::new(lines);
    if flags.is_new {
        item = item.style(Style::new().bg(NEW_ROW_BG));
    } else if flags.is_updated && emphasis != Emphasis::Selected {
        item = item.style(Style::new().bg(UPDATED_ROW_BG));
    }
    item
}

/// Presence, lineage, id, tag, snapshot glyph, then the timestamp pushed to
/// the right edge.
fn main_line(context: &ContextSummary, emphasis: Emphasis, now_ms: i64, width: u16) -> Line<'static> {
    let mut left = vec![emphasis.bar(), presence_span(context.presence(now_ms))];
    if context.parent_context_id().is_some() {
        left.push(Span::styled(" ⑂", Style::new().fg(Color::Green)));
    }
    left.push(Span::styled(
        format!(" {}", context.context_id),
        emphasis.text_style(),
    ));
    if let Some(tag) = context.client_tag.as_deref().filter(|t| !t.is_empty()) {
        left.push(Span::raw(" "));
        left.push(Span::styled(
            format!(" {tag} "),
            Style::new().fg(Color::Black).bg(tag_color(tag)),
        ));
    }
    if context.has_fs_snapshot {
        left.push(Span::styled(" ▣", Style::new().fg(Color::Yellow)));
    }

    let mut right = Vec::new();
    if let Some(ts) = context.display_timestamp() {
        let sparkle = context
            .last_activity_at
            .is_some_and(|at| now_ms.saturating_sub(at) < SPARKLE_THRESHOLD_MS);
        if sparkle {
            right.push(Span::styled("✦", Style::new().fg(Color::Yellow)));
        }
        right.push(Span::styled(
            format_relative(now_ms, ts),
            Style::new().fg(Color::DarkGray),
        ));
    }
    right.push(Span::styled(
        " ›",
        if emphasis == Emphasis::Selected {
            Style::new().fg(Color::Cyan)
        } else {
            Style::new().fg(Color::DarkGray)
        },
    ));

    let used: usize = left.iter().chain(&right).map(|s| s.content.width()).sum();
    let pad = (width as usize).saturating_sub(used).max(1);
    left.push(Span::raw(" ".repeat(pad)));
    left.extend(right);
    Line::from(left)
}

fn presence_span(presence: PresenceState) -> Span<'static> {
    let (glyph, style) = match presence {
        PresenceState::Active => ("●", Style::new().fg(Color::Green).add_modifier(Modifier::BOLD)),
        PresenceState::Live => ("●", Style::new().fg(Color::Green)),
        PresenceState::Idle => ("○", Style::new().fg(Color::Yellow)),
        PresenceState::Disconnected => ("○", Style::new().fg(Color::DarkGray)),
    };
    Span::styled(glyph, style)
}

pub fn tag_color(tag: &str) -> Color {
    match tag {
        "dotrunner" => Color::Blue,
        "claude-code" => Color::Indexed(208),
        "gen" => Color::Magenta,
        "test" => Color::Yellow,
        _ => Color::Gray,
    }
}

fn source_glyph(source: Option<&str>) -> Span<'static> {
    let (glyph, color) = match source.map(str::to_ascii_lowercase).as_deref() {
        Some("github") => ("◈", Color::White),
        Some("slack") => ("#", Color::Magenta),
        Some("cli") => ("❯", Color::Green),
        Some("api") => ("⚡", Color::Yellow),
        _ => ("•", Color::DarkGray),
    };
    Span::styled(glyph, Style::new().fg(color))
}

/// Compact age of `ts_ms`: `now`, `12s`, `5m`, `3h`, `2d`.
pub fn format_relative(now_ms: i64, ts_ms: i64) -> String {
    let secs = now_ms.saturating_sub(ts_ms).max(0) / 1000;
    match secs {
        0..5 => "now".to_string(),
        5..60 => format!("{secs}s"),
        60..3_600 => format!("{}m", secs / 60),
        3_600..86_400 => format!("{}h", secs / 3_600),
        _ => format!("{}d", secs / 86_400),
    }
}
