//! # ConversationPane Component
//!
//! Scrollable view of the selected context's conversation items.
//!
//! ## Responsibilities
//!
//! - Lay out every item through the conversation renderer
//! - Scroll (keyboard, wheel, paging) with stick-to-bottom for live contexts
//! - Track activatable controls (section toggles, context links) for
//!   Tab-cycling, Enter/Space activation and mouse clicks
//! - Emit `PaneEvent::Navigate` when a context link is activated
//!
//! ## Architecture
//!
//! `ConversationPane` is a transient component (created each frame) that
//! wraps `&'a mut ConversationPaneState` (persistent state) and the items
//! (props). Section open/closed state is kept per item index and reset when
//! a different context is shown.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};
use serde_json::Value;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::context::ContextSummary;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::conversation::layout::{ItemLayout, SectionStates, highlight};
use crate::tui::components::conversation::{
    RenderCtx, TargetKind, raw_json_fallback, try_render_canonical,
};
use crate::tui::event::TuiEvent;

/// Blank rows between items.
const ITEM_GAP: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneEvent {
    /// A context link was activated.
    Navigate(String),
}

/// A control from the last render, in content coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneTarget {
    pub item: usize,
    /// Index into the item's own layout targets.
    pub local: usize,
    pub row: u16,
    pub columns: Range<u16>,
    pub kind: TargetKind,
}

/// Scroll, section and control state for the conversation pane.
/// Must be persisted in the parent TuiState.
pub struct ConversationPaneState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, follow new items as they arrive.
    pub stick_to_bottom: bool,
    /// Index into `targets` of the keyboard-focused control.
    pub focused_target: Option<usize>,
    /// Controls from the last render, top to bottom.
    pub targets: Vec<PaneTarget>,
    /// Spinners or pulsing badges were visible in the last render.
    pub animating: bool,
    sections: Vec<SectionStates>,
    context_id: Option<String>,
    /// Screen area the content was drawn into.
    viewport: Rect,
}

impl Default for ConversationPaneState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationPaneState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::default(),
            stick_to_bottom: false,
            focused_target: None,
            targets: Vec::new(),
            animating: false,
            sections: Vec::new(),
            context_id: None,
            viewport: Rect::default(),
        }
    }

    /// Reset per-context state when a different context is shown.
    fn sync_context(&mut self, context_id: Option<&str>) {
        if self.context_id.as_deref() == context_id {
            return;
        }
        self.context_id = context_id.map(str::to_string);
        self.sections.clear();
        self.targets.clear();
        self.focused_target = None;
        self.stick_to_bottom = false;
        self.scroll_state.set_offset(Position { x: 0, y: 0 });
    }

    pub fn section_states(&self, item: usize) -> Option<&SectionStates> {
        self.sections.get(item)
    }

    fn max_scroll(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport.height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-follow once the user scrolls to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll the minimum needed to bring the focused control into view.
    pub fn scroll_to_target(&mut self) {
        let Some(target) = self.focused_target.and_then(|i| self.targets.get(i)) else {
            return;
        };
        let row = target.row;
        let offset_y = self.scroll_state.offset().y;
        let height = self.viewport.height.max(1);

        if row < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: row });
            self.stick_to_bottom = false;
        } else if row >= offset_y + height {
            let new_y = row + 1 - height;
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            self.stick_to_bottom = new_y >= self.max_scroll();
        }
    }

    fn cycle_target(&mut self, forward: bool) {
        let count = self.targets.len();
        if count == 0 {
            self.focused_target = None;
            return;
        }
        self.focused_target = Some(match (self.focused_target, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });
        self.scroll_to_target();
    }

    fn activate(&mut self, index: usize) -> Option<PaneEvent> {
        let target = self.targets.get(index)?;
        match &target.kind {
            TargetKind::Toggle(key) => {
                let key = *key;
                let item = target.item;
                if self.sections.len() <= item {
                    self.sections.resize_with(item + 1, SectionStates::default);
                }
                self.sections[item].toggle(key);
                None
            }
            TargetKind::Navigate(id) => Some(PaneEvent::Navigate(id.clone())),
        }
    }

    /// Map a click in screen coordinates to a control. Toggles accept the
    /// whole row; links only their own columns.
    fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        if !self.viewport.contains(Position { x: column, y: row }) {
            return None;
        }
        let content_row = row - self.viewport.y + self.scroll_state.offset().y;
        let content_col = column - self.viewport.x;
        self.targets.iter().position(|t| {
            t.row == content_row
                && match t.kind {
                    TargetKind::Toggle(_) => true,
                    TargetKind::Navigate(_) => t.columns.contains(&content_col),
                }
        })
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.viewport.contains(Position { x: column, y: row })
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct ConversationPane<'a> {
    pub state: &'a mut ConversationPaneState,
    pub context: Option<&'a ContextSummary>,
    pub items: &'a [Value],
    pub navigable: bool,
    pub max_section_lines: usize,
    pub tick: usize,
    /// Keyboard focus is in this pane.
    pub is_focused: bool,
}

impl ConversationPane<'_> {
    fn title(&self) -> String {
        match self.context {
            Some(ctx) => match ctx.title.as_deref() {
                Some(title) => format!(" #{} · {} ", ctx.context_id, title),
                None => format!(" #{} ", ctx.context_id),
            },
            None => " Conversation ".to_string(),
        }
    }

    /// Lay out every item, then record control positions.
    fn build_layouts(&mut self, width: u16) -> Vec<ItemLayout> {
        if self.state.sections.len() < self.items.len() {
            self.state
                .sections
                .resize_with(self.items.len(), SectionStates::default);
        }

        let layouts: Vec<ItemLayout> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let ctx = RenderCtx {
                    sections: &self.state.sections[i],
                    navigable: self.navigable,
                    width,
                    tick: self.tick,
                    max_section_lines: self.max_section_lines,
                };
                try_render_canonical(value, &ctx, raw_json_fallback)
            })
            .collect();

        self.state.layout.rebuild(layouts.iter().map(|l| l.height()));

        self.state.targets.clear();
        for (item, layout) in layouts.iter().enumerate() {
            let top = self.state.layout.item_top(item);
            for (local, target) in layout.targets.iter().enumerate() {
                self.state.targets.push(PaneTarget {
                    item,
                    local,
                    row: top.saturating_add(target.line as u16),
                    columns: target.columns(&layout.lines[target.line]),
                    kind: target.kind.clone(),
                });
            }
        }
        self.state.animating = layouts.iter().any(|l| l.animated);
        layouts
    }
}

/// Reverse the spans of one control. Controls can share a line, so the
/// control is found by index, not by line.
fn highlight_target(layout: &mut ItemLayout, local: usize) {
    let Some(target) = layout.targets.get(local) else {
        return;
    };
    let (line, spans) = (target.line, target.spans.clone());
    if let Some(line) = layout.lines.get_mut(line) {
        highlight(line, spans);
    }
}

impl Component for ConversationPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state
            .sync_context(self.context.map(|c| c.context_id.as_str()));

        let border_style = if self.is_focused {
            Style::new().fg(Color::Cyan)
        } else {
            Style::new().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title())
            .title_style(border_style.add_modifier(Modifier::BOLD));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.state.viewport = inner;

        let placeholder = if self.context.is_none() {
            Some("Select a context to view its conversation.")
        } else if self.items.is_empty() {
            Some("No conversation items yet.")
        } else {
            None
        };
        if let Some(text) = placeholder {
            self.state.targets.clear();
            self.state.layout = LayoutCache::default();
            self.state.animating = false;
            let paragraph = Paragraph::new(text)
                .style(Style::new().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, inner);
            return;
        }

        let content_width = inner.width.saturating_sub(1); // -1 for scrollbar
        let mut layouts = self.build_layouts(content_width);

        // Keep focus in range after items or sections change.
        if let Some(i) = self.state.focused_target
            && i >= self.state.targets.len()
        {
            self.state.focused_target = self.state.targets.len().checked_sub(1);
        }
        if self.is_focused
            && let Some(target) = self.state.focused_target.and_then(|i| self.state.targets.get(i))
        {
            highlight_target(&mut layouts[target.item], target.local);
        }

        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let total_height = self.state.layout.total_height();
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let scroll_offset = self.state.scroll_state.offset().y;
        for i in self.state.layout.visible_range(scroll_offset, inner.height) {
            let top = self.state.layout.item_top(i);
            let height = layouts[i].height();
            let lines: Vec<Line<'static>> = std::mem::take(&mut layouts[i].lines);
            scroll_view.render_widget(
                Paragraph::new(lines),
                Rect::new(0, top, content_width, height),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, inner, &mut self.state.scroll_state);
    }
}

/// EventHandler is implemented on the state because scroll position, section
/// toggles and focused control must survive between frames.
impl EventHandler for ConversationPaneState {
    type Event = PaneEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollDown | TuiEvent::CursorDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::NextTarget => {
                self.cycle_target(true);
                None
            }
            TuiEvent::PrevTarget => {
                self.cycle_target(false);
                None
            }
            TuiEvent::Submit | TuiEvent::Toggle => {
                let index = self.focused_target?;
                self.activate(index)
            }
            TuiEvent::MouseClick(column, row) => {
                let index = self.hit_test(*column, *row)?;
                self.focused_target = Some(index);
                self.activate(index)
            }
            _ => None,
        }
    }
}

/// Cached layout measurements: per-item heights (gap included) and their
/// running totals.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
}

impl LayoutCache {
    pub fn rebuild(&mut self, item_heights: impl Iterator<Item = u16>) {
        self.heights = item_heights.map(|h| h.saturating_add(ITEM_GAP)).collect();
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn item_top(&self, index: usize) -> u16 {
        match index {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or(0),
        }
    }

    /// Items overlapping the viewport, with half a screen of slack each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::conversation::layout::{LayoutBuilder, Run};
    use crate::tui::components::conversation::{Section, SectionKey};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    fn spawn_item() -> Value {
        json!({"item_type": "assistant_turn", "turn": {"tool_calls": [
            {"name": "spawn_agent", "description": "spawned child_context_id=42 for review",
             "result": {"content": "ok"}}
        ]}})
    }

    fn draw(state: &mut ConversationPaneState, ctx: &ContextSummary, items: &[Value]) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                ConversationPane {
                    state: &mut *state,
                    context: Some(ctx),
                    items,
                    navigable: true,
                    max_section_lines: 20,
                    tick: 0,
                    is_focused: true,
                }
                .render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn layout_cache_tops_and_total() {
        let mut cache = LayoutCache::default();
        cache.rebuild([3u16, 2, 4].into_iter());
        assert_eq!(cache.heights, vec![4, 3, 5]);
        assert_eq!(cache.item_top(0), 0);
        assert_eq!(cache.item_top(2), 7);
        assert_eq!(cache.total_height(), 12);
    }

    #[test]
    fn visible_range_covers_viewport() {
        let mut cache = LayoutCache::default();
        cache.rebuild([9u16; 10].into_iter());
        assert_eq!(cache.visible_range(0, 10), 0..2);
        assert_eq!(cache.visible_range(50, 10), 4..7);
    }

    #[test]
    fn placeholder_without_context() {
        let backend = TestBackend::new(60, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = ConversationPaneState::new();
        terminal
            .draw(|f| {
                ConversationPane {
                    state: &mut state,
                    context: None,
                    items: &[],
                    navigable: true,
                    max_section_lines: 20,
                    tick: 0,
                    is_focused: false,
                }
                .render(f, f.area());
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Select a context"));
        assert!(state.targets.is_empty());
    }

    #[test]
    fn tab_then_enter_on_link_navigates() {
        let ctx = ContextSummary::new("7");
        let items = vec![spawn_item()];
        let mut state = ConversationPaneState::new();
        draw(&mut state, &ctx, &items);

        // Controls in order: link, Arguments, Output.
        assert_eq!(state.targets.len(), 3);
        assert_eq!(state.targets[0].kind, TargetKind::Navigate("42".into()));

        assert_eq!(state.handle_event(&TuiEvent::NextTarget), None);
        assert_eq!(state.focused_target, Some(0));
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(PaneEvent::Navigate("42".into()))
        );
    }

    #[test]
    fn clicking_link_navigates_and_clicking_beside_it_does_not() {
        let ctx = ContextSummary::new("7");
        let items = vec![spawn_item()];
        let mut state = ConversationPaneState::new();
        draw(&mut state, &ctx, &items);

        let link = state.targets[0].clone();
        let row = state.viewport.y + link.row;
        let col = state.viewport.x + link.columns.start;
        assert_eq!(
            state.handle_event(&TuiEvent::MouseClick(col, row)),
            Some(PaneEvent::Navigate("42".into()))
        );
        assert_eq!(
            state.handle_event(&TuiEvent::MouseClick(state.viewport.x, row)),
            None
        );
    }

    #[test]
    fn toggling_arguments_reveals_them() {
        let ctx = ContextSummary::new("7");
        let items = vec![json!({"item_type": "assistant_turn", "turn": {"tool_calls": [
            {"name": "bash", "args": {"cmd": "make check"}}
        ]}})];
        let mut state = ConversationPaneState::new();
        let before = draw(&mut state, &ctx, &items);
        assert!(!before.contains("make check"));

        state.handle_event(&TuiEvent::NextTarget);
        assert_eq!(state.handle_event(&TuiEvent::Toggle), None);
        assert!(
            state
                .section_states(0)
                .unwrap()
                .is_open(SectionKey::tool(0, Section::Arguments))
        );

        let after = draw(&mut state, &ctx, &items);
        assert!(after.contains("make check"));
    }

    #[test]
    fn switching_context_resets_sections() {
        let items = vec![spawn_item()];
        let mut state = ConversationPaneState::new();
        draw(&mut state, &ContextSummary::new("1"), &items);
        state.handle_event(&TuiEvent::NextTarget);
        state.handle_event(&TuiEvent::NextTarget);
        state.handle_event(&TuiEvent::Toggle);
        assert!(
            state
                .section_states(0)
                .unwrap()
                .is_open(SectionKey::tool(0, Section::Arguments))
        );

        draw(&mut state, &ContextSummary::new("2"), &items);
        assert!(
            !state
                .section_states(0)
                .unwrap()
                .is_open(SectionKey::tool(0, Section::Arguments))
        );
        assert_eq!(state.focused_target, None);
    }

    #[test]
    fn rerender_is_idempotent() {
        let ctx = ContextSummary::new("7");
        let items = vec![spawn_item()];
        let mut state = ConversationPaneState::new();
        let first = draw(&mut state, &ctx, &items);
        let targets = state.targets.clone();
        let second = draw(&mut state, &ctx, &items);
        assert_eq!(first, second);
        assert_eq!(targets, state.targets);
    }

    #[test]
    fn non_canonical_items_fall_back_to_json() {
        let ctx = ContextSummary::new("7");
        let items = vec![json!({"hello": "world"})];
        let mut state = ConversationPaneState::new();
        let text = draw(&mut state, &ctx, &items);
        assert!(text.contains("? raw"));
        assert!(text.contains("hello"));
    }

    #[test]
    fn highlight_picks_the_focused_control_on_a_shared_line() {
        let mut b = LayoutBuilder::new(80, 10);
        b.runs(vec![
            Run::link("#1", Style::new(), TargetKind::Navigate("1".into())),
            Run::text(" and ", Style::new()),
            Run::link("#2", Style::new(), TargetKind::Navigate("2".into())),
        ]);
        let mut layout = b.finish();
        assert_eq!(layout.targets.len(), 2);
        assert_eq!(layout.targets[0].line, layout.targets[1].line);

        highlight_target(&mut layout, 1);
        let reversed = |i: usize| {
            let target = &layout.targets[i];
            layout.lines[target.line].spans[target.spans.clone()]
                .iter()
                .all(|s| s.style.add_modifier.contains(Modifier::REVERSED))
        };
        assert!(!reversed(0));
        assert!(reversed(1));
    }

    #[test]
    fn focused_toggle_is_reversed_on_screen() {
        let ctx = ContextSummary::new("7");
        let items = vec![spawn_item()];
        let mut state = ConversationPaneState::new();
        draw(&mut state, &ctx, &items);
        state.handle_event(&TuiEvent::NextTarget);
        state.handle_event(&TuiEvent::NextTarget);
        assert_eq!(state.focused_target, Some(1));

        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                ConversationPane {
                    state: &mut state,
                    context: Some(&ctx),
                    items: &items,
                    navigable: true,
                    max_section_lines: 20,
                    tick: 0,
                    is_focused: true,
                }
                .render(f, f.area());
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let is_reversed = |target: &PaneTarget| {
            let y = state.viewport.y + target.row;
            target
                .columns
                .clone()
                .all(|x| buffer[(state.viewport.x + x, y)].modifier.contains(Modifier::REVERSED))
        };

        assert!(matches!(state.targets[1].kind, TargetKind::Toggle(_)));
        assert!(is_reversed(&state.targets[1]));
        assert!(!is_reversed(&state.targets[0]));
    }
}
