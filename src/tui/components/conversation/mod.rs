//! # Conversation Item Renderer
//!
//! Turns one conversation item into an [`ItemLayout`]: a header (kind badge,
//! status, timestamp) followed by a body drawn by exactly one sub-renderer.
//!
//! ```text
//!  ◆ Assistant  ✓ 14:03:27           ← header
//! │ [planner] Turn 2/8                 ← body, item-colored border
//! │ ▸ Reasoning
//! │ I'll run the tests first.
//! │ ┃ ❯ bash  ✓   ⏱ 812ms  exit 0      ← nested tool call
//! │ ┃ ▸ Arguments
//! │ ┃ ▾ Output
//! │ ┃   ok: 42 passed
//! │ claude-sonnet  1200 in  88 out
//! ```
//!
//! Dispatch is an exhaustive match over [`ItemBody`], so a new item kind is
//! a compile error here until it has a renderer.
//!
//! Untyped values go through [`try_render_canonical`], which checks the
//! structural guard and falls back to a caller-supplied view.

mod blocks;
pub mod layout;
mod tool_call;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use serde_json::Value;

use crate::core::conversation::{ConversationItem, ItemBody, ItemType, StatusIndicator};
use layout::{ItemLayout, LayoutBuilder, SectionStates};

pub use layout::{Section, SectionKey, Target, TargetKind};

/// Spinner animation frames for streaming items.
const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Everything a sub-renderer may read besides its payload.
pub struct RenderCtx<'a> {
    pub sections: &'a SectionStates,
    /// Context links render as controls only when navigation is wired up.
    pub navigable: bool,
    pub width: u16,
    /// Animation frame counter (spinners, pulsing badges).
    pub tick: usize,
    pub max_section_lines: usize,
}

impl RenderCtx<'_> {
    /// Pulse phase: alternates every few ticks.
    fn pulse_on(&self) -> bool {
        (self.tick / 4) % 2 == 0
    }

    fn pulse(&self, style: Style) -> Style {
        if self.pulse_on() {
            style.add_modifier(Modifier::BOLD)
        } else {
            style.add_modifier(Modifier::DIM)
        }
    }
}

pub fn kind_color(item_type: ItemType) -> Color {
    match item_type {
        ItemType::UserInput => Color::Cyan,
        ItemType::AssistantTurn | ItemType::Assistant => Color::Green,
        ItemType::ToolCall => Color::Yellow,
        ItemType::ToolResult => Color::Blue,
        ItemType::System => Color::Gray,
        ItemType::Handoff => Color::Magenta,
    }
}

fn kind_icon(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::UserInput => "›",
        ItemType::AssistantTurn | ItemType::Assistant => "◆",
        ItemType::ToolCall => "⚒",
        ItemType::ToolResult => "▤",
        ItemType::System => "!",
        ItemType::Handoff => "⇄",
    }
}

/// Render a typed item. A kind whose payload is missing gets the header only.
pub fn render_item(item: &ConversationItem, ctx: &RenderCtx<'_>) -> ItemLayout {
    let mut b = LayoutBuilder::new(ctx.width, ctx.max_section_lines);
    header(&mut b, item, ctx);

    let border = Span::styled(
        "│ ",
        Style::new()
            .fg(kind_color(item.item_type))
            .add_modifier(Modifier::DIM),
    );
    b.with_prefix(border, |b| match item.body() {
        Some(ItemBody::UserInput(data)) => blocks::user_input(b, data),
        Some(ItemBody::AssistantTurn(data)) => blocks::assistant_turn(b, data, ctx),
        Some(ItemBody::Assistant(data)) => blocks::legacy_assistant(b, data, ctx),
        Some(ItemBody::ToolCall(data)) => tool_call::legacy_call(b, data, ctx),
        Some(ItemBody::ToolResult(data)) => tool_call::legacy_result(b, data),
        Some(ItemBody::System(data)) => blocks::system_message(b, data),
        Some(ItemBody::Handoff(data)) => blocks::handoff(b, data, ctx),
        None => {}
    });

    b.finish()
}

/// Render `value` if it passes the conversation-item guard, else `fallback`.
pub fn try_render_canonical<F>(value: &Value, ctx: &RenderCtx<'_>, fallback: F) -> ItemLayout
where
    F: FnOnce(&Value, &RenderCtx<'_>) -> ItemLayout,
{
    match ConversationItem::from_value(value) {
        Some(item) => render_item(&item, ctx),
        None => fallback(value, ctx),
    }
}

/// Fallback view for values that aren't conversation items: dimmed JSON.
pub fn raw_json_fallback(value: &Value, ctx: &RenderCtx<'_>) -> ItemLayout {
    let dim = Style::new().fg(Color::DarkGray);
    let mut b = LayoutBuilder::new(ctx.width, ctx.max_section_lines);
    b.line(vec![Span::styled(
        " ? raw ",
        Style::new().fg(Color::Black).bg(Color::DarkGray),
    )]);
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    b.with_prefix(Span::styled("│ ", dim), |b| b.capped_text(&pretty, dim));
    b.finish()
}

fn header(b: &mut LayoutBuilder, item: &ConversationItem, ctx: &RenderCtx<'_>) {
    let color = kind_color(item.item_type);
    let mut spans = vec![Span::styled(
        format!(" {} {} ", kind_icon(item.item_type), item.item_type.label()),
        Style::new()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(status) = item.status {
        let indicator = status.indicator();
        if matches!(indicator, StatusIndicator::Spinner | StatusIndicator::PulsingDot) {
            b.mark_animated();
        }
        spans.push(Span::raw(" "));
        spans.push(status_span(indicator, ctx));
    }

    if let Some(time) = item.timestamp.as_ref().and_then(|t| t.format_local()) {
        spans.push(Span::styled(format!(" {time}"), Style::new().fg(Color::DarkGray)));
    }

    b.line(spans);
}

fn status_span(indicator: StatusIndicator, ctx: &RenderCtx<'_>) -> Span<'static> {
    match indicator {
        StatusIndicator::Spinner => Span::styled(
            SPINNER_FRAMES[ctx.tick % SPINNER_FRAMES.len()],
            Style::new().fg(Color::Cyan),
        ),
        StatusIndicator::PulsingDot => Span::styled("●", ctx.pulse(Style::new().fg(Color::Yellow))),
        StatusIndicator::Failed => Span::styled("✗", Style::new().fg(Color::Red)),
        StatusIndicator::Cancelled => Span::styled("⊘", Style::new().fg(Color::DarkGray)),
        StatusIndicator::Done => Span::styled("✓", Style::new().fg(Color::Green)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(sections: &SectionStates) -> RenderCtx<'_> {
        RenderCtx {
            sections,
            navigable: true,
            width: 60,
            tick: 0,
            max_section_lines: 20,
        }
    }

    fn render_value(value: Value) -> ItemLayout {
        let sections = SectionStates::default();
        try_render_canonical(&value, &ctx(&sections), raw_json_fallback)
    }

    #[test]
    fn missing_payload_renders_header_only() {
        let sections = SectionStates::default();
        let layout = render_item(&ConversationItem::empty(ItemType::Handoff), &ctx(&sections));
        assert_eq!(layout.lines.len(), 1);
        assert!(layout.plain_lines()[0].contains("Handoff"));
        assert!(layout.targets.is_empty());
    }

    #[test]
    fn non_canonical_value_uses_fallback() {
        let layout = render_value(json!({"item_type": "mystery", "foo": 1}));
        let text = layout.plain_lines().join("\n");
        assert!(text.contains("? raw"));
        assert!(text.contains("\"foo\": 1"));
    }

    #[test]
    fn mismatched_payload_uses_fallback() {
        let layout = render_value(json!({"item_type": "user_input", "system": {"content": "x"}}));
        assert!(layout.plain_lines()[0].contains("? raw"));
    }

    #[test]
    fn float_durations_render_canonically() {
        let layout = render_value(json!({
            "item_type": "assistant_turn",
            "turn": {
                "text": "done",
                "metrics": {"input_tokens": 1200.0, "duration_ms": 812.5}
            }
        }));
        let text = layout.plain_lines().join("\n");
        assert!(layout.plain_lines()[0].contains("Assistant"));
        assert!(!text.contains("? raw"));
        assert!(text.contains("1200 in"));
        assert!(text.contains("⏱ 813ms"));
    }

    #[test]
    fn legacy_tool_call_wins_over_stray_turn() {
        let layout = render_value(json!({
            "item_type": "tool_call",
            "tool_call": {"call_id": "call_7", "name": "bash", "args": {"cmd": "ls"}},
            "turn": {"text": "should not render", "tool_calls": [{"name": "other"}]}
        }));
        let text = layout.plain_lines().join("\n");
        assert!(text.contains("Tool Call"));
        assert!(text.contains("call_7"));
        assert!(!text.contains("should not render"));
        assert!(!text.contains("other"));
    }

    #[test]
    fn header_shows_status_and_timestamp() {
        let layout = render_value(json!({
            "item_type": "user_input",
            "status": "error",
            "timestamp": "1700000000000",
            "user_input": {"text": "hi"}
        }));
        let header = &layout.plain_lines()[0];
        assert!(header.contains("User"));
        assert!(header.contains('✗'));
        assert_eq!(header.matches(':').count(), 2);
    }

    #[test]
    fn streaming_status_spins_and_animates() {
        let layout = render_value(json!({
            "item_type": "user_input",
            "status": "streaming",
            "user_input": {"text": "hi"}
        }));
        assert!(layout.animated);
        assert!(layout.plain_lines()[0].contains('◐'));
    }

    #[test]
    fn complete_item_is_static() {
        let layout = render_value(json!({
            "item_type": "user_input",
            "status": "complete",
            "user_input": {"text": "hi"}
        }));
        assert!(!layout.animated);
        assert!(layout.plain_lines()[0].contains('✓'));
    }

    #[test]
    fn body_lines_carry_item_border() {
        let layout = render_value(json!({
            "item_type": "user_input",
            "user_input": {"text": "fix the parser", "files": ["src/parse.rs"]}
        }));
        let lines = layout.plain_lines();
        assert_eq!(lines[1], "│ fix the parser");
        assert!(lines[2].contains("src/parse.rs"));
    }
}
