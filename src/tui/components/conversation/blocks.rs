//! Sub-renderers for message-like items: user input, assistant turns (current
//! and legacy), handoffs and system messages.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::UnicodeWidthStr;

use super::RenderCtx;
use super::layout::{LayoutBuilder, Run, Section, SectionKey};
use super::tool_call;
use crate::core::conversation::{
    Assistant, AssistantTurn, HandoffInfo, SystemKind, SystemMessage, UserInput,
};

const TEXT: Style = Style::new().fg(Color::White);
const DIM: Style = Style::new().fg(Color::DarkGray);
const REASONING: Style = Style::new()
    .fg(Color::Magenta)
    .add_modifier(Modifier::ITALIC);
const AGENT: Style = Style::new().fg(Color::Black).bg(Color::Magenta);
const SECTION_LABEL: Style = Style::new().fg(Color::Gray);

pub(super) fn user_input(b: &mut LayoutBuilder, data: &UserInput) {
    b.text(&data.text, TEXT);

    let files = data.files.as_deref().unwrap_or_default();
    if !files.is_empty() {
        let chip = Style::new().fg(Color::White).bg(Color::Blue);
        let mut runs = Vec::with_capacity(files.len() * 2);
        for (i, file) in files.iter().enumerate() {
            if i > 0 {
                runs.push(Run::text(" ", Style::new()));
            }
            runs.push(Run::chip(format!(" {file} "), chip));
        }
        b.runs(runs);
    }
}

pub(super) fn assistant_turn(b: &mut LayoutBuilder, turn: &AssistantTurn, ctx: &RenderCtx<'_>) {
    let mut meta = Vec::new();
    if let Some(agent) = turn.agent.as_deref().filter(|a| !a.is_empty()) {
        meta.push(Span::styled(format!(" {agent} "), AGENT));
    }
    if let Some((n, max)) = turn.progress() {
        if !meta.is_empty() {
            meta.push(Span::raw(" "));
        }
        meta.push(Span::styled(format!("Turn {n}/{max}"), DIM));
    }
    if !meta.is_empty() {
        b.line(meta);
    }

    if let Some(reasoning) = turn.reasoning.as_deref().filter(|r| !r.is_empty()) {
        reasoning_section(b, reasoning, ctx);
    }

    if let Some(text) = turn.text.as_deref().filter(|t| !t.is_empty()) {
        b.text(text, TEXT);
    }

    for (index, call) in turn.tool_calls.iter().enumerate() {
        tool_call::nested_call(b, index, call, ctx);
    }

    let metrics = turn.metrics.as_ref();
    metrics_bar(
        b,
        metrics.and_then(|m| m.model.as_deref()),
        metrics.and_then(|m| m.input_tokens),
        metrics.and_then(|m| m.output_tokens),
        metrics.and_then(|m| m.duration_ms),
        turn.finish_reason.as_deref(),
    );
}

pub(super) fn legacy_assistant(b: &mut LayoutBuilder, data: &Assistant, ctx: &RenderCtx<'_>) {
    if let Some(reasoning) = data.reasoning.as_deref().filter(|r| !r.is_empty()) {
        reasoning_section(b, reasoning, ctx);
    }
    if !data.text.is_empty() {
        b.text(&data.text, TEXT);
    }
    metrics_bar(
        b,
        data.model.as_deref(),
        data.input_tokens,
        data.output_tokens,
        None,
        data.stop_reason.as_deref(),
    );
}

fn reasoning_section(b: &mut LayoutBuilder, reasoning: &str, ctx: &RenderCtx<'_>) {
    let key = SectionKey::item(Section::Reasoning);
    let open = ctx.sections.is_open(key);
    b.toggle(key, "Reasoning", open, SECTION_LABEL, vec![]);
    if open {
        b.with_prefix(Span::raw("  "), |b| b.capped_text(reasoning, REASONING));
    }
}

/// Model, token counts, duration and finish reason; each one optional.
fn metrics_bar(
    b: &mut LayoutBuilder,
    model: Option<&str>,
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    duration_ms: Option<u64>,
    finish_reason: Option<&str>,
) {
    let mut parts: Vec<Span<'static>> = Vec::new();
    if let Some(model) = model.filter(|m| !m.is_empty()) {
        parts.push(Span::styled(model.to_string(), Style::new().fg(Color::Gray)));
    }
    if let Some(n) = input_tokens {
        parts.push(Span::styled(format!("{n} in"), DIM));
    }
    if let Some(n) = output_tokens {
        parts.push(Span::styled(format!("{n} out"), DIM));
    }
    if let Some(ms) = duration_ms {
        parts.push(Span::styled(format!("⏱ {ms}ms"), DIM));
    }
    if let Some(reason) = finish_reason.filter(|r| !r.is_empty()) {
        parts.push(Span::styled(
            format!("• {reason}"),
            DIM.add_modifier(Modifier::DIM),
        ));
    }
    if parts.is_empty() {
        return;
    }

    let mut spans = Vec::with_capacity(parts.len() * 2);
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(part);
    }
    b.line(spans);
}

pub(super) fn handoff(b: &mut LayoutBuilder, data: &HandoffInfo, ctx: &RenderCtx<'_>) {
    let agent = Style::new()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);
    let arrow = " ──→ ";
    let used = data.from_agent.width() + arrow.width() + data.to_agent.width();
    let pad = b.available().saturating_sub(used) / 2;
    b.line(vec![
        Span::raw(" ".repeat(pad)),
        Span::styled(data.from_agent.clone(), agent),
        Span::styled(arrow, Style::new().fg(Color::Magenta)),
        Span::styled(data.to_agent.clone(), agent),
    ]);

    if let Some(tool) = data.tool_name.as_deref().filter(|t| !t.is_empty()) {
        b.line(vec![
            Span::styled("via ", DIM),
            Span::styled(tool.to_string(), Style::new().fg(Color::Magenta)),
        ]);
    }
    if let Some(reason) = data.reason.as_deref().filter(|r| !r.is_empty()) {
        b.text(reason, TEXT);
    }
    if let Some(input) = data.input.as_deref().filter(|i| !i.is_empty()) {
        let key = SectionKey::item(Section::HandoffInput);
        let open = ctx.sections.is_open(key);
        b.toggle(key, "Input", open, SECTION_LABEL, vec![]);
        if open {
            b.with_prefix(Span::raw("  "), |b| b.capped_text(input, TEXT));
        }
    }
}

/// Icon and color per system-message kind. Unknown kinds look like `info`.
fn system_treatment(kind: SystemKind) -> (&'static str, Color) {
    match kind.treatment() {
        SystemKind::Warning => ("⚠", Color::Yellow),
        SystemKind::Error => ("✗", Color::Red),
        SystemKind::Guardrail => ("⛨", Color::Indexed(208)),
        SystemKind::RateLimit => ("⏱", Color::Yellow),
        SystemKind::Rewind => ("↺", Color::Magenta),
        SystemKind::Info | SystemKind::Unknown => ("ℹ", Color::Gray),
    }
}

pub(super) fn system_message(b: &mut LayoutBuilder, data: &SystemMessage) {
    let (icon, color) = system_treatment(data.kind);
    let style = Style::new().fg(color);

    match data.title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => {
            b.line(vec![
                Span::styled(format!("{icon} "), style),
                Span::styled(title.to_string(), style.add_modifier(Modifier::BOLD)),
            ]);
            b.with_prefix(Span::raw("  "), |b| b.text(&data.content, style));
        }
        None => b.runs(vec![
            Run::chip(format!("{icon} "), style),
            Run::text(data.content.clone(), style),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::super::layout::{ItemLayout, SectionStates, TargetKind};
    use super::super::{RenderCtx, render_item};
    use super::*;
    use crate::core::conversation::ConversationItem;
    use serde_json::json;

    fn render(value: serde_json::Value, sections: &SectionStates) -> ItemLayout {
        let item = ConversationItem::from_value(&value).expect("canonical item");
        render_item(
            &item,
            &RenderCtx {
                sections,
                navigable: true,
                width: 60,
                tick: 0,
                max_section_lines: 20,
            },
        )
    }

    fn text_of(layout: &ItemLayout) -> String {
        layout.plain_lines().join("\n")
    }

    #[test]
    fn turn_shows_agent_progress_and_collapsed_reasoning() {
        let layout = render(
            json!({"item_type": "assistant_turn", "turn": {
                "agent": "planner", "turn_number": 1, "max_turns": 8,
                "reasoning": "secret thoughts", "text": "Running tests."
            }}),
            &SectionStates::default(),
        );
        let text = text_of(&layout);
        assert!(text.contains("planner"));
        assert!(text.contains("Turn 2/8"));
        assert!(text.contains("▸ Reasoning"));
        assert!(!text.contains("secret thoughts"));
        assert!(text.contains("Running tests."));
    }

    #[test]
    fn opened_reasoning_is_shown() {
        let mut sections = SectionStates::default();
        sections.toggle(SectionKey::item(Section::Reasoning));
        let layout = render(
            json!({"item_type": "assistant_turn", "turn": {"reasoning": "secret thoughts"}}),
            &sections,
        );
        let text = text_of(&layout);
        assert!(text.contains("▾ Reasoning"));
        assert!(text.contains("secret thoughts"));
    }

    #[test]
    fn zero_max_turns_hides_progress() {
        let layout = render(
            json!({"item_type": "assistant_turn", "turn": {"agent": "a", "turn_number": 0, "max_turns": 0}}),
            &SectionStates::default(),
        );
        assert!(!text_of(&layout).contains("Turn"));
    }

    #[test]
    fn metrics_fields_are_independent() {
        let layout = render(
            json!({"item_type": "assistant_turn", "turn": {
                "metrics": {"output_tokens": 88}, "finish_reason": "stop"
            }}),
            &SectionStates::default(),
        );
        let text = text_of(&layout);
        assert!(text.contains("88 out"));
        assert!(text.contains("• stop"));
        assert!(!text.contains(" in"));
        assert!(!text.contains("ms"));
    }

    #[test]
    fn nested_tool_calls_render_in_order() {
        let layout = render(
            json!({"item_type": "assistant_turn", "turn": {"tool_calls": [
                {"name": "read_file"}, {"name": "bash"}
            ]}}),
            &SectionStates::default(),
        );
        let text = text_of(&layout);
        let read = text.find("read_file").unwrap();
        let bash = text.find("bash").unwrap();
        assert!(read < bash);
    }

    #[test]
    fn legacy_assistant_renders_text_and_metrics() {
        let layout = render(
            json!({"item_type": "assistant", "assistant": {
                "text": "done", "model": "m-1", "input_tokens": 5, "stop_reason": "end_turn"
            }}),
            &SectionStates::default(),
        );
        let text = text_of(&layout);
        assert!(text.contains("done"));
        assert!(text.contains("m-1  5 in  • end_turn"));
    }

    #[test]
    fn handoff_shows_agents_tool_and_collapsed_input() {
        let layout = render(
            json!({"item_type": "handoff", "handoff": {
                "from_agent": "triage", "to_agent": "billing",
                "tool_name": "transfer", "reason": "billing question", "input": "{\"q\": 1}"
            }}),
            &SectionStates::default(),
        );
        let text = text_of(&layout);
        assert!(text.contains("triage ──→ billing"));
        assert!(text.contains("via transfer"));
        assert!(text.contains("billing question"));
        assert!(text.contains("▸ Input"));
        assert!(!text.contains("\"q\""));
        assert_eq!(
            layout.targets[0].kind,
            TargetKind::Toggle(SectionKey::item(Section::HandoffInput))
        );
    }

    #[test]
    fn system_unknown_kind_uses_info_treatment() {
        assert_eq!(system_treatment(SystemKind::Unknown), system_treatment(SystemKind::Info));
        let layout = render(
            json!({"item_type": "system", "system": {"kind": "solar_flare", "content": "hm"}}),
            &SectionStates::default(),
        );
        assert!(text_of(&layout).contains("ℹ hm"));
    }

    #[test]
    fn system_title_is_optional() {
        let layout = render(
            json!({"item_type": "system", "system": {"kind": "warning", "title": "Careful", "content": "slow down"}}),
            &SectionStates::default(),
        );
        let lines = layout.plain_lines();
        assert!(lines[1].contains("⚠ Careful"));
        assert!(lines[2].contains("slow down"));
    }
}
