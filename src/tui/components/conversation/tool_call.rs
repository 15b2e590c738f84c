//! Tool-call blocks: the nested call inside an assistant turn, plus the
//! legacy standalone call and result.
//!
//! **Nested call**:
//!   `┃ ❯ bash  ✓   ⏱ 812ms  exit 0`
//!   `┃ spawned #42 for review`
//!   `┃ ▸ Arguments`
//!   `┃ ▾ Output                truncated`
//!   `┃   ok: 42 passed`

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use super::RenderCtx;
use super::layout::{LayoutBuilder, Run, Section, SectionKey, TargetKind};
use crate::core::conversation::{
    ToolCallData, ToolCallItem, ToolCallStatus, ToolKind, ToolResultData, format_tool_args,
};
use crate::core::links::{DescriptionSegment, parse_context_links};

const DIM: Style = Style::new().fg(Color::DarkGray);
const TEXT: Style = Style::new().fg(Color::White);
const ERROR_TEXT: Style = Style::new().fg(Color::LightRed);
const LINK: Style = Style::new()
    .fg(Color::Cyan)
    .add_modifier(Modifier::UNDERLINED);
const SECTION_LABEL: Style = Style::new().fg(Color::Gray);

// ─── Tool presentation ───────────────────────────────────────────────

fn tool_glyph(kind: ToolKind) -> (&'static str, Color) {
    match kind {
        ToolKind::Shell => ("❯", Color::Green),
        ToolKind::Read => ("◫", Color::Blue),
        ToolKind::Edit => ("✎", Color::Yellow),
        ToolKind::Search => ("⌕", Color::Cyan),
        ToolKind::Web => ("◎", Color::LightBlue),
        ToolKind::Spawn => ("⑂", Color::Magenta),
        ToolKind::Other => ("⚙", Color::Gray),
    }
}

/// Glyph, foreground and background for a nested call's status badge.
fn status_badge(status: ToolCallStatus) -> (&'static str, Color, Color) {
    match status {
        ToolCallStatus::Pending => ("○", Color::Gray, Color::Indexed(236)),
        ToolCallStatus::Running => ("▶", Color::Cyan, Color::Indexed(23)),
        ToolCallStatus::Streaming => ("≋", Color::Cyan, Color::Indexed(23)),
        ToolCallStatus::Complete => ("✓", Color::Green, Color::Indexed(22)),
        ToolCallStatus::Error => ("✗", Color::Red, Color::Indexed(52)),
        ToolCallStatus::Cancelled => ("⊘", Color::DarkGray, Color::Indexed(236)),
        ToolCallStatus::Unknown => ("?", Color::Gray, Color::Indexed(236)),
    }
}

fn exit_span(code: i32, always_red: bool) -> Span<'static> {
    let style = if always_red || code != 0 {
        Style::new().fg(Color::Red)
    } else {
        DIM
    };
    Span::styled(format!("  exit {code}"), style)
}

fn tool_border(color: Color) -> Span<'static> {
    Span::styled("┃ ", Style::new().fg(color).add_modifier(Modifier::DIM))
}

/// Description text; the first `child_context_id=N` becomes a `#N` control
/// when navigation is available.
fn description(b: &mut LayoutBuilder, text: &str, navigable: bool) {
    if !navigable {
        b.text(text, TEXT);
        return;
    }
    let runs = parse_context_links(text)
        .into_iter()
        .map(|segment| match segment {
            DescriptionSegment::Text(t) => Run::text(t, TEXT),
            DescriptionSegment::ContextLink(id) => {
                Run::link(format!("#{id}"), LINK, TargetKind::Navigate(id.to_string()))
            }
        })
        .collect();
    b.runs(runs);
}

fn arguments(b: &mut LayoutBuilder, key: SectionKey, args: &serde_json::Value, ctx: &RenderCtx<'_>) {
    let open = ctx.sections.is_open(key);
    b.toggle(key, "Arguments", open, SECTION_LABEL, vec![]);
    if open {
        let formatted = format_tool_args(args);
        let formatted = if formatted.is_empty() {
            "(empty)".to_string()
        } else {
            formatted
        };
        b.with_prefix(Span::raw("  "), |b| b.capped_text(&formatted, TEXT));
    }
}

// ─── Nested call ─────────────────────────────────────────────────────

pub(super) fn nested_call(
    b: &mut LayoutBuilder,
    index: usize,
    call: &ToolCallItem,
    ctx: &RenderCtx<'_>,
) {
    let (glyph, color) = tool_glyph(ToolKind::from_name(&call.name));

    b.with_prefix(tool_border(color), |b| {
        let (badge, fg, bg) = status_badge(call.status);
        let mut badge_style = Style::new().fg(fg).bg(bg);
        if call.status.is_in_flight() {
            badge_style = ctx.pulse(badge_style);
            b.mark_animated();
        }

        let mut header = vec![
            Span::styled(glyph, Style::new().fg(color)),
            Span::raw(" "),
            Span::styled(
                call.name.clone(),
                Style::new().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(format!(" {badge} "), badge_style),
        ];
        if let Some(ms) = call.visible_duration_ms() {
            header.push(Span::styled(format!("  ⏱ {ms}ms"), DIM));
        }
        if let Some(code) = call.result.as_ref().and_then(|r| r.exit_code) {
            header.push(exit_span(code, false));
        }
        if let Some(code) = call.error.as_ref().and_then(|e| e.exit_code) {
            header.push(exit_span(code, true));
        }
        b.line(header);

        if let Some(text) = call.description.as_deref().filter(|d| !d.is_empty()) {
            description(b, text, ctx.navigable);
        }

        arguments(b, SectionKey::tool(index, Section::Arguments), &call.args, ctx);

        if let Some(output) = call.output() {
            let is_error = call.is_error();
            let key = SectionKey::tool(index, Section::Output);
            let open = ctx.sections.is_open(key);
            let (label, label_style) = if is_error {
                ("Error", Style::new().fg(Color::Red))
            } else {
                ("Output", SECTION_LABEL)
            };
            let trailing = if call.is_truncated() {
                vec![Span::styled("  truncated", Style::new().fg(Color::Yellow))]
            } else {
                vec![]
            };
            b.toggle(key, label, open, label_style, trailing);
            if open {
                let style = if is_error { ERROR_TEXT } else { TEXT };
                b.with_prefix(Span::raw("  "), |b| b.capped_text(output.text(), style));
            }
        }
    });
}

// ─── Legacy call / result ────────────────────────────────────────────

pub(super) fn legacy_call(b: &mut LayoutBuilder, data: &ToolCallData, ctx: &RenderCtx<'_>) {
    let (glyph, color) = tool_glyph(ToolKind::from_name(&data.name));
    b.with_prefix(tool_border(color), |b| {
        let mut header = vec![
            Span::styled(glyph, Style::new().fg(color)),
            Span::raw(" "),
            Span::styled(
                data.name.clone(),
                Style::new().fg(color).add_modifier(Modifier::BOLD),
            ),
        ];
        if !data.call_id.is_empty() {
            header.push(Span::styled(format!("  {}", data.call_id), DIM));
        }
        b.line(header);

        if let Some(text) = data.description.as_deref().filter(|d| !d.is_empty()) {
            description(b, text, ctx.navigable);
        }
        arguments(b, SectionKey::item(Section::Arguments), &data.args, ctx);
    });
}

pub(super) fn legacy_result(b: &mut LayoutBuilder, data: &ToolResultData) {
    let (icon, label, color) = if data.is_error {
        ("✗", "Error", Color::Red)
    } else {
        ("✓", "Result", Color::Green)
    };
    b.with_prefix(tool_border(color), |b| {
        let mut header = vec![Span::styled(
            format!("{icon} {label}"),
            Style::new().fg(color).add_modifier(Modifier::BOLD),
        )];
        if !data.call_id.is_empty() {
            header.push(Span::styled(format!("  {}", data.call_id), DIM));
        }
        if let Some(code) = data.exit_code {
            header.push(exit_span(code, false));
        }
        if let Some(ms) = data.duration_ms {
            header.push(Span::styled(format!("  ⏱ {ms}ms"), DIM));
        }
        b.line(header);

        match data.output() {
            Some(output) => {
                let style = if data.is_error { ERROR_TEXT } else { TEXT };
                b.capped_text(output, style);
                if data.output_truncated {
                    b.line(vec![Span::styled(
                        "Output truncated",
                        Style::new().fg(Color::Yellow),
                    )]);
                }
            }
            None => {
                b.line(vec![Span::styled(
                    "No output",
                    DIM.add_modifier(Modifier::ITALIC),
                )]);
            }
        }
    });
}
