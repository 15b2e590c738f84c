//! Pre-wrapped line layout for conversation items.
//!
//! Every item is laid out into `Line`s that already fit the pane width, so a
//! line index is a screen row. That makes controls (section toggles, context
//! links) addressable by row for keyboard focus and mouse hit-testing.
//!
//! ```text
//!  prefix stack        content
//! ┌──────────────┐┌────────────────────────────┐
//!  │ ┃             ▸ Arguments                   ← Target { Toggle(..) }
//!  │ ┃             spawned #42 for review        ← Target { Navigate("42") }
//! ```

use std::collections::HashMap;
use std::ops::Range;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const OVERFLOW_STYLE: Style = Style::new().fg(Color::DarkGray).add_modifier(Modifier::DIM);

// ============================================================================
// Sections
// ============================================================================

/// Collapsible sub-section of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Reasoning,
    Arguments,
    Output,
    HandoffInput,
}

impl Section {
    /// Output is open until the user closes it; everything else starts collapsed.
    pub fn default_open(self) -> bool {
        matches!(self, Section::Output)
    }
}

/// Identifies a section within one item. `tool` is the index of the nested
/// tool call inside an assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub tool: Option<usize>,
    pub section: Section,
}

impl SectionKey {
    pub fn item(section: Section) -> Self {
        Self {
            tool: None,
            section,
        }
    }

    pub fn tool(index: usize, section: Section) -> Self {
        Self {
            tool: Some(index),
            section,
        }
    }
}

/// Open/closed state of one item's sections. Only user toggles are stored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SectionStates {
    overrides: HashMap<SectionKey, bool>,
}

impl SectionStates {
    pub fn is_open(&self, key: SectionKey) -> bool {
        self.overrides
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.section.default_open())
    }

    pub fn toggle(&mut self, key: SectionKey) {
        let open = self.is_open(key);
        self.overrides.insert(key, !open);
    }
}

// ============================================================================
// Targets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Toggle(SectionKey),
    /// Context link; carries the child context id.
    Navigate(String),
}

/// An activatable control: which line it sits on and which spans of that
/// line draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub line: usize,
    pub spans: Range<usize>,
    pub kind: TargetKind,
}

impl Target {
    /// Columns the control occupies on `line`.
    pub fn columns(&self, line: &Line<'_>) -> Range<u16> {
        let end = self.spans.end.min(line.spans.len());
        let start = self.spans.start.min(end);
        let width = |spans: &[Span<'_>]| spans.iter().map(Span::width).sum::<usize>() as u16;
        let from = width(&line.spans[..start]);
        from..from + width(&line.spans[start..end])
    }
}

/// Reverse-video the spans of a focused control.
pub fn highlight(line: &mut Line<'static>, spans: Range<usize>) {
    for span in line.spans.iter_mut().take(spans.end).skip(spans.start) {
        span.style = span.style.add_modifier(Modifier::REVERSED);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ItemLayout {
    pub lines: Vec<Line<'static>>,
    pub targets: Vec<Target>,
    /// A spinner or pulsing badge is visible; the frame needs redrawing.
    pub animated: bool,
}

impl ItemLayout {
    pub fn height(&self) -> u16 {
        self.lines.len().min(u16::MAX as usize) as u16
    }

    #[cfg(test)]
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }
}

// ============================================================================
// Inline runs
// ============================================================================

/// A styled piece of inline text for `LayoutBuilder::runs`.
#[derive(Debug, Clone)]
pub struct Run {
    text: String,
    style: Style,
    target: Option<TargetKind>,
    /// Never split across lines.
    atomic: bool,
}

impl Run {
    pub fn text(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            target: None,
            atomic: false,
        }
    }

    pub fn chip(text: impl Into<String>, style: Style) -> Self {
        Self {
            atomic: true,
            ..Self::text(text, style)
        }
    }

    pub fn link(text: impl Into<String>, style: Style, target: TargetKind) -> Self {
        Self {
            target: Some(target),
            atomic: true,
            ..Self::text(text, style)
        }
    }
}

enum Token<'a> {
    Word(&'a str),
    Space(&'a str),
    Break,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            tokens.push(Token::Break);
        }
        let mut rest = line.trim_end_matches('\r');
        while let Some(first) = rest.chars().next() {
            let is_space = first.is_whitespace();
            let end = rest
                .find(|c: char| c.is_whitespace() != is_space)
                .unwrap_or(rest.len());
            let (head, tail) = rest.split_at(end);
            tokens.push(if is_space {
                Token::Space(head)
            } else {
                Token::Word(head)
            });
            rest = tail;
        }
    }
    tokens
}

struct Fragment {
    text: String,
    style: Style,
    target: Option<TargetKind>,
}

// ============================================================================
// Builder
// ============================================================================

/// Accumulates the lines of one item under a stack of line prefixes
/// (item border, nested tool border, section indent).
pub struct LayoutBuilder {
    width: u16,
    max_section_lines: usize,
    prefixes: Vec<Span<'static>>,
    layout: ItemLayout,
}

impl LayoutBuilder {
    pub fn new(width: u16, max_section_lines: usize) -> Self {
        Self {
            width,
            max_section_lines: max_section_lines.max(2),
            prefixes: Vec::new(),
            layout: ItemLayout::default(),
        }
    }

    /// Columns left for content after the current prefixes.
    pub fn available(&self) -> usize {
        let indent: usize = self.prefixes.iter().map(Span::width).sum();
        (self.width as usize).saturating_sub(indent).max(1)
    }

    pub fn with_prefix(&mut self, prefix: Span<'static>, f: impl FnOnce(&mut Self)) {
        self.prefixes.push(prefix);
        f(self);
        self.prefixes.pop();
    }

    pub fn mark_animated(&mut self) {
        self.layout.animated = true;
    }

    /// Push one line as-is (no wrapping). Returns (line index, index of the
    /// first content span).
    pub fn line(&mut self, spans: Vec<Span<'static>>) -> (usize, usize) {
        let offset = self.prefixes.len();
        let mut all = self.prefixes.clone();
        all.extend(spans);
        self.layout.lines.push(Line::from(all));
        (self.layout.lines.len() - 1, offset)
    }

    /// Word-wrapped text; every line is kept.
    pub fn text(&mut self, text: &str, style: Style) {
        for line in wrap_plain(text, self.available()) {
            self.line(vec![Span::styled(line, style)]);
        }
    }

    /// Word-wrapped text capped at `max_section_lines`, ending in a
    /// `… +N lines` marker when cut.
    pub fn capped_text(&mut self, text: &str, style: Style) {
        let lines = wrap_plain(text, self.available());
        let total = lines.len();
        if total <= self.max_section_lines {
            for line in lines {
                self.line(vec![Span::styled(line, style)]);
            }
            return;
        }
        let keep = self.max_section_lines - 1;
        for line in lines.into_iter().take(keep) {
            self.line(vec![Span::styled(line, style)]);
        }
        self.line(vec![Span::styled(
            format!("… +{} lines", total - keep),
            OVERFLOW_STYLE,
        )]);
    }

    /// Section header (`▸ label` / `▾ label`) registered as a toggle control.
    pub fn toggle(
        &mut self,
        key: SectionKey,
        label: &str,
        open: bool,
        style: Style,
        trailing: Vec<Span<'static>>,
    ) {
        let chevron = if open { "▾ " } else { "▸ " };
        let mut spans = vec![
            Span::styled(chevron, Style::new().fg(Color::DarkGray)),
            Span::styled(label.to_string(), style),
        ];
        spans.extend(trailing);
        let (line, offset) = self.line(spans);
        self.layout.targets.push(Target {
            line,
            spans: offset..offset + 2,
            kind: TargetKind::Toggle(key),
        });
    }

    /// Inline runs wrapped greedily at word boundaries. Chips and links move
    /// to the next line whole; links are registered as targets.
    pub fn runs(&mut self, runs: Vec<Run>) {
        let avail = self.available();
        let mut fragments: Vec<Fragment> = Vec::new();
        let mut used = 0usize;
        let mut soft_wrapped = false;

        for run in runs {
            if run.atomic {
                let width = run.text.width();
                if used > 0 && used + width > avail {
                    self.flush_fragments(&mut fragments);
                    used = 0;
                }
                used += width;
                push_fragment(&mut fragments, &run.text, run.style, run.target);
                soft_wrapped = false;
                continue;
            }

            for token in tokenize(&run.text) {
                match token {
                    Token::Break => {
                        self.flush_fragments(&mut fragments);
                        used = 0;
                        soft_wrapped = false;
                    }
                    Token::Space(s) => {
                        let width = s.width();
                        if used == 0 && soft_wrapped {
                            continue;
                        }
                        if used + width > avail {
                            self.flush_fragments(&mut fragments);
                            used = 0;
                            soft_wrapped = true;
                            continue;
                        }
                        used += width;
                        push_fragment(&mut fragments, s, run.style, None);
                    }
                    Token::Word(w) => {
                        let width = w.width();
                        if used > 0 && used + width > avail {
                            self.flush_fragments(&mut fragments);
                            used = 0;
                            soft_wrapped = true;
                        }
                        if width <= avail {
                            used += width;
                            push_fragment(&mut fragments, w, run.style, None);
                        } else {
                            // Longer than a whole line: hard-split.
                            for piece in split_at_width(w, avail) {
                                if used > 0 {
                                    self.flush_fragments(&mut fragments);
                                }
                                used = piece.width();
                                push_fragment(&mut fragments, &piece, run.style, None);
                            }
                            soft_wrapped = true;
                        }
                    }
                }
            }
        }

        if !fragments.is_empty() {
            self.flush_fragments(&mut fragments);
        }
    }

    fn flush_fragments(&mut self, fragments: &mut Vec<Fragment>) {
        if let Some(last) = fragments.last_mut()
            && last.target.is_none()
        {
            let trimmed = last.text.trim_end().len();
            last.text.truncate(trimmed);
        }
        fragments.retain(|f| !f.text.is_empty() || f.target.is_some());

        let mut spans = Vec::with_capacity(fragments.len());
        let mut link_spans = Vec::new();
        for (i, fragment) in fragments.drain(..).enumerate() {
            if let Some(target) = fragment.target {
                link_spans.push((i, target));
            }
            spans.push(Span::styled(fragment.text, fragment.style));
        }

        let (line, offset) = self.line(spans);
        for (i, kind) in link_spans {
            self.layout.targets.push(Target {
                line,
                spans: offset + i..offset + i + 1,
                kind,
            });
        }
    }

    pub fn finish(self) -> ItemLayout {
        self.layout
    }
}

fn push_fragment(fragments: &mut Vec<Fragment>, text: &str, style: Style, target: Option<TargetKind>) {
    if target.is_none()
        && let Some(last) = fragments.last_mut()
        && last.target.is_none()
        && last.style == style
    {
        last.text.push_str(text);
        return;
    }
    fragments.push(Fragment {
        text: text.to_string(),
        style,
        target,
    });
}

/// Split a single word into chunks no wider than `width` columns.
fn split_at_width(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for c in word.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Wrap text to `width`, keeping explicit newlines and blank lines.
pub fn wrap_plain(text: &str, width: usize) -> Vec<String> {
    let text = text.replace('\t', "    ");
    let width = width.max(1);
    text.trim_end_matches('\n')
        .split('\n')
        .flat_map(|line| {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.into_owned())
                    .collect()
            }
        })
        .collect()
}
