//! # TitleBar Component
//!
//! Top status bar: application name, context counts and the latest status
//! message.
//!
//! ## Design Decisions
//!
//! ### Stateless Component
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar {
//!     context_count: app.contexts.len(),
//!     live_count: app.live_count(),
//!     status_message: app.status_message.clone(),
//! };
//! title_bar.render(frame, area);
//! ```
//!
//! ## Conditional Formatting
//!
//! 1. **Status message**: `"cxview | 12 contexts · 3 live | Context #42"`
//! 2. **Default**: `"cxview | 12 contexts · 3 live"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Top status bar component.
pub struct TitleBar {
    pub context_count: usize,
    pub live_count: usize,
    /// Transient status (e.g. "Context #42", "Context #7 is not loaded")
    pub status_message: String,
}

impl TitleBar {
    pub fn new(context_count: usize, live_count: usize, status_message: String) -> Self {
        Self {
            context_count,
            live_count,
            status_message,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dim = Style::new().fg(Color::DarkGray);
        let mut spans = vec![
            Span::styled(
                "cxview",
                Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" | ", dim),
            Span::raw(format!("{} contexts", self.context_count)),
            Span::styled(" · ", dim),
            Span::styled(
                format!("{} live", self.live_count),
                Style::new().fg(Color::Green),
            ),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::styled(" | ", dim));
            spans.push(Span::raw(self.status_message.clone()));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let mut title_bar = TitleBar::new(12, 3, "Context #42".to_string());
        let text = render_text(&mut title_bar);

        assert!(text.contains("cxview"));
        assert!(text.contains("12 contexts"));
        assert!(text.contains("3 live"));
        assert!(text.contains("| Context #42"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new(0, 0, String::new());
        let text = render_text(&mut title_bar);

        assert!(text.contains("0 contexts · 0 live"));
        assert_eq!(text.matches('|').count(), 1);
    }
}
