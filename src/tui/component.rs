use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components follow the props-in-struct pattern:
/// - They receive caller-owned data via struct fields, borrowed for one frame.
/// - They may hold a `&mut State` that persists across frames.
/// - They render to a `Frame` within a given `Rect`.
///
/// `render` takes `&mut self` so components can refresh caches (row heights,
/// control positions, scroll offsets) during the render pass, the same way
/// ratatui's `StatefulWidget` does.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that handles terminal events.
pub trait EventHandler {
    /// The type of high-level event this component emits upward.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
