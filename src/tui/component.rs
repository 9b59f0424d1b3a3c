use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Something drawn into a region of the frame.
///
/// Props arrive as plain struct fields; state that outlives a frame (scroll
/// position, list selection) is borrowed from [`TuiState`](super::TuiState).
/// `&mut self` lets a view write back measurements such as the transcript's
/// content height while it draws.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns raw key, mouse and paste input into a component-level event.
pub trait EventHandler {
    type Event;

    /// `None` means the input was consumed (or ignored) without anything for
    /// the caller to act on.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
