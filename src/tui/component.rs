use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Something that draws itself into a region of the frame.
///
/// Components are built from props each frame. Those that need to remember
/// things between frames (scroll offset, layout cache) borrow a persistent
/// state struct mutably, which is why `render` takes `&mut self`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns low-level `TuiEvent`s into a component's own events.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
