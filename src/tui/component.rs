use ratatui::Frame;
use ratatui::layout::Rect;

/// A piece of the viewer screen.
///
/// Components borrow what they show from the dispatcher's [`Screen`] as
/// plain fields and draw into the area `ui` assigns them. They hold no
/// state between frames.
///
/// [`Screen`]: crate::core::dispatch::Screen
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
