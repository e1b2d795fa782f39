use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::dispatch::{STATUS_LINE_HEIGHT, Screen};
use crate::tui::component::Component;
use crate::tui::components::{LinkTable, StatusLine};

pub fn draw_ui(frame: &mut Frame, screen: &Screen<'_>) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Min(0), Length(STATUS_LINE_HEIGHT)]);
    let [table_area, status_area] = layout.areas(frame.area());

    LinkTable::new(screen.rows, screen.selected_row).render(frame, table_area);
    StatusLine::new(screen.total, screen.status_message).render(frame, status_area);
}
