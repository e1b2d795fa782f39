//! # StatusLine Component
//!
//! Bottom two rows of the screen: a horizontal rule, then one line of text.
//!
//! The text is either a transient message handed in by the dispatcher
//! (e.g. `Deleting link "..."`) or the default line with the record count
//! and the key legend. Text wider than the terminal is cut and ends in
//! `...`.
//!
//! StatusLine is purely presentational: the same props always render the
//! same cells, so redrawing it is idempotent.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;
use crate::tui::components::truncate;

pub struct StatusLine<'a> {
    /// Number of records in the collection.
    pub total: usize,
    /// Transient message; `None` shows the default text.
    pub message: Option<&'a str>,
}

impl<'a> StatusLine<'a> {
    pub fn new(total: usize, message: Option<&'a str>) -> Self {
        Self { total, message }
    }

    /// The line of text shown for a terminal `width` columns wide.
    pub fn text(&self, width: usize) -> String {
        match self.message {
            Some(message) => truncate(message, width),
            None => truncate(&default_text(self.total), width),
        }
    }
}

fn default_text(total: usize) -> String {
    format!("Total: {total} | ESC (Quit) | O (Open) | D (Delete) | C (Check)")
}

impl Component for StatusLine<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = usize::from(area.width);
        let style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::raw("-".repeat(width)),
            Line::styled(self.text(width), style),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }
}
