//! # LinkTable Component
//!
//! The record rows above the status line, one link per row:
//!
//! ```text
//! ┌──────────── title (2/3) ────────────┬─ domain ─┬ st ┬─ created ─┐
//! │ The Rust Programming Language       │ rust-lang│200 │14 Nov, 2023│
//! ```
//!
//! The table renders exactly the slice it is given; which slice that is
//! belongs to the viewport.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::link::Link;
use crate::tui::component::Component;
use crate::tui::components::{pad, truncate};

const MAX_CREATED_WIDTH: usize = 14;
const STATUS_WIDTH: usize = 4;

/// Column widths for one terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub title: usize,
    pub domain: usize,
    pub status: usize,
    pub created: usize,
}

impl Columns {
    pub fn for_width(width: usize) -> Self {
        let title = width / 3 * 2;
        let created = (width / 6).min(MAX_CREATED_WIDTH);
        let status = STATUS_WIDTH;
        let domain = width.saturating_sub(title + created + status);
        Self {
            title,
            domain,
            status,
            created,
        }
    }
}

pub struct LinkTable<'a> {
    pub rows: &'a [Link],
    pub selected_row: Option<usize>,
}

impl<'a> LinkTable<'a> {
    pub fn new(rows: &'a [Link], selected_row: Option<usize>) -> Self {
        Self { rows, selected_row }
    }
}

fn row_line(link: &Link, columns: Columns, style: Style) -> Line<'static> {
    let title = link.title().split_whitespace().collect::<Vec<_>>().join(" ");
    let status = link
        .check_result
        .map(|code| code.to_string())
        .unwrap_or_else(|| " - ".to_string());
    let created: String = link
        .created_at
        .map(|dt| dt.with_timezone(&Local).format("%d %b, %Y").to_string())
        .unwrap_or_default()
        .chars()
        .take(columns.created)
        .collect();

    Line::from(vec![
        Span::styled(pad(&truncate(&title, columns.title), columns.title), style),
        Span::styled(pad(&truncate(&link.domain(), columns.domain), columns.domain), style),
        Span::styled(pad(&status, columns.status), style),
        Span::styled(created, style),
    ])
}

impl Component for LinkTable<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let columns = Columns::for_width(usize::from(area.width));
        let base = Style::default().fg(Color::Green);
        let lines: Vec<Line> = self
            .rows
            .iter()
            .take(usize::from(area.height))
            .enumerate()
            .map(|(i, link)| {
                let style = if self.selected_row == Some(i) {
                    base.add_modifier(Modifier::BOLD)
                } else {
                    base
                };
                row_line(link, columns, style)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }
}
