//! # TUI Components
//!
//! Both components are stateless: they receive everything as props and
//! render into the area they are given.
//!
//! - `LinkTable`: the visible slice of records, one per row
//! - `StatusLine`: rule plus status text at the bottom of the screen
//!
//! Components receive external data as "props", not by reaching into the
//! dispatcher. This makes dependencies explicit and components testable.

pub mod link_table;
pub mod status_line;

pub use link_table::LinkTable;
pub use status_line::StatusLine;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Fit `text` into `width` terminal columns. Text that does not fit is cut
/// and ends in `...`, keeping one spare column so the ellipsis always fits.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width <= ELLIPSIS.len() {
        return ".".repeat(width);
    }
    let budget = width - ELLIPSIS.len() - 1;
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Right-pad `text` with spaces to `width` columns.
pub fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}
