//! # Viewport
//!
//! Pagination and selection over the store's ordered record sequence.
//!
//! ```text
//!   records:  0 1 2 [3 4 5 6] 7 8
//!                    ^       ^
//!         window_start       window_start + height - 1
//!                      ^
//!                      selection (row 1 of the window → record 4)
//! ```
//!
//! The viewport owns indices only. Every transition receives the current
//! record count `len` and leaves the state inside these bounds:
//!
//! - `window_start <= len.saturating_sub(height)`
//! - `selection < min(height, len - window_start)` whenever `len > 0`
//!
//! With `len == 0` nothing is addressable and every transition is a no-op.
//! Out-of-range requests are clamped, never rejected.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    window_start: usize,
    selection: usize,
    height: usize,
}

impl Viewport {
    /// A viewport showing `height` rows. A zero height is treated as one row
    /// so the selection always has somewhere to live.
    pub fn new(height: usize) -> Self {
        Self {
            window_start: 0,
            selection: 0,
            height: height.max(1),
        }
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    /// Selected row within the visible window.
    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Largest valid `window_start` for `len` records.
    fn max_start(&self, len: usize) -> usize {
        len.saturating_sub(self.height)
    }

    /// Number of rows actually filled for `len` records.
    fn visible_rows(&self, len: usize) -> usize {
        self.height.min(len.saturating_sub(self.window_start))
    }

    /// Index range of the records currently on screen.
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = self.window_start.min(len);
        start..(start + self.height).min(len)
    }

    /// Absolute index of the selected record, if one exists.
    pub fn selected_index(&self, len: usize) -> Option<usize> {
        let idx = self.window_start + self.selection;
        (idx < len).then_some(idx)
    }

    pub fn move_up(&mut self) {
        if self.selection > 0 {
            self.selection -= 1;
        } else if self.window_start > 0 {
            self.window_start -= 1;
        }
    }

    pub fn move_down(&mut self, len: usize) {
        let last_row = self.height - 1;
        if self.window_start + self.height < len && self.selection == last_row {
            self.window_start += 1;
        } else if self.selection < last_row && self.window_start + self.selection + 1 < len {
            self.selection += 1;
        }
    }

    pub fn page_down(&mut self, len: usize) {
        self.window_start = (self.window_start + self.height).min(self.max_start(len));
        self.clamp(len);
    }

    pub fn page_up(&mut self, len: usize) {
        self.window_start = self.window_start.saturating_sub(self.height);
        self.clamp(len);
    }

    pub fn jump_to_first(&mut self) {
        if self.window_start != 0 || self.selection != 0 {
            self.window_start = 0;
            self.selection = 0;
        }
    }

    pub fn jump_to_last(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let start = self.max_start(len);
        let last_row = self.height.min(len - start) - 1;
        if self.window_start != start || self.selection != last_row {
            self.window_start = start;
            self.selection = last_row;
        }
    }

    /// Pull both indices back into range after `len` changed (e.g. a delete).
    pub fn clamp(&mut self, len: usize) {
        self.window_start = self.window_start.min(self.max_start(len));
        self.selection = match self.visible_rows(len) {
            0 => 0,
            rows => self.selection.min(rows - 1),
        };
    }
}
