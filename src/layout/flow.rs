//! # Flow Cursor
//!
//! Tracks where the next line of flowing content goes: page, column and
//! vertical offset. The cursor never draws anything; it reports breaks so
//! the caller can start a new page on the canvas.

use log::debug;

use super::canvas::Canvas;
use super::PageGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

impl Column {
    fn index(self) -> usize {
        match self {
            Column::Left => 0,
            Column::Right => 1,
        }
    }
}

/// What a cursor move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowBreak {
    None,
    /// Moved from the left to the right column on the same page.
    Column,
    /// Moved to the left column of a new page.
    Page,
}

impl FlowBreak {
    /// Mirror the break on the canvas.
    pub fn apply(self, canvas: &mut Canvas) {
        if self == FlowBreak::Page {
            canvas.add_page();
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlowCursor {
    geometry: PageGeometry,
    /// Where columns start on page 1 (below any title block).
    first_page_top: f64,
    page: usize,
    column: Column,
    y: f64,
}

impl FlowCursor {
    pub fn new(geometry: PageGeometry) -> Self {
        let top = geometry.content_top();
        Self::starting_at(geometry, top, 0.0)
    }

    /// A cursor whose columns begin at `first_page_top` on the first page,
    /// raised if needed so at least `min_room` is left above the bottom
    /// margin.
    pub fn starting_at(geometry: PageGeometry, first_page_top: f64, min_room: f64) -> Self {
        let lowest = (geometry.content_bottom() - min_room).max(geometry.content_top());
        let first_page_top = first_page_top.max(geometry.content_top()).min(lowest);
        Self {
            geometry,
            first_page_top,
            page: 1,
            column: Column::Left,
            y: first_page_top,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Left edge of the active column.
    pub fn x(&self) -> f64 {
        self.geometry.column_x(self.column.index())
    }

    /// Width of the active column.
    pub fn width(&self) -> f64 {
        self.geometry.column_width()
    }

    pub fn bottom(&self) -> f64 {
        self.geometry.content_bottom()
    }

    pub fn remaining(&self) -> f64 {
        (self.bottom() - self.y).max(0.0)
    }

    /// Whether a block of `height` fits below the cursor in this column.
    pub fn fits(&self, height: f64) -> bool {
        self.y + height <= self.bottom() + 1e-6
    }

    /// Top of a column on the current page.
    pub fn column_top(&self) -> f64 {
        if self.page == 1 {
            self.first_page_top
        } else {
            self.geometry.content_top()
        }
    }

    /// Height available in an empty column on a fresh page.
    pub fn full_column_height(&self) -> f64 {
        self.geometry.content_height()
    }

    /// True when nothing has been placed in the active column yet.
    pub fn at_column_top(&self) -> bool {
        self.y <= self.column_top() + 1e-6
    }

    /// Move down past a line of `line_height`. If another line of the same
    /// height would not fit, break to the next column or page.
    pub fn advance(&mut self, line_height: f64) -> FlowBreak {
        self.y += line_height;
        if self.y + line_height > self.bottom() + 1e-6 {
            return self.request_break(line_height);
        }
        FlowBreak::None
    }

    /// Move down past a block the caller has already checked fits.
    pub fn place(&mut self, height: f64) {
        self.y = (self.y + height).min(self.bottom());
    }

    /// Vertical gap between blocks; swallowed at the top of a column.
    pub fn skip(&mut self, gap: f64) {
        if !self.at_column_top() {
            self.y = (self.y + gap).min(self.bottom());
        }
    }

    /// Break so that `required` points of height are available: the right
    /// column if that helps, otherwise a new page. A break from the top of
    /// an empty column gains nothing and is refused.
    pub fn request_break(&mut self, required: f64) -> FlowBreak {
        if self.at_column_top() {
            return FlowBreak::None;
        }

        if self.geometry.columns > 1 && self.column == Column::Left {
            let right_top = self.column_top();
            if right_top + required <= self.bottom() + 1e-6 || self.page > 1 {
                self.column = Column::Right;
                self.y = right_top;
                debug!("column break on page {}", self.page);
                return FlowBreak::Column;
            }
        }

        self.page += 1;
        self.column = Column::Left;
        self.y = self.geometry.content_top();
        debug!("page break to page {}", self.page);
        FlowBreak::Page
    }

    /// Break if `height` does not fit in the rest of this column.
    pub fn ensure(&mut self, height: f64) -> FlowBreak {
        if self.fits(height) {
            FlowBreak::None
        } else {
            self.request_break(height)
        }
    }

    /// Jump to the top of a new page (e.g. after a title page).
    pub fn new_page(&mut self) -> FlowBreak {
        if self.at_column_top() && self.column == Column::Left && self.page > 1 {
            return FlowBreak::None;
        }
        self.page += 1;
        self.column = Column::Left;
        self.y = self.geometry.content_top();
        FlowBreak::Page
    }
}
