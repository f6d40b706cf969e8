//! # Layout
//!
//! Turns report content into positioned draw commands on fixed-size pages.
//!
//! Coordinates here are top-down: `y = 0` is the top edge of the page and
//! grows toward the bottom. The PDF serializer flips them when it writes
//! content streams.
//!
//! The pieces, leaf to root:
//!
//! - [`canvas::Canvas`]: a small drawing surface with jsPDF-like
//!   operations (`set_font`, `text`, `line`, `add_page`, ...).
//! - [`flow::FlowCursor`]: where the next line goes (page, column, y).
//! - [`styled::StyledLineRenderer`]: mixed-style paragraphs with wrapping,
//!   justification and underline.
//! - [`section::SectionRenderer`]: titled lists of records.
//! - [`table::GridTable`]: bordered tables with a repeating header row.

pub mod canvas;
pub mod flow;
pub mod page_break;
pub mod section;
pub mod styled;
pub mod table;

use crate::font::FontKey;
use crate::style::Color;

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Margins, one value per side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// The page box a report flows into: page size, margins and columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub size: PageSize,
    pub margins: Edges,
    /// 1 or 2.
    pub columns: usize,
    pub column_gap: f64,
}

impl PageGeometry {
    pub fn single_column(size: PageSize, margins: Edges) -> Self {
        Self {
            size,
            margins,
            columns: 1,
            column_gap: 0.0,
        }
    }

    pub fn two_column(size: PageSize, margins: Edges, column_gap: f64) -> Self {
        Self {
            size,
            margins,
            columns: 2,
            column_gap,
        }
    }

    pub fn content_top(&self) -> f64 {
        self.margins.top
    }

    /// Lowest y any content may reach.
    pub fn content_bottom(&self) -> f64 {
        self.size.height - self.margins.bottom
    }

    pub fn content_left(&self) -> f64 {
        self.margins.left
    }

    pub fn content_width(&self) -> f64 {
        self.size.width - self.margins.horizontal()
    }

    pub fn content_height(&self) -> f64 {
        self.size.height - self.margins.vertical()
    }

    pub fn column_width(&self) -> f64 {
        if self.columns <= 1 {
            return self.content_width();
        }
        let gaps = self.column_gap * (self.columns - 1) as f64;
        (self.content_width() - gaps) / self.columns as f64
    }

    /// Left edge of column `index` (0-based).
    pub fn column_x(&self, index: usize) -> f64 {
        self.margins.left + index as f64 * (self.column_width() + self.column_gap)
    }
}

/// A fully laid-out page ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    pub fn new(size: PageSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            elements: Vec::new(),
        }
    }

    /// All text drawn on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &LayoutElement> {
        self.elements
            .iter()
            .filter(|e| matches!(e.draw, DrawCommand::Text { .. }))
    }
}

/// A positioned element on a page.
///
/// For text, `(x, y)` is the left end of the baseline and `width` is the
/// rendered advance including any word spacing. For lines, the segment
/// runs from `(x, y)` to `(x + width, y + height)`. For rectangles,
/// `(x, y)` is the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

impl LayoutElement {
    pub fn text(&self) -> Option<&str> {
        match &self.draw {
            DrawCommand::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// What to actually draw for this element.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// One run of single-font text.
    Text {
        text: String,
        font: FontKey,
        font_size: f64,
        color: Color,
        /// Extra space added to each U+0020 (PDF `Tw`).
        word_spacing: f64,
    },
    /// A straight stroked line.
    Line { thickness: f64, color: Color },
    /// A rectangle, filled and/or stroked.
    Rect {
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_column_widths_add_up() {
        let g = PageGeometry::two_column(PageSize::A4, Edges::symmetric(54.0, 48.0), 18.0);
        let total = g.column_width() * 2.0 + g.column_gap;
        assert!((total - g.content_width()).abs() < 1e-9);
        assert!((g.column_x(1) - (48.0 + g.column_width() + 18.0)).abs() < 1e-9);
    }

    #[test]
    fn single_column_spans_content() {
        let g = PageGeometry::single_column(PageSize::A4, Edges::symmetric(60.0, 55.0));
        assert_eq!(g.column_width(), g.content_width());
        assert_eq!(g.column_x(0), 55.0);
        assert!((g.content_bottom() - (841.89 - 60.0)).abs() < 1e-9);
    }
}
