//! # Section Renderer
//!
//! A section is a heading followed by a list of records, each turned into
//! styled lines by a formatter. The heading is kept with the first record,
//! or with its first two lines when that record has to be split. A record
//! that fits in a fresh column is never split: if it does not fit where
//! the cursor is, it starts in the next column. Records taller than a
//! whole column are split between lines, leaving at least two lines on
//! each side of the break. A single formatted line is never split across
//! a break.

use log::debug;

use super::canvas::Canvas;
use super::flow::{Column, FlowBreak, FlowCursor};
use super::page_break::{decide_break, keep_with_next, units_fitting, BreakDecision, KeepTogether};
use super::styled::{ParagraphStyle, RenderedLine, StyledLineRenderer};
use crate::style::{Color, FontStyle, Segment, StyledLine};

/// Vertical gap between consecutive records.
pub const RECORD_GAP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionStyle {
    pub title: ParagraphStyle,
    pub title_font_style: FontStyle,
    /// Space between the heading and the first record.
    pub space_after_title: f64,
    /// Draw a rule across the column under the heading.
    pub rule: Option<Color>,
    pub body: ParagraphStyle,
    pub record_gap: f64,
}

/// Where a record's first line landed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPlacement {
    pub index: usize,
    pub page: usize,
    pub column: Column,
    pub y: f64,
    /// Index of the record's first line in [`SectionOutput::lines`].
    pub first_line: usize,
    pub line_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SectionOutput {
    pub title_lines: Vec<RenderedLine>,
    pub lines: Vec<RenderedLine>,
    pub records: Vec<RecordPlacement>,
}

#[derive(Debug, Default)]
pub struct SectionRenderer {
    lines: StyledLineRenderer,
}

impl SectionRenderer {
    pub fn new() -> Self {
        Self {
            lines: StyledLineRenderer::new(),
        }
    }

    pub fn line_renderer(&self) -> &StyledLineRenderer {
        &self.lines
    }

    /// Render `title` and then every record through `format`.
    pub fn render<T, F>(
        &self,
        canvas: &mut Canvas,
        cursor: &mut FlowCursor,
        title: &str,
        records: &[T],
        style: &SectionStyle,
        format: F,
    ) -> SectionOutput
    where
        F: Fn(&T, usize) -> Vec<StyledLine>,
    {
        let mut output = SectionOutput::default();
        let font_context = canvas.font_context();
        let heading_height = self.heading_height(canvas, cursor, title, style);

        let mut layouts: Vec<RecordLayout> = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let lines = format(record, index);
            let heights: Vec<f64> = lines
                .iter()
                .map(|l| self.lines.measure_height(font_context, l, &style.body, cursor.width()))
                .collect();
            // The first record shares a column with the heading.
            let follows_heading = layouts.iter().all(|r| r.lines.is_empty());
            let capacity = if follows_heading {
                cursor.full_column_height() - heading_height
            } else {
                cursor.full_column_height()
            };
            let total: f64 = heights.iter().sum();
            layouts.push(RecordLayout {
                breakable: total > capacity + 1e-6,
                lines,
                heights,
            });
        }

        let next = layouts
            .iter()
            .find(|r| !r.lines.is_empty())
            .map(RecordLayout::lead_height)
            .unwrap_or(0.0);
        output.title_lines = self.render_heading(canvas, cursor, title, style, next);

        for (index, record) in layouts.iter().enumerate() {
            if record.lines.is_empty() {
                continue;
            }
            if !output.records.is_empty() {
                cursor.skip(style.record_gap);
            }
            let first_line = output.lines.len();
            self.render_record(canvas, cursor, record, &style.body, &mut output.lines);

            if let Some(first) = output.lines.get(first_line) {
                output.records.push(RecordPlacement {
                    index,
                    page: first.page,
                    column: first.column,
                    y: first.y,
                    first_line,
                    line_count: output.lines.len() - first_line,
                });
            }
        }
        output
    }

    fn heading_line(title: &str, style: &SectionStyle) -> StyledLine {
        StyledLine::new(vec![Segment::new(title, style.title_font_style)])
    }

    /// Height of the heading block, including the space under it.
    fn heading_height(&self, canvas: &Canvas, cursor: &FlowCursor, title: &str, style: &SectionStyle) -> f64 {
        let heading = Self::heading_line(title, style);
        self.lines
            .measure_height(canvas.font_context(), &heading, &style.title, cursor.width())
            + style.space_after_title
    }

    /// Render a heading on its own, kept with `next_height` of content.
    pub fn render_heading(
        &self,
        canvas: &mut Canvas,
        cursor: &mut FlowCursor,
        title: &str,
        style: &SectionStyle,
        next_height: f64,
    ) -> Vec<RenderedLine> {
        let heading_height = self.heading_height(canvas, cursor, title, style);
        let next_height = next_height.max(style.title.line_height);

        if keep_with_next(cursor.remaining(), heading_height, next_height) != BreakDecision::Place {
            debug!("moving heading {:?} to keep it with its content", title);
            cursor.request_break(heading_height + next_height).apply(canvas);
        }

        let heading = Self::heading_line(title, style);
        let rendered = self.lines.render(canvas, cursor, &heading, &style.title);
        if let Some(color) = style.rule {
            let y = cursor.y() + style.space_after_title / 2.0;
            canvas.set_draw_color(color);
            canvas.set_line_width(1.0);
            canvas.line(cursor.x(), y, cursor.x() + cursor.width(), y);
        }
        cursor.place(style.space_after_title);
        rendered
    }

    fn render_record(
        &self,
        canvas: &mut Canvas,
        cursor: &mut FlowCursor,
        record: &RecordLayout,
        body: &ParagraphStyle,
        out: &mut Vec<RenderedLine>,
    ) {
        let mut start = 0;
        while start < record.lines.len() {
            let rest = &record.heights[start..];
            let count = match decide_break(cursor.remaining(), rest, record.breakable, KeepTogether::LINES) {
                BreakDecision::Place => rest.len(),
                BreakDecision::Split { units_here } => units_here,
                BreakDecision::MoveToNextColumn => {
                    let brk = cursor.request_break(rest.iter().sum());
                    brk.apply(canvas);
                    if brk != FlowBreak::None {
                        debug!("record moved to page {} {:?}", cursor.page(), cursor.column());
                        continue;
                    }
                    // Already at a column top: place what fits and carry on.
                    units_fitting(cursor.remaining(), rest).max(1)
                }
            };

            for (line, &height) in record.lines[start..start + count].iter().zip(rest) {
                cursor.ensure(height).apply(canvas);
                out.extend(self.lines.render(canvas, cursor, line, body));
            }
            start += count;
            if let Some(&height) = record.heights.get(start) {
                cursor.request_break(height).apply(canvas);
            }
        }
    }
}

/// A formatted record with its measured line heights.
struct RecordLayout {
    lines: Vec<StyledLine>,
    heights: Vec<f64>,
    /// Taller than the column it starts in, so it has to be split.
    breakable: bool,
}

impl RecordLayout {
    /// What has to fit under the heading for the record to start there.
    fn lead_height(&self) -> f64 {
        if self.breakable {
            self.heights.iter().take(KeepTogether::LINES.before).sum()
        } else {
            self.heights.iter().sum()
        }
    }
}
