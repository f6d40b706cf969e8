//! # Styled-Line Renderer
//!
//! Lays out one [`StyledLine`] (a paragraph of mixed bold/italic/underlined
//! segments) into the active column, wrapping across styles and flowing
//! through the cursor one physical line at a time.
//!
//! Justified paragraphs stretch every wrapped line except the last to the
//! full column width using word spacing. A line that fills less than
//! [`JUSTIFY_MIN_FILL`] of the column is left-aligned instead, since
//! stretching it would open large gaps between words.

use super::canvas::{Canvas, TextOptions};
use super::flow::{Column, FlowCursor};
use crate::font::{FontContext, FontKey};
use crate::style::{Color, FontFamily, FontStyle, StyledLine, TextAlign};
use crate::text::{RunBrokenLine, StyledChar, TextLayout};

/// Lines filling less than this share of the column are never stretched.
pub const JUSTIFY_MIN_FILL: f64 = 0.6;

/// Underline offset below the baseline, as a fraction of the font size.
const UNDERLINE_OFFSET: f64 = 0.15;
const UNDERLINE_THICKNESS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub family: FontFamily,
    pub font_size: f64,
    pub line_height: f64,
    pub color: Color,
    pub align: TextAlign,
    /// Left indent inside the column.
    pub indent: f64,
}

impl ParagraphStyle {
    pub fn new(family: FontFamily, font_size: f64, line_height: f64) -> Self {
        Self {
            family,
            font_size,
            line_height,
            color: Color::BLACK,
            align: TextAlign::Left,
            indent: 0.0,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_indent(mut self, indent: f64) -> Self {
        self.indent = indent;
        self
    }
}

/// Where and how one physical line ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub text: String,
    /// Rendered width including justification spacing.
    pub width: f64,
    /// Width the line was wrapped to.
    pub available: f64,
    pub justified: bool,
    pub page: usize,
    pub column: Column,
    /// Top of the line box.
    pub y: f64,
}

#[derive(Debug, Default)]
pub struct StyledLineRenderer {
    text_layout: TextLayout,
}

impl StyledLineRenderer {
    pub fn new() -> Self {
        Self {
            text_layout: TextLayout::new(),
        }
    }

    fn styled_chars(line: &StyledLine, style: &ParagraphStyle) -> Vec<StyledChar> {
        line.segments
            .iter()
            .flat_map(|seg| {
                let font = FontKey::new(style.family, seg.style);
                seg.text.chars().map(move |ch| StyledChar {
                    ch,
                    font,
                    font_size: style.font_size,
                    underline: seg.underline,
                })
            })
            .collect()
    }

    /// Wrap a styled line to `width` without drawing it.
    pub fn wrap(
        &self,
        font_context: &FontContext,
        line: &StyledLine,
        style: &ParagraphStyle,
        width: f64,
    ) -> Vec<RunBrokenLine> {
        let chars = Self::styled_chars(line, style);
        self.text_layout
            .break_runs_into_lines(font_context, &chars, (width - style.indent).max(0.0))
    }

    /// Height the line will take in a column of `width`.
    pub fn measure_height(
        &self,
        font_context: &FontContext,
        line: &StyledLine,
        style: &ParagraphStyle,
        width: f64,
    ) -> f64 {
        self.wrap(font_context, line, style, width).len() as f64 * style.line_height
    }

    /// Draw `line` at the cursor, one wrapped line at a time, advancing the
    /// cursor past each.
    pub fn render(
        &self,
        canvas: &mut Canvas,
        cursor: &mut FlowCursor,
        line: &StyledLine,
        style: &ParagraphStyle,
    ) -> Vec<RenderedLine> {
        let font_context = canvas.font_context();
        let wrapped = self.wrap(font_context, line, style, cursor.width());
        let available = (cursor.width() - style.indent).max(0.0);
        let count = wrapped.len();
        let baseline_font = FontKey::new(style.family, FontStyle::Normal);

        let mut rendered = Vec::with_capacity(count);
        for (i, broken) in wrapped.iter().enumerate() {
            cursor.ensure(style.line_height).apply(canvas);

            let is_last = i + 1 == count;
            let spaces = broken.space_count();
            let justified = style.align == TextAlign::Justify
                && !is_last
                && spaces > 0
                && broken.width >= available * JUSTIFY_MIN_FILL;
            let word_spacing = if justified {
                (available - broken.width) / spaces as f64
            } else {
                0.0
            };
            let width = broken.width + word_spacing * spaces as f64;

            let offset = match style.align {
                TextAlign::Center => (available - width) / 2.0,
                TextAlign::Right => available - width,
                TextAlign::Left | TextAlign::Justify => 0.0,
            };
            let x = cursor.x() + style.indent + offset.max(0.0);
            let baseline = cursor.y()
                + font_context.baseline_offset(baseline_font, style.font_size, style.line_height);

            self.draw_runs(canvas, broken, x, baseline, word_spacing, style);

            rendered.push(RenderedLine {
                text: broken.text(),
                width,
                available,
                justified,
                page: cursor.page(),
                column: cursor.column(),
                y: cursor.y(),
            });
            cursor.advance(style.line_height).apply(canvas);
        }
        rendered
    }

    /// Draw a wrapped line as runs of identical font and decoration.
    fn draw_runs(
        &self,
        canvas: &mut Canvas,
        line: &RunBrokenLine,
        x: f64,
        baseline: f64,
        word_spacing: f64,
        style: &ParagraphStyle,
    ) {
        let chars = &line.chars;
        let mut start = 0;
        let mut spaces_before = 0;

        while start < chars.len() {
            let first = &chars[start];
            let mut end = start + 1;
            while end < chars.len()
                && chars[end].font == first.font
                && chars[end].font_size == first.font_size
                && chars[end].underline == first.underline
            {
                end += 1;
            }

            let text: String = chars[start..end].iter().map(|sc| sc.ch).collect();
            let run_x = x + line.char_positions[start] + word_spacing * spaces_before as f64;

            canvas.set_font(first.font.family, first.font.style);
            canvas.set_font_size(first.font_size);
            canvas.set_text_color(style.color);
            let run_width = canvas.text(&text, run_x, baseline, TextOptions::word_spacing(word_spacing));

            if first.underline && run_width > 0.0 {
                let y = baseline + UNDERLINE_OFFSET * first.font_size;
                canvas.set_draw_color(style.color);
                canvas.set_line_width(UNDERLINE_THICKNESS * first.font_size);
                canvas.line(run_x, y, run_x + run_width, y);
            }

            spaces_before += text.chars().filter(|&c| c == ' ').count();
            start = end;
        }
    }
}
