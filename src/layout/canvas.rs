//! A drawing surface with the operations the report layouts are written
//! against: current font and colors, text measurement and splitting, text,
//! lines, rectangles and page breaks.
//!
//! Pages are materialized lazily. `add_page` only moves the page counter;
//! the page itself is created by the first thing drawn on it, so a break
//! at the very end of a report leaves no empty trailing page.

use log::debug;

use super::{DrawCommand, LayoutElement, LayoutPage, PageSize};
use crate::font::{FontContext, FontKey};
use crate::style::{Color, FontFamily, FontStyle, TextAlign};
use crate::text::TextLayout;

/// Centered `Page N` footer stamped on every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFooter {
    pub font: FontKey,
    pub font_size: f64,
    pub color: Color,
    /// Baseline distance from the bottom edge of the page.
    pub offset_from_bottom: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextOptions {
    /// How `x` anchors the text: left edge, center or right edge.
    /// `Justify` anchors like `Left`; stretching comes from `word_spacing`.
    pub align: TextAlign,
    pub word_spacing: f64,
}

impl TextOptions {
    pub fn aligned(align: TextAlign) -> Self {
        Self {
            align,
            word_spacing: 0.0,
        }
    }

    pub fn word_spacing(word_spacing: f64) -> Self {
        Self {
            align: TextAlign::Left,
            word_spacing,
        }
    }
}

pub struct Canvas<'a> {
    font_context: &'a FontContext,
    text_layout: TextLayout,
    size: PageSize,
    pages: Vec<LayoutPage>,
    /// Logical page number; may run one ahead of `pages.len()`.
    page_number: usize,
    font: FontKey,
    font_size: f64,
    text_color: Color,
    draw_color: Color,
    line_width: f64,
    footer: Option<PageFooter>,
}

impl<'a> Canvas<'a> {
    pub fn new(font_context: &'a FontContext, size: PageSize) -> Self {
        Self {
            font_context,
            text_layout: TextLayout::new(),
            size,
            pages: Vec::new(),
            page_number: 1,
            font: FontKey::new(FontFamily::Helvetica, FontStyle::Normal),
            font_size: 12.0,
            text_color: Color::BLACK,
            draw_color: Color::BLACK,
            line_width: 0.5,
            footer: None,
        }
    }

    pub fn with_footer(mut self, footer: PageFooter) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn font_context(&self) -> &'a FontContext {
        self.font_context
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn set_font(&mut self, family: FontFamily, style: FontStyle) {
        self.font = FontKey::new(family, style);
    }

    pub fn set_font_style(&mut self, style: FontStyle) {
        self.font.style = style;
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    pub fn font(&self) -> FontKey {
        self.font
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Width of `text` in the current font and size.
    pub fn get_text_width(&self, text: &str) -> f64 {
        self.text_layout
            .measure_width(self.font_context, text, self.font, self.font_size)
    }

    /// Wrap `text` to `max_width` in the current font and size.
    pub fn split_text_to_size(&self, text: &str, max_width: f64) -> Vec<String> {
        self.text_layout
            .split_to_size(self.font_context, text, max_width, self.font, self.font_size)
    }

    /// Draw one line of text with its baseline at `y`. Returns the
    /// rendered width. Empty text draws nothing.
    pub fn text(&mut self, text: &str, x: f64, y: f64, options: TextOptions) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let spaces = text.chars().filter(|&c| c == ' ').count() as f64;
        let width = self.get_text_width(text) + options.word_spacing * spaces;
        let left = match options.align {
            TextAlign::Left | TextAlign::Justify => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };
        let element = LayoutElement {
            x: left,
            y,
            width,
            height: self.font_size,
            draw: DrawCommand::Text {
                text: text.to_string(),
                font: self.font,
                font_size: self.font_size,
                color: self.text_color,
                word_spacing: options.word_spacing,
            },
        };
        self.push(element);
        width
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let element = LayoutElement {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            draw: DrawCommand::Line {
                thickness: self.line_width,
                color: self.draw_color,
            },
        };
        self.push(element);
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Rect {
                fill: Some(color),
                stroke: None,
                stroke_width: 0.0,
            },
        });
    }

    /// Outline a rectangle with the current draw color and line width.
    pub fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Rect {
                fill: None,
                stroke: Some(self.draw_color),
                stroke_width: self.line_width,
            },
        });
    }

    /// Start a new page. The page exists once something is drawn on it.
    pub fn add_page(&mut self) {
        if self.page_number > self.pages.len() {
            // Nothing was drawn on the pending page; reuse it.
            return;
        }
        self.page_number += 1;
        debug!("page break to page {}", self.page_number);
    }

    /// The page currently being drawn on (1-based).
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Pages that actually have content.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Stamp the footer on the last page and hand back all pages.
    pub fn finish(mut self) -> Vec<LayoutPage> {
        if let Some(footer) = self.footer {
            let number = self.pages.len();
            if let Some(last) = self.pages.last_mut() {
                Self::stamp_footer(self.font_context, last, number, &footer);
            }
        }
        self.pages
    }

    fn push(&mut self, element: LayoutElement) {
        self.ensure_page();
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn ensure_page(&mut self) {
        while self.pages.len() < self.page_number {
            if let Some(footer) = self.footer {
                let number = self.pages.len();
                if let Some(done) = self.pages.last_mut() {
                    Self::stamp_footer(self.font_context, done, number, &footer);
                }
            }
            self.pages.push(LayoutPage::new(self.size));
        }
    }

    fn stamp_footer(
        font_context: &FontContext,
        page: &mut LayoutPage,
        number: usize,
        footer: &PageFooter,
    ) {
        let text = format!("Page {}", number);
        let width = font_context.measure_string(&text, footer.font, footer.font_size);
        page.elements.push(LayoutElement {
            x: (page.width - width) / 2.0,
            y: page.height - footer.offset_from_bottom,
            width,
            height: footer.font_size,
            draw: DrawCommand::Text {
                text,
                font: footer.font,
                font_size: footer.font_size,
                color: footer.color,
                word_spacing: 0.0,
            },
        });
    }
}
