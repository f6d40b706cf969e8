//! # Font Management
//!
//! Reports use only the standard PDF fonts (Helvetica and Times),
//! which every viewer has and which need no embedding. This module maps a
//! family + style to one of those faces and measures text with its AFM
//! widths.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::style::{FontFamily, FontStyle};

/// A font face: family plus style. Size is carried separately.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: FontFamily,
    pub style: FontStyle,
}

impl FontKey {
    pub fn new(family: FontFamily, style: FontStyle) -> Self {
        Self { family, style }
    }
}

/// The standard PDF fonts the reports draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
        }
    }

    pub fn resolve(key: FontKey) -> Self {
        use FontFamily::*;
        use FontStyle::*;
        match (key.family, key.style) {
            (Helvetica, Normal) => Self::Helvetica,
            (Helvetica, Bold) => Self::HelveticaBold,
            (Helvetica, Italic) => Self::HelveticaOblique,
            (Helvetica, BoldItalic) => Self::HelveticaBoldOblique,
            (Times, Normal) => Self::TimesRoman,
            (Times, Bold) => Self::TimesBold,
            (Times, Italic) => Self::TimesItalic,
            (Times, BoldItalic) => Self::TimesBoldItalic,
        }
    }
}

/// The WinAnsiEncoding byte for `ch`, if the standard fonts can draw it.
///
/// Printable ASCII and Latin-1 map to themselves; the 0x80..=0x9F block
/// holds the Windows-1252 punctuation and a few extra letters.
pub fn winansi_byte(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    let byte = match ch {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Shared font context used by layout and PDF serialization.
#[derive(Debug, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    pub fn metrics(&self, font: FontKey) -> StandardFontMetrics {
        StandardFont::resolve(font).metrics()
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, font: FontKey, font_size: f64) -> f64 {
        self.metrics(font).char_width(ch, font_size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, font: FontKey, font_size: f64) -> f64 {
        self.metrics(font).measure_string(text, font_size, 0.0)
    }

    /// Distance from the top of a line box to the baseline, for a box of
    /// `line_height` points holding text at `font_size`.
    pub fn baseline_offset(&self, font: FontKey, font_size: f64, line_height: f64) -> f64 {
        let m = self.metrics(font);
        let ascent = m.ascender as f64 / 1000.0 * font_size;
        let descent = -(m.descender as f64) / 1000.0 * font_size;
        (line_height - (ascent + descent)) / 2.0 + ascent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(family: FontFamily, style: FontStyle) -> FontKey {
        FontKey::new(family, style)
    }

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', key(FontFamily::Helvetica, FontStyle::Normal), 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.measure_string("Biosafety", key(FontFamily::Times, FontStyle::Normal), 12.0);
        let bold = ctx.measure_string("Biosafety", key(FontFamily::Times, FontStyle::Bold), 12.0);
        assert!(bold > regular, "Bold should be wider than regular");
    }

    #[test]
    fn oblique_shares_upright_widths() {
        let ctx = FontContext::new();
        let upright = ctx.measure_string("Helvetica", key(FontFamily::Helvetica, FontStyle::Normal), 10.0);
        let oblique = ctx.measure_string("Helvetica", key(FontFamily::Helvetica, FontStyle::Italic), 10.0);
        assert!((upright - oblique).abs() < 1e-9);
    }

    #[test]
    fn resolves_pdf_names() {
        assert_eq!(
            StandardFont::resolve(key(FontFamily::Times, FontStyle::BoldItalic)).pdf_name(),
            "Times-BoldItalic"
        );
        assert_eq!(
            StandardFont::resolve(key(FontFamily::Helvetica, FontStyle::Italic)).pdf_name(),
            "Helvetica-Oblique"
        );
    }

    #[test]
    fn winansi_covers_latin1_and_punctuation() {
        assert_eq!(winansi_byte('A'), Some(0x41));
        assert_eq!(winansi_byte('\u{00E9}'), Some(0xE9));
        assert_eq!(winansi_byte('\u{2022}'), Some(0x95));
        assert_eq!(winansi_byte('\u{4E2D}'), None);
        assert_eq!(winansi_byte('\n'), None);
    }

    #[test]
    fn baseline_sits_inside_line_box() {
        let ctx = FontContext::new();
        let off = ctx.baseline_offset(key(FontFamily::Times, FontStyle::Normal), 10.0, 13.0);
        assert!(off > 6.0 && off < 13.0);
    }
}
