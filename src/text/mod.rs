//! # Text Layout
//!
//! Line breaking and text measurement.
//!
//! Break opportunities come from UAX#14; explicit newlines are mandatory
//! breaks. Spaces hang past the right edge instead of forcing a break, and
//! a word wider than the line is split between characters. Output is a
//! pure function of the input, so the same text always wraps the same way.

use std::ops::Range;

use crate::font::{FontContext, FontKey};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of plain text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The text, without trailing spaces or newlines.
    pub text: String,
    /// Width of `text` in points.
    pub width: f64,
}

/// A styled character for multi-style line breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledChar {
    pub ch: char,
    pub font: FontKey,
    pub font_size: f64,
    pub underline: bool,
}

/// A line of text from multi-style (runs) line breaking.
#[derive(Debug, Clone)]
pub struct RunBrokenLine {
    pub chars: Vec<StyledChar>,
    /// X position of each character relative to line start.
    pub char_positions: Vec<f64>,
    /// Width of the line, trailing spaces excluded.
    pub width: f64,
}

impl RunBrokenLine {
    pub fn text(&self) -> String {
        self.chars.iter().map(|sc| sc.ch).collect()
    }

    /// Number of spaces between words on this line.
    pub fn space_count(&self) -> usize {
        self.chars.iter().filter(|sc| sc.ch == ' ').count()
    }
}

const OVERFLOW_EPSILON: f64 = 1e-9;

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the start of the next segment;
    // convert them to char indices.
    let mut byte_to_char = vec![0usize; text.len() + 1];
    let mut char_idx = 0;
    for (byte_idx, _) in text.char_indices() {
        byte_to_char[byte_idx] = char_idx;
        char_idx += 1;
    }
    byte_to_char[text.len()] = char_idx;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

/// Greedy line breaking over pre-measured characters.
///
/// Returns one char range per line, with trailing spaces and newlines
/// removed from each range.
fn line_ranges(chars: &[char], widths: &[f64], max_width: f64) -> Vec<Range<usize>> {
    if chars.is_empty() {
        return vec![0..0];
    }

    let text: String = chars.iter().collect();
    let break_opps = compute_break_opportunities(&text);

    let mut ranges = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break_point: Option<usize> = None;

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 {
            match break_opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    ranges.push(line_start..i);
                    line_start = i;
                    line_width = 0.0;
                    last_break_point = None;
                }
                // The break falls after chars[i - 1].
                Some(BreakOpportunity::Allowed) => last_break_point = Some(i - 1),
                None => {}
            }
        }

        if is_newline(ch) {
            continue;
        }
        if ch == ' ' {
            line_width += widths[i];
            continue;
        }

        if line_width + widths[i] > max_width + OVERFLOW_EPSILON && line_start < i {
            match last_break_point.filter(|&bp| bp >= line_start) {
                Some(bp) => {
                    ranges.push(line_start..bp + 1);
                    line_start = bp + 1;
                    line_width = widths[line_start..=i].iter().sum();
                }
                None => {
                    // No break opportunity on this line: split the word.
                    ranges.push(line_start..i);
                    line_start = i;
                    line_width = widths[i];
                }
            }
            last_break_point = None;
            continue;
        }

        line_width += widths[i];
    }

    if line_start < chars.len() {
        ranges.push(line_start..chars.len());
    }

    for range in ranges.iter_mut() {
        while range.end > range.start && (chars[range.end - 1] == ' ' || is_newline(chars[range.end - 1])) {
            range.end -= 1;
        }
    }
    ranges
}

#[derive(Debug, Default)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break a string into lines that fit within `max_width`.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font: FontKey,
        font_size: f64,
    ) -> Vec<BrokenLine> {
        let chars: Vec<char> = text.chars().collect();
        let widths = self.measure_chars(font_context, &chars, font, font_size);

        line_ranges(&chars, &widths, max_width)
            .into_iter()
            .map(|r| BrokenLine {
                text: chars[r.clone()].iter().collect(),
                width: widths[r].iter().sum(),
            })
            .collect()
    }

    /// Wrap `text` to `max_width`, returning just the line strings.
    pub fn split_to_size(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font: FontKey,
        font_size: f64,
    ) -> Vec<String> {
        self.break_into_lines(font_context, text, max_width, font, font_size)
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    /// Break multi-style text (runs) into lines that fit within `max_width`.
    pub fn break_runs_into_lines(
        &self,
        font_context: &FontContext,
        chars: &[StyledChar],
        max_width: f64,
    ) -> Vec<RunBrokenLine> {
        let plain: Vec<char> = chars.iter().map(|sc| sc.ch).collect();
        let widths: Vec<f64> = chars
            .iter()
            .map(|sc| font_context.char_width(sc.ch, sc.font, sc.font_size))
            .collect();

        line_ranges(&plain, &widths, max_width)
            .into_iter()
            .map(|r| {
                let mut positions = Vec::with_capacity(r.len());
                let mut x = 0.0;
                for &w in &widths[r.clone()] {
                    positions.push(x);
                    x += w;
                }
                RunBrokenLine {
                    chars: chars[r].to_vec(),
                    char_positions: positions,
                    width: x,
                }
            })
            .collect()
    }

    /// Measure the width of a string on a single line.
    pub fn measure_width(
        &self,
        font_context: &FontContext,
        text: &str,
        font: FontKey,
        font_size: f64,
    ) -> f64 {
        font_context.measure_string(text, font, font_size)
    }

    fn measure_chars(
        &self,
        font_context: &FontContext,
        chars: &[char],
        font: FontKey,
        font_size: f64,
    ) -> Vec<f64> {
        chars
            .iter()
            .map(|&ch| font_context.char_width(ch, font, font_size))
            .collect()
    }
}
