//! Advance widths for the standard PDF fonts, from the Adobe AFM files.
//!
//! Widths are in 1/1000 em. Printable ASCII and the Latin-1 block come
//! straight from the AFM tables; accented letters share the advance of
//! their base letter. Characters WinAnsi cannot encode are drawn as `?`,
//! so they measure as `?` too.

use super::{winansi_byte, StandardFont};

const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667,
    611, 722, 667, 944, 667, 667, 611, // A-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, // a-z
    334, 260, 334, 584, // {..~
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722, 667,
    611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667, 556,
    611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333, 389,
    278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, 611, 778, 722, 556,
    667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, 556, 556, 444, 389,
    333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 675, 675, 675, 500, 920,
    611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722, 611, 722, 611, 500,
    556, 722, 611, 833, 611, 556, 556,
    389, 278, 389, 422, 500, 333,
    500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500, 500, 500, 389, 389,
    278, 500, 444, 667, 444, 444, 389,
    400, 275, 400, 541,
];

const TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 832,
    667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722, 611, 722, 667, 556,
    611, 722, 667, 889, 667, 611, 611,
    333, 278, 333, 570, 500, 333,
    500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500, 500, 500, 389, 389,
    278, 556, 444, 667, 500, 444, 389,
    348, 220, 348, 570,
];

/// 0xA0..=0xBF: nbspace, exclamdown, cent, sterling, currency, yen,
/// brokenbar, section, dieresis, copyright, ordfeminine, guillemotleft,
/// logicalnot, hyphen, registered, macron, degree, plusminus, twosuperior,
/// threesuperior, acute, mu, paragraph, periodcentered, cedilla,
/// onesuperior, ordmasculine, guillemotright, onequarter, onehalf,
/// threequarters, questiondown.
type Latin1Symbols = [u16; 32];

/// AE, Eth, multiply, Thorn, germandbls, ae, eth, divide, oslash, thorn.
type Latin1Letters = [u16; 10];

const HELVETICA_LATIN1: (Latin1Symbols, Latin1Letters) = (
    [
        278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    ],
    [1000, 722, 584, 667, 611, 889, 556, 584, 611, 556],
);

const HELVETICA_BOLD_LATIN1: (Latin1Symbols, Latin1Letters) = (
    [
        278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
        400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    ],
    [1000, 722, 584, 667, 611, 889, 611, 584, 611, 611],
);

const TIMES_ROMAN_LATIN1: (Latin1Symbols, Latin1Letters) = (
    [
        250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 333,
        400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444,
    ],
    [889, 722, 564, 556, 500, 667, 500, 564, 500, 500],
);

const TIMES_BOLD_LATIN1: (Latin1Symbols, Latin1Letters) = (
    [
        250, 333, 500, 500, 500, 500, 220, 500, 333, 747, 300, 500, 570, 333, 747, 333,
        400, 570, 300, 300, 333, 556, 540, 250, 333, 300, 330, 500, 750, 750, 750, 500,
    ],
    [1000, 722, 570, 611, 556, 722, 500, 570, 500, 556],
);

const TIMES_ITALIC_LATIN1: (Latin1Symbols, Latin1Letters) = (
    [
        250, 389, 500, 500, 500, 500, 275, 500, 333, 760, 276, 500, 675, 333, 760, 333,
        400, 675, 300, 300, 333, 500, 523, 250, 333, 300, 310, 500, 750, 750, 750, 500,
    ],
    [889, 722, 675, 611, 500, 667, 500, 675, 500, 500],
);

const TIMES_BOLD_ITALIC_LATIN1: (Latin1Symbols, Latin1Letters) = (
    [
        250, 389, 500, 500, 500, 500, 220, 500, 333, 747, 266, 500, 606, 333, 747, 333,
        400, 570, 300, 300, 333, 576, 500, 250, 333, 300, 300, 500, 750, 750, 750, 500,
    ],
    [944, 722, 570, 611, 500, 722, 500, 570, 500, 500],
);

/// The ASCII letter whose advance an accented Latin-1 or WinAnsi letter
/// shares.
fn base_letter(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Š' => 'S',
        'Ž' => 'Z',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' => 's',
        'ž' => 'z',
        _ => return None,
    };
    Some(base)
}

/// Width table and vertical metrics for one standard face.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    widths: &'static [u16; 95],
    latin1: &'static (Latin1Symbols, Latin1Letters),
    serif: bool,
    /// Ascender in 1/1000 em.
    pub ascender: i16,
    /// Descender in 1/1000 em (negative).
    pub descender: i16,
}

impl StandardFontMetrics {
    /// Advance width of `ch` in 1/1000 em.
    pub fn advance(&self, ch: char) -> u16 {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            return self.widths[(code - 0x20) as usize];
        }
        if let Some(base) = base_letter(ch) {
            return self.advance(base);
        }
        let (symbols, letters) = self.latin1;
        match ch {
            '\u{00A0}'..='\u{00BF}' => symbols[(code - 0xA0) as usize],
            'Æ' => letters[0],
            'Ð' => letters[1],
            '×' => letters[2],
            'Þ' => letters[3],
            'ß' => letters[4],
            'æ' => letters[5],
            'ð' => letters[6],
            '÷' => letters[7],
            'ø' => letters[8],
            'þ' => letters[9],
            '\u{2022}' => 350,
            '\u{2013}' => if self.serif { 500 } else { 556 },
            '\u{2014}' | '\u{2026}' | '\u{2030}' => 1000,
            '\u{2018}' | '\u{2019}' | '\u{201A}' => if self.serif { 333 } else { 222 },
            '\u{201C}' | '\u{201D}' | '\u{201E}' => if self.serif { 444 } else { 333 },
            '\u{2039}' | '\u{203A}' => 333,
            '\u{2122}' => if self.serif { 980 } else { 1000 },
            _ if winansi_byte(ch).is_none() => self.advance('?'),
            // Remaining Windows-1252 extras: euro, daggers, OE, florin.
            _ => if self.serif { 500 } else { 556 },
        }
    }

    /// Width of a character in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string in points, with `letter_spacing` added per character.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

impl StandardFont {
    pub fn metrics(&self) -> StandardFontMetrics {
        let (widths, latin1, serif, ascender, descender) = match self {
            Self::Helvetica | Self::HelveticaOblique => (&HELVETICA, &HELVETICA_LATIN1, false, 718, -207),
            Self::HelveticaBold | Self::HelveticaBoldOblique => {
                (&HELVETICA_BOLD, &HELVETICA_BOLD_LATIN1, false, 718, -207)
            }
            Self::TimesRoman => (&TIMES_ROMAN, &TIMES_ROMAN_LATIN1, true, 683, -217),
            Self::TimesBold => (&TIMES_BOLD, &TIMES_BOLD_LATIN1, true, 683, -217),
            Self::TimesItalic => (&TIMES_ITALIC, &TIMES_ITALIC_LATIN1, true, 683, -217),
            Self::TimesBoldItalic => (&TIMES_BOLD_ITALIC, &TIMES_BOLD_ITALIC_LATIN1, true, 683, -217),
        };
        StandardFontMetrics {
            widths,
            latin1,
            serif,
            ascender,
            descender,
        }
    }
}
