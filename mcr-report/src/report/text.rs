//! Cell text preparation for the built-in Helvetica faces
//!
//! Built-in PDF fonts only carry the WinAnsi character set; anything else
//! would be dropped by the encoder, so it is replaced with `?` here where
//! the caller can see and log it. Widths use the standard Helvetica AFM
//! metrics so cells can be cut to their column.

use std::borrow::Cow;

/// Marker appended to text cut to fit a column
pub const ELLIPSIS: &str = "...";

/// Stand-in for characters the font cannot encode
pub const REPLACEMENT: char = '?';

/// Helvetica advance widths for U+0020..=U+007E, in 1/1000 em
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Width assumed for WinAnsi characters outside ASCII
const FALLBACK_WIDTH: u16 = 667;

/// Characters WinAnsiEncoding maps into 0x80..=0x9F
const WINANSI_EXTRAS: &[char] = &[
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•', '–',
    '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Whether the built-in font encoding has a glyph for `c`
pub fn is_encodable(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}') || WINANSI_EXTRAS.contains(&c)
}

/// Replace characters the built-in fonts cannot show
///
/// Control characters become spaces; anything else outside WinAnsi becomes
/// [`REPLACEMENT`]. Borrows when nothing changes.
pub fn to_winansi(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_encodable) {
        return Cow::Borrowed(text);
    }

    Cow::Owned(
        text.chars()
            .map(|c| {
                if is_encodable(c) {
                    c
                } else if c.is_control() {
                    ' '
                } else {
                    REPLACEMENT
                }
            })
            .collect(),
    )
}

fn char_width(c: char) -> u16 {
    match c {
        ' '..='~' => HELVETICA_ASCII_WIDTHS[c as usize - 0x20],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in points
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    units as f32 * font_size / 1000.0
}

/// Cut `text` so it fits `max_width` points, ending in [`ELLIPSIS`]
pub fn fit_to_width(text: &str, font_size: f32, max_width: f32) -> Cow<'_, str> {
    if text_width(text, font_size) <= max_width {
        return Cow::Borrowed(text);
    }

    let budget = max_width - text_width(ELLIPSIS, font_size);
    let mut used = 0.0;
    let mut end = 0;
    for (index, c) in text.char_indices() {
        let width = f32::from(char_width(c)) * font_size / 1000.0;
        if used + width > budget {
            break;
        }
        used += width;
        end = index + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", text[..end].trim_end(), ELLIPSIS))
}
