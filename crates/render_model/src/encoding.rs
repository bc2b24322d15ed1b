//! WinAnsi text encoding
//!
//! Exported PDFs use the standard Type1 fonts with WinAnsiEncoding, which
//! covers Latin-1 plus the few typographic characters an invoice needs.
//! Characters outside it print as `?`. The converter applies the same
//! substitution to every glyph run, so the preview shows what the PDF will.

use std::borrow::Cow;

/// Printed in place of characters WinAnsi cannot encode
pub const REPLACEMENT_CHAR: char = '?';

/// WinAnsi byte for `c`; tabs and line breaks encode as a space
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        '\u{0020}'..='\u{007E}' | '\u{00A0}'..='\u{00FF}' => Some(c as u32 as u8),
        '\t' | '\n' | '\r' => Some(b' '),
        '\u{20AC}' => Some(0x80),
        '\u{2026}' => Some(0x85),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{2122}' => Some(0x99),
        _ => None,
    }
}

fn printable_char(c: char) -> char {
    match win_ansi_byte(c) {
        Some(b' ') => ' ',
        Some(_) => c,
        None => REPLACEMENT_CHAR,
    }
}

/// `text` as it prints in the PDF; borrowed when nothing changes
pub fn win_ansi_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| printable_char(c) == c) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().map(printable_char).collect())
    }
}
