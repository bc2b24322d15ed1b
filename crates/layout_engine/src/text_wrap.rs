//! Description wrapping
//!
//! Widths are counted in extended grapheme clusters, so a break never falls
//! inside a user-perceived character.

use unicode_segmentation::UnicodeSegmentation;

/// One emitted line of a wrapped description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    pub text: String,
    /// First piece of a source line (gets a bullet); false for the
    /// continuation pieces produced by wrapping
    pub starts_line: bool,
}

fn is_space(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_whitespace)
}

/// Wrap a single line so that no piece exceeds `width` graphemes.
///
/// Breaks at the last space at or before the limit when that space lies
/// past half the width; otherwise the line is hard-split at exactly
/// `width` graphemes. Whitespace at a break is dropped.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let graphemes: Vec<&str> = line.graphemes(true).collect();
    let mut pieces = Vec::new();
    let mut start = skip_spaces(&graphemes, 0);

    while start < graphemes.len() {
        let rest = &graphemes[start..];
        if rest.len() <= width {
            pieces.push(rest.concat().trim_end().to_string());
            break;
        }

        let soft_break = rest[..=width]
            .iter()
            .rposition(|g| is_space(g))
            .filter(|&pos| pos * 2 > width);

        let (end, next) = match soft_break {
            Some(pos) => (pos, pos + 1),
            None => (width, width),
        };

        let piece = rest[..end].concat();
        let piece = piece.trim_end();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        start = skip_spaces(&graphemes, start + next);
    }

    pieces
}

fn skip_spaces(graphemes: &[&str], mut index: usize) -> usize {
    while index < graphemes.len() && is_space(graphemes[index]) {
        index += 1;
    }
    index
}

/// Split a description into trimmed, non-empty source lines and wrap each.
pub fn wrap_description(description: &str, width: usize) -> Vec<WrappedLine> {
    description
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| {
            wrap_line(line, width)
                .into_iter()
                .enumerate()
                .map(|(i, text)| WrappedLine {
                    text,
                    starts_line: i == 0,
                })
        })
        .collect()
}

/// Number of graphemes in `text`
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}
