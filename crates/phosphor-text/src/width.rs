#![forbid(unsafe_code)]

//! Column measurement and fixed-width padding.
//!
//! The console is a non-reflowing character grid, so every row handed to the
//! compositor must occupy an exact number of columns. [`pad`] is the single
//! primitive every process uses to meet that contract; markup tags pass
//! through it untouched and count as zero columns.
//!
//! Width is measured per grapheme cluster, so emoji presentation sequences
//! and ZWJ sequences occupy the columns a terminal gives them.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::markup::{Token, tokenize};

/// Ellipsis appended by [`truncate_with_ellipsis`].
pub const ELLIPSIS: &str = "...";

/// Horizontal placement of text inside a padded field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Align {
    #[default]
    Left,
    Right,
    /// Odd leftover column goes to the right.
    Center,
}

impl Align {
    /// Parse `left`, `right` or `center`/`centre` (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" | "centre" => Some(Self::Center),
            _ => None,
        }
    }
}

/// Display width of plain text in columns. Markup is not interpreted.
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(UnicodeWidthStr::width).sum()
}

/// Display width with markup tags excluded.
#[must_use]
pub fn visible_width(text: &str) -> usize {
    if !text.contains('<') {
        return display_width(text);
    }
    tokenize(text)
        .map(|token| match token {
            Token::Text(run) => display_width(run),
            Token::Tag(_) => 0,
        })
        .sum()
}

/// A row of `width` spaces.
#[must_use]
pub fn blank_row(width: usize) -> String {
    " ".repeat(width)
}

fn push_spaces(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n(' ', count));
}

/// Pad or truncate `text` to exactly `width` visible columns.
///
/// Text that fits is space-padded according to `align`. Text that doesn't
/// fit keeps its left portion; no ellipsis is added. A wide grapheme that
/// would straddle the boundary is dropped and the gap filled with a space.
/// Tags are preserved in both cases so the caller's markup stays balanced.
///
/// ```
/// use phosphor_text::{Align, pad, visible_width};
///
/// assert_eq!(pad("ok", 5, Align::Right), "   ok");
/// assert_eq!(pad("overflow", 4, Align::Left), "over");
/// assert_eq!(visible_width(&pad("<b>bold</b>", 6, Align::Center)), 6);
/// ```
#[must_use]
pub fn pad(text: &str, width: usize, align: Align) -> String {
    let visible = visible_width(text);
    if visible <= width {
        let fill = width - visible;
        let (left, right) = match align {
            Align::Left => (0, fill),
            Align::Right => (fill, 0),
            Align::Center => (fill / 2, fill - fill / 2),
        };
        let mut out = String::with_capacity(text.len() + fill);
        push_spaces(&mut out, left);
        out.push_str(text);
        push_spaces(&mut out, right);
        return out;
    }
    truncate_padded(text, width)
}

fn truncate_padded(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len().min(width * 4) + 16);
    let mut used = 0;
    let mut full = false;

    for token in tokenize(text) {
        match token {
            Token::Tag(tag) => out.push_str(tag.raw),
            Token::Text(_) if full => {}
            Token::Text(run) => {
                for grapheme in run.graphemes(true) {
                    let w = display_width(grapheme);
                    if used + w > width {
                        full = true;
                        break;
                    }
                    out.push_str(grapheme);
                    used += w;
                }
            }
        }
    }

    push_spaces(&mut out, width - used);
    out
}

/// Truncate to `width` columns, replacing the last three with `...` when the
/// text doesn't fit. Text that fits is returned unchanged (not padded).
#[must_use]
pub fn truncate_with_ellipsis(text: &str, width: usize) -> String {
    if visible_width(text) <= width {
        return text.to_string();
    }
    if width <= ELLIPSIS.len() {
        return pad(text, width, Align::Left);
    }
    let mut out = pad(text, width - ELLIPSIS.len(), Align::Left);
    out.push_str(ELLIPSIS);
    out
}

/// Split plain text at the last grapheme boundary that fits in `width`.
fn split_at_width(text: &str, width: usize) -> (&str, &str) {
    let mut used = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        let w = display_width(grapheme);
        if used + w > width {
            return text.split_at(idx);
        }
        used += w;
    }
    (text, "")
}

/// Word-wrap plain text into rows no wider than `width`.
///
/// Newlines start a new row; blank lines are kept. Words longer than a row
/// are split hard. Returns no rows for a zero width.
#[must_use]
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split_whitespace() {
            let mut word = word;
            let mut word_width = display_width(word);

            while word_width > width {
                if line_width > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                let (head, tail) = split_at_width(word, width);
                if head.is_empty() {
                    // A single grapheme wider than the row.
                    break;
                }
                lines.push(head.to_string());
                word = tail;
                word_width = display_width(word);
            }
            if word.is_empty() {
                continue;
            }

            if line_width > 0 && line_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            line.push_str(word);
            line_width += word_width;
        }

        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // visible_width
    // ==========================================================================

    #[test]
    fn visible_width_ignores_tags() {
        assert_eq!(visible_width("<color=#33ff33>READY</color>"), 5);
        assert_eq!(visible_width("<mark><b>x</b></mark>"), 1);
        assert_eq!(visible_width(""), 0);
    }

    #[test]
    fn visible_width_counts_literal_brackets() {
        assert_eq!(visible_width("<APP>"), 5);
        assert_eq!(visible_width("a < b"), 5);
    }

    #[test]
    fn visible_width_wide_chars() {
        assert_eq!(visible_width("日本"), 4);
        assert_eq!(visible_width("e\u{301}"), 1);
    }

    #[test]
    fn emoji_sequences_count_as_one_cluster() {
        assert_eq!(display_width("\u{2764}\u{FE0F}"), 2);
        assert_eq!(display_width("\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}"), 2);
        assert_eq!(visible_width("<b>\u{2764}\u{FE0F}</b>!"), 3);
    }

    #[test]
    fn pad_measures_emoji_by_cluster() {
        assert_eq!(pad("\u{2764}\u{FE0F}", 4, Align::Left), "\u{2764}\u{FE0F}  ");
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        assert_eq!(pad(&format!("{family}ab"), 3, Align::Left), format!("{family}a"));
        assert_eq!(pad(family, 1, Align::Left), " ");
    }

    // ==========================================================================
    // pad
    // ==========================================================================

    #[test]
    fn pad_alignments() {
        assert_eq!(pad("ab", 5, Align::Left), "ab   ");
        assert_eq!(pad("ab", 5, Align::Right), "   ab");
        assert_eq!(pad("ab", 5, Align::Center), " ab  ");
        assert_eq!(pad("ab", 6, Align::Center), "  ab  ");
    }

    #[test]
    fn pad_exact_fit_is_identity() {
        assert_eq!(pad("abc", 3, Align::Right), "abc");
    }

    #[test]
    fn pad_truncates_left_portion_without_ellipsis() {
        assert_eq!(pad("DASHBOARD", 4, Align::Right), "DASH");
    }

    #[test]
    fn pad_zero_width_is_empty() {
        assert_eq!(pad("anything", 0, Align::Left), "");
        assert_eq!(pad("", 0, Align::Center), "");
    }

    #[test]
    fn pad_keeps_tags_when_truncating() {
        let out = pad("<color=red>alert</color>!", 3, Align::Left);
        assert_eq!(out, "<color=red>ale</color>");
        assert_eq!(visible_width(&out), 3);
    }

    #[test]
    fn pad_fills_gap_left_by_wide_char() {
        let out = pad("a日本", 2, Align::Left);
        assert_eq!(out, "a ");
        assert_eq!(visible_width(&out), 2);
    }

    #[test]
    fn pad_does_not_split_combining_sequence() {
        let out = pad("ae\u{301}x", 2, Align::Left);
        assert_eq!(out, "ae\u{301}");
    }

    #[test]
    fn pad_keeps_literal_type_tags() {
        assert_eq!(pad("<DIR>", 7, Align::Left), "<DIR>  ");
    }

    #[test]
    fn align_from_name() {
        assert_eq!(Align::from_name("LEFT"), Some(Align::Left));
        assert_eq!(Align::from_name("centre"), Some(Align::Center));
        assert_eq!(Align::from_name("justify"), None);
    }

    // ==========================================================================
    // truncate_with_ellipsis
    // ==========================================================================

    #[test]
    fn ellipsis_only_when_needed() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("a long description", 10), "a long ...");
        assert_eq!(visible_width(&truncate_with_ellipsis("a long description", 10)), 10);
    }

    #[test]
    fn ellipsis_degrades_on_tiny_width() {
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc");
        assert_eq!(truncate_with_ellipsis("abcdef", 0), "");
    }

    // ==========================================================================
    // wrap_words
    // ==========================================================================

    #[test]
    fn wrap_basic() {
        assert_eq!(
            wrap_words("the vault door is sealed", 10),
            vec!["the vault", "door is", "sealed"]
        );
    }

    #[test]
    fn wrap_keeps_blank_lines() {
        assert_eq!(wrap_words("a\n\nb", 5), vec!["a", "", "b"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap_words("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
    }

    #[test]
    fn wrap_zero_width() {
        assert!(wrap_words("anything", 0).is_empty());
    }

    #[test]
    fn wrap_rows_never_exceed_width() {
        for row in wrap_words("lorem ipsum dolor sit amet consectetur adipiscing", 7) {
            assert!(display_width(&row) <= 7, "{row:?}");
        }
    }

    #[test]
    fn blank_row_is_spaces() {
        assert_eq!(blank_row(3), "   ");
        assert_eq!(blank_row(0), "");
    }
}
