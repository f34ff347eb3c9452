#![forbid(unsafe_code)]

//! Inline markup for console rows.
//!
//! Rows may carry angle-bracket tags from a small fixed vocabulary. Tags are
//! zero-width: they style the text between them but never occupy a column of
//! the console grid.
//!
//! # Syntax
//!
//! - `<b>text</b>`, `<i>text</i>`, `<u>text</u>`, `<s>text</s>`
//! - `<blink>text</blink>` - blinking text
//! - `<mark>text</mark>` - reverse video (menu selection)
//! - `<color=#33ff33>text</color>` - hex (`#rgb`, `#rrggbb`, `#rrggbbaa`) or
//!   named colour
//! - `<b/>` - self-closing form, no effect on style
//!
//! Tag names are case-insensitive. Anything else between angle brackets, such
//! as the `<APP>` and `<DIR>` type tags in the menu, is literal text.
//!
//! # Example
//! ```
//! use phosphor_text::markup::{strip_markup, validate_markup};
//!
//! let row = "<color=#33ff33>READY</color> <APP>";
//! assert_eq!(strip_markup(row), "READY <APP>");
//! assert!(validate_markup(row).is_ok());
//! ```

use std::borrow::Cow;

/// Tag names recognized as markup.
pub const KNOWN_TAGS: &[&str] = &["color", "b", "i", "u", "s", "mark", "blink"];

/// Returns `true` if `name` is part of the markup vocabulary.
#[must_use]
pub fn is_known_tag(name: &str) -> bool {
    KNOWN_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Errors reported by [`validate_markup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// A closing tag doesn't match the innermost open tag.
    UnmatchedTag {
        expected: Option<String>,
        found: String,
        position: usize,
    },
    /// An opening tag was never closed.
    UnclosedTag { tag: String, position: usize },
}

impl std::fmt::Display for MarkupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmatchedTag {
                expected,
                found,
                position,
            } => {
                if let Some(exp) = expected {
                    write!(
                        f,
                        "unmatched tag at position {}: expected </{}>, found </{}>",
                        position, exp, found
                    )
                } else {
                    write!(
                        f,
                        "unexpected closing tag </{}> at position {} with no matching opening tag",
                        found, position
                    )
                }
            }
            Self::UnclosedTag { tag, position } => {
                write!(f, "unclosed tag <{}> opened at position {}", tag, position)
            }
        }
    }
}

impl std::error::Error for MarkupError {}

/// Shape of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// A recognized markup tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Tag name as written (case preserved).
    pub name: &'a str,
    /// Value after `=`, with surrounding quotes removed.
    pub value: Option<&'a str>,
    pub kind: TagKind,
    /// The tag exactly as it appears in the source text.
    pub raw: &'a str,
}

impl Tag<'_> {
    /// Case-insensitive name comparison.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A piece of marked-up text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Visible text. Never empty.
    Text(&'a str),
    /// A zero-width tag.
    Tag(Tag<'a>),
}

/// Parse a tag at the very start of `input`, returning it with its byte length.
fn parse_tag(input: &str) -> Option<(Tag<'_>, usize)> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    let name = &input[name_start..i];
    if name.is_empty() || !is_known_tag(name) {
        return None;
    }

    let mut kind = if closing {
        TagKind::Close
    } else {
        TagKind::Open
    };
    let mut value = None;

    match bytes.get(i) {
        Some(b'>') => {}
        Some(b'/') if !closing && bytes.get(i + 1) == Some(&b'>') => {
            kind = TagKind::SelfClosing;
            i += 1;
        }
        Some(b'=') if !closing => {
            let start = i + 1;
            let end = start + input[start..].find(|c: char| matches!(c, '>' | '<' | '\n'))?;
            if bytes[end] != b'>' {
                return None;
            }
            let mut raw = &input[start..end];
            if let Some(stripped) = raw.strip_suffix('/') {
                kind = TagKind::SelfClosing;
                raw = stripped;
            }
            let raw = raw.trim_matches('"');
            if raw.is_empty() {
                return None;
            }
            value = Some(raw);
            i = end;
        }
        _ => return None,
    }

    let len = i + 1;
    Some((
        Tag {
            name,
            value,
            kind,
            raw: &input[..len],
        },
        len,
    ))
}

/// Iterator over the [`Token`]s of a marked-up string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
}

impl Tokens<'_> {
    /// Byte offset of the next token.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.input;
        let rest = &input[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if let Some((tag, len)) = parse_tag(rest) {
            self.pos += len;
            return Some(Token::Tag(tag));
        }

        // Text runs until the next '<' that opens a real tag.
        let mut from = rest.chars().next().map_or(rest.len(), char::len_utf8);
        let end = loop {
            match rest[from..].find('<') {
                Some(off) => {
                    let at = from + off;
                    if parse_tag(&rest[at..]).is_some() {
                        break at;
                    }
                    from = at + 1;
                }
                None => break rest.len(),
            }
        };

        self.pos += end;
        Some(Token::Text(&rest[..end]))
    }
}

/// Split `input` into text and tag tokens.
#[must_use]
pub fn tokenize(input: &str) -> Tokens<'_> {
    Tokens { input, pos: 0 }
}

/// Remove every recognized tag, keeping literal text (including unknown
/// angle-bracket text such as `<APP>`).
#[must_use]
pub fn strip_markup(input: &str) -> Cow<'_, str> {
    if !input.contains('<') {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    for token in tokenize(input) {
        if let Token::Text(text) = token {
            out.push_str(text);
        }
    }
    Cow::Owned(out)
}

/// Returns `true` if `input` contains at least one recognized tag.
#[must_use]
pub fn has_markup(input: &str) -> bool {
    input.contains('<') && tokenize(input).any(|t| matches!(t, Token::Tag(_)))
}

/// Check that every opening tag is closed in the right order.
pub fn validate_markup(input: &str) -> Result<(), MarkupError> {
    let mut stack: Vec<(&str, usize)> = Vec::new();
    let mut tokens = tokenize(input);

    loop {
        let position = tokens.offset();
        let Some(token) = tokens.next() else {
            break;
        };
        let Token::Tag(tag) = token else {
            continue;
        };
        match tag.kind {
            TagKind::Open => stack.push((tag.name, position)),
            TagKind::SelfClosing => {}
            TagKind::Close => match stack.pop() {
                Some((open, _)) if open.eq_ignore_ascii_case(tag.name) => {}
                other => {
                    return Err(MarkupError::UnmatchedTag {
                        expected: other.map(|(name, _)| name.to_ascii_lowercase()),
                        found: tag.name.to_ascii_lowercase(),
                        position,
                    });
                }
            },
        }
    }

    match stack.pop() {
        Some((tag, position)) => Err(MarkupError::UnclosedTag {
            tag: tag.to_ascii_lowercase(),
            position,
        }),
        None => Ok(()),
    }
}

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parse a `color` tag value.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` (alpha ignored) and a handful of
/// names.
#[must_use]
pub fn parse_color(value: &str) -> Option<Rgb> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        return match hex.len() {
            3 => {
                let mut c = [0u8; 3];
                for (slot, ch) in c.iter_mut().zip(hex.chars()) {
                    *slot = ch.to_digit(16)? as u8 * 17;
                }
                Some(Rgb::new(c[0], c[1], c[2]))
            }
            6 | 8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Rgb::new(r, g, b))
            }
            _ => None,
        };
    }

    let (r, g, b) = match value.to_ascii_lowercase().as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 128, 0),
        "purple" => (160, 32, 240),
        "cyan" => (0, 255, 255),
        "grey" | "gray" => (128, 128, 128),
        _ => return None,
    };
    Some(Rgb::new(r, g, b))
}

/// Accumulated style of a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub fg: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub reverse: bool,
    pub blink: bool,
}

impl SpanStyle {
    /// No colour and no attributes.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    fn apply(mut self, tag: &Tag<'_>) -> Self {
        match tag.name.to_ascii_lowercase().as_str() {
            "b" => self.bold = true,
            "i" => self.italic = true,
            "u" => self.underline = true,
            "s" => self.strike = true,
            "mark" => self.reverse = true,
            "blink" => self.blink = true,
            "color" => match tag.value.and_then(parse_color) {
                Some(rgb) => self.fg = Some(rgb),
                None => tracing::debug!(value = ?tag.value, "unrecognized color value"),
            },
            _ => {}
        }
        self
    }
}

/// A run of plain text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: SpanStyle,
}

/// Resolve markup into styled runs for a rendering surface.
///
/// Lenient: a closing tag with no matching opener is ignored, and a closer
/// for an outer tag also closes everything opened inside it.
#[must_use]
pub fn parse_spans(input: &str) -> Vec<StyledSpan> {
    let mut spans: Vec<StyledSpan> = Vec::new();
    let mut stack: Vec<(&str, SpanStyle)> = Vec::new();
    let mut style = SpanStyle::default();

    for token in tokenize(input) {
        match token {
            Token::Text(text) => match spans.last_mut() {
                Some(last) if last.style == style => last.text.push_str(text),
                _ => spans.push(StyledSpan {
                    text: text.to_string(),
                    style,
                }),
            },
            Token::Tag(tag) => match tag.kind {
                TagKind::SelfClosing => {}
                TagKind::Open => {
                    stack.push((tag.name, style));
                    style = style.apply(&tag);
                }
                TagKind::Close => {
                    if let Some(idx) = stack
                        .iter()
                        .rposition(|(name, _)| name.eq_ignore_ascii_case(tag.name))
                    {
                        style = stack[idx].1;
                        stack.truncate(idx);
                    } else {
                        tracing::trace!(tag = tag.name, "ignoring unmatched closing tag");
                    }
                }
            },
        }
    }

    spans
}

/// Wrap `text` in a colour tag.
#[must_use]
pub fn color(value: &str, text: &str) -> String {
    format!("<color={value}>{text}</color>")
}

/// Wrap `text` in a reverse-video tag.
#[must_use]
pub fn mark(text: &str) -> String {
    format!("<mark>{text}</mark>")
}

/// Wrap `text` in a bold tag.
#[must_use]
pub fn bold(text: &str) -> String {
    format!("<b>{text}</b>")
}
