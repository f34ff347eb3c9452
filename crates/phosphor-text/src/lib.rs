#![forbid(unsafe_code)]

//! Text handling for the Phosphor console.
//!
//! This crate provides the width contract every console row obeys:
//! - [`visible_width`] - column count with inline markup tags excluded
//! - [`pad`] - pad or truncate to an exact column count
//! - [`truncate_with_ellipsis`] - caller-side `...` convention
//! - [`wrap_words`] - word wrapping for plain paragraphs
//! - [`markup`] - the tag vocabulary, tokenizer, validator and span parser
//!
//! # Example
//! ```
//! use phosphor_text::{Align, markup, pad, visible_width};
//!
//! let cell = markup::color("#33ff33", &pad("ONLINE", 10, Align::Left));
//! assert_eq!(visible_width(&cell), 10);
//! ```

pub mod markup;
pub mod width;

pub use markup::{
    MarkupError, Rgb, SpanStyle, StyledSpan, Tag, TagKind, Token, has_markup, parse_color,
    parse_spans, strip_markup, tokenize, validate_markup,
};
pub use width::{
    Align, ELLIPSIS, blank_row, display_width, pad, truncate_with_ellipsis, visible_width,
    wrap_words,
};
