#![forbid(unsafe_code)]

//! Scrolling marquee.
//!
//! The ticker owns a circular tape built from its messages and a fractional
//! scroll offset. The visible window is read modulo the current tape length
//! every time, so rebuilding the tape never leaves a stale offset pointing
//! out of bounds, and a tape shorter than the window simply repeats.
//!
//! The tape is a sequence of grapheme cells. The window is filled by
//! columns, so a wide cell that would overhang the right edge is replaced
//! by spaces.
//!
//! Announcements sit after the configured messages in a bounded queue. The
//! oldest one is dropped once the limit is reached.
//!
//! ```
//! use std::time::Duration;
//! use phosphor_runtime::Ticker;
//!
//! let mut ticker = Ticker::new(vec!["A".into(), "B".into()], 5, 1.0);
//! assert_eq!(ticker.tape(), "A *** B *** ");
//! assert_eq!(ticker.visible_window(), "A ***");
//! ticker.tick(Duration::from_secs(1));
//! assert_eq!(ticker.visible_window(), " *** ");
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use phosphor_text::{display_width, strip_markup};
use unicode_segmentation::UnicodeSegmentation;

/// Joins messages on the tape, and trails the last one.
pub const SEPARATOR: &str = " *** ";

/// Substituted when there are no messages.
pub const FALLBACK_MESSAGE: &str = "NO SIGNAL";

/// Default number of announcements kept on the tape.
pub const ANNOUNCEMENT_LIMIT: usize = 3;

/// One grapheme of the tape and its column width.
#[derive(Debug, Clone)]
struct Cell {
    text: String,
    width: usize,
}

/// Circular text tape with a fixed-width window.
#[derive(Debug, Clone)]
pub struct Ticker {
    messages: Vec<String>,
    announcements: VecDeque<String>,
    announcement_limit: usize,
    tape: Vec<Cell>,
    offset: f64,
    speed: f64,
    width: usize,
}

impl Ticker {
    /// `speed` is in columns per second.
    #[must_use]
    pub fn new(messages: Vec<String>, width: usize, speed: f64) -> Self {
        let mut ticker = Self {
            messages: Vec::new(),
            announcements: VecDeque::new(),
            announcement_limit: ANNOUNCEMENT_LIMIT,
            tape: Vec::new(),
            offset: 0.0,
            speed: sanitize_speed(speed),
            width,
        };
        ticker.set_messages(messages);
        ticker
    }

    /// Replace the configured messages and rebuild the tape. Announcements
    /// and the offset are kept.
    pub fn set_messages(&mut self, messages: Vec<String>) {
        self.messages = messages.iter().map(|m| sanitize(m)).collect();
        self.rebuild();
    }

    /// Append one message and rebuild the tape. The offset is kept.
    pub fn add_message(&mut self, message: &str) {
        self.messages.push(sanitize(message));
        self.rebuild();
    }

    /// Queue a transient message after the configured ones.
    ///
    /// A repeat of a queued announcement moves it to the back instead of
    /// adding a copy. The offset is kept.
    pub fn announce(&mut self, message: &str) {
        let message = sanitize(message);
        if message.trim().is_empty() {
            return;
        }
        self.announcements.retain(|queued| *queued != message);
        self.announcements.push_back(message);
        self.trim_announcements();
        self.rebuild();
    }

    #[must_use]
    pub fn announcements(&self) -> &VecDeque<String> {
        &self.announcements
    }

    #[must_use]
    pub fn announcement_limit(&self) -> usize {
        self.announcement_limit
    }

    /// Keep at most `limit` announcements, dropping the oldest.
    pub fn set_announcement_limit(&mut self, limit: usize) {
        self.announcement_limit = limit;
        if self.trim_announcements() {
            self.rebuild();
        }
    }

    fn trim_announcements(&mut self) -> bool {
        let excess = self.announcements.len().saturating_sub(self.announcement_limit);
        self.announcements.drain(..excess);
        excess > 0
    }

    fn rebuild(&mut self) {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .chain(&self.announcements)
            .map(String::as_str)
            .collect();
        let mut tape = if parts.is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            parts.join(SEPARATOR)
        };
        tape.push_str(SEPARATOR);
        self.tape = tape
            .graphemes(true)
            .map(|g| Cell {
                text: g.to_string(),
                width: display_width(g),
            })
            .collect();
    }

    /// Scroll by `speed * dt`, wrapping against the tape length.
    pub fn tick(&mut self, dt: Duration) {
        let advanced = self.offset + self.speed * dt.as_secs_f64();
        self.offset = self.wrap(advanced);
    }

    fn wrap(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return 0.0;
        }
        // The tape is never empty: the separator is always appended.
        offset.rem_euclid(self.tape.len() as f64)
    }

    /// Exactly `width` columns of tape starting at the current offset.
    #[must_use]
    pub fn visible_window(&self) -> String {
        let len = self.tape.len();
        let start = (self.offset.floor() as usize) % len;
        let mut out = String::with_capacity(self.width);
        let mut used = 0;
        // Every cell is at least one column wide, so `width` cells suffice.
        for i in 0..self.width {
            let cell = &self.tape[(start + i) % len];
            if used + cell.width > self.width {
                break;
            }
            out.push_str(&cell.text);
            used += cell.width;
            if used == self.width {
                break;
            }
        }
        out.extend(std::iter::repeat_n(' ', self.width - used));
        out
    }

    #[must_use]
    pub fn tape(&self) -> String {
        self.tape.iter().map(|cell| cell.text.as_str()).collect()
    }

    /// Tape length in grapheme cells.
    #[must_use]
    pub fn tape_len(&self) -> usize {
        self.tape.len()
    }

    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Jump to `offset`, reduced modulo the tape length.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = self.wrap(offset);
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Negative or non-finite speeds become 0.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = sanitize_speed(speed);
    }
}

fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        0.0
    }
}

/// Strip markup, turn control characters into spaces and drop clusters
/// with no width.
fn sanitize(message: &str) -> String {
    strip_markup(message)
        .graphemes(true)
        .filter_map(|g| {
            if g.chars().any(char::is_control) {
                Some(" ")
            } else if display_width(g) == 0 {
                None
            } else {
                Some(g)
            }
        })
        .collect()
}
