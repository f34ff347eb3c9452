#![forbid(unsafe_code)]

//! Screen assembly.
//!
//! The compositor stacks the kernel-owned regions and the active process's
//! content into one fixed-height, fixed-width [`Screen`]:
//!
//! ```text
//! ┌──────────────┐
//! │ header       │
//! ├──────────────┤
//! │ ticker       │
//! ├──────────────┤
//! │ content × R  │
//! ├──────────────┤
//! │ footer       │
//! └──────────────┘
//! ```
//!
//! Header, ticker and footer are padded here. Content rows are trusted to be
//! exactly `width` columns already and pass through unchanged; the frame only
//! guarantees the row count.

use std::fmt;

use phosphor_text::{Align, blank_row, markup, pad, strip_markup};
use tracing::debug;

use crate::process::{Content, Viewport};

/// Characters used to draw the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSet {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    /// Left end of a separator line.
    pub tee_left: char,
    /// Right end of a separator line.
    pub tee_right: char,
}

impl BorderSet {
    pub const SINGLE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
        tee_left: '├',
        tee_right: '┤',
    };

    pub const DOUBLE: Self = Self {
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
        horizontal: '═',
        vertical: '║',
        tee_left: '╠',
        tee_right: '╣',
    };

    pub const ASCII: Self = Self {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        horizontal: '-',
        vertical: '|',
        tee_left: '+',
        tee_right: '+',
    };

    /// Look up a preset by name: `single`, `double` or `ascii`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "single" => Some(Self::SINGLE),
            "double" => Some(Self::DOUBLE),
            "ascii" => Some(Self::ASCII),
            _ => None,
        }
    }
}

/// The four regions of one frame.
#[derive(Debug, Clone, Copy)]
pub struct Regions<'a> {
    pub header: &'a str,
    pub ticker: &'a str,
    pub content: &'a Content,
    pub footer: &'a str,
}

/// One composed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    lines: Vec<String>,
}

impl Screen {
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Lines with markup removed.
    #[must_use]
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|l| strip_markup(l).into_owned())
            .collect()
    }

    /// Whether any plain line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| strip_markup(l).contains(needle))
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Fixed-size frame builder.
#[derive(Debug, Clone)]
pub struct Compositor {
    width: usize,
    rows: usize,
    border: Option<BorderSet>,
    accent: Option<String>,
}

impl Compositor {
    /// `width` visible columns inside the frame, `rows` content rows.
    #[must_use]
    pub fn new(width: usize, rows: usize) -> Self {
        Self {
            width,
            rows,
            border: None,
            accent: None,
        }
    }

    #[must_use]
    pub fn with_border(mut self, border: Option<BorderSet>) -> Self {
        self.border = border;
        self
    }

    /// Colour for the frame characters.
    #[must_use]
    pub fn with_accent(mut self, accent: Option<String>) -> Self {
        self.accent = accent;
        self
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.rows)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Visible columns of every output line.
    #[must_use]
    pub fn outer_width(&self) -> usize {
        match self.border {
            Some(_) => self.width + 2,
            None => self.width,
        }
    }

    /// Number of lines in every composed screen.
    #[must_use]
    pub fn height(&self) -> usize {
        match self.border {
            Some(_) => self.rows + 8,
            None => self.rows + 6,
        }
    }

    #[must_use]
    pub fn compose(&self, regions: &Regions<'_>) -> Screen {
        let mut lines = Vec::with_capacity(self.height());

        if let Some(b) = &self.border {
            lines.push(self.rule(b.top_left, b.horizontal, b.top_right));
        }
        lines.push(self.framed(pad(regions.header, self.width, Align::Left)));
        lines.push(self.separator());
        lines.push(self.framed(pad(regions.ticker, self.width, Align::Left)));
        lines.push(self.separator());

        let rows = regions.content.rows();
        if rows.len() > self.rows {
            debug!(
                supplied = rows.len(),
                capacity = self.rows,
                "content rows dropped"
            );
        }
        for i in 0..self.rows {
            let row = rows.get(i).cloned().unwrap_or_else(|| blank_row(self.width));
            lines.push(self.framed(row));
        }

        lines.push(self.separator());
        lines.push(self.framed(pad(regions.footer, self.width, Align::Left)));
        if let Some(b) = &self.border {
            lines.push(self.rule(b.bottom_left, b.horizontal, b.bottom_right));
        }

        Screen { lines }
    }

    fn accented(&self, text: String) -> String {
        match &self.accent {
            Some(accent) => markup::color(accent, &text),
            None => text,
        }
    }

    fn rule(&self, left: char, fill: char, right: char) -> String {
        let mut line = String::with_capacity((self.width + 2) * 3);
        line.push(left);
        line.extend(std::iter::repeat_n(fill, self.width));
        line.push(right);
        self.accented(line)
    }

    fn separator(&self) -> String {
        match &self.border {
            Some(b) => self.rule(b.tee_left, b.horizontal, b.tee_right),
            None => "-".repeat(self.width),
        }
    }

    fn framed(&self, inner: String) -> String {
        match &self.border {
            Some(b) => {
                let edge = self.accented(b.vertical.to_string());
                format!("{edge}{inner}{edge}")
            }
            None => inner,
        }
    }
}
