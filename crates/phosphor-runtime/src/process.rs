#![forbid(unsafe_code)]

//! The process contract.
//!
//! Every console application implements [`Process`]. The kernel owns all
//! processes, keeps at most one of them open, and is the only thing that
//! calls into them:
//!
//! 1. `open()` when the kernel switches to the process
//! 2. `handle_input(key)` for each normalized key while it is active
//! 3. `on_timer(id)` when one of its timers fires while it is active
//! 4. `render(viewport)` after every input and whenever it asks to redraw
//! 5. `close()` when the kernel switches away
//!
//! Processes never hold references to each other. Cross-process effects
//! (switching, scheduling, announcing) are requested by returning a
//! [`Cmd`](crate::Cmd).

use std::fmt;

use phosphor_text::{Align, pad};

use crate::cmd::Cmd;
use crate::scheduler::TimerId;
use crate::key::Key;

/// Handle to a process in the kernel's process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(usize);

impl Pid {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the process table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid:{}", self.0)
    }
}

/// Size of the content region a process renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Visible columns every row must occupy.
    pub width: usize,
    /// Number of rows the content region holds.
    pub rows: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: usize, rows: usize) -> Self {
        Self { width, rows }
    }
}

/// Rendered output of a process.
///
/// Each row is expected to be exactly `Viewport::width` visible columns.
/// The compositor does not re-check this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    rows: Vec<String>,
}

impl Content {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            rows: Vec::with_capacity(rows),
        }
    }

    #[must_use]
    pub fn from_rows(rows: Vec<String>) -> Self {
        Self { rows }
    }

    /// Append a row as-is.
    pub fn push(&mut self, row: impl Into<String>) {
        self.rows.push(row.into());
    }

    /// Append `text` padded to the viewport width.
    pub fn push_padded(&mut self, text: &str, viewport: Viewport, align: Align) {
        self.rows.push(pad(text, viewport.width, align));
    }

    /// Append a row of spaces.
    pub fn push_blank(&mut self, viewport: Viewport) {
        self.rows.push(phosphor_text::blank_row(viewport.width));
    }

    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<String> {
        self.rows
    }
}

impl From<Vec<String>> for Content {
    fn from(rows: Vec<String>) -> Self {
        Self::from_rows(rows)
    }
}

/// A pluggable console application.
pub trait Process {
    /// Name used for lookup (case-insensitive) and shown in the header.
    fn name(&self) -> &str;

    /// Called when the kernel makes this process active.
    ///
    /// Free to reset or preserve internal state. Returned commands may
    /// schedule timers; switch requests are ignored here.
    fn open(&mut self) -> Cmd {
        Cmd::none()
    }

    /// Handle one normalized key. The kernel re-renders afterwards.
    fn handle_input(&mut self, key: Key) -> Cmd;

    /// Called when the kernel switches away. Timers are already cancelled.
    fn close(&mut self) {}

    /// Render the content region.
    fn render(&self, viewport: Viewport) -> Content;

    /// A timer scheduled by this process fired.
    fn on_timer(&mut self, _id: TimerId) -> Cmd {
        Cmd::none()
    }
}
