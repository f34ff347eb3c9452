#![forbid(unsafe_code)]

//! The menu shell and its process registry.
//!
//! The registry is the ordered list of launchable entries with a wrapping
//! cursor. The shell is the home process that renders it and turns ACCEPT
//! into a switch request.
//!
//! The cursor is kept across close and reopen, so returning from an
//! application lands on the entry that launched it.

use phosphor_runtime::{Cmd, Content, Key, Pid, Process, Viewport};
use phosphor_text::{Align, markup, pad, truncate_with_ellipsis};
use tracing::{debug, warn};

/// Marker column width.
const MARKER_WIDTH: usize = 2;
/// Type tag column width, e.g. `<APP>` plus padding.
const TYPE_WIDTH: usize = 7;
/// Name column width.
const NAME_WIDTH: usize = 14;

/// One launchable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    pub type_tag: String,
    pub description: String,
    /// `None` when the configured process does not exist.
    pub target: Option<Pid>,
}

impl RegistryEntry {
    #[must_use]
    pub fn new(name: &str, type_tag: &str, description: &str, target: Option<Pid>) -> Self {
        Self {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            description: description.to_string(),
            target,
        }
    }
}

/// Ordered entries with a cursor always in `[0, len)`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    cursor: usize,
}

impl Registry {
    #[must_use]
    pub fn new(entries: Vec<RegistryEntry>) -> Self {
        Self { entries, cursor: 0 }
    }

    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor by `delta`, wrapping at both ends. No-op when empty.
    pub fn move_cursor(&mut self, delta: isize) {
        let n = self.entries.len();
        if n == 0 {
            return;
        }
        let n = n as isize;
        self.cursor = (self.cursor as isize + delta.rem_euclid(n)).rem_euclid(n) as usize;
    }

    #[must_use]
    pub fn selected(&self) -> Option<&RegistryEntry> {
        self.entries.get(self.cursor)
    }

    /// The target of the selected entry, if it has one.
    ///
    /// An out-of-range cursor or a missing target is logged and yields
    /// `None`.
    pub fn select_current(&self) -> Option<Pid> {
        let Some(entry) = self.entries.get(self.cursor) else {
            warn!(cursor = self.cursor, len = self.entries.len(), "menu cursor out of range");
            return None;
        };
        if entry.target.is_none() {
            warn!(entry = %entry.name, "menu entry has no target process");
        }
        entry.target
    }
}

/// The home process: a menu over a [`Registry`].
#[derive(Debug, Clone)]
pub struct Shell {
    registry: Registry,
}

impl Shell {
    pub const NAME: &'static str = "menu";

    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn column_labels(width: usize) -> String {
        let labels = format!(
            "{}{}{}DESCRIPTION",
            " ".repeat(MARKER_WIDTH),
            pad("TYPE", TYPE_WIDTH, Align::Left),
            pad("NAME", NAME_WIDTH, Align::Left),
        );
        markup::bold(&pad(&labels, width, Align::Left))
    }

    fn entry_row(entry: &RegistryEntry, selected: bool, width: usize) -> String {
        let used = MARKER_WIDTH + TYPE_WIDTH + NAME_WIDTH;
        let description = truncate_with_ellipsis(&entry.description, width.saturating_sub(used));
        let row = format!(
            "{}{}{}{}",
            if selected { "> " } else { "  " },
            pad(&entry.type_tag, TYPE_WIDTH, Align::Left),
            pad(&entry.name, NAME_WIDTH, Align::Left),
            description,
        );
        let row = pad(&row, width, Align::Left);
        if selected { markup::mark(&row) } else { row }
    }

    /// First entry shown so the cursor stays inside `visible` rows.
    fn scroll_start(&self, visible: usize) -> usize {
        let cursor = self.registry.cursor();
        if visible == 0 || cursor < visible {
            0
        } else {
            cursor + 1 - visible
        }
    }
}

impl Process for Shell {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn open(&mut self) -> Cmd {
        debug!(cursor = self.registry.cursor(), "menu opened");
        Cmd::none()
    }

    fn handle_input(&mut self, key: Key) -> Cmd {
        match key {
            Key::Up | Key::Down => {
                self.registry.move_cursor(key.vertical_delta());
                Cmd::none()
            }
            Key::Accept => self.registry.select_current().map_or(Cmd::none(), Cmd::switch),
            Key::Left | Key::Right => Cmd::none(),
        }
    }

    fn render(&self, viewport: Viewport) -> Content {
        let mut content = Content::with_capacity(viewport.rows);
        if viewport.rows == 0 {
            return content;
        }
        content.push(Self::column_labels(viewport.width));

        if self.registry.is_empty() {
            content.push_padded("  NO ENTRIES", viewport, Align::Left);
            return content;
        }

        let visible = viewport.rows - 1;
        let start = self.scroll_start(visible);
        let cursor = self.registry.cursor();
        for (i, entry) in self
            .registry
            .entries()
            .iter()
            .enumerate()
            .skip(start)
            .take(visible)
        {
            content.push(Self::entry_row(entry, i == cursor, viewport.width));
        }
        content
    }
}
