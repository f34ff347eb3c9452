#![forbid(unsafe_code)]

//! Tabbed repository browser.
//!
//! LEFT/RIGHT cycle tabs (wrapping); UP/DOWN scroll the page, clamped to
//! the page length. ACCEPT returns to the menu. The scroll bound comes from
//! the console geometry given at construction, never from the last render.

use phosphor_runtime::{Cmd, Content, Key, Process, Viewport};
use phosphor_text::{Align, markup, pad, wrap_words};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub title: String,
    pub body: String,
}

impl Tab {
    #[must_use]
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepoBrowser {
    tabs: Vec<Tab>,
    tab: usize,
    scroll: usize,
    /// Console content region the pages are laid out for.
    page: Viewport,
}

impl RepoBrowser {
    pub const NAME: &'static str = "repos";

    /// Header rows above the page body: tab bar and rule.
    const CHROME_ROWS: usize = 2;

    #[must_use]
    pub fn new(tabs: Vec<Tab>, page: Viewport) -> Self {
        Self {
            tabs,
            tab: 0,
            scroll: 0,
            page,
        }
    }

    #[must_use]
    pub fn builtin(page: Viewport) -> Self {
        let tabs = vec![
            Tab::new(
                "README",
                "PHOSPHOR CONSOLE\n\nA shared terminal hosting one application at a time. \
                 Navigate with the arrow keys or WASD, select with ENTER or SPACE.",
            ),
            Tab::new(
                "CHANGELOG",
                "0.1.0\n- Dispatch kernel with single active process\n- Scrolling ticker\n\
                 - Menu shell with wrapping cursor\n- Dashboard, log, holotape and repository \
                 applications\n\n0.0.9\n- Cooperative timers replace self-rescheduling callbacks\n\
                 - Keys are passed to processes directly",
            ),
            Tab::new(
                "LICENSE",
                "MIT License. Permission is hereby granted, free of charge, to any person \
                 obtaining a copy of this software, to deal in the software without restriction.",
            ),
        ];
        Self::new(tabs, page)
    }

    #[must_use]
    pub fn tab(&self) -> usize {
        self.tab
    }

    #[must_use]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    fn max_scroll(&self) -> usize {
        let Some(tab) = self.tabs.get(self.tab) else {
            return 0;
        };
        let lines = wrap_words(&tab.body, self.page.width).len();
        lines.saturating_sub(self.page.rows.saturating_sub(Self::CHROME_ROWS))
    }

    fn switch_tab(&mut self, delta: isize) {
        let n = self.tabs.len() as isize;
        if n == 0 {
            return;
        }
        self.tab = (self.tab as isize + delta).rem_euclid(n) as usize;
        self.scroll = 0;
    }

    fn tab_bar(&self, width: usize) -> String {
        let mut bar = String::new();
        for (i, tab) in self.tabs.iter().enumerate() {
            let label = format!(" {} ", tab.title);
            if i == self.tab {
                bar.push_str(&markup::mark(&label));
            } else {
                bar.push_str(&label);
            }
        }
        pad(&bar, width, Align::Left)
    }
}

impl Process for RepoBrowser {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle_input(&mut self, key: Key) -> Cmd {
        match key {
            Key::Left | Key::Right => self.switch_tab(key.horizontal_delta()),
            Key::Up => self.scroll = self.scroll.saturating_sub(1),
            Key::Down => self.scroll = (self.scroll + 1).min(self.max_scroll()),
            Key::Accept => return Cmd::home(),
        }
        Cmd::none()
    }

    fn render(&self, viewport: Viewport) -> Content {
        let mut content = Content::with_capacity(viewport.rows);
        content.push(self.tab_bar(viewport.width));
        content.push("-".repeat(viewport.width));

        let Some(tab) = self.tabs.get(self.tab) else {
            return content;
        };
        let lines = wrap_words(&tab.body, viewport.width);
        let rows = viewport.rows.saturating_sub(Self::CHROME_ROWS);

        for line in lines.iter().skip(self.scroll).take(rows) {
            content.push_padded(line, viewport, Align::Left);
        }
        content
    }
}
