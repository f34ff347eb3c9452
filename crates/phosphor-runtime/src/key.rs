#![forbid(unsafe_code)]

//! Input keys.
//!
//! The console is driven by exactly five logical keys. Terminal input arrives
//! as a [`RawKey`] and is normalized by [`RawKey::normalize`]; anything that
//! doesn't map onto the fixed set is dropped by the kernel.
//!
//! | Logical | Raw keys |
//! |---------|----------|
//! | `Up`     | Up arrow, `w`, `k` |
//! | `Down`   | Down arrow, `s`, `j` |
//! | `Left`   | Left arrow, `a`, `h` |
//! | `Right`  | Right arrow, `d`, `l` |
//! | `Accept` | Enter, Space |

use crossterm::event as cte;

/// Logical console key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Accept,
}

impl Key {
    /// Every key, in display order.
    pub const ALL: [Key; 5] = [Key::Up, Key::Down, Key::Left, Key::Right, Key::Accept];

    /// Upper-case label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Key::Up => "UP",
            Key::Down => "DOWN",
            Key::Left => "LEFT",
            Key::Right => "RIGHT",
            Key::Accept => "ACCEPT",
        }
    }

    /// Parse a key label (case-insensitive). `ENTER` is accepted for `ACCEPT`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "UP" => Some(Key::Up),
            "DOWN" => Some(Key::Down),
            "LEFT" => Some(Key::Left),
            "RIGHT" => Some(Key::Right),
            "ACCEPT" | "ENTER" => Some(Key::Accept),
            _ => None,
        }
    }

    /// `-1` for `Up`, `+1` for `Down`, `0` otherwise.
    #[must_use]
    pub const fn vertical_delta(self) -> isize {
        match self {
            Key::Up => -1,
            Key::Down => 1,
            _ => 0,
        }
    }

    /// `-1` for `Left`, `+1` for `Right`, `0` otherwise.
    #[must_use]
    pub const fn horizontal_delta(self) -> isize {
        match self {
            Key::Left => -1,
            Key::Right => 1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal-level key before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Function(u8),
    Char(char),
    /// Anything else, including modified characters.
    Other,
}

impl RawKey {
    /// Map onto the fixed logical key set.
    #[must_use]
    pub fn normalize(self) -> Option<Key> {
        match self {
            RawKey::Up => Some(Key::Up),
            RawKey::Down => Some(Key::Down),
            RawKey::Left => Some(Key::Left),
            RawKey::Right => Some(Key::Right),
            RawKey::Enter => Some(Key::Accept),
            RawKey::Char(c) => match c.to_ascii_lowercase() {
                'w' | 'k' => Some(Key::Up),
                's' | 'j' => Some(Key::Down),
                'a' | 'h' => Some(Key::Left),
                'd' | 'l' => Some(Key::Right),
                ' ' => Some(Key::Accept),
                _ => None,
            },
            RawKey::Esc
            | RawKey::Tab
            | RawKey::BackTab
            | RawKey::Backspace
            | RawKey::Function(_)
            | RawKey::Other => None,
        }
    }

    /// Convert a Crossterm key event.
    ///
    /// Release events yield `None`. Characters typed with Ctrl or Alt held
    /// become [`RawKey::Other`] so shortcuts never alias navigation keys.
    #[must_use]
    pub fn from_crossterm(event: &cte::KeyEvent) -> Option<Self> {
        if event.kind == cte::KeyEventKind::Release {
            return None;
        }
        let modified = event
            .modifiers
            .intersects(cte::KeyModifiers::CONTROL | cte::KeyModifiers::ALT);
        let raw = match event.code {
            cte::KeyCode::Up => RawKey::Up,
            cte::KeyCode::Down => RawKey::Down,
            cte::KeyCode::Left => RawKey::Left,
            cte::KeyCode::Right => RawKey::Right,
            cte::KeyCode::Enter => RawKey::Enter,
            cte::KeyCode::Esc => RawKey::Esc,
            cte::KeyCode::Tab => RawKey::Tab,
            cte::KeyCode::BackTab => RawKey::BackTab,
            cte::KeyCode::Backspace => RawKey::Backspace,
            cte::KeyCode::F(n) => RawKey::Function(n),
            cte::KeyCode::Char(_) if modified => RawKey::Other,
            cte::KeyCode::Char(c) => RawKey::Char(c),
            _ => RawKey::Other,
        };
        Some(raw)
    }
}

impl From<Key> for RawKey {
    fn from(key: Key) -> Self {
        match key {
            Key::Up => RawKey::Up,
            Key::Down => RawKey::Down,
            Key::Left => RawKey::Left,
            Key::Right => RawKey::Right,
            Key::Accept => RawKey::Enter,
        }
    }
}
