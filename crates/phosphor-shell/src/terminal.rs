#![forbid(unsafe_code)]

//! Crossterm front end.
//!
//! [`TerminalSession`] puts the terminal into raw mode on the alternate
//! screen and restores it on drop (or panic). [`TerminalSurface`] draws each
//! composed frame as a full replace, translating markup spans to crossterm
//! colours and attributes.

use std::io::{self, Write};
use std::sync::OnceLock;

use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::{cursor, queue, terminal};
use phosphor_runtime::{Screen, Surface};
use phosphor_text::{SpanStyle, parse_spans};

/// Raw mode, alternate screen and hidden cursor for the session lifetime.
#[derive(Debug)]
pub struct TerminalSession {
    alternate_screen: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen, hide the cursor.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen: false,
        };
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        session.alternate_screen = true;
        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = crossterm::execute!(stdout, cursor::Show);
        if self.alternate_screen {
            let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
            self.alternate_screen = false;
        }
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
        tracing::info!("terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, ResetColor, cursor::Show);
    let _ = crossterm::execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Draws frames to any writer with crossterm commands.
#[derive(Debug)]
pub struct TerminalSurface<W: Write> {
    out: W,
    /// Foreground used for text without an explicit colour.
    base: Option<Color>,
}

impl<W: Write> TerminalSurface<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out, base: None }
    }

    /// Default text colour, e.g. phosphor green.
    #[must_use]
    pub fn with_base_color(mut self, color: Option<Color>) -> Self {
        self.base = color;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn queue_style(&mut self, style: &SpanStyle) -> io::Result<()> {
        let fg = style
            .fg
            .map(|c| Color::Rgb {
                r: c.r,
                g: c.g,
                b: c.b,
            })
            .or(self.base);
        if let Some(fg) = fg {
            queue!(self.out, SetForegroundColor(fg))?;
        }
        let attributes = [
            (style.bold, Attribute::Bold),
            (style.italic, Attribute::Italic),
            (style.underline, Attribute::Underlined),
            (style.strike, Attribute::CrossedOut),
            (style.reverse, Attribute::Reverse),
            (style.blink, Attribute::SlowBlink),
        ];
        for (on, attribute) in attributes {
            if on {
                queue!(self.out, SetAttribute(attribute))?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn present(&mut self, screen: &Screen) -> io::Result<()> {
        for (row, line) in screen.lines().iter().enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            queue!(self.out, cursor::MoveTo(0, row))?;
            for span in parse_spans(line) {
                self.queue_style(&span.style)?;
                queue!(
                    self.out,
                    Print(&span.text),
                    SetAttribute(Attribute::Reset),
                    ResetColor
                )?;
            }
            queue!(self.out, terminal::Clear(terminal::ClearType::UntilNewLine))?;
        }
        queue!(
            self.out,
            terminal::Clear(terminal::ClearType::FromCursorDown)
        )?;
        self.out.flush()
    }
}
