#![forbid(unsafe_code)]

//! Commands returned by processes.
//!
//! A process never reaches into the kernel. Everything it wants done outside
//! its own state is described by a [`Cmd`] and applied by the kernel after
//! the call returns.
//!
//! ```
//! use std::time::Duration;
//! use phosphor_runtime::Cmd;
//!
//! let cmd = Cmd::batch(vec![
//!     Cmd::redraw(),
//!     Cmd::every(1, Duration::from_secs(2)),
//!     Cmd::announce("SIGNAL ACQUIRED"),
//! ]);
//! assert_eq!(cmd.type_name(), "Batch");
//! ```

use std::time::Duration;

use crate::process::Pid;
use crate::scheduler::{TimerId, Trigger};

/// A timer request: which id, and when it fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSpec {
    pub id: TimerId,
    pub trigger: Trigger,
}

/// Effect requested by a process.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cmd {
    /// No operation.
    #[default]
    None,
    /// Re-render the active process and refresh the screen.
    Redraw,
    /// Switch to another process. Honoured only from `handle_input`.
    Switch(Pid),
    /// Switch to the home process. Honoured only from `handle_input`.
    Home,
    /// Arm (or re-arm) a timer owned by the calling process.
    Schedule(TimerSpec),
    /// Cancel a timer owned by the calling process.
    Cancel(TimerId),
    /// Append a message to the ticker.
    Announce(String),
    /// Write a line to the log.
    Log(String),
    /// Stop the console.
    Quit,
    /// Several commands, applied in order.
    Batch(Vec<Cmd>),
}

impl Cmd {
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    #[must_use]
    pub fn redraw() -> Self {
        Self::Redraw
    }

    #[inline]
    #[must_use]
    pub fn switch(pid: Pid) -> Self {
        Self::Switch(pid)
    }

    #[inline]
    #[must_use]
    pub fn home() -> Self {
        Self::Home
    }

    #[inline]
    #[must_use]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Fire once after `delay` of virtual time.
    #[must_use]
    pub fn after(id: TimerId, delay: Duration) -> Self {
        Self::Schedule(TimerSpec {
            id,
            trigger: Trigger::After(delay),
        })
    }

    /// Fire once after `frames` calls to the kernel's `advance`.
    #[must_use]
    pub fn after_frames(id: TimerId, frames: u32) -> Self {
        Self::Schedule(TimerSpec {
            id,
            trigger: Trigger::AfterFrames(frames),
        })
    }

    /// Fire every `period` until cancelled or the owner closes.
    #[must_use]
    pub fn every(id: TimerId, period: Duration) -> Self {
        Self::Schedule(TimerSpec {
            id,
            trigger: Trigger::Every(period),
        })
    }

    #[must_use]
    pub fn cancel(id: TimerId) -> Self {
        Self::Cancel(id)
    }

    #[must_use]
    pub fn announce(message: impl Into<String>) -> Self {
        Self::Announce(message.into())
    }

    #[must_use]
    pub fn log(line: impl Into<String>) -> Self {
        Self::Log(line.into())
    }

    /// Combine commands. Empty input collapses to `None`, a single
    /// command is returned unwrapped.
    #[must_use]
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Variant name, for logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Redraw => "Redraw",
            Self::Switch(_) => "Switch",
            Self::Home => "Home",
            Self::Schedule(_) => "Schedule",
            Self::Cancel(_) => "Cancel",
            Self::Announce(_) => "Announce",
            Self::Log(_) => "Log",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_collapses() {
        assert_eq!(Cmd::batch(vec![]), Cmd::None);
        assert_eq!(Cmd::batch(vec![Cmd::redraw()]), Cmd::Redraw);
        assert_eq!(Cmd::batch(vec![Cmd::none(), Cmd::quit()]), Cmd::Quit);
        assert_eq!(
            Cmd::batch(vec![Cmd::redraw(), Cmd::quit()]),
            Cmd::Batch(vec![Cmd::Redraw, Cmd::Quit])
        );
    }

    #[test]
    fn timer_helpers() {
        assert_eq!(
            Cmd::after(7, Duration::from_millis(250)),
            Cmd::Schedule(TimerSpec {
                id: 7,
                trigger: Trigger::After(Duration::from_millis(250)),
            })
        );
        assert_eq!(
            Cmd::after_frames(2, 3),
            Cmd::Schedule(TimerSpec {
                id: 2,
                trigger: Trigger::AfterFrames(3),
            })
        );
        assert_eq!(Cmd::cancel(7), Cmd::Cancel(7));
    }

    #[test]
    fn type_names() {
        assert_eq!(Cmd::default().type_name(), "None");
        assert_eq!(Cmd::home().type_name(), "Home");
        assert_eq!(Cmd::switch(Pid::new(1)).type_name(), "Switch");
        assert_eq!(Cmd::announce("x").type_name(), "Announce");
        assert_eq!(Cmd::log("x").type_name(), "Log");
        assert_eq!(Cmd::every(1, Duration::from_secs(1)).type_name(), "Schedule");
    }
}
