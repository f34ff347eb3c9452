#![forbid(unsafe_code)]

//! Phosphor Runtime
//!
//! The runtime that hosts console applications on one shared, fixed-size
//! text display.
//!
//! # Key Components
//!
//! - [`Kernel`] - Owns every process, routes keys to the active one, drives
//!   the display
//! - [`Process`] - Trait every console application implements
//! - [`Cmd`] - Effects a process asks the kernel to perform
//! - [`Compositor`] - Stacks header, ticker, content and footer into a [`Screen`]
//! - [`Ticker`] - Scrolling marquee over a circular tape
//! - [`Scheduler`] - Cancellable one-shot and periodic timers on a virtual clock
//! - [`Surface`] - Where composed frames go
//!
//! # Control flow
//!
//! A raw key is normalized to a [`Key`] and passed by value to the active
//! process's `handle_input`. The kernel applies the returned [`Cmd`], renders
//! the process into a [`Content`] block, composites the frame and presents
//! it. Time is driven separately through [`Kernel::advance`], which scrolls
//! the ticker and fires timers.

pub mod cmd;
pub mod compositor;
pub mod kernel;
pub mod key;
pub mod process;
pub mod scheduler;
pub mod surface;
pub mod ticker;

pub use cmd::{Cmd, TimerSpec};
pub use compositor::{BorderSet, Compositor, Regions, Screen};
pub use kernel::{Kernel, KernelConfig, KernelStats, format_uptime};
pub use key::{Key, RawKey};
pub use process::{Content, Pid, Process, Viewport};
pub use scheduler::{Fired, Owner, Scheduler, TimerId, Trigger};
pub use surface::{MemorySurface, Surface};
pub use ticker::{ANNOUNCEMENT_LIMIT, FALLBACK_MESSAGE, SEPARATOR, Ticker};
