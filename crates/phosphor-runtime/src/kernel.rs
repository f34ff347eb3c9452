#![forbid(unsafe_code)]

//! The dispatch kernel.
//!
//! The kernel owns every process, tracks the single active one, routes keys
//! to it, applies the [`Cmd`]s it returns, and asks the compositor for a new
//! frame whenever anything visible changes.
//!
//! # Switching
//!
//! `switch_to(target)` runs, in order: cancel the old process's timers,
//! `close()` it, discard its content, mark `target` active, `open()` it,
//! apply the commands `open` returned, render, refresh. Keys are delivered
//! synchronously one at a time, so no process can see input between the
//! old process's close and the new one's open.
//!
//! # Time
//!
//! `advance(dt)` is one frame: the ticker scrolls, due timers fire, and the
//! screen is refreshed. Process timers are delivered only while their owner
//! is active; closing a process cancels all of them. A timer cancelled by a
//! handler earlier in the same frame is not delivered.

use std::io;
use std::time::Duration;

use phosphor_text::visible_width;
use tracing::{debug, info, warn};

use crate::cmd::Cmd;
use crate::compositor::{BorderSet, Compositor, Regions, Screen};
use crate::key::{Key, RawKey};
use crate::process::{Content, Pid, Process, Viewport};
use crate::scheduler::{Owner, Scheduler, TimerId, Trigger};
use crate::surface::Surface;
use crate::ticker::{ANNOUNCEMENT_LIMIT, Ticker};

/// Kernel timer driving the footer cursor blink.
const BLINK_TIMER: TimerId = 0;

/// Console configuration.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Shown on the left of the header.
    pub title: String,
    /// Visible columns of every region.
    pub width: usize,
    /// Rows in the content region.
    pub rows: usize,
    pub ticker_messages: Vec<String>,
    /// Ticker speed in columns per second.
    pub ticker_speed: f64,
    /// Announcements kept on the ticker before the oldest is dropped.
    pub announcement_limit: usize,
    /// Zero disables the blink.
    pub blink_interval: Duration,
    pub prompt: String,
    pub border: Option<BorderSet>,
    /// Frame colour, e.g. `#33ff33`.
    pub accent: Option<String>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            title: "PHOSPHOR".to_string(),
            width: 60,
            rows: 16,
            ticker_messages: Vec::new(),
            ticker_speed: 8.0,
            announcement_limit: ANNOUNCEMENT_LIMIT,
            blink_interval: Duration::from_millis(500),
            prompt: ">".to_string(),
            border: None,
            accent: None,
        }
    }
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelStats {
    pub switches: u64,
    pub keys_routed: u64,
    pub keys_dropped: u64,
    pub pushes: u64,
    pub pushes_rejected: u64,
    pub timers_fired: u64,
    pub refreshes: u64,
}

/// Where a command came from. Switches are only honoured from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Open,
    Input,
    Timer,
}

#[derive(Debug, Default)]
struct Effects {
    redraw: bool,
    switch: Option<Pid>,
    quit: bool,
}

/// Active-process tracker, input router and display driver.
pub struct Kernel<S: Surface> {
    config: KernelConfig,
    processes: Vec<Box<dyn Process>>,
    active: Option<Pid>,
    home: Option<Pid>,
    content: Content,
    ticker: Ticker,
    compositor: Compositor,
    scheduler: Scheduler,
    surface: S,
    blink_on: bool,
    running: bool,
    stats: KernelStats,
}

impl<S: Surface> Kernel<S> {
    #[must_use]
    pub fn new(config: KernelConfig, surface: S) -> Self {
        let mut ticker = Ticker::new(
            config.ticker_messages.clone(),
            config.width,
            config.ticker_speed,
        );
        ticker.set_announcement_limit(config.announcement_limit);
        let compositor = Compositor::new(config.width, config.rows)
            .with_border(config.border)
            .with_accent(config.accent.clone());
        Self {
            config,
            processes: Vec::new(),
            active: None,
            home: None,
            content: Content::new(),
            ticker,
            compositor,
            scheduler: Scheduler::new(),
            surface,
            blink_on: true,
            running: false,
            stats: KernelStats::default(),
        }
    }

    // ── Process table ───────────────────────────────────────────────────

    /// Add a process to the table. It stays closed until switched to.
    pub fn spawn(&mut self, process: impl Process + 'static) -> Pid {
        self.spawn_boxed(Box::new(process))
    }

    pub fn spawn_boxed(&mut self, process: Box<dyn Process>) -> Pid {
        let pid = Pid::new(self.processes.len());
        debug!(%pid, name = process.name(), "process spawned");
        self.processes.push(process);
        pid
    }

    /// Look up a process by name, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Pid> {
        self.processes
            .iter()
            .position(|p| p.name().eq_ignore_ascii_case(name))
            .map(Pid::new)
    }

    #[must_use]
    pub fn process_name(&self, pid: Pid) -> Option<&str> {
        self.processes.get(pid.index()).map(|p| p.name())
    }

    #[must_use]
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Set the process `Cmd::Home` and `boot` switch to.
    pub fn set_home(&mut self, pid: Pid) -> bool {
        if pid.index() >= self.processes.len() {
            warn!(%pid, "home process does not exist");
            return false;
        }
        self.home = Some(pid);
        true
    }

    #[must_use]
    pub fn home(&self) -> Option<Pid> {
        self.home
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Start the console: arm the blink and open the home process.
    pub fn boot(&mut self) -> io::Result<()> {
        self.running = true;
        if !self.config.blink_interval.is_zero() {
            self.scheduler.schedule(
                Owner::Kernel,
                BLINK_TIMER,
                Trigger::Every(self.config.blink_interval),
            );
        }
        info!(
            processes = self.processes.len(),
            width = self.config.width,
            rows = self.config.rows,
            "kernel booted"
        );
        match self.home {
            Some(home) => self.switch_to(home).map(|_| ()),
            None => {
                warn!("no home process set");
                self.refresh()
            }
        }
    }

    /// Close the active process and stop every timer.
    pub fn shutdown(&mut self) {
        if let Some(pid) = self.active.take() {
            self.scheduler.cancel_owner(Owner::Process(pid));
            self.processes[pid.index()].close();
        }
        self.scheduler.clear();
        self.content = Content::new();
        self.running = false;
        info!(
            switches = self.stats.switches,
            keys = self.stats.keys_routed,
            "kernel shut down"
        );
    }

    /// Make `target` the active process. Returns `false` for an unknown pid.
    pub fn switch_to(&mut self, target: Pid) -> io::Result<bool> {
        if target.index() >= self.processes.len() {
            warn!(%target, "switch to unknown process ignored");
            return Ok(false);
        }

        let from = self.active.take();
        if let Some(old) = from {
            self.scheduler.cancel_owner(Owner::Process(old));
            self.processes[old.index()].close();
        }
        self.content = Content::new();
        self.active = Some(target);
        self.stats.switches += 1;
        info!(
            from = from.and_then(|p| self.process_name(p)).unwrap_or("-"),
            to = self.processes[target.index()].name(),
            "switch"
        );

        let cmd = self.processes[target.index()].open();
        let effects = self.apply(target, cmd, Origin::Open);
        if effects.quit {
            self.running = false;
        }
        self.redraw()?;
        Ok(true)
    }

    /// Switch to the home process, if one is set.
    pub fn go_home(&mut self) -> io::Result<bool> {
        match self.home {
            Some(home) => self.switch_to(home),
            None => {
                warn!("go home requested without a home process");
                Ok(false)
            }
        }
    }

    // ── Input ───────────────────────────────────────────────────────────

    /// Normalize a terminal key and deliver it. Unrecognized keys are dropped.
    pub fn route_input(&mut self, raw: RawKey) -> io::Result<()> {
        match raw.normalize() {
            Some(key) => self.dispatch_key(key),
            None => {
                self.stats.keys_dropped += 1;
                debug!(?raw, "unrecognized key dropped");
                Ok(())
            }
        }
    }

    /// Deliver one logical key to the active process.
    pub fn dispatch_key(&mut self, key: Key) -> io::Result<()> {
        let Some(pid) = self.active else {
            self.stats.keys_dropped += 1;
            debug!(%key, "key dropped, no active process");
            return Ok(());
        };
        self.stats.keys_routed += 1;

        let cmd = self.processes[pid.index()].handle_input(key);
        let effects = self.apply(pid, cmd, Origin::Input);
        if effects.quit {
            self.running = false;
        }
        if let Some(target) = effects.switch
            && self.switch_to(target)?
        {
            return Ok(());
        }
        self.redraw()
    }

    // ── Display ─────────────────────────────────────────────────────────

    /// Replace the content region with output pushed by `from`.
    ///
    /// Only the active process may push; anything else is logged and
    /// ignored. Returns whether the push was accepted.
    pub fn push_display(&mut self, from: Pid, content: Content) -> io::Result<bool> {
        if self.active != Some(from) {
            self.stats.pushes_rejected += 1;
            warn!(%from, active = ?self.active, "display push from inactive process rejected");
            return Ok(false);
        }
        self.stats.pushes += 1;
        self.content = content;
        self.refresh()?;
        Ok(true)
    }

    /// Re-render the active process and refresh.
    pub fn redraw(&mut self) -> io::Result<()> {
        if let Some(pid) = self.active {
            let viewport = self.compositor.viewport();
            self.content = self.processes[pid.index()].render(viewport);
        }
        self.refresh()
    }

    /// Composite the current regions and present them.
    pub fn refresh(&mut self) -> io::Result<()> {
        let screen = self.screen();
        self.stats.refreshes += 1;
        self.surface.present(&screen)
    }

    /// The frame the next refresh would present.
    #[must_use]
    pub fn screen(&self) -> Screen {
        let header = self.header_line();
        let ticker = self.ticker.visible_window();
        let footer = self.footer_line();
        self.compositor.compose(&Regions {
            header: &header,
            ticker: &ticker,
            content: &self.content,
            footer: &footer,
        })
    }

    fn active_label(&self) -> String {
        self.active
            .and_then(|pid| self.process_name(pid))
            .map_or_else(|| "IDLE".to_string(), str::to_uppercase)
    }

    fn header_line(&self) -> String {
        let title = &self.config.title;
        let right = format!(
            "{} {}",
            self.active_label(),
            format_uptime(self.scheduler.now())
        );
        let gap = self
            .config
            .width
            .saturating_sub(visible_width(title) + visible_width(&right))
            .max(1);
        format!("{title}{}{right}", " ".repeat(gap))
    }

    fn footer_line(&self) -> String {
        let glyph = if self.blink_on { '_' } else { ' ' };
        format!("{} {} {glyph}", self.config.prompt, self.active_label())
    }

    // ── Time ────────────────────────────────────────────────────────────

    /// Advance one frame by `dt`.
    pub fn advance(&mut self, dt: Duration) -> io::Result<()> {
        self.ticker.tick(dt);

        let mut render = false;
        for fired in self.scheduler.advance(dt) {
            // An earlier handler this frame may have cancelled it.
            if !self.scheduler.claim(fired) {
                continue;
            }
            match fired.owner {
                Owner::Kernel => {
                    if fired.id == BLINK_TIMER {
                        self.blink_on = !self.blink_on;
                    }
                }
                Owner::Process(pid) if self.active == Some(pid) => {
                    self.stats.timers_fired += 1;
                    let cmd = self.processes[pid.index()].on_timer(fired.id);
                    let effects = self.apply(pid, cmd, Origin::Timer);
                    render |= effects.redraw;
                    if effects.quit {
                        self.running = false;
                    }
                }
                Owner::Process(pid) => {
                    debug!(%pid, id = fired.id, "timer for inactive process skipped");
                }
            }
        }

        if render {
            self.redraw()
        } else {
            self.refresh()
        }
    }

    // ── Commands ────────────────────────────────────────────────────────

    fn apply(&mut self, pid: Pid, cmd: Cmd, origin: Origin) -> Effects {
        let mut effects = Effects::default();
        self.apply_into(pid, cmd, origin, &mut effects);
        effects
    }

    fn apply_into(&mut self, pid: Pid, cmd: Cmd, origin: Origin, effects: &mut Effects) {
        match cmd {
            Cmd::None => {}
            Cmd::Redraw => effects.redraw = true,
            Cmd::Switch(_) | Cmd::Home if origin != Origin::Input => {
                warn!(%pid, ?origin, "switch request outside input handling ignored");
            }
            Cmd::Switch(target) => effects.switch = Some(target),
            Cmd::Home => match self.home {
                Some(home) => effects.switch = Some(home),
                None => warn!(%pid, "home requested without a home process"),
            },
            Cmd::Schedule(spec) => {
                self.scheduler
                    .schedule(Owner::Process(pid), spec.id, spec.trigger);
            }
            Cmd::Cancel(id) => {
                self.scheduler.cancel(Owner::Process(pid), id);
            }
            Cmd::Announce(message) => {
                debug!(%pid, %message, "ticker announcement");
                self.ticker.announce(&message);
            }
            Cmd::Log(line) => {
                let name = self.processes[pid.index()].name();
                info!(process = name, "{line}");
            }
            Cmd::Quit => effects.quit = true,
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.apply_into(pid, cmd, origin, effects);
                }
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request the event loop to stop.
    pub fn stop(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn active(&self) -> Option<Pid> {
        self.active
    }

    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.active.and_then(|pid| self.process_name(pid))
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.compositor.viewport()
    }

    #[must_use]
    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut Ticker {
        &mut self.ticker
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Virtual time since boot.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.scheduler.now()
    }

    #[must_use]
    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    #[must_use]
    pub fn stats(&self) -> KernelStats {
        self.stats
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// `HH:MM:SS`. Hours keep counting past 99.
#[must_use]
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
