//! Lifecycle ordering tests for the kernel.
//!
//! Every process here writes each call it receives into one shared journal,
//! so the tests can assert on the global interleaving of calls.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use phosphor_runtime::{
    Cmd, Content, Kernel, KernelConfig, Key, MemorySurface, Process, RawKey, TimerId,
    Viewport,
};
use phosphor_text::{Align, visible_width};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Open(&'static str),
    Input(&'static str, Key),
    Close(&'static str),
    Timer(&'static str, TimerId),
}

type Journal = Rc<RefCell<Vec<Call>>>;

struct Recorder {
    name: &'static str,
    journal: Journal,
    on_accept: Cmd,
    on_open: Cmd,
    on_timer: Cmd,
    last_key: Option<Key>,
}

impl Recorder {
    fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: Rc::clone(journal),
            on_accept: Cmd::none(),
            on_open: Cmd::none(),
            on_timer: Cmd::none(),
            last_key: None,
        }
    }

    fn on_accept(mut self, cmd: Cmd) -> Self {
        self.on_accept = cmd;
        self
    }

    fn on_open(mut self, cmd: Cmd) -> Self {
        self.on_open = cmd;
        self
    }

    fn on_timer(mut self, cmd: Cmd) -> Self {
        self.on_timer = cmd;
        self
    }
}

impl Process for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn open(&mut self) -> Cmd {
        self.journal.borrow_mut().push(Call::Open(self.name));
        self.last_key = None;
        self.on_open.clone()
    }

    fn handle_input(&mut self, key: Key) -> Cmd {
        self.journal.borrow_mut().push(Call::Input(self.name, key));
        self.last_key = Some(key);
        if key == Key::Accept {
            self.on_accept.clone()
        } else {
            Cmd::none()
        }
    }

    fn close(&mut self) {
        self.journal.borrow_mut().push(Call::Close(self.name));
    }

    fn render(&self, viewport: Viewport) -> Content {
        let label = match self.last_key {
            Some(key) => format!("{} saw {key}", self.name),
            None => format!("{} idle", self.name),
        };
        let mut content = Content::new();
        content.push_padded(&label, viewport, Align::Left);
        content
    }

    fn on_timer(&mut self, id: TimerId) -> Cmd {
        self.journal.borrow_mut().push(Call::Timer(self.name, id));
        self.on_timer.clone()
    }
}

fn config() -> KernelConfig {
    KernelConfig {
        width: 24,
        rows: 4,
        ..KernelConfig::default()
    }
}

#[test]
fn close_precedes_open_and_input_follows_open() {
    let journal = Journal::default();
    let mut kernel = Kernel::new(config(), MemorySurface::new());
    let a = kernel.spawn(Recorder::new("a", &journal));
    let b = kernel.spawn(Recorder::new("b", &journal));
    kernel.set_home(a);
    kernel.boot().unwrap();

    kernel.dispatch_key(Key::Down).unwrap();
    kernel.switch_to(b).unwrap();
    kernel.dispatch_key(Key::Up).unwrap();

    assert_eq!(
        *journal.borrow(),
        vec![
            Call::Open("a"),
            Call::Input("a", Key::Down),
            Call::Close("a"),
            Call::Open("b"),
            Call::Input("b", Key::Up),
        ]
    );
    assert_eq!(kernel.find("B"), Some(b));
}

#[test]
fn switching_key_is_not_replayed_to_target() {
    let journal = Journal::default();
    let mut kernel = Kernel::new(config(), MemorySurface::new());
    let b = kernel.spawn(Recorder::new("b", &journal));
    let menu = kernel.spawn(Recorder::new("menu", &journal).on_accept(Cmd::switch(b)));
    kernel.set_home(menu);
    kernel.boot().unwrap();
    journal.borrow_mut().clear();

    kernel.route_input(RawKey::Enter).unwrap();

    assert_eq!(
        *journal.borrow(),
        vec![
            Call::Input("menu", Key::Accept),
            Call::Close("menu"),
            Call::Open("b"),
        ]
    );
    let screen = kernel.surface().last().unwrap();
    assert!(screen.contains("b idle"), "{screen}");
    assert!(!screen.contains("saw"));
}

#[test]
fn first_boot_has_no_spurious_close() {
    let journal = Journal::default();
    let mut kernel = Kernel::new(config(), MemorySurface::new());
    let home = kernel.spawn(Recorder::new("home", &journal));
    kernel.set_home(home);
    kernel.boot().unwrap();
    assert_eq!(*journal.borrow(), vec![Call::Open("home")]);
}

#[test]
fn push_from_closed_process_is_rejected() {
    let journal = Journal::default();
    let mut kernel = Kernel::new(config(), MemorySurface::new());
    let a = kernel.spawn(Recorder::new("a", &journal));
    let b = kernel.spawn(Recorder::new("b", &journal));
    kernel.set_home(a);
    kernel.boot().unwrap();

    let stale = Content::from(vec!["STALE".to_string()]);
    assert!(!kernel.push_display(b, stale).unwrap());
    assert!(!kernel.surface().last().unwrap().contains("STALE"));
    assert_eq!(kernel.stats().pushes_rejected, 1);
}

#[test]
fn timers_are_cancelled_when_owner_closes() {
    let journal = Journal::default();
    let mut kernel = Kernel::new(config(), MemorySurface::new());
    let a = kernel.spawn(
        Recorder::new("a", &journal)
            .on_open(Cmd::every(7, Duration::from_millis(100)))
            .on_timer(Cmd::redraw()),
    );
    let b = kernel.spawn(Recorder::new("b", &journal));
    kernel.set_home(a);
    kernel.boot().unwrap();

    kernel.advance(Duration::from_millis(100)).unwrap();
    kernel.advance(Duration::from_millis(100)).unwrap();
    kernel.switch_to(b).unwrap();
    kernel.advance(Duration::from_millis(1_000)).unwrap();

    let timers: Vec<_> = journal
        .borrow()
        .iter()
        .filter(|c| matches!(c, Call::Timer(..)))
        .cloned()
        .collect();
    assert_eq!(timers, vec![Call::Timer("a", 7), Call::Timer("a", 7)]);
    // Only the kernel's blink timer is left.
    assert_eq!(kernel.scheduler().active_count(), 1);
}

#[test]
fn reopening_rearms_timers() {
    let journal = Journal::default();
    let mut kernel = Kernel::new(config(), MemorySurface::new());
    let a = kernel.spawn(
        Recorder::new("a", &journal).on_open(Cmd::after(1, Duration::from_millis(50))),
    );
    let b = kernel.spawn(Recorder::new("b", &journal).on_accept(Cmd::home()));
    kernel.set_home(a);
    kernel.boot().unwrap();
    kernel.switch_to(b).unwrap();
    kernel.dispatch_key(Key::Accept).unwrap();
    kernel.advance(Duration::from_millis(50)).unwrap();

    assert_eq!(journal.borrow().last(), Some(&Call::Timer("a", 1)));
}

#[test]
fn every_frame_has_fixed_geometry() {
    let journal = Journal::default();
    let mut kernel = Kernel::new(config(), MemorySurface::new());
    let a = kernel.spawn(Recorder::new("a", &journal));
    kernel.set_home(a);
    kernel.boot().unwrap();
    for key in Key::ALL {
        kernel.dispatch_key(key).unwrap();
        kernel.advance(Duration::from_millis(333)).unwrap();
    }
    let height = kernel.surface().frames()[0].height();
    for frame in kernel.surface().frames() {
        assert_eq!(frame.height(), height);
        for line in frame.lines() {
            assert_eq!(visible_width(line), 24, "{line:?}");
        }
    }
}

#[test]
fn shutdown_closes_active_and_stops_timers() {
    let journal = Journal::default();
    let mut kernel = Kernel::new(config(), MemorySurface::new());
    let a = kernel.spawn(
        Recorder::new("a", &journal).on_open(Cmd::every(1, Duration::from_millis(10))),
    );
    kernel.set_home(a);
    kernel.boot().unwrap();
    kernel.shutdown();

    assert_eq!(journal.borrow().last(), Some(&Call::Close("a")));
    assert_eq!(kernel.scheduler().active_count(), 0);
    assert!(!kernel.is_running());
}
