//! First frames of the stock console.

use std::time::Duration;

use phosphor_runtime::{ANNOUNCEMENT_LIMIT, Kernel, Key, MemorySurface};
use phosphor_shell::boot::console;
use phosphor_shell::catalog::Catalog;
use phosphor_shell::cli::Opts;
use phosphor_text::{validate_markup, visible_width};

fn booted(opts: &Opts) -> Kernel<MemorySurface> {
    let mut kernel = console(opts, &Catalog::builtin(), MemorySurface::new());
    kernel.boot().unwrap();
    kernel
}

fn assert_geometry(kernel: &Kernel<MemorySurface>, opts: &Opts) {
    for frame in kernel.surface().frames() {
        assert_eq!(frame.height(), opts.rows + 8);
        for line in frame.lines() {
            assert_eq!(visible_width(line), opts.width + 2, "{line:?}");
            assert!(validate_markup(line).is_ok(), "{line:?}");
        }
    }
}

#[test]
fn boot_frame_lists_the_catalog() {
    let opts = Opts::default();
    let kernel = booted(&opts);
    let screen = kernel.surface().last().unwrap();

    for name in ["DASHBOARD", "TERMLINK", "HOLOTAPES", "REPOSITORIES", "ARCADE"] {
        assert!(screen.contains(name), "missing {name}");
    }
    assert!(screen.contains("PHOSPHOR"));
    assert!(screen.contains("MENU 00:00:00"));
    assert_eq!(kernel.active_name(), Some("menu"));
    assert_geometry(&kernel, &opts);
}

#[test]
fn ascii_border_uses_plain_corners() {
    let opts = Opts {
        ascii: true,
        ..Opts::default()
    };
    let kernel = booted(&opts);
    let lines = kernel.surface().last().unwrap().plain_lines();
    assert!(lines[0].starts_with('+'));
    assert!(lines[0].ends_with('+'));
    assert!(lines[1].starts_with('|'));
}

#[test]
fn touring_every_application_keeps_geometry() {
    let opts = Opts {
        width: 48,
        rows: 10,
        ..Opts::default()
    };
    let mut kernel = booted(&opts);

    for index in 0..4 {
        for _ in 0..index {
            kernel.dispatch_key(Key::Down).unwrap();
        }
        kernel.dispatch_key(Key::Accept).unwrap();
        assert_ne!(kernel.active_name(), Some("menu"));
        for _ in 0..3 {
            kernel.advance(Duration::from_millis(400)).unwrap();
        }
        kernel.dispatch_key(Key::Right).unwrap();
        kernel.dispatch_key(Key::Down).unwrap();
        kernel.dispatch_key(Key::Left).unwrap();
        if kernel.active_name() != Some("menu") {
            // The repository browser uses LEFT for tabs; ACCEPT leaves it.
            kernel.dispatch_key(Key::Accept).unwrap();
        }
        assert_eq!(kernel.active_name(), Some("menu"));
        for _ in 0..index {
            kernel.dispatch_key(Key::Up).unwrap();
        }
    }

    assert_geometry(&kernel, &opts);
}

#[test]
fn arcade_without_target_stays_on_menu() {
    let opts = Opts::default();
    let mut kernel = booted(&opts);
    for _ in 0..4 {
        kernel.dispatch_key(Key::Down).unwrap();
    }
    let switches = kernel.stats().switches;
    kernel.dispatch_key(Key::Accept).unwrap();
    assert_eq!(kernel.active_name(), Some("menu"));
    assert_eq!(kernel.stats().switches, switches);
}

#[test]
fn ticker_scrolls_between_frames() {
    let opts = Opts::default();
    let mut kernel = booted(&opts);
    let before = kernel.ticker().visible_window();
    kernel.advance(Duration::from_secs(1)).unwrap();
    assert_ne!(kernel.ticker().visible_window(), before);
}

#[test]
fn replaying_holotapes_keeps_ticker_bounded() {
    let opts = Opts::default();
    let mut kernel = booted(&opts);
    kernel.dispatch_key(Key::Down).unwrap();
    kernel.dispatch_key(Key::Down).unwrap();
    kernel.dispatch_key(Key::Accept).unwrap();
    assert_eq!(kernel.active_name(), Some("media"));

    for _ in 0..500 {
        kernel.dispatch_key(Key::Accept).unwrap();
        kernel.dispatch_key(Key::Right).unwrap();
        kernel.dispatch_key(Key::Down).unwrap();
    }

    let ticker = kernel.ticker();
    assert_eq!(ticker.messages(), Catalog::builtin().ticker.as_slice());
    assert_eq!(ticker.announcements().len(), ANNOUNCEMENT_LIMIT);
    assert!(ticker.announcements().iter().all(|a| a.starts_with("NOW PLAYING: ")));
    assert!(ticker.tape_len() < 400, "tape grew to {}", ticker.tape_len());
}
