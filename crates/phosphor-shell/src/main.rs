#![forbid(unsafe_code)]

//! Phosphor console binary entry point.

use std::io::{self, BufWriter};
use std::process;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Color;
use phosphor_runtime::{MemorySurface, RawKey};
use phosphor_shell::catalog::Catalog;
use phosphor_shell::cli::Opts;
use phosphor_shell::terminal::{TerminalSession, TerminalSurface};
use phosphor_shell::{boot, logging};

fn main() {
    let opts = Opts::parse();

    if let Err(e) = logging::init(opts.log_file.as_deref(), opts.log_json) {
        eprintln!("Failed to open log file: {e}");
        process::exit(1);
    }

    let catalog = match &opts.catalog {
        Some(path) => match Catalog::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => Catalog::builtin(),
    };

    let result = if opts.print_frame {
        print_frame(&opts, &catalog)
    } else {
        run(&opts, &catalog)
    };
    if let Err(e) = result {
        eprintln!("Runtime error: {e}");
        process::exit(1);
    }
}

/// Boot into memory and print the first frame without markup.
fn print_frame(opts: &Opts, catalog: &Catalog) -> io::Result<()> {
    let mut kernel = boot::console(opts, catalog, MemorySurface::new());
    kernel.boot()?;
    if let Some(screen) = kernel.surface().last() {
        for line in screen.plain_lines() {
            println!("{line}");
        }
    }
    kernel.shutdown();
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c' | 'q'))
}

fn run(opts: &Opts, catalog: &Catalog) -> io::Result<()> {
    let session = TerminalSession::new()?;
    let surface = TerminalSurface::new(BufWriter::new(io::stdout())).with_base_color(Some(
        Color::Rgb {
            r: 0x33,
            g: 0xff,
            b: 0x33,
        },
    ));
    let mut kernel = boot::console(opts, catalog, surface);
    kernel.boot()?;

    let frame = Duration::from_secs(1) / opts.fps;
    let deadline = (opts.exit_after_ms > 0)
        .then(|| Instant::now() + Duration::from_millis(opts.exit_after_ms));
    let mut last_frame = Instant::now();

    while kernel.is_running() {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::info!("exit-after deadline reached");
            break;
        }

        if event::poll(frame.saturating_sub(last_frame.elapsed()))? {
            match event::read()? {
                Event::Key(key) if is_quit(&key) => break,
                Event::Key(key) => {
                    if let Some(raw) = RawKey::from_crossterm(&key) {
                        kernel.route_input(raw)?;
                    }
                }
                Event::Resize(..) => kernel.refresh()?,
                _ => {}
            }
        }

        let elapsed = last_frame.elapsed();
        if elapsed >= frame {
            last_frame = Instant::now();
            kernel.advance(elapsed)?;
        }
    }

    kernel.shutdown();
    drop(session);
    Ok(())
}
