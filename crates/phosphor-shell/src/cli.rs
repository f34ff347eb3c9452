#![forbid(unsafe_code)]

//! Command-line argument parsing for the console binary.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `PHOSPHOR_` prefix.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Phosphor - a shared green-screen console

USAGE:
    phosphor [OPTIONS]

OPTIONS:
    --width=N            Console width in columns (default: 60)
    --rows=N             Content rows (default: 16)
    --ticker-speed=F     Ticker speed in columns per second (default: 8)
    --fps=N              Frames per second (default: 30)
    --catalog=PATH       Load the menu catalog from a JSON file
    --ascii              Draw the frame with ASCII characters
    --log-file=PATH      Write logs to PATH
    --log-json           Write logs as JSON lines
    --exit-after-ms=N    Quit after N milliseconds (0 = never)
    --print-frame        Print the boot frame to stdout and exit
    --help, -h           Show this help message
    --version, -V        Show version

KEYS:
    Up / w / k           Move up
    Down / s / j         Move down
    Left / a / h         Back, previous tab
    Right / d / l        Next tab
    Enter / Space        Select
    Ctrl+C / Ctrl+Q      Quit

ENVIRONMENT VARIABLES:
    PHOSPHOR_WIDTH           Override --width
    PHOSPHOR_ROWS            Override --rows
    PHOSPHOR_TICKER_SPEED    Override --ticker-speed
    PHOSPHOR_CATALOG         Override --catalog
    PHOSPHOR_LOG_FILE        Override --log-file
    PHOSPHOR_EXIT_AFTER_MS   Override --exit-after-ms
    PHOSPHOR_LOG             Log filter, e.g. 'debug' or 'phosphor_runtime=trace'";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub width: usize,
    pub rows: usize,
    pub ticker_speed: f64,
    pub fps: u32,
    pub catalog: Option<PathBuf>,
    /// ASCII frame instead of box-drawing characters.
    pub ascii: bool,
    pub log_file: Option<PathBuf>,
    pub log_json: bool,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    pub print_frame: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            width: 60,
            rows: 16,
            ticker_speed: 8.0,
            fps: 30,
            catalog: None,
            ascii: false,
            log_file: None,
            log_json: false,
            exit_after_ms: 0,
            print_frame: false,
        }
    }
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Run(Opts),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn parse_value<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

fn positive(flag: &'static str, value: &str) -> Result<usize, CliError> {
    match parse_value::<usize>(flag, value)? {
        0 => Err(CliError::InvalidValue {
            flag,
            value: value.to_string(),
        }),
        n => Ok(n),
    }
}

fn speed(flag: &'static str, value: &str) -> Result<f64, CliError> {
    let speed: f64 = parse_value(flag, value)?;
    if speed.is_finite() && speed >= 0.0 {
        Ok(speed)
    } else {
        Err(CliError::InvalidValue {
            flag,
            value: value.to_string(),
        })
    }
}

fn fps(value: &str) -> Result<u32, CliError> {
    match parse_value::<u32>("--fps", value)? {
        n @ 1..=240 => Ok(n),
        _ => Err(CliError::InvalidValue {
            flag: "--fps",
            value: value.to_string(),
        }),
    }
}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked; prints the error and
    /// exits with status 1 on bad input.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(Action::Run(opts)) => opts,
            Ok(Action::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Action::Version) => {
                println!("phosphor {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment lookups through `var`.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags. Unparseable environment values are
    /// ignored.
    pub fn parse_from(
        args: &[String],
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Action, CliError> {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = var("PHOSPHOR_WIDTH")
            && let Ok(n) = positive("PHOSPHOR_WIDTH", &val)
        {
            opts.width = n;
        }
        if let Some(val) = var("PHOSPHOR_ROWS")
            && let Ok(n) = positive("PHOSPHOR_ROWS", &val)
        {
            opts.rows = n;
        }
        if let Some(val) = var("PHOSPHOR_TICKER_SPEED")
            && let Ok(s) = speed("PHOSPHOR_TICKER_SPEED", &val)
        {
            opts.ticker_speed = s;
        }
        if let Some(val) = var("PHOSPHOR_CATALOG")
            && !val.is_empty()
        {
            opts.catalog = Some(PathBuf::from(val));
        }
        if let Some(val) = var("PHOSPHOR_LOG_FILE")
            && !val.is_empty()
        {
            opts.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = var("PHOSPHOR_EXIT_AFTER_MS")
            && let Ok(n) = val.trim().parse()
        {
            opts.exit_after_ms = n;
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Action::Help),
                "--version" | "-V" => return Ok(Action::Version),
                "--ascii" => opts.ascii = true,
                "--log-json" => opts.log_json = true,
                "--print-frame" => opts.print_frame = true,
                other => {
                    if let Some(val) = other.strip_prefix("--width=") {
                        opts.width = positive("--width", val)?;
                    } else if let Some(val) = other.strip_prefix("--rows=") {
                        opts.rows = positive("--rows", val)?;
                    } else if let Some(val) = other.strip_prefix("--ticker-speed=") {
                        opts.ticker_speed = speed("--ticker-speed", val)?;
                    } else if let Some(val) = other.strip_prefix("--fps=") {
                        opts.fps = fps(val)?;
                    } else if let Some(val) = other.strip_prefix("--catalog=") {
                        opts.catalog = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = parse_value("--exit-after-ms", val)?;
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }

        Ok(Action::Run(opts))
    }
}
