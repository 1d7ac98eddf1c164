//! Tracing setup and coloured console helpers shared between quill crates.

use ansi_term::Colour;
use std::{env, io};
use tracing::{Level, Metadata};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::MakeWriter,
};

pub fn println_green(txt: &str) {
    println_std_out(txt, Colour::Green);
}

pub fn println_red_err(txt: &str) {
    println_std_err(txt, Colour::Red);
}

fn println_std_out(txt: &str, color: Colour) {
    if colour_enabled() {
        tracing::info!("{}", color.paint(txt));
    } else {
        tracing::info!("{txt}");
    }
}

fn println_std_err(txt: &str, color: Colour) {
    if colour_enabled() {
        tracing::error!("{}", color.paint(txt));
    } else {
        tracing::error!("{txt}");
    }
}

const LOG_FILTER: &str = "RUST_LOG";
const NO_COLOR: &str = "NO_COLOR";

/// Colour output is disabled by setting `NO_COLOR` to any value.
pub fn colour_enabled() -> bool {
    env::var_os(NO_COLOR).is_none()
}

/// Log levels accepted on the command line, e.g. `--log-level=debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

// Writes ERROR and WARN level logs to stderr and everything else to stdout.
struct StdioTracingWriter {
    writer_mode: TracingWriterMode,
}

impl<'a> MakeWriter<'a> for StdioTracingWriter {
    type Writer = Box<dyn io::Write>;

    fn make_writer(&'a self) -> Self::Writer {
        match self.writer_mode {
            TracingWriterMode::Stderr => Box::new(io::stderr()),
            _ => Box::new(io::stdout()),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        if self.writer_mode == TracingWriterMode::Stderr
            || (self.writer_mode == TracingWriterMode::Stdio && meta.level() <= &Level::WARN)
        {
            return Box::new(io::stderr());
        }
        Box::new(io::stdout())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingWriterMode {
    /// Write ERROR and WARN to stderr and everything else to stdout.
    #[default]
    Stdio,
    /// Write everything to stdout.
    Stdout,
    /// Write everything to stderr.
    Stderr,
}

#[derive(Debug, Default)]
pub struct TracingSubscriberOptions {
    pub verbosity: Option<u8>,
    pub silent: Option<bool>,
    pub log_level: Option<LogLevel>,
    pub writer_mode: Option<TracingWriterMode>,
}

impl TracingSubscriberOptions {
    /// The level forced by the options, if any. An explicit log level wins over verbosity, which
    /// wins over silent mode.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.log_level
            .map(LevelFilter::from)
            .or_else(|| match self.verbosity {
                Some(1) => Some(LevelFilter::DEBUG),
                Some(v) if v >= 2 => Some(LevelFilter::TRACE),
                _ => None,
            })
            .or(match self.silent {
                Some(true) => Some(LevelFilter::OFF),
                _ => None,
            })
    }
}

/// Installs a subscriber that prints plain lines, so log output reads like `println!`.
///
/// `RUST_LOG` sets the minimum level unless the options force one; the default is `INFO`.
pub fn init_tracing_subscriber(options: TracingSubscriberOptions) {
    let env_filter = match env::var_os(LOG_FILTER) {
        Some(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::new("info"),
    };

    let builder = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_ansi(colour_enabled())
        .with_level(false)
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .with_target(false)
        .with_writer(StdioTracingWriter {
            writer_mode: options.writer_mode.unwrap_or_default(),
        });

    match options.level_filter() {
        Some(level_filter) => builder.with_max_level(level_filter).init(),
        None => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins() {
        let options = TracingSubscriberOptions {
            verbosity: Some(2),
            silent: Some(true),
            log_level: Some(LogLevel::Warning),
            ..Default::default()
        };
        assert_eq!(options.level_filter(), Some(LevelFilter::WARN));
    }

    #[test]
    fn verbosity_then_silent() {
        let verbose = TracingSubscriberOptions {
            verbosity: Some(1),
            silent: Some(true),
            ..Default::default()
        };
        assert_eq!(verbose.level_filter(), Some(LevelFilter::DEBUG));

        let very_verbose = TracingSubscriberOptions {
            verbosity: Some(3),
            ..Default::default()
        };
        assert_eq!(very_verbose.level_filter(), Some(LevelFilter::TRACE));

        let silent = TracingSubscriberOptions {
            silent: Some(true),
            ..Default::default()
        };
        assert_eq!(silent.level_filter(), Some(LevelFilter::OFF));

        assert_eq!(TracingSubscriberOptions::default().level_filter(), None);
    }
}
