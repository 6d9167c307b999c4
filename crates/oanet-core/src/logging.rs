//! Log output that stays readable next to retrieval progress bars

use std::io::Write;

use crate::progress::ProgressContext;

/// Crates whose debug output is worth showing (page positions, schema gaps)
const OWN_CRATES: &[&str] = &["oanet_core", "oanet_openalex", "oanet_network"];

/// How chatty a session should be. `RUST_LOG` overrides all of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only (rate limits, aborted sessions)
    Quiet,
    /// Session start/summary lines
    #[default]
    Normal,
    /// Per-page and per-record diagnostics from oanet crates; HTTP stack
    /// stays at info
    Debug,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (_, true) => Self::Debug,
            (true, false) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }

    /// `env_logger` filter directive
    pub fn filter(self) -> String {
        match self {
            Self::Quiet => "warn".to_string(),
            Self::Normal => "info".to_string(),
            Self::Debug => {
                let own: Vec<String> = OWN_CRATES.iter().map(|c| format!("{c}=debug")).collect();
                format!("info,{}", own.join(","))
            }
        }
    }
}

fn label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

fn color(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug | log::Level::Trace => "\x1b[36m",
    }
}

/// `[LEVEL] message`; debug lines also name the emitting module
/// (`oanet_openalex::pager` → `pager`).
fn format_line(level: log::Level, target: &str, message: &str, colored: bool) -> String {
    let tag = if colored {
        format!("{}{}\x1b[0m", color(level), label(level))
    } else {
        label(level).to_string()
    };
    if level >= log::Level::Debug {
        let module = target.rsplit("::").next().unwrap_or(target);
        format!("[{tag}] {module}: {message}")
    } else {
        format!("[{tag}] {message}")
    }
}

/// Logger that prints through the progress bars' `MultiProgress` so log
/// lines never tear a bar in half.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: indicatif::MultiProgress,
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            let line = format_line(
                record.level(),
                record.target(),
                &record.args().to_string(),
                true,
            );
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the process logger for retrieval sessions shown in `progress`.
///
/// TTY: colored lines routed around the bars. Otherwise plain lines on
/// stderr. Returns `false` when a logger was already installed.
pub fn init_logging(verbosity: Verbosity, progress: &ProgressContext) -> bool {
    let filter = verbosity.filter();
    let env = env_logger::Env::default().default_filter_or(filter.as_str());

    if progress.is_tty() {
        let inner = env_logger::Builder::from_env(env).build();
        let max_level = inner.filter();
        let logger = IndicatifLogger {
            inner,
            multi: progress.multi().clone(),
        };
        if log::set_boxed_logger(Box::new(logger)).is_err() {
            return false;
        }
        log::set_max_level(max_level);
        true
    } else {
        env_logger::Builder::from_env(env)
            .format(|buf, record| {
                let line = format_line(
                    record.level(),
                    record.target(),
                    &record.args().to_string(),
                    false,
                );
                writeln!(buf, "{line}")
            })
            .try_init()
            .is_ok()
    }
}
