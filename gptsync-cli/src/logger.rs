// SPDX-License-Identifier: MIT

use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::Warn,
            LogLevel::Normal => LevelFilter::Info,
            LogLevel::Verbose => LevelFilter::Debug,
        }
    }
}

/// Prints library log records with a `[gptsync]` prefix.
/// Warnings and errors go to stderr.
struct Logger;

static LOGGER: Logger = Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let prefix = "[gptsync]".bold();
        match record.level() {
            Level::Error => eprintln!("{prefix} {} {}", "error:".red().bold(), record.args()),
            Level::Warn => eprintln!("{prefix} {} {}", "warning:".yellow().bold(), record.args()),
            Level::Info => println!("{prefix} {}", record.args()),
            Level::Debug | Level::Trace => {
                println!("{prefix} {}", record.args().to_string().dimmed())
            }
        }
    }

    fn flush(&self) {}
}

pub fn init(level: LogLevel) {
    // A logger can only be installed once per process.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level.filter());
    }
}
