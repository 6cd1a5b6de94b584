//! Stderr backend for the `log` facade, installed by the binary.

use std::{env, io::Write, str::FromStr};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable read when no level is given on the command line.
pub const LOG_ENV: &str = "PYDYTYPE_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

fn color_code(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug => "\x1b[36m",
        Level::Trace => "\x1b[35m",
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{}{:<5}\x1b[0m [{}] {}",
            color_code(record.level()),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Parses `off`, `error`, `warn`, `info`, `debug` or `trace`, case-insensitively.
pub fn parse_level(text: &str) -> Option<LevelFilter> {
    LevelFilter::from_str(text.trim()).ok()
}

/// The explicit level if any, else `PYDYTYPE_LOG`, else `warn`.
pub fn resolve_level(explicit: Option<&str>) -> LevelFilter {
    explicit
        .map(str::to_string)
        .or_else(|| env::var(LOG_ENV).ok())
        .and_then(|text| parse_level(&text))
        .unwrap_or(LevelFilter::Warn)
}

/// Installs the stderr logger. Fails if a logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::{parse_level, resolve_level};

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" TRACE "), Some(LevelFilter::Trace));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_explicit_level_wins() {
        assert_eq!(resolve_level(Some("error")), LevelFilter::Error);
    }
}
