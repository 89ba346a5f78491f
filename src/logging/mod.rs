//! Diagnostic event log.
//!
//! One JSON object per line in `~/.paceboard/events.jsonl` (configurable via
//! `[logging]`). Records dashboard load outcomes, proxy lifecycle changes,
//! and cache fallbacks so a "could not load" screen can be traced to its
//! cause.
//!
//! Logging is off until [`init`] is called. Library callers and tests that
//! never initialize it write nothing. All writes are best-effort.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Utc;
use serde::Serialize;

use crate::config::schema::LoggingConfig;

/// Severity of a log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A single event line.
#[derive(Debug, Serialize)]
pub struct LogEvent<'a> {
    pub timestamp: String,
    pub level: Level,
    /// Subsystem: `"dashboard"`, `"proxy"`, `"server"`.
    pub component: &'a str,
    pub event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'a str>,
}

#[derive(Debug)]
struct Sink {
    path: PathBuf,
    min_level: Level,
}

static SINK: OnceLock<Sink> = OnceLock::new();

/// Enable logging for the rest of the process.
///
/// Only the first call takes effect. A disabled config or an unresolvable
/// path leaves logging off.
pub fn init(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }
    let Some(path) = crate::config::expand_home(&config.path) else {
        return;
    };
    let min_level = Level::parse(&config.level).unwrap_or(Level::Info);
    let _ = SINK.set(Sink { path, min_level });
}

/// Path of the active log file, if logging is enabled.
pub fn log_path() -> Option<PathBuf> {
    SINK.get().map(|s| s.path.clone())
}

pub fn log(level: Level, component: &str, event: &str, detail: Option<&str>) {
    let Some(sink) = SINK.get() else {
        return;
    };
    if level < sink.min_level {
        return;
    }
    let entry = LogEvent {
        timestamp: Utc::now().to_rfc3339(),
        level,
        component,
        event,
        detail,
    };
    let _ = append(sink, &entry);
}

pub fn debug(component: &str, event: &str, detail: Option<&str>) {
    log(Level::Debug, component, event, detail);
}

pub fn info(component: &str, event: &str, detail: Option<&str>) {
    log(Level::Info, component, event, detail);
}

pub fn warn(component: &str, event: &str, detail: Option<&str>) {
    log(Level::Warn, component, event, detail);
}

pub fn error(component: &str, event: &str, detail: Option<&str>) {
    log(Level::Error, component, event, detail);
}

fn append(sink: &Sink, entry: &LogEvent<'_>) -> anyhow::Result<()> {
    if let Some(parent) = sink.path.parent() {
        create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&sink.path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn parse_level_variants() {
        assert_eq!(Level::parse("INFO"), Some(Level::Info));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("verbose"), None);
    }

    #[test]
    fn event_serializes_without_empty_detail() {
        let entry = LogEvent {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            level: Level::Warn,
            component: "proxy",
            event: "served_stale",
            detail: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""level":"warn""#));
        assert!(!json.contains("detail"));
    }
}
