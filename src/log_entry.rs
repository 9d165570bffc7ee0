use crate::types::{Action, Severity, Source};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A single event handed to the store.
///
/// The line format only carries the timestamp down to the minute, so the
/// timestamp is truncated on construction and a record read back from disk
/// compares equal to the one that was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    text: String,
    source: Source,
    severity: Severity,
    action: Action,
    timestamp: NaiveDateTime,
}

impl LogRecord {
    pub fn new(
        text: impl Into<String>,
        source: Source,
        severity: Severity,
        action: Action,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            text: text.into(),
            source,
            severity,
            action,
            timestamp: truncate_to_minute(timestamp),
        }
    }

    /// Record stamped with the current local time.
    pub fn now(text: impl Into<String>, source: Source, severity: Severity, action: Action) -> Self {
        Self::new(text, source, severity, action, Local::now().naive_local())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
