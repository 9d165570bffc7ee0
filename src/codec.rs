//! Line codec for log records.
//!
//! One record per line:
//!
//! ```text
//! 03/09/2024 02:27 PM [Warning] [Process] [ProcessTermination] free text
//! ```
//!
//! Nothing is escaped. A `[` or `]` inside the text, or a line break, can
//! desynchronize the scanner, so writers must keep them out of free text.
//! Existing files depend on the scan order date, severity, source, action,
//! text, which must not change.

use crate::error::ParseError;
use crate::log_entry::LogRecord;
use crate::types::{Action, Severity, Source};
use chrono::NaiveDateTime;

pub const DATE_FORMAT: &str = "%m/%d/%Y";
pub const TIME_FORMAT: &str = "%I:%M %p";
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M %p";

pub fn encode(record: &LogRecord) -> String {
    let ts = record.timestamp();
    format!(
        "{} {} [{}] [{}] [{}] {}",
        ts.format(DATE_FORMAT),
        ts.format(TIME_FORMAT),
        record.severity(),
        record.source(),
        record.action(),
        record.text()
    )
}

pub fn decode(line: &str) -> Result<LogRecord, ParseError> {
    let mut scanner = Scanner::new(line);

    let timestamp = scanner.timestamp()?;

    let name = scanner.bracketed("severity")?;
    let severity: Severity = name
        .parse()
        .map_err(|_| ParseError::UnknownSeverity(name.to_string()))?;

    let name = scanner.bracketed("source")?;
    let source: Source = name
        .parse()
        .map_err(|_| ParseError::UnknownSource(name.to_string()))?;

    let name = scanner.bracketed("action")?;
    let action: Action = name
        .parse()
        .map_err(|_| ParseError::UnknownAction(name.to_string()))?;

    let text = scanner.text();

    Ok(LogRecord::new(text, source, severity, action, timestamp))
}

/// Forward-only scanner over one line. Each step consumes its field and
/// leaves `rest` positioned right after it.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    /// Everything before the first `[`.
    fn timestamp(&mut self) -> Result<NaiveDateTime, ParseError> {
        let open = self.rest.find('[').ok_or(ParseError::MissingField("timestamp"))?;
        let raw = self.rest[..open].trim();
        self.rest = &self.rest[open..];
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .map_err(|_| ParseError::InvalidTimestamp(raw.to_string()))
    }

    /// Content between the next `[` and the `]` that follows it.
    fn bracketed(&mut self, field: &'static str) -> Result<&'a str, ParseError> {
        let open = self.rest.find('[').ok_or(ParseError::MissingField(field))?;
        let close = self.rest[open..]
            .find(']')
            .map(|i| open + i)
            .ok_or(ParseError::MissingField(field))?;
        let field = &self.rest[open + 1..close];
        self.rest = &self.rest[close + 1..];
        Ok(field)
    }

    /// Remainder after the last bracket, minus the separating space.
    fn text(self) -> &'a str {
        self.rest.strip_prefix(' ').unwrap_or(self.rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let record = LogRecord::new(
            "notepad.exe terminated",
            Source::Process,
            Severity::Warning,
            Action::ProcessTermination,
            at(2024, 3, 9, 14, 27),
        );
        assert_eq!(
            encode(&record),
            "03/09/2024 02:27 PM [Warning] [Process] [ProcessTermination] notepad.exe terminated"
        );
    }

    #[test]
    fn test_decode_existing_line() {
        let record =
            decode("11/30/2023 09:05 AM [Critical] [WindowsAPI] [WatchdogInizialization] hook failed")
                .unwrap();
        assert_eq!(record.timestamp(), at(2023, 11, 30, 9, 5));
        assert_eq!(record.severity(), Severity::Critical);
        assert_eq!(record.source(), Source::WindowsAPI);
        assert_eq!(record.action(), Action::WatchdogInizialization);
        assert_eq!(record.text(), "hook failed");
    }

    #[test]
    fn test_decode_empty_text() {
        let record = decode("01/01/2024 12:00 AM [Debug] [Application] [LogClear] ").unwrap();
        assert_eq!(record.text(), "");
        assert_eq!(record.timestamp(), at(2024, 1, 1, 0, 0));
    }

    #[test]
    fn test_decode_rejects_bad_fields() {
        assert_eq!(
            decode("no brackets at all"),
            Err(ParseError::MissingField("timestamp"))
        );
        assert_eq!(
            decode("yesterday [Warning] [Process] [FileOpen] x"),
            Err(ParseError::InvalidTimestamp("yesterday".to_string()))
        );
        assert_eq!(
            decode("01/01/2024 12:00 AM [Fatal] [Process] [FileOpen] x"),
            Err(ParseError::UnknownSeverity("Fatal".to_string()))
        );
        assert_eq!(
            decode("01/01/2024 12:00 AM [Warning] [Kernel] [FileOpen] x"),
            Err(ParseError::UnknownSource("Kernel".to_string()))
        );
        assert_eq!(
            decode("01/01/2024 12:00 AM [Warning] [Process] [Reboot] x"),
            Err(ParseError::UnknownAction("Reboot".to_string()))
        );
        assert_eq!(
            decode("01/01/2024 12:00 AM [Warning] [Process] x"),
            Err(ParseError::MissingField("action"))
        );
    }

    fn any_record() -> impl Strategy<Value = LogRecord> {
        (
            "[^\\[\\]\r\n]{0,64}",
            prop::sample::select(Source::ALL),
            prop::sample::select(Severity::ALL),
            prop::sample::select(Action::ALL),
            0i64..4_000_000_000,
        )
            .prop_map(|(text, source, severity, action, secs)| {
                let ts = chrono::DateTime::from_timestamp(secs, 0)
                    .unwrap()
                    .naive_utc();
                LogRecord::new(text, source, severity, action, ts)
            })
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(record in any_record()) {
            let line = encode(&record);
            prop_assert_eq!(decode(&line), Ok(record));
        }
    }
}
