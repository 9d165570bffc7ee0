//! Post-hoc filtering of records already read from the store.
//!
//! Every enabled facet makes its own pass over the full original sequence
//! and appends its matches to one shared result. Enabling several facets
//! therefore yields the union of their matches, and a record matching two
//! facets shows up twice. This mirrors the behaviour existing users see and
//! is kept until someone decides the panel should narrow (intersect)
//! instead.

use crate::log_entry::LogRecord;
use crate::types::{Action, Severity, Source};
use chrono::{NaiveDate, NaiveTime, Timelike};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// One toggleable predicate value. The value is kept while disabled so a
/// panel can switch the facet back on without re-entering it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facet<T> {
    pub enabled: bool,
    pub value: T,
}

impl<T> Facet<T> {
    pub fn on(value: T) -> Self {
        Self {
            enabled: true,
            value,
        }
    }

    fn active(&self) -> Option<&T> {
        self.enabled.then_some(&self.value)
    }
}

/// Inclusive range of hours of the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl HourRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Matches on the hour alone. Minutes of the boundary hours never
    /// exclude a record, so 09:45-17:10 admits 09:05 and 17:55.
    pub fn contains(&self, time: NaiveTime) -> bool {
        (self.start.hour()..=self.end.hour()).contains(&time.hour())
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl FromStr for HourRange {
    type Err = String;

    /// `HH:MM-HH:MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("expected HH:MM-HH:MM, got {:?}", s))?;
        let parse = |t: &str| {
            NaiveTime::parse_from_str(t.trim(), "%H:%M")
                .map_err(|e| format!("invalid time {:?}: {}", t, e))
        };
        Ok(Self::new(parse(start)?, parse(end)?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSettings {
    pub text: Facet<String>,
    pub date: Facet<NaiveDate>,
    pub hours: Facet<HourRange>,
    pub severity: Facet<Severity>,
    pub source: Facet<Source>,
    pub action: Facet<Action>,
}

impl FilterSettings {
    pub fn with_text(mut self, needle: impl Into<String>) -> Self {
        self.text = Facet::on(needle.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Facet::on(date);
        self
    }

    pub fn with_hours(mut self, hours: HourRange) -> Self {
        self.hours = Facet::on(hours);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Facet::on(severity);
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Facet::on(source);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Facet::on(action);
        self
    }

    pub fn any_enabled(&self) -> bool {
        self.text.enabled
            || self.date.enabled
            || self.hours.enabled
            || self.severity.enabled
            || self.source.enabled
            || self.action.enabled
    }
}

/// Filter view over a sequence loaded from the store.
pub struct FilterEngine<'a> {
    original: &'a [LogRecord],
}

impl<'a> FilterEngine<'a> {
    pub fn new(original: &'a [LogRecord]) -> Self {
        Self { original }
    }

    /// Union of the matches of every enabled facet, in facet order text,
    /// date, hours, severity, source, action. Empty when no facet is on.
    pub fn apply(&self, settings: &FilterSettings) -> Vec<LogRecord> {
        let mut result = Vec::new();

        if let Some(needle) = settings.text.active() {
            self.collect(&mut result, |r| r.text().contains(needle.as_str()));
        }
        if let Some(date) = settings.date.active() {
            self.collect(&mut result, |r| r.timestamp().date() == *date);
        }
        if let Some(hours) = settings.hours.active() {
            self.collect(&mut result, |r| hours.contains(r.timestamp().time()));
        }
        if let Some(severity) = settings.severity.active() {
            self.collect(&mut result, |r| r.severity() == *severity);
        }
        if let Some(source) = settings.source.active() {
            self.collect(&mut result, |r| r.source() == *source);
        }
        if let Some(action) = settings.action.active() {
            self.collect(&mut result, |r| r.action() == *action);
        }

        result
    }

    /// The original sequence itself, not a copy.
    pub fn reset(&self) -> &'a [LogRecord] {
        self.original
    }

    /// `apply` when any facet is enabled, otherwise the untouched original.
    pub fn view(&self, settings: &FilterSettings) -> Cow<'a, [LogRecord]> {
        if settings.any_enabled() {
            Cow::Owned(self.apply(settings))
        } else {
            Cow::Borrowed(self.reset())
        }
    }

    fn collect(&self, out: &mut Vec<LogRecord>, matches: impl Fn(&LogRecord) -> bool) {
        out.extend(self.original.iter().filter(|r| matches(r)).cloned());
    }
}
