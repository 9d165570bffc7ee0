//! Append-only application event log with size-capped rotation.
//!
//! [`LogStore`] owns `AppLog.log`, serializes every file access behind one
//! gate and rotates the file once it reaches the configured size.
//! [`FilterEngine`] filters records already read back.

pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod log_entry;
pub mod log_store;
pub mod rotation;
pub mod types;

pub use config::LogConfig;
pub use error::{ParseError, StoreError};
pub use filter::{Facet, FilterEngine, FilterSettings, HourRange};
pub use log_entry::LogRecord;
pub use log_store::{LogStore, WriteOutcome};
pub use types::{Action, Severity, SeverityThreshold, Source};
