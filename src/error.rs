use thiserror::Error;

/// Errors raised while scanning a single log line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("unknown severity: {0:?}")]
    UnknownSeverity(String),

    #[error("unknown source: {0:?}")]
    UnknownSource(String),

    #[error("unknown action: {0:?}")]
    UnknownAction(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed entry on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: ParseError,
    },

    #[error("Log store is not initialized")]
    NotInitialized,
}
