//! Error types for TOON decoding and encoding.
//!
//! Every failure in this crate is reported through the single [`Error`] enum.
//! Decode errors carry the 1-based line number and a truncated rendering of
//! the offending line, so a message is actionable without re-reading the
//! input:
//!
//! ```rust
//! let err = toon::decode("user:\n   id: 1").unwrap_err();
//! assert!(err.to_string().contains("line 2"));
//! ```

use std::fmt;
use thiserror::Error;

/// Offending lines are echoed back truncated to this many characters.
const CONTEXT_LIMIT: usize = 200;

/// All errors produced by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed TOON input.
    #[error("{message} at line {line}: {context}")]
    Parse {
        /// 1-based line number the error was detected on.
        line: usize,
        /// What went wrong.
        message: String,
        /// The offending line, truncated to 200 characters.
        context: String,
    },

    /// I/O failure from the reader/writer entry points.
    #[error("I/O error: {0}")]
    Io(String),

    /// Error raised by the serde adapter layer (unsupported shapes,
    /// type mismatches, custom messages from `Serialize`/`Deserialize`).
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a parse error pointing at `line`, echoing `raw` as context.
    pub(crate) fn parse(line: usize, message: impl Into<String>, raw: &str) -> Self {
        Error::Parse {
            line,
            message: message.into(),
            context: truncate_context(raw),
        }
    }

    pub(crate) fn io(err: &std::io::Error) -> Self {
        Error::Io(err.to_string())
    }

    /// Creates an adapter-layer error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// The 1-based line number for parse errors, `None` otherwise.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}

fn truncate_context(raw: &str) -> String {
    if raw.chars().count() <= CONTEXT_LIMIT {
        raw.to_string()
    } else {
        let mut out: String = raw.chars().take(CONTEXT_LIMIT).collect();
        out.push('…');
        out
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
