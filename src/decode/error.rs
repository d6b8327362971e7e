//! Decode error taxonomy

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// A fixed-width or prefixed read ran out of bytes mid-field
    #[error("truncated input at byte {offset} while reading {what}")]
    TruncatedInput { offset: u64, what: &'static str },

    /// A record's declared structure is inconsistent
    #[error("malformed record at byte {offset}: {reason}")]
    MalformedRecord { offset: u64, reason: String },

    #[error("unsupported layout format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("cannot open layout source {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source opened but a later read failed for a reason other than EOF
    #[error("read failed at byte {offset}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

impl DecodeError {
    pub fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        DecodeError::MalformedRecord { offset, reason: reason.into() }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, DecodeError::TruncatedInput { .. })
    }
}
