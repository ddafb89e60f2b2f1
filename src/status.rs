//! Severity-coded status values returned by libarchive operations

use crate::error::{Error, Result};
use std::fmt;
use tracing::warn;

/// Raw libarchive return code for success
pub const ARCHIVE_OK: i32 = 0;
/// Raw libarchive return code for end of entries or end of entry data
pub const ARCHIVE_EOF: i32 = 1;
/// Raw libarchive return code for a retryable condition
pub const ARCHIVE_RETRY: i32 = -10;
/// Raw libarchive return code for a partial success
pub const ARCHIVE_WARN: i32 = -20;
/// Raw libarchive return code for a failure of the current operation
pub const ARCHIVE_FAILED: i32 = -25;
/// Raw libarchive return code after which the handle is unusable
pub const ARCHIVE_FATAL: i32 = -30;

/// Status code of a codec operation
///
/// Variants are declared from most to least severe, so the derived ordering
/// compares by severity: `Fatal < Failed < Warn < Retry < Ok < Eof`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Code {
    /// The handle can no longer be used
    Fatal,
    /// The current operation failed
    Failed,
    /// The operation succeeded partially
    Warn,
    /// The operation may succeed if repeated
    Retry,
    /// Success
    Ok,
    /// End of entries, or end of the current entry's data
    Eof,
}

impl Code {
    /// Map a raw libarchive return code onto a status code
    ///
    /// Negative codes libarchive does not document are treated as fatal,
    /// other positive codes as success.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            ARCHIVE_EOF => Code::Eof,
            ARCHIVE_RETRY => Code::Retry,
            ARCHIVE_WARN => Code::Warn,
            ARCHIVE_FAILED => Code::Failed,
            ARCHIVE_FATAL => Code::Fatal,
            r if r < ARCHIVE_OK => Code::Fatal,
            _ => Code::Ok,
        }
    }

    /// The raw libarchive value of this code
    pub fn raw(self) -> i32 {
        match self {
            Code::Ok => ARCHIVE_OK,
            Code::Eof => ARCHIVE_EOF,
            Code::Retry => ARCHIVE_RETRY,
            Code::Warn => ARCHIVE_WARN,
            Code::Failed => ARCHIVE_FAILED,
            Code::Fatal => ARCHIVE_FATAL,
        }
    }

    /// Severity tier of this code
    pub fn severity(self) -> Severity {
        match self {
            Code::Ok | Code::Eof => Severity::Success,
            Code::Retry | Code::Warn => Severity::Recoverable,
            Code::Failed | Code::Fatal => Severity::Abort,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Code::Ok => "ok",
            Code::Eof => "eof",
            Code::Retry => "retry",
            Code::Warn => "warn",
            Code::Failed => "failed",
            Code::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// How the caller must react to a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing to report
    Success,
    /// Log and keep going
    Recoverable,
    /// Log and abort the running operation
    Abort,
}

/// Result of one codec operation, with libarchive's diagnostic when there is one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Status code
    pub code: Code,
    /// Human-readable error string reported by the handle
    pub message: Option<String>,
}

impl Status {
    /// A successful status
    pub const OK: Status = Status {
        code: Code::Ok,
        message: None,
    };

    /// Create a status without a diagnostic
    pub fn new(code: Code) -> Self {
        Status {
            code,
            message: None,
        }
    }

    /// Create a status carrying a diagnostic message
    pub fn with_message(code: Code, message: impl Into<String>) -> Self {
        Status {
            code,
            message: Some(message.into()),
        }
    }

    /// Severity tier of the code
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Whether the status is below OK
    pub fn is_error(&self) -> bool {
        self.code < Code::Ok
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::OK
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} ({})", message, self.code),
            None => write!(f, "{} (code {})", self.code, self.code.raw()),
        }
    }
}

/// Apply the two-tier severity policy to the status of one codec call
///
/// RETRY and WARN are logged and let `operation` continue, returning
/// `Ok(true)`. FAILED and FATAL abort it with [`Error::Aborted`], which
/// carries the status to the caller. `step` names the codec call.
pub(crate) fn enforce(status: &Status, operation: &'static str, step: &str) -> Result<bool> {
    match status.severity() {
        Severity::Success => Ok(false),
        Severity::Recoverable => {
            warn!(code = %status.code, "{step}: {status}");
            Ok(true)
        }
        Severity::Abort => Err(Error::Aborted {
            operation,
            step: step.to_string(),
            status: status.clone(),
        }),
    }
}
