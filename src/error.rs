//! Error types for listing and extraction

use crate::status::{Code, Status};
use std::ffi::CStr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for listing and extraction
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for listing and extraction
#[derive(Debug, Error)]
pub enum Error {
    /// The source archive could not be opened or was not recognized
    #[error("could not open archive at filepath '{}': {message}", path.display())]
    Open {
        /// Path that was being opened
        path: PathBuf,
        /// Message reported by libarchive
        message: String,
    },
    /// Setting up a libarchive handle failed
    #[error("libarchive error (code {code}): {message}")]
    Archive {
        /// Error code from libarchive
        code: i32,
        /// Error message from libarchive
        message: String,
    },
    /// The codec reported a status that does not allow the operation to continue
    #[error("archive {operation} failed during {step}: {status}")]
    Aborted {
        /// Operation that was aborted, `extraction` or `listing`
        operation: &'static str,
        /// Codec call that reported the status
        step: String,
        /// Status that ended the operation
        status: Status,
    },
    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// libarchive returned a null handle
    #[error("null pointer error")]
    NullPointer,
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check a setup call's return code and convert it to a Result
    pub(crate) unsafe fn from_return_code(
        ret: i32,
        archive: *mut libarchive2_sys::archive,
    ) -> Result<i32> {
        if ret < 0 {
            // SAFETY: Caller must ensure archive is a valid pointer
            let status = unsafe { status_of(archive, ret) };
            Err(Error::Archive {
                code: ret,
                message: status.message.unwrap_or_default(),
            })
        } else {
            Ok(ret)
        }
    }
}

/// Build a [`Status`] from a raw return code, attaching the handle's error
/// string when the code is below OK.
///
/// # Safety
/// `archive` must be a valid, live libarchive handle.
pub(crate) unsafe fn status_of(archive: *mut libarchive2_sys::archive, ret: i32) -> Status {
    let code = Code::from_raw(ret);
    if code >= Code::Ok {
        return Status::new(code);
    }

    // SAFETY: Caller guarantees archive is valid
    unsafe {
        let msg_ptr = libarchive2_sys::archive_error_string(archive);
        let message = if msg_ptr.is_null() {
            format!(
                "Unknown error (errno: {})",
                libarchive2_sys::archive_errno(archive)
            )
        } else {
            CStr::from_ptr(msg_ptr).to_string_lossy().into_owned()
        };
        Status::with_message(code, message)
    }
}
