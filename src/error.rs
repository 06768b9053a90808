use std::{fmt, io};
use thiserror::Error;
use crate::retry::RetryType;
use crate::status::Status;

/// An error that can occur while talking to or managing displays.
#[derive(Debug, Error)]
pub enum Error {
    /// OS-level transport failure
    #[error("DDC/CI transport error: {0}")]
    Io(#[from] io::Error),
    /// Vendor adapter call failed with the raw adapter status
    #[error("adapter call failed with status {0}")]
    Adapter(i32),
    /// USB HID failure
    #[error("USB HID error: {0}")]
    Usb(String),
    /// DDC/CI protocol error or transmission corruption
    #[error("DDC/CI error: {0}")]
    Ddc(ErrorCode),
    /// Every permitted attempt of an exchange failed
    #[error("{retry_type} exchange failed after {tries} tries")]
    RetriesExhausted {
        /// The kind of exchange.
        retry_type: RetryType,
        /// Attempts made.
        tries: u8,
        /// The failure of each attempt, in order.
        causes: Vec<Error>,
    },
    /// The display answered that it does not support the feature
    #[error("feature 0x{0:02x} reported unsupported by the display")]
    ReportedUnsupported(u8),
    /// No metadata is known for the feature
    #[error("unknown feature 0x{0:02x}")]
    UnknownFeature(u8),
    /// Caller supplied an invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// No display matches the identifier
    #[error("display not found")]
    DisplayNotFound,
    /// More than one display matches the identifier
    #[error("identifier matches {0} displays")]
    AmbiguousDisplay(usize),
    /// The display reference is no longer part of the registry
    #[error("display has been removed")]
    DisplayRemoved,
    /// The display is held by another handle
    #[error("display is locked by another handle")]
    Locked,
    /// The operation is not valid in the current state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// The operation is not supported here
    #[error("unimplemented: {0}")]
    Unimplemented(String),
    /// Displays have not been detected yet
    #[error("displays have not been detected")]
    Uninitialized,
    /// A looked up item does not exist
    #[error("not found")]
    NotFound,
    /// Invalid data was supplied or loaded
    #[error("invalid data: {detail}")]
    BadData {
        /// Summary.
        detail: String,
        /// Individual problems.
        causes: Vec<Error>,
    },
    /// Some features of a multi-feature operation failed
    #[error("{failed} of {total} feature operations failed")]
    MultiFeature {
        /// Failed operations.
        failed: usize,
        /// Attempted operations.
        total: usize,
        /// Each failure.
        causes: Vec<Error>,
    },
    /// A value read back after a write did not match what was written
    #[error("feature 0x{code:02x} read back {read:02x?} after writing {written:02x?}")]
    Verify {
        /// The feature written.
        code: u8,
        /// Bytes written.
        written: Vec<u8>,
        /// Bytes read back.
        read: Vec<u8>,
    },
    /// EDID could not be read or parsed
    #[error("invalid EDID: {0}")]
    Edid(String),
}

/// DDC/CI protocol errors
#[derive(Debug, Error, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    /// Expected matching offset from DDC/CI
    #[error("invalid offset returned from DDC/CI")]
    InvalidOffset,
    /// DDC/CI invalid packet length
    #[error("invalid DDC/CI length")]
    InvalidLength,
    /// Checksum mismatch
    #[error("DDC/CI checksum mismatch")]
    InvalidChecksum,
    /// Expected opcode mismatch
    #[error("DDC/CI VCP opcode mismatch")]
    InvalidOpcode,
    /// Expected data mismatch
    #[error("invalid DDC/CI data")]
    InvalidData,
    /// The display sent a null message
    #[error("DDC/CI null response")]
    NullResponse,
    /// Every byte read was zero
    #[error("DDC/CI reply was all zero bytes")]
    AllZero,
    /// The reply carried the unsupported result code for a feature
    #[error("DDC/CI feature 0x{0:02x} unsupported")]
    Unsupported(u8),
    /// Custom unspecified error
    #[error("{0}")]
    Invalid(String),
}

impl ErrorCode {
    /// The status code for this protocol error.
    pub fn status(&self) -> Status {
        match *self {
            ErrorCode::InvalidOffset => Status::MULTI_PART_READ_FRAGMENT,
            ErrorCode::InvalidLength => Status::BAD_BYTECT,
            ErrorCode::NullResponse => Status::NULL_RESPONSE,
            ErrorCode::AllZero => Status::READ_ALL_ZERO,
            ErrorCode::Unsupported(..) => Status::REPORTED_UNSUPPORTED,
            _ => Status::DDC_DATA,
        }
    }
}

impl From<ErrorCode> for Error {
    fn from(e: ErrorCode) -> Self {
        match e {
            ErrorCode::Unsupported(code) => Error::ReportedUnsupported(code),
            e => Error::Ddc(e),
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        match e {
            Error::Io(e) => e,
            e @ Error::Ddc(..) | e @ Error::BadData { .. } | e @ Error::Edid(..) =>
                io::Error::new(io::ErrorKind::InvalidData, e),
            e @ Error::InvalidArgument(..) => io::Error::new(io::ErrorKind::InvalidInput, e),
            e @ Error::DisplayNotFound | e @ Error::NotFound => io::Error::new(io::ErrorKind::NotFound, e),
            e => io::Error::new(io::ErrorKind::Other, e),
        }
    }
}

impl Error {
    /// The status code describing this error.
    pub fn status(&self) -> Status {
        match *self {
            Error::Io(ref e) => Status::from_errno(e.raw_os_error().unwrap_or(libc::EIO)),
            Error::Adapter(code) => Status::from_adapter(code),
            Error::Usb(..) => Status::from_errno(libc::EIO),
            Error::Ddc(ref e) => e.status(),
            Error::RetriesExhausted { ref causes, .. } => {
                let all = |wanted: &[Status]| !causes.is_empty() && causes.iter().all(|e| wanted.contains(&e.status()));
                if all(&[Status::NULL_RESPONSE, Status::DETERMINED_UNSUPPORTED]) {
                    Status::DETERMINED_UNSUPPORTED
                } else if all(&[Status::READ_ALL_ZERO, Status::ALL_TRIES_ZERO]) {
                    Status::ALL_TRIES_ZERO
                } else {
                    Status::RETRIES
                }
            },
            Error::ReportedUnsupported(..) => Status::REPORTED_UNSUPPORTED,
            Error::UnknownFeature(..) => Status::UNKNOWN_FEATURE,
            Error::InvalidArgument(..) => Status::ARG,
            Error::DisplayNotFound | Error::AmbiguousDisplay(..) | Error::DisplayRemoved => Status::INVALID_DISPLAY,
            Error::Locked => Status::LOCKED,
            Error::InvalidOperation(..) => Status::INVALID_OPERATION,
            Error::Unimplemented(..) => Status::UNIMPLEMENTED,
            Error::Uninitialized => Status::UNINITIALIZED,
            Error::NotFound => Status::NOT_FOUND,
            Error::BadData { .. } => Status::BAD_DATA,
            Error::MultiFeature { .. } => Status::MULTI_FEATURE_ERROR,
            Error::Verify { .. } => Status::VERIFY,
            Error::Edid(..) => Status::EDID,
        }
    }

    /// Whether a failed exchange that produced this error may be attempted again.
    ///
    /// Transport faults and protocol corruption are transient. Semantic
    /// answers from the display and caller errors are not.
    pub fn is_retryable(&self) -> bool {
        match *self {
            Error::Io(ref e) => match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => false,
                _ => true,
            },
            Error::Adapter(code) => code < 0,
            Error::Usb(..) | Error::Ddc(..) => true,
            _ => false,
        }
    }

    /// Whether the display has told us, one way or another, that it lacks the feature.
    pub fn is_unsupported(&self) -> bool {
        let status = self.status();
        status == Status::REPORTED_UNSUPPORTED || status == Status::DETERMINED_UNSUPPORTED
    }

    /// The nested causes carried by this error.
    pub fn causes(&self) -> &[Error] {
        match *self {
            Error::RetriesExhausted { ref causes, .. } |
            Error::BadData { ref causes, .. } |
            Error::MultiFeature { ref causes, .. } => causes,
            _ => &[],
        }
    }

    /// A structured snapshot of this error and its causes.
    pub fn detail(&self) -> ErrorDetail {
        ErrorDetail {
            status: self.status(),
            detail: self.to_string(),
            causes: self.causes().iter().map(Error::detail).collect(),
        }
    }
}

/// A structured error report: status, text, and nested causes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Status of this level.
    pub status: Status,
    /// Text of this level.
    pub detail: String,
    /// Causes, possibly nested further.
    pub causes: Vec<ErrorDetail>,
}

impl ErrorDetail {
    /// Creates a report with no causes.
    pub fn new<S: Into<String>>(status: Status, detail: S) -> Self {
        ErrorDetail {
            status,
            detail: detail.into(),
            causes: Vec::new(),
        }
    }

    fn fmt_depth(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        writeln!(f, "{:width$}{}: {}", "", self.status, self.detail, width = depth * 3)?;
        for cause in &self.causes {
            cause.fmt_depth(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_depth(f, 0)
    }
}

impl From<&Error> for ErrorDetail {
    fn from(e: &Error) -> Self {
        e.detail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_code_maps_to_semantic_error() {
        let e: Error = ErrorCode::Unsupported(0x10).into();
        match e {
            Error::ReportedUnsupported(0x10) => (),
            e => panic!("unexpected {:?}", e),
        }
        assert!(!e.is_retryable());
        assert_eq!(e.status(), Status::REPORTED_UNSUPPORTED);
    }

    #[test]
    fn exhausted_status_depends_on_causes() {
        let nulls = Error::RetriesExhausted {
            retry_type: RetryType::WriteRead,
            tries: 2,
            causes: vec![ErrorCode::NullResponse.into(), ErrorCode::NullResponse.into()],
        };
        assert_eq!(nulls.status(), Status::DETERMINED_UNSUPPORTED);
        assert!(nulls.is_unsupported());

        let mixed = Error::RetriesExhausted {
            retry_type: RetryType::WriteRead,
            tries: 2,
            causes: vec![ErrorCode::NullResponse.into(), ErrorCode::InvalidChecksum.into()],
        };
        assert_eq!(mixed.status(), Status::RETRIES);
    }

    #[test]
    fn detail_is_indented() {
        let e = Error::RetriesExhausted {
            retry_type: RetryType::WriteOnly,
            tries: 1,
            causes: vec![io::Error::from_raw_os_error(libc::EIO).into()],
        };
        let detail = e.detail();
        assert_eq!(detail.status, Status::RETRIES);
        assert_eq!(detail.causes.len(), 1);
        assert_eq!(detail.causes[0].status, Status::from_errno(libc::EIO));

        let text = detail.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("   EIO"));
    }

    #[test]
    fn io_conversion() {
        let e: io::Error = Error::Ddc(ErrorCode::InvalidChecksum).into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
    }
}
