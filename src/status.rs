//! Numeric status codes.
//!
//! Every error surfaced by this crate maps onto a signed status code. Errno
//! values are negated, vendor adapter codes are shifted by
//! `ADAPTER_STATUS_OFFSET` (qualified successes stay positive), and the
//! crate's own failure kinds live below `-INTERNAL_STATUS_BASE`.

use std::borrow::Cow;
use std::{fmt, io};

/// Offset applied to vendor adapter status codes.
pub const ADAPTER_STATUS_OFFSET: i32 = 2000;

/// Base of the internal status range.
pub const INTERNAL_STATUS_BASE: i32 = 3000;

/// A signed status code.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Status(pub i32);

/// The range a `Status` falls into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StatusRange {
    /// Success.
    Ok,
    /// An OS errno, positive.
    Errno(i32),
    /// A raw vendor adapter status.
    Adapter(i32),
    /// One of this crate's own codes.
    Internal,
    /// Not in any known range.
    Unrecognized,
}

macro_rules! internal_statuses {
    ($($name:ident = $value:expr, $desc:expr;)*) => {
        impl Status {
            $(
                #[allow(missing_docs)]
                pub const $name: Status = Status($value);
            )*
        }

        const INTERNAL: &[(Status, &str, &str)] = &[
            $((Status($value), concat!("DDCRC_", stringify!($name)), $desc),)*
        ];
    };
}

internal_statuses! {
    DDC_DATA = -3001, "DDC data error";
    NULL_RESPONSE = -3002, "received DDC null response";
    MULTI_PART_READ_FRAGMENT = -3003, "error in fragment of multi-part read";
    ALL_TRIES_ZERO = -3004, "every packet read was all zero";
    REPORTED_UNSUPPORTED = -3005, "DDC reply reports feature unsupported";
    READ_ALL_ZERO = -3006, "packet contained only zero bytes";
    BAD_BYTECT = -3007, "wrong number of bytes in DDC packet";
    READ_EQUALS_WRITE = -3008, "reply echoed the request";
    INVALID_MODE = -3009, "invalid I/O mode";
    RETRIES = -3010, "maximum retries exceeded";
    EDID = -3011, "invalid EDID";
    DETERMINED_UNSUPPORTED = -3012, "feature determined to be unsupported";
    ARG = -3013, "invalid argument";
    INVALID_OPERATION = -3014, "operation not valid in current state";
    UNIMPLEMENTED = -3015, "unimplemented";
    UNINITIALIZED = -3016, "displays not yet detected";
    UNKNOWN_FEATURE = -3017, "feature not in feature table";
    INTERPRETATION_FAILED = -3018, "value interpretation failed";
    MULTI_FEATURE_ERROR = -3019, "error reading or writing multiple features";
    INVALID_DISPLAY = -3020, "display not found or invalid";
    INTERNAL_ERROR = -3021, "internal error";
    OTHER = -3022, "other error";
    VERIFY = -3023, "value read back does not match value set";
    NOT_FOUND = -3024, "not found";
    LOCKED = -3025, "resource is locked";
    ALREADY_OPEN = -3026, "display already open in current thread";
    BAD_DATA = -3027, "invalid data";
}

const ERRNO_NAMES: &[(i32, &str)] = &[
    (libc::EPERM, "EPERM"),
    (libc::ENOENT, "ENOENT"),
    (libc::EINTR, "EINTR"),
    (libc::EIO, "EIO"),
    (libc::ENXIO, "ENXIO"),
    (libc::EBADF, "EBADF"),
    (libc::EAGAIN, "EAGAIN"),
    (libc::ENOMEM, "ENOMEM"),
    (libc::EACCES, "EACCES"),
    (libc::EBUSY, "EBUSY"),
    (libc::ENODEV, "ENODEV"),
    (libc::EINVAL, "EINVAL"),
    (libc::ENOTTY, "ENOTTY"),
    (libc::EPROTO, "EPROTO"),
    (libc::EOPNOTSUPP, "EOPNOTSUPP"),
    (libc::ETIMEDOUT, "ETIMEDOUT"),
    (libc::EREMOTEIO, "EREMOTEIO"),
];

const ADAPTER_NAMES: &[(i32, &str, &str)] = &[
    (4, "ADL_OK_WAIT", "all OK, but need to wait"),
    (3, "ADL_OK_RESTART", "all OK, but need restart"),
    (2, "ADL_OK_MODE_CHANGE", "all OK, but need mode change"),
    (1, "ADL_OK_WARNING", "all OK, but with warning"),
    (-1, "ADL_ERR", "generic adapter error"),
    (-2, "ADL_ERR_NOT_INIT", "adapter library not initialized"),
    (-3, "ADL_ERR_INVALID_PARAM", "invalid parameter"),
    (-4, "ADL_ERR_INVALID_PARAM_SIZE", "invalid parameter size"),
    (-5, "ADL_ERR_INVALID_ADL_IDX", "invalid adapter index"),
    (-6, "ADL_ERR_INVALID_CONTROLLER_IDX", "invalid controller index"),
    (-7, "ADL_ERR_INVALID_DIPLAY_IDX", "invalid display index"),
    (-8, "ADL_ERR_NOT_SUPPORTED", "function not supported by the driver"),
    (-9, "ADL_ERR_NULL_POINTER", "null pointer"),
    (-10, "ADL_ERR_DISABLED_ADAPTER", "adapter is disabled"),
    (-11, "ADL_ERR_INVALID_CALLBACK", "invalid callback"),
    (-12, "ADL_ERR_RESOURCE_CONFLICT", "resource conflict"),
];

impl Status {
    /// Success.
    pub const OK: Status = Status(0);

    /// Maps a positive OS errno onto its status.
    pub fn from_errno(errno: i32) -> Self {
        Status(-errno.abs())
    }

    /// Maps a raw adapter status onto its modulated status.
    ///
    /// Positive adapter codes are qualified successes and stay positive.
    pub fn from_adapter(code: i32) -> Self {
        match code {
            0 => Status::OK,
            code if code > 0 => Status(code + ADAPTER_STATUS_OFFSET),
            code => Status(code - ADAPTER_STATUS_OFFSET),
        }
    }

    /// The raw numeric code.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Whether this is a success, qualified or not.
    pub fn is_ok(self) -> bool {
        self.0 >= 0
    }

    /// Classifies the code.
    pub fn range(self) -> StatusRange {
        let code = self.0;
        if code == 0 {
            StatusRange::Ok
        } else if code < 0 && code > -ADAPTER_STATUS_OFFSET {
            StatusRange::Errno(-code)
        } else if code <= -ADAPTER_STATUS_OFFSET && code > -INTERNAL_STATUS_BASE {
            StatusRange::Adapter(code + ADAPTER_STATUS_OFFSET)
        } else if code > ADAPTER_STATUS_OFFSET && code < INTERNAL_STATUS_BASE {
            StatusRange::Adapter(code - ADAPTER_STATUS_OFFSET)
        } else if code <= -INTERNAL_STATUS_BASE && code > -INTERNAL_STATUS_BASE - 1000 {
            StatusRange::Internal
        } else {
            StatusRange::Unrecognized
        }
    }

    /// The symbolic name of the code, if it is a known one.
    pub fn name(self) -> Option<&'static str> {
        match self.range() {
            StatusRange::Ok => Some("OK"),
            StatusRange::Errno(errno) => ERRNO_NAMES.iter()
                .find(|&&(e, _)| e == errno)
                .map(|&(_, name)| name),
            StatusRange::Adapter(code) => ADAPTER_NAMES.iter()
                .find(|&&(c, ..)| c == code)
                .map(|&(_, name, _)| name),
            StatusRange::Internal => INTERNAL.iter()
                .find(|&&(s, ..)| s == self)
                .map(|&(_, name, _)| name),
            StatusRange::Unrecognized => None,
        }
    }

    /// A human readable description of the code.
    pub fn description(self) -> Cow<'static, str> {
        let desc = match self.range() {
            StatusRange::Ok => Some("success"),
            StatusRange::Errno(errno) => return io::Error::from_raw_os_error(errno).to_string().into(),
            StatusRange::Adapter(code) => ADAPTER_NAMES.iter()
                .find(|&&(c, ..)| c == code)
                .map(|&(.., desc)| desc),
            StatusRange::Internal => INTERNAL.iter()
                .find(|&&(s, ..)| s == self)
                .map(|&(.., desc)| desc),
            StatusRange::Unrecognized => None,
        };

        desc.unwrap_or("unknown status code").into()
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_modulation() {
        assert_eq!(Status::from_adapter(-1), Status(-2001));
        assert_eq!(Status::from_adapter(1), Status(2001));
        assert_eq!(Status::from_adapter(0), Status::OK);
        assert_eq!(Status(-2008).range(), StatusRange::Adapter(-8));
        assert_eq!(Status(2001).range(), StatusRange::Adapter(1));
        assert!(Status(2001).is_ok());
        assert_eq!(Status(-2008).name(), Some("ADL_ERR_NOT_SUPPORTED"));
    }

    #[test]
    fn errno() {
        let s = Status::from_errno(libc::EIO);
        assert_eq!(s.range(), StatusRange::Errno(libc::EIO));
        assert_eq!(s.name(), Some("EIO"));
        assert!(!s.description().is_empty());
    }

    #[test]
    fn internal() {
        assert_eq!(Status::RETRIES.name(), Some("DDCRC_RETRIES"));
        assert_eq!(Status::VERIFY.code(), -3023);
        assert_eq!(Status::LOCKED.range(), StatusRange::Internal);
        assert_eq!(Status(-3999).name(), None);
        assert_eq!(Status(-3999).description(), "unknown status code");
        assert_eq!(Status(12345).range(), StatusRange::Unrecognized);
        assert_eq!(Status::BAD_DATA.to_string(), "DDCRC_BAD_DATA(-3027)");
    }
}
