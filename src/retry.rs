//! Bounded retries of DDC exchanges.
//!
//! Each exchange class has its own process-wide bound on the number of
//! tries. Transient faults are retried after a short backoff. Semantic
//! answers from the display end the exchange at once.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use std::fmt;
use crate::error::Error;
use crate::session::{self, Session};
use crate::stats::{self, Outcome};
use crate::trace::TraceGroup;

/// Hard ceiling on any configured try bound.
pub const MAX_MAX_TRIES: u8 = 15;

/// Backoff before retrying a single exchange.
pub const DELAY_RETRY_MS: u64 = crate::DELAY_COMMAND_FAILED_MS;

/// Backoff before restarting a multi-part exchange.
pub const DELAY_MULTI_PART_RETRY_MS: u64 = 200;

/// Class of DDC exchange, each with its own try bound.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RetryType {
    /// A write with no reply.
    WriteOnly,
    /// A write followed by a reply.
    WriteRead,
    /// A sequence of fragment exchanges.
    MultiPart,
}

static MAX_TRIES: [AtomicU8; 3] = [
    AtomicU8::new(4),
    AtomicU8::new(10),
    AtomicU8::new(8),
];

impl RetryType {
    /// Every retry type, in index order.
    pub const ALL: [RetryType; 3] = [RetryType::WriteOnly, RetryType::WriteRead, RetryType::MultiPart];

    pub(crate) fn index(self) -> usize {
        match self {
            RetryType::WriteOnly => 0,
            RetryType::WriteRead => 1,
            RetryType::MultiPart => 2,
        }
    }

    /// The bound a process starts with.
    pub fn default_max_tries(self) -> u8 {
        match self {
            RetryType::WriteOnly => 4,
            RetryType::WriteRead => 10,
            RetryType::MultiPart => 8,
        }
    }

    fn backoff(self) -> Duration {
        match self {
            RetryType::MultiPart => Duration::from_millis(DELAY_MULTI_PART_RETRY_MS),
            _ => Duration::from_millis(DELAY_RETRY_MS),
        }
    }
}

impl fmt::Display for RetryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            RetryType::WriteOnly => "write-only",
            RetryType::WriteRead => "write-read",
            RetryType::MultiPart => "multi-part",
        })
    }
}

/// The ceiling any bound may be set to.
pub fn max_max_tries() -> u8 {
    MAX_MAX_TRIES
}

/// The current try bound for a retry type.
pub fn max_tries(retry_type: RetryType) -> u8 {
    MAX_TRIES[retry_type.index()].load(Ordering::Relaxed)
}

/// Sets the try bound for a retry type, returning the previous bound.
///
/// Bounds outside `1..=MAX_MAX_TRIES` are rejected and leave the setting unchanged.
pub fn set_max_tries(retry_type: RetryType, tries: u8) -> Result<u8, Error> {
    if tries < 1 || tries > MAX_MAX_TRIES {
        return Err(Error::InvalidArgument(format!("max tries {} not in 1..={}", tries, MAX_MAX_TRIES)))
    }

    Ok(MAX_TRIES[retry_type.index()].swap(tries, Ordering::Relaxed))
}

/// A successful result along with how many tries it took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempted<T> {
    /// The result.
    pub value: T,
    /// Tries used, at least 1.
    pub tries: u8,
}

impl<T> Attempted<T> {
    /// Discards the try count.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Runs an exchange under its retry bound.
pub struct Retry<'s> {
    session: &'s Session,
    retry_type: RetryType,
    max_tries: u8,
}

impl<'s> Retry<'s> {
    /// Uses the current process bound for `retry_type`.
    pub fn new(session: &'s Session, retry_type: RetryType) -> Self {
        Retry {
            session,
            retry_type,
            max_tries: max_tries(retry_type),
        }
    }

    /// Overrides the bound for this run only.
    pub fn with_max_tries(mut self, tries: u8) -> Self {
        self.max_tries = tries.max(1).min(MAX_MAX_TRIES);
        self
    }

    #[allow(missing_docs)]
    pub fn retry_type(&self) -> RetryType {
        self.retry_type
    }

    fn is_retryable(&self, e: &Error) -> bool {
        match *e {
            Error::RetriesExhausted { .. } => self.retry_type == RetryType::MultiPart,
            ref e => e.is_retryable(),
        }
    }

    /// Runs `op` until it succeeds, fails non-retryably, or the bound is reached.
    ///
    /// `op` receives the 1-based try number.
    pub fn run<T, F: FnMut(u8) -> Result<T, Error>>(&self, mut op: F) -> Result<Attempted<T>, Error> {
        let mut causes = Vec::new();
        for tries in 1..=self.max_tries {
            if tries > 1 {
                self.session.sleep(self.retry_type.backoff());
            }

            match op(tries) {
                Ok(value) => {
                    if tries > 1 {
                        dbgtrc!(self.session, TraceGroup::RETRY, "run",
                            retry_type = %self.retry_type, tries, "succeeded after retry"
                        );
                    }
                    stats::record_tries(self.retry_type, Outcome::Success(tries));
                    return Ok(Attempted {
                        value,
                        tries,
                    })
                },
                Err(e) => {
                    if !self.is_retryable(&e) {
                        stats::record_tries(self.retry_type, Outcome::Fatal);
                        return Err(e)
                    }

                    stats::record_error(e.status());
                    dbgtrc!(self.session, TraceGroup::RETRY, "run",
                        retry_type = %self.retry_type, tries, max_tries = self.max_tries, error = %e, "try failed"
                    );
                    if session::is_report_ddc_errors_enabled() {
                        self.session.write_err(format_args!("{} try {}/{} failed: {}\n", self.retry_type, tries, self.max_tries, e));
                    }
                    causes.push(e);
                },
            }
        }

        stats::record_tries(self.retry_type, Outcome::Exhausted);
        Err(Error::RetriesExhausted {
            retry_type: self.retry_type,
            tries: self.max_tries,
            causes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;
    use crate::error::ErrorCode;
    use crate::status::Status;

    fn session() -> Session {
        let mut session = Session::new();
        session.set_sleep_multiplier(0.0).unwrap();
        session
    }

    #[test]
    fn bound_validation() {
        assert!(set_max_tries(RetryType::MultiPart, 0).is_err());
        assert!(set_max_tries(RetryType::MultiPart, MAX_MAX_TRIES + 1).is_err());
        assert_eq!(max_max_tries(), MAX_MAX_TRIES);
        assert!(max_tries(RetryType::MultiPart) >= 1);
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let session = session();
        let calls = Cell::new(0);
        let r = Retry::new(&session, RetryType::WriteRead).with_max_tries(5).run(|tries| {
            calls.set(calls.get() + 1);
            assert_eq!(tries, calls.get());
            if tries < 3 {
                Err(ErrorCode::InvalidChecksum.into())
            } else {
                Ok(tries * 10)
            }
        }).unwrap();
        assert_eq!(r, Attempted { value: 30, tries: 3 });
    }

    #[test]
    fn exhaustion_keeps_every_cause() {
        let session = session();
        let calls = Cell::new(0u8);
        let e = Retry::new(&session, RetryType::WriteOnly).with_max_tries(3).run(|_| -> Result<(), Error> {
            calls.set(calls.get() + 1);
            Err(io::Error::from_raw_os_error(libc::EIO).into())
        }).unwrap_err();
        assert_eq!(calls.get(), 3);
        match e {
            Error::RetriesExhausted { retry_type: RetryType::WriteOnly, tries: 3, ref causes } => assert_eq!(causes.len(), 3),
            ref e => panic!("unexpected {:?}", e),
        }
        assert_eq!(e.status(), Status::RETRIES);
    }

    #[test]
    fn semantic_failure_is_not_retried() {
        let session = session();
        let calls = Cell::new(0u8);
        let e = Retry::new(&session, RetryType::WriteRead).with_max_tries(10).run(|_| -> Result<(), Error> {
            calls.set(calls.get() + 1);
            Err(ErrorCode::Unsupported(0x10).into())
        }).unwrap_err();
        assert_eq!(calls.get(), 1);
        assert_eq!(e.status(), Status::REPORTED_UNSUPPORTED);
    }

    #[test]
    fn multi_part_restarts_on_inner_exhaustion() {
        let session = session();
        let calls = Cell::new(0u8);
        let r = Retry::new(&session, RetryType::MultiPart).with_max_tries(3).run(|tries| {
            calls.set(calls.get() + 1);
            if tries == 1 {
                Err(Error::RetriesExhausted { retry_type: RetryType::WriteRead, tries: 1, causes: Vec::new() })
            } else {
                Ok(())
            }
        }).unwrap();
        assert_eq!(r.tries, 2);

        let e = Retry::new(&session, RetryType::WriteRead).with_max_tries(3).run(|_| -> Result<(), Error> {
            Err(Error::RetriesExhausted { retry_type: RetryType::WriteRead, tries: 1, causes: Vec::new() })
        }).unwrap_err();
        match e {
            Error::RetriesExhausted { tries: 1, .. } => (),
            e => panic!("unexpected {:?}", e),
        }
    }
}
