//! Process-wide I/O statistics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use std::fmt;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use crate::retry::{RetryType, MAX_MAX_TRIES};
use crate::status::Status;
use crate::transport::IoMode;

static PROCESS_START: Lazy<Instant> = Lazy::new(Instant::now);

static STATS: Lazy<Stats> = Lazy::new(Stats::default);

/// How a retried exchange ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Succeeded on the given try.
    Success(u8),
    /// Every permitted try failed.
    Exhausted,
    /// A non-retryable failure ended it early.
    Fatal,
}

/// Try counts for one retry type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TryStats {
    /// Successes indexed by try number minus one.
    pub successes_by_try: Vec<u64>,
    /// Exchanges that ran out of tries.
    pub exhausted: u64,
    /// Exchanges ended by a non-retryable failure.
    pub fatal: u64,
}

impl TryStats {
    /// Exchanges that succeeded on the first try.
    pub fn first_try_successes(&self) -> u64 {
        self.successes_by_try.first().cloned().unwrap_or(0)
    }

    /// Total exchanges recorded.
    pub fn total(&self) -> u64 {
        self.successes_by_try.iter().sum::<u64>() + self.exhausted + self.fatal
    }
}

#[derive(Default)]
struct Stats {
    tries: Mutex<[TryStats; 3]>,
    errors: Mutex<BTreeMap<Status, u64>>,
    calls: [AtomicU64; 3],
    sleep_nanos: AtomicU64,
    sleeps: AtomicU64,
    since: Mutex<Option<Instant>>,
}

/// A copy of the statistics at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Write-only, write-read and multi-part try counts.
    pub tries: [TryStats; 3],
    /// Failures observed, by status.
    pub errors: BTreeMap<Status, u64>,
    /// Transport calls per I/O mode: I2C, adapter, USB.
    pub calls: [u64; 3],
    /// Total time spent in protocol sleeps.
    pub sleep_time: Duration,
    /// Number of protocol sleeps.
    pub sleeps: u64,
    /// Time since the statistics were last reset.
    pub elapsed: Duration,
}

impl StatsSnapshot {
    /// Try counts for one retry type.
    pub fn tries(&self, retry_type: RetryType) -> &TryStats {
        &self.tries[retry_type.index()]
    }

    /// Transport calls for one I/O mode.
    pub fn calls(&self, mode: IoMode) -> u64 {
        self.calls[mode.index()]
    }

    /// Occurrences of one status.
    pub fn error_count(&self, status: Status) -> u64 {
        self.errors.get(&status).cloned().unwrap_or(0)
    }
}

/// Time since the process first touched the statistics.
pub fn process_elapsed() -> Duration {
    PROCESS_START.elapsed()
}

/// Clears every counter.
pub fn reset_stats() {
    *STATS.tries.lock() = Default::default();
    STATS.errors.lock().clear();
    for calls in &STATS.calls {
        calls.store(0, Ordering::Relaxed);
    }
    STATS.sleep_nanos.store(0, Ordering::Relaxed);
    STATS.sleeps.store(0, Ordering::Relaxed);
    *STATS.since.lock() = Some(Instant::now());
}

/// Copies the current counters.
pub fn snapshot() -> StatsSnapshot {
    let since = (*STATS.since.lock()).unwrap_or(*PROCESS_START);
    StatsSnapshot {
        tries: STATS.tries.lock().clone(),
        errors: STATS.errors.lock().clone(),
        calls: [
            STATS.calls[0].load(Ordering::Relaxed),
            STATS.calls[1].load(Ordering::Relaxed),
            STATS.calls[2].load(Ordering::Relaxed),
        ],
        sleep_time: Duration::from_nanos(STATS.sleep_nanos.load(Ordering::Relaxed)),
        sleeps: STATS.sleeps.load(Ordering::Relaxed),
        elapsed: since.elapsed(),
    }
}

pub(crate) fn record_tries(retry_type: RetryType, outcome: Outcome) {
    let mut tries = STATS.tries.lock();
    let stats = &mut tries[retry_type.index()];
    match outcome {
        Outcome::Success(n) => {
            let index = n.max(1).min(MAX_MAX_TRIES) as usize - 1;
            if stats.successes_by_try.len() <= index {
                stats.successes_by_try.resize(index + 1, 0);
            }
            stats.successes_by_try[index] += 1;
        },
        Outcome::Exhausted => stats.exhausted += 1,
        Outcome::Fatal => stats.fatal += 1,
    }
}

pub(crate) fn record_error(status: Status) {
    *STATS.errors.lock().entry(status).or_insert(0) += 1;
}

pub(crate) fn record_call(mode: IoMode) {
    STATS.calls[mode.index()].fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_sleep(delay: Duration) {
    STATS.sleep_nanos.fetch_add(delay.as_nanos() as u64, Ordering::Relaxed);
    STATS.sleeps.fetch_add(1, Ordering::Relaxed);
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Elapsed: {:?}", self.elapsed)?;
        for &retry_type in &RetryType::ALL {
            let tries = self.tries(retry_type);
            write!(f, "{} exchanges: {} total, by try [", retry_type, tries.total())?;
            for (i, n) in tries.successes_by_try.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", n)?;
            }
            writeln!(f, "], {} exhausted, {} fatal", tries.exhausted, tries.fatal)?;
        }
        for (status, count) in &self.errors {
            writeln!(f, "   {}: {}", status, count)?;
        }
        writeln!(f, "Calls: i2c {}, adapter {}, usb {}", self.calls[0], self.calls[1], self.calls[2])?;
        writeln!(f, "Sleeps: {} totalling {:?}", self.sleeps, self.sleep_time)
    }
}
