use std::thread::sleep;
use std::time::{Instant, Duration};
use crate::stats;

/// Largest accepted sleep multiplier.
pub const MAX_SLEEP_MULTIPLIER: f64 = 10.0;

/// A type that can help with implementing the DDC specificationed delays.
#[derive(Clone, Debug)]
pub struct Delay {
    time: Option<Instant>,
    delay: Duration,
}

impl Delay {
    /// Creates a new delay starting now.
    pub fn new(delay: Duration) -> Self {
        Delay {
            time: Some(Instant::now()),
            delay: delay,
        }
    }

    /// The time remaining in this delay.
    pub fn remaining(&self) -> Duration {
        self.time.as_ref().and_then(|time| self.delay.checked_sub(time.elapsed())).unwrap_or(Duration::default())
    }

    /// Waits out the remaining time in this delay.
    pub fn sleep(&mut self) {
        if let Some(delay) = self.time.take().and_then(|time| self.delay.checked_sub(time.elapsed())) {
            sleep_for(delay);
        }
    }
}

impl Default for Delay {
    fn default() -> Self {
        Delay {
            time: None,
            delay: Default::default(),
        }
    }
}

/// Scales a nominal delay by a sleep multiplier.
pub fn scale(delay: Duration, multiplier: f64) -> Duration {
    if !(multiplier > 0.0) {
        Duration::default()
    } else {
        delay.mul_f64(multiplier.min(MAX_SLEEP_MULTIPLIER))
    }
}

/// Sleeps, accounting the time in the process statistics.
pub fn sleep_for(delay: Duration) {
    if delay > Duration::default() {
        sleep(delay);
        stats::record_sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling() {
        let d = Duration::from_millis(40);
        assert_eq!(scale(d, 1.0), d);
        assert_eq!(scale(d, 0.5), Duration::from_millis(20));
        assert_eq!(scale(d, 0.0), Duration::default());
        assert_eq!(scale(d, ::std::f64::NAN), Duration::default());
    }

    #[test]
    fn remaining() {
        let mut delay = Delay::new(Duration::from_secs(60));
        assert!(delay.remaining() > Duration::from_secs(50));
        assert_eq!(Delay::default().remaining(), Duration::default());
        delay = Delay::new(Duration::default());
        delay.sleep();
        assert_eq!(delay.remaining(), Duration::default());
    }
}
