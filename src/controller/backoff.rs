//! # Fibonacci Backoff
//!
//! Progressive backoff for reconciliation retries. Grows more slowly than
//! exponential backoff, which suits operations that may need several retries
//! without overwhelming the ARM API.
//!
//! The sequence is calculated in minutes and converted to seconds for the
//! requeue action: 1m, 1m, 2m, 3m, 5m, 8m, 10m (capped).

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, capped at `max_minutes`.
///
/// # Example
///
/// ```
/// use publishing_profile_controller::controller::backoff::FibonacciBackoff;
///
/// let mut backoff = FibonacciBackoff::new(1, 10);
/// assert_eq!(backoff.next_backoff_seconds(), 60);
/// assert_eq!(backoff.next_backoff_seconds(), 60);
/// assert_eq!(backoff.next_backoff_seconds(), 120);
/// ```
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Minimum backoff value in minutes (for reset)
    min_minutes: u64,
    /// Previous backoff value in minutes
    prev_minutes: u64,
    /// Current backoff value in minutes
    current_minutes: u64,
    /// Maximum backoff value in minutes
    max_minutes: u64,
}

impl FibonacciBackoff {
    /// Create a backoff with the given minimum and cap, both in minutes
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Return the current backoff in seconds and advance the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result_seconds = self.current_minutes * 60;

        let next_minutes = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = std::cmp::min(next_minutes, self.max_minutes);

        result_seconds
    }

    /// Return the current backoff as a `Duration` and advance the sequence
    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Restart the sequence from the minimum
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}
