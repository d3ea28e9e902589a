//! Time source for expiry decisions.
//!
//! Expiry is the only time-dependent rule in the crate, so the seam is small:
//! a wall clock in production, a frozen one in tests.

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Whether `deadline` lies strictly before now. A missing deadline never passes.
    fn has_passed(&self, deadline: Option<DateTime<Utc>>) -> bool {
        deadline.is_some_and(|at| at < self.now_utc())
    }

    /// Whole days left until `deadline`, floored at zero.
    fn days_until(&self, deadline: DateTime<Utc>) -> i64 {
        (deadline - self.now_utc()).num_days().max(0)
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a chosen instant until advanced.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    frozen_at: DateTime<Utc>,
}

#[cfg(any(test, feature = "test-seams"))]
impl MockClock {
    /// Freeze at `frozen_at`.
    pub fn new(frozen_at: DateTime<Utc>) -> Self {
        Self { frozen_at }
    }

    /// Freeze at an RFC 3339 instant.
    pub fn from_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        let frozen_at = DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc);
        Ok(Self { frozen_at })
    }

    /// Move time forward (or back, with a negative duration).
    pub fn advance(&mut self, by: Duration) {
        self.frozen_at += by;
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.frozen_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> MockClock {
        MockClock::from_rfc3339("2025-01-15T12:00:00Z").unwrap()
    }

    #[test]
    fn system_clock_is_after_mock_epoch() {
        assert!(SystemClock.now_utc() > noon().now_utc());
    }

    #[test]
    fn deadline_passes_strictly_after() {
        let mut clock = noon();
        let deadline = clock.now_utc();
        assert!(!clock.has_passed(Some(deadline)));
        clock.advance(Duration::seconds(1));
        assert!(clock.has_passed(Some(deadline)));
        assert!(!clock.has_passed(None));
    }

    #[test]
    fn days_until_floors_at_zero() {
        let clock = noon();
        let now = clock.now_utc();
        assert_eq!(clock.days_until(now + Duration::hours(36)), 1);
        assert_eq!(clock.days_until(now - Duration::days(3)), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(MockClock::from_rfc3339("yesterday").is_err());
    }
}
