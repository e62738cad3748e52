use std::time::Duration;

/// A point in monotonic time.
///
/// The server never reads the clock itself: callers hand it an `Instant`
/// on every `receive`, which lets tests advance time by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    inner: std::time::Instant,
}

impl Instant {
    /// Creates an Instant from the moment the method is called
    pub fn now() -> Self {
        Self {
            inner: std::time::Instant::now(),
        }
    }

    /// Returns time elapsed between this Instant and `now`, or zero if
    /// `now` is earlier
    pub fn elapsed(&self, now: &Self) -> Duration {
        now.inner.saturating_duration_since(self.inner)
    }

    /// Returns whether this Instant is strictly after another
    pub fn is_after(&self, other: &Self) -> bool {
        self.inner > other.inner
    }

    pub fn add_millis(&mut self, millis: u32) {
        self.inner += Duration::from_millis(u64::from(millis));
    }

    pub fn add_duration(&mut self, duration: Duration) {
        self.inner += duration;
    }

    /// Returns a copy of this Instant moved forward by `duration`
    pub fn offset(&self, duration: Duration) -> Self {
        let mut output = *self;
        output.add_duration(duration);
        output
    }
}
