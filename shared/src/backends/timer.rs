use std::time::Duration;

use super::Instant;

/// A Timer with a given duration after which it will enter into a "Ringing"
/// state. The Timer can be reset at an given time, or manually set to start
/// "Ringing" again.
pub struct Timer {
    duration: Duration,
    last: Instant,
}

impl Timer {
    /// Creates a new Timer with a given Duration, starting at `now`
    pub fn new(duration: Duration, now: &Instant) -> Self {
        Self {
            duration,
            last: *now,
        }
    }

    /// Reset the Timer to stop ringing and wait till 'Duration' has elapsed
    /// again
    pub fn reset(&mut self, now: &Instant) {
        self.last = *now;
    }

    /// Gets whether or not the Timer is "Ringing" (i.e. the given Duration has
    /// elapsed since the last "reset")
    pub fn ringing(&self, now: &Instant) -> bool {
        self.last.elapsed(now) >= self.duration
    }

    /// The instant at which the Timer will next start ringing
    pub fn rings_at(&self) -> Instant {
        self.last.offset(self.duration)
    }
}
