use std::time::SystemTime;

use log::warn;
use thiserror::Error;

/// Error type for timestamp operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeError {
    /// System time is before UNIX epoch
    #[error("System time is before UNIX epoch")]
    SystemTimeBeforeEpoch,
}

/// Wall-clock time, used only for the human-readable acknowledgements sent
/// to clients. Every timer in the server runs on [`Instant`](super::Instant).
pub struct Timestamp;

impl Timestamp {
    /// Returns the current timestamp in milliseconds since UNIX epoch.
    ///
    /// # Errors
    /// Returns `TimeError::SystemTimeBeforeEpoch` if system time is before UNIX epoch.
    pub fn try_now_millis() -> Result<u64, TimeError> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|_| TimeError::SystemTimeBeforeEpoch)
    }

    /// Like [`Timestamp::try_now_millis`], but reports 0 instead of failing.
    pub fn now_millis_or_zero() -> u64 {
        match Self::try_now_millis() {
            Ok(millis) => millis,
            Err(error) => {
                warn!("{}", error);
                0
            }
        }
    }
}
