use std::time::Duration;

/// Minimum time between two accepted button presses from one connection
pub const BUTTON_COOLDOWN: Duration = Duration::from_secs(10);
/// How long an identity may sit in a waiting queue before it is removed
pub const WAITING_EVICTION: Duration = Duration::from_secs(10);

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PORT: u16 = 3000;
