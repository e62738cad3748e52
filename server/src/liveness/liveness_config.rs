use std::{default::Default, time::Duration};

use pairup_shared::{DEFAULT_PROBE_INTERVAL, DEFAULT_PROBE_TIMEOUT};

/// Configuration used to probe connections for liveness
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LivenessConfig {
    /// How often an idle connection is sent a liveness probe
    pub probe_interval: Duration,
    /// How long a connection has to answer a probe before it is terminated
    pub probe_timeout: Duration,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            probe_interval: DEFAULT_PROBE_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}
