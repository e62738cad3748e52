use std::{default::Default, env, time::Duration};

use crate::{liveness::LivenessConfig, ConfigError};

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Configuration used to probe connections for liveness
    pub liveness: LivenessConfig,
}

impl ServerConfig {
    /// Builds a config from the defaults, overridden by `CHECK_INTERVAL_MS`
    /// and `PROBE_TIMEOUT_MS` when they are set
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(interval) = read_millis(&lookup, "CHECK_INTERVAL_MS")? {
            config.liveness.probe_interval = interval;
        }
        if let Some(timeout) = read_millis(&lookup, "PROBE_TIMEOUT_MS")? {
            config.liveness.probe_timeout = timeout;
        }
        Ok(config)
    }
}

fn read_millis<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(Some(Duration::from_millis(millis))),
        _ => Err(ConfigError::InvalidValue {
            name,
            expected: "positive number of milliseconds",
            value,
        }),
    }
}
