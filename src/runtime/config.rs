use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the fan-in dispatcher and its timeout monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How long a partially collected round may sit idle before the monitor
    /// discards it.
    pub collect_timeout_secs: u64,
    /// Interval between monitor scans.
    pub monitor_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            collect_timeout_secs: 300,
            monitor_interval_secs: 30,
        }
    }
}

impl RuntimeConfig {
    pub fn collect_timeout(&self) -> Duration {
        Duration::from_secs(self.collect_timeout_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }
}
