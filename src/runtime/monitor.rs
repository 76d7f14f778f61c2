//! Periodic scan that recovers dispatcher states stuck waiting on a source
//! that stopped reporting.

use super::config::RuntimeConfig;
use super::dispatcher::Dispatcher;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Owns the fixed-interval stale-state sweep.
///
/// The monitor only inspects and resets dispatcher entries; it never blocks
/// on an evaluation in flight.
pub struct TimeoutMonitor {
    dispatcher: Arc<Dispatcher>,
    config: RuntimeConfig,
}

impl TimeoutMonitor {
    pub fn new(dispatcher: Arc<Dispatcher>, config: RuntimeConfig) -> Self {
        TimeoutMonitor { dispatcher, config }
    }

    /// Spawns the sweep loop onto the current runtime. Abort the handle to
    /// stop monitoring.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.monitor_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let expired = self
                    .dispatcher
                    .expire_stale(self.config.collect_timeout())
                    .await;
                if expired > 0 {
                    debug!(expired, "timeout monitor reset stale transformations");
                }
            }
        })
    }
}
