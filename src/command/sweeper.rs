//! Periodic expiry sweep for pending commands

use super::broker::CommandBroker;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

/// Sweeps expired commands on a fixed timer
///
/// Poll and status sweep on their own; this only bounds how long an
/// expired command can linger when nobody is reading the queue.
pub struct ExpirySweeper {
    broker: Arc<CommandBroker>,
    check_interval: Duration,
}

impl ExpirySweeper {
    /// Create a new sweeper
    pub fn new(broker: Arc<CommandBroker>, check_interval: Duration) -> Self {
        Self {
            broker,
            check_interval,
        }
    }

    /// Run the sweep loop forever
    pub async fn run(&self) {
        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let report = self.broker.sweep().await;
            if report.is_empty() {
                debug!("Expiry sweep found nothing to remove");
                continue;
            }

            info!(
                expired = report.expired.len(),
                stale_cooldowns = report.stale_cooldowns,
                "Expiry sweep removed entries"
            );
        }
    }

    /// Spawn the sweep loop onto the runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }
}
