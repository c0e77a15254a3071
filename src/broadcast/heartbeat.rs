//! Periodic refresh pings for live displays

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::broadcaster::Broadcaster;
use super::events::QueueEvent;

/// Longest heartbeat period (one day); longer periods are clamped to it
pub const MAX_HEARTBEAT_SECS: u64 = 24 * 60 * 60;

/// Publishes a `refresh` event on a fixed interval
pub struct Heartbeat {
    broadcaster: Broadcaster,
    period: Duration,
}

impl Heartbeat {
    pub fn new(broadcaster: Broadcaster, period: Duration) -> Self {
        Self {
            broadcaster,
            period: period.clamp(Duration::from_millis(1), Duration::from_secs(MAX_HEARTBEAT_SECS)),
        }
    }

    /// Run until `shutdown` flips to true or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = self.period.as_secs_f64(), "Heartbeat started");

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let delivered = self
                        .broadcaster
                        .publish(QueueEvent::refresh(Some("heartbeat".to_string())));
                    debug!(delivered, "Heartbeat sent");
                }

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Heartbeat stopped");
    }
}
