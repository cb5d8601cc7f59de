//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired entries from every bucket.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::Shards;

/// Shortest period the sweeper will tick at.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns the sweeper for one cache on `runtime`.
///
/// The task holds only a weak reference to the buckets and exits on its own
/// once the cache is gone. The owning cache also aborts it through the
/// returned handle when closed or dropped.
///
/// Each sweep locks one bucket at a time, so foreground reads and writes wait
/// for at most one bucket's worth of work.
pub(crate) fn spawn_sweeper(
    runtime: &Handle,
    shards: Weak<Shards>,
    sweep_interval: Duration,
) -> JoinHandle<()> {
    let period = sweep_interval.max(MIN_SWEEP_INTERVAL);

    runtime.spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", period);

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(shards) = shards.upgrade() else {
                break;
            };
            let removed = shards.sweep_expired().await;
            drop(shards);

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }

        info!("Expiry sweeper stopped");
    })
}
