use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{aggregate::Aggregator, store::SnapshotStore};

pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Refreshes the store once at start and then every `period`.
///
/// A cycle always runs to completion. Cancellation is only observed between
/// cycles, and a cycle that overruns the period delays the next one instead
/// of overlapping it.
#[derive(Debug, Clone)]
pub struct Scheduler {
    aggregator: Aggregator,
    store: Arc<SnapshotStore>,
    period: Duration,
}

impl Scheduler {
    /// A zero `period` is raised to [`MIN_PERIOD`].
    pub fn new(aggregator: Aggregator, store: Arc<SnapshotStore>, period: Duration) -> Self {
        Self { aggregator, store, period: period.max(MIN_PERIOD) }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run a single cycle and publish its result.
    pub async fn refresh(&self) {
        let snapshot = self.aggregator.run().await;
        self.store.publish(snapshot);
    }

    pub async fn run(self, cancel: CancellationToken) {
        info!(period_secs = self.period.as_secs(), "weather refresh scheduler started");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.refresh().await,
            }
        }

        info!("weather refresh scheduler stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
