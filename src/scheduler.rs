use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::interval;

use crate::competition::{SyncEngine, update_scores};

/// Runs the score batch on a fixed interval inside the server process.
pub struct PeriodicRefresher {
    engine: Arc<SyncEngine>,
    every: Duration,
    hours: i64,
    concurrency: usize,
}

impl PeriodicRefresher {
    pub fn new(engine: Arc<SyncEngine>, every: Duration, hours: i64, concurrency: usize) -> Self {
        Self {
            engine,
            every,
            hours,
            concurrency,
        }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.every);
        // The first tick fires immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match update_scores(&self.engine, self.hours, Utc::now(), self.concurrency).await {
                Ok(report) => tracing::info!(
                    "Scheduled score refresh: {} updated, {} skipped, {} failed",
                    report.updated(),
                    report.skipped(),
                    report.failed()
                ),
                Err(e) => tracing::error!("Scheduled score refresh failed: {}", e),
            }
        }
    }
}
