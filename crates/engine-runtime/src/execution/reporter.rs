use engine_core::metrics::{CountersSnapshot, RunCounters};
use std::time::Duration;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::info;

const REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Logs aggregate progress on a fixed interval until told to stop. The first
/// report fires one full interval after the run starts, never at t = 0, and
/// no report is emitted after `finished` is cancelled.
pub async fn report_progress(counters: RunCounters, finished: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + REPORT_INTERVAL, REPORT_INTERVAL);
    loop {
        tokio::select! {
            _ = finished.cancelled() => return,
            _ = ticker.tick() => log_tally(&counters.snapshot()),
        }
    }
}

/// One progress line in the shape `done/total - failure rate (00.0%)`.
pub fn log_tally(snapshot: &CountersSnapshot) {
    info!(
        "{}/{} - failure rate ({:04.1}%)",
        snapshot.done(),
        snapshot.total,
        snapshot.failure_rate()
    );
}
