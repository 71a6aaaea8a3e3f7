// 7.0: periodic control loops. each service owns one timer-driven task; the
// timer delivers at most one pending tick, so a slow round skips the next tick
// instead of queueing it and processing never overlaps itself.

mod insurance;
mod liquidation;

pub use insurance::{InsuranceService, InsuranceServiceConfig};
pub use liquidation::{LiquidationService, LiquidationServiceConfig, ScanSummary};

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Owner's handle to a spawned service loop. Stopping is cooperative: the
/// current account finishes, the loop exits before the next one.
pub struct ServiceHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ServiceHandle {
    pub(crate) fn new(shutdown: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self { shutdown, task }
    }

    /// Signal the loop to stop and wait for it to wind down.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
