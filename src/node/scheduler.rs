//! Periodic sealer: on every tick, seals the pending pool if it holds votes.
//!
//! Runs as a tokio task and observes the node's shutdown channel. A seal that
//! has started always finishes before the loop checks for shutdown again.

use crate::rpc::handlers::LedgerService;
use crate::utils::errors::LedgerError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, debug};

pub struct SealScheduler<S: LedgerService> {
    service: Arc<S>,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl<S: LedgerService> SealScheduler<S> {
    pub fn new(service: Arc<S>, period: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self { service, period, shutdown }
    }

    /// Start the sealing loop (spawn this on tokio)
    pub async fn run(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately; skip it so a fresh node does not seal at once
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("seal scheduler shutdown signal received");
                        return;
                    }
                    continue;
                }
            }

            match self.service.seal().await {
                Ok(block) => info!(index = block.index(), votes = block.votes().len(), "scheduled seal committed"),
                Err(LedgerError::NoPendingVotes) => debug!("no pending votes, skipping scheduled seal"),
                Err(e) => error!(error = %e, "scheduled seal failed"),
            }
        }
    }
}
