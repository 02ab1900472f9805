//! Node orchestration: wire up ledger, service, rpc dispatch and the seal scheduler.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;
use crate::ledger::{ChainExport, Clock, Ledger, SystemClock};
use crate::node::config::AuthorityConfig;
use crate::node::scheduler::SealScheduler;
use crate::node::service::AuthorityService;
use crate::node::service_handle::ServiceHandle;
use crate::rpc::RpcHandler;

/// Main Node object
pub struct Node {
    cfg: AuthorityConfig,
    ledger: Arc<Ledger>,
    service: Arc<AuthorityService>,
}

impl Node {
    /// Build the ledger (sealing genesis) from a validated config.
    pub fn new(cfg: AuthorityConfig) -> Result<Self> {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(cfg: AuthorityConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        cfg.validate()?;
        let ledger = Arc::new(Ledger::with_clock(cfg.difficulty()?, clock));
        let service = Arc::new(AuthorityService::new(ledger.clone()));
        Ok(Self { cfg, ledger, service })
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn service(&self) -> &Arc<AuthorityService> {
        &self.service
    }

    pub fn rpc_handler(&self) -> RpcHandler<AuthorityService> {
        RpcHandler::new(self.service.clone())
    }

    /// Start background tasks and return ServiceHandle for graceful shutdown.
    pub fn start(&self) -> ServiceHandle {
        let (mut svc_handle, shutdown_rx) = ServiceHandle::new();

        if let Some(ms) = self.cfg.seal_interval_ms {
            let scheduler = SealScheduler::new(
                self.service.clone(),
                std::time::Duration::from_millis(ms),
                shutdown_rx.clone(),
            );
            let h: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
                scheduler.run().await;
                Ok(())
            });
            svc_handle.attach(h);
        }

        info!(
            difficulty = self.ledger.difficulty().zeros(),
            seal_interval_ms = ?self.cfg.seal_interval_ms,
            "authority started"
        );
        svc_handle
    }

    /// Stop background tasks, then write the chain export if one is configured.
    pub async fn stop(&self, handle: ServiceHandle) -> Result<()> {
        handle.shutdown().await?;
        if let Some(path) = &self.cfg.export_path {
            ChainExport::from_ledger(&self.ledger).write_to(path)?;
        }
        info!(chain_length = self.ledger.chain_len(), "authority stopped");
        Ok(())
    }
}
