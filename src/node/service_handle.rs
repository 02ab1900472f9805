use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use anyhow::Result;

/// Background tasks of a running authority plus the shutdown channel they watch.
pub struct ServiceHandle {
    shutdown_tx: watch::Sender<bool>,
    join_handles: Vec<JoinHandle<Result<()>>>,
}

impl ServiceHandle {
    /// Create a new ServiceHandle and return it together with a Receiver clonable by tasks.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        let handle = ServiceHandle { shutdown_tx: tx, join_handles: vec![] };
        (handle, rx)
    }

    pub fn attach(&mut self, h: JoinHandle<Result<()>>) {
        self.join_handles.push(h);
    }

    pub fn task_count(&self) -> usize {
        self.join_handles.len()
    }

    /// Signal shutdown and wait for every task. An in-flight seal finishes first.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);

        for res in join_all(self.join_handles).await {
            match res {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("service task returned error: {:?}", e),
                Err(e) => tracing::error!("task join error: {:?}", e),
            }
        }
        Ok(())
    }

    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }
}
