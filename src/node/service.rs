//! Async boundary over a shared `Ledger`.
//!
//! Proof-of-work and chain verification are CPU-bound, so they run on tokio's
//! blocking pool instead of the async worker threads.

use crate::ledger::{Block, Ledger, Tally, VoteReceipt};
use crate::rpc::handlers::{LedgerService, LedgerStatus};
use crate::utils::errors::{LedgerError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};

#[derive(Clone)]
pub struct AuthorityService {
    ledger: Arc<Ledger>,
}

impl AuthorityService {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }
}

/// A panicking worker takes the caller down with it; a cancelled one means the
/// runtime is shutting down and nothing was published.
fn join_failure(e: JoinError) -> LedgerError {
    if e.is_panic() {
        std::panic::resume_unwind(e.into_panic());
    }
    LedgerError::SealInterrupted
}

/// Await a blocking ledger call. A block is only published by a call that ran
/// to completion, so a cancelled call leaves the chain untouched.
async fn finish<T>(task: JoinHandle<Result<T>>) -> Result<T> {
    task.await.map_err(join_failure)?
}

#[async_trait]
impl LedgerService for AuthorityService {
    async fn submit_vote(&self, voter_reference: String, candidate: String) -> Result<VoteReceipt> {
        self.ledger.add_vote(&voter_reference, &candidate)
    }

    async fn seal(&self) -> Result<Arc<Block>> {
        let ledger = self.ledger.clone();
        finish(tokio::task::spawn_blocking(move || ledger.seal())).await
    }

    async fn tally(&self) -> Tally {
        self.ledger.tally()
    }

    async fn chain(&self) -> Vec<Arc<Block>> {
        self.ledger.chain()
    }

    async fn last_block(&self) -> Arc<Block> {
        self.ledger.last_block()
    }

    async fn block(&self, index: u64) -> Option<Arc<Block>> {
        self.ledger.block(index)
    }

    async fn verify(&self) -> Result<()> {
        let ledger = self.ledger.clone();
        finish(tokio::task::spawn_blocking(move || ledger.verify())).await
    }

    async fn status(&self) -> LedgerStatus {
        LedgerStatus {
            chain_length: self.ledger.chain_len(),
            pending_votes: self.ledger.pending_len(),
            difficulty: self.ledger.difficulty().zeros(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Difficulty, ManualClock};
    use futures::future::join_all;

    fn service(zeros: u32) -> AuthorityService {
        let ledger = Ledger::with_clock(Difficulty::new(zeros).unwrap(), Arc::new(ManualClock::new(0, 1)));
        AuthorityService::new(Arc::new(ledger))
    }

    #[tokio::test]
    async fn test_concrete_scenario() {
        let svc = service(1);
        svc.submit_vote("v1".into(), "Alice".into()).await.unwrap();
        svc.submit_vote("v2".into(), "Bob".into()).await.unwrap();
        svc.seal().await.unwrap();

        let tally = svc.tally().await;
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.get("Alice"), 1);
        assert_eq!(tally.get("Bob"), 1);
        assert_eq!(svc.chain().await.len(), 2);
        assert!(svc.verify().await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_intake_proceeds_while_sealing() {
        let svc = service(3);
        for i in 0..10 {
            svc.submit_vote(format!("early-{}", i), "Alice".into()).await.unwrap();
        }

        let sealer = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.seal().await })
        };
        let voters = (0..10).map(|i| {
            let svc = svc.clone();
            async move { svc.submit_vote(format!("late-{}", i), "Bob".into()).await }
        });
        for res in join_all(voters).await {
            res.unwrap();
        }
        let sealed = sealer.await.unwrap().unwrap();

        // everything pending at seal start is in the block; later arrivals either
        // made the snapshot or are still pending, never both and never lost
        let in_block = sealed.votes().len();
        assert!(in_block >= 10);
        assert_eq!(in_block + svc.ledger().pending_len(), 20);

        if svc.ledger().pending_len() > 0 {
            svc.seal().await.unwrap();
        }
        let tally = svc.tally().await;
        assert_eq!(tally.get("Alice"), 10);
        assert_eq!(tally.get("Bob"), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_receipts_report_pool_size_at_intake() {
        let svc = service(0);
        let voters = (0..25).map(|i| {
            let svc = svc.clone();
            async move { svc.submit_vote(format!("v{}", i), "Alice".into()).await }
        });
        let mut sizes: Vec<usize> = join_all(voters)
            .await
            .into_iter()
            .map(|r| r.unwrap().pending_votes)
            .collect();
        sizes.sort_unstable();
        assert_eq!(sizes, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_seal_cancelled_by_runtime_shutdown_publishes_nothing() {
        let svc = service(1);
        svc.ledger().add_vote("v1", "Alice").unwrap();

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let handle = rt.handle().clone();
        rt.shutdown_background();

        // a blocking task offered to a stopped runtime never runs
        let ledger = svc.ledger().clone();
        let task = handle.spawn_blocking(move || ledger.seal());
        let res = futures::executor::block_on(finish(task));

        assert_eq!(res.unwrap_err(), LedgerError::SealInterrupted);
        assert_eq!(svc.ledger().chain_len(), 1);
        assert_eq!(svc.ledger().pending_len(), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "pow worker died")]
    async fn test_worker_panic_reaches_caller() {
        let task = tokio::task::spawn_blocking(|| -> Result<Arc<Block>> { panic!("pow worker died") });
        let _ = finish(task).await;
    }

    #[tokio::test]
    async fn test_status() {
        let svc = service(0);
        svc.submit_vote("v1".into(), "Alice".into()).await.unwrap();
        let st = svc.status().await;
        assert_eq!(st, LedgerStatus { chain_length: 1, pending_votes: 1, difficulty: 0 });
    }
}
