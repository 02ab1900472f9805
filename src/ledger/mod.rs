pub mod block;
pub mod clock;
pub mod export;
pub mod pow;
pub mod store;
pub mod tally;
pub mod verify;

pub use block::{Block, BlockHash, BlockHeader, Vote};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use export::ChainExport;
pub use pow::{Difficulty, Seal, MAX_DIFFICULTY};
pub use store::BlockStore;
pub use tally::Tally;
pub use verify::verify_chain;

use crate::pool::{validate_vote_input, PendingPool};
use crate::utils::errors::{LedgerError, Result};
use crate::utils::metrics::{self, METRICS};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct LedgerState {
    store: BlockStore,
    pending: PendingPool,
}

/// An accepted vote and the pool size right after it was pooled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub vote: Vote,
    pub pending_votes: usize,
}

/// Sealed chain plus the open pool of pending votes.
///
/// Share it behind an `Arc`. Intake and the seal commit take the write lock;
/// reads clone `Arc<Block>`s out under the read lock. Proof-of-work runs with
/// no lock held.
pub struct Ledger {
    state: RwLock<LedgerState>,
    difficulty: Difficulty,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Build a ledger and seal its genesis block.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_clock(difficulty, Arc::new(SystemClock))
    }

    pub fn with_clock(difficulty: Difficulty, clock: Arc<dyn Clock>) -> Self {
        let header = BlockHeader::genesis(clock.now());
        let seal = pow::search(&header, difficulty);
        METRICS.add_counter(metrics::POW_ATTEMPTS, seal.attempts);

        let genesis = Arc::new(Block::from_sealed(header, seal.nonce, seal.hash));
        info!(hash = %genesis.hash(), nonce = seal.nonce, difficulty = difficulty.zeros(), "genesis sealed");

        let store = BlockStore::new(genesis);
        METRICS.set_gauge(metrics::CHAIN_LENGTH, 1.0);
        METRICS.set_gauge(metrics::PENDING_VOTES, 0.0);

        Self {
            state: RwLock::new(LedgerState { store, pending: PendingPool::new() }),
            difficulty,
            clock,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Append a vote to the pending pool. Eligibility is the caller's concern.
    pub fn add_vote(&self, voter_reference: &str, candidate: &str) -> Result<VoteReceipt> {
        if let Err(e) = validate_vote_input(voter_reference, candidate) {
            METRICS.inc_counter(metrics::VOTES_REJECTED);
            debug!(error = %e, "vote rejected");
            return Err(e);
        }

        let mut st = self.state.write();
        // timestamp under the lock so cast_at follows submission order
        let vote = Vote::new(voter_reference.to_string(), candidate.to_string(), self.clock.now());
        st.pending.push(vote.clone());
        let pending = st.pending.len();
        drop(st);

        METRICS.inc_counter(metrics::VOTES_ACCEPTED);
        METRICS.set_gauge(metrics::PENDING_VOTES, pending as f64);
        debug!(voter_reference, candidate, pending, "vote accepted");
        Ok(VoteReceipt { vote, pending_votes: pending })
    }

    /// Seal every pending vote into a new block.
    ///
    /// Blocks the calling thread for the proof-of-work search. If another seal
    /// commits first, the candidate is rebuilt from the new tip and searched again.
    pub fn seal(&self) -> Result<Arc<Block>> {
        loop {
            let header = {
                let st = self.state.read();
                if st.pending.is_empty() {
                    return Err(LedgerError::NoPendingVotes);
                }
                BlockHeader {
                    index: st.store.next_index(),
                    sealed_at: self.clock.now(),
                    votes: st.pending.snapshot(),
                    previous_hash: st.store.tip_hash(),
                }
            };

            info!(index = header.index, votes = header.votes.len(), "sealing block");
            let seal = pow::search(&header, self.difficulty);
            METRICS.add_counter(metrics::POW_ATTEMPTS, seal.attempts);

            let mut st = self.state.write();
            if st.store.tip_hash() != header.previous_hash {
                drop(st);
                METRICS.inc_counter(metrics::SEAL_RETRIES);
                warn!(index = header.index, "chain tip moved during proof-of-work, retrying");
                continue;
            }

            st.pending.take_front(header.votes.len());
            let block = Arc::new(Block::from_sealed(header, seal.nonce, seal.hash));
            st.store.append(block.clone());
            let (chain_len, pending) = (st.store.len(), st.pending.len());
            drop(st);

            METRICS.inc_counter(metrics::BLOCKS_SEALED);
            METRICS.set_gauge(metrics::CHAIN_LENGTH, chain_len as f64);
            METRICS.set_gauge(metrics::PENDING_VOTES, pending as f64);
            info!(
                index = block.index(),
                hash = %block.hash(),
                nonce = block.nonce(),
                attempts = seal.attempts,
                votes = block.votes().len(),
                "block sealed"
            );
            return Ok(block);
        }
    }

    /// Per-candidate counts over sealed blocks; pending votes are not counted.
    pub fn tally(&self) -> Tally {
        let blocks = self.chain();
        Tally::count(blocks.iter().map(Arc::as_ref))
    }

    /// Re-derive every hash and link from genesis to tip.
    pub fn verify(&self) -> Result<()> {
        let blocks = self.chain();
        verify_chain(blocks.iter().map(Arc::as_ref), self.difficulty)
    }

    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    pub fn chain(&self) -> Vec<Arc<Block>> {
        self.state.read().store.iter().cloned().collect()
    }

    pub fn last_block(&self) -> Arc<Block> {
        self.state.read().store.last().clone()
    }

    /// Block at a 1-based index.
    pub fn block(&self, index: u64) -> Option<Arc<Block>> {
        self.state.read().store.get(index)
    }

    /// Number of sealed blocks, genesis included.
    pub fn chain_len(&self) -> usize {
        self.state.read().store.len()
    }

    pub fn pending_len(&self) -> usize {
        self.state.read().pending.len()
    }

    pub fn pending_votes(&self) -> Vec<Vote> {
        self.state.read().pending.snapshot()
    }
}
