//! Pending pool: votes accepted by intake but not yet sealed into a block.
//!
//! Submission order is preserved. Sealing snapshots the pool, then removes
//! exactly the snapshotted prefix on commit, so votes that arrive while
//! proof-of-work runs stay pending for the next block.

use crate::ledger::block::Vote;

#[derive(Debug, Default, Clone)]
pub struct PendingPool {
    votes: Vec<Vote>,
}

impl PendingPool {
    pub fn new() -> Self {
        Self { votes: Vec::new() }
    }

    pub fn push(&mut self, vote: Vote) {
        self.votes.push(vote);
    }

    /// Copy of the current contents, in submission order.
    pub fn snapshot(&self) -> Vec<Vote> {
        self.votes.clone()
    }

    /// Remove and return the oldest `count` votes.
    pub fn take_front(&mut self, count: usize) -> Vec<Vote> {
        let count = count.min(self.votes.len());
        self.votes.drain(..count).collect()
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(r: &str, c: &str) -> Vote {
        Vote::new(r.into(), c.into(), 0)
    }

    #[test]
    fn test_preserves_submission_order() {
        let mut pool = PendingPool::new();
        pool.push(vote("a", "Alice"));
        pool.push(vote("b", "Bob"));
        pool.push(vote("c", "Alice"));
        let refs: Vec<_> = pool.snapshot().iter().map(|v| v.voter_reference().to_string()).collect();
        assert_eq!(refs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_take_front_leaves_late_arrivals() {
        let mut pool = PendingPool::new();
        pool.push(vote("a", "Alice"));
        pool.push(vote("b", "Bob"));
        let snap = pool.snapshot();
        // arrives while the snapshot is being sealed
        pool.push(vote("c", "Carol"));

        let taken = pool.take_front(snap.len());
        assert_eq!(taken, snap);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.votes()[0].voter_reference(), "c");
    }

    #[test]
    fn test_take_front_clamps() {
        let mut pool = PendingPool::new();
        pool.push(vote("a", "Alice"));
        assert_eq!(pool.take_front(10).len(), 1);
        assert!(pool.is_empty());
    }
}
