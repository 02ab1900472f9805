use crate::ledger::block::{Block, BlockHash};
use std::sync::Arc;

/// Append-only in-memory chain. Genesis is held apart so the store is never empty.
#[derive(Debug)]
pub struct BlockStore {
    genesis: Arc<Block>,
    /// blocks after genesis; position i holds index i+2
    sealed: Vec<Arc<Block>>,
}

impl BlockStore {
    pub fn new(genesis: Arc<Block>) -> Self {
        debug_assert!(genesis.is_genesis());
        Self { genesis, sealed: Vec::new() }
    }

    /// Caller guarantees `block.index() == len() + 1` and linkage to the tip.
    pub fn append(&mut self, block: Arc<Block>) {
        debug_assert_eq!(block.index(), self.next_index());
        self.sealed.push(block);
    }

    /// Block at a 1-based index.
    pub fn get(&self, index: u64) -> Option<Arc<Block>> {
        match index {
            0 => None,
            1 => Some(self.genesis.clone()),
            _ => {
                let pos = usize::try_from(index - 2).ok()?;
                self.sealed.get(pos).cloned()
            }
        }
    }

    pub fn last(&self) -> &Arc<Block> {
        self.sealed.last().unwrap_or(&self.genesis)
    }

    /// Hash the next block must link to.
    pub fn tip_hash(&self) -> BlockHash {
        *self.last().hash()
    }

    pub fn next_index(&self) -> u64 {
        self.len() as u64 + 1
    }

    /// Number of blocks, genesis included; never zero.
    pub fn len(&self) -> usize {
        self.sealed.len() + 1
    }

    /// Blocks from genesis to tip.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Block>> + '_ {
        std::iter::once(&self.genesis).chain(self.sealed.iter())
    }
}
