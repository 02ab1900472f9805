//! Chain verification.
//!
//! Walks the chain from genesis and stops at the first block that breaks
//! index contiguity, linkage, hash recomputation or the difficulty predicate.

use crate::ledger::block::{Block, BlockHash};
use crate::ledger::pow::Difficulty;
use crate::utils::errors::{IntegrityFault, LedgerError, Result};
use std::borrow::Borrow;
use tracing::error;

/// Verify an ordered chain sealed under `difficulty`.
pub fn verify_chain<I, B>(blocks: I, difficulty: Difficulty) -> Result<()>
where
    I: IntoIterator<Item = B>,
    B: Borrow<Block>,
{
    let mut expected_prev = BlockHash::ZERO;
    let mut expected_index: u64 = 1;

    for item in blocks {
        let block = item.borrow();
        if let Err(fault) = check_block(block, expected_index, &expected_prev, difficulty) {
            error!(index = expected_index, %fault, "chain integrity violation");
            return Err(LedgerError::integrity(expected_index, fault));
        }
        expected_prev = *block.hash();
        expected_index += 1;
    }

    if expected_index == 1 {
        return Err(LedgerError::integrity(1, IntegrityFault::MissingGenesis));
    }
    Ok(())
}

fn check_block(
    block: &Block,
    expected_index: u64,
    expected_prev: &BlockHash,
    difficulty: Difficulty,
) -> std::result::Result<(), IntegrityFault> {
    if block.index() != expected_index {
        return Err(IntegrityFault::IndexGap { expected: expected_index, found: block.index() });
    }
    if block.previous_hash() != expected_prev {
        return Err(if expected_index == 1 {
            IntegrityFault::GenesisLink
        } else {
            IntegrityFault::BrokenLink
        });
    }
    if block.compute_hash() != *block.hash() {
        return Err(IntegrityFault::HashMismatch);
    }
    if !difficulty.is_met_by(block.hash()) {
        return Err(IntegrityFault::DifficultyNotMet { difficulty: difficulty.zeros() });
    }
    Ok(())
}
