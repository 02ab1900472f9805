//! Proof-of-work sealing.
//!
//! Brute-force search for the smallest nonce whose block hash starts with
//! `difficulty` zero hex digits. Expected cost is ~16^difficulty hashes, so the
//! search is CPU-bound and blocking; async callers run it on a blocking thread.

use crate::ledger::block::{BlockHash, BlockHeader};
use crate::utils::errors::{LedgerError, Result};
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Highest accepted difficulty. Beyond this a single seal costs billions of hashes.
pub const MAX_DIFFICULTY: u32 = 8;

/// Required number of leading zero hex digits in a block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Difficulty(u32);

impl Difficulty {
    pub fn new(zeros: u32) -> Result<Self> {
        if zeros > MAX_DIFFICULTY {
            return Err(LedgerError::InvalidConfig(format!(
                "difficulty {} exceeds maximum {}",
                zeros, MAX_DIFFICULTY
            )));
        }
        Ok(Self(zeros))
    }

    pub fn zeros(&self) -> u32 {
        self.0
    }

    pub fn is_met_by(&self, hash: &BlockHash) -> bool {
        hash.leading_zero_nibbles() >= self.0
    }
}

/// Outcome of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seal {
    pub nonce: u64,
    pub hash: BlockHash,
    /// hashes computed, including the winning one
    pub attempts: u64,
}

/// Replace `buf` with the decimal digits of `nonce`, reusing its allocation.
fn write_nonce(buf: &mut String, nonce: u64) {
    buf.clear();
    let res = write!(buf, "{}", nonce);
    debug_assert!(res.is_ok(), "formatting into a String is infallible");
}

/// Find the smallest nonce for `header` that meets `difficulty`.
///
/// Terminates for any accepted difficulty; there is no cancellation.
pub fn search(header: &BlockHeader, difficulty: Difficulty) -> Seal {
    let preimage = header.preimage();

    let mut base = Sha256::new();
    base.update(preimage.prefix());

    let mut digits = String::with_capacity(20);
    let mut nonce: u64 = 0;
    loop {
        write_nonce(&mut digits, nonce);

        let mut hasher = base.clone();
        hasher.update(digits.as_bytes());
        hasher.update(preimage.suffix());
        let hash = BlockHash::from_bytes(hasher.finalize().into());

        if difficulty.is_met_by(&hash) {
            return Seal { nonce, hash, attempts: nonce + 1 };
        }
        nonce = nonce.wrapping_add(1);
    }
}
