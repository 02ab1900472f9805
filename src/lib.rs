//! votechain: append-only vote ledger sealed by proof-of-work.
//!
//! - `ledger`: blocks, hashing, proof-of-work, chain store, tally, audit, export
//! - `pool`: pending vote intake
//! - `rpc`: JSON-RPC dispatch over a `LedgerService`
//! - `node`: config, async service, seal scheduler, CLI
//! - `utils`: errors, logging, metrics

pub mod ledger;
pub mod node;
pub mod pool;
pub mod rpc;
pub mod utils;

pub use ledger::{Block, BlockHash, ChainExport, Difficulty, Ledger, Tally, Vote, VoteReceipt};
pub use utils::errors::{IntegrityFault, LedgerError, Result};
