//! RPC module
//!
//! - JSON-RPC 2.0 dispatch over a `LedgerService`
//! - Methods: status, submit_vote, seal, get_tally, get_chain, get_last_block,
//!   get_block, verify, metrics
//!
//! No transport lives here; the authority binary feeds it newline-delimited
//! requests from stdin.

pub mod handlers;
pub mod types;

pub use handlers::{LedgerService, LedgerStatus, RpcHandler};
pub use types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
