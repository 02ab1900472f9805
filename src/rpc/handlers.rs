use crate::ledger::{Block, Tally, VoteReceipt};
use crate::rpc::types::*;
use crate::utils::errors::{LedgerError, Result};
use crate::utils::metrics::METRICS;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Chain summary for status calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerStatus {
    pub chain_length: usize,
    pub pending_votes: usize,
    pub difficulty: u32,
}

/// Calls the request-handling layer makes into the ledger.
/// Eligibility and double-vote checks must already have passed before `submit_vote`.
#[async_trait]
pub trait LedgerService: Send + Sync + 'static {
    async fn submit_vote(&self, voter_reference: String, candidate: String) -> Result<VoteReceipt>;

    /// Runs proof-of-work; may take a while at high difficulty.
    async fn seal(&self) -> Result<Arc<Block>>;

    async fn tally(&self) -> Tally;

    async fn chain(&self) -> Vec<Arc<Block>>;

    async fn last_block(&self) -> Arc<Block>;

    async fn block(&self, index: u64) -> Option<Arc<Block>>;

    async fn verify(&self) -> Result<()>;

    async fn status(&self) -> LedgerStatus;
}

/// Dispatches JSON-RPC requests to a `LedgerService`. Transport-agnostic.
pub struct RpcHandler<S: LedgerService> {
    service: Arc<S>,
}

impl<S: LedgerService> Clone for RpcHandler<S> {
    fn clone(&self) -> Self {
        Self { service: self.service.clone() }
    }
}

impl<S: LedgerService> RpcHandler<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Handle one raw request line.
    pub async fn handle_str(&self, raw: &str) -> JsonRpcResponse {
        match serde_json::from_str::<Value>(raw) {
            Ok(payload) => self.handle(payload).await,
            Err(_) => JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"),
        }
    }

    pub async fn handle(&self, payload: Value) -> JsonRpcResponse {
        let id = payload.get("id").cloned();
        let req: JsonRpcRequest = match serde_json::from_value(payload) {
            Ok(r) => r,
            Err(_) => return JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid request"),
        };
        if req.jsonrpc != "2.0" {
            return JsonRpcResponse::error(req.id, INVALID_REQUEST, "jsonrpc must be \"2.0\"");
        }
        debug!(method = %req.method, "rpc request");
        let id = req.id.clone();

        match self.dispatch(&req.method, req.params).await {
            Ok(v) => JsonRpcResponse::result(id, v),
            Err(RpcFailure::UnknownMethod) => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "Method not found"),
            Err(RpcFailure::BadParams(msg)) => JsonRpcResponse::error(id, INVALID_PARAMS, msg),
            Err(RpcFailure::BlockNotFound(index)) => {
                JsonRpcResponse::error(id, BLOCK_NOT_FOUND, format!("block {} not found", index))
            }
            Err(RpcFailure::Ledger(e)) => ledger_error_response(id, &e),
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> std::result::Result<Value, RpcFailure> {
        match method {
            "status" => {
                let st = self.service.status().await;
                Ok(json!({
                    "message": "vote ledger is running",
                    "chain_length": st.chain_length,
                    "pending_votes": st.pending_votes,
                    "difficulty": st.difficulty,
                }))
            }
            "submit_vote" => {
                let params = params.ok_or_else(|| RpcFailure::BadParams("missing params".into()))?;
                let voter_reference = string_param(&params, "voter_reference", 0)?;
                let candidate = string_param(&params, "candidate", 1)?;
                let receipt = self.service.submit_vote(voter_reference, candidate).await?;
                Ok(json!(receipt))
            }
            "seal" => {
                let block = self.service.seal().await?;
                Ok(json!({ "block": block.as_ref(), "votes_included": block.votes().len() }))
            }
            "get_tally" => {
                let tally = self.service.tally().await;
                Ok(json!({ "total": tally.total(), "vote_counts": tally }))
            }
            "get_chain" => {
                let difficulty = self.service.status().await.difficulty;
                let chain = self.service.chain().await;
                let blocks: Vec<&Block> = chain.iter().map(Arc::as_ref).collect();
                Ok(json!({ "difficulty": difficulty, "length": blocks.len(), "chain": blocks }))
            }
            "get_last_block" => {
                let block = self.service.last_block().await;
                Ok(json!(block.as_ref()))
            }
            "get_block" => {
                let params = params.ok_or_else(|| RpcFailure::BadParams("missing params".into()))?;
                let index = u64_param(&params, "index", 0)?;
                match self.service.block(index).await {
                    Some(block) => Ok(json!(block.as_ref())),
                    None => Err(RpcFailure::BlockNotFound(index)),
                }
            }
            "verify" => {
                self.service.verify().await?;
                Ok(json!({ "valid": true }))
            }
            "metrics" => Ok(json!(METRICS.snapshot())),
            _ => Err(RpcFailure::UnknownMethod),
        }
    }
}

enum RpcFailure {
    UnknownMethod,
    BadParams(String),
    BlockNotFound(u64),
    Ledger(LedgerError),
}

impl From<LedgerError> for RpcFailure {
    fn from(e: LedgerError) -> Self {
        RpcFailure::Ledger(e)
    }
}

fn ledger_error_response(id: Option<Value>, e: &LedgerError) -> JsonRpcResponse {
    match e {
        LedgerError::InvalidVoteData { field, reason } => JsonRpcResponse::error_with_data(
            id,
            INVALID_PARAMS,
            e.to_string(),
            Some(json!({ "field": field, "reason": reason })),
        ),
        LedgerError::NoPendingVotes => JsonRpcResponse::error(id, NO_PENDING_VOTES, e.to_string()),
        LedgerError::ChainIntegrityViolation { index, fault } => JsonRpcResponse::error_with_data(
            id,
            CHAIN_INTEGRITY_VIOLATION,
            e.to_string(),
            Some(json!({ "index": index, "fault": fault.to_string() })),
        ),
        _ => JsonRpcResponse::error(id, SERVER_ERROR, e.to_string()),
    }
}

/// params as `{"name": ..}` or positional `[..]`
fn param<'a>(params: &'a Value, name: &str, pos: usize) -> Option<&'a Value> {
    match params {
        Value::Object(map) => map.get(name),
        Value::Array(items) => items.get(pos),
        _ => None,
    }
}

fn string_param(params: &Value, name: &str, pos: usize) -> std::result::Result<String, RpcFailure> {
    param(params, name, pos)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RpcFailure::BadParams(format!("{} must be a string", name)))
}

fn u64_param(params: &Value, name: &str, pos: usize) -> std::result::Result<u64, RpcFailure> {
    param(params, name, pos)
        .and_then(Value::as_u64)
        .ok_or_else(|| RpcFailure::BadParams(format!("{} must be a non-negative integer", name)))
}
