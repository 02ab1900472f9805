//! Vote and block records, and the canonical preimage a block hash commits to.
//!
//! The preimage is compact JSON with keys in lexicographic order:
//!
//! ```text
//! {"index":1,"nonce":7,"previous_hash":"00..00","sealed_at":1700000000000,
//!  "votes":[{"candidate":"Alice","cast_at":1700000000000,"voter_reference":"v1"}]}
//! ```
//!
//! A block's export form is the same object with a `"hash"` key added. Field
//! declaration order in `Vote` and `Block` is that key order and must not change.

use crate::ledger::clock::Timestamp;
use crate::utils::serde_helpers::{as_hex, from_hex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 block digest, hex encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// previous_hash of the genesis block
    pub const ZERO: BlockHash = BlockHash([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Number of leading `0` characters in the hex rendering.
    pub fn leading_zero_nibbles(&self) -> u32 {
        let mut total = 0u32;
        for b in self.0 {
            if b == 0 {
                total += 2;
            } else {
                if b < 0x10 {
                    total += 1;
                }
                break;
            }
        }
        total
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.to_hex())
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        as_hex(&self.0, s)
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        from_hex(d).map(BlockHash)
    }
}

/// One ballot. Eligibility of `voter_reference` is checked by the caller, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    candidate: String,
    cast_at: Timestamp,
    voter_reference: String,
}

impl Vote {
    pub(crate) fn new(voter_reference: String, candidate: String, cast_at: Timestamp) -> Self {
        Self { candidate, cast_at, voter_reference }
    }

    pub fn voter_reference(&self) -> &str {
        &self.voter_reference
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn cast_at(&self) -> Timestamp {
        self.cast_at
    }
}

/// Block contents before proof-of-work fixes the nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub index: u64,
    pub sealed_at: Timestamp,
    pub votes: Vec<Vote>,
    pub previous_hash: BlockHash,
}

impl BlockHeader {
    pub fn genesis(sealed_at: Timestamp) -> Self {
        Self {
            index: 1,
            sealed_at,
            votes: Vec::new(),
            previous_hash: BlockHash::ZERO,
        }
    }

    pub fn preimage(&self) -> Preimage {
        Preimage::from_parts(self.index, &self.previous_hash, self.sealed_at, &self.votes)
    }
}

#[derive(Serialize)]
struct PreimageTail<'a> {
    previous_hash: &'a BlockHash,
    sealed_at: Timestamp,
    votes: &'a [Vote],
}

/// Canonical preimage split around the nonce digits, so the proof-of-work
/// search can hash the prefix once.
#[derive(Debug, Clone)]
pub struct Preimage {
    prefix: Vec<u8>,
    suffix: Vec<u8>,
}

impl Preimage {
    pub fn from_parts(index: u64, previous_hash: &BlockHash, sealed_at: Timestamp, votes: &[Vote]) -> Self {
        let prefix = format!("{{\"index\":{},\"nonce\":", index).into_bytes();

        let tail = serde_json::to_vec(&PreimageTail { previous_hash, sealed_at, votes })
            .expect("preimage fields are strings and integers");
        // tail is `{"previous_hash":...}`; swap its opening brace for the separator after the nonce
        let mut suffix = Vec::with_capacity(tail.len());
        suffix.push(b',');
        suffix.extend_from_slice(&tail[1..]);

        Self { prefix, suffix }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn suffix(&self) -> &[u8] {
        &self.suffix
    }

    pub fn to_bytes(&self, nonce: u64) -> Vec<u8> {
        let digits = nonce.to_string();
        let mut out = Vec::with_capacity(self.prefix.len() + digits.len() + self.suffix.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(digits.as_bytes());
        out.extend_from_slice(&self.suffix);
        out
    }

    pub fn hash(&self, nonce: u64) -> BlockHash {
        let mut hasher = Sha256::new();
        hasher.update(&self.prefix);
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(&self.suffix);
        BlockHash(hasher.finalize().into())
    }
}

/// One sealed, immutable unit of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    hash: BlockHash,
    index: u64,
    nonce: u64,
    previous_hash: BlockHash,
    sealed_at: Timestamp,
    votes: Vec<Vote>,
}

impl Block {
    pub(crate) fn from_sealed(header: BlockHeader, nonce: u64, hash: BlockHash) -> Self {
        Self {
            hash,
            index: header.index,
            nonce,
            previous_hash: header.previous_hash,
            sealed_at: header.sealed_at,
            votes: header.votes,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn sealed_at(&self) -> Timestamp {
        self.sealed_at
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn previous_hash(&self) -> &BlockHash {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 1
    }

    pub fn preimage(&self) -> Preimage {
        Preimage::from_parts(self.index, &self.previous_hash, self.sealed_at, &self.votes)
    }

    /// Digest recomputed from the stored fields; equals `hash()` for an untampered block.
    pub fn compute_hash(&self) -> BlockHash {
        self.preimage().hash(self.nonce)
    }

    #[cfg(test)]
    pub(crate) fn votes_mut(&mut self) -> &mut Vec<Vote> {
        &mut self.votes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block(nonce: u64) -> Block {
        let header = BlockHeader {
            index: 2,
            sealed_at: 1_700_000_000_123,
            votes: vec![
                Vote::new("v1".into(), "Alice".into(), 1_700_000_000_001),
                Vote::new("v2".into(), "Bob \"the builder\"".into(), 1_700_000_000_002),
            ],
            previous_hash: BlockHash::from_bytes([7u8; 32]),
        };
        let hash = header.preimage().hash(nonce);
        Block::from_sealed(header, nonce, hash)
    }

    #[test]
    fn test_preimage_is_sorted_key_json_without_hash() {
        let block = sample_block(42);
        let mut value = serde_json::to_value(&block).unwrap();
        value.as_object_mut().unwrap().remove("hash");
        // serde_json::Value maps are key-sorted
        assert_eq!(serde_json::to_vec(&value).unwrap(), block.preimage().to_bytes(42));
    }

    #[test]
    fn test_preimage_layout() {
        let header = BlockHeader::genesis(5);
        let bytes = header.preimage().to_bytes(0);
        let expected = format!(
            "{{\"index\":1,\"nonce\":0,\"previous_hash\":\"{}\",\"sealed_at\":5,\"votes\":[]}}",
            "0".repeat(64)
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_export_key_order() {
        let json = serde_json::to_string(&sample_block(1)).unwrap();
        assert!(json.starts_with("{\"hash\":\""));
        assert!(json.contains("\"votes\":[{\"candidate\":\"Alice\",\"cast_at\":1700000000001,\"voter_reference\":\"v1\"}"));
    }

    #[test]
    fn test_hash_stable_across_recomputation() {
        let block = sample_block(9);
        assert_eq!(block.compute_hash(), *block.hash());
        assert_eq!(block.compute_hash(), block.compute_hash());
        let reparsed: Block = serde_json::from_str(&serde_json::to_string(&block).unwrap()).unwrap();
        assert_eq!(reparsed.compute_hash(), *block.hash());
    }

    #[test]
    fn test_every_field_moves_the_hash() {
        let block = sample_block(9);
        let base = block.compute_hash();

        let mut b = block.clone();
        b.sealed_at += 1;
        assert_ne!(b.compute_hash(), base);

        let mut b = block.clone();
        b.index += 1;
        assert_ne!(b.compute_hash(), base);

        let mut b = block.clone();
        b.nonce += 1;
        assert_ne!(b.compute_hash(), base);

        let mut b = block.clone();
        b.previous_hash = BlockHash::ZERO;
        assert_ne!(b.compute_hash(), base);

        let mut b = block.clone();
        b.votes[0].candidate = "Alicf".into();
        assert_ne!(b.compute_hash(), base);

        let mut b = block.clone();
        b.votes.swap(0, 1);
        assert_ne!(b.compute_hash(), base);
    }

    #[test]
    fn test_leading_zero_nibbles() {
        let mut bytes = [0xffu8; 32];
        assert_eq!(BlockHash::from_bytes(bytes).leading_zero_nibbles(), 0);
        bytes[0] = 0x0f;
        assert_eq!(BlockHash::from_bytes(bytes).leading_zero_nibbles(), 1);
        bytes[0] = 0x00;
        assert_eq!(BlockHash::from_bytes(bytes).leading_zero_nibbles(), 2);
        bytes[1] = 0x01;
        assert_eq!(BlockHash::from_bytes(bytes).leading_zero_nibbles(), 3);
        assert_eq!(BlockHash::ZERO.leading_zero_nibbles(), 64);
    }

    #[test]
    fn test_block_hash_hex_roundtrip() {
        let h = BlockHash::from_bytes([0x1a; 32]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", "1a".repeat(32)));
        assert_eq!(serde_json::from_str::<BlockHash>(&json).unwrap(), h);
        assert_eq!(h.to_string(), "1a".repeat(32));
    }
}
