use thiserror::Error;

/// Reason a chain failed verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityFault {
    #[error("chain has no genesis block")]
    MissingGenesis,

    #[error("expected index {expected}, found {found}")]
    IndexGap { expected: u64, found: u64 },

    #[error("genesis previous_hash is not the zero sentinel")]
    GenesisLink,

    #[error("previous_hash does not match the preceding block's hash")]
    BrokenLink,

    #[error("stored hash does not match recomputed hash")]
    HashMismatch,

    #[error("hash does not meet difficulty {difficulty}")]
    DifficultyNotMet { difficulty: u32 },
}

/// Unified error type for the vote ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid vote data: {field} {reason}")]
    InvalidVoteData { field: &'static str, reason: String },

    #[error("no pending votes to seal")]
    NoPendingVotes,

    #[error("chain integrity violation at block {index}: {fault}")]
    ChainIntegrityViolation { index: u64, fault: IntegrityFault },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("seal interrupted before the block was published")]
    SealInterrupted,

    #[error("export error: {0}")]
    Export(String),
}

impl LedgerError {
    pub(crate) fn invalid_vote(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidVoteData { field, reason: reason.into() }
    }

    pub(crate) fn integrity(index: u64, fault: IntegrityFault) -> Self {
        LedgerError::ChainIntegrityViolation { index, fault }
    }
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, LedgerError>;
