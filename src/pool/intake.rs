//! Intake: checks that vote identifiers are well formed before they enter the pool.
//!
//! Eligibility and double-vote checks belong to the caller's voter registry;
//! this layer only rejects malformed text.

use crate::utils::errors::{LedgerError, Result};

/// Longest accepted identifier, in bytes.
pub const MAX_FIELD_LEN: usize = 256;

pub fn validate_vote_input(voter_reference: &str, candidate: &str) -> Result<()> {
    validate_field("voter_reference", voter_reference)?;
    validate_field("candidate", candidate)?;
    Ok(())
}

fn validate_field(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::invalid_vote(field, "must not be empty"));
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(LedgerError::invalid_vote(
            field,
            format!("longer than {} bytes", MAX_FIELD_LEN),
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(LedgerError::invalid_vote(field, "contains control characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(res: Result<()>) -> &'static str {
        match res {
            Err(LedgerError::InvalidVoteData { field, .. }) => field,
            other => panic!("expected InvalidVoteData, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_plain_identifiers() {
        assert!(validate_vote_input("v1", "Alice").is_ok());
        assert!(validate_vote_input("voter-0042", "Zoë Ñúñez").is_ok());
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(rejected_field(validate_vote_input("", "Alice")), "voter_reference");
        assert_eq!(rejected_field(validate_vote_input("v1", "   ")), "candidate");
    }

    #[test]
    fn test_rejects_control_chars_and_oversize() {
        assert_eq!(rejected_field(validate_vote_input("v1\n", "Alice")), "voter_reference");
        assert_eq!(rejected_field(validate_vote_input("v1", "Al\u{0}ice")), "candidate");
        let long = "x".repeat(MAX_FIELD_LEN + 1);
        assert_eq!(rejected_field(validate_vote_input("v1", &long)), "candidate");
        assert!(validate_vote_input("v1", &"x".repeat(MAX_FIELD_LEN)).is_ok());
    }
}
