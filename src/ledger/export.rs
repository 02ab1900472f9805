use crate::ledger::block::Block;
use crate::ledger::pow::Difficulty;
use crate::ledger::verify::verify_chain;
use crate::ledger::Ledger;
use crate::utils::errors::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Exported chain, `{"difficulty": D, "length": N, "chain": [...]}`.
///
/// `difficulty` is the one the chain was sealed under, so an audit needs no
/// out-of-band setting. Imported chains are untrusted until `verify` passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainExport {
    pub difficulty: u32,
    pub length: usize,
    pub chain: Vec<Block>,
}

impl ChainExport {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let chain: Vec<Block> = ledger.chain().iter().map(|b| b.as_ref().clone()).collect();
        Self { difficulty: ledger.difficulty().zeros(), length: chain.len(), chain }
    }

    /// Recorded sealing difficulty; out-of-range values are rejected.
    pub fn sealed_difficulty(&self) -> Result<Difficulty> {
        Difficulty::new(self.difficulty)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::Export(e.to_string()))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let export: ChainExport =
            serde_json::from_str(data).map_err(|e| LedgerError::Export(e.to_string()))?;
        if export.length != export.chain.len() {
            return Err(LedgerError::Export(format!(
                "length field says {} but chain holds {} blocks",
                export.length,
                export.chain.len()
            )));
        }
        Ok(export)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        fs::write(path, json)
            .map_err(|e| LedgerError::Export(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), blocks = self.length, "chain exported");
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| LedgerError::Export(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&data)
    }

    /// Audit against the recorded sealing difficulty.
    pub fn verify(&self) -> Result<()> {
        verify_chain(&self.chain, self.sealed_difficulty()?)
    }

    /// Audit, additionally requiring every hash to meet `floor`.
    pub fn verify_at_least(&self, floor: Difficulty) -> Result<()> {
        let difficulty = self.sealed_difficulty()?.max(floor);
        verify_chain(&self.chain, difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::clock::ManualClock;
    use crate::utils::errors::IntegrityFault;
    use std::sync::Arc;

    fn populated(d: Difficulty) -> Ledger {
        let l = Ledger::with_clock(d, Arc::new(ManualClock::new(50, 3)));
        l.add_vote("v1", "Alice").unwrap();
        l.add_vote("v2", "Bob").unwrap();
        l.seal().unwrap();
        l.add_vote("v3", "Alice").unwrap();
        l.seal().unwrap();
        l
    }

    #[test]
    fn test_file_roundtrip_verifies() {
        let d = Difficulty::new(1).unwrap();
        let export = ChainExport::from_ledger(&populated(d));
        assert_eq!(export.length, 3);

        let path = std::env::temp_dir().join(format!("votechain-export-{}.json", std::process::id()));
        export.write_to(&path).unwrap();
        let back = ChainExport::read_from(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(back, export);
        assert!(back.verify().is_ok());
    }

    #[test]
    fn test_edited_json_fails_at_edited_block() {
        let d = Difficulty::new(1).unwrap();
        let json = ChainExport::from_ledger(&populated(d)).to_json_pretty().unwrap();
        let edited = json.replacen("\"candidate\": \"Bob\"", "\"candidate\": \"Bod\"", 1);
        assert_ne!(edited, json);

        let export = ChainExport::from_json(&edited).unwrap();
        assert_eq!(
            export.verify().unwrap_err(),
            LedgerError::ChainIntegrityViolation { index: 2, fault: IntegrityFault::HashMismatch }
        );
    }

    #[test]
    fn test_recorded_difficulty_drives_audit() {
        let export = ChainExport::from_ledger(&populated(Difficulty::new(2).unwrap()));
        let json = export.to_json_pretty().unwrap();
        assert!(json.contains("\"difficulty\": 2"));

        let back = ChainExport::from_json(&json).unwrap();
        assert_eq!(back.sealed_difficulty().unwrap().zeros(), 2);
        assert!(back.verify().is_ok());
        assert!(back.verify_at_least(Difficulty::new(0).unwrap()).is_ok());
        assert!(back.verify_at_least(Difficulty::new(2).unwrap()).is_ok());
    }

    #[test]
    fn test_floor_above_sealed_difficulty_fails() {
        let export = ChainExport::from_ledger(&populated(Difficulty::new(1).unwrap()));
        let floor = Difficulty::new(6).unwrap();
        assert!(export.chain.iter().any(|b| !floor.is_met_by(b.hash())));
        assert!(matches!(
            export.verify_at_least(floor),
            Err(LedgerError::ChainIntegrityViolation {
                fault: IntegrityFault::DifficultyNotMet { difficulty: 6 },
                ..
            })
        ));
    }

    #[test]
    fn test_raised_recorded_difficulty_is_caught() {
        let mut export = ChainExport::from_ledger(&populated(Difficulty::new(1).unwrap()));
        export.difficulty = 6;
        assert!(export.verify().is_err());
        export.difficulty = 12;
        assert!(matches!(export.verify(), Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let d = Difficulty::new(0).unwrap();
        let mut export = ChainExport::from_ledger(&populated(d));
        export.length = 7;
        let json = serde_json::to_string(&export).unwrap();
        assert!(matches!(ChainExport::from_json(&json), Err(LedgerError::Export(_))));
    }

    #[test]
    fn test_missing_file() {
        let res = ChainExport::read_from("/nonexistent/votechain/chain.json");
        assert!(matches!(res, Err(LedgerError::Export(_))));
    }
}
