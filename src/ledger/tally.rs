use crate::ledger::block::Block;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Per-candidate vote counts over sealed blocks, ordered by candidate name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<String, u64>);

impl Tally {
    /// Count every vote in `blocks`. Pending votes never reach here.
    pub fn count<'a, I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = &'a Block>,
    {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for block in blocks {
            for vote in block.votes() {
                *counts.entry(vote.candidate().to_string()).or_insert(0) += 1;
            }
        }
        Tally(counts)
    }

    pub fn get(&self, candidate: &str) -> u64 {
        self.0.get(candidate).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, u64> {
        self.0
    }
}

impl Deref for Tally {
    type Target = BTreeMap<String, u64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
