//! Run statistics.

use crate::access::Classification;
use crate::download::TransferOutcome;

/// Per-collection statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub title: String,
    pub items_fetched: u64,
    pub items_failed: u64,
    pub files_transferred: u64,
    pub files_complete: u64,
    pub files_failed: u64,
    /// Bytes written during this run.
    pub bytes: u64,
    /// Probed size of everything selected for the collection.
    pub total_size: u64,
}

impl CollectionReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn record_outcome(&mut self, outcome: TransferOutcome) {
        match outcome {
            TransferOutcome::AlreadyComplete => self.files_complete += 1,
            TransferOutcome::Completed { bytes } => {
                self.files_transferred += 1;
                self.bytes += bytes;
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        self.items_failed > 0 || self.files_failed > 0
    }
}

/// A collection left out of the run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCollection {
    pub name: String,
    pub reason: String,
}

/// Statistics of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub open: u64,
    pub protected: u64,
    pub eth_required: u64,
    pub unknown: u64,
    /// Outcome of the institution login, if it was attempted.
    pub institution_login: Option<bool>,
    pub collections: Vec<CollectionReport>,
    pub skipped: Vec<SkippedCollection>,
}

impl RunReport {
    pub fn count_tier(&mut self, classification: Classification) {
        match classification {
            Classification::Open => self.open += 1,
            Classification::Protected => self.protected += 1,
            Classification::EthRequired => self.eth_required += 1,
            Classification::Unknown => self.unknown += 1,
        }
    }

    pub fn skip(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        let skipped = SkippedCollection {
            name: name.into(),
            reason: reason.into(),
        };
        tracing::warn!("Skipping '{}': {}", skipped.name, skipped.reason);
        self.skipped.push(skipped);
    }

    pub fn files_transferred(&self) -> u64 {
        self.collections.iter().map(|c| c.files_transferred).sum()
    }

    pub fn files_failed(&self) -> u64 {
        self.collections.iter().map(|c| c.files_failed).sum()
    }

    pub fn bytes(&self) -> u64 {
        self.collections.iter().map(|c| c.bytes).sum()
    }

    /// Whether anything failed or was skipped.
    pub fn has_failures(&self) -> bool {
        !self.skipped.is_empty() || self.collections.iter().any(|c| c.has_failures())
    }
}
