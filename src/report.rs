//! Per-item outcomes and the batch tally every utility produces.

use crate::error::FolioError;

/// What happened to one file or row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was rewritten (or would be, in dry-run mode)
    Updated,
    /// The file was already in the desired state
    Unchanged,
    /// The file was deliberately left alone
    Skipped,
}

/// Running counts for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    pub fn record_error(&mut self, error: &FolioError) {
        if error.is_warning() {
            self.warnings += 1;
        } else {
            self.errors += 1;
        }
    }

    /// Number of items seen
    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.skipped + self.warnings + self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}
