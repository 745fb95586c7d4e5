use serde::Serialize;

use crate::model::{Approval, StockRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub full_rows: usize,
    pub restricted_rows: usize,
    pub dropped_empty_keys: usize,
    pub duplicates_removed: usize,
    pub total: usize,
    pub approved: usize,
    pub not_approved: usize,
    /// Final records carrying a non-empty history id.
    pub enriched: usize,
    /// Join hits before dedup; differs from `enriched` when aliases collapse.
    pub enriched_rows: usize,
    /// Restricted members that the full universe does not list.
    pub unlisted_members: Vec<String>,
}

pub struct SummaryInputs<'a> {
    pub full_rows: usize,
    pub restricted_rows: usize,
    pub dropped_empty_keys: usize,
    pub duplicates_removed: usize,
    pub enriched_before_dedup: usize,
    pub records: &'a [StockRecord],
    pub unlisted_members: Vec<String>,
}

/// Compute summary statistics from the deduplicated records.
pub fn compute_summary(inputs: SummaryInputs<'_>) -> ReconSummary {
    let mut approved = 0;
    let mut not_approved = 0;
    let mut enriched = 0;

    for r in inputs.records {
        match r.approval {
            Approval::Approved => approved += 1,
            Approval::NotApproved => not_approved += 1,
        }
        if !r.metadata.id.is_empty() {
            enriched += 1;
        }
    }

    ReconSummary {
        full_rows: inputs.full_rows,
        restricted_rows: inputs.restricted_rows,
        dropped_empty_keys: inputs.dropped_empty_keys,
        duplicates_removed: inputs.duplicates_removed,
        total: inputs.records.len(),
        approved,
        not_approved,
        enriched,
        enriched_rows: inputs.enriched_before_dedup,
        unlisted_members: inputs.unlisted_members,
    }
}
