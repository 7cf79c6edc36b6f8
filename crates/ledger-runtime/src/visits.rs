//! # Draft Visit Import
//!
//! Visits are captured outside the ledger. The capture path hands them over
//! as a JSON array of drafts:
//!
//! ```json
//! [
//!   {
//!     "id": "v-1001",
//!     "workerId": "w-1",
//!     "facilityId": "rcfe-7",
//!     "facilityName": "Sunrise Manor",
//!     "memberId": "m-42",
//!     "memberName": "Pat Member",
//!     "claimDay": "2025-01-10",
//!     "rawPayload": { "actionRequired": true }
//!   }
//! ]
//! ```
//!
//! A visit whose id is already in the ledger is skipped, so importing the
//! same file again after a restart never returns a signed-off visit to draft.

use anyhow::{Context, Result};
use pl_01_settlement_ledger::{DraftVisitParams, LedgerRepository, VisitRecord};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Load every draft in `path` that the ledger does not hold yet.
pub fn import_draft_visits(repository: &LedgerRepository, path: &Path) -> Result<ImportSummary> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read visit import {}", path.display()))?;
    let drafts: Vec<DraftVisitParams> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse visit import {}", path.display()))?;

    let mut summary = ImportSummary::default();
    for params in drafts {
        let visit = VisitRecord::draft(params);
        if repository
            .insert_draft_visit_if_absent(&visit)
            .with_context(|| format!("Failed to store visit {}", visit.id))?
        {
            summary.imported += 1;
        } else {
            debug!(visit_id = %visit.id, "Visit already in ledger, skipped");
            summary.skipped += 1;
        }
    }

    info!(
        path = %path.display(),
        imported = summary.imported,
        skipped = summary.skipped,
        "Draft visits imported"
    );
    Ok(summary)
}
