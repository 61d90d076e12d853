//! Canonical hashing of phylogeny reports.

use phylo_core::serde_io::to_canonical_json_bytes;
use phylo_core::PhyloError;
use sha2::{Digest, Sha256};

use crate::report::PhylogenReport;

/// Computes the canonical hash of a report with its hash field blanked.
pub fn hash_report(report: &PhylogenReport) -> Result<String, PhyloError> {
    let mut unhashed = report.clone();
    unhashed.report_hash = String::new();
    let bytes = to_canonical_json_bytes(&unhashed)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
