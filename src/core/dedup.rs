// ElwSleuth - core/dedup.rs
//
// First-seen-wins deduplication of scans by body identity.

use crate::core::model::{BodyKey, ScanRecord};
use std::collections::HashSet;

/// Keep only the first record per `(system, body)` pair.
///
/// Relative order of first occurrences is preserved.
pub fn dedup_first_seen(mut records: Vec<ScanRecord>) -> Vec<ScanRecord> {
    let before = records.len();
    let mut seen: HashSet<BodyKey> = HashSet::with_capacity(before);
    records.retain(|r| {
        let first = seen.insert(r.key);
        if !first {
            tracing::trace!(
                body = %r.key,
                scan_type = ?r.scan_type,
                origin = %r.origin(),
                "Duplicate scan dropped"
            );
        }
        first
    });

    if records.len() != before {
        tracing::debug!(
            before,
            after = records.len(),
            "Duplicate scans removed"
        );
    }
    records
}
