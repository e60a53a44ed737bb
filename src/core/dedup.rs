//! UUID-based deduplication.
//!
//! Records are compared by `unique_id` only. Records without a fiscal stamp
//! (empty `unique_id`) cannot be identified and are never treated as
//! duplicates of each other.

use std::collections::{BTreeMap, HashSet};

use super::types::InvoiceRecord;

/// Keep the records of `new` whose UUID does not occur in `existing`.
///
/// An empty `existing` collection returns `new` unchanged.
pub fn filter_new_against_existing(
    new: Vec<InvoiceRecord>,
    existing: &[InvoiceRecord],
) -> Vec<InvoiceRecord> {
    if existing.is_empty() {
        return new;
    }
    let known: HashSet<&str> = existing
        .iter()
        .map(|r| r.unique_id.as_str())
        .filter(|id| !id.is_empty())
        .collect();
    new.into_iter()
        .filter(|r| r.unique_id.is_empty() || !known.contains(r.unique_id.as_str()))
        .collect()
}

/// Collapse repeated UUIDs to their first occurrence, preserving order.
///
/// Returns the cleaned records and the number removed.
pub fn purge_duplicates_within(mut records: Vec<InvoiceRecord>) -> (Vec<InvoiceRecord>, usize) {
    let before = records.len();
    let mut seen: HashSet<String> = HashSet::new();
    records.retain(|r| r.unique_id.is_empty() || seen.insert(r.unique_id.clone()));
    let removed = before - records.len();
    (records, removed)
}

/// A UUID that occurs more than once, with the entries carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub unique_id: String,
    /// Source names in record order.
    pub source_names: Vec<String>,
}

/// List every non-empty UUID that occurs more than once, sorted by UUID.
pub fn duplicate_groups(records: &[InvoiceRecord]) -> Vec<DuplicateGroup> {
    let mut by_id: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for r in records.iter().filter(|r| !r.unique_id.is_empty()) {
        by_id
            .entry(r.unique_id.as_str())
            .or_default()
            .push(r.source_name.clone());
    }
    by_id
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(id, source_names)| DuplicateGroup {
            unique_id: id.to_string(),
            source_names,
        })
        .collect()
}
