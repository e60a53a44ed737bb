//! Batch-level role classification.
//!
//! A batch belongs to the received bucket only when the operator is the
//! receptor of every invoice in it, and to the issued bucket only when the
//! operator is the emisor of every invoice. One mismatch rejects the batch.

use super::error::LedgerError;
use super::types::{InvoiceRecord, Role};

/// `true` when the batch is non-empty and every record carries
/// `operator_tax_id` on the side selected by `role`.
pub fn batch_matches_role(records: &[InvoiceRecord], role: Role, operator_tax_id: &str) -> bool {
    !records.is_empty()
        && records
            .iter()
            .all(|r| role.operator_tax_id(r) == operator_tax_id)
}

/// Like [`batch_matches_role`] but names the first offending record.
///
/// An empty batch passes; callers decide separately what an empty upload means.
pub fn check_batch_role(
    records: &[InvoiceRecord],
    role: Role,
    operator_tax_id: &str,
) -> Result<(), LedgerError> {
    match records
        .iter()
        .find(|r| role.operator_tax_id(r) != operator_tax_id)
    {
        Some(r) => Err(LedgerError::BatchRoleMismatch {
            role,
            source_name: r.source_name.clone(),
            tax_id: role.operator_tax_id(r).to_string(),
        }),
        None => Ok(()),
    }
}
