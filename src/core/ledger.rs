//! Received/issued buckets and the upload pipeline that feeds them.
//!
//! The ledger is plain data owned by the caller. Nothing here keeps state
//! between calls; persisting a [`Ledger`] across sessions is up to the
//! presentation layer (see the workbook save format in `export`).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::dedup::{filter_new_against_existing, purge_duplicates_within};
use super::error::{LedgerError, SkippedEntry};
use super::filter::{RecordFilter, periods};
use super::gate::check_batch_role;
use super::numeric::{Correction, NonNumericField, NumericField, apply_corrections, find_non_numeric};
use super::types::{InvoiceRecord, Role};

/// Operator settings for ingestion and summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// The operator's own RFC. Received batches must carry it as receptor,
    /// issued batches as emisor.
    pub operator_tax_id: String,
    /// Numeric fields checked on ingest and summed in summaries.
    pub summary_fields: Vec<NumericField>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            operator_tax_id: String::new(),
            summary_fields: NumericField::ALL.to_vec(),
        }
    }
}

impl LedgerConfig {
    pub fn new(operator_tax_id: impl Into<String>) -> Self {
        Self {
            operator_tax_id: operator_tax_id.into(),
            ..Default::default()
        }
    }

    /// Load from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LedgerError::Config(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.operator_tax_id.trim().is_empty() {
            return Err(LedgerError::Config("operator RFC is required".into()));
        }
        if self.summary_fields.is_empty() {
            return Err(LedgerError::Config("at least one summary field is required".into()));
        }
        Ok(())
    }
}

/// An append-only collection of records for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    role: Role,
    records: Vec<InvoiceRecord>,
}

impl Bucket {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            records: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn records(&self) -> &[InvoiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append `batch` minus records whose UUID is already present or
    /// repeated earlier in the batch. Returns `(accepted, duplicates)`.
    pub fn accept(&mut self, batch: Vec<InvoiceRecord>) -> (usize, usize) {
        let offered = batch.len();
        let fresh = filter_new_against_existing(batch, &self.records);
        let (fresh, _) = purge_duplicates_within(fresh);
        let accepted = fresh.len();
        self.records.extend(fresh);
        (accepted, offered - accepted)
    }

    /// Collapse repeated UUIDs already in the bucket. Returns the number removed.
    pub fn purge_duplicates(&mut self) -> usize {
        let records = std::mem::take(&mut self.records);
        let (kept, removed) = purge_duplicates_within(records);
        self.records = kept;
        if removed > 0 {
            info!(bucket = %self.role, removed, "purged duplicate UUIDs");
        }
        removed
    }

    /// Set the role flag of every record with this source name.
    pub fn set_flag_by_source(&mut self, source_name: &str, flag: bool) -> usize {
        let mut changed = 0;
        for r in self.records.iter_mut().filter(|r| r.source_name == source_name) {
            r.flag = flag;
            changed += 1;
        }
        changed
    }

    /// Set the role flag of every record matching `filter` (select/deselect all).
    pub fn set_flag_where(&mut self, filter: &RecordFilter, flag: bool) -> usize {
        let mut changed = 0;
        for r in self.records.iter_mut().filter(|r| filter.matches(r)) {
            r.flag = flag;
            changed += 1;
        }
        changed
    }

    pub fn apply_corrections(&mut self, corrections: &[Correction]) -> usize {
        apply_corrections(&mut self.records, corrections)
    }

    pub fn pending_corrections(&self, fields: &[NumericField]) -> Vec<NonNumericField> {
        find_non_numeric(&self.records, fields)
    }

    pub fn flagged(&self) -> impl Iterator<Item = &InvoiceRecord> + '_ {
        self.records.iter().filter(|r| r.flag)
    }

    pub fn unflagged(&self) -> impl Iterator<Item = &InvoiceRecord> + '_ {
        self.records.iter().filter(|r| !r.flag)
    }
}

/// What happened to an uploaded batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    /// At least one record was appended.
    Accepted,
    /// The upload contained no CFDI documents.
    EmptyBatch,
    /// Every record was already present.
    AllDuplicates,
}

/// Outcome of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub role: Role,
    pub status: IngestStatus,
    /// Records offered by the batch.
    pub offered: usize,
    pub accepted: usize,
    pub duplicates: usize,
    /// Archive entries that could not be parsed.
    pub skipped: Vec<SkippedEntry>,
    /// Accepted values that still need an operator correction.
    pub pending_corrections: Vec<NonNumericField>,
}

/// Records appended by [`Ledger::restore`], per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
    pub received: usize,
    pub issued: usize,
}

/// Both buckets of one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub received: Bucket,
    pub issued: Bucket,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            received: Bucket::new(Role::Received),
            issued: Bucket::new(Role::Issued),
        }
    }

    pub fn bucket(&self, role: Role) -> &Bucket {
        match role {
            Role::Received => &self.received,
            Role::Issued => &self.issued,
        }
    }

    pub fn bucket_mut(&mut self, role: Role) -> &mut Bucket {
        match role {
            Role::Received => &mut self.received,
            Role::Issued => &mut self.issued,
        }
    }

    /// Classify, deduplicate and append a freshly parsed batch.
    ///
    /// A batch failing the role gate is rejected whole and leaves the
    /// ledger untouched. Accepted records start with their role flag set.
    pub fn ingest(
        &mut self,
        role: Role,
        mut batch: Vec<InvoiceRecord>,
        config: &LedgerConfig,
    ) -> Result<IngestReport, LedgerError> {
        config.validate()?;
        let offered = batch.len();
        let mut report = IngestReport {
            role,
            status: IngestStatus::EmptyBatch,
            offered,
            accepted: 0,
            duplicates: 0,
            skipped: Vec::new(),
            pending_corrections: Vec::new(),
        };
        if batch.is_empty() {
            info!(bucket = %role, "no CFDI documents in upload");
            return Ok(report);
        }
        check_batch_role(&batch, role, &config.operator_tax_id)?;

        for r in batch.iter_mut() {
            r.flag = true;
        }
        let bucket = self.bucket_mut(role);
        let (accepted, duplicates) = bucket.accept(batch);
        report.accepted = accepted;
        report.duplicates = duplicates;
        report.status = if accepted == 0 {
            IngestStatus::AllDuplicates
        } else {
            IngestStatus::Accepted
        };
        // Only records that made it into the bucket need correcting.
        let kept = &bucket.records[bucket.records.len() - accepted..];
        report.pending_corrections = find_non_numeric(kept, &config.summary_fields);

        info!(
            bucket = %role,
            offered,
            accepted,
            duplicates,
            pending = report.pending_corrections.len(),
            "ingested CFDI batch"
        );
        Ok(report)
    }

    /// Append records loaded from a saved workbook, skipping UUIDs already
    /// present. Role flags are kept as saved.
    pub fn restore(
        &mut self,
        received: Vec<InvoiceRecord>,
        issued: Vec<InvoiceRecord>,
    ) -> RestoreReport {
        let (received, _) = self.received.accept(received);
        let (issued, _) = self.issued.accept(issued);
        debug!(received, issued, "restored saved progress");
        RestoreReport { received, issued }
    }

    /// Distinct period keys across both buckets, sorted.
    pub fn periods(&self) -> Vec<String> {
        periods(self.received.records.iter().chain(self.issued.records.iter()))
    }
}
