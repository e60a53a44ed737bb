//! ZIP archive extraction and the upload pipeline.
//!
//! Entries are processed one at a time in archive order. A bad entry is
//! reported and skipped; it never aborts the rest of the archive.
//!
//! # Example
//!
//! ```no_run
//! use cfdi_ledger::archive::ingest_archive;
//! use cfdi_ledger::core::{Ledger, LedgerConfig, Role};
//!
//! let bytes = std::fs::read("recibidos.zip").unwrap();
//! let mut ledger = Ledger::new();
//! let report = ingest_archive(&mut ledger, Role::Received, &bytes, &LedgerConfig::new("EMP010101AB1"))
//!     .unwrap();
//! println!("{} accepted, {} skipped", report.accepted, report.skipped.len());
//! ```

use std::io::{Cursor, Read};

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::cfdi::parse_cfdi;
use crate::core::{IngestReport, InvoiceRecord, Ledger, LedgerConfig, LedgerError, Role, SkippedEntry};

/// Records parsed from one archive, plus the entries that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// In archive enumeration order.
    pub records: Vec<InvoiceRecord>,
    pub skipped: Vec<SkippedEntry>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// `true` for entry names ending in `.xml`, ignoring ASCII case.
pub fn is_xml_entry(name: &str) -> bool {
    name.len() >= 4
        && name.is_char_boundary(name.len() - 4)
        && name[name.len() - 4..].eq_ignore_ascii_case(".xml")
}

/// Parse every XML entry of a ZIP archive.
///
/// Fails only when the bytes are not a readable ZIP archive. Entries that
/// cannot be read or parsed are logged and listed in
/// [`Extraction::skipped`]. An archive without XML entries yields an empty
/// extraction.
pub fn extract_archive(bytes: &[u8]) -> Result<Extraction, LedgerError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| LedgerError::Archive(e.to_string()))?;
    let mut out = Extraction::default();

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable archive entry");
                out.skipped.push(SkippedEntry {
                    entry_name: format!("#{index}"),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let name = entry.name().to_string();
        if entry.is_dir() || !is_xml_entry(&name) {
            continue;
        }

        let mut content = Vec::new();
        if let Err(e) = entry.read_to_end(&mut content) {
            warn!(entry = %name, error = %e, "skipping unreadable archive entry");
            out.skipped.push(SkippedEntry {
                entry_name: name,
                reason: e.to_string(),
            });
            continue;
        }

        match parse_cfdi(&name, &content) {
            Ok(record) => {
                debug!(entry = %name, uuid = %record.unique_id, "parsed CFDI");
                out.records.push(record);
            }
            Err(e) => {
                warn!(entry = %name, error = %e, "skipping malformed CFDI");
                let reason = match e {
                    LedgerError::MalformedDocument { reason, .. } => reason,
                    other => other.to_string(),
                };
                out.skipped.push(SkippedEntry {
                    entry_name: name,
                    reason,
                });
            }
        }
    }
    Ok(out)
}

/// Extract an uploaded archive and ingest it into the `role` bucket.
///
/// Skipped entries are carried in the returned report. A role mismatch
/// rejects the whole upload and leaves the ledger unchanged.
pub fn ingest_archive(
    ledger: &mut Ledger,
    role: Role,
    bytes: &[u8],
    config: &LedgerConfig,
) -> Result<IngestReport, LedgerError> {
    let extraction = extract_archive(bytes)?;
    let mut report = ledger.ingest(role, extraction.records, config)?;
    report.skipped = extraction.skipped;
    Ok(report)
}
