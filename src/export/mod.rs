//! CSV and XLSX exports, plus the workbook format used to save and
//! restore progress between sessions.
//!
//! Every export first checks that the numeric columns coerce to decimals
//! and fails with [`LedgerError::NonNumeric`](crate::core::LedgerError)
//! otherwise. Saving progress is the exception: an unfinished ledger can
//! always be saved, and non-numeric values are written as text.
//!
//! # Example
//!
//! ```no_run
//! use cfdi_ledger::core::{Ledger, LedgerConfig};
//! use cfdi_ledger::export::{export_workbook, ledger_to_csv, load_progress, save_progress};
//!
//! let ledger = Ledger::new();
//! let config = LedgerConfig::new("EMP010101AB1");
//!
//! let saved = save_progress(&ledger).unwrap();
//! let (received, issued) = load_progress(&saved).unwrap();
//! assert!(received.is_empty() && issued.is_empty());
//!
//! let csv = ledger_to_csv(&ledger).unwrap();
//! let xlsx = export_workbook(&ledger, &config).unwrap();
//! # let _ = (csv, xlsx);
//! ```

mod columns;
mod csv_export;
mod workbook;

pub use csv_export::{ledger_to_csv, ledger_to_csv_zip, records_to_csv};
pub use workbook::{
    export_workbook, load_progress, records_to_workbook, restore_progress, save_progress,
};

/// Sheet holding the received bucket.
pub const RECEIVED_SHEET: &str = "Recibidos";
/// Sheet holding the issued bucket.
pub const ISSUED_SHEET: &str = "Emitidos";
/// Aggregated totals sheet of [`export_workbook`].
pub const SUMMARY_SHEET: &str = "Resumen";
/// Bucket column prepended by [`ledger_to_csv`].
pub const BUCKET_COLUMN: &str = "Tipo";
