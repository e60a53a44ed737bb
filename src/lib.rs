//! # cfdi-ledger
//!
//! Extraction and aggregation engine for Mexican CFDI 4.0 electronic
//! invoices: ZIP ingestion, tax extraction, received/issued classification,
//! UUID deduplication, column sums and CSV/XLSX export.
//!
//! All sums use [`rust_decimal::Decimal`], never floating point. Record
//! fields stay strings exactly as extracted and are coerced on demand.
//!
//! ## Quick Start
//!
//! ```rust
//! use cfdi_ledger::core::*;
//! use cfdi_ledger::cfdi::parse_cfdi;
//! use rust_decimal_macros::dec;
//!
//! let xml = br#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4"
//!     xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital"
//!     Fecha="2024-05-02T09:00:00" SubTotal="100.00" Total="116.00">
//!   <cfdi:Emisor Rfc="PRO850101XY2" Nombre="Proveedor"/>
//!   <cfdi:Receptor Rfc="EMP010101AB1" UsoCFDI="G03"/>
//!   <cfdi:Impuestos TotalImpuestosTrasladados="16.00"/>
//!   <cfdi:Complemento>
//!     <tfd:TimbreFiscalDigital UUID="AAAA-0001"/>
//!   </cfdi:Complemento>
//! </cfdi:Comprobante>"#;
//!
//! let record = parse_cfdi("factura.xml", xml).unwrap();
//! let mut ledger = Ledger::new();
//! let report = ledger
//!     .ingest(Role::Received, vec![record], &LedgerConfig::new("EMP010101AB1"))
//!     .unwrap();
//! assert_eq!(report.status, IngestStatus::Accepted);
//!
//! let sums = sum_fields(ledger.received.records(), &NumericField::ALL);
//! assert_eq!(sums.get(NumericField::Total), dec!(116));
//! assert_eq!(ledger.periods(), ["2024-05"]);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Record model, role gate, dedup, sums, corrections |
//! | `cfdi` (default) | CFDI 4.0 XML parsing |
//! | `archive` (default) | ZIP extraction and the upload pipeline |
//! | `export` (default) | CSV and XLSX export, workbook save/restore |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "cfdi")]
pub mod cfdi;

#[cfg(feature = "archive")]
pub mod archive;

#[cfg(feature = "export")]
pub mod export;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
