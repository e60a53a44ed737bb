//! CSV generation.
//!
//! Comma-separated, header row first, UTF-8. Amounts are written exactly as
//! stored so nothing is lost to float formatting.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::columns::{Column, flag_text, header};
use super::{BUCKET_COLUMN, ISSUED_SHEET, RECEIVED_SHEET};
use crate::core::{InvoiceRecord, Ledger, LedgerError, NumericField, Role, ensure_numeric};

fn export_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(e.to_string())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, LedgerError> {
    let bytes = writer.into_inner().map_err(export_err)?;
    String::from_utf8(bytes).map_err(export_err)
}

/// One bucket as CSV: every column, then the role flag.
pub fn records_to_csv(records: &[InvoiceRecord], role: Role) -> Result<String, LedgerError> {
    ensure_numeric(records, &NumericField::ALL)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header(role)).map_err(export_err)?;
    for r in records {
        let row = Column::ALL
            .iter()
            .map(|c| c.value(r))
            .chain(std::iter::once(flag_text(r.flag)));
        writer.write_record(row).map_err(export_err)?;
    }
    debug!(bucket = %role, rows = records.len(), "wrote CSV");
    finish(writer)
}

/// Both buckets in one CSV.
///
/// A leading `Tipo` column names the bucket of each row. Both flag columns
/// are present; the one not belonging to a row's bucket is blank.
pub fn ledger_to_csv(ledger: &Ledger) -> Result<String, LedgerError> {
    let received = ledger.received.records();
    let issued = ledger.issued.records();
    ensure_numeric(received.iter().chain(issued), &NumericField::ALL)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let head = std::iter::once(BUCKET_COLUMN)
        .chain(Column::ALL.iter().map(Column::label))
        .chain(Role::ALL.iter().map(Role::flag_label));
    writer.write_record(head).map_err(export_err)?;

    for role in Role::ALL {
        for r in ledger.bucket(role).records() {
            let flags = Role::ALL
                .iter()
                .map(|slot| if *slot == role { flag_text(r.flag) } else { "" });
            let row = std::iter::once(role.label())
                .chain(Column::ALL.iter().map(|c| c.value(r)))
                .chain(flags);
            writer.write_record(row).map_err(export_err)?;
        }
    }
    finish(writer)
}

/// A ZIP holding `Recibidos.csv` and `Emitidos.csv`.
pub fn ledger_to_csv_zip(ledger: &Ledger) -> Result<Vec<u8>, LedgerError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, role) in [(RECEIVED_SHEET, Role::Received), (ISSUED_SHEET, Role::Issued)] {
        let csv = records_to_csv(ledger.bucket(role).records(), role)?;
        zip.start_file(format!("{name}.csv"), SimpleFileOptions::default())
            .map_err(export_err)?;
        zip.write_all(csv.as_bytes()).map_err(export_err)?;
    }
    Ok(zip.finish().map_err(export_err)?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, total: &str) -> InvoiceRecord {
        let mut r = InvoiceRecord::new(name);
        r.unique_id = format!("UUID-{name}");
        r.issuer_name = "Proveedor, S.A. de C.V.".into();
        r.total = total.into();
        r
    }

    #[test]
    fn header_and_flag() {
        let mut r = record("a.xml", "116.00");
        r.flag = false;
        let csv = records_to_csv(&[r], Role::Received).unwrap();
        let mut lines = csv.lines();
        let head = lines.next().unwrap();
        assert!(head.starts_with("XML,Rfc Emisor,"));
        assert!(head.ends_with(",Deducible"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("a.xml,"));
        assert!(row.contains("\"Proveedor, S.A. de C.V.\""));
        assert!(row.ends_with(",False"));
    }

    #[test]
    fn blocked_by_non_numeric() {
        let result = records_to_csv(&[record("a.xml", "N/A")], Role::Issued);
        match result {
            Err(LedgerError::NonNumeric(issues)) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, NumericField::Total);
            }
            other => panic!("expected NonNumeric, got {other:?}"),
        }
    }

    #[test]
    fn combined_starts_with_bucket() {
        let mut ledger = Ledger::new();
        ledger.received.accept(vec![record("r.xml", "1")]);
        ledger.issued.accept(vec![record("e.xml", "2")]);

        let csv = ledger_to_csv(&ledger).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let head = reader.headers().unwrap().clone();
        assert_eq!(&head[0], "Tipo");
        assert_eq!(&head[head.len() - 2], "Deducible");
        assert_eq!(&head[head.len() - 1], "Seleccionar");

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Recibidos");
        assert_eq!(&rows[0][head.len() - 2], "True");
        assert_eq!(&rows[0][head.len() - 1], "");
        assert_eq!(&rows[1][0], "Emitidos");
        assert_eq!(&rows[1][head.len() - 2], "");
        assert_eq!(&rows[1][head.len() - 1], "True");
    }

    #[test]
    fn zip_holds_both_buckets() {
        let mut ledger = Ledger::new();
        ledger.received.accept(vec![record("r.xml", "1")]);
        let bytes = ledger_to_csv_zip(&ledger).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.file_names().collect();
        assert!(names.contains(&"Recibidos.csv"));
        assert!(names.contains(&"Emitidos.csv"));
    }
}
