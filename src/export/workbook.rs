//! XLSX workbooks: the save/restore format and the rich export.
//!
//! A saved workbook has one sheet per bucket (`Recibidos`, `Emitidos`),
//! a bold header row, then one row per record with the role flag in the
//! last column. Amount columns are numeric cells; everything else is text,
//! so postal codes and folios keep their leading zeros.

use std::io::{Cursor, Read, Seek};

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{debug, info, warn};

use super::columns::{Column, flag_text, header, parse_flag};
use super::{ISSUED_SHEET, RECEIVED_SHEET, SUMMARY_SHEET};
use crate::core::{
    InvoiceRecord, Ledger, LedgerConfig, LedgerError, NumericField, RestoreReport, Role,
    ensure_numeric, parse_amount, sum_fields,
};

const DEDUCTIBLE_SHEET: &str = "Deducibles";
const NON_DEDUCTIBLE_SHEET: &str = "No Deducibles";
const SELECTED_SHEET: &str = "Emitidos Seleccionados";
const UNSELECTED_SHEET: &str = "Emitidos No Seleccionados";

fn export_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(e.to_string())
}

fn import_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Import(e.to_string())
}

fn cell_row(index: usize) -> Result<u32, LedgerError> {
    u32::try_from(index).map_err(|_| LedgerError::Export(format!("row {index} out of range")))
}

fn add_sheet<'a>(workbook: &'a mut Workbook, name: &str) -> Result<&'a mut Worksheet, LedgerError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name).map_err(export_err)?;
    Ok(sheet)
}

/// Longest string an XLSX cell holds, in characters.
const CELL_TEXT_LIMIT: usize = 32_767;

/// Amounts become numeric cells only when the `f64` reads back as the same
/// decimal; anything else is written as text so it reloads exactly.
fn write_amount(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    amount: Decimal,
) -> Result<(), LedgerError> {
    let exact = amount
        .to_f64()
        .filter(|n| n.to_string().parse::<Decimal>().is_ok_and(|back| back == amount));
    match exact {
        Some(n) => sheet.write_number(row, col, n),
        None => sheet.write_string(row, col, amount.to_string()),
    }
    .map_err(export_err)?;
    Ok(())
}

/// Cut `text` to the cell limit on a char boundary.
fn fit_cell(text: &str) -> Option<&str> {
    text.char_indices()
        .nth(CELL_TEXT_LIMIT)
        .map(|(idx, _)| &text[..idx])
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    column: Column,
    record: &InvoiceRecord,
) -> Result<(), LedgerError> {
    let raw = column.value(record);
    if raw.is_empty() {
        return Ok(());
    }
    if let Some(amount) = column.numeric().and_then(|_| parse_amount(raw)) {
        return write_amount(sheet, row, col, amount);
    }
    let text = match fit_cell(raw) {
        Some(cut) => {
            warn!(
                source = %record.source_name,
                column = column.label(),
                chars = raw.chars().count(),
                "truncating value to the XLSX cell limit"
            );
            cut
        }
        None => raw,
    };
    sheet.write_string(row, col, text).map_err(export_err)?;
    Ok(())
}

fn write_records<'a, I>(
    sheet: &mut Worksheet,
    records: I,
    role: Role,
    bold: &Format,
) -> Result<usize, LedgerError>
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    for (col, label) in header(role).into_iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, label, bold)
            .map_err(export_err)?;
    }
    let flag_col = Column::ALL.len() as u16;
    let mut written = 0;
    for (i, record) in records.into_iter().enumerate() {
        let row = cell_row(i + 1)?;
        for (col, column) in Column::ALL.into_iter().enumerate() {
            write_cell(sheet, row, col as u16, column, record)?;
        }
        sheet
            .write_boolean(row, flag_col, record.flag)
            .map_err(export_err)?;
        written += 1;
    }
    sheet.set_freeze_panes(1, 0).map_err(export_err)?;
    sheet.autofit();
    Ok(written)
}

/// Save both buckets so a later session can [`restore_progress`].
///
/// Never blocked by non-numeric values; they are saved as text and still
/// need correcting after the restore.
pub fn save_progress(ledger: &Ledger) -> Result<Vec<u8>, LedgerError> {
    let bold = Format::new().set_bold();
    let mut workbook = Workbook::new();
    for role in Role::ALL {
        let sheet = add_sheet(&mut workbook, role.label())?;
        write_records(sheet, ledger.bucket(role).records(), role, &bold)?;
    }
    let bytes = workbook.save_to_buffer().map_err(export_err)?;
    debug!(
        received = ledger.received.len(),
        issued = ledger.issued.len(),
        "saved progress workbook"
    );
    Ok(bytes)
}

/// One bucket as a single-sheet workbook named after the role.
pub fn records_to_workbook(records: &[InvoiceRecord], role: Role) -> Result<Vec<u8>, LedgerError> {
    ensure_numeric(records, &NumericField::ALL)?;
    let bold = Format::new().set_bold();
    let mut workbook = Workbook::new();
    let sheet = add_sheet(&mut workbook, role.label())?;
    write_records(sheet, records, role, &bold)?;
    workbook.save_to_buffer().map_err(export_err)
}

/// The full export: each bucket, its flagged and unflagged subsets, and a
/// `Resumen` sheet with the record count and `config.summary_fields` sums
/// of every other sheet.
pub fn export_workbook(ledger: &Ledger, config: &LedgerConfig) -> Result<Vec<u8>, LedgerError> {
    let received = ledger.received.records();
    let issued = ledger.issued.records();
    ensure_numeric(received.iter().chain(issued), &config.summary_fields)?;

    let sheets: [(&str, Role, Vec<&InvoiceRecord>); 6] = [
        (RECEIVED_SHEET, Role::Received, received.iter().collect()),
        (DEDUCTIBLE_SHEET, Role::Received, ledger.received.flagged().collect()),
        (NON_DEDUCTIBLE_SHEET, Role::Received, ledger.received.unflagged().collect()),
        (ISSUED_SHEET, Role::Issued, issued.iter().collect()),
        (SELECTED_SHEET, Role::Issued, ledger.issued.flagged().collect()),
        (UNSELECTED_SHEET, Role::Issued, ledger.issued.unflagged().collect()),
    ];

    let bold = Format::new().set_bold();
    let mut workbook = Workbook::new();
    for (name, role, records) in &sheets {
        let sheet = add_sheet(&mut workbook, name)?;
        write_records(sheet, records.iter().copied(), *role, &bold)?;
    }

    let summary = add_sheet(&mut workbook, SUMMARY_SHEET)?;
    summary
        .write_string_with_format(0, 0, "Tipo", &bold)
        .map_err(export_err)?;
    summary
        .write_string_with_format(0, 1, "Registros", &bold)
        .map_err(export_err)?;
    for (j, field) in config.summary_fields.iter().enumerate() {
        summary
            .write_string_with_format(0, j as u16 + 2, field.label(), &bold)
            .map_err(export_err)?;
    }
    for (i, (name, _, records)) in sheets.iter().enumerate() {
        let row = cell_row(i + 1)?;
        let sums = sum_fields(records.iter().copied(), &config.summary_fields);
        summary.write_string(row, 0, *name).map_err(export_err)?;
        summary
            .write_number(row, 1, records.len() as f64)
            .map_err(export_err)?;
        for (j, field) in config.summary_fields.iter().enumerate() {
            write_amount(summary, row, j as u16 + 2, sums.get(*field))?;
        }
    }
    summary.autofit();

    let bytes = workbook.save_to_buffer().map_err(export_err)?;
    info!(
        received = received.len(),
        issued = issued.len(),
        "exported ledger workbook"
    );
    Ok(bytes)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => flag_text(*b).to_string(),
        _ => String::new(),
    }
}

enum Slot {
    Field(Column),
    Flag,
    Ignored,
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    names: &[String],
    role: Role,
) -> Result<Vec<InvoiceRecord>, LedgerError> {
    if !names.iter().any(|n| n == role.label()) {
        return Ok(Vec::new());
    }
    let range = workbook.worksheet_range(role.label()).map_err(import_err)?;
    let mut rows = range.rows();
    let Some(head) = rows.next() else {
        return Ok(Vec::new());
    };
    let slots: Vec<Slot> = head
        .iter()
        .map(|cell| {
            let label = cell_text(cell);
            let label = label.trim();
            if label == role.flag_label() {
                Slot::Flag
            } else {
                Column::from_label(label).map_or(Slot::Ignored, Slot::Field)
            }
        })
        .collect();

    let mut records = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mut record = InvoiceRecord::new("");
        for (slot, value) in slots.iter().zip(cells) {
            match slot {
                Slot::Field(column) => column.set(&mut record, value),
                Slot::Flag => record.flag = parse_flag(&value),
                Slot::Ignored => {}
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// Read a workbook written by [`save_progress`] back into
/// `(received, issued)` records.
///
/// Columns are matched by header label, so reordered or extra columns are
/// tolerated. A missing flag column leaves every flag set.
pub fn load_progress(
    bytes: &[u8],
) -> Result<(Vec<InvoiceRecord>, Vec<InvoiceRecord>), LedgerError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).map_err(import_err)?;
    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == RECEIVED_SHEET || n == ISSUED_SHEET) {
        return Err(LedgerError::Import(format!(
            "workbook has no '{RECEIVED_SHEET}' or '{ISSUED_SHEET}' sheet"
        )));
    }
    let received = read_sheet(&mut workbook, &names, Role::Received)?;
    let issued = read_sheet(&mut workbook, &names, Role::Issued)?;
    debug!(
        received = received.len(),
        issued = issued.len(),
        "loaded progress workbook"
    );
    Ok((received, issued))
}

/// Load a saved workbook and append it to `ledger`, skipping UUIDs the
/// ledger already holds.
pub fn restore_progress(ledger: &mut Ledger, bytes: &[u8]) -> Result<RestoreReport, LedgerError> {
    let (received, issued) = load_progress(bytes)?;
    let report = ledger.restore(received, issued);
    info!(
        received = report.received,
        issued = report.issued,
        "restored records from workbook"
    );
    Ok(report)
}
