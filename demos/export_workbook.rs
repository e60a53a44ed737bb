//! Ingest received and issued archives, then write the CSV and XLSX exports.
//!
//! Usage: `cargo run --example export_workbook -- <RFC> <recibidos.zip> <emitidos.zip> <salida_dir>`

use std::path::PathBuf;

use cfdi_ledger::archive::ingest_archive;
use cfdi_ledger::core::*;
use cfdi_ledger::export::*;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [rfc, received, issued, out] = args.as_slice() else {
        eprintln!("usage: export_workbook <RFC> <recibidos.zip> <emitidos.zip> <salida_dir>");
        std::process::exit(2);
    };
    let out = PathBuf::from(out);
    let config = LedgerConfig::new(rfc.as_str());
    let mut ledger = Ledger::new();

    for (role, path) in [(Role::Received, received), (Role::Issued, issued)] {
        let bytes = std::fs::read(path).expect("read archive");
        match ingest_archive(&mut ledger, role, &bytes, &config) {
            Ok(report) => println!("{}: {} accepted", role.label(), report.accepted),
            Err(e) => {
                eprintln!("{}: {e}", role.label());
                std::process::exit(1);
            }
        }
    }

    // Progress can always be saved, even with values pending correction.
    let saved = save_progress(&ledger).expect("save progress");
    std::fs::write(out.join("avance.xlsx"), saved).expect("write avance.xlsx");

    match export_workbook(&ledger, &config) {
        Ok(bytes) => std::fs::write(out.join("reporte.xlsx"), bytes).expect("write reporte.xlsx"),
        Err(LedgerError::NonNumeric(issues)) => {
            println!("export blocked, {} value(s) need correction:", issues.len());
            for issue in &issues {
                println!("  {issue}");
            }
            return;
        }
        Err(e) => panic!("export failed: {e}"),
    }

    let csv = ledger_to_csv(&ledger).expect("combined CSV");
    std::fs::write(out.join("cfdi.csv"), csv).expect("write cfdi.csv");
    let zip = ledger_to_csv_zip(&ledger).expect("CSV zip");
    std::fs::write(out.join("cfdi_csv.zip"), zip).expect("write cfdi_csv.zip");

    let summary = flag_summary(ledger.received.records(), &config.summary_fields);
    println!(
        "Deducibles: {} (total {}), no deducibles: {} (total {})",
        summary.flagged_count,
        summary.flagged.get(NumericField::Total),
        summary.unflagged_count,
        summary.unflagged.get(NumericField::Total),
    );
}
