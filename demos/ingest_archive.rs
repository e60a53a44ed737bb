//! Ingest a ZIP of CFDI files and print per-period totals.
//!
//! Usage: `cargo run --example ingest_archive -- <archivo.zip> <RFC> [recibidos|emitidos]`

use cfdi_ledger::archive::ingest_archive;
use cfdi_ledger::core::*;

fn main() {
    let mut args = std::env::args().skip(1);
    let (Some(path), Some(rfc)) = (args.next(), args.next()) else {
        eprintln!("usage: ingest_archive <archivo.zip> <RFC> [recibidos|emitidos]");
        std::process::exit(2);
    };
    let role = match args.next().as_deref() {
        None | Some("recibidos") => Role::Received,
        Some("emitidos") => Role::Issued,
        Some(other) => {
            eprintln!("unknown bucket '{other}'");
            std::process::exit(2);
        }
    };

    let bytes = std::fs::read(&path).expect("read archive");
    let config = LedgerConfig::new(rfc);
    let mut ledger = Ledger::new();

    let report = match ingest_archive(&mut ledger, role, &bytes, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("upload rejected: {e}");
            std::process::exit(1);
        }
    };

    println!("=== {} ===", role.label());
    println!(
        "  {:?}: {} offered, {} accepted, {} duplicates",
        report.status, report.offered, report.accepted, report.duplicates
    );
    for skipped in &report.skipped {
        println!("  skipped {skipped}");
    }
    for issue in &report.pending_corrections {
        println!("  needs correction: {issue}");
    }

    let bucket = ledger.bucket(role);
    println!("\n=== Totals per period ===");
    for row in group_sums(bucket.records(), &[GroupKey::Period], &config.summary_fields) {
        println!(
            "  {:<8} {:>4} CFDI  total {:>14}  IVA 16% {:>12}",
            row.key[0],
            row.count,
            row.sums.get(NumericField::Total),
            row.sums.get(NumericField::Vat16Amount),
        );
    }
}
