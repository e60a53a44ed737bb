#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are bugs.
    if let Ok(record) = cfdi_ledger::cfdi::parse_cfdi("fuzz.xml", data) {
        let _ = record.period_key();
        let _ = cfdi_ledger::find_non_numeric([&record], &cfdi_ledger::NumericField::ALL);
    }
});
