#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(extraction) = cfdi_ledger::archive::extract_archive(data) {
        let _ = cfdi_ledger::duplicate_groups(&extraction.records);
    }
});
