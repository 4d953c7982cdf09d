//! Fuzz target for CSV table parsing.
//!
//! Arbitrary bytes are parsed as a table; every parsed table is also run
//! through metadata building with each column as the target.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mdfpack::metadata::build_metadata;
use mdfpack::table::io_csv::from_csv_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(table) = from_csv_slice(data) else {
        return;
    };

    let _ = build_metadata(&table, None);
    for column in table.columns() {
        if let Ok(metadata) = build_metadata(&table, Some(column)) {
            assert_eq!(metadata.inputs.len(), metadata.input_units.len());
        }
    }
});
