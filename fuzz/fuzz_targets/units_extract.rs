//! Fuzz target for unit extraction from column names.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mdfpack::metadata::extract_units;

fuzz_target!(|name: &str| {
    let _ = extract_units(name);
});
