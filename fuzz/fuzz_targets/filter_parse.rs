//! Fuzz target for `--filter COLUMN=VALUE` parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run filter_parse

#![no_main]

use hubdata::dataset::Predicate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(predicate) = text.parse::<Predicate>() {
        let _ = predicate.to_string();
    }
});
