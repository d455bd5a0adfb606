//! Fuzz target for hub schema derivation from tasks.json.
//!
//! Arbitrary bytes that parse as JSON are handed to `create_hub_schema`,
//! which must return an error rather than panic on malformed task configs.
//!
//! Run with:
//!   cargo +nightly fuzz run tasks_json_schema

#![no_main]

use hubdata::schema::{create_hub_schema, SchemaOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Real tasks.json files stay well under 10MB.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(tasks) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let _ = create_hub_schema(&tasks, &SchemaOptions::default());
});
