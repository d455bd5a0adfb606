#![allow(dead_code)]

use hubdata::schema::HubDataType;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{json, Value};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_hub_data_type() -> impl Strategy<Value = HubDataType> {
    prop_oneof![
        Just(HubDataType::Boolean),
        Just(HubDataType::Integer),
        Just(HubDataType::Double),
        Just(HubDataType::Date),
        Just(HubDataType::Character),
    ]
}

/// A task id value as it may appear in `tasks.json`.
pub fn arb_task_id_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1000i64..1000).prop_map(Value::from),
        // always fractional so it never reads as an integer
        (-1000i64..1000).prop_map(|n| Value::from(n as f64 + 0.5)),
        (2000u32..2030, 1u32..13, 1u32..29)
            .prop_map(|(y, m, d)| Value::from(format!("{y:04}-{m:02}-{d:02}"))),
        "[a-z][a-z ]{0,12}".prop_map(Value::from),
    ]
}

/// A `tasks.json` with one round and one model task whose task ids take the
/// given values.
pub fn tasks_with_task_ids(task_ids: &[(String, Vec<Value>, Vec<Value>)]) -> Value {
    let mut ids = serde_json::Map::new();
    for (name, required, optional) in task_ids {
        let list = |values: &Vec<Value>| {
            if values.is_empty() {
                Value::Null
            } else {
                Value::Array(values.clone())
            }
        };
        ids.insert(
            name.clone(),
            json!({"required": list(required), "optional": list(optional)}),
        );
    }

    json!({
        "schema_version": "v3.0.0",
        "rounds": [{
            "round_id_from_variable": false,
            "round_id": "round-1",
            "model_tasks": [{
                "task_ids": ids,
                "output_type": {
                    "mean": {"output_type_id": {"required": null, "optional": ["NA"]},
                             "value": {"type": "double"}}
                }
            }]
        }]
    })
}
