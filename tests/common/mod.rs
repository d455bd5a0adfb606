#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::writer::FileWriter;
use parquet::arrow::ArrowWriter;

pub const HUB_NAME: &str = "example-simple-forecast-hub";

/// Rows written across all model-output files of [`write_hub`].
pub const TOTAL_ROWS: usize = 9;

pub const TASKS_JSON: &str = r#"{
  "schema_version": "https://raw.githubusercontent.com/hubverse-org/schemas/main/v3.0.0/tasks-schema.json",
  "rounds": [
    {
      "round_id_from_variable": true,
      "round_id": "reference_date",
      "model_tasks": [
        {
          "task_ids": {
            "reference_date": {"required": null, "optional": ["2022-11-28", "2022-12-05"]},
            "target": {"required": ["wk inc flu hosp"], "optional": null},
            "horizon": {"required": null, "optional": [0, 1, 2]},
            "location": {"required": null, "optional": ["US", "01", "02"]}
          },
          "output_type": {
            "mean": {
              "output_type_id": {"required": null, "optional": ["NA"]},
              "value": {"type": "double", "minimum": 0}
            },
            "quantile": {
              "output_type_id": {"required": [0.25, 0.5, 0.75], "optional": null},
              "value": {"type": "double", "minimum": 0}
            }
          },
          "target_metadata": []
        }
      ],
      "submissions_due": {"relative_to": "reference_date", "start": -6, "end": 2}
    },
    {
      "round_id_from_variable": true,
      "round_id": "reference_date",
      "model_tasks": [
        {
          "task_ids": {
            "reference_date": {"required": null, "optional": ["2022-12-12"]},
            "target": {"required": ["wk inc flu hosp"], "optional": null},
            "horizon": {"required": null, "optional": [0, 1, 2, 3]},
            "location": {"required": null, "optional": ["US"]}
          },
          "output_type": {
            "quantile": {
              "output_type_id": {"required": [0.25, 0.5, 0.75], "optional": null},
              "value": {"type": "double", "minimum": 0}
            }
          },
          "target_metadata": []
        }
      ],
      "submissions_due": {"relative_to": "reference_date", "start": -6, "end": 2}
    }
  ]
}"#;

pub const ADMIN_JSON: &str = r#"{
  "schema_version": "https://raw.githubusercontent.com/hubverse-org/schemas/main/v3.0.0/admin-schema.json",
  "name": "Simple Forecast Hub",
  "maintainer": "Consortium of Infectious Disease Modeling Hubs",
  "contact": {"name": "Joe Bloggs", "email": "j.bloggs@cidmh.com"},
  "repository": {"host": "github", "owner": "hubverse-org", "name": "example-simple-forecast-hub"},
  "file_format": ["csv", "parquet", "arrow"],
  "timezone": "US/Eastern"
}"#;

pub const MODEL_METADATA_SCHEMA_JSON: &str = r#"{
  "$schema": "http://json-schema.org/draft-07/schema",
  "title": "Schema for Modeling Hub model metadata",
  "description": "This is the schema of the model metadata file",
  "type": "object",
  "properties": {
    "team_abbr": {"type": "string"},
    "model_abbr": {"type": "string"}
  },
  "additionalProperties": true,
  "required": ["team_abbr", "model_abbr"]
}"#;

const TEAM1_CSV: &str = "\
reference_date,target,horizon,location,output_type,output_type_id,value
2022-11-28,wk inc flu hosp,0,US,mean,NA,105.5
2022-11-28,wk inc flu hosp,0,US,quantile,0.5,100
2022-11-28,wk inc flu hosp,1,US,quantile,0.5,120
2022-11-28,wk inc flu hosp,1,01,quantile,0.5,12
";

/// Build a small hub under `root` and return its path.
///
/// Model output:
/// - `team1-goodmodel`: 4 CSV rows (one `mean` with an `NA` type id)
/// - `hub-baseline`: 3 Parquet rows, `horizon` stored as int64
/// - `hub-ensemble`: 2 Arrow IPC rows, `output_type_id` stored as text,
///   no `target` column
///
/// Plus files discovery must skip: a README and a CSV directly in the root,
/// a hidden CSV, a CSV inside a hidden model directory and a text file.
pub fn write_hub(root: &Path) -> PathBuf {
    let hub = root.join(HUB_NAME);
    write_config(&hub, ADMIN_JSON);

    let output = hub.join("model-output");
    write_text(&output.join("README.md"), "# Model output\n");
    write_text(&output.join("stray.csv"), TEAM1_CSV);
    write_text(
        &output.join(".hidden-model/2022-11-28-hidden-model.csv"),
        TEAM1_CSV,
    );
    write_text(
        &output.join("team1-goodmodel/2022-11-28-team1-goodmodel.csv"),
        TEAM1_CSV,
    );
    write_text(&output.join("team1-goodmodel/.scratch.csv"), TEAM1_CSV);
    write_text(&output.join("team1-goodmodel/notes.txt"), "draft\n");

    write_parquet(
        &output.join("hub-baseline/2022-11-28-hub-baseline.parquet"),
        &baseline_batch(),
    );
    write_ipc(
        &output.join("hub-ensemble/2022-11-28-hub-ensemble.arrow"),
        &ensemble_batch(),
    );

    hub
}

/// Write the three config files with a custom `admin.json`.
pub fn write_config(hub: &Path, admin: &str) {
    let config = hub.join("hub-config");
    write_text(&config.join("tasks.json"), TASKS_JSON);
    write_text(&config.join("admin.json"), admin);
    write_text(
        &config.join("model-metadata-schema.json"),
        MODEL_METADATA_SCHEMA_JSON,
    );
}

pub fn write_text(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

fn baseline_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("reference_date", DataType::Utf8, false),
        Field::new("target", DataType::Utf8, false),
        Field::new("horizon", DataType::Int64, false),
        Field::new("location", DataType::Utf8, false),
        Field::new("output_type", DataType::Utf8, false),
        Field::new("output_type_id", DataType::Float64, true),
        Field::new("value", DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["2022-11-28"; 3])),
        Arc::new(StringArray::from(vec!["wk inc flu hosp"; 3])),
        Arc::new(Int64Array::from(vec![0, 1, 2])),
        Arc::new(StringArray::from(vec!["US", "US", "02"])),
        Arc::new(StringArray::from(vec!["quantile"; 3])),
        Arc::new(Float64Array::from(vec![0.5, 0.5, 0.5])),
        Arc::new(Float64Array::from(vec![90.0, 95.0, 9.0])),
    ];
    RecordBatch::try_new(schema, columns).expect("baseline batch")
}

fn ensemble_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("reference_date", DataType::Utf8, false),
        Field::new("horizon", DataType::Int64, false),
        Field::new("location", DataType::Utf8, false),
        Field::new("output_type", DataType::Utf8, false),
        Field::new("output_type_id", DataType::Utf8, false),
        Field::new("value", DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["2022-11-28"; 2])),
        Arc::new(Int64Array::from(vec![0, 0])),
        Arc::new(StringArray::from(vec!["US", "01"])),
        Arc::new(StringArray::from(vec!["quantile"; 2])),
        Arc::new(StringArray::from(vec!["0.25", "0.75"])),
        Arc::new(Float64Array::from(vec![80.0, 8.0])),
    ];
    RecordBatch::try_new(schema, columns).expect("ensemble batch")
}

pub fn write_parquet(path: &Path, batch: &RecordBatch) {
    fs::create_dir_all(path.parent().expect("parent")).expect("create model dir");
    let file = File::create(path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("parquet writer");
    writer.write(batch).expect("write parquet batch");
    writer.close().expect("close parquet writer");
}

fn write_ipc(path: &Path, batch: &RecordBatch) {
    fs::create_dir_all(path.parent().expect("parent")).expect("create model dir");
    let file = File::create(path).expect("create arrow file");
    let mut writer = FileWriter::try_new(file, &batch.schema()).expect("ipc writer");
    writer.write(batch).expect("write ipc batch");
    writer.finish().expect("finish ipc writer");
}
