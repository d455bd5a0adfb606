//! Hub inspection.
//!
//! Builds the summaries printed by the `schema` and `dataset` subcommands.

mod report;

pub use report::{DatasetReport, DatasetSummary, FieldSummary, SchemaReport};

use arrow::datatypes::{DataType, Schema};

use crate::connection::HubConnection;
use crate::dataset::{HubDataset, Predicate};
use crate::error::HubError;

/// Summarize the schema of `hub`.
pub fn schema_report(hub: &HubConnection) -> SchemaReport {
    let hub_path = hub.hub_dir();
    let hub_name = hub_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| hub_path.display().to_string());

    SchemaReport {
        hub_name,
        hub_path: hub_path.display().to_string(),
        fields: sorted_fields(hub.schema()),
    }
}

/// Summarize the schema of `hub` and the contents of `dataset`.
///
/// With a `predicate`, `rows` counts only matching rows.
pub fn dataset_report(
    hub: &HubConnection,
    dataset: &HubDataset,
    predicate: Option<&Predicate>,
) -> Result<DatasetReport, HubError> {
    let rows = dataset.count_rows(predicate)?;

    Ok(DatasetReport {
        schema: schema_report(hub),
        dataset: DatasetSummary {
            files: dataset.num_files(),
            types: dataset
                .file_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
            models: dataset.model_ids().len(),
            rows,
            filter: predicate.map(ToString::to_string),
        },
    })
}

/// Fields sorted by name so output does not depend on config ordering.
fn sorted_fields(schema: &Schema) -> Vec<FieldSummary> {
    let mut fields: Vec<FieldSummary> = schema
        .fields()
        .iter()
        .map(|field| FieldSummary {
            name: field.name().clone(),
            data_type: type_name(field.data_type()),
        })
        .collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    fields
}

/// Short lowercase type names, e.g. `string` rather than `Utf8`.
pub fn type_name(data_type: &DataType) -> String {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 => "string".to_string(),
        DataType::Boolean => "bool".to_string(),
        DataType::Int32 => "int32".to_string(),
        DataType::Int64 => "int64".to_string(),
        DataType::Float64 => "double".to_string(),
        DataType::Date32 => "date32[day]".to_string(),
        other => other.to_string().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Field;

    #[test]
    fn fields_are_sorted_by_name() {
        let schema = Schema::new(vec![
            Field::new("value", DataType::Float64, true),
            Field::new("horizon", DataType::Int32, true),
            Field::new("model_id", DataType::Utf8, true),
        ]);
        let names: Vec<String> = sorted_fields(&schema).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["horizon", "model_id", "value"]);
    }

    #[test]
    fn type_names() {
        assert_eq!(type_name(&DataType::Utf8), "string");
        assert_eq!(type_name(&DataType::Date32), "date32[day]");
        assert_eq!(type_name(&DataType::Float64), "double");
        assert_eq!(type_name(&DataType::Boolean), "bool");
        assert_eq!(type_name(&DataType::Int8), "int8");
    }
}
