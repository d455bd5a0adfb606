//! Derive a hub's tabular schema from its `tasks.json`.
//!
//! Every model-output file in a hub shares one layout:
//!
//! | columns                   | type                                         |
//! |---------------------------|----------------------------------------------|
//! | one per task id           | inferred from the task id's listed values    |
//! | `output_type`             | character                                    |
//! | `output_type_id`          | inferred, or fixed by `output_type_id_datatype` |
//! | `value`                   | merged from each output type's `value.type`  |
//! | partition columns         | `model_id: character` by default             |
//!
//! Task id columns keep the order in which they first appear across rounds
//! and model tasks.

mod types;

pub use types::HubDataType;

use std::path::PathBuf;
use std::sync::Arc;

use arrow::datatypes::{Field, Schema, SchemaRef};
use serde_json::{Map, Value};

use crate::config::TASKS_FILE;
use crate::error::HubError;

pub const OUTPUT_TYPE: &str = "output_type";
pub const OUTPUT_TYPE_ID: &str = "output_type_id";
pub const VALUE: &str = "value";
pub const MODEL_ID: &str = "model_id";

/// How the `output_type_id` column type is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputTypeIdDatatype {
    /// Use `output_type_id_datatype` from `tasks.json`, else infer.
    #[default]
    FromConfig,
    /// Infer from the output type id values across all rounds.
    Auto,
    /// Force a specific type.
    Fixed(HubDataType),
}

/// Options for [`create_hub_schema`].
#[derive(Clone, Debug)]
pub struct SchemaOptions {
    pub output_type_id_datatype: OutputTypeIdDatatype,
    /// Columns appended after `value`, typically filled from directory names.
    pub partitions: Vec<(String, HubDataType)>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            output_type_id_datatype: OutputTypeIdDatatype::default(),
            partitions: vec![(MODEL_ID.to_string(), HubDataType::Character)],
        }
    }
}

/// Build the Arrow schema shared by all model-output files of a hub.
///
/// # Errors
/// Returns [`HubError::InvalidConfig`] if `tasks` has no `rounds` array or
/// names a data type this crate does not know.
pub fn create_hub_schema(tasks: &Value, options: &SchemaOptions) -> Result<SchemaRef, HubError> {
    let rounds = tasks
        .get("rounds")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid_tasks("missing 'rounds' array"))?;
    let model_tasks: Vec<&Map<String, Value>> = rounds
        .iter()
        .filter_map(|round| round.get("model_tasks").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_object)
        .collect();

    let mut columns: Vec<(String, HubDataType)> = task_id_types(&model_tasks);
    columns.push((OUTPUT_TYPE.to_string(), HubDataType::Character));
    columns.push((
        OUTPUT_TYPE_ID.to_string(),
        output_type_id_type(tasks, &model_tasks, options.output_type_id_datatype)?,
    ));
    columns.push((VALUE.to_string(), value_type(&model_tasks)?));

    for (i, (name, data_type)) in options.partitions.iter().enumerate() {
        if options.partitions[..i].iter().any(|(earlier, _)| earlier == name) {
            return Err(invalid_tasks(&format!("partition column '{name}' listed twice")));
        }
        if columns.iter().any(|(existing, _)| existing == name) {
            continue;
        }
        columns.push((name.clone(), *data_type));
    }

    tracing::debug!(columns = columns.len(), "derived hub schema");

    let fields: Vec<Field> = columns
        .into_iter()
        .map(|(name, data_type)| Field::new(name, data_type.to_arrow(), true))
        .collect();
    Ok(Arc::new(Schema::new(fields)))
}

/// Task id names in first-seen order, each with the join of its value types.
fn task_id_types(model_tasks: &[&Map<String, Value>]) -> Vec<(String, HubDataType)> {
    let mut columns: Vec<(String, Option<HubDataType>)> = Vec::new();

    for model_task in model_tasks {
        let Some(task_ids) = model_task.get("task_ids").and_then(Value::as_object) else {
            continue;
        };
        for (name, task_id) in task_ids {
            let found = HubDataType::join_all(listed_values(task_id).filter_map(HubDataType::of_value));
            match columns.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, ty)) => *ty = join_opt(*ty, found),
                None => columns.push((name.clone(), found)),
            }
        }
    }

    columns
        .into_iter()
        .map(|(name, ty)| (name, ty.unwrap_or(HubDataType::Character)))
        .collect()
}

fn output_type_id_type(
    tasks: &Value,
    model_tasks: &[&Map<String, Value>],
    datatype: OutputTypeIdDatatype,
) -> Result<HubDataType, HubError> {
    match datatype {
        OutputTypeIdDatatype::Fixed(ty) => return Ok(ty),
        OutputTypeIdDatatype::FromConfig => {
            if let Some(name) = tasks.get("output_type_id_datatype").and_then(Value::as_str) {
                if name != "auto" {
                    return name.parse().map_err(|message: String| invalid_tasks(&message));
                }
            }
        }
        OutputTypeIdDatatype::Auto => {}
    }

    let mut inferred: Option<HubDataType> = None;
    for (_, output_type) in output_types(model_tasks) {
        if let Some(param_type) = output_type
            .get("output_type_id_params")
            .and_then(|params| params.get("type"))
            .and_then(Value::as_str)
        {
            let ty: HubDataType = param_type
                .parse()
                .map_err(|message: String| invalid_tasks(&message))?;
            inferred = join_opt(inferred, Some(ty));
        }

        if let Some(ids) = output_type.get("output_type_id") {
            let found = HubDataType::join_all(
                listed_values(ids)
                    .filter(|value| value.as_str() != Some("NA"))
                    .filter_map(HubDataType::of_value),
            );
            inferred = join_opt(inferred, found);
        }
    }

    Ok(inferred.unwrap_or(HubDataType::Character))
}

fn value_type(model_tasks: &[&Map<String, Value>]) -> Result<HubDataType, HubError> {
    let mut merged: Option<HubDataType> = None;
    for (name, output_type) in output_types(model_tasks) {
        let Some(type_name) = output_type
            .get("value")
            .and_then(|value| value.get("type"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        let ty: HubDataType = type_name.parse().map_err(|message: String| {
            invalid_tasks(&format!("output type '{name}' value: {message}"))
        })?;
        merged = join_opt(merged, Some(ty));
    }
    Ok(merged.unwrap_or(HubDataType::Double))
}

fn output_types<'a>(
    model_tasks: &'a [&'a Map<String, Value>],
) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
    model_tasks
        .iter()
        .filter_map(|model_task| model_task.get("output_type").and_then(Value::as_object))
        .flatten()
}

/// Every value listed under `required` and `optional` of a task id or
/// output type id entry.
fn listed_values(entry: &Value) -> impl Iterator<Item = &Value> {
    ["required", "optional"]
        .into_iter()
        .filter_map(move |key| entry.get(key))
        .flat_map(|values| match values {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            Value::Null => Vec::new(),
            scalar => vec![scalar],
        })
}

fn join_opt(a: Option<HubDataType>, b: Option<HubDataType>) -> Option<HubDataType> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.join(b)),
        (a, b) => a.or(b),
    }
}

fn invalid_tasks(message: &str) -> HubError {
    HubError::InvalidConfig {
        path: PathBuf::from(TASKS_FILE),
        message: message.to_string(),
    }
}
