//! Row predicates over hub datasets.
//!
//! Literals are written as strings (as a user would type them on the
//! command line) and cast to the column's Arrow type before comparison, so
//! `horizon = "1"` compares against an `Int32` column and
//! `reference_date = "2022-11-28"` against a `Date32` one.

use std::fmt;
use std::str::FromStr;

use arrow::array::{Array, ArrayRef, BooleanArray, RecordBatch, Scalar, StringArray};
use arrow::compute::kernels::cmp;
use arrow::compute::{and_kleene, cast, or_kleene};
use arrow::datatypes::{DataType, Schema};

use crate::error::HubError;

/// A boolean condition on the rows of a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// `column == value`
    Eq { column: String, value: String },
    /// `column` is one of `values`
    In { column: String, values: Vec<String> },
    /// All of the inner predicates hold.
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn is_in<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Combine with another predicate, flattening nested conjunctions.
    pub fn and(self, other: Predicate) -> Self {
        let mut parts = match self {
            Predicate::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Predicate::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Predicate::And(parts)
    }

    /// Conjunction of all `predicates`; `None` if there are none.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        predicates.into_iter().reduce(Predicate::and)
    }

    /// Column names referenced by this predicate.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Predicate::Eq { column, .. } | Predicate::In { column, .. } => vec![column.as_str()],
            Predicate::And(parts) => parts.iter().flat_map(Predicate::columns).collect(),
        }
    }

    /// Check that every column exists and every literal can be cast to its
    /// column's type.
    pub fn validate(&self, schema: &Schema) -> Result<(), HubError> {
        match self {
            Predicate::Eq { column, value } => {
                let data_type = column_type(schema, column)?;
                literal(column, value, data_type).map(|_| ())
            }
            Predicate::In { column, values } => {
                let data_type = column_type(schema, column)?;
                values
                    .iter()
                    .try_for_each(|value| literal(column, value, data_type).map(|_| ()))
            }
            Predicate::And(parts) => parts.iter().try_for_each(|part| part.validate(schema)),
        }
    }

    /// Evaluate against a batch. Rows where a compared value is null come
    /// back null, which filtering treats as false.
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray, HubError> {
        match self {
            Predicate::Eq { column, value } => {
                let array = batch_column(batch, column)?;
                let rhs = literal(column, value, array.data_type())?;
                Ok(cmp::eq(array, &Scalar::new(rhs))?)
            }
            Predicate::In { column, values } => {
                let array = batch_column(batch, column)?;
                let mut mask = BooleanArray::from(vec![false; batch.num_rows()]);
                for value in values {
                    let rhs = literal(column, value, array.data_type())?;
                    mask = or_kleene(&mask, &cmp::eq(array, &Scalar::new(rhs))?)?;
                }
                Ok(mask)
            }
            Predicate::And(parts) => {
                let mut mask = BooleanArray::from(vec![true; batch.num_rows()]);
                for part in parts {
                    mask = and_kleene(&mask, &part.evaluate(batch)?)?;
                }
                Ok(mask)
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq { column, value } => write!(f, "{column} == '{value}'"),
            Predicate::In { column, values } => {
                write!(f, "{column} in ['{}']", values.join("', '"))
            }
            Predicate::And(parts) => {
                let rendered: Vec<String> = parts.iter().map(ToString::to_string).collect();
                write!(f, "{}", rendered.join(" and "))
            }
        }
    }
}

impl FromStr for Predicate {
    type Err = HubError;

    /// Parse `column=value` or `column=v1,v2,...` (the latter as `In`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, value) = s.split_once('=').ok_or_else(|| {
            HubError::InvalidFilter(format!("'{s}' (expected COLUMN=VALUE)"))
        })?;
        let column = column.trim();
        if column.is_empty() {
            return Err(HubError::InvalidFilter(format!("'{s}' has an empty column name")));
        }

        if value.contains(',') {
            Ok(Predicate::is_in(column, value.split(',').map(str::trim)))
        } else {
            Ok(Predicate::eq(column, value.trim()))
        }
    }
}

fn column_type<'a>(schema: &'a Schema, column: &str) -> Result<&'a DataType, HubError> {
    schema
        .field_with_name(column)
        .map(|field| field.data_type())
        .map_err(|_| HubError::UnknownColumn(column.to_string()))
}

fn batch_column<'a>(batch: &'a RecordBatch, column: &str) -> Result<&'a ArrayRef, HubError> {
    batch
        .column_by_name(column)
        .ok_or_else(|| HubError::UnknownColumn(column.to_string()))
}

/// A one-element array holding `value` cast to `data_type`.
fn literal(column: &str, value: &str, data_type: &DataType) -> Result<ArrayRef, HubError> {
    let raw = StringArray::from(vec![value]);
    let cast_value = cast(&raw, data_type)?;
    if cast_value.is_null(0) {
        return Err(HubError::InvalidFilter(format!(
            "'{value}' is not a valid {data_type} value for column '{column}'"
        )));
    }
    Ok(cast_value)
}
