//! The hubverse column types and how they combine.

use std::fmt;
use std::str::FromStr;

use arrow::datatypes::DataType;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

/// A column type as the hubverse names it.
///
/// Types form a small lattice used to merge the values a task id (or an
/// output type id) can take: `Boolean < Integer < Double < Character`, with
/// `Date` only compatible with itself and widening to `Character` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HubDataType {
    Boolean,
    Integer,
    Double,
    Date,
    Character,
}

impl HubDataType {
    /// The narrowest type that can hold values of both `self` and `other`.
    pub fn join(self, other: HubDataType) -> HubDataType {
        use HubDataType::*;

        match (self, other) {
            (a, b) if a == b => a,
            (Date, _) | (_, Date) => Character,
            (Character, _) | (_, Character) => Character,
            (Double, _) | (_, Double) => Double,
            (Integer, _) | (_, Integer) => Integer,
            (Boolean, Boolean) => Boolean,
        }
    }

    /// Join an iterator of types; `None` if it is empty.
    pub fn join_all(types: impl IntoIterator<Item = HubDataType>) -> Option<HubDataType> {
        types.into_iter().reduce(HubDataType::join)
    }

    /// Infer the type of a single JSON config value. Nulls have no type;
    /// integers outside the `Int32` range are `Double`.
    pub fn of_value(value: &Value) -> Option<HubDataType> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(HubDataType::Boolean),
            Value::Number(n) if n.as_i64().is_some_and(|v| i32::try_from(v).is_ok()) => {
                Some(HubDataType::Integer)
            }
            Value::Number(_) => Some(HubDataType::Double),
            Value::String(s) if is_iso_date(s) => Some(HubDataType::Date),
            _ => Some(HubDataType::Character),
        }
    }

    /// The Arrow type used for columns of this type.
    pub fn to_arrow(self) -> DataType {
        match self {
            HubDataType::Boolean => DataType::Boolean,
            HubDataType::Integer => DataType::Int32,
            HubDataType::Double => DataType::Float64,
            HubDataType::Date => DataType::Date32,
            HubDataType::Character => DataType::Utf8,
        }
    }

    /// The name used in hub config files (`value.type`, `output_type_id_datatype`).
    pub fn config_name(self) -> &'static str {
        match self {
            HubDataType::Boolean => "logical",
            HubDataType::Integer => "integer",
            HubDataType::Double => "double",
            HubDataType::Date => "Date",
            HubDataType::Character => "character",
        }
    }
}

impl fmt::Display for HubDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

impl FromStr for HubDataType {
    type Err = String;

    /// Parse a config type name. `numeric` is accepted as an alias for `double`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logical" | "boolean" => Ok(HubDataType::Boolean),
            "integer" => Ok(HubDataType::Integer),
            "double" | "numeric" => Ok(HubDataType::Double),
            "Date" | "date" => Ok(HubDataType::Date),
            "character" | "string" => Ok(HubDataType::Character),
            other => Err(format!("unknown data type '{other}'")),
        }
    }
}

/// True for strings in `YYYY-MM-DD` form naming a real calendar date.
pub(crate) fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_widens_numbers() {
        assert_eq!(
            HubDataType::Integer.join(HubDataType::Double),
            HubDataType::Double
        );
        assert_eq!(
            HubDataType::Boolean.join(HubDataType::Integer),
            HubDataType::Integer
        );
        assert_eq!(
            HubDataType::Double.join(HubDataType::Character),
            HubDataType::Character
        );
    }

    #[test]
    fn date_only_joins_with_itself() {
        assert_eq!(HubDataType::Date.join(HubDataType::Date), HubDataType::Date);
        assert_eq!(
            HubDataType::Date.join(HubDataType::Integer),
            HubDataType::Character
        );
        assert_eq!(
            HubDataType::Boolean.join(HubDataType::Date),
            HubDataType::Character
        );
    }

    #[test]
    fn value_inference() {
        assert_eq!(HubDataType::of_value(&json!(null)), None);
        assert_eq!(HubDataType::of_value(&json!(1)), Some(HubDataType::Integer));
        assert_eq!(HubDataType::of_value(&json!(-1)), Some(HubDataType::Integer));
        assert_eq!(HubDataType::of_value(&json!(0.5)), Some(HubDataType::Double));
        assert_eq!(
            HubDataType::of_value(&json!(i32::MAX)),
            Some(HubDataType::Integer)
        );
        assert_eq!(
            HubDataType::of_value(&json!(i64::from(i32::MAX) + 1)),
            Some(HubDataType::Double)
        );
        assert_eq!(
            HubDataType::of_value(&json!(u64::MAX)),
            Some(HubDataType::Double)
        );
        assert_eq!(HubDataType::of_value(&json!(true)), Some(HubDataType::Boolean));
        assert_eq!(
            HubDataType::of_value(&json!("2022-11-28")),
            Some(HubDataType::Date)
        );
        assert_eq!(
            HubDataType::of_value(&json!("2022-13-28")),
            Some(HubDataType::Character)
        );
        assert_eq!(
            HubDataType::of_value(&json!("wk inc flu hosp")),
            Some(HubDataType::Character)
        );
    }

    #[test]
    fn config_names_round_trip() {
        for ty in [
            HubDataType::Boolean,
            HubDataType::Integer,
            HubDataType::Double,
            HubDataType::Date,
            HubDataType::Character,
        ] {
            assert_eq!(ty.config_name().parse::<HubDataType>(), Ok(ty));
        }
        assert!("decimal".parse::<HubDataType>().is_err());
    }
}
