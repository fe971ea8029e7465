//! Scalar values carried by attribute bags, column defaults and result rows

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A loosely-typed scalar value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatabaseValue {
    /// Null / absent value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// String value
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Timestamp (Unix timestamp in seconds)
    Timestamp(i64),
}

impl DatabaseValue {
    /// Get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DatabaseValue::Bool(v) => Some(*v),
            DatabaseValue::Int(v) => Some(*v != 0),
            DatabaseValue::Long(v) => Some(*v != 0),
            DatabaseValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get the value as an i64
    pub fn as_long(&self) -> Option<i64> {
        match self {
            DatabaseValue::Long(v) | DatabaseValue::Timestamp(v) => Some(*v),
            DatabaseValue::Int(v) => Some(i64::from(*v)),
            DatabaseValue::Bool(v) => Some(i64::from(*v)),
            DatabaseValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get the value as a string slice (String values only)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatabaseValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render the value as the raw text that goes between SQL quotes
    ///
    /// Booleans become `1`/`0`, null becomes the empty string and bytes are
    /// decoded lossily as UTF-8.
    pub fn to_sql_text(&self) -> String {
        match self {
            DatabaseValue::Null => String::new(),
            DatabaseValue::Bool(v) => if *v { "1" } else { "0" }.to_string(),
            DatabaseValue::Int(v) => v.to_string(),
            DatabaseValue::Long(v) | DatabaseValue::Timestamp(v) => v.to_string(),
            DatabaseValue::Float(v) => v.to_string(),
            DatabaseValue::Double(v) => v.to_string(),
            DatabaseValue::String(s) => s.clone(),
            DatabaseValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Bool(_) => "bool",
            DatabaseValue::Int(_) => "int",
            DatabaseValue::Long(_) => "long",
            DatabaseValue::Float(_) => "float",
            DatabaseValue::Double(_) => "double",
            DatabaseValue::String(_) => "string",
            DatabaseValue::Bytes(_) => "bytes",
            DatabaseValue::Timestamp(_) => "timestamp",
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(v: bool) -> Self {
        DatabaseValue::Bool(v)
    }
}

impl From<i32> for DatabaseValue {
    fn from(v: i32) -> Self {
        DatabaseValue::Int(v)
    }
}

impl From<i64> for DatabaseValue {
    fn from(v: i64) -> Self {
        DatabaseValue::Long(v)
    }
}

impl From<u32> for DatabaseValue {
    fn from(v: u32) -> Self {
        DatabaseValue::Long(i64::from(v))
    }
}

impl From<f32> for DatabaseValue {
    fn from(v: f32) -> Self {
        DatabaseValue::Float(v)
    }
}

impl From<f64> for DatabaseValue {
    fn from(v: f64) -> Self {
        DatabaseValue::Double(v)
    }
}

impl From<String> for DatabaseValue {
    fn from(v: String) -> Self {
        DatabaseValue::String(v)
    }
}

impl From<&str> for DatabaseValue {
    fn from(v: &str) -> Self {
        DatabaseValue::String(v.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(v: Vec<u8>) -> Self {
        DatabaseValue::Bytes(v)
    }
}

impl<T: Into<DatabaseValue>> From<Option<T>> for DatabaseValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// A row of query results (column name -> value mapping)
pub type DatabaseRow = HashMap<String, DatabaseValue>;

/// Multiple rows returned from a query
pub type DatabaseResult = Vec<DatabaseRow>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_text_rendering() {
        assert_eq!(DatabaseValue::Bool(true).to_sql_text(), "1");
        assert_eq!(DatabaseValue::Bool(false).to_sql_text(), "0");
        assert_eq!(DatabaseValue::Null.to_sql_text(), "");
        assert_eq!(DatabaseValue::Long(42).to_sql_text(), "42");
        assert_eq!(DatabaseValue::from("active").to_sql_text(), "active");
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(DatabaseValue::Int(1).as_bool(), Some(true));
        assert_eq!(DatabaseValue::from("no").as_bool(), Some(false));
        assert_eq!(DatabaseValue::from("maybe").as_bool(), None);
        assert_eq!(DatabaseValue::Null.as_bool(), None);
    }

    #[test]
    fn test_value_from_types() {
        let val: DatabaseValue = 42.into();
        assert_eq!(val, DatabaseValue::Int(42));

        let val: DatabaseValue = Some("hello").into();
        assert_eq!(val, DatabaseValue::String("hello".to_string()));

        let val: DatabaseValue = Option::<i32>::None.into();
        assert_eq!(val, DatabaseValue::Null);
        assert_eq!(val.type_name(), "null");
    }

    #[test]
    fn test_as_long() {
        assert_eq!(DatabaseValue::from(" 7 ").as_long(), Some(7));
        assert_eq!(DatabaseValue::Int(3).as_long(), Some(3));
        assert_eq!(DatabaseValue::Null.as_long(), None);
    }
}
