//! Column descriptions declared on a blueprint

use super::value::DatabaseValue;
use std::fmt;
use std::str::FromStr;

/// Supported column kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Char,
    String,
    Text,
    MediumText,
    LongText,
    TinyInteger,
    SmallInteger,
    MediumInteger,
    Integer,
    BigInteger,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    Timestamp,
    Binary,
    /// Dialect-native type passed through verbatim (lower-cased)
    Custom(String),
}

impl ColumnType {
    /// The kind name as declared (`tinyInteger`, `dateTime`, ...)
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Char => "char",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::MediumText => "mediumText",
            ColumnType::LongText => "longText",
            ColumnType::TinyInteger => "tinyInteger",
            ColumnType::SmallInteger => "smallInteger",
            ColumnType::MediumInteger => "mediumInteger",
            ColumnType::Integer => "integer",
            ColumnType::BigInteger => "bigInteger",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "dateTime",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Binary => "binary",
            ColumnType::Custom(name) => name.as_str(),
        }
    }

    /// Whether this is one of the integer ("serial") kinds
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::TinyInteger
                | ColumnType::SmallInteger
                | ColumnType::MediumInteger
                | ColumnType::Integer
                | ColumnType::BigInteger
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = std::convert::Infallible;

    /// Parse a kind name case-insensitively; unknown names become `Custom`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().as_str() {
            "char" => ColumnType::Char,
            "string" | "varchar" => ColumnType::String,
            "text" => ColumnType::Text,
            "mediumtext" => ColumnType::MediumText,
            "longtext" => ColumnType::LongText,
            "tinyinteger" => ColumnType::TinyInteger,
            "smallinteger" => ColumnType::SmallInteger,
            "mediuminteger" => ColumnType::MediumInteger,
            "integer" => ColumnType::Integer,
            "biginteger" => ColumnType::BigInteger,
            "float" => ColumnType::Float,
            "double" => ColumnType::Double,
            "decimal" => ColumnType::Decimal,
            "boolean" | "bool" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "datetime" => ColumnType::DateTime,
            "time" => ColumnType::Time,
            "timestamp" => ColumnType::Timestamp,
            "binary" => ColumnType::Binary,
            _ => ColumnType::Custom(s.to_string()),
        };
        Ok(kind)
    }
}

/// One column declared on a blueprint
///
/// Modifier setters return `&mut Self` so declarations chain:
///
/// ```
/// use table_migrations::core::blueprint::Blueprint;
///
/// let mut table = Blueprint::new("posts");
/// table.string("slug", 120).nullable().unique();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub column_type: ColumnType,
    pub name: String,
    pub length: Option<u32>,
    pub total: Option<u32>,
    pub places: Option<u32>,
    pub unsigned: bool,
    pub auto_increment: bool,
    pub nullable: bool,
    pub default: Option<DatabaseValue>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub use_current: bool,
    pub change: bool,
    pub unique: bool,
    pub index: bool,
}

impl ColumnDefinition {
    pub fn new(column_type: ColumnType, name: impl Into<String>) -> Self {
        Self {
            column_type,
            name: name.into(),
            length: None,
            total: None,
            places: None,
            unsigned: false,
            auto_increment: false,
            nullable: false,
            default: None,
            charset: None,
            collation: None,
            use_current: false,
            change: false,
            unique: false,
            index: false,
        }
    }

    /// Read the column as an attribute bag, using the declared attribute names
    ///
    /// Unknown or unset attributes read as [`DatabaseValue::Null`].
    pub fn get(&self, key: &str) -> DatabaseValue {
        let flag = |set: bool| {
            if set {
                DatabaseValue::Bool(true)
            } else {
                DatabaseValue::Null
            }
        };
        match key {
            "type" => self.column_type.as_str().into(),
            "name" => self.name.as_str().into(),
            "length" => self.length.into(),
            "total" => self.total.into(),
            "places" => self.places.into(),
            "unsigned" => flag(self.unsigned),
            "autoIncrement" => flag(self.auto_increment),
            "nullable" => flag(self.nullable),
            "default" => self.default.clone().unwrap_or(DatabaseValue::Null),
            "charset" => self.charset.clone().into(),
            "collation" => self.collation.clone().into(),
            "useCurrent" => flag(self.use_current),
            "change" => flag(self.change),
            "unique" => flag(self.unique),
            "index" => flag(self.index),
            _ => DatabaseValue::Null,
        }
    }

    pub fn length(&mut self, length: u32) -> &mut Self {
        self.length = Some(length);
        self
    }

    /// Set total digits and decimal places
    pub fn precision(&mut self, total: u32, places: u32) -> &mut Self {
        self.total = Some(total);
        self.places = Some(places);
        self
    }

    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    pub fn default(&mut self, value: impl Into<DatabaseValue>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    pub fn charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.collation = Some(collation.into());
        self
    }

    /// Default a timestamp column to the current time
    pub fn use_current(&mut self) -> &mut Self {
        self.use_current = true;
        self
    }

    /// Modify this existing column instead of adding it
    pub fn change(&mut self) -> &mut Self {
        self.change = true;
        self
    }

    /// Add a unique index over this column
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Add a plain index over this column
    pub fn index(&mut self) -> &mut Self {
        self.index = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_round_trip_names() {
        assert_eq!("tinyInteger".parse::<ColumnType>().ok(), Some(ColumnType::TinyInteger));
        assert_eq!("BOOL".parse::<ColumnType>().ok(), Some(ColumnType::Boolean));
        assert_eq!(
            "JSON".parse::<ColumnType>().ok(),
            Some(ColumnType::Custom("JSON".to_string()))
        );
        assert_eq!(ColumnType::DateTime.to_string(), "dateTime");
    }

    #[test]
    fn test_integer_family() {
        assert!(ColumnType::BigInteger.is_integer());
        assert!(ColumnType::TinyInteger.is_integer());
        assert!(!ColumnType::Decimal.is_integer());
        assert!(!ColumnType::Boolean.is_integer());
    }

    #[test]
    fn test_bag_view() {
        let mut column = ColumnDefinition::new(ColumnType::String, "title");
        column.length(80).nullable();

        assert_eq!(column.get("type"), DatabaseValue::from("string"));
        assert_eq!(column.get("name"), DatabaseValue::from("title"));
        assert_eq!(column.get("length"), DatabaseValue::Long(80));
        assert_eq!(column.get("nullable"), DatabaseValue::Bool(true));
        assert_eq!(column.get("unsigned"), DatabaseValue::Null);
        assert_eq!(column.get("comment"), DatabaseValue::Null);
    }
}
