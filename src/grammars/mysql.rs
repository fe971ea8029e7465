//! MySQL grammar
//!
//! Quotes identifiers with backticks, prefixes every table with the
//! connection's prefix and renders values as quoted literals.

use super::{quote_literal, Compiled, Grammar, QueryProducer};
use crate::core::attributes::Attributes;
use crate::core::column::{ColumnDefinition, ColumnType};
use crate::core::command::{ForeignKeyCommand, IndexCommand};
use crate::core::connection::Connection;
use crate::core::error::{DatabaseError, Result};
use crate::core::value::DatabaseValue;
use std::collections::HashSet;

/// Compiles accumulators into MySQL statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlGrammar {
    prefix: String,
    default_limit: u64,
}

impl MySqlGrammar {
    /// Limit applied to reads that set none
    pub const DEFAULT_LIMIT: u64 = 10;

    /// Create a grammar for the given table prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            default_limit: Self::DEFAULT_LIMIT,
        }
    }

    /// Create a grammar bound to a connection's table prefix
    pub fn for_connection(connection: &dyn Connection) -> Self {
        Self::new(connection.prefix())
    }

    /// Override the limit applied to reads that set none; `0` is raised to `1`
    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn default_limit(&self) -> u64 {
        self.default_limit
    }

    /// Wrap an identifier in backticks
    pub fn wrap(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }

    /// Prefix and wrap a table name
    pub fn wrap_table(&self, table: &str) -> String {
        self.wrap(&format!("{}{}", self.prefix, table))
    }

    fn wrap_all(&self, identifiers: &[String]) -> String {
        identifiers
            .iter()
            .map(|i| self.wrap(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Translate a column's kind into MySQL type syntax
    pub fn compile_type(&self, column: &ColumnDefinition) -> String {
        match &column.column_type {
            ColumnType::Char => format!("char({})", column.length.unwrap_or(255)),
            ColumnType::String => format!("varchar({})", column.length.unwrap_or(255)),
            kind if kind.is_integer() => kind.as_str().to_lowercase().replace("integer", "int"),
            ColumnType::Float | ColumnType::Double => match (column.total, column.places) {
                (Some(total), Some(places)) => format!("double({}, {})", total, places),
                _ => "double".to_string(),
            },
            ColumnType::Decimal => format!(
                "decimal({}, {})",
                column.total.unwrap_or(8),
                column.places.unwrap_or(2)
            ),
            ColumnType::Boolean => "tinyint(1)".to_string(),
            ColumnType::Timestamp if column.use_current => {
                "timestamp default CURRENT_TIMESTAMP".to_string()
            }
            ColumnType::Binary => "blob".to_string(),
            other => other.as_str().to_lowercase(),
        }
    }

    /// Append modifier clauses in their fixed order
    pub fn add_modifiers(&self, mut sql: String, column: &ColumnDefinition) -> String {
        if column.unsigned {
            sql.push_str(" UNSIGNED");
        }

        if let Some(charset) = &column.charset {
            sql.push_str(&format!(" CHARACTER SET {}", charset));
        }

        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" COLLATE {}", collation));
        }

        sql.push_str(if column.nullable { " NULL" } else { " NOT NULL" });

        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT {}", Self::default_value(default)));
        }

        if column.column_type.is_integer() && column.auto_increment {
            sql.push_str(" AUTO_INCREMENT PRIMARY KEY");
        }

        sql
    }

    fn default_value(value: &DatabaseValue) -> String {
        match value {
            DatabaseValue::Bool(flag) => if *flag { "1" } else { "0" }.to_string(),
            other => quote_literal(other),
        }
    }

    /// Literal for an INSERT value or UPDATE assignment
    fn set_value(value: &DatabaseValue) -> String {
        if value.is_null() {
            "NULL".to_string()
        } else {
            quote_literal(value)
        }
    }

    /// Full definition of one column: name, type and modifiers
    pub fn compile_column(&self, column: &ColumnDefinition) -> String {
        let sql = format!("{} {}", self.wrap(&column.name), self.compile_type(column));
        self.add_modifiers(sql, column)
    }

    fn ensure_distinct_columns(source: &dyn QueryProducer) -> Result<()> {
        let mut seen = HashSet::new();
        for column in source.columns() {
            if !seen.insert(column.name.as_str()) {
                return Err(DatabaseError::invalid_command(format!(
                    "column `{}` is declared more than once on table {}",
                    column.name,
                    source.table()
                )));
            }
        }
        Ok(())
    }

    fn alter_columns(
        &self,
        source: &dyn QueryProducer,
        columns: Vec<&ColumnDefinition>,
        clause: &str,
    ) -> Result<Compiled> {
        Self::ensure_distinct_columns(source)?;

        if columns.is_empty() {
            return Ok(Compiled::Statements(Vec::new()));
        }

        let definitions: Vec<String> = columns
            .into_iter()
            .map(|c| format!("{} {}", clause, self.compile_column(c)))
            .collect();

        Ok(Compiled::one(format!(
            "ALTER TABLE {} {}",
            self.wrap_table(source.table()),
            definitions.join(", ")
        )))
    }

    fn compile_key(
        &self,
        source: &dyn QueryProducer,
        index: &IndexCommand,
        key: &str,
    ) -> Result<Compiled> {
        if index.columns.is_empty() {
            return Err(DatabaseError::invalid_command(format!(
                "index `{}` has no columns",
                index.index
            )));
        }

        let algorithm = index
            .algorithm
            .as_ref()
            .map(|a| format!(" USING {}", a.to_uppercase()))
            .unwrap_or_default();

        Ok(Compiled::one(format!(
            "ALTER TABLE {} ADD {}{} ({})",
            self.wrap_table(source.table()),
            key,
            algorithm,
            self.wrap_all(&index.columns)
        )))
    }

    /// Assemble the WHERE clause from the accumulator's clause maps
    ///
    /// Returns an empty string when there are no predicates, otherwise a
    /// string starting with ` WHERE `.
    pub fn compile_where(&self, source: &dyn QueryProducer) -> String {
        let clauses = Attributes::flatten(source.clauses());

        let predicates: Vec<String> = clauses
            .iter()
            .filter(|(key, _)| *key != "limit")
            .map(|(key, value)| {
                if value.is_null() {
                    format!("{} IS NULL", self.wrap(key))
                } else {
                    format!("{} = {}", self.wrap(key), quote_literal(value))
                }
            })
            .collect();

        match predicates.len() {
            0 => String::new(),
            1 => format!(" WHERE {}", predicates[0]),
            _ => {
                let operator = format!(" {} ", source.where_operator().as_sql());
                format!(" WHERE {}", predicates.join(&operator))
            }
        }
    }

    /// Assemble the LIMIT clause
    ///
    /// An explicit `limit` clause always wins. Otherwise the default limit is
    /// applied when `force` is set and the accumulator is not unbounded.
    pub fn compile_limit(&self, source: &dyn QueryProducer, force: bool) -> String {
        let clauses = Attributes::flatten(source.clauses());

        if let Some(limit) = clauses.get("limit").as_long() {
            return format!(" LIMIT {}", limit);
        }

        if force && !source.unbounded() {
            return format!(" LIMIT {}", self.default_limit);
        }

        String::new()
    }
}

impl Grammar for MySqlGrammar {
    fn compile_create(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Self::ensure_distinct_columns(source)?;

        let columns: Vec<String> = source
            .columns()
            .iter()
            .map(|c| self.compile_column(c))
            .collect();

        Ok(Compiled::one(format!(
            "CREATE TABLE {} ( {} )",
            self.wrap_table(source.table()),
            columns.join(", ")
        )))
    }

    fn compile_add(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        self.alter_columns(source, source.added_columns(), "ADD")
    }

    fn compile_change(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        self.alter_columns(source, source.changed_columns(), "MODIFY")
    }

    fn compile_drop(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::one(format!(
            "DROP TABLE {}",
            self.wrap_table(source.table())
        )))
    }

    fn compile_drop_if_exists(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::one(format!(
            "DROP TABLE IF EXISTS {}",
            self.wrap_table(source.table())
        )))
    }

    fn compile_rename(&self, source: &dyn QueryProducer, to: &str) -> Result<Compiled> {
        Ok(Compiled::one(format!(
            "RENAME TABLE {} TO {}",
            self.wrap_table(source.table()),
            self.wrap_table(to)
        )))
    }

    fn compile_drop_column(
        &self,
        source: &dyn QueryProducer,
        columns: &[String],
    ) -> Result<Compiled> {
        if columns.is_empty() {
            return Err(DatabaseError::invalid_command(format!(
                "dropColumn on table {} names no columns",
                source.table()
            )));
        }

        let drops: Vec<String> = columns
            .iter()
            .map(|c| format!("DROP {}", self.wrap(c)))
            .collect();

        Ok(Compiled::one(format!(
            "ALTER TABLE {} {}",
            self.wrap_table(source.table()),
            drops.join(", ")
        )))
    }

    fn compile_rename_column(
        &self,
        source: &dyn QueryProducer,
        from: &str,
        to: &str,
    ) -> Result<Compiled> {
        Ok(Compiled::one(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.wrap_table(source.table()),
            self.wrap(from),
            self.wrap(to)
        )))
    }

    fn compile_primary(
        &self,
        source: &dyn QueryProducer,
        index: &IndexCommand,
    ) -> Result<Compiled> {
        self.compile_key(source, index, "PRIMARY KEY")
    }

    fn compile_unique(&self, source: &dyn QueryProducer, index: &IndexCommand) -> Result<Compiled> {
        self.compile_key(source, index, &format!("UNIQUE {}", self.wrap(&index.index)))
    }

    fn compile_index(&self, source: &dyn QueryProducer, index: &IndexCommand) -> Result<Compiled> {
        self.compile_key(source, index, &format!("INDEX {}", self.wrap(&index.index)))
    }

    fn compile_foreign(
        &self,
        source: &dyn QueryProducer,
        foreign: &ForeignKeyCommand,
    ) -> Result<Compiled> {
        let on = foreign.on.as_deref().ok_or_else(|| {
            DatabaseError::invalid_command(format!(
                "foreign key `{}` has no referenced table",
                foreign.index
            ))
        })?;

        if foreign.columns.is_empty() || foreign.references.is_empty() {
            return Err(DatabaseError::invalid_command(format!(
                "foreign key `{}` needs both local and referenced columns",
                foreign.index
            )));
        }

        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.wrap_table(source.table()),
            self.wrap(&foreign.index),
            self.wrap_all(&foreign.columns),
            self.wrap_table(on),
            self.wrap_all(&foreign.references)
        );

        if let Some(action) = &foreign.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action.to_uppercase()));
        }

        if let Some(action) = &foreign.on_update {
            sql.push_str(&format!(" ON UPDATE {}", action.to_uppercase()));
        }

        Ok(Compiled::one(sql))
    }

    fn compile_insert(&self, source: &dyn QueryProducer, data: &Attributes) -> Result<Compiled> {
        if data.is_empty() {
            return Err(DatabaseError::invalid_command(format!(
                "insert into {} has no data",
                source.table()
            )));
        }

        let keys: Vec<String> = data.keys().map(|k| self.wrap(k)).collect();
        let values: Vec<String> = data.values().map(Self::set_value).collect();

        Ok(Compiled::one(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.wrap_table(source.table()),
            keys.join(", "),
            values.join(", ")
        )))
    }

    fn compile_update(&self, source: &dyn QueryProducer, data: &Attributes) -> Result<Compiled> {
        if data.is_empty() {
            return Err(DatabaseError::invalid_command(format!(
                "update of {} has no data",
                source.table()
            )));
        }

        let assignments: Vec<String> = data
            .iter()
            .map(|(key, value)| format!("{}={}", self.wrap(key), Self::set_value(value)))
            .collect();

        Ok(Compiled::one(format!(
            "UPDATE {} SET {}{}",
            self.wrap_table(source.table()),
            assignments.join(", "),
            self.compile_where(source)
        )))
    }

    fn compile_delete(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::one(format!(
            "DELETE FROM {}{}",
            self.wrap_table(source.table()),
            self.compile_where(source)
        )))
    }

    fn compile_find(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::one(format!(
            "SELECT * FROM {}{}{}",
            self.wrap_table(source.table()),
            self.compile_where(source),
            self.compile_limit(source, true)
        )))
    }
}
