//! SQL grammars
//!
//! A grammar turns one accumulator's commands into SQL statements. It has one
//! compilation rule per command kind; every rule defaults to
//! [`Compiled::Unsupported`], so a grammar only implements the subset it
//! supports and the accumulator skips the rest.

pub mod mysql;

pub use mysql::MySqlGrammar;

use crate::core::attributes::Attributes;
use crate::core::column::ColumnDefinition;
use crate::core::command::{Command, ForeignKeyCommand, IndexCommand};
use crate::core::error::Result;
use crate::core::value::DatabaseValue;

/// Boolean operator joining WHERE predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

/// Read access a grammar needs to the accumulator it compiles
pub trait QueryProducer {
    /// Unprefixed table name
    fn table(&self) -> &str;

    fn columns(&self) -> &[ColumnDefinition] {
        &[]
    }

    fn commands(&self) -> &[Command];

    /// WHERE-clause maps in declaration order
    fn clauses(&self) -> &[Attributes] {
        &[]
    }

    fn where_operator(&self) -> LogicalOperator {
        LogicalOperator::And
    }

    /// Whether reads should skip the grammar's default limit
    fn unbounded(&self) -> bool {
        false
    }

    /// Columns that are added rather than changed
    fn added_columns(&self) -> Vec<&ColumnDefinition> {
        self.columns().iter().filter(|c| !c.change).collect()
    }

    /// Columns flagged `change`
    fn changed_columns(&self) -> Vec<&ColumnDefinition> {
        self.columns().iter().filter(|c| c.change).collect()
    }
}

/// Outcome of compiling one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compiled {
    /// Zero or more statements, in execution order
    Statements(Vec<String>),
    /// The grammar has no rule for this command
    Unsupported,
}

impl Compiled {
    pub fn one(statement: String) -> Self {
        Compiled::Statements(vec![statement])
    }
}

/// A dialect-specific compiler
///
/// Rule names mirror the command names. Implementors override the rules they
/// support.
#[allow(unused_variables)]
pub trait Grammar: Send + Sync {
    fn compile_create(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_add(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_change(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_drop(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_drop_if_exists(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_rename(&self, source: &dyn QueryProducer, to: &str) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_drop_column(
        &self,
        source: &dyn QueryProducer,
        columns: &[String],
    ) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_rename_column(
        &self,
        source: &dyn QueryProducer,
        from: &str,
        to: &str,
    ) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_primary(
        &self,
        source: &dyn QueryProducer,
        index: &IndexCommand,
    ) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_unique(&self, source: &dyn QueryProducer, index: &IndexCommand) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_index(&self, source: &dyn QueryProducer, index: &IndexCommand) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_foreign(
        &self,
        source: &dyn QueryProducer,
        foreign: &ForeignKeyCommand,
    ) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_insert(&self, source: &dyn QueryProducer, data: &Attributes) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_update(&self, source: &dyn QueryProducer, data: &Attributes) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_delete(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }

    fn compile_find(&self, source: &dyn QueryProducer) -> Result<Compiled> {
        Ok(Compiled::Unsupported)
    }
}

/// Dispatch one command to the grammar rule for its kind
pub fn compile_command(
    grammar: &dyn Grammar,
    source: &dyn QueryProducer,
    command: &Command,
) -> Result<Compiled> {
    match command {
        Command::Create => grammar.compile_create(source),
        Command::Add => grammar.compile_add(source),
        Command::Change => grammar.compile_change(source),
        Command::Drop => grammar.compile_drop(source),
        Command::DropIfExists => grammar.compile_drop_if_exists(source),
        Command::Rename { to } => grammar.compile_rename(source, to),
        Command::DropColumn { columns } => grammar.compile_drop_column(source, columns),
        Command::RenameColumn { from, to } => grammar.compile_rename_column(source, from, to),
        Command::Primary(index) => grammar.compile_primary(source, index),
        Command::Unique(index) => grammar.compile_unique(source, index),
        Command::Index(index) => grammar.compile_index(source, index),
        Command::Foreign(foreign) => grammar.compile_foreign(source, foreign),
        Command::Insert { data } => grammar.compile_insert(source, data),
        Command::Update { data } => grammar.compile_update(source, data),
        Command::Delete => grammar.compile_delete(source),
        Command::Find => grammar.compile_find(source),
    }
}

/// Compile every command of an accumulator, flattening the statements
///
/// Commands without a rule are skipped.
pub fn compile_all(grammar: &dyn Grammar, source: &dyn QueryProducer) -> Result<Vec<String>> {
    let mut statements = Vec::new();

    for command in source.commands() {
        match compile_command(grammar, source, command)? {
            Compiled::Statements(sql) => statements.extend(sql),
            Compiled::Unsupported => {
                tracing::debug!(
                    "No compilation rule for `{}` on table {}; skipping",
                    command.name(),
                    source.table()
                );
            }
        }
    }

    Ok(statements)
}

/// Quote a literal value, doubling embedded single quotes
pub(crate) fn quote_literal(value: &DatabaseValue) -> String {
    format!("'{}'", value.to_sql_text().replace('\'', "''"))
}
