//! Schema accumulator
//!
//! A [`Blueprint`] collects column declarations and structural commands for
//! one table. Nothing touches the database until [`Blueprint::build`] runs the
//! compiled statements.
//!
//! # Example
//!
//! ```
//! use table_migrations::core::blueprint::Blueprint;
//! use table_migrations::grammars::MySqlGrammar;
//!
//! let mut table = Blueprint::new("posts");
//! table.create();
//! table.increments("id");
//! table.string("title", 200);
//! table.boolean("published").default(false);
//!
//! let sql = table.to_sql(&MySqlGrammar::new("wp_")).unwrap();
//! assert!(sql[0].starts_with("CREATE TABLE `wp_posts`"));
//! ```

use super::column::{ColumnDefinition, ColumnType};
use super::command::{Command, ForeignKeyCommand, IndexCommand, IndexKind};
use super::connection::Connection;
use super::error::{DatabaseError, Result};
use crate::grammars::{compile_all, Grammar, QueryProducer};

/// Column and command accumulator for one table
#[derive(Debug, Clone)]
pub struct Blueprint {
    table: String,
    columns: Vec<ColumnDefinition>,
    commands: Vec<Command>,
}

impl Blueprint {
    /// Create an empty blueprint for an unprefixed table name
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Whether the blueprint creates its table
    pub fn creating(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Create))
    }

    // Columns

    /// Append a column and hand it back for chaining modifiers
    pub fn add_column(
        &mut self,
        column_type: ColumnType,
        name: impl Into<String>,
    ) -> &mut ColumnDefinition {
        self.columns.push(ColumnDefinition::new(column_type, name));
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    /// Remove a declared column by name
    pub fn remove_column(&mut self, name: &str) -> &mut Self {
        self.columns.retain(|c| c.name != name);
        self
    }

    pub fn char(&mut self, name: impl Into<String>, length: u32) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Char, name).length(length)
    }

    pub fn string(&mut self, name: impl Into<String>, length: u32) -> &mut ColumnDefinition {
        self.add_column(ColumnType::String, name).length(length)
    }

    pub fn text(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Text, name)
    }

    pub fn medium_text(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::MediumText, name)
    }

    pub fn long_text(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::LongText, name)
    }

    fn integer_column(
        &mut self,
        column_type: ColumnType,
        name: impl Into<String>,
        auto_increment: bool,
        unsigned: bool,
    ) -> &mut ColumnDefinition {
        let column = self.add_column(column_type, name);
        column.auto_increment = auto_increment;
        column.unsigned = unsigned;
        column
    }

    pub fn integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
        unsigned: bool,
    ) -> &mut ColumnDefinition {
        self.integer_column(ColumnType::Integer, name, auto_increment, unsigned)
    }

    pub fn tiny_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
        unsigned: bool,
    ) -> &mut ColumnDefinition {
        self.integer_column(ColumnType::TinyInteger, name, auto_increment, unsigned)
    }

    pub fn small_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
        unsigned: bool,
    ) -> &mut ColumnDefinition {
        self.integer_column(ColumnType::SmallInteger, name, auto_increment, unsigned)
    }

    pub fn medium_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
        unsigned: bool,
    ) -> &mut ColumnDefinition {
        self.integer_column(ColumnType::MediumInteger, name, auto_increment, unsigned)
    }

    pub fn big_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
        unsigned: bool,
    ) -> &mut ColumnDefinition {
        self.integer_column(ColumnType::BigInteger, name, auto_increment, unsigned)
    }

    pub fn unsigned_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
    ) -> &mut ColumnDefinition {
        self.integer(name, auto_increment, true)
    }

    pub fn unsigned_tiny_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
    ) -> &mut ColumnDefinition {
        self.tiny_integer(name, auto_increment, true)
    }

    pub fn unsigned_small_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
    ) -> &mut ColumnDefinition {
        self.small_integer(name, auto_increment, true)
    }

    pub fn unsigned_medium_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
    ) -> &mut ColumnDefinition {
        self.medium_integer(name, auto_increment, true)
    }

    pub fn unsigned_big_integer(
        &mut self,
        name: impl Into<String>,
        auto_increment: bool,
    ) -> &mut ColumnDefinition {
        self.big_integer(name, auto_increment, true)
    }

    /// Unsigned auto-incrementing primary key
    pub fn increments(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.unsigned_integer(name, true)
    }

    pub fn tiny_increments(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.unsigned_tiny_integer(name, true)
    }

    pub fn small_increments(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.unsigned_small_integer(name, true)
    }

    pub fn medium_increments(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.unsigned_medium_integer(name, true)
    }

    pub fn big_increments(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.unsigned_big_integer(name, true)
    }

    pub fn float(
        &mut self,
        name: impl Into<String>,
        total: u32,
        places: u32,
    ) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Float, name).precision(total, places)
    }

    /// Double column; precision applies only when both parts are given
    pub fn double(
        &mut self,
        name: impl Into<String>,
        total: Option<u32>,
        places: Option<u32>,
    ) -> &mut ColumnDefinition {
        let column = self.add_column(ColumnType::Double, name);
        column.total = total;
        column.places = places;
        column
    }

    pub fn decimal(
        &mut self,
        name: impl Into<String>,
        total: u32,
        places: u32,
    ) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Decimal, name).precision(total, places)
    }

    pub fn boolean(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Boolean, name)
    }

    pub fn date(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Date, name)
    }

    pub fn date_time(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::DateTime, name)
    }

    pub fn time(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Time, name)
    }

    pub fn timestamp(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Timestamp, name)
    }

    pub fn binary(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(ColumnType::Binary, name)
    }

    /// Nullable `created_at` and `updated_at` timestamps
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
    }

    // Commands

    /// Append a command and hand it back
    pub fn add_command(&mut self, command: Command) -> &mut Command {
        self.commands.push(command);
        let last = self.commands.len() - 1;
        &mut self.commands[last]
    }

    pub fn create(&mut self) -> &mut Command {
        self.add_command(Command::Create)
    }

    pub fn drop(&mut self) -> &mut Command {
        self.add_command(Command::Drop)
    }

    pub fn drop_if_exists(&mut self) -> &mut Command {
        self.add_command(Command::DropIfExists)
    }

    /// Rename the table; `to` is unprefixed
    pub fn rename(&mut self, to: impl Into<String>) -> &mut Command {
        self.add_command(Command::Rename { to: to.into() })
    }

    pub fn drop_column(&mut self, columns: &[&str]) -> &mut Command {
        self.add_command(Command::DropColumn {
            columns: to_owned(columns),
        })
    }

    pub fn rename_column(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> &mut Command {
        self.add_command(Command::RenameColumn {
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn primary(&mut self, columns: &[&str], name: Option<&str>) -> &mut IndexCommand {
        index_of(self.index_command(IndexKind::Primary, columns, name))
    }

    pub fn unique(&mut self, columns: &[&str], name: Option<&str>) -> &mut IndexCommand {
        index_of(self.index_command(IndexKind::Unique, columns, name))
    }

    pub fn index(&mut self, columns: &[&str], name: Option<&str>) -> &mut IndexCommand {
        index_of(self.index_command(IndexKind::Index, columns, name))
    }

    /// Declare a foreign key; chain `references` and `on` to complete it
    pub fn foreign(&mut self, columns: &[&str], name: Option<&str>) -> &mut ForeignKeyCommand {
        match self.index_command(IndexKind::Foreign, columns, name) {
            Command::Foreign(foreign) => foreign,
            _ => unreachable!("index_command returns the kind it was asked for"),
        }
    }

    /// Queue an index command of the given kind
    ///
    /// Without an explicit name the index is named after the table, columns
    /// and kind.
    pub fn index_command(
        &mut self,
        kind: IndexKind,
        columns: &[&str],
        name: Option<&str>,
    ) -> &mut Command {
        let columns = to_owned(columns);
        let index = match name {
            Some(name) => name.to_string(),
            None => self.create_index_name(kind, &columns),
        };

        let command = match kind {
            IndexKind::Primary => Command::Primary(IndexCommand::new(index, columns)),
            IndexKind::Unique => Command::Unique(IndexCommand::new(index, columns)),
            IndexKind::Index => Command::Index(IndexCommand::new(index, columns)),
            IndexKind::Foreign => Command::Foreign(ForeignKeyCommand::new(index, columns)),
        };

        self.add_command(command)
    }

    /// Default index name: `table_col1_col2_kind`, lower-cased
    pub fn create_index_name(&self, kind: IndexKind, columns: &[String]) -> String {
        let mut parts = Vec::with_capacity(columns.len() + 2);
        parts.push(self.table.as_str());
        parts.extend(columns.iter().map(String::as_str));
        parts.push(kind.as_str());

        parts.join("_").to_lowercase().replace(['-', '.'], "_")
    }

    // Compilation

    /// Queue the commands implied by the column declarations
    ///
    /// Safe to call more than once: every implied command is only added if
    /// it is not already queued.
    pub fn add_implied_commands(&mut self) {
        if !self.creating() {
            if !self.added_columns().is_empty() && !self.commands.contains(&Command::Add) {
                self.commands.insert(0, Command::Add);
            }

            if !self.changed_columns().is_empty() && !self.commands.contains(&Command::Change) {
                self.commands.insert(0, Command::Change);
            }
        }

        let flagged: Vec<(IndexKind, String)> = self
            .columns
            .iter()
            .flat_map(|c| {
                let unique = c.unique.then(|| (IndexKind::Unique, c.name.clone()));
                let index = c.index.then(|| (IndexKind::Index, c.name.clone()));
                unique.into_iter().chain(index)
            })
            .collect();

        for (kind, column) in flagged {
            let name = self.create_index_name(kind, std::slice::from_ref(&column));
            let queued = self
                .commands
                .iter()
                .any(|c| c.index_name() == Some(name.as_str()));
            if !queued {
                self.index_command(kind, &[column.as_str()], Some(name.as_str()));
            }
        }
    }

    /// Compile the blueprint into statements, in execution order
    pub fn to_sql(&mut self, grammar: &dyn Grammar) -> Result<Vec<String>> {
        self.add_implied_commands();
        compile_all(grammar, &*self)
    }

    /// Compile and execute the blueprint against a connection
    ///
    /// Statements run in order; the first failure stops the rest and is
    /// returned. Statements that already ran are not undone.
    pub async fn build(
        &mut self,
        connection: &dyn Connection,
        grammar: &dyn Grammar,
    ) -> Result<()> {
        for statement in self.to_sql(grammar)? {
            tracing::debug!("Executing: {}", statement);
            connection
                .execute(&statement)
                .await
                .map_err(|e| DatabaseError::execution_failed(&statement, &e))?;
        }
        Ok(())
    }
}

impl QueryProducer for Blueprint {
    fn table(&self) -> &str {
        &self.table
    }

    fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    fn commands(&self) -> &[Command] {
        &self.commands
    }
}

fn to_owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

fn index_of(command: &mut Command) -> &mut IndexCommand {
    match command {
        Command::Primary(index) | Command::Unique(index) | Command::Index(index) => index,
        _ => unreachable!("index_command returns the kind it was asked for"),
    }
}
