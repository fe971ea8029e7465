//! Commands queued on an accumulator
//!
//! Each command kind is its own variant so the grammar can match on them
//! exhaustively; fields that a kind cannot work without are required at
//! construction.

use super::attributes::Attributes;

/// Kinds of index a blueprint can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
    Foreign,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Primary => "primary",
            IndexKind::Unique => "unique",
            IndexKind::Index => "index",
            IndexKind::Foreign => "foreign",
        }
    }
}

/// A primary, unique or plain index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCommand {
    pub index: String,
    pub columns: Vec<String>,
    pub algorithm: Option<String>,
}

impl IndexCommand {
    pub fn new(index: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index: index.into(),
            columns,
            algorithm: None,
        }
    }

    /// Index algorithm (`BTREE`, `HASH`)
    pub fn algorithm(&mut self, algorithm: impl Into<String>) -> &mut Self {
        self.algorithm = Some(algorithm.into());
        self
    }
}

/// A foreign key constraint
///
/// The referenced table and columns are set by chaining `on` and
/// `references`; compiling a key without them is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyCommand {
    pub index: String,
    pub columns: Vec<String>,
    pub references: Vec<String>,
    pub on: Option<String>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl ForeignKeyCommand {
    pub fn new(index: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index: index.into(),
            columns,
            references: Vec::new(),
            on: None,
            on_delete: None,
            on_update: None,
        }
    }

    pub fn references(&mut self, columns: &[&str]) -> &mut Self {
        self.references = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Referenced table (unprefixed)
    pub fn on(&mut self, table: impl Into<String>) -> &mut Self {
        self.on = Some(table.into());
        self
    }

    pub fn on_delete(&mut self, action: impl Into<String>) -> &mut Self {
        self.on_delete = Some(action.into());
        self
    }

    pub fn on_update(&mut self, action: impl Into<String>) -> &mut Self {
        self.on_update = Some(action.into());
        self
    }
}

/// A named, parameterized operation on one table
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create,
    /// Implied: add the blueprint's non-`change` columns
    Add,
    /// Implied: modify the blueprint's `change` columns
    Change,
    Drop,
    DropIfExists,
    Rename { to: String },
    DropColumn { columns: Vec<String> },
    RenameColumn { from: String, to: String },
    Primary(IndexCommand),
    Unique(IndexCommand),
    Index(IndexCommand),
    Foreign(ForeignKeyCommand),
    Insert { data: Attributes },
    Update { data: Attributes },
    Delete,
    Find,
}

impl Command {
    /// The command's name as used in logs (`dropIfExists`, `renameColumn`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create => "create",
            Command::Add => "add",
            Command::Change => "change",
            Command::Drop => "drop",
            Command::DropIfExists => "dropIfExists",
            Command::Rename { .. } => "rename",
            Command::DropColumn { .. } => "dropColumn",
            Command::RenameColumn { .. } => "renameColumn",
            Command::Primary(_) => "primary",
            Command::Unique(_) => "unique",
            Command::Index(_) => "index",
            Command::Foreign(_) => "foreign",
            Command::Insert { .. } => "insert",
            Command::Update { .. } => "update",
            Command::Delete => "delete",
            Command::Find => "find",
        }
    }

    /// Name of the index this command creates, if it is an index command
    pub fn index_name(&self) -> Option<&str> {
        match self {
            Command::Primary(index) | Command::Unique(index) | Command::Index(index) => {
                Some(&index.index)
            }
            Command::Foreign(foreign) => Some(&foreign.index),
            _ => None,
        }
    }
}
