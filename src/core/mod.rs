//! Core types: values, accumulators and the migration runner
//!
//! Leaves first: [`value`] and [`attributes`] carry data, [`column`] and
//! [`command`] describe what a [`blueprint::Blueprint`] or [`query::Query`]
//! accumulates, and [`migrator`] ties them to the ledger.

pub mod attributes;
pub mod blueprint;
pub mod column;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod migrator;
pub mod query;
pub mod record;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use attributes::Attributes;
pub use blueprint::Blueprint;
pub use column::{ColumnDefinition, ColumnType};
pub use command::{Command, ForeignKeyCommand, IndexCommand, IndexKind};
pub use config::MigratorConfig;
pub use connection::Connection;
pub use error::{DatabaseError, Result};
pub use ledger::{Ledger, LedgerEntry};
pub use migration::{
    sanitize_identity, Direction, LedgerMigration, Migration, MigrationContext, MigrationStatus,
};
pub use migrator::{MigrationAction, MigrationOutcome, MigrationReport, Migrator};
pub use query::Query;
pub use record::{Finder, Record};
pub use schema::Schema;
pub use value::{DatabaseResult, DatabaseRow, DatabaseValue};
