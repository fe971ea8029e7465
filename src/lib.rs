//! # Table Migrations
//!
//! Declarative schema blueprints and record queries, compiled to MySQL by a
//! pluggable grammar and applied at most once per migration through a ledger
//! table.
//!
//! ## Features
//!
//! - **Blueprints**: declare columns, indexes and structural changes for a
//!   table; implied `add`/`change` commands are synthesized for you
//! - **Queries**: insert, update, delete and find rows with WHERE maps
//! - **Grammar**: one compilation rule per command; rules a grammar lacks are
//!   skipped
//! - **Migrator**: run-once forward and reverse migrations tracked in a ledger
//! - **Backends**: MySQL (`mysql` feature), SQLite (default feature) and an
//!   in-memory recorder for dry runs
//!
//! Statements are always MySQL. SQLite runs most of them unchanged but not
//! the `AUTO_INCREMENT` ledger bootstrap: disable it with
//! [`core::MigratorConfig::with_bootstrap_ledger`] and create the ledger with
//! `SqliteConnection::ensure_ledger` instead.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use table_migrations::prelude::*;
//!
//! struct CreateAuthors;
//!
//! #[async_trait]
//! impl Migration for CreateAuthors {
//!     fn identity(&self) -> &str {
//!         "CreateAuthors"
//!     }
//!
//!     async fn up(&self, ctx: &MigrationContext<'_>) -> Result<()> {
//!         ctx.schema()
//!             .create("authors", |table| {
//!                 table.increments("id");
//!                 table.string("email", 190).unique();
//!                 table.timestamps();
//!             })
//!             .await
//!     }
//!
//!     async fn down(&self, ctx: &MigrationContext<'_>) -> Result<()> {
//!         ctx.schema().drop("authors").await
//!     }
//! }
//!
//! async fn migrate<C: Connection>(connection: C) -> Result<()> {
//!     let mut migrator = Migrator::new(connection);
//!     migrator.add_migration(CreateAuthors);
//!
//!     let report = migrator.up().await?;
//!     println!("applied: {:?}", report.applied());
//!     Ok(())
//! }
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! src/
//! ├── core/        # values, accumulators, ledger and migrator
//! ├── grammars/    # Grammar trait and the MySQL grammar
//! ├── backends/    # Connection implementations
//! ├── cli.rs       # `migrate` command
//! └── lib.rs
//! ```

/// Values, accumulators and the migration runner
pub mod core;

/// SQL grammars
pub mod grammars;

/// Connection implementations
pub mod backends;

/// `migrate` command-line surface
pub mod cli;

/// Prelude for convenient imports
///
/// ```rust
/// use table_migrations::prelude::*;
///
/// let mut table = Blueprint::new("tags");
/// table.string("label", 40);
/// let sql = table.to_sql(&MySqlGrammar::new("")).unwrap();
/// assert_eq!(sql, vec!["ALTER TABLE `tags` ADD `label` varchar(40) NOT NULL"]);
/// ```
pub mod prelude {
    pub use crate::core::{
        Attributes, Blueprint, ColumnType, Connection, DatabaseError, DatabaseResult, DatabaseRow,
        DatabaseValue, Direction, Migration, MigrationContext, MigrationReport, MigrationStatus,
        Migrator, MigratorConfig, Query, Record, Result, Schema,
    };
    pub use crate::grammars::{Grammar, MySqlGrammar};

    pub use crate::backends::RecordingConnection;

    #[cfg(feature = "sqlite")]
    pub use crate::backends::SqliteConnection;

    #[cfg(feature = "mysql")]
    pub use crate::backends::MySqlConnection;
}

// Re-export at root level for convenience
pub use core::{
    Attributes, Blueprint, Connection, DatabaseError, DatabaseResult, DatabaseRow, DatabaseValue,
    Migration, Migrator, Query, Result,
};
pub use grammars::MySqlGrammar;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let grammar = MySqlGrammar::new("wp_");
        assert_eq!(grammar.wrap_table("posts"), "`wp_posts`");
        assert_eq!(Direction::Down.to_string(), "down");
    }

    #[test]
    fn test_value_conversions() {
        use prelude::*;

        let val: DatabaseValue = 42.into();
        assert_eq!(val.as_long(), Some(42));

        let val: DatabaseValue = "test".into();
        assert_eq!(val.as_str(), Some("test"));

        let val: DatabaseValue = true.into();
        assert_eq!(val.to_sql_text(), "1");
    }
}
