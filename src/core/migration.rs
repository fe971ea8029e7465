//! Migration units
//!
//! A migration is a named pair of forward/reverse actions. Its sanitized name
//! is what the ledger stores, so renaming a migration's identity makes it
//! pending again.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use table_migrations::prelude::*;
//!
//! struct CreatePosts;
//!
//! #[async_trait]
//! impl Migration for CreatePosts {
//!     fn identity(&self) -> &str {
//!         "CreatePosts"
//!     }
//!
//!     async fn up(&self, ctx: &MigrationContext<'_>) -> Result<()> {
//!         ctx.schema()
//!             .create("posts", |table| {
//!                 table.increments("id");
//!                 table.string("title", 200);
//!             })
//!             .await
//!     }
//!
//!     async fn down(&self, ctx: &MigrationContext<'_>) -> Result<()> {
//!         ctx.schema().drop("posts").await
//!     }
//! }
//!
//! assert_eq!(CreatePosts.name(), "createposts");
//! ```

use super::connection::Connection;
use super::error::Result;
use super::record::Record;
use super::schema::Schema;
use crate::grammars::Grammar;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Which way a run goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Whether a migration has a ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    Pending,
    Applied,
}

/// Lower-case `identity`, collapsing each run of other characters into `-`
pub fn sanitize_identity(identity: &str) -> String {
    let mut name = String::with_capacity(identity.len());
    let mut pending_dash = false;

    for ch in identity.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !name.is_empty() {
                name.push('-');
            }
            pending_dash = false;
            name.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    name
}

/// What a migration gets to work with during a run
pub struct MigrationContext<'a> {
    direction: Direction,
    timestamp: DateTime<Utc>,
    connection: &'a dyn Connection,
    grammar: &'a dyn Grammar,
}

impl<'a> MigrationContext<'a> {
    pub fn new(
        direction: Direction,
        timestamp: DateTime<Utc>,
        connection: &'a dyn Connection,
        grammar: &'a dyn Grammar,
    ) -> Self {
        Self {
            direction,
            timestamp,
            connection,
            grammar,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Shared by every migration of the same run
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn schema(&self) -> Schema<'a> {
        Schema::new(self.connection, self.grammar)
    }

    pub fn record(&self) -> Record<'a> {
        Record::new(self.connection, self.grammar)
    }

    pub fn connection(&self) -> &'a dyn Connection {
        self.connection
    }
}

/// A named forward/reverse schema change
#[async_trait]
pub trait Migration: Send + Sync {
    /// Stable identity, usually the type name
    fn identity(&self) -> &str;

    /// Ledger name; defaults to the sanitized identity
    fn name(&self) -> String {
        sanitize_identity(self.identity())
    }

    async fn up(&self, _ctx: &MigrationContext<'_>) -> Result<()> {
        Ok(())
    }

    async fn down(&self, _ctx: &MigrationContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Creates (and on rollback drops) the ledger table itself
#[derive(Debug, Clone)]
pub struct LedgerMigration {
    table: String,
}

impl LedgerMigration {
    pub const IDENTITY: &'static str = "create_migrations_table";

    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into() }
    }
}

#[async_trait]
impl Migration for LedgerMigration {
    fn identity(&self) -> &str {
        Self::IDENTITY
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<()> {
        ctx.schema()
            .create(&self.table, |table| {
                table.increments("id");
                table.string("name", 255);
                table.timestamp("created").use_current();
            })
            .await
    }

    async fn down(&self, ctx: &MigrationContext<'_>) -> Result<()> {
        ctx.schema().drop_if_exists(&self.table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::recording::RecordingConnection;
    use crate::grammars::MySqlGrammar;

    #[test]
    fn test_sanitize_identity() {
        assert_eq!(sanitize_identity("CreatePostsTable"), "createpoststable");
        assert_eq!(sanitize_identity("App\\Migrations\\AddSlug"), "app-migrations-addslug");
        assert_eq!(sanitize_identity("  add  slug__index!! "), "add-slug-index");
        assert_eq!(sanitize_identity("---"), "");
    }

    #[test]
    fn test_default_name() {
        assert_eq!(
            LedgerMigration::new("migrations").name(),
            "create-migrations-table"
        );
    }

    #[tokio::test]
    async fn test_ledger_migration_statements() {
        let connection = RecordingConnection::new("wp_");
        let grammar = MySqlGrammar::for_connection(&connection);
        let ctx = MigrationContext::new(Direction::Up, Utc::now(), &connection, &grammar);
        let ledger = LedgerMigration::new("migrations");

        ledger.up(&ctx).await.unwrap();
        ledger.down(&ctx).await.unwrap();

        assert_eq!(
            connection.statements(),
            vec![
                "CREATE TABLE `wp_migrations` ( `id` int UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, `name` varchar(255) NOT NULL, `created` timestamp default CURRENT_TIMESTAMP NOT NULL )",
                "DROP TABLE IF EXISTS `wp_migrations`",
            ]
        );
    }
}
