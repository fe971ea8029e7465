//! The connection interface the compiler and runner depend on
//!
//! Any relational backend reachable through a plain execute/query pair
//! qualifies. The trait is object safe so accumulators and facades can take
//! `&dyn Connection`.

use super::error::Result;
use super::value::DatabaseResult;
use async_trait::async_trait;

/// A live database connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Namespace prefix prepended to every table name before quoting
    fn prefix(&self) -> &str;

    /// Execute a statement that returns no rows (DDL, INSERT, UPDATE, DELETE)
    ///
    /// Returns the number of affected rows where the backend reports one.
    ///
    /// # Security Warning
    ///
    /// Statements compiled by this crate interpolate values as quoted
    /// literals. Do not feed untrusted input through record commands.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Execute a SELECT statement and return its rows
    async fn query(&self, sql: &str) -> Result<DatabaseResult>;
}

#[async_trait]
impl<C: Connection + ?Sized> Connection for std::sync::Arc<C> {
    fn prefix(&self) -> &str {
        (**self).prefix()
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        (**self).execute(sql).await
    }

    async fn query(&self, sql: &str) -> Result<DatabaseResult> {
        (**self).query(sql).await
    }
}

#[async_trait]
impl<C: Connection + ?Sized> Connection for Box<C> {
    fn prefix(&self) -> &str {
        (**self).prefix()
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        (**self).execute(sql).await
    }

    async fn query(&self, sql: &str) -> Result<DatabaseResult> {
        (**self).query(sql).await
    }
}
