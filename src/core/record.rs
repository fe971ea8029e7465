//! Record facade
//!
//! Row-level reads and writes built on [`Query`].

use super::attributes::Attributes;
use super::connection::Connection;
use super::error::Result;
use super::query::Query;
use super::value::{DatabaseResult, DatabaseRow, DatabaseValue};
use crate::grammars::Grammar;

/// Row operations on one connection
#[derive(Clone, Copy)]
pub struct Record<'a> {
    connection: &'a dyn Connection,
    grammar: &'a dyn Grammar,
}

impl<'a> Record<'a> {
    pub fn new(connection: &'a dyn Connection, grammar: &'a dyn Grammar) -> Self {
        Self { connection, grammar }
    }

    /// Insert a row, returning the affected row count
    pub async fn insert(&self, table: &str, data: Attributes) -> Result<u64> {
        Query::new(table)
            .insert(data)
            .run(self.connection, self.grammar)
            .await
    }

    pub async fn update(
        &self,
        table: &str,
        id: impl Into<DatabaseValue>,
        data: Attributes,
    ) -> Result<u64> {
        Query::new(table)
            .update(id, data)
            .run(self.connection, self.grammar)
            .await
    }

    pub async fn delete(&self, table: &str, id: impl Into<DatabaseValue>) -> Result<u64> {
        Query::new(table)
            .delete(id)
            .run(self.connection, self.grammar)
            .await
    }

    /// Start a read on `table`
    pub fn find(&self, table: &str) -> Finder<'a> {
        Finder {
            record: *self,
            query: Query::new(table).find(),
        }
    }
}

/// A pending read; narrow it with `where_eq` then fetch
pub struct Finder<'a> {
    record: Record<'a>,
    query: Query,
}

impl<'a> Finder<'a> {
    pub fn where_eq(mut self, key: impl Into<String>, value: impl Into<DatabaseValue>) -> Self {
        self.query = self.query.where_eq(key, value);
        self
    }

    pub fn where_all(mut self, clause: Attributes) -> Self {
        self.query = self.query.where_all(clause);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.query = self.query.unbounded();
        self
    }

    /// The first matching row, if any
    pub async fn first(self) -> Result<Option<DatabaseRow>> {
        let rows = self.limit(1).results().await?;
        Ok(rows.into_iter().next())
    }

    pub async fn results(self) -> Result<DatabaseResult> {
        self.query
            .results(self.record.connection, self.record.grammar)
            .await
    }
}
