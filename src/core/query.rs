//! Record accumulator
//!
//! A [`Query`] collects record commands (insert, update, delete, find) and the
//! WHERE-clause maps they filter by. Builder methods take and return `self`
//! so a query reads as one chain:
//!
//! ```
//! use table_migrations::core::query::Query;
//! use table_migrations::grammars::MySqlGrammar;
//!
//! let sql = Query::new("posts")
//!     .find()
//!     .where_eq("status", "draft")
//!     .limit(3)
//!     .to_sql(&MySqlGrammar::new("wp_"))
//!     .unwrap();
//!
//! assert_eq!(sql, vec!["SELECT * FROM `wp_posts` WHERE `status` = 'draft' LIMIT 3"]);
//! ```

use super::attributes::Attributes;
use super::command::Command;
use super::connection::Connection;
use super::error::{DatabaseError, Result};
use super::value::{DatabaseResult, DatabaseValue};
use crate::grammars::{
    compile_all, compile_command, Compiled, Grammar, LogicalOperator, QueryProducer,
};

/// Record command accumulator for one table
#[derive(Debug, Clone, Default)]
pub struct Query {
    table: String,
    commands: Vec<Command>,
    clauses: Vec<Attributes>,
    where_operator: LogicalOperator,
    unbounded: bool,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Insert one row
    pub fn insert(self, data: Attributes) -> Self {
        self.command(Command::Insert { data })
    }

    /// Update the row whose `id` matches
    pub fn update(self, id: impl Into<DatabaseValue>, data: Attributes) -> Self {
        self.where_eq("id", id).command(Command::Update { data })
    }

    /// Update every row matching the WHERE clauses
    pub fn update_where(self, data: Attributes) -> Self {
        self.command(Command::Update { data })
    }

    /// Delete the row whose `id` matches
    pub fn delete(self, id: impl Into<DatabaseValue>) -> Self {
        self.where_eq("id", id).command(Command::Delete)
    }

    /// Delete every row matching the WHERE clauses
    pub fn delete_where(self) -> Self {
        self.command(Command::Delete)
    }

    /// Select rows matching the WHERE clauses
    pub fn find(self) -> Self {
        self.command(Command::Find)
    }

    pub fn where_eq(mut self, key: impl Into<String>, value: impl Into<DatabaseValue>) -> Self {
        self.clauses.push(Attributes::single(key, value));
        self
    }

    /// Add a whole clause map at once
    pub fn where_all(mut self, clause: Attributes) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Join predicates with OR instead of AND
    pub fn or_where(mut self) -> Self {
        self.where_operator = LogicalOperator::Or;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.clauses.push(Attributes::single("limit", limit));
        self
    }

    /// Read without the grammar's default limit
    pub fn unbounded(mut self) -> Self {
        self.unbounded = true;
        self
    }

    pub fn to_sql(&self, grammar: &dyn Grammar) -> Result<Vec<String>> {
        compile_all(grammar, self)
    }

    /// Execute every write command, returning the total affected rows
    pub async fn run(&self, connection: &dyn Connection, grammar: &dyn Grammar) -> Result<u64> {
        let mut affected = 0;
        for statement in self.to_sql(grammar)? {
            tracing::debug!("Executing: {}", statement);
            affected += connection
                .execute(&statement)
                .await
                .map_err(|e| DatabaseError::execution_failed(&statement, &e))?;
        }
        Ok(affected)
    }

    /// Execute the query, collecting the rows of every `find`
    ///
    /// Write commands are executed in place; their statements yield no rows.
    pub async fn results(
        &self,
        connection: &dyn Connection,
        grammar: &dyn Grammar,
    ) -> Result<DatabaseResult> {
        let mut rows = Vec::new();

        for command in &self.commands {
            let statements = match compile_command(grammar, self, command)? {
                Compiled::Statements(statements) => statements,
                Compiled::Unsupported => continue,
            };

            for statement in statements {
                tracing::debug!("Executing: {}", statement);
                let outcome = if matches!(command, Command::Find) {
                    connection.query(&statement).await.map(|found| rows.extend(found))
                } else {
                    connection.execute(&statement).await.map(|_| ())
                };
                outcome.map_err(|e| DatabaseError::execution_failed(&statement, &e))?;
            }
        }

        Ok(rows)
    }
}

impl QueryProducer for Query {
    fn table(&self) -> &str {
        &self.table
    }

    fn commands(&self) -> &[Command] {
        &self.commands
    }

    fn clauses(&self) -> &[Attributes] {
        &self.clauses
    }

    fn where_operator(&self) -> LogicalOperator {
        self.where_operator
    }

    fn unbounded(&self) -> bool {
        self.unbounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::recording::RecordingConnection;
    use crate::core::value::DatabaseRow;
    use crate::grammars::MySqlGrammar;

    #[test]
    fn test_update_adds_id_clause() {
        let query = Query::new("posts").update(3, Attributes::single("title", "x"));
        assert_eq!(query.clauses().len(), 1);
        assert_eq!(query.clauses()[0].get("id"), DatabaseValue::Int(3));
        assert_eq!(query.commands().len(), 1);
    }

    #[test]
    fn test_later_clause_wins() {
        let sql = Query::new("posts")
            .where_eq("status", "draft")
            .where_eq("status", "live")
            .delete_where()
            .to_sql(&MySqlGrammar::new(""))
            .unwrap();

        assert_eq!(sql, vec!["DELETE FROM `posts` WHERE `status` = 'live'"]);
    }

    #[tokio::test]
    async fn test_results_serves_rows() {
        let connection = RecordingConnection::new("wp_");
        let mut row = DatabaseRow::new();
        row.insert("name".to_string(), DatabaseValue::from("first"));
        connection.push_rows(vec![row]);

        let grammar = MySqlGrammar::for_connection(&connection);
        let rows = Query::new("migrations")
            .find()
            .where_eq("name", "first")
            .results(&connection, &grammar)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            connection.statements(),
            vec!["SELECT * FROM `wp_migrations` WHERE `name` = 'first' LIMIT 10".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_reports_failure() {
        let connection = RecordingConnection::new("");
        connection.fail_on("INSERT");

        let err = Query::new("posts")
            .insert(Attributes::single("title", "x"))
            .run(&connection, &MySqlGrammar::new(""))
            .await
            .unwrap_err();

        match err {
            DatabaseError::ExecutionFailed { statement, .. } => {
                assert!(statement.starts_with("INSERT INTO `posts`"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
