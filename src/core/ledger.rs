//! The migration ledger: one row per applied migration

use super::attributes::Attributes;
use super::connection::Connection;
use super::error::Result;
use super::migration::MigrationStatus;
use super::query::Query;
use super::value::DatabaseValue;
use crate::grammars::Grammar;
use chrono::NaiveDateTime;

const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One ledger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub name: String,
    /// `None` when the stored value is missing or unparseable
    pub created: Option<NaiveDateTime>,
}

/// Reads and writes ledger rows in one table
#[derive(Debug, Clone)]
pub struct Ledger {
    table: String,
}

impl Ledger {
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into() }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The ledger row for `name`, if one exists
    pub async fn lookup(
        &self,
        connection: &dyn Connection,
        grammar: &dyn Grammar,
        name: &str,
    ) -> Result<Option<LedgerEntry>> {
        let rows = Query::new(&self.table)
            .find()
            .where_eq("name", name)
            .limit(1)
            .results(connection, grammar)
            .await?;

        Ok(rows.into_iter().next().map(|row| {
            let created = match row.get("created") {
                Some(DatabaseValue::String(text)) => {
                    NaiveDateTime::parse_from_str(text, CREATED_FORMAT).ok()
                }
                Some(DatabaseValue::Timestamp(secs)) | Some(DatabaseValue::Long(secs)) => {
                    chrono::DateTime::from_timestamp(*secs, 0).map(|t| t.naive_utc())
                }
                _ => None,
            };
            LedgerEntry {
                name: name.to_string(),
                created,
            }
        }))
    }

    /// Applied if a row exists; a failed lookup counts as pending
    pub async fn status(
        &self,
        connection: &dyn Connection,
        grammar: &dyn Grammar,
        name: &str,
    ) -> MigrationStatus {
        match self.lookup(connection, grammar, name).await {
            Ok(Some(_)) => MigrationStatus::Applied,
            Ok(None) => MigrationStatus::Pending,
            Err(e) => {
                tracing::warn!("Ledger lookup for {} failed, treating as pending: {}", name, e);
                MigrationStatus::Pending
            }
        }
    }

    /// Record `name` as applied; `created` is filled in by the database
    pub async fn record(
        &self,
        connection: &dyn Connection,
        grammar: &dyn Grammar,
        name: &str,
    ) -> Result<()> {
        Query::new(&self.table)
            .insert(Attributes::single("name", name))
            .run(connection, grammar)
            .await?;
        Ok(())
    }

    /// Remove the row for `name`
    pub async fn forget(
        &self,
        connection: &dyn Connection,
        grammar: &dyn Grammar,
        name: &str,
    ) -> Result<()> {
        Query::new(&self.table)
            .where_eq("name", name)
            .delete_where()
            .run(connection, grammar)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::recording::RecordingConnection;
    use crate::core::value::DatabaseRow;
    use crate::grammars::MySqlGrammar;

    fn row(created: DatabaseValue) -> DatabaseRow {
        let mut row = DatabaseRow::new();
        row.insert("name".to_string(), DatabaseValue::from("add-slug"));
        row.insert("created".to_string(), created);
        row
    }

    #[tokio::test]
    async fn test_lookup_parses_created() {
        let connection = RecordingConnection::new("wp_");
        let grammar = MySqlGrammar::for_connection(&connection);
        connection.push_rows(vec![row(DatabaseValue::from("2024-03-01 12:00:05"))]);

        let entry = Ledger::new("migrations")
            .lookup(&connection, &grammar, "add-slug")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(entry.name, "add-slug");
        assert_eq!(
            entry.created.map(|c| c.to_string()),
            Some("2024-03-01 12:00:05".to_string())
        );
        assert_eq!(
            connection.statements(),
            vec!["SELECT * FROM `wp_migrations` WHERE `name` = 'add-slug' LIMIT 1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_status() {
        let connection = RecordingConnection::new("");
        let grammar = MySqlGrammar::new("");
        let ledger = Ledger::new("migrations");

        let status = || ledger.status(&connection, &grammar, "add-slug");

        connection.push_rows(vec![row(DatabaseValue::Null)]);
        assert_eq!(status().await, MigrationStatus::Applied);
        assert_eq!(status().await, MigrationStatus::Pending);

        connection.fail_on("SELECT");
        assert_eq!(status().await, MigrationStatus::Pending);
    }

    #[tokio::test]
    async fn test_record_and_forget() {
        let connection = RecordingConnection::new("wp_");
        let grammar = MySqlGrammar::for_connection(&connection);
        let ledger = Ledger::new("migrations");

        ledger.record(&connection, &grammar, "add-slug").await.unwrap();
        ledger.forget(&connection, &grammar, "add-slug").await.unwrap();

        assert_eq!(
            connection.statements(),
            vec![
                "INSERT INTO `wp_migrations` (`name`) VALUES ('add-slug')",
                "DELETE FROM `wp_migrations` WHERE `name` = 'add-slug'",
            ]
        );
    }
}
