//! Schema facade
//!
//! Builds a [`Blueprint`] per call and runs it against the bound connection.

use super::blueprint::Blueprint;
use super::connection::Connection;
use super::error::Result;
use crate::grammars::Grammar;

/// Table-level operations on one connection
#[derive(Clone, Copy)]
pub struct Schema<'a> {
    connection: &'a dyn Connection,
    grammar: &'a dyn Grammar,
}

impl<'a> Schema<'a> {
    pub fn new(connection: &'a dyn Connection, grammar: &'a dyn Grammar) -> Self {
        Self { connection, grammar }
    }

    /// Create a table; the callback declares its columns and indexes
    pub async fn create<F>(&self, table: &str, define: F) -> Result<()>
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = Blueprint::new(table);
        blueprint.create();
        define(&mut blueprint);
        self.build(blueprint).await
    }

    /// Alter an existing table
    pub async fn table<F>(&self, table: &str, define: F) -> Result<()>
    where
        F: FnOnce(&mut Blueprint),
    {
        let mut blueprint = Blueprint::new(table);
        define(&mut blueprint);
        self.build(blueprint).await
    }

    pub async fn drop(&self, table: &str) -> Result<()> {
        let mut blueprint = Blueprint::new(table);
        blueprint.drop();
        self.build(blueprint).await
    }

    pub async fn drop_if_exists(&self, table: &str) -> Result<()> {
        let mut blueprint = Blueprint::new(table);
        blueprint.drop_if_exists();
        self.build(blueprint).await
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let mut blueprint = Blueprint::new(from);
        blueprint.rename(to);
        self.build(blueprint).await
    }

    async fn build(&self, mut blueprint: Blueprint) -> Result<()> {
        blueprint.build(self.connection, self.grammar).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::recording::RecordingConnection;
    use crate::grammars::MySqlGrammar;

    #[tokio::test]
    async fn test_facade_statements() {
        let connection = RecordingConnection::new("wp_");
        let grammar = MySqlGrammar::for_connection(&connection);
        let schema = Schema::new(&connection, &grammar);

        schema
            .create("tags", |table| {
                table.string("label", 40);
            })
            .await
            .unwrap();
        schema
            .table("tags", |table| {
                table.integer("uses", false, true).default(0);
            })
            .await
            .unwrap();
        schema.rename("tags", "labels").await.unwrap();
        schema.drop_if_exists("labels").await.unwrap();

        assert_eq!(
            connection.statements(),
            vec![
                "CREATE TABLE `wp_tags` ( `label` varchar(40) NOT NULL )",
                "ALTER TABLE `wp_tags` ADD `uses` int UNSIGNED NOT NULL DEFAULT '0'",
                "RENAME TABLE `wp_tags` TO `wp_labels`",
                "DROP TABLE IF EXISTS `wp_labels`",
            ]
        );
    }
}
