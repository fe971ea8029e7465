//! Runs registered migrations once each, tracking them in the ledger
//!
//! Going up, every pending migration runs in registration order and gets a
//! ledger row. Going down, every applied migration runs its reverse action in
//! reverse registration order and its row is removed. Anything already in
//! the requested state is skipped.

use super::config::MigratorConfig;
use super::connection::Connection;
use super::error::{DatabaseError, Result};
use super::ledger::Ledger;
use super::migration::{Direction, LedgerMigration, Migration, MigrationContext, MigrationStatus};
use crate::grammars::MySqlGrammar;
use chrono::{DateTime, Utc};

/// What happened to one migration during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationAction {
    Applied,
    RolledBack,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub name: String,
    pub action: MigrationAction,
}

/// Result of one [`Migrator::run`]
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub direction: Direction,
    pub timestamp: DateTime<Utc>,
    pub outcomes: Vec<MigrationOutcome>,
}

impl MigrationReport {
    fn names(&self, action: MigrationAction) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.action == action)
            .map(|o| o.name.as_str())
            .collect()
    }

    pub fn applied(&self) -> Vec<&str> {
        self.names(MigrationAction::Applied)
    }

    pub fn rolled_back(&self) -> Vec<&str> {
        self.names(MigrationAction::RolledBack)
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.names(MigrationAction::Skipped)
    }
}

/// Migration runner bound to one connection
pub struct Migrator<C: Connection> {
    connection: C,
    grammar: MySqlGrammar,
    ledger: Ledger,
    config: MigratorConfig,
    migrations: Vec<Box<dyn Migration>>,
}

impl<C: Connection> Migrator<C> {
    pub fn new(connection: C) -> Self {
        Self::with_config(connection, MigratorConfig::default())
    }

    /// Build a migrator; registers the ledger bootstrap first when configured
    pub fn with_config(connection: C, config: MigratorConfig) -> Self {
        let grammar =
            MySqlGrammar::for_connection(&connection).with_default_limit(config.default_limit);
        let ledger = Ledger::new(&config.ledger_table);

        let mut migrations: Vec<Box<dyn Migration>> = Vec::new();
        if config.bootstrap_ledger {
            migrations.push(Box::new(LedgerMigration::new(&config.ledger_table)));
        }

        Self {
            connection,
            grammar,
            ledger,
            config,
            migrations,
        }
    }

    pub fn add_migration(&mut self, migration: impl Migration + 'static) -> &mut Self {
        self.migrations.push(Box::new(migration));
        self
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    pub fn grammar(&self) -> &MySqlGrammar {
        &self.grammar
    }

    /// Names of registered migrations, in registration order
    pub fn migration_names(&self) -> Vec<String> {
        self.migrations.iter().map(|m| m.name()).collect()
    }

    pub async fn up(&self) -> Result<MigrationReport> {
        self.run(Direction::Up).await
    }

    pub async fn down(&self) -> Result<MigrationReport> {
        self.run(Direction::Down).await
    }

    /// Run every migration not yet in the requested state
    ///
    /// A failing migration stops the run; the ones before it stay applied.
    pub async fn run(&self, direction: Direction) -> Result<MigrationReport> {
        let ctx = MigrationContext::new(direction, Utc::now(), &self.connection, &self.grammar);
        let mut outcomes = Vec::with_capacity(self.migrations.len());

        let mut ordered: Vec<&dyn Migration> =
            self.migrations.iter().map(|m| m.as_ref()).collect();
        if direction == Direction::Down {
            ordered.reverse();
        }

        for migration in ordered {
            let name = migration.name();
            let status = self.ledger.status(&self.connection, &self.grammar, &name).await;

            let action = match (direction, status) {
                (Direction::Up, MigrationStatus::Pending) => {
                    self.apply(migration, &name, &ctx).await?;
                    MigrationAction::Applied
                }
                (Direction::Down, MigrationStatus::Applied) => {
                    self.roll_back(migration, &name, &ctx).await?;
                    MigrationAction::RolledBack
                }
                _ => {
                    tracing::debug!("Migration {} already {}, skipping", name, direction);
                    MigrationAction::Skipped
                }
            };

            outcomes.push(MigrationOutcome { name, action });
        }

        Ok(MigrationReport {
            direction,
            timestamp: ctx.timestamp(),
            outcomes,
        })
    }

    async fn apply(
        &self,
        migration: &dyn Migration,
        name: &str,
        ctx: &MigrationContext<'_>,
    ) -> Result<()> {
        migration
            .up(ctx)
            .await
            .map_err(|e| DatabaseError::migration(name, e.to_string()))?;

        self.ledger
            .record(&self.connection, &self.grammar, name)
            .await
            .map_err(|e| {
                DatabaseError::migration(name, format!("could not record in ledger: {}", e))
            })?;

        tracing::info!("Migration {} ran successfully.", name);
        Ok(())
    }

    async fn roll_back(
        &self,
        migration: &dyn Migration,
        name: &str,
        ctx: &MigrationContext<'_>,
    ) -> Result<()> {
        migration
            .down(ctx)
            .await
            .map_err(|e| DatabaseError::migration(name, e.to_string()))?;

        match self.ledger.forget(&self.connection, &self.grammar, name).await {
            Ok(()) => {}
            // the bootstrap migration has just dropped the ledger table
            Err(e) if migration.identity() == LedgerMigration::IDENTITY => {
                tracing::warn!("Could not remove ledger row for {}: {}", name, e);
            }
            Err(e) => {
                return Err(DatabaseError::migration(
                    name,
                    format!("could not remove from ledger: {}", e),
                ));
            }
        }

        tracing::info!("Migration {} rolled back.", name);
        Ok(())
    }

    /// Ledger status of every registered migration, in registration order
    pub async fn status(&self) -> Vec<(String, MigrationStatus)> {
        let mut statuses = Vec::with_capacity(self.migrations.len());
        for migration in &self.migrations {
            let name = migration.name();
            let status = self.ledger.status(&self.connection, &self.grammar, &name).await;
            statuses.push((name, status));
        }
        statuses
    }

    pub async fn pending_migrations(&self) -> Vec<String> {
        self.status()
            .await
            .into_iter()
            .filter(|(_, status)| *status == MigrationStatus::Pending)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::recording::RecordingConnection;
    use crate::core::value::{DatabaseRow, DatabaseValue};
    use async_trait::async_trait;

    struct AddSlug;

    #[async_trait]
    impl Migration for AddSlug {
        fn identity(&self) -> &str {
            "AddSlug"
        }

        async fn up(&self, ctx: &MigrationContext<'_>) -> Result<()> {
            ctx.schema()
                .table("posts", |table| {
                    table.string("slug", 120);
                })
                .await
        }

        async fn down(&self, ctx: &MigrationContext<'_>) -> Result<()> {
            ctx.schema()
                .table("posts", |table| {
                    table.drop_column(&["slug"]);
                })
                .await
        }
    }

    struct Broken;

    #[async_trait]
    impl Migration for Broken {
        fn identity(&self) -> &str {
            "Broken"
        }

        async fn up(&self, _ctx: &MigrationContext<'_>) -> Result<()> {
            Err(DatabaseError::other("boom"))
        }
    }

    fn ledger_row(name: &str) -> Vec<DatabaseRow> {
        let mut row = DatabaseRow::new();
        row.insert("name".to_string(), DatabaseValue::from(name));
        vec![row]
    }

    fn migrator() -> Migrator<RecordingConnection> {
        let config = MigratorConfig::default().with_bootstrap_ledger(false);
        let mut migrator = Migrator::with_config(RecordingConnection::new("wp_"), config);
        migrator.add_migration(AddSlug);
        migrator
    }

    #[tokio::test]
    async fn test_up_applies_pending() {
        let migrator = migrator();
        let report = migrator.up().await.unwrap();

        assert_eq!(report.applied(), vec!["addslug"]);
        assert_eq!(
            migrator.connection().statements(),
            vec![
                "SELECT * FROM `wp_migrations` WHERE `name` = 'addslug' LIMIT 1",
                "ALTER TABLE `wp_posts` ADD `slug` varchar(120) NOT NULL",
                "INSERT INTO `wp_migrations` (`name`) VALUES ('addslug')",
            ]
        );
    }

    #[tokio::test]
    async fn test_up_skips_applied() {
        let migrator = migrator();
        migrator.connection().push_rows(ledger_row("addslug"));

        let report = migrator.up().await.unwrap();
        assert_eq!(report.skipped(), vec!["addslug"]);
        assert_eq!(migrator.connection().statements().len(), 1);
    }

    #[tokio::test]
    async fn test_down_rolls_back_and_forgets() {
        let migrator = migrator();
        migrator.connection().push_rows(ledger_row("addslug"));

        let report = migrator.down().await.unwrap();
        assert_eq!(report.rolled_back(), vec!["addslug"]);

        let statements = migrator.connection().statements();
        assert_eq!(statements[1], "ALTER TABLE `wp_posts` DROP `slug`");
        assert_eq!(statements[2], "DELETE FROM `wp_migrations` WHERE `name` = 'addslug'");
    }

    #[tokio::test]
    async fn test_down_skips_pending() {
        let migrator = migrator();
        let report = migrator.down().await.unwrap();

        assert_eq!(report.skipped(), vec!["addslug"]);
        assert_eq!(migrator.connection().statements().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_halts_run() {
        let mut migrator = migrator();
        migrator.add_migration(Broken);
        migrator.add_migration(AddSlug);

        let err = migrator.up().await.unwrap_err();
        match err {
            DatabaseError::Migration { name, message } => {
                assert_eq!(name, "broken");
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }

        // first AddSlug applied, Broken never recorded
        let inserts: Vec<_> = migrator
            .connection()
            .statements()
            .into_iter()
            .filter(|s| s.starts_with("INSERT"))
            .collect();
        assert_eq!(inserts, vec!["INSERT INTO `wp_migrations` (`name`) VALUES ('addslug')"]);
    }

    #[tokio::test]
    async fn test_bootstrap_registered_first() {
        let migrator = Migrator::new(RecordingConnection::new(""));
        assert_eq!(migrator.migration_names(), vec!["create-migrations-table"]);

        let report = migrator.up().await.unwrap();
        assert_eq!(report.applied(), vec!["create-migrations-table"]);
        assert!(migrator.connection().statements()[1].starts_with("CREATE TABLE `migrations`"));
    }

    #[tokio::test]
    async fn test_down_fails_when_ledger_row_stays() {
        let migrator = migrator();
        migrator.connection().push_rows(ledger_row("addslug"));
        migrator.connection().fail_on("DELETE FROM");

        let err = migrator.down().await.unwrap_err();
        match err {
            DatabaseError::Migration { name, message } => {
                assert_eq!(name, "addslug");
                assert!(message.starts_with("could not remove from ledger"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_rollback_tolerates_dropped_ledger() {
        let migrator = Migrator::new(RecordingConnection::new(""));
        migrator
            .connection()
            .push_rows(ledger_row("create-migrations-table"));
        migrator.connection().fail_on("DELETE FROM");

        let report = migrator.down().await.unwrap();
        assert_eq!(report.rolled_back(), vec!["create-migrations-table"]);
        assert_eq!(
            migrator.connection().statements()[1],
            "DROP TABLE IF EXISTS `migrations`"
        );
    }

    #[tokio::test]
    async fn test_pending_migrations() {
        let migrator = migrator();
        migrator.connection().fail_on("SELECT");

        assert_eq!(migrator.pending_migrations().await, vec!["addslug".to_string()]);
    }
}
