//! `migrate` command-line surface
//!
//! Applications embed this in their own binary: parse [`MigrateCli`], build a
//! [`Migrator`] with their migrations registered, then hand both to
//! [`execute`].
//!
//! ```no_run
//! use clap::Parser;
//! use table_migrations::backends::SqliteConnection;
//! use table_migrations::cli::{self, MigrateCli};
//! use table_migrations::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let args = MigrateCli::parse();
//! cli::init_logging(args.verbose)?;
//!
//! // SQLite cannot run the MySQL bootstrap DDL, so create the ledger here
//! let config = args.load_config()?.with_bootstrap_ledger(false);
//! let connection = SqliteConnection::open("app.db", "app_").await?;
//! connection.ensure_ledger(&config.ledger_table).await?;
//!
//! let migrator = Migrator::with_config(connection, config);
//! cli::execute(&args, &migrator).await?;
//! # Ok(())
//! # }
//! ```

use crate::core::config::MigratorConfig;
use crate::core::connection::Connection;
use crate::core::error::{DatabaseError, Result};
use crate::core::migration::Direction;
use crate::core::migrator::{MigrationReport, Migrator};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "table-migrations")]
#[command(about = "Run or roll back table migrations")]
pub struct MigrateCli {
    /// Log every statement that is executed
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file with migrator settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: MigrateCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Migrate {
        /// Roll back applied migrations instead
        #[arg(long)]
        rollback: bool,
    },
}

impl MigrateCli {
    pub fn direction(&self) -> Direction {
        match self.command {
            MigrateCommand::Migrate { rollback: true } => Direction::Down,
            MigrateCommand::Migrate { rollback: false } => Direction::Up,
        }
    }

    /// Settings from `--config`, or the defaults
    pub fn load_config(&self) -> Result<MigratorConfig> {
        match &self.config {
            Some(path) => MigratorConfig::from_json_file(path),
            None => Ok(MigratorConfig::default()),
        }
    }
}

/// Install a `tracing` subscriber; `RUST_LOG` overrides the level
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "table_migrations=debug" } else { "table_migrations=info" };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| DatabaseError::config(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| DatabaseError::config(e.to_string()))
}

/// Run the migrator in the direction the arguments ask for
pub async fn execute<C: Connection>(
    cli: &MigrateCli,
    migrator: &Migrator<C>,
) -> Result<MigrationReport> {
    let direction = cli.direction();
    let report = migrator.run(direction).await?;

    match direction {
        Direction::Up => println!("All migrations ran"),
        Direction::Down => println!("All migrations rolled back"),
    }

    Ok(report)
}
