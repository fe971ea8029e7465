//! SQLite connection
//!
//! Runs compiled statements through rusqlite. Blocking driver calls are moved
//! to tokio's blocking pool and bounded by a timeout.

use crate::core::connection::Connection;
use crate::core::error::{DatabaseError, Result};
use crate::core::value::{DatabaseResult, DatabaseRow, DatabaseValue};
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Row;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default timeout for a single driver call (30 seconds)
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

type Handle = Arc<Mutex<Option<rusqlite::Connection>>>;

/// A single SQLite connection with a table prefix
pub struct SqliteConnection {
    connection: Handle,
    prefix: String,
    timeout: Duration,
}

impl SqliteConnection {
    /// Create a disconnected instance; call [`connect`](Self::connect) before use
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            connection: Arc::new(Mutex::new(None)),
            prefix: prefix.into(),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Open a database file (or `:memory:`)
    pub async fn open(path: &str, prefix: impl Into<String>) -> Result<Self> {
        let connection = Self::new(prefix);
        connection.connect(path).await?;
        Ok(connection)
    }

    pub async fn open_in_memory(prefix: impl Into<String>) -> Result<Self> {
        Self::open(":memory:", prefix).await
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn connect(&self, path: &str) -> Result<()> {
        self.connection.lock().await.take();

        let path = path.to_string();
        let handle = Arc::clone(&self.connection);

        self.run_blocking(
            move || {
                let conn = rusqlite::Connection::open(&path)?;
                conn.execute("PRAGMA foreign_keys = ON", [])?;
                *handle.blocking_lock() = Some(conn);
                Ok(())
            },
            DatabaseError::connection_timeout,
        )
        .await?;

        tracing::debug!("SQLite connection opened");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .try_lock()
            .map(|conn| conn.is_some())
            .unwrap_or(false)
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.connection.lock().await.take();
        Ok(())
    }

    /// Create the ledger table in SQLite syntax if it is missing
    ///
    /// The bootstrap ledger migration compiles to MySQL DDL, which SQLite
    /// rejects; pair this with `MigratorConfig::with_bootstrap_ledger(false)`.
    pub async fn ensure_ledger(&self, table: &str) -> Result<()> {
        let name = format!("{}{}", self.prefix, table).replace('"', "\"\"");
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                created TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            name
        );

        self.execute(&sql).await?;
        Ok(())
    }

    /// Run a blocking closure on the blocking pool, aborting it on timeout
    async fn run_blocking<T, F>(&self, work: F, on_timeout: fn(u64) -> DatabaseError) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let mut task = tokio::task::spawn_blocking(work);

        tokio::select! {
            result = &mut task => {
                result.map_err(|e| DatabaseError::other(format!("Task join error: {}", e)))?
            }
            _ = tokio::time::sleep(self.timeout) => {
                task.abort();
                Err(on_timeout(self.timeout.as_millis() as u64))
            }
        }
    }

    fn with_handle<T>(
        handle: &Handle,
        work: impl FnOnce(&rusqlite::Connection) -> Result<T>,
    ) -> Result<T> {
        let guard = handle.blocking_lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;
        work(conn)
    }

    fn read_row(row: &Row) -> rusqlite::Result<DatabaseRow> {
        let statement = row.as_ref();
        let mut values = DatabaseRow::new();

        for i in 0..statement.column_count() {
            let value = match row.get_ref(i)? {
                ValueRef::Null => DatabaseValue::Null,
                ValueRef::Integer(v) => DatabaseValue::Long(v),
                ValueRef::Real(v) => DatabaseValue::Double(v),
                ValueRef::Text(v) => {
                    DatabaseValue::String(String::from_utf8_lossy(v).into_owned())
                }
                ValueRef::Blob(v) => DatabaseValue::Bytes(v.to_vec()),
            };
            values.insert(statement.column_name(i)?.to_string(), value);
        }

        Ok(values)
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let sql = sql.to_string();
        let handle = Arc::clone(&self.connection);

        self.run_blocking(
            move || Self::with_handle(&handle, |conn| Ok(conn.execute(&sql, [])? as u64)),
            DatabaseError::query_timeout,
        )
        .await
    }

    async fn query(&self, sql: &str) -> Result<DatabaseResult> {
        let sql = sql.to_string();
        let handle = Arc::clone(&self.connection);

        self.run_blocking(
            move || {
                Self::with_handle(&handle, |conn| {
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map([], Self::read_row)?;
                    let results = rows.collect::<rusqlite::Result<DatabaseResult>>()?;
                    Ok(results)
                })
            },
            DatabaseError::query_timeout,
        )
        .await
    }
}
