//! Error types for schema compilation, statement execution and migrations
//!
//! Every fallible operation in the crate returns [`Result`]. A command the
//! grammar has no rule for is skipped, not failed, and has no variant here.

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Error types for compilation, execution and migration runs
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Connection error (not connected, pool failure, bad URL)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Connection timeout
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout { timeout_ms: u64 },

    /// Query execution error
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Query timeout
    #[error("Query timeout after {timeout_ms}ms")]
    QueryTimeout { timeout_ms: u64 },

    /// A compiled statement was rejected by the connection
    #[error("Statement failed: {message} (statement: {statement})")]
    ExecutionFailed { statement: String, message: String },

    /// A command or column set that cannot be compiled into valid SQL
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// A migration's forward or reverse action failed
    #[error("Migration {name} failed: {message}")]
    Migration { name: String, message: String },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (configuration) error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// MySQL error
    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    MysqlError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DatabaseError {
    /// Create a new connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        DatabaseError::ConnectionError(msg.into())
    }

    /// Create a connection timeout error
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        DatabaseError::ConnectionTimeout { timeout_ms }
    }

    /// Create a new query error
    pub fn query<S: Into<String>>(msg: S) -> Self {
        DatabaseError::QueryError(msg.into())
    }

    /// Create a query timeout error
    pub fn query_timeout(timeout_ms: u64) -> Self {
        DatabaseError::QueryTimeout { timeout_ms }
    }

    /// Wrap a connection failure with the statement that caused it
    pub fn execution_failed(statement: impl Into<String>, source: &DatabaseError) -> Self {
        DatabaseError::ExecutionFailed {
            statement: statement.into(),
            message: source.to_string(),
        }
    }

    /// Create an invalid command error
    pub fn invalid_command<S: Into<String>>(msg: S) -> Self {
        DatabaseError::InvalidCommand(msg.into())
    }

    /// Create a migration error for the named migration
    pub fn migration(name: impl Into<String>, message: impl Into<String>) -> Self {
        DatabaseError::Migration {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Other(msg.into())
    }
}
