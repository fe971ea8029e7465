//! Connection implementations
//!
//! Every backend executes the MySQL grammar's output as-is. The recording
//! backend is always available; the driver-backed ones sit behind features.

pub mod recording;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use recording::RecordingConnection;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;

#[cfg(feature = "mysql")]
pub use mysql::MySqlConnection;
