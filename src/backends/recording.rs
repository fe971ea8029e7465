//! In-memory connection that records statements instead of running them
//!
//! Useful for dry runs (print what a migration would execute) and for tests
//! that assert on the exact SQL sent to the database.

use crate::core::connection::Connection;
use crate::core::error::{DatabaseError, Result};
use crate::core::value::DatabaseResult;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Default)]
struct Recorded {
    statements: Vec<String>,
    rows: VecDeque<DatabaseResult>,
    failures: Vec<String>,
}

/// A [`Connection`] that keeps every statement it receives
///
/// `query` answers with scripted result sets in the order they were pushed,
/// or an empty result once the script runs out.
#[derive(Default)]
pub struct RecordingConnection {
    prefix: String,
    state: Mutex<Recorded>,
}

impl RecordingConnection {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            state: Mutex::new(Recorded::default()),
        }
    }

    /// Every statement received so far, in order
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().statements.clone()
    }

    /// Queue the result of a future `query` call
    pub fn push_rows(&self, rows: DatabaseResult) {
        self.state.lock().rows.push_back(rows);
    }

    /// Reject any statement containing `pattern`
    ///
    /// The rejected statement is still recorded.
    pub fn fail_on(&self, pattern: impl Into<String>) {
        self.state.lock().failures.push(pattern.into());
    }

    /// Forget recorded statements, scripted rows and failure patterns
    pub fn clear(&self) {
        *self.state.lock() = Recorded::default();
    }

    fn record(&self, sql: &str) -> Result<parking_lot::MutexGuard<'_, Recorded>> {
        let mut state = self.state.lock();
        state.statements.push(sql.to_string());

        if state.failures.iter().any(|pattern| sql.contains(pattern.as_str())) {
            return Err(DatabaseError::query(format!("statement rejected: {}", sql)));
        }

        Ok(state)
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        self.record(sql)?;
        Ok(0)
    }

    async fn query(&self, sql: &str) -> Result<DatabaseResult> {
        let mut state = self.record(sql)?;
        Ok(state.rows.pop_front().unwrap_or_default())
    }
}
