//! Migrator configuration
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//!
//! ```
//! use table_migrations::core::config::MigratorConfig;
//!
//! let config = MigratorConfig::from_json_str(r#"{ "ledger_table": "schema_log" }"#).unwrap();
//! assert_eq!(config.ledger_table, "schema_log");
//! assert!(config.bootstrap_ledger);
//! ```

use super::error::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a [`Migrator`](super::migrator::Migrator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    /// Unprefixed name of the ledger table
    pub ledger_table: String,
    /// Register the migration that creates the ledger table ahead of all others
    pub bootstrap_ledger: bool,
    /// Row limit for reads that set none
    pub default_limit: u64,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            ledger_table: "migrations".to_string(),
            bootstrap_ledger: true,
            default_limit: 10,
        }
    }
}

impl MigratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_ledger_table(mut self, table: impl Into<String>) -> Self {
        self.ledger_table = table.into();
        self
    }

    pub fn with_bootstrap_ledger(mut self, bootstrap: bool) -> Self {
        self.bootstrap_ledger = bootstrap;
        self
    }

    /// Row limit for reads that set none; `0` is raised to `1`
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.ledger_table.trim().is_empty() {
            return Err(DatabaseError::config("ledger_table must not be empty"));
        }
        if self.default_limit == 0 {
            return Err(DatabaseError::config("default_limit must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MigratorConfig::default();
        assert_eq!(config.ledger_table, "migrations");
        assert!(config.bootstrap_ledger);
        assert_eq!(config.default_limit, 10);
    }

    #[test]
    fn test_partial_json() {
        let config =
            MigratorConfig::from_json_str(r#"{ "bootstrap_ledger": false, "default_limit": 50 }"#)
                .unwrap();
        assert_eq!(config.ledger_table, "migrations");
        assert!(!config.bootstrap_ledger);
        assert_eq!(config.default_limit, 50);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            MigratorConfig::from_json_str(r#"{ "ledger_table": " " }"#),
            Err(DatabaseError::Config(_))
        ));
        assert!(matches!(
            MigratorConfig::from_json_str(r#"{ "default_limit": 0 }"#),
            Err(DatabaseError::Config(_))
        ));
        assert!(matches!(
            MigratorConfig::from_json_str("not json"),
            Err(DatabaseError::JsonError(_))
        ));
    }

    #[test]
    fn test_zero_limit_setter() {
        let config = MigratorConfig::default().with_default_limit(0);
        assert_eq!(config.default_limit, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let path =
            std::env::temp_dir().join(format!("migrator-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "ledger_table": "history" }}"#).unwrap();

        let config = MigratorConfig::from_json_file(&path).unwrap();
        assert_eq!(config.ledger_table, "history");

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            MigratorConfig::from_json_file(&path),
            Err(DatabaseError::IoError(_))
        ));
    }
}
