//! Tarmac Core
//!
//! Core types, error taxonomy, plan lifecycle, and configuration snapshot
//! for the Tarmac platform.

use serde::{Deserialize, Serialize};

pub mod config;
pub mod service;
pub mod store;
pub mod validation;

pub use config::ConfigSnapshot;
pub use service::{DefaultPlan, PlanService};
pub use store::PlanStore;
pub use validation::PlanValidationError;

/// A named bundle of resource quotas assignable to a workload.
///
/// Plans are immutable once created: the only lifecycle operations are
/// create and delete. `name` is the primary key in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan identifier
    pub name: String,
    /// Memory quota in bytes; strictly positive
    pub memory: i64,
    /// Swap quota in bytes; zero means no swap
    pub swap: i64,
    /// Relative CPU weight; strictly positive
    #[serde(rename = "cpushare")]
    pub cpu_share: i64,
    /// Whether this plan is the platform default; at most one stored plan
    /// may carry it
    #[serde(rename = "default", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

/// A router catalog entry: one network-routing backend visible to callers.
///
/// Never persisted; computed on each read from the built-in registrations
/// and the process configuration. The capitalized field names are part of
/// the wire compatibility contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRouter {
    /// Router instance identifier
    #[serde(rename = "Name")]
    pub name: String,
    /// Backend implementation type
    #[serde(rename = "Type")]
    pub router_type: String,
    /// True for exactly the platform's default routing backend
    #[serde(rename = "Default", default)]
    pub is_default: bool,
}

/// Errors that can occur in plan and catalog operations
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] PlanValidationError),

    #[error("plan already exists")]
    AlreadyExists,

    #[error("plan not found")]
    NotFound,

    #[error("a default plan is already defined")]
    DuplicateDefault,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for plan and catalog operations
pub type Result<T> = std::result::Result<T, PlanError>;

/// Initialize the SQLite schema for the plan store
///
/// Creates the `plans` table if it does not exist. Uniqueness of the plan
/// name is the table's primary key; the partial unique index guarantees at
/// most one stored plan carries the default flag.
pub fn init_sqlite_schema(conn: &rusqlite::Connection) -> Result<()> {
    let ddl = r#"
    -- Plan registry, keyed by name
    CREATE TABLE IF NOT EXISTS plans (
      name TEXT PRIMARY KEY,
      memory INTEGER NOT NULL,
      swap INTEGER NOT NULL,
      cpu_share INTEGER NOT NULL,
      is_default INTEGER NOT NULL DEFAULT 0
    );

    -- At most one default plan
    CREATE UNIQUE INDEX IF NOT EXISTS idx_plans_single_default
      ON plans(is_default) WHERE is_default = 1;
    "#;

    conn.execute_batch(ddl)?;
    Ok(())
}
