//! Tarmac Storage
//!
//! SQLite persistence for plan records. `PlanBackend` abstracts where the
//! database file lives; `SqlitePlanStore` implements the core
//! [`PlanStore`] contract on top of it.

use rusqlite::{Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tarmac_core::{init_sqlite_schema, Plan, PlanError, PlanStore, Result};

/// Backend abstraction for the plan database
///
/// Implementations handle different storage locations for the SQLite
/// file. Connections are opened per operation; SQLite's own locking
/// provides the concurrency guarantees the store contract requires.
pub trait PlanBackend: Send + Sync {
    /// Open a connection to the plan database
    fn get_connection(&self) -> Result<Connection>;

    /// Check if the database exists
    fn exists(&self) -> Result<bool>;

    /// Initialize a new database (create the file and schema)
    fn initialize(&self) -> Result<()>;
}

/// Local filesystem SQLite backend
///
/// Stores plans as a SQLite file on the local filesystem.
#[derive(Clone, Debug)]
pub struct LocalSqliteBackend {
    /// Path to the SQLite database file
    path: PathBuf,
}

impl LocalSqliteBackend {
    /// Create a new local SQLite backend
    ///
    /// # Example
    /// ```
    /// use tarmac_storage::LocalSqliteBackend;
    ///
    /// let backend = LocalSqliteBackend::new("tarmac.db");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanBackend for LocalSqliteBackend {
    fn get_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        init_sqlite_schema(&conn)?;
        Ok(conn)
    }

    fn exists(&self) -> Result<bool> {
        Ok(self.path.exists())
    }

    fn initialize(&self) -> Result<()> {
        if self.exists()? {
            return Err(PlanError::Config(format!(
                "plan database already exists at {:?}",
                self.path
            )));
        }

        let conn = Connection::open(&self.path)?;
        init_sqlite_schema(&conn)?;
        Ok(())
    }
}

/// SQLite-backed implementation of the [`PlanStore`] contract.
///
/// Insert conflicts are settled by SQLite constraints, not by
/// check-then-insert: a duplicate name trips the primary key, a second
/// default plan trips the partial unique index.
pub struct SqlitePlanStore<B: PlanBackend> {
    backend: B,
}

impl<B: PlanBackend> SqlitePlanStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

fn row_to_plan(row: &Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        name: row.get(0)?,
        memory: row.get(1)?,
        swap: row.get(2)?,
        cpu_share: row.get(3)?,
        is_default: row.get::<_, i64>(4)? != 0,
    })
}

/// Map a constraint violation from `insert` to the store's conflict errors.
fn map_insert_error(err: rusqlite::Error) -> PlanError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        match e.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => return PlanError::AlreadyExists,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => return PlanError::DuplicateDefault,
            _ => {}
        }
    }
    PlanError::Sqlite(err)
}

impl<B: PlanBackend> PlanStore for SqlitePlanStore<B> {
    fn insert(&self, plan: &Plan) -> Result<()> {
        let conn = self.backend.get_connection()?;
        conn.execute(
            "INSERT INTO plans (name, memory, swap, cpu_share, is_default)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &plan.name,
                plan.memory,
                plan.swap,
                plan.cpu_share,
                plan.is_default as i64,
            ),
        )
        .map_err(map_insert_error)?;
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Plan>> {
        let conn = self.backend.get_connection()?;
        let plan = conn
            .query_row(
                "SELECT name, memory, swap, cpu_share, is_default FROM plans WHERE name = ?1",
                [name],
                row_to_plan,
            )
            .optional()?;
        Ok(plan)
    }

    fn find_default(&self) -> Result<Option<Plan>> {
        let conn = self.backend.get_connection()?;
        let plan = conn
            .query_row(
                "SELECT name, memory, swap, cpu_share, is_default FROM plans WHERE is_default = 1",
                [],
                row_to_plan,
            )
            .optional()?;
        Ok(plan)
    }

    fn delete_by_name(&self, name: &str) -> Result<bool> {
        let conn = self.backend.get_connection()?;
        let removed = conn.execute("DELETE FROM plans WHERE name = ?1", [name])?;
        Ok(removed > 0)
    }

    fn list_all(&self) -> Result<Vec<Plan>> {
        let conn = self.backend.get_connection()?;
        let mut stmt =
            conn.prepare("SELECT name, memory, swap, cpu_share, is_default FROM plans")?;
        let plans = stmt
            .query_map([], row_to_plan)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(plans)
    }
}
