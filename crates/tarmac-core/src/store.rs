//! Plan persistence contract
//!
//! Outbound port for plan storage. The service layer talks to this trait
//! only; `tarmac-storage` provides the SQLite implementation.

use crate::{Plan, Result};

/// Durable key-value-by-name persistence for plan records.
///
/// Implementations must make `insert` an atomic compare-and-insert: when
/// two writers race on the same name, at most one succeeds and the losers
/// observe [`crate::PlanError::AlreadyExists`]. Reads run with
/// read-committed semantics; a reader never observes a partially-written
/// record.
pub trait PlanStore: Send + Sync {
    /// Insert a plan, failing with `AlreadyExists` on a duplicate name and
    /// `DuplicateDefault` when a default plan is already stored.
    fn insert(&self, plan: &Plan) -> Result<()>;

    /// Point lookup by name.
    fn find_by_name(&self, name: &str) -> Result<Option<Plan>>;

    /// The stored plan carrying the default flag, if any.
    fn find_default(&self) -> Result<Option<Plan>>;

    /// Delete by name, reporting whether a record was removed.
    fn delete_by_name(&self, name: &str) -> Result<bool>;

    /// Every stored plan, in no particular order.
    fn list_all(&self) -> Result<Vec<Plan>>;
}
