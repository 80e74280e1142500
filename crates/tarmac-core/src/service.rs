//! Plan lifecycle service
//!
//! Validation, uniqueness enforcement, and default-plan resolution on top
//! of a [`PlanStore`]. The service itself is stateless; all durable state
//! lives in the store, and the configuration snapshot is read-only.

use std::sync::Arc;

use crate::config::ConfigSnapshot;
use crate::store::PlanStore;
use crate::validation::validate_plan;
use crate::{Plan, PlanError, Result};

/// Name given to a default plan derived from configuration.
pub const AUTOGENERATED_PLAN_NAME: &str = "autogenerated";

/// CPU share assigned to a derived default plan.
pub const DEFAULT_CPU_SHARE: i64 = 100;

/// Outcome of default-plan resolution.
///
/// `Explicit` is a plan an operator stored with the default flag;
/// `Derived` is computed from configuration and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultPlan {
    Explicit(Plan),
    Derived(Plan),
}

impl DefaultPlan {
    /// Unwrap into the plain plan callers work with.
    pub fn into_plan(self) -> Plan {
        match self {
            DefaultPlan::Explicit(plan) | DefaultPlan::Derived(plan) => plan,
        }
    }
}

/// Public plan lifecycle API: create, list, remove, lookup, and
/// default-plan resolution.
pub struct PlanService<S> {
    store: S,
    config: Arc<ConfigSnapshot>,
}

impl<S: PlanStore> PlanService<S> {
    pub fn new(store: S, config: Arc<ConfigSnapshot>) -> Self {
        Self { store, config }
    }

    /// Validate and insert a plan.
    ///
    /// Validation failures name every offending field. A duplicate name
    /// fails with `AlreadyExists`; there is no silent overwrite.
    pub fn save(&self, plan: &Plan) -> Result<()> {
        validate_plan(plan)?;
        self.store.insert(plan)?;
        tracing::debug!(plan = %plan.name, "plan saved");
        Ok(())
    }

    /// Every stored plan. Ordering, if required, is the caller's concern.
    pub fn list(&self) -> Result<Vec<Plan>> {
        self.store.list_all()
    }

    /// Delete a plan by name.
    ///
    /// Removal does not cascade to workloads already using the plan.
    pub fn remove(&self, name: &str) -> Result<()> {
        if self.store.delete_by_name(name)? {
            tracing::debug!(plan = %name, "plan removed");
            Ok(())
        } else {
            Err(PlanError::NotFound)
        }
    }

    /// Point lookup by name.
    pub fn find_by_name(&self, name: &str) -> Result<Plan> {
        self.store.find_by_name(name)?.ok_or(PlanError::NotFound)
    }

    /// Resolve the platform's default plan, tagged by provenance.
    ///
    /// A stored plan carrying the default flag wins and is returned
    /// unchanged. Otherwise the plan is derived from configuration:
    /// `docker:memory` is the memory quota and `docker:swap` is the
    /// combined memory+swap ceiling (the container runtime's convention),
    /// so the plan's swap is the difference. Both keys must be set, and
    /// the difference must not be negative; anything else is a fatal
    /// configuration error, never clamped.
    pub fn resolve_default(&self) -> Result<DefaultPlan> {
        if let Some(plan) = self.store.find_default()? {
            return Ok(DefaultPlan::Explicit(plan));
        }

        let memory = self.config.get_i64("docker:memory").ok_or_else(|| {
            PlanError::Config("docker:memory is not set; cannot derive a default plan".to_string())
        })?;
        let total = self.config.get_i64("docker:swap").ok_or_else(|| {
            PlanError::Config("docker:swap is not set; cannot derive a default plan".to_string())
        })?;
        let swap = total - memory;
        if swap < 0 {
            return Err(PlanError::Config(format!(
                "docker:swap ({}) must be at least docker:memory ({})",
                total, memory
            )));
        }

        tracing::debug!(memory, swap, "derived default plan from configuration");
        Ok(DefaultPlan::Derived(Plan {
            name: AUTOGENERATED_PLAN_NAME.to_string(),
            memory,
            swap,
            cpu_share: DEFAULT_CPU_SHARE,
            is_default: false,
        }))
    }

    /// The default plan, explicit or derived. A derived plan exists only
    /// for the duration of the call; it is never persisted here.
    pub fn default_plan(&self) -> Result<Plan> {
        Ok(self.resolve_default()?.into_plan())
    }
}
