//! Tarmac Router
//!
//! Registry of network-routing backends and the catalog views served to
//! callers. Built-in backends are registered once at process start and
//! never change; operator-configured backends are read from the `routers`
//! subtree of the process configuration on every read.

use std::sync::Arc;

use tarmac_core::{ConfigSnapshot, PlanError, PlanRouter, Result};

/// Registry of router backends.
///
/// The built-in set is an immutable value established at construction.
/// Only a built-in may carry the default flag; configured entries are
/// always non-default.
#[derive(Debug)]
pub struct RouterRegistry {
    built_ins: Vec<PlanRouter>,
    config: Arc<ConfigSnapshot>,
}

impl RouterRegistry {
    /// Build a registry from the process's built-in backends.
    ///
    /// A non-empty built-in set must designate exactly one default
    /// backend; anything else is a startup configuration error.
    pub fn new(built_ins: Vec<PlanRouter>, config: Arc<ConfigSnapshot>) -> Result<Self> {
        let defaults = built_ins.iter().filter(|r| r.is_default).count();
        if !built_ins.is_empty() && defaults != 1 {
            return Err(PlanError::Config(format!(
                "built-in routers must designate exactly one default, found {}",
                defaults
            )));
        }
        Ok(Self { built_ins, config })
    }

    /// The static built-in set, in registration order.
    pub fn built_ins(&self) -> &[PlanRouter] {
        &self.built_ins
    }

    /// Router instances declared in the `routers` configuration subtree.
    ///
    /// `None` when the subtree is absent (the configuration never
    /// mentions routers), `Some` otherwise, sorted by name. Every entry
    /// must declare a `type`; configured entries are never the default.
    pub fn configured(&self) -> Result<Option<Vec<PlanRouter>>> {
        let Some(routers) = self.config.subtree("routers") else {
            return Ok(None);
        };

        let mut entries = Vec::with_capacity(routers.len());
        for (name, record) in routers {
            let router_type = record
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    PlanError::Config(format!("router {:?} does not declare a type", name))
                })?;
            entries.push(PlanRouter {
                name: name.clone(),
                router_type: router_type.to_string(),
                is_default: false,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(count = entries.len(), "read configured routers");
        Ok(Some(entries))
    }
}

/// The two externally-visible catalog views over the registry: the full
/// catalog and the plan-selectable subset. Each view carries its own
/// emptiness contract.
pub struct RouterCatalogService {
    registry: Arc<RouterRegistry>,
}

impl RouterCatalogService {
    pub fn new(registry: Arc<RouterRegistry>) -> Self {
        Self { registry }
    }

    /// Union of built-in and configured backends, sorted by name.
    ///
    /// Never empty in a real deployment: built-ins are always present.
    pub fn full_catalog(&self) -> Result<Vec<PlanRouter>> {
        let mut catalog = self.registry.built_ins().to_vec();
        if let Some(configured) = self.registry.configured()? {
            catalog.extend(configured);
        }
        catalog.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(catalog)
    }

    /// Routers an operator has explicitly provisioned as selectable for a
    /// resource plan: configured entries only.
    ///
    /// `None` when the `routers` configuration subtree is entirely
    /// absent; the HTTP layer renders that as "no content" rather than an
    /// empty array.
    pub fn plan_selectable_catalog(&self) -> Result<Option<Vec<PlanRouter>>> {
        self.registry.configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(name: &str, router_type: &str, is_default: bool) -> PlanRouter {
        PlanRouter {
            name: name.to_string(),
            router_type: router_type.to_string(),
            is_default,
        }
    }

    fn fake_built_ins() -> Vec<PlanRouter> {
        vec![router("fake", "fake", true), router("fake-tls", "fake-tls", false)]
    }

    fn registry_with(yaml: &str) -> RouterRegistry {
        let config = Arc::new(ConfigSnapshot::from_yaml(yaml).unwrap());
        RouterRegistry::new(fake_built_ins(), config).unwrap()
    }

    fn catalog_with(yaml: &str) -> RouterCatalogService {
        RouterCatalogService::new(Arc::new(registry_with(yaml)))
    }

    #[test]
    fn test_new_rejects_multiple_defaults() {
        let built_ins = vec![router("a", "a", true), router("b", "b", true)];
        let err = RouterRegistry::new(built_ins, Arc::new(ConfigSnapshot::empty())).unwrap_err();
        assert!(matches!(err, PlanError::Config(_)));
    }

    #[test]
    fn test_new_rejects_no_default() {
        let built_ins = vec![router("a", "a", false)];
        let err = RouterRegistry::new(built_ins, Arc::new(ConfigSnapshot::empty())).unwrap_err();
        assert!(matches!(err, PlanError::Config(_)));
    }

    #[test]
    fn test_new_allows_empty_built_ins() {
        RouterRegistry::new(Vec::new(), Arc::new(ConfigSnapshot::empty())).unwrap();
    }

    #[test]
    fn test_built_ins_keep_registration_order() {
        let registry = registry_with("{}");
        let names: Vec<&str> = registry.built_ins().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["fake", "fake-tls"]);
    }

    #[test]
    fn test_configured_absent_subtree() {
        let registry = registry_with("docker:\n  memory: 1\n");
        assert_eq!(registry.configured().unwrap(), None);
    }

    #[test]
    fn test_configured_empty_subtree() {
        let registry = registry_with("routers: {}\n");
        assert_eq!(registry.configured().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_configured_entries_sorted_and_never_default() {
        let registry = registry_with(
            "routers:\n  router2:\n    type: bar\n  router1:\n    type: foo\n",
        );
        let entries = registry.configured().unwrap().unwrap();
        assert_eq!(
            entries,
            vec![router("router1", "foo", false), router("router2", "bar", false)]
        );
    }

    #[test]
    fn test_configured_missing_type_is_config_error() {
        let registry = registry_with("routers:\n  broken:\n    address: somewhere\n");
        let err = registry.configured().unwrap_err();
        assert!(matches!(err, PlanError::Config(_)));
    }

    #[test]
    fn test_full_catalog_merges_and_sorts() {
        let catalog = catalog_with(
            "routers:\n  router1:\n    type: foo\n  router2:\n    type: bar\n",
        );
        let expected = vec![
            router("fake", "fake", true),
            router("fake-tls", "fake-tls", false),
            router("router1", "foo", false),
            router("router2", "bar", false),
        ];
        assert_eq!(catalog.full_catalog().unwrap(), expected);
    }

    #[test]
    fn test_full_catalog_without_configured_routers() {
        let catalog = catalog_with("docker:\n  memory: 1\n");
        assert_eq!(catalog.full_catalog().unwrap(), fake_built_ins());
    }

    #[test]
    fn test_plan_selectable_catalog_distinguishes_absent_from_empty() {
        assert_eq!(
            catalog_with("docker:\n  memory: 1\n")
                .plan_selectable_catalog()
                .unwrap(),
            None
        );
        assert_eq!(
            catalog_with("routers: {}\n").plan_selectable_catalog().unwrap(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_plan_selectable_catalog_excludes_built_ins() {
        let catalog = catalog_with("routers:\n  router1:\n    type: foo\n");
        let entries = catalog.plan_selectable_catalog().unwrap().unwrap();
        assert_eq!(entries, vec![router("router1", "foo", false)]);
    }

    #[test]
    fn test_configured_only_registry_has_no_default() {
        // even with no built-ins, configured entries never claim the default
        let config = Arc::new(
            ConfigSnapshot::from_yaml("routers:\n  router1:\n    type: foo\n").unwrap(),
        );
        let registry = RouterRegistry::new(Vec::new(), config).unwrap();
        let catalog = RouterCatalogService::new(Arc::new(registry));
        let entries = catalog.full_catalog().unwrap();
        assert!(entries.iter().all(|r| !r.is_default));
    }
}
