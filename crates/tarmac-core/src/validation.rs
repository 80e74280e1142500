//! Plan validation
//!
//! A plan is valid when its name is non-empty and its memory and CPU-share
//! quotas are strictly positive. Swap may be zero (no swap). Validation
//! collects every offending field so callers see the full picture in one
//! round trip.

use crate::Plan;

/// Validation failure naming the missing or invalid plan fields.
///
/// Field names match the wire format (`name`, `memory`, `cpushare`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid plan: missing or invalid value for field(s): {}", .fields.join(", "))]
pub struct PlanValidationError {
    pub fields: Vec<&'static str>,
}

/// Validate a plan against the creation rules.
pub fn validate_plan(plan: &Plan) -> std::result::Result<(), PlanValidationError> {
    let mut fields = Vec::new();

    if plan.name.is_empty() {
        fields.push("name");
    }
    if plan.memory <= 0 {
        fields.push("memory");
    }
    if plan.cpu_share <= 0 {
        fields.push("cpushare");
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(PlanValidationError { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str, memory: i64, swap: i64, cpu_share: i64) -> Plan {
        Plan {
            name: name.to_string(),
            memory,
            swap,
            cpu_share,
            is_default: false,
        }
    }

    #[test]
    fn test_valid_plans() {
        assert!(validate_plan(&plan("small", 1, 0, 1)).is_ok());
        assert!(validate_plan(&plan("large", i64::MAX, 1024, 100)).is_ok());
    }

    #[test]
    fn test_missing_name() {
        let err = validate_plan(&plan("", 1024, 0, 100)).unwrap_err();
        assert_eq!(err.fields, vec!["name"]);
    }

    #[test]
    fn test_non_positive_memory() {
        let err = validate_plan(&plan("p1", 0, 0, 100)).unwrap_err();
        assert_eq!(err.fields, vec!["memory"]);

        let err = validate_plan(&plan("p1", -1, 0, 100)).unwrap_err();
        assert_eq!(err.fields, vec!["memory"]);
    }

    #[test]
    fn test_non_positive_cpu_share() {
        let err = validate_plan(&plan("p1", 1024, 0, 0)).unwrap_err();
        assert_eq!(err.fields, vec!["cpushare"]);
    }

    #[test]
    fn test_all_invalid_fields_collected() {
        let err = validate_plan(&plan("", 0, 0, -5)).unwrap_err();
        assert_eq!(err.fields, vec!["name", "memory", "cpushare"]);
        let msg = err.to_string();
        assert!(msg.contains("name"));
        assert!(msg.contains("memory"));
        assert!(msg.contains("cpushare"));
    }

    #[test]
    fn test_zero_swap_is_allowed() {
        assert!(validate_plan(&plan("no-swap", 1024, 0, 100)).is_ok());
    }
}
