//! Routing plan validation
//!
//! Rules:
//! - writer ids unique, kind tags non-empty
//! - category ids unique
//! - every category binds at least one writer
//! - writer bindings reference declared writers, no duplicates per chain
//! - channel names non-empty
//! - cooldowns strictly positive

use std::collections::HashSet;

use contracts::{LogError, RoutingPlan};

/// Validate a routing plan
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(plan: &RoutingPlan) -> Result<(), LogError> {
    validate_cooldowns(plan)?;
    validate_writers(plan)?;
    validate_categories(plan)?;
    Ok(())
}

fn validate_cooldowns(plan: &RoutingPlan) -> Result<(), LogError> {
    if plan.failover.cooldown_ms == 0 {
        return Err(LogError::config_validation(
            "failover.cooldown_ms",
            "cooldown_ms must be > 0",
        ));
    }
    for category in &plan.categories {
        if category.cooldown_ms == Some(0) {
            return Err(LogError::config_validation(
                format!("categories[id={}].cooldown_ms", category.id),
                "cooldown_ms must be > 0",
            ));
        }
    }
    Ok(())
}

fn validate_writers(plan: &RoutingPlan) -> Result<(), LogError> {
    let mut seen = HashSet::new();
    for writer in &plan.writers {
        if !seen.insert(writer.id) {
            return Err(LogError::config_validation(
                format!("writers[id={}]", writer.id),
                "duplicate writer id",
            ));
        }
        if writer.kind.is_empty() {
            return Err(LogError::config_validation(
                format!("writers[id={}].kind", writer.id),
                "kind cannot be empty",
            ));
        }
    }
    Ok(())
}

fn validate_categories(plan: &RoutingPlan) -> Result<(), LogError> {
    let declared: HashSet<_> = plan.writers.iter().map(|w| w.id).collect();

    let mut seen = HashSet::new();
    for category in &plan.categories {
        if !seen.insert(category.id) {
            return Err(LogError::config_validation(
                format!("categories[id={}]", category.id),
                "duplicate category id",
            ));
        }
        if category.writers.is_empty() {
            return Err(LogError::config_validation(
                format!("categories[id={}].writers", category.id),
                "category must bind at least one writer",
            ));
        }

        let mut bound = HashSet::new();
        for binding in &category.writers {
            if !declared.contains(&binding.id) {
                return Err(LogError::config_validation(
                    format!("categories[id={}].writers[id={}]", category.id, binding.id),
                    "binding references an undeclared writer",
                ));
            }
            if !bound.insert(binding.id) {
                return Err(LogError::config_validation(
                    format!("categories[id={}].writers[id={}]", category.id, binding.id),
                    "writer bound twice in the same category",
                ));
            }
        }

        for channel in &category.channels {
            if channel.is_empty() {
                return Err(LogError::config_validation(
                    format!("categories[id={}].channels", category.id),
                    "channel name cannot be empty",
                ));
            }
        }
    }
    Ok(())
}
