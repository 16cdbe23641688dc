//! Reference checks on content written by users.
//!
//! Roles carry user policy statements, custom resources carry declared properties and
//! the REST API carries the endpoint policy. Markers inside them are not generated by the
//! builders, so a marker naming nothing in the template is a configuration problem rather
//! than an engine defect.

use crate::core::{Result, StackforgeError};
use crate::template::{ResourceKind, StackDefinition, Value};

/// Fail with [`StackforgeError::UnresolvedReferences`] when any marker in declared
/// content names an ID `stack` does not declare.
pub fn check_declared_references(stack: &StackDefinition) -> Result<()> {
    let mut references: Vec<String> = Vec::new();
    for resource in stack.resources().filter(|r| holds_declared_content(&r.kind)) {
        for intrinsic in resource.properties.values().flat_map(Value::intrinsics) {
            if stack.resolves(intrinsic) {
                continue;
            }
            let entry = format!("{}: {} (in {})", stack.name(), intrinsic, resource.logical_id);
            if !references.contains(&entry) {
                references.push(entry);
            }
        }
    }

    if references.is_empty() {
        Ok(())
    } else {
        Err(StackforgeError::UnresolvedReferences {
            references,
        })
    }
}

fn holds_declared_content(kind: &ResourceKind) -> bool {
    matches!(kind, ResourceKind::Role | ResourceKind::RestApi | ResourceKind::Custom(_))
}
