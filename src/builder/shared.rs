//! Resources declared verbatim by a class.

use std::collections::HashMap;

use crate::core::Result;
use crate::manifest::DeclaredResource;
use crate::template::{Intrinsic, ResourceKind, StackDefinition, Value};

/// Add every declared resource to `stack` and return their final logical IDs in order.
///
/// IDs are claimed before any properties are converted, so a marker such as
/// `!GetAtt Topic.Arn` naming another declared resource is rewritten to that resource's
/// final ID even when it is declared later. Resources with `output = true` are exported
/// under their final ID with a `Ref` value.
pub fn add_declared_resources(stack: &mut StackDefinition, resources: &[DeclaredResource]) -> Result<Vec<String>> {
    let final_ids: HashMap<&str, String> = resources
        .iter()
        .map(|r| (r.id.as_str(), stack.reserve_resource_id(&declared_kind(r), &r.id)))
        .collect();
    let rename = |target: &str| final_ids.get(target).filter(|id| id.as_str() != target).cloned();

    let mut declared = Vec::with_capacity(resources.len());
    for resource in resources {
        let properties = resource
            .properties
            .iter()
            .map(|(key, value)| {
                let mut value = Value::from_toml(value);
                value.retarget(&rename);
                (key.clone(), value)
            })
            .collect();

        let logical_id = stack.add_resource(declared_kind(resource), &resource.id, properties)?;
        if resource.output {
            stack.add_output(&logical_id, Intrinsic::reference(logical_id.clone()))?;
        }
        declared.push(logical_id);
    }
    Ok(declared)
}

/// Declared resources take their ID from the declaration alone, whatever their type.
fn declared_kind(resource: &DeclaredResource) -> ResourceKind {
    ResourceKind::Custom(resource.resource_type.clone())
}
