//! Cross-stack dependency wiring.
//!
//! A child stack consumes another class's outputs through parameters bound to
//! [`ParameterBinding::Dependency`]. The root template satisfies each such parameter by
//! passing `GetAtt(<producer stack>, Outputs.<name>)` and orders the nested stacks with
//! `DependsOn`. This module computes both from the finished child stacks.

use indexmap::IndexMap;

use crate::core::{Result, StackforgeError};
use crate::template::{Intrinsic, ParameterBinding, StackDefinition, Value};

/// What a finished child stack exposes to its dependents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyExport {
    pub class: String,
    /// Logical ID of the producer's nested-stack resource in the root template.
    pub stack_id: String,
    /// Output names in declaration order.
    pub outputs: Vec<String>,
}

impl DependencyExport {
    pub fn new(class: impl Into<String>, stack_id: impl Into<String>, outputs: Vec<String>) -> Self {
        Self {
            class: class.into(),
            stack_id: stack_id.into(),
            outputs,
        }
    }

    /// Reference to one of the producer's outputs, as seen from the root template.
    pub fn output_reference(&self, output: &str) -> Intrinsic {
        Intrinsic::get_att(&self.stack_id, format!("Outputs.{output}"))
    }
}

/// Exports of every class built so far, keyed by class name.
pub type DependencyExports = IndexMap<String, DependencyExport>;

/// Root-side arguments for one child stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackWiring {
    /// Parameter name -> value passed by the root.
    pub arguments: IndexMap<String, Value>,
    /// Nested-stack IDs that must be created first.
    pub depends_on: Vec<String>,
}

/// Wiring for every child, keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct WiringPlan {
    stacks: IndexMap<String, StackWiring>,
}

impl WiringPlan {
    pub fn for_class(&self, class: &str) -> Option<&StackWiring> {
        self.stacks.get(class)
    }
}

/// Resolve every dependency-bound parameter of `children` against `exports`.
///
/// Fails with [`StackforgeError::UnknownDependencies`] when a parameter names a class
/// without an export, and with [`StackforgeError::MissingOutput`] when the producer does
/// not declare the requested output.
pub fn wire<'a>(
    children: impl IntoIterator<Item = &'a StackDefinition>,
    exports: &DependencyExports,
) -> Result<WiringPlan> {
    let mut plan = WiringPlan::default();
    let mut missing = Vec::new();

    for child in children {
        let mut wiring = StackWiring::default();
        for parameter in child.parameters() {
            let ParameterBinding::Dependency {
                class,
                output,
            } = &parameter.binding
            else {
                continue;
            };

            let Some(export) = exports.get(class) else {
                missing.push(format!("{} -> {class}", child.name()));
                continue;
            };
            if !export.outputs.contains(output) {
                return Err(StackforgeError::MissingOutput {
                    class: class.clone(),
                    output: output.clone(),
                });
            }

            wiring.arguments.insert(parameter.name.clone(), Value::Intrinsic(export.output_reference(output)));
            if !wiring.depends_on.contains(&export.stack_id) {
                wiring.depends_on.push(export.stack_id.clone());
            }
        }
        plan.stacks.insert(child.name().to_string(), wiring);
    }

    if !missing.is_empty() {
        return Err(StackforgeError::UnknownDependencies {
            missing,
        });
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::LogicalIdRegistry;
    use serde_json::json;
    use std::sync::Arc;

    fn consumer(registry: Arc<LogicalIdRegistry>, output: &str) -> StackDefinition {
        let mut stack = StackDefinition::child("ShippingJob", registry);
        stack
            .add_bound_parameter(
                &format!("OrdersJob{output}"),
                format!("OrdersJob.Outputs.{output}"),
                ParameterBinding::Dependency {
                    class: "OrdersJob".to_string(),
                    output: output.to_string(),
                },
            )
            .unwrap();
        stack.add_bound_parameter("IamRole", "IamRole", ParameterBinding::Common("IamRole".into())).unwrap();
        stack
    }

    fn exports() -> DependencyExports {
        let mut exports = DependencyExports::new();
        exports.insert(
            "OrdersJob".to_string(),
            DependencyExport::new("OrdersJob", "OrdersJob", vec!["ProcessLambdaFunction".to_string()]),
        );
        exports
    }

    #[test]
    fn test_wire_dependency_parameter() {
        let child = consumer(Arc::new(LogicalIdRegistry::new()), "ProcessLambdaFunction");
        let plan = wire([&child], &exports()).unwrap();
        let wiring = plan.for_class("ShippingJob").unwrap();
        assert_eq!(
            wiring.arguments["OrdersJobProcessLambdaFunction"].to_json(),
            json!({"Fn::GetAtt": ["OrdersJob", "Outputs.ProcessLambdaFunction"]})
        );
        assert_eq!(wiring.depends_on, vec!["OrdersJob".to_string()]);
        assert!(!wiring.arguments.contains_key("IamRole"));
    }

    #[test]
    fn test_missing_output_is_internal() {
        let child = consumer(Arc::new(LogicalIdRegistry::new()), "Nope");
        let err = wire([&child], &exports()).unwrap_err();
        assert!(matches!(err, StackforgeError::MissingOutput { .. }));
    }

    #[test]
    fn test_missing_export() {
        let child = consumer(Arc::new(LogicalIdRegistry::new()), "ProcessLambdaFunction");
        let err = wire([&child], &DependencyExports::new()).unwrap_err();
        assert!(matches!(err, StackforgeError::UnknownDependencies { .. }));
    }
}
