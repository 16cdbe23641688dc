//! Stack definitions: one template under construction.
//!
//! A [`StackDefinition`] accumulates resources, parameters and outputs during the synthesis
//! pass. It is strictly additive (nothing is ever removed) and is frozen once the serializer
//! starts walking it; any mutation after that point is an engine defect and is reported as
//! [`StackforgeError::TemplateFrozen`].

use indexmap::IndexMap;
use std::sync::Arc;

use super::intrinsic::{Intrinsic, Value};
use super::logical_id::{LogicalIdRegistry, Scope, sanitize};
use super::resource::{ResourceDefinition, ResourceKind};
use crate::core::{Result, StackforgeError};

/// Where the root template obtains the value passed to a child parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterBinding {
    /// Shared context forwarded from the root under this common-parameter key.
    Common(String),
    /// The output `output` of the child stack generated for `class`.
    Dependency {
        class: String,
        output: String,
    },
    /// Supplied at deploy time; the root does not pass anything.
    Unbound,
}

/// A declared template parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub default: Option<Value>,
    pub binding: ParameterBinding,
}

/// One template under construction.
#[derive(Debug)]
pub struct StackDefinition {
    name: String,
    scope: Scope,
    registry: Arc<LogicalIdRegistry>,
    description: Option<String>,
    resources: IndexMap<String, ResourceDefinition>,
    parameters: IndexMap<String, Parameter>,
    outputs: IndexMap<String, Value>,
    frozen: bool,
}

impl StackDefinition {
    /// Create the root stack of a run.
    pub fn root(name: impl Into<String>, registry: Arc<LogicalIdRegistry>) -> Self {
        Self::new(name.into(), Scope::Root, registry)
    }

    /// Create the child stack for an application class.
    pub fn child(class_name: impl Into<String>, registry: Arc<LogicalIdRegistry>) -> Self {
        let class_name = class_name.into();
        Self::new(class_name.clone(), Scope::Child(class_name), registry)
    }

    fn new(name: String, scope: Scope, registry: Arc<LogicalIdRegistry>) -> Self {
        Self {
            name,
            scope,
            registry,
            description: None,
            resources: IndexMap::new(),
            parameters: IndexMap::new(),
            outputs: IndexMap::new(),
            frozen: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn registry(&self) -> &Arc<LogicalIdRegistry> {
        &self.registry
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.ensure_mutable()?;
        self.description = Some(description.into());
        Ok(())
    }

    /// Declare a resource and return its logical ID.
    ///
    /// Declaring the same `(kind, name)` twice returns the existing ID and keeps the
    /// properties of the first declaration, so several code paths can request a shared
    /// resource without duplicating it.
    pub fn add_resource(
        &mut self,
        kind: ResourceKind,
        name: &str,
        properties: IndexMap<String, Value>,
    ) -> Result<String> {
        self.ensure_mutable()?;
        let key = resource_key(&kind, name);
        if let Some(existing) = self.registry.lookup(&self.scope, &key)
            && self.resources.contains_key(&existing)
        {
            return Ok(existing);
        }

        let logical_id = self.reserve_resource_id(&kind, name);
        self.resources.insert(logical_id.clone(), ResourceDefinition::new(logical_id.clone(), kind, properties));
        Ok(logical_id)
    }

    /// Claim the logical ID for `(kind, name)` without declaring the resource yet.
    ///
    /// A later [`add_resource`](Self::add_resource) with the same kind and name receives
    /// the same ID. Used when properties must refer to IDs that are not declared yet.
    pub fn reserve_resource_id(&self, kind: &ResourceKind, name: &str) -> String {
        let desired = match kind.id_suffix() {
            "" => name.to_string(),
            suffix => format!("{name}-{suffix}"),
        };
        self.registry.assign_scoped(&self.scope, &resource_key(kind, name), &desired)
    }

    /// The logical ID previously assigned to `(kind, name)` in this stack.
    pub fn logical_id_for(&self, kind: &ResourceKind, name: &str) -> Option<String> {
        self.registry
            .lookup(&self.scope, &resource_key(kind, name))
            .filter(|id| self.resources.contains_key(id))
    }

    /// Add explicit creation-order dependencies to a declared resource.
    pub fn set_depends_on(&mut self, logical_id: &str, depends_on: Vec<String>) -> Result<()> {
        self.ensure_mutable()?;
        let resource = self.resources.get_mut(logical_id).ok_or_else(|| StackforgeError::DanglingReference {
            template: self.name.clone(),
            reference: logical_id.to_string(),
        })?;
        for dep in depends_on {
            if !resource.depends_on.contains(&dep) {
                resource.depends_on.push(dep);
            }
        }
        Ok(())
    }

    /// Declare a deploy-time parameter and return its final name.
    pub fn add_parameter(&mut self, name: &str, description: impl Into<String>) -> Result<String> {
        self.add_bound_parameter(name, description, ParameterBinding::Unbound)
    }

    /// Declare a parameter whose value the root template supplies.
    ///
    /// Parameters share the logical-ID namespace with resources, so the final name comes
    /// from the registry. Declaring the same name twice returns the existing parameter.
    pub fn add_bound_parameter(
        &mut self,
        name: &str,
        description: impl Into<String>,
        binding: ParameterBinding,
    ) -> Result<String> {
        self.ensure_mutable()?;
        let key = format!("parameter:{name}");
        if let Some(existing) = self.registry.lookup(&self.scope, &key)
            && self.parameters.contains_key(&existing)
        {
            return Ok(existing);
        }

        let final_name = self.registry.assign_local(&self.scope, &key, name);
        self.parameters.insert(
            final_name.clone(),
            Parameter {
                name: final_name.clone(),
                description: description.into(),
                default: None,
                binding,
            },
        );
        Ok(final_name)
    }

    pub fn set_parameter_default(&mut self, name: &str, default: Value) -> Result<()> {
        self.ensure_mutable()?;
        let parameter = self.parameters.get_mut(name).ok_or_else(|| StackforgeError::DanglingReference {
            template: self.name.clone(),
            reference: name.to_string(),
        })?;
        parameter.default = Some(default);
        Ok(())
    }

    /// Declare an output. Output names live in their own namespace and are sanitized.
    pub fn add_output(&mut self, name: &str, value: impl Into<Value>) -> Result<String> {
        self.ensure_mutable()?;
        let name = sanitize(name);
        self.outputs.insert(name.clone(), value.into());
        Ok(name)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&ResourceDefinition> {
        self.resources.get(logical_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.values()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    /// Whether `intrinsic` names something declared in this stack. `Ref` may target a
    /// resource or parameter, `GetAtt` only a resource.
    pub fn resolves(&self, intrinsic: &Intrinsic) -> bool {
        match intrinsic {
            Intrinsic::Ref(id) => self.resources.contains_key(id) || self.parameters.contains_key(id),
            Intrinsic::GetAtt {
                logical_id,
                ..
            } => self.resources.contains_key(logical_id),
            Intrinsic::Pseudo(_) => true,
        }
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.outputs.iter()
    }

    pub fn output_names(&self) -> Vec<String> {
        self.outputs.keys().cloned().collect()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Stop accepting mutations. Called by the serializer.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(StackforgeError::TemplateFrozen {
                template: self.name.clone(),
            });
        }
        Ok(())
    }
}

fn resource_key(kind: &ResourceKind, name: &str) -> String {
    format!("{}:{name}", kind.short_name())
}
