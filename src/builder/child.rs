//! Child stack builder: one application class in, one child template out.

use std::sync::Arc;
use tracing::debug;

use super::common::{CommonParameters, add_common_parameters};
use super::events::{add_api_permission, add_schedule};
use super::function::function_properties;
use super::references::check_declared_references;
use super::shared::add_declared_resources;
use crate::config::SynthConfig;
use crate::core::{Result, StackforgeError};
use crate::iam::RoleComposer;
use crate::manifest::{ApplicationClass, Task, validate_function_names, validate_policy_names};
use crate::resolver::DependencyExports;
use crate::template::{Intrinsic, LogicalIdRegistry, ParameterBinding, ResourceKind, StackDefinition};

/// Builds the child template of one application class.
///
/// `dependencies` must hold the export of every class named in `depends_on`; the
/// synthesizer guarantees this by building classes in dependency layers.
pub struct ChildStackBuilder<'a> {
    class: &'a ApplicationClass,
    config: &'a SynthConfig,
    dependencies: &'a DependencyExports,
    stack: StackDefinition,
}

impl<'a> ChildStackBuilder<'a> {
    pub fn new(
        class: &'a ApplicationClass,
        config: &'a SynthConfig,
        registry: Arc<LogicalIdRegistry>,
        dependencies: &'a DependencyExports,
    ) -> Self {
        Self {
            class,
            config,
            dependencies,
            stack: StackDefinition::child(&class.name, registry),
        }
    }

    /// Build the stack.
    ///
    /// Fails before declaring anything when a task name is invalid, listing every
    /// offending `Class#method`.
    pub fn build(mut self) -> Result<StackDefinition> {
        validate_function_names([self.class])?;
        validate_policy_names([self.class])?;

        self.stack.set_description(format!("{} {} stack", self.class.name, self.class.kind))?;
        let common = add_common_parameters(&mut self.stack, self.class, self.config)?;

        let class_role = if self.class.build_class_iam() {
            Some(self.add_class_role()?)
        } else {
            None
        };

        let class = self.class;
        for task in &class.tasks {
            self.add_function(task, &common, class_role.as_deref())?;
        }
        add_declared_resources(&mut self.stack, &class.resources)?;
        self.add_dependency_parameters()?;
        check_declared_references(&self.stack)?;

        debug!(
            "Built stack {} with {} resources, {} parameters, {} outputs",
            self.class.name,
            self.stack.resources().count(),
            self.stack.parameters().count(),
            self.stack.outputs().count()
        );
        Ok(self.stack)
    }

    fn class_composer(&self) -> RoleComposer {
        let iam = &self.config.iam;
        RoleComposer::new(self.config.vpc_enabled())
            .with_policies(&iam.policy)
            .with_policies(&self.class.iam_policy)
            .with_managed_policies(&iam.managed_policy)
            .with_managed_policies(&self.class.managed_iam_policy)
            .with_policy_name(self.class.policy_name.as_deref())
    }

    fn add_class_role(&mut self) -> Result<String> {
        let properties = self.class_composer().compose();
        self.stack.add_resource(ResourceKind::Role, &self.class.name, properties)
    }

    fn add_task_role(&mut self, task: &Task) -> Result<String> {
        let properties = self
            .class_composer()
            .with_policies(&task.iam_policy)
            .with_managed_policies(&task.managed_iam_policy)
            .compose();
        self.stack.add_resource(ResourceKind::Role, &format!("{}-{}", self.class.name, task.name), properties)
    }

    fn add_function(&mut self, task: &Task, common: &CommonParameters, class_role: Option<&str>) -> Result<()> {
        let role = if task.build_function_iam() {
            Intrinsic::get_att(self.add_task_role(task)?, "Arn")
        } else if let Some(class_role) = class_role {
            Intrinsic::get_att(class_role, "Arn")
        } else {
            Intrinsic::reference(&common.iam_role)
        };

        let properties = function_properties(self.config, self.class, task, role, &common.s3_bucket);
        let function_id = self.stack.add_resource(ResourceKind::Function, &task.name, properties)?;
        self.stack.add_output(&function_id, Intrinsic::reference(function_id.clone()))?;

        if let Some(expression) = &task.schedule {
            add_schedule(&mut self.stack, &task.name, &function_id, expression)?;
        }
        if self.class.is_controller() {
            add_api_permission(&mut self.stack, &task.name, &function_id)?;
        }
        Ok(())
    }

    /// One parameter per output of each depended-on class, named
    /// `<DependencyStackId><OutputKey>`.
    fn add_dependency_parameters(&mut self) -> Result<()> {
        for dep in &self.class.depends_on {
            let export = self.dependencies.get(dep).ok_or_else(|| StackforgeError::UnknownDependencies {
                missing: vec![format!("{} -> {dep}", self.class.name)],
            })?;

            for output in &export.outputs {
                let name = format!("{}{}", export.stack_id, output);
                let description = export.output_reference(output).render_plain();
                self.stack.add_bound_parameter(
                    &name,
                    description,
                    ParameterBinding::Dependency {
                        class: dep.clone(),
                        output: output.clone(),
                    },
                )?;
            }
        }
        Ok(())
    }
}
