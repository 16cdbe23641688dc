//! Root stack assembly.
//!
//! The root template nests every child stack and holds what the children share: the
//! deploy-time `S3Bucket` parameter, the application-wide execution role and, when any
//! controller exists, the REST API. Each nested stack receives its common parameters
//! from these and its dependency parameters from the [`WiringPlan`].

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

use super::api_gateway::{REST_API_NAME, add_rest_api};
use super::common::{IAM_ROLE, REST_API, ROOT_RESOURCE_ID, S3_BUCKET};
use super::references::check_declared_references;
use crate::config::SynthConfig;
use crate::core::{Result, StackforgeError};
use crate::iam::RoleComposer;
use crate::manifest::ApplicationClass;
use crate::resolver::WiringPlan;
use crate::template::{Intrinsic, LogicalIdRegistry, ParameterBinding, ResourceKind, StackDefinition, Value};

/// Name of the root template.
pub const ROOT_TEMPLATE_NAME: &str = "stackforge-root";

/// Resource name of the application-wide role (`ApplicationIamRole`).
const APP_ROLE_NAME: &str = "Application";

/// A finished child stack and the file it will be written to.
#[derive(Debug)]
pub struct ChildTemplate {
    pub class: String,
    pub template_file: String,
    pub stack: StackDefinition,
}

/// Assembles the root template.
pub struct RootStackBuilder<'a> {
    config: &'a SynthConfig,
    stack: StackDefinition,
    stack_ids: IndexMap<String, String>,
    has_api: bool,
}

impl<'a> RootStackBuilder<'a> {
    /// Create the builder and claim every root-level logical ID.
    ///
    /// Claims happen sequentially in declaration order and must precede any child build,
    /// so nested-stack IDs never depend on how parallel child builds interleave.
    pub fn new(config: &'a SynthConfig, registry: Arc<LogicalIdRegistry>, classes: &[ApplicationClass]) -> Self {
        let stack = StackDefinition::root(ROOT_TEMPLATE_NAME, registry);
        let has_api = classes.iter().any(ApplicationClass::is_controller);

        stack.reserve_resource_id(&ResourceKind::Role, APP_ROLE_NAME);
        if has_api {
            stack.reserve_resource_id(&ResourceKind::RestApi, REST_API_NAME);
        }
        let stack_ids = classes
            .iter()
            .map(|class| (class.name.clone(), stack.reserve_resource_id(&ResourceKind::NestedStack, &class.name)))
            .collect();

        Self {
            config,
            stack,
            stack_ids,
            has_api,
        }
    }

    /// Nested-stack logical IDs by class name.
    pub fn stack_ids(&self) -> &IndexMap<String, String> {
        &self.stack_ids
    }

    pub fn stack_id(&self, class: &str) -> Option<&str> {
        self.stack_ids.get(class).map(String::as_str)
    }

    /// Build the root template around the finished `children`.
    pub fn assemble(mut self, children: &[ChildTemplate], plan: &WiringPlan) -> Result<StackDefinition> {
        let config = self.config;
        self.stack.set_description(format!("{} application", config.name_prefix()))?;

        let s3_bucket = self.stack.add_parameter(S3_BUCKET, S3_BUCKET)?;
        let role_properties = RoleComposer::new(config.vpc_enabled())
            .with_policies(&config.iam.policy)
            .with_managed_policies(&config.iam.managed_policy)
            .compose();
        let role_id = self.stack.add_resource(ResourceKind::Role, APP_ROLE_NAME, role_properties)?;
        let rest_api = if self.has_api {
            Some(add_rest_api(&mut self.stack, config)?)
        } else {
            None
        };

        let shared = SharedValues {
            config,
            role_id: &role_id,
            s3_bucket: &s3_bucket,
            rest_api: rest_api.as_deref(),
        };

        for child in children {
            let wiring = plan.for_class(&child.class);
            let mut arguments = IndexMap::new();
            for parameter in child.stack.parameters() {
                let value = match &parameter.binding {
                    ParameterBinding::Common(key) => shared.value_for(key)?,
                    ParameterBinding::Dependency {
                        class,
                        output,
                    } => wiring.and_then(|w| w.arguments.get(&parameter.name)).cloned().ok_or_else(|| {
                        StackforgeError::MissingOutput {
                            class: class.clone(),
                            output: output.clone(),
                        }
                    })?,
                    ParameterBinding::Unbound => continue,
                };
                arguments.insert(parameter.name.clone(), value);
            }

            let mut properties = IndexMap::new();
            properties.insert("TemplateURL".to_string(), Value::from(self.template_url(&child.template_file)));
            if !arguments.is_empty() {
                properties.insert("Parameters".to_string(), Value::Map(arguments));
            }

            let stack_id = self.stack.add_resource(ResourceKind::NestedStack, &child.class, properties)?;
            if let Some(wiring) = wiring
                && !wiring.depends_on.is_empty()
            {
                self.stack.set_depends_on(&stack_id, wiring.depends_on.clone())?;
            }
            debug!("Nested {} as {}", child.class, stack_id);
        }

        self.stack.add_output(IAM_ROLE, Intrinsic::get_att(role_id.clone(), "Arn"))?;
        check_declared_references(&self.stack)?;
        Ok(self.stack)
    }

    fn template_url(&self, file: &str) -> String {
        let prefix = self.config.output.template_url_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            file.to_string()
        } else {
            format!("{prefix}/{file}")
        }
    }
}

/// Root-side sources of the common parameters.
struct SharedValues<'a> {
    config: &'a SynthConfig,
    role_id: &'a str,
    s3_bucket: &'a str,
    rest_api: Option<&'a str>,
}

impl SharedValues<'_> {
    fn value_for(&self, key: &str) -> Result<Value> {
        let value: Value = match key {
            IAM_ROLE => Intrinsic::get_att(self.role_id, "Arn").into(),
            S3_BUCKET => Intrinsic::reference(self.s3_bucket).into(),
            REST_API => Intrinsic::reference(self.rest_api_id(key)?).into(),
            ROOT_RESOURCE_ID => Intrinsic::get_att(self.rest_api_id(key)?, "RootResourceId").into(),
            other => match self.config.parameters.get(other) {
                Some(literal) => Value::from(literal.as_str()),
                None => {
                    return Err(StackforgeError::ConfigError {
                        message: format!("Unknown common parameter '{other}'"),
                    });
                }
            },
        };
        Ok(value)
    }

    fn rest_api_id(&self, key: &str) -> Result<&str> {
        self.rest_api.ok_or_else(|| StackforgeError::ConfigError {
            message: format!("Common parameter '{key}' requires a controller class"),
        })
    }
}
