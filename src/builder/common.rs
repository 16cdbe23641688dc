//! Common parameters: shared context the root passes to every child stack.

use std::collections::HashMap;

use crate::config::SynthConfig;
use crate::core::{Result, StackforgeError};
use crate::manifest::ApplicationClass;
use crate::template::{ParameterBinding, StackDefinition, Value, sanitize};

/// ARN of the application-wide execution role.
pub const IAM_ROLE: &str = "IamRole";
/// Bucket holding the deployment package.
pub const S3_BUCKET: &str = "S3Bucket";
/// ID of the shared REST API (controllers only).
pub const REST_API: &str = "RestApi";
/// Root resource of the shared REST API (controllers only).
pub const ROOT_RESOURCE_ID: &str = "RootResourceId";

/// Parameter names every child may already declare.
pub const RESERVED_PARAMETERS: [&str; 4] = [IAM_ROLE, S3_BUCKET, REST_API, ROOT_RESOURCE_ID];

/// Check the configured extra parameters.
///
/// A name is compared after sanitizing, since that is the logical ID it would take. Names
/// that shadow a reserved parameter, or that sanitize to the same ID as another extra
/// parameter, are reported.
pub fn validate_extra_parameters(config: &SynthConfig) -> Vec<StackforgeError> {
    let mut problems = Vec::new();
    let mut seen: HashMap<String, &str> = HashMap::new();
    for name in config.parameters.keys() {
        let id = sanitize(name);
        if RESERVED_PARAMETERS.contains(&id.as_str()) {
            problems.push(StackforgeError::ConfigError {
                message: format!("Parameter '{name}' is reserved for the common parameter {id}"),
            });
        } else if let Some(first) = seen.insert(id.clone(), name.as_str()) {
            problems.push(StackforgeError::ConfigError {
                message: format!("Parameters '{first}' and '{name}' both map to {id}"),
            });
        }
    }
    problems
}

/// Final names of the common parameters declared in one child stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonParameters {
    pub iam_role: String,
    pub s3_bucket: String,
    pub rest_api: Option<String>,
    pub root_resource_id: Option<String>,
}

/// Declare the common parameters of `class` in `stack`.
///
/// Every child receives `IamRole`, `S3Bucket` and each configured extra parameter;
/// controllers additionally receive `RestApi` and `RootResourceId`. Descriptions are the
/// parameter names. Extra parameters default to their configured literal.
pub fn add_common_parameters(
    stack: &mut StackDefinition,
    class: &ApplicationClass,
    config: &SynthConfig,
) -> Result<CommonParameters> {
    let iam_role = add_common(stack, IAM_ROLE)?;
    let s3_bucket = add_common(stack, S3_BUCKET)?;
    for (name, literal) in &config.parameters {
        let name = add_common(stack, name)?;
        stack.set_parameter_default(&name, Value::from(literal.as_str()))?;
    }

    let (rest_api, root_resource_id) = if class.is_controller() {
        (Some(add_common(stack, REST_API)?), Some(add_common(stack, ROOT_RESOURCE_ID)?))
    } else {
        (None, None)
    };

    Ok(CommonParameters {
        iam_role,
        s3_bucket,
        rest_api,
        root_resource_id,
    })
}

fn add_common(stack: &mut StackDefinition, key: &str) -> Result<String> {
    stack.add_bound_parameter(key, key, ParameterBinding::Common(key.to_string()))
}
