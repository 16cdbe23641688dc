//! Function resource properties.

use indexmap::IndexMap;

use crate::config::SynthConfig;
use crate::manifest::{ApplicationClass, Task};
use crate::template::{Intrinsic, Value};

/// Platform ceiling on function physical names.
pub const MAX_FUNCTION_NAME_LEN: usize = 64;

/// Environment variable carrying the deploy environment into every function.
pub const ENV_VARIABLE: &str = "STACKFORGE_ENV";

/// `<project>-<env>-<class>-<task>`, or `None` when that exceeds the platform ceiling.
///
/// Over-long names are left to the platform to generate; truncating could make two
/// functions collide.
pub fn physical_name(config: &SynthConfig, class: &ApplicationClass, task: &Task) -> Option<String> {
    let name = format!("{}-{}-{}", config.name_prefix(), class.dashed_name(), task.name.replace('_', "-"));
    (name.len() <= MAX_FUNCTION_NAME_LEN).then_some(name)
}

/// Properties of the function generated for `task`.
///
/// `role` is the value of the `Role` property: a `GetAtt` of a role declared in the same
/// stack, or a `Ref` of the `IamRole` common parameter. `code_bucket` is the final name of
/// the `S3Bucket` parameter.
pub fn function_properties(
    config: &SynthConfig,
    class: &ApplicationClass,
    task: &Task,
    role: Intrinsic,
    code_bucket: &str,
) -> IndexMap<String, Value> {
    let function = &config.function;
    let mut properties = IndexMap::new();

    if let Some(name) = physical_name(config, class, task) {
        properties.insert("FunctionName".to_string(), Value::from(name));
    }
    properties.insert(
        "Code".to_string(),
        Value::map([
            ("S3Bucket", Value::Intrinsic(Intrinsic::reference(code_bucket))),
            ("S3Key", Value::from(function.code_key.as_str())),
        ]),
    );
    properties.insert("Handler".to_string(), Value::from(class.handler(task)));
    properties.insert("Role".to_string(), Value::Intrinsic(role));
    properties.insert("Runtime".to_string(), Value::from(function.runtime.as_str()));
    properties.insert("MemorySize".to_string(), Value::from(task.memory_size.unwrap_or(function.memory_size)));
    properties.insert("Timeout".to_string(), Value::from(task.timeout.unwrap_or(function.timeout)));
    properties.insert(
        "Description".to_string(),
        Value::from(task.description.clone().unwrap_or_else(|| format!("{}#{}", class.name, task.name))),
    );

    let mut variables: IndexMap<String, Value> =
        function.environment.iter().map(|(k, v)| (k.clone(), Value::from(v.as_str()))).collect();
    variables.insert(ENV_VARIABLE.to_string(), Value::from(config.project.env.as_str()));
    properties.insert("Environment".to_string(), Value::map([("Variables", Value::Map(variables))]));

    if let Some(vpc) = &function.vpc_config {
        properties.insert(
            "VpcConfig".to_string(),
            Value::map([
                ("SecurityGroupIds", Value::strings(vpc.security_group_ids.iter().cloned())),
                ("SubnetIds", Value::strings(vpc.subnet_ids.iter().cloned())),
            ]),
        );
    }
    properties
}
