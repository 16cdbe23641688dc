//! Application-wide synthesis configuration.
//!
//! The configuration lives in the top-level tables of `stackforge.toml`, next to the
//! `[[classes]]` descriptors. Every table and key is optional:
//!
//! ```toml
//! [project]
//! name = "shop"
//! env = "dev"                 # overridden by STACKFORGE_ENV
//!
//! [api]
//! endpoint_type = "REGIONAL"  # or a list
//! binary_media_types = ["multipart/form-data"]
//!
//! [function]
//! runtime = "provided.al2023"
//! memory_size = 1536
//! timeout = 30
//! environment = { LOG_LEVEL = "info" }
//! vpc_config = { security_group_ids = ["sg-1"], subnet_ids = ["subnet-1"] }
//!
//! [iam]
//! policy = ["logs", "s3"]
//! managed_policy = ["AmazonSSMReadOnlyAccess"]
//!
//! [parameters]                # extra parameters passed to every child stack
//! DeployBucket = "assets"
//!
//! [output]
//! format = "yaml"             # or "json"
//! template_url_prefix = "https://s3.amazonaws.com/shop-dev/templates"
//! ```
//!
//! # Modules
//!
//! - `parser` - generic TOML parsing with error mapping

pub mod parser;

pub use parser::{parse_config, parse_config_str};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::iam::PolicyDefinition;
use crate::template::OutputFormat;

/// Environment variable that overrides `project.env`.
pub const ENV_OVERRIDE_VAR: &str = "STACKFORGE_ENV";

/// The immutable configuration a synthesis run reads from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub project: ProjectConfig,
    pub api: ApiConfig,
    pub function: FunctionConfig,
    pub iam: IamConfig,
    /// Extra common parameters: name -> literal value forwarded by the root.
    pub parameters: IndexMap<String, String>,
    pub output: OutputConfig,
}

impl SynthConfig {
    /// Apply `STACKFORGE_ENV` if set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(env) = std::env::var(ENV_OVERRIDE_VAR)
            && !env.trim().is_empty()
        {
            debug!("Environment overridden by {}: {}", ENV_OVERRIDE_VAR, env);
            self.project.env = env.trim().to_string();
        }
    }

    /// True when functions are attached to a VPC.
    pub fn vpc_enabled(&self) -> bool {
        self.function.vpc_config.is_some()
    }

    /// `<project>-<env>`, the prefix of every physical name.
    pub fn name_prefix(&self) -> String {
        format!("{}-{}", self.project.name, self.project.env)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub env: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            env: "dev".to_string(),
        }
    }
}

/// A single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value.clone()],
            Self::Many(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// `EDGE`, `REGIONAL` or `PRIVATE`.
    pub endpoint_type: OneOrMany,
    pub binary_media_types: Vec<String>,
    pub vpc_endpoint_ids: Vec<String>,
    /// Resource policy attached to the API, as a full policy document.
    pub endpoint_policy: Option<serde_json::Value>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint_type: OneOrMany::One("EDGE".to_string()),
            binary_media_types: Vec::new(),
            vpc_endpoint_ids: Vec::new(),
            endpoint_policy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    pub runtime: String,
    pub memory_size: u32,
    pub timeout: u32,
    /// Object key of the deployment package inside the `S3Bucket` parameter's bucket.
    pub code_key: String,
    pub environment: IndexMap<String, String>,
    pub vpc_config: Option<VpcConfig>,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            runtime: "provided.al2023".to_string(),
            memory_size: 1536,
            timeout: 30,
            code_key: "code.zip".to_string(),
            environment: IndexMap::new(),
            vpc_config: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VpcConfig {
    pub security_group_ids: Vec<String>,
    pub subnet_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IamConfig {
    pub policy: Vec<PolicyDefinition>,
    pub managed_policy: Vec<String>,
}

impl Default for IamConfig {
    fn default() -> Self {
        Self {
            policy: vec![PolicyDefinition::from("logs")],
            managed_policy: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Prefix of every nested stack's `TemplateURL`.
    pub template_url_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Yaml,
            template_url_prefix: "templates".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: SynthConfig = parse_config_str("", "inline").unwrap();
        assert_eq!(config, SynthConfig::default());
        assert_eq!(config.project.name, "app");
        assert_eq!(config.api.endpoint_type.to_vec(), vec!["EDGE".to_string()]);
        assert_eq!(config.iam.policy, vec![PolicyDefinition::from("logs")]);
        assert!(!config.vpc_enabled());
    }

    #[test]
    fn test_full_config() {
        let config: SynthConfig = parse_config_str(
            r#"
            [project]
            name = "shop"
            env = "prod"

            [api]
            endpoint_type = ["REGIONAL", "PRIVATE"]
            vpc_endpoint_ids = ["vpce-1"]

            [function]
            memory_size = 512
            vpc_config = { security_group_ids = ["sg-1"], subnet_ids = ["subnet-1"] }

            [iam]
            policy = ["s3"]

            [parameters]
            DeployBucket = "assets"

            [output]
            format = "json"
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(config.name_prefix(), "shop-prod");
        assert_eq!(config.api.endpoint_type.to_vec().len(), 2);
        assert_eq!(config.function.memory_size, 512);
        assert_eq!(config.function.timeout, 30);
        assert!(config.vpc_enabled());
        assert_eq!(config.parameters.get("DeployBucket"), Some(&"assets".to_string()));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result: crate::core::Result<SynthConfig> =
            parse_config_str("[output]\nformat = \"xml\"", "inline");
        assert!(result.is_err());
    }
}
