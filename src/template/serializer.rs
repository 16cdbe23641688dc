//! Template serializer.
//!
//! Walks a [`StackDefinition`] and produces the final document. This is the only place
//! where tagged intrinsics become platform syntax. Before emitting anything the serializer
//! freezes the stack and checks the invariants every document must satisfy:
//!
//! - logical IDs are unique across resources and parameters
//! - every `Ref` targets a declared resource or parameter, every `GetAtt` a declared
//!   resource, and every `DependsOn` entry a declared resource
//!
//! A violation means the engine built an invalid stack and is reported as an error instead
//! of producing a document the platform would reject.
//!
//! Sections are emitted in declaration order, so rendering identical input twice yields
//! byte-identical text.

use serde::Deserialize;
use serde_json::{Map, json};
use std::fmt;

use super::intrinsic::Value;
use super::stack::StackDefinition;
use crate::core::{Result, StackforgeError};

/// Template format version written at the top of every document.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Text format for rendered documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// File extension for documents in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Json => "json",
        }
    }

    /// Render a document as text.
    pub fn render(self, document: &serde_json::Value) -> Result<String> {
        match self {
            Self::Yaml => Ok(serde_yaml::to_string(document)?),
            Self::Json => {
                let mut text = serde_json::to_string_pretty(document)?;
                text.push('\n');
                Ok(text)
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Freeze `stack`, validate it and convert it into a template document.
pub fn serialize(stack: &mut StackDefinition) -> Result<serde_json::Value> {
    stack.freeze();
    validate(stack)?;

    let mut document = Map::new();
    document.insert("AWSTemplateFormatVersion".to_string(), json!(TEMPLATE_FORMAT_VERSION));
    if let Some(description) = stack.description() {
        document.insert("Description".to_string(), json!(description));
    }

    let mut parameters = Map::new();
    for parameter in stack.parameters() {
        let mut entry = Map::new();
        entry.insert("Type".to_string(), json!("String"));
        entry.insert("Description".to_string(), json!(parameter.description));
        if let Some(default) = &parameter.default {
            entry.insert("Default".to_string(), default.to_json());
        }
        parameters.insert(parameter.name.clone(), serde_json::Value::Object(entry));
    }
    if !parameters.is_empty() {
        document.insert("Parameters".to_string(), serde_json::Value::Object(parameters));
    }

    let mut resources = Map::new();
    for resource in stack.resources() {
        let mut entry = Map::new();
        entry.insert("Type".to_string(), json!(resource.kind.type_tag()));
        if !resource.properties.is_empty() {
            let properties: Map<String, serde_json::Value> =
                resource.properties.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
            entry.insert("Properties".to_string(), serde_json::Value::Object(properties));
        }
        if !resource.depends_on.is_empty() {
            entry.insert("DependsOn".to_string(), json!(resource.depends_on));
        }
        resources.insert(resource.logical_id.clone(), serde_json::Value::Object(entry));
    }
    document.insert("Resources".to_string(), serde_json::Value::Object(resources));

    let mut outputs = Map::new();
    for (name, value) in stack.outputs() {
        outputs.insert(name.clone(), json!({ "Value": value.to_json() }));
    }
    if !outputs.is_empty() {
        document.insert("Outputs".to_string(), serde_json::Value::Object(outputs));
    }

    Ok(serde_json::Value::Object(document))
}

/// Check logical-ID uniqueness and referential closure.
pub fn validate(stack: &StackDefinition) -> Result<()> {
    for parameter in stack.parameters() {
        if stack.resource(&parameter.name).is_some() {
            return Err(StackforgeError::DuplicateLogicalId {
                template: stack.name().to_string(),
                logical_id: parameter.name.clone(),
            });
        }
    }

    for resource in stack.resources() {
        for value in resource.properties.values() {
            check_references(stack, value)?;
        }
        for dep in &resource.depends_on {
            if stack.resource(dep).is_none() {
                return Err(dangling(stack, dep.clone()));
            }
        }
    }
    for parameter in stack.parameters() {
        if let Some(default) = &parameter.default {
            check_references(stack, default)?;
        }
    }
    for (_, value) in stack.outputs() {
        check_references(stack, value)?;
    }
    Ok(())
}

fn check_references(stack: &StackDefinition, value: &Value) -> Result<()> {
    for intrinsic in value.intrinsics() {
        if !stack.resolves(intrinsic) {
            return Err(dangling(stack, intrinsic.to_string()));
        }
    }
    Ok(())
}

fn dangling(stack: &StackDefinition, reference: String) -> StackforgeError {
    StackforgeError::DanglingReference {
        template: stack.name().to_string(),
        reference,
    }
}
