//! Resource definitions.

use indexmap::IndexMap;
use std::fmt;

use super::intrinsic::Value;

/// The kind of infrastructure object a resource describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Function,
    Role,
    RestApi,
    NestedStack,
    Permission,
    EventsRule,
    /// Any other platform type, e.g. `AWS::SNS::Topic`.
    Custom(String),
}

impl ResourceKind {
    /// The platform type tag written to the template.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Function => "AWS::Lambda::Function",
            Self::Role => "AWS::IAM::Role",
            Self::RestApi => "AWS::ApiGateway::RestApi",
            Self::NestedStack => "AWS::CloudFormation::Stack",
            Self::Permission => "AWS::Lambda::Permission",
            Self::EventsRule => "AWS::Events::Rule",
            Self::Custom(tag) => tag,
        }
    }

    /// Suffix appended to a resource name to form its desired logical ID.
    #[must_use]
    pub fn id_suffix(&self) -> &'static str {
        match self {
            Self::Function => "LambdaFunction",
            Self::Role => "IamRole",
            Self::RestApi => "",
            Self::NestedStack => "",
            Self::Permission => "Permission",
            Self::EventsRule => "EventsRule",
            Self::Custom(_) => "",
        }
    }

    /// Short tag used in registry keys and log messages.
    #[must_use]
    pub fn short_name(&self) -> &str {
        match self {
            Self::Function => "function",
            Self::Role => "role",
            Self::RestApi => "rest-api",
            Self::NestedStack => "stack",
            Self::Permission => "permission",
            Self::EventsRule => "events-rule",
            Self::Custom(tag) => tag,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A named infrastructure object owned by one stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDefinition {
    pub logical_id: String,
    pub kind: ResourceKind,
    pub properties: IndexMap<String, Value>,
    /// Explicit creation-order dependencies on other resources in the same template.
    pub depends_on: Vec<String>,
}

impl ResourceDefinition {
    pub fn new(logical_id: impl Into<String>, kind: ResourceKind, properties: IndexMap<String, Value>) -> Self {
        Self {
            logical_id: logical_id.into(),
            kind,
            properties,
            depends_on: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}
