//! Policy statements and managed-policy lists.
//!
//! Manifests declare permissions in two forms:
//!
//! ```toml
//! iam_policy = [
//!     "s3",                 # every action of a service
//!     "ec2:Describe*",      # one action pattern
//!     { Action = ["sqs:SendMessage"], Effect = "Allow", Resource = "!GetAtt Queue.Arn" },
//! ]
//! managed_iam_policy = ["AmazonS3ReadOnlyAccess", "arn:aws:iam::123456789012:policy/Custom"]
//! ```
//!
//! Shorthand strings expand to an allow-all-resources statement; full statements are taken
//! as written. Both lists drop duplicates while keeping first-seen order.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::template::Value;

/// Policy language version written into every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Prefix used to expand a bare managed-policy name.
pub const MANAGED_POLICY_ARN_PREFIX: &str = "arn:aws:iam::aws:policy/";

/// One declared permission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PolicyDefinition {
    /// `"s3"` or `"ec2:Describe*"`
    Shorthand(String),
    /// A complete statement object.
    Statement(IndexMap<String, serde_json::Value>),
}

impl PolicyDefinition {
    pub fn shorthand(text: impl Into<String>) -> Self {
        Self::Shorthand(text.into())
    }

    /// Expand into a policy statement.
    #[must_use]
    pub fn to_statement(&self) -> Value {
        match self {
            Self::Shorthand(text) => {
                let action = if text.contains(':') {
                    text.clone()
                } else {
                    format!("{text}:*")
                };
                Value::map([
                    ("Action", Value::strings([action])),
                    ("Effect", Value::from("Allow")),
                    ("Resource", Value::from("*")),
                ])
            }
            Self::Statement(fields) => {
                Value::map(fields.iter().map(|(k, v)| (k.clone(), Value::from_json(v))))
            }
        }
    }
}

impl From<&str> for PolicyDefinition {
    fn from(text: &str) -> Self {
        Self::Shorthand(text.to_string())
    }
}

/// An ordered, duplicate-free list of statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDocument {
    statements: Vec<Value>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement unless an equal one is already present.
    pub fn add(&mut self, statement: Value) {
        if !self.statements.contains(&statement) {
            self.statements.push(statement);
        }
    }

    pub fn statements(&self) -> &[Value] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// The `{Version, Statement}` document.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::map([
            ("Version", Value::from(POLICY_VERSION)),
            ("Statement", Value::List(self.statements.clone())),
        ])
    }
}

/// An ordered, duplicate-free list of managed-policy ARNs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedPolicySet {
    arns: Vec<String>,
}

impl ManagedPolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy by full ARN or by bare name.
    pub fn add(&mut self, name_or_arn: &str) {
        let arn = expand_managed_policy(name_or_arn);
        if !self.arns.contains(&arn) {
            self.arns.push(arn);
        }
    }

    pub fn arns(&self) -> &[String] {
        &self.arns
    }

    pub fn is_empty(&self) -> bool {
        self.arns.is_empty()
    }
}

/// `AmazonS3ReadOnlyAccess` -> `arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess`
#[must_use]
pub fn expand_managed_policy(name_or_arn: &str) -> String {
    if name_or_arn.starts_with("arn:") {
        name_or_arn.to_string()
    } else {
        format!("{MANAGED_POLICY_ARN_PREFIX}{name_or_arn}")
    }
}
