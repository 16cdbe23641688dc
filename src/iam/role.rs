//! Role property composition.

use indexmap::IndexMap;

use super::policy::{ManagedPolicySet, POLICY_VERSION, PolicyDefinition, PolicyDocument};
use crate::template::Value;

/// Inline policy granting network-interface access to functions attached to a VPC.
pub const VPC_POLICY_NAME: &str = "vpc";

/// Inline policy holding declared statements when no name is configured.
pub const DEFAULT_POLICY_NAME: &str = "custom";

/// Platform ceiling on inline role-policy names.
pub const MAX_POLICY_NAME_LEN: usize = 128;

const VPC_ACTIONS: [&str; 3] =
    ["ec2:CreateNetworkInterface", "ec2:DescribeNetworkInterfaces", "ec2:DeleteNetworkInterface"];

/// Builds the properties of an execution role from declared permissions.
///
/// Composition is a pure function of the inputs: the same declarations always yield
/// the same properties. No role name is assigned, so deploys are never blocked by the
/// global role-name namespace.
///
/// ```rust
/// use stackforge::iam::{PolicyDefinition, RoleComposer};
///
/// let properties = RoleComposer::new(false)
///     .with_policies(&[PolicyDefinition::from("s3")])
///     .compose();
/// assert!(properties.contains_key("Policies"));
/// assert!(!properties.contains_key("ManagedPolicyArns"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoleComposer {
    vpc: bool,
    policies: PolicyDocument,
    managed: ManagedPolicySet,
    policy_name: Option<String>,
}

impl RoleComposer {
    /// `vpc` adds the network-interface policy for functions attached to a VPC.
    pub fn new(vpc: bool) -> Self {
        Self {
            vpc,
            ..Self::default()
        }
    }

    /// Append declared statements. Duplicates of earlier statements are dropped.
    #[must_use]
    pub fn with_policies(mut self, definitions: &[PolicyDefinition]) -> Self {
        for definition in definitions {
            self.policies.add(definition.to_statement());
        }
        self
    }

    /// Append managed policies by name or ARN.
    #[must_use]
    pub fn with_managed_policies(mut self, names: &[String]) -> Self {
        for name in names {
            self.managed.add(name);
        }
        self
    }

    /// Name for the inline policy holding the declared statements.
    #[must_use]
    pub fn with_policy_name(mut self, name: Option<&str>) -> Self {
        self.policy_name = name.map(str::to_string);
        self
    }

    pub fn policy_name(&self) -> &str {
        self.policy_name.as_deref().unwrap_or(DEFAULT_POLICY_NAME)
    }

    pub fn compose(&self) -> IndexMap<String, Value> {
        let mut properties = IndexMap::new();
        properties.insert("Path".to_string(), Value::from("/"));
        properties.insert("AssumeRolePolicyDocument".to_string(), trust_policy());

        let mut inline = Vec::new();
        if self.vpc {
            let mut document = PolicyDocument::new();
            document.add(vpc_policy_statement());
            inline.push(inline_policy(VPC_POLICY_NAME, &document));
        }
        if !self.policies.is_empty() {
            inline.push(inline_policy(self.policy_name(), &self.policies));
        }
        if !inline.is_empty() {
            properties.insert("Policies".to_string(), Value::List(inline));
        }

        if !self.managed.is_empty() {
            properties.insert(
                "ManagedPolicyArns".to_string(),
                Value::strings(self.managed.arns().iter().cloned()),
            );
        }
        properties
    }
}

/// Statement granting the network-interface actions a VPC-attached function needs.
#[must_use]
pub fn vpc_policy_statement() -> Value {
    Value::map([
        ("Action", Value::strings(VPC_ACTIONS)),
        ("Effect", Value::from("Allow")),
        ("Resource", Value::from("*")),
    ])
}

fn trust_policy() -> Value {
    Value::map([
        ("Version", Value::from(POLICY_VERSION)),
        (
            "Statement",
            Value::List(vec![Value::map([
                ("Effect", Value::from("Allow")),
                ("Principal", Value::map([("Service", Value::strings(["lambda.amazonaws.com"]))])),
                ("Action", Value::strings(["sts:AssumeRole"])),
            ])]),
        ),
    ])
}

fn inline_policy(name: &str, document: &PolicyDocument) -> Value {
    Value::map([("PolicyName", Value::from(name)), ("PolicyDocument", document.to_value())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(properties: &IndexMap<String, Value>) -> serde_json::Value {
        Value::Map(properties.clone()).to_json()
    }

    #[test]
    fn test_trust_policy_and_path() {
        let properties = to_json(&RoleComposer::new(false).compose());
        assert_eq!(properties["Path"], json!("/"));
        assert_eq!(
            properties["AssumeRolePolicyDocument"]["Statement"][0]["Principal"],
            json!({"Service": ["lambda.amazonaws.com"]})
        );
        assert!(properties.get("RoleName").is_none());
    }

    #[test]
    fn test_empty_managed_policies_are_omitted() {
        let properties = RoleComposer::new(false)
            .with_policies(&[PolicyDefinition::from("logs")])
            .with_managed_policies(&[])
            .compose();
        assert!(!properties.contains_key("ManagedPolicyArns"));
    }

    #[test]
    fn test_vpc_policy_comes_first() {
        let properties = to_json(
            &RoleComposer::new(true).with_policies(&[PolicyDefinition::from("s3")]).compose(),
        );
        let policies = properties["Policies"].as_array().unwrap();
        assert_eq!(policies.len(), 2);
        assert_eq!(policies[0]["PolicyName"], json!("vpc"));
        assert_eq!(policies[1]["PolicyName"], json!("custom"));
        assert_eq!(policies[1]["PolicyDocument"]["Version"], json!("2012-10-17"));
    }

    #[test]
    fn test_custom_policy_name() {
        let properties = to_json(
            &RoleComposer::new(false)
                .with_policies(&[PolicyDefinition::from("s3")])
                .with_policy_name(Some("orders-access"))
                .compose(),
        );
        assert_eq!(properties["Policies"][0]["PolicyName"], json!("orders-access"));
    }

    #[test]
    fn test_composition_is_idempotent() {
        let build = || {
            RoleComposer::new(true)
                .with_policies(&[PolicyDefinition::from("s3"), PolicyDefinition::from("s3")])
                .with_managed_policies(&["AmazonSQSFullAccess".to_string()])
                .compose()
        };
        assert_eq!(build(), build());
        let properties = to_json(&build());
        assert_eq!(properties["Policies"][1]["PolicyDocument"]["Statement"].as_array().unwrap().len(), 1);
        assert_eq!(
            properties["ManagedPolicyArns"],
            json!(["arn:aws:iam::aws:policy/AmazonSQSFullAccess"])
        );
    }
}
