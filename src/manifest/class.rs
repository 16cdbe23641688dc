//! Application class descriptors.
//!
//! An application class groups related tasks (each becoming one function) and is
//! synthesized into exactly one child template.

use serde::Deserialize;

use crate::iam::PolicyDefinition;
use crate::template::OutputFormat;

/// What an application class is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    /// HTTP handlers behind the shared REST API.
    Controller,
    /// Background work, usually scheduled.
    #[default]
    Job,
    /// Plain functions.
    Function,
    /// Declared infrastructure shared by other classes.
    Shared,
}

impl ClassKind {
    /// Directory of the handler sources for this kind.
    #[must_use]
    pub const fn handler_dir(self) -> &'static str {
        match self {
            Self::Controller => "controllers",
            Self::Job => "jobs",
            Self::Function => "functions",
            Self::Shared => "shared",
        }
    }
}

impl std::fmt::Display for ClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Controller => write!(f, "controller"),
            Self::Job => write!(f, "job"),
            Self::Function => write!(f, "function"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

/// A task method: one function in the class's template.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub iam_policy: Vec<PolicyDefinition>,
    #[serde(default)]
    pub managed_iam_policy: Vec<String>,
    #[serde(default)]
    pub memory_size: Option<u32>,
    #[serde(default)]
    pub timeout: Option<u32>,
    /// `rate(...)` or `cron(...)` expression.
    #[serde(default)]
    pub schedule: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_schedule(mut self, expression: impl Into<String>) -> Self {
        self.schedule = Some(expression.into());
        self
    }

    #[must_use]
    pub fn with_policy(mut self, definition: impl Into<PolicyDefinition>) -> Self {
        self.iam_policy.push(definition.into());
        self
    }

    #[must_use]
    pub fn with_managed_policy(mut self, name: impl Into<String>) -> Self {
        self.managed_iam_policy.push(name.into());
        self
    }

    /// Whether this task declares permissions of its own and so gets its own role.
    pub fn build_function_iam(&self) -> bool {
        !self.iam_policy.is_empty() || !self.managed_iam_policy.is_empty()
    }
}

/// A resource declared verbatim by a class, typically a shared one.
///
/// String values in `properties` may use `!Ref Id` / `!GetAtt Id.Attr` markers; targets
/// naming another declared resource of the same class follow it if its ID changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeclaredResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub properties: toml::Table,
    /// Export a `Ref` of the resource as a stack output.
    #[serde(default)]
    pub output: bool,
}

impl DeclaredResource {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            properties: toml::Table::new(),
            output: false,
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn exported(mut self) -> Self {
        self.output = true;
        self
    }
}

/// One application class descriptor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApplicationClass {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Names of classes whose outputs this class consumes.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub iam_policy: Vec<PolicyDefinition>,
    #[serde(default)]
    pub managed_iam_policy: Vec<String>,
    /// Name of the inline policy carrying this class's statements.
    #[serde(default)]
    pub policy_name: Option<String>,
    #[serde(default)]
    pub resources: Vec<DeclaredResource>,
}

impl ApplicationClass {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn job(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Job)
    }

    pub fn controller(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Controller)
    }

    pub fn shared(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Shared)
    }

    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    #[must_use]
    pub fn depends_on(mut self, class: impl Into<String>) -> Self {
        self.depends_on.push(class.into());
        self
    }

    #[must_use]
    pub fn with_policy(mut self, definition: impl Into<PolicyDefinition>) -> Self {
        self.iam_policy.push(definition.into());
        self
    }

    #[must_use]
    pub fn with_managed_policy(mut self, name: impl Into<String>) -> Self {
        self.managed_iam_policy.push(name.into());
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: DeclaredResource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Whether this class declares permissions of its own and so gets a class role.
    pub fn build_class_iam(&self) -> bool {
        !self.iam_policy.is_empty() || !self.managed_iam_policy.is_empty()
    }

    pub fn is_controller(&self) -> bool {
        self.kind == ClassKind::Controller
    }

    /// `OrdersJob` -> `orders-job`
    pub fn dashed_name(&self) -> String {
        split_words(&self.name).join("-")
    }

    /// `OrdersJob` -> `orders_job`
    pub fn underscored_name(&self) -> String {
        split_words(&self.name).join("_")
    }

    /// File name of this class's child template.
    pub fn template_file(&self, format: OutputFormat) -> String {
        format!("app-{}.{}", self.dashed_name(), format.extension())
    }

    /// Handler entry point of a task, e.g. `handlers/jobs/orders_job.process`.
    pub fn handler(&self, task: &Task) -> String {
        format!("handlers/{}/{}.{}", self.kind.handler_dir(), self.underscored_name(), task.name)
    }
}

/// Split a class name into lowercase words at case changes and separators.
fn split_words(name: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let class = ApplicationClass::job("OrdersJob");
        assert_eq!(class.dashed_name(), "orders-job");
        assert_eq!(class.underscored_name(), "orders_job");
        assert_eq!(class.template_file(OutputFormat::Yaml), "app-orders-job.yml");
        assert_eq!(class.handler(&Task::new("process")), "handlers/jobs/orders_job.process");

        assert_eq!(ApplicationClass::controller("Admin::PostsController").dashed_name(), "admin-posts-controller");
        assert_eq!(ApplicationClass::job("S3Sync").dashed_name(), "s3-sync");
    }

    #[test]
    fn test_iam_flags() {
        let plain = ApplicationClass::job("OrdersJob").with_task(Task::new("process"));
        assert!(!plain.build_class_iam());
        assert!(!plain.tasks[0].build_function_iam());

        let with_policy = ApplicationClass::job("OrdersJob")
            .with_managed_policy("AmazonS3ReadOnlyAccess")
            .with_task(Task::new("process").with_policy("sqs"));
        assert!(with_policy.build_class_iam());
        assert!(with_policy.tasks[0].build_function_iam());
    }

    #[test]
    fn test_deserialize_class() {
        let class: ApplicationClass = toml::from_str(
            r#"
            name = "AlertsShared"
            kind = "shared"

            [[resources]]
            id = "Topic"
            type = "AWS::SNS::Topic"
            output = true
            properties = { DisplayName = "alerts" }
            "#,
        )
        .unwrap();
        assert_eq!(class.kind, ClassKind::Shared);
        assert_eq!(class.resources[0].resource_type, "AWS::SNS::Topic");
        assert!(class.resources[0].output);
        assert!(class.tasks.is_empty());
    }
}
