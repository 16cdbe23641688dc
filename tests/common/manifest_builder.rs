//! Fluent builder for creating stackforge.toml manifests in tests
//!
//! ```rust,ignore
//! use crate::common::ManifestBuilder;
//!
//! let manifest = ManifestBuilder::new()
//!     .project("shop", "dev")
//!     .add_class("OrdersJob", |c| c.task("process"))
//!     .add_class("ShippingJob", |c| c.depends_on("OrdersJob").task("ship"))
//!     .build();
//! ```

/// Builder for test manifests
#[derive(Default, Debug)]
pub struct ManifestBuilder {
    project: Option<(String, String)>,
    iam_policies: Vec<String>,
    managed_policies: Vec<String>,
    format: Option<String>,
    template_url_prefix: Option<String>,
    parameters: Vec<(String, String)>,
    classes: Vec<ClassEntry>,
}

/// One `[[classes]]` entry
#[derive(Default, Debug, Clone)]
pub struct ClassEntry {
    name: String,
    kind: Option<String>,
    depends_on: Vec<String>,
    iam_policies: Vec<String>,
    managed_policies: Vec<String>,
    tasks: Vec<TaskEntry>,
}

#[derive(Default, Debug, Clone)]
struct TaskEntry {
    name: String,
    schedule: Option<String>,
    iam_policies: Vec<String>,
}

impl ClassEntry {
    /// Set the class kind (controller, job, function, shared)
    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn depends_on(mut self, class: &str) -> Self {
        self.depends_on.push(class.to_string());
        self
    }

    /// Add a shorthand inline policy
    pub fn policy(mut self, policy: &str) -> Self {
        self.iam_policies.push(policy.to_string());
        self
    }

    pub fn managed_policy(mut self, policy: &str) -> Self {
        self.managed_policies.push(policy.to_string());
        self
    }

    pub fn task(mut self, name: &str) -> Self {
        self.tasks.push(TaskEntry {
            name: name.to_string(),
            ..TaskEntry::default()
        });
        self
    }

    pub fn scheduled_task(mut self, name: &str, schedule: &str) -> Self {
        self.tasks.push(TaskEntry {
            name: name.to_string(),
            schedule: Some(schedule.to_string()),
            ..TaskEntry::default()
        });
        self
    }

    /// Add a task with its own shorthand inline policy
    pub fn task_with_policy(mut self, name: &str, policy: &str) -> Self {
        self.tasks.push(TaskEntry {
            name: name.to_string(),
            iam_policies: vec![policy.to_string()],
            ..TaskEntry::default()
        });
        self
    }
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, name: &str, env: &str) -> Self {
        self.project = Some((name.to_string(), env.to_string()));
        self
    }

    /// Add an application-wide shorthand inline policy
    pub fn iam_policy(mut self, policy: &str) -> Self {
        self.iam_policies.push(policy.to_string());
        self
    }

    pub fn managed_policy(mut self, policy: &str) -> Self {
        self.managed_policies.push(policy.to_string());
        self
    }

    /// Set `[output] format`
    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn template_url_prefix(mut self, prefix: &str) -> Self {
        self.template_url_prefix = Some(prefix.to_string());
        self
    }

    /// Add an extra common parameter
    pub fn parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.push((name.to_string(), value.to_string()));
        self
    }

    pub fn add_class(mut self, name: &str, configure: impl FnOnce(ClassEntry) -> ClassEntry) -> Self {
        let entry = configure(ClassEntry {
            name: name.to_string(),
            ..ClassEntry::default()
        });
        self.classes.push(entry);
        self
    }

    /// Build the manifest TOML string
    pub fn build(self) -> String {
        fn string_list(items: &[String]) -> String {
            let quoted: Vec<String> = items.iter().map(|i| format!("\"{i}\"")).collect();
            format!("[{}]", quoted.join(", "))
        }

        let mut toml = String::new();

        if let Some((name, env)) = &self.project {
            toml.push_str(&format!("[project]\nname = \"{name}\"\nenv = \"{env}\"\n\n"));
        }

        if !self.iam_policies.is_empty() || !self.managed_policies.is_empty() {
            toml.push_str("[iam]\n");
            if !self.iam_policies.is_empty() {
                toml.push_str(&format!("policy = {}\n", string_list(&self.iam_policies)));
            }
            if !self.managed_policies.is_empty() {
                toml.push_str(&format!("managed_policy = {}\n", string_list(&self.managed_policies)));
            }
            toml.push('\n');
        }

        if self.format.is_some() || self.template_url_prefix.is_some() {
            toml.push_str("[output]\n");
            if let Some(format) = &self.format {
                toml.push_str(&format!("format = \"{format}\"\n"));
            }
            if let Some(prefix) = &self.template_url_prefix {
                toml.push_str(&format!("template_url_prefix = \"{prefix}\"\n"));
            }
            toml.push('\n');
        }

        if !self.parameters.is_empty() {
            toml.push_str("[parameters]\n");
            for (name, value) in &self.parameters {
                toml.push_str(&format!("{name} = \"{value}\"\n"));
            }
            toml.push('\n');
        }

        for class in &self.classes {
            toml.push_str(&format!("[[classes]]\nname = \"{}\"\n", class.name));
            if let Some(kind) = &class.kind {
                toml.push_str(&format!("kind = \"{kind}\"\n"));
            }
            if !class.depends_on.is_empty() {
                toml.push_str(&format!("depends_on = {}\n", string_list(&class.depends_on)));
            }
            if !class.iam_policies.is_empty() {
                toml.push_str(&format!("iam_policy = {}\n", string_list(&class.iam_policies)));
            }
            if !class.managed_policies.is_empty() {
                toml.push_str(&format!("managed_iam_policy = {}\n", string_list(&class.managed_policies)));
            }
            toml.push('\n');

            for task in &class.tasks {
                toml.push_str(&format!("[[classes.tasks]]\nname = \"{}\"\n", task.name));
                if let Some(schedule) = &task.schedule {
                    toml.push_str(&format!("schedule = \"{schedule}\"\n"));
                }
                if !task.iam_policies.is_empty() {
                    toml.push_str(&format!("iam_policy = {}\n", string_list(&task.iam_policies)));
                }
                toml.push('\n');
            }
        }

        toml
    }
}
