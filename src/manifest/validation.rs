//! Descriptor validation.
//!
//! Every check here is a pure function of the descriptors and reports everything it finds,
//! so a user fixing a manifest sees all problems in one run instead of one per attempt.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::class::ApplicationClass;
use crate::core::StackforgeError;
use crate::iam::MAX_POLICY_NAME_LEN;

const FUNCTION_NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*$";

static FUNCTION_NAME_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(FUNCTION_NAME_PATTERN).ok());

/// Whether `name` can be used as a task method name.
pub fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME_RE.as_ref().is_some_and(|re| re.is_match(name))
}

/// Check every task name of every class.
///
/// Fails with one [`StackforgeError::InvalidFunctionNames`] listing each offending
/// `Class#method`, in declaration order.
pub fn validate_function_names<'a>(
    classes: impl IntoIterator<Item = &'a ApplicationClass>,
) -> Result<(), StackforgeError> {
    let invalid: Vec<String> = classes
        .into_iter()
        .flat_map(|class| {
            class
                .tasks
                .iter()
                .filter(|task| !is_valid_function_name(&task.name))
                .map(move |task| format!("{}#{}", class.name, task.name))
        })
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(StackforgeError::InvalidFunctionNames {
            invalid,
        })
    }
}

/// Check configured inline policy names against the platform ceiling.
pub fn validate_policy_names<'a>(
    classes: impl IntoIterator<Item = &'a ApplicationClass>,
) -> Result<(), StackforgeError> {
    let names: Vec<String> = classes
        .into_iter()
        .filter_map(|class| {
            class
                .policy_name
                .as_ref()
                .filter(|name| name.len() > MAX_POLICY_NAME_LEN)
                .map(|name| format!("{}: {name}", class.name))
        })
        .collect();

    if names.is_empty() {
        Ok(())
    } else {
        Err(StackforgeError::PolicyNamesTooLong {
            names,
            max: MAX_POLICY_NAME_LEN,
        })
    }
}

/// Check that every `depends_on` entry names a known class.
pub fn validate_dependency_targets(classes: &[ApplicationClass]) -> Result<(), StackforgeError> {
    let known: HashSet<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    let missing: Vec<String> = classes
        .iter()
        .flat_map(|class| {
            class
                .depends_on
                .iter()
                .filter(|dep| !known.contains(dep.as_str()))
                .map(move |dep| format!("{} -> {dep}", class.name))
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StackforgeError::UnknownDependencies {
            missing,
        })
    }
}

/// Structural checks: class names, template file names, task names, schedules and
/// declared resource IDs.
///
/// Two classes whose names differ only in case boundaries or separators (`OrdersJob`,
/// `Orders_Job`) would share one template file and one function-name prefix, so they
/// are rejected.
pub fn validate_structure(classes: &[ApplicationClass]) -> Vec<StackforgeError> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    let mut dashed: HashMap<String, &str> = HashMap::new();

    for class in classes {
        if class.name.trim().is_empty() {
            problems.push(config_error("Application class with an empty name"));
            continue;
        }
        if !seen.insert(class.name.as_str()) {
            problems.push(config_error(format!("Application class '{}' is declared more than once", class.name)));
        } else {
            let file = class.dashed_name();
            if let Some(first) = dashed.insert(file.clone(), class.name.as_str()) {
                problems.push(config_error(format!(
                    "Application classes '{first}' and '{}' both map to template 'app-{file}'",
                    class.name
                )));
            }
        }

        let mut task_names = HashSet::new();
        for task in &class.tasks {
            if !task_names.insert(task.name.as_str()) {
                problems.push(config_error(format!("{}#{} is declared more than once", class.name, task.name)));
            }
            if let Some(schedule) = &task.schedule
                && !is_schedule_expression(schedule)
            {
                problems.push(config_error(format!(
                    "{}#{} has schedule '{}'; expected rate(...) or cron(...)",
                    class.name, task.name, schedule
                )));
            }
        }

        let mut ids = HashSet::new();
        for resource in &class.resources {
            if resource.id.trim().is_empty() || resource.resource_type.trim().is_empty() {
                problems.push(config_error(format!(
                    "{} declares a resource without an id or type",
                    class.name
                )));
            } else if !ids.insert(resource.id.as_str()) {
                problems.push(config_error(format!(
                    "{} declares resource '{}' more than once",
                    class.name, resource.id
                )));
            }
        }
    }
    problems
}

fn is_schedule_expression(expression: &str) -> bool {
    let expression = expression.trim();
    (expression.starts_with("rate(") || expression.starts_with("cron(")) && expression.ends_with(')')
}

fn config_error(message: impl Into<String>) -> StackforgeError {
    StackforgeError::ConfigError {
        message: message.into(),
    }
}
