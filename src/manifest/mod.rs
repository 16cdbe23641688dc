//! Manifest parsing and descriptor validation.
//!
//! A manifest (`stackforge.toml`) holds the application-wide [`SynthConfig`] tables
//! together with one `[[classes]]` entry per application class:
//!
//! ```toml
//! [project]
//! name = "shop"
//!
//! [[classes]]
//! name = "OrdersJob"
//! kind = "job"
//! iam_policy = ["sqs"]
//!
//! [[classes.tasks]]
//! name = "process"
//! schedule = "rate(5 minutes)"
//!
//! [[classes]]
//! name = "ShippingJob"
//! depends_on = ["OrdersJob"]
//!
//! [[classes.tasks]]
//! name = "ship"
//! ```
//!
//! # Modules
//!
//! - `class` - application class, task and declared-resource descriptors
//! - `helpers` - manifest discovery in the directory hierarchy
//! - `validation` - checks that run before any template is built

pub mod class;
pub mod helpers;
pub mod validation;

pub use class::{ApplicationClass, ClassKind, DeclaredResource, Task};
pub use helpers::{find_manifest, find_manifest_from, find_manifest_with_optional};
pub use validation::{
    is_valid_function_name, validate_dependency_targets, validate_function_names, validate_policy_names,
    validate_structure,
};

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::config::{SynthConfig, parse_config, parse_config_str};
use crate::core::Result;

/// Name of the manifest file searched for by [`find_manifest`].
pub const MANIFEST_FILE_NAME: &str = "stackforge.toml";

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(flatten)]
    pub config: SynthConfig,
    #[serde(default)]
    pub classes: Vec<ApplicationClass>,
}

impl Manifest {
    /// Load a manifest from disk and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut manifest: Self = parse_config(path)?;
        manifest.config.apply_env_overrides();
        debug!("Loaded {} application classes from {}", manifest.classes.len(), path.display());
        Ok(manifest)
    }

    /// Parse manifest text. Environment overrides are not applied.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_config_str(content, MANIFEST_FILE_NAME)
    }

    pub fn class(&self, name: &str) -> Option<&ApplicationClass> {
        self.classes.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_toml_str(
            r#"
            [project]
            name = "shop"

            [iam]
            policy = ["logs", "s3"]

            [[classes]]
            name = "OrdersJob"
            iam_policy = ["sqs"]

            [[classes.tasks]]
            name = "process"
            schedule = "rate(5 minutes)"

            [[classes]]
            name = "ShippingJob"
            depends_on = ["OrdersJob"]

            [[classes.tasks]]
            name = "ship"
            "#,
        )
        .unwrap();

        assert_eq!(manifest.config.project.name, "shop");
        assert_eq!(manifest.config.project.env, "dev");
        assert_eq!(manifest.config.iam.policy.len(), 2);
        assert_eq!(manifest.classes.len(), 2);
        let orders = manifest.class("OrdersJob").unwrap();
        assert_eq!(orders.kind, ClassKind::Job);
        assert_eq!(orders.tasks[0].schedule.as_deref(), Some("rate(5 minutes)"));
        assert_eq!(manifest.class("ShippingJob").unwrap().depends_on, vec!["OrdersJob"]);
    }

    #[test]
    fn test_missing_name_is_a_parse_error() {
        let err = Manifest::from_toml_str("[[classes]]\nkind = \"job\"").unwrap_err();
        assert!(matches!(err, crate::core::StackforgeError::ManifestParseError { .. }));
    }
}
