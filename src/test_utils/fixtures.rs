//! Sample descriptors and manifests.

use crate::manifest::{ApplicationClass, DeclaredResource, Task};

/// `OrdersJob` with one task and `ShippingJob` consuming its outputs.
pub fn orders_and_shipping() -> Vec<ApplicationClass> {
    vec![
        ApplicationClass::job("OrdersJob").with_task(Task::new("process")),
        ApplicationClass::job("ShippingJob").depends_on("OrdersJob").with_task(Task::new("ship")),
    ]
}

/// A controller, a scheduled job with its own permissions and a shared class.
pub fn full_application() -> Vec<ApplicationClass> {
    vec![
        ApplicationClass::shared("AlertsShared")
            .with_resource(DeclaredResource::new("AlertTopic", "AWS::SNS::Topic").exported()),
        ApplicationClass::controller("PostsController")
            .with_task(Task::new("index"))
            .with_task(Task::new("show")),
        ApplicationClass::job("CleanupJob")
            .depends_on("AlertsShared")
            .with_policy("s3")
            .with_task(Task::new("sweep").with_schedule("rate(1 hour)")),
    ]
}

/// Sample `stackforge.toml` contents.
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    pub content: String,
    pub name: String,
}

impl ManifestFixture {
    /// Two jobs wired together.
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            content: r#"
[project]
name = "shop"
env = "dev"

[[classes]]
name = "OrdersJob"

[[classes.tasks]]
name = "process"

[[classes]]
name = "ShippingJob"
depends_on = ["OrdersJob"]

[[classes.tasks]]
name = "ship"
"#
            .trim()
            .to_string(),
        }
    }

    /// Two classes depending on each other.
    pub fn circular() -> Self {
        Self {
            name: "circular".to_string(),
            content: r#"
[[classes]]
name = "A"
depends_on = ["B"]

[[classes]]
name = "B"
depends_on = ["A"]
"#
            .trim()
            .to_string(),
        }
    }

    /// Manifest with invalid syntax.
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: r#"
[project
name = "shop"
"#
            .trim()
            .to_string(),
        }
    }
}
