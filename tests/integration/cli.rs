//! The `stackforge` binary.

use predicates::prelude::*;

use crate::common::{ManifestBuilder, TestProject};

fn orders_and_shipping() -> String {
    ManifestBuilder::new()
        .project("shop", "dev")
        .add_class("OrdersJob", |c| c.task("process"))
        .add_class("ShippingJob", |c| c.depends_on("OrdersJob").task("ship"))
        .build()
}

#[test]
fn test_synth_writes_every_template() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&orders_and_shipping()).unwrap();

    project
        .stackforge()
        .arg("synth")
        .assert()
        .success()
        .stdout(predicate::str::contains("Synthesized 3 templates"));

    let root = project.read_template("stackforge-root.yml").unwrap();
    assert!(root.contains("AWSTemplateFormatVersion"));
    assert!(root.contains("templates/app-shipping-job.yml"));
    assert!(project.templates_path().join("app-orders-job.yml").exists());
    assert!(project.templates_path().join("app-shipping-job.yml").exists());
}

#[test]
fn test_synth_json_with_env_override() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&orders_and_shipping()).unwrap();

    project.stackforge().args(["synth", "--format", "json"]).env("STACKFORGE_ENV", "prod").assert().success();

    let child = project.read_template("app-orders-job.json").unwrap();
    let document: serde_json::Value = serde_json::from_str(&child).unwrap();
    assert_eq!(
        document["Resources"]["ProcessLambdaFunction"]["Properties"]["FunctionName"],
        serde_json::json!("shop-prod-orders-job-process")
    );
}

#[test]
fn test_env_flag_beats_environment_variable() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&orders_and_shipping()).unwrap();

    project
        .stackforge()
        .args(["synth", "--format", "json", "--env", "staging"])
        .env("STACKFORGE_ENV", "prod")
        .assert()
        .success();

    let child = project.read_template("app-orders-job.json").unwrap();
    assert!(child.contains("shop-staging-orders-job-process"));
}

#[test]
fn test_synth_dry_run_writes_nothing() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&orders_and_shipping()).unwrap();

    project
        .stackforge()
        .args(["synth", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stackforge-root.yml"))
        .stdout(predicate::str::contains("app-orders-job.yml"));
    assert!(!project.templates_path().exists());
}

#[test]
fn test_synth_fails_on_invalid_names() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest(&ManifestBuilder::new().add_class("ReportsJob", |c| c.task("3bad").task("bad-name")).build())
        .unwrap();

    project
        .stackforge()
        .arg("synth")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ReportsJob#3bad"))
        .stderr(predicate::str::contains("ReportsJob#bad-name"));
    assert!(!project.templates_path().exists());
}

#[test]
fn test_validate() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&orders_and_shipping()).unwrap();

    project.stackforge().arg("validate").assert().success().stdout(predicate::str::contains("is valid"));

    project
        .stackforge()
        .args(["validate", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"));
}

#[test]
fn test_validate_reports_cycle() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest(
            &ManifestBuilder::new()
                .add_class("A", |c| c.depends_on("B"))
                .add_class("B", |c| c.depends_on("A"))
                .build(),
        )
        .unwrap();

    project.stackforge().arg("validate").assert().failure().stderr(predicate::str::contains("Circular dependency"));
}

#[test]
fn test_validate_reports_unresolved_marker() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest(
            r#"
[[classes]]
name = "OrdersJob"
iam_policy = [{ Action = ["sqs:SendMessage"], Effect = "Allow", Resource = "!GetAtt Queue.Arn" }]

[[classes.tasks]]
name = "process"
"#,
        )
        .unwrap();

    project
        .stackforge()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("!GetAtt Queue.Arn"));
}

#[test]
fn test_graph_json() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&orders_and_shipping()).unwrap();

    let output = project.stackforge().args(["graph", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["classes"]["ShippingJob"], serde_json::json!(["OrdersJob"]));
    assert_eq!(json["layers"], serde_json::json!([["OrdersJob"], ["ShippingJob"]]));
}

#[test]
fn test_missing_manifest() {
    let project = TestProject::new().unwrap();
    project.stackforge().arg("validate").assert().failure();
}

#[test]
fn test_manifest_path_flag() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&orders_and_shipping()).unwrap();
    let elsewhere = tempfile::tempdir().unwrap();

    let mut cmd = project.stackforge();
    cmd.current_dir(elsewhere.path())
        .args(["validate", "--manifest-path"])
        .arg(project.manifest_path())
        .assert()
        .success();
}
