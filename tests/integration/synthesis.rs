//! Full synthesis runs through the library API.

use serde_json::json;
use stackforge::manifest::Manifest;
use stackforge::synth::{Synthesizer, select_classes};
use stackforge::test_utils::{full_application, init_test_logging};

use crate::common::ManifestBuilder;

fn load(toml: &str) -> Manifest {
    Manifest::from_toml_str(toml).unwrap()
}

fn orders_and_shipping_manifest() -> String {
    ManifestBuilder::new()
        .project("shop", "dev")
        .add_class("OrdersJob", |c| c.task("process"))
        .add_class("ShippingJob", |c| c.depends_on("OrdersJob").task("ship"))
        .build()
}

#[tokio::test]
async fn test_orders_shipping_wiring() {
    init_test_logging(None);
    let manifest = load(&orders_and_shipping_manifest());
    let output = Synthesizer::new(manifest.config).synthesize(&manifest.classes).await.unwrap();

    let orders = &output.child("OrdersJob").unwrap().document;
    assert_eq!(orders["Outputs"]["ProcessLambdaFunction"]["Value"], json!({"Ref": "ProcessLambdaFunction"}));
    assert_eq!(
        orders["Resources"]["ProcessLambdaFunction"]["Properties"]["FunctionName"],
        json!("shop-dev-orders-job-process")
    );

    let shipping = &output.child("ShippingJob").unwrap().document;
    let parameter = &shipping["Parameters"]["OrdersJobProcessLambdaFunction"];
    assert_eq!(parameter["Type"], json!("String"));
    assert_eq!(parameter["Description"], json!("OrdersJob.Outputs.ProcessLambdaFunction"));

    let root = &output.root.document;
    let nested = &root["Resources"]["ShippingJob"];
    assert_eq!(nested["DependsOn"], json!(["OrdersJob"]));
    assert_eq!(
        nested["Properties"]["Parameters"]["OrdersJobProcessLambdaFunction"],
        json!({"Fn::GetAtt": ["OrdersJob", "Outputs.ProcessLambdaFunction"]})
    );
    assert!(root["Resources"]["OrdersJob"].get("DependsOn").is_none());
}

#[tokio::test]
async fn test_identical_input_renders_identical_text() {
    let manifest = load(
        &ManifestBuilder::new()
            .project("shop", "prod")
            .iam_policy("logs")
            .add_class("AlertsShared", |c| c.kind("shared"))
            .add_class("PostsController", |c| c.kind("controller").task("index").task("show"))
            .add_class("OrdersJob", |c| c.policy("sqs").task("process").task_with_policy("archive", "s3"))
            .add_class("ShippingJob", |c| c.depends_on("OrdersJob").scheduled_task("ship", "rate(5 minutes)"))
            .add_class("BillingJob", |c| c.depends_on("OrdersJob").depends_on("ShippingJob").task("charge"))
            .build(),
    );
    let synthesizer = Synthesizer::new(manifest.config);

    let first = synthesizer.synthesize(&manifest.classes).await.unwrap().render_all().unwrap();
    for _ in 0..5 {
        let again = synthesizer.synthesize(&manifest.classes).await.unwrap().render_all().unwrap();
        assert_eq!(first, again);
    }
}

#[tokio::test]
async fn test_logical_ids_are_unique_per_template() {
    let output = Synthesizer::new(Default::default()).synthesize(&full_application()).await.unwrap();

    for template in output.templates() {
        let document = &template.document;
        let resources = document["Resources"].as_object().unwrap();
        if let Some(parameters) = document.get("Parameters").and_then(|p| p.as_object()) {
            for name in parameters.keys() {
                assert!(!resources.contains_key(name), "{name} is both a parameter and a resource in {}", template.name);
            }
        }
    }
}

#[tokio::test]
async fn test_empty_managed_policies_are_omitted() {
    let manifest = load(
        &ManifestBuilder::new()
            .add_class("OrdersJob", |c| c.policy("sqs").task("process"))
            .add_class("ReportsJob", |c| c.managed_policy("AmazonS3ReadOnlyAccess").task("render"))
            .build(),
    );
    let output = Synthesizer::new(manifest.config).synthesize(&manifest.classes).await.unwrap();

    let orders = &output.child("OrdersJob").unwrap().document["Resources"]["OrdersJobIamRole"]["Properties"];
    assert!(orders.get("ManagedPolicyArns").is_none());
    let root_role = &output.root.document["Resources"]["ApplicationIamRole"]["Properties"];
    assert!(root_role.get("ManagedPolicyArns").is_none());

    let reports = &output.child("ReportsJob").unwrap().document["Resources"]["ReportsJobIamRole"]["Properties"];
    assert_eq!(reports["ManagedPolicyArns"], json!(["arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess"]));
}

#[tokio::test]
async fn test_controller_gets_rest_api() {
    let output = Synthesizer::new(Default::default()).synthesize(&full_application()).await.unwrap();
    let root = &output.root.document;

    assert_eq!(root["Resources"]["RestApi"]["Type"], json!("AWS::ApiGateway::RestApi"));
    let posts = &root["Resources"]["PostsController"]["Properties"]["Parameters"];
    assert_eq!(posts["RestApi"], json!({"Ref": "RestApi"}));
    assert_eq!(posts["RootResourceId"], json!({"Fn::GetAtt": ["RestApi", "RootResourceId"]}));

    // Jobs do not receive the API parameters
    let cleanup = &root["Resources"]["CleanupJob"]["Properties"]["Parameters"];
    assert!(cleanup.get("RestApi").is_none());
    assert_eq!(
        cleanup["AlertsSharedAlertTopic"],
        json!({"Fn::GetAtt": ["AlertsShared", "Outputs.AlertTopic"]})
    );
}

#[tokio::test]
async fn test_only_selection_keeps_dependencies() {
    let manifest = load(
        &ManifestBuilder::new()
            .add_class("OrdersJob", |c| c.task("process"))
            .add_class("ShippingJob", |c| c.depends_on("OrdersJob").task("ship"))
            .add_class("CleanupJob", |c| c.task("sweep"))
            .build(),
    );
    let selected = select_classes(&manifest.classes, &["ShippingJob".to_string()]).unwrap();
    let output = Synthesizer::new(manifest.config).synthesize(&selected).await.unwrap();

    let files: Vec<&str> = output.children.iter().map(|t| t.file_name.as_str()).collect();
    assert_eq!(files, vec!["app-orders-job.yml", "app-shipping-job.yml"]);
    assert!(output.root.document["Resources"].get("CleanupJob").is_none());
}

#[tokio::test]
async fn test_extra_common_parameters_are_forwarded() {
    let manifest = load(
        &ManifestBuilder::new()
            .parameter("DatabaseUrl", "postgres://db.internal/shop")
            .add_class("OrdersJob", |c| c.task("process"))
            .build(),
    );
    let output = Synthesizer::new(manifest.config).synthesize(&manifest.classes).await.unwrap();

    let child = &output.child("OrdersJob").unwrap().document;
    assert_eq!(child["Parameters"]["DatabaseUrl"]["Type"], json!("String"));
    assert_eq!(child["Parameters"]["DatabaseUrl"]["Default"], json!("postgres://db.internal/shop"));
    assert_eq!(
        output.root.document["Resources"]["OrdersJob"]["Properties"]["Parameters"]["DatabaseUrl"],
        json!("postgres://db.internal/shop")
    );
}
