//! Configuration errors abort a run before any document exists.

use stackforge::core::StackforgeError;
use stackforge::manifest::Manifest;
use stackforge::synth::{Synthesizer, write_output};
use stackforge::test_utils::ManifestFixture;

use crate::common::{ManifestBuilder, TestProject};

async fn synthesize(toml: &str) -> Result<stackforge::synth::SynthesisOutput, StackforgeError> {
    let manifest = Manifest::from_toml_str(toml)?;
    Synthesizer::new(manifest.config).synthesize(&manifest.classes).await
}

#[tokio::test]
async fn test_invalid_function_names_list_every_offender() {
    let toml = ManifestBuilder::new()
        .add_class("ReportsJob", |c| c.task("goodName_1").task("3bad").task("bad-name"))
        .build();

    let err = synthesize(&toml).await.unwrap_err();
    let StackforgeError::InvalidFunctionNames {
        invalid,
    } = &err
    else {
        panic!("expected InvalidFunctionNames, got {err:?}");
    };
    assert_eq!(invalid, &vec!["ReportsJob#3bad".to_string(), "ReportsJob#bad-name".to_string()]);
    assert!(err.is_configuration_error());
}

#[tokio::test]
async fn test_cycle_is_a_configuration_error() {
    let err = synthesize(&ManifestFixture::circular().content).await.unwrap_err();
    assert!(matches!(err, StackforgeError::CircularDependency { .. }));
    assert!(err.to_string().contains("A → B → A") || err.to_string().contains("B → A → B"));
}

#[tokio::test]
async fn test_unknown_dependency() {
    let toml = ManifestBuilder::new().add_class("ShippingJob", |c| c.depends_on("OrdersJob").task("ship")).build();
    let err = synthesize(&toml).await.unwrap_err();
    assert!(err.to_string().contains("ShippingJob -> OrdersJob"));
}

#[tokio::test]
async fn test_problems_are_reported_together() {
    let toml = ManifestBuilder::new()
        .add_class("ReportsJob", |c| c.task("3bad").scheduled_task("nightly", "every day"))
        .add_class("ShippingJob", |c| c.depends_on("MissingJob").task("ship"))
        .build();

    let err = synthesize(&toml).await.unwrap_err();
    let StackforgeError::Validation {
        problems,
    } = err
    else {
        panic!("expected Validation");
    };
    assert_eq!(problems.len(), 3);
}

#[tokio::test]
async fn test_failed_run_writes_nothing() {
    let project = TestProject::new().unwrap();
    let out_dir = project.templates_path();
    let toml = ManifestBuilder::new().add_class("ReportsJob", |c| c.task("3bad")).build();

    if let Ok(output) = synthesize(&toml).await {
        write_output(&output, &out_dir).await.unwrap();
    }
    assert!(!out_dir.exists());
}

#[test]
fn test_invalid_manifest_syntax() {
    let err = Manifest::from_toml_str(&ManifestFixture::invalid_syntax().content).unwrap_err();
    assert!(matches!(err, StackforgeError::ManifestParseError { .. }));
}
