//! Template rewriting end to end: local files and deployed stacks.

mod common;

use common::{layer, FakeLayerRegistry, FakeStackApi};
use lamina::error::ApiError;
use lamina::template::TemplateRewriter;
use lamina::types::ORIGINAL_HANDLER_VAR;
use serde_json::Value;
use tempfile::TempDir;

const TEMPLATE: &str = r#"{
    "AWSTemplateFormatVersion": "2010-09-09",
    "Description": "Orders service",
    "Resources": {
        "OrdersFunction": {
            "Type": "AWS::Lambda::Function",
            "Properties": {
                "FunctionName": "orders",
                "Runtime": "python3.12",
                "Handler": "app.handler",
                "MemorySize": 256,
                "Timeout": 30
            }
        },
        "OrdersTable": {
            "Type": "AWS::DynamoDB::Table",
            "Properties": {"TableName": "orders"}
        }
    }
}"#;

fn registry_with_one_layer() -> FakeLayerRegistry {
    FakeLayerRegistry {
        layers: vec![layer("lamina-python", 12)],
    }
}

#[tokio::test]
async fn rewrites_a_local_template_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("template.json");
    let output = temp_dir.path().join("out.json");
    std::fs::write(&input, TEMPLATE).unwrap();

    let registry = registry_with_one_layer();
    let rewriter = TemplateRewriter::new(&registry, "us-east-1");
    rewriter
        .rewrite_file(&input, "orders", output.to_str().unwrap())
        .await
        .unwrap();

    let rewritten: Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let props = &rewritten["Resources"]["OrdersFunction"]["Properties"];
    assert_eq!(props["Handler"], "lamina_wrapper.handler");
    assert_eq!(
        props["Environment"]["Variables"][ORIGINAL_HANDLER_VAR],
        "app.handler"
    );
    assert_eq!(
        props["Layers"][0],
        layer("lamina-python", 12).arn.as_str()
    );

    // Unrelated content survives the rewrite untouched.
    let original: Value = serde_json::from_str(TEMPLATE).unwrap();
    assert_eq!(
        rewritten["Resources"]["OrdersTable"],
        original["Resources"]["OrdersTable"]
    );
    assert_eq!(rewritten["Description"], original["Description"]);
    assert_eq!(props["MemorySize"], original["Resources"]["OrdersFunction"]["Properties"]["MemorySize"]);
}

#[tokio::test]
async fn missing_function_leaves_the_destination_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("template.json");
    let output = temp_dir.path().join("out.json");
    std::fs::write(&input, TEMPLATE).unwrap();

    let registry = registry_with_one_layer();
    let rewriter = TemplateRewriter::new(&registry, "us-east-1");
    let result = rewriter
        .rewrite_file(&input, "payments", output.to_str().unwrap())
        .await;

    assert!(matches!(result, Err(ApiError::ResourceNotFound(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn ambiguous_layer_listing_leaves_the_destination_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("template.json");
    let output = temp_dir.path().join("out.json");
    std::fs::write(&input, TEMPLATE).unwrap();

    let registry = FakeLayerRegistry {
        layers: vec![layer("lamina-python", 11), layer("lamina-python-dev", 2)],
    };
    let rewriter = TemplateRewriter::new(&registry, "us-east-1");
    let result = rewriter
        .rewrite_file(&input, "orders", output.to_str().unwrap())
        .await;

    assert!(matches!(result, Err(ApiError::AmbiguousLayer { .. })));
    assert!(!output.exists());
}

#[tokio::test]
async fn duplicate_resources_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("template.json");
    let output = temp_dir.path().join("out.json");
    let mut template: Value = serde_json::from_str(TEMPLATE).unwrap();
    template["Resources"]["OrdersCopy"] = serde_json::json!({
        "Type": "AWS::Serverless::Function",
        "Properties": {"FunctionName": "orders", "Runtime": "python3.12", "Handler": "app.handler"}
    });
    std::fs::write(&input, serde_json::to_string(&template).unwrap()).unwrap();

    let registry = registry_with_one_layer();
    let rewriter = TemplateRewriter::new(&registry, "us-east-1");
    let result = rewriter
        .rewrite_file(&input, "orders", output.to_str().unwrap())
        .await;

    assert!(matches!(result, Err(ApiError::AmbiguousResource { .. })));
    assert!(!output.exists());
}

#[tokio::test]
async fn deployed_stack_template_is_fetched_rewritten_and_pushed() {
    let registry = registry_with_one_layer();
    let rewriter = TemplateRewriter::new(&registry, "us-east-1");
    let stack_api = FakeStackApi::new(TEMPLATE);

    rewriter
        .rewrite_stack(&stack_api, "orders-stack", "orders")
        .await
        .unwrap();

    let pushed: Value =
        serde_json::from_str(&stack_api.pushed_template().expect("template pushed")).unwrap();
    assert_eq!(
        pushed["Resources"]["OrdersFunction"]["Properties"]["Handler"],
        "lamina_wrapper.handler"
    );
}

#[tokio::test]
async fn stack_rewrite_failure_pushes_nothing() {
    let registry = registry_with_one_layer();
    let rewriter = TemplateRewriter::new(&registry, "us-east-1");
    let stack_api = FakeStackApi::new(TEMPLATE);

    let result = rewriter
        .rewrite_stack(&stack_api, "orders-stack", "payments")
        .await;

    assert!(matches!(result, Err(ApiError::ResourceNotFound(_))));
    assert!(stack_api.pushed_template().is_none());
}
