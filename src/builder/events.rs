//! Schedules and invoke permissions.

use indexmap::IndexMap;

use crate::core::Result;
use crate::template::{Intrinsic, ResourceKind, StackDefinition, Value};

const EVENTS_PRINCIPAL: &str = "events.amazonaws.com";
const API_GATEWAY_PRINCIPAL: &str = "apigateway.amazonaws.com";

/// Add a scheduled rule targeting `function_id` and the permission letting it invoke
/// the function. Returns the rule's logical ID.
pub fn add_schedule(stack: &mut StackDefinition, task_name: &str, function_id: &str, expression: &str) -> Result<String> {
    let rule_properties = IndexMap::from([
        ("ScheduleExpression".to_string(), Value::from(expression)),
        ("State".to_string(), Value::from("ENABLED")),
        (
            "Targets".to_string(),
            Value::List(vec![Value::map([
                ("Arn", Value::Intrinsic(Intrinsic::get_att(function_id, "Arn"))),
                ("Id", Value::from(format!("{function_id}Target"))),
            ])]),
        ),
    ]);
    let rule_id = stack.add_resource(ResourceKind::EventsRule, task_name, rule_properties)?;

    let mut permission = invoke_permission(function_id, EVENTS_PRINCIPAL);
    permission.insert("SourceArn".to_string(), Value::Intrinsic(Intrinsic::get_att(&rule_id, "Arn")));
    stack.add_resource(ResourceKind::Permission, &format!("{task_name}-events"), permission)?;
    Ok(rule_id)
}

/// Let the shared REST API invoke a controller function.
pub fn add_api_permission(stack: &mut StackDefinition, task_name: &str, function_id: &str) -> Result<String> {
    stack.add_resource(
        ResourceKind::Permission,
        &format!("{task_name}-api"),
        invoke_permission(function_id, API_GATEWAY_PRINCIPAL),
    )
}

fn invoke_permission(function_id: &str, principal: &str) -> IndexMap<String, Value> {
    IndexMap::from([
        ("FunctionName".to_string(), Value::Intrinsic(Intrinsic::get_att(function_id, "Arn"))),
        ("Action".to_string(), Value::from("lambda:InvokeFunction")),
        ("Principal".to_string(), Value::from(principal)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{LogicalIdRegistry, serialize};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_schedule_rule_and_permission() {
        let mut stack = StackDefinition::child("OrdersJob", Arc::new(LogicalIdRegistry::new()));
        let function = stack.add_resource(ResourceKind::Function, "process", IndexMap::new()).unwrap();
        let rule = add_schedule(&mut stack, "process", &function, "rate(5 minutes)").unwrap();
        assert_eq!(rule, "ProcessEventsRule");

        let doc = serialize(&mut stack).unwrap();
        let permission = &doc["Resources"]["ProcessEventsPermission"];
        assert_eq!(permission["Properties"]["Principal"], json!("events.amazonaws.com"));
        assert_eq!(permission["Properties"]["SourceArn"], json!({"Fn::GetAtt": ["ProcessEventsRule", "Arn"]}));
        assert_eq!(
            doc["Resources"]["ProcessEventsRule"]["Properties"]["Targets"][0]["Arn"],
            json!({"Fn::GetAtt": ["ProcessLambdaFunction", "Arn"]})
        );
    }

    #[test]
    fn test_api_permission() {
        let mut stack = StackDefinition::child("PostsController", Arc::new(LogicalIdRegistry::new()));
        let function = stack.add_resource(ResourceKind::Function, "index", IndexMap::new()).unwrap();
        let id = add_api_permission(&mut stack, "index", &function).unwrap();
        assert_eq!(id, "IndexApiPermission");
        assert_eq!(
            stack.resource(&id).unwrap().property("Principal"),
            Some(&Value::from("apigateway.amazonaws.com"))
        );
    }
}
