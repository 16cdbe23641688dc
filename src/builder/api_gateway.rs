//! The shared REST API declared in the root template when any controller exists.

use indexmap::IndexMap;

use crate::config::SynthConfig;
use crate::core::Result;
use crate::template::{Intrinsic, PseudoParam, ResourceKind, StackDefinition, Value};

/// Logical ID requested for the REST API.
pub const REST_API_NAME: &str = "RestApi";

/// Properties of the REST API resource.
pub fn rest_api_properties(config: &SynthConfig) -> IndexMap<String, Value> {
    let api = &config.api;

    let mut endpoint = IndexMap::new();
    endpoint.insert("Types".to_string(), Value::strings(api.endpoint_type.to_vec()));
    if !api.vpc_endpoint_ids.is_empty() {
        endpoint.insert("VpcEndpointIds".to_string(), Value::strings(api.vpc_endpoint_ids.iter().cloned()));
    }

    let mut properties = IndexMap::new();
    properties.insert("Name".to_string(), Value::from(config.name_prefix()));
    properties.insert("EndpointConfiguration".to_string(), Value::Map(endpoint));
    if !api.binary_media_types.is_empty() {
        properties.insert("BinaryMediaTypes".to_string(), Value::strings(api.binary_media_types.iter().cloned()));
    }
    if let Some(policy) = api.endpoint_policy.as_ref().filter(|p| !is_empty_json(p)) {
        properties.insert("Policy".to_string(), Value::from_json(policy));
    }
    properties
}

/// Declare the REST API in `stack` along with its `RestApi`, `Region` and
/// `RootResourceId` outputs. Returns the API's logical ID.
pub fn add_rest_api(stack: &mut StackDefinition, config: &SynthConfig) -> Result<String> {
    let id = stack.add_resource(ResourceKind::RestApi, REST_API_NAME, rest_api_properties(config))?;
    stack.add_output("RestApi", Intrinsic::reference(id.clone()))?;
    stack.add_output("Region", Intrinsic::Pseudo(PseudoParam::Region))?;
    stack.add_output("RootResourceId", Intrinsic::get_att(id.clone(), "RootResourceId"))?;
    Ok(id)
}

fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}
