use std::ops::RangeInclusive;

use rmcp::model::JsonObject;
use rmcp::schemars::{self, JsonSchema};
use serde_json::{Value, json};

/// Generate the JSON schema object advertised as a tool's input schema
pub(crate) fn schema_from_type<T: JsonSchema>() -> JsonObject {
    let mut schema = match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(schema)) => schema,
        _ => JsonObject::new(),
    };
    // MCP clients expect an object schema with a properties member, even when empty
    schema
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    schema
        .entry("properties")
        .or_insert_with(|| Value::Object(JsonObject::new()));
    schema
}

/// Set a keyword on one property of an object schema, if the property exists
pub(crate) fn set_property_keyword(
    schema: &mut JsonObject,
    property: &str,
    keyword: &str,
    value: Value,
) {
    if let Some(Value::Object(property)) = schema
        .get_mut("properties")
        .and_then(|properties| properties.get_mut(property))
    {
        property.insert(keyword.to_string(), value);
    }
}

/// Advertise the inclusive bounds of an integer property
pub(crate) fn set_property_range(
    schema: &mut JsonObject,
    property: &str,
    range: &RangeInclusive<i64>,
) {
    set_property_keyword(schema, property, "minimum", json!(range.start()));
    set_property_keyword(schema, property, "maximum", json!(range.end()));
}
