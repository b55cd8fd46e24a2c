//! CloudFormation tag array conversion

use std::collections::BTreeMap;

use serde_json::{Value, json};

/// Parse the `Tags` array of a property document into a map
///
/// Malformed entries are skipped rather than failing the whole item.
pub fn parse_tags(properties: &Value) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();

    if let Some(array) = properties.get("Tags").and_then(Value::as_array) {
        for tag in array {
            if let (Some(key), Some(value)) = (
                tag.get("Key").and_then(Value::as_str),
                tag.get("Value").and_then(Value::as_str),
            ) {
                tags.insert(key.to_string(), value.to_string());
            }
        }
    }

    tags
}

/// Build a CloudFormation `Tags` array from a tag map
pub fn build_tags(tags: &BTreeMap<String, String>) -> Vec<Value> {
    tags.iter()
        .map(|(key, value)| json!({"Key": key, "Value": value}))
        .collect()
}
