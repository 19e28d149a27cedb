//! JSON schema describing the expected model response

use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use studio_domain::ExampleData;

/// Response schema for the given classes.
///
/// Attribute keys are taken from the examples, since schema-constrained
/// backends reject objects without declared properties.
pub fn response_schema(classes: &[String], examples: &[ExampleData]) -> Value {
    let attribute_keys: BTreeSet<&str> = examples
        .iter()
        .flat_map(|e| &e.extractions)
        .flat_map(|e| e.attributes.keys())
        .map(String::as_str)
        .collect();

    let mut item_properties = Map::new();
    item_properties.insert(
        "extraction_class".to_string(),
        json!({ "type": "string", "enum": classes }),
    );
    item_properties.insert("extraction_text".to_string(), json!({ "type": "string" }));

    if !attribute_keys.is_empty() {
        let properties: Map<String, Value> = attribute_keys
            .iter()
            .map(|k| (k.to_string(), json!({ "type": "string" })))
            .collect();
        item_properties.insert(
            "attributes".to_string(),
            json!({ "type": "object", "properties": properties }),
        );
    }

    json!({
        "type": "object",
        "properties": {
            "extractions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": item_properties,
                    "required": ["extraction_class", "extraction_text"]
                }
            }
        },
        "required": ["extractions"]
    })
}
