//! Parse LLM output into raw extractions

use crate::error::ExtractorError;
use crate::types::RawExtraction;
use serde_json::{Map, Value};
use studio_domain::Attributes;
use tracing::warn;

/// Suffix marking an attribute object in the keyed item form
const ATTRIBUTE_SUFFIX: &str = "_attributes";

/// Items recovered from one model response
#[derive(Debug, Default)]
pub struct ParsedResponse {
    /// Well-formed extractions in response order
    pub extractions: Vec<RawExtraction>,

    /// Items skipped because they were malformed
    pub skipped: usize,
}

/// Parse an LLM response.
///
/// Accepts `{"extractions": [...]}` or a bare array, optionally wrapped in a
/// markdown code block. Each item is either
/// `{"extraction_class", "extraction_text", "attributes"}` or the keyed form
/// `{"<class>": "<text>", "<class>_attributes": {...}}`.
pub fn parse_llm_response(response: &str) -> Result<ParsedResponse, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let items = match json {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("extractions") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            _ => {
                return Err(ExtractorError::InvalidFormat(
                    "Expected an \"extractions\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ExtractorError::InvalidFormat(
                "Expected a JSON object or array".to_string(),
            ))
        }
    };

    let mut parsed = ParsedResponse::default();
    for (idx, item) in items.iter().enumerate() {
        match parse_item(item) {
            Ok(extractions) => parsed.extractions.extend(extractions),
            Err(e) => {
                warn!("Skipping extraction {}: {}", idx, e);
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

/// Extract JSON from response, handling markdown code blocks and chatter
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ExtractorError::InvalidFormat("Empty response".to_string()));
    }

    if let Some(fence_start) = trimmed.find("```") {
        let after_fence = &trimmed[fence_start + 3..];
        // a language tag may be followed by a newline or run straight into the body
        let body = after_fence.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        let body = body.find("```").map_or(body, |end| &body[..end]);
        if body.trim().is_empty() {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }
        return Ok(body.trim());
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    // prose around the payload
    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Err(ExtractorError::InvalidFormat(
            "No JSON found in response".to_string(),
        )),
    }
}

/// Parse one item; the keyed form may carry several classes
fn parse_item(item: &Value) -> Result<Vec<RawExtraction>, String> {
    let obj = item
        .as_object()
        .ok_or_else(|| "Extraction is not a JSON object".to_string())?;

    if obj.contains_key("extraction_class") || obj.contains_key("extraction_text") {
        return parse_explicit(obj).map(|e| vec![e]);
    }

    let mut extractions = Vec::new();
    for (key, value) in obj {
        if key.ends_with(ATTRIBUTE_SUFFIX) || key == "extraction_index" {
            continue;
        }
        let text = value
            .as_str()
            .ok_or_else(|| format!("Value of '{}' is not a string", key))?;
        let attributes = obj
            .get(&format!("{}{}", key, ATTRIBUTE_SUFFIX))
            .map(coerce_attributes)
            .unwrap_or_default();
        extractions.push(raw(key, text, attributes)?);
    }

    if extractions.is_empty() {
        return Err("Extraction has no class".to_string());
    }
    Ok(extractions)
}

fn parse_explicit(obj: &Map<String, Value>) -> Result<RawExtraction, String> {
    let class = obj
        .get("extraction_class")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing or invalid 'extraction_class'".to_string())?;

    let text = obj
        .get("extraction_text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing or invalid 'extraction_text'".to_string())?;

    let attributes = obj
        .get("attributes")
        .map(coerce_attributes)
        .unwrap_or_default();

    raw(class, text, attributes)
}

fn raw(class: &str, text: &str, attributes: Attributes) -> Result<RawExtraction, String> {
    if class.trim().is_empty() {
        return Err("Empty 'extraction_class'".to_string());
    }
    if text.trim().is_empty() {
        return Err(format!("Empty text for class '{}'", class));
    }
    Ok(RawExtraction {
        extraction_class: class.trim().to_string(),
        extraction_text: text.trim().to_string(),
        attributes,
    })
}

/// Attribute values as strings; lists are joined with ", "
fn coerce_attributes(value: &Value) -> Attributes {
    let Some(obj) = value.as_object() else {
        return Attributes::new();
    };
    obj.iter()
        .filter_map(|(k, v)| coerce_value(v).map(|v| (k.clone(), v)))
        .collect()
}

fn coerce_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(coerce_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}
