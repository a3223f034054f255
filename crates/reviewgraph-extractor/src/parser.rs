//! Parse backend completions into the `triples` envelope

use crate::error::AttemptError;
use serde_json::Value;

/// Parse a completion and return the raw value of its `triples` field
///
/// The field value itself is not inspected; a non-array is handled by the
/// gatekeeper as zero triples.
pub fn parse_envelope(response: &str) -> Result<Value, AttemptError> {
    // LLMs sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response);

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| AttemptError::InvalidJson(e.to_string()))?;

    match json {
        Value::Object(mut obj) => obj.remove("triples").ok_or(AttemptError::MissingTriples),
        Value::Array(_) => Err(AttemptError::BareArray),
        Value::String(_) => Err(AttemptError::NotAnEnvelope("string")),
        Value::Number(_) => Err(AttemptError::NotAnEnvelope("number")),
        Value::Bool(_) => Err(AttemptError::NotAnEnvelope("boolean")),
        Value::Null => Err(AttemptError::NotAnEnvelope("null")),
    }
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> String {
    let trimmed = response.trim();

    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    // Skip first line (```json or ```) and the closing fence if present
    let lines: Vec<&str> = trimmed.lines().collect();
    let end = if lines.len() > 1 && lines[lines.len() - 1].trim() == "```" {
        lines.len() - 1
    } else {
        lines.len()
    };
    lines.get(1..end).map(|body| body.join("\n")).unwrap_or_default()
}
