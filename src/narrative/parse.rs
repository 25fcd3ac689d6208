use serde::de::DeserializeOwned;
use serde_json::{Deserializer, Value};

use crate::error::GenerationError;

/// Extract the first complete JSON object from raw model output, tolerating
/// code fences and prose before or after it, braces included.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    raw.match_indices('{').find_map(|(start, _)| {
        let mut values = Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(_))) => Some(&raw[start..start + values.byte_offset()]),
            _ => None,
        }
    })
}

/// Decode model output into `T`. Text that holds no JSON object is
/// malformed; a JSON object of the wrong shape fails the schema.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| GenerationError::MalformedOutput("no JSON object in reply".to_string()))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| GenerationError::Schema(e.to_string()))
}
