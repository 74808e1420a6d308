// JSON ingestion: the `{ "data": [...], "total": n }` payload served by the
// clipping API, or a bare array of records.
use std::fs;
use std::path::Path;

use serde_json::Value;
use shared::Materia;

use crate::error::EngineError;

pub struct JsonMateriaLoader;

impl JsonMateriaLoader {
    pub fn load_from_file(path: &Path) -> Result<Vec<Materia>, EngineError> {
        let content = fs::read_to_string(path)?;
        let records = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            records = records.len(),
            "Loaded materias from JSON"
        );
        Ok(records)
    }

    pub fn parse(content: &str) -> Result<Vec<Materia>, EngineError> {
        let payload: Value = serde_json::from_str(content)?;
        let (items, declared_total) = match payload {
            Value::Array(items) => (items, None),
            Value::Object(mut map) => {
                let total = map.get("total").and_then(Value::as_u64);
                match map.remove("data") {
                    Some(Value::Array(items)) => (items, total),
                    Some(_) => {
                        return Err(EngineError::DataFormatError(
                            "'data' must be an array of records".to_string(),
                        ))
                    }
                    None => {
                        return Err(EngineError::DataFormatError(
                            "Expected a 'data' array or a top-level array".to_string(),
                        ))
                    }
                }
            }
            other => {
                return Err(EngineError::DataFormatError(format!(
                    "Unsupported JSON payload: expected object or array, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                tracing::warn!(index = idx, kind = json_kind(&item), "Skipping non-object record");
                continue;
            }
            match serde_json::from_value::<Materia>(item) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(index = idx, error = %e, "Skipping malformed record"),
            }
        }

        if let Some(total) = declared_total {
            if total as usize != records.len() {
                tracing::debug!(
                    declared = total,
                    parsed = records.len(),
                    "Payload total differs from parsed records"
                );
            }
        }
        Ok(records)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
