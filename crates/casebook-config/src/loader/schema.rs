//! Schema validation for Casebook JSON5 configuration layers.
//!
//! Layers are partial, so only the shape of keys that are present is checked;
//! defaults fill the rest after merging.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Expected JSON type of a leaf config value.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    String,
    Bool,
    Integer,
    Number,
    StringArray,
    OneOf(&'static [&'static str]),
}

type Section = (&'static str, &'static [(&'static str, FieldKind)]);

const SECTIONS: &[Section] = &[
    (
        "embedding",
        &[
            ("endpoint", FieldKind::String),
            ("model", FieldKind::String),
            ("api_key_env", FieldKind::String),
            (
                "task_type",
                FieldKind::OneOf(&["retrieval_query", "retrieval_document"]),
            ),
            ("dimensions", FieldKind::Integer),
            ("timeout_secs", FieldKind::Integer),
        ],
    ),
    (
        "generation",
        &[
            ("endpoint", FieldKind::String),
            ("model", FieldKind::String),
            ("api_key_env", FieldKind::String),
            ("response_modalities", FieldKind::StringArray),
            ("temperature", FieldKind::Number),
            ("search_grounding", FieldKind::Bool),
            ("timeout_secs", FieldKind::Integer),
        ],
    ),
    (
        "store",
        &[
            ("uri_env", FieldKind::String),
            ("database", FieldKind::String),
            ("collection", FieldKind::String),
            ("vector_index", FieldKind::String),
            ("text_index", FieldKind::String),
            ("num_candidates", FieldKind::Integer),
        ],
    ),
    (
        "retrieval",
        &[
            ("mode", FieldKind::OneOf(&["vector", "text", "hybrid"])),
            ("limit", FieldKind::Integer),
            ("min_score", FieldKind::Number),
        ],
    ),
    (
        "prompt",
        &[
            ("preamble", FieldKind::String),
            ("no_context_instruction", FieldKind::String),
        ],
    ),
];

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let root = expect_object(value, layer, "")?;
    for (key, value) in root {
        if key == "$schema" {
            if value.as_str().is_none() {
                return Err(invalid_field(layer, key, "expected string"));
            }
            continue;
        }
        let Some((_, fields)) = SECTIONS.iter().find(|(name, _)| *name == key.as_str()) else {
            return Err(invalid_field(layer, key, "unknown key"));
        };
        validate_section(value, fields, layer, key)?;
    }
    Ok(())
}

fn validate_section(
    value: &Value,
    fields: &[(&str, FieldKind)],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    for (key, value) in map {
        let field_path = format!("{path}.{key}");
        let Some((_, kind)) = fields.iter().find(|(name, _)| *name == key.as_str()) else {
            return Err(invalid_field(layer, &field_path, "unknown key"));
        };
        // Optional fields may be spelled out as null.
        if value.is_null() {
            continue;
        }
        check_kind(value, *kind, layer, &field_path)?;
    }
    Ok(())
}

fn check_kind(value: &Value, kind: FieldKind, layer: &str, path: &str) -> Result<(), ConfigError> {
    match kind {
        FieldKind::String if value.is_string() => Ok(()),
        FieldKind::String => Err(invalid_field(layer, path, "expected string")),
        FieldKind::Bool if value.is_boolean() => Ok(()),
        FieldKind::Bool => Err(invalid_field(layer, path, "expected bool")),
        FieldKind::Integer if value.is_u64() => Ok(()),
        FieldKind::Integer => Err(invalid_field(layer, path, "expected non-negative integer")),
        FieldKind::Number if value.is_number() => Ok(()),
        FieldKind::Number => Err(invalid_field(layer, path, "expected number")),
        FieldKind::StringArray => {
            let Value::Array(entries) = value else {
                return Err(invalid_field(layer, path, "expected array"));
            };
            match entries.iter().position(|entry| !entry.is_string()) {
                Some(idx) => Err(invalid_field(
                    layer,
                    &format!("{path}[{idx}]"),
                    "expected string",
                )),
                None => Ok(()),
            }
        }
        FieldKind::OneOf(allowed) => match value.as_str() {
            Some(text) if allowed.contains(&text) => Ok(()),
            _ => Err(invalid_field(
                layer,
                path,
                &format!("expected one of: {}", allowed.join(", ")),
            )),
        },
    }
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
