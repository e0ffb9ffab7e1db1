use crate::errors::{ToolError, ToolErrorKind};
use crate::utils::suggest::suggest;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

/// Checks `args` against the tool's input schema. `null` is treated as `{}`.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), ToolError> {
    let (Some(tool), Some(schema)) = (tool_by_name(tool_name), TOOL_VALIDATORS.get(tool_name))
    else {
        return Ok(());
    };
    let empty = Value::Object(Default::default());
    let args = if args.is_null() { &empty } else { args };
    if let Err(errors) = schema.validate(args) {
        let message = format_schema_errors(tool_name, args, errors, &tool.input_schema);
        return Err(ToolError::new(
            ToolErrorKind::InvalidParams,
            "VALIDATION_ERROR",
            message,
        )
        .with_hint(format!("help({{ tool: '{}' }})", tool_name)));
    }
    Ok(())
}

fn format_schema_errors(
    tool_name: &str,
    args: &Value,
    errors: jsonschema::ErrorIterator,
    schema: &Value,
) -> String {
    let known_fields: Vec<String> = schema
        .get("properties")
        .and_then(|v| v.as_object())
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(10) {
        let instance_path = if err.instance_path.to_string().is_empty() {
            "(root)".to_string()
        } else {
            err.instance_path.to_string()
        };
        match &err.kind {
            jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", instance_path, unknown));
                    let suggestions = suggest(unknown, &known_fields, 3);
                    if !suggestions.is_empty() {
                        did_you_means.push(format!("'{}' -> {}", unknown, suggestions.join(", ")));
                    }
                }
            }
            jsonschema::error::ValidationErrorKind::Enum { options } => {
                let allowed: Vec<String> = options
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                            .collect()
                    })
                    .unwrap_or_default();
                rendered.push(format!(
                    "{}: expected one of {}",
                    instance_path,
                    allowed.join(", ")
                ));
                let received = value_at(args, &err.instance_path.to_string());
                let suggestions = suggest(received.as_str().unwrap_or(""), &allowed, 1);
                if let Some(best) = suggestions.first() {
                    did_you_means.push(format!("{} -> {}", instance_path, best));
                }
            }
            jsonschema::error::ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!("{}: missing required field '{}'", instance_path, prop));
            }
            jsonschema::error::ValidationErrorKind::Type { kind } => {
                rendered.push(format!("{}: expected {}", instance_path, format_type_kind(kind)));
            }
            _ => rendered.push(format!("{}: {}", instance_path, err)),
        }
    }

    let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!("Did you mean: {}", did_you_means.join(" | ")));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &jsonschema::error::TypeKind) -> String {
    match kind {
        jsonschema::error::TypeKind::Single(primitive) => primitive.to_string(),
        jsonschema::error::TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            list.join(" | ")
        }
    }
}

fn value_at(root: &Value, instance_path: &str) -> Value {
    let mut current = root;
    for segment in instance_path.trim_start_matches('/').split('/') {
        if segment.is_empty() {
            continue;
        }
        current = match current {
            Value::Object(obj) => obj.get(segment).unwrap_or(&Value::Null),
            Value::Array(arr) => segment
                .parse::<usize>()
                .ok()
                .and_then(|idx| arr.get(idx))
                .unwrap_or(&Value::Null),
            _ => &Value::Null,
        };
    }
    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_loaded_with_unique_names() {
        let names: std::collections::HashSet<&str> =
            tool_catalog().iter().map(|tool| tool.name.as_str()).collect();
        assert_eq!(names.len(), tool_catalog().len());
        assert!(names.contains("query_assets"));
        assert!(names.contains("execute_graphql"));
        assert_eq!(TOOL_VALIDATORS.len(), tool_catalog().len());
    }

    #[test]
    fn unknown_field_gets_suggestion() {
        let err = validate_tool_args("query_assets", &serde_json::json!({"limt": 10})).unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert!(err.message.contains("unknown field 'limt'"));
        assert!(err.message.contains("limit"));
    }

    #[test]
    fn enum_violation_is_reported() {
        let err = validate_tool_args("query_vulnerabilities", &serde_json::json!({"severity": "CRITICL"}))
            .unwrap_err();
        assert!(err.message.contains("expected one of"));
        assert!(err.message.contains("CRITICAL"));
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = validate_tool_args("execute_graphql", &Value::Null).unwrap_err();
        assert!(err.message.contains("missing required field 'query'"));
    }

    #[test]
    fn null_args_are_fine_for_optional_tools() {
        validate_tool_args("query_assets", &Value::Null).expect("valid");
    }
}
