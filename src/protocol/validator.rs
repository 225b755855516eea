//! Input checks for experiment descriptors
//!
//! Runs before prompt building so malformed input never reaches the
//! completion service or the local generator.

use super::ExperimentDescriptor;
use serde_json::Value;
use thiserror::Error;

/// Malformed or missing required input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }
}

/// Validate an untyped JSON value and convert it into a descriptor
pub fn validate_value(value: &Value) -> Result<ExperimentDescriptor, ValidationError> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::new("experiment descriptor must be a JSON object"))?;

    match object.get("title") {
        None | Some(Value::Null) => {
            return Err(ValidationError::for_field("title", "title is required"));
        }
        Some(Value::String(_)) => {}
        Some(_) => {
            return Err(ValidationError::for_field("title", "title must be a string"));
        }
    }

    if let Some(types) = object.get("analysisTypes") {
        match types {
            Value::Null => {}
            Value::Array(items) => {
                if items.iter().any(|item| !item.is_string()) {
                    return Err(ValidationError::for_field(
                        "analysisTypes",
                        "analysisTypes entries must be strings",
                    ));
                }
            }
            _ => {
                return Err(ValidationError::for_field(
                    "analysisTypes",
                    "analysisTypes must be a list",
                ));
            }
        }
    }

    for field in ["purpose", "designRationale", "fileContent"] {
        if let Some(v) = object.get(field) {
            if !(v.is_null() || v.is_string()) {
                return Err(ValidationError::for_field(
                    field,
                    format!("{field} must be a string"),
                ));
            }
        }
    }

    let mut normalized = value.clone();
    if let Some(obj) = normalized.as_object_mut() {
        if obj.get("analysisTypes").is_some_and(Value::is_null) {
            obj.remove("analysisTypes");
        }
    }

    let descriptor: ExperimentDescriptor = serde_json::from_value(normalized)
        .map_err(|e| ValidationError::new(format!("invalid experiment descriptor: {e}")))?;

    validate_descriptor(&descriptor)?;
    Ok(descriptor)
}

/// Check a typed descriptor, passing it through unchanged on success
pub fn validate_descriptor(
    descriptor: &ExperimentDescriptor,
) -> Result<&ExperimentDescriptor, ValidationError> {
    if descriptor.title.trim().is_empty() {
        return Err(ValidationError::for_field("title", "title must not be empty"));
    }
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object() {
        let err = validate_value(&json!(["title"])).unwrap_err();
        assert!(err.field.is_none());
        assert!(validate_value(&json!("pH")).is_err());
        assert!(validate_value(&Value::Null).is_err());
    }

    #[test]
    fn test_title_rules() {
        let missing = validate_value(&json!({"purpose": "x"})).unwrap_err();
        assert_eq!(missing.field.as_deref(), Some("title"));

        let wrong_type = validate_value(&json!({"title": 42})).unwrap_err();
        assert_eq!(wrong_type.message, "title must be a string");

        let blank = validate_value(&json!({"title": "   \t"})).unwrap_err();
        assert_eq!(blank.message, "title must not be empty");
    }

    #[test]
    fn test_analysis_types_must_be_list() {
        let err = validate_value(&json!({"title": "t", "analysisTypes": "anova"})).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("analysisTypes"));

        let err = validate_value(&json!({"title": "t", "analysisTypes": [1, 2]})).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("analysisTypes"));

        let ok = validate_value(&json!({"title": "t", "analysisTypes": null})).unwrap();
        assert!(ok.analysis_types.is_empty());
    }

    #[test]
    fn test_passes_descriptor_through() {
        let value = json!({
            "title": "pH and Growth",
            "purpose": "measure pH effect",
            "analysisTypes": ["statistical"],
            "fileContent": "1. Prepare media"
        });
        let descriptor = validate_value(&value).unwrap();
        assert_eq!(descriptor.title, "pH and Growth");
        assert_eq!(descriptor.purpose.as_deref(), Some("measure pH effect"));
        assert_eq!(descriptor.file_content.as_deref(), Some("1. Prepare media"));

        let same = validate_descriptor(&descriptor).unwrap();
        assert_eq!(same, &descriptor);
    }
}
