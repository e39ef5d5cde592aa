// Structural input schemas and the validation step that guards every handler

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Primitive type a field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
        }
    }
}

/// One declared input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub description: String,
    pub required: bool,
    /// Reject strings that are empty after trimming
    pub non_blank: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            non_blank: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn non_blank(mut self) -> Self {
        self.non_blank = true;
        self
    }

    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        if !self.kind.accepts(value) {
            return Err(ValidationError::WrongType {
                field: self.name.clone(),
                expected: self.kind.as_str(),
            });
        }

        if self.non_blank {
            if let Some(text) = value.as_str() {
                if text.trim().is_empty() {
                    return Err(ValidationError::Blank {
                        field: self.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("arguments must be an object")]
    NotAnObject,

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("field {field} must be of type {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("{field} cannot be empty")]
    Blank { field: String },

    #[error("invalid arguments: {0}")]
    Decode(String),
}

/// Declared shape of a tool's arguments.
///
/// Fields not declared here are ignored. A schema without fields accepts
/// any payload at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter(|f| f.required).map(|f| f.name.as_str())
    }

    /// Check `raw` against the declared fields and decode it into `T`.
    ///
    /// A missing or `null` payload is treated as an empty object. A `null`
    /// field counts as absent.
    pub fn validate<T: DeserializeOwned>(
        &self,
        raw: Value,
    ) -> Result<ValidatedInput<T>, ValidationError> {
        if self.fields.is_empty() {
            return decode(raw);
        }

        let object = match raw {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            _ => return Err(ValidationError::NotAnObject),
        };

        for spec in &self.fields {
            match object.get(&spec.name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(ValidationError::MissingField {
                        field: spec.name.clone(),
                    });
                }
                None | Some(Value::Null) => {}
                Some(value) => spec.check(value)?,
            }
        }

        decode(Value::Object(object))
    }
}

fn decode<T: DeserializeOwned>(raw: Value) -> Result<ValidatedInput<T>, ValidationError> {
    let inner = serde_json::from_value(raw).map_err(|e| ValidationError::Decode(e.to_string()))?;
    Ok(ValidatedInput { inner })
}

/// Arguments that passed their tool's schema.
///
/// Only [`InputSchema::validate`] constructs one, so holding a value proves
/// validation ran.
#[derive(Debug)]
pub struct ValidatedInput<T> {
    inner: T,
}

impl<T> ValidatedInput<T> {
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> std::ops::Deref for ValidatedInput<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct TextArgs {
        text: String,
    }

    #[derive(Debug, Deserialize)]
    struct NoArgs {}

    fn text_schema() -> InputSchema {
        InputSchema::empty().field(
            FieldSpec::new("text", FieldKind::String, "Some text")
                .required()
                .non_blank(),
        )
    }

    #[test]
    fn test_valid_input_decodes() {
        let input: ValidatedInput<TextArgs> = text_schema().validate(json!({"text": "hi"})).unwrap();
        assert_eq!(input.text, "hi");
        assert_eq!(input.into_inner().text, "hi");
    }

    #[test]
    fn test_missing_required_field() {
        let err = text_schema().validate::<TextArgs>(json!({})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "text".to_string()
            }
        );

        let err = text_schema().validate::<TextArgs>(json!({"text": null})).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { .. }));
    }

    #[test]
    fn test_wrong_primitive_type() {
        let err = text_schema().validate::<TextArgs>(json!({"text": 42})).unwrap_err();
        assert_eq!(err.to_string(), "field text must be of type string");
    }

    #[test]
    fn test_blank_strings_rejected() {
        for blank in ["", "   ", "\t\n"] {
            let err = text_schema()
                .validate::<TextArgs>(json!({ "text": blank }))
                .unwrap_err();
            assert_eq!(err.to_string(), "text cannot be empty");
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let err = text_schema().validate::<TextArgs>(json!(["text"])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject);
    }

    #[test]
    fn test_empty_schema_accepts_any_payload() {
        let schema = InputSchema::empty();
        assert!(schema.validate::<NoArgs>(json!({"extra": true})).is_ok());
        assert!(schema.validate::<serde::de::IgnoredAny>(Value::Null).is_ok());
        assert!(schema.validate::<serde::de::IgnoredAny>(json!("loose")).is_ok());
    }

    #[test]
    fn test_integer_kind() {
        let schema = InputSchema::empty().field(FieldSpec::new("n", FieldKind::Integer, "count"));
        assert!(schema.validate::<Value>(json!({"n": 3})).is_ok());
        assert!(schema.validate::<Value>(json!({"n": 3.5})).is_err());
        assert_eq!(schema.required_fields().count(), 0);
    }
}
