//! Request payload validation.
//!
//! Two passes. A [`Schema`] checks the raw JSON shape: required keys, value
//! types and unknown keys. The typed payload is then checked with its
//! `validator` rules (non-empty text). Either pass stops at the first
//! violation and reports it as a structured [`ValidationError`] that is safe
//! to send back to the client as-is.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use crate::domain::{NewPost, PostPatch};

/// Type rule for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// String.
    String,
    /// Array whose elements are all strings.
    StringArray,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Object schema. Keys not listed are rejected.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [Field],
}

const NEW_POST_FIELDS: &[Field] = &[
    Field::required("title", FieldKind::String),
    Field::required("body", FieldKind::String),
    Field::required("tags", FieldKind::StringArray),
];

const POST_PATCH_FIELDS: &[Field] = &[
    Field::optional("title", FieldKind::String),
    Field::optional("body", FieldKind::String),
    Field::optional("tags", FieldKind::StringArray),
];

/// Body of `POST /api/posts`.
pub const NEW_POST: Schema = Schema::new(NEW_POST_FIELDS);

/// Body of `PATCH /api/posts/:id`.
pub const POST_PATCH: Schema = Schema::new(POST_PATCH_FIELDS);

impl Schema {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Check `payload` against the schema and return its fields on success.
    pub fn validate(&self, payload: &Value) -> Result<Map<String, Value>, ValidationError> {
        let object = payload
            .as_object()
            .ok_or_else(|| ValidationError::single(ValidationDetail::object_base()))?;

        for field in self.fields {
            match object.get(field.name) {
                None if field.required => {
                    return Err(ValidationError::single(ValidationDetail::for_key(
                        field.name,
                        ErrorKind::Required,
                    )));
                }
                None => {}
                Some(value) => check_field(field, value)?,
            }
        }

        if let Some(unknown) = object
            .keys()
            .find(|key| !self.fields.iter().any(|f| f.name == key.as_str()))
        {
            return Err(ValidationError::single(ValidationDetail::for_key(
                unknown,
                ErrorKind::Unknown,
            )));
        }

        Ok(object.clone())
    }
}

fn check_field(field: &Field, value: &Value) -> Result<(), ValidationError> {
    match field.kind {
        FieldKind::String => check_string(value, vec![PathSegment::key(field.name)], field.name),
        FieldKind::StringArray => {
            let items = value.as_array().ok_or_else(|| {
                ValidationError::single(ValidationDetail::for_key(field.name, ErrorKind::ArrayBase))
            })?;
            for (index, item) in items.iter().enumerate() {
                check_string(
                    item,
                    vec![PathSegment::key(field.name), PathSegment::Index(index)],
                    &format!("{}[{}]", field.name, index),
                )?;
            }
            Ok(())
        }
    }
}

fn check_string(value: &Value, path: Vec<PathSegment>, label: &str) -> Result<(), ValidationError> {
    if value.is_string() {
        return Ok(());
    }
    Err(ValidationError::single(ValidationDetail::new(ErrorKind::StringBase, path, label)))
}

fn parse<T: DeserializeOwned + Validate>(schema: &Schema, payload: &Value) -> Result<T, ValidationError> {
    let fields = schema.validate(payload)?;
    let typed: T = serde_json::from_value(Value::Object(fields))
        .map_err(|_| ValidationError::single(ValidationDetail::object_base()))?;
    typed.validate().map_err(|errors| empty_text(schema, &errors))?;
    Ok(typed)
}

/// First `validator` failure, in schema field order. Every rule on the
/// typed payloads is a non-empty check; tag failures carry an `index`.
fn empty_text(schema: &Schema, errors: &ValidationErrors) -> ValidationError {
    let field_errors = errors.field_errors();
    for field in schema.fields {
        let Some(err) = field_errors.get(field.name).and_then(|errs| errs.first()) else {
            continue;
        };
        let detail = match err.params.get("index").and_then(Value::as_u64) {
            Some(index) => ValidationDetail::new(
                ErrorKind::StringEmpty,
                vec![PathSegment::key(field.name), PathSegment::Index(index as usize)],
                &format!("{}[{}]", field.name, index),
            ),
            None => ValidationDetail::for_key(field.name, ErrorKind::StringEmpty),
        };
        return ValidationError::single(detail);
    }
    ValidationError::single(ValidationDetail::object_base())
}

/// Validate a create payload and turn it into [`NewPost`].
pub fn new_post(payload: &Value) -> Result<NewPost, ValidationError> {
    parse(&NEW_POST, payload)
}

/// Validate an update payload and turn it into [`PostPatch`].
pub fn post_patch(payload: &Value) -> Result<PostPatch, ValidationError> {
    parse(&POST_PATCH, payload)
}

/// Rule that a value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "any.required")]
    Required,
    #[serde(rename = "string.base")]
    StringBase,
    #[serde(rename = "string.empty")]
    StringEmpty,
    #[serde(rename = "array.base")]
    ArrayBase,
    #[serde(rename = "object.base")]
    ObjectBase,
    #[serde(rename = "object.unknown")]
    Unknown,
}

impl ErrorKind {
    fn describe(self, label: &str) -> String {
        match self {
            ErrorKind::Required => format!("\"{label}\" is required"),
            ErrorKind::StringBase => format!("\"{label}\" must be a string"),
            ErrorKind::StringEmpty => format!("\"{label}\" is not allowed to be empty"),
            ErrorKind::ArrayBase => format!("\"{label}\" must be an array"),
            ErrorKind::ObjectBase => format!("\"{label}\" must be of type object"),
            ErrorKind::Unknown => format!("\"{label}\" is not allowed"),
        }
    }
}

/// One step into the payload: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn key(name: &str) -> Self {
        PathSegment::Key(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<PathSegment>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetail {
    pub message: String,
    pub path: Vec<PathSegment>,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub context: ValidationContext,
}

impl ValidationDetail {
    fn new(kind: ErrorKind, path: Vec<PathSegment>, label: &str) -> Self {
        Self {
            message: kind.describe(label),
            context: ValidationContext {
                key: path.last().cloned(),
                label: label.to_string(),
            },
            path,
            kind,
        }
    }

    fn for_key(name: &str, kind: ErrorKind) -> Self {
        Self::new(kind, vec![PathSegment::key(name)], name)
    }

    fn object_base() -> Self {
        Self::new(ErrorKind::ObjectBase, Vec::new(), "value")
    }
}

/// Structured description of the first violation found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    pub details: Vec<ValidationDetail>,
}

impl ValidationError {
    fn single(detail: ValidationDetail) -> Self {
        Self {
            message: detail.message.clone(),
            details: vec![detail],
        }
    }

    /// Rule broken by the first violation.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.details.first().map(|d| d.kind)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}
