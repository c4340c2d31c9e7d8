//! OpenAPI document model for serde deserialization.
//!
//! This module defines the subset of OpenAPI 3.0/3.1 the generator reads:
//! component schemas, component parameters and path operations. Every map is
//! a `BTreeMap` so iteration order is stable across runs.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::GenError;

/// Root API document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    /// Path templates (`/widgets/{id}`) and their operations.
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    /// Reusable schemas and parameters.
    pub components: Option<Components>,
}

/// Components section containing reusable schemas and parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    /// Named schemas; each one becomes a declaration of the types unit.
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    /// Parameters shared through `#/components/parameters` references.
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    /// `GET` operation.
    pub get: Option<Operation>,
    /// `PUT` operation.
    pub put: Option<Operation>,
    /// `POST` operation.
    pub post: Option<Operation>,
    /// `PATCH` operation.
    pub patch: Option<Operation>,
    /// `DELETE` operation.
    pub delete: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// The `net/http` constant naming this method.
    pub fn go_constant(&self) -> &'static str {
        match self {
            HttpMethod::Get => "http.MethodGet",
            HttpMethod::Put => "http.MethodPut",
            HttpMethod::Post => "http.MethodPost",
            HttpMethod::Patch => "http.MethodPatch",
            HttpMethod::Delete => "http.MethodDelete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PathItem {
    /// Operations declared on this path, in a fixed verb order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, self.get.as_ref()),
            (HttpMethod::Put, self.put.as_ref()),
            (HttpMethod::Post, self.post.as_ref()),
            (HttpMethod::Patch, self.patch.as_ref()),
            (HttpMethod::Delete, self.delete.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Source of the Go method name when present.
    pub operation_id: Option<String>,
    /// One-line doc text of the client method.
    pub summary: Option<String>,
    /// Longer doc text, used when there is no summary.
    pub description: Option<String>,
    /// Operation-level parameters; these override path-level ones.
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
    /// JSON payload sent with the request.
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

/// A parameter given inline or as a reference to `#/components/parameters`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    /// `{"$ref": "#/components/parameters/..."}`
    Ref {
        /// The reference target.
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    /// A parameter declared in place.
    Inline(Parameter),
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Wire name.
    pub name: String,
    /// `path`, `query`, `header` or `cookie`.
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter must be sent.
    #[serde(default)]
    pub required: bool,
    /// Doc text for the option constructor.
    pub description: Option<String>,
    /// Value type; a missing schema means `string`.
    pub schema: Option<Schema>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Whether a body must be sent.
    #[serde(default)]
    pub required: bool,
    /// Bodies keyed by media type.
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Human-readable summary of the response.
    pub description: Option<String>,
    /// Payloads keyed by media type.
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Shape of the payload.
    pub schema: Option<Schema>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, number, integer, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Short label, used as doc text when there is no description.
    pub title: Option<String>,
    /// Doc text of the generated declaration or field.
    pub description: Option<String>,

    /// Format hint (e.g., date-time, uuid).
    pub format: Option<String>,

    /// Enum values (can be strings, integers, floats, booleans, or null).
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Properties for object types.
    pub properties: Option<BTreeMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Additional properties for object types (map types).
    pub additional_properties: Option<AdditionalProperties>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,

    /// Union members. Only the nullable `[X, {type: null}]` pair is supported.
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,

    /// Same handling as `any_of`.
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,

    /// Composition members. Only a single member is supported.
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,

    /// Lower bound, `validate:"gte=N"`.
    pub minimum: Option<f64>,
    /// Upper bound, `validate:"lte=N"`.
    pub maximum: Option<f64>,
    /// Makes the lower bound strict.
    pub exclusive_minimum: Option<ExclusiveBound>,
    /// Makes the upper bound strict.
    pub exclusive_maximum: Option<ExclusiveBound>,
    /// `validate:"min=N"` on strings.
    pub min_length: Option<u64>,
    /// `validate:"max=N"` on strings.
    pub max_length: Option<u64>,
    /// `validate:"min=N"` on arrays.
    pub min_items: Option<u64>,
    /// `validate:"max=N"` on arrays.
    pub max_items: Option<u64>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// A string member.
    String(String),
    /// An integer member.
    Integer(i64),
    /// A non-integral number.
    Float(f64),
    /// A boolean member.
    Bool(bool),
    /// `null`, skipped when constants are emitted.
    Null,
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::String(s) => f.write_str(s),
            EnumValue::Integer(n) => write!(f, "{n}"),
            EnumValue::Float(x) => write!(f, "{x}"),
            EnumValue::Bool(b) => write!(f, "{b}"),
            EnumValue::Null => f.write_str("null"),
        }
    }
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` allows any value, `false` forbids extra keys.
    Bool(bool),
    /// Schema of every value.
    Schema(Box<Schema>),
}

/// `exclusiveMinimum`/`exclusiveMaximum`: a 3.0 flag on the plain bound, or
/// a 3.1 bound of its own.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    /// OpenAPI 3.0: applies to `minimum`/`maximum`.
    Flag(bool),
    /// OpenAPI 3.1: the strict bound itself.
    Value(f64),
}

impl Document {
    /// Parse an API document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GenError> {
        serde_json::from_str(json).map_err(|e| GenError::Parse {
            message: format!("invalid JSON: {e}"),
        })
    }

    /// Parse an API document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, GenError> {
        serde_yaml::from_str(yaml).map_err(|e| GenError::Parse {
            message: format!("invalid YAML: {e}"),
        })
    }

    /// Read a document from disk, choosing the parser by file extension.
    pub fn from_path(path: &Path) -> Result<Self, GenError> {
        let text = fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Component schemas in name order.
    pub fn schemas(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.components
            .iter()
            .flat_map(|components| components.schemas.iter())
    }
}

impl Schema {
    /// The first declared type that is not `"null"`.
    pub fn first_type(&self) -> Option<&str> {
        match &self.schema_type {
            Some(SchemaType::Single(t)) if t != "null" => Some(t.as_str()),
            Some(SchemaType::Multiple(types)) => types
                .iter()
                .map(String::as_str)
                .find(|t| *t != "null"),
            _ => None,
        }
    }

    /// Check if this schema only admits `null`.
    pub fn is_null_type(&self) -> bool {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => t == "null",
            Some(SchemaType::Multiple(types)) => types.iter().all(|t| t == "null"),
            None => false,
        }
    }

    /// Get the non-null member of an `anyOf`/`oneOf` pair that includes null.
    pub fn unwrap_nullable(&self) -> Option<&Schema> {
        let members = self.any_of.as_ref().or(self.one_of.as_ref())?;
        match members.as_slice() {
            [a, b] if b.is_null_type() => Some(a),
            [a, b] if a.is_null_type() => Some(b),
            _ => None,
        }
    }

    /// Names listed in `required`.
    pub fn is_required(&self, property: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| required.iter().any(|r| r == property))
    }

    /// Check for `{}`: a schema that says nothing about its shape.
    pub fn is_empty_shape(&self) -> bool {
        self.schema_type.is_none()
            && self.ref_path.is_none()
            && self.format.is_none()
            && self.enum_values.is_none()
            && self.properties.is_none()
            && self.items.is_none()
            && self.additional_properties.is_none()
            && self.any_of.is_none()
            && self.one_of.is_none()
            && self.all_of.is_none()
    }
}
