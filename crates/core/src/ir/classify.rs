//! Shape classification of schemas.
//!
//! Every schema the renderer sees is first reduced to one [`Shape`]. The
//! match over `Shape` is exhaustive everywhere, so a new shape is a build
//! error in each strategy rather than a silent fallthrough.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::GenError;
use crate::spec::{AdditionalProperties, EnumValue, Schema};

use super::types::GoType;

/// Shape category of a schema.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'s> {
    /// A Go scalar or format type: `string`, `int64`, `time.Time`, `[]byte`.
    Scalar(&'static str),
    /// Scalar restricted to listed values.
    Enum {
        /// Underlying Go type.
        scalar: &'static str,
        /// Allowed values, in document order.
        values: &'s [EnumValue],
    },
    /// `[]T`.
    Array {
        /// Element schema.
        items: &'s Schema,
    },
    /// A struct. `None` properties means an empty struct.
    Object {
        /// Declared properties, if any.
        properties: Option<&'s BTreeMap<String, Schema>>,
    },
    /// `map[string]T`.
    Map {
        /// Value side.
        value: MapValue<'s>,
    },
}

/// Value side of a map shape.
#[derive(Debug, Clone, Copy)]
pub enum MapValue<'s> {
    /// Values follow this schema.
    Schema(&'s Schema),
    /// Free-form object: `map[string]any`.
    Any,
}

impl Shape<'_> {
    /// Scalars (and enums over them) cannot take part in a cycle.
    pub fn is_simple(&self) -> bool {
        matches!(self, Shape::Scalar(_) | Shape::Enum { .. })
    }
}

/// Go type named by a format hint.
fn format_type(format: &str, declared: Option<&str>) -> Option<&'static str> {
    let numeric = matches!(declared, Some("integer" | "number"));
    match format {
        "date-time" => Some("time.Time"),
        "uuid" => Some("uuid.UUID"),
        "ipv4" | "ipv6" => Some("net.IP"),
        "byte" | "binary" => Some("[]byte"),
        "int32" if numeric => Some("int32"),
        "int64" if numeric => Some("int64"),
        "float" if numeric => Some("float32"),
        "double" if numeric => Some("float64"),
        _ => None,
    }
}

fn raw_scalar(declared: &str) -> Option<&'static str> {
    match declared {
        "string" => Some("string"),
        "integer" => Some("int"),
        "number" => Some("float64"),
        "boolean" => Some("bool"),
        _ => None,
    }
}

/// Builtin Go types constants can be declared over.
fn is_const_type(scalar: &str) -> bool {
    matches!(
        scalar,
        "string" | "int" | "int32" | "int64" | "float32" | "float64" | "bool"
    )
}

/// The Go type for a scalar rendering.
pub fn scalar_type(scalar: &'static str) -> GoType {
    match scalar.strip_prefix("[]") {
        Some(inner) => GoType::slice(GoType::ident(inner)),
        None => GoType::ident(scalar),
    }
}

/// Strip wrappers that do not change the shape: a nullable `anyOf`/`oneOf`
/// pair and a single-member `allOf`. Other compositions are unsupported.
pub fn effective<'s>(schema: &'s Schema, name: &str) -> Result<&'s Schema, GenError> {
    if let Some(inner) = schema.unwrap_nullable() {
        return effective(inner, name);
    }
    if let Some(all_of) = &schema.all_of {
        if let [only] = all_of.as_slice()
            && schema.properties.is_none()
        {
            return effective(only, name);
        }
        return Err(GenError::unsupported(
            name,
            format!("allOf composition with {} members", all_of.len()),
        ));
    }
    if let Some(members) = schema.any_of.as_ref().or(schema.one_of.as_ref()) {
        return Err(GenError::unsupported(
            name,
            format!("anyOf/oneOf union of {} schemas", members.len()),
        ));
    }
    Ok(schema)
}

/// Classify a schema that is not a reference.
pub fn classify<'s>(schema: &'s Schema, name: &str) -> Result<Shape<'s>, GenError> {
    let declared = schema.first_type();

    if let Some(format) = &schema.format
        && !matches!(declared, Some("array" | "object"))
    {
        if let Some(scalar) = format_type(format, declared) {
            return Ok(with_enum(scalar, schema));
        }
        debug!(schema = %name, format = %format, "Unrecognised format, using the raw type.");
    }

    match declared {
        Some("array") => array_shape(schema, name),
        Some("object") => Ok(object_shape(schema, name)?),
        Some(other) => match raw_scalar(other) {
            Some(scalar) => Ok(with_enum(scalar, schema)),
            None => Err(GenError::malformed(name, format!("unknown type '{other}'"))),
        },
        None => infer_shape(schema, name),
    }
}

fn with_enum<'s>(scalar: &'static str, schema: &'s Schema) -> Shape<'s> {
    match &schema.enum_values {
        Some(values)
            if is_const_type(scalar) && values.iter().any(|v| *v != EnumValue::Null) =>
        {
            Shape::Enum { scalar, values }
        }
        _ => Shape::Scalar(scalar),
    }
}

fn array_shape<'s>(schema: &'s Schema, name: &str) -> Result<Shape<'s>, GenError> {
    match schema.items.as_deref() {
        Some(items) => Ok(Shape::Array { items }),
        None => Err(GenError::malformed(name, "array schema has no items")),
    }
}

fn object_shape<'s>(schema: &'s Schema, name: &str) -> Result<Shape<'s>, GenError> {
    let properties = schema.properties.as_ref().filter(|p| !p.is_empty());
    match (properties, &schema.additional_properties) {
        (Some(properties), additional) => {
            if additional.is_some() {
                debug!(schema = %name, "Ignoring additionalProperties next to declared properties.");
            }
            Ok(Shape::Object {
                properties: Some(properties),
            })
        }
        (None, Some(AdditionalProperties::Schema(value))) => map_shape(value, name),
        (None, Some(AdditionalProperties::Bool(true)) | None) => Ok(Shape::Map {
            value: MapValue::Any,
        }),
        (None, Some(AdditionalProperties::Bool(false))) => Ok(Shape::Object { properties: None }),
    }
}

fn map_shape<'s>(value: &'s Schema, name: &str) -> Result<Shape<'s>, GenError> {
    if value.is_empty_shape() {
        return Err(GenError::unsupported(
            name,
            "additionalProperties value schema declares no type",
        ));
    }
    Ok(Shape::Map {
        value: MapValue::Schema(value),
    })
}

/// Shape inference for schemas without a `type`. An additional-properties
/// declaration makes a map even next to `items` or `properties`.
fn infer_shape<'s>(schema: &'s Schema, name: &str) -> Result<Shape<'s>, GenError> {
    match &schema.additional_properties {
        Some(AdditionalProperties::Schema(value)) => return map_shape(value, name),
        Some(AdditionalProperties::Bool(true)) if schema.properties.is_none() => {
            return Ok(Shape::Map {
                value: MapValue::Any,
            });
        }
        _ => {}
    }
    if let Some(items) = schema.items.as_deref() {
        return Ok(Shape::Array { items });
    }
    if let Some(properties) = &schema.properties {
        return Ok(Shape::Object {
            properties: Some(properties).filter(|p| !p.is_empty()),
        });
    }
    Err(GenError::malformed(
        name,
        "schema has no type and no inferable shape",
    ))
}
