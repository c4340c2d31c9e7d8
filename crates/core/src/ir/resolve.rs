//! `$ref` resolution against the document's components.

use crate::error::GenError;
use crate::spec::{Components, Parameter, ParameterOrRef, Schema};

use super::classify::{Shape, classify, effective};
use super::utils::exported_name;

const SCHEMA_PREFIX: &str = "#/components/schemas/";
const PARAMETER_PREFIX: &str = "#/components/parameters/";

/// Longest `$ref` chain followed before giving up.
const MAX_REF_DEPTH: usize = 16;

/// Read-only view of the component section.
#[derive(Debug, Clone, Copy)]
pub struct SchemaIndex<'a> {
    components: Option<&'a Components>,
}

impl<'a> SchemaIndex<'a> {
    /// Index over `components`; `None` resolves nothing.
    pub fn new(components: Option<&'a Components>) -> Self {
        Self { components }
    }

    /// Component name and schema behind a schema reference.
    pub fn lookup(&self, ref_path: &str) -> Option<(&'a str, &'a Schema)> {
        let name = ref_path.strip_prefix(SCHEMA_PREFIX)?;
        self.components?
            .schemas
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Go type name for a schema reference.
    pub fn type_name(&self, ref_path: &str, context: &str) -> Result<String, GenError> {
        match self.lookup(ref_path) {
            Some((name, _)) => Ok(exported_name(name)),
            None => Err(GenError::malformed(
                context,
                format!("reference '{ref_path}' does not name a component schema"),
            )),
        }
    }

    /// Follow references and transparent wrappers down to a concrete schema.
    pub fn resolve_target(&self, schema: &'a Schema, context: &str) -> Result<&'a Schema, GenError> {
        let mut current = effective(schema, context)?;
        for _ in 0..MAX_REF_DEPTH {
            let Some(ref_path) = &current.ref_path else {
                return Ok(current);
            };
            let Some((_, target)) = self.lookup(ref_path) else {
                return Err(GenError::malformed(
                    context,
                    format!("reference '{ref_path}' does not name a component schema"),
                ));
            };
            current = effective(target, context)?;
        }
        Err(GenError::malformed(
            context,
            format!("reference chain longer than {MAX_REF_DEPTH} links"),
        ))
    }

    /// Shape of whatever a schema (possibly a reference) resolves to.
    pub fn target_shape(&self, schema: &'a Schema, context: &str) -> Result<Shape<'a>, GenError> {
        classify(self.resolve_target(schema, context)?, context)
    }

    /// References to arrays or maps are rendered without a pointer.
    pub fn is_collection_ref(&self, schema: &'a Schema, context: &str) -> Result<bool, GenError> {
        Ok(matches!(
            self.target_shape(schema, context)?,
            Shape::Array { .. } | Shape::Map { .. }
        ))
    }

    /// References to object schemas are passed and returned by pointer.
    pub fn is_object_ref(&self, schema: &'a Schema, context: &str) -> Result<bool, GenError> {
        Ok(matches!(
            self.target_shape(schema, context)?,
            Shape::Object { .. }
        ))
    }

    /// Inline parameter, or the component parameter a reference names.
    pub fn parameter(&self, param: &'a ParameterOrRef, context: &str) -> Result<&'a Parameter, GenError> {
        match param {
            ParameterOrRef::Inline(param) => Ok(param),
            ParameterOrRef::Ref { ref_path } => ref_path
                .strip_prefix(PARAMETER_PREFIX)
                .and_then(|name| self.components?.parameters.get(name))
                .ok_or_else(|| {
                    GenError::malformed(
                        context,
                        format!("reference '{ref_path}' does not name a component parameter"),
                    )
                }),
        }
    }
}

/// The `$ref` of a schema that is only a reference (nullable wrappers allowed).
pub fn bare_reference(schema: &Schema) -> Option<&str> {
    let schema = schema.unwrap_nullable().unwrap_or(schema);
    schema.ref_path.as_deref()
}

/// The item `$ref` of an array schema whose items are only a reference.
pub fn array_of_reference(schema: &Schema) -> Option<&str> {
    let schema = schema.unwrap_nullable().unwrap_or(schema);
    let is_array = match schema.first_type() {
        Some(t) => t == "array",
        None => schema.ref_path.is_none(),
    };
    if !is_array {
        return None;
    }
    schema.items.as_deref().and_then(bare_reference)
}
