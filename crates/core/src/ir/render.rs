//! Type Renderer: one Go declaration per schema, plus the declarations its
//! nested inline schemas need.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::GenError;
use crate::spec::{EnumValue, Schema};

use super::classify::{MapValue, Shape, classify, effective, scalar_type};
use super::fields::compile_fields;
use super::guard::{RecursionGuard, content_hash};
use super::resolve::SchemaIndex;
use super::types::{DeclShape, EnumConst, GoFile, GoLiteral, GoType, TypeDecl};
use super::utils::{doc_lines, enum_const_suffix};

/// Go type of a property, plus whether it stands for a collection.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The property's Go type before optional-pointer wrapping.
    pub ty: GoType,
    /// Set for references to array or map schemas.
    pub collection: bool,
}

/// Renders schemas into declarations of one [`GoFile`].
#[derive(Debug)]
pub struct TypeRenderer<'a, 'f> {
    index: SchemaIndex<'a>,
    file: &'f mut GoFile,
}

impl<'a, 'f> TypeRenderer<'a, 'f> {
    /// A renderer declaring into `file`.
    pub fn new(index: SchemaIndex<'a>, file: &'f mut GoFile) -> Self {
        Self { index, file }
    }

    /// The reference index in use.
    pub fn index(&self) -> SchemaIndex<'a> {
        self.index
    }

    /// The unit being filled.
    pub fn file(&self) -> &GoFile {
        &*self.file
    }

    /// Mutable access to the unit being filled.
    pub fn file_mut(&mut self) -> &mut GoFile {
        self.file
    }

    /// Emit the declaration named `name` for `schema` and everything nested in it.
    pub fn render(&mut self, name: &str, schema: &'a Schema) -> Result<(), GenError> {
        let mut guard = RecursionGuard::new();
        let mut scope = guard.enter(content_hash(schema), name);
        let result = self.render_decl(&mut scope, name, schema);
        drop(scope);
        debug_assert!(guard.is_empty(), "recursion guard not unwound after '{name}'");
        result
    }

    /// Go type for a value position (parameters, bodies). Inline enums and
    /// objects are declared under `hint`.
    pub fn value_type(&mut self, hint: &str, schema: &'a Schema) -> Result<GoType, GenError> {
        let mut guard = RecursionGuard::new();
        self.element_type(&mut guard, hint, schema)
    }

    /// Render one declaration. The caller owns the guard entry for `schema`.
    pub(super) fn render_decl(
        &mut self,
        guard: &mut RecursionGuard,
        name: &str,
        schema: &'a Schema,
    ) -> Result<(), GenError> {
        let target = effective(schema, name)?;
        let shape = match &target.ref_path {
            Some(ref_path) => DeclShape::Alias(GoType::ident(self.index.type_name(ref_path, name)?)),
            None => match classify(target, name)? {
                Shape::Scalar(scalar) => DeclShape::Alias(scalar_type(scalar)),
                Shape::Enum { scalar, values } => enum_shape(name, scalar, values)?,
                Shape::Array { items } => {
                    DeclShape::Slice(self.element_type(guard, &format!("{name}Item"), items)?)
                }
                Shape::Object { properties } => {
                    let fields = match properties {
                        Some(properties) => compile_fields(self, guard, name, target, properties)?,
                        None => Vec::new(),
                    };
                    DeclShape::Struct(fields)
                }
                Shape::Map { value } => DeclShape::Map(self.map_value(guard, name, value)?),
            },
        };

        let doc = schema_doc(schema).or_else(|| schema_doc(target));
        self.file.declare(TypeDecl {
            name: name.to_string(),
            doc,
            shape,
        })?;
        debug!(schema = %name, "Rendered type.");
        Ok(())
    }

    /// Type of an object property, declaring nested types as needed.
    pub(super) fn property_type(
        &mut self,
        guard: &mut RecursionGuard,
        hint: &str,
        schema: &'a Schema,
    ) -> Result<Resolved, GenError> {
        let target = effective(schema, hint)?;
        let collection = match &target.ref_path {
            Some(_) => self.index.is_collection_ref(target, hint)?,
            None => false,
        };
        let ty = self.element_type(guard, hint, target)?;
        Ok(Resolved { ty, collection })
    }

    /// Type used where a schema appears inside another one: array items,
    /// map values, properties.
    fn element_type(
        &mut self,
        guard: &mut RecursionGuard,
        hint: &str,
        schema: &'a Schema,
    ) -> Result<GoType, GenError> {
        let target = effective(schema, hint)?;
        if let Some(ref_path) = &target.ref_path {
            return Ok(GoType::ident(self.index.type_name(ref_path, hint)?));
        }
        match classify(target, hint)? {
            Shape::Scalar(scalar) => Ok(scalar_type(scalar)),
            Shape::Enum { .. } => {
                let name = self.file.claim_name(hint);
                self.render_decl(guard, &name, target)?;
                Ok(GoType::ident(name))
            }
            Shape::Array { items } => {
                let item = self.element_type(guard, &format!("{hint}Item"), items)?;
                Ok(GoType::slice(item))
            }
            Shape::Map { value } => Ok(GoType::map(self.map_value(guard, hint, value)?)),
            Shape::Object { .. } => self.nested(guard, hint, target),
        }
    }

    /// Whether holding `schema` by value would make a type contain itself:
    /// a schema reachable from it through object properties is being
    /// expanded right now. Schemas that fail to resolve count as acyclic;
    /// their errors surface where they are rendered.
    pub(super) fn closes_cycle(&self, guard: &RecursionGuard, hint: &str, schema: &'a Schema) -> bool {
        let mut seen = BTreeSet::new();
        self.reaches_active(guard, hint, schema, &mut seen)
    }

    fn reaches_active(
        &self,
        guard: &RecursionGuard,
        hint: &str,
        schema: &'a Schema,
        seen: &mut BTreeSet<String>,
    ) -> bool {
        let active = |schema: &Schema| guard.in_progress(&content_hash(schema)).is_some();
        let Ok(mut target) = effective(schema, hint) else {
            return false;
        };
        if active(schema) || active(target) {
            return true;
        }
        while let Some(ref_path) = &target.ref_path {
            if !seen.insert(ref_path.clone()) {
                return false;
            }
            let Some((_, component)) = self.index.lookup(ref_path) else {
                return false;
            };
            let Ok(next) = effective(component, hint) else {
                return false;
            };
            if active(component) || active(next) {
                return true;
            }
            target = next;
        }

        let Ok(Shape::Object {
            properties: Some(properties),
        }) = classify(target, hint)
        else {
            return false;
        };
        if !seen.insert(content_hash(target)) {
            return false;
        }
        properties
            .values()
            .any(|property| self.reaches_active(guard, hint, property, seen))
    }

    fn map_value(
        &mut self,
        guard: &mut RecursionGuard,
        name: &str,
        value: MapValue<'a>,
    ) -> Result<GoType, GenError> {
        match value {
            MapValue::Any => Ok(GoType::Any),
            MapValue::Schema(schema) => self.element_type(guard, &format!("{name}Value"), schema),
        }
    }

    /// Declare an inline object under the guard.
    ///
    /// A schema already being expanded is not expanded again; the name it
    /// is being declared under is referenced instead.
    fn nested(
        &mut self,
        guard: &mut RecursionGuard,
        name: &str,
        schema: &'a Schema,
    ) -> Result<GoType, GenError> {
        let hash = content_hash(schema);
        if let Some(active) = guard.in_progress(&hash) {
            debug!(schema = %name, active = %active, "Schema already being expanded, referencing it.");
            return Ok(GoType::ident(active));
        }
        let name = self.file.claim_name(name);
        let mut scope = guard.enter(hash, name.as_str());
        self.render_decl(&mut scope, &name, schema)?;
        Ok(GoType::ident(name))
    }
}

/// Doc text of a schema: description, else title.
pub(super) fn schema_doc(schema: &Schema) -> Option<String> {
    [&schema.description, &schema.title]
        .into_iter()
        .flatten()
        .map(|text| doc_lines(text))
        .find(|lines| !lines.is_empty())
        .map(|lines| lines.join("\n"))
}

fn enum_shape(name: &str, scalar: &'static str, values: &[EnumValue]) -> Result<DeclShape, GenError> {
    let mut seen = BTreeSet::new();
    let mut constants = Vec::with_capacity(values.len());

    for value in values {
        let literal = match enum_literal(scalar, value) {
            Some(literal) => literal,
            None if *value == EnumValue::Null => continue,
            None => {
                return Err(GenError::malformed(
                    name,
                    format!("enum value '{value}' does not fit type {scalar}"),
                ));
            }
        };

        let suffix = enum_const_suffix(value);
        let base = if suffix.is_empty() {
            format!("{name}Empty")
        } else {
            format!("{name}{suffix}")
        };
        let mut const_name = base.clone();
        let mut n = 2;
        while !seen.insert(const_name.clone()) {
            const_name = format!("{base}{n}");
            n += 1;
        }
        constants.push(EnumConst {
            name: const_name,
            value: literal,
        });
    }

    Ok(DeclShape::Enum {
        underlying: GoType::ident(scalar),
        constants,
    })
}

fn enum_literal(scalar: &str, value: &EnumValue) -> Option<GoLiteral> {
    match (scalar, value) {
        (_, EnumValue::Null) => None,
        ("string", value) => Some(GoLiteral::String(value.to_string())),
        ("bool", EnumValue::Bool(b)) => Some(GoLiteral::Bool(*b)),
        ("int" | "int32" | "int64" | "float32" | "float64", EnumValue::Integer(n)) => {
            Some(GoLiteral::Int(*n))
        }
        ("float32" | "float64", EnumValue::Float(f)) => Some(GoLiteral::Float(*f)),
        _ => None,
    }
}
