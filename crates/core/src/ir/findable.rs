//! Findable Synthesizer: lookup-by-name-or-id on list responses.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::GenError;
use crate::spec::Schema;

use super::classify::{Shape, classify, effective};
use super::fields::UniqueNames;
use super::render::TypeRenderer;
use super::resolve::{SchemaIndex, bare_reference};
use super::types::{
    BodyTemplate, DeclShape, Field, FinderBody, FinderField, FunctionSignature, GoParam, GoType,
    Receiver, TypeDecl,
};
use super::utils::{exported_name, singularize, to_pascal_case};

/// Error type returned by every finder of a unit.
pub const NOT_FOUND_ERROR: &str = "NotFoundError";

/// Add `Find<Item>` to the response struct `response_name` when the
/// operation lists named, identified items. Returns whether a finder was
/// emitted.
pub(super) fn synthesize<'a>(
    renderer: &mut TypeRenderer<'a, '_>,
    operation: &str,
    response_name: &str,
    response: &'a Schema,
) -> Result<bool, GenError> {
    if !operation.to_ascii_lowercase().starts_with("list") {
        return Ok(false);
    }
    let Some(plan) = plan_finder(renderer, response_name, response)? else {
        return Ok(false);
    };

    let file = renderer.file_mut();
    if !file.is_declared(NOT_FOUND_ERROR) {
        file.declare(not_found_error())?;
        file.push_function(FunctionSignature {
            name: "Error".to_string(),
            doc: None,
            receiver: Some(Receiver {
                name: "e".to_string(),
                ty: GoType::ident(NOT_FOUND_ERROR).pointer(),
            }),
            params: Vec::new(),
            returns: vec![GoType::ident("string")],
            body: BodyTemplate::NotFoundMessage,
        });
    }

    let method = format!("Find{}", plan.singular);
    file.push_function(FunctionSignature {
        name: method.clone(),
        doc: Some(format!(
            "{method} returns the first {} whose name or id equals nameOrID.",
            plan.body.kind
        )),
        receiver: Some(Receiver {
            name: "r".to_string(),
            ty: GoType::ident(response_name).pointer(),
        }),
        params: vec![GoParam::new("nameOrID", GoType::ident("string"))],
        returns: vec![plan.item.pointer(), GoType::ident("error")],
        body: BodyTemplate::Finder(plan.body),
    });
    debug!(operation = %operation, finder = %method, "Emitted finder.");
    Ok(true)
}

#[derive(Debug)]
struct FinderPlan {
    singular: String,
    item: GoType,
    body: FinderBody,
}

fn plan_finder<'a>(
    renderer: &TypeRenderer<'a, '_>,
    response_name: &str,
    response: &'a Schema,
) -> Result<Option<FinderPlan>, GenError> {
    let index = renderer.index();
    let Some(DeclShape::Struct(fields)) = renderer.file().find(response_name).map(|d| &d.shape)
    else {
        return Ok(None);
    };
    let target = effective(response, response_name)?;
    let Some(properties) = &target.properties else {
        return Ok(None);
    };

    let mut arrays = Vec::new();
    for (wire, property) in properties {
        let target = index.resolve_target(property, response_name)?;
        if let Shape::Array { items } = classify(target, response_name)? {
            arrays.push((wire, items));
        }
    }
    let [(wire, items)] = arrays.as_slice() else {
        debug!(response = %response_name, arrays = arrays.len(), "No single list property, no finder.");
        return Ok(None);
    };

    let item_schema = index.resolve_target(*items, response_name)?;
    let Shape::Object {
        properties: Some(item_properties),
    } = classify(item_schema, response_name)?
    else {
        return Ok(None);
    };

    let Some(slice_field) = fields.iter().find(|f| tag_name(f) == Some(wire.as_str())) else {
        return Ok(None);
    };
    // A property referencing an array component holds a named slice type;
    // its element is only known here when the items are a reference too.
    let item = match &slice_field.ty {
        GoType::Slice(item) => (**item).clone(),
        GoType::Ident(_) => match bare_reference(items) {
            Some(ref_path) => GoType::ident(index.type_name(ref_path, response_name)?),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    let go_names = field_names(item_properties);
    let (Some(name_field), Some(id_field)) = (
        finder_field(index, item_schema, &go_names, "name")?,
        finder_field(index, item_schema, &go_names, "id")?,
    ) else {
        return Ok(None);
    };

    let singular_wire = singularize(wire);
    Ok(Some(FinderPlan {
        singular: singularize(&to_pascal_case(wire)),
        item,
        body: FinderBody {
            slice_field: slice_field.name.clone(),
            kind: singular_wire,
            name_field,
            id_field,
        },
    }))
}

fn tag_name(field: &Field) -> Option<&str> {
    field.tag.as_ref().map(|tag| tag.json.as_str())
}

/// Go field names of an item struct, claimed in property order.
fn field_names(properties: &BTreeMap<String, Schema>) -> BTreeMap<&str, String> {
    let mut names = UniqueNames::default();
    properties
        .keys()
        .map(|wire| (wire.as_str(), names.claim(&exported_name(wire))))
        .collect()
}

/// The comparable side of a finder, if `wire` is a scalar property of the item.
fn finder_field<'a>(
    index: SchemaIndex<'a>,
    item: &'a Schema,
    go_names: &BTreeMap<&str, String>,
    wire: &str,
) -> Result<Option<FinderField>, GenError> {
    let (Some(property), Some(name)) = (
        item.properties.as_ref().and_then(|p| p.get(wire)),
        go_names.get(wire),
    ) else {
        return Ok(None);
    };

    let inline = effective(property, wire)?;
    let shape = classify(index.resolve_target(property, wire)?, wire)?;
    let (is_string, nilable) = match shape {
        Shape::Scalar(scalar) => (
            inline.ref_path.is_none() && scalar == "string",
            scalar.starts_with("[]"),
        ),
        Shape::Enum { .. } => (false, false),
        Shape::Array { .. } | Shape::Object { .. } | Shape::Map { .. } => return Ok(None),
    };

    Ok(Some(FinderField {
        name: name.clone(),
        pointer: !item.is_required(wire) && !nilable,
        is_string,
    }))
}

fn not_found_error() -> TypeDecl {
    let text_field = |name: &str| Field {
        name: name.to_string(),
        doc: None,
        ty: GoType::ident("string"),
        required: true,
        tag: None,
    };
    TypeDecl {
        name: NOT_FOUND_ERROR.to_string(),
        doc: Some(format!(
            "{NOT_FOUND_ERROR} is returned when a lookup matches no item."
        )),
        shape: DeclShape::Struct(vec![text_field("Kind"), text_field("Key")]),
    }
}
