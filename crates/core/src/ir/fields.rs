//! Field Compiler: struct fields for object properties.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::GenError;
use crate::spec::{ExclusiveBound, Schema};

use super::guard::RecursionGuard;
use super::render::{TypeRenderer, schema_doc};
use super::types::{Field, FieldTag};
use super::utils::{exported_name, format_number};

/// Hands out identifiers, suffixing repeats with 2, 3, ...
#[derive(Debug, Clone, Default)]
pub(crate) struct UniqueNames {
    taken: BTreeSet<String>,
}

impl UniqueNames {
    /// Mark `name` as used without handing it out.
    pub(crate) fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    pub(crate) fn taken(&self) -> impl Iterator<Item = &str> {
        self.taken.iter().map(String::as_str)
    }

    pub(crate) fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 2;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{base}{n}");
            n += 1;
        }
        candidate
    }
}

/// One field per property, in property-name order.
pub(super) fn compile_fields<'a>(
    renderer: &mut TypeRenderer<'a, '_>,
    guard: &mut RecursionGuard,
    parent: &str,
    object: &'a Schema,
    properties: &'a BTreeMap<String, Schema>,
) -> Result<Vec<Field>, GenError> {
    let mut names = UniqueNames::default();
    let mut fields = Vec::with_capacity(properties.len());

    for (wire, property) in properties {
        if let Some(bad) = wire.chars().find(|&c| !is_tag_safe(c)) {
            return Err(GenError::malformed(
                parent,
                format!("property name {wire:?} contains {bad:?}, which cannot appear in a struct tag"),
            ));
        }
        let name = names.claim(&exported_name(wire));
        let required = object.is_required(wire);
        let resolved = renderer.property_type(guard, &format!("{parent}{name}"), property)?;

        let ty = if resolved.collection || resolved.ty.is_nilable() {
            resolved.ty
        } else if !required || renderer.closes_cycle(guard, &format!("{parent}{name}"), property) {
            resolved.ty.pointer()
        } else {
            resolved.ty
        };

        let constraints = property.unwrap_nullable().unwrap_or(property);
        fields.push(Field {
            name,
            doc: schema_doc(property).or_else(|| schema_doc(constraints)),
            ty,
            required,
            tag: Some(FieldTag {
                json: wire.clone(),
                omit_empty: !required,
                validate: validate_rules(constraints, required),
            }),
        });
    }
    Ok(fields)
}

/// Struct tags are raw strings holding quoted values: no backquote, quote,
/// backslash or control character survives in a wire name.
fn is_tag_safe(c: char) -> bool {
    !matches!(c, '`' | '"' | '\\') && !c.is_control()
}

/// Rules for the `validate` tag, or `None` when only the no-op default remains.
pub fn validate_rules(schema: &Schema, required: bool) -> Option<String> {
    let mut rules = Vec::new();
    if !required {
        rules.push("omitempty".to_string());
    }
    let defaults = rules.len();

    push_bound(&mut rules, schema.minimum, schema.exclusive_minimum, "gte", "gt");
    push_bound(&mut rules, schema.maximum, schema.exclusive_maximum, "lte", "lt");

    for (rule, bound) in [
        ("min", schema.min_length),
        ("max", schema.max_length),
        ("min", schema.min_items),
        ("max", schema.max_items),
    ] {
        if let Some(bound) = bound {
            rules.push(format!("{rule}={bound}"));
        }
    }

    (rules.len() > defaults).then(|| rules.join(","))
}

fn push_bound(
    rules: &mut Vec<String>,
    bound: Option<f64>,
    exclusive: Option<ExclusiveBound>,
    inclusive_op: &str,
    exclusive_op: &str,
) {
    if let Some(ExclusiveBound::Value(value)) = exclusive {
        rules.push(format!("{exclusive_op}={}", format_number(value)));
    }
    if let Some(bound) = bound {
        let op = if exclusive == Some(ExclusiveBound::Flag(true)) {
            exclusive_op
        } else {
            inclusive_op
        };
        rules.push(format!("{op}={}", format_number(bound)));
    }
}
