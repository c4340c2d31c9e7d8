//! Query-Option Synthesizer: functional options for query parameters.

use crate::error::GenError;
use crate::spec::Parameter;

use super::fields::UniqueNames;
use super::render::TypeRenderer;
use super::types::{BodyTemplate, DeclShape, FunctionSignature, GoParam, GoType, TypeDecl};
use super::utils::{doc_lines, exported_name};

/// Name of the option type of an operation.
pub fn option_type_name(operation: &str) -> String {
    format!("{operation}Option")
}

/// Declare the option type `option` (normally `<Op>Option`) and one
/// `<Op>With<Param>` constructor per query parameter.
pub(super) fn synthesize<'a>(
    renderer: &mut TypeRenderer<'a, '_>,
    operation: &str,
    option: &str,
    query: &[&'a Parameter],
) -> Result<(), GenError> {
    renderer.file_mut().declare(TypeDecl {
        name: option.to_string(),
        doc: Some(format!(
            "{option} sets one query parameter of a {operation} request."
        )),
        shape: DeclShape::FuncType(vec![GoType::ident("url.Values")]),
    })?;

    let mut names = UniqueNames::default();
    for param in query {
        let suffix = names.claim(&exported_name(&param.name));
        let ty = match &param.schema {
            Some(schema) => renderer.value_type(&format!("{operation}{suffix}"), schema)?,
            None => GoType::ident("string"),
        };
        let constructor = format!("{operation}With{suffix}");

        let mut doc = vec![format!(
            "{constructor} sets the {:?} query parameter.",
            param.name
        )];
        if let Some(description) = &param.description {
            doc.extend(doc_lines(description));
        }

        renderer.file_mut().push_function(FunctionSignature {
            name: constructor,
            doc: Some(doc.join("\n")),
            receiver: None,
            params: vec![GoParam::new("v", ty.clone())],
            returns: vec![GoType::ident(option)],
            body: BodyTemplate::QueryOption {
                wire_name: param.name.clone(),
                repeated: ty.is_slice(),
            },
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::resolve::SchemaIndex;
    use crate::ir::types::{GoFile, GoLiteral};

    fn param(json: &str) -> Parameter {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_enum_query_parameter() {
        let state = param(
            r#"{ "name": "state", "in": "query", "schema": { "type": "string", "enum": ["active", "archived"] } }"#,
        );
        let mut file = GoFile::new("api");
        let mut renderer = TypeRenderer::new(SchemaIndex::new(None), &mut file);
        synthesize(&mut renderer, "ListWidgets", "ListWidgetsOption", &[&state]).unwrap();

        let DeclShape::Enum { constants, .. } = &file.find("ListWidgetsState").unwrap().shape else {
            panic!("expected enum declaration");
        };
        assert_eq!(constants.len(), 2);
        assert_eq!(constants[0].name, "ListWidgetsStateActive");
        assert_eq!(constants[0].value, GoLiteral::String("active".into()));

        let option = &file.functions()[0];
        assert_eq!(option.name, "ListWidgetsWithState");
        assert_eq!(option.params[0].ty, GoType::ident("ListWidgetsState"));
        assert_eq!(option.returns, vec![GoType::ident("ListWidgetsOption")]);
        assert!(file.find("ListWidgetsOption").is_some());
    }

    #[test]
    fn test_array_query_parameter_is_repeated() {
        let tags = param(
            r#"{ "name": "tag", "in": "query", "schema": { "type": "array", "items": { "type": "string" } } }"#,
        );
        let limit = param(r#"{ "name": "limit", "in": "query", "schema": { "type": "integer" } }"#);
        let mut file = GoFile::new("api");
        let mut renderer = TypeRenderer::new(SchemaIndex::new(None), &mut file);
        synthesize(&mut renderer, "Search", "SearchOption", &[&tags, &limit]).unwrap();

        let functions = file.functions();
        assert_eq!(functions.len(), 2);
        assert_eq!(
            functions[0].body,
            BodyTemplate::QueryOption {
                wire_name: "tag".into(),
                repeated: true
            }
        );
        assert_eq!(functions[1].name, "SearchWithLimit");
        assert_eq!(functions[1].params[0].ty, GoType::ident("int"));
    }
}
