//! Operation Compiler: one client method per path and verb.
//!
//! For each operation this decides the request and response types, the
//! parameter list, the return signature and the URL path expression, then
//! hands query parameters to the option synthesizer and list responses to
//! the finder synthesizer.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::{GenError, SkippedOperation};
use crate::spec::{HttpMethod, MediaType, Operation, Parameter, PathItem, Schema};

use super::fields::UniqueNames;
use super::findable;
use super::options;
use super::render::TypeRenderer;
use super::resolve::{SchemaIndex, array_of_reference, bare_reference};
use super::types::{
    BodyTemplate, ClientCall, FunctionSignature, GoFile, GoParam, GoType, PathTemplate, Receiver,
    ResponseBinding,
};
use super::utils::{doc_lines, exported_name, local_name, to_snake_case};

/// A compiled operation and where it came from.
#[derive(Debug, Clone)]
pub struct CompiledOperation {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path template as written in the document.
    pub path: String,
    /// The emitted client method.
    pub signature: FunctionSignature,
}

/// Result of compiling one operation.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A client method was added to the unit.
    Emitted(CompiledOperation),
    /// Nothing was added; the report says why.
    Skipped(SkippedOperation),
}

/// Compiles every operation of a document into one [`GoFile`].
#[derive(Debug)]
pub struct OperationCompiler<'a> {
    index: SchemaIndex<'a>,
    names: BTreeSet<String>,
}

/// One path placeholder bound to its Go identifier.
#[derive(Debug)]
struct PathParam<'a> {
    wire: String,
    ident: String,
    param: &'a Parameter,
}

impl<'a> OperationCompiler<'a> {
    /// A compiler resolving references through `index`.
    pub fn new(index: SchemaIndex<'a>) -> Self {
        Self {
            index,
            names: BTreeSet::new(),
        }
    }

    /// Compile one operation, adding its declarations and functions to `file`.
    pub fn compile(
        &mut self,
        file: &mut GoFile,
        path: &str,
        method: HttpMethod,
        item: &'a PathItem,
        operation: &'a Operation,
    ) -> Result<Outcome, GenError> {
        let name = operation_name(operation, method, path);
        if !self.names.insert(name.clone()) {
            return Err(GenError::malformed(
                &name,
                format!("duplicate operation name ({method} {path})"),
            ));
        }

        let Some(response_schema) = operation
            .responses
            .get("200")
            .and_then(|response| json_schema(&response.content))
        else {
            warn!(
                operation = %name,
                method = %method,
                path = %path,
                "Operation has no JSON 200 response, skipping."
            );
            return Ok(Outcome::Skipped(SkippedOperation {
                name,
                method,
                path: path.to_string(),
                reason: "no JSON content for status 200".to_string(),
            }));
        };

        let parameters = self.merged_parameters(&name, item, operation)?;
        let mut renderer = TypeRenderer::new(self.index, file);

        let mut locals = UniqueNames::default();
        let mut params = vec![GoParam::new("ctx", GoType::ident("context.Context"))];
        let path_params = bind_path_params(&parameters, &mut locals);
        for bound in &path_params {
            let ty = match &bound.param.schema {
                Some(schema) => {
                    renderer.value_type(&format!("{name}{}", exported_name(&bound.wire)), schema)?
                }
                None => GoType::ident("string"),
            };
            params.push(GoParam::new(&bound.ident, ty));
        }

        let body_arg = match operation
            .request_body
            .as_ref()
            .and_then(|body| json_schema(&body.content))
        {
            Some(schema) => {
                let ty = self.body_type(&mut renderer, &name, schema)?;
                params.push(GoParam::new("body", ty));
                Some("body".to_string())
            }
            None => {
                if operation.request_body.is_some() {
                    debug!(operation = %name, "Request body has no JSON content, ignoring.");
                }
                None
            }
        };

        let query: Vec<&Parameter> = parameters
            .iter()
            .copied()
            .filter(|p| p.location == "query")
            .collect();
        let option_type = (!query.is_empty())
            .then(|| renderer.file_mut().claim_name(&options::option_type_name(&name)));
        let options_arg = option_type.as_ref().map(|option| {
            params.push(GoParam {
                name: "opts".to_string(),
                ty: GoType::ident(option),
                variadic: true,
            });
            "opts".to_string()
        });

        let (response, wrapper) = self.response_binding(&mut renderer, &name, response_schema)?;
        let return_type = match &response {
            ResponseBinding::Pointer(ty) => ty.clone().pointer(),
            ResponseBinding::Value(ty) => ty.clone(),
        };

        let signature = FunctionSignature {
            name: name.clone(),
            doc: Some(operation_doc(&name, method, path, operation)),
            receiver: Some(Receiver {
                name: "c".to_string(),
                ty: GoType::ident("Client").pointer(),
            }),
            params,
            returns: vec![return_type, GoType::ident("error")],
            body: BodyTemplate::ClientCall(ClientCall {
                method,
                path: path_template(&name, path, &path_params)?,
                body_arg,
                options_arg,
                response,
            }),
        };
        renderer.file_mut().push_function(signature.clone());

        if let Some(option) = &option_type {
            options::synthesize(&mut renderer, &name, option, &query)?;
        }
        if let Some(wrapper) = &wrapper {
            findable::synthesize(&mut renderer, &name, wrapper, response_schema)?;
        }

        debug!(operation = %name, method = %method, path = %path, "Compiled operation.");
        Ok(Outcome::Emitted(CompiledOperation {
            method,
            path: path.to_string(),
            signature,
        }))
    }

    /// Path-level parameters followed by operation-level ones; an operation
    /// parameter replaces a path-level one with the same name and location.
    fn merged_parameters(
        &self,
        name: &str,
        item: &'a PathItem,
        operation: &'a Operation,
    ) -> Result<Vec<&'a Parameter>, GenError> {
        let mut merged: Vec<&'a Parameter> = Vec::new();
        for param in item.parameters.iter().chain(&operation.parameters) {
            let param = self.index.parameter(param, name)?;
            if !matches!(param.location.as_str(), "path" | "query") {
                debug!(
                    operation = %name,
                    parameter = %param.name,
                    location = %param.location,
                    "Skipping parameter outside path and query."
                );
                continue;
            }
            match merged
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(slot) => *slot = param,
                None => merged.push(param),
            }
        }
        Ok(merged)
    }

    fn body_type(
        &self,
        renderer: &mut TypeRenderer<'a, '_>,
        name: &str,
        schema: &'a Schema,
    ) -> Result<GoType, GenError> {
        if let Some(ref_path) = bare_reference(schema) {
            let ty = GoType::ident(self.index.type_name(ref_path, name)?);
            return Ok(if self.index.is_object_ref(schema, name)? {
                ty.pointer()
            } else {
                ty
            });
        }
        if let Some(ref_path) = array_of_reference(schema) {
            return Ok(GoType::slice(GoType::ident(
                self.index.type_name(ref_path, name)?,
            )));
        }

        let request = renderer.file_mut().claim_name(&format!("{name}Request"));
        renderer.render(&request, schema)?;
        let is_struct = renderer
            .file()
            .find(&request)
            .is_some_and(|decl| decl.is_struct());
        let ty = GoType::ident(request);
        Ok(if is_struct { ty.pointer() } else { ty })
    }

    /// How the decoded response is returned, and the name of the
    /// `<Op>Response` struct when one was declared for it.
    fn response_binding(
        &self,
        renderer: &mut TypeRenderer<'a, '_>,
        name: &str,
        schema: &'a Schema,
    ) -> Result<(ResponseBinding, Option<String>), GenError> {
        if let Some(ref_path) = bare_reference(schema) {
            let ty = GoType::ident(self.index.type_name(ref_path, name)?);
            let binding = if self.index.is_object_ref(schema, name)? {
                ResponseBinding::Pointer(ty)
            } else {
                ResponseBinding::Value(ty)
            };
            return Ok((binding, None));
        }
        if let Some(ref_path) = array_of_reference(schema) {
            let ty = GoType::slice(GoType::ident(self.index.type_name(ref_path, name)?));
            return Ok((ResponseBinding::Value(ty), None));
        }

        let response = renderer.file_mut().claim_name(&format!("{name}Response"));
        renderer.render(&response, schema)?;
        let is_struct = renderer
            .file()
            .find(&response)
            .is_some_and(|decl| decl.is_struct());
        let ty = GoType::ident(&response);
        Ok(if is_struct {
            (ResponseBinding::Pointer(ty), Some(response))
        } else {
            (ResponseBinding::Value(ty), None)
        })
    }
}

/// Go function name: the operation id, else the verb and path segments.
pub fn operation_name(operation: &Operation, method: HttpMethod, path: &str) -> String {
    if let Some(id) = operation.operation_id.as_deref().filter(|id| !id.trim().is_empty()) {
        return exported_name(id);
    }
    let mut words = vec![method.as_str().to_ascii_lowercase()];
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => {
                words.push("by".to_string());
                words.push(param.to_string());
            }
            None => words.push(segment.to_string()),
        }
    }
    exported_name(&words.join("_"))
}

/// The schema of the JSON entry of a content map.
pub fn json_schema(content: &BTreeMap<String, MediaType>) -> Option<&Schema> {
    let is_json = |media: &str| {
        let essence = media.split(';').next().unwrap_or(media).trim();
        essence == "application/json" || essence.ends_with("+json")
    };
    content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(media, _)| is_json(media))
                .map(|(_, m)| m)
        })
        .and_then(|media| media.schema.as_ref())
}

fn bind_path_params<'a>(parameters: &[&'a Parameter], locals: &mut UniqueNames) -> Vec<PathParam<'a>> {
    parameters
        .iter()
        .filter(|p| p.location == "path")
        .map(|&param| {
            let wire = param.name.replace('*', "");
            PathParam {
                ident: locals.claim(&local_name(&wire)),
                wire,
                param,
            }
        })
        .collect()
}

/// Literal path, or a `%v` format plus the identifiers in placeholder order.
fn path_template(name: &str, path: &str, params: &[PathParam<'_>]) -> Result<PathTemplate, GenError> {
    if !path.contains('{') {
        return Ok(PathTemplate {
            format: path.to_string(),
            args: Vec::new(),
        });
    }

    let mut format = String::with_capacity(path.len());
    let mut args = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        format.push_str(&rest[..open].replace('%', "%%"));
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(GenError::malformed(
                name,
                format!("unterminated placeholder in path '{path}'"),
            ));
        };
        let placeholder = after[..close].replace('*', "");
        let bound = params
            .iter()
            .find(|p| p.wire == placeholder)
            .or_else(|| {
                params
                    .iter()
                    .find(|p| to_snake_case(&p.wire) == to_snake_case(&placeholder))
            })
            .ok_or_else(|| {
                GenError::malformed(
                    name,
                    format!("path placeholder '{{{placeholder}}}' has no path parameter"),
                )
            })?;
        format.push_str("%v");
        args.push(bound.ident.clone());
        rest = &after[close + 1..];
    }
    format.push_str(&rest.replace('%', "%%"));
    Ok(PathTemplate { format, args })
}

fn operation_doc(name: &str, method: HttpMethod, path: &str, operation: &Operation) -> String {
    let mut lines = vec![format!("{name} performs {method} {path}.")];
    let detail = operation
        .summary
        .as_deref()
        .map(doc_lines)
        .filter(|lines| !lines.is_empty())
        .or_else(|| operation.description.as_deref().map(doc_lines));
    if let Some(detail) = detail.filter(|lines| !lines.is_empty()) {
        lines.push(String::new());
        lines.extend(detail);
    }
    lines.join("\n")
}
