//! Go code emission via the Emit trait.
//!
//! Each IR node renders itself to Go source text. Emission is mechanical:
//! every naming and typing decision was made while building the IR.

use super::types::{
    BodyTemplate, ClientCall, DeclShape, EnumConst, Field, FieldTag, FinderBody, FinderField,
    FunctionSignature, GoFile, GoLiteral, GoParam, GoType, ResponseBinding, TypeDecl,
};
use super::utils::{format_number, go_string_literal};

/// Trait for emitting Go code from IR nodes.
pub trait Emit {
    /// Convert the node to its Go source representation.
    fn emit(&self) -> String;
}

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// Code generated by oasgo. DO NOT EDIT.";

// =============================================================================
// Types and literals
// =============================================================================

impl Emit for GoType {
    fn emit(&self) -> String {
        match self {
            GoType::Ident(name) => name.clone(),
            GoType::Pointer(inner) => format!("*{}", inner.emit()),
            GoType::Slice(inner) => format!("[]{}", inner.emit()),
            GoType::Map(value) => format!("map[string]{}", value.emit()),
            GoType::Any => "any".to_string(),
        }
    }
}

impl Emit for GoLiteral {
    fn emit(&self) -> String {
        match self {
            GoLiteral::String(s) => go_string_literal(s),
            GoLiteral::Int(n) => n.to_string(),
            GoLiteral::Float(f) => {
                let text = format_number(*f);
                // keep float constants untyped-float in Go
                if text.contains(['.', 'e', 'E']) {
                    text
                } else {
                    format!("{text}.0")
                }
            }
            GoLiteral::Bool(b) => b.to_string(),
        }
    }
}

fn comment(doc: Option<&str>, indent: &str) -> String {
    let mut out = String::new();
    for line in doc.into_iter().flat_map(str::lines) {
        if line.is_empty() {
            out.push_str(&format!("{indent}//\n"));
        } else {
            out.push_str(&format!("{indent}// {line}\n"));
        }
    }
    out
}

// =============================================================================
// Declarations
// =============================================================================

impl Emit for FieldTag {
    fn emit(&self) -> String {
        let omit = if self.omit_empty { ",omitempty" } else { "" };
        let mut tag = format!("json:\"{}{omit}\"", self.json);
        if let Some(rules) = &self.validate {
            tag.push_str(&format!(" validate:\"{rules}\""));
        }
        format!("`{tag}`")
    }
}

impl Emit for Field {
    fn emit(&self) -> String {
        let mut out = comment(self.doc.as_deref(), "\t");
        out.push_str(&format!("\t{} {}", self.name, self.ty.emit()));
        if let Some(tag) = &self.tag {
            out.push(' ');
            out.push_str(&tag.emit());
        }
        out.push('\n');
        out
    }
}

impl Emit for EnumConst {
    fn emit(&self) -> String {
        self.value.emit()
    }
}

impl Emit for TypeDecl {
    fn emit(&self) -> String {
        let mut out = comment(self.doc.as_deref(), "");
        match &self.shape {
            DeclShape::Alias(ty) => {
                out.push_str(&format!("type {} = {}\n", self.name, ty.emit()));
            }
            DeclShape::Enum {
                underlying,
                constants,
            } => {
                out.push_str(&format!("type {} {}\n", self.name, underlying.emit()));
                if !constants.is_empty() {
                    out.push_str("\nconst (\n");
                    for constant in constants {
                        out.push_str(&format!(
                            "\t{} {} = {}\n",
                            constant.name,
                            self.name,
                            constant.emit()
                        ));
                    }
                    out.push_str(")\n");
                }
            }
            DeclShape::Struct(fields) if fields.is_empty() => {
                out.push_str(&format!("type {} struct{{}}\n", self.name));
            }
            DeclShape::Struct(fields) => {
                out.push_str(&format!("type {} struct {{\n", self.name));
                for field in fields {
                    out.push_str(&field.emit());
                }
                out.push_str("}\n");
            }
            DeclShape::Slice(item) => {
                out.push_str(&format!("type {} []{}\n", self.name, item.emit()));
            }
            DeclShape::Map(value) => {
                out.push_str(&format!("type {} map[string]{}\n", self.name, value.emit()));
            }
            DeclShape::FuncType(params) => {
                let params: Vec<_> = params.iter().map(Emit::emit).collect();
                out.push_str(&format!("type {} func({})\n", self.name, params.join(", ")));
            }
        }
        out
    }
}

// =============================================================================
// Functions
// =============================================================================

impl Emit for GoParam {
    fn emit(&self) -> String {
        let dots = if self.variadic { "..." } else { "" };
        format!("{} {dots}{}", self.name, self.ty.emit())
    }
}

impl Emit for FunctionSignature {
    fn emit(&self) -> String {
        let mut out = comment(self.doc.as_deref(), "");
        out.push_str("func ");
        if let Some(receiver) = &self.receiver {
            out.push_str(&format!("({} {}) ", receiver.name, receiver.ty.emit()));
        }
        let params: Vec<_> = self.params.iter().map(Emit::emit).collect();
        out.push_str(&format!("{}({})", self.name, params.join(", ")));

        let returns: Vec<_> = self.returns.iter().map(Emit::emit).collect();
        match returns.as_slice() {
            [] => {}
            [single] => out.push_str(&format!(" {single}")),
            many => out.push_str(&format!(" ({})", many.join(", "))),
        }

        out.push_str(" {\n");
        out.push_str(&self.emit_body());
        out.push_str("}\n");
        out
    }
}

impl FunctionSignature {
    fn emit_body(&self) -> String {
        match &self.body {
            BodyTemplate::ClientCall(call) => client_call(call),
            BodyTemplate::QueryOption {
                wire_name,
                repeated,
            } => query_option(wire_name, *repeated),
            BodyTemplate::Finder(finder) => finder_body(finder),
            BodyTemplate::NotFoundMessage => {
                "\treturn fmt.Sprintf(\"%s %q not found\", e.Kind, e.Key)\n".to_string()
            }
        }
    }
}

fn client_call(call: &ClientCall) -> String {
    let (out_ty, ok_value, err_value) = match &call.response {
        ResponseBinding::Pointer(ty) => (ty, "&out", "nil"),
        ResponseBinding::Value(ty) => (ty, "out", "out"),
    };

    let mut body = format!("\tvar out {}\n", out_ty.emit());
    if call.path.args.is_empty() {
        body.push_str(&format!("\tpath := {}\n", go_string_literal(&call.path.format)));
    } else {
        body.push_str(&format!(
            "\tpath := fmt.Sprintf({}, {})\n",
            go_string_literal(&call.path.format),
            call.path.args.join(", ")
        ));
    }
    body.push_str(&format!(
        "\treq, err := c.newRequest(ctx, {}, path, {})\n",
        call.method.go_constant(),
        call.body_arg.as_deref().unwrap_or("nil")
    ));
    body.push_str(&format!("\tif err != nil {{\n\t\treturn {err_value}, err\n\t}}\n"));

    if let Some(opts) = &call.options_arg {
        body.push_str("\tq := req.URL.Query()\n");
        body.push_str(&format!("\tfor _, opt := range {opts} {{\n\t\topt(q)\n\t}}\n"));
        body.push_str("\treq.URL.RawQuery = q.Encode()\n");
    }

    body.push_str(&format!(
        "\tif err := c.do(req, &out); err != nil {{\n\t\treturn {err_value}, err\n\t}}\n"
    ));
    body.push_str(&format!("\treturn {ok_value}, nil\n"));
    body
}

fn query_option(wire_name: &str, repeated: bool) -> String {
    let key = go_string_literal(wire_name);
    let mut body = String::from("\treturn func(q url.Values) {\n");
    if repeated {
        body.push_str(&format!(
            "\t\tfor _, item := range v {{\n\t\t\tq.Add({key}, fmt.Sprint(item))\n\t\t}}\n"
        ));
    } else {
        body.push_str(&format!("\t\tq.Set({key}, fmt.Sprint(v))\n"));
    }
    body.push_str("\t}\n");
    body
}

fn finder_match(field: &FinderField) -> String {
    let access = format!("item.{}", field.name);
    let value = if field.pointer {
        format!("*{access}")
    } else {
        access.clone()
    };
    let compare = if field.is_string {
        format!("{value} == nameOrID")
    } else {
        format!("fmt.Sprint({value}) == nameOrID")
    };
    let condition = if field.pointer {
        format!("{access} != nil && {compare}")
    } else {
        compare
    };
    format!("\t\tif {condition} {{\n\t\t\treturn item, nil\n\t\t}}\n")
}

fn finder_body(finder: &FinderBody) -> String {
    let mut body = format!(
        "\tfor i := range r.{} {{\n\t\titem := &r.{}[i]\n",
        finder.slice_field, finder.slice_field
    );
    body.push_str(&finder_match(&finder.name_field));
    body.push_str(&finder_match(&finder.id_field));
    body.push_str("\t}\n");
    body.push_str(&format!(
        "\treturn nil, &NotFoundError{{Kind: {}, Key: nameOrID}}\n",
        go_string_literal(&finder.kind)
    ));
    body
}

// =============================================================================
// Units
// =============================================================================

impl Emit for GoFile {
    fn emit(&self) -> String {
        let mut out = format!("{GENERATED_HEADER}\n\npackage {}\n", self.package);

        let imports = self.imports();
        if !imports.is_empty() {
            let (std, third_party): (Vec<_>, Vec<_>) =
                imports.into_iter().partition(|path| !path.contains('.'));
            out.push_str("\nimport (\n");
            for path in &std {
                out.push_str(&format!("\t{}\n", go_string_literal(path)));
            }
            if !std.is_empty() && !third_party.is_empty() {
                out.push('\n');
            }
            for path in &third_party {
                out.push_str(&format!("\t{}\n", go_string_literal(path)));
            }
            out.push_str(")\n");
        }

        for decl in self.decls() {
            out.push('\n');
            out.push_str(&decl.emit());
        }
        for function in self.functions() {
            out.push('\n');
            out.push_str(&function.emit());
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::types::{PathTemplate, Receiver};
    use crate::spec::HttpMethod;

    #[test]
    fn test_struct_with_tags() {
        let decl = TypeDecl {
            name: "Widget".into(),
            doc: Some("A widget.".into()),
            shape: DeclShape::Struct(vec![
                Field {
                    name: "ID".into(),
                    doc: None,
                    ty: GoType::ident("uuid.UUID"),
                    required: true,
                    tag: Some(FieldTag {
                        json: "id".into(),
                        omit_empty: false,
                        validate: None,
                    }),
                },
                Field {
                    name: "Name".into(),
                    doc: Some("Display name.".into()),
                    ty: GoType::ident("string").pointer(),
                    required: false,
                    tag: Some(FieldTag {
                        json: "name".into(),
                        omit_empty: true,
                        validate: Some("omitempty,max=64".into()),
                    }),
                },
            ]),
        };
        assert_eq!(
            decl.emit(),
            "// A widget.\n\
             type Widget struct {\n\
             \tID uuid.UUID `json:\"id\"`\n\
             \t// Display name.\n\
             \tName *string `json:\"name,omitempty\" validate:\"omitempty,max=64\"`\n\
             }\n"
        );
    }

    #[test]
    fn test_enum_declaration() {
        let decl = TypeDecl {
            name: "Ratio".into(),
            doc: None,
            shape: DeclShape::Enum {
                underlying: GoType::ident("float64"),
                constants: vec![
                    EnumConst {
                        name: "Ratio1".into(),
                        value: GoLiteral::Float(1.0),
                    },
                    EnumConst {
                        name: "Ratio1_5".into(),
                        value: GoLiteral::Float(1.5),
                    },
                ],
            },
        };
        assert_eq!(
            decl.emit(),
            "type Ratio float64\n\nconst (\n\tRatio1 Ratio = 1.0\n\tRatio1_5 Ratio = 1.5\n)\n"
        );
    }

    #[test]
    fn test_client_call_with_options() {
        let function = FunctionSignature {
            name: "ListParts".into(),
            doc: None,
            receiver: Some(Receiver {
                name: "c".into(),
                ty: GoType::ident("Client").pointer(),
            }),
            params: vec![
                GoParam::new("ctx", GoType::ident("context.Context")),
                GoParam::new("widgetID", GoType::ident("string")),
                GoParam {
                    name: "opts".into(),
                    ty: GoType::ident("ListPartsOption"),
                    variadic: true,
                },
            ],
            returns: vec![
                GoType::slice(GoType::ident("Part")),
                GoType::ident("error"),
            ],
            body: BodyTemplate::ClientCall(ClientCall {
                method: HttpMethod::Get,
                path: PathTemplate {
                    format: "/widgets/%v/parts".into(),
                    args: vec!["widgetID".into()],
                },
                body_arg: None,
                options_arg: Some("opts".into()),
                response: ResponseBinding::Value(GoType::slice(GoType::ident("Part"))),
            }),
        };
        let text = function.emit();
        assert!(text.starts_with(
            "func (c *Client) ListParts(ctx context.Context, widgetID string, opts ...ListPartsOption) ([]Part, error) {\n"
        ));
        assert!(text.contains("\tvar out []Part\n"));
        assert!(text.contains("\tpath := fmt.Sprintf(\"/widgets/%v/parts\", widgetID)\n"));
        assert!(text.contains("c.newRequest(ctx, http.MethodGet, path, nil)"));
        assert!(text.contains("\t\topt(q)\n"));
        assert!(text.contains("\t\treturn out, err\n"));
        assert!(text.ends_with("\treturn out, nil\n}\n"));
    }

    #[test]
    fn test_finder_body() {
        let body = finder_body(&FinderBody {
            slice_field: "Widget".into(),
            kind: "widget".into(),
            name_field: FinderField {
                name: "Name".into(),
                pointer: true,
                is_string: true,
            },
            id_field: FinderField {
                name: "ID".into(),
                pointer: false,
                is_string: false,
            },
        });
        assert!(body.contains("\t\titem := &r.Widget[i]\n"));
        assert!(body.contains("if item.Name != nil && *item.Name == nameOrID {"));
        assert!(body.contains("if fmt.Sprint(item.ID) == nameOrID {"));
        assert!(body.contains("&NotFoundError{Kind: \"widget\", Key: nameOrID}"));
    }

    #[test]
    fn test_file_header_and_imports() {
        let mut file = GoFile::new("models");
        file.declare(TypeDecl {
            name: "At".into(),
            doc: None,
            shape: DeclShape::Alias(GoType::ident("time.Time")),
        })
        .unwrap();
        file.declare(TypeDecl {
            name: "ID".into(),
            doc: None,
            shape: DeclShape::Alias(GoType::ident("uuid.UUID")),
        })
        .unwrap();
        assert_eq!(
            file.emit(),
            "// Code generated by oasgo. DO NOT EDIT.\n\n\
             package models\n\n\
             import (\n\t\"time\"\n\n\t\"github.com/google/uuid\"\n)\n\n\
             type At = time.Time\n\n\
             type ID = uuid.UUID\n"
        );
    }
}
