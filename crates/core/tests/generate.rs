//! Integration tests for oasgo-core code generation.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use oasgo_core::{
    Document, FormatterKind, GenError, UnitOptions, generate_operations, generate_types,
    write_unit,
};

fn options(package: &str) -> UnitOptions {
    UnitOptions {
        package: package.to_string(),
        formatter: FormatterKind::Builtin,
    }
}

fn types_unit(json: &str) -> String {
    let doc = Document::from_json(json).unwrap();
    generate_types(&doc, &options("models")).unwrap().source
}

fn operations_unit(json: &str) -> String {
    let doc = Document::from_json(json).unwrap();
    generate_operations(&doc, &options("api")).unwrap().source
}

const WIDGET_API: &str = r##"{
    "openapi": "3.1.0",
    "paths": {
        "/widgets": {
            "get": {
                "operationId": "listWidgets",
                "summary": "List widgets.",
                "parameters": [
                    { "name": "state", "in": "query", "schema": { "type": "string", "enum": ["active", "archived"] } }
                ],
                "responses": { "200": { "content": { "application/json": { "schema": {
                    "type": "object",
                    "properties": {
                        "count": { "type": "integer" },
                        "widget": { "type": "array", "items": {
                            "type": "object",
                            "required": ["id"],
                            "properties": {
                                "id": { "type": "string", "format": "uuid" },
                                "name": { "type": "string" },
                                "color": { "type": "string" }
                            }
                        } }
                    }
                } } } } }
            }
        },
        "/widgets/{widget_id}": {
            "get": {
                "operationId": "getWidget",
                "parameters": [{ "name": "widget_id", "in": "path", "required": true, "schema": { "type": "string" } }],
                "responses": { "200": { "content": { "application/json": { "schema": {
                    "type": "object",
                    "properties": { "id": { "type": "string" }, "name": { "type": "string" } }
                } } } } }
            },
            "delete": {
                "operationId": "deleteWidget",
                "parameters": [{ "name": "widget_id", "in": "path", "required": true, "schema": { "type": "string" } }],
                "responses": { "204": { "description": "Deleted." } }
            }
        }
    },
    "components": { "schemas": {
        "Widget": {
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "name": { "type": "string" }
            }
        },
        "Node": {
            "type": "object",
            "properties": {
                "children": { "type": "array", "items": { "$ref": "#/components/schemas/Node" } },
                "next": { "$ref": "#/components/schemas/Node" },
                "value": { "type": "integer" }
            }
        }
    } }
}"##;

#[test]
fn widget_record_fields_and_tags() {
    let source = types_unit(WIDGET_API);
    assert!(source.starts_with("// Code generated by oasgo. DO NOT EDIT.\n\npackage models\n"));
    assert!(source.contains("\t\"github.com/google/uuid\"\n"));
    assert!(source.contains(
        "type Widget struct {\n\tID uuid.UUID `json:\"id\"`\n\tName *string `json:\"name,omitempty\"`\n}\n"
    ));
}

#[test]
fn self_referential_schema_declares_once() {
    let source = types_unit(WIDGET_API);
    assert_eq!(source.matches("type Node struct").count(), 1);
    assert!(source.contains("\tChildren []Node `json:\"children,omitempty\"`\n"));
    assert!(source.contains("\tNext *Node `json:\"next,omitempty\"`\n"));
    assert!(source.contains("\tValue *int `json:\"value,omitempty\"`\n"));
}

#[test]
fn output_is_deterministic() {
    assert_eq!(types_unit(WIDGET_API), types_unit(WIDGET_API));
    assert_eq!(operations_unit(WIDGET_API), operations_unit(WIDGET_API));
}

#[test]
fn list_operation_gets_finder() {
    let source = operations_unit(WIDGET_API);
    assert!(source.contains(
        "func (r *ListWidgetsResponse) FindWidget(nameOrID string) (*ListWidgetsResponseWidgetItem, error) {"
    ));
    assert!(source.contains("type NotFoundError struct {"));
    assert!(source.contains("func (e *NotFoundError) Error() string {"));
    assert!(!source.contains("FindGetWidget"));
    assert_eq!(source.matches("func (r *").count(), 1);
}

#[test]
fn query_enum_gets_constants_and_option() {
    let source = operations_unit(WIDGET_API);
    assert!(source.contains("type ListWidgetsState string\n"));
    assert!(source.contains("\tListWidgetsStateActive ListWidgetsState = \"active\"\n"));
    assert!(source.contains("\tListWidgetsStateArchived ListWidgetsState = \"archived\"\n"));
    assert!(source.contains("type ListWidgetsOption func(url.Values)\n"));
    assert!(source.contains(
        "func ListWidgetsWithState(v ListWidgetsState) ListWidgetsOption {\n\treturn func(q url.Values) {\n\t\tq.Set(\"state\", fmt.Sprint(v))\n\t}\n}\n"
    ));
    assert!(source.contains(
        "func (c *Client) ListWidgets(ctx context.Context, opts ...ListWidgetsOption) (*ListWidgetsResponse, error) {"
    ));
}

#[test]
fn path_parameters_build_the_url() {
    let source = operations_unit(WIDGET_API);
    assert!(source.contains(
        "func (c *Client) GetWidget(ctx context.Context, widgetID string) (*GetWidgetResponse, error) {"
    ));
    assert!(source.contains("\tpath := fmt.Sprintf(\"/widgets/%v\", widgetID)\n"));
    assert!(source.contains("\treq, err := c.newRequest(ctx, http.MethodGet, path, nil)\n"));
}

#[test]
fn operation_without_json_response_is_reported() {
    let doc = Document::from_json(WIDGET_API).unwrap();
    let generated = generate_operations(&doc, &options("api")).unwrap();
    assert!(!generated.source.contains("DeleteWidget"));
    assert_eq!(generated.report.skipped.len(), 1);
    assert_eq!(generated.report.skipped[0].name, "DeleteWidget");
    assert!(!generated.report.is_clean());
}

#[test]
fn manifest_lists_signatures() {
    let doc = Document::from_json(WIDGET_API).unwrap();
    let generated = generate_operations(&doc, &options("api")).unwrap();
    let manifest = generated.manifest();
    let names: Vec<_> = manifest.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["ListWidgets", "GetWidget"]);

    let get = &manifest[1];
    assert_eq!(get.method, "GET");
    assert_eq!(get.path, "/widgets/{widget_id}");
    assert_eq!(get.params[1].name, "widgetID");
    assert_eq!(get.returns, vec!["*GetWidgetResponse", "error"]);

    let json = serde_json::to_value(&manifest).unwrap();
    assert_eq!(json[0]["params"][1]["variadic"], serde_json::json!(true));
    assert!(json[1]["params"][1].get("variadic").is_none());
}

#[test]
fn unsupported_shapes_are_reported_together() {
    let doc = Document::from_json(
        r#"{ "components": { "schemas": {
            "Pet": { "oneOf": [{ "type": "string" }, { "type": "integer" }] },
            "Fine": { "type": "string" },
            "Bag": { "type": "object", "additionalProperties": {} }
        } } }"#,
    )
    .unwrap();
    let err = generate_types(&doc, &options("models")).unwrap_err();
    let GenError::UnsupportedShapes(shapes) = &err else {
        panic!("expected aggregated shapes, got {err}");
    };
    let names: Vec<_> = shapes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Bag", "Pet"]);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn malformed_schema_aborts_the_run() {
    let doc = Document::from_json(
        r#"{ "components": { "schemas": { "Blob": { "description": "anything" } } } }"#,
    )
    .unwrap();
    let err = generate_types(&doc, &options("models")).unwrap_err();
    assert!(matches!(err, GenError::Malformed { ref name, .. } if name == "Blob"));
}

#[test]
fn yaml_documents_are_accepted() {
    let doc = Document::from_yaml(
        "components:\n  schemas:\n    Color:\n      type: string\n      enum: [red, green]\n",
    )
    .unwrap();
    let source = generate_types(&doc, &options("models")).unwrap().source;
    assert!(source.contains("type Color string\n"));
    assert!(source.contains("\tColorRed Color = \"red\"\n"));
}

#[test]
fn write_unit_skips_unchanged_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gen").join("models.go");
    let doc = Document::from_json(WIDGET_API).unwrap();
    let generated = generate_types(&doc, &options("models")).unwrap();

    assert!(write_unit(&generated, &path).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), generated.source);
    assert!(!write_unit(&generated, &path).unwrap());
}

const CROWDED_NAMES: &str = r##"{
    "paths": {
        "/widgets": {
            "get": {
                "operationId": "listWidgets",
                "parameters": [{ "name": "limit", "in": "query", "schema": { "type": "integer" } }],
                "responses": { "200": { "content": { "application/json": { "schema": {
                    "type": "object",
                    "properties": { "total": { "type": "integer" } }
                } } } } }
            }
        }
    },
    "components": { "schemas": {
        "ListWidgetsOption": { "type": "string" },
        "ListWidgetsResponse": { "type": "object", "properties": { "cursor": { "type": "string" } } },
        "Widget": { "type": "object", "properties": {
            "owner": { "type": "object", "properties": { "email": { "type": "string" } } }
        } },
        "WidgetOwner": { "type": "object", "properties": { "id": { "type": "string" } } }
    } }
}"##;

#[test]
fn nested_types_do_not_shadow_components() {
    let source = types_unit(CROWDED_NAMES);
    assert_eq!(source.matches("type WidgetOwner struct {").count(), 1);
    assert!(source.contains("type WidgetOwner2 struct {\n\tEmail *string `json:\"email,omitempty\"`\n}\n"));
    assert!(source.contains("\tOwner *WidgetOwner2 `json:\"owner,omitempty\"`\n"));
}

#[test]
fn operation_types_do_not_shadow_components() {
    let source = operations_unit(CROWDED_NAMES);
    assert!(source.contains(
        "func (c *Client) ListWidgets(ctx context.Context, opts ...ListWidgetsOption2) (*ListWidgetsResponse2, error) {"
    ));
    assert!(source.contains("type ListWidgetsResponse2 struct {"));
    assert!(source.contains("type ListWidgetsOption2 func(url.Values)\n"));
    assert!(!source.contains("type ListWidgetsResponse struct"));
    assert!(!source.contains("type ListWidgetsOption func"));
    assert!(source.contains("func ListWidgetsWithLimit(v int) ListWidgetsOption2 {"));
}

#[test]
fn required_self_reference_stays_a_pointer() {
    let source = types_unit(
        r##"{ "components": { "schemas": {
            "Node": { "type": "object", "required": ["next", "value"], "properties": {
                "next": { "$ref": "#/components/schemas/Node" },
                "value": { "type": "integer" }
            } }
        } } }"##,
    );
    assert!(source.contains("\tNext *Node `json:\"next\"`\n"));
    assert!(source.contains("\tValue int `json:\"value\"`\n"));
}

#[test]
fn property_names_that_break_tags_are_rejected() {
    let doc = Document::from_json(
        r#"{ "components": { "schemas": {
            "Thing": { "type": "object", "properties": { "we\"ird": { "type": "string" } } }
        } } }"#,
    )
    .unwrap();
    let err = generate_types(&doc, &options("models")).unwrap_err();
    assert!(matches!(err, GenError::Malformed { ref name, .. } if name == "Thing"));
}
