//! Integration tests for the oasgo CLI.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use oasgo_cli::{DRIFT_EXIT_CODE, run_cli};

const PETSTORE: &str = r##"
openapi: 3.0.3
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          schema: { type: integer }
      responses:
        "200":
          content:
            application/json:
              schema:
                type: object
                properties:
                  pets:
                    type: array
                    items: { $ref: "#/components/schemas/Pet" }
    post:
      operationId: createPet
      requestBody:
        content:
          application/json:
            schema: { $ref: "#/components/schemas/Pet" }
      responses:
        "200":
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Pet" }
components:
  schemas:
    Pet:
      type: object
      required: [id, name]
      properties:
        id: { type: integer, format: int64 }
        name: { type: string }
        tag: { type: string }
"##;

fn cli(args: &[&str]) -> i32 {
    let mut argv = vec!["oasgo".to_string()];
    argv.extend(args.iter().map(|a| (*a).to_string()));
    run_cli(argv)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn write_spec(dir: &Path) -> std::path::PathBuf {
    let spec = dir.join("petstore.yaml");
    fs::write(&spec, PETSTORE).unwrap();
    spec
}

#[test]
fn types_command_writes_the_unit() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("gen").join("models.go");

    let code = cli(&[
        "types",
        "--input",
        path_arg(&spec),
        "--output",
        path_arg(&out),
        "--formatter",
        "builtin",
    ]);
    assert_eq!(code, 0);

    let source = fs::read_to_string(&out).unwrap();
    assert!(source.starts_with("// Code generated by oasgo. DO NOT EDIT.\n\npackage models\n"));
    assert!(source.contains("type Pet struct {"));
    assert!(source.contains("\tTag *string `json:\"tag,omitempty\"`\n"));
}

#[test]
fn operations_command_writes_unit_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("operations.go");
    let manifest = dir.path().join("operations.json");

    let code = cli(&[
        "operations",
        "-i",
        path_arg(&spec),
        "-o",
        path_arg(&out),
        "--package",
        "petstore",
        "--manifest",
        path_arg(&manifest),
        "--formatter",
        "builtin",
    ]);
    assert_eq!(code, 0);

    let source = fs::read_to_string(&out).unwrap();
    assert!(source.contains("package petstore\n"));
    assert!(source.contains(
        "func (c *Client) CreatePet(ctx context.Context, body *Pet) (*Pet, error) {"
    ));
    assert!(source.contains("func (r *ListPetsResponse) FindPet(nameOrID string) (*Pet, error) {"));

    let entries: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&manifest).unwrap()).unwrap();
    assert_eq!(entries[0]["name"], "ListPets");
    assert_eq!(entries[0]["method"], "GET");
    assert_eq!(entries[1]["name"], "CreatePet");
    assert_eq!(entries[1]["params"][1]["type"], "*Pet");
}

#[test]
fn check_reports_drift_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("models.go");
    let args = [
        "types",
        "--input",
        path_arg(&spec),
        "--output",
        path_arg(&out),
        "--formatter",
        "builtin",
    ];

    let mut check = args.to_vec();
    check.push("--check");
    assert_eq!(cli(&check), DRIFT_EXIT_CODE);
    assert!(!out.exists());

    assert_eq!(cli(&args), 0);
    assert_eq!(cli(&check), 0);

    fs::write(&out, "package stale\n").unwrap();
    assert_eq!(cli(&check), DRIFT_EXIT_CODE);
    assert_eq!(fs::read_to_string(&out).unwrap(), "package stale\n");
}

#[test]
fn generate_runs_every_configured_unit() {
    let dir = tempfile::tempdir().unwrap();
    write_spec(dir.path());
    let config = dir.path().join("oasgo.toml");
    fs::write(
        &config,
        r#"
input = "petstore.yaml"
formatter = "builtin"

[types]
output = "api/models.go"
package = "api"

[operations]
output = "api/operations.go"
manifest = "api/operations.json"
"#,
    )
    .unwrap();

    assert_eq!(cli(&["generate", "--config", path_arg(&config)]), 0);

    let models = fs::read_to_string(dir.path().join("api/models.go")).unwrap();
    let operations = fs::read_to_string(dir.path().join("api/operations.go")).unwrap();
    assert!(models.contains("package api\n"));
    assert!(operations.contains("package api\n"));
    assert!(dir.path().join("api/operations.json").exists());

    assert_eq!(
        cli(&["generate", "--config", path_arg(&config), "--check"]),
        0
    );
}

#[test]
fn errors_map_to_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("models.go");

    let missing = dir.path().join("missing.yaml");
    assert_eq!(
        cli(&["types", "-i", path_arg(&missing), "-o", path_arg(&out)]),
        3
    );

    let bad_schema = dir.path().join("bad.json");
    fs::write(
        &bad_schema,
        r#"{ "components": { "schemas": { "Blob": { "description": "anything" } } } }"#,
    )
    .unwrap();
    assert_eq!(
        cli(&[
            "types",
            "-i",
            path_arg(&bad_schema),
            "-o",
            path_arg(&out),
            "--formatter",
            "builtin"
        ]),
        2
    );
    assert!(!out.exists());

    let spec = write_spec(dir.path());
    assert_eq!(
        cli(&[
            "types",
            "-i",
            path_arg(&spec),
            "-o",
            path_arg(&out),
            "--package",
            "Not-A-Package"
        ]),
        2
    );
}

#[test]
fn usage_errors_use_clap_exit_code() {
    assert_eq!(cli(&["types"]), 2);
    assert_eq!(cli(&["types", "-i", "a", "-o", "b", "--formatter", "prettier"]), 2);
    assert_eq!(cli(&[]), 0);
}
