//! Go code emitter for OpenAPI documents.
//!
//! The pipeline is:
//! 1. Parse: JSON/YAML -> Document
//! 2. Build: Document -> GoFile (types unit or operations unit)
//! 3. Emit: GoFile -> String (via Emit trait)
//! 4. Format: the whole unit, before anything touches the disk
//! 5. Write: only when the content changed

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{GenError, RunReport, UnsupportedShape};
use crate::format::FormatterKind;
use crate::ir::utils::exported_name;
use crate::ir::{CompiledOperation, Emit, OperationCompiler, Outcome, SchemaIndex, TypeRenderer};
use crate::ir::types::GoFile;
use crate::spec::Document;

/// Parameters of one generated unit.
#[derive(Debug, Clone)]
pub struct UnitOptions {
    /// Go package name written in the `package` clause.
    pub package: String,
    /// Formatter applied before the unit is returned.
    pub formatter: FormatterKind,
}

impl UnitOptions {
    /// Options for `package` with the default formatter.
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            formatter: FormatterKind::default(),
        }
    }
}

/// Which of the two units a [`Generated`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Component schema declarations.
    Types,
    /// Client methods and their request, response and option types.
    Operations,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitKind::Types => "types",
            UnitKind::Operations => "operations",
        })
    }
}

/// A formatted unit ready to be written.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Which unit this is.
    pub kind: UnitKind,
    /// Formatted Go source.
    pub source: String,
    /// Operations emitted into the unit, in emission order.
    pub operations: Vec<CompiledOperation>,
    /// Operations left out, and why.
    pub report: RunReport,
}

/// One operation as seen by scaffolding generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Go method name.
    pub name: String,
    /// HTTP verb, upper case.
    pub method: String,
    /// Path template.
    pub path: String,
    /// Method parameters, `ctx` first.
    pub params: Vec<ManifestParam>,
    /// Go return types, `error` last.
    pub returns: Vec<String>,
}

/// One parameter of a [`ManifestEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestParam {
    /// Go identifier.
    pub name: String,
    /// Go type as written in the signature.
    #[serde(rename = "type")]
    pub ty: String,
    /// Set on the trailing `opts ...` parameter.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub variadic: bool,
}

impl Generated {
    /// Operation metadata: name, verb, path, parameters and return types.
    pub fn manifest(&self) -> Vec<ManifestEntry> {
        self.operations
            .iter()
            .map(|op| ManifestEntry {
                name: op.signature.name.clone(),
                method: op.method.to_string(),
                path: op.path.clone(),
                params: op
                    .signature
                    .params
                    .iter()
                    .map(|p| ManifestParam {
                        name: p.name.clone(),
                        ty: p.ty.emit(),
                        variadic: p.variadic,
                    })
                    .collect(),
                returns: op.signature.returns.iter().map(Emit::emit).collect(),
            })
            .collect()
    }
}

/// Generate the types unit: one declaration per component schema.
pub fn generate_types(doc: &Document, options: &UnitOptions) -> Result<Generated, GenError> {
    let mut file = GoFile::new(&options.package);
    let mut unsupported = Vec::new();

    reserve_components(doc, &mut file);
    let mut renderer = TypeRenderer::new(SchemaIndex::new(doc.components.as_ref()), &mut file);
    for (name, schema) in doc.schemas() {
        collect_unsupported(renderer.render(&exported_name(name), schema), &mut unsupported)?;
    }
    if !unsupported.is_empty() {
        return Err(GenError::UnsupportedShapes(unsupported));
    }

    let source = format_unit(UnitKind::Types, file.emit(), options.formatter)?;
    info!(
        package = %options.package,
        declarations = file.decls().len(),
        "Generated types unit."
    );
    Ok(Generated {
        kind: UnitKind::Types,
        source,
        operations: Vec::new(),
        report: RunReport::default(),
    })
}

/// Generate the operations unit: one client method per path operation.
pub fn generate_operations(doc: &Document, options: &UnitOptions) -> Result<Generated, GenError> {
    let mut file = GoFile::new(&options.package);
    for name in types_unit_names(doc) {
        file.reserve(&name);
    }
    let mut compiler = OperationCompiler::new(SchemaIndex::new(doc.components.as_ref()));
    let mut operations = Vec::new();
    let mut report = RunReport::default();
    let mut unsupported = Vec::new();

    for (path, item) in &doc.paths {
        for (method, operation) in item.operations() {
            let outcome = compiler.compile(&mut file, path, method, item, operation);
            match collect_unsupported(outcome, &mut unsupported)? {
                Some(Outcome::Emitted(compiled)) => operations.push(compiled),
                Some(Outcome::Skipped(skipped)) => report.skipped.push(skipped),
                None => {}
            }
        }
    }
    if !unsupported.is_empty() {
        return Err(GenError::UnsupportedShapes(unsupported));
    }

    let source = format_unit(UnitKind::Operations, file.emit(), options.formatter)?;
    info!(
        package = %options.package,
        operations = operations.len(),
        skipped = report.skipped.len(),
        "Generated operations unit."
    );
    Ok(Generated {
        kind: UnitKind::Operations,
        source,
        operations,
        report,
    })
}

/// Component schemas keep their own names; synthesized types work around them.
fn reserve_components(doc: &Document, file: &mut GoFile) {
    for (name, _) in doc.schemas() {
        file.reserve(&exported_name(name));
    }
}

/// Every type name the types unit of `doc` declares or reserves. The
/// operations unit usually shares its package, so these are taken there too.
fn types_unit_names(doc: &Document) -> Vec<String> {
    let mut scratch = GoFile::new("scratch");
    reserve_components(doc, &mut scratch);
    let mut renderer = TypeRenderer::new(SchemaIndex::new(doc.components.as_ref()), &mut scratch);
    for (name, schema) in doc.schemas() {
        if let Err(err) = renderer.render(&exported_name(name), schema) {
            debug!(schema = %name, error = %err, "Component skipped while collecting type names.");
        }
    }
    scratch.names_in_use().map(str::to_string).collect()
}

/// Keep unsupported shapes for the end-of-run report; pass other errors on.
fn collect_unsupported<T>(
    result: Result<T, GenError>,
    unsupported: &mut Vec<UnsupportedShape>,
) -> Result<Option<T>, GenError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(GenError::Unsupported(shape)) => {
            warn!(schema = %shape.name, "Unsupported schema shape: {}", shape.message);
            unsupported.push(shape);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn format_unit(kind: UnitKind, text: String, formatter: FormatterKind) -> Result<String, GenError> {
    let formatter = formatter.resolve()?;
    match formatter.format(&text) {
        Ok(formatted) => {
            debug!(unit = %kind, formatter = formatter.name(), "Formatted unit.");
            Ok(formatted)
        }
        Err(message) => {
            debug!(unit = %kind, buffer = %text, "Unformatted buffer.");
            Err(GenError::Format {
                unit: kind.to_string(),
                message,
                buffer: text,
            })
        }
    }
}

/// Write a unit to `path`, creating parent directories. Returns `false`
/// when the file already held exactly this content.
pub fn write_unit(generated: &Generated, path: &Path) -> Result<bool, GenError> {
    let io_err = |source: std::io::Error| GenError::Io {
        path: path.to_path_buf(),
        source,
    };

    if fs::read_to_string(path).is_ok_and(|existing| existing == generated.source) {
        debug!(path = %path.display(), unit = %generated.kind, "Unit unchanged, not writing.");
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, &generated.source).map_err(io_err)?;
    debug!(
        path = %path.display(),
        bytes = generated.source.len(),
        "Wrote unit."
    );
    Ok(true)
}
