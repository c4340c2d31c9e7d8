//! OpenAPI schema to Go source compiler.
//!
//! Reads an OpenAPI 3.0/3.1 document and emits two Go units: the types unit
//! (one declaration per component schema) and the operations unit (one
//! client method per path operation, plus request/response types, query
//! options and list finders).

pub mod emitter;
pub mod error;
pub mod format;
pub mod ir;
pub mod spec;

pub use emitter::{
    Generated, ManifestEntry, ManifestParam, UnitKind, UnitOptions, generate_operations,
    generate_types, write_unit,
};
pub use error::{GenError, RunReport, SkippedOperation, UnsupportedShape};
pub use format::{Builtin, Formatter, FormatterKind, Gofmt};
pub use spec::Document;
