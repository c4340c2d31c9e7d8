//! Intermediate Representation for OpenAPI to Go code generation.
//!
//! Two layers:
//! 1. Schema analysis: shape classification, reference resolution and the
//!    recursion guard
//! 2. Go IR: declarations and function signatures built by the renderer,
//!    the operation compiler and the synthesizers, emitted to text through
//!    the `Emit` trait
//!
//! ## Module Structure
//!
//! - `classify`: schema -> `Shape`
//! - `resolve`: `$ref` lookups against the components section
//! - `guard`: in-progress expansion tracking
//! - `render`: schema -> `TypeDecl` (uses `fields` for object shapes)
//! - `operation`: path operation -> client method (uses `options`, `findable`)
//! - `types`: Go IR (GoType, TypeDecl, FunctionSignature, GoFile)
//! - `emit`: Go IR -> code strings (via Emit trait)
//! - `utils`: naming and literal helpers

pub mod classify;
mod emit;
mod fields;
mod findable;
pub mod guard;
pub mod operation;
mod options;
pub mod render;
pub mod resolve;
pub mod types;
pub mod utils;

pub use classify::{Shape, classify};
pub use emit::{Emit, GENERATED_HEADER};
pub use fields::validate_rules;
pub use findable::NOT_FOUND_ERROR;
pub use guard::{RecursionGuard, content_hash};
pub use operation::{CompiledOperation, OperationCompiler, Outcome};
pub use options::option_type_name;
pub use render::TypeRenderer;
pub use resolve::SchemaIndex;
