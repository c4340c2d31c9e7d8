//! Go IR types for code generation.
//!
//! This module defines the Go declarations the generator produces:
//! - GoType: type expressions (identifiers, pointers, slices, maps)
//! - TypeDecl: one `type` declaration with its shape
//! - FunctionSignature: one function or method plus the template of its body
//! - GoFile: a complete generated unit

use std::collections::{BTreeMap, BTreeSet};

use crate::error::GenError;
use crate::spec::HttpMethod;

use super::fields::UniqueNames;
use super::utils::qualifier_import;

/// Go type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoType {
    /// Builtin, declared or package-qualified name: `string`, `Widget`, `time.Time`
    Ident(String),
    /// `*T`
    Pointer(Box<GoType>),
    /// `[]T`
    Slice(Box<GoType>),
    /// `map[string]T`
    Map(Box<GoType>),
    /// `any`
    Any,
}

impl GoType {
    /// A named type.
    pub fn ident(name: impl Into<String>) -> Self {
        GoType::Ident(name.into())
    }

    /// `[]inner`
    pub fn slice(inner: GoType) -> Self {
        GoType::Slice(Box::new(inner))
    }

    /// `map[string]value`
    pub fn map(value: GoType) -> Self {
        GoType::Map(Box::new(value))
    }

    /// Wrap in a pointer unless already one.
    pub fn pointer(self) -> Self {
        match self {
            GoType::Pointer(_) => self,
            other => GoType::Pointer(Box::new(other)),
        }
    }

    /// Types whose zero value is `nil`.
    pub fn is_nilable(&self) -> bool {
        matches!(
            self,
            GoType::Pointer(_) | GoType::Slice(_) | GoType::Map(_) | GoType::Any
        )
    }

    /// Whether this is `[]T`.
    pub fn is_slice(&self) -> bool {
        matches!(self, GoType::Slice(_))
    }

    /// Package qualifiers referenced anywhere in this type (`time` for `time.Time`).
    pub fn qualifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            GoType::Ident(name) => {
                if let Some((qualifier, _)) = name.split_once('.') {
                    out.insert(qualifier.to_string());
                }
            }
            GoType::Pointer(inner) | GoType::Slice(inner) | GoType::Map(inner) => {
                inner.qualifiers(out);
            }
            GoType::Any => {}
        }
    }
}

/// Go literal values
#[derive(Debug, Clone, PartialEq)]
pub enum GoLiteral {
    /// Emitted as an interpreted string literal.
    String(String),
    /// Integer literal.
    Int(i64),
    /// Float literal, always with a decimal point or exponent.
    Float(f64),
    /// `true` or `false`.
    Bool(bool),
}

/// One constant of an enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumConst {
    /// Constant identifier.
    pub name: String,
    /// Constant value.
    pub value: GoLiteral,
}

/// Struct tag of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag {
    /// Wire name used in the `json` key.
    pub json: String,
    /// Adds `,omitempty` to the `json` key.
    pub omit_empty: bool,
    /// Validation rules, without the `validate:` key.
    pub validate: Option<String>,
}

/// Record field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Exported Go field name.
    pub name: String,
    /// Comment lines above the field.
    pub doc: Option<String>,
    /// Field type, already pointer-wrapped when optional.
    pub ty: GoType,
    /// Whether the property is listed as required.
    pub required: bool,
    /// Struct tag; `None` for plain Go fields.
    pub tag: Option<FieldTag>,
}

/// Shape of a type declaration
#[derive(Debug, Clone, PartialEq)]
pub enum DeclShape {
    /// `type Name = T`
    Alias(GoType),
    /// `type Name T` plus one typed constant per value
    Enum {
        /// Scalar the enum type is defined over.
        underlying: GoType,
        /// One constant per non-null value.
        constants: Vec<EnumConst>,
    },
    /// `type Name struct { ... }`
    Struct(Vec<Field>),
    /// `type Name []T`
    Slice(GoType),
    /// `type Name map[string]T`
    Map(GoType),
    /// `type Name func(A, B)`
    FuncType(Vec<GoType>),
}

/// Type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    /// Declared identifier.
    pub name: String,
    /// Comment lines above the declaration.
    pub doc: Option<String>,
    /// What the name stands for.
    pub shape: DeclShape,
}

impl TypeDecl {
    /// Whether this declares a struct.
    pub fn is_struct(&self) -> bool {
        matches!(self.shape, DeclShape::Struct(_))
    }

    fn collect_qualifiers(&self, out: &mut BTreeSet<String>) {
        match &self.shape {
            DeclShape::Alias(ty) | DeclShape::Slice(ty) | DeclShape::Map(ty) => ty.qualifiers(out),
            DeclShape::Enum { underlying, .. } => underlying.qualifiers(out),
            DeclShape::Struct(fields) => fields.iter().for_each(|f| f.ty.qualifiers(out)),
            DeclShape::FuncType(params) => params.iter().for_each(|p| p.qualifiers(out)),
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct GoParam {
    /// Go identifier.
    pub name: String,
    /// Parameter type; the element type when variadic.
    pub ty: GoType,
    /// Emitted as `name ...T`.
    pub variadic: bool,
}

impl GoParam {
    /// A plain, non-variadic parameter.
    pub fn new(name: impl Into<String>, ty: GoType) -> Self {
        Self {
            name: name.into(),
            ty,
            variadic: false,
        }
    }
}

/// Method receiver
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    /// Receiver identifier (`c`, `r`, `e`).
    pub name: String,
    /// Receiver type.
    pub ty: GoType,
}

/// Path expression of a client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    /// Path with `%v` verbs in place of parameters (or the literal path).
    pub format: String,
    /// Identifiers substituted into the verbs, in order.
    pub args: Vec<String>,
}

/// How the decoded response is handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBinding {
    /// `var out T` ... `return &out, nil`
    Pointer(GoType),
    /// `var out T` ... `return out, nil`
    Value(GoType),
}

/// Body of an operation function.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientCall {
    /// HTTP verb, emitted as an `http.Method*` constant.
    pub method: HttpMethod,
    /// Request path expression.
    pub path: PathTemplate,
    /// Name of the body parameter, if any.
    pub body_arg: Option<String>,
    /// Name of the variadic options parameter, if any.
    pub options_arg: Option<String>,
    /// Decoded response variable and how it is returned.
    pub response: ResponseBinding,
}

/// One side of a finder comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderField {
    /// Go field name on the item struct.
    pub name: String,
    /// The field is optional and must be dereferenced after a nil check.
    pub pointer: bool,
    /// Plain `string` fields compare directly, others through `fmt.Sprint`.
    pub is_string: bool,
}

/// Body of a lookup-by-name-or-id method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderBody {
    /// Field of the response holding the items.
    pub slice_field: String,
    /// Singular wire name, reported in `NotFoundError.Kind`.
    pub kind: String,
    /// The item's `name` field.
    pub name_field: FinderField,
    /// The item's `id` field.
    pub id_field: FinderField,
}

/// Template reference for a function body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyTemplate {
    /// Build and send the request of one operation.
    ClientCall(ClientCall),
    /// Return an option that writes one query parameter.
    QueryOption {
        /// Query key.
        wire_name: String,
        /// Slice values add one key per element.
        repeated: bool,
    },
    /// Scan a list response for a name or id.
    Finder(FinderBody),
    /// `Error()` of the not-found error type.
    NotFoundMessage,
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    /// Function or method name.
    pub name: String,
    /// Comment lines above the function.
    pub doc: Option<String>,
    /// Set for methods.
    pub receiver: Option<Receiver>,
    /// Parameters in order.
    pub params: Vec<GoParam>,
    /// Result types; more than one is parenthesized.
    pub returns: Vec<GoType>,
    /// What the body does.
    pub body: BodyTemplate,
}

impl FunctionSignature {
    fn collect_qualifiers(&self, out: &mut BTreeSet<String>) {
        for param in &self.params {
            param.ty.qualifiers(out);
        }
        for ty in &self.returns {
            ty.qualifiers(out);
        }
        match &self.body {
            BodyTemplate::ClientCall(call) => {
                out.insert("http".to_string());
                if !call.path.args.is_empty() {
                    out.insert("fmt".to_string());
                }
            }
            BodyTemplate::QueryOption { .. } | BodyTemplate::NotFoundMessage => {
                out.insert("fmt".to_string());
            }
            BodyTemplate::Finder(finder) => {
                if !finder.name_field.is_string || !finder.id_field.is_string {
                    out.insert("fmt".to_string());
                }
            }
        }
    }
}

/// Complete Go source unit
#[derive(Debug, Clone)]
pub struct GoFile {
    /// Name in the `package` clause.
    pub package: String,
    decls: Vec<TypeDecl>,
    index: BTreeMap<String, usize>,
    functions: Vec<FunctionSignature>,
    names: UniqueNames,
}

impl GoFile {
    /// An empty unit of `package`.
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            decls: Vec::new(),
            index: BTreeMap::new(),
            functions: Vec::new(),
            names: UniqueNames::default(),
        }
    }

    /// Keep `name` away from synthesized declarations. Component schemas
    /// are reserved up front so nested and operation types never shadow them.
    pub fn reserve(&mut self, name: &str) {
        self.names.reserve(name);
    }

    /// A type name for a synthesized declaration: `base` when it is free,
    /// else `base2`, `base3`, ...
    pub fn claim_name(&mut self, base: &str) -> String {
        self.names.claim(base)
    }

    /// Every reserved or claimed type name.
    pub fn names_in_use(&self) -> impl Iterator<Item = &str> {
        self.names.taken()
    }

    /// Add a declaration. Re-declaring an identical type is a no-op;
    /// a different type under the same name is an error.
    pub fn declare(&mut self, decl: TypeDecl) -> Result<(), GenError> {
        if let Some(existing) = self.find(&decl.name) {
            if *existing == decl {
                return Ok(());
            }
            return Err(GenError::malformed(
                &decl.name,
                "two different declarations resolve to the same Go type name",
            ));
        }
        self.index.insert(decl.name.clone(), self.decls.len());
        self.decls.push(decl);
        Ok(())
    }

    /// Whether a type of this name was declared.
    pub fn is_declared(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The declaration named `name`.
    pub fn find(&self, name: &str) -> Option<&TypeDecl> {
        self.index.get(name).and_then(|&i| self.decls.get(i))
    }

    /// Append a function; functions are emitted in push order.
    pub fn push_function(&mut self, function: FunctionSignature) {
        self.functions.push(function);
    }

    /// Declarations in declaration order.
    pub fn decls(&self) -> &[TypeDecl] {
        &self.decls
    }

    /// Functions in push order.
    pub fn functions(&self) -> &[FunctionSignature] {
        &self.functions
    }

    /// Import paths needed by everything in the unit, sorted.
    pub fn imports(&self) -> BTreeSet<&'static str> {
        let mut qualifiers = BTreeSet::new();
        for decl in &self.decls {
            decl.collect_qualifiers(&mut qualifiers);
        }
        for function in &self.functions {
            function.collect_qualifiers(&mut qualifiers);
        }
        qualifiers
            .iter()
            .filter_map(|q| qualifier_import(q))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn alias(name: &str, target: &str) -> TypeDecl {
        TypeDecl {
            name: name.into(),
            doc: None,
            shape: DeclShape::Alias(GoType::ident(target)),
        }
    }

    #[test]
    fn test_declare_memoizes_identical() {
        let mut file = GoFile::new("models");
        file.declare(alias("ID", "string")).unwrap();
        file.declare(alias("ID", "string")).unwrap();
        assert_eq!(file.decls().len(), 1);
    }

    #[test]
    fn test_declare_rejects_conflict() {
        let mut file = GoFile::new("models");
        file.declare(alias("ID", "string")).unwrap();
        let err = file.declare(alias("ID", "int")).unwrap_err();
        assert!(matches!(err, GenError::Malformed { name, .. } if name == "ID"));
    }

    #[test]
    fn test_imports_from_types() {
        let mut file = GoFile::new("models");
        file.declare(TypeDecl {
            name: "Event".into(),
            doc: None,
            shape: DeclShape::Struct(vec![
                Field {
                    name: "At".into(),
                    doc: None,
                    ty: GoType::ident("time.Time"),
                    required: true,
                    tag: None,
                },
                Field {
                    name: "IDs".into(),
                    doc: None,
                    ty: GoType::slice(GoType::ident("uuid.UUID")),
                    required: true,
                    tag: None,
                },
            ]),
        })
        .unwrap();
        let imports: Vec<_> = file.imports().into_iter().collect();
        assert_eq!(imports, vec!["github.com/google/uuid", "time"]);
    }

    #[test]
    fn test_pointer_is_idempotent() {
        let ty = GoType::ident("Widget").pointer().pointer();
        assert_eq!(ty, GoType::Pointer(Box::new(GoType::ident("Widget"))));
        assert!(ty.is_nilable());
        assert!(!GoType::ident("string").is_nilable());
    }
}
