//! Program model: parsed packages, declared objects and static types.
//!
//! A [`Program`] is built once, either from a directory on disk
//! ([`Program::load`]) or from in-memory sources ([`ProgramBuilder`]), and is
//! immutable afterwards. It answers the questions the analyses ask:
//!
//! - which object an identifier defines or uses;
//! - the static type (and constant value) of every checked expression;
//! - the file and package enclosing any node;
//! - the declaration of a function object.
//!
//! Packages imported from outside the loaded tree are opaque: selectors into
//! them have an invalid type.

mod checker;
mod loader;
mod objects;
mod types;

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

pub use objects::{Builtin, Object, ObjectId, ObjectKind, SymbolKind};
pub use types::{
    BasicKind, ConstValue, InterfaceMethod, NamedId, NamedRef, Signature, StructField, Type,
    TypeAndValue,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::syntax::{
    group_comments, Ancestors, CommentGroup, FileId, GoParser, ImportRef, NodeData, NodeId, Span,
    SyntaxArena, SyntaxKind,
};

/// Handle to a [`Package`] of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageId(pub(crate) u32);

impl PackageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A Go package: the files of one directory.
#[derive(Debug, Clone)]
pub struct Package {
    pub id: PackageId,
    /// Import path.
    pub path: String,
    /// Name from the package clause.
    pub name: String,
    pub files: Vec<FileId>,
    pub(crate) scope: HashMap<String, ObjectId>,
}

impl Package {
    /// Package-level object with the given name.
    pub fn scope_lookup(&self, name: &str) -> Option<ObjectId> {
        self.scope.get(name).copied()
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub path: String,
    pub package: PackageId,
    pub root: NodeId,
    pub source: String,
    /// Comment groups in source order.
    pub comments: Vec<CommentGroup>,
    pub imports: Vec<ImportRef>,
    pub has_errors: bool,
}

/// Entry of the named type table.
#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: String,
    pub qualified: Arc<str>,
    /// Never itself a named type; invalid for types of opaque packages.
    pub underlying: Type,
    pub methods: Vec<ObjectId>,
    pub object: Option<ObjectId>,
}

/// A function declaration or literal with a body.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    /// The `function_declaration`, `method_declaration` or `func_literal` node.
    pub node: NodeId,
    pub body: NodeId,
    pub signature: Signature,
    /// Result object per result slot; `None` for unnamed results.
    pub named_results: Vec<Option<ObjectId>>,
}

/// Where an object is declared.
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationSite {
    pub file: FileId,
    pub path: String,
    pub node: NodeId,
    pub span: Span,
}

/// A loaded and type-checked Go program.
#[derive(Debug)]
pub struct Program {
    pub(crate) config: Config,
    pub(crate) syntax: SyntaxArena,
    pub(crate) files: Vec<SourceFile>,
    pub(crate) packages: Vec<Package>,
    pub(crate) objects: Vec<Object>,
    pub(crate) named: Vec<NamedType>,
    pub(crate) types: HashMap<NodeId, TypeAndValue>,
    pub(crate) defs: HashMap<NodeId, ObjectId>,
    pub(crate) uses: HashMap<NodeId, ObjectId>,
    pub(crate) universe: HashMap<String, ObjectId>,
    pub(crate) error_type: Option<NamedId>,
}

// ============================================================================
// Construction
// ============================================================================

struct PendingPackage {
    path: String,
    files: Vec<(String, String)>,
}

/// Builds a [`Program`] from in-memory sources.
///
/// ```ignore
/// let program = ProgramBuilder::new()
///     .package("example.com/app", [("main.go", "package main\nfunc f() int { return 2 }\n")])
///     .build()?;
/// ```
///
/// The first package added is the root package: unqualified symbol lookups
/// search it.
#[derive(Default)]
pub struct ProgramBuilder {
    config: Config,
    packages: Vec<PendingPackage>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Add a package with its files as `(file name, source)` pairs.
    pub fn package<I, N, S>(mut self, path: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        self.packages.push(PendingPackage {
            path: path.into(),
            files: files
                .into_iter()
                .map(|(name, source)| (name.into(), source.into()))
                .collect(),
        });
        self
    }

    /// Parse and type-check every package.
    pub fn build(self) -> Result<Program> {
        let parser = GoParser::new()?;

        let jobs: Vec<(&str, &str)> = self
            .packages
            .iter()
            .flat_map(|p| p.files.iter().map(|(name, src)| (name.as_str(), src.as_str())))
            .collect();
        let trees = jobs
            .par_iter()
            .map(|(name, source)| parser.parse(name, source))
            .collect::<Result<Vec<_>>>()?;
        let mut trees = trees.into_iter();

        let mut program = Program::new(self.config);
        for pending in self.packages {
            let package_id = PackageId(program.packages.len() as u32);
            let mut package = Package {
                id: package_id,
                path: pending.path,
                name: String::new(),
                files: Vec::new(),
                scope: HashMap::new(),
            };

            for (path, source) in pending.files {
                let Some(tree) = trees.next() else { break };
                let file_id = FileId(program.files.len() as u32);
                let lowered = parser.lower(&mut program.syntax, file_id, &tree, &source)?;
                if lowered.has_errors {
                    warn!(file = %path, "syntax errors, analysis may be incomplete");
                }
                if package.name.is_empty() {
                    if let Some(name) = &lowered.package_name {
                        package.name = name.clone();
                    }
                }
                let comments = group_comments(lowered.comments, &source);
                program.files.push(SourceFile {
                    id: file_id,
                    path,
                    package: package_id,
                    root: lowered.root,
                    source,
                    comments,
                    imports: lowered.imports,
                    has_errors: lowered.has_errors,
                });
                package.files.push(file_id);
            }

            debug!(package = %package.path, files = package.files.len(), "parsed package");
            program.packages.push(package);
        }

        checker::check(&mut program);
        debug!(
            objects = program.objects.len(),
            expressions = program.types.len(),
            "type-checked program"
        );
        Ok(program)
    }
}

impl Program {
    fn new(config: Config) -> Self {
        Self {
            config,
            syntax: SyntaxArena::new(),
            files: Vec::new(),
            packages: Vec::new(),
            objects: Vec::new(),
            named: Vec::new(),
            types: HashMap::new(),
            defs: HashMap::new(),
            uses: HashMap::new(),
            universe: HashMap::new(),
            error_type: None,
        }
    }

    pub(crate) fn new_object(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub(crate) fn new_named(&mut self, name: &str, qualified: String) -> NamedRef {
        let id = NamedId(self.named.len() as u32);
        let qualified: Arc<str> = qualified.into();
        self.named.push(NamedType {
            name: name.to_string(),
            qualified: qualified.clone(),
            underlying: Type::Invalid,
            methods: Vec::new(),
            object: None,
        });
        NamedRef { id, qualified }
    }
}

// ============================================================================
// Queries
// ============================================================================

impl Program {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn syntax(&self) -> &SyntaxArena {
        &self.syntax
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    /// The package symbol lookups are resolved against.
    pub fn root_package(&self) -> Option<&Package> {
        self.packages.first()
    }

    pub fn package_by_path(&self, path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.path == path)
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.index()]
    }

    pub fn named(&self, id: NamedId) -> &NamedType {
        &self.named[id.index()]
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        self.syntax.node(id)
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.syntax.kind(id)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.syntax.span(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.syntax.children(id)
    }

    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.syntax.child_by_field(id, field)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.syntax.parent(id)
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.syntax.ancestors(id)
    }

    pub fn text(&self, id: NodeId) -> &str {
        self.syntax.text(id)
    }

    /// File containing a node.
    pub fn file_of(&self, node: NodeId) -> &SourceFile {
        self.file(self.syntax.node(node).file)
    }

    /// Package containing a node.
    pub fn package_of(&self, node: NodeId) -> &Package {
        self.package(self.file_of(node).package)
    }

    /// Find a symbol of the root package by kind and name.
    ///
    /// Package-level declarations are searched first; otherwise the first
    /// matching local declaration in source order is returned.
    pub fn lookup(&self, kind: SymbolKind, name: &str) -> Option<ObjectId> {
        let package = self.root_package()?;
        if let Some(id) = package.scope_lookup(name) {
            if kind.matches(self.object(id)) {
                return Some(id);
            }
        }

        package.files.iter().find_map(|file| {
            self.syntax.subtree(self.file(*file).root).find_map(|node| {
                let id = self.defs.get(&node)?;
                let object = self.object(*id);
                (object.name == name && kind.matches(object)).then_some(*id)
            })
        })
    }

    pub fn func(&self, name: &str) -> Option<ObjectId> {
        self.lookup(SymbolKind::Func, name)
    }

    pub fn const_(&self, name: &str) -> Option<ObjectId> {
        self.lookup(SymbolKind::Const, name)
    }

    pub fn type_name(&self, name: &str) -> Option<ObjectId> {
        self.lookup(SymbolKind::Type, name)
    }

    pub fn var(&self, name: &str) -> Option<ObjectId> {
        self.lookup(SymbolKind::Var, name)
    }

    /// Method `method` of the named type `type_name` in the root package.
    pub fn method(&self, type_name: &str, method: &str) -> Option<ObjectId> {
        let named = self.object(self.type_name(type_name)?).named?;
        self.named(named)
            .methods
            .iter()
            .copied()
            .find(|m| self.object(*m).name == method)
    }

    /// Where an object is declared; `None` for predeclared objects.
    pub fn declaration_site_of(&self, object: ObjectId) -> Option<DeclarationSite> {
        let node = self.object(object).ident?;
        let file = self.file_of(node);
        Some(DeclarationSite {
            file: file.id,
            path: file.path.clone(),
            node,
            span: self.span(node),
        })
    }

    /// Declaration of a function object, if it has a body in the program.
    pub fn function_declaration_of(&self, object: ObjectId) -> Option<FunctionDecl> {
        let object = self.object(object);
        if !object.is_func() {
            return None;
        }
        let node = object.decl?;
        let signature = object.ty.signature()?.clone();
        self.function_with_signature(node, signature)
    }

    /// Declaration view of a function literal.
    pub fn function_literal(&self, node: NodeId) -> Option<FunctionDecl> {
        if self.kind(node) != SyntaxKind::FuncLiteral {
            return None;
        }
        let signature = self.types.get(&node)?.ty.signature()?.clone();
        self.function_with_signature(node, signature)
    }

    fn function_with_signature(&self, node: NodeId, signature: Signature) -> Option<FunctionDecl> {
        let body = self.child_by_field(node, "body")?;
        Some(FunctionDecl {
            node,
            body,
            signature,
            named_results: self.named_results(node),
        })
    }

    fn named_results(&self, function: NodeId) -> Vec<Option<ObjectId>> {
        let Some(result) = self.child_by_field(function, "result") else {
            return Vec::new();
        };
        if self.kind(result) != SyntaxKind::ParameterList {
            return vec![None];
        }

        let mut slots = Vec::new();
        for param in self.children(result) {
            let names: Vec<_> = self.syntax.children_by_field(*param, "name").collect();
            if names.is_empty() {
                slots.push(None);
            } else {
                slots.extend(names.iter().map(|n| self.defs.get(n).copied()));
            }
        }
        slots
    }

    /// Recorded static type and value of an expression.
    pub fn type_and_value_of(&self, expr: NodeId) -> Result<&TypeAndValue> {
        self.types.get(&expr).ok_or_else(|| Error::Eval {
            kind: self.kind(expr),
            path: self.file_of(expr).path.clone(),
            span: self.span(expr),
        })
    }

    /// Object defined by an identifier.
    pub fn def_of(&self, ident: NodeId) -> Option<ObjectId> {
        self.defs.get(&ident).copied()
    }

    /// Object referred to by an identifier.
    pub fn use_of(&self, ident: NodeId) -> Option<ObjectId> {
        self.uses.get(&ident).copied()
    }

    /// Object an identifier defines or refers to.
    pub fn object_of(&self, ident: NodeId) -> Option<ObjectId> {
        self.def_of(ident).or_else(|| self.use_of(ident))
    }

    /// Underlying type; named types are followed to their definition.
    pub fn underlying<'a>(&'a self, ty: &'a Type) -> &'a Type {
        match ty {
            Type::Named(named) => &self.named(named.id).underlying,
            other => other,
        }
    }

    pub fn is_interface(&self, ty: &Type) -> bool {
        matches!(self.underlying(ty), Type::Interface(_))
    }

    /// Whether the type is the predeclared `error`.
    pub fn is_error(&self, ty: &Type) -> bool {
        match (ty, self.error_type) {
            (Type::Named(named), Some(error)) => named.id == error,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(source: &str) -> Program {
        ProgramBuilder::new()
            .package("example.com/p", [("p.go", source)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup_by_kind() {
        let p = program(
            "package p\n\nconst C = 1\n\ntype T struct{}\n\nvar V = C\n\nfunc F() {}\n\nfunc (T) M() {}\n",
        );

        assert!(p.const_("C").is_some());
        assert!(p.type_name("T").is_some());
        assert!(p.var("V").is_some());
        assert!(p.func("F").is_some());
        assert!(p.func("C").is_none());
        assert!(p.method("T", "M").is_some());
        assert!(p.method("T", "N").is_none());
    }

    #[test]
    fn test_lookup_falls_back_to_locals() {
        let p = program("package p\n\nfunc f() {\n\tlocal := 1\n\t_ = local\n}\n");

        let local = p.var("local").unwrap();
        let site = p.declaration_site_of(local).unwrap();
        assert_eq!(site.span.start_line, 4);
        assert_eq!(p.object(local).ty, Type::Basic(BasicKind::Int));
    }

    #[test]
    fn test_function_declaration_named_results() {
        let p = program("package p\n\nfunc f() (a int, b, c string) { return }\n\nfunc g() {}\n");

        let decl = p.function_declaration_of(p.func("f").unwrap()).unwrap();
        assert_eq!(decl.signature.results.len(), 3);
        assert!(decl.named_results.iter().all(Option::is_some));

        let g = p.function_declaration_of(p.func("g").unwrap()).unwrap();
        assert!(g.named_results.is_empty());
    }

    #[test]
    fn test_enclosing_file_and_package() {
        let p = ProgramBuilder::new()
            .package("example.com/a", [("a.go", "package a\n\nfunc A() {}\n")])
            .package("example.com/b", [("b.go", "package b\n\nfunc B() {}\n")])
            .build()
            .unwrap();

        let a = p.func("A").unwrap();
        let node = p.object(a).decl.unwrap();
        assert_eq!(p.file_of(node).path, "a.go");
        assert_eq!(p.package_of(node).name, "a");
        // Only the root package is searched.
        assert!(p.func("B").is_none());
    }

    #[test]
    fn test_error_type() {
        let p = program("package p\n\nfunc f() error { return nil }\n");

        let sig = p.object(p.func("f").unwrap()).ty.signature().unwrap().clone();
        assert!(p.is_error(&sig.results[0]));
        assert!(p.is_interface(&sig.results[0]));
        assert_eq!(sig.results[0].to_string(), "error");
    }
}
