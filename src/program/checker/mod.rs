//! Partial Go type checker.
//!
//! Records, for every checked expression, its static type and constant
//! value, and for every identifier the object it defines or uses.
//! Package-level declarations are resolved lazily, so they may refer to each
//! other in any order; function bodies are checked afterwards, in source
//! order. Anything the checker does not understand gets [`Type::Invalid`].

mod expr;
mod stmt;
mod typexpr;

use std::collections::{HashMap, HashSet};
use std::mem;

use tracing::trace;

use super::objects::{Object, ObjectKind, BASIC_TYPES, BUILTINS};
use super::types::{BasicKind, InterfaceMethod, NamedRef, Signature, Type, TypeAndValue};
use super::{ObjectId, PackageId, Program};
use crate::syntax::{FileId, NodeId, SyntaxKind};

/// Type-check every package of the program in place.
pub(crate) fn check(program: &mut Program) {
    let mut checker = Checker::new(program);
    checker.install_universe();
    checker.collect();
    checker.resolve_pending();
    checker.check_bodies();
}

/// Package-level declaration whose type is computed on first use.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Const {
        spec: NodeId,
        /// Spec holding the type and values; differs from `spec` for
        /// implicitly repeated constants.
        source: NodeId,
        iota: i128,
        file: FileId,
    },
    Var {
        spec: NodeId,
        file: FileId,
    },
    Type {
        spec: NodeId,
        file: FileId,
    },
    Func {
        decl: NodeId,
        file: FileId,
    },
}

impl Pending {
    fn file(&self) -> FileId {
        match *self {
            Pending::Const { file, .. }
            | Pending::Var { file, .. }
            | Pending::Type { file, .. }
            | Pending::Func { file, .. } => file,
        }
    }
}

/// Names visible in one file only.
#[derive(Debug, Default)]
struct FileScope {
    imports: HashMap<String, ObjectId>,
    dot_imports: Vec<PackageId>,
}

/// Checking environment, saved while a pending declaration is resolved.
struct Env {
    scopes: Vec<HashMap<String, ObjectId>>,
    file: FileId,
    package: PackageId,
    iota: Option<i128>,
    record: bool,
}

struct Checker<'a> {
    p: &'a mut Program,
    /// Local scopes, innermost last.
    scopes: Vec<HashMap<String, ObjectId>>,
    file: FileId,
    package: PackageId,
    iota: Option<i128>,
    /// Whether expression types are recorded; off while re-evaluating the
    /// values of an implicitly repeated constant spec.
    record: bool,
    file_scopes: Vec<FileScope>,
    pending: HashMap<ObjectId, Pending>,
    order: Vec<ObjectId>,
    specs_in_progress: HashSet<NodeId>,
    /// Named types of packages outside the program, by qualified name.
    external: HashMap<String, NamedRef>,
}

impl<'a> Checker<'a> {
    fn new(p: &'a mut Program) -> Self {
        Self {
            p,
            scopes: Vec::new(),
            file: FileId(0),
            package: PackageId(0),
            iota: None,
            record: true,
            file_scopes: Vec::new(),
            pending: HashMap::new(),
            order: Vec::new(),
            specs_in_progress: HashSet::new(),
            external: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Syntax helpers
    // ------------------------------------------------------------------------

    fn kind(&self, id: NodeId) -> SyntaxKind {
        self.p.syntax.kind(id)
    }

    fn text(&self, id: NodeId) -> String {
        self.p.syntax.text(id).to_string()
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.p.syntax.children(id).to_vec()
    }

    fn field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.p.syntax.child_by_field(id, field)
    }

    fn fields(&self, id: NodeId, field: &str) -> Vec<NodeId> {
        self.p.syntax.children_by_field(id, field).collect()
    }

    fn operator(&self, id: NodeId) -> &'static str {
        self.p.syntax.node(id).operator.unwrap_or("")
    }

    fn is_blank(&self, id: NodeId) -> bool {
        self.kind(id) == SyntaxKind::Identifier && self.p.syntax.text(id) == "_"
    }

    fn package_path(&self) -> String {
        self.p.packages[self.package.index()].path.clone()
    }

    // ------------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------------

    fn enter_file(&mut self, file: FileId) {
        self.file = file;
        self.package = self.p.files[file.index()].package;
    }

    fn save_env(&mut self) -> Env {
        Env {
            scopes: mem::take(&mut self.scopes),
            file: self.file,
            package: self.package,
            iota: self.iota.take(),
            record: mem::replace(&mut self.record, true),
        }
    }

    fn restore_env(&mut self, env: Env) {
        self.scopes = env.scopes;
        self.file = env.file;
        self.package = env.package;
        self.iota = env.iota;
        self.record = env.record;
    }

    fn lookup(&self, name: &str) -> Option<ObjectId> {
        if let Some(id) = self.scopes.iter().rev().find_map(|s| s.get(name)) {
            return Some(*id);
        }
        let file_scope = &self.file_scopes[self.file.index()];
        if let Some(id) = file_scope.imports.get(name) {
            return Some(*id);
        }
        if let Some(id) = self.p.packages[self.package.index()].scope.get(name) {
            return Some(*id);
        }
        for package in &file_scope.dot_imports {
            if let Some(id) = self.p.packages[package.index()].scope.get(name) {
                return Some(*id);
            }
        }
        self.p.universe.get(name).copied()
    }

    fn record_use(&mut self, ident: NodeId, object: ObjectId) {
        if self.record {
            self.p.uses.insert(ident, object);
        }
    }

    fn new_object(&mut self, name: String, kind: ObjectKind, ty: Type, ident: Option<NodeId>) -> ObjectId {
        self.p.new_object(Object {
            name,
            kind,
            ty,
            package: Some(self.package),
            ident,
            decl: None,
            named: None,
        })
    }

    /// Define an object for `ident` in the innermost scope.
    fn declare(&mut self, ident: NodeId, kind: ObjectKind, ty: Type, decl: Option<NodeId>) -> ObjectId {
        let name = self.text(ident);
        let id = self.new_object(name.clone(), kind, ty, Some(ident));
        self.p.objects[id.index()].decl = decl;
        self.p.defs.insert(ident, id);
        if name != "_" {
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert(name, id);
            }
        }
        id
    }

    fn declare_var(&mut self, ident: NodeId, ty: Type) -> ObjectId {
        let decl = self.p.syntax.parent(ident);
        self.declare(ident, ObjectKind::Var, ty, decl)
    }

    fn declare_package_level(&mut self, name: &str, id: ObjectId) {
        if name == "_" || name == "init" {
            return;
        }
        self.p.packages[self.package.index()]
            .scope
            .insert(name.to_string(), id);
    }

    // ------------------------------------------------------------------------
    // Universe
    // ------------------------------------------------------------------------

    fn universe_object(&mut self, name: &str, kind: ObjectKind, ty: Type) -> ObjectId {
        let id = self.p.new_object(Object {
            name: name.to_string(),
            kind,
            ty,
            package: None,
            ident: None,
            decl: None,
            named: None,
        });
        self.p.universe.insert(name.to_string(), id);
        id
    }

    fn install_universe(&mut self) {
        for (name, kind) in BASIC_TYPES.entries() {
            self.universe_object(name, ObjectKind::TypeName, Type::Basic(*kind));
        }
        for (name, builtin) in BUILTINS.entries() {
            self.universe_object(name, ObjectKind::Builtin(*builtin), Type::Invalid);
        }

        let error = self.p.new_named("error", "error".to_string());
        self.p.named[error.id.index()].underlying = Type::Interface(vec![InterfaceMethod {
            name: "Error".to_string(),
            signature: Signature {
                params: Vec::new(),
                results: vec![Type::Basic(BasicKind::String)],
                variadic: false,
            },
        }]);
        let error_object = self.universe_object("error", ObjectKind::TypeName, Type::Named(error.clone()));
        self.p.objects[error_object.index()].named = Some(error.id);
        self.p.named[error.id.index()].object = Some(error_object);
        self.p.error_type = Some(error.id);

        self.universe_object("any", ObjectKind::TypeName, Type::Interface(Vec::new()));
        self.universe_object("comparable", ObjectKind::TypeName, Type::Interface(Vec::new()));
        for (name, value) in [("true", true), ("false", false)] {
            self.universe_object(
                name,
                ObjectKind::Const(Some(super::ConstValue::Bool(value))),
                Type::Basic(BasicKind::UntypedBool),
            );
        }
        self.universe_object("nil", ObjectKind::Nil, Type::Basic(BasicKind::UntypedNil));
    }

    // ------------------------------------------------------------------------
    // Package-level collection
    // ------------------------------------------------------------------------

    fn collect(&mut self) {
        self.file_scopes = (0..self.p.files.len()).map(|_| FileScope::default()).collect();

        let mut methods = Vec::new();
        for index in 0..self.p.files.len() {
            let file = FileId(index as u32);
            self.enter_file(file);
            self.collect_imports(file);

            let root = self.p.files[index].root;
            for decl in self.children(root) {
                match self.kind(decl) {
                    SyntaxKind::FunctionDeclaration => {
                        self.collect_func(decl);
                    }
                    SyntaxKind::MethodDeclaration => {
                        if let Some(id) = self.collect_func(decl) {
                            methods.push((id, decl, file));
                        }
                    }
                    SyntaxKind::ConstDeclaration => self.collect_consts(decl),
                    SyntaxKind::VarDeclaration => self.collect_vars(decl),
                    SyntaxKind::TypeDeclaration => self.collect_types(decl),
                    _ => {}
                }
            }
        }

        for (method, decl, file) in methods {
            self.enter_file(file);
            self.attach_method(method, decl);
        }
    }

    fn collect_imports(&mut self, file: FileId) {
        let imports = self.p.files[file.index()].imports.clone();
        for import in imports {
            let target = self.p.package_by_path(&import.path).map(|p| (p.id, p.name.clone()));
            match import.alias.as_deref() {
                Some("_") => {}
                Some(".") => {
                    if let Some((id, _)) = target {
                        self.file_scopes[file.index()].dot_imports.push(id);
                    }
                }
                alias => {
                    let name = match (alias, &target) {
                        (Some(alias), _) => alias.to_string(),
                        (None, Some((_, name))) if !name.is_empty() => name.clone(),
                        _ => import.path.rsplit('/').next().unwrap_or(&import.path).to_string(),
                    };
                    let id = self.new_object(
                        name.clone(),
                        ObjectKind::PkgName { path: import.path.clone() },
                        Type::Invalid,
                        None,
                    );
                    self.p.objects[id.index()].decl = Some(import.spec);
                    self.file_scopes[file.index()].imports.insert(name, id);
                }
            }
        }
    }

    fn defer(&mut self, id: ObjectId, pending: Pending) {
        self.pending.insert(id, pending);
        self.order.push(id);
    }

    fn collect_func(&mut self, decl: NodeId) -> Option<ObjectId> {
        let name_node = self.field(decl, "name")?;
        let name = self.text(name_node);
        let id = self.new_object(name.clone(), ObjectKind::Func, Type::Invalid, Some(name_node));
        self.p.objects[id.index()].decl = Some(decl);
        self.p.defs.insert(name_node, id);
        self.defer(id, Pending::Func { decl, file: self.file });
        if self.kind(decl) == SyntaxKind::FunctionDeclaration {
            self.declare_package_level(&name, id);
        }
        Some(id)
    }

    fn collect_consts(&mut self, decl: NodeId) {
        let mut source = None;
        let mut iota = 0;
        for spec in self.children(decl) {
            if self.kind(spec) != SyntaxKind::ConstSpec {
                continue;
            }
            if self.field(spec, "value").is_some() {
                source = Some(spec);
            }
            let source = source.unwrap_or(spec);
            for name_node in self.fields(spec, "name") {
                let name = self.text(name_node);
                let id = self.new_object(name.clone(), ObjectKind::Const(None), Type::Invalid, Some(name_node));
                self.p.objects[id.index()].decl = Some(spec);
                self.p.defs.insert(name_node, id);
                self.defer(
                    id,
                    Pending::Const {
                        spec,
                        source,
                        iota,
                        file: self.file,
                    },
                );
                self.declare_package_level(&name, id);
            }
            iota += 1;
        }
    }

    fn collect_vars(&mut self, decl: NodeId) {
        for spec in self.children(decl) {
            if self.kind(spec) != SyntaxKind::VarSpec {
                continue;
            }
            for name_node in self.fields(spec, "name") {
                let name = self.text(name_node);
                let id = self.new_object(name.clone(), ObjectKind::Var, Type::Invalid, Some(name_node));
                self.p.objects[id.index()].decl = Some(spec);
                self.p.defs.insert(name_node, id);
                self.defer(id, Pending::Var { spec, file: self.file });
                self.declare_package_level(&name, id);
            }
        }
    }

    fn collect_types(&mut self, decl: NodeId) {
        for spec in self.children(decl) {
            let Some(name_node) = self.field(spec, "name") else {
                continue;
            };
            let name = self.text(name_node);
            let id = match self.kind(spec) {
                SyntaxKind::TypeSpec => self.new_named_type(&name, name_node),
                SyntaxKind::TypeAlias => {
                    self.new_object(name.clone(), ObjectKind::TypeName, Type::Invalid, Some(name_node))
                }
                _ => continue,
            };
            self.p.objects[id.index()].decl = Some(spec);
            self.p.defs.insert(name_node, id);
            self.defer(id, Pending::Type { spec, file: self.file });
            self.declare_package_level(&name, id);
        }
    }

    /// Type name object for a new defined type; its underlying type is
    /// filled in later.
    fn new_named_type(&mut self, name: &str, ident: NodeId) -> ObjectId {
        let qualified = format!("{}.{}", self.package_path(), name);
        let named = self.p.new_named(name, qualified);
        let id = self.new_object(name.to_string(), ObjectKind::TypeName, Type::Named(named.clone()), Some(ident));
        self.p.objects[id.index()].named = Some(named.id);
        self.p.named[named.id.index()].object = Some(id);
        id
    }

    fn attach_method(&mut self, method: ObjectId, decl: NodeId) {
        let Some(receiver) = self.field(decl, "receiver") else {
            return;
        };
        let Some(param) = self.children(receiver).first().copied() else {
            return;
        };
        let Some(mut ty) = self.field(param, "type") else {
            return;
        };
        loop {
            match self.kind(ty) {
                SyntaxKind::PointerType | SyntaxKind::ParenthesizedType => {
                    match self.children(ty).first() {
                        Some(inner) => ty = *inner,
                        None => return,
                    }
                }
                SyntaxKind::GenericType => match self.field(ty, "type") {
                    Some(inner) => ty = inner,
                    None => return,
                },
                _ => break,
            }
        }

        let base = self.text(ty);
        let named = self.p.packages[self.package.index()]
            .scope
            .get(&base)
            .and_then(|id| self.p.objects[id.index()].named);
        if let Some(named) = named {
            self.p.objects[method.index()].named = Some(named);
            self.p.named[named.index()].methods.push(method);
        }
    }

    // ------------------------------------------------------------------------
    // Lazy resolution
    // ------------------------------------------------------------------------

    fn resolve_pending(&mut self) {
        for id in mem::take(&mut self.order) {
            self.ensure(id);
        }
    }

    /// Compute the type of a package-level object if it is still pending.
    ///
    /// A declaration that depends on itself sees the object with an invalid
    /// type.
    fn ensure(&mut self, id: ObjectId) {
        let Some(pending) = self.pending.remove(&id) else {
            return;
        };
        trace!(object = %self.p.objects[id.index()].name, "resolving declaration");

        let env = self.save_env();
        self.enter_file(pending.file());
        match pending {
            Pending::Func { decl, .. } => {
                let signature = self.signature_of(self.field(decl, "parameters"), self.field(decl, "result"));
                self.p.objects[id.index()].ty = Type::Signature(Box::new(signature));
            }
            Pending::Type { spec, .. } => self.resolve_type_spec(id, spec),
            Pending::Const { spec, source, iota, .. } => {
                if self.specs_in_progress.insert(spec) {
                    let values = self.const_spec_values(spec, source, iota);
                    self.assign_spec_objects(spec, values);
                    self.specs_in_progress.remove(&spec);
                }
            }
            Pending::Var { spec, .. } => {
                if self.specs_in_progress.insert(spec) {
                    let values = self
                        .var_spec_types(spec)
                        .into_iter()
                        .map(TypeAndValue::new)
                        .collect();
                    self.assign_spec_objects(spec, values);
                    self.specs_in_progress.remove(&spec);
                }
            }
        }
        self.restore_env(env);
    }

    /// Store computed types on every object declared by a const or var spec.
    fn assign_spec_objects(&mut self, spec: NodeId, values: Vec<TypeAndValue>) {
        for (name_node, tv) in self.fields(spec, "name").into_iter().zip(values) {
            let Some(id) = self.p.defs.get(&name_node).copied() else {
                continue;
            };
            self.pending.remove(&id);
            let object = &mut self.p.objects[id.index()];
            if let ObjectKind::Const(_) = object.kind {
                object.kind = ObjectKind::Const(tv.value);
            }
            object.ty = tv.ty;
        }
    }

    fn resolve_type_spec(&mut self, id: ObjectId, spec: NodeId) {
        let Some(type_node) = self.field(spec, "type") else {
            return;
        };
        let ty = self.resolve_type(type_node);
        match self.p.objects[id.index()].named {
            Some(named) if self.kind(spec) == SyntaxKind::TypeSpec => {
                let underlying = self.underlying_of(&ty);
                self.p.named[named.index()].underlying = underlying;
            }
            _ => self.p.objects[id.index()].ty = ty,
        }
    }

    /// Underlying type, resolving the named type's declaration first.
    fn underlying_of(&mut self, ty: &Type) -> Type {
        match ty {
            Type::Named(named) => {
                if let Some(object) = self.p.named[named.id.index()].object {
                    self.ensure(object);
                }
                self.p.named[named.id.index()].underlying.clone()
            }
            other => other.clone(),
        }
    }

    /// Type of a type name object, resolving aliases on demand.
    fn type_of_type_name(&mut self, id: ObjectId) -> Type {
        if self.p.objects[id.index()].named.is_none() {
            self.ensure(id);
        }
        self.p.objects[id.index()].ty.clone()
    }

    /// Values of the constants declared by `spec`.
    fn const_spec_values(&mut self, spec: NodeId, source: NodeId, iota: i128) -> Vec<TypeAndValue> {
        let saved_record = self.record;
        let saved_iota = self.iota;
        self.record = saved_record && source == spec;
        self.iota = Some(iota);

        let declared = self.field(source, "type").map(|t| self.resolve_type(t));
        let values = self
            .field(source, "value")
            .map(|list| self.children(list))
            .unwrap_or_default();

        let mut out = Vec::new();
        for index in 0..self.fields(spec, "name").len() {
            let tv = match values.get(index) {
                Some(value) => self.check_expr(*value),
                None => TypeAndValue::invalid(),
            };
            out.push(match &declared {
                Some(ty) => self.conversion(ty, tv),
                None => tv,
            });
        }

        self.record = saved_record;
        self.iota = saved_iota;
        out
    }

    /// Types of the variables declared by `spec`, checking its values.
    fn var_spec_types(&mut self, spec: NodeId) -> Vec<Type> {
        let count = self.fields(spec, "name").len();
        let declared = self.field(spec, "type").map(|t| self.resolve_type(t));
        let values = self
            .field(spec, "value")
            .map(|list| self.children(list))
            .unwrap_or_default();
        let rhs = self.check_rhs(&values, count);

        (0..count)
            .map(|i| match &declared {
                Some(ty) => ty.clone(),
                None => rhs.get(i).map(|tv| variable_type(&tv.ty)).unwrap_or(Type::Invalid),
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Function bodies
    // ------------------------------------------------------------------------

    fn check_bodies(&mut self) {
        for index in 0..self.p.files.len() {
            self.enter_file(FileId(index as u32));
            let root = self.p.files[index].root;
            for decl in self.children(root) {
                if self.kind(decl).is_function() {
                    self.check_function(decl);
                }
            }
        }
    }

    /// Check a function declaration or literal body in a fresh scope holding
    /// its receiver, parameters and named results.
    fn check_function(&mut self, func: NodeId) {
        let Some(body) = self.field(func, "body") else {
            return;
        };
        self.scopes.push(HashMap::new());
        for field in ["receiver", "parameters", "result"] {
            if let Some(list) = self.field(func, field) {
                if self.kind(list) == SyntaxKind::ParameterList {
                    self.declare_params(list);
                }
            }
        }
        let iota = self.iota.take();
        self.check_statements(body);
        self.iota = iota;
        self.scopes.pop();
    }

    fn declare_params(&mut self, list: NodeId) {
        for param in self.children(list) {
            let (ty, _) = self.param_type(param);
            for name in self.fields(param, "name") {
                self.declare_var(name, ty.clone());
            }
        }
    }
}

/// Type a variable takes when initialized with a value of type `ty`.
fn variable_type(ty: &Type) -> Type {
    match ty {
        Type::Basic(BasicKind::UntypedNil) => Type::Invalid,
        other => other.defaulted(),
    }
}

#[cfg(test)]
mod tests {
    use crate::program::{BasicKind, ConstValue, ObjectKind, ProgramBuilder, Type};

    fn build(source: &str) -> crate::program::Program {
        ProgramBuilder::new()
            .package("example.com/p", [("p.go", source)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_out_of_order_package_declarations() {
        let p = build("package p\n\nvar a = b + 1\n\nconst b = 2\n");

        assert_eq!(p.object(p.var("a").unwrap()).ty, Type::Basic(BasicKind::Int));
        assert_eq!(
            p.object(p.const_("b").unwrap()).kind,
            ObjectKind::Const(Some(ConstValue::Int(2)))
        );
    }

    #[test]
    fn test_iota_and_implicit_repetition() {
        let p = build("package p\n\ntype Level int\n\nconst (\n\tLow Level = iota\n\tMid\n\tHigh\n)\n");

        let high = p.object(p.const_("High").unwrap());
        assert_eq!(high.kind, ObjectKind::Const(Some(ConstValue::Int(2))));
        assert_eq!(high.ty.to_string(), "example.com/p.Level");
    }

    #[test]
    fn test_self_referential_declarations_terminate() {
        let p = build("package p\n\nvar x = y\n\nvar y = x\n\ntype A B\n\ntype B A\n");

        assert!(p.var("x").is_some());
        assert!(p.type_name("A").is_some());
    }

    #[test]
    fn test_methods_attach_to_named_types() {
        let p = build("package p\n\ntype T struct{ n int }\n\nfunc (t *T) Get() int { return t.n }\n");

        let get = p.method("T", "Get").unwrap();
        assert_eq!(p.object(get).ty.to_string(), "func() int");
        assert!(p.object(get).is_method());
    }
}
