//! Type expressions.

use super::Checker;
use crate::program::objects::{Object, ObjectKind};
use crate::program::types::{InterfaceMethod, Signature, StructField, Type};
use crate::syntax::{NodeId, SyntaxKind};

impl Checker<'_> {
    /// Type denoted by a type expression; unknown types are invalid.
    pub(super) fn resolve_type(&mut self, node: NodeId) -> Type {
        use SyntaxKind::*;
        match self.kind(node) {
            TypeIdentifier | Identifier => {
                let name = self.text(node);
                match self.lookup(&name) {
                    Some(id) if self.p.objects[id.index()].is_type_name() => {
                        self.record_use(node, id);
                        self.type_of_type_name(id)
                    }
                    _ => Type::Invalid,
                }
            }
            QualifiedType => match (self.field(node, "package"), self.field(node, "name")) {
                (Some(package), Some(name)) => self.qualified_type(package, name),
                _ => Type::Invalid,
            },
            SelectorExpression => match (self.field(node, "operand"), self.field(node, "field")) {
                (Some(package), Some(name)) => self.qualified_type(package, name),
                _ => Type::Invalid,
            },
            PointerType => self.first_child_type(node, Type::Pointer),
            ParenthesizedType => self.first_child_type(node, |t| *t),
            SliceType => self.field_type(node, "element", Type::Slice),
            ImplicitLengthArrayType => self.field_type(node, "element", |t| Type::Array(None, t)),
            ArrayType => {
                let length = self
                    .field(node, "length")
                    .and_then(|l| self.check_expr(l).value)
                    .and_then(|v| v.as_int())
                    .and_then(|v| u64::try_from(v).ok());
                self.field_type(node, "element", |t| Type::Array(length, t))
            }
            MapType => {
                let key = self.field(node, "key").map(|k| self.resolve_type(k));
                let value = self.field(node, "value").map(|v| self.resolve_type(v));
                match (key, value) {
                    (Some(key), Some(value)) => Type::Map(Box::new(key), Box::new(value)),
                    _ => Type::Invalid,
                }
            }
            ChannelType => self.field_type(node, "value", Type::Chan),
            FunctionType => {
                let signature =
                    self.signature_of(self.field(node, "parameters"), self.field(node, "result"));
                Type::Signature(Box::new(signature))
            }
            StructType => self.struct_type(node),
            InterfaceType => self.interface_type(node),
            GenericType => match self.field(node, "type") {
                Some(inner) => self.resolve_type(inner),
                None => Type::Invalid,
            },
            _ => Type::Invalid,
        }
    }

    fn first_child_type(&mut self, node: NodeId, wrap: impl FnOnce(Box<Type>) -> Type) -> Type {
        match self.children(node).first() {
            Some(inner) => {
                let inner = self.resolve_type(*inner);
                wrap(Box::new(inner))
            }
            None => Type::Invalid,
        }
    }

    fn field_type(&mut self, node: NodeId, field: &str, wrap: impl FnOnce(Box<Type>) -> Type) -> Type {
        match self.field(node, field) {
            Some(inner) => {
                let inner = self.resolve_type(inner);
                wrap(Box::new(inner))
            }
            None => Type::Invalid,
        }
    }

    /// `pkg.Name` in type position.
    fn qualified_type(&mut self, package: NodeId, name: NodeId) -> Type {
        let Some(package_object) = self.lookup(&self.text(package)) else {
            return Type::Invalid;
        };
        let ObjectKind::PkgName { path } = self.p.objects[package_object.index()].kind.clone() else {
            return Type::Invalid;
        };
        self.record_use(package, package_object);
        let type_name = self.text(name);

        if let Some(target) = self.p.package_by_path(&path) {
            return match target.scope_lookup(&type_name) {
                Some(id) if self.p.objects[id.index()].is_type_name() => {
                    self.record_use(name, id);
                    self.type_of_type_name(id)
                }
                _ => Type::Invalid,
            };
        }

        // Opaque package: a named type without a known underlying type.
        let qualified = format!("{}.{}", path, type_name);
        if let Some(named) = self.external.get(&qualified) {
            return Type::Named(named.clone());
        }
        let named = self.p.new_named(&type_name, qualified.clone());
        self.external.insert(qualified, named.clone());
        Type::Named(named)
    }

    /// Signature from a parameter list and an optional result.
    pub(super) fn signature_of(&mut self, params: Option<NodeId>, result: Option<NodeId>) -> Signature {
        let mut signature = Signature::default();
        if let Some(list) = params {
            for param in self.children(list) {
                let (ty, variadic) = self.param_type(param);
                let count = self.fields(param, "name").len().max(1);
                signature.params.extend(std::iter::repeat(ty).take(count));
                signature.variadic |= variadic;
            }
        }
        match result {
            Some(list) if self.kind(list) == SyntaxKind::ParameterList => {
                for param in self.children(list) {
                    let (ty, _) = self.param_type(param);
                    let count = self.fields(param, "name").len().max(1);
                    signature.results.extend(std::iter::repeat(ty).take(count));
                }
            }
            Some(ty) => {
                let ty = self.resolve_type(ty);
                signature.results.push(ty);
            }
            None => {}
        }
        signature
    }

    /// Type of one parameter declaration and whether it is variadic.
    pub(super) fn param_type(&mut self, param: NodeId) -> (Type, bool) {
        let ty = match self.field(param, "type") {
            Some(node) => self.resolve_type(node),
            None => Type::Invalid,
        };
        if self.kind(param) == SyntaxKind::VariadicParameterDeclaration {
            (Type::Slice(Box::new(ty)), true)
        } else {
            (ty, false)
        }
    }

    fn struct_type(&mut self, node: NodeId) -> Type {
        let Some(list) = self.p.syntax.child_of_kind(node, SyntaxKind::FieldDeclarationList) else {
            return Type::Struct(Vec::new());
        };

        let mut fields = Vec::new();
        for decl in self.children(list) {
            if self.kind(decl) != SyntaxKind::FieldDeclaration {
                continue;
            }
            let Some(type_node) = self.field(decl, "type") else {
                continue;
            };
            let ty = self.resolve_type(type_node);
            let names = self.fields(decl, "name");

            if names.is_empty() {
                let name = self.embedded_name(type_node);
                let id = self.field_object(name.clone(), ty.clone(), type_node, decl);
                fields.push(StructField {
                    name,
                    ty,
                    embedded: true,
                    object: Some(id),
                });
                continue;
            }
            for name_node in names {
                let name = self.text(name_node);
                let id = self.field_object(name.clone(), ty.clone(), name_node, decl);
                self.p.defs.insert(name_node, id);
                fields.push(StructField {
                    name,
                    ty: ty.clone(),
                    embedded: false,
                    object: Some(id),
                });
            }
        }
        Type::Struct(fields)
    }

    fn field_object(&mut self, name: String, ty: Type, ident: NodeId, decl: NodeId) -> crate::program::ObjectId {
        self.p.new_object(Object {
            name,
            kind: ObjectKind::Field,
            ty,
            package: Some(self.package),
            ident: Some(ident),
            decl: Some(decl),
            named: None,
        })
    }

    /// Field name of an embedded type: its unqualified type name.
    fn embedded_name(&self, node: NodeId) -> String {
        match self.kind(node) {
            SyntaxKind::QualifiedType => self
                .field(node, "name")
                .map(|n| self.text(n))
                .unwrap_or_default(),
            SyntaxKind::GenericType => self
                .field(node, "type")
                .map(|n| self.embedded_name(n))
                .unwrap_or_default(),
            SyntaxKind::PointerType => self
                .children(node)
                .first()
                .map(|n| self.embedded_name(*n))
                .unwrap_or_default(),
            _ => self.text(node),
        }
    }

    fn interface_type(&mut self, node: NodeId) -> Type {
        let mut methods = Vec::new();
        for elem in self.children(node) {
            match self.kind(elem) {
                SyntaxKind::MethodElem => {
                    let Some(name) = self.field(elem, "name") else {
                        continue;
                    };
                    let signature =
                        self.signature_of(self.field(elem, "parameters"), self.field(elem, "result"));
                    methods.push(InterfaceMethod {
                        name: self.text(name),
                        signature,
                    });
                }
                SyntaxKind::TypeElem => {
                    // Embedded interfaces contribute their methods; other
                    // constraint terms are ignored.
                    for term in self.children(elem) {
                        let ty = self.resolve_type(term);
                        if let Type::Interface(embedded) = self.underlying_of(&ty) {
                            methods.extend(embedded);
                        }
                    }
                }
                _ => {}
            }
        }
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        Type::Interface(methods)
    }
}

#[cfg(test)]
mod tests {
    use crate::program::{ProgramBuilder, Type};

    fn type_of(source: &str, name: &str) -> String {
        let p = ProgramBuilder::new()
            .package("example.com/p", [("p.go", source)])
            .build()
            .unwrap();
        let id = p.type_name(name).unwrap();
        let ty = &p.object(id).ty;
        p.underlying(ty).to_string()
    }

    #[test]
    fn test_composite_type_expressions() {
        let source = "package p\n\ntype M map[string][]*int\n\ntype A [2 + 1]byte\n\ntype F func(int, ...string) (bool, error)\n";

        assert_eq!(type_of(source, "M"), "map[string][]*int");
        assert_eq!(type_of(source, "A"), "[3]uint8");
        assert_eq!(type_of(source, "F"), "func(int, ...string) (bool, error)");
    }

    #[test]
    fn test_struct_and_interface_types() {
        let source = "package p\n\ntype S struct {\n\ta, b int\n\tName string\n}\n\ntype I interface {\n\tfmt() string\n\terror\n}\n";

        assert_eq!(type_of(source, "S"), "struct{a int; b int; Name string}");
        assert_eq!(type_of(source, "I"), "interface{Error() string; fmt() string}");
    }

    #[test]
    fn test_opaque_package_types_are_named() {
        let p = ProgramBuilder::new()
            .package(
                "example.com/p",
                [("p.go", "package p\n\nimport \"time\"\n\ntype D = time.Duration\n")],
            )
            .build()
            .unwrap();

        let ty = p.object(p.type_name("D").unwrap()).ty.clone();
        assert_eq!(ty.to_string(), "time.Duration");
        assert_eq!(*p.underlying(&ty), Type::Invalid);
    }
}
