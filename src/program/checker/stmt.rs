//! Statements and local declarations.

use std::collections::HashMap;

use super::{variable_type, Checker};
use crate::program::objects::ObjectKind;
use crate::program::types::{BasicKind, Type, TypeAndValue};
use crate::syntax::{NodeId, SyntaxKind};

impl Checker<'_> {
    /// Check the statements of a block in the current scope.
    pub(super) fn check_statements(&mut self, block: NodeId) {
        for stmt in self.children(block) {
            self.check_stmt(stmt);
        }
    }

    fn check_block(&mut self, block: NodeId) {
        self.scopes.push(HashMap::new());
        self.check_statements(block);
        self.scopes.pop();
    }

    fn check_stmt(&mut self, node: NodeId) {
        use SyntaxKind::*;
        match self.kind(node) {
            Block => self.check_block(node),
            ExpressionStatement | GoStatement | DeferStatement | IncStatement | DecStatement => {
                for child in self.children(node) {
                    self.check_expr(child);
                }
            }
            SendStatement => {
                for field in ["channel", "value"] {
                    if let Some(child) = self.field(node, field) {
                        self.check_expr(child);
                    }
                }
            }
            ReturnStatement => {
                for child in self.children(node) {
                    if self.kind(child) == ExpressionList {
                        for expr in self.children(child) {
                            self.check_expr(expr);
                        }
                    } else {
                        self.check_expr(child);
                    }
                }
            }
            AssignmentStatement => self.assignment(node),
            ShortVarDeclaration => self.short_var_declaration(node),
            VarDeclaration => {
                for spec in self.children(node) {
                    if self.kind(spec) == VarSpec {
                        let types = self.var_spec_types(spec);
                        for (name, ty) in self.fields(spec, "name").into_iter().zip(types) {
                            self.declare(name, ObjectKind::Var, ty, Some(spec));
                        }
                    }
                }
            }
            ConstDeclaration => self.local_consts(node),
            TypeDeclaration => self.local_types(node),
            LabeledStatement => {
                for child in self.children(node) {
                    if self.kind(child) != LabelName {
                        self.check_stmt(child);
                    }
                }
            }
            IfStatement => self.if_statement(node),
            ForStatement => self.for_statement(node),
            ExpressionSwitchStatement => self.switch_statement(node),
            TypeSwitchStatement => self.type_switch_statement(node),
            SelectStatement => self.select_statement(node),
            _ => {}
        }
    }

    /// Check the right-hand side of an assignment to `lhs` targets.
    pub(super) fn check_rhs(&mut self, values: &[NodeId], lhs: usize) -> Vec<TypeAndValue> {
        if let ([value], true) = (values, lhs > 1) {
            let tv = self.check_expr(*value);
            return match tv.ty {
                Type::Tuple(items) => items.into_iter().map(TypeAndValue::new).collect(),
                _ if lhs == 2 && self.is_comma_ok(*value) => {
                    vec![tv, TypeAndValue::new(Type::Basic(BasicKind::Bool))]
                }
                _ => vec![tv],
            };
        }
        values.iter().map(|v| self.check_expr(*v)).collect()
    }

    /// Expressions with an optional second boolean result.
    fn is_comma_ok(&self, expr: NodeId) -> bool {
        let expr = self.p.syntax.unparen(expr);
        match self.kind(expr) {
            SyntaxKind::TypeAssertionExpression | SyntaxKind::IndexExpression => true,
            SyntaxKind::UnaryExpression => self.operator(expr) == "<-",
            _ => false,
        }
    }

    fn assignment(&mut self, node: NodeId) {
        let left = self.field(node, "left").map(|l| self.children(l)).unwrap_or_default();
        let right = self.field(node, "right").map(|r| self.children(r)).unwrap_or_default();
        for target in &left {
            if !self.is_blank(*target) {
                self.check_expr(*target);
            }
        }
        self.check_rhs(&right, left.len());
    }

    fn short_var_declaration(&mut self, node: NodeId) {
        let left = self.field(node, "left").map(|l| self.children(l)).unwrap_or_default();
        let right = self.field(node, "right").map(|r| self.children(r)).unwrap_or_default();
        let values = self.check_rhs(&right, left.len());
        for (i, ident) in left.into_iter().enumerate() {
            let ty = values.get(i).map(|tv| variable_type(&tv.ty)).unwrap_or(Type::Invalid);
            self.define_or_reuse(ident, ty, node);
        }
    }

    /// `:=` declares new names and assigns to names already declared in the
    /// same scope.
    fn define_or_reuse(&mut self, ident: NodeId, ty: Type, decl: NodeId) {
        if self.is_blank(ident) {
            return;
        }
        let name = self.text(ident);
        let existing = self.scopes.last().and_then(|s| s.get(&name)).copied();
        match existing {
            Some(id) => self.record_use(ident, id),
            None => {
                self.declare(ident, ObjectKind::Var, ty, Some(decl));
            }
        }
    }

    fn local_consts(&mut self, decl: NodeId) {
        let mut source = None;
        let mut iota = 0;
        for spec in self.children(decl) {
            if self.kind(spec) != SyntaxKind::ConstSpec {
                continue;
            }
            if self.field(spec, "value").is_some() {
                source = Some(spec);
            }
            let values = self.const_spec_values(spec, source.unwrap_or(spec), iota);
            for (name, tv) in self.fields(spec, "name").into_iter().zip(values) {
                self.declare(name, ObjectKind::Const(tv.value), tv.ty, Some(spec));
            }
            iota += 1;
        }
    }

    fn local_types(&mut self, decl: NodeId) {
        for spec in self.children(decl) {
            let (Some(name), Some(type_node)) = (self.field(spec, "name"), self.field(spec, "type")) else {
                continue;
            };
            match self.kind(spec) {
                SyntaxKind::TypeSpec => {
                    let id = self.new_named_type(&self.text(name), name);
                    self.p.objects[id.index()].decl = Some(spec);
                    self.p.defs.insert(name, id);
                    if let Some(scope) = self.scopes.last_mut() {
                        scope.insert(self.p.objects[id.index()].name.clone(), id);
                    }
                    let ty = self.resolve_type(type_node);
                    let underlying = self.underlying_of(&ty);
                    if let Some(named) = self.p.objects[id.index()].named {
                        self.p.named[named.index()].underlying = underlying;
                    }
                }
                SyntaxKind::TypeAlias => {
                    let ty = self.resolve_type(type_node);
                    self.declare(name, ObjectKind::TypeName, ty, Some(spec));
                }
                _ => {}
            }
        }
    }

    fn if_statement(&mut self, node: NodeId) {
        self.scopes.push(HashMap::new());
        if let Some(init) = self.field(node, "initializer") {
            self.check_stmt(init);
        }
        if let Some(condition) = self.field(node, "condition") {
            self.check_expr(condition);
        }
        if let Some(consequence) = self.field(node, "consequence") {
            self.check_block(consequence);
        }
        if let Some(alternative) = self.field(node, "alternative") {
            self.check_stmt(alternative);
        }
        self.scopes.pop();
    }

    fn for_statement(&mut self, node: NodeId) {
        self.scopes.push(HashMap::new());
        for child in self.children(node) {
            match self.kind(child) {
                SyntaxKind::ForClause => {
                    if let Some(init) = self.field(child, "initializer") {
                        self.check_stmt(init);
                    }
                    if let Some(condition) = self.field(child, "condition") {
                        self.check_expr(condition);
                    }
                    if let Some(update) = self.field(child, "update") {
                        self.check_stmt(update);
                    }
                }
                SyntaxKind::RangeClause => self.range_clause(child),
                SyntaxKind::Block => self.check_block(child),
                _ => {
                    self.check_expr(child);
                }
            }
        }
        self.scopes.pop();
    }

    fn range_clause(&mut self, node: NodeId) {
        let range = match self.field(node, "right") {
            Some(right) => self.check_expr(right),
            None => TypeAndValue::invalid(),
        };
        let (key, value) = self.range_types(&range.ty);
        let left = self.field(node, "left").map(|l| self.children(l)).unwrap_or_default();

        let define = self.operator(node) == ":=";
        for (ident, ty) in left.into_iter().zip([key, value]) {
            if define {
                if !self.is_blank(ident) {
                    self.declare(ident, ObjectKind::Var, ty, Some(node));
                }
            } else if !self.is_blank(ident) {
                self.check_expr(ident);
            }
        }
    }

    /// Key and value types produced by ranging over `ty`.
    fn range_types(&mut self, ty: &Type) -> (Type, Type) {
        let int = Type::Basic(BasicKind::Int);
        let underlying = match self.underlying_of(ty) {
            Type::Pointer(elem) => self.underlying_of(&elem),
            other => other,
        };
        match underlying {
            Type::Basic(kind) if kind.is_string() => (int, Type::Basic(BasicKind::Int32)),
            Type::Basic(kind) if kind.is_integer() => (ty.defaulted(), Type::Invalid),
            Type::Slice(elem) | Type::Array(_, elem) => (int, *elem),
            Type::Map(key, value) => (*key, *value),
            Type::Chan(elem) => (*elem, Type::Invalid),
            _ => (Type::Invalid, Type::Invalid),
        }
    }

    fn switch_statement(&mut self, node: NodeId) {
        self.scopes.push(HashMap::new());
        if let Some(init) = self.field(node, "initializer") {
            self.check_stmt(init);
        }
        if let Some(value) = self.field(node, "value") {
            self.check_expr(value);
        }
        for clause in self.children(node) {
            if !matches!(self.kind(clause), SyntaxKind::ExpressionCase | SyntaxKind::DefaultCase) {
                continue;
            }
            self.scopes.push(HashMap::new());
            for child in self.children(clause) {
                if self.p.syntax.node(child).field == Some("value") {
                    for expr in self.children(child) {
                        self.check_expr(expr);
                    }
                } else {
                    self.check_stmt(child);
                }
            }
            self.scopes.pop();
        }
        self.scopes.pop();
    }

    fn type_switch_statement(&mut self, node: NodeId) {
        self.scopes.push(HashMap::new());
        if let Some(init) = self.field(node, "initializer") {
            self.check_stmt(init);
        }
        let alias = self
            .field(node, "alias")
            .and_then(|list| self.children(list).first().copied());
        let value = match self.field(node, "value") {
            Some(value) => self.check_expr(value),
            None => TypeAndValue::invalid(),
        };

        for clause in self.children(node) {
            if !matches!(self.kind(clause), SyntaxKind::TypeCase | SyntaxKind::DefaultCase) {
                continue;
            }
            let types: Vec<Type> = self
                .fields(clause, "type")
                .into_iter()
                .map(|t| self.resolve_type(t))
                .collect();
            self.scopes.push(HashMap::new());
            if let Some(alias) = alias {
                let ty = match types.as_slice() {
                    [single] if !single.is_invalid() => single.clone(),
                    _ => value.ty.clone(),
                };
                self.declare_var(alias, ty);
            }
            for child in self.children(clause) {
                if self.p.syntax.node(child).field != Some("type") {
                    self.check_stmt(child);
                }
            }
            self.scopes.pop();
        }
        self.scopes.pop();
    }

    fn select_statement(&mut self, node: NodeId) {
        for clause in self.children(node) {
            if !matches!(self.kind(clause), SyntaxKind::CommunicationCase | SyntaxKind::DefaultCase) {
                continue;
            }
            self.scopes.push(HashMap::new());
            for child in self.children(clause) {
                if self.kind(child) == SyntaxKind::ReceiveStatement {
                    self.receive(child);
                } else {
                    self.check_stmt(child);
                }
            }
            self.scopes.pop();
        }
    }

    fn receive(&mut self, node: NodeId) {
        let received = match self.field(node, "right") {
            Some(right) => self.check_expr(right),
            None => TypeAndValue::invalid(),
        };
        let left = self.field(node, "left").map(|l| self.children(l)).unwrap_or_default();
        let define = self.operator(node) == ":=";
        let types = [received.ty, Type::Basic(BasicKind::Bool)];
        for (ident, ty) in left.into_iter().zip(types) {
            if define {
                self.define_or_reuse(ident, ty, node);
            } else if !self.is_blank(ident) {
                self.check_expr(ident);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::program::{Program, ProgramBuilder};
    use crate::syntax::{NodeId, SyntaxKind};

    fn build(source: &str) -> Program {
        ProgramBuilder::new()
            .package("example.com/p", [("p.go", source)])
            .build()
            .unwrap()
    }

    fn idents<'a>(p: &'a Program, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        p.syntax()
            .subtree(p.files()[0].root)
            .filter(move |n| p.kind(*n) == SyntaxKind::Identifier && p.text(*n) == name)
    }

    #[test]
    fn test_shadowing_creates_distinct_objects() {
        let p = build("package p\n\nfunc f() int {\n\tx := 1\n\tif true {\n\t\tx := \"s\"\n\t\t_ = x\n\t}\n\treturn x\n}\n");

        let objects: Vec<_> = idents(&p, "x").filter_map(|n| p.object_of(n)).collect();
        assert_eq!(objects.len(), 4);
        assert_eq!(objects[0], objects[3]);
        assert_eq!(objects[1], objects[2]);
        assert_ne!(objects[0], objects[1]);
        assert_eq!(p.object(objects[1]).ty.to_string(), "string");
    }

    #[test]
    fn test_short_var_reuses_named_result() {
        let p = build("package p\n\nfunc g() (int, error) { return 0, nil }\n\nfunc f() (n int, err error) {\n\tn, err = g()\n\tm, err := g()\n\t_ = m\n\treturn\n}\n");

        let errs: Vec<_> = idents(&p, "err").filter_map(|n| p.object_of(n)).collect();
        assert!(errs.windows(2).all(|w| w[0] == w[1]), "all err identifiers share the result object");
    }

    #[test]
    fn test_range_and_comma_ok_types() {
        let p = build("package p\n\nfunc f(m map[string]bool, s []float64) {\n\tfor k, v := range m {\n\t\t_, _ = k, v\n\t}\n\tfor i, x := range s {\n\t\t_, _ = i, x\n\t}\n\tok2, found := m[\"a\"]\n\t_, _ = ok2, found\n}\n");

        let ty = |name: &str| {
            let ident = idents(&p, name).next().unwrap();
            p.object(p.object_of(ident).unwrap()).ty.to_string()
        };
        assert_eq!(ty("k"), "string");
        assert_eq!(ty("v"), "bool");
        assert_eq!(ty("i"), "int");
        assert_eq!(ty("x"), "float64");
        assert_eq!(ty("found"), "bool");
    }

    #[test]
    fn test_type_switch_alias_takes_case_type() {
        let p = build("package p\n\nfunc f(v interface{}) int {\n\tswitch t := v.(type) {\n\tcase int:\n\t\treturn t\n\t}\n\treturn 0\n}\n");

        let ret = p
            .syntax()
            .subtree(p.files()[0].root)
            .find(|n| p.kind(*n) == SyntaxKind::ReturnStatement)
            .unwrap();
        let expr = p.syntax().subtree(ret).find(|n| p.kind(*n) == SyntaxKind::Identifier).unwrap();
        assert_eq!(p.type_and_value_of(expr).unwrap().ty.to_string(), "int");
    }
}
