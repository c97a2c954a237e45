//! Return value resolution.
//!
//! For every result slot of a function the resolver collects the values the
//! function may return:
//!
//! - constant expressions contribute their folded value;
//! - calls contribute the results of the callee, chased through function
//!   literals, function-valued variables and curried calls;
//! - identifiers and selectors of interface type are replaced by the values
//!   last assigned to them before the point of use;
//! - bare returns read the last assignment to each named result.
//!
//! Values are finally normalized to the declared result types, except in
//! interface slots where the concrete type is the interesting part.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use tracing::{debug, trace};

use super::eval::ExpressionEvaluator;
use crate::error::Result;
use crate::program::{
    BasicKind, ConstValue, FunctionDecl, ObjectId, ObjectKind, Program, Signature, Type,
};
use crate::syntax::{NodeId, SyntaxKind};

/// A possible runtime value: its type, its constant value when known and
/// the expression it comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub ty: Type,
    pub value: Option<ConstValue>,
    pub expr: NodeId,
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}({})", self.ty, value),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// Values per result slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    slots: Vec<Vec<TypedValue>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Values of one slot; empty for slots past the end.
    pub fn slot(&self, index: usize) -> &[TypedValue] {
        self.slots.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn slots(&self) -> &[Vec<TypedValue>] {
        &self.slots
    }

    /// Append a value to a slot, growing the set as needed.
    pub fn push(&mut self, index: usize, value: TypedValue) {
        self.ensure_len(index + 1);
        self.slots[index].push(value);
    }

    /// Grow to at least `len` slots.
    pub fn ensure_len(&mut self, len: usize) {
        if self.slots.len() < len {
            self.slots.resize_with(len, Vec::new);
        }
    }

    /// Append every slot of `other`, shifted by `offset`.
    fn merge_at(&mut self, offset: usize, other: ResultSet) {
        for (index, values) in other.slots.into_iter().enumerate() {
            self.ensure_len(offset + index + 1);
            self.slots[offset + index].extend(values);
        }
    }

    fn take_slot(mut self, index: usize) -> Vec<TypedValue> {
        if index < self.slots.len() {
            self.slots.swap_remove(index)
        } else {
            Vec::new()
        }
    }
}

/// Resolved results of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResults {
    pub results: ResultSet,
    /// Number of declared results.
    pub arity: usize,
}

/// Resolves the possible return values of functions.
pub struct ReturnValueResolver<'p> {
    program: &'p Program,
    evaluator: ExpressionEvaluator<'p>,
    max_depth: usize,
}

impl<'p> ReturnValueResolver<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            evaluator: ExpressionEvaluator::new(program),
            max_depth: program.config().max_call_depth(),
        }
    }

    /// Bound the depth of nested call and assignment chasing.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Results of a function or method object.
    ///
    /// `Ok(None)` when the object is not a function or has no body. A
    /// function declaring no results yields `Some` with an arity of 0 and an
    /// empty result set.
    pub fn results_of(&self, function: ObjectId) -> Result<Option<FunctionResults>> {
        let Some(decl) = self.program.function_declaration_of(function) else {
            debug!(object = %self.program.object(function).name, "no function body to resolve");
            return Ok(None);
        };
        self.results_of_decl(&decl).map(Some)
    }

    /// Results of a function literal node.
    pub fn results_of_literal(&self, node: NodeId) -> Result<Option<FunctionResults>> {
        match self.program.function_literal(node) {
            Some(decl) => self.results_of_decl(&decl).map(Some),
            None => Ok(None),
        }
    }

    fn results_of_decl(&self, decl: &FunctionDecl) -> Result<FunctionResults> {
        let arity = decl.signature.results.len();
        let mut resolution = Resolution::new(self);
        let results = resolution.function(decl)?.unwrap_or_default();
        debug!(
            function = ?decl.node,
            arity,
            values = results.slots().iter().map(Vec::len).sum::<usize>(),
            "resolved results"
        );
        Ok(FunctionResults { results, arity })
    }
}

/// Re-entrancy keys of work in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum InProgress {
    Function(NodeId),
    Assignment(ObjectId, usize),
}

/// Assignment to the tracked object found by the scan.
struct Assignment {
    /// Start of the assigning statement or spec.
    position: usize,
    values: Vec<NodeId>,
    index: usize,
}

/// State of one top-level resolution.
struct Resolution<'p> {
    program: &'p Program,
    evaluator: ExpressionEvaluator<'p>,
    max_depth: usize,
    in_progress: HashSet<InProgress>,
}

impl<'p> Resolution<'p> {
    fn new(resolver: &ReturnValueResolver<'p>) -> Self {
        Self {
            program: resolver.program,
            evaluator: resolver.evaluator,
            max_depth: resolver.max_depth,
            in_progress: HashSet::new(),
        }
    }

    /// Mark work as started; false when it is already running or the depth
    /// bound is reached.
    fn enter(&mut self, key: InProgress) -> bool {
        if self.in_progress.len() >= self.max_depth {
            debug!(?key, depth = self.max_depth, "resolution depth exceeded");
            return false;
        }
        if !self.in_progress.insert(key) {
            trace!(?key, "cycle");
            return false;
        }
        true
    }

    fn leave(&mut self, key: InProgress) {
        self.in_progress.remove(&key);
    }

    /// Values per slot of a function with a body; `None` when the function
    /// is already being resolved higher up.
    fn function(&mut self, decl: &FunctionDecl) -> Result<Option<ResultSet>> {
        let key = InProgress::Function(decl.node);
        if !self.enter(key) {
            return Ok(None);
        }
        let resolved = self.function_returns(decl);
        self.leave(key);
        resolved.map(Some)
    }

    fn function_returns(&mut self, decl: &FunctionDecl) -> Result<ResultSet> {
        let arity = decl.signature.results.len();
        let mut results = ResultSet::new();
        if arity == 0 {
            return Ok(results);
        }

        for ret in self.return_statements(decl.body) {
            let exprs = self.return_values(ret);
            if !exprs.is_empty() {
                let mut values = ResultSet::new();
                self.expression_list(&mut values, &exprs)?;
                results.merge_at(0, values);
                continue;
            }

            // Bare return: the named results hold the values.
            let position = self.program.span(ret).start;
            for (slot, named) in decl.named_results.iter().enumerate() {
                let Some(object) = named else { continue };
                let Some(site) = self.program.object(*object).ident else {
                    continue;
                };
                for value in self.last_assigned(*object, site, position)?.unwrap_or_default() {
                    results.push(slot, value);
                }
            }
        }

        self.normalize(&mut results, &decl.signature);
        results.ensure_len(arity);
        Ok(results)
    }

    /// Return statements of a body in source order, excluding the ones of
    /// nested function literals.
    fn return_statements(&self, body: NodeId) -> Vec<NodeId> {
        let syntax = self.program.syntax();
        let mut returns = Vec::new();
        syntax.inspect(body, |node| match syntax.kind(node) {
            SyntaxKind::FuncLiteral => false,
            SyntaxKind::ReturnStatement => {
                returns.push(node);
                false
            }
            _ => true,
        });
        returns
    }

    fn return_values(&self, ret: NodeId) -> Vec<NodeId> {
        match self.program.children(ret).first() {
            Some(list) if self.program.kind(*list) == SyntaxKind::ExpressionList => {
                self.program.children(*list).to_vec()
            }
            Some(single) => vec![*single],
            None => Vec::new(),
        }
    }

    /// Resolve an expression list into consecutive slots; a call spreads
    /// over as many slots as it has results.
    fn expression_list(&mut self, results: &mut ResultSet, exprs: &[NodeId]) -> Result<()> {
        let mut slot = 0;
        for expr in exprs {
            let expr = self.program.syntax().unparen(*expr);
            if self.program.kind(expr) == SyntaxKind::CallExpression
                && !self.is_conversion_or_builtin(expr)
            {
                let (width, values) = self.call(expr)?;
                results.merge_at(slot, values);
                results.ensure_len(slot + width);
                slot += width;
            } else {
                let value = self.evaluator.evaluate(expr)?;
                self.accept(results, slot, value)?;
                slot += 1;
            }
        }
        Ok(())
    }

    /// Add a value to a slot. Identifiers and selectors of interface type
    /// are replaced by the values last assigned to them.
    fn accept(&mut self, results: &mut ResultSet, slot: usize, value: TypedValue) -> Result<()> {
        let program = self.program;
        if !program.is_interface(&value.ty) || program.is_error(&value.ty) {
            results.push(slot, value);
            return Ok(());
        }

        let ident = match program.kind(value.expr) {
            SyntaxKind::Identifier => Some(value.expr),
            SyntaxKind::SelectorExpression => program.child_by_field(value.expr, "field"),
            _ => None,
        };
        match ident.and_then(|i| program.use_of(i)) {
            Some(object) if program.object(object).is_var() => {
                let position = program.span(value.expr).start;
                for assigned in self.last_assigned(object, value.expr, position)?.unwrap_or_default() {
                    results.push(slot, assigned);
                }
            }
            _ => results.push(slot, value),
        }
        Ok(())
    }

    /// Results of a call: its static width and the values per slot.
    fn call(&mut self, call: NodeId) -> Result<(usize, ResultSet)> {
        let static_type = self.evaluator.evaluate(call)?.ty;
        let width = static_type.arity();
        let mut results = ResultSet::new();

        let callees = match self.program.child_by_field(call, "function") {
            Some(function) => self.callees(function)?,
            None => Vec::new(),
        };
        if callees.is_empty() {
            // Opaque callee: the values are only known at run time.
            for index in 0..width {
                if let Some(ty) = static_type.at(index) {
                    results.push(
                        index,
                        TypedValue {
                            ty: ty.clone(),
                            value: None,
                            expr: call,
                        },
                    );
                }
            }
            return Ok((width, results));
        }

        for callee in &callees {
            if let Some(values) = self.function(callee)? {
                results.merge_at(0, values);
            }
        }
        Ok((width.max(results.len()), results))
    }

    /// Functions a callee expression may denote.
    fn callees(&mut self, expr: NodeId) -> Result<Vec<FunctionDecl>> {
        let program = self.program;
        let expr = program.syntax().unparen(expr);
        match program.kind(expr) {
            SyntaxKind::FuncLiteral => Ok(program.function_literal(expr).into_iter().collect()),
            SyntaxKind::Identifier => self.callees_of_name(expr, expr),
            SyntaxKind::SelectorExpression => match program.child_by_field(expr, "field") {
                Some(field) => self.callees_of_name(field, expr),
                None => Ok(Vec::new()),
            },
            SyntaxKind::CallExpression => {
                // Curried call: whatever the inner call returns is called.
                let (_, values) = self.call(expr)?;
                let mut callees = Vec::new();
                for value in values.slot(0) {
                    if value.expr != expr {
                        callees.extend(self.callees(value.expr)?);
                    }
                }
                Ok(callees)
            }
            _ => Ok(Vec::new()),
        }
    }

    fn callees_of_name(&mut self, ident: NodeId, expr: NodeId) -> Result<Vec<FunctionDecl>> {
        let program = self.program;
        let Some(object) = program.use_of(ident) else {
            return Ok(Vec::new());
        };
        if program.object(object).is_func() {
            return Ok(program.function_declaration_of(object).into_iter().collect());
        }
        if !program.object(object).is_var() {
            return Ok(Vec::new());
        }

        // Function-valued variable: the functions last assigned to it.
        let position = program.span(ident).start;
        let mut callees = Vec::new();
        for value in self.last_assigned(object, expr, position)?.unwrap_or_default() {
            if value.expr != expr && value.expr != ident {
                callees.extend(self.callees(value.expr)?);
            }
        }
        Ok(callees)
    }

    fn is_conversion_or_builtin(&self, call: NodeId) -> bool {
        let program = self.program;
        let Some(function) = program.child_by_field(call, "function") else {
            return false;
        };
        let function = program.syntax().unparen(function);
        let name = match program.kind(function) {
            SyntaxKind::Identifier => Some(function),
            SyntaxKind::SelectorExpression => program.child_by_field(function, "field"),
            kind => return kind.is_type(),
        };
        name.and_then(|n| program.use_of(n))
            .map(|o| {
                matches!(
                    program.object(o).kind,
                    ObjectKind::TypeName | ObjectKind::Builtin(_)
                )
            })
            .unwrap_or(false)
    }

    /// Values of the last assignment to `object` before `position`.
    ///
    /// `site` is the expression referring to `object`. It locates the
    /// function to scan when the object itself is not declared inside one,
    /// and selects the receiver of field assignments. Returns `None` when no
    /// enclosing function exists.
    fn last_assigned(
        &mut self,
        object: ObjectId,
        site: NodeId,
        position: usize,
    ) -> Result<Option<Vec<TypedValue>>> {
        let syntax = self.program.syntax();
        let owner = self
            .program
            .object(object)
            .ident
            .and_then(|ident| syntax.enclosing_function(ident))
            .or_else(|| syntax.enclosing_function(site));
        let Some(body) = owner.and_then(|f| self.program.child_by_field(f, "body")) else {
            return Ok(None);
        };

        let key = InProgress::Assignment(object, position);
        if !self.enter(key) {
            return Ok(Some(Vec::new()));
        }
        let resolved = self.assigned_values(object, site, body, position);
        self.leave(key);
        resolved.map(Some)
    }

    fn assigned_values(
        &mut self,
        object: ObjectId,
        site: NodeId,
        body: NodeId,
        position: usize,
    ) -> Result<Vec<TypedValue>> {
        let Some(assignment) = self.find_last_assignment(object, site, body, position) else {
            trace!(object = %self.program.object(object).name, "no assignment before use");
            return Ok(Vec::new());
        };
        let mut values = ResultSet::new();
        self.expression_list(&mut values, &assignment.values)?;
        Ok(values.take_slot(assignment.index))
    }

    /// Scan a body breadth-first for the last assignment to `object`
    /// completed before `position`.
    ///
    /// Branches that return before reaching `position` are skipped: a case
    /// clause is entered only when it has no return or contains `position`,
    /// an if statement only when its consequence has no return or contains
    /// `position`. Else branches are always queued.
    fn find_last_assignment(
        &self,
        object: ObjectId,
        site: NodeId,
        body: NodeId,
        position: usize,
    ) -> Option<Assignment> {
        let program = self.program;
        let syntax = program.syntax();
        let mut queue = VecDeque::from([body]);
        let mut best: Option<Assignment> = None;

        while let Some(root) = queue.pop_front() {
            syntax.inspect(root, |node| {
                let span = syntax.span(node);
                if span.start >= position {
                    return false;
                }
                match syntax.kind(node) {
                    kind if kind.is_case_clause() => {
                        !self.contains_return(node) || span.contains_offset(position)
                    }
                    SyntaxKind::IfStatement => {
                        if let Some(alternative) = syntax.child_by_field(node, "alternative") {
                            queue.push_back(alternative);
                        }
                        match syntax.child_by_field(node, "consequence") {
                            Some(consequence) => {
                                !self.contains_return(consequence)
                                    || syntax.span(consequence).contains_offset(position)
                            }
                            None => true,
                        }
                    }
                    SyntaxKind::AssignmentStatement | SyntaxKind::ShortVarDeclaration
                        if span.end <= position =>
                    {
                        if let Some(found) = self.assignment_to(object, site, node) {
                            if best.as_ref().map_or(true, |b| found.position > b.position) {
                                best = Some(found);
                            }
                        }
                        true
                    }
                    SyntaxKind::VarSpec if span.end <= position => {
                        if let Some(found) = self.var_spec_of(object, node) {
                            if best.as_ref().map_or(true, |b| found.position > b.position) {
                                best = Some(found);
                            }
                        }
                        true
                    }
                    _ => true,
                }
            });
        }
        best
    }

    fn contains_return(&self, node: NodeId) -> bool {
        let syntax = self.program.syntax();
        syntax
            .subtree(node)
            .any(|n| syntax.kind(n) == SyntaxKind::ReturnStatement)
    }

    /// `a, b = x, y` or `a, b := x, y` assigning `object`.
    fn assignment_to(&self, object: ObjectId, site: NodeId, stmt: NodeId) -> Option<Assignment> {
        let program = self.program;
        // Compound assignments such as `+=` are not tracked.
        if !matches!(program.node(stmt).operator, Some("=") | Some(":=")) {
            return None;
        }
        let left = program.child_by_field(stmt, "left")?;
        let right = program.child_by_field(stmt, "right")?;

        let targets = expression_items(program, left);
        let index = targets
            .iter()
            .rposition(|target| self.denotes(*target, object, site))?;
        Some(Assignment {
            position: program.span(stmt).start,
            values: expression_items(program, right),
            index,
        })
    }

    /// `var a, b = x, y` declaring `object`.
    fn var_spec_of(&self, object: ObjectId, spec: NodeId) -> Option<Assignment> {
        let program = self.program;
        let index = program
            .syntax()
            .children_by_field(spec, "name")
            .position(|name| program.def_of(name) == Some(object))?;
        let value = program.child_by_field(spec, "value")?;
        Some(Assignment {
            position: program.span(spec).start,
            values: expression_items(program, value),
            index,
        })
    }

    /// Whether an assignment target is `object` as seen from `reference`.
    ///
    /// A field selector matches only when its operand names the same
    /// variable chain as the selector in `reference`.
    fn denotes(&self, target: NodeId, object: ObjectId, reference: NodeId) -> bool {
        let program = self.program;
        let target = program.syntax().unparen(target);
        match program.kind(target) {
            SyntaxKind::Identifier => program.object_of(target) == Some(object),
            SyntaxKind::SelectorExpression => {
                let reference = program.syntax().unparen(reference);
                program.kind(reference) == SyntaxKind::SelectorExpression
                    && self.selected(target) == Some(object)
                    && self.same_operand(target, reference)
            }
            _ => false,
        }
    }

    fn selected(&self, selector: NodeId) -> Option<ObjectId> {
        self.program
            .child_by_field(selector, "field")
            .and_then(|field| self.program.use_of(field))
    }

    /// Whether two selectors apply to the same identifier or selector chain.
    fn same_operand(&self, left: NodeId, right: NodeId) -> bool {
        let program = self.program;
        let syntax = program.syntax();
        let operands = (
            program.child_by_field(left, "operand").map(|n| syntax.unparen(n)),
            program.child_by_field(right, "operand").map(|n| syntax.unparen(n)),
        );
        let (Some(left), Some(right)) = operands else {
            return false;
        };
        match (program.kind(left), program.kind(right)) {
            (SyntaxKind::Identifier, SyntaxKind::Identifier) => {
                let object = program.object_of(left);
                object.is_some() && object == program.object_of(right)
            }
            (SyntaxKind::SelectorExpression, SyntaxKind::SelectorExpression) => {
                let field = self.selected(left);
                field.is_some() && field == self.selected(right) && self.same_operand(left, right)
            }
            _ => false,
        }
    }

    /// Replace value types by the declared result types.
    ///
    /// Interface slots keep the concrete types, with untyped constants given
    /// their default type; `error` slots are left untouched. Values whose
    /// type could not be inferred, such as results of calls into packages
    /// that were not loaded, take the declared type in every slot.
    fn normalize(&self, results: &mut ResultSet, signature: &Signature) {
        let program = self.program;
        for (slot, values) in results.slots.iter_mut().enumerate() {
            let Some(declared) = signature.results.get(slot) else {
                continue;
            };
            for value in values.iter_mut().filter(|v| v.ty.is_invalid()) {
                value.ty = declared.clone();
            }
            if program.is_error(declared) {
                continue;
            }
            if program.is_interface(declared) {
                for value in values.iter_mut() {
                    if value.ty.is_untyped() && value.ty.basic() != Some(BasicKind::UntypedNil) {
                        value.ty = value.ty.defaulted();
                    }
                }
                continue;
            }

            let basic = program.underlying(declared).basic();
            for value in values.iter_mut() {
                value.ty = declared.clone();
                if let (Some(kind), Some(constant)) = (basic, value.value.as_ref()) {
                    if let Some(converted) = constant.convert(kind) {
                        value.value = Some(converted);
                    }
                }
            }
        }
    }
}

/// Items of an expression list, or the node itself for a single expression.
fn expression_items(program: &Program, node: NodeId) -> Vec<NodeId> {
    if program.kind(node) == SyntaxKind::ExpressionList {
        program.children(node).to_vec()
    } else {
        vec![node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramBuilder;

    fn program(source: &str) -> Program {
        ProgramBuilder::new()
            .package("example.com/p", [("p.go", source)])
            .build()
            .unwrap()
    }

    fn results(p: &Program, name: &str) -> FunctionResults {
        p.results_of(p.func(name).unwrap()).unwrap().unwrap()
    }

    fn rendered(values: &[TypedValue]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_constant_is_normalized_to_declared_type() {
        let p = program("package p\n\nfunc f() int { return 2 }\n");
        let r = results(&p, "f");

        assert_eq!(r.arity, 1);
        assert_eq!(r.results.slot(0).len(), 1);
        assert_eq!(r.results.slot(0)[0].ty, Type::Basic(BasicKind::Int));
        assert_eq!(r.results.slot(0)[0].value, Some(ConstValue::Int(2)));
    }

    #[test]
    fn test_float_result_converts_constant() {
        let p = program("package p\n\nfunc f() float64 { return 2 }\n");
        let r = results(&p, "f");

        assert_eq!(r.results.slot(0)[0].value, Some(ConstValue::Float(2.0)));
    }

    #[test]
    fn test_interface_slot_peels_last_assignment() {
        let p = program(
            "package p\n\nfunc f() interface{} {\n\tvar a interface{}\n\ta = \"x\"\n\ta = 2\n\treturn a\n}\n",
        );
        let r = results(&p, "f");

        assert_eq!(rendered(r.results.slot(0)), vec!["int(2)"]);
    }

    #[test]
    fn test_bare_return_reads_named_results() {
        let p = program("package p\n\nfunc f() (s string, n int) {\n\ts = \"a\"\n\tn = 1\n\treturn\n}\n");
        let r = results(&p, "f");

        assert_eq!(rendered(r.results.slot(0)), vec!["string(\"a\")"]);
        assert_eq!(rendered(r.results.slot(1)), vec!["int(1)"]);
    }

    #[test]
    fn test_multi_value_call_is_spliced() {
        let p = program(
            "package p\n\nfunc pair() (int, string) { return 1, \"b\" }\n\nfunc f() (int, string) { return pair() }\n",
        );
        let r = results(&p, "f");

        assert_eq!(r.results.len(), 2);
        assert_eq!(rendered(r.results.slot(0)), vec!["int(1)"]);
        assert_eq!(rendered(r.results.slot(1)), vec!["string(\"b\")"]);
    }

    #[test]
    fn test_opaque_call_yields_static_types() {
        let p = program("package p\n\nimport \"strings\"\n\nfunc f() string { return strings.ToUpper(\"a\") }\n");
        let r = results(&p, "f");

        assert_eq!(rendered(r.results.slot(0)), vec!["string"]);
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let p = program(
            "package p\n\nfunc a(n int) int {\n\tif n > 0 {\n\t\treturn b(n - 1)\n\t}\n\treturn 0\n}\n\nfunc b(n int) int { return a(n) }\n",
        );
        let r = results(&p, "a");

        assert_eq!(rendered(r.results.slot(0)), vec!["int(0)"]);
    }

    #[test]
    fn test_function_variable_is_chased() {
        let p = program(
            "package p\n\nfunc one() int { return 1 }\n\nfunc f() int {\n\tg := one\n\treturn g()\n}\n",
        );
        let r = results(&p, "f");

        assert_eq!(rendered(r.results.slot(0)), vec!["int(1)"]);
    }

    #[test]
    fn test_closure_returns_are_not_collected() {
        let p = program(
            "package p\n\nfunc f() int {\n\t_ = func() int { return 9 }\n\treturn 3\n}\n",
        );
        let r = results(&p, "f");

        assert_eq!(rendered(r.results.slot(0)), vec!["int(3)"]);
    }

    #[test]
    fn test_no_results_and_no_body() {
        let p = program("package p\n\nfunc f() {}\n\nconst c = 1\n");

        let r = results(&p, "f");
        assert_eq!(r.arity, 0);
        assert!(r.results.is_empty());
        assert!(p.results_of(p.const_("c").unwrap()).unwrap().is_none());
    }

    #[test]
    fn test_unknown_call_results_take_declared_types() {
        let p = program(
            "package p\n\nimport (\n\t\"errors\"\n\t\"fmt\"\n)\n\nfunc f() (interface{}, error) {\n\treturn fmt.Sprint(1), errors.New(\"x\")\n}\n",
        );
        let r = results(&p, "f");

        assert_eq!(r.results.slot(0).len(), 1);
        assert!(!r.results.slot(0)[0].ty.is_invalid());
        let decl = p.function_declaration_of(p.func("f").unwrap()).unwrap();
        assert_eq!(r.results.slot(0)[0].ty, decl.signature.results[0]);
        assert_eq!(rendered(r.results.slot(1)), vec!["error"]);
    }

    #[test]
    fn test_shadowed_assignment_is_ignored() {
        let p = program(
            "package p\n\nfunc f() interface{} {\n\tvar a interface{}\n\ta = 1\n\tif true {\n\t\ta := \"inner\"\n\t\t_ = a\n\t}\n\treturn a\n}\n",
        );
        let r = results(&p, "f");

        assert_eq!(rendered(r.results.slot(0)), vec!["int(1)"]);
    }

    #[test]
    fn test_interface_field_is_peeled() {
        let p = program(
            "package p\n\ntype T struct{ v interface{} }\n\nfunc one() interface{} {\n\tt := T{}\n\tt.v = 5\n\treturn t.v\n}\n\nfunc two() interface{} {\n\tt1, t2 := T{}, T{}\n\tt1.v = 1\n\tt2.v = \"two\"\n\treturn t1.v\n}\n",
        );

        assert_eq!(rendered(results(&p, "one").results.slot(0)), vec!["int(5)"]);
        assert_eq!(rendered(results(&p, "two").results.slot(0)), vec!["int(1)"]);
    }

    #[test]
    fn test_self_assignment_reads_earlier_value() {
        let p = program(
            "package p\n\nfunc f() interface{} {\n\tvar a interface{}\n\ta = \"x\"\n\ta = a\n\treturn a\n}\n",
        );
        let r = results(&p, "f");

        assert_eq!(rendered(r.results.slot(0)), vec!["string(\"x\")"]);
    }

    #[test]
    fn test_depth_bound() {
        let p = program(
            "package p\n\nfunc a() int { return b() }\n\nfunc b() int { return c() }\n\nfunc c() int { return 7 }\n",
        );
        let shallow = ReturnValueResolver::new(&p)
            .with_max_depth(2)
            .results_of(p.func("a").unwrap())
            .unwrap()
            .unwrap();
        let deep = results(&p, "a");

        assert!(shallow.results.slot(0).is_empty());
        assert_eq!(rendered(deep.results.slot(0)), vec!["int(7)"]);
    }
}
