//! Expressions: types, constant folding, calls and selectors.

use std::collections::HashMap;

use super::Checker;
use crate::program::objects::{Builtin, ObjectKind};
use crate::program::types::{BasicKind, ConstValue, Type, TypeAndValue};
use crate::program::ObjectId;
use crate::syntax::{NodeId, SyntaxKind};

impl Checker<'_> {
    /// Check an expression and record its type and value.
    pub(super) fn check_expr(&mut self, node: NodeId) -> TypeAndValue {
        let tv = self.expr_type(node);
        if self.record {
            self.p.types.insert(node, tv.clone());
        }
        tv
    }

    fn expr_type(&mut self, node: NodeId) -> TypeAndValue {
        use SyntaxKind::*;
        let untyped = |kind| Type::Basic(kind);
        match self.kind(node) {
            IntLiteral => match parse_int(&self.text(node)) {
                Some(v) => TypeAndValue::constant(untyped(BasicKind::UntypedInt), ConstValue::Int(v)),
                None => TypeAndValue::new(untyped(BasicKind::UntypedInt)),
            },
            FloatLiteral => match parse_float(&self.text(node)) {
                Some(v) => {
                    TypeAndValue::constant(untyped(BasicKind::UntypedFloat), ConstValue::Float(v))
                }
                None => TypeAndValue::new(untyped(BasicKind::UntypedFloat)),
            },
            ImaginaryLiteral => TypeAndValue::new(Type::Basic(BasicKind::Complex128)),
            RuneLiteral => match unquote_rune(&self.text(node)) {
                Some(c) => TypeAndValue::constant(
                    untyped(BasicKind::UntypedRune),
                    ConstValue::Int(c as i128),
                ),
                None => TypeAndValue::new(untyped(BasicKind::UntypedRune)),
            },
            InterpretedStringLiteral => match unquote_interpreted(&self.text(node)) {
                Some(s) => TypeAndValue::constant(untyped(BasicKind::UntypedString), ConstValue::String(s)),
                None => TypeAndValue::new(untyped(BasicKind::UntypedString)),
            },
            RawStringLiteral => {
                let text = self.text(node);
                let raw = text.trim_start_matches('`').trim_end_matches('`').replace('\r', "");
                TypeAndValue::constant(untyped(BasicKind::UntypedString), ConstValue::String(raw))
            }
            True | False => TypeAndValue::constant(
                untyped(BasicKind::UntypedBool),
                ConstValue::Bool(self.kind(node) == True),
            ),
            Nil => TypeAndValue::new(untyped(BasicKind::UntypedNil)),
            Iota => match self.iota {
                Some(v) => TypeAndValue::constant(untyped(BasicKind::UntypedInt), ConstValue::Int(v)),
                None => TypeAndValue::invalid(),
            },
            Identifier => self.identifier(node),
            ParenthesizedExpression => match self.children(node).first() {
                Some(inner) => self.check_expr(*inner),
                None => TypeAndValue::invalid(),
            },
            UnaryExpression => self.unary(node),
            BinaryExpression => self.binary(node),
            CallExpression => self.call(node),
            SelectorExpression => self.selector(node),
            IndexExpression => self.index(node),
            SliceExpression => self.slice(node),
            TypeAssertionExpression => {
                if let Some(operand) = self.field(node, "operand") {
                    self.check_expr(operand);
                }
                match self.field(node, "type") {
                    Some(ty) => TypeAndValue::new(self.resolve_type(ty)),
                    None => TypeAndValue::invalid(),
                }
            }
            TypeConversionExpression => {
                let target = match self.field(node, "type") {
                    Some(ty) => self.resolve_type(ty),
                    None => Type::Invalid,
                };
                let operand = match self.field(node, "operand") {
                    Some(operand) => self.check_expr(operand),
                    None => TypeAndValue::invalid(),
                };
                self.conversion(&target, operand)
            }
            TypeInstantiationExpression => match self.children(node).first() {
                Some(inner) => {
                    let tv = self.check_expr(*inner);
                    TypeAndValue::new(tv.ty)
                }
                None => TypeAndValue::invalid(),
            },
            CompositeLiteral => self.composite_literal(node),
            FuncLiteral => self.func_literal(node),
            _ => TypeAndValue::invalid(),
        }
    }

    fn identifier(&mut self, node: NodeId) -> TypeAndValue {
        let name = self.text(node);
        if name == "_" {
            return TypeAndValue::invalid();
        }
        let Some(id) = self.lookup(&name) else {
            return TypeAndValue::invalid();
        };
        self.ensure(id);
        self.record_use(node, id);
        self.object_value(id)
    }

    fn object_value(&self, id: ObjectId) -> TypeAndValue {
        let object = &self.p.objects[id.index()];
        match &object.kind {
            ObjectKind::Const(value) => TypeAndValue {
                ty: object.ty.clone(),
                value: value.clone(),
            },
            ObjectKind::PkgName { .. } | ObjectKind::Builtin(_) => TypeAndValue::invalid(),
            _ => TypeAndValue::new(object.ty.clone()),
        }
    }

    /// Convert a value to `target`, keeping constant values representable in
    /// the target's basic type.
    pub(super) fn conversion(&mut self, target: &Type, tv: TypeAndValue) -> TypeAndValue {
        if target.is_invalid() {
            return TypeAndValue::invalid();
        }
        let value = match (tv.value, self.underlying_of(target)) {
            (Some(value), Type::Basic(kind)) => value.convert(kind),
            _ => None,
        };
        TypeAndValue {
            ty: target.clone(),
            value,
        }
    }

    fn unary(&mut self, node: NodeId) -> TypeAndValue {
        let Some(operand) = self.field(node, "operand") else {
            return TypeAndValue::invalid();
        };
        let x = self.check_expr(operand);
        match self.operator(node) {
            "&" => TypeAndValue::new(Type::Pointer(Box::new(x.ty))),
            "*" => match self.underlying_of(&x.ty) {
                Type::Pointer(elem) => TypeAndValue::new(*elem),
                _ => TypeAndValue::invalid(),
            },
            "<-" => match self.underlying_of(&x.ty) {
                Type::Chan(elem) => TypeAndValue::new(*elem),
                _ => TypeAndValue::invalid(),
            },
            "-" => TypeAndValue {
                value: x.value.and_then(|v| match v {
                    ConstValue::Int(i) => i.checked_neg().map(ConstValue::Int),
                    ConstValue::Float(f) => Some(ConstValue::Float(-f)),
                    _ => None,
                }),
                ty: x.ty,
            },
            "!" => TypeAndValue {
                value: x.value.and_then(|v| v.as_bool()).map(|b| ConstValue::Bool(!b)),
                ty: x.ty,
            },
            "^" => TypeAndValue {
                value: x.value.and_then(|v| match v {
                    ConstValue::Int(i) => Some(ConstValue::Int(!i)),
                    _ => None,
                }),
                ty: x.ty,
            },
            _ => x,
        }
    }

    fn binary(&mut self, node: NodeId) -> TypeAndValue {
        let (Some(left), Some(right)) = (self.field(node, "left"), self.field(node, "right")) else {
            return TypeAndValue::invalid();
        };
        let l = self.check_expr(left);
        let r = self.check_expr(right);
        let op = self.operator(node);

        let ty = match op {
            "==" | "!=" | "<" | "<=" | ">" | ">=" => Type::Basic(BasicKind::UntypedBool),
            "<<" | ">>" => l.ty.clone(),
            _ => binary_result_type(&l.ty, &r.ty),
        };
        let value = match (&l.value, &r.value) {
            (Some(a), Some(b)) => fold(op, a, b),
            _ => None,
        };
        TypeAndValue { ty, value }
    }

    fn call(&mut self, node: NodeId) -> TypeAndValue {
        let Some(function) = self.field(node, "function") else {
            return TypeAndValue::invalid();
        };
        let args = self
            .field(node, "arguments")
            .map(|list| self.children(list))
            .unwrap_or_default();
        let callee = self.p.syntax.unparen(function);

        if let Some(target) = self.as_type(callee) {
            if self.record {
                self.p.types.insert(function, TypeAndValue::new(target.clone()));
            }
            let operand = match args.first() {
                Some(arg) => self.check_expr(*arg),
                None => TypeAndValue::invalid(),
            };
            return self.conversion(&target, operand);
        }

        if self.kind(callee) == SyntaxKind::Identifier {
            if let Some(id) = self.lookup(&self.text(callee)) {
                if let ObjectKind::Builtin(builtin) = self.p.objects[id.index()].kind {
                    self.record_use(callee, id);
                    return self.builtin(builtin, &args);
                }
            }
        }

        let f = self.check_expr(function);
        for arg in &args {
            if !self.kind(*arg).is_type() {
                self.check_expr(*arg);
            }
        }
        match self.underlying_of(&f.ty) {
            Type::Signature(signature) => TypeAndValue::new(signature.call_type()),
            _ => TypeAndValue::invalid(),
        }
    }

    /// Type denoted by a call's function expression, for conversions.
    fn as_type(&mut self, node: NodeId) -> Option<Type> {
        match self.kind(node) {
            SyntaxKind::Identifier | SyntaxKind::TypeIdentifier => {
                let id = self.lookup(&self.text(node))?;
                if !self.p.objects[id.index()].is_type_name() {
                    return None;
                }
                self.record_use(node, id);
                Some(self.type_of_type_name(id))
            }
            SyntaxKind::SelectorExpression => {
                let operand = self.p.syntax.unparen(self.field(node, "operand")?);
                let field = self.field(node, "field")?;
                if self.kind(operand) != SyntaxKind::Identifier {
                    return None;
                }
                let package = self.lookup(&self.text(operand))?;
                let ObjectKind::PkgName { path } = &self.p.objects[package.index()].kind else {
                    return None;
                };
                let target = self.p.package_by_path(path)?;
                let id = target.scope_lookup(&self.text(field))?;
                if !self.p.objects[id.index()].is_type_name() {
                    return None;
                }
                self.record_use(operand, package);
                self.record_use(field, id);
                Some(self.type_of_type_name(id))
            }
            kind if kind.is_type() => Some(self.resolve_type(node)),
            _ => None,
        }
    }

    fn builtin(&mut self, builtin: Builtin, args: &[NodeId]) -> TypeAndValue {
        let int = Type::Basic(BasicKind::Int);
        match builtin {
            Builtin::Len | Builtin::Cap => {
                let x = args.first().map(|a| self.check_expr(*a));
                let length = match (builtin, x.and_then(|x| x.value)) {
                    (Builtin::Len, Some(ConstValue::String(s))) => Some(ConstValue::Int(s.len() as i128)),
                    _ => None,
                };
                TypeAndValue { ty: int, value: length }
            }
            Builtin::Append => {
                let mut result = TypeAndValue::invalid();
                for (i, arg) in args.iter().enumerate() {
                    let tv = self.check_expr(*arg);
                    if i == 0 {
                        result = TypeAndValue::new(tv.ty);
                    }
                }
                result
            }
            Builtin::Make | Builtin::New => {
                let ty = match args.first() {
                    Some(arg) => self.resolve_type(*arg),
                    None => Type::Invalid,
                };
                for arg in args.iter().skip(1) {
                    self.check_expr(*arg);
                }
                match builtin {
                    Builtin::New => TypeAndValue::new(Type::Pointer(Box::new(ty))),
                    _ => TypeAndValue::new(ty),
                }
            }
            Builtin::Min | Builtin::Max => {
                let values: Vec<TypeAndValue> = args.iter().map(|a| self.check_expr(*a)).collect();
                let ty = values
                    .iter()
                    .map(|v| v.ty.clone())
                    .reduce(|a, b| binary_result_type(&a, &b))
                    .unwrap_or(Type::Invalid);
                let op = if builtin == Builtin::Min { "<" } else { ">" };
                let value = values
                    .iter()
                    .map(|v| v.value.clone())
                    .reduce(|a, b| match (a, b) {
                        (Some(a), Some(b)) => match fold(op, &a, &b) {
                            Some(ConstValue::Bool(true)) => Some(a),
                            Some(ConstValue::Bool(false)) => Some(b),
                            _ => None,
                        },
                        _ => None,
                    })
                    .flatten();
                TypeAndValue { ty, value }
            }
            _ => {
                for arg in args {
                    if !self.kind(*arg).is_type() {
                        self.check_expr(*arg);
                    }
                }
                match builtin {
                    Builtin::Copy => TypeAndValue::new(int),
                    Builtin::Complex => TypeAndValue::new(Type::Basic(BasicKind::Complex128)),
                    Builtin::Real | Builtin::Imag => TypeAndValue::new(Type::Basic(BasicKind::Float64)),
                    Builtin::Recover => TypeAndValue::new(Type::Interface(Vec::new())),
                    _ => TypeAndValue::new(Type::Tuple(Vec::new())),
                }
            }
        }
    }

    fn selector(&mut self, node: NodeId) -> TypeAndValue {
        let (Some(operand), Some(field)) = (self.field(node, "operand"), self.field(node, "field")) else {
            return TypeAndValue::invalid();
        };
        let name = self.text(field);
        let base = self.p.syntax.unparen(operand);

        if self.kind(base) == SyntaxKind::Identifier {
            if let Some(id) = self.lookup(&self.text(base)) {
                if let ObjectKind::PkgName { path } = self.p.objects[id.index()].kind.clone() {
                    self.record_use(base, id);
                    return self.qualified_value(&path, field, &name);
                }
            }
        }

        let x = self.check_expr(operand);
        match self.find_member(&x.ty, &name, 0) {
            Some((object, ty)) => {
                if let Some(object) = object {
                    self.record_use(field, object);
                }
                TypeAndValue::new(ty)
            }
            None => TypeAndValue::invalid(),
        }
    }

    /// `pkg.Name` in expression position.
    fn qualified_value(&mut self, path: &str, field: NodeId, name: &str) -> TypeAndValue {
        let Some(id) = self.p.package_by_path(path).and_then(|p| p.scope_lookup(name)) else {
            return TypeAndValue::invalid();
        };
        self.ensure(id);
        self.record_use(field, id);
        self.object_value(id)
    }

    /// Field or method `name` of a value of type `ty`, with its object when
    /// it has one (interface methods do not).
    pub(super) fn find_member(
        &mut self,
        ty: &Type,
        name: &str,
        depth: usize,
    ) -> Option<(Option<ObjectId>, Type)> {
        if depth > 4 {
            return None;
        }
        let base = match ty {
            Type::Pointer(elem) => elem.as_ref().clone(),
            other => other.clone(),
        };

        if let Type::Named(named) = &base {
            let methods = self.p.named[named.id.index()].methods.clone();
            if let Some(method) = methods.into_iter().find(|m| self.p.objects[m.index()].name == name) {
                self.ensure(method);
                return Some((Some(method), self.p.objects[method.index()].ty.clone()));
            }
        }

        match self.underlying_of(&base) {
            Type::Struct(fields) => {
                if let Some(field) = fields.iter().find(|f| f.name == name) {
                    return Some((field.object, field.ty.clone()));
                }
                fields
                    .iter()
                    .filter(|f| f.embedded)
                    .find_map(|f| self.find_member(&f.ty, name, depth + 1))
            }
            Type::Interface(methods) => methods
                .iter()
                .find(|m| m.name == name)
                .map(|m| (None, Type::Signature(Box::new(m.signature.clone())))),
            _ => None,
        }
    }

    fn index(&mut self, node: NodeId) -> TypeAndValue {
        let Some(operand) = self.field(node, "operand") else {
            return TypeAndValue::invalid();
        };
        let x = self.check_expr(operand);
        for index in self.fields(node, "index") {
            if !self.kind(index).is_type() {
                self.check_expr(index);
            }
        }

        let container = match self.underlying_of(&x.ty) {
            Type::Pointer(elem) => self.underlying_of(&elem),
            other => other,
        };
        match container {
            Type::Slice(elem) | Type::Array(_, elem) => TypeAndValue::new(*elem),
            Type::Map(_, value) => TypeAndValue::new(*value),
            Type::Basic(kind) if kind.is_string() => TypeAndValue::new(Type::Basic(BasicKind::Uint8)),
            // Generic function instantiation.
            Type::Signature(_) => TypeAndValue::new(x.ty),
            _ => TypeAndValue::invalid(),
        }
    }

    fn slice(&mut self, node: NodeId) -> TypeAndValue {
        let Some(operand) = self.field(node, "operand") else {
            return TypeAndValue::invalid();
        };
        let x = self.check_expr(operand);
        for field in ["start", "end", "capacity"] {
            if let Some(bound) = self.field(node, field) {
                self.check_expr(bound);
            }
        }

        match self.underlying_of(&x.ty) {
            Type::Basic(kind) if kind.is_string() => TypeAndValue::new(x.ty.defaulted()),
            Type::Array(_, elem) => TypeAndValue::new(Type::Slice(elem)),
            Type::Pointer(elem) => match self.underlying_of(&elem) {
                Type::Array(_, elem) => TypeAndValue::new(Type::Slice(elem)),
                _ => TypeAndValue::invalid(),
            },
            Type::Slice(_) => TypeAndValue::new(x.ty),
            _ => TypeAndValue::invalid(),
        }
    }

    fn composite_literal(&mut self, node: NodeId) -> TypeAndValue {
        let ty = match self.field(node, "type") {
            Some(ty) => self.resolve_type(ty),
            None => Type::Invalid,
        };
        let Some(body) = self.field(node, "body") else {
            return TypeAndValue::new(ty);
        };
        let count = self.literal_value(body, &ty);
        match ty {
            Type::Array(None, elem) => TypeAndValue::new(Type::Array(Some(count), elem)),
            other => TypeAndValue::new(other),
        }
    }

    /// Check the elements of a `{...}` literal of type `ty`; returns the
    /// number of elements.
    fn literal_value(&mut self, body: NodeId, ty: &Type) -> u64 {
        let underlying = self.underlying_of(ty);
        let (key_type, element_type) = match &underlying {
            Type::Slice(elem) | Type::Array(_, elem) => (Type::Basic(BasicKind::Int), elem.as_ref().clone()),
            Type::Map(key, value) => (key.as_ref().clone(), value.as_ref().clone()),
            _ => (Type::Invalid, Type::Invalid),
        };
        let fields: HashMap<String, (Option<ObjectId>, Type)> = match &underlying {
            Type::Struct(fields) => fields
                .iter()
                .map(|f| (f.name.clone(), (f.object, f.ty.clone())))
                .collect(),
            _ => HashMap::new(),
        };
        let is_struct = matches!(underlying, Type::Struct(_));

        let mut count = 0;
        for element in self.children(body) {
            count += 1;
            if self.kind(element) != SyntaxKind::KeyedElement {
                self.literal_element(element, &element_type);
                continue;
            }

            let parts = self.children(element);
            let (Some(key), Some(value)) = (parts.first().copied(), parts.last().copied()) else {
                continue;
            };
            if is_struct && matches!(self.kind(key), SyntaxKind::Identifier | SyntaxKind::FieldIdentifier) {
                // Struct keys name fields; they are not resolved in scope.
                let field = fields.get(&self.text(key)).cloned();
                let field_type = match field {
                    Some((object, ty)) => {
                        if let Some(object) = object {
                            self.record_use(key, object);
                        }
                        ty
                    }
                    None => Type::Invalid,
                };
                self.literal_element(value, &field_type);
            } else {
                self.literal_element(key, &key_type);
                self.literal_element(value, &element_type);
            }
        }
        count
    }

    fn literal_element(&mut self, element: NodeId, ty: &Type) {
        if self.kind(element) == SyntaxKind::LiteralValue {
            let elem = match ty {
                Type::Pointer(elem) => elem.as_ref().clone(),
                other => other.clone(),
            };
            self.literal_value(element, &elem);
        } else {
            self.check_expr(element);
        }
    }

    fn func_literal(&mut self, node: NodeId) -> TypeAndValue {
        let signature = self.signature_of(self.field(node, "parameters"), self.field(node, "result"));
        self.check_function(node);
        TypeAndValue::new(Type::Signature(Box::new(signature)))
    }
}

/// Type of an arithmetic operation: the typed operand wins, otherwise the
/// wider untyped kind.
pub(super) fn binary_result_type(left: &Type, right: &Type) -> Type {
    match (left, right) {
        (Type::Invalid, other) | (other, Type::Invalid) => other.clone(),
        (Type::Basic(a), Type::Basic(b)) if a.is_untyped() && b.is_untyped() => {
            Type::Basic(Type::wider_untyped(*a, *b))
        }
        (l, r) if l.is_untyped() => r.clone(),
        (l, _) => l.clone(),
    }
}

/// Fold a binary operation on two constants.
pub(super) fn fold(op: &str, a: &ConstValue, b: &ConstValue) -> Option<ConstValue> {
    use ConstValue::*;
    match (a, b) {
        (String(x), String(y)) => match op {
            "+" => Some(String(format!("{}{}", x, y))),
            _ => compare(op, x, y),
        },
        (Bool(x), Bool(y)) => match op {
            "&&" => Some(Bool(*x && *y)),
            "||" => Some(Bool(*x || *y)),
            "==" => Some(Bool(x == y)),
            "!=" => Some(Bool(x != y)),
            _ => None,
        },
        (Int(x), Int(y)) => {
            let (x, y) = (*x, *y);
            match op {
                "+" => x.checked_add(y).map(Int),
                "-" => x.checked_sub(y).map(Int),
                "*" => x.checked_mul(y).map(Int),
                "/" => x.checked_div(y).map(Int),
                "%" => x.checked_rem(y).map(Int),
                "&" => Some(Int(x & y)),
                "|" => Some(Int(x | y)),
                "^" => Some(Int(x ^ y)),
                "&^" => Some(Int(x & !y)),
                "<<" => u32::try_from(y).ok().and_then(|s| x.checked_shl(s)).map(Int),
                ">>" => u32::try_from(y).ok().and_then(|s| x.checked_shr(s)).map(Int),
                _ => compare(op, &x, &y),
            }
        }
        _ => {
            let (x, y) = (a.as_float()?, b.as_float()?);
            match op {
                "+" => Some(Float(x + y)),
                "-" => Some(Float(x - y)),
                "*" => Some(Float(x * y)),
                "/" if y != 0.0 => Some(Float(x / y)),
                _ => compare(op, &x, &y),
            }
        }
    }
}

fn compare<T: PartialOrd + ?Sized>(op: &str, x: &T, y: &T) -> Option<ConstValue> {
    let result = match op {
        "==" => x == y,
        "!=" => x != y,
        "<" => x < y,
        "<=" => x <= y,
        ">" => x > y,
        ">=" => x >= y,
        _ => return None,
    };
    Some(ConstValue::Bool(result))
}

// ============================================================================
// Literals
// ============================================================================

fn parse_int(text: &str) -> Option<i128> {
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i128::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i128::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i128::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        i128::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let digits = text.replace('_', "");
    if digits.starts_with("0x") || digits.starts_with("0X") {
        return None;
    }
    digits.parse().ok()
}

fn unquote_interpreted(text: &str) -> Option<String> {
    let body = text.strip_prefix('"')?.strip_suffix('"')?;
    unescape(body).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn unquote_rune(text: &str) -> Option<char> {
    let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
    if body.starts_with('\\') {
        let bytes = unescape(body)?;
        let decoded = String::from_utf8(bytes.clone())
            .ok()
            .and_then(|s| s.chars().next());
        // A single-byte escape such as '\xff' denotes the code point itself.
        return decoded.or_else(|| bytes.first().map(|b| char::from(*b)));
    }
    body.chars().next()
}

/// Decode Go escape sequences into raw bytes.
fn unescape(body: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let escaped = chars.next()?;
        let simple = match escaped {
            'a' => Some(0x07),
            'b' => Some(0x08),
            'f' => Some(0x0c),
            'n' => Some(b'\n'),
            'r' => Some(b'\r'),
            't' => Some(b'\t'),
            'v' => Some(0x0b),
            '\\' => Some(b'\\'),
            '\'' => Some(b'\''),
            '"' => Some(b'"'),
            _ => None,
        };
        if let Some(byte) = simple {
            out.push(byte);
            continue;
        }

        let (radix, len) = match escaped {
            'x' => (16, 2),
            'u' => (16, 4),
            'U' => (16, 8),
            '0'..='7' => (8, 2),
            _ => return None,
        };
        let mut digits = String::new();
        if radix == 8 {
            digits.push(escaped);
        }
        for _ in 0..len {
            digits.push(chars.next()?);
        }
        let value = u32::from_str_radix(&digits, radix).ok()?;
        if matches!(escaped, 'u' | 'U') {
            let c = char::from_u32(value)?;
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        } else {
            out.push(u8::try_from(value).ok()?);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Program, ProgramBuilder};

    fn build(source: &str) -> Program {
        ProgramBuilder::new()
            .package("example.com/p", [("p.go", source)])
            .build()
            .unwrap()
    }

    fn const_value(p: &Program, name: &str) -> Option<ConstValue> {
        match &p.object(p.const_(name).unwrap()).kind {
            ObjectKind::Const(value) => value.clone(),
            _ => None,
        }
    }

    #[test]
    fn test_literal_parsing() {
        assert_eq!(parse_int("0x_1F"), Some(31));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("017"), Some(15));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(unquote_interpreted(r#""a\tb\x41é""#).as_deref(), Some("a\tbAé"));
        assert_eq!(unquote_rune(r"'\n'"), Some('\n'));
        assert_eq!(unquote_rune("'x'"), Some('x'));
    }

    #[test]
    fn test_constant_folding() {
        let p = build(
            "package p\n\nconst (\n\tS = \"\" + \"1\"\n\tN = 7 / 2\n\tF = 7 / 2.0\n\tB = N > 3 || S == \"1\"\n\tK = 1 << 4\n\tL = len(S + \"ab\")\n)\n",
        );

        assert_eq!(const_value(&p, "S"), Some(ConstValue::String("1".into())));
        assert_eq!(const_value(&p, "N"), Some(ConstValue::Int(3)));
        assert_eq!(const_value(&p, "F"), Some(ConstValue::Float(3.5)));
        assert_eq!(const_value(&p, "B"), Some(ConstValue::Bool(true)));
        assert_eq!(const_value(&p, "K"), Some(ConstValue::Int(16)));
        assert_eq!(const_value(&p, "L"), Some(ConstValue::Int(3)));
        assert_eq!(p.object(p.const_("F").unwrap()).ty.to_string(), "untyped float");
    }

    #[test]
    fn test_conversions_keep_constant_values() {
        let p = build("package p\n\ntype Name string\n\nconst n = Name(\"x\")\n\nconst r = string(rune(65))\n\nvar f = float64(2)\n");

        assert_eq!(p.object(p.const_("n").unwrap()).ty.to_string(), "example.com/p.Name");
        assert_eq!(const_value(&p, "r"), Some(ConstValue::String("A".into())));
        assert_eq!(p.object(p.var("f").unwrap()).ty.to_string(), "float64");
    }

    #[test]
    fn test_calls_selectors_and_literals() {
        let p = build(
            r#"package p

type point struct{ x, y int }

func (p point) sum() int { return p.x + p.y }

func pair() (string, error) { return "", nil }

var a = point{x: 1, y: 2}.sum()
var b, c = pair()
var d = []string{"a"}[0]
var e = map[string]*point{}["k"]
var g = func() bool { return true }
"#,
        );

        let ty = |name: &str| p.object(p.var(name).unwrap()).ty.to_string();
        assert_eq!(ty("a"), "int");
        assert_eq!(ty("b"), "string");
        assert_eq!(ty("c"), "error");
        assert_eq!(ty("d"), "string");
        assert_eq!(ty("e"), "*example.com/p.point");
        assert_eq!(ty("g"), "func() bool");
    }

    #[test]
    fn test_struct_keys_are_not_scoped_names() {
        let p = build("package p\n\ntype T struct{ x int }\n\nfunc f() T {\n\tx := \"shadow\"\n\t_ = x\n\treturn T{x: 1}\n}\n");

        let key = p
            .syntax()
            .subtree(p.files()[0].root)
            .filter(|n| p.kind(*n) == SyntaxKind::KeyedElement)
            .map(|n| p.children(n)[0])
            .next()
            .unwrap();
        let object = p.use_of(key).unwrap();
        assert_eq!(p.object(object).kind, ObjectKind::Field);
    }
}
