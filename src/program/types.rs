//! Static types and constant values.

use std::fmt;
use std::sync::Arc;

use super::objects::ObjectId;

/// Index into the program's table of named types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedId(pub(crate) u32);

impl NamedId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Predeclared basic types, typed and untyped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    pub fn name(self) -> &'static str {
        use BasicKind::*;
        match self {
            Bool => "bool",
            Int => "int",
            Int8 => "int8",
            Int16 => "int16",
            Int32 => "int32",
            Int64 => "int64",
            Uint => "uint",
            Uint8 => "uint8",
            Uint16 => "uint16",
            Uint32 => "uint32",
            Uint64 => "uint64",
            Uintptr => "uintptr",
            Float32 => "float32",
            Float64 => "float64",
            Complex64 => "complex64",
            Complex128 => "complex128",
            String => "string",
            UnsafePointer => "unsafe.Pointer",
            UntypedBool => "untyped bool",
            UntypedInt => "untyped int",
            UntypedRune => "untyped rune",
            UntypedFloat => "untyped float",
            UntypedString => "untyped string",
            UntypedNil => "untyped nil",
        }
    }

    pub fn is_untyped(self) -> bool {
        use BasicKind::*;
        matches!(
            self,
            UntypedBool | UntypedInt | UntypedRune | UntypedFloat | UntypedString | UntypedNil
        )
    }

    pub fn is_integer(self) -> bool {
        use BasicKind::*;
        matches!(
            self,
            Int | Int8 | Int16 | Int32 | Int64 | Uint | Uint8 | Uint16 | Uint32 | Uint64 | Uintptr
                | UntypedInt
                | UntypedRune
        )
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            BasicKind::Float32 | BasicKind::Float64 | BasicKind::UntypedFloat
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, BasicKind::String | BasicKind::UntypedString)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, BasicKind::Bool | BasicKind::UntypedBool)
    }

    /// Type an untyped constant takes when no other type is imposed.
    pub fn default_kind(self) -> BasicKind {
        use BasicKind::*;
        match self {
            UntypedBool => Bool,
            UntypedInt => Int,
            UntypedRune => Int32,
            UntypedFloat => Float64,
            UntypedString => String,
            other => other,
        }
    }

    /// Rank used to pick the result kind of mixed untyped operands.
    fn untyped_rank(self) -> u8 {
        match self {
            BasicKind::UntypedInt => 1,
            BasicKind::UntypedRune => 2,
            BasicKind::UntypedFloat => 3,
            _ => 0,
        }
    }
}

/// Reference to a named type; compares by identity.
#[derive(Debug, Clone)]
pub struct NamedRef {
    pub id: NamedId,
    /// Package-qualified name, e.g. `example.com/app.String` or `error`.
    pub qualified: Arc<str>,
}

impl PartialEq for NamedRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NamedRef {}

/// A struct field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
    pub embedded: bool,
    pub object: Option<ObjectId>,
}

/// A method of an interface type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMethod {
    pub name: String,
    pub signature: Signature,
}

/// Function signature; receivers are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
    pub variadic: bool,
}

impl Signature {
    /// Type of a call to a function with this signature.
    pub fn call_type(&self) -> Type {
        match self.results.len() {
            1 => self.results[0].clone(),
            _ => Type::Tuple(self.results.clone()),
        }
    }
}

/// A Go static type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Invalid,
    Basic(BasicKind),
    Named(NamedRef),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array(Option<u64>, Box<Type>),
    Map(Box<Type>, Box<Type>),
    Chan(Box<Type>),
    Struct(Vec<StructField>),
    Interface(Vec<InterfaceMethod>),
    Signature(Box<Signature>),
    Tuple(Vec<Type>),
}

impl Type {
    pub fn basic(&self) -> Option<BasicKind> {
        match self {
            Type::Basic(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid)
    }

    pub fn is_untyped(&self) -> bool {
        self.basic().map(BasicKind::is_untyped).unwrap_or(false)
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Type::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    /// Default type for untyped constants, the type itself otherwise.
    pub fn defaulted(&self) -> Type {
        match self {
            Type::Basic(kind) => Type::Basic(kind.default_kind()),
            other => other.clone(),
        }
    }

    /// Number of values an expression of this type produces.
    pub fn arity(&self) -> usize {
        match self {
            Type::Tuple(items) => items.len(),
            _ => 1,
        }
    }

    /// The n-th value of a tuple, or the type itself for single values.
    pub fn at(&self, index: usize) -> Option<&Type> {
        match self {
            Type::Tuple(items) => items.get(index),
            other if index == 0 => Some(other),
            _ => None,
        }
    }

    /// Result kind of a binary operation on two untyped operands.
    pub(crate) fn wider_untyped(a: BasicKind, b: BasicKind) -> BasicKind {
        if a.untyped_rank() >= b.untyped_rank() {
            a
        } else {
            b
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.variadic && i + 1 == self.params.len() {
                match ty {
                    Type::Slice(elem) => write!(f, "...{}", elem)?,
                    other => write!(f, "...{}", other)?,
                }
            } else {
                write!(f, "{}", ty)?;
            }
        }
        write!(f, ")")?;
        match self.results.len() {
            0 => Ok(()),
            1 => write!(f, " {}", self.results[0]),
            _ => {
                write!(f, " (")?;
                write_list(f, &self.results)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Invalid => write!(f, "invalid type"),
            Type::Basic(kind) => write!(f, "{}", kind.name()),
            Type::Named(named) => write!(f, "{}", named.qualified),
            Type::Pointer(elem) => write!(f, "*{}", elem),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Array(Some(len), elem) => write!(f, "[{}]{}", len, elem),
            Type::Array(None, elem) => write!(f, "[?]{}", elem),
            Type::Map(key, value) => write!(f, "map[{}]{}", key, value),
            Type::Chan(elem) => write!(f, "chan {}", elem),
            Type::Struct(fields) => {
                write!(f, "struct{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    if field.embedded {
                        write!(f, "{}", field.ty)?;
                    } else {
                        write!(f, "{} {}", field.name, field.ty)?;
                    }
                }
                write!(f, "}}")
            }
            Type::Interface(methods) => {
                write!(f, "interface{{")?;
                for (i, method) in methods.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}{}", method.name, method.signature)?;
                }
                write!(f, "}}")
            }
            Type::Signature(sig) => write!(f, "func{}", sig),
            Type::Tuple(items) => {
                write!(f, "(")?;
                write_list(f, items)?;
                write!(f, ")")
            }
        }
    }
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i128),
    Float(f64),
    String(String),
}

impl ConstValue {
    pub fn as_int(&self) -> Option<i128> {
        match self {
            ConstValue::Int(v) => Some(*v),
            ConstValue::Float(v) if v.fract() == 0.0 => Some(*v as i128),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstValue::Int(v) => Some(*v as f64),
            ConstValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Represent the value as a constant of the given basic kind.
    ///
    /// Returns `None` when the value cannot be represented, e.g. a string
    /// converted to an integer type.
    pub fn convert(&self, kind: BasicKind) -> Option<ConstValue> {
        if kind.is_string() {
            return match self {
                ConstValue::String(s) => Some(ConstValue::String(s.clone())),
                // string(rune) conversion
                ConstValue::Int(v) => u32::try_from(*v)
                    .ok()
                    .and_then(char::from_u32)
                    .map(|c| ConstValue::String(c.to_string())),
                _ => None,
            };
        }
        if kind.is_integer() {
            return self.as_int().map(ConstValue::Int);
        }
        if kind.is_float() {
            return self.as_float().map(ConstValue::Float);
        }
        if kind.is_boolean() {
            return self.as_bool().map(ConstValue::Bool);
        }
        None
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Int(v) => write!(f, "{}", v),
            ConstValue::Float(v) => write!(f, "{}", v),
            ConstValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Static type of an expression plus its value when constant.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAndValue {
    pub ty: Type,
    pub value: Option<ConstValue>,
}

impl TypeAndValue {
    pub fn new(ty: Type) -> Self {
        Self { ty, value: None }
    }

    pub fn constant(ty: Type, value: ConstValue) -> Self {
        Self {
            ty,
            value: Some(value),
        }
    }

    pub fn invalid() -> Self {
        Self::new(Type::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_go_format() {
        let sig = Signature {
            params: vec![Type::Basic(BasicKind::String), Type::Slice(Box::new(Type::Basic(BasicKind::Int)))],
            results: vec![Type::Basic(BasicKind::Int), Type::Interface(vec![])],
            variadic: true,
        };

        assert_eq!(Type::Basic(BasicKind::UntypedInt).to_string(), "untyped int");
        assert_eq!(Type::Interface(vec![]).to_string(), "interface{}");
        assert_eq!(
            Type::Signature(Box::new(sig)).to_string(),
            "func(string, ...int) (int, interface{})"
        );
        assert_eq!(
            Type::Map(Box::new(Type::Basic(BasicKind::String)), Box::new(Type::Basic(BasicKind::Bool)))
                .to_string(),
            "map[string]bool"
        );
    }

    #[test]
    fn test_const_display_and_conversion() {
        assert_eq!(ConstValue::String("1".into()).to_string(), "\"1\"");
        assert_eq!(ConstValue::Int(2).to_string(), "2");
        assert_eq!(ConstValue::Float(2.0).convert(BasicKind::Int), Some(ConstValue::Int(2)));
        assert_eq!(
            ConstValue::Int(97).convert(BasicKind::String),
            Some(ConstValue::String("a".into()))
        );
        assert_eq!(ConstValue::String("x".into()).convert(BasicKind::Int), None);
    }

    #[test]
    fn test_untyped_defaults() {
        assert_eq!(
            Type::Basic(BasicKind::UntypedString).defaulted(),
            Type::Basic(BasicKind::String)
        );
        assert_eq!(
            Type::Basic(BasicKind::UntypedNil).defaulted(),
            Type::Basic(BasicKind::UntypedNil)
        );
        assert_eq!(
            Type::wider_untyped(BasicKind::UntypedInt, BasicKind::UntypedFloat),
            BasicKind::UntypedFloat
        );
    }
}
