//! Declared entities: constants, types, variables, functions and friends.

use phf::phf_map;
use serde::Serialize;

use super::types::{BasicKind, ConstValue, NamedId, Type};
use super::PackageId;
use crate::syntax::NodeId;

/// Handle to an [`Object`] of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Predeclared functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Append,
    Cap,
    Clear,
    Close,
    Complex,
    Copy,
    Delete,
    Imag,
    Len,
    Make,
    Max,
    Min,
    New,
    Panic,
    Print,
    Println,
    Real,
    Recover,
}

/// What an object is.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// A constant; `None` when its value could not be computed.
    Const(Option<ConstValue>),
    TypeName,
    Var,
    /// A struct field.
    Field,
    /// A function or method.
    Func,
    /// An imported package name.
    PkgName { path: String },
    Builtin(Builtin),
    Nil,
}

/// A declared entity.
#[derive(Debug, Clone)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    pub ty: Type,
    /// Declaring package; `None` for predeclared objects.
    pub package: Option<PackageId>,
    /// Identifier node declaring the object.
    pub ident: Option<NodeId>,
    /// Declaration node: function/method declaration for functions, the
    /// spec for constants, variables and type names.
    pub decl: Option<NodeId>,
    /// Named type introduced by a type name, or receiver base type of a method.
    pub named: Option<NamedId>,
}

impl Object {
    pub fn is_func(&self) -> bool {
        self.kind == ObjectKind::Func
    }

    pub fn is_var(&self) -> bool {
        matches!(self.kind, ObjectKind::Var | ObjectKind::Field)
    }

    pub fn is_type_name(&self) -> bool {
        self.kind == ObjectKind::TypeName
    }

    /// Whether this is a method (a function with a receiver).
    pub fn is_method(&self) -> bool {
        self.is_func() && self.named.is_some()
    }
}

/// Symbol categories accepted by [`Program::lookup`](super::Program::lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Const,
    Type,
    Var,
    Func,
}

impl SymbolKind {
    pub fn matches(self, object: &Object) -> bool {
        match self {
            SymbolKind::Const => matches!(object.kind, ObjectKind::Const(_)),
            SymbolKind::Type => object.kind == ObjectKind::TypeName,
            SymbolKind::Var => object.kind == ObjectKind::Var,
            SymbolKind::Func => object.kind == ObjectKind::Func,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Const => "const",
            SymbolKind::Type => "type",
            SymbolKind::Var => "var",
            SymbolKind::Func => "func",
        }
    }
}

/// Predeclared basic type names.
pub(crate) static BASIC_TYPES: phf::Map<&'static str, BasicKind> = phf_map! {
    "bool" => BasicKind::Bool,
    "int" => BasicKind::Int,
    "int8" => BasicKind::Int8,
    "int16" => BasicKind::Int16,
    "int32" => BasicKind::Int32,
    "int64" => BasicKind::Int64,
    "uint" => BasicKind::Uint,
    "uint8" => BasicKind::Uint8,
    "uint16" => BasicKind::Uint16,
    "uint32" => BasicKind::Uint32,
    "uint64" => BasicKind::Uint64,
    "uintptr" => BasicKind::Uintptr,
    "float32" => BasicKind::Float32,
    "float64" => BasicKind::Float64,
    "complex64" => BasicKind::Complex64,
    "complex128" => BasicKind::Complex128,
    "string" => BasicKind::String,
    "byte" => BasicKind::Uint8,
    "rune" => BasicKind::Int32,
};

/// Predeclared function names.
pub(crate) static BUILTINS: phf::Map<&'static str, Builtin> = phf_map! {
    "append" => Builtin::Append,
    "cap" => Builtin::Cap,
    "clear" => Builtin::Clear,
    "close" => Builtin::Close,
    "complex" => Builtin::Complex,
    "copy" => Builtin::Copy,
    "delete" => Builtin::Delete,
    "imag" => Builtin::Imag,
    "len" => Builtin::Len,
    "make" => Builtin::Make,
    "max" => Builtin::Max,
    "min" => Builtin::Min,
    "new" => Builtin::New,
    "panic" => Builtin::Panic,
    "print" => Builtin::Print,
    "println" => Builtin::Println,
    "real" => Builtin::Real,
    "recover" => Builtin::Recover,
};
