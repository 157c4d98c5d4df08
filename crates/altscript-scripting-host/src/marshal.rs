//! Call arguments handed to the interpreter.
//!
//! The interpreter's calling convention distinguishes scalars passed by
//! address from objects passed by handle. Every marshaled argument is one or
//! the other, and must agree with the parameter it fills.

use altscript_events::{Entity, EntityKind, Vector3};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A stack-allocable scalar, passed to the interpreter by address
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
}

impl Primitive {
    fn param_type(&self) -> ParamType {
        match self {
            Primitive::Bool(_) => ParamType::Bool,
            Primitive::Int8(_) => ParamType::Int8,
            Primitive::UInt8(_) => ParamType::UInt8,
            Primitive::Int16(_) => ParamType::Int16,
            Primitive::UInt16(_) => ParamType::UInt16,
            Primitive::Int32(_) => ParamType::Int32,
            Primitive::UInt32(_) => ParamType::UInt32,
            Primitive::Int64(_) => ParamType::Int64,
            Primitive::UInt64(_) => ParamType::UInt64,
            Primitive::Float(_) => ParamType::Float,
            Primitive::Double(_) => ParamType::Double,
        }
    }
}

/// Opaque object created by the interpreter (e.g. a script array)
#[derive(Clone)]
pub struct ScriptObject(Rc<dyn Any>);

impl ScriptObject {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptObject({:p})", Rc::as_ptr(&self.0))
    }
}

/// An object passed to the interpreter by handle
#[derive(Debug, Clone)]
pub enum ObjectRef {
    Null,
    String(String),
    Entity(Entity),
    Vector3(Vector3),
    Script(ScriptObject),
}

impl ObjectRef {
    pub fn entity_or_null(entity: Option<Entity>) -> Self {
        entity.map(ObjectRef::Entity).unwrap_or(ObjectRef::Null)
    }

    fn fits(&self, ty: &ParamType) -> bool {
        match (self, ty) {
            (ObjectRef::Null, ty) => !ty.is_primitive(),
            (ObjectRef::String(_), ParamType::String) => true,
            (ObjectRef::Vector3(_), ParamType::Vector3) => true,
            (ObjectRef::Entity(entity), ParamType::Entity(kind)) => {
                *kind == EntityKind::Object || entity.kind == *kind
            }
            (ObjectRef::Script(_), ParamType::Array(_)) => true,
            _ => false,
        }
    }
}

/// One call-ready argument slot
#[derive(Debug, Clone)]
pub enum Arg {
    Primitive(Primitive),
    Object(ObjectRef),
}

impl Arg {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Arg::Primitive(_))
    }

    /// Whether this argument can fill a parameter of type `ty`
    pub fn fits(&self, ty: &ParamType) -> bool {
        match self {
            Arg::Primitive(value) => value.param_type() == *ty,
            Arg::Object(object) => object.fits(ty),
        }
    }
}

impl From<Primitive> for Arg {
    fn from(value: Primitive) -> Self {
        Arg::Primitive(value)
    }
}

impl From<ObjectRef> for Arg {
    fn from(value: ObjectRef) -> Self {
        Arg::Object(value)
    }
}

/// Element type of the script arrays the host can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    String,
    Int,
    UInt,
    Any,
}

impl ArrayKind {
    pub const ALL: [ArrayKind; 4] = [
        ArrayKind::String,
        ArrayKind::Int,
        ArrayKind::UInt,
        ArrayKind::Any,
    ];

    pub fn declaration(&self) -> &'static str {
        match self {
            ArrayKind::String => "array<string>",
            ArrayKind::Int => "array<int>",
            ArrayKind::UInt => "array<uint>",
            ArrayKind::Any => "array<any>",
        }
    }
}

/// Type of a callback parameter as the script sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    Vector3,
    Entity(EntityKind),
    Array(ArrayKind),
}

impl ParamType {
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            ParamType::String | ParamType::Vector3 | ParamType::Entity(_) | ParamType::Array(_)
        )
    }

    pub fn declaration(&self) -> String {
        match self {
            ParamType::Bool => "bool".to_string(),
            ParamType::Int8 => "int8".to_string(),
            ParamType::UInt8 => "uint8".to_string(),
            ParamType::Int16 => "int16".to_string(),
            ParamType::UInt16 => "uint16".to_string(),
            ParamType::Int32 => "int".to_string(),
            ParamType::UInt32 => "uint".to_string(),
            ParamType::Int64 => "int64".to_string(),
            ParamType::UInt64 => "uint64".to_string(),
            ParamType::Float => "float".to_string(),
            ParamType::Double => "double".to_string(),
            ParamType::String => "string".to_string(),
            ParamType::Vector3 => "Vector3".to_string(),
            ParamType::Entity(kind) => format!("{}@", kind.script_type()),
            ParamType::Array(kind) => format!("{}@", kind.declaration()),
        }
    }
}

/// A named callback parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDecl {
    pub ty: ParamType,
    pub name: &'static str,
}

impl ParamDecl {
    pub const fn new(ty: ParamType, name: &'static str) -> Self {
        Self { ty, name }
    }
}

impl fmt::Display for ParamDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty.declaration(), self.name)
    }
}

/// Render a parameter list the way it appears inside a declaration
pub fn param_list(params: &[ParamDecl]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Return type a callback may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Bool,
}

impl ReturnType {
    pub fn declaration(&self) -> &'static str {
        match self {
            ReturnType::Bool => "bool",
        }
    }
}
