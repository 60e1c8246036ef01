//! Runtime values dispatched on by reflection.
//!
//! Primitives are stored inline. Lists and object instances are shared,
//! `Arc`-backed handles: cloning a `Value` never copies their contents,
//! and equality of instances is identity.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::{self, ReflectResult};
use crate::func::Func;
use crate::idx::TypeId;

/// A Fantom value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(ListValue),
    /// Instance of a declared class.
    Obj(ObjValue),
    /// Type literal.
    Type(TypeId),
    Func(Func),
}

impl Value {
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_obj(&self) -> Option<&ObjValue> {
        match self {
            Value::Obj(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Value::Type(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&Func> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }

    /// Rank used to order values of different kinds in `compare`.
    pub(crate) fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
            Value::Type(_) => 5,
            Value::List(_) => 6,
            Value::Func(_) => 7,
            Value::Obj(_) => 8,
        }
    }
}

/// Structural equality for primitives and lists, identity for instances
/// and funcs. `NaN` equals `NaN`. Lists must share their element type.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.ptr_eq(b) || (a.of() == b.of() && a.to_vec() == b.to_vec())
            }
            (Value::Obj(a), Value::Obj(b)) => a.ptr_eq(b),
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}f"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(l) => f.debug_list().entries(l.to_vec()).finish(),
            Value::Obj(o) => write!(f, "<{:?}@{:x}>", o.ty(), o.addr()),
            Value::Type(t) => write!(f, "{t:?}#"),
            Value::Func(func) => write!(f, "{func:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<TypeId> for Value {
    fn from(t: TypeId) -> Self {
        Value::Type(t)
    }
}

impl From<Func> for Value {
    fn from(f: Func) -> Self {
        Value::Func(f)
    }
}

impl From<ListValue> for Value {
    fn from(l: ListValue) -> Self {
        Value::List(l)
    }
}

impl From<ObjValue> for Value {
    fn from(o: ObjValue) -> Self {
        Value::Obj(o)
    }
}

// List

struct ListInner {
    of: TypeId,
    items: RwLock<Vec<Value>>,
    immutable: bool,
}

/// A shared list handle with a fixed element type.
#[derive(Clone)]
pub struct ListValue(Arc<ListInner>);

impl ListValue {
    /// A mutable list of `of` elements.
    pub fn new(of: TypeId, items: Vec<Value>) -> Self {
        Self(Arc::new(ListInner {
            of,
            items: RwLock::new(items),
            immutable: false,
        }))
    }

    /// A read-only list. Callers guarantee every item is immutable.
    pub(crate) fn frozen(of: TypeId, items: Vec<Value>) -> Self {
        Self(Arc::new(ListInner {
            of,
            items: RwLock::new(items),
            immutable: true,
        }))
    }

    /// Element type.
    pub fn of(&self) -> TypeId {
        self.0.of
    }

    pub fn len(&self) -> usize {
        self.0.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.read().get(index).cloned()
    }

    /// Snapshot of the current items.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.items.read().clone()
    }

    pub fn is_immutable(&self) -> bool {
        self.0.immutable
    }

    pub fn push(&self, value: Value) -> ReflectResult<()> {
        if self.0.immutable {
            return Err(errors::read_only_list());
        }
        self.0.items.write().push(value);
        Ok(())
    }

    pub fn ptr_eq(&self, other: &ListValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

// Object instance

struct ObjInner {
    ty: TypeId,
    fields: RwLock<FxHashMap<Arc<str>, Value>>,
}

/// An instance of a declared class: its runtime type plus field storage
/// keyed by the fields' exposed names.
#[derive(Clone)]
pub struct ObjValue(Arc<ObjInner>);

impl ObjValue {
    pub(crate) fn new(ty: TypeId) -> Self {
        Self(Arc::new(ObjInner {
            ty,
            fields: RwLock::new(FxHashMap::default()),
        }))
    }

    /// Runtime type.
    pub fn ty(&self) -> TypeId {
        self.0.ty
    }

    /// Stored value of a field; fields never set read as `null`.
    pub(crate) fn get(&self, exposed: &str) -> Value {
        self.0
            .fields
            .read()
            .get(exposed)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub(crate) fn set(&self, exposed: &Arc<str>, value: Value) {
        self.0.fields.write().insert(Arc::clone(exposed), value);
    }

    pub fn ptr_eq(&self, other: &ObjValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity address, used for the default hash.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for ObjValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:?}@{:x}>", self.ty(), self.addr())
    }
}

#[cfg(test)]
mod tests;
