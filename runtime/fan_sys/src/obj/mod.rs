//! Root object protocol and dynamic dispatch.
//!
//! Primitives, lists, types and funcs use built-in semantics. An instance
//! consults its type for `equals`, `hash`, `compare` and `toStr`: a method
//! declared below `sys::Obj` overrides the built-in behavior and is
//! invoked through the normal calling convention.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::errors::{self, ReflectResult};
use crate::idx::{SlotId, TypeId};
use crate::registry::Registry;
use crate::slots::SlotKind;
use crate::value::{ListValue, ObjValue, Value};

/// Floats order with `NaN` below every number and equal to itself.
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn float_to_str(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() && n.is_sign_negative() {
        "-INF".to_string()
    } else if n.is_infinite() {
        "INF".to_string()
    } else {
        format!("{n:?}")
    }
}

impl Registry {
    /// The method `name` on `t` when declared below `sys::Obj`.
    fn override_of(&self, t: TypeId, name: &str) -> ReflectResult<Option<SlotId>> {
        Ok(self
            .method(t, name, false)?
            .filter(|m| self.slot_entry(*m).parent != TypeId::OBJ))
    }

    pub fn equals(&self, a: &Value, b: &Value) -> ReflectResult<bool> {
        match (a, b) {
            (Value::Obj(x), _) => {
                if let Some(m) = self.override_of(x.ty(), "equals")? {
                    let r = self.call_on(m, a, std::slice::from_ref(b))?;
                    return Ok(r.as_bool().unwrap_or(false));
                }
                Ok(matches!(b, Value::Obj(y) if x.ptr_eq(y)))
            }
            (Value::List(x), Value::List(y)) => self.lists_equal(x, y),
            _ => Ok(a == b),
        }
    }

    fn lists_equal(&self, x: &ListValue, y: &ListValue) -> ReflectResult<bool> {
        if x.ptr_eq(y) {
            return Ok(true);
        }
        if x.of() != y.of() {
            return Ok(false);
        }
        let (xs, ys) = (x.to_vec(), y.to_vec());
        if xs.len() != ys.len() {
            return Ok(false);
        }
        for (a, b) in xs.iter().zip(&ys) {
            if !self.equals(a, b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Hash consistent with [`equals`](Self::equals) for built-in values.
    pub fn hash(&self, v: &Value) -> ReflectResult<i64> {
        if let Value::Obj(o) = v {
            if let Some(m) = self.override_of(o.ty(), "hash")? {
                let r = self.call_on(m, v, &[])?;
                return Ok(r.as_int().unwrap_or(0));
            }
        }
        let mut h = FxHasher::default();
        self.hash_into(v, &mut h)?;
        #[expect(
            clippy::cast_possible_wrap,
            reason = "hash bits are reinterpreted, not converted"
        )]
        let hash = h.finish() as i64;
        Ok(hash)
    }

    fn hash_into(&self, v: &Value, h: &mut FxHasher) -> ReflectResult<()> {
        v.kind_rank().hash(h);
        match v {
            Value::Null => {}
            Value::Bool(b) => b.hash(h),
            Value::Int(n) => n.hash(h),
            Value::Float(n) => {
                let bits = if n.is_nan() {
                    f64::NAN.to_bits()
                } else if *n == 0.0 {
                    0.0f64.to_bits()
                } else {
                    n.to_bits()
                };
                bits.hash(h);
            }
            Value::Str(s) => s.hash(h),
            Value::Type(t) => t.hash(h),
            Value::List(l) => {
                for item in l.to_vec() {
                    self.hash_into(&item, h)?;
                }
            }
            Value::Obj(o) => match self.override_of(o.ty(), "hash")? {
                Some(m) => self.call_on(m, v, &[])?.as_int().unwrap_or(0).hash(h),
                None => o.addr().hash(h),
            },
            Value::Func(f) => f.addr().hash(h),
        }
        Ok(())
    }

    /// Total order: `null` first, then by value kind, then naturally
    /// within a kind.
    pub fn compare(&self, a: &Value, b: &Value) -> ReflectResult<Ordering> {
        let ord = match (a, b) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Float(x), Value::Float(y)) => compare_floats(*x, *y),
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            (Value::Type(x), Value::Type(y)) => self.signature(*x).cmp(&self.signature(*y)),
            (Value::List(x), Value::List(y)) => self.compare_lists(x, y)?,
            (Value::Func(x), Value::Func(y)) => x.addr().cmp(&y.addr()),
            (Value::Obj(x), _) => return self.compare_obj(x, a, b),
            _ => a.kind_rank().cmp(&b.kind_rank()),
        };
        Ok(ord)
    }

    fn compare_lists(&self, x: &ListValue, y: &ListValue) -> ReflectResult<Ordering> {
        let (xs, ys) = (x.to_vec(), y.to_vec());
        for (a, b) in xs.iter().zip(&ys) {
            let ord = self.compare(a, b)?;
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(xs.len().cmp(&ys.len()))
    }

    fn compare_obj(&self, x: &ObjValue, a: &Value, b: &Value) -> ReflectResult<Ordering> {
        if let Some(m) = self.override_of(x.ty(), "compare")? {
            let r = self.call_on(m, a, std::slice::from_ref(b))?;
            return Ok(r.as_int().unwrap_or(0).cmp(&0));
        }
        match b {
            Value::Obj(_) => Ok(self.to_str(a)?.cmp(&self.to_str(b)?)),
            _ => Ok(a.kind_rank().cmp(&b.kind_rank())),
        }
    }

    /// Display form; instances default to `qname@address`.
    pub fn to_str(&self, v: &Value) -> ReflectResult<String> {
        let s = match v {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => float_to_str(*n),
            Value::Str(s) => s.to_string(),
            Value::Type(t) => self.signature(*t).to_string(),
            Value::List(l) => {
                let items = l
                    .to_vec()
                    .iter()
                    .map(|item| self.to_str(item))
                    .collect::<ReflectResult<Vec<_>>>()?;
                format!("[{}]", items.join(", "))
            }
            Value::Func(f) => self.signature(f.func_type(self)).to_string(),
            Value::Obj(o) => {
                if let Some(m) = self.override_of(o.ty(), "toStr")? {
                    return match self.call_on(m, v, &[])? {
                        Value::Str(s) => Ok(s.to_string()),
                        other => self.to_str(&other),
                    };
                }
                format!("{}@{:x}", self.qname(o.ty()), o.addr())
            }
        };
        Ok(s)
    }

    pub fn is_immutable(&self, v: &Value) -> bool {
        match v {
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_)
            | Value::Type(_) => true,
            Value::List(l) => l.is_immutable(),
            Value::Obj(o) => self.type_flags(o.ty()).is_const(),
            Value::Func(f) => f.is_immutable(),
        }
    }

    /// An immutable equivalent of `v`. Lists are deep-copied into a
    /// read-only list; instances of non-const types and mutable funcs
    /// cannot be made immutable.
    pub fn to_immutable(&self, v: &Value) -> ReflectResult<Value> {
        match v {
            Value::List(l) if !l.is_immutable() => {
                let items = l
                    .to_vec()
                    .iter()
                    .map(|item| self.to_immutable(item))
                    .collect::<ReflectResult<Vec<_>>>()?;
                Ok(Value::List(ListValue::frozen(l.of(), items)))
            }
            _ if self.is_immutable(v) => Ok(v.clone()),
            _ => Err(errors::not_immutable(&self.signature(self.type_of(v)))),
        }
    }

    /// Dynamic dispatch by slot name: a method is invoked with `args`; a
    /// field is read with no args and written with one, returning the
    /// value written.
    pub fn trap(&self, target: &Value, name: &str, args: &[Value]) -> ReflectResult<Value> {
        let t = self.type_of(target);
        let Some(slot) = self.slot(t, name, false)? else {
            return Err(errors::unknown_slot(&format!("{}.{name}", self.signature(t))));
        };
        match &self.slot_entry(slot).kind {
            SlotKind::Method { .. } => self.invoke(slot, Some(target), args),
            SlotKind::Field { .. } => match args {
                [] => self.field_get(slot, Some(target)),
                [value] => {
                    self.field_set(slot, Some(target), value.clone(), true)?;
                    Ok(value.clone())
                }
                _ => Err(errors::trap_arity(name, args.len())),
            },
        }
    }

    /// Whether `v` is an instance of `t`; `null` is an instance of every
    /// nullable type.
    pub fn is_type(&self, v: &Value, t: TypeId) -> bool {
        if v.is_null() {
            self.is_nullable(t)
        } else {
            self.fits(self.type_of(v), t)
        }
    }

    /// `v` if it is a non-null instance of `t`.
    pub fn as_type(&self, v: &Value, t: TypeId) -> Option<Value> {
        (!v.is_null() && self.fits(self.type_of(v), t)).then(|| v.clone())
    }

    /// Checked cast of `v` to `t`.
    pub fn coerce(&self, v: &Value, t: TypeId) -> ReflectResult<Value> {
        if v.is_null() {
            return if self.is_nullable(t) {
                Ok(Value::Null)
            } else {
                Err(errors::null_cast(&self.signature(t)))
            };
        }
        let found = self.type_of(v);
        if self.fits(found, t) {
            Ok(v.clone())
        } else {
            Err(errors::cast(&self.signature(t), &self.signature(found)))
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
