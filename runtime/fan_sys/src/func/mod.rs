//! First-class functions.
//!
//! A [`Func`] is a cheap-clone handle over one of:
//! - a method adapter, one per method, created by
//!   [`Registry::method_func`];
//! - a retyped view of another func, created by [`Func::retype`];
//! - a partial application, created by [`Func::bind`];
//! - a host closure, created by [`Func::native`].
//!
//! Params and the func type are computed lazily and memoized. Wrappers
//! never modify the func they wrap.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::errors::{self, ReflectResult};
use crate::idx::{SlotId, TypeId};
use crate::natives::StaticFn;
use crate::registry::{memoize, Registry, TypeData};
use crate::slots::Param;
use crate::value::{ListValue, Value};

/// A callable value.
#[derive(Clone)]
pub struct Func(Arc<FuncInner>);

struct FuncInner {
    kind: FuncKind,
    immutable: bool,
    params: OnceLock<Arc<[Param]>>,
    ty: OnceLock<TypeId>,
}

enum FuncKind {
    Method(SlotId),
    Retyped { of: Func, ty: TypeId },
    Bound { of: Func, bound: Arc<[Value]> },
    Native { ty: TypeId, f: StaticFn },
}

/// Parameter types and return type of a func type.
fn func_shape(reg: &Registry, t: TypeId) -> Option<(Arc<[TypeId]>, TypeId)> {
    match reg.type_entry(reg.non_nullable(t)).data() {
        TypeData::Func(params, ret) => Some((Arc::clone(params), *ret)),
        _ => None,
    }
}

/// `A`, `B`, `C`, ... by position.
fn synthesized_name(i: usize) -> String {
    ('A'..='Z')
        .nth(i)
        .map_or_else(|| format!("p{i}"), String::from)
}

fn synthesized_params(params: &[TypeId]) -> Arc<[Param]> {
    params
        .iter()
        .enumerate()
        .map(|(i, of)| Param::new(synthesized_name(i), *of, false))
        .collect()
}

impl Func {
    fn new(kind: FuncKind, immutable: bool) -> Self {
        Self(Arc::new(FuncInner {
            kind,
            immutable,
            params: OnceLock::new(),
            ty: OnceLock::new(),
        }))
    }

    /// Wrap a host closure as a func of type `func_type`. Params are named
    /// `A`, `B`, ... after the func type's parameters.
    pub fn native<F>(reg: &Registry, func_type: TypeId, f: F) -> ReflectResult<Func>
    where
        F: Fn(&Registry, &[Value]) -> ReflectResult<Value> + Send + Sync + 'static,
    {
        if func_shape(reg, func_type).is_none() {
            return Err(errors::not_a_func_type(&reg.signature(func_type)));
        }
        let ty = reg.non_nullable(func_type);
        Ok(Func::new(FuncKind::Native { ty, f: Arc::new(f) }, true))
    }

    /// The method this func ultimately calls, if any.
    pub fn method(&self) -> Option<SlotId> {
        match &self.0.kind {
            FuncKind::Method(m) => Some(*m),
            FuncKind::Retyped { of, .. } | FuncKind::Bound { of, .. } => of.method(),
            FuncKind::Native { .. } => None,
        }
    }

    pub fn returns(&self, reg: &Registry) -> TypeId {
        match &self.0.kind {
            FuncKind::Method(m) => reg.slot_entry(*m).returns().unwrap_or(TypeId::VOID),
            FuncKind::Bound { of, .. } => of.returns(reg),
            FuncKind::Retyped { ty, .. } | FuncKind::Native { ty, .. } => {
                func_shape(reg, *ty).map_or(TypeId::OBJ, |(_, ret)| ret)
            }
        }
    }

    /// Parameters. A method with a receiver gets a leading `this`.
    pub fn params(&self, reg: &Registry) -> Arc<[Param]> {
        memoize(&self.0.params, || match &self.0.kind {
            FuncKind::Method(m) => {
                let entry = reg.slot_entry(*m);
                let mut params = Vec::with_capacity(entry.params().len() + 1);
                if entry.flags.has_receiver() {
                    params.push(Param::new("this", entry.parent, false));
                }
                params.extend(entry.params().iter().cloned());
                Arc::from(params)
            }
            FuncKind::Bound { of, bound } => {
                let all = of.params(reg);
                match all.get(bound.len()..) {
                    Some(rest) => Arc::from(rest),
                    None => Arc::from(Vec::new()),
                }
            }
            FuncKind::Retyped { ty, .. } | FuncKind::Native { ty, .. } => {
                match func_shape(reg, *ty) {
                    Some((params, _)) => synthesized_params(&params),
                    None => Arc::from(Vec::new()),
                }
            }
        })
    }

    pub fn arity(&self, reg: &Registry) -> usize {
        self.params(reg).len()
    }

    /// The func type, `|A,B->R|`.
    pub fn func_type(&self, reg: &Registry) -> TypeId {
        memoize(&self.0.ty, || match &self.0.kind {
            FuncKind::Retyped { ty, .. } | FuncKind::Native { ty, .. } => *ty,
            FuncKind::Method(_) | FuncKind::Bound { .. } => {
                let params: Vec<TypeId> = self.params(reg).iter().map(Param::of).collect();
                reg.func_of(&params, self.returns(reg))
            }
        })
    }

    /// Call with positional arguments; for a method with a receiver, the
    /// receiver comes first.
    pub fn call(&self, reg: &Registry, args: &[Value]) -> ReflectResult<Value> {
        match &self.0.kind {
            FuncKind::Method(m) => reg.call(*m, args),
            FuncKind::Retyped { of, .. } => of.call(reg, args),
            FuncKind::Bound { of, bound } => {
                let mut full = Vec::with_capacity(bound.len() + args.len());
                full.extend_from_slice(bound);
                full.extend_from_slice(args);
                of.call(reg, &full)
            }
            FuncKind::Native { f, .. } => f(reg, args),
        }
    }

    pub fn call_list(&self, reg: &Registry, args: &ListValue) -> ReflectResult<Value> {
        self.call(reg, &args.to_vec())
    }

    /// Call with `target` prepended.
    pub fn call_on(&self, reg: &Registry, target: &Value, args: &[Value]) -> ReflectResult<Value> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(target.clone());
        full.extend_from_slice(args);
        self.call(reg, &full)
    }

    /// The same func reported as `func_type`. Params are renamed `A`, `B`,
    /// ... and calls go to this func unchanged.
    pub fn retype(&self, reg: &Registry, func_type: TypeId) -> ReflectResult<Func> {
        if func_shape(reg, func_type).is_none() {
            return Err(errors::not_a_func_type(&reg.signature(func_type)));
        }
        let kind = FuncKind::Retyped {
            of: self.clone(),
            ty: reg.non_nullable(func_type),
        };
        Ok(Func::new(kind, self.0.immutable))
    }

    /// Fix the leading arguments. The result is immutable iff every bound
    /// value is.
    pub fn bind(&self, reg: &Registry, args: &[Value]) -> ReflectResult<Func> {
        if args.is_empty() {
            return Ok(self.clone());
        }
        let arity = self.arity(reg);
        if args.len() > arity {
            return Err(errors::too_many_bound(arity, args.len()));
        }
        let immutable = args.iter().all(|v| reg.is_immutable(v));
        let kind = FuncKind::Bound {
            of: self.clone(),
            bound: Arc::from(args),
        };
        Ok(Func::new(kind, immutable))
    }

    pub fn is_immutable(&self) -> bool {
        self.0.immutable
    }

    pub fn ptr_eq(&self, other: &Func) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            FuncKind::Method(m) => write!(f, "Func({m:?})"),
            FuncKind::Retyped { of, ty } => write!(f, "Func({of:?} as {ty:?})"),
            FuncKind::Bound { of, bound } => write!(f, "Func({of:?} bound {})", bound.len()),
            FuncKind::Native { ty, .. } => write!(f, "Func(native {ty:?})"),
        }
    }
}

impl Registry {
    /// The func adapter for a method. Repeated calls return the same
    /// handle.
    pub fn method_func(&self, method: SlotId) -> ReflectResult<Func> {
        let entry = self.slot_entry(method);
        if !entry.is_method() {
            return Err(errors::not_a_method(&entry.qname));
        }
        Ok(memoize(&entry.func, || Func::new(FuncKind::Method(method), true)))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
