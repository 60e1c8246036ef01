//! The `sys` pod.
//!
//! Core types are declared first and in a fixed order so their ids match
//! the `TypeId` constants. Generic parameters are interned next, then the
//! core slots. Natives are bound in the static namespace and take the
//! receiver as their first argument; primitives reach them through the
//! static fallback of the calling convention.

use std::collections::BTreeMap;
use std::sync::Arc;

use fan_ir::{SlotFlags, TypeFlags, Version};

use crate::errors::{self, ReflectResult};
use crate::facets::Facets;
use crate::func::Func;
use crate::idx::{PodId, TypeId};
use crate::registry::Registry;
use crate::slots::ParamDecl;
use crate::value::{ListValue, Value};

const VALUE: TypeFlags = TypeFlags::PUBLIC
    .union(TypeFlags::CONST)
    .union(TypeFlags::FINAL);
const ABSTRACT: TypeFlags = TypeFlags::PUBLIC
    .union(TypeFlags::ABSTRACT)
    .union(TypeFlags::CONST);
const FINAL: TypeFlags = TypeFlags::PUBLIC.union(TypeFlags::FINAL);

/// `(name, base, mixins, flags)` in `TypeId` order.
const CORE_TYPES: [(&str, Option<TypeId>, &[TypeId], TypeFlags); TypeId::CORE_COUNT] = [
    ("Obj", None, &[], TypeFlags::PUBLIC),
    ("Type", Some(TypeId::OBJ), &[], VALUE),
    ("Func", Some(TypeId::OBJ), &[], ABSTRACT),
    ("Bool", Some(TypeId::OBJ), &[], VALUE),
    ("Num", Some(TypeId::OBJ), &[], ABSTRACT),
    ("Int", Some(TypeId::NUM), &[], VALUE),
    ("Float", Some(TypeId::NUM), &[], VALUE),
    ("Str", Some(TypeId::OBJ), &[], VALUE),
    ("List", Some(TypeId::OBJ), &[], FINAL),
    ("Map", Some(TypeId::OBJ), &[], FINAL),
    ("Void", Some(TypeId::OBJ), &[], FINAL),
    ("Facet", Some(TypeId::OBJ), &[], ABSTRACT.union(TypeFlags::MIXIN)),
    ("FacetMeta", Some(TypeId::OBJ), &[TypeId::FACET], VALUE.union(TypeFlags::FACET)),
];

const NATIVE: SlotFlags = SlotFlags::PUBLIC.union(SlotFlags::NATIVE);
const VIRTUAL: SlotFlags = NATIVE.union(SlotFlags::VIRTUAL);

/// A param is `(name, type, has default)`.
type MethodDef = (
    TypeId,
    &'static str,
    &'static str,
    &'static [(&'static str, &'static str, bool)],
    SlotFlags,
);

/// `(owner, name, returns, params, flags)`.
const CORE_METHODS: &[MethodDef] = &[
    (TypeId::OBJ, "equals", "sys::Bool", &[("that", "sys::Obj?", false)], VIRTUAL),
    (TypeId::OBJ, "compare", "sys::Int", &[("that", "sys::Obj", false)], VIRTUAL),
    (TypeId::OBJ, "hash", "sys::Int", &[], VIRTUAL),
    (TypeId::OBJ, "toStr", "sys::Str", &[], VIRTUAL),
    (TypeId::OBJ, "isImmutable", "sys::Bool", &[], VIRTUAL),
    (TypeId::OBJ, "toImmutable", "sys::Obj", &[], VIRTUAL),
    (
        TypeId::OBJ,
        "trap",
        "sys::Obj?",
        &[("name", "sys::Str", false), ("args", "sys::Obj?[]?", true)],
        VIRTUAL,
    ),
    (TypeId::TYPE, "qname", "sys::Str", &[], NATIVE),
    (TypeId::TYPE, "name", "sys::Str", &[], NATIVE),
    (TypeId::TYPE, "signature", "sys::Str", &[], NATIVE),
    (TypeId::TYPE, "isNullable", "sys::Bool", &[], NATIVE),
    (TypeId::TYPE, "base", "sys::Type?", &[], NATIVE),
    (TypeId::STR, "size", "sys::Int", &[], NATIVE),
    (TypeId::INT, "plus", "sys::Int", &[("b", "sys::Int", false)], NATIVE),
    (TypeId::LIST, "size", "sys::Int", &[], NATIVE),
    (TypeId::LIST, "get", "sys::V", &[("index", "sys::Int", false)], NATIVE),
    (TypeId::LIST, "add", "sys::L", &[("item", "sys::V", false)], NATIVE),
    (
        TypeId::LIST,
        "each",
        "sys::Void",
        &[("f", "|sys::V,sys::Int->sys::Void|", false)],
        NATIVE,
    ),
    (TypeId::LIST, "isEmpty", "sys::Bool", &[], NATIVE),
    (TypeId::FUNC, "callList", "sys::R", &[("args", "sys::Obj?[]?", true)], NATIVE),
    (TypeId::FUNC, "arity", "sys::Int", &[], NATIVE),
];

pub(crate) fn declare_sys(reg: &Registry) -> ReflectResult<()> {
    let version = Version::from_segments(vec![1, 0]).unwrap_or_else(Version::zero);
    let sys = reg.add_pod_with("sys", version, BTreeMap::new())?;
    debug_assert_eq!(sys, PodId::SYS);
    for (i, (name, base, mixins, flags)) in CORE_TYPES.iter().enumerate() {
        let id = reg.declare_class(sys, name, *base, mixins.to_vec(), Facets::empty(), *flags)?;
        debug_assert_eq!(id.index(), i);
    }
    reg.intern_generic_params();

    for (owner, name, returns, params, flags) in CORE_METHODS {
        let params: Vec<ParamDecl<'_>> = params
            .iter()
            .map(|(name, of, has_default)| {
                if *has_default {
                    ParamDecl::with_default(name, of)
                } else {
                    ParamDecl::new(name, of)
                }
            })
            .collect();
        reg.declare_method(*owner, name, returns, &params, *flags, &[])?;
    }
    reg.declare_field(
        TypeId::FACET_META,
        "inherited",
        "sys::Bool",
        SlotFlags::PUBLIC.union(SlotFlags::CONST),
        &[],
    )?;

    tracing::debug!(types = TypeId::CORE_COUNT, methods = CORE_METHODS.len(), "booted sys");
    Ok(())
}

/// Positional access to native arguments with typed extraction.
struct Args<'a> {
    reg: &'a Registry,
    qname: &'static str,
    args: &'a [Value],
}

impl<'a> Args<'a> {
    fn get(&self, i: usize) -> ReflectResult<&'a Value> {
        self.args
            .get(i)
            .ok_or_else(|| errors::too_few_arguments(self.qname, i + 1, self.args.len()))
    }

    fn mismatch(&self, expected: &str, found: &Value) -> crate::ReflectError {
        errors::cast(expected, &self.reg.signature(self.reg.type_of(found)))
    }

    fn int(&self, i: usize) -> ReflectResult<i64> {
        let v = self.get(i)?;
        v.as_int().ok_or_else(|| self.mismatch("sys::Int", v))
    }

    fn str(&self, i: usize) -> ReflectResult<&'a str> {
        let v = self.get(i)?;
        v.as_str().ok_or_else(|| self.mismatch("sys::Str", v))
    }

    fn ty(&self, i: usize) -> ReflectResult<TypeId> {
        let v = self.get(i)?;
        v.as_type().ok_or_else(|| self.mismatch("sys::Type", v))
    }

    fn list(&self, i: usize) -> ReflectResult<&'a ListValue> {
        let v = self.get(i)?;
        v.as_list().ok_or_else(|| self.mismatch("sys::List", v))
    }

    fn func(&self, i: usize) -> ReflectResult<&'a Func> {
        let v = self.get(i)?;
        v.as_func().ok_or_else(|| self.mismatch("sys::Func", v))
    }

    /// A nullable list argument; absent or `null` reads as empty.
    fn opt_items(&self, i: usize) -> ReflectResult<Vec<Value>> {
        match self.args.get(i) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(_) => Ok(self.list(i)?.to_vec()),
        }
    }
}

fn size_value(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn bind<F>(reg: &Registry, t: TypeId, qname: &'static str, f: F)
where
    F: Fn(&Args<'_>) -> ReflectResult<Value> + Send + Sync + 'static,
{
    let name = qname.rsplit('.').next().unwrap_or(qname);
    reg.bind_static_on(
        t,
        name,
        Arc::new(move |reg: &Registry, args: &[Value]| f(&Args { reg, qname, args })),
    );
}

pub(crate) fn bind_sys(reg: &Registry) {
    bind(reg, TypeId::OBJ, "sys::Obj.equals", |a| {
        Ok(Value::Bool(a.reg.equals(a.get(0)?, a.get(1)?)?))
    });
    bind(reg, TypeId::OBJ, "sys::Obj.compare", |a| {
        let ord = a.reg.compare(a.get(0)?, a.get(1)?)?;
        Ok(Value::Int(ord as i64))
    });
    bind(reg, TypeId::OBJ, "sys::Obj.hash", |a| Ok(Value::Int(a.reg.hash(a.get(0)?)?)));
    bind(reg, TypeId::OBJ, "sys::Obj.toStr", |a| Ok(Value::from(a.reg.to_str(a.get(0)?)?)));
    bind(reg, TypeId::OBJ, "sys::Obj.isImmutable", |a| {
        Ok(Value::Bool(a.reg.is_immutable(a.get(0)?)))
    });
    bind(reg, TypeId::OBJ, "sys::Obj.toImmutable", |a| a.reg.to_immutable(a.get(0)?));
    bind(reg, TypeId::OBJ, "sys::Obj.trap", |a| {
        a.reg.trap(a.get(0)?, a.str(1)?, &a.opt_items(2)?)
    });

    bind(reg, TypeId::TYPE, "sys::Type.qname", |a| Ok(Value::Str(a.reg.qname(a.ty(0)?))));
    bind(reg, TypeId::TYPE, "sys::Type.name", |a| Ok(Value::Str(a.reg.name(a.ty(0)?))));
    bind(reg, TypeId::TYPE, "sys::Type.signature", |a| {
        Ok(Value::Str(a.reg.signature(a.ty(0)?)))
    });
    bind(reg, TypeId::TYPE, "sys::Type.isNullable", |a| {
        Ok(Value::Bool(a.reg.is_nullable(a.ty(0)?)))
    });
    bind(reg, TypeId::TYPE, "sys::Type.base", |a| {
        Ok(a.reg.base(a.ty(0)?).map_or(Value::Null, Value::Type))
    });

    bind(reg, TypeId::STR, "sys::Str.size", |a| Ok(size_value(a.str(0)?.chars().count())));
    bind(reg, TypeId::INT, "sys::Int.plus", |a| {
        Ok(Value::Int(a.int(0)?.wrapping_add(a.int(1)?)))
    });

    bind(reg, TypeId::LIST, "sys::List.size", |a| Ok(size_value(a.list(0)?.len())));
    bind(reg, TypeId::LIST, "sys::List.isEmpty", |a| Ok(Value::Bool(a.list(0)?.is_empty())));
    bind(reg, TypeId::LIST, "sys::List.get", |a| {
        let list = a.list(0)?;
        let index = a.int(1)?;
        let len = list.len();
        let resolved = if index < 0 {
            usize::try_from(index.unsigned_abs())
                .ok()
                .and_then(|back| len.checked_sub(back))
        } else {
            usize::try_from(index).ok()
        };
        resolved
            .and_then(|i| list.get(i))
            .ok_or_else(|| errors::index_out_of_bounds(index, len))
    });
    bind(reg, TypeId::LIST, "sys::List.add", |a| {
        let list = a.list(0)?;
        list.push(a.get(1)?.clone())?;
        Ok(Value::List(list.clone()))
    });
    bind(reg, TypeId::LIST, "sys::List.each", |a| {
        let list = a.list(0)?;
        let f = a.func(1)?;
        let arity = f.arity(a.reg).min(2);
        for (i, item) in list.to_vec().into_iter().enumerate() {
            let call_args = [item, size_value(i)];
            f.call(a.reg, &call_args[..arity])?;
        }
        Ok(Value::Null)
    });

    bind(reg, TypeId::FUNC, "sys::Func.callList", |a| {
        a.func(0)?.call(a.reg, &a.opt_items(1)?)
    });
    bind(reg, TypeId::FUNC, "sys::Func.arity", |a| Ok(size_value(a.func(0)?.arity(a.reg))));
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
