//! Type declaration, structural composites, and the subtype relation.

use std::sync::Arc;

use fan_ir::TypeFlags;
use parking_lot::RwLock;

use super::{memoize, ClassData, DeclaredSlots, Registry, TypeData, TypeEntry, TypeKey};
use crate::errors::{self, ReflectResult};
use crate::facets::Facets;
use crate::idx::{PodId, TypeId};
use crate::value::Value;

impl Registry {
    /// Declare a type in `pod`.
    ///
    /// `base` and `mixins` are signatures resolved with `checked = true`;
    /// a missing base defaults to `sys::Obj`. Facets are given as
    /// `(facet qname, source)` pairs and decoded on first access.
    pub fn declare_type(
        &self,
        pod: PodId,
        name: &str,
        base: Option<&str>,
        mixins: &[&str],
        facets: &[(&str, &str)],
        flags: TypeFlags,
    ) -> ReflectResult<TypeId> {
        let base = match base {
            Some(sig) => Some(self.resolve_class(sig)?),
            None => Some(TypeId::OBJ),
        };
        let mixins = mixins
            .iter()
            .map(|sig| self.resolve_class(sig))
            .collect::<ReflectResult<Vec<_>>>()?;
        self.declare_class(pod, name, base, mixins, Facets::from_source(facets), flags)
    }

    fn resolve_class(&self, sig: &str) -> ReflectResult<TypeId> {
        let t = self
            .find_type(sig, true)?
            .ok_or_else(|| errors::unknown_type(sig))?;
        if self.type_entry(t).as_class().is_none() {
            return Err(errors::not_a_class(sig));
        }
        Ok(t)
    }

    pub(crate) fn declare_class(
        &self,
        pod: PodId,
        name: &str,
        base: Option<TypeId>,
        mixins: Vec<TypeId>,
        facets: Facets,
        flags: TypeFlags,
    ) -> ReflectResult<TypeId> {
        let pod_entry = self.pod(pod);
        if name.is_empty() || name.contains(|c: char| !(c.is_alphanumeric() || c == '_')) {
            return Err(errors::parse_error(name, "invalid type name"));
        }
        let qname: Arc<str> = Arc::from(format!("{}::{name}", pod_entry.name()));
        let name: Arc<str> = Arc::from(name);

        let mut pod_types = pod_entry.types.write();
        if pod_types.by_name.contains_key(&*name) {
            return Err(errors::duplicate_type(&qname));
        }
        let id = {
            let mut types = self.inner.types.write();
            let id = TypeId::from_index(types.entries.len());
            let data = TypeData::Class(ClassData {
                pod,
                name: Arc::clone(&name),
                qname: Arc::clone(&qname),
                base,
                mixins,
                flags,
                facets,
                slots: RwLock::new(DeclaredSlots::default()),
            });
            types.entries.push(Arc::new(TypeEntry::new(id, data)));
            id
        };
        pod_types.list.push(id);
        pod_types.by_name.insert(name, id);
        drop(pod_types);

        tracing::debug!(ty = %qname, ?base, "declared type");
        Ok(id)
    }

    /// Resolve a type by signature. Lookup misses honor `checked`; grammar
    /// errors always raise.
    pub fn find_type(&self, sig: &str, checked: bool) -> ReflectResult<Option<TypeId>> {
        crate::signature::parse(self, sig, checked)
    }

    /// Resolve `pod::name`, with `sys::<letter>` naming a generic parameter.
    pub(crate) fn find_in_pod(
        &self,
        pod: &str,
        name: &str,
        checked: bool,
    ) -> ReflectResult<Option<TypeId>> {
        if pod == "sys" {
            let mut chars = name.chars();
            if let (Some(letter), None) = (chars.next(), chars.next()) {
                if let Some(p) = self.generic_param(letter) {
                    return Ok(Some(p));
                }
            }
        }
        let Some(pod_id) = self.find_pod(pod, checked)? else {
            return Ok(None);
        };
        match self.pod(pod_id).type_named(name) {
            Some(t) => Ok(Some(t)),
            None if checked => Err(errors::unknown_type(&format!("{pod}::{name}"))),
            None => Ok(None),
        }
    }

    // Structural composites

    pub(crate) fn intern(&self, key: TypeKey) -> TypeId {
        if let Some(id) = self.inner.types.read().interned.get(&key) {
            return *id;
        }
        let mut types = self.inner.types.write();
        if let Some(id) = types.interned.get(&key) {
            return *id;
        }
        let id = TypeId::from_index(types.entries.len());
        types
            .entries
            .push(Arc::new(TypeEntry::new(id, TypeData::from_key(key.clone()))));
        types.interned.insert(key, id);
        id
    }

    /// `t?`; idempotent.
    pub fn nullable_of(&self, t: TypeId) -> TypeId {
        if self.is_nullable(t) {
            t
        } else {
            self.intern(TypeKey::Nullable(t))
        }
    }

    pub fn non_nullable(&self, t: TypeId) -> TypeId {
        match self.type_entry(t).data() {
            TypeData::Nullable(inner) => *inner,
            _ => t,
        }
    }

    pub fn is_nullable(&self, t: TypeId) -> bool {
        matches!(self.type_entry(t).data(), TypeData::Nullable(_))
    }

    /// `v[]`
    pub fn list_of(&self, v: TypeId) -> TypeId {
        self.intern(TypeKey::List(v))
    }

    /// `[k:v]`
    pub fn map_of(&self, k: TypeId, v: TypeId) -> TypeId {
        self.intern(TypeKey::Map(k, v))
    }

    /// `|params->ret|`
    pub fn func_of(&self, params: &[TypeId], ret: TypeId) -> TypeId {
        self.intern(TypeKey::Func(Arc::from(params), ret))
    }

    // Naming

    /// Qualified name; composites report their generic master, nullables
    /// their root.
    pub fn qname(&self, t: TypeId) -> Arc<str> {
        let entry = self.type_entry(t);
        match entry.data() {
            TypeData::Class(c) => Arc::clone(&c.qname),
            TypeData::Param(_) => self.signature(t),
            TypeData::Nullable(inner) => self.qname(*inner),
            TypeData::List(_) => self.qname(TypeId::LIST),
            TypeData::Map(..) => self.qname(TypeId::MAP),
            TypeData::Func(..) => self.qname(TypeId::FUNC),
        }
    }

    /// Simple name.
    pub fn name(&self, t: TypeId) -> Arc<str> {
        let entry = self.type_entry(t);
        match entry.data() {
            TypeData::Class(c) => Arc::clone(&c.name),
            TypeData::Param(letter) => Arc::from(letter.to_string()),
            TypeData::Nullable(inner) => self.name(*inner),
            TypeData::List(_) => self.name(TypeId::LIST),
            TypeData::Map(..) => self.name(TypeId::MAP),
            TypeData::Func(..) => self.name(TypeId::FUNC),
        }
    }

    /// Canonical signature, memoized per type.
    pub fn signature(&self, t: TypeId) -> Arc<str> {
        let entry = self.type_entry(t);
        memoize(&entry.signature, || match entry.data() {
            TypeData::Class(c) => Arc::clone(&c.qname),
            TypeData::Param(letter) => Arc::from(format!("sys::{letter}")),
            TypeData::Nullable(inner) => Arc::from(format!("{}?", self.signature(*inner))),
            TypeData::List(v) => Arc::from(format!("{}[]", self.signature(*v))),
            TypeData::Map(k, v) => {
                Arc::from(format!("[{}:{}]", self.signature(*k), self.signature(*v)))
            }
            TypeData::Func(params, ret) => {
                let params: Vec<Arc<str>> = params.iter().map(|p| self.signature(*p)).collect();
                Arc::from(format!("|{}->{}|", params.join(","), self.signature(*ret)))
            }
        })
    }

    pub fn pod_of(&self, t: TypeId) -> PodId {
        match self.type_entry(t).data() {
            TypeData::Class(c) => c.pod,
            TypeData::Nullable(inner) => self.pod_of(*inner),
            _ => PodId::SYS,
        }
    }

    /// Generic master of a composite, or the type itself.
    pub(crate) fn master(&self, t: TypeId) -> TypeId {
        match self.type_entry(t).data() {
            TypeData::Class(_) => t,
            TypeData::Param(_) => TypeId::OBJ,
            TypeData::Nullable(inner) => self.master(*inner),
            TypeData::List(_) => TypeId::LIST,
            TypeData::Map(..) => TypeId::MAP,
            TypeData::Func(..) => TypeId::FUNC,
        }
    }

    // Inheritance

    pub fn base(&self, t: TypeId) -> Option<TypeId> {
        match self.type_entry(t).data() {
            TypeData::Class(c) => c.base,
            TypeData::Nullable(inner) => self.base(*inner),
            _ => Some(self.master(t)),
        }
    }

    pub fn mixins(&self, t: TypeId) -> Vec<TypeId> {
        match self.type_entry(t).data() {
            TypeData::Class(c) => c.mixins.clone(),
            TypeData::Nullable(inner) => self.mixins(*inner),
            _ => Vec::new(),
        }
    }

    pub fn type_flags(&self, t: TypeId) -> TypeFlags {
        match self.type_entry(t).data() {
            TypeData::Class(c) => c.flags,
            TypeData::Nullable(inner) => self.type_flags(*inner),
            _ => self.type_flags(self.master(t)),
        }
    }

    /// Self, then the base chain's inheritance, then each mixin's, without
    /// duplicates. A nullable type shares its root's inheritance.
    pub fn inheritance(&self, t: TypeId) -> Arc<[TypeId]> {
        let entry = self.type_entry(t);
        memoize(&entry.inheritance, || {
            let mut out = Vec::new();
            let push_all = |out: &mut Vec<TypeId>, ts: &[TypeId]| {
                for t in ts {
                    if !out.contains(t) {
                        out.push(*t);
                    }
                }
            };
            match entry.data() {
                TypeData::Nullable(inner) => return self.inheritance(*inner),
                TypeData::Class(c) => {
                    out.push(t);
                    if let Some(base) = c.base {
                        push_all(&mut out, &self.inheritance(base));
                    }
                    for m in &c.mixins {
                        push_all(&mut out, &self.inheritance(*m));
                    }
                }
                _ => {
                    out.push(t);
                    push_all(&mut out, &self.inheritance(self.master(t)));
                }
            }
            Arc::from(out)
        })
    }

    /// Nominal subtype test; nullability is ignored.
    pub fn is(&self, a: TypeId, b: TypeId) -> bool {
        let (a, b) = (self.non_nullable(a), self.non_nullable(b));
        a == b || b == TypeId::OBJ || self.inheritance(a).contains(&b)
    }

    /// Assignability: `is` plus covariant lists and maps, and funcs with
    /// covariant returns, contravariant params, and possibly fewer params.
    /// A generic parameter target accepts anything.
    pub fn fits(&self, a: TypeId, b: TypeId) -> bool {
        let (a, b) = (self.non_nullable(a), self.non_nullable(b));
        if a == b || b == TypeId::OBJ {
            return true;
        }
        let (ea, eb) = (self.type_entry(a), self.type_entry(b));
        match (ea.data(), eb.data()) {
            (_, TypeData::Param(_)) => true,
            (TypeData::List(va), TypeData::List(vb)) => self.fits(*va, *vb),
            (TypeData::Map(ka, va), TypeData::Map(kb, vb)) => {
                self.fits(*ka, *kb) && self.fits(*va, *vb)
            }
            (TypeData::Func(pa, ra), TypeData::Func(pb, rb)) => {
                (*rb == TypeId::VOID || self.fits(*ra, *rb))
                    && pa.len() <= pb.len()
                    && pa.iter().zip(pb.iter()).all(|(x, y)| self.fits(*y, *x))
            }
            _ => self.is(a, b),
        }
    }

    // Values

    /// Runtime type of a value; `null` reports `sys::Obj?`.
    pub fn type_of(&self, value: &Value) -> TypeId {
        match value {
            Value::Null => self.nullable_of(TypeId::OBJ),
            Value::Bool(_) => TypeId::BOOL,
            Value::Int(_) => TypeId::INT,
            Value::Float(_) => TypeId::FLOAT,
            Value::Str(_) => TypeId::STR,
            Value::Type(_) => TypeId::TYPE,
            Value::List(l) => self.list_of(l.of()),
            Value::Obj(o) => o.ty(),
            Value::Func(f) => f.func_type(self),
        }
    }

    /// Most specific type every value fits, nullable if any value is null.
    pub fn common_type(&self, values: &[Value]) -> TypeId {
        let nullable = values.iter().any(Value::is_null);
        let mut types = values.iter().filter(|v| !v.is_null()).map(|v| self.type_of(v));
        let Some(mut best) = types.next() else {
            return self.nullable_of(TypeId::OBJ);
        };
        for t in types {
            while !self.is(t, best) {
                match self.base(best) {
                    Some(b) => best = b,
                    None => {
                        best = TypeId::OBJ;
                        break;
                    }
                }
            }
        }
        if nullable {
            self.nullable_of(best)
        } else {
            best
        }
    }
}
