//! Fields and methods.
//!
//! A slot belongs to exactly one declaring type (`parent`) and is immutable
//! once registered, apart from memoized state: the generic mask and the
//! method's `Func` adapter. Natives are bound under the slot's *exposed*
//! name, which is the declared name run through the registry's
//! [`NameMangler`](fan_ir::NameMangler).

mod field;
mod invoke;

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use fan_ir::{split_slot_qname, SlotFlags};

use crate::errors::{self, ReflectResult};
use crate::facets::Facets;
use crate::func::Func;
use crate::idx::{SlotId, TypeId};
use crate::registry::Registry;

/// A method parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub(crate) name: Arc<str>,
    pub(crate) of: TypeId,
    pub(crate) has_default: bool,
}

impl Param {
    pub(crate) fn new(name: impl Into<Arc<str>>, of: TypeId, has_default: bool) -> Self {
        Self {
            name: name.into(),
            of,
            has_default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn of(&self) -> TypeId {
        self.of
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }
}

/// A parameter as declared, with its type given by signature.
#[derive(Copy, Clone, Debug)]
pub struct ParamDecl<'a> {
    name: &'a str,
    of: &'a str,
    has_default: bool,
}

impl<'a> ParamDecl<'a> {
    pub fn new(name: &'a str, of: &'a str) -> Self {
        Self {
            name,
            of,
            has_default: false,
        }
    }

    pub fn with_default(name: &'a str, of: &'a str) -> Self {
        Self {
            name,
            of,
            has_default: true,
        }
    }
}

/// Field or method payload.
#[derive(Clone, Debug)]
pub enum SlotKind {
    Field {
        of: TypeId,
    },
    Method {
        returns: TypeId,
        params: Arc<[Param]>,
        /// For a method parameterized onto a composite type, the generic
        /// method it was derived from.
        generic_of: Option<SlotId>,
    },
}

/// A registered slot.
pub struct SlotEntry {
    pub(crate) id: SlotId,
    pub(crate) parent: TypeId,
    pub(crate) name: Arc<str>,
    pub(crate) exposed: Arc<str>,
    pub(crate) qname: Arc<str>,
    pub(crate) flags: SlotFlags,
    pub(crate) facets: Arc<Facets>,
    pub(crate) kind: SlotKind,
    pub(crate) generic: OnceLock<bool>,
    pub(crate) func: OnceLock<Func>,
}

impl SlotEntry {
    #[expect(
        clippy::too_many_arguments,
        reason = "plain constructor over every slot attribute"
    )]
    pub(crate) fn new(
        id: SlotId,
        parent: TypeId,
        name: Arc<str>,
        exposed: Arc<str>,
        qname: Arc<str>,
        flags: SlotFlags,
        facets: Arc<Facets>,
        kind: SlotKind,
    ) -> Self {
        Self {
            id,
            parent,
            name,
            exposed,
            qname,
            flags,
            facets,
            kind,
            generic: OnceLock::new(),
            func: OnceLock::new(),
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Declaring type.
    pub fn parent(&self) -> TypeId {
        self.parent
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Name natives are bound under.
    pub fn exposed_name(&self) -> &Arc<str> {
        &self.exposed
    }

    pub fn qname(&self) -> &Arc<str> {
        &self.qname
    }

    pub fn flags(&self) -> SlotFlags {
        self.flags
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn kind(&self) -> &SlotKind {
        &self.kind
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, SlotKind::Field { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SlotKind::Method { .. })
    }

    /// Field type, or `None` for methods.
    pub fn field_type(&self) -> Option<TypeId> {
        match self.kind {
            SlotKind::Field { of } => Some(of),
            SlotKind::Method { .. } => None,
        }
    }

    /// Return type, or `None` for fields.
    pub fn returns(&self) -> Option<TypeId> {
        match self.kind {
            SlotKind::Method { returns, .. } => Some(returns),
            SlotKind::Field { .. } => None,
        }
    }

    /// Declared parameters; empty for fields.
    pub fn params(&self) -> &[Param] {
        match &self.kind {
            SlotKind::Method { params, .. } => params,
            SlotKind::Field { .. } => &[],
        }
    }

    pub fn generic_of(&self) -> Option<SlotId> {
        match self.kind {
            SlotKind::Method { generic_of, .. } => generic_of,
            SlotKind::Field { .. } => None,
        }
    }
}

impl Registry {
    /// Declare a field on class `t`.
    pub fn declare_field(
        &self,
        t: TypeId,
        name: &str,
        of: &str,
        flags: SlotFlags,
        facets: &[(&str, &str)],
    ) -> ReflectResult<SlotId> {
        let of = self.resolve(of)?;
        self.add_slot(t, name, flags, facets, SlotKind::Field { of })
    }

    /// Declare a method on class `t`.
    pub fn declare_method(
        &self,
        t: TypeId,
        name: &str,
        returns: &str,
        params: &[ParamDecl<'_>],
        flags: SlotFlags,
        facets: &[(&str, &str)],
    ) -> ReflectResult<SlotId> {
        let returns = self.resolve(returns)?;
        let params = params
            .iter()
            .map(|p| Ok(Param::new(p.name, self.resolve(p.of)?, p.has_default)))
            .collect::<ReflectResult<Vec<_>>>()?;
        let kind = SlotKind::Method {
            returns,
            params: Arc::from(params),
            generic_of: None,
        };
        self.add_slot(t, name, flags, facets, kind)
    }

    fn resolve(&self, sig: &str) -> ReflectResult<TypeId> {
        self.find_type(sig, true)?
            .ok_or_else(|| errors::unknown_type(sig))
    }

    fn add_slot(
        &self,
        t: TypeId,
        name: &str,
        flags: SlotFlags,
        facets: &[(&str, &str)],
        kind: SlotKind,
    ) -> ReflectResult<SlotId> {
        let entry = self.type_entry(t);
        let Some(class) = entry.as_class() else {
            return Err(errors::not_a_class(&self.signature(t)));
        };
        if name.is_empty() || name.contains(|c: char| !(c.is_alphanumeric() || c == '_')) {
            return Err(errors::invalid_slot_name(&class.qname, name));
        }
        let qname: Arc<str> = Arc::from(format!("{}.{name}", class.qname));
        let name: Arc<str> = Arc::from(name);
        let exposed: Arc<str> = Arc::from(self.inner.mangler.expose(&name).as_ref());
        let facets = Arc::new(Facets::from_source(facets));

        let mut declared = class.slots.write();
        if declared.sealed {
            return Err(errors::type_finalized(&class.qname));
        }
        if declared.by_name.contains_key(&*name) {
            return Err(errors::duplicate_slot(&qname));
        }
        let id = self.push_slot(|id| {
            SlotEntry::new(
                id,
                t,
                Arc::clone(&name),
                exposed,
                Arc::clone(&qname),
                flags,
                facets,
                kind,
            )
        });
        declared.list.push(id);
        declared.by_name.insert(name, id);
        drop(declared);

        tracing::debug!(slot = %qname, ?flags, "declared slot");
        Ok(id)
    }

    /// Look up `pod::Type.slot`. The split is on the first `.` after the
    /// `::`; lookup misses honor `checked`.
    pub fn find_slot(&self, qname: &str, checked: bool) -> ReflectResult<Option<SlotId>> {
        let (type_qname, slot) =
            split_slot_qname(qname).map_err(|e| errors::invalid_slot_qname(qname, &e))?;
        let Some(t) = self.find_type(type_qname, checked)? else {
            return Ok(None);
        };
        self.slot(t, slot, checked)
    }

    /// [`find_slot`](Self::find_slot) restricted to methods; a field by
    /// that name is a `Cast` error when checked.
    pub fn find_method(&self, qname: &str, checked: bool) -> ReflectResult<Option<SlotId>> {
        match self.find_slot(qname, checked)? {
            Some(s) if self.slot_entry(s).is_method() => Ok(Some(s)),
            Some(_) if checked => Err(errors::not_a_method(qname)),
            _ => Ok(None),
        }
    }

    /// [`find_slot`](Self::find_slot) restricted to fields.
    pub fn find_field(&self, qname: &str, checked: bool) -> ReflectResult<Option<SlotId>> {
        match self.find_slot(qname, checked)? {
            Some(s) if self.slot_entry(s).is_field() => Ok(Some(s)),
            Some(_) if checked => Err(errors::not_a_field(qname)),
            _ => Ok(None),
        }
    }

    /// The `Func` adapter of the method named by `qname`.
    pub fn find_func(&self, qname: &str, checked: bool) -> ReflectResult<Option<Func>> {
        self.find_method(qname, checked)?
            .map(|m| self.method_func(m))
            .transpose()
    }

    /// `"sys::Int plus(sys::Int b)"` for methods, `"sys::Int size"` for
    /// fields.
    pub fn method_signature(&self, s: SlotId) -> String {
        let entry = self.slot_entry(s);
        let mut out = String::new();
        match &entry.kind {
            SlotKind::Field { of } => {
                let _ = write!(out, "{} {}", self.signature(*of), entry.name);
            }
            SlotKind::Method {
                returns, params, ..
            } => {
                let _ = write!(out, "{} {}(", self.signature(*returns), entry.name);
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} {}", self.signature(p.of), p.name);
                    if p.has_default {
                        out.push_str(" := ...");
                    }
                }
                out.push(')');
            }
        }
        out
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
