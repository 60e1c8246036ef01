//! Generic parameters and parameterization.
//!
//! Only `sys` declares generic slots. The placeholders `sys::A` .. `sys::H`,
//! `K`, `L`, `M`, `R`, and `V` are interned once at boot. A composite type
//! binds them as follows:
//!
//! | composite   | bindings                              |
//! |-------------|---------------------------------------|
//! | `V[]`       | `V` = element, `L` = the list type    |
//! | `[K:V]`     | `K`, `V`, `M` = the map type          |
//! | func type   | `A`..`H` by position, `R` = return    |
//!
//! Letters without a binding substitute to `sys::Obj`.

use std::sync::Arc;

use crate::errors::{self, ReflectResult};
use crate::idx::{PodId, SlotId, TypeId};
use crate::registry::{memoize, Registry, Stats, TypeData, TypeKey};
use crate::slots::{Param, SlotEntry, SlotKind};

/// Every generic parameter letter, in boot order.
pub const GENERIC_LETTERS: [char; 13] =
    ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'K', 'L', 'M', 'R', 'V'];

/// Positional func parameter letters.
const FUNC_PARAM_LETTERS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

impl Registry {
    /// The interned placeholder for `letter`, if it is a generic letter.
    pub fn generic_param(&self, letter: char) -> Option<TypeId> {
        self.inner
            .types
            .read()
            .interned
            .get(&TypeKey::Param(letter))
            .copied()
    }

    pub(crate) fn intern_generic_params(&self) {
        for letter in GENERIC_LETTERS {
            self.intern(TypeKey::Param(letter));
        }
    }

    /// True for a placeholder, nullable or not.
    pub fn is_generic_parameter(&self, t: TypeId) -> bool {
        matches!(
            self.type_entry(self.non_nullable(t)).data(),
            TypeData::Param(_)
        )
    }

    /// True if `t` mentions a placeholder anywhere in its structure.
    pub(crate) fn contains_param(&self, t: TypeId) -> bool {
        match self.type_entry(t).data() {
            TypeData::Class(_) => false,
            TypeData::Param(_) => true,
            TypeData::Nullable(x) | TypeData::List(x) => self.contains_param(*x),
            TypeData::Map(k, v) => self.contains_param(*k) || self.contains_param(*v),
            TypeData::Func(params, ret) => {
                self.contains_param(*ret) || params.iter().any(|p| self.contains_param(*p))
            }
        }
    }

    /// Whether a `sys` slot's signature mentions a generic parameter.
    /// Computed once per slot.
    pub fn is_generic_method(&self, slot: SlotId) -> bool {
        let entry = self.slot_entry(slot);
        memoize(&entry.generic, || {
            Stats::bump(&self.inner.stats.generic_masks);
            if entry.generic_of().is_some() || self.pod_of(entry.parent) != PodId::SYS {
                return false;
            }
            match &entry.kind {
                SlotKind::Field { of } => self.contains_param(*of),
                SlotKind::Method {
                    returns, params, ..
                } => {
                    self.contains_param(*returns)
                        || params.iter().any(|p| self.contains_param(p.of))
                }
            }
        })
    }

    /// Generic bindings of a composite type; empty for anything else.
    pub fn generic_params(&self, t: TypeId) -> Vec<(char, TypeId)> {
        let t = self.non_nullable(t);
        match self.type_entry(t).data() {
            TypeData::List(v) => vec![('V', *v), ('L', t)],
            TypeData::Map(k, v) => vec![('K', *k), ('V', *v), ('M', t)],
            TypeData::Func(params, ret) => FUNC_PARAM_LETTERS
                .iter()
                .zip(params.iter())
                .map(|(l, p)| (*l, *p))
                .chain(std::iter::once(('R', *ret)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Build a composite from a generic master and bindings.
    ///
    /// `sys::List` needs `V`; `sys::Map` needs `K` and `V`; `sys::Func`
    /// needs `R` and takes `A`, `B`, ... up to the first missing letter.
    pub fn parameterize(
        &self,
        master: TypeId,
        bindings: &[(char, TypeId)],
    ) -> ReflectResult<TypeId> {
        let get = |letter: char| {
            bindings
                .iter()
                .find(|(l, _)| *l == letter)
                .map(|(_, t)| *t)
        };
        let require = |letter: char| {
            get(letter).ok_or_else(|| errors::missing_binding(&self.qname(master), letter))
        };
        match master {
            TypeId::LIST => Ok(self.list_of(require('V')?)),
            TypeId::MAP => Ok(self.map_of(require('K')?, require('V')?)),
            TypeId::FUNC => {
                let ret = require('R')?;
                let params: Vec<TypeId> =
                    FUNC_PARAM_LETTERS.iter().map_while(|l| get(*l)).collect();
                Ok(self.func_of(&params, ret))
            }
            _ => Err(errors::not_generic(&self.signature(master))),
        }
    }

    /// Substitute the placeholders in `t` with the bindings of `composite`.
    pub(crate) fn substitute(&self, t: TypeId, composite: TypeId) -> TypeId {
        if !self.contains_param(t) {
            return t;
        }
        match self.type_entry(t).data() {
            TypeData::Class(_) => t,
            TypeData::Param(letter) => self
                .generic_params(composite)
                .into_iter()
                .find(|(l, _)| l == letter)
                .map_or(TypeId::OBJ, |(_, bound)| bound),
            TypeData::Nullable(x) => self.nullable_of(self.substitute(*x, composite)),
            TypeData::List(v) => self.list_of(self.substitute(*v, composite)),
            TypeData::Map(k, v) => {
                self.map_of(self.substitute(*k, composite), self.substitute(*v, composite))
            }
            TypeData::Func(params, ret) => {
                let params: Vec<TypeId> = params
                    .iter()
                    .map(|p| self.substitute(*p, composite))
                    .collect();
                self.func_of(&params, self.substitute(*ret, composite))
            }
        }
    }

    /// The view of a master slot on `composite`: the slot itself when it
    /// is not generic, otherwise a new slot with substituted types that
    /// remembers its origin.
    pub(crate) fn parameterize_slot(&self, slot: &SlotEntry, composite: TypeId) -> SlotId {
        if !self.is_generic_method(slot.id) {
            return slot.id;
        }
        let kind = match &slot.kind {
            SlotKind::Field { of } => SlotKind::Field {
                of: self.substitute(*of, composite),
            },
            SlotKind::Method {
                returns, params, ..
            } => SlotKind::Method {
                returns: self.substitute(*returns, composite),
                params: params
                    .iter()
                    .map(|p| {
                        let of = self.substitute(p.of, composite);
                        Param::new(Arc::clone(&p.name), of, p.has_default)
                    })
                    .collect(),
                generic_of: Some(slot.id),
            },
        };
        self.push_slot(|id| {
            SlotEntry::new(
                id,
                composite,
                Arc::clone(&slot.name),
                Arc::clone(&slot.exposed),
                Arc::clone(&slot.qname),
                slot.flags,
                Arc::clone(&slot.facets),
                kind,
            )
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
