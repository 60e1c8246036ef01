//! Facets: typed annotations on types and slots.
//!
//! Facets are registered as `(facet qname, source)` pairs and decoded on
//! first access by the registry's [`FacetDecoder`]. A decoded value
//! replaces its source in place. A source that fails to decode is logged
//! and evicted, so the failure is reported to one caller and later
//! lookups see the facet as absent.
//!
//! A type's facets are its own plus those inherited along its
//! inheritance, where only facet types marked `sys::FacetMeta {
//! inherited = true }` are inherited and local entries are never
//! overwritten.

mod literal;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::{self, ReflectResult};
use crate::idx::{SlotId, TypeId};
use crate::registry::{memoize, Registry, Stats};
use crate::value::Value;

pub use literal::LiteralDecoder;

/// Turns a facet source string into a value of the facet type.
pub trait FacetDecoder: Send + Sync {
    fn decode(&self, reg: &Registry, facet_type: TypeId, source: &str) -> ReflectResult<Value>;
}

#[derive(Clone)]
enum FacetState {
    Encoded(Arc<str>),
    Decoded(Value),
}

/// Facets keyed by facet type qname.
#[derive(Default)]
pub struct Facets {
    map: RwLock<BTreeMap<Arc<str>, FacetState>>,
}

impl Facets {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_source(pairs: &[(&str, &str)]) -> Self {
        let map = pairs
            .iter()
            .map(|(qname, src)| (Arc::from(*qname), FacetState::Encoded(Arc::from(*src))))
            .collect();
        Self {
            map: RwLock::new(map),
        }
    }

    fn copy(&self) -> Self {
        Self {
            map: RwLock::new(self.map.read().clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    pub fn contains(&self, qname: &str) -> bool {
        self.map.read().contains_key(qname)
    }

    /// Facet qnames in sorted order.
    pub fn qnames(&self) -> Vec<Arc<str>> {
        self.map.read().keys().cloned().collect()
    }

    /// The facet named `qname`, decoding it on first access.
    pub fn get(&self, reg: &Registry, qname: &str, checked: bool) -> ReflectResult<Option<Value>> {
        let state = self.map.read().get(qname).cloned();
        let src = match state {
            Some(FacetState::Decoded(v)) => return Ok(Some(v)),
            Some(FacetState::Encoded(src)) => src,
            None if checked => return Err(errors::unknown_facet(qname)),
            None => return Ok(None),
        };

        Stats::bump(&reg.inner.stats.facet_decodes);
        match decode(reg, qname, &src) {
            Ok(v) => {
                let mut map = self.map.write();
                match map.get_mut(qname) {
                    Some(FacetState::Decoded(existing)) => Ok(Some(existing.clone())),
                    Some(slot) => {
                        *slot = FacetState::Decoded(v.clone());
                        Ok(Some(v))
                    }
                    None => Ok(Some(v)),
                }
            }
            Err(e) => {
                tracing::error!(facet = qname, error = %e, "facet decode failed, evicting");
                let mut map = self.map.write();
                if matches!(map.get(qname), Some(FacetState::Encoded(_))) {
                    map.remove(qname);
                }
                Err(errors::facet_decode(qname, &e))
            }
        }
    }

    /// Every facet value, in qname order.
    pub fn list(&self, reg: &Registry) -> ReflectResult<Vec<Value>> {
        let mut out = Vec::new();
        for qname in self.qnames() {
            if let Some(v) = self.get(reg, &qname, false)? {
                out.push(v);
            }
        }
        Ok(out)
    }

    /// Copy in `parent`'s inheritable facets that are not present here.
    pub(crate) fn inherit(&self, reg: &Registry, parent: &Facets) -> ReflectResult<()> {
        let entries: Vec<(Arc<str>, FacetState)> = parent
            .map
            .read()
            .iter()
            .map(|(k, v)| (Arc::clone(k), v.clone()))
            .collect();
        for (qname, state) in entries {
            if self.contains(&qname) {
                continue;
            }
            let Some(facet_type) = reg.find_type(&qname, false)? else {
                continue;
            };
            if reg.is_inherited_facet(facet_type)? {
                self.map.write().entry(qname).or_insert(state);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Facets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.qnames()).finish()
    }
}

fn decode(reg: &Registry, qname: &str, src: &str) -> ReflectResult<Value> {
    let facet_type = reg
        .find_type(qname, true)?
        .ok_or_else(|| errors::unknown_type(qname))?;
    reg.inner.decoder.decode(reg, facet_type, src)
}

impl Registry {
    /// Whether the facet type's own `sys::FacetMeta` marks it inherited.
    fn is_inherited_facet(&self, facet_type: TypeId) -> ReflectResult<bool> {
        let entry = self.type_entry(facet_type);
        let Some(class) = entry.as_class() else {
            return Ok(false);
        };
        let Some(meta) = class.facets.get(self, "sys::FacetMeta", false)? else {
            return Ok(false);
        };
        let Some(field) = self.field(TypeId::FACET_META, "inherited", false)? else {
            return Ok(false);
        };
        Ok(self.field_get(field, Some(&meta))?.as_bool() == Some(true))
    }

    /// Own and inherited facets of `t`, computed once. Composites report
    /// their generic master's facets.
    pub fn type_facets(&self, t: TypeId) -> ReflectResult<Arc<Facets>> {
        let t = self.master(t);
        let entry = self.type_entry(t);
        if let Some(all) = entry.all_facets.get() {
            return Ok(Arc::clone(all));
        }
        let Some(class) = entry.as_class() else {
            return Ok(Arc::new(Facets::empty()));
        };
        let all = class.facets.copy();
        for ancestor in self.inheritance(t).iter().skip(1) {
            if let Some(parent) = self.type_entry(*ancestor).as_class() {
                all.inherit(self, &parent.facets)?;
            }
        }
        Ok(memoize(&entry.all_facets, || Arc::new(all)))
    }

    pub fn facet(&self, t: TypeId, qname: &str, checked: bool) -> ReflectResult<Option<Value>> {
        self.type_facets(t)?.get(self, qname, checked)
    }

    pub fn has_facet(&self, t: TypeId, qname: &str) -> ReflectResult<bool> {
        Ok(self.type_facets(t)?.contains(qname))
    }

    pub fn facets(&self, t: TypeId) -> ReflectResult<Vec<Value>> {
        self.type_facets(t)?.list(self)
    }

    pub fn slot_facet(&self, s: SlotId, qname: &str, checked: bool) -> ReflectResult<Option<Value>> {
        self.slot_entry(s).facets.get(self, qname, checked)
    }

    pub fn slot_facets(&self, s: SlotId) -> ReflectResult<Vec<Value>> {
        self.slot_entry(s).facets.list(self)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
