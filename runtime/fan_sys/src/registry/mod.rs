//! The process-wide pod and type registry.
//!
//! A `Registry` is a cheap-clone handle to append-only arenas of pods,
//! types, and slots. Entries are `Arc`-shared and never removed; derived
//! state (slot tables, inheritance, signatures, generic masks) is memoized
//! in `OnceLock` cells next to the entry it belongs to.
//!
//! # Locking
//!
//! Arena locks are held only for the duration of a push or an index read
//! and never while native code runs. When two locks nest, the order is
//! pod type-table before type arena.

mod builder;
mod make;
mod pods;
mod reflect;
mod types;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use fan_ir::{NameMangler, TypeFlags};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::facets::{FacetDecoder, Facets};
use crate::idx::{PodId, SlotId, TypeId};
use crate::natives::NativeTables;
use crate::slots::SlotEntry;
use crate::value::Value;

pub use builder::RegistryBuilder;
pub use pods::{PodEntry, DEPENDS_META};
pub(crate) use reflect::SlotTable;

/// Shared handle to a registry.
#[derive(Clone)]
pub struct Registry {
    pub(crate) inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    pub(crate) mangler: NameMangler,
    pub(crate) decoder: Arc<dyn FacetDecoder>,
    pub(crate) pods: RwLock<PodArena>,
    pub(crate) types: RwLock<TypeArena>,
    pub(crate) slots: RwLock<Vec<Arc<SlotEntry>>>,
    /// Successful parses, keyed by the exact signature string.
    pub(crate) sig_cache: RwLock<FxHashMap<Arc<str>, TypeId>>,
    pub(crate) natives: NativeTables,
    /// Static field storage.
    pub(crate) statics: RwLock<FxHashMap<SlotId, Value>>,
    pub(crate) stats: Stats,
}

#[derive(Default)]
pub(crate) struct PodArena {
    pub(crate) entries: Vec<Arc<PodEntry>>,
    pub(crate) by_name: FxHashMap<Arc<str>, PodId>,
}

#[derive(Default)]
pub(crate) struct TypeArena {
    pub(crate) entries: Vec<Arc<TypeEntry>>,
    /// Structural types by shape.
    pub(crate) interned: FxHashMap<TypeKey, TypeId>,
}

/// Shape of a structural (non-declared) type, used as the interning key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TypeKey {
    Param(char),
    Nullable(TypeId),
    List(TypeId),
    Map(TypeId, TypeId),
    Func(Arc<[TypeId]>, TypeId),
}

/// What a type is.
pub enum TypeData {
    /// A declared class, mixin, enum, or facet.
    Class(ClassData),
    /// Generic parameter placeholder (`sys::V`).
    Param(char),
    Nullable(TypeId),
    /// `V[]`
    List(TypeId),
    /// `[K:V]`
    Map(TypeId, TypeId),
    /// `|A,B->R|`
    Func(Arc<[TypeId]>, TypeId),
}

impl TypeData {
    pub(crate) fn from_key(key: TypeKey) -> Self {
        match key {
            TypeKey::Param(c) => TypeData::Param(c),
            TypeKey::Nullable(t) => TypeData::Nullable(t),
            TypeKey::List(v) => TypeData::List(v),
            TypeKey::Map(k, v) => TypeData::Map(k, v),
            TypeKey::Func(params, ret) => TypeData::Func(params, ret),
        }
    }
}

/// A declared type.
pub struct ClassData {
    pub(crate) pod: PodId,
    pub(crate) name: Arc<str>,
    pub(crate) qname: Arc<str>,
    pub(crate) base: Option<TypeId>,
    pub(crate) mixins: Vec<TypeId>,
    pub(crate) flags: TypeFlags,
    pub(crate) facets: Facets,
    pub(crate) slots: RwLock<DeclaredSlots>,
}

impl ClassData {
    pub fn pod(&self) -> PodId {
        self.pod
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn qname(&self) -> &Arc<str> {
        &self.qname
    }

    pub fn base(&self) -> Option<TypeId> {
        self.base
    }

    pub fn mixins(&self) -> &[TypeId] {
        &self.mixins
    }

    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Facets declared directly on this type.
    pub fn facets(&self) -> &Facets {
        &self.facets
    }
}

/// Slots declared directly on a class.
///
/// `sealed` flips when the slot table is first reflected; no slot may be
/// added after that.
#[derive(Default)]
pub(crate) struct DeclaredSlots {
    pub(crate) list: Vec<SlotId>,
    pub(crate) by_name: FxHashMap<Arc<str>, SlotId>,
    pub(crate) sealed: bool,
}

/// A registered type plus its memoized derived state.
pub struct TypeEntry {
    pub(crate) id: TypeId,
    pub(crate) data: TypeData,
    pub(crate) signature: OnceLock<Arc<str>>,
    pub(crate) inheritance: OnceLock<Arc<[TypeId]>>,
    pub(crate) table: OnceLock<Arc<SlotTable>>,
    /// Own facets plus inherited ones.
    pub(crate) all_facets: OnceLock<Arc<Facets>>,
}

impl TypeEntry {
    pub(crate) fn new(id: TypeId, data: TypeData) -> Self {
        Self {
            id,
            data,
            signature: OnceLock::new(),
            inheritance: OnceLock::new(),
            table: OnceLock::new(),
            all_facets: OnceLock::new(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn data(&self) -> &TypeData {
        &self.data
    }

    pub fn as_class(&self) -> Option<&ClassData> {
        match &self.data {
            TypeData::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// Counters for memoized work, for observing cache behavior.
#[derive(Default)]
pub(crate) struct Stats {
    pub(crate) signature_parses: AtomicUsize,
    pub(crate) signature_hits: AtomicUsize,
    pub(crate) slot_tables: AtomicUsize,
    pub(crate) generic_masks: AtomicUsize,
    pub(crate) facet_decodes: AtomicUsize,
}

impl Stats {
    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of the registry's work counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Signatures run through the full or fast parser (cache misses).
    pub signature_parses: usize,
    pub signature_hits: usize,
    /// Slot tables reflected.
    pub slot_tables: usize,
    /// Generic-method classifications computed.
    pub generic_masks: usize,
    pub facet_decodes: usize,
}

/// Read a memoized cell, computing and storing it on first use.
///
/// The value is computed outside any lock; when two callers race, the
/// first store wins and both observe it.
pub(crate) fn memoize<T: Clone>(cell: &OnceLock<T>, init: impl FnOnce() -> T) -> T {
    if let Some(v) = cell.get() {
        return v.clone();
    }
    let v = init();
    match cell.set(v.clone()) {
        Ok(()) => v,
        Err(_) => cell.get().cloned().unwrap_or(v),
    }
}

impl Registry {
    /// A registry with the default configuration and `sys` booted.
    pub fn boot() -> crate::ReflectResult<Self> {
        RegistryBuilder::new().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn mangler(&self) -> &NameMangler {
        &self.inner.mangler
    }

    pub fn stats(&self) -> RegistryStats {
        let s = &self.inner.stats;
        RegistryStats {
            signature_parses: s.signature_parses.load(Ordering::Relaxed),
            signature_hits: s.signature_hits.load(Ordering::Relaxed),
            slot_tables: s.slot_tables.load(Ordering::Relaxed),
            generic_masks: s.generic_masks.load(Ordering::Relaxed),
            facet_decodes: s.facet_decodes.load(Ordering::Relaxed),
        }
    }

    /// Look up a type entry.
    ///
    /// # Panics
    /// If `t` was not issued by this registry.
    pub fn type_entry(&self, t: TypeId) -> Arc<TypeEntry> {
        Arc::clone(&self.inner.types.read().entries[t.index()])
    }

    /// Look up a slot entry.
    ///
    /// # Panics
    /// If `s` was not issued by this registry.
    pub fn slot_entry(&self, s: SlotId) -> Arc<SlotEntry> {
        Arc::clone(&self.inner.slots.read()[s.index()])
    }

    /// Look up a pod entry.
    ///
    /// # Panics
    /// If `p` was not issued by this registry.
    pub fn pod(&self, p: PodId) -> Arc<PodEntry> {
        Arc::clone(&self.inner.pods.read().entries[p.index()])
    }

    pub(crate) fn push_slot(&self, make: impl FnOnce(SlotId) -> SlotEntry) -> SlotId {
        let mut slots = self.inner.slots.write();
        let id = SlotId::from_index(slots.len());
        slots.push(Arc::new(make(id)));
        id
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("pods", &self.inner.pods.read().entries.len())
            .field("types", &self.inner.types.read().entries.len())
            .field("slots", &self.inner.slots.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
