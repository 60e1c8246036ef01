//! Reflected slot tables.
//!
//! A class's table is built once, on first lookup, from its declared slots
//! and the tables of its mixins and base. Lookup precedence:
//!
//! 1. own slots always win;
//! 2. then mixins in declared order, then the base. The first inherited
//!    candidate wins, except that an abstract candidate gives way to a
//!    later concrete one of the same name.
//!
//! Constructors are visible only on their declaring type. Slots a mixin
//! inherits from `sys::Obj` are skipped, so they never shadow an override
//! reached through the base. Listing order is base slots, then mixin
//! slots, then own slots, each name at its first position.
//!
//! Reflecting a class seals its declared slots.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{memoize, ClassData, Registry, Stats, TypeData};
use crate::errors::{self, ReflectResult};
use crate::idx::{SlotId, TypeId};

pub(crate) struct SlotTable {
    pub(crate) order: Vec<SlotId>,
    pub(crate) by_name: FxHashMap<Arc<str>, SlotId>,
}

impl SlotTable {
    fn from_order(order: Vec<SlotId>, reg: &Registry) -> Self {
        let by_name = order
            .iter()
            .map(|id| (Arc::clone(&reg.slot_entry(*id).name), *id))
            .collect();
        Self { order, by_name }
    }
}

impl Registry {
    pub(crate) fn slot_table(&self, t: TypeId) -> Arc<SlotTable> {
        let entry = self.type_entry(t);
        if let Some(table) = entry.table.get() {
            return Arc::clone(table);
        }
        let table = match entry.data() {
            TypeData::Class(c) => Arc::new(self.reflect_class(c)),
            TypeData::Nullable(inner) => self.slot_table(*inner),
            TypeData::Param(_) => self.slot_table(TypeId::OBJ),
            TypeData::List(_) | TypeData::Map(..) | TypeData::Func(..) => {
                Arc::new(self.reflect_composite(t))
            }
        };
        memoize(&entry.table, || table)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(ty = %c.qname))]
    fn reflect_class(&self, c: &ClassData) -> SlotTable {
        let own = {
            let mut declared = c.slots.write();
            declared.sealed = true;
            declared.list.clone()
        };
        Stats::bump(&self.inner.stats.slot_tables);

        let mut chosen: FxHashMap<Arc<str>, SlotId> = FxHashMap::default();
        let mut offer = |id: SlotId, from_mixin: bool| {
            let slot = self.slot_entry(id);
            if slot.flags.is_ctor() || (from_mixin && slot.parent == TypeId::OBJ) {
                return;
            }
            match chosen.get(&slot.name) {
                None => {
                    chosen.insert(Arc::clone(&slot.name), id);
                }
                Some(prev) => {
                    if self.slot_entry(*prev).flags.is_abstract() && !slot.flags.is_abstract() {
                        chosen.insert(Arc::clone(&slot.name), id);
                    }
                }
            }
        };
        let mixin_tables: Vec<Arc<SlotTable>> =
            c.mixins.iter().map(|m| self.slot_table(*m)).collect();
        let base_table = c.base.map(|b| self.slot_table(b));
        for table in &mixin_tables {
            for id in &table.order {
                offer(*id, true);
            }
        }
        if let Some(table) = &base_table {
            for id in &table.order {
                offer(*id, false);
            }
        }
        for id in &own {
            chosen.insert(Arc::clone(&self.slot_entry(*id).name), *id);
        }

        let mut order = Vec::with_capacity(chosen.len());
        let mut by_name = FxHashMap::default();
        let listed = base_table
            .iter()
            .chain(mixin_tables.iter())
            .flat_map(|table| table.order.iter())
            .chain(own.iter());
        for id in listed {
            let name = Arc::clone(&self.slot_entry(*id).name);
            if by_name.contains_key(&name) {
                continue;
            }
            if let Some(winner) = chosen.get(&name) {
                order.push(*winner);
                by_name.insert(name, *winner);
            }
        }
        tracing::debug!(slots = order.len(), "reflected slot table");
        SlotTable { order, by_name }
    }

    /// A composite sees its master's slots, parameterized.
    fn reflect_composite(&self, t: TypeId) -> SlotTable {
        Stats::bump(&self.inner.stats.slot_tables);
        let master = self.slot_table(self.master(t));
        let order = master
            .order
            .iter()
            .map(|id| self.parameterize_slot(&self.slot_entry(*id), t))
            .collect();
        SlotTable::from_order(order, self)
    }

    /// Look up a slot by simple name, inherited slots included.
    pub fn slot(&self, t: TypeId, name: &str, checked: bool) -> ReflectResult<Option<SlotId>> {
        match self.slot_table(t).by_name.get(name) {
            Some(id) => Ok(Some(*id)),
            None if checked => Err(errors::unknown_slot(&format!(
                "{}.{name}",
                self.signature(t)
            ))),
            None => Ok(None),
        }
    }

    /// [`slot`](Self::slot) restricted to methods.
    pub fn method(&self, t: TypeId, name: &str, checked: bool) -> ReflectResult<Option<SlotId>> {
        match self.slot(t, name, checked)? {
            Some(s) if self.slot_entry(s).is_method() => Ok(Some(s)),
            Some(s) if checked => Err(errors::not_a_method(&self.slot_entry(s).qname)),
            _ => Ok(None),
        }
    }

    /// [`slot`](Self::slot) restricted to fields.
    pub fn field(&self, t: TypeId, name: &str, checked: bool) -> ReflectResult<Option<SlotId>> {
        match self.slot(t, name, checked)? {
            Some(s) if self.slot_entry(s).is_field() => Ok(Some(s)),
            Some(s) if checked => Err(errors::not_a_field(&self.slot_entry(s).qname)),
            _ => Ok(None),
        }
    }

    /// Every visible slot, in listing order.
    pub fn slots(&self, t: TypeId) -> Vec<SlotId> {
        self.slot_table(t).order.clone()
    }

    pub fn fields(&self, t: TypeId) -> Vec<SlotId> {
        self.slots(t)
            .into_iter()
            .filter(|s| self.slot_entry(*s).is_field())
            .collect()
    }

    pub fn methods(&self, t: TypeId) -> Vec<SlotId> {
        self.slots(t)
            .into_iter()
            .filter(|s| self.slot_entry(*s).is_method())
            .collect()
    }

    /// Slots declared directly on a class, in declaration order. Does not
    /// seal the class.
    pub fn declared_slots(&self, t: TypeId) -> Vec<SlotId> {
        match self.type_entry(self.non_nullable(t)).as_class() {
            Some(c) => c.slots.read().list.clone(),
            None => Vec::new(),
        }
    }
}
