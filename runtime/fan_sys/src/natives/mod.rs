//! Native implementation tables.
//!
//! Two namespaces, both keyed by declaring type and exposed slot name:
//! - static natives serve constructors, static methods, and the
//!   receiver-first fallback for instance methods;
//! - instance natives are found by walking the receiver's runtime
//!   inheritance, so a subtype's binding overrides its parent's.
//!
//! Entries are cloned out of the table before they run.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::{self, ReflectResult};
use crate::idx::TypeId;
use crate::registry::Registry;
use crate::value::Value;

/// A native taking every argument positionally.
pub type StaticFn = Arc<dyn Fn(&Registry, &[Value]) -> ReflectResult<Value> + Send + Sync>;

/// A native taking its receiver separately.
pub type InstanceFn =
    Arc<dyn Fn(&Registry, &Value, &[Value]) -> ReflectResult<Value> + Send + Sync>;

type Table<F> = RwLock<FxHashMap<TypeId, FxHashMap<Arc<str>, F>>>;

#[derive(Default)]
pub(crate) struct NativeTables {
    statics: Table<StaticFn>,
    instances: Table<InstanceFn>,
}

impl NativeTables {
    pub(crate) fn static_fn(&self, t: TypeId, exposed: &str) -> Option<StaticFn> {
        self.statics.read().get(&t)?.get(exposed).cloned()
    }

    pub(crate) fn instance_fn(&self, t: TypeId, exposed: &str) -> Option<InstanceFn> {
        self.instances.read().get(&t)?.get(exposed).cloned()
    }
}

impl Registry {
    /// Bind a static native for slot `name` of the class `type_sig`.
    /// A later binding for the same slot replaces the earlier one.
    pub fn bind_static<F>(&self, type_sig: &str, name: &str, f: F) -> ReflectResult<()>
    where
        F: Fn(&Registry, &[Value]) -> ReflectResult<Value> + Send + Sync + 'static,
    {
        let t = self.native_owner(type_sig)?;
        self.bind_static_on(t, name, Arc::new(f));
        Ok(())
    }

    /// Bind an instance native for slot `name` of the class `type_sig`.
    pub fn bind_instance<F>(&self, type_sig: &str, name: &str, f: F) -> ReflectResult<()>
    where
        F: Fn(&Registry, &Value, &[Value]) -> ReflectResult<Value> + Send + Sync + 'static,
    {
        let t = self.native_owner(type_sig)?;
        let exposed: Arc<str> = Arc::from(self.inner.mangler.expose(name).as_ref());
        tracing::debug!(owner = ?t, slot = %exposed, "bound instance native");
        self.inner
            .natives
            .instances
            .write()
            .entry(t)
            .or_default()
            .insert(exposed, Arc::new(f));
        Ok(())
    }

    pub(crate) fn bind_static_on(&self, t: TypeId, name: &str, f: StaticFn) {
        let exposed: Arc<str> = Arc::from(self.inner.mangler.expose(name).as_ref());
        tracing::debug!(owner = ?t, slot = %exposed, "bound static native");
        self.inner
            .natives
            .statics
            .write()
            .entry(t)
            .or_default()
            .insert(exposed, f);
    }

    fn native_owner(&self, type_sig: &str) -> ReflectResult<TypeId> {
        let t = self
            .find_type(type_sig, true)?
            .ok_or_else(|| errors::unknown_type(type_sig))?;
        if self.type_entry(t).as_class().is_none() {
            return Err(errors::not_a_class(type_sig));
        }
        Ok(t)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
