//! Registry configuration.

use std::sync::Arc;

use fan_ir::NameMangler;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{PodArena, Registry, RegistryInner, Stats, TypeArena};
use crate::boot;
use crate::errors::ReflectResult;
use crate::facets::{FacetDecoder, LiteralDecoder};
use crate::natives::NativeTables;

/// Builder for a [`Registry`].
///
/// The `sys` pod is always declared, which pins its core types to the
/// fixed `TypeId` constants. `sys_natives(false)` leaves its native slots
/// unbound, for hosts that supply their own implementations.
pub struct RegistryBuilder {
    mangler: NameMangler,
    decoder: Arc<dyn FacetDecoder>,
    sys_natives: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            mangler: NameMangler::rust(),
            decoder: Arc::new(LiteralDecoder),
            sys_natives: true,
        }
    }

    /// Reserved-word table used to expose slot names to natives.
    #[must_use]
    pub fn mangler(mut self, mangler: NameMangler) -> Self {
        self.mangler = mangler;
        self
    }

    /// Decoder used for facet source strings.
    #[must_use]
    pub fn facet_decoder(mut self, decoder: impl FacetDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Whether to bind the built-in `sys` natives.
    #[must_use]
    pub fn sys_natives(mut self, bind: bool) -> Self {
        self.sys_natives = bind;
        self
    }

    pub fn build(self) -> ReflectResult<Registry> {
        let reg = Registry {
            inner: Arc::new(RegistryInner {
                mangler: self.mangler,
                decoder: self.decoder,
                pods: RwLock::new(PodArena::default()),
                types: RwLock::new(TypeArena::default()),
                slots: RwLock::new(Vec::new()),
                sig_cache: RwLock::new(FxHashMap::default()),
                natives: NativeTables::default(),
                statics: RwLock::new(FxHashMap::default()),
                stats: Stats::default(),
            }),
        };
        boot::declare_sys(&reg)?;
        if self.sys_natives {
            boot::bind_sys(&reg);
        }
        Ok(reg)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
