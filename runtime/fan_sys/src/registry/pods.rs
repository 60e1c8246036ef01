//! Pod registration and lookup.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use fan_ir::Version;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::Registry;
use crate::depend::Depend;
use crate::errors::{self, ReflectError, ReflectResult};
use crate::idx::{PodId, TypeId};

/// Meta key holding a pod's `;`-separated depend strings.
pub const DEPENDS_META: &str = "pod.depends";

/// A registered pod.
pub struct PodEntry {
    id: PodId,
    name: Arc<str>,
    version: Version,
    meta: BTreeMap<String, String>,
    depends: OnceLock<Result<Arc<[Depend]>, ReflectError>>,
    pub(crate) types: RwLock<PodTypes>,
}

/// A pod's types in declaration order.
#[derive(Default)]
pub(crate) struct PodTypes {
    pub(crate) list: Vec<TypeId>,
    pub(crate) by_name: FxHashMap<Arc<str>, TypeId>,
}

impl PodEntry {
    pub fn id(&self) -> PodId {
        self.id
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    /// Dependencies parsed from the `pod.depends` meta entry, on first use.
    pub fn depends(&self) -> ReflectResult<Arc<[Depend]>> {
        self.depends
            .get_or_init(|| {
                let Some(src) = self.meta.get(DEPENDS_META) else {
                    return Ok(Arc::from(Vec::new()));
                };
                src.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Depend::parse)
                    .collect::<ReflectResult<Vec<_>>>()
                    .map(Arc::from)
            })
            .clone()
    }

    /// Types declared in this pod, in declaration order.
    pub fn types(&self) -> Vec<TypeId> {
        self.types.read().list.clone()
    }

    /// A declared type by simple name.
    pub fn type_named(&self, name: &str) -> Option<TypeId> {
        self.types.read().by_name.get(name).copied()
    }
}

impl Registry {
    /// Register an empty pod at version `0`.
    pub fn add_pod(&self, name: &str) -> ReflectResult<PodId> {
        self.add_pod_with(name, Version::zero(), BTreeMap::new())
    }

    /// Register a pod; fails if the name is taken.
    pub fn add_pod_with(
        &self,
        name: &str,
        version: Version,
        meta: BTreeMap<String, String>,
    ) -> ReflectResult<PodId> {
        if name.is_empty() {
            return Err(errors::parse_error(name, "empty pod name"));
        }
        let mut pods = self.inner.pods.write();
        if pods.by_name.contains_key(name) {
            return Err(errors::duplicate_pod(name));
        }
        let id = PodId::from_index(pods.entries.len());
        let name: Arc<str> = Arc::from(name);
        pods.entries.push(Arc::new(PodEntry {
            id,
            name: Arc::clone(&name),
            version,
            meta,
            depends: OnceLock::new(),
            types: RwLock::new(PodTypes::default()),
        }));
        pods.by_name.insert(Arc::clone(&name), id);
        drop(pods);
        tracing::debug!(pod = %name, "registered pod");
        Ok(id)
    }

    /// Look up a pod by exact name.
    pub fn find_pod(&self, name: &str, checked: bool) -> ReflectResult<Option<PodId>> {
        match self.inner.pods.read().by_name.get(name) {
            Some(id) => Ok(Some(*id)),
            None if checked => Err(errors::unknown_pod(name)),
            None => Ok(None),
        }
    }

    /// All pods in registration order.
    pub fn pods(&self) -> Vec<PodId> {
        let pods = self.inner.pods.read();
        (0..pods.entries.len()).map(PodId::from_index).collect()
    }
}
