//! Registry handles.
//!
//! Pods, types, and slots live in append-only arenas inside the
//! [`Registry`](crate::Registry) and are referred to by 32-bit indices.
//! Every type, composites included, is interned, so `TypeId` equality is
//! type equality.
//!
//! The `sys` pod and its core types are declared first by every registry,
//! which pins them to the fixed indices below.

use std::fmt;

/// Index of a pod in the registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PodId(u32);

impl PodId {
    /// The `sys` pod.
    pub const SYS: Self = Self(0);

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena length is bounded well below u32::MAX"
        )]
        let raw = index as u32;
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for PodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PodId({})", self.0)
    }
}

/// Index of a type in the registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === sys core types, in declaration order ===

    /// `sys::Obj`, root of every class hierarchy.
    pub const OBJ: Self = Self(0);
    pub const TYPE: Self = Self(1);
    pub const FUNC: Self = Self(2);
    pub const BOOL: Self = Self(3);
    pub const NUM: Self = Self(4);
    pub const INT: Self = Self(5);
    pub const FLOAT: Self = Self(6);
    pub const STR: Self = Self(7);
    /// `sys::List`, the generic master of every `T[]`.
    pub const LIST: Self = Self(8);
    /// `sys::Map`, the generic master of every `[K:V]`.
    pub const MAP: Self = Self(9);
    pub const VOID: Self = Self(10);
    pub const FACET: Self = Self(11);
    /// `sys::FacetMeta`, the meta-facet controlling facet inheritance.
    pub const FACET_META: Self = Self(12);

    /// Number of fixed core class types.
    pub const CORE_COUNT: usize = 13;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena length is bounded well below u32::MAX"
        )]
        let raw = index as u32;
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Index of a slot (field or method) in the registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SlotId(u32);

impl SlotId {
    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena length is bounded well below u32::MAX"
        )]
        let raw = index as u32;
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}
