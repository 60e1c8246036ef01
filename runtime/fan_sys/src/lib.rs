//! Fan Sys - reflection and dynamic dispatch for the Fantom runtime.
//!
//! # Architecture
//!
//! Everything hangs off a [`Registry`], a cheap-clone handle to
//! append-only arenas addressed by `PodId`, `TypeId` and `SlotId`:
//! - `signature`: the type signature parser, with a per-registry cache
//! - `registry`: pods, declared types, interned composites, inheritance,
//!   and reflected slot tables
//! - `slots`: fields, methods, and the method calling convention
//! - `natives`: host implementations bound by type and exposed slot name
//! - `generics`: generic parameters and parameterized composite slots
//! - `func`: method adapters and func wrappers
//! - `obj`: the root object protocol and `trap` dispatch
//! - `facets`: lazily decoded type and slot annotations
//! - `depend`: pod dependency constraints
//!
//! `Registry::boot()` declares the `sys` pod and binds its natives.

mod boot;
pub mod depend;
mod error;
pub mod errors;
pub mod facets;
mod func;
mod generics;
mod idx;
mod natives;
mod obj;
mod registry;
mod signature;
mod slots;
mod value;

pub use depend::{Depend, DependConstraint};
pub use error::{ErrorKind, ReflectError, ReflectResult};
pub use facets::{FacetDecoder, Facets, LiteralDecoder};
pub use func::Func;
pub use generics::GENERIC_LETTERS;
pub use idx::{PodId, SlotId, TypeId};
pub use natives::{InstanceFn, StaticFn};
pub use registry::{
    ClassData, PodEntry, Registry, RegistryBuilder, RegistryStats, TypeData, TypeEntry,
    DEPENDS_META,
};
pub use slots::{Param, ParamDecl, SlotEntry, SlotKind};
pub use value::{ListValue, ObjValue, Value};

pub use fan_ir::{NameMangler, SlotFlags, TypeFlags, Version};
