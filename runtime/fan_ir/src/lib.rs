//! Shared vocabulary for the Fantom reflection runtime.
//!
//! This crate holds the pieces every other runtime crate agrees on and that
//! need no registry to make sense:
//! - `TypeFlags` / `SlotFlags`: the fcode flag bitsets
//! - `Version`: dotted pod version numbers
//! - `NameMangler`: reserved-word escaping for native bindings
//! - qualified-name splitting (`pod::Type`, `pod::Type.slot`)

mod flags;
mod mangle;
mod qname;
mod version;

pub use flags::{SlotFlags, TypeFlags};
pub use mangle::NameMangler;
pub use qname::{split_slot_qname, split_type_qname, QnameError};
pub use version::{ParseVersionError, Version};
