//! Reserved-word escaping for slot names.
//!
//! Native implementations are registered and looked up by an *exposed*
//! name. A slot whose declared name collides with a host reserved word is
//! exposed with a marker appended (`type` -> `type_`). Names that already
//! end in the marker get one more marker, which keeps the mapping
//! injective: no two declared names share an exposed name.

use std::borrow::Cow;
use std::collections::BTreeSet;

/// Rust keywords (strict, reserved, and weak) plus the pseudo-reserved
/// `self` used internally for receivers.
const RUST_RESERVED: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Configurable reserved-word table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameMangler {
    reserved: BTreeSet<String>,
    marker: char,
}

impl NameMangler {
    /// Build a mangler for an arbitrary host language.
    pub fn new<I, S>(reserved: I, marker: char) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
            marker,
        }
    }

    /// The default table: Rust's reserved words with a `_` marker.
    pub fn rust() -> Self {
        Self::new(RUST_RESERVED.iter().copied(), '_')
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Map a declared slot name to the name natives are bound under.
    pub fn expose<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.is_reserved(name) || name.ends_with(self.marker) {
            let mut out = String::with_capacity(name.len() + self.marker.len_utf8());
            out.push_str(name);
            out.push(self.marker);
            Cow::Owned(out)
        } else {
            Cow::Borrowed(name)
        }
    }

    /// Inverse of [`expose`](Self::expose), for names produced by it.
    pub fn declared<'a>(&self, exposed: &'a str) -> Cow<'a, str> {
        match exposed.strip_suffix(self.marker) {
            Some(stem) if self.is_reserved(stem) || stem.ends_with(self.marker) => {
                Cow::Borrowed(stem)
            }
            _ => Cow::Borrowed(exposed),
        }
    }
}

impl Default for NameMangler {
    fn default() -> Self {
        Self::rust()
    }
}
