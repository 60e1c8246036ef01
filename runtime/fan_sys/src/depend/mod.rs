//! Pod dependency constraints.
//!
//! ```text
//! depend     := name ws+ constraint { "," ws* constraint }
//! constraint := version ws* [ "+" ws* | "-" ws* version ws* ]
//! version    := digits { "." digits }
//! ```
//!
//! A depend matches a version when any of its constraints does.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use fan_ir::Version;

use crate::errors::{self, ReflectResult};

/// One alternative of a [`Depend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependConstraint {
    version: Version,
    plus: bool,
    end: Option<Version>,
}

impl DependConstraint {
    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn is_simple(&self) -> bool {
        !self.plus && self.end.is_none()
    }

    pub fn is_plus(&self) -> bool {
        self.plus
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    pub fn end_version(&self) -> Option<&Version> {
        self.end.as_ref()
    }

    pub fn matches(&self, v: &Version) -> bool {
        if self.plus {
            return self.version <= *v;
        }
        if let Some(end) = &self.end {
            return self.version <= *v && (*end >= *v || end.is_prefix_of(v));
        }
        self.version.is_prefix_of(v)
    }
}

impl fmt::Display for DependConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)?;
        if self.plus {
            f.write_str("+")?;
        }
        if let Some(end) = &self.end {
            write!(f, "-{end}")?;
        }
        Ok(())
    }
}

/// A parsed pod dependency: a pod name and its accepted versions.
#[derive(Clone)]
pub struct Depend {
    name: String,
    constraints: Vec<DependConstraint>,
    rendered: OnceLock<String>,
}

impl Depend {
    /// Parse a depend string, raising on malformed input.
    pub fn parse(s: &str) -> ReflectResult<Self> {
        DependParser::new(s).parse()
    }

    /// Parse a depend string; when `checked` is false a malformed string
    /// yields `None`.
    pub fn from_str(s: &str, checked: bool) -> ReflectResult<Option<Self>> {
        match Self::parse(s) {
            Ok(d) => Ok(Some(d)),
            Err(_) if !checked => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of constraints.
    pub fn size(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[DependConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, index: usize) -> Option<&DependConstraint> {
        self.constraints.get(index)
    }

    pub fn version(&self, index: usize) -> Option<&Version> {
        self.constraint(index).map(DependConstraint::version)
    }

    pub fn is_simple(&self, index: usize) -> bool {
        self.constraint(index).is_some_and(DependConstraint::is_simple)
    }

    pub fn is_plus(&self, index: usize) -> bool {
        self.constraint(index).is_some_and(DependConstraint::is_plus)
    }

    pub fn is_range(&self, index: usize) -> bool {
        self.constraint(index).is_some_and(DependConstraint::is_range)
    }

    pub fn end_version(&self, index: usize) -> Option<&Version> {
        self.constraint(index).and_then(DependConstraint::end_version)
    }

    pub fn matches(&self, v: &Version) -> bool {
        self.constraints.iter().any(|c| c.matches(v))
    }

    /// Canonical rendering, `name v1,v2+,a-b`.
    pub fn to_str(&self) -> &str {
        self.rendered.get_or_init(|| {
            let alts: Vec<String> = self.constraints.iter().map(ToString::to_string).collect();
            format!("{} {}", self.name, alts.join(","))
        })
    }
}

impl fmt::Display for Depend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl fmt::Debug for Depend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Depend({})", self.to_str())
    }
}

impl PartialEq for Depend {
    fn eq(&self, other: &Self) -> bool {
        self.to_str() == other.to_str()
    }
}

impl Eq for Depend {}

impl Hash for Depend {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_str().hash(state);
    }
}

/// Character cursor over a depend string.
struct DependParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DependParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn cur(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn consume(&mut self) {
        self.pos += 1;
    }

    fn is_space(b: Option<u8>) -> bool {
        matches!(b, Some(b' ' | b'\t'))
    }

    fn consume_spaces(&mut self) {
        while Self::is_space(self.cur()) {
            self.consume();
        }
    }

    fn err(&self, reason: &str) -> crate::ReflectError {
        errors::depend_parse_error(self.input, reason)
    }

    fn parse(mut self) -> ReflectResult<Depend> {
        let name = self.name()?;
        let mut constraints = vec![self.constraint()?];
        while self.cur() == Some(b',') {
            self.consume();
            self.consume_spaces();
            constraints.push(self.constraint()?);
        }
        if self.pos != self.bytes.len() {
            return Err(self.err("unexpected trailing characters"));
        }
        tracing::trace!(depend = self.input, "parsed depend");
        Ok(Depend {
            name,
            constraints,
            rendered: OnceLock::new(),
        })
    }

    fn name(&mut self) -> ReflectResult<String> {
        let start = self.pos;
        while let Some(b) = self.cur() {
            if b == b' ' || b == b'\t' {
                break;
            }
            self.consume();
        }
        if self.pos == start {
            return Err(self.err("missing pod name"));
        }
        let name = self.input[start..self.pos].to_string();
        if !Self::is_space(self.cur()) {
            return Err(self.err("expected constraints"));
        }
        self.consume_spaces();
        Ok(name)
    }

    fn constraint(&mut self) -> ReflectResult<DependConstraint> {
        let version = self.version()?;
        self.consume_spaces();
        let mut plus = false;
        let mut end = None;
        match self.cur() {
            Some(b'+') => {
                plus = true;
                self.consume();
                self.consume_spaces();
            }
            Some(b'-') => {
                self.consume();
                self.consume_spaces();
                end = Some(self.version()?);
                self.consume_spaces();
            }
            _ => {}
        }
        Ok(DependConstraint { version, plus, end })
    }

    fn version(&mut self) -> ReflectResult<Version> {
        let mut segments = vec![self.segment()?];
        while self.cur() == Some(b'.') {
            self.consume();
            segments.push(self.segment()?);
        }
        Version::from_segments(segments).ok_or_else(|| self.err("empty version"))
    }

    fn segment(&mut self) -> ReflectResult<u32> {
        let start = self.pos;
        while self.cur().is_some_and(|b| b.is_ascii_digit()) {
            self.consume();
        }
        if self.pos == start {
            return Err(self.err("expected version digit"));
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| self.err("version segment out of range"))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
