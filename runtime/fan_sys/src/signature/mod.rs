//! Type signature parser.
//!
//! ```text
//! type  := (func | map | basic) "?"? { "[" "]" "?"? } "?"?
//! basic := pod "::" name
//! map   := "[" type ":" type "]"
//! func  := "|" [ type { "," type } ] "->" type "|"
//! ```
//!
//! Single pass with one byte of lookahead and no backtracking. Signatures
//! that do not end in `]` or `|` skip the parser: a trailing `?` recurses
//! on the prefix, anything else is a straight `pod::name` lookup.
//!
//! Lookup misses do not stop the parse, so a signature naming an unknown
//! type is still checked for grammar errors before `None` is returned.
//! Grammar errors take precedence over lookup errors: a checked parse
//! reports the first unresolved name only once the whole signature is
//! well formed.

use std::sync::Arc;

use crate::errors::{self, ReflectResult};
use crate::idx::TypeId;
use crate::registry::{Registry, Stats};

/// Identifier bytes. Non-ASCII bytes are accepted so that names may use
/// any alphanumeric characters.
fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn is_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_id_byte)
}

/// Parse `sig`, resolving names against `reg`.
pub(crate) fn parse(reg: &Registry, sig: &str, checked: bool) -> ReflectResult<Option<TypeId>> {
    if let Some(t) = reg.inner.sig_cache.read().get(sig) {
        Stats::bump(&reg.inner.stats.signature_hits);
        tracing::trace!(sig, "signature cache hit");
        return Ok(Some(*t));
    }
    Stats::bump(&reg.inner.stats.signature_parses);

    let resolved = if !sig.ends_with(']') && !sig.ends_with('|') {
        fast_path(reg, sig, checked)?
    } else {
        tracing::trace!(sig, "full signature parse");
        Parser::new(reg, sig, checked).parse()?
    };

    if let Some(t) = resolved {
        reg.inner.sig_cache.write().insert(Arc::from(sig), t);
    }
    Ok(resolved)
}

fn fast_path(reg: &Registry, sig: &str, checked: bool) -> ReflectResult<Option<TypeId>> {
    if let Some(prefix) = sig.strip_suffix('?') {
        return Ok(parse(reg, prefix, checked)?.map(|t| reg.nullable_of(t)));
    }
    if let Some((pod, name)) = sig.split_once("::") {
        if is_id(pod) && is_id(name) {
            tracing::trace!(sig, "fast signature lookup");
            return reg.find_in_pod(pod, name, checked);
        }
    }
    Parser::new(reg, sig, checked).parse()
}

/// `None` marks a name that did not resolve under `checked = false`.
type Partial = Option<TypeId>;

struct Parser<'a> {
    reg: &'a Registry,
    sig: &'a str,
    bytes: &'a [u8],
    pos: usize,
    checked: bool,
    /// First `pod::name` that did not resolve.
    miss: Option<(&'a str, &'a str)>,
}

impl<'a> Parser<'a> {
    fn new(reg: &'a Registry, sig: &'a str, checked: bool) -> Self {
        Self {
            reg,
            sig,
            bytes: sig.as_bytes(),
            pos: 0,
            checked,
            miss: None,
        }
    }

    fn cur(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn consume(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, b: u8) -> ReflectResult<()> {
        if self.cur() == Some(b) {
            self.consume();
            Ok(())
        } else {
            Err(self.err(&format!("expected '{}'", b as char)))
        }
    }

    fn err(&self, reason: &str) -> crate::ReflectError {
        let at = match self.cur() {
            Some(b) => format!("{reason} at '{}' (offset {})", b as char, self.pos),
            None => format!("{reason} at end"),
        };
        errors::parse_error(self.sig, at)
    }

    fn parse(mut self) -> ReflectResult<Option<TypeId>> {
        let t = self.load()?;
        if self.pos != self.bytes.len() {
            return Err(self.err("unexpected trailing characters"));
        }
        if let Some((pod, name)) = self.miss.filter(|_| self.checked) {
            self.reg.find_in_pod(pod, name, true)?;
        }
        Ok(t)
    }

    fn load(&mut self) -> ReflectResult<Partial> {
        let mut t = match self.cur() {
            Some(b'|') => self.load_func()?,
            Some(b'[') => {
                if self.is_foreign_escape() {
                    return Err(self.err("foreign types not allowed"));
                }
                self.load_map()?
            }
            _ => self.load_basic()?,
        };

        if self.cur() == Some(b'?') {
            self.consume();
            t = t.map(|t| self.reg.nullable_of(t));
        }
        while self.cur() == Some(b'[') {
            self.consume();
            self.expect(b']')?;
            t = t.map(|t| self.reg.list_of(t));
            if self.cur() == Some(b'?') {
                self.consume();
                t = t.map(|t| self.reg.nullable_of(t));
            }
        }
        if self.cur() == Some(b'?') {
            self.consume();
            t = t.map(|t| self.reg.nullable_of(t));
        }
        Ok(t)
    }

    /// `[java]foo.bar::Baz`: a bracketed identifier directly followed by `]`.
    fn is_foreign_escape(&self) -> bool {
        let mut i = self.pos + 1;
        while self.bytes.get(i).copied().is_some_and(is_id_byte) {
            i += 1;
        }
        i > self.pos + 1 && self.bytes.get(i) == Some(&b']')
    }

    fn load_map(&mut self) -> ReflectResult<Partial> {
        self.expect(b'[')?;
        let k = self.load()?;
        self.expect(b':')?;
        let v = self.load()?;
        self.expect(b']')?;
        Ok(k.zip(v).map(|(k, v)| self.reg.map_of(k, v)))
    }

    fn load_func(&mut self) -> ReflectResult<Partial> {
        self.expect(b'|')?;
        let mut params = Vec::new();
        let mut resolved = true;
        if !(self.cur() == Some(b'-') && self.peek() == Some(b'>')) {
            loop {
                match self.load()? {
                    Some(p) => params.push(p),
                    None => resolved = false,
                }
                if self.cur() == Some(b',') {
                    self.consume();
                    continue;
                }
                break;
            }
        }
        self.expect(b'-')?;
        self.expect(b'>')?;
        let ret = self.load()?;
        self.expect(b'|')?;
        Ok(ret
            .filter(|_| resolved)
            .map(|r| self.reg.func_of(&params, r)))
    }

    fn load_basic(&mut self) -> ReflectResult<Partial> {
        let pod = self.ident();
        if pod.is_empty() {
            return Err(self.err("expected pod name"));
        }
        if self.cur() != Some(b':') || self.peek() != Some(b':') {
            return Err(self.err("expected '::'"));
        }
        self.consume();
        self.consume();
        let name = self.ident();
        if name.is_empty() {
            return Err(self.err("expected type name"));
        }
        let found = self.reg.find_in_pod(pod, name, false)?;
        if found.is_none() && self.miss.is_none() {
            self.miss = Some((pod, name));
        }
        Ok(found)
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.cur().is_some_and(is_id_byte) {
            self.consume();
        }
        &self.sig[start..self.pos]
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
