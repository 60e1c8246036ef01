//! The default facet decoder.
//!
//! ```text
//! facet   := qname [ "{" { field } "}" ]
//! field   := name "=" literal [ ";" ]
//! literal := "null" | "true" | "false" | int | float | string | qname "#"
//! ```
//!
//! An empty source is a bare instance of the facet type. Fields are set
//! with the const check off, so const facet fields may be initialized.

use crate::errors::{self, ReflectResult};
use crate::facets::FacetDecoder;
use crate::idx::TypeId;
use crate::registry::Registry;
use crate::value::Value;

/// Decodes the literal facet syntax.
#[derive(Copy, Clone, Debug, Default)]
pub struct LiteralDecoder;

impl FacetDecoder for LiteralDecoder {
    fn decode(&self, reg: &Registry, facet_type: TypeId, source: &str) -> ReflectResult<Value> {
        let source = source.trim();
        if source.is_empty() {
            return reg.alloc(facet_type);
        }
        LiteralParser::new(reg, source).facet(facet_type)
    }
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

struct LiteralParser<'a> {
    reg: &'a Registry,
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(reg: &'a Registry, src: &'a str) -> Self {
        Self {
            reg,
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn cur(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn consume(&mut self) {
        self.pos += 1;
    }

    fn skip_spaces(&mut self) {
        while self.cur().is_some_and(|b| b.is_ascii_whitespace()) {
            self.consume();
        }
    }

    fn err(&self, reason: &str) -> crate::ReflectError {
        errors::facet_parse_error(self.src, format!("{reason} (offset {})", self.pos))
    }

    fn expect(&mut self, b: u8) -> ReflectResult<()> {
        if self.cur() == Some(b) {
            self.consume();
            Ok(())
        } else {
            Err(self.err(&format!("expected '{}'", b as char)))
        }
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.cur().is_some_and(is_id_byte) {
            self.consume();
        }
        &self.src[start..self.pos]
    }

    /// `pod::Name`, after the first identifier has been read.
    fn qname_after(&mut self, pod: &'a str) -> ReflectResult<&'a str> {
        let start = self.pos - pod.len();
        self.expect(b':')?;
        self.expect(b':')?;
        if self.ident().is_empty() {
            return Err(self.err("expected type name"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn resolve(&self, qname: &str) -> ReflectResult<TypeId> {
        self.reg
            .find_type(qname, true)?
            .ok_or_else(|| errors::unknown_type(qname))
    }

    fn facet(mut self, facet_type: TypeId) -> ReflectResult<Value> {
        let pod = self.ident();
        if pod.is_empty() {
            return Err(self.err("expected facet type"));
        }
        let qname = self.qname_after(pod)?;
        let t = self.resolve(qname)?;
        if !self.reg.fits(t, facet_type) {
            return Err(errors::cast(
                &self.reg.signature(facet_type),
                &self.reg.signature(t),
            ));
        }
        let obj = self.reg.alloc(t)?;

        self.skip_spaces();
        if self.cur().is_none() {
            return Ok(obj);
        }
        self.expect(b'{')?;
        loop {
            self.skip_spaces();
            if self.cur() == Some(b'}') {
                self.consume();
                break;
            }
            let name = self.ident();
            if name.is_empty() {
                return Err(self.err("expected field name"));
            }
            self.skip_spaces();
            self.expect(b'=')?;
            self.skip_spaces();
            let value = self.literal()?;
            let field = self
                .reg
                .field(t, name, true)?
                .ok_or_else(|| errors::unknown_slot(&format!("{qname}.{name}")))?;
            self.reg.field_set(field, Some(&obj), value, false)?;
            self.skip_spaces();
            if self.cur() == Some(b';') {
                self.consume();
            }
        }
        self.skip_spaces();
        if self.cur().is_some() {
            return Err(self.err("unexpected trailing characters"));
        }
        Ok(obj)
    }

    fn literal(&mut self) -> ReflectResult<Value> {
        match self.cur() {
            Some(b'"') => self.string(),
            Some(b) if b == b'-' || b.is_ascii_digit() => self.number(),
            Some(b) if is_id_byte(b) => {
                let word = self.ident();
                match word {
                    "null" => Ok(Value::Null),
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => {
                        let qname = self.qname_after(word)?;
                        self.expect(b'#')?;
                        Ok(Value::Type(self.resolve(qname)?))
                    }
                }
            }
            _ => Err(self.err("expected literal")),
        }
    }

    fn number(&mut self) -> ReflectResult<Value> {
        let start = self.pos;
        if self.cur() == Some(b'-') {
            self.consume();
        }
        let mut float = false;
        while let Some(b) = self.cur() {
            if b == b'.' {
                float = true;
            } else if !b.is_ascii_digit() {
                break;
            }
            self.consume();
        }
        let text = &self.src[start..self.pos];
        if matches!(self.cur(), Some(b'f' | b'F')) {
            self.consume();
            float = true;
        }
        if float {
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.err("invalid float literal"))
        } else {
            text.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.err("invalid int literal"))
        }
    }

    fn string(&mut self) -> ReflectResult<Value> {
        self.expect(b'"')?;
        let mut buf = Vec::new();
        loop {
            match self.cur() {
                None => return Err(self.err("unterminated string")),
                Some(b'"') => {
                    self.consume();
                    break;
                }
                Some(b'\\') => {
                    self.consume();
                    let escaped = match self.cur() {
                        Some(b'"') => b'"',
                        Some(b'\\') => b'\\',
                        Some(b'n') => b'\n',
                        Some(b't') => b'\t',
                        _ => return Err(self.err("invalid escape")),
                    };
                    buf.push(escaped);
                    self.consume();
                }
                Some(b) => {
                    buf.push(b);
                    self.consume();
                }
            }
        }
        String::from_utf8(buf)
            .map(Value::from)
            .map_err(|_| self.err("invalid utf-8 in string"))
    }
}
