//! Instantiation.

use super::Registry;
use crate::errors::{self, ReflectResult};
use crate::idx::TypeId;
use crate::slots::Param;
use crate::value::{ObjValue, Value};

impl Registry {
    /// A fresh instance of a concrete class with every field unset.
    pub fn alloc(&self, t: TypeId) -> ReflectResult<Value> {
        let entry = self.type_entry(self.non_nullable(t));
        let Some(class) = entry.as_class() else {
            return Err(errors::not_a_class(&self.signature(t)));
        };
        if class.flags.is_abstract() || class.flags.is_mixin() {
            return Err(errors::abstract_type(&class.qname));
        }
        Ok(Value::Obj(ObjValue::new(entry.id)))
    }

    /// Construct a default instance of `t`.
    ///
    /// Tries a public `make` whose parameters accept `args` (extra
    /// parameters must have defaults), then a public `defVal` field or
    /// method.
    pub fn make(&self, t: TypeId, args: &[Value]) -> ReflectResult<Value> {
        let flags = self.type_flags(t);
        if let Some(m) = self.method(t, "make", false)? {
            let entry = self.slot_entry(m);
            if entry.flags.is_public() {
                if flags.is_abstract() && !entry.flags.is_static() {
                    return Err(errors::abstract_type(&self.qname(t)));
                }
                let params = entry.params();
                let fits = args.len() == params.len()
                    || (args.len() < params.len()
                        && params.get(args.len()).is_some_and(Param::has_default));
                if fits {
                    return self.call(m, args);
                }
            }
        }
        if let Some(d) = self.slot(t, "defVal", false)? {
            let entry = self.slot_entry(d);
            if entry.flags.is_public() {
                return if entry.is_field() {
                    self.field_get(d, None)
                } else {
                    self.call(d, &[])
                };
            }
        }
        Err(errors::no_make(&self.qname(t)))
    }
}
