//! Method calling convention.
//!
//! Static methods and constructors resolve their native from the declaring
//! type's static table. Instance methods first look for an instance native
//! along the receiver's runtime inheritance, then fall back to the
//! declaring type's static table with the receiver prepended, which is how
//! primitives (`Int`, `Str`, ...) dispatch. A method parameterized onto a
//! composite type dispatches as its generic origin.

use std::sync::Arc;

use crate::errors::{self, ReflectResult};
use crate::idx::SlotId;
use crate::registry::Registry;
use crate::slots::{Param, SlotEntry, SlotKind};
use crate::value::{ListValue, Value};

/// Trim `args` to the declared maximum; fail below the minimum, which is
/// the count of params before the first one with a default.
fn check_args<'a>(qname: &str, params: &[Param], args: &'a [Value]) -> ReflectResult<&'a [Value]> {
    let min = params
        .iter()
        .position(Param::has_default)
        .unwrap_or(params.len());
    if args.len() < min {
        return Err(errors::too_few_arguments(qname, min, args.len()));
    }
    Ok(&args[..args.len().min(params.len())])
}

impl Registry {
    /// Invoke a method. `instance` is ignored by static methods and
    /// constructors.
    #[tracing::instrument(level = "debug", skip_all, fields(method = ?method, args = args.len()))]
    pub fn invoke(
        &self,
        method: SlotId,
        instance: Option<&Value>,
        args: &[Value],
    ) -> ReflectResult<Value> {
        let entry = self.slot_entry(method);
        let SlotKind::Method {
            params, generic_of, ..
        } = &entry.kind
        else {
            return Err(errors::not_a_method(&entry.qname));
        };
        let args = check_args(&entry.qname, params, args)?;
        let origin = match generic_of {
            Some(g) => self.slot_entry(*g),
            None => Arc::clone(&entry),
        };
        let natives = &self.inner.natives;

        if !entry.flags.has_receiver() {
            return match natives.static_fn(origin.parent, &origin.exposed) {
                Some(f) => f(self, args),
                None => Err(self.missing_native(&entry)),
            };
        }

        let receiver = match instance {
            Some(v) if !v.is_null() => v,
            _ => return Err(errors::null_receiver(&entry.qname)),
        };
        let runtime = self.type_of(receiver);
        for t in self.inheritance(runtime).iter() {
            if let Some(f) = natives.instance_fn(*t, &origin.exposed) {
                return f(self, receiver, args);
            }
        }
        if let Some(f) = natives.static_fn(origin.parent, &origin.exposed) {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(receiver.clone());
            full.extend_from_slice(args);
            return f(self, &full);
        }
        Err(self.missing_native(&entry))
    }

    fn missing_native(&self, entry: &SlotEntry) -> crate::ReflectError {
        tracing::error!(slot = %entry.qname, "no native implementation bound");
        errors::missing_native(&entry.qname)
    }

    /// Invoke on an explicit target.
    pub fn call_on(&self, method: SlotId, target: &Value, args: &[Value]) -> ReflectResult<Value> {
        self.invoke(method, Some(target), args)
    }

    /// Invoke with the receiver, if the method takes one, as the first
    /// argument.
    pub fn call(&self, method: SlotId, args: &[Value]) -> ReflectResult<Value> {
        let entry = self.slot_entry(method);
        if !entry.flags.has_receiver() {
            return self.invoke(method, None, args);
        }
        match args.split_first() {
            Some((receiver, rest)) => self.invoke(method, Some(receiver), rest),
            None => Err(errors::missing_receiver(&entry.qname)),
        }
    }

    /// [`call`](Self::call) with the arguments taken from a list.
    pub fn call_list(&self, method: SlotId, args: &ListValue) -> ReflectResult<Value> {
        self.call(method, &args.to_vec())
    }
}
