//! Reflective field access.

use crate::errors::{self, ReflectResult};
use crate::idx::SlotId;
use crate::registry::Registry;
use crate::slots::SlotEntry;
use crate::value::{ObjValue, Value};

impl Registry {
    /// Read a field. Static fields ignore `instance`.
    pub fn field_get(&self, field: SlotId, instance: Option<&Value>) -> ReflectResult<Value> {
        let entry = self.slot_entry(field);
        if entry.field_type().is_none() {
            return Err(errors::not_a_field(&entry.qname));
        }
        if entry.flags.is_static() {
            return Ok(self
                .inner
                .statics
                .read()
                .get(&field)
                .cloned()
                .unwrap_or(Value::Null));
        }
        let obj = self.field_receiver(&entry, instance)?;
        Ok(obj.get(&entry.exposed))
    }

    /// Write a field.
    ///
    /// A const field rejects every write while `check_const` is set, and
    /// otherwise accepts only immutable values. Every field of a const
    /// type also accepts only immutable values. Non-null values must fit
    /// the field type; null requires a nullable field.
    pub fn field_set(
        &self,
        field: SlotId,
        instance: Option<&Value>,
        value: Value,
        check_const: bool,
    ) -> ReflectResult<()> {
        let entry = self.slot_entry(field);
        let Some(of) = entry.field_type() else {
            return Err(errors::not_a_field(&entry.qname));
        };

        if entry.flags.is_const() {
            if check_const {
                return Err(errors::const_field(&entry.qname));
            }
            if !self.is_immutable(&value) {
                return Err(errors::const_field_mutable_value(&entry.qname));
            }
        } else if self.in_const_type(&entry, instance) && !self.is_immutable(&value) {
            return Err(errors::const_type_mutable_value(&entry.qname));
        }

        if value.is_null() {
            if !self.is_nullable(of) {
                return Err(errors::null_field(&entry.qname));
            }
        } else {
            let found = self.type_of(&value);
            if !self.fits(found, of) {
                return Err(errors::cast(&self.signature(of), &self.signature(found)));
            }
        }

        if entry.flags.is_static() {
            self.inner.statics.write().insert(field, value);
        } else {
            let obj = self.field_receiver(&entry, instance)?;
            obj.set(&entry.exposed, value);
        }
        Ok(())
    }

    fn in_const_type(&self, entry: &SlotEntry, instance: Option<&Value>) -> bool {
        self.type_flags(entry.parent).is_const()
            || instance
                .and_then(Value::as_obj)
                .is_some_and(|o| self.type_flags(o.ty()).is_const())
    }

    fn field_receiver<'v>(
        &self,
        entry: &SlotEntry,
        instance: Option<&'v Value>,
    ) -> ReflectResult<&'v ObjValue> {
        match instance {
            None | Some(Value::Null) => Err(errors::null_receiver(&entry.qname)),
            Some(Value::Obj(obj)) if self.is(obj.ty(), entry.parent) => Ok(obj),
            Some(other) => Err(errors::not_an_instance(
                &self.qname(entry.parent),
                &self.signature(self.type_of(other)),
            )),
        }
    }
}
