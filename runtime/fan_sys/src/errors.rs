//! Centralized error constructors.
//!
//! Every failure raised by the runtime is built here, so message wording
//! lives in one place.

pub use crate::error::{ErrorKind, ReflectError, ReflectResult};

// Parse Errors

pub fn parse_error(input: &str, reason: impl Into<String>) -> ReflectError {
    ReflectError::Parse {
        what: "type signature",
        input: input.to_string(),
        reason: reason.into(),
    }
}

pub fn depend_parse_error(input: &str, reason: impl Into<String>) -> ReflectError {
    ReflectError::Parse {
        what: "depend",
        input: input.to_string(),
        reason: reason.into(),
    }
}

pub fn facet_parse_error(input: &str, reason: impl Into<String>) -> ReflectError {
    ReflectError::Parse {
        what: "facet",
        input: input.to_string(),
        reason: reason.into(),
    }
}

// Lookup Errors

pub fn unknown_pod(name: &str) -> ReflectError {
    ReflectError::UnknownPod {
        name: name.to_string(),
    }
}

pub fn unknown_type(qname: &str) -> ReflectError {
    ReflectError::UnknownType {
        qname: qname.to_string(),
    }
}

pub fn unknown_slot(qname: &str) -> ReflectError {
    ReflectError::UnknownSlot {
        qname: qname.to_string(),
    }
}

pub fn unknown_facet(qname: &str) -> ReflectError {
    ReflectError::UnknownFacet {
        qname: qname.to_string(),
    }
}

// Registration Errors

pub fn duplicate_pod(name: &str) -> ReflectError {
    ReflectError::Arg {
        message: format!("duplicate pod name: {name}"),
    }
}

pub fn duplicate_type(qname: &str) -> ReflectError {
    ReflectError::Arg {
        message: format!("duplicate type name: {qname}"),
    }
}

pub fn duplicate_slot(qname: &str) -> ReflectError {
    ReflectError::Arg {
        message: format!("duplicate slot name: {qname}"),
    }
}

pub fn invalid_slot_name(type_qname: &str, name: &str) -> ReflectError {
    ReflectError::Arg {
        message: format!("invalid slot name '{name}' on {type_qname}"),
    }
}

pub fn invalid_slot_qname(qname: &str, cause: &fan_ir::QnameError) -> ReflectError {
    ReflectError::Arg {
        message: format!("{cause}: {qname}"),
    }
}

pub fn type_finalized(qname: &str) -> ReflectError {
    ReflectError::Arg {
        message: format!("type {qname} already reflected, cannot add slots"),
    }
}

pub fn not_a_class(signature: &str) -> ReflectError {
    ReflectError::Unsupported {
        message: format!("{signature} is not a declared class"),
    }
}

// Call Errors

pub fn too_few_arguments(qname: &str, min: usize, got: usize) -> ReflectError {
    ReflectError::Arg {
        message: format!("too few arguments to {qname}: {got} < {min}"),
    }
}

pub fn missing_receiver(qname: &str) -> ReflectError {
    ReflectError::Arg {
        message: format!("{qname} is an instance method, receiver required"),
    }
}

pub fn null_receiver(qname: &str) -> ReflectError {
    ReflectError::Null {
        message: format!("null receiver for {qname}"),
    }
}

pub fn trap_arity(name: &str, got: usize) -> ReflectError {
    ReflectError::Arg {
        message: format!("invalid number of args to get or set field '{name}': {got}"),
    }
}

pub fn not_a_method(qname: &str) -> ReflectError {
    ReflectError::Cast {
        expected: "sys::Method".to_string(),
        found: format!("field {qname}"),
    }
}

pub fn not_a_field(qname: &str) -> ReflectError {
    ReflectError::Cast {
        expected: "sys::Field".to_string(),
        found: format!("method {qname}"),
    }
}

pub fn missing_native(qname: &str) -> ReflectError {
    ReflectError::MissingNative {
        qname: qname.to_string(),
    }
}

pub fn native_error(message: impl Into<String>) -> ReflectError {
    ReflectError::Native {
        message: message.into(),
    }
}

pub fn index_out_of_bounds(index: i64, size: usize) -> ReflectError {
    ReflectError::Native {
        message: format!("index {index} out of bounds for size {size}"),
    }
}

// Field Errors

pub fn const_field(qname: &str) -> ReflectError {
    ReflectError::ReadOnly {
        message: format!("cannot set const field {qname}"),
    }
}

pub fn const_field_mutable_value(qname: &str) -> ReflectError {
    ReflectError::ReadOnly {
        message: format!("cannot set const field {qname} with mutable value"),
    }
}

pub fn const_type_mutable_value(qname: &str) -> ReflectError {
    ReflectError::ReadOnly {
        message: format!("field {qname} of a const type requires an immutable value"),
    }
}

pub fn read_only_list() -> ReflectError {
    ReflectError::ReadOnly {
        message: "list is read-only".to_string(),
    }
}

pub fn not_immutable(signature: &str) -> ReflectError {
    ReflectError::NotImmutable {
        signature: signature.to_string(),
    }
}

pub fn null_field(qname: &str) -> ReflectError {
    ReflectError::Null {
        message: format!("cannot set non-nullable field {qname} to null"),
    }
}

pub fn not_an_instance(qname: &str, found: &str) -> ReflectError {
    ReflectError::Cast {
        expected: qname.to_string(),
        found: found.to_string(),
    }
}

// Type Errors

pub fn cast(expected: &str, found: &str) -> ReflectError {
    ReflectError::Cast {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

pub fn null_cast(expected: &str) -> ReflectError {
    ReflectError::Null {
        message: format!("cannot coerce null to non-nullable {expected}"),
    }
}

// Generic Errors

pub fn not_generic(signature: &str) -> ReflectError {
    ReflectError::Unsupported {
        message: format!("{signature} is not generic"),
    }
}

pub fn missing_binding(master: &str, letter: char) -> ReflectError {
    ReflectError::Arg {
        message: format!("{master}.parameterize: missing binding for {letter}"),
    }
}

pub fn not_a_func_type(signature: &str) -> ReflectError {
    ReflectError::Arg {
        message: format!("not a func type: {signature}"),
    }
}

pub fn too_many_bound(arity: usize, got: usize) -> ReflectError {
    ReflectError::Arg {
        message: format!("too many bound args: {got} > {arity}"),
    }
}

// Instantiation Errors

pub fn abstract_type(qname: &str) -> ReflectError {
    ReflectError::Unsupported {
        message: format!("cannot instantiate abstract class: {qname}"),
    }
}

pub fn no_make(qname: &str) -> ReflectError {
    ReflectError::Arg {
        message: format!("type missing 'make' or 'defVal' slots: {qname}"),
    }
}

// Facet Errors

pub fn facet_decode(qname: &str, cause: &ReflectError) -> ReflectError {
    ReflectError::Io {
        message: format!("cannot decode facet {qname}: {cause}"),
    }
}
