//! Qualified-name splitting.
//!
//! Type qnames are `pod::Type`; slot qnames are `pod::Type.slot`. The slot
//! split happens on the first `.` after the `::`, so the pod name may not
//! contain `::` but the slot part is taken verbatim.

use std::fmt;

/// Error when a qualified name does not have the required shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QnameError {
    /// Missing `::`, or an empty pod or type name.
    Type(String),
    /// Missing `.` after the type qname, or an empty slot name.
    Slot(String),
}

impl fmt::Display for QnameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QnameError::Type(q) => {
                write!(f, "invalid type signature '{q}', use <pod>::<type>")
            }
            QnameError::Slot(q) => {
                write!(f, "invalid slot qname \"{q}\", use <pod>::<type>.<slot>")
            }
        }
    }
}

impl std::error::Error for QnameError {}

/// Split `pod::Type` on the first `::`.
pub fn split_type_qname(qname: &str) -> Result<(&str, &str), QnameError> {
    match qname.split_once("::") {
        Some((pod, name)) if !pod.is_empty() && !name.is_empty() => Ok((pod, name)),
        _ => Err(QnameError::Type(qname.to_string())),
    }
}

/// Split `pod::Type.slot` into (`pod::Type`, `slot`).
pub fn split_slot_qname(qname: &str) -> Result<(&str, &str), QnameError> {
    let err = || QnameError::Slot(qname.to_string());
    let colons = qname.find("::").ok_or_else(err)?;
    let after = colons + 2;
    let dot = qname[after..].find('.').ok_or_else(err)? + after;
    let (type_qname, slot) = (&qname[..dot], &qname[dot + 1..]);
    if slot.is_empty() || dot == after {
        return Err(err());
    }
    Ok((type_qname, slot))
}
