//! Reflection errors.
//!
//! `ReflectError` carries the structured payload of a failure; `ErrorKind`
//! is its flat category for matching without string inspection. Build
//! errors through the factory functions in [`crate::errors`].

/// Result of a reflective operation.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Error raised by the registry, parsers, and dispatch layer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    /// Malformed type signature or dependency string.
    #[error("invalid {what} '{input}': {reason}")]
    Parse {
        what: &'static str,
        input: String,
        reason: String,
    },

    #[error("unknown pod: {name}")]
    UnknownPod { name: String },

    #[error("unknown type: {qname}")]
    UnknownType { qname: String },

    #[error("unknown slot: {qname}")]
    UnknownSlot { qname: String },

    #[error("facet not found: {qname}")]
    UnknownFacet { qname: String },

    /// Bad arguments: arity, duplicate registration, bad retype target.
    #[error("{message}")]
    Arg { message: String },

    #[error("{message}")]
    ReadOnly { message: String },

    #[error("not immutable: {signature}")]
    NotImmutable { signature: String },

    #[error("cannot cast {found} to {expected}")]
    Cast { expected: String, found: String },

    #[error("{message}")]
    Null { message: String },

    /// Facet decode failure.
    #[error("{message}")]
    Io { message: String },

    /// A declared native slot has no bound implementation.
    #[error("native not implemented: {qname}")]
    MissingNative { qname: String },

    #[error("{message}")]
    Unsupported { message: String },

    /// Failure raised by native code itself.
    #[error("{message}")]
    Native { message: String },
}

/// Flat category of a [`ReflectError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    UnknownPod,
    UnknownType,
    UnknownSlot,
    UnknownFacet,
    Arg,
    ReadOnly,
    NotImmutable,
    Cast,
    Null,
    Io,
    MissingNative,
    Unsupported,
    Native,
}

impl ReflectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::UnknownPod { .. } => ErrorKind::UnknownPod,
            Self::UnknownType { .. } => ErrorKind::UnknownType,
            Self::UnknownSlot { .. } => ErrorKind::UnknownSlot,
            Self::UnknownFacet { .. } => ErrorKind::UnknownFacet,
            Self::Arg { .. } => ErrorKind::Arg,
            Self::ReadOnly { .. } => ErrorKind::ReadOnly,
            Self::NotImmutable { .. } => ErrorKind::NotImmutable,
            Self::Cast { .. } => ErrorKind::Cast,
            Self::Null { .. } => ErrorKind::Null,
            Self::Io { .. } => ErrorKind::Io,
            Self::MissingNative { .. } => ErrorKind::MissingNative,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Native { .. } => ErrorKind::Native,
        }
    }

    /// True for lookup misses that `checked = false` turns into `None`.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnknownPod
                | ErrorKind::UnknownType
                | ErrorKind::UnknownSlot
                | ErrorKind::UnknownFacet
        )
    }
}
