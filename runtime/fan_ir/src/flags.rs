//! Type and slot flag bitsets.
//!
//! Bit values match the fcode `FConst` table so flags read out of a pod
//! file can be used as-is via `from_bits_truncate`.

use bitflags::bitflags;

bitflags! {
    /// Flags declared on a type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct TypeFlags: u32 {
        const ABSTRACT  = 0x0000_0001;
        const CONST     = 0x0000_0002;
        const ENUM      = 0x0000_0008;
        const FACET     = 0x0000_0010;
        const FINAL     = 0x0000_0020;
        const INTERNAL  = 0x0000_0080;
        const MIXIN     = 0x0000_0100;
        const NATIVE    = 0x0000_0200;
        const PUBLIC    = 0x0000_2000;
        const SYNTHETIC = 0x0002_0000;
    }
}

impl TypeFlags {
    #[inline]
    pub const fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    #[inline]
    pub const fn is_const(self) -> bool {
        self.contains(Self::CONST)
    }

    #[inline]
    pub const fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }

    #[inline]
    pub const fn is_facet(self) -> bool {
        self.contains(Self::FACET)
    }

    #[inline]
    pub const fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    #[inline]
    pub const fn is_internal(self) -> bool {
        self.contains(Self::INTERNAL)
    }

    #[inline]
    pub const fn is_mixin(self) -> bool {
        self.contains(Self::MIXIN)
    }

    #[inline]
    pub const fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    #[inline]
    pub const fn is_synthetic(self) -> bool {
        self.contains(Self::SYNTHETIC)
    }

    /// A class is anything that is neither a mixin nor an enum.
    #[inline]
    pub const fn is_class(self) -> bool {
        !self.intersects(Self::ENUM.union(Self::MIXIN))
    }
}

bitflags! {
    /// Flags declared on a field or method.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct SlotFlags: u32 {
        const ABSTRACT  = 0x0000_0001;
        const CONST     = 0x0000_0002;
        const CTOR      = 0x0000_0004;
        const ENUM      = 0x0000_0008;
        const GETTER    = 0x0000_0040;
        const INTERNAL  = 0x0000_0080;
        const NATIVE    = 0x0000_0200;
        const OVERRIDE  = 0x0000_0400;
        const PRIVATE   = 0x0000_0800;
        const PROTECTED = 0x0000_1000;
        const PUBLIC    = 0x0000_2000;
        const SETTER    = 0x0000_4000;
        const STATIC    = 0x0000_8000;
        const STORAGE   = 0x0001_0000;
        const SYNTHETIC = 0x0002_0000;
        const VIRTUAL   = 0x0004_0000;
    }
}

impl SlotFlags {
    /// Slots invoked without an implicit receiver.
    pub const NO_RECEIVER: Self = Self::STATIC.union(Self::CTOR);

    #[inline]
    pub const fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    #[inline]
    pub const fn is_const(self) -> bool {
        self.contains(Self::CONST)
    }

    #[inline]
    pub const fn is_ctor(self) -> bool {
        self.contains(Self::CTOR)
    }

    #[inline]
    pub const fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }

    #[inline]
    pub const fn is_internal(self) -> bool {
        self.contains(Self::INTERNAL)
    }

    #[inline]
    pub const fn is_native(self) -> bool {
        self.contains(Self::NATIVE)
    }

    #[inline]
    pub const fn is_override(self) -> bool {
        self.contains(Self::OVERRIDE)
    }

    #[inline]
    pub const fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    #[inline]
    pub const fn is_protected(self) -> bool {
        self.contains(Self::PROTECTED)
    }

    #[inline]
    pub const fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    #[inline]
    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    #[inline]
    pub const fn is_synthetic(self) -> bool {
        self.contains(Self::SYNTHETIC)
    }

    #[inline]
    pub const fn is_virtual(self) -> bool {
        self.contains(Self::VIRTUAL)
    }

    /// Getter or setter method generated for a field.
    #[inline]
    pub const fn is_accessor(self) -> bool {
        self.intersects(Self::GETTER.union(Self::SETTER))
    }

    /// True for constructors and static methods, which take no receiver.
    #[inline]
    pub const fn has_receiver(self) -> bool {
        !self.intersects(Self::NO_RECEIVER)
    }
}
