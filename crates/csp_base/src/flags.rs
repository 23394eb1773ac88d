//! Flag sets that parametrize layout decisions.
//!
//! [`CommonFlags`] describe the originating and local execution environment,
//! [`DataFlags`] are declared per struct definition. A context takes a
//! snapshot of both when it is created.

use bitflags::bitflags;

use crate::buffer::Endianness;

bitflags! {
    /// Session wide flags describing the execution environment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CommonFlags: u32 {
        /// The originating process uses 32 bit pointers.
        const BITNESS_32                = 0x1;
        /// Multi-byte values are big-endian on the wire.
        const BIG_ENDIAN                = 0x2;
        /// The wire byte order differs from the originating process.
        const ENDIANNESS_DIFFERENCE     = 0x4;
    }
}

impl CommonFlags {
    /// Flags describing the running process when it writes in `order`.
    ///
    /// # Examples
    ///
    /// ```
    /// use csp_base::buffer::Endianness;
    /// use csp_base::flags::CommonFlags;
    ///
    /// let flags = CommonFlags::local(Endianness::native());
    /// assert!(!flags.contains(CommonFlags::ENDIANNESS_DIFFERENCE));
    /// assert_eq!(flags.endianness(), Endianness::native());
    /// ```
    pub fn local(order: Endianness) -> Self {
        let mut flags = CommonFlags::empty();
        flags.set(CommonFlags::BITNESS_32, cfg!(target_pointer_width = "32"));
        flags.set(CommonFlags::BIG_ENDIAN, order == Endianness::Big);
        flags.set(
            CommonFlags::ENDIANNESS_DIFFERENCE,
            order != Endianness::native(),
        );
        flags
    }

    /// Byte order selected by [`CommonFlags::BIG_ENDIAN`].
    #[inline]
    pub const fn endianness(self) -> Endianness {
        if self.contains(CommonFlags::BIG_ENDIAN) {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

bitflags! {
    /// Per struct definition flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DataFlags: u32 {
        /// Field alignment of both sides may differ.
        const ALIGNMENT_MAY_BE_NOT_EQUAL                                = 0x1;
        /// Integer widths of both sides may differ, integers carry a size tag.
        const SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL                         = 0x2;
        /// Reference fields may be serialized.
        const ALLOW_UNMANAGED_POINTERS                                  = 0x4;
        /// Repeated references are written as back-references.
        const CHECK_RECURSIVE_POINTERS                                  = 0x8;
        /// Disables the bulk copy of simply assignable structs.
        const SIMPLY_ASSIGNABLE_TAGS_OPTIMIZATIONS_ARE_TURNED_OFF       = 0x10;
        /// Like `CHECK_RECURSIVE_POINTERS`, keeping the link structure of the graph.
        const CHECK_OF_RECURSIVE_POINTERS_WHILE_MAINTAINING_LINK_STRUCTURE = 0x20;
    }
}

impl DataFlags {
    /// Returns `true` if reference identities are tracked during a call.
    #[inline]
    pub const fn tracks_pointers(self) -> bool {
        self.intersects(
            DataFlags::CHECK_RECURSIVE_POINTERS
                .union(DataFlags::CHECK_OF_RECURSIVE_POINTERS_WHILE_MAINTAINING_LINK_STRUCTURE),
        )
    }
}

// -----------------------------------------------------------------------------
// Tests
