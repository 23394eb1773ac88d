//! Per-call state of a serialization or deserialization.
//!
//! A context bundles the buffer, the protocol version, both flag sets, the
//! declaring type and interface version of a data message, and access to the
//! [`ProcessorRegistry`](crate::processing::ProcessorRegistry). Flags are
//! snapshotted at construction and never change afterwards.

// -----------------------------------------------------------------------------
// Modules

mod config;
mod de;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use config::ContextConfig;
pub use de::DeserializationContext;
pub use ser::SerializationContext;

use crate::flags::{CommonFlags, DataFlags};

// -----------------------------------------------------------------------------
// FlagView

/// Booleans derived once from the flag sets of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FlagView {
    bitness_32: bool,
    big_endian: bool,
    endianness_difference: bool,
    alignment_may_be_not_equal: bool,
    size_of_integers_may_be_not_equal: bool,
    allow_unmanaged_pointers: bool,
    check_recursive_pointers: bool,
    simply_assignable_tags_optimizations_are_turned_off: bool,
    check_of_recursive_pointers_while_maintaining_link_structure: bool,
}

impl FlagView {
    fn new(common: CommonFlags, data: DataFlags) -> Self {
        Self {
            bitness_32: common.contains(CommonFlags::BITNESS_32),
            big_endian: common.contains(CommonFlags::BIG_ENDIAN),
            endianness_difference: common.contains(CommonFlags::ENDIANNESS_DIFFERENCE),
            alignment_may_be_not_equal: data.contains(DataFlags::ALIGNMENT_MAY_BE_NOT_EQUAL),
            size_of_integers_may_be_not_equal: data
                .contains(DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL),
            allow_unmanaged_pointers: data.contains(DataFlags::ALLOW_UNMANAGED_POINTERS),
            check_recursive_pointers: data.contains(DataFlags::CHECK_RECURSIVE_POINTERS),
            simply_assignable_tags_optimizations_are_turned_off: data
                .contains(DataFlags::SIMPLY_ASSIGNABLE_TAGS_OPTIMIZATIONS_ARE_TURNED_OFF),
            check_of_recursive_pointers_while_maintaining_link_structure: data.contains(
                DataFlags::CHECK_OF_RECURSIVE_POINTERS_WHILE_MAINTAINING_LINK_STRUCTURE,
            ),
        }
    }
}

/// Generates the shared accessors of both contexts.
macro_rules! impl_context_accessors {
    ($ty:ident) => {
        impl<'a> $ty<'a> {
            #[inline]
            pub fn protocol_version(&self) -> $crate::version::ProtocolVersion {
                self.protocol_version
            }

            #[inline]
            pub fn common_flags(&self) -> $crate::flags::CommonFlags {
                self.common_flags
            }

            #[inline]
            pub fn data_flags(&self) -> $crate::flags::DataFlags {
                self.data_flags
            }

            /// The top-level struct type of a data message.
            #[inline]
            pub fn declaring_type(&self) -> Option<&$crate::type_traits::TypeKey> {
                self.declaring_type.as_ref()
            }

            /// Target interface version of the message.
            #[inline]
            pub fn interface_version(&self) -> $crate::version::InterfaceVersion {
                self.interface_version
            }

            #[inline]
            pub fn is_bitness_32(&self) -> bool {
                self.flags.bitness_32
            }

            #[inline]
            pub fn is_big_endian(&self) -> bool {
                self.flags.big_endian
            }

            #[inline]
            pub fn is_endianness_difference(&self) -> bool {
                self.flags.endianness_difference
            }

            #[inline]
            pub fn is_alignment_may_be_not_equal(&self) -> bool {
                self.flags.alignment_may_be_not_equal
            }

            #[inline]
            pub fn is_size_of_integers_may_be_not_equal(&self) -> bool {
                self.flags.size_of_integers_may_be_not_equal
            }

            #[inline]
            pub fn is_allow_unmanaged_pointers(&self) -> bool {
                self.flags.allow_unmanaged_pointers
            }

            #[inline]
            pub fn is_check_recursive_pointers(&self) -> bool {
                self.flags.check_recursive_pointers
            }

            #[inline]
            pub fn is_simply_assignable_tags_optimizations_are_turned_off(&self) -> bool {
                self.flags.simply_assignable_tags_optimizations_are_turned_off
            }

            #[inline]
            pub fn is_check_of_recursive_pointers_while_maintaining_link_structure(&self) -> bool {
                self.flags.check_of_recursive_pointers_while_maintaining_link_structure
            }

            /// Returns `true` if pointer identities are tracked in this call.
            #[inline]
            pub fn tracks_pointers(&self) -> bool {
                self.flags.check_recursive_pointers
                    || self.flags.check_of_recursive_pointers_while_maintaining_link_structure
            }

            /// Deepest nesting this call accepts.
            #[inline]
            pub fn max_depth(&self) -> usize {
                self.max_depth
            }

            #[inline]
            pub fn registry(&self) -> &'a $crate::processing::ProcessorRegistry {
                self.registry
            }

            #[inline]
            pub fn version_converter(
                &self,
            ) -> Option<&'a dyn $crate::processing::VersionConverter> {
                self.converter
            }
        }
    };
}

use impl_context_accessors;
