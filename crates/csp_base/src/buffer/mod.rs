//! Growable write buffer and fixed read buffer of the wire format.
//!
//! A [`SerializationBuffer`] is written through typed [`Scalar`] writes and
//! grows through its [`ResizeStrategy`] before every write. [`commit`] turns
//! it into a [`CommittedBuffer`]; the written bytes are then read back with a
//! [`DeserializationBuffer`].
//!
//! # Examples
//!
//! ```
//! use csp_base::buffer::{Endianness, SerializationBuffer};
//!
//! let mut buffer = SerializationBuffer::new();
//! buffer.apply_endianness(Endianness::Big);
//! buffer.write(1_i64).unwrap();
//! buffer.write(5_i16).unwrap();
//! buffer.write_slice(&[2_i32, 6]).unwrap();
//!
//! let committed = buffer.commit();
//! assert_eq!(committed.len(), 18);
//!
//! let mut reader = committed.reader();
//! assert_eq!(reader.read::<i64>().unwrap(), 1);
//! assert_eq!(reader.read::<i16>().unwrap(), 5);
//! assert_eq!(reader.read_vec::<i32>(2).unwrap(), [2, 6]);
//! ```
//!
//! [`commit`]: SerializationBuffer::commit

// -----------------------------------------------------------------------------
// Modules

mod de;
mod resize;
mod scalar;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use de::DeserializationBuffer;
pub use resize::{DoublingResizeStrategy, ResizeStrategy};
pub use scalar::Scalar;
pub use ser::{BufferConfig, CommittedBuffer, SerializationBuffer};

// -----------------------------------------------------------------------------
// Endianness

/// Byte order of multi-byte scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the running target.
    #[inline]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}
