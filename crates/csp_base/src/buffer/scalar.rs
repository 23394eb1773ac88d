use core::fmt::Debug;
use core::mem::size_of;

use super::Endianness;

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width value that buffers read and write directly.
///
/// Implemented for all integer widths and both float widths. Booleans are
/// written as `u8` by the processor.
pub trait Scalar: sealed::Sealed + Copy + Debug + PartialEq + 'static {
    /// Width on the wire, in octets.
    const SIZE: usize;

    /// Writes `self` into the first [`Self::SIZE`] octets of `out`.
    ///
    /// `out` must be at least [`Self::SIZE`] octets long.
    fn encode(self, order: Endianness, out: &mut [u8]);

    /// Reads a value from the first [`Self::SIZE`] octets of `bytes`.
    ///
    /// `bytes` must be at least [`Self::SIZE`] octets long.
    fn decode(order: Endianness, bytes: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl Scalar for $ty {
            const SIZE: usize = size_of::<$ty>();

            #[inline]
            fn encode(self, order: Endianness, out: &mut [u8]) {
                let raw = match order {
                    Endianness::Big => self.to_be_bytes(),
                    Endianness::Little => self.to_le_bytes(),
                };
                out[..Self::SIZE].copy_from_slice(&raw);
            }

            #[inline]
            fn decode(order: Endianness, bytes: &[u8]) -> Self {
                let mut raw = [0_u8; size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                match order {
                    Endianness::Big => <$ty>::from_be_bytes(raw),
                    Endianness::Little => <$ty>::from_le_bytes(raw),
                }
            }
        }
    )*};
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

// -----------------------------------------------------------------------------
// Tests
