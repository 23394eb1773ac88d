use alloc::format;
use alloc::vec::Vec;

use super::{Endianness, Scalar};
use crate::status::{CspError, CspResult};

/// A read cursor over caller supplied bytes.
///
/// Reads never grow anything: a read past the end fails with
/// [`CspError::DataCorrupted`] and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct DeserializationBuffer<'a> {
    data: &'a [u8],
    position: usize,
    order: Endianness,
}

impl<'a> DeserializationBuffer<'a> {
    /// Wraps `data`, reading little-endian until told otherwise.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_endianness(data, Endianness::default())
    }

    #[inline]
    pub fn with_endianness(data: &'a [u8], order: Endianness) -> Self {
        Self {
            data,
            position: 0,
            order,
        }
    }

    /// Changes the byte order of subsequent reads.
    #[inline]
    pub fn apply_endianness(&mut self, order: Endianness) {
        self.order = order;
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.order
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Octets left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    fn take(&mut self, len: usize) -> CspResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                CspError::corrupted(format!(
                    "reading {len} octets at offset {} exceeds the {} available",
                    self.position,
                    self.data.len()
                ))
            })?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Reads one scalar.
    pub fn read<T: Scalar>(&mut self) -> CspResult<T> {
        let bytes = self.take(T::SIZE)?;
        Ok(T::decode(self.order, bytes))
    }

    /// Reads a boolean octet, which must be `0` or `1`.
    pub fn read_bool(&mut self) -> CspResult<bool> {
        match self.read::<u8>()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CspError::corrupted(format!(
                "invalid boolean octet {other}"
            ))),
        }
    }

    /// Fills `out` with a packed run of scalars.
    pub fn read_into<T: Scalar>(&mut self, out: &mut [T]) -> CspResult<()> {
        let size = self.packed_size::<T>(out.len())?;
        let bytes = self.take(size)?;
        let order = self.order;
        for (value, raw) in out.iter_mut().zip(bytes.chunks_exact(T::SIZE)) {
            *value = T::decode(order, raw);
        }
        Ok(())
    }

    /// Reads a packed run of `count` scalars.
    pub fn read_vec<T: Scalar>(&mut self, count: usize) -> CspResult<Vec<T>> {
        let size = self.packed_size::<T>(count)?;
        let bytes = self.take(size)?;
        let order = self.order;
        Ok(bytes
            .chunks_exact(T::SIZE)
            .map(|raw| T::decode(order, raw))
            .collect())
    }

    /// Reads `len` raw octets.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> CspResult<&'a [u8]> {
        self.take(len)
    }

    fn packed_size<T: Scalar>(&self, count: usize) -> CspResult<usize> {
        T::SIZE
            .checked_mul(count)
            .ok_or_else(|| CspError::corrupted(format!("{count} elements overflow the address space")))
    }
}

// -----------------------------------------------------------------------------
// Tests
