use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::{DeserializationBuffer, DoublingResizeStrategy, Endianness, ResizeStrategy, Scalar};
use crate::status::{CspError, CspResult};

// -----------------------------------------------------------------------------
// BufferConfig

/// Creation parameters of a [`SerializationBuffer`].
///
/// The resize strategy is not part of the serialized form, deserialized
/// configurations use [`DoublingResizeStrategy`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferConfig {
    /// Capacity allocated up front.
    pub initial_capacity: usize,
    /// Prefer storage that is cheap to hand over to native I/O.
    ///
    /// Only a hint, the written bytes are identical either way.
    pub direct: bool,
    #[cfg_attr(feature = "serde", serde(skip, default = "default_strategy"))]
    pub strategy: Arc<dyn ResizeStrategy>,
}

impl BufferConfig {
    /// Default initial capacity in octets.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Replaces the resize strategy.
    pub fn with_strategy(mut self, strategy: impl ResizeStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }
}

fn default_strategy() -> Arc<dyn ResizeStrategy> {
    Arc::new(DoublingResizeStrategy)
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_CAPACITY,
            direct: false,
            strategy: default_strategy(),
        }
    }
}

// -----------------------------------------------------------------------------
// SerializationBuffer

/// A growable write cursor.
///
/// Every write grows the storage first when it would exceed the capacity, so
/// writes only fail when memory cannot be obtained.
#[derive(Debug)]
pub struct SerializationBuffer {
    // `data.len()` is the write cursor.
    data: Vec<u8>,
    capacity: usize,
    order: Endianness,
    direct: bool,
    strategy: Arc<dyn ResizeStrategy>,
}

impl SerializationBuffer {
    /// Creates a buffer with the default configuration.
    pub fn new() -> Self {
        let config = BufferConfig::default();
        Self {
            data: Vec::with_capacity(config.initial_capacity),
            capacity: config.initial_capacity,
            order: Endianness::default(),
            direct: config.direct,
            strategy: config.strategy,
        }
    }

    /// Creates a buffer from `config`.
    ///
    /// Fails with [`CspError::NoMemory`] if the initial capacity cannot be allocated.
    pub fn with_config(config: &BufferConfig) -> CspResult<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(config.initial_capacity)
            .map_err(|_| CspError::NoMemory {
                required: config.initial_capacity,
            })?;
        Ok(Self {
            data,
            capacity: config.initial_capacity,
            order: Endianness::default(),
            direct: config.direct,
            strategy: config.strategy.clone(),
        })
    }

    /// Changes the byte order of subsequent writes.
    ///
    /// Bytes already written are left untouched.
    #[inline]
    pub fn apply_endianness(&mut self, order: Endianness) {
        self.order = order;
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.order
    }

    /// Current write position.
    #[inline]
    pub fn position(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        self.direct
    }

    /// The bytes written so far.
    #[inline]
    pub fn written(&self) -> &[u8] {
        &self.data
    }

    fn ensure(&mut self, adding: usize) -> CspResult<()> {
        let position = self.data.len();
        let required = position
            .checked_add(adding)
            .ok_or(CspError::NoMemory { required: usize::MAX })?;
        if required <= self.capacity {
            return Ok(());
        }

        let new_capacity = self.strategy.calculate_new_size(self.capacity, required)?;
        if new_capacity < required {
            return Err(CspError::invalid(format!(
                "resize strategy returned {new_capacity} for a required size of {required}"
            )));
        }
        self.data
            .try_reserve_exact(new_capacity - position)
            .map_err(|_| CspError::NoMemory {
                required: new_capacity,
            })?;

        log::trace!("serialization buffer grows from {} to {new_capacity}", self.capacity);
        self.capacity = new_capacity;
        Ok(())
    }

    /// Appends one scalar.
    pub fn write<T: Scalar>(&mut self, value: T) -> CspResult<()> {
        self.ensure(T::SIZE)?;
        let start = self.data.len();
        self.data.resize(start + T::SIZE, 0);
        value.encode(self.order, &mut self.data[start..]);
        Ok(())
    }

    /// Appends a packed run of scalars.
    pub fn write_slice<T: Scalar>(&mut self, values: &[T]) -> CspResult<()> {
        let size = T::SIZE
            .checked_mul(values.len())
            .ok_or(CspError::NoMemory { required: usize::MAX })?;
        self.ensure(size)?;
        let start = self.data.len();
        self.data.resize(start + size, 0);
        for (value, out) in values
            .iter()
            .zip(self.data[start..].chunks_exact_mut(T::SIZE))
        {
            value.encode(self.order, out);
        }
        Ok(())
    }

    /// Appends raw octets.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> CspResult<()> {
        self.ensure(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends a boolean as one octet, `1` or `0`.
    #[inline]
    pub fn write_bool(&mut self, value: bool) -> CspResult<()> {
        self.write(u8::from(value))
    }

    /// Freezes the written length and switches to read mode.
    pub fn commit(self) -> CommittedBuffer {
        CommittedBuffer {
            data: self.data,
            order: self.order,
            direct: self.direct,
        }
    }
}

impl Default for SerializationBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// CommittedBuffer

/// A finished, read-only byte region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedBuffer {
    data: Vec<u8>,
    order: Endianness,
    direct: bool,
}

impl CommittedBuffer {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte order in effect when the buffer was committed.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.order
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        self.direct
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// A read cursor positioned at the first octet.
    pub fn reader(&self) -> DeserializationBuffer<'_> {
        DeserializationBuffer::with_endianness(&self.data, self.order)
    }
}

// -----------------------------------------------------------------------------
// Tests
