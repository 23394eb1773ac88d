use alloc::format;

use super::{ContextConfig, FlagView, impl_context_accessors};
use crate::buffer::{CommittedBuffer, SerializationBuffer};
use crate::flags::{CommonFlags, DataFlags};
use crate::processing::{ProcessorRegistry, SerializationPointers, VersionConverter};
use crate::status::{CspError, CspResult};
use crate::type_traits::TypeKey;
use crate::version::{InterfaceVersion, ProtocolVersion};

/// State of one serialization call.
///
/// # Examples
///
/// ```
/// use csp_base::context::{ContextConfig, SerializationContext};
/// use csp_base::flags::CommonFlags;
/// use csp_base::processing::ProcessorRegistry;
///
/// let registry = ProcessorRegistry::new();
/// let config = ContextConfig {
///     common_flags: CommonFlags::BIG_ENDIAN,
///     ..ContextConfig::default()
/// };
/// let mut ctx = SerializationContext::new(&config, &registry).unwrap();
/// assert!(ctx.is_big_endian());
///
/// ctx.buffer_mut().write(7_u16).unwrap();
/// assert_eq!(ctx.commit().as_bytes(), [0, 7]);
/// ```
#[derive(Debug)]
pub struct SerializationContext<'a> {
    buffer: SerializationBuffer,
    protocol_version: ProtocolVersion,
    common_flags: CommonFlags,
    data_flags: DataFlags,
    declaring_type: Option<TypeKey>,
    interface_version: InterfaceVersion,
    flags: FlagView,
    registry: &'a ProcessorRegistry,
    converter: Option<&'a dyn VersionConverter>,
    depth: usize,
    max_depth: usize,
    pub(crate) pointers: SerializationPointers,
}

impl<'a> SerializationContext<'a> {
    /// Creates a context and its buffer.
    ///
    /// The buffer writes in the order selected by [`CommonFlags::BIG_ENDIAN`].
    pub fn new(config: &ContextConfig, registry: &'a ProcessorRegistry) -> CspResult<Self> {
        let mut buffer = SerializationBuffer::with_config(&config.buffer)?;
        buffer.apply_endianness(config.common_flags.endianness());

        Ok(Self {
            buffer,
            protocol_version: config.protocol_version,
            common_flags: config.common_flags,
            data_flags: config.data_flags,
            declaring_type: config.declaring_type.clone(),
            interface_version: config.interface_version,
            flags: FlagView::new(config.common_flags, config.data_flags),
            registry,
            converter: None,
            depth: 0,
            max_depth: config.max_depth,
            pointers: SerializationPointers::default(),
        })
    }

    /// Installs the hook converting structs of other interface versions.
    pub fn with_version_converter(mut self, converter: &'a dyn VersionConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Descends one nesting level, failing past [`ContextConfig::max_depth`].
    pub(crate) fn enter(&mut self) -> CspResult<()> {
        if self.depth >= self.max_depth {
            return Err(CspError::invalid(format!(
                "nesting deeper than {} levels",
                self.max_depth
            )));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn buffer(&self) -> &SerializationBuffer {
        &self.buffer
    }

    #[inline]
    pub fn buffer_mut(&mut self) -> &mut SerializationBuffer {
        &mut self.buffer
    }

    /// Finishes the call and hands out the written bytes.
    pub fn commit(self) -> CommittedBuffer {
        self.buffer.commit()
    }
}

impl_context_accessors!(SerializationContext);

// -----------------------------------------------------------------------------
// Tests
