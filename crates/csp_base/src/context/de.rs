use alloc::format;

use super::{ContextConfig, FlagView, impl_context_accessors};
use crate::buffer::DeserializationBuffer;
use crate::flags::{CommonFlags, DataFlags};
use crate::processing::{DeserializationPointers, ProcessorRegistry, VersionConverter};
use crate::status::{CspError, CspResult};
use crate::type_traits::TypeKey;
use crate::version::{InterfaceVersion, ProtocolVersion};

/// State of one deserialization call.
///
/// The buffer configuration of the [`ContextConfig`] is ignored: the context
/// reads the caller's bytes in place.
#[derive(Debug)]
pub struct DeserializationContext<'a> {
    buffer: DeserializationBuffer<'a>,
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
    pub(crate) pointers: DeserializationPointers,
}

impl<'a> DeserializationContext<'a> {
    /// Creates a context reading `data`.
    pub fn new(data: &'a [u8], config: &ContextConfig, registry: &'a ProcessorRegistry) -> Self {
        Self {
            buffer: DeserializationBuffer::with_endianness(data, config.common_flags.endianness()),
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
            pointers: DeserializationPointers::default(),
        }
    }

    /// Installs the hook converting structs to the runtime interface version.
    pub fn with_version_converter(mut self, converter: &'a dyn VersionConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Descends one nesting level, failing past [`ContextConfig::max_depth`].
    pub(crate) fn enter(&mut self) -> CspResult<()> {
        if self.depth >= self.max_depth {
            return Err(CspError::corrupted(format!(
                "data nested deeper than {} levels",
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
    pub fn buffer(&self) -> &DeserializationBuffer<'a> {
        &self.buffer
    }

    #[inline]
    pub fn buffer_mut(&mut self) -> &mut DeserializationBuffer<'a> {
        &mut self.buffer
    }
}

impl_context_accessors!(DeserializationContext);
