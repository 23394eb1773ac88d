use alloc::format;
use alloc::vec::Vec;

use super::GeneralProcessor;
use super::pointer::{PointerMark, read_mark};
use crate::context::DeserializationContext;
use crate::status::{CspError, CspResult};
use crate::type_traits::{
    MapTraits, PrimitiveKind, SequenceTraits, StructInfo, TraitsKind, TypeKey, TypeTraits,
};
use crate::value::{ObjectGraph, StructValue, Value};
use crate::version::InterfaceVersion;

impl GeneralProcessor {
    /// Reads the top-level struct of a data message.
    pub fn deserialize_body(
        &self,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<Value> {
        let key = ctx
            .declaring_type()
            .cloned()
            .ok_or_else(|| CspError::invalid("context has no declaring type"))?;
        ctx.pointers.clear();
        let wire = ctx.interface_version();
        ctx.enter()?;
        let result = self.read_object(&key, Some(wire), graph, ctx);
        ctx.leave();
        result
    }

    /// Reads a value laid out as described by `traits`.
    ///
    /// Objects behind pointer marks are added to `graph` and returned as
    /// [`Value::Ref`].
    pub fn deserialize(
        &self,
        traits: &TypeTraits,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<Value> {
        ctx.enter()?;
        let result = if traits.is_reference() {
            self.deserialize_reference(traits, graph, ctx)
        } else {
            self.deserialize_inline(traits, graph, ctx)
        };
        ctx.leave();
        result
    }

    fn deserialize_reference(
        &self,
        traits: &TypeTraits,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<Value> {
        if !ctx.is_allow_unmanaged_pointers() {
            return Err(CspError::PointerWhenNoAllowUnmanagedPointersSet);
        }
        if let TraitsKind::Primitive(kind) = traits.kind() {
            return Err(CspError::invalid(format!(
                "primitive {kind} cannot be a reference"
            )));
        }

        match read_mark(ctx)? {
            PointerMark::Null => Ok(Value::Null),
            PointerMark::BackReference(pointer) => {
                let id = ctx.pointers.get(pointer).ok_or_else(|| {
                    CspError::corrupted(format!("back-reference to unknown pointer {pointer}"))
                })?;
                log::trace!("back-reference {pointer} resolved to object {id}");
                Ok(Value::Ref(id))
            }
            PointerMark::Inline => {
                // Reserved first, so the object can refer to itself.
                let id = graph.reserve();
                if ctx.tracks_pointers() {
                    ctx.pointers.push(id);
                }
                let value = self.deserialize_inline(traits, graph, ctx)?;
                graph.replace(id, value);
                Ok(Value::Ref(id))
            }
        }
    }

    fn deserialize_inline(
        &self,
        traits: &TypeTraits,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<Value> {
        match traits.kind() {
            TraitsKind::Primitive(kind) => {
                let width = if ctx.is_size_of_integers_may_be_not_equal() && kind.is_integer() {
                    read_size_tag(ctx)?
                } else {
                    kind.size()
                };
                read_primitive(*kind, width, ctx)
            }
            TraitsKind::Array(sequence) | TraitsKind::Collection(sequence) => {
                self.read_sequence(sequence, graph, ctx)
            }
            TraitsKind::Map(map) => self.read_map(map, graph, ctx),
            TraitsKind::String(charset) => {
                let len = read_count(ctx)?;
                let bytes = ctx.buffer_mut().read_bytes(len)?;
                charset.decode(bytes).map(Value::String)
            }
            TraitsKind::Object(key) => self.read_object(key, None, graph, ctx),
        }
    }

    fn read_sequence(
        &self,
        sequence: &SequenceTraits,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<Value> {
        let count = match sequence.fixed_size() {
            Some(len) => len,
            None => read_count(ctx)?,
        };
        let mut items = Vec::with_capacity(count.min(ctx.buffer().remaining()));

        let element = sequence.element();
        if let TraitsKind::Primitive(kind) = element.kind()
            && !element.is_reference()
        {
            let width = if ctx.is_size_of_integers_may_be_not_equal() && kind.is_integer() {
                read_size_tag(ctx)?
            } else {
                kind.size()
            };
            for _ in 0..count {
                items.push(read_primitive(*kind, width, ctx)?);
            }
            return Ok(Value::Array(items));
        }

        for _ in 0..count {
            items.push(self.deserialize(element, graph, ctx)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(
        &self,
        map: &MapTraits,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<Value> {
        let count = read_count(ctx)?;
        let mut entries = Vec::with_capacity(count.min(ctx.buffer().remaining()));
        for _ in 0..count {
            let key = self.deserialize(map.key(), graph, ctx)?;
            let value = self.deserialize(map.value(), graph, ctx)?;
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }

    /// Reads an instance of `key` written in the `wire` interface version.
    ///
    /// Without a wire version, the version of the declared layout is assumed.
    fn read_object(
        &self,
        key: &TypeKey,
        wire: Option<InterfaceVersion>,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<Value> {
        let registry = ctx.registry();
        if let Some(processor) = registry.find(key.as_str()) {
            return processor.deserialize(graph, ctx);
        }
        let layout = registry
            .layout(key.as_str())
            .ok_or_else(|| CspError::NoSuchHandler(key.clone()))?;

        let wire = wire.unwrap_or(layout.version());
        let instance = self.read_struct(&layout, wire, graph, ctx)?;

        // Converted once the canonical fields of the wire version are read.
        if layout.version() == wire {
            return Ok(Value::Struct(instance));
        }
        let converter =
            ctx.version_converter()
                .ok_or_else(|| CspError::NotSupportedInterfaceVersion {
                    key: key.clone(),
                    found: wire,
                    expected: layout.version(),
                })?;
        converter
            .convert(&instance, wire, layout.version())
            .map(Value::Struct)
    }

    fn read_struct(
        &self,
        layout: &StructInfo,
        version: InterfaceVersion,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<StructValue> {
        let mut instance = StructValue::new(layout.key().clone()).with_version(version);
        if let Some(parent_key) = layout.parent() {
            let parent = self.read_parent(parent_key, graph, ctx)?;
            instance = instance.with_parent(parent);
        }

        let fields = instance.fields_mut();
        fields.reserve(layout.field_len());
        for field in layout.fields() {
            fields.push(self.deserialize(field.traits(), graph, ctx)?);
        }
        Ok(instance)
    }

    fn read_parent(
        &self,
        key: &TypeKey,
        graph: &mut ObjectGraph,
        ctx: &mut DeserializationContext<'_>,
    ) -> CspResult<StructValue> {
        let registry = ctx.registry();
        if let Some(processor) = registry.find(key.as_str()) {
            return match processor.deserialize(graph, ctx)? {
                Value::Struct(parent) => Ok(parent),
                other => Err(CspError::invalid(format!(
                    "processor of `{key}` returned {} instead of a struct",
                    other.type_name()
                ))),
            };
        }
        let layout = registry
            .layout(key.as_str())
            .ok_or_else(|| CspError::NoSuchHandler(key.clone()))?;
        self.read_struct(&layout, layout.version(), graph, ctx)
    }
}

fn read_count(ctx: &mut DeserializationContext<'_>) -> CspResult<usize> {
    let count = ctx.buffer_mut().read::<u64>()?;
    usize::try_from(count)
        .map_err(|_| CspError::corrupted(format!("count {count} exceeds the address space")))
}

fn read_size_tag(ctx: &mut DeserializationContext<'_>) -> CspResult<usize> {
    match ctx.buffer_mut().read::<u8>()? {
        tag @ (1 | 2 | 4 | 8) => Ok(usize::from(tag)),
        tag => Err(CspError::corrupted(format!("invalid integer size tag {tag}"))),
    }
}

/// Reads a scalar of `kind` stored in `width` octets.
///
/// Integers written with another width are converted, failing when the value
/// does not fit into `kind`.
fn read_primitive(
    kind: PrimitiveKind,
    width: usize,
    ctx: &mut DeserializationContext<'_>,
) -> CspResult<Value> {
    let buffer = ctx.buffer_mut();
    match kind {
        PrimitiveKind::Bool => return buffer.read_bool().map(Value::Bool),
        PrimitiveKind::F32 => return buffer.read::<f32>().map(Value::F32),
        PrimitiveKind::F64 => return buffer.read::<f64>().map(Value::F64),
        _ => {}
    }

    let overflow = |wide: &dyn core::fmt::Display| {
        CspError::corrupted(format!("{wide} does not fit into {kind}"))
    };

    if kind.is_signed() {
        let wide = match width {
            1 => i64::from(buffer.read::<i8>()?),
            2 => i64::from(buffer.read::<i16>()?),
            4 => i64::from(buffer.read::<i32>()?),
            _ => buffer.read::<i64>()?,
        };
        Ok(match kind {
            PrimitiveKind::I8 => Value::I8(i8::try_from(wide).map_err(|_| overflow(&wide))?),
            PrimitiveKind::I16 => Value::I16(i16::try_from(wide).map_err(|_| overflow(&wide))?),
            PrimitiveKind::I32 => Value::I32(i32::try_from(wide).map_err(|_| overflow(&wide))?),
            _ => Value::I64(wide),
        })
    } else {
        let wide = match width {
            1 => u64::from(buffer.read::<u8>()?),
            2 => u64::from(buffer.read::<u16>()?),
            4 => u64::from(buffer.read::<u32>()?),
            _ => buffer.read::<u64>()?,
        };
        Ok(match kind {
            PrimitiveKind::U8 => Value::U8(u8::try_from(wide).map_err(|_| overflow(&wide))?),
            PrimitiveKind::U16 => Value::U16(u16::try_from(wide).map_err(|_| overflow(&wide))?),
            PrimitiveKind::U32 => Value::U32(u32::try_from(wide).map_err(|_| overflow(&wide))?),
            _ => Value::U64(wide),
        })
    }
}
