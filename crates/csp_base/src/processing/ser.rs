use alloc::format;

use super::pointer::{PointerMark, write_mark};
use super::{GeneralProcessor, mismatch};
use crate::buffer::Scalar;
use crate::context::SerializationContext;
use crate::status::{CspError, CspResult};
use crate::type_traits::{
    Charset, MapTraits, PrimitiveKind, SequenceTraits, StructInfo, TraitsKind, TypeKey,
    TypeTraits,
};
use crate::value::{ObjectGraph, StructValue, Value};
use crate::version::InterfaceVersion;

impl GeneralProcessor {
    /// Writes the top-level struct of a data message.
    ///
    /// The value must be an instance of the context's declaring type. The
    /// identity table of the context starts empty.
    pub fn serialize_body(
        &self,
        value: &Value,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        let key = ctx
            .declaring_type()
            .cloned()
            .ok_or_else(|| CspError::invalid("context has no declaring type"))?;
        ctx.pointers.clear();
        let target = ctx.interface_version();
        ctx.enter()?;
        let result = self.write_object(value, &key, Some(target), graph, ctx);
        ctx.leave();
        result
    }

    /// Writes `value` laid out as described by `traits`.
    ///
    /// Reference nodes accept [`Value::Null`] or a [`Value::Ref`] into `graph`.
    ///
    /// # Examples
    ///
    /// ```
    /// use csp_base::context::{ContextConfig, SerializationContext};
    /// use csp_base::flags::DataFlags;
    /// use csp_base::processing::{GeneralProcessor, ProcessorRegistry};
    /// use csp_base::type_traits::{PrimitiveKind, TypeTraits};
    /// use csp_base::value::{ObjectGraph, Value};
    ///
    /// let registry = ProcessorRegistry::new();
    /// let config = ContextConfig {
    ///     data_flags: DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL,
    ///     ..ContextConfig::default()
    /// };
    /// let mut ctx = SerializationContext::new(&config, &registry).unwrap();
    ///
    /// let traits = TypeTraits::primitive(PrimitiveKind::I32);
    /// GeneralProcessor
    ///     .serialize(&Value::I32(7), &traits, &ObjectGraph::new(), &mut ctx)
    ///     .unwrap();
    ///
    /// // Size tag, then the value.
    /// assert_eq!(ctx.commit().as_bytes(), [4, 7, 0, 0, 0]);
    /// ```
    pub fn serialize(
        &self,
        value: &Value,
        traits: &TypeTraits,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        ctx.enter()?;
        let result = if traits.is_reference() {
            self.serialize_reference(value, traits, graph, ctx)
        } else {
            self.serialize_inline(value, traits, graph, ctx)
        };
        ctx.leave();
        result
    }

    fn serialize_reference(
        &self,
        value: &Value,
        traits: &TypeTraits,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        if !ctx.is_allow_unmanaged_pointers() {
            return Err(CspError::PointerWhenNoAllowUnmanagedPointersSet);
        }
        if let TraitsKind::Primitive(kind) = traits.kind() {
            return Err(CspError::invalid(format!(
                "primitive {kind} cannot be a reference"
            )));
        }

        let id = match value {
            Value::Null => return write_mark(ctx, PointerMark::Null),
            Value::Ref(id) => *id,
            other => return Err(mismatch("a reference", other)),
        };
        let target = graph
            .get(id)
            .ok_or_else(|| CspError::invalid(format!("dangling reference {id}")))?;
        if matches!(target, Value::Null | Value::Ref(_)) {
            return Err(CspError::invalid(format!(
                "reference {id} does not point to an object"
            )));
        }

        if ctx.tracks_pointers()
            && let Some(pointer) = ctx.pointers.check(id)
        {
            log::trace!("object {id} written as back-reference {pointer}");
            return write_mark(ctx, PointerMark::BackReference(pointer));
        }
        write_mark(ctx, PointerMark::Inline)?;
        self.serialize_inline(target, traits, graph, ctx)
    }

    fn serialize_inline(
        &self,
        value: &Value,
        traits: &TypeTraits,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        match traits.kind() {
            TraitsKind::Primitive(kind) => {
                let tagged = ctx.is_size_of_integers_may_be_not_equal() && kind.is_integer();
                write_primitive(value, *kind, tagged, ctx)
            }
            TraitsKind::Array(sequence) | TraitsKind::Collection(sequence) => match value {
                Value::Array(items) => self.write_sequence(items, sequence, graph, ctx),
                other => Err(mismatch("a sequence", other)),
            },
            TraitsKind::Map(map) => match value {
                Value::Map(entries) => self.write_map(entries, map, graph, ctx),
                other => Err(mismatch("a map", other)),
            },
            TraitsKind::String(charset) => match value {
                Value::String(text) => write_string(text, *charset, ctx),
                other => Err(mismatch("a string", other)),
            },
            TraitsKind::Object(key) => self.write_object(value, key, None, graph, ctx),
        }
    }

    fn write_sequence(
        &self,
        items: &[Value],
        sequence: &SequenceTraits,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        match sequence.fixed_size() {
            Some(len) if len != items.len() => {
                return Err(CspError::invalid(format!(
                    "fixed-size sequence of {len} elements holds {}",
                    items.len()
                )));
            }
            Some(_) => {}
            None => write_count(items.len(), ctx)?,
        }

        let element = sequence.element();
        if let TraitsKind::Primitive(kind) = element.kind()
            && !element.is_reference()
        {
            // One tag for the whole run.
            if ctx.is_size_of_integers_may_be_not_equal() && kind.is_integer() {
                ctx.buffer_mut().write(kind.size() as u8)?;
            }
            for item in items {
                write_primitive(item, *kind, false, ctx)?;
            }
            return Ok(());
        }

        for item in items {
            self.serialize(item, element, graph, ctx)?;
        }
        Ok(())
    }

    fn write_map(
        &self,
        entries: &[(Value, Value)],
        map: &MapTraits,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        write_count(entries.len(), ctx)?;
        for (key, value) in entries {
            self.serialize(key, map.key(), graph, ctx)?;
            self.serialize(value, map.value(), graph, ctx)?;
        }
        Ok(())
    }

    /// Writes an instance of `key`.
    ///
    /// `target` is the interface version to write. Without one, the version
    /// of the declared layout is used.
    fn write_object(
        &self,
        value: &Value,
        key: &TypeKey,
        target: Option<InterfaceVersion>,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        let registry = ctx.registry();
        if let Some(processor) = registry.find(key.as_str()) {
            return processor.serialize(value, graph, ctx);
        }
        let layout = registry
            .layout(key.as_str())
            .ok_or_else(|| CspError::NoSuchHandler(key.clone()))?;

        let instance = match value {
            Value::Struct(instance) => instance,
            other => return Err(mismatch("a struct", other)),
        };
        check_key(instance, key)?;

        let target = target.unwrap_or(layout.version());
        if instance.version() == target {
            return self.write_struct(instance, &layout, graph, ctx);
        }
        let converter =
            ctx.version_converter()
                .ok_or_else(|| CspError::NotSupportedInterfaceVersion {
                    key: key.clone(),
                    found: instance.version(),
                    expected: target,
                })?;
        let converted = converter.convert(instance, instance.version(), target)?;
        self.write_struct(&converted, &layout, graph, ctx)
    }

    /// Writes the parent part, then the own fields in declaration order.
    fn write_struct(
        &self,
        instance: &StructValue,
        layout: &StructInfo,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        if let Some(parent_key) = layout.parent() {
            let parent = instance.parent().ok_or_else(|| {
                CspError::invalid(format!(
                    "`{}` misses its `{parent_key}` part",
                    layout.key()
                ))
            })?;
            self.write_parent(parent, parent_key, graph, ctx)?;
        }

        if instance.fields().len() != layout.field_len() {
            return Err(CspError::invalid(format!(
                "`{}` declares {} fields, found {}",
                layout.key(),
                layout.field_len(),
                instance.fields().len()
            )));
        }
        for (field, value) in layout.fields().iter().zip(instance.fields()) {
            self.serialize(value, field.traits(), graph, ctx)?;
        }
        Ok(())
    }

    fn write_parent(
        &self,
        parent: &StructValue,
        key: &TypeKey,
        graph: &ObjectGraph,
        ctx: &mut SerializationContext<'_>,
    ) -> CspResult<()> {
        check_key(parent, key)?;
        let registry = ctx.registry();
        if let Some(processor) = registry.find(key.as_str()) {
            return processor.serialize(&Value::Struct(parent.clone()), graph, ctx);
        }
        let layout = registry
            .layout(key.as_str())
            .ok_or_else(|| CspError::NoSuchHandler(key.clone()))?;
        self.write_struct(parent, &layout, graph, ctx)
    }
}

fn check_key(instance: &StructValue, key: &TypeKey) -> CspResult<()> {
    if instance.key() == key {
        Ok(())
    } else {
        Err(CspError::invalid(format!(
            "expected an instance of `{key}`, found `{}`",
            instance.key()
        )))
    }
}

fn write_count(count: usize, ctx: &mut SerializationContext<'_>) -> CspResult<()> {
    ctx.buffer_mut().write(count as u64)
}

fn write_string(text: &str, charset: Charset, ctx: &mut SerializationContext<'_>) -> CspResult<()> {
    let bytes = charset.encode(text)?;
    write_count(bytes.len(), ctx)?;
    ctx.buffer_mut().write_bytes(&bytes)
}

fn write_scalar<T: Scalar>(
    value: T,
    tagged: bool,
    ctx: &mut SerializationContext<'_>,
) -> CspResult<()> {
    let buffer = ctx.buffer_mut();
    if tagged {
        buffer.write(T::SIZE as u8)?;
    }
    buffer.write(value)
}

fn write_primitive(
    value: &Value,
    kind: PrimitiveKind,
    tagged: bool,
    ctx: &mut SerializationContext<'_>,
) -> CspResult<()> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => ctx.buffer_mut().write_bool(*v),
        (PrimitiveKind::I8, Value::I8(v)) => write_scalar(*v, tagged, ctx),
        (PrimitiveKind::U8, Value::U8(v)) => write_scalar(*v, tagged, ctx),
        (PrimitiveKind::I16, Value::I16(v)) => write_scalar(*v, tagged, ctx),
        (PrimitiveKind::U16, Value::U16(v)) => write_scalar(*v, tagged, ctx),
        (PrimitiveKind::I32, Value::I32(v)) => write_scalar(*v, tagged, ctx),
        (PrimitiveKind::U32, Value::U32(v)) => write_scalar(*v, tagged, ctx),
        (PrimitiveKind::I64, Value::I64(v)) => write_scalar(*v, tagged, ctx),
        (PrimitiveKind::U64, Value::U64(v)) => write_scalar(*v, tagged, ctx),
        (PrimitiveKind::F32, Value::F32(v)) => write_scalar(*v, false, ctx),
        (PrimitiveKind::F64, Value::F64(v)) => write_scalar(*v, false, ctx),
        (kind, other) => Err(mismatch(kind.name(), other)),
    }
}
