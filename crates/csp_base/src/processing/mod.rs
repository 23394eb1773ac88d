//! The traversal engine and its processor registry.
//!
//! [`GeneralProcessor`] walks a [`Value`](crate::value::Value) along its
//! [`TypeTraits`](crate::type_traits::TypeTraits) and writes the wire layout:
//!
//! | shape     | layout                                                        |
//! |-----------|---------------------------------------------------------------|
//! | scalar    | `[size-tag:1]? [value]`                                       |
//! | bool      | one octet, `1` or `0`                                         |
//! | sequence  | `[pointer-mark]? [count:8]? [size-tag:1]? [elements]`         |
//! | map       | `[pointer-mark]? [count:8] [key value]*`                      |
//! | string    | `[pointer-mark]? [octet-length:8] [encoded bytes]`            |
//! | struct    | `[pointer-mark]? [parent fields] [own fields]`                |
//!
//! Size tags are only written for integers with
//! [`SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL`](crate::flags::DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL).
//! Counts are always eight octets. Objects are dispatched to a specialized
//! [`Processor`] when one is registered for their declaring type, otherwise to
//! the declared [`StructInfo`](crate::type_traits::StructInfo) layout.

// -----------------------------------------------------------------------------
// Modules

mod convert;
mod de;
mod pointer;
mod registry;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use convert::VersionConverter;
pub use registry::{DeserializeFn, Processor, ProcessorRegistry, SerializeFn};

#[cfg(feature = "auto_register")]
pub use registry::AutoProcessor;

pub(crate) use pointer::{DeserializationPointers, SerializationPointers};

use alloc::format;

use crate::status::CspError;
use crate::value::Value;

// -----------------------------------------------------------------------------
// GeneralProcessor

/// The generic serializer and deserializer.
///
/// Stateless: all state of a call lives in its context.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralProcessor;

fn mismatch(expected: &str, found: &Value) -> CspError {
    CspError::invalid(format!("expected {expected}, found {}", found.type_name()))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{GeneralProcessor, Processor, ProcessorRegistry};
    use crate::context::{ContextConfig, DeserializationContext, SerializationContext};
    use crate::flags::{CommonFlags, DataFlags};
    use crate::status::{CspError, CspResult, CspStatus};
    use crate::type_traits::{Charset, PrimitiveKind, StructInfo, TypeTraits};
    use crate::value::{ObjectGraph, StructValue, Value};
    use crate::version::InterfaceVersion;
    use alloc::vec;
    use alloc::vec::Vec;

    const NODE: &str = "list::Node";

    fn config(data_flags: DataFlags) -> ContextConfig {
        ContextConfig {
            data_flags,
            ..ContextConfig::data_message(NODE)
        }
    }

    fn write(
        value: &Value,
        traits: &TypeTraits,
        graph: &ObjectGraph,
        registry: &ProcessorRegistry,
        config: &ContextConfig,
    ) -> CspResult<Vec<u8>> {
        let mut ctx = SerializationContext::new(config, registry)?;
        GeneralProcessor.serialize(value, traits, graph, &mut ctx)?;
        Ok(ctx.commit().into_vec())
    }

    fn read(
        bytes: &[u8],
        traits: &TypeTraits,
        registry: &ProcessorRegistry,
        config: &ContextConfig,
    ) -> CspResult<(Value, ObjectGraph)> {
        let mut graph = ObjectGraph::new();
        let mut ctx = DeserializationContext::new(bytes, config, registry);
        let value = GeneralProcessor.deserialize(traits, &mut graph, &mut ctx)?;
        assert_eq!(ctx.buffer().remaining(), 0, "trailing bytes");
        Ok((value, graph))
    }

    fn node_registry() -> ProcessorRegistry {
        let registry = ProcessorRegistry::new();
        registry
            .declare(
                StructInfo::new(NODE)
                    .with_field("value", TypeTraits::primitive(PrimitiveKind::I32))
                    .with_field("next", TypeTraits::object(NODE).as_reference()),
            )
            .unwrap();
        registry
    }

    #[test]
    fn size_tag_presence() {
        let registry = ProcessorRegistry::new();
        let graph = ObjectGraph::new();
        let int = TypeTraits::primitive(PrimitiveKind::I32);

        let tagged = config(DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL);
        let bytes = write(&Value::I32(9), &int, &graph, &registry, &tagged).unwrap();
        assert_eq!(bytes, [4, 9, 0, 0, 0]);

        let plain = config(DataFlags::empty());
        let bytes = write(&Value::I32(9), &int, &graph, &registry, &plain).unwrap();
        assert_eq!(bytes, [9, 0, 0, 0]);
    }

    #[test]
    fn booleans_and_floats_are_never_tagged() {
        let registry = ProcessorRegistry::new();
        let graph = ObjectGraph::new();
        let tagged = config(DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL);

        let boolean = TypeTraits::primitive(PrimitiveKind::Bool);
        assert_eq!(write(&Value::Bool(true), &boolean, &graph, &registry, &tagged).unwrap(), [1]);
        assert_eq!(write(&Value::Bool(false), &boolean, &graph, &registry, &tagged).unwrap(), [0]);

        let float = TypeTraits::primitive(PrimitiveKind::F32);
        let bytes = write(&Value::F32(1.0), &float, &graph, &registry, &tagged).unwrap();
        assert_eq!(bytes, 1.0_f32.to_le_bytes());
    }

    #[test]
    fn fixed_array_literal() {
        let registry = ProcessorRegistry::new();
        let config = ContextConfig {
            common_flags: CommonFlags::BIG_ENDIAN,
            ..ContextConfig::default()
        };
        let traits = TypeTraits::fixed_array(TypeTraits::primitive(PrimitiveKind::I32), 2);
        let value = Value::Array(vec![Value::I32(2), Value::I32(6)]);

        let bytes = write(&value, &traits, &ObjectGraph::new(), &registry, &config).unwrap();
        assert_eq!(bytes, [0, 0, 0, 2, 0, 0, 0, 6]);
        assert_eq!(read(&bytes, &traits, &registry, &config).unwrap().0, value);

        let short = Value::Array(vec![Value::I32(2)]);
        let err = write(&short, &traits, &ObjectGraph::new(), &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::InvalidArgument);
    }

    #[test]
    fn integer_array_shares_one_tag() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL);
        let traits = TypeTraits::array(TypeTraits::primitive(PrimitiveKind::U16));
        let value = Value::Array(vec![Value::U16(1), Value::U16(2)]);

        let bytes = write(&value, &traits, &ObjectGraph::new(), &registry, &config).unwrap();
        assert_eq!(bytes, [2, 0, 0, 0, 0, 0, 0, 0, 2, 1, 0, 2, 0]);
        assert_eq!(read(&bytes, &traits, &registry, &config).unwrap().0, value);
    }

    #[test]
    fn tagged_integers_convert_width() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL);

        let int = TypeTraits::primitive(PrimitiveKind::I32);
        let (value, _) = read(&[2, 0xFE, 0xFF], &int, &registry, &config).unwrap();
        assert_eq!(value, Value::I32(-2));

        let byte = TypeTraits::primitive(PrimitiveKind::I8);
        let err = read(&[4, 0, 1, 0, 0], &byte, &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::DataCorrupted);

        let err = read(&[3, 0, 0, 0], &int, &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::DataCorrupted);
    }

    #[test]
    fn bool_array_as_reference() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::ALLOW_UNMANAGED_POINTERS);
        let traits = TypeTraits::array(TypeTraits::primitive(PrimitiveKind::Bool)).as_reference();

        let mut graph = ObjectGraph::new();
        let id = graph.insert(Value::Array(vec![Value::Bool(true), Value::Bool(false)]));

        let bytes = write(&Value::Ref(id), &traits, &graph, &registry, &config).unwrap();
        assert_eq!(bytes, [1, 2, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
        let (value, decoded) = read(&bytes, &traits, &registry, &config).unwrap();
        assert_eq!(value, Value::Ref(id));
        assert_eq!(decoded, graph);

        let bytes = write(&Value::Null, &traits, &graph, &registry, &config).unwrap();
        assert_eq!(bytes, [0]);
        assert_eq!(read(&bytes, &traits, &registry, &config).unwrap().0, Value::Null);
    }

    #[test]
    fn pointer_gate() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::CHECK_RECURSIVE_POINTERS);
        let traits = TypeTraits::string(Charset::Utf8).as_reference();

        let mut graph = ObjectGraph::new();
        let id = graph.insert(Value::from("text"));

        let mut ctx = SerializationContext::new(&config, &registry).unwrap();
        let err = GeneralProcessor
            .serialize(&Value::Ref(id), &traits, &graph, &mut ctx)
            .unwrap_err();
        assert_eq!(err, CspError::PointerWhenNoAllowUnmanagedPointersSet);
        assert_eq!(err.status().code(), -23);
        assert_eq!(ctx.buffer().position(), 0);

        let err = read(&[0], &traits, &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::PointerWhenNoAllowUnmanagedPointersSet);
    }

    #[test]
    fn reference_requires_graph_object() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::ALLOW_UNMANAGED_POINTERS);
        let traits = TypeTraits::string(Charset::Utf8).as_reference();
        let graph = ObjectGraph::new();

        let inline = write(&Value::from("x"), &traits, &graph, &registry, &config).unwrap_err();
        assert_eq!(inline.status(), CspStatus::InvalidArgument);

        let primitive = TypeTraits::primitive(PrimitiveKind::U8).as_reference();
        let err = write(&Value::U8(1), &primitive, &graph, &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::InvalidArgument);
    }

    fn cyclic_pair() -> (ObjectGraph, Value) {
        let mut graph = ObjectGraph::new();
        let a = graph.reserve();
        let b = graph.reserve();
        graph.replace(a, StructValue::new(NODE).with_field(1_i32).with_field(b).into());
        graph.replace(b, StructValue::new(NODE).with_field(2_i32).with_field(a).into());
        (graph, Value::Ref(a))
    }

    #[test]
    fn cycle_round_trip() {
        let registry = node_registry();
        let traits = TypeTraits::object(NODE).as_reference();
        let (graph, root) = cyclic_pair();

        for flag in [
            DataFlags::CHECK_RECURSIVE_POINTERS,
            DataFlags::CHECK_OF_RECURSIVE_POINTERS_WHILE_MAINTAINING_LINK_STRUCTURE,
        ] {
            let config = config(DataFlags::ALLOW_UNMANAGED_POINTERS | flag);
            let bytes = write(&root, &traits, &graph, &registry, &config).unwrap();
            assert_eq!(
                bytes,
                [
                    1, 0, 0, 0, 0, 0, 0, 0, // a: new object
                    1, 0, 0, 0, // a.value
                    1, 0, 0, 0, 0, 0, 0, 0, // b: new object
                    2, 0, 0, 0, // b.value
                    2, 0, 0, 0, 0, 0, 0, 0, // back to a
                ]
            );

            let (value, decoded) = read(&bytes, &traits, &registry, &config).unwrap();
            assert_eq!(value, root);
            assert_eq!(decoded, graph);
        }
    }

    #[test]
    fn shared_object_is_written_once() {
        let registry = ProcessorRegistry::new();
        let string = TypeTraits::string(Charset::Utf8).as_reference();
        registry
            .declare(
                StructInfo::new("demo::Pair")
                    .with_field("left", string.clone())
                    .with_field("right", string),
            )
            .unwrap();
        let traits = TypeTraits::object("demo::Pair");

        let mut graph = ObjectGraph::new();
        let shared = graph.insert(Value::from("hi"));
        let pair: Value = StructValue::new("demo::Pair").with_field(shared).with_field(shared).into();

        let tracked = config(DataFlags::ALLOW_UNMANAGED_POINTERS | DataFlags::CHECK_RECURSIVE_POINTERS);
        let bytes = write(&pair, &traits, &graph, &registry, &tracked).unwrap();
        assert_eq!(bytes.len(), 8 + 8 + 2 + 8);
        let (value, decoded) = read(&bytes, &traits, &registry, &tracked).unwrap();
        assert_eq!(value, pair);
        assert_eq!(decoded, graph);

        // Without tracking every occurrence is written in full.
        let untracked = config(DataFlags::ALLOW_UNMANAGED_POINTERS);
        let bytes = write(&pair, &traits, &graph, &registry, &untracked).unwrap();
        assert_eq!(bytes.len(), 2 * (1 + 8 + 2));
        let (_, decoded) = read(&bytes, &traits, &registry, &untracked).unwrap();
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn parent_fields_come_first() {
        let registry = ProcessorRegistry::new();
        registry
            .declare(StructInfo::new("shapes::Shape").with_field("color", TypeTraits::primitive(PrimitiveKind::U8)))
            .unwrap();
        registry
            .declare(
                StructInfo::new("shapes::Circle")
                    .with_parent("shapes::Shape")
                    .with_field("radius", TypeTraits::primitive(PrimitiveKind::I16)),
            )
            .unwrap();
        let config = ContextConfig {
            common_flags: CommonFlags::BIG_ENDIAN,
            ..ContextConfig::data_message("shapes::Circle")
        };

        let circle: Value = StructValue::new("shapes::Circle")
            .with_parent(StructValue::new("shapes::Shape").with_field(7_u8))
            .with_field(300_i16)
            .into();

        let mut ctx = SerializationContext::new(&config, &registry).unwrap();
        GeneralProcessor
            .serialize_body(&circle, &ObjectGraph::new(), &mut ctx)
            .unwrap();
        let bytes = ctx.commit();
        assert_eq!(bytes.as_bytes(), [7, 0x01, 0x2C]);

        let mut graph = ObjectGraph::new();
        let mut ctx = DeserializationContext::new(bytes.as_bytes(), &config, &registry);
        let value = GeneralProcessor.deserialize_body(&mut graph, &mut ctx).unwrap();
        assert_eq!(value, circle);

        let orphan: Value = StructValue::new("shapes::Circle").with_field(1_i16).into();
        let err = write(&orphan, &TypeTraits::object("shapes::Circle"), &graph, &registry, &config)
            .unwrap_err();
        assert_eq!(err.status(), CspStatus::InvalidArgument);
    }

    fn serialize_point(value: &Value, _: &ObjectGraph, ctx: &mut SerializationContext<'_>) -> CspResult<()> {
        match value.as_struct().map(StructValue::fields) {
            Some([Value::I16(x), Value::I16(y)]) => ctx.buffer_mut().write_slice(&[*x, *y]),
            _ => Err(CspError::invalid("geo::Point expects two i16 fields")),
        }
    }

    fn deserialize_point(_: &mut ObjectGraph, ctx: &mut DeserializationContext<'_>) -> CspResult<Value> {
        let [x, y] = [ctx.buffer_mut().read::<i16>()?, ctx.buffer_mut().read::<i16>()?];
        Ok(StructValue::new("geo::Point").with_field(x).with_field(y).into())
    }

    #[test]
    fn specialized_processor_wins() {
        let registry = ProcessorRegistry::new();
        registry.register("geo::Point", Processor::new(serialize_point, deserialize_point));
        registry
            .declare(
                StructInfo::new("geo::Point")
                    .with_field("x", TypeTraits::primitive(PrimitiveKind::I64))
                    .with_field("y", TypeTraits::primitive(PrimitiveKind::I64)),
            )
            .unwrap();
        registry
            .declare(
                StructInfo::new("geo::Route")
                    .with_field("start", TypeTraits::object("geo::Point"))
                    .with_field("hops", TypeTraits::primitive(PrimitiveKind::U8)),
            )
            .unwrap();

        let config = config(DataFlags::empty());
        let traits = TypeTraits::object("geo::Route");
        let route: Value = StructValue::new("geo::Route")
            .with_field(StructValue::new("geo::Point").with_field(-1_i16).with_field(2_i16))
            .with_field(3_u8)
            .into();

        let bytes = write(&route, &traits, &ObjectGraph::new(), &registry, &config).unwrap();
        assert_eq!(bytes, [0xFF, 0xFF, 2, 0, 3]);
        assert_eq!(read(&bytes, &traits, &registry, &config).unwrap().0, route);
    }

    #[test]
    fn unknown_type_has_no_handler() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::empty());
        let traits = TypeTraits::object("demo::Unknown");
        let value: Value = StructValue::new("demo::Unknown").into();

        let err = write(&value, &traits, &ObjectGraph::new(), &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::NoSuchHandler);
        let err = read(&[], &traits, &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::NoSuchHandler);
    }

    #[test]
    fn body_requires_declaring_type() {
        let registry = ProcessorRegistry::new();
        let mut ctx = SerializationContext::new(&ContextConfig::default(), &registry).unwrap();
        let err = GeneralProcessor
            .serialize_body(&Value::Null, &ObjectGraph::new(), &mut ctx)
            .unwrap_err();
        assert_eq!(err.status(), CspStatus::InvalidArgument);
    }

    fn money_registry() -> ProcessorRegistry {
        let registry = ProcessorRegistry::new();
        registry
            .declare(
                StructInfo::new("bank::Money")
                    .with_version(InterfaceVersion(2))
                    .with_field("amount", TypeTraits::primitive(PrimitiveKind::I64)),
            )
            .unwrap();
        registry
    }

    // Version 1 counted whole units, version 2 counts cents.
    fn money_converter(
        value: &StructValue,
        from: InterfaceVersion,
        to: InterfaceVersion,
    ) -> CspResult<StructValue> {
        let amount = match value.fields() {
            [Value::I64(amount)] => *amount,
            _ => return Err(CspError::invalid("bank::Money expects one i64 field")),
        };
        let amount = match (from.0, to.0) {
            (1, 2) => amount * 100,
            (2, 1) => amount / 100,
            _ => return Err(CspError::invalid("unknown bank::Money versions")),
        };
        Ok(StructValue::new("bank::Money").with_version(to).with_field(amount))
    }

    #[test]
    fn version_conversion_on_write() {
        let registry = money_registry();
        let config = ContextConfig {
            interface_version: InterfaceVersion(1),
            ..ContextConfig::data_message("bank::Money")
        };
        let value: Value = StructValue::new("bank::Money")
            .with_version(InterfaceVersion(2))
            .with_field(1500_i64)
            .into();

        let mut ctx = SerializationContext::new(&config, &registry).unwrap();
        let err = GeneralProcessor
            .serialize_body(&value, &ObjectGraph::new(), &mut ctx)
            .unwrap_err();
        assert_eq!(err.status(), CspStatus::NotSupportedInterfaceVersion);

        let converter = money_converter;
        let mut ctx = SerializationContext::new(&config, &registry)
            .unwrap()
            .with_version_converter(&converter);
        GeneralProcessor
            .serialize_body(&value, &ObjectGraph::new(), &mut ctx)
            .unwrap();
        assert_eq!(ctx.commit().as_bytes(), 15_i64.to_le_bytes());
    }

    #[test]
    fn version_conversion_on_read() {
        let registry = money_registry();
        let config = ContextConfig {
            interface_version: InterfaceVersion(1),
            ..ContextConfig::data_message("bank::Money")
        };
        let bytes = 15_i64.to_le_bytes();

        let mut graph = ObjectGraph::new();
        let mut ctx = DeserializationContext::new(&bytes, &config, &registry);
        let err = GeneralProcessor.deserialize_body(&mut graph, &mut ctx).unwrap_err();
        assert_eq!(err.status(), CspStatus::NotSupportedInterfaceVersion);

        let converter = money_converter;
        let mut ctx =
            DeserializationContext::new(&bytes, &config, &registry).with_version_converter(&converter);
        let value = GeneralProcessor.deserialize_body(&mut graph, &mut ctx).unwrap();
        let expected: Value = StructValue::new("bank::Money")
            .with_version(InterfaceVersion(2))
            .with_field(1500_i64)
            .into();
        assert_eq!(value, expected);
    }

    #[test]
    fn maps_and_strings_round_trip() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL);
        let traits = TypeTraits::map(
            TypeTraits::string(Charset::Utf16Le),
            TypeTraits::collection(TypeTraits::primitive(PrimitiveKind::F64)),
        );
        let value = Value::Map(vec![
            (Value::from("a"), Value::Array(vec![Value::F64(1.5), Value::F64(-2.0)])),
            (Value::from("β"), Value::Array(Vec::new())),
        ]);

        let bytes = write(&value, &traits, &ObjectGraph::new(), &registry, &config).unwrap();
        assert_eq!(bytes.len(), 8 + (8 + 2) + (8 + 16) + (8 + 2) + 8);
        assert_eq!(read(&bytes, &traits, &registry, &config).unwrap().0, value);
    }

    #[test]
    fn truncated_input_is_corrupted() {
        let registry = node_registry();
        let traits = TypeTraits::object(NODE).as_reference();
        let (graph, root) = cyclic_pair();
        let config = config(DataFlags::ALLOW_UNMANAGED_POINTERS | DataFlags::CHECK_RECURSIVE_POINTERS);

        let bytes = write(&root, &traits, &graph, &registry, &config).unwrap();
        let mut ctx = DeserializationContext::new(&bytes[..bytes.len() - 1], &config, &registry);
        let err = GeneralProcessor
            .deserialize(&traits, &mut ObjectGraph::new(), &mut ctx)
            .unwrap_err();
        assert_eq!(err.status(), CspStatus::DataCorrupted);

        let mut forged = bytes.clone();
        forged[24] = 9;
        let err = read(&forged, &traits, &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::DataCorrupted);
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::empty());
        let traits = TypeTraits::primitive(PrimitiveKind::U32);
        let err = write(&Value::I32(1), &traits, &ObjectGraph::new(), &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::InvalidArgument);
    }

    #[test]
    fn primitive_reference_is_gated() {
        let registry = ProcessorRegistry::new();
        let config = config(DataFlags::empty());
        let traits = TypeTraits::primitive(PrimitiveKind::U8).as_reference();

        let err = write(&Value::U8(1), &traits, &ObjectGraph::new(), &registry, &config).unwrap_err();
        assert_eq!(err, CspError::PointerWhenNoAllowUnmanagedPointersSet);
        let err = read(&[1, 1], &traits, &registry, &config).unwrap_err();
        assert_eq!(err, CspError::PointerWhenNoAllowUnmanagedPointersSet);
    }

    const CHAIN: &str = "chain::Link";

    fn chain_registry() -> ProcessorRegistry {
        let registry = ProcessorRegistry::new();
        registry
            .declare(
                StructInfo::new(CHAIN)
                    .with_field("value", TypeTraits::primitive(PrimitiveKind::U8))
                    .with_field("next", TypeTraits::object(CHAIN).as_reference()),
            )
            .unwrap();
        registry
    }

    fn chain_config(max_depth: usize) -> ContextConfig {
        ContextConfig {
            data_flags: DataFlags::ALLOW_UNMANAGED_POINTERS,
            max_depth,
            ..ContextConfig::data_message(CHAIN)
        }
    }

    /// The head link holding `0`, then `len` inline links holding `1..=len`.
    fn chain_bytes(len: u8) -> Vec<u8> {
        let mut bytes = vec![0];
        for value in 1..=len {
            bytes.extend([1, value]);
        }
        bytes.push(0);
        bytes
    }

    fn chain_value(len: u8) -> (ObjectGraph, Value) {
        let mut graph = ObjectGraph::new();
        let mut next = Value::Null;
        for value in (1..=len).rev() {
            let link = StructValue::new(CHAIN).with_field(value).with_field(next);
            next = Value::Ref(graph.insert(link.into()));
        }
        let head = StructValue::new(CHAIN).with_field(0_u8).with_field(next);
        (graph, head.into())
    }

    fn read_chain(
        bytes: &[u8],
        registry: &ProcessorRegistry,
        config: &ContextConfig,
    ) -> CspResult<(Value, ObjectGraph)> {
        let mut graph = ObjectGraph::new();
        let mut ctx = DeserializationContext::new(bytes, config, registry);
        let value = GeneralProcessor.deserialize_body(&mut graph, &mut ctx)?;
        Ok((value, graph))
    }

    #[test]
    fn long_chain_is_rejected_on_read() {
        let registry = chain_registry();
        let config = chain_config(ContextConfig::DEFAULT_MAX_DEPTH);

        let mut bytes = vec![0];
        for _ in 0..200_000 {
            bytes.extend([1, 0]);
        }
        bytes.push(0);
        let err = read_chain(&bytes, &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::DataCorrupted);
    }

    #[test]
    fn chain_depth_limit() {
        let registry = chain_registry();
        let config = chain_config(8);

        // The head, every link and the closing null mark each take a level.
        let (graph, head) = chain_value(6);
        let mut ctx = SerializationContext::new(&config, &registry).unwrap();
        GeneralProcessor.serialize_body(&head, &graph, &mut ctx).unwrap();
        assert_eq!(ctx.commit().as_bytes(), chain_bytes(6));

        let (value, decoded) = read_chain(&chain_bytes(6), &registry, &config).unwrap();
        assert_eq!(decoded.len(), 6);
        let mut ctx = SerializationContext::new(&config, &registry).unwrap();
        GeneralProcessor.serialize_body(&value, &decoded, &mut ctx).unwrap();
        assert_eq!(ctx.commit().as_bytes(), chain_bytes(6));

        let (graph, head) = chain_value(7);
        let mut ctx = SerializationContext::new(&config, &registry).unwrap();
        let err = GeneralProcessor.serialize_body(&head, &graph, &mut ctx).unwrap_err();
        assert_eq!(err.status(), CspStatus::InvalidArgument);
        let err = read_chain(&chain_bytes(7), &registry, &config).unwrap_err();
        assert_eq!(err.status(), CspStatus::DataCorrupted);
    }

    #[test]
    fn nested_struct_keeps_its_own_version() {
        let registry = ProcessorRegistry::new();
        registry
            .declare(StructInfo::new("p::Inner").with_field("x", TypeTraits::primitive(PrimitiveKind::U16)))
            .unwrap();
        registry
            .declare(
                StructInfo::new("p::Outer")
                    .with_version(InterfaceVersion(3))
                    .with_field("inner", TypeTraits::object("p::Inner")),
            )
            .unwrap();
        let config = ContextConfig {
            interface_version: InterfaceVersion(3),
            ..ContextConfig::data_message("p::Outer")
        };
        let inner = StructValue::new("p::Inner").with_field(7_u16);
        let outer: Value = StructValue::new("p::Outer")
            .with_version(InterfaceVersion(3))
            .with_field(inner)
            .into();

        let mut ctx = SerializationContext::new(&config, &registry).unwrap();
        GeneralProcessor.serialize_body(&outer, &ObjectGraph::new(), &mut ctx).unwrap();
        let bytes = ctx.commit().into_vec();
        assert_eq!(bytes, [7, 0]);

        let mut ctx = DeserializationContext::new(&bytes, &config, &registry);
        let value = GeneralProcessor
            .deserialize_body(&mut ObjectGraph::new(), &mut ctx)
            .unwrap();
        assert_eq!(value, outer);
    }

    #[test]
    fn every_primitive_round_trips() {
        let registry = ProcessorRegistry::new();
        let graph = ObjectGraph::new();
        let cases = [
            (PrimitiveKind::Bool, Value::Bool(true)),
            (PrimitiveKind::I8, Value::I8(i8::MIN)),
            (PrimitiveKind::U8, Value::U8(u8::MAX)),
            (PrimitiveKind::I16, Value::I16(i16::MIN)),
            (PrimitiveKind::U16, Value::U16(u16::MAX)),
            (PrimitiveKind::I32, Value::I32(i32::MIN)),
            (PrimitiveKind::U32, Value::U32(u32::MAX)),
            (PrimitiveKind::I64, Value::I64(i64::MIN)),
            (PrimitiveKind::U64, Value::U64(u64::MAX)),
            (PrimitiveKind::F32, Value::F32(f32::MIN_POSITIVE)),
            (PrimitiveKind::F64, Value::F64(core::f64::consts::PI)),
        ];

        for flags in [DataFlags::empty(), DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL] {
            let config = config(flags);
            for (kind, value) in &cases {
                let tag = usize::from(!flags.is_empty() && kind.is_integer());

                let traits = TypeTraits::primitive(*kind);
                let bytes = write(value, &traits, &graph, &registry, &config).unwrap();
                assert_eq!(bytes.len(), tag + kind.size(), "{kind:?}");
                assert_eq!(&read(&bytes, &traits, &registry, &config).unwrap().0, value);

                let traits = TypeTraits::array(TypeTraits::primitive(*kind));
                let array = Value::Array(vec![value.clone(), value.clone()]);
                let bytes = write(&array, &traits, &graph, &registry, &config).unwrap();
                assert_eq!(bytes.len(), 8 + tag + 2 * kind.size(), "{kind:?}");
                assert_eq!(read(&bytes, &traits, &registry, &config).unwrap().0, array);
            }
        }
    }
}
