use crate::buffer::BufferConfig;
use crate::flags::{CommonFlags, DataFlags};
use crate::type_traits::TypeKey;
use crate::version::{InterfaceVersion, ProtocolVersion};

/// Parameters of a context.
///
/// Missing fields take their defaults when deserialized, so partial
/// configuration files are accepted.
///
/// # Examples
///
/// ```
/// use csp_base::context::ContextConfig;
/// use csp_base::flags::{CommonFlags, DataFlags};
///
/// let config = ContextConfig {
///     common_flags: CommonFlags::BIG_ENDIAN,
///     data_flags: DataFlags::ALLOW_UNMANAGED_POINTERS | DataFlags::CHECK_RECURSIVE_POINTERS,
///     ..ContextConfig::data_message("demo::Message")
/// };
/// assert_eq!(config.declaring_type.unwrap().as_str(), "demo::Message");
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContextConfig {
    pub protocol_version: ProtocolVersion,
    pub common_flags: CommonFlags,
    /// Top-level struct type, required by data messages.
    pub declaring_type: Option<TypeKey>,
    pub interface_version: InterfaceVersion,
    pub data_flags: DataFlags,
    pub buffer: BufferConfig,
    /// Deepest nesting of values a call may enter.
    ///
    /// Bounds the recursion of the traversal, so a long chain of inline
    /// objects fails with an error instead of exhausting the stack.
    pub max_depth: usize,
}

impl ContextConfig {
    /// Default of [`ContextConfig::max_depth`].
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    /// A default configuration for a data message of `declaring_type`.
    pub fn data_message(declaring_type: impl Into<TypeKey>) -> Self {
        Self {
            declaring_type: Some(declaring_type.into()),
            ..Self::default()
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion::LATEST,
            common_flags: CommonFlags::empty(),
            declaring_type: None,
            interface_version: InterfaceVersion::default(),
            data_flags: DataFlags::empty(),
            buffer: BufferConfig::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::ContextConfig;
    use crate::buffer::BufferConfig;
    use crate::flags::{CommonFlags, DataFlags};
    use crate::version::InterfaceVersion;

    #[test]
    fn load_from_ron() {
        let text = r#"(
            common_flags: "BIG_ENDIAN",
            declaring_type: Some("demo::Message"),
            interface_version: 3,
            data_flags: "ALLOW_UNMANAGED_POINTERS | CHECK_RECURSIVE_POINTERS",
            buffer: (initial_capacity: 64),
            max_depth: 32,
        )"#;
        let config: ContextConfig = ron::from_str(text).unwrap();

        assert_eq!(config.common_flags, CommonFlags::BIG_ENDIAN);
        assert_eq!(
            config.data_flags,
            DataFlags::ALLOW_UNMANAGED_POINTERS | DataFlags::CHECK_RECURSIVE_POINTERS
        );
        assert_eq!(config.interface_version, InterfaceVersion(3));
        assert_eq!(config.buffer.initial_capacity, 64);
        assert!(!config.buffer.direct);
        assert_eq!(config.max_depth, 32);
    }

    #[test]
    fn json_round_trip() {
        let config = ContextConfig {
            data_flags: DataFlags::SIZE_OF_INTEGERS_MAY_BE_NOT_EQUAL,
            ..ContextConfig::data_message("demo::Message")
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ContextConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.data_flags, config.data_flags);
        assert_eq!(back.declaring_type, config.declaring_type);
        assert_eq!(back.protocol_version, config.protocol_version);
        assert_eq!(
            back.buffer.initial_capacity,
            BufferConfig::DEFAULT_CAPACITY
        );
        assert_eq!(back.max_depth, ContextConfig::DEFAULT_MAX_DEPTH);
    }
}
