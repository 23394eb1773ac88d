#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use csp_base as base;
pub use csp_utils as utils;

pub use csp_base::{CspError, CspResult, CspStatus};

/// Items needed to describe, write and read values.
pub mod prelude {
    pub use csp_base::context::{ContextConfig, DeserializationContext, SerializationContext};
    pub use csp_base::flags::{CommonFlags, DataFlags};
    pub use csp_base::processing::{GeneralProcessor, Processor, ProcessorRegistry, VersionConverter};
    pub use csp_base::type_traits::{Charset, PrimitiveKind, StructInfo, TypeKey, TypeTraits};
    pub use csp_base::value::{ObjectGraph, ObjectId, StructValue, Value};
    pub use csp_base::version::{InterfaceVersion, ProtocolVersion};
    pub use csp_base::{CspError, CspResult, CspStatus};
}
