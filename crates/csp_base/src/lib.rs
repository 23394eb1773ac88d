//! Encode/decode engine of the CSP binary wire protocol.
//!
//! The crate turns [`Value`](value::Value)s into the CSP byte layout and
//! back. The layout of every value is described by a
//! [`TypeTraits`](type_traits::TypeTraits) tree, the per-call state lives in a
//! [`SerializationContext`](context::SerializationContext) or
//! [`DeserializationContext`](context::DeserializationContext), and the
//! [`GeneralProcessor`](processing::GeneralProcessor) performs the traversal.
//!
//! # Examples
//!
//! ```
//! use csp_base::context::{ContextConfig, DeserializationContext, SerializationContext};
//! use csp_base::processing::{GeneralProcessor, ProcessorRegistry};
//! use csp_base::type_traits::{Charset, PrimitiveKind, StructInfo, TypeTraits};
//! use csp_base::value::{ObjectGraph, StructValue, Value};
//!
//! let registry = ProcessorRegistry::new();
//! registry.declare(
//!     StructInfo::new("demo::User")
//!         .with_field("id", TypeTraits::primitive(PrimitiveKind::U32))
//!         .with_field("name", TypeTraits::string(Charset::Utf8)),
//! )?;
//!
//! let user: Value = StructValue::new("demo::User").with_field(7_u32).with_field("Ada").into();
//! let config = ContextConfig::data_message("demo::User");
//!
//! let mut ctx = SerializationContext::new(&config, &registry)?;
//! GeneralProcessor.serialize_body(&user, &ObjectGraph::new(), &mut ctx)?;
//! let bytes = ctx.commit();
//!
//! let mut graph = ObjectGraph::new();
//! let mut ctx = DeserializationContext::new(bytes.as_bytes(), &config, &registry);
//! assert_eq!(GeneralProcessor.deserialize_body(&mut graph, &mut ctx)?, user);
//! # Ok::<(), csp_base::status::CspError>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Alloc

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod buffer;
pub mod context;
pub mod flags;
pub mod processing;
pub mod status;
pub mod type_traits;
pub mod value;
pub mod version;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}

pub use status::{CspError, CspResult, CspStatus};
