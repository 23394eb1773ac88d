//! Protocol and interface versions.
//!
//! Both are opaque to the engine: the protocol version is carried by the
//! context for collaborators, the interface version selects whether a struct
//! needs version conversion.

use core::fmt;

// -----------------------------------------------------------------------------
// ProtocolVersion

/// Version of the CSP wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ProtocolVersion(pub u8);

impl ProtocolVersion {
    /// The first protocol version.
    pub const FIRST: Self = Self(1);
    /// The newest protocol version known to this crate.
    pub const LATEST: Self = Self(1);
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// -----------------------------------------------------------------------------
// InterfaceVersion

/// Logical schema version of a struct, as declared by its protocol interface.
///
/// Compared as an unsigned integer.
///
/// # Examples
///
/// ```
/// use csp_base::version::InterfaceVersion;
///
/// assert!(InterfaceVersion(2) > InterfaceVersion(1));
/// assert_eq!(InterfaceVersion::default(), InterfaceVersion(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct InterfaceVersion(pub u32);

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
