//! Status codes and the error type reported by every fallible operation.
//!
//! [`CspStatus`] is the machine-checkable code shared with other CSP
//! implementations, [`CspError`] carries the code together with a human
//! readable description.

use alloc::borrow::Cow;
use core::fmt;

use thiserror::Error;

use crate::type_traits::TypeKey;
use crate::version::InterfaceVersion;

// -----------------------------------------------------------------------------
// CspStatus

/// Status codes of the CSP error space.
///
/// Negative codes are errors, zero is success.
///
/// # Examples
///
/// ```
/// use csp_base::status::CspStatus;
///
/// assert_eq!(CspStatus::NoSuchHandler.code(), -10);
/// assert_eq!(CspStatus::from_code(-1), Some(CspStatus::NoMemory));
/// assert!(CspStatus::NoMemory.is_error());
/// assert!(!CspStatus::NoError.is_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CspStatus {
    NoError = 0,
    NoMemory = -1,
    InvalidArgument = -2,
    DataCorrupted = -4,
    NoSuchHandler = -10,
    NotSupportedInterfaceVersion = -12,
    PointerWhenNoAllowUnmanagedPointersSet = -23,
}

impl CspStatus {
    const ALL: [CspStatus; 7] = [
        CspStatus::NoError,
        CspStatus::NoMemory,
        CspStatus::InvalidArgument,
        CspStatus::DataCorrupted,
        CspStatus::NoSuchHandler,
        CspStatus::NotSupportedInterfaceVersion,
        CspStatus::PointerWhenNoAllowUnmanagedPointersSet,
    ];

    /// Returns the numeric status code.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Looks up the status with the given numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Returns `true` if the status describes a failure.
    #[inline]
    pub const fn is_error(self) -> bool {
        self.code() < 0
    }

    /// Returns the human readable description of the status.
    pub const fn description(self) -> &'static str {
        match self {
            CspStatus::NoError => "No error",
            CspStatus::NoMemory => "Not enough memory",
            CspStatus::InvalidArgument => "Invalid argument",
            CspStatus::DataCorrupted => "Data corrupted",
            CspStatus::NoSuchHandler => "No such handler",
            CspStatus::NotSupportedInterfaceVersion => "Not supported interface version",
            CspStatus::PointerWhenNoAllowUnmanagedPointersSet => {
                "Pointer when no allow unmanaged pointers set"
            }
        }
    }
}

impl fmt::Display for CspStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

// -----------------------------------------------------------------------------
// CspError

/// Error of a serialization or deserialization call.
///
/// A buffer that received a partial message before the error is not usable
/// anymore, the whole call has to be repeated with a new context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CspError {
    #[error("Not enough memory to hold {required} bytes")]
    NoMemory { required: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    #[error("Data corrupted: {0}")]
    DataCorrupted(Cow<'static, str>),

    #[error("No processor can handle type `{0}`")]
    NoSuchHandler(TypeKey),

    #[error("Interface version {found} of `{key}` cannot be converted to {expected}")]
    NotSupportedInterfaceVersion {
        key: TypeKey,
        found: InterfaceVersion,
        expected: InterfaceVersion,
    },

    #[error("Pointer serialization requested while `ALLOW_UNMANAGED_POINTERS` is not set")]
    PointerWhenNoAllowUnmanagedPointersSet,
}

impl CspError {
    /// Creates an [`CspError::InvalidArgument`].
    #[inline]
    pub fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        CspError::InvalidArgument(message.into())
    }

    /// Creates an [`CspError::DataCorrupted`].
    #[inline]
    pub fn corrupted(message: impl Into<Cow<'static, str>>) -> Self {
        CspError::DataCorrupted(message.into())
    }

    /// Returns the status code of this error.
    pub const fn status(&self) -> CspStatus {
        match self {
            CspError::NoMemory { .. } => CspStatus::NoMemory,
            CspError::InvalidArgument(_) => CspStatus::InvalidArgument,
            CspError::DataCorrupted(_) => CspStatus::DataCorrupted,
            CspError::NoSuchHandler(_) => CspStatus::NoSuchHandler,
            CspError::NotSupportedInterfaceVersion { .. } => {
                CspStatus::NotSupportedInterfaceVersion
            }
            CspError::PointerWhenNoAllowUnmanagedPointersSet => {
                CspStatus::PointerWhenNoAllowUnmanagedPointersSet
            }
        }
    }
}

/// Result alias used across the crate.
pub type CspResult<T> = Result<T, CspError>;

// -----------------------------------------------------------------------------
// Tests
