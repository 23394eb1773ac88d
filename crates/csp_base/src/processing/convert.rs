use core::fmt;

use crate::status::CspResult;
use crate::value::StructValue;
use crate::version::InterfaceVersion;

/// Converts a struct between interface versions.
///
/// Supplied by the embedding application. Closures with the matching
/// signature implement it.
///
/// # Examples
///
/// ```
/// use csp_base::processing::VersionConverter;
/// use csp_base::status::CspResult;
/// use csp_base::value::StructValue;
/// use csp_base::version::InterfaceVersion;
///
/// // Version 2 appended a field defaulting to zero.
/// let upgrade = |value: &StructValue, _from: InterfaceVersion, to: InterfaceVersion| -> CspResult<StructValue> {
///     let mut value = value.clone();
///     value.fields_mut().push(0_i32.into());
///     value.set_version(to);
///     Ok(value)
/// };
///
/// let old = StructValue::new("demo::Point").with_version(InterfaceVersion(1)).with_field(4_i32);
/// let new = upgrade.convert(&old, InterfaceVersion(1), InterfaceVersion(2)).unwrap();
/// assert_eq!(new.fields().len(), 2);
/// ```
pub trait VersionConverter: Send + Sync {
    /// Returns `value`, written for `from`, as the representation of `to`.
    fn convert(
        &self,
        value: &StructValue,
        from: InterfaceVersion,
        to: InterfaceVersion,
    ) -> CspResult<StructValue>;
}

impl<F> VersionConverter for F
where
    F: Fn(&StructValue, InterfaceVersion, InterfaceVersion) -> CspResult<StructValue> + Send + Sync,
{
    #[inline]
    fn convert(
        &self,
        value: &StructValue,
        from: InterfaceVersion,
        to: InterfaceVersion,
    ) -> CspResult<StructValue> {
        self(value, from, to)
    }
}

impl fmt::Debug for dyn VersionConverter + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn VersionConverter")
    }
}
