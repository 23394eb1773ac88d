use core::fmt::Debug;

use alloc::format;

use crate::status::{CspError, CspResult};

// -----------------------------------------------------------------------------
// ResizeStrategy

/// Computes the new capacity of a growing buffer.
///
/// The result is never smaller than `min_required`, and the computation must
/// saturate instead of wrapping.
pub trait ResizeStrategy: Send + Sync + Debug {
    /// Returns a capacity `>= min_required`.
    ///
    /// Fails when `capacity > min_required`: there is nothing to grow.
    fn calculate_new_size(&self, capacity: usize, min_required: usize) -> CspResult<usize>;
}

// -----------------------------------------------------------------------------
// DoublingResizeStrategy

/// The default strategy: doubles the capacity until it fits.
///
/// # Examples
///
/// ```
/// use csp_base::buffer::{DoublingResizeStrategy, ResizeStrategy};
///
/// let strategy = DoublingResizeStrategy;
/// assert_eq!(strategy.calculate_new_size(4, 4).unwrap(), 4);
/// assert_eq!(strategy.calculate_new_size(4, 9).unwrap(), 16);
/// assert_eq!(strategy.calculate_new_size(4, usize::MAX).unwrap(), usize::MAX);
/// assert!(strategy.calculate_new_size(1, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DoublingResizeStrategy;

impl ResizeStrategy for DoublingResizeStrategy {
    fn calculate_new_size(&self, capacity: usize, min_required: usize) -> CspResult<usize> {
        if capacity > min_required {
            return Err(CspError::invalid(format!(
                "capacity {capacity} already exceeds required size {min_required}"
            )));
        }
        if capacity == min_required {
            return Ok(capacity);
        }

        // An empty buffer would never grow by doubling.
        let mut new_capacity = capacity.max(1);
        while new_capacity < min_required {
            new_capacity = new_capacity.saturating_mul(2);
        }
        Ok(new_capacity)
    }
}

// -----------------------------------------------------------------------------
// Tests
