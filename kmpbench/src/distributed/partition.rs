use std::iter::StepBy;
use std::ops::Range;

/// Indices handled by `rank` out of `size` workers: `rank, rank + size, ...` below `len`.
///
/// Striping instead of contiguous blocks keeps the load even when cost
/// correlates with index order.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn striped_indices(rank: usize, size: usize, len: usize) -> StepBy<Range<usize>> {
    assert!(size > 0, "striped partition over zero workers");
    (rank..len).step_by(size)
}

/// Number of indices [`striped_indices`] yields for `rank`
pub fn striped_len(rank: usize, size: usize, len: usize) -> usize {
    if rank >= len {
        0
    } else {
        (len - rank).div_ceil(size)
    }
}
