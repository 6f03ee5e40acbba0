//! Alignment and size helpers shared by the pool internals
//!
//! This module provides:
//! - Power-of-two alignment arithmetic
//! - The alignment constants the pool is built around
//! - Human-readable byte formatting for reports

/// Alignment used by [`Pool::alloc`](crate::Pool::alloc): one machine word.
pub const POOL_ALIGNMENT: usize = core::mem::size_of::<usize>();

/// Alignment of every raw block backing the chain.
///
/// Small requests with an alignment up to this value are served from the
/// chain; anything stricter is routed to the large path.
pub const BLOCK_ALIGNMENT: usize = 16;

/// Aligns a value up to the nearest multiple of alignment
///
/// # Examples
/// ```
/// use nebula_region::utils::align_up;
///
/// assert_eq!(align_up(7, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
#[inline(always)]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Checked variant of [`align_up`], `None` on overflow
#[inline]
pub const fn checked_align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    match value.checked_add(alignment - 1) {
        Some(bumped) => Some(bumped & !(alignment - 1)),
        None => None,
    }
}

/// Checks if a value is aligned to the given alignment
///
/// # Examples
/// ```
/// use nebula_region::utils::is_aligned;
///
/// assert!(is_aligned(16, 8));
/// assert!(!is_aligned(12, 8));
/// ```
#[inline(always)]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

/// Formats a byte count with a binary unit suffix
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
