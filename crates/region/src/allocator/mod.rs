//! Raw memory source for pools
//!
//! A pool never calls the global allocator directly for its blocks or
//! large payloads. Everything goes through [`RawAllocator`], which keeps the
//! single external collaborator swappable (tests inject failing or
//! recording allocators through it).

mod system;

use core::alloc::Layout;
use core::ptr::NonNull;

pub use system::SystemAllocator;

/// Source of raw memory blocks
///
/// # Safety
///
/// Implementors must guarantee:
/// - A pointer returned by `raw_alloc` is valid for reads and writes of
///   `layout.size()` bytes and aligned to `layout.align()`
/// - The block stays valid until passed to `raw_free` with the same layout
/// - Distinct live blocks never overlap
pub unsafe trait RawAllocator {
    /// Allocates a block for `layout`, `None` when memory is exhausted
    ///
    /// `layout.size()` is never zero when called by a pool.
    fn raw_alloc(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Releases a block previously returned by `raw_alloc`
    ///
    /// # Safety
    ///
    /// `ptr` must come from `raw_alloc` on this allocator with the same
    /// `layout`, and must not be released twice.
    unsafe fn raw_free(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: Forwarding to the referenced allocator preserves its guarantees.
unsafe impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    #[inline]
    fn raw_alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).raw_alloc(layout)
    }

    #[inline]
    unsafe fn raw_free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Caller upholds the raw_free contract for the inner allocator.
        unsafe { (**self).raw_free(ptr, layout) }
    }
}
