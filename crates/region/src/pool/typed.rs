//! Typed helpers on top of the byte allocator
//!
//! Values placed in a pool are never dropped; reset and drop only reclaim
//! their memory. Register a cleanup for anything that owns resources.

use core::mem;
use core::ptr;

use super::Pool;
use crate::allocator::RawAllocator;
use crate::error::MemoryResult;

impl<A: RawAllocator> Pool<A> {
    /// Moves `value` into the pool
    #[must_use = "allocated memory must be used"]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_value<T>(&self, value: T) -> MemoryResult<&mut T> {
        let ptr = self
            .dispatch(mem::size_of::<T>(), mem::align_of::<T>())?
            .cast::<T>();

        // SAFETY: Initializing a fresh allocation.
        // - ptr has room for one T and is aligned for T (dispatch contract)
        // - the allocation is disjoint from every other live one
        // - the reference borrows the pool, and reset needs &mut self
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Copies `src` into the pool
    #[must_use = "allocated memory must be used"]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> MemoryResult<&mut [T]> {
        if src.is_empty() {
            return Ok(&mut []);
        }

        let ptr = self
            .dispatch(mem::size_of_val(src), mem::align_of::<T>())?
            .cast::<T>();

        // SAFETY: Copying into a fresh allocation.
        // - ptr has room for src.len() elements and is aligned for T
        // - source and destination cannot overlap
        // - T: Copy, so a bitwise copy yields valid values
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), src.len());
            Ok(&mut *ptr::slice_from_raw_parts_mut(ptr.as_ptr(), src.len()))
        }
    }

    /// Copies `s` into the pool without padding
    #[must_use = "allocated memory must be used"]
    pub fn alloc_str(&self, s: &str) -> MemoryResult<&str> {
        let bytes = self.alloc_slice_copy(s.as_bytes())?;
        // SAFETY: bytes is an exact copy of valid UTF-8.
        unsafe { Ok(core::str::from_utf8_unchecked(bytes)) }
    }
}
