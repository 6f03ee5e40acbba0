//! System allocator implementation
//!
//! Provides a raw allocator that wraps the system's default memory allocator.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

#[cfg(feature = "logging")]
use tracing::trace;

use super::RawAllocator;

/// Wrapper for the system's default allocator
///
/// # Thread Safety
/// The system allocator is inherently thread-safe; the pools built on top of
/// it are not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Creates a new SystemAllocator
    ///
    /// This is a zero-cost operation as the SystemAllocator contains no state.
    #[inline]
    pub const fn new() -> Self {
        SystemAllocator
    }

    /// Returns information about the system allocator
    pub fn info() -> &'static str {
        #[cfg(target_os = "linux")]
        return "Linux system allocator (typically glibc malloc or musl)";

        #[cfg(target_os = "windows")]
        return "Windows HeapAlloc";

        #[cfg(target_os = "macos")]
        return "macOS system allocator (libsystem_malloc)";

        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        return "Platform-specific system allocator";
    }
}

// SAFETY: System returns blocks satisfying the layout or null, and never
// hands out overlapping live blocks.
unsafe impl RawAllocator for SystemAllocator {
    #[inline]
    fn raw_alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0, "pools never request zero-sized blocks");

        // SAFETY: layout has non-zero size (pool invariant, asserted above).
        let ptr = NonNull::new(unsafe { System.alloc(layout) });

        #[cfg(feature = "logging")]
        trace!(size = layout.size(), align = layout.align(), ok = ptr.is_some(), "raw_alloc");

        ptr
    }

    #[inline]
    unsafe fn raw_free(&self, ptr: NonNull<u8>, layout: Layout) {
        #[cfg(feature = "logging")]
        trace!(size = layout.size(), "raw_free");

        // SAFETY: Caller guarantees ptr came from raw_alloc with this layout.
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
    }
}
