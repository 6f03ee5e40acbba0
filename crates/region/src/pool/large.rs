//! Large allocations tracked outside the chain
//!
//! Each payload comes straight from the raw allocator and is recorded in a
//! slot list, most recent slot last. A freed payload leaves its slot in the
//! list so a later request can fill it again.

use core::alloc::Layout;
use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::trace;

use super::{Pool, reserve_bookkeeping};
use crate::allocator::RawAllocator;
use crate::error::{MemoryError, MemoryResult};
use crate::stats::PoolCounters;
use crate::utils::POOL_ALIGNMENT;

/// One entry of the large list
pub(crate) enum LargeSlot {
    Occupied { ptr: NonNull<u8>, layout: Layout },
    Free,
}

impl LargeSlot {
    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied { .. })
    }

    /// Bytes held by the payload, zero for a free slot
    #[inline]
    pub(crate) fn payload_size(&self) -> usize {
        match self {
            Self::Occupied { layout, .. } => layout.size(),
            Self::Free => 0,
        }
    }

    /// Empties the slot, handing back what it held
    #[inline]
    pub(crate) fn take(&mut self) -> Option<(NonNull<u8>, Layout)> {
        match core::mem::replace(self, Self::Free) {
            Self::Occupied { ptr, layout } => Some((ptr, layout)),
            Self::Free => None,
        }
    }
}

impl<A: RawAllocator> Pool<A> {
    /// Allocates a payload for `layout` and records it, reusing a free
    /// slot among the most recent ones when possible
    pub(super) fn alloc_large(&self, layout: Layout) -> MemoryResult<NonNull<u8>> {
        let ptr = self.raw_payload(layout)?;

        {
            let mut large = self.large.borrow_mut();
            let lookahead = self.config.large_reuse_lookahead;
            if let Some(slot) = large
                .iter_mut()
                .rev()
                .take(lookahead)
                .find(|slot| !slot.is_occupied())
            {
                *slot = LargeSlot::Occupied { ptr, layout };
                PoolCounters::bump(&self.counters.large_slot_reuses);
                PoolCounters::bump(&self.counters.large_allocations);

                #[cfg(feature = "logging")]
                trace!(size = layout.size(), "large allocation reused slot");

                return Ok(ptr);
            }
        }

        self.push_large(ptr, layout)
    }

    /// Allocates `size` bytes aligned to `align`, always in a new slot
    ///
    /// The request bypasses the chain whatever its size.
    ///
    /// # Errors
    ///
    /// - [`MemoryError::InvalidAlignment`] if `align` is not a power of two
    /// - [`MemoryError::OutOfMemory`] if the payload or its slot cannot be
    ///   allocated
    #[must_use = "allocated memory must be used"]
    pub fn alloc_aligned_large(&self, size: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        if !align.is_power_of_two() {
            return Err(MemoryError::invalid_alignment(align));
        }

        let layout = Layout::from_size_align(size.max(1), align.max(POOL_ALIGNMENT))?;
        let ptr = self.raw_payload(layout)?;
        self.push_large(ptr, layout)
    }

    /// Releases one large payload ahead of reset or drop
    ///
    /// Only the payload is freed; its slot stays for reuse.
    ///
    /// # Errors
    ///
    /// [`MemoryError::NotFound`] if `ptr` is not a live large payload of this
    /// pool. The list is left unchanged.
    ///
    /// # Safety
    ///
    /// No reference into the payload may be used after this call.
    pub unsafe fn free_large(&self, ptr: NonNull<u8>) -> MemoryResult<()> {
        let released = {
            let mut large = self.large.borrow_mut();
            large
                .iter_mut()
                .find(|slot| matches!(slot, LargeSlot::Occupied { ptr: p, .. } if *p == ptr))
                .and_then(LargeSlot::take)
        };

        let Some((ptr, layout)) = released else {
            return Err(MemoryError::not_found(ptr.as_ptr() as usize));
        };

        // SAFETY: the slot owned this payload from self.allocator with this
        // layout and has just been emptied; the caller no longer uses it.
        unsafe { self.allocator.raw_free(ptr, layout) };

        #[cfg(feature = "logging")]
        trace!(size = layout.size(), "large allocation freed");

        Ok(())
    }

    /// Number of slots in the large list, free ones included
    pub fn large_slots(&self) -> usize {
        self.large.borrow().len()
    }

    /// Number of large slots currently holding a payload
    pub fn large_live(&self) -> usize {
        self.large
            .borrow()
            .iter()
            .filter(|slot| slot.is_occupied())
            .count()
    }

    fn raw_payload(&self, layout: Layout) -> MemoryResult<NonNull<u8>> {
        self.allocator
            .raw_alloc(layout)
            .ok_or_else(|| MemoryError::out_of_memory_with_layout(layout))
    }

    /// Records `ptr` in a new most-recent slot
    ///
    /// Frees the payload again if the slot itself cannot be allocated.
    fn push_large(&self, ptr: NonNull<u8>, layout: Layout) -> MemoryResult<NonNull<u8>> {
        let mut large = self.large.borrow_mut();
        if let Err(err) = reserve_bookkeeping(&mut *large, 1) {
            drop(large);
            // SAFETY: ptr was just allocated for layout and never published.
            unsafe { self.allocator.raw_free(ptr, layout) };
            return Err(err);
        }

        large.push(LargeSlot::Occupied { ptr, layout });
        PoolCounters::bump(&self.counters.large_allocations);

        #[cfg(feature = "logging")]
        trace!(
            size = layout.size(),
            align = layout.align(),
            slots = large.len(),
            "large allocation"
        );

        Ok(ptr)
    }
}
