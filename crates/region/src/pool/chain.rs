//! Chain blocks and block growth
//!
//! # Safety
//!
//! - Every node owns one raw block obtained from the pool's `RawAllocator`
//! - The cursor is an offset into the block, always `<= capacity`
//! - Nodes never free their block on drop; the pool releases them
//!   explicitly because only it holds the allocator

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::debug;

use super::{Pool, reserve_bookkeeping};
use crate::allocator::RawAllocator;
use crate::error::{MemoryError, MemoryResult};
use crate::stats::PoolCounters;
use crate::utils::{BLOCK_ALIGNMENT, checked_align_up};

/// One fixed-capacity block of the chain
pub(crate) struct ChainNode {
    block: NonNull<u8>,
    layout: Layout,
    cursor: Cell<usize>,
    fail_count: Cell<usize>,
}

impl ChainNode {
    /// Allocates a fresh block, cursor at its start
    pub(crate) fn allocate<A: RawAllocator>(
        allocator: &A,
        layout: Layout,
        pattern: Option<u8>,
    ) -> MemoryResult<Self> {
        let block = allocator
            .raw_alloc(layout)
            .ok_or_else(|| MemoryError::out_of_memory_with_layout(layout))?;

        if let Some(pattern) = pattern {
            // SAFETY: Filling a freshly allocated block.
            // - block is valid for layout.size() bytes (RawAllocator contract)
            // - nothing else references it yet
            unsafe { block.as_ptr().write_bytes(pattern, layout.size()) };
        }

        Ok(Self {
            block,
            layout,
            cursor: Cell::new(0),
            fail_count: Cell::new(0),
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub(crate) fn used(&self) -> usize {
        self.cursor.get()
    }

    #[inline]
    pub(crate) fn fail_count(&self) -> usize {
        self.fail_count.get()
    }

    #[inline]
    pub(crate) fn start_addr(&self) -> usize {
        self.block.as_ptr() as usize
    }

    /// Whether `addr` falls inside this block
    #[inline]
    pub(crate) fn contains(&self, addr: usize) -> bool {
        let start = self.start_addr();
        addr >= start && addr - start < self.capacity()
    }

    /// Bumps the cursor by `size` after aligning it to `align`
    ///
    /// Returns `None` without touching the cursor if the block lacks room.
    #[inline]
    pub(crate) fn try_bump(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        debug_assert!(align <= BLOCK_ALIGNMENT);

        // block start is BLOCK_ALIGNMENT-aligned, so aligning the offset
        // aligns the address
        let offset = checked_align_up(self.cursor.get(), align)?;
        let room = self.capacity().checked_sub(offset)?;
        if room < size {
            return None;
        }

        self.cursor.set(offset + size);

        // SAFETY: offset <= capacity, so the result stays within the block
        // (or one past its end for a zero-sized request at the boundary).
        Some(unsafe { self.block.add(offset) })
    }

    /// Records one more failed walk, returning the count before the increment
    #[inline]
    pub(crate) fn record_failure(&self) -> usize {
        let prior = self.fail_count.get();
        self.fail_count.set(prior + 1);
        prior
    }

    /// Rewinds the cursor and clears the fail count
    pub(crate) fn rewind(&self, pattern: Option<u8>) {
        if let Some(pattern) = pattern {
            // SAFETY: Overwriting the used prefix of the block.
            // - [0, cursor) lies inside the block
            // - Callers hold &mut Pool, so no allocation from it is live
            unsafe { self.block.as_ptr().write_bytes(pattern, self.cursor.get()) };
        }
        self.cursor.set(0);
        self.fail_count.set(0);
    }

    /// Returns the block to the allocator it came from
    ///
    /// # Safety
    ///
    /// `allocator` must be the allocator that produced this node.
    pub(crate) unsafe fn release<A: RawAllocator>(self, allocator: &A) {
        // SAFETY: block was produced by allocator.raw_alloc(self.layout)
        // (caller contract) and is consumed here, so it is freed once.
        unsafe { allocator.raw_free(self.block, self.layout) };
    }

    pub(crate) fn info(&self) -> BlockInfo {
        let start = self.start_addr();
        BlockInfo {
            start,
            end: start + self.capacity(),
            cursor: start + self.used(),
            fail_count: self.fail_count(),
        }
    }
}

/// Snapshot of one chain block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// First address of the block
    pub start: usize,
    /// One past the last address of the block
    pub end: usize,
    /// Next free address
    pub cursor: usize,
    /// Failed walks recorded against the block
    pub fail_count: usize,
}

impl BlockInfo {
    /// Bytes still free at the tail of the block
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.cursor
    }

    /// Bytes handed out (including alignment padding)
    #[inline]
    pub fn used(&self) -> usize {
        self.cursor - self.start
    }
}

impl<A: RawAllocator> Pool<A> {
    /// Appends a new block and serves `size` bytes from its start
    ///
    /// On allocation failure nothing is mutated.
    pub(super) fn grow(&self, size: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        let pattern = self.config.alloc_pattern;
        let node = ChainNode::allocate(&self.allocator, self.block_layout, pattern)?;
        let Some(ptr) = node.try_bump(size, align) else {
            // SAFETY: node came from self.allocator a few lines above.
            unsafe { node.release(&self.allocator) };
            return Err(MemoryError::out_of_memory(size, align));
        };

        let mut chain = self.chain.borrow_mut();
        if let Err(err) = reserve_bookkeeping(&mut *chain, 1) {
            drop(chain);
            // SAFETY: node came from self.allocator and was never linked.
            unsafe { node.release(&self.allocator) };
            return Err(err);
        }

        // every block between the hint and the tail just failed this request
        let tail = chain.len() - 1;
        for index in self.current.get()..tail {
            if chain[index].record_failure() > self.config.fail_threshold {
                self.current.set(index + 1);
            }
        }

        chain.push(node);
        PoolCounters::bump(&self.counters.block_growths);

        #[cfg(feature = "logging")]
        debug!(
            blocks = chain.len(),
            current = self.current.get(),
            block_size = self.block_layout.size(),
            "pool chain grown"
        );

        Ok(ptr)
    }
}
