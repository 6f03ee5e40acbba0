//! Bump allocation from the block chain

use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::trace;

use super::Pool;
use crate::allocator::RawAllocator;
use crate::error::MemoryResult;
use crate::stats::PoolCounters;

impl<A: RawAllocator> Pool<A> {
    /// Serves a request of at most `max_small_size` bytes from the chain
    ///
    /// Tries every block from the current hint to the tail in order; the
    /// first one with room wins. Each block that lacks room records a
    /// failure, and one that had already failed more than `fail_threshold`
    /// times moves the hint past it. Grows the chain when none has room.
    pub(super) fn alloc_small(&self, size: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        let threshold = self.config.fail_threshold;

        let found = {
            let chain = self.chain.borrow();
            let mut found = None;
            for (index, node) in chain.iter().enumerate().skip(self.current.get()) {
                if let Some(ptr) = node.try_bump(size, align) {
                    found = Some((index, ptr));
                    break;
                }
                // the hint never moves past the tail
                if node.record_failure() > threshold && index + 1 < chain.len() {
                    self.current.set(index + 1);
                }
            }
            found
        };

        if let Some((index, ptr)) = found {
            #[cfg(feature = "logging")]
            trace!(size, align, block = index, "small allocation");
            #[cfg(not(feature = "logging"))]
            let _ = index;

            PoolCounters::bump(&self.counters.small_allocations);
            return Ok(ptr);
        }

        let ptr = self.grow(size, align)?;
        PoolCounters::bump(&self.counters.small_allocations);
        Ok(ptr)
    }
}

#[cfg(test)]
mod tests {
    use crate::Pool;
    use crate::config::PoolConfig;

    #[test]
    fn consecutive_allocations_are_adjacent() {
        let pool = Pool::new(256).unwrap();
        let a = pool.alloc(16).unwrap();
        let b = pool.alloc(16).unwrap();
        assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 16);
    }

    #[test]
    fn aligned_alloc_pads_cursor() {
        let pool = Pool::new(256).unwrap();
        let a = pool.alloc_unaligned(3).unwrap();
        let b = pool.alloc(8).unwrap();

        let word = core::mem::size_of::<usize>();
        assert_eq!(b.as_ptr() as usize % word, 0);
        assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, word.max(3));
    }

    #[test]
    fn unaligned_alloc_packs_tightly() {
        let pool = Pool::new(256).unwrap();
        let a = pool.alloc_unaligned(3).unwrap();
        let b = pool.alloc_unaligned(5).unwrap();
        assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 3);
    }

    #[test]
    fn zero_sized_request_does_not_move_cursor() {
        let pool = Pool::new(64).unwrap();
        let _ = pool.alloc(0).unwrap();
        assert_eq!(pool.blocks()[0].used(), 0);
    }

    #[test]
    fn exhausted_block_grows_chain() {
        let pool = Pool::new(128).unwrap();
        let _ = pool.alloc(100).unwrap();
        let second = pool.alloc(100).unwrap();

        assert_eq!(pool.chain_len(), 2);
        assert_eq!(second.as_ptr() as usize, pool.blocks()[1].start);
        assert_eq!(pool.stats().block_growths, 1);
    }

    #[test]
    fn earlier_block_reused_when_it_fits() {
        let pool = Pool::new(128).unwrap();
        let _ = pool.alloc(100).unwrap();
        let _ = pool.alloc(100).unwrap();

        // 24 bytes remain in the head block
        let small = pool.alloc(16).unwrap();
        let head = pool.blocks()[0];
        assert!(small.as_ptr() as usize >= head.start && (small.as_ptr() as usize) < head.end);
        assert_eq!(pool.chain_len(), 2);
    }

    #[test]
    fn current_hint_advances_after_threshold() {
        let pool = Pool::with_config(PoolConfig::new(64).with_fail_threshold(1)).unwrap();

        // every 40-byte request fills a block; the walk charges every block
        // it visits, and growth charges the blocks before the old tail again
        for _ in 0..5 {
            let _ = pool.alloc(40).unwrap();
        }

        let blocks = pool.blocks();
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0].fail_count, 3);
        assert_eq!(blocks[1].fail_count, 3);
        assert_eq!(blocks[2].fail_count, 3);
        assert_eq!(blocks[3].fail_count, 1);
        assert_eq!(blocks[4].fail_count, 0);
        assert_eq!(pool.current_block(), 3);
    }

    #[test]
    fn failed_walk_charges_blocks_that_lack_room() {
        let pool = Pool::new(256).unwrap();
        let _ = pool.alloc(250).unwrap();
        let _ = pool.alloc(200).unwrap();
        assert_eq!(pool.chain_len(), 2);
        assert_eq!(pool.blocks()[0].fail_count, 1);

        // each request misses the full head block and lands in block 1
        for _ in 0..6 {
            let ptr = pool.alloc(8).unwrap();
            let second = pool.blocks()[1];
            assert!((second.start..second.end).contains(&(ptr.as_ptr() as usize)));
        }

        // the fifth miss saw a prior count of 5, so later walks start at block 1
        assert_eq!(pool.blocks()[0].fail_count, 6);
        assert_eq!(pool.current_block(), 1);
        assert_eq!(pool.chain_len(), 2);
    }
}
